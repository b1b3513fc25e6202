/*!
Clauses, as supplied by the caller.

The canonical representation of a clause is a vector of literals, and most
interaction with clauses is through the [Clause] trait so that slices,
vectors, and single literals may all be passed where a clause is expected.

Internally an engine does not keep clauses in this form.
During [initialisation](crate::context::GenericEngine) unit clauses are
assigned, binary clauses become edges of the binary implication graph, and
longer clauses are moved to a [clause arena](crate::db::clause).
*/

use crate::structures::literal::{CLiteral, Literal};

/// The canonical representation of a clause.
pub type CClause = Vec<CLiteral>;

/// Something which may be read as a sequence of literals.
pub trait Clause {
    /// An iterator over the literals of the clause.
    fn literals(&self) -> impl Iterator<Item = CLiteral> + '_;

    /// The number of literals in the clause.
    fn size(&self) -> usize;

    /// The clause as a space separated string of integer literals, closed
    /// with '0' in the DIMACS manner.
    fn as_dimacs(&self) -> String {
        let mut string = String::new();
        for literal in self.literals() {
            string.push_str(&format!("{} ", literal.as_int()));
        }
        string.push('0');
        string
    }
}

impl Clause for CClause {
    fn literals(&self) -> impl Iterator<Item = CLiteral> + '_ {
        self.iter().copied()
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl Clause for [CLiteral] {
    fn literals(&self) -> impl Iterator<Item = CLiteral> + '_ {
        self.iter().copied()
    }

    fn size(&self) -> usize {
        self.len()
    }
}

impl Clause for CLiteral {
    fn literals(&self) -> impl Iterator<Item = CLiteral> + '_ {
        std::iter::once(*self)
    }

    fn size(&self) -> usize {
        1
    }
}

impl From<CLiteral> for CClause {
    fn from(literal: CLiteral) -> Self {
        vec![literal]
    }
}
