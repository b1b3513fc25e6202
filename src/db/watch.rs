/*!
Watch lists.

For each literal *l*, the watch list of *l* holds the constraints which must
be re-examined when *l* becomes true, i.e. the constraints watching a
falsified literal.
Three kinds of entry appear:

- [Ternary](Watcher::Ternary) --- the other two literals of a three literal
  clause, inline.
  A ternary clause is never examined through the arena during propagation,
  its three watch entries *are* the clause.
- [Clause](Watcher::Clause) --- a reference into the
  [clause arena](crate::db::clause) together with a cached *blocking*
  literal whose truth lets propagation skip the clause without touching it.
- [Extension](Watcher::Extension) --- an opaque constraint identifier
  delegated to the [extension](crate::extension::Extension).

Binary clauses are *not* watched here.
They live in the binary implication graph, where propagation over them is a
direct walk of an adjacency list.

Watch lists are compacted in place during propagation: entries for moved or
retired constraints are dropped by overwriting from the read cursor.
*/

use crate::{db::clause::ClauseRef, structures::literal::CLiteral};

/// An entry in a watch list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Watcher {
    /// The other two literals of a ternary clause.
    Ternary { a: CLiteral, b: CLiteral },

    /// A long clause, with a cached blocking literal.
    Clause { blocker: CLiteral, reference: ClauseRef },

    /// An external constraint, identified opaquely.
    Extension { constraint: u32 },
}

/// The watch list of a single literal.
pub type WatchList = Vec<Watcher>;

/// A ternary clause, as held on the retirement stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ternary {
    pub u: CLiteral,
    pub v: CLiteral,
    pub w: CLiteral,
}

use crate::{context::GenericEngine, structures::literal::Literal};

impl<R: rand::Rng + std::default::Default> GenericEngine<R> {
    /// Watch the arena clause at `reference`: inline for a ternary, two
    /// watched slots with a cached blocker otherwise.
    ///
    /// The blocker is the literal a quarter of the way into the clause, a
    /// position which tends to stay satisfied across re-attachment.
    pub(crate) fn attach_clause(&mut self, reference: ClauseRef) {
        let clause = self.arena.get(reference);

        if clause.len() == 3 {
            let (u, v, w) = (clause[0], clause[1], clause[2]);
            self.attach_ternary(u, v, w);
        } else {
            let blocker = clause[clause.len() >> 2];
            let (c0, c1) = (clause[0], clause[1]);
            debug_assert!(self.is_undef(c0));
            debug_assert!(self.is_undef(c1));

            self.watches[c0.negate().index()].push(Watcher::Clause { blocker, reference });
            self.watches[c1.negate().index()].push(Watcher::Clause { blocker, reference });
        }
    }

    /// Retire the clause at `reference`, unhooking both watches.
    pub(crate) fn detach_clause(&mut self, reference: ClauseRef) {
        let clause = self.arena.get(reference);
        let (c0, c1) = (clause[0], clause[1]);

        self.retired_clauses.push(reference);
        self.erase_clause_watch(c0.negate(), reference);
        self.erase_clause_watch(c1.negate(), reference);
    }

    /// Watch the ternary clause `l1` ∨ `l2` ∨ `l3` inline.
    pub(crate) fn attach_ternary(&mut self, l1: CLiteral, l2: CLiteral, l3: CLiteral) {
        self.counters.add_ternary += 1;

        self.watches[l1.negate().index()].push(Watcher::Ternary { a: l2, b: l3 });
        self.watches[l2.negate().index()].push(Watcher::Ternary { a: l1, b: l3 });
        self.watches[l3.negate().index()].push(Watcher::Ternary { a: l1, b: l2 });
    }

    /// Retire the ternary `l1` ∨ `l2` ∨ `l3`.
    ///
    /// The entry on ¬`l1`'s list is not erased here: the caller is walking
    /// that list and drops the entry through its own compaction.
    pub(crate) fn detach_ternary(&mut self, l1: CLiteral, l2: CLiteral, l3: CLiteral) {
        self.counters.del_ternary += 1;
        self.retired_ternary.push(Ternary { u: l1, v: l2, w: l3 });

        self.erase_ternary_watch(l2.negate(), l1, l3);
        self.erase_ternary_watch(l3.negate(), l1, l2);
    }

    /// Erase the watch entry for `reference` from `watching`'s list.
    pub(crate) fn erase_clause_watch(&mut self, watching: CLiteral, reference: ClauseRef) {
        let list = &mut self.watches[watching.index()];
        if let Some(position) = list.iter().position(
            |entry| matches!(entry, Watcher::Clause { reference: r, .. } if *r == reference),
        ) {
            list.remove(position);
        }
    }

    /// Erase the ternary watch entry over `a` and `b` from `watching`'s
    /// list.
    /// The pair is matched without order, as the slot order of an entry
    /// depends on which literal's list it sits in.
    pub(crate) fn erase_ternary_watch(&mut self, watching: CLiteral, a: CLiteral, b: CLiteral) {
        let list = &mut self.watches[watching.index()];
        if let Some(position) = list.iter().position(|entry| match entry {
            Watcher::Ternary { a: x, b: y } => {
                (*x == a && *y == b) || (*x == b && *y == a)
            }
            _ => false,
        }) {
            list.remove(position);
        }
    }
}
