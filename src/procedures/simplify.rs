/*!
Auxiliary services for an enclosing solver: unit extraction, equivalence
extraction, and externally guided literal selection.

Each service is a restricted run of the same machinery search uses:

- [simplify](crate::context::GenericEngine::simplify) runs one lookahead
  pass from the root and returns every literal forced there, for the host
  to commit as units.
- [scc](crate::context::GenericEngine::scc) runs pre-selection and the
  component decomposition only, mapping each variable to a representative
  and listing the variables a host may eliminate in favour of their roots.
- [select_lookahead](crate::context::GenericEngine::select_lookahead) runs
  the full choice pipeline under assumed literals, with candidates
  restricted to a given set, and reports the literal the engine would
  branch on.

Lookahead-discovered units are deliberately *not* committed back to the
host by `select_lookahead`: whether to strengthen the host formula from a
guided selection is the integrator's choice, and the engine stays
read-only on its input.
*/

use crate::{
    context::{EngineState, GenericEngine},
    db::trail::FIXED_TRUTH,
    misc::log::targets::{self},
    structures::{
        atom::Atom,
        literal::{CLiteral, Literal},
    },
    types::err::{self},
};

/// The outcome of an [scc](GenericEngine::scc) pass.
#[derive(Clone, Debug, Default)]
pub struct SccOutcome {
    /// Per variable, the representative literal of its equivalence class.
    /// A variable outside any class maps to its own positive literal.
    pub roots: Vec<CLiteral>,

    /// Variables whose class has a distinct representative, eliminable in
    /// its favour.
    pub eliminable: Vec<Atom>,
}

impl<R: rand::Rng + std::default::Default> GenericEngine<R> {
    /// Extract the units forced at the root by one lookahead pass.
    ///
    /// An empty result with the engine
    /// [unsatisfiable](crate::reports::Report::Unsatisfiable) means the
    /// formula conflicted at the root.
    pub fn simplify(&mut self) -> Result<Vec<CLiteral>, err::ErrorKind> {
        self.enter_op();
        debug_assert_eq!(self.prefix, 0);
        let outcome = self.simplify_inner();
        self.lookahead.clear();
        self.leave_op();
        outcome
    }

    fn simplify_inner(&mut self) -> Result<Vec<CLiteral>, err::ErrorKind> {
        if self.inconsistent {
            self.state = EngineState::Unsatisfiable;
            return Ok(Vec::default());
        }

        self.inc_istamp();
        let _ = self.choose()?;
        if self.inconsistent {
            // the conflict holds with no hypotheses standing
            self.state = EngineState::Unsatisfiable;
            return Ok(Vec::default());
        }

        debug_assert!(self.trail_lim.is_empty());
        let units = self.trail.clone();
        log::trace!(target: targets::SEARCH, "{} root units.", units.len());

        self.state = EngineState::Input;
        Ok(units)
    }

    /// Extract equivalence classes of the binary implication graph.
    ///
    /// An empty outcome with the engine
    /// [unsatisfiable](crate::reports::Report::Unsatisfiable) means a
    /// class contained a literal and its negation.
    pub fn scc(&mut self) -> Result<SccOutcome, err::ErrorKind> {
        self.enter_op();
        debug_assert_eq!(self.prefix, 0);
        let outcome = self.scc_inner();
        self.lookahead.clear();
        self.leave_op();
        outcome
    }

    fn scc_inner(&mut self) -> Result<SccOutcome, err::ErrorKind> {
        if self.inconsistent {
            self.state = EngineState::Unsatisfiable;
            return Ok(SccOutcome::default());
        }

        self.inc_istamp();
        self.lookahead.clear();

        let mut outcome = SccOutcome::default();

        if self.select(0) {
            self.get_scc();
            if self.inconsistent {
                self.state = EngineState::Unsatisfiable;
                return Ok(SccOutcome::default());
            }

            for atom in 0..self.atom_count {
                outcome.roots.push(CLiteral::new(atom, true));
            }

            for index in 0..self.candidates.len() {
                let atom = self.candidates[index].atom;
                let root = self.get_root(atom);

                if root.atom() != atom
                    && !self.eliminated[atom as usize]
                    && !self.eliminated[root.atom() as usize]
                {
                    outcome.eliminable.push(atom);
                    outcome.roots[atom as usize] = root;

                    // the root of a class is its own root, on both sides
                    debug_assert_eq!(
                        self.dfs[root.index()].parent,
                        Some(root),
                    );
                    self.dfs[root.negate().index()].parent = Some(root.negate());
                }
            }

            log::trace!(target: targets::SCC, "{} equivalences.", outcome.eliminable.len());
        }

        self.state = EngineState::Input;
        Ok(outcome)
    }

    /// The literal the engine would branch on, under `assumptions` and
    /// with candidates restricted to `vars`.
    ///
    /// `None` is returned when the restriction leaves nothing to probe or
    /// the assumptions conflict.
    pub fn select_lookahead(
        &mut self,
        assumptions: &[CLiteral],
        vars: &[Atom],
    ) -> Result<Option<CLiteral>, err::ErrorKind> {
        self.enter_op();
        let outcome = self.select_lookahead_inner(assumptions, vars);
        self.select_vars.clear();
        self.lookahead.clear();
        self.leave_op();
        self.state = EngineState::Input;
        outcome
    }

    fn select_lookahead_inner(
        &mut self,
        assumptions: &[CLiteral],
        vars: &[Atom],
    ) -> Result<Option<CLiteral>, err::ErrorKind> {
        if self.inconsistent {
            return Ok(None);
        }

        self.inc_istamp();
        for &atom in vars {
            self.select_vars.insert(atom);
        }

        for &assumption in assumptions {
            self.push(assumption, FIXED_TRUTH);
        }

        let chosen = self.choose();
        let conflicted = self.inconsistent;

        for _ in assumptions {
            self.pop();
        }

        let mut literal = chosen?;
        if conflicted {
            literal = None;
        }
        Ok(literal)
    }
}
