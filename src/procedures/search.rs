/*!
The search supervisor.

# Overview

The loop is short: while consistent, choose a branching literal by
pre-selection and lookahead, push it at the search level, and repeat.
A conflict is recovered from by popping hypotheses along the decision
trail, flipping the branch prefix bit at the failing depth, and asserting
the negation of the popped decision; running out of decisions while
inconsistent is unsatisfiability.
An empty lookahead table with the engine consistent means pre-selection
found every clause satisfied, and the assignment on the trail is a model.

```rust,ignore
loop {
    if engine.inconsistent {
        if !engine.backtrack(&mut decisions) { return Unsatisfiable; }
        continue;
    }
    match engine.choose()? {
        None => return Satisfiable,
        Some(literal) => engine.push(literal, FIXED_TRUTH),
    }
}
```

The prefix flip on backtracking keeps the 64 bit branch signature a unique
path identifier, which the candidate filter of
[pre-selection](crate::procedures::preselect) relies on.
*/

use crate::{
    context::{EngineState, GenericEngine},
    db::trail::FIXED_TRUTH,
    misc::log::targets::{self},
    reports::Report,
    structures::literal::CLiteral,
    types::err::{self},
};

impl<R: rand::Rng + std::default::Default> GenericEngine<R> {
    /// Decide the satisfiability of the recorded formula.
    ///
    /// An interruption from [checkpoint](GenericEngine::checkpoint) is
    /// reported as [Report::Unknown]; other errors propagate.
    pub fn search(&mut self) -> Result<Report, err::ErrorKind> {
        self.enter_op();
        let outcome = self.search_inner();
        self.leave_op();

        match outcome {
            Ok(report) => {
                self.state = match report {
                    Report::Satisfiable => EngineState::Satisfiable,
                    Report::Unsatisfiable => EngineState::Unsatisfiable,
                    Report::Unknown => EngineState::Unknown,
                };
                Ok(report)
            }

            Err(err::ErrorKind::Checkpoint(_)) => {
                self.state = EngineState::Unknown;
                Ok(Report::Unknown)
            }

            Err(e) => {
                self.state = EngineState::Unknown;
                Err(e)
            }
        }
    }

    fn search_inner(&mut self) -> Result<Report, err::ErrorKind> {
        let mut decisions: Vec<CLiteral> = Vec::default();

        loop {
            self.inc_istamp();
            self.checkpoint()?;

            if self.inconsistent {
                if !self.backtrack(&mut decisions) {
                    self.conclude_unsatisfiable();
                    return Ok(Report::Unsatisfiable);
                }
                continue;
            }

            let chosen = self.choose()?;

            if self.inconsistent {
                if !self.backtrack(&mut decisions) {
                    self.conclude_unsatisfiable();
                    return Ok(Report::Unsatisfiable);
                }
                continue;
            }

            let Some(literal) = chosen else {
                // the lookahead table is empty with every clause satisfied
                self.init_model();
                return Ok(Report::Satisfiable);
            };

            self.counters.decisions += 1;
            log::trace!(target: targets::SEARCH, "Decision {literal} at depth {}.", decisions.len());
            self.push(literal, FIXED_TRUTH);
            decisions.push(literal);

            debug_assert!(self.inconsistent || !self.is_unsat());
        }
    }

    /// Choose a branching literal: pre-select, compute probe scores, and
    /// pick by mixed score.
    /// `None` with the engine consistent reports satisfiability.
    pub(crate) fn choose(&mut self) -> Result<Option<CLiteral>, err::ErrorKind> {
        let mut literal = None;
        while literal.is_none() {
            self.pre_select();
            if self.lookahead.is_empty() {
                break;
            }
            self.compute_wnb()?;
            if self.inconsistent {
                break;
            }
            literal = self.select_literal();
        }

        debug_assert!(self.inconsistent || !self.is_unsat());
        Ok(literal)
    }

    /// Materialise the model from the trail.
    pub(crate) fn init_model(&mut self) {
        self.model.clear();
        for atom in 0..self.atom_count {
            let value = self.value_of(atom);
            self.model.push(value);
        }
    }

    /// Close a proof, if one is being transcribed.
    fn conclude_unsatisfiable(&mut self) {
        if self.config.drat.value {
            if let Some(transcriber) = self.transcriber.as_mut() {
                transcriber.transcribe_unsatisfiable();
            }
        }
    }
}
