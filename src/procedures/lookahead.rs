/*!
The lookahead pass: probing, scoring, and the harvest of probe by-products.

# Overview

For each entry of the lookahead table, the probe literal is pushed as a
hypothesis at its own truth level and propagated.
The levels ascend through the table, so an abandoned probe needs no undo:
its stamps simply rank below every later probe.
A whole pass shares one trail frame, opened before the first probe and
truncated when the pass ends.

Each probe is scored by the weighted new binaries it produces, inheriting
the score of its forest parent as a starting point.
Probes yield more than scores:

- *Failed probes.* A probe that hits a conflict proves the negation, which
  is asserted at the search level and the pass restarted.
- *Windfalls.* Every literal forced during a consistent probe of *l* is
  learnt as the binary ¬*l* ∨ *w*.
- *Autarkies.* A probe that reduced no clause at all either touched
  nothing, in which case the probed literal is safe to commit outright, or
  repeated its parent's propagations exactly, in which case the probe
  literal and its parent are equivalent and the missing implication is
  learnt.

# Double lookahead

A probe whose inherited score clears a dynamic trigger is worth a second,
cheaper look: under the standing hypothesis, every other table literal is
probed in turn at levels carved from a reserved band below the search
level, iterating to a fixpoint bounded by configuration.
Failures inside the band become assertions under the original hypothesis.
The trigger follows the score of the probe that earnt a double look, and
decays whenever a probe falls short, so the machinery self-tunes towards
the configured success rate.
*/

use crate::{
    context::{GenericEngine, Mode},
    db::trail::{TruthLevel, FIXED_TRUTH},
    misc::log::targets::{self},
    structures::literal::{CLiteral, Literal},
    types::err,
};

/// An entry of the lookahead table.
#[derive(Clone, Copy, Debug)]
pub struct LookaheadEntry {
    /// The literal to probe.
    pub literal: CLiteral,

    /// The offset of the probe's truth level above the pass base.
    pub offset: u32,
}

/// Probe bookkeeping, one record per literal.
#[derive(Clone, Copy, Debug, Default)]
pub struct LitInfo {
    /// The weighted new binary score of the literal's last probe.
    pub wnb: f64,

    /// The epoch in which double lookahead was spent on the literal.
    pub double_lookahead: u32,
}

impl<R: rand::Rng + std::default::Default> GenericEngine<R> {
    #[inline]
    pub(crate) fn get_wnb(&self, literal: CLiteral) -> f64 {
        self.lits[literal.index()].wnb
    }

    #[inline]
    fn set_wnb(&mut self, literal: CLiteral, value: f64) {
        self.lits[literal.index()].wnb = value;
    }

    #[inline]
    fn inc_wnb(&mut self, literal: CLiteral, value: f64) {
        self.lits[literal.index()].wnb += value;
    }

    /// The combining function over the two polarities' scores, favouring
    /// variables whose both polarities produce many new binaries.
    fn mix_diff(&self, left: f64, right: f64) -> f64 {
        left + right + 1024.0 * left * right
    }

    /// Open a fresh double lookahead epoch, resetting lazily on overflow.
    pub(crate) fn inc_istamp(&mut self) {
        self.istamp_id = self.istamp_id.wrapping_add(1);
        if self.istamp_id == 0 {
            self.istamp_id = 1;
            for info in self.lits.iter_mut() {
                info.double_lookahead = 0;
            }
        }
    }

    #[inline]
    fn dl_enabled(&self, literal: CLiteral) -> bool {
        self.lits[literal.index()].double_lookahead != self.istamp_id
    }

    #[inline]
    fn dl_disable(&mut self, literal: CLiteral) {
        self.lits[literal.index()].double_lookahead = self.istamp_id;
    }

    /// Whether a double lookahead band fits below the search level.
    fn dl_no_overflow(&self, base: TruthLevel) -> bool {
        base as u64
            + 2 * self.lookahead.len() as u64 * (self.config.dl_max_iterations.value as u64 + 1)
            < FIXED_TRUTH as u64
    }

    /// Open a trail frame for a lookahead pass.
    pub(crate) fn open_wnb_frame(&mut self) {
        self.qhead_lim.push(self.qhead);
        self.trail_lim.push(self.trail.len());
    }

    /// Truncate the trail to the frame, clearing probe stamps.
    ///
    /// The free variable set is untouched: every assignment above a frame
    /// was made in a lookahead mode.
    pub(crate) fn close_wnb_frame(&mut self) {
        let mark = self.trail_lim.pop().expect("close without an open frame");
        for index in mark..self.trail.len() {
            let literal = self.trail[index];
            self.set_undef(literal.atom());
        }
        self.trail.truncate(mark);
        self.qhead = self.qhead_lim.pop().expect("close without an open frame");
    }

    /// Reset the probe score for `literal`, inheriting the propagation
    /// effect of its forest parent.
    fn begin_probe(&mut self, literal: CLiteral) {
        self.weighted_new_binaries = 0.0;

        let inherited = match self.dfs[literal.index()].parent {
            None => 0.0,
            Some(parent) => self.get_wnb(parent),
        };
        self.set_wnb(literal, inherited);
    }

    /// Probe `literal` at `level`: switch to probe mode, assign, and
    /// propagate.
    pub(crate) fn push_lookahead1(&mut self, literal: CLiteral, level: TruthLevel) {
        debug_assert_eq!(self.mode, Mode::Searching);
        self.mode = Mode::Lookahead1;

        let enclosing = self.level;
        self.level = level;
        self.assign(literal);
        self.propagate();
        self.level = enclosing;
    }

    /// Close the probe of `literal`, converting windfalls to binaries if
    /// the probe was consistent.
    pub(crate) fn pop_lookahead1(&mut self, literal: CLiteral) {
        let unsat = self.inconsistent;
        debug_assert_eq!(self.mode, Mode::Lookahead1);
        self.inconsistent = false;
        self.mode = Mode::Searching;

        let windfalls = std::mem::take(&mut self.wstack);
        if !unsat {
            let negated = literal.negate();
            for &forced in &windfalls {
                log::trace!(target: targets::LOOKAHEAD, "Windfall {negated} {forced}.");
                self.add_binary(negated, forced);
            }
            self.counters.windfall_binaries += windfalls.len() as u64;
        }
    }

    /// Probe `literal` at `level` within double lookahead.
    /// Returns true if the probe was unsatisfiable.
    fn push_lookahead2(&mut self, literal: CLiteral, level: TruthLevel) -> bool {
        debug_assert_eq!(self.mode, Mode::Lookahead1);
        self.mode = Mode::Lookahead2;

        let enclosing = self.level;
        self.level = level;
        self.assign(literal);
        self.propagate();
        self.level = enclosing;

        let unsat = self.inconsistent;
        self.mode = Mode::Lookahead1;
        self.inconsistent = false;
        unsat
    }

    /// Run probes over the lookahead table until the scores settle,
    /// asserting the negations of failed probes along the way.
    pub(crate) fn compute_wnb(&mut self) -> Result<(), err::ErrorKind> {
        self.open_wnb_frame();

        let mut base: TruthLevel = 2;
        let mut change = true;
        let mut first = true;

        while change && !self.inconsistent {
            change = false;

            let mut index = 0;
            while !self.inconsistent && index < self.lookahead.len() {
                self.checkpoint()?;

                let entry = self.lookahead[index];
                let literal = entry.literal;
                index += 1;

                if self.is_fixed_at(literal, FIXED_TRUTH) {
                    continue;
                }
                let level = base + entry.offset;
                if self.stamp[literal.atom() as usize] >= level {
                    continue;
                }

                log::trace!(target: targets::LOOKAHEAD, "Probe {literal} at offset {}.", entry.offset);
                self.begin_probe(literal);
                self.push_lookahead1(literal, level);
                if !first {
                    self.do_double(literal, &mut base);
                }
                let unsat = self.inconsistent;
                self.pop_lookahead1(literal);

                if unsat {
                    log::trace!(target: targets::LOOKAHEAD, "Failed probe, asserting {}.", literal.negate());
                    self.close_wnb_frame();
                    self.assign(literal.negate());
                    self.propagate();
                    self.open_wnb_frame();
                    change = true;
                } else {
                    self.update_wnb(literal, level);
                }

                debug_assert!(self.inconsistent || !self.is_unsat());
            }

            if (FIXED_TRUTH as u64) < base as u64 + 2 * self.lookahead.len() as u64 {
                break;
            }
            if first && !change {
                first = false;
                change = true;
            }

            self.close_wnb_frame();
            self.open_wnb_frame();
        }

        self.close_wnb_frame();
        Ok(())
    }

    /// Fold a consistent probe's outcome into its literal's score, or
    /// harvest the zero-weight cases.
    fn update_wnb(&mut self, literal: CLiteral, level: TruthLevel) {
        if self.weighted_new_binaries == 0.0 {
            if !self.check_autarky(literal, level) {
                // skip
            } else if self.get_wnb(literal) == 0.0 {
                self.counters.autarky_propagations += 1;
                log::trace!(target: targets::LOOKAHEAD, "Autarky {literal}.");
                self.close_wnb_frame();
                self.assign(literal);
                self.propagate();
                self.open_wnb_frame();
            } else {
                // The probe repeated its parent's propagations: the parent
                // is implied, and any consequence beyond the parent's
                // reduces nothing, so the converse may be learnt.
                if let Some(parent) = self.dfs[literal.index()].parent {
                    if self.stamp[parent.atom() as usize] > self.stamp[literal.atom() as usize] {
                        self.counters.autarky_equivalences += 1;
                        log::trace!(target: targets::LOOKAHEAD, "Equivalence {literal} {parent}.");
                        self.add_binary(literal.negate(), parent);
                        self.adopt_stamp(literal, parent);
                    }
                }
            }
        } else {
            let observed = self.weighted_new_binaries;
            self.inc_wnb(literal, observed);
        }
    }

    /// Whether committing `literal` is known to reduce no clause.
    ///
    /// TODO: the scan below ignores reductions reachable through pending
    /// binary propagations; until that is accounted for the check stands
    /// down and autarkies are only found through zero-weight probes.
    fn check_autarky(&self, literal: CLiteral, _level: TruthLevel) -> bool {
        let stood_down = true;
        if stood_down {
            return false;
        }

        // no occurrence may be an unsatisfied clause
        for reference in &self.full_watches[literal.index()] {
            let clause = self.arena.get(*reference);
            if !clause.iter().any(|&l| self.is_true(l)) {
                return false;
            }
        }

        // bail out on any pending binary propagation, which could reduce
        // clauses transitively
        for &implied in &self.binary[literal.index()] {
            if !self.is_true(implied) {
                return false;
            }
        }

        true
    }

    /// Consider a second level of lookahead under the standing probe of
    /// `literal`.
    fn do_double(&mut self, literal: CLiteral, base: &mut TruthLevel) {
        if !self.inconsistent && self.scope_lvl() > 1 && self.dl_enabled(literal) {
            if self.get_wnb(literal) > self.delta_trigger {
                if self.dl_no_overflow(*base) {
                    self.counters.double_lookahead_rounds += 1;
                    self.double_look(literal, base);
                    self.delta_trigger = self.get_wnb(literal);
                    self.dl_disable(literal);
                }
            } else {
                self.delta_trigger *= self.config.delta_rho.value;
            }
        }
    }

    /// Double lookahead under `literal`: probe the whole table inside a
    /// reserved level band, iterating while assertions keep landing.
    fn double_look(&mut self, literal: CLiteral, base: &mut TruthLevel) {
        debug_assert!(!self.inconsistent);
        debug_assert!(self.dl_no_overflow(*base));

        let iterations = self.config.dl_max_iterations.value;
        let dl_truth = (*base as u64
            + 2 * self.lookahead.len() as u64 * (iterations as u64 + 1))
            as TruthLevel;
        log::trace!(target: targets::LOOKAHEAD, "Double lookahead on {literal}.");

        let enclosing = self.level;
        self.level = dl_truth;

        self.open_wnb_frame();
        self.assign(literal);
        self.propagate();

        let mut change = true;
        let mut iteration = 0;
        while change && iteration < iterations && !self.inconsistent {
            change = false;
            iteration += 1;
            *base += 2 * self.lookahead.len() as TruthLevel;

            let mut index = 0;
            while !self.inconsistent && index < self.lookahead.len() {
                let entry = self.lookahead[index];
                index += 1;

                if self.is_fixed_at(entry.literal, dl_truth) {
                    continue;
                }
                if self.push_lookahead2(entry.literal, *base + entry.offset) {
                    self.counters.double_lookahead_propagations += 1;
                    debug_assert_eq!(self.level, dl_truth);
                    self.close_wnb_frame();
                    self.assign(entry.literal.negate());
                    self.propagate();
                    change = true;
                    self.open_wnb_frame();
                }
            }

            debug_assert!(*base as u64 + 2 * self.lookahead.len() as u64 <= dl_truth as u64);
        }

        self.close_wnb_frame();
        debug_assert_eq!(self.level, dl_truth);
        *base = dl_truth;
        self.level = enclosing;
    }

    /// Select the branching literal from the probed scores, breaking ties
    /// by reservoir sampling, taking the weaker polarity first.
    pub(crate) fn select_literal(&mut self) -> Option<CLiteral> {
        let mut selected: Option<CLiteral> = None;
        let mut best = 0.0_f64;
        let mut count = 1_u32;

        for index in 0..self.lookahead.len() {
            let literal = self.lookahead[index].literal;
            if !literal.polarity() || !self.is_undef(literal) {
                continue;
            }

            let positive = self.get_wnb(literal);
            let negative = self.get_wnb(literal.negate());
            let mixed = self.mix_diff(positive, negative);

            if mixed == best {
                count += 1;
            }
            if mixed > best || (mixed == best && self.rng.gen_range(0..count) == 0) {
                if mixed > best {
                    count = 1;
                }
                best = mixed;
                selected = match positive < negative {
                    true => Some(literal),
                    false => Some(literal.negate()),
                };
            }
        }

        if let Some(literal) = selected {
            log::trace!(target: targets::LOOKAHEAD, "Selected {literal}.");
        }
        selected
    }
}
