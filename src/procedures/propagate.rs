/*!
Propagation of assignments, in three modes.

# Overview

For each literal newly on the trail, propagation runs a binary phase (a
direct walk of the literal's adjacency in the implication graph) and then a
watched phase (a compacting walk of the literal's watch list), looping
until the queue empties or a conflict is observed.

The three [modes](crate::context::Mode) share this one routine and differ
only inside the clause handler, at the moment a clause is seen to reduce to
two unassigned literals:

- `Searching` retires the clause and hands the pair to
  [try_add_binary](crate::context::GenericEngine::try_add_binary), so the
  reduction permanently enriches the binary implication graph.
- `Lookahead1` accumulates the product of the pair's heuristic scores into
  the probe's weighted new binary score, and notes each forced literal as a
  windfall.
- `Lookahead2` propagates and nothing more.

# Complications

The watch list under examination is moved out of the engine for the
duration of the walk.
Every mutation reachable from the walk --- retiring constraints, moving a
watch to another literal, assigning --- touches only *other* lists: a moved
watch lands on a literal that is not false, while the list being walked
belongs to a literal that is true.
The debug assertion before the list is restored checks this reasoning.

# Heuristics

A long clause watch carries a blocking literal, checked before the clause
is read at all; while the blocker holds the clause is satisfied and the
entry is kept untouched.
When the first watched slot is found satisfied instead, the blocker is
refreshed to it.
*/

use crate::{
    context::{GenericEngine, Mode},
    db::watch::Watcher,
    extension::ExtensionPropagation,
    misc::log::targets::{self},
    structures::literal::{CLiteral, Literal},
};

impl<R: rand::Rng + std::default::Default> GenericEngine<R> {
    /// Close the trail under propagation, or note a conflict.
    pub(crate) fn propagate(&mut self) {
        while !self.inconsistent && self.qhead < self.trail.len() {
            let limit = self.trail.len();

            let mut index = self.qhead;
            while index < limit && !self.inconsistent {
                self.propagate_binary(self.trail[index]);
                index += 1;
            }

            index = self.qhead;
            while index < limit && !self.inconsistent {
                self.propagate_clauses(self.trail[index]);
                index += 1;
            }

            self.qhead = limit;
        }
    }

    /// Assign everything `literal` implies in the binary graph.
    fn propagate_binary(&mut self, literal: CLiteral) {
        let count = self.binary[literal.index()].len();
        let mut index = 0;
        while !self.inconsistent && index < count {
            let implied = self.binary[literal.index()][index];
            self.assign(implied);
            index += 1;
        }
    }

    /// Walk the watch list of the (true) `literal`, compacting in place.
    pub(crate) fn propagate_clauses(&mut self, literal: CLiteral) {
        debug_assert!(self.is_true(literal));
        if self.inconsistent {
            return;
        }
        log::trace!(target: targets::PROPAGATION, "Watches of {literal}.");

        let mut list = std::mem::take(&mut self.watches[literal.index()]);
        let mut read = 0;
        let mut write = 0;

        while read < list.len() && !self.inconsistent {
            let entry = list[read];
            read += 1;

            match entry {
                Watcher::Ternary { a, b } => {
                    let mut keep = true;

                    if self.is_fixed(a) {
                        if self.is_false(a) {
                            if self.is_undef(b) {
                                self.propagated(b);
                            } else if self.is_false(b) {
                                self.set_conflict();
                            }
                        }
                        // otherwise satisfied, kept for backtracking
                    } else if self.is_fixed(b) {
                        if self.is_false(b) {
                            self.propagated(a);
                        }
                    } else {
                        // both unassigned, the ternary reduced to a binary
                        match self.mode {
                            Mode::Searching => {
                                self.detach_ternary(literal.negate(), a, b);
                                self.try_add_binary(a, b);
                                keep = false;
                            }

                            Mode::Lookahead1 => {
                                self.weighted_new_binaries +=
                                    self.h[self.heur][a.index()] * self.h[self.heur][b.index()];
                            }

                            Mode::Lookahead2 => {}
                        }
                    }

                    if keep {
                        list[write] = entry;
                        write += 1;
                    }
                }

                Watcher::Clause { blocker, reference } => {
                    if self.is_true(blocker) {
                        list[write] = entry;
                        write += 1;
                        continue;
                    }

                    // The falsified literal is parked in the second slot.
                    {
                        let clause = self.arena.get_mut(reference);
                        if clause[0] == literal.negate() {
                            clause.swap(0, 1);
                        }
                    }

                    let c0 = self.arena.get(reference)[0];
                    if self.is_true(c0) {
                        list[write] = Watcher::Clause { blocker: c0, reference };
                        write += 1;
                        continue;
                    }

                    let length = self.arena.get(reference).len();
                    let mut replacement = None;
                    for slot in 2..length {
                        if !self.is_false(self.arena.get(reference)[slot]) {
                            replacement = Some(slot);
                            break;
                        }
                    }

                    match replacement {
                        Some(slot) => {
                            // Move the watch to the replacement literal.
                            let c1;
                            {
                                let clause = self.arena.get_mut(reference);
                                clause[1] = clause[slot];
                                clause[slot] = literal.negate();
                                c1 = clause[1];
                            }
                            self.watches[c1.negate().index()]
                                .push(Watcher::Clause { blocker: c0, reference });

                            let mut live_remainder = false;
                            for slot in (slot + 1)..length {
                                if !self.is_false(self.arena.get(reference)[slot]) {
                                    live_remainder = true;
                                    break;
                                }
                            }

                            if !live_remainder && self.is_undef(c0) && self.is_undef(c1) {
                                // the clause reduced to the two watched literals
                                match self.mode {
                                    Mode::Searching => {
                                        self.detach_clause(reference);
                                        self.try_add_binary(c0, c1);
                                    }

                                    Mode::Lookahead1 => {
                                        self.weighted_new_binaries += self.h[self.heur]
                                            [c0.index()]
                                            * self.h[self.heur][c1.index()];
                                    }

                                    Mode::Lookahead2 => {}
                                }
                            } else if live_remainder
                                && self.mode == Mode::Lookahead1
                                && self.weighted_new_binaries == 0.0
                            {
                                // The clause shrank without being satisfied,
                                // which must not read as autarky eligible.
                                let mut satisfied = false;
                                for slot in 2..length {
                                    if self.is_true(self.arena.get(reference)[slot]) {
                                        satisfied = true;
                                        break;
                                    }
                                }
                                if !satisfied {
                                    self.weighted_new_binaries = 0.001;
                                }
                            }
                            // the entry is dropped, its watch has moved
                        }

                        None => {
                            list[write] = entry;
                            write += 1;

                            if self.is_false(c0) {
                                self.set_conflict();
                            } else {
                                debug_assert!(self.is_undef(c0));
                                self.propagated(c0);
                            }
                        }
                    }
                }

                Watcher::Extension { constraint } => {
                    let mut keep = true;

                    if let Some(mut extension) = self.extension.take() {
                        let outcome = extension.propagate(literal, constraint);
                        self.extension = Some(extension);
                        log::trace!(target: targets::EXTENSION, "Constraint {constraint}: {outcome:?}.");

                        match outcome {
                            ExtensionPropagation::Keep => {}

                            ExtensionPropagation::Drop => keep = false,

                            ExtensionPropagation::Implied {
                                literal: implied,
                                keep: keep_watch,
                            } => {
                                self.propagated(implied);
                                keep = keep_watch;
                            }

                            ExtensionPropagation::Conflict => {
                                self.set_conflict();
                                keep = false;
                            }
                        }
                    }

                    if keep {
                        list[write] = entry;
                        write += 1;
                    }
                }
            }
        }

        // On a conflict exit the unexamined tail is kept as is.
        while read < list.len() {
            list[write] = list[read];
            write += 1;
            read += 1;
        }
        list.truncate(write);

        debug_assert!(self.watches[literal.index()].is_empty());
        self.watches[literal.index()] = list;
    }
}
