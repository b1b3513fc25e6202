/*!
Pre-selection of lookahead candidates, and the scoring fixpoint behind it.

# Scores

Probing every free variable is unaffordable, so each decision starts by
scoring the free variables and keeping a bounded set of candidates.

The score of a literal *l* combines, with weights renormalised each sweep:

- the summed scores of the literals *l* implies, for the binary clauses
  touching *l*, and
- for each longer clause watched on ¬*l*, the product of the scores of two
  of its other literals, as a squared term.

Iterating this a few times from a flat start is a fixpoint approximation;
at the root the sweeps are rotated through three score tables twice over,
which is as long as the values take to settle.
A variable's rating is the product of its two literal scores, so variables
whose *both* polarities are constrained rate highest.

# Trimming

Candidates are the free variables whose cached branch prefix still matches
the current branch (or every free variable when that filter starves the
set).
The target count shrinks with depth, and trimming happens in two steps:
repeatedly dropping candidates rated below the running mean until at most
twice the target survive, then sifting through a heap, discarding minimums
until the target is met.

An empty candidate set with every clause satisfied is how satisfiability is
detected.
*/

use crate::{
    context::GenericEngine,
    db::watch::Watcher,
    misc::log::targets::{self},
    structures::{
        atom::Atom,
        literal::{CLiteral, Literal},
    },
};

/// A free variable surviving pre-selection, to be probed.
#[derive(Clone, Copy, Debug)]
pub struct Candidate {
    /// The variable.
    pub atom: Atom,

    /// Its rating at the time of selection.
    pub rating: f64,
}

impl<R: rand::Rng + std::default::Default> GenericEngine<R> {
    /// Rebuild the lookahead table for the current depth: select
    /// candidates, decompose the binary implication graph, and order the
    /// component representatives into a probe table.
    pub(crate) fn pre_select(&mut self) {
        self.lookahead.clear();
        if self.select(self.scope_lvl() as u32) {
            self.get_scc();
            if self.inconsistent {
                return;
            }
            self.find_heights();
            self.construct_lookahead_table();
        }
    }

    /// Select up to a depth-scaled number of candidates by rating.
    /// Returns false when no candidate exists and every clause is
    /// satisfied.
    pub(crate) fn select(&mut self, level: u32) -> bool {
        self.init_pre_selection(level);

        let level_cand = self
            .config
            .level_cand
            .value
            .max(self.freevars.len() as u32 / 50);
        let mut target = match level {
            0 => self.freevars.len() as u32,
            _ => level_cand / level,
        };
        target = target.max(self.config.min_cutoff.value);
        let target = target as usize;

        let mut sum;
        let mut newbies = false;
        loop {
            sum = self.init_candidates(newbies);
            if !self.candidates.is_empty() {
                break;
            }
            if self.is_sat() {
                return false;
            }
            if newbies && !self.select_vars.is_empty() {
                // a candidate restriction may be unsatisfiable by any free
                // variable, which must not read as a satisfiable formula
                return false;
            }
            newbies = true;
        }

        // Step 1. Drop candidates rated below the mean, to at most twice
        // the target.
        let mut progress = true;
        while progress && self.candidates.len() >= target * 2 {
            progress = false;
            let mean = sum / (self.candidates.len() as f64 + 0.0001);
            sum = 0.0;

            let mut index = 0;
            while index < self.candidates.len() && self.candidates.len() >= target * 2 {
                if self.candidates[index].rating >= mean {
                    sum += self.candidates[index].rating;
                    index += 1;
                } else {
                    self.candidates.swap_remove(index);
                    progress = true;
                }
            }
        }

        // Step 2. Sift through a heap, discarding minimums.
        if self.candidates.len() > target {
            let mut index = self.candidates.len() / 2;
            while index > 0 {
                index -= 1;
                self.sift(index);
            }
            loop {
                let Some(last) = self.candidates.pop() else {
                    break;
                };
                self.candidates[0] = last;
                if self.candidates.len() == target {
                    break;
                }
                self.sift(0);
            }
        }

        debug_assert!(!self.candidates.is_empty() && self.candidates.len() <= target);
        log::trace!(target: targets::PRESELECT, "{} candidates at depth {level}.", self.candidates.len());
        true
    }

    /// Sift the candidate at `root` down its subtree, so the minimum rated
    /// candidate surfaces.
    fn sift(&mut self, root: usize) {
        let mut hole = root;
        let candidate = self.candidates[root];

        let mut child = 2 * root + 1;
        while child < self.candidates.len() {
            if child + 1 < self.candidates.len()
                && self.candidates[child].rating < self.candidates[child + 1].rating
            {
                child += 1;
            }
            if candidate.rating <= self.candidates[child].rating {
                break;
            }
            self.candidates[hole] = self.candidates[child];
            hole = child;
            child = 2 * child + 1;
        }

        if hole > root {
            self.candidates[hole] = candidate;
        }
    }

    /// Gather candidates from the free variables, returning the rating
    /// sum.
    ///
    /// An explicit restriction takes precedence; otherwise the prefix
    /// filter applies unless suspended by `newbies`.
    fn init_candidates(&mut self, newbies: bool) -> f64 {
        self.candidates.clear();
        let mut sum = 0.0;

        for index in 0..self.freevars.len() {
            let atom = self.freevars.as_slice()[index];
            debug_assert!(self.is_undef(CLiteral::new(atom, true)));

            if !self.select_vars.is_empty() {
                if self.select_vars.contains(&atom) {
                    let rating = self.rating[atom as usize];
                    self.candidates.push(Candidate { atom, rating });
                    sum += rating;
                }
            } else if newbies || self.active_prefix(atom) {
                let rating = self.rating[atom as usize];
                self.candidates.push(Candidate { atom, rating });
                sum += rating;
            }
        }

        sum
    }

    /// Run the scoring sweeps appropriate to the depth, and point the
    /// engine at the resulting table.
    fn init_pre_selection(&mut self, level: u32) {
        let max_level = self.config.max_hlevel.value as usize;

        if level <= 1 {
            self.ensure_h(2);
            for _ in 0..2 {
                self.h_scores(0, 1);
                self.h_scores(1, 2);
                self.h_scores(2, 0);
            }
            self.heur = 1;
        } else if (level as usize) < max_level {
            self.ensure_h(level as usize);
            self.h_scores(level as usize - 1, level as usize);
            self.heur = level as usize;
        } else {
            self.ensure_h(max_level);
            self.h_scores(max_level - 1, max_level);
            self.heur = max_level;
        }
    }

    /// Grow the table of score iterates to include index `level`.
    fn ensure_h(&mut self, level: usize) {
        let literals = 2 * self.atom_count as usize;
        while self.h.len() <= level {
            self.h.push(vec![0.0; literals]);
        }
    }

    /// One sweep of the scoring fixpoint, reading iterate `from` and
    /// writing iterate `to`, updating ratings along the way.
    fn h_scores(&mut self, from: usize, to: usize) {
        let mut sum = 0.0;
        for &atom in self.freevars.as_slice() {
            let literal = CLiteral::new(atom, true);
            sum += self.h[from][literal.index()] + self.h[from][literal.negate().index()];
        }
        if sum == 0.0 {
            sum = 0.0001;
        }

        let factor = 2.0 * self.freevars.len() as f64 / sum;
        let sqfactor = factor * factor;
        let afactor = factor * self.config.alpha.value;

        // Entries of assigned variables keep their last value.
        let mut next = std::mem::take(&mut self.h[to]);

        for index in 0..self.freevars.len() {
            let atom = self.freevars.as_slice()[index];
            let literal = CLiteral::new(atom, true);

            let pos = self.l_score(literal, from, sqfactor, afactor);
            let neg = self.l_score(literal.negate(), from, sqfactor, afactor);

            next[literal.index()] = pos;
            next[literal.negate().index()] = neg;
            self.rating[atom as usize] = pos * neg;
        }

        self.h[to] = next;
    }

    /// The score of `literal` against iterate `from`.
    fn l_score(&self, literal: CLiteral, from: usize, sqfactor: f64, afactor: f64) -> f64 {
        let scores = &self.h[from];
        let mut sum = 0.0;
        let mut tsum = 0.0;

        for &implied in &self.binary[literal.index()] {
            if self.is_undef(implied) {
                sum += scores[implied.index()];
            }
        }

        for entry in &self.watches[literal.index()] {
            match entry {
                Watcher::Ternary { a, b } => {
                    tsum += scores[a.index()] * scores[b.index()];
                }

                Watcher::Clause { reference, .. } => {
                    // approximated by the product of two other literals
                    let clause = self.arena.get(*reference);
                    if clause[0] == literal.negate() {
                        tsum += scores[clause[1].index()] * scores[clause[2].index()];
                    } else {
                        debug_assert_eq!(clause[1], literal.negate());
                        tsum += scores[clause[0].index()] * scores[clause[2].index()];
                    }
                }

                Watcher::Extension { .. } => {}
            }
        }

        (0.1 + afactor * sum + sqfactor * tsum).min(self.config.max_score.value)
    }

    /// Whether every clause is satisfied on the current assignment, taking
    /// binaries over free variables into account.
    pub(crate) fn is_sat(&self) -> bool {
        for &atom in self.freevars.as_slice() {
            let literal = CLiteral::new(atom, true);
            for &implied in &self.binary[literal.index()] {
                if !self.is_true(implied) {
                    return false;
                }
            }
            for &implied in &self.binary[literal.negate().index()] {
                if !self.is_true(implied) {
                    return false;
                }
            }
        }

        for reference in self.arena.references() {
            let clause = self.arena.get(reference);
            if !clause.iter().any(|&l| self.is_true(l)) {
                return false;
            }
        }

        true
    }

    /// Whether some clause is falsified outright on the current
    /// assignment.
    pub(crate) fn is_unsat(&self) -> bool {
        for reference in self.arena.references() {
            let clause = self.arena.get(reference);
            if clause.iter().all(|&l| self.is_false(l)) {
                return true;
            }
        }
        false
    }
}
