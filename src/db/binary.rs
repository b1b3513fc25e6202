/*!
The binary implication graph, and dynamic binary synthesis.

# Representation

A binary clause *u* ∨ *v* is stored as the pair of implications
¬*u* → *v* and ¬*v* → *u*: the adjacency list of a literal holds the
literals it implies.
Propagating a true literal over binaries is then a direct walk of one list,
with no watch bookkeeping.

Additions are symmetric and logged on a deletion trail, so a
[pop](crate::context::GenericEngine) can remove exactly the edges appended
since the matching push, in reverse.
Removal pops both lists, which relies on additions only ever happening at
the tails.

# Synthesis

When propagation reduces a clause to the two literals *u* ∨ *v* in search
mode, the pair is not simply recorded.
With every implicant of ¬*u* stamped, three cases fall out:

1. ¬*v* is stamped: *u* ∨ ¬*v* is already present, so *u* is a unit.
2. *v* is stamped: *u* ∨ *v* is already present, nothing to do.
3. Otherwise a one step transitive closure (tc1) is taken through *v*'s
   adjacency, which may again surface a unit, and otherwise synthesises
   *u* ∨ *w* binaries up to a configured budget.

The same steps run with *u* and *v* swapped, and only if neither pass
produced a unit is *u* ∨ *v* itself added, with the branch prefix cached on
both atoms for the pre-selection filter.

# Epoch stamps

The implicant marks above use a lazily reset epoch stamp: a per literal
`u32` compared against a counter incremented once per marking pass.
Overflow of the counter to zero triggers the one full reset of the array.
*/

use crate::{
    context::{GenericEngine, Mode},
    misc::log::targets::{self},
    structures::literal::{CLiteral, Literal},
};

impl<R: rand::Rng + std::default::Default> GenericEngine<R> {
    /// Record the binary clause `l1` ∨ `l2` as a pair of implications.
    ///
    /// A tautology is rejected, and the addition is skipped if it would
    /// immediately repeat the tail of the adjacency list.
    pub(crate) fn add_binary(&mut self, l1: CLiteral, l2: CLiteral) {
        log::trace!(target: targets::BINARY, "Binary {l1} {l2}.");
        debug_assert!(l1 != l2);

        if l1.negate() == l2 {
            return;
        }
        let from_l1 = l1.negate().index();
        if self.binary[from_l1].last() == Some(&l2) {
            return;
        }

        self.binary[from_l1].push(l2);
        self.binary[l2.negate().index()].push(l1);
        self.binary_trail.push(from_l1 as u32);
        self.counters.add_binary += 1;

        if self.config.drat.value {
            self.validate_binary(l1, l2);
        }
    }

    /// Remove the most recent implication recorded at `literal_index`,
    /// along with its mirror.
    pub(crate) fn del_binary(&mut self, literal_index: u32) {
        let list = &mut self.binary[literal_index as usize];
        debug_assert!(!list.is_empty());

        let Some(implied) = list.pop() else {
            return;
        };

        let mirror = self.binary[implied.negate().index()].pop();
        debug_assert_eq!(
            mirror,
            Some(CLiteral::from_index(literal_index as usize).negate())
        );

        self.counters.del_binary += 1;
    }

    /// Transcribe the commit of `l1` ∨ `l2`, in its hypothesis context.
    pub(crate) fn validate_binary(&mut self, l1: CLiteral, l2: CLiteral) {
        if self.mode == Mode::Searching {
            if let Some(transcriber) = self.transcriber.as_mut() {
                transcriber.transcribe_addition(&self.assumptions, &[l1, l2]);
            }
        }
    }

    /// Transcribe the commit of the unit `literal`, in its hypothesis
    /// context.
    pub(crate) fn validate_assign(&mut self, literal: CLiteral) {
        if self.config.drat.value && self.mode == Mode::Searching {
            if let Some(transcriber) = self.transcriber.as_mut() {
                transcriber.transcribe_addition(&self.assumptions, &[literal]);
            }
        }
    }

    /// Open a fresh implication stamp epoch.
    pub(crate) fn inc_bstamp(&mut self) {
        self.bstamp_id = self.bstamp_id.wrapping_add(1);
        if self.bstamp_id == 0 {
            self.bstamp_id = 1;
            self.bstamp.iter_mut().for_each(|stamp| *stamp = 0);
        }
    }

    /// Mark `literal` in the current epoch.
    #[inline]
    pub(crate) fn set_bstamp(&mut self, literal: CLiteral) {
        self.bstamp[literal.index()] = self.bstamp_id;
    }

    /// Whether `literal` is marked in the current epoch.
    #[inline]
    pub(crate) fn is_bstamped(&self, literal: CLiteral) -> bool {
        self.bstamp[literal.index()] == self.bstamp_id
    }

    /// Open a fresh epoch and mark `literal` together with everything it
    /// implies.
    pub(crate) fn set_bstamps(&mut self, literal: CLiteral) {
        self.inc_bstamp();
        self.set_bstamp(literal);
        for index in 0..self.binary[literal.index()].len() {
            let implied = self.binary[literal.index()][index];
            self.set_bstamp(implied);
        }
    }

    /// One step transitive closure of `u` ∨ `v` through `v`'s adjacency.
    /// Returns false if a unit was learnt instead.
    ///
    /// Requires every implicant of ¬`u` to be marked in the current epoch.
    pub(crate) fn add_tc1(&mut self, u: CLiteral, v: CLiteral) -> bool {
        let count = self.binary[v.index()].len();
        for index in 0..count {
            // ¬v ∨ w
            let w = self.binary[v.index()][index];
            if !self.is_fixed(w) {
                if self.is_bstamped(w.negate()) {
                    // u ∨ v, ¬v ∨ w, u ∨ ¬w, so u is a unit
                    log::trace!(target: targets::BINARY, "Closure unit {u}.");
                    self.assign(u);
                    return false;
                }
                if self.tc1_count < self.config.tc1_limit.value {
                    self.tc1_count += 1;
                    self.counters.tc1_binaries += 1;
                    self.add_binary(u, w);
                }
            }
        }
        true
    }

    /// Main routine for adding the binary clause `u` ∨ `v` dynamically.
    ///
    /// The clause is only recorded when neither the stamped index nor its
    /// one step closure show a stronger consequence.
    pub(crate) fn try_add_binary(&mut self, u: CLiteral, v: CLiteral) {
        debug_assert_eq!(self.mode, Mode::Searching);
        debug_assert!(u.atom() != v.atom());

        self.set_bstamps(u.negate());
        if self.is_bstamped(v.negate()) {
            // u ∨ ¬v and u ∨ v, so u is a unit
            self.assign(u);
        } else if !self.is_bstamped(v) && self.add_tc1(u, v) {
            // u ∨ v is not in the index
            self.set_bstamps(v.negate());
            if self.is_bstamped(u.negate()) {
                // v ∨ ¬u and u ∨ v, so v is a unit
                self.assign(v);
            } else if self.add_tc1(v, u) {
                self.update_prefix(u);
                self.update_prefix(v);
                self.add_binary(u, v);
            }
        }
    }
}

#[cfg(test)]
mod binary_tests {
    use crate::{
        config::Config,
        context::Engine,
        structures::literal::{CLiteral, Literal},
    };

    /// An engine with `atoms` fresh atoms and rebuilt working databases.
    fn fixture(atoms: u32) -> Engine {
        let mut engine = Engine::from_config(Config::default());
        for _ in 0..atoms {
            engine.fresh_atom();
        }
        engine.enter_op();
        engine
    }

    #[test]
    fn addition_is_symmetric() {
        let mut engine = fixture(2);
        let p = CLiteral::new(0, true);
        let q = CLiteral::new(1, true);

        engine.add_binary(p, q);

        // ¬p implies q and ¬q implies p
        assert_eq!(engine.binary[p.negate().index()], vec![q]);
        assert_eq!(engine.binary[q.negate().index()], vec![p]);
    }

    #[test]
    fn tautology_rejected() {
        let mut engine = fixture(1);
        let p = CLiteral::new(0, true);

        engine.add_binary(p, p.negate());

        assert!(engine.binary.iter().all(|list| list.is_empty()));
        assert_eq!(engine.counters.add_binary, 0);
    }

    #[test]
    fn repeat_tail_skipped() {
        let mut engine = fixture(2);
        let p = CLiteral::new(0, true);
        let q = CLiteral::new(1, true);

        engine.add_binary(p, q);
        engine.add_binary(p, q);

        assert_eq!(engine.binary[p.negate().index()].len(), 1);
    }

    #[test]
    fn deletion_restores_both_lists() {
        let mut engine = fixture(2);
        let p = CLiteral::new(0, true);
        let q = CLiteral::new(1, true);

        engine.add_binary(p, q);
        let logged = *engine.binary_trail.last().unwrap();
        engine.del_binary(logged);

        assert!(engine.binary[p.negate().index()].is_empty());
        assert!(engine.binary[q.negate().index()].is_empty());
    }

    #[test]
    fn closure_respects_budget() {
        let run = |budget: u64| -> u64 {
            let mut config = Config::default();
            config.tc1_limit.value = budget;
            let mut engine = Engine::from_config(config);
            for _ in 0..5 {
                engine.fresh_atom();
            }
            engine.enter_op();

            let u = CLiteral::new(0, true);
            let v = CLiteral::new(1, true);
            // v implies three distinct literals, each a closure candidate
            for atom in 2..5 {
                engine.add_binary(v.negate(), CLiteral::new(atom, true));
            }

            engine.try_add_binary(u, v);
            engine.counters.tc1_binaries
        };

        assert_eq!(run(0), 0);
        assert_eq!(run(2), 2);
        assert_eq!(run(64), 3);
    }
}
