/*!
Assignment, the trail, and truth stamps.

# The truth level ladder

Every assignment is stamped with the truth level it was made at, and the
stamp array *is* the assignment array: an atom with stamp zero is
unassigned, and otherwise the low bit of the stamp carries the polarity
while the remaining bits carry the level.

A literal is *fixed* relative to a level exactly when its stamp is at least
that level.
[FIXED_TRUTH] is the level of real search decisions, and every hypothetical
probe runs at some lower, even, level.
This is what lets search and many nested probes share one array without
copying: a probe at level *L* sees search assignments (stamped at
[FIXED_TRUTH]) and assignments of enclosing probes (stamped above *L*), but
not the residue of abandoned sibling probes, whose stamps fall below *L*
and so read as unassigned.
Abandoning a probe therefore costs nothing beyond truncating the trail at a
checkpoint.

# Reversibility

[push](crate::context::GenericEngine) snapshots the length of every
structure propagation can grow: the trail, the binary deletion trail, both
retirement stacks, the synthesis budget, and the propagation queue head.
[pop](crate::context::GenericEngine) restores each, re-attaching retired
constraints in reverse of their retirement and deleting binaries appended
since the snapshot.

# The prefix filter

The path of decisions taken is fingerprinted in a 64 bit prefix, one bit
per decision, flipped at the failing depth on each backtrack.
Each atom caches the prefix it was last relevant under, and pre-selection
skips atoms whose cached prefix still matches the current branch: nothing
on the path to them has changed, so their candidacy has not either.
*/

use crate::{
    context::{GenericEngine, Mode},
    misc::log::targets::{self},
    structures::{
        atom::Atom,
        literal::{CLiteral, Literal},
    },
};

/// A truth level, as stored in the high bits of a stamp.
pub type TruthLevel = u32;

/// The level of top level search decisions.
/// Hypothetical levels stay strictly below, leaving the level even.
pub const FIXED_TRUTH: TruthLevel = u32::MAX - 1;

/// The branch context an atom's rating was last considered in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VarPrefix {
    /// The low 32 bits of the branch prefix at the time.
    pub prefix: u32,

    /// The branch depth at the time.
    pub length: u32,
}

impl<R: rand::Rng + std::default::Default> GenericEngine<R> {
    /// Whether `literal` is assigned, relative to the current level.
    #[inline]
    pub(crate) fn is_fixed(&self, literal: CLiteral) -> bool {
        self.stamp[literal.atom() as usize] >= self.level
    }

    /// Whether `literal` is assigned, relative to `level`.
    #[inline]
    pub(crate) fn is_fixed_at(&self, literal: CLiteral, level: TruthLevel) -> bool {
        self.stamp[literal.atom() as usize] >= level
    }

    /// Whether `literal` is unassigned, relative to the current level.
    #[inline]
    pub(crate) fn is_undef(&self, literal: CLiteral) -> bool {
        !self.is_fixed(literal)
    }

    /// Whether `literal` is true, relative to the current level.
    #[inline]
    pub(crate) fn is_true(&self, literal: CLiteral) -> bool {
        self.is_fixed(literal)
            && (self.stamp[literal.atom() as usize] & 1 == 0) == literal.polarity()
    }

    /// Whether `literal` is false, relative to the current level.
    #[inline]
    pub(crate) fn is_false(&self, literal: CLiteral) -> bool {
        self.is_fixed(literal)
            && (self.stamp[literal.atom() as usize] & 1 == 0) != literal.polarity()
    }

    /// Stamp `literal` true at the current level.
    #[inline]
    pub(crate) fn set_true(&mut self, literal: CLiteral) {
        self.stamp[literal.atom() as usize] = self.level + !literal.polarity() as TruthLevel;
    }

    /// Clear the stamp of `atom`.
    #[inline]
    pub(crate) fn set_undef(&mut self, atom: Atom) {
        self.stamp[atom as usize] = 0;
    }

    /// Stamp `literal` with the level of `parent`, keeping `literal`'s
    /// polarity.
    /// Used when a probe shows `literal` equivalent to its forest parent.
    pub(crate) fn adopt_stamp(&mut self, literal: CLiteral, parent: CLiteral) {
        self.stamp[literal.atom() as usize] =
            (self.stamp[parent.atom() as usize] & !1) + !literal.polarity() as TruthLevel;
    }

    /// Note a conflict with the current assignment.
    #[inline]
    pub(crate) fn set_conflict(&mut self) {
        self.inconsistent = true;
    }

    /// The number of hypotheses currently pushed.
    #[inline]
    pub(crate) fn scope_lvl(&self) -> usize {
        self.trail_lim.len()
    }

    /// Make `literal` true at the current level, appending to the trail.
    ///
    /// Assigning a literal whose negation holds notes a conflict instead;
    /// assigning a literal which already holds is a no-op.
    pub(crate) fn assign(&mut self, literal: CLiteral) {
        debug_assert!(self.level > 0);

        if self.is_undef(literal) {
            log::trace!(target: targets::PROPAGATION, "Assign {literal} at {}.", self.level);
            self.set_true(literal);
            self.trail.push(literal);

            if self.mode == Mode::Searching {
                self.counters.propagations += 1;
                self.freevars.remove(literal.atom());
                self.validate_assign(literal);
            }
        } else if self.is_false(literal) {
            log::trace!(target: targets::PROPAGATION, "Conflict on {literal} at {}.", self.level);
            self.validate_assign(literal);
            self.set_conflict();
        }
    }

    /// Assign a literal forced by a clause, additionally noting it as a
    /// windfall when probing.
    pub(crate) fn propagated(&mut self, literal: CLiteral) {
        self.assign(literal);
        if self.mode == Mode::Lookahead1 {
            self.wstack.push(literal);
        }
    }

    /// Push `literal` as a hypothesis at `level`: snapshot every reversible
    /// structure, assign, and propagate.
    pub(crate) fn push(&mut self, literal: CLiteral, level: TruthLevel) {
        debug_assert_eq!(self.mode, Mode::Searching);

        self.binary_trail_lim.push(self.binary_trail.len());
        self.trail_lim.push(self.trail.len());
        self.tc1_count_lim.push(self.tc1_count);
        self.retired_clause_lim.push(self.retired_clauses.len());
        self.retired_ternary_lim.push(self.retired_ternary.len());
        self.qhead_lim.push(self.qhead);

        self.assumptions.push(literal.negate());

        let enclosing = self.level;
        self.level = level;
        self.assign(literal);
        self.propagate();
        self.level = enclosing;
    }

    /// Undo the most recent [push](GenericEngine::push), restoring every
    /// reversible structure to its snapshot.
    pub(crate) fn pop(&mut self) {
        debug_assert_eq!(self.mode, Mode::Searching);

        self.assumptions.pop();
        self.inconsistent = false;

        // Assignments, with each undone atom returned to the free set.
        let trail_size = self.trail_lim.pop().expect("pop without a push");
        for index in (trail_size..self.trail.len()).rev() {
            let literal = self.trail[index];
            self.set_undef(literal.atom());
            self.freevars.insert(literal.atom());
        }
        self.trail.truncate(trail_size);

        self.tc1_count = self.tc1_count_lim.pop().expect("pop without a push");

        // Retired constraints are re-attached in reverse of retirement.
        let retired_size = self.retired_clause_lim.pop().expect("pop without a push");
        for index in (retired_size..self.retired_clauses.len()).rev() {
            let reference = self.retired_clauses[index];
            self.attach_clause(reference);
        }
        self.retired_clauses.truncate(retired_size);

        let ternary_size = self.retired_ternary_lim.pop().expect("pop without a push");
        for index in (ternary_size..self.retired_ternary.len()).rev() {
            let ternary = self.retired_ternary[index];
            self.attach_ternary(ternary.u, ternary.v, ternary.w);
        }
        self.retired_ternary.truncate(ternary_size);

        // Binaries appended since the snapshot, deleted in reverse.
        let binary_size = self.binary_trail_lim.pop().expect("pop without a push");
        for index in (binary_size..self.binary_trail.len()).rev() {
            let literal_index = self.binary_trail[index];
            self.del_binary(literal_index);
        }
        self.binary_trail.truncate(binary_size);

        self.qhead = self.qhead_lim.pop().expect("pop without a push");
    }

    /// Recover from a conflict by popping hypotheses, flipping the branch
    /// prefix, and asserting negations.
    /// Returns false when `decisions` is exhausted while still
    /// inconsistent, i.e. when the formula is unsatisfiable.
    pub(crate) fn backtrack(&mut self, decisions: &mut Vec<CLiteral>) -> bool {
        while self.inconsistent {
            let Some(decision) = decisions.pop() else {
                return false;
            };
            log::trace!(target: targets::BACKTRACK, "Backtrack over {decision}.");
            self.pop();
            self.flip_prefix();
            self.assign(decision.negate());
            self.propagate();
        }
        true
    }

    /// Flip the prefix bit at the current depth, marking the branch about
    /// to be taken as the other side of the failed one.
    pub(crate) fn flip_prefix(&mut self) {
        if self.trail_lim.len() < 64 {
            let mask = 1_u64 << self.trail_lim.len();
            self.prefix = mask | (self.prefix & (mask - 1));
        }
    }

    /// Cache the current branch context on `literal`'s atom, if the cached
    /// context no longer matches.
    pub(crate) fn update_prefix(&mut self, literal: CLiteral) {
        let atom = literal.atom() as usize;
        let cached = self.vprefix[atom];
        let mask = (1_u32 << cached.length.min(31)) - 1;

        if cached.length as usize >= self.trail_lim.len()
            || (cached.prefix & mask) as u64 != (self.prefix & mask as u64)
        {
            self.vprefix[atom] = VarPrefix {
                prefix: self.prefix as u32,
                length: self.trail_lim.len() as u32,
            };
        }
    }

    /// Whether `atom`'s cached branch context is a prefix of the current
    /// branch, i.e. whether nothing on the path to it has changed.
    pub(crate) fn active_prefix(&self, atom: Atom) -> bool {
        let depth = self.trail_lim.len() as u32;
        let cached = self.vprefix[atom as usize];

        if cached.length > depth {
            return false;
        }
        if cached.length == depth || cached.length >= 31 {
            return self.prefix == cached.prefix as u64;
        }
        let mask = (1_u32 << cached.length.min(31)) - 1;
        (self.prefix & mask as u64) == (cached.prefix & mask) as u64
    }
}
