/*!
Strongly connected components of the binary implication graph, and the
lookahead forest derived from them.

# Overview

Literals implying one another are interchangeable for probing, so before
computing probe scores the candidate literals are decomposed into strongly
connected components and only one representative per component enters the
lookahead table.
A component containing both a literal and its negation is a contradiction,
noted on the spot.

The decomposition is an *iterative* Tarjan search: the recursion stack,
the component stack, and the settled order all live as linked chains
threaded through one record per literal, so the depth of the formula never
translates into call stack depth.
Arcs are added in the opposite direction of implications, and each edge of
the graph is added once by orienting on literal index.

# The forest

The settled chain comes out topologically sorted, members of a component
adjacent with their representative last.
A second pass assigns each representative a *height*, one more than the
highest representative it can reach in one implication, and splices it
under the witness of that height.
The result is a forest in which a parent's probe subsumes part of its
children's propagations, which the lookahead pass exploits by letting
scores flow from parent to child.

A final pre-order traversal flattens the forest into the lookahead table:
each node contributes its component representative as a probe literal, an
even level offset from its post-order position, and a parent pointer
rewritten to the representative of its forest parent.
*/

use crate::{
    context::GenericEngine,
    misc::log::targets::{self},
    structures::{
        atom::Atom,
        literal::{CLiteral, Literal},
    },
};

use super::lookahead::LookaheadEntry;

/// The rank marking a literal whose component is settled.
const SETTLED: u32 = u32::MAX;

/// The record of the component search, one per literal.
#[derive(Clone, Copy, Debug, Default)]
pub struct DfsInfo {
    /// Visit order while unsettled, [SETTLED] once the component is known,
    /// and the lookahead table position after table construction.
    pub rank: u32,

    /// The height of the literal's component representative in the forest.
    pub height: u32,

    /// The DFS parent while searching, the component representative once
    /// settled, and the parent probe literal after table construction.
    pub parent: Option<CLiteral>,

    /// Chains the active stack, then the settled order, then forest
    /// siblings.
    pub link: Option<CLiteral>,

    /// The lowest ranked literal known reachable, while searching.
    pub min: Option<CLiteral>,

    /// The first forest child, for representatives.
    pub child: Option<CLiteral>,

    /// The highest rated literal of the component, for representatives.
    pub vcomp: Option<CLiteral>,
}

impl<R: rand::Rng + std::default::Default> GenericEngine<R> {
    /// Decompose the candidate literals into strongly connected
    /// components, noting a conflict if some component is contradictory.
    pub(crate) fn get_scc(&mut self) {
        let count = self.candidates.len();
        self.init_scc();

        let mut index = 0;
        while index < count && !self.inconsistent {
            let literal = CLiteral::new(self.candidates[index].atom, true);
            if self.dfs[literal.index()].rank == 0 {
                self.scc_from(literal);
            }
            if self.dfs[literal.negate().index()].rank == 0 {
                self.scc_from(literal.negate());
            }
            index += 1;
        }
    }

    /// Reset the per literal records and lay out the arcs.
    fn init_scc(&mut self) {
        self.inc_bstamp();

        for index in 0..self.candidates.len() {
            let literal = CLiteral::new(self.candidates[index].atom, true);
            for literal in [literal, literal.negate()] {
                self.dfs[literal.index()] = DfsInfo::default();
                self.arcs[literal.index()].clear();
                self.set_bstamp(literal);
            }
        }

        for index in 0..self.candidates.len() {
            let literal = CLiteral::new(self.candidates[index].atom, true);
            self.init_arcs(literal);
            self.init_arcs(literal.negate());
        }

        self.rank_counter = 0;
        self.active = None;
        self.settled = None;
    }

    /// Arcs are added in the opposite direction of implications: for the
    /// implication `from` → *u* the arcs *u* → `from` and ¬`from` → ¬*u*
    /// are added, once per edge by orienting on index.
    fn init_arcs(&mut self, from: CLiteral) {
        for index in 0..self.binary[from.index()].len() {
            let to = self.binary[from.index()][index];
            debug_assert!(to != from);
            if to.index() > from.index() && self.is_bstamped(to) {
                self.add_arc(from.negate(), to.negate());
                self.add_arc(to, from);
            }
        }
    }

    #[inline]
    fn add_arc(&mut self, from: CLiteral, to: CLiteral) {
        self.arcs[from.index()].push(to);
    }

    /// The iterative depth first search from `start`, settling every
    /// component it reaches.
    fn scc_from(&mut self, start: CLiteral) {
        log::trace!(target: targets::SCC, "Search from {start}.");
        self.dfs[start.index()].parent = None;
        self.activate(start);

        let mut position: Option<CLiteral> = Some(start);
        while let Some(v) = position {
            if self.inconsistent {
                break;
            }

            let low = self.dfs[v.index()].min;

            match self.arcs[v.index()].pop() {
                Some(u) => {
                    let rank = self.dfs[u.index()].rank;
                    if rank > 0 {
                        // u was processed before the current minimum
                        let low_rank = low.map_or(0, |l| self.dfs[l.index()].rank);
                        if rank < low_rank {
                            self.dfs[v.index()].min = Some(u);
                        }
                    } else {
                        // process u in DFS order, v backs the stack
                        self.dfs[u.index()].parent = Some(v);
                        position = Some(u);
                        self.activate(u);
                    }
                }

                None => {
                    let parent = self.dfs[v.index()].parent;
                    if low == Some(v) {
                        self.settle_component(v);
                    } else if let Some(p) = parent {
                        let low_rank = low.map_or(0, |l| self.dfs[l.index()].rank);
                        let parent_low = self.dfs[p.index()].min;
                        let parent_low_rank =
                            parent_low.map_or(0, |l| self.dfs[l.index()].rank);
                        if low_rank < parent_low_rank {
                            self.dfs[p.index()].min = low;
                        }
                    }
                    // walk back in the DFS stack
                    position = parent;
                }
            }
        }
    }

    /// Push `literal` onto the active chain with the next rank.
    fn activate(&mut self, literal: CLiteral) {
        debug_assert_eq!(self.dfs[literal.index()].rank, 0);
        self.rank_counter += 1;
        self.dfs[literal.index()].rank = self.rank_counter;
        self.dfs[literal.index()].link = self.active;
        self.dfs[literal.index()].min = Some(literal);
        self.active = Some(literal);
    }

    /// Close the component rooted at `v`: make `v` the representative of
    /// every member above it on the active chain, and elect the highest
    /// rated member as the probe literal.
    fn settle_component(&mut self, v: CLiteral) {
        let chain_head = self.active;
        self.active = self.dfs[v.index()].link;

        let mut best = v;
        let mut best_rating = self.rating[v.atom() as usize];

        self.dfs[v.index()].rank = SETTLED;
        self.dfs[v.index()].link = self.settled;
        self.settled = chain_head;

        let mut member = chain_head;
        while member != Some(v) {
            let Some(t) = member else {
                debug_assert!(false, "component root left the active chain");
                break;
            };

            if t == v.negate() {
                log::trace!(target: targets::SCC, "Contradiction at {v}.");
                self.set_conflict();
                break;
            }

            self.dfs[t.index()].rank = SETTLED;
            self.dfs[t.index()].parent = Some(v);

            let rating = self.rating[t.atom() as usize];
            if rating > best_rating {
                best = t;
                best_rating = rating;
            }

            member = self.dfs[t.index()].link;
        }

        self.dfs[v.index()].parent = Some(v);
        self.dfs[v.index()].vcomp = Some(best);

        // if the complementary component settled first, mirror its probe
        if self.dfs[v.negate().index()].rank == SETTLED {
            let complement_rep = self.dfs[v.negate().index()]
                .parent
                .expect("settled literal without a representative");
            if let Some(probe) = self.dfs[complement_rep.index()].vcomp {
                self.dfs[v.index()].vcomp = Some(probe.negate());
            }
        }
    }

    /// The forest child of `node`, where `None` stands for the roots.
    fn get_child(&self, node: Option<CLiteral>) -> Option<CLiteral> {
        match node {
            None => self.root_child,
            Some(u) => self.dfs[u.index()].child,
        }
    }

    /// Set the forest child of `node`.
    fn set_child(&mut self, node: Option<CLiteral>, child: Option<CLiteral>) {
        match node {
            None => self.root_child = child,
            Some(u) => self.dfs[u.index()].child = child,
        }
    }

    /// Assign heights to the component representatives and splice each
    /// under its deepest-child witness in the forest.
    ///
    /// Relies on the settled chain being topologically sorted, members of
    /// a component together with the representative last.
    pub(crate) fn find_heights(&mut self) {
        self.root_child = None;
        let mut class_parent: Option<CLiteral> = None;
        let mut height = 0_u32;
        let mut witness: Option<CLiteral> = None;

        let mut position = self.settled;
        while let Some(u) = position {
            let next = self.dfs[u.index()].link;
            let parent = self.dfs[u.index()].parent;

            if parent != class_parent {
                // a new component begins
                height = 0;
                witness = None;
                class_parent = parent;
            }

            // traverse nodes in order of implication
            for index in 0..self.binary[u.negate().index()].len() {
                let target = self.binary[u.negate().index()][index].negate();
                let target_parent = self.dfs[target.index()].parent;

                // members of the same component are processed as a whole
                if target_parent == parent {
                    continue;
                }
                let Some(tp) = target_parent else {
                    continue;
                };

                let reached = self.dfs[tp.index()].height;
                if reached >= height {
                    height = reached + 1;
                    witness = Some(tp);
                }
            }

            if parent == Some(u) {
                // u is a representative, processed last in its component
                let sibling = self.get_child(witness);
                self.dfs[u.index()].height = height;
                self.set_child(Some(u), None);
                self.dfs[u.index()].link = sibling;
                self.set_child(witness, Some(u));
            }

            position = next;
        }
    }

    /// Flatten the forest into the lookahead table by pre-order traversal:
    /// rank becomes the table position, the offset is twice the post-order
    /// position, and parents are rewritten to probe literals.
    pub(crate) fn construct_lookahead_table(&mut self) {
        debug_assert!(self.lookahead.is_empty());

        let mut position = self.get_child(None);
        let mut above: Option<CLiteral> = None;
        let mut offset = 0_u32;

        while let Some(u) = position {
            self.dfs[u.index()].rank = self.lookahead.len() as u32;
            let probe = self.dfs[u.index()].vcomp.expect("node without a probe literal");
            self.lookahead.push(LookaheadEntry {
                literal: probe,
                offset: 0,
            });

            if let Some(child) = self.dfs[u.index()].child {
                self.dfs[u.index()].parent = above;
                above = Some(u);
                position = Some(child);
            } else {
                let mut node = u;
                loop {
                    let table_position = self.dfs[node.index()].rank as usize;
                    self.lookahead[table_position].offset = offset;
                    offset += 2;

                    self.dfs[node.index()].parent = match above {
                        None => None,
                        Some(up) => self.dfs[up.index()].vcomp,
                    };

                    match self.dfs[node.index()].link {
                        None if above.is_some() => {
                            // the subtree is exhausted, finalise the parent
                            let up = above.expect("checked above");
                            node = up;
                            above = self.dfs[up.index()].parent;
                        }

                        next => {
                            position = next;
                            break;
                        }
                    }
                }
            }
        }

        debug_assert_eq!(2 * self.lookahead.len() as u32, offset);
    }

    /// The equivalence root of `atom`: the representative of its positive
    /// literal, canonicalised to the largest variable in the class.
    pub(crate) fn get_root(&self, atom: Atom) -> CLiteral {
        let literal = CLiteral::new(atom, true);
        let r1 = self.dfs[literal.index()].parent.unwrap_or(literal);
        let r1_positive = CLiteral::new(r1.atom(), true);
        let r2 = self.dfs[r1_positive.index()].parent.unwrap_or(r1_positive);

        if r1.atom() >= r2.atom() {
            r1
        } else if !r1.polarity() {
            r2.negate()
        } else {
            r2
        }
    }
}
