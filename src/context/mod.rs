/*!
The engine --- to which formulas are added and within which searches take
place, etc.

Strictly, a [GenericEngine] and an [Engine].

The generic engine is parameterised to a source of randomness, used in one
place: breaking ties between equally scored branching literals.
[Engine] fixes the source to the crate's [SplitMix64](crate::generic::splitmix).

# Orientation

At a high level the engine is a handful of databases sharing one assignment
array:

- The *formula*, recorded through [add_clause](GenericEngine::add_clause),
  kept verbatim so every public operation starts from the same input.
- The *binary implication graph*, with one adjacency list per literal and a
  deletion trail making additions reversible.
- The *clause arena* of long clauses, examined through watch lists.
- The *trail* of assignments, where each assignment is stamped with the
  truth level it was made at.
  The stamp is what lets search and many nested hypothetical probes share
  the one array: an assignment is visible at a level only if its stamp is at
  least that level, and levels are chosen so that the stamps of abandoned
  probes are simply out-ranked rather than erased.

Public operations:

- [search](GenericEngine::search) --- decide satisfiability.
- [simplify](GenericEngine::simplify) --- one lookahead pass from the root,
  returning the units it forces.
- [scc](GenericEngine::scc) --- equivalence classes of the binary
  implication graph.
- [select_lookahead](GenericEngine::select_lookahead) --- the branching
  literal the engine would probe next, under given assumptions.

Each operation rebuilds the working databases from the recorded formula, so
clauses may be added freely between operations.

# Example

```rust
# use lynx_sat::config::Config;
# use lynx_sat::context::Engine;
# use lynx_sat::reports::Report;
# use lynx_sat::structures::literal::{CLiteral, Literal};
let mut engine = Engine::from_config(Config::default());

let p = engine.fresh_atom();
let q = engine.fresh_atom();

let p_or_q = vec![CLiteral::new(p, true), CLiteral::new(q, true)];
engine.add_clause(p_or_q).unwrap();
engine.add_clause(CLiteral::new(p, false)).unwrap();

assert_eq!(engine.search().unwrap(), Report::Satisfiable);
assert_eq!(engine.value_of(q), Some(true));
```
*/

mod counters;
pub use counters::Counters;
mod specific;
pub use specific::Engine;

use std::collections::HashSet;
use std::time::Instant;

use crate::{
    config::Config,
    db::{
        clause::{ClauseArena, ClauseRef},
        trail::{TruthLevel, VarPrefix, FIXED_TRUTH},
        watch::{Ternary, WatchList, Watcher},
    },
    extension::Extension,
    generic::sparse_set::SparseSet,
    procedures::{
        lookahead::{LitInfo, LookaheadEntry},
        preselect::Candidate,
        scc::DfsInfo,
    },
    reports::{drat::Transcriber, Report},
    structures::{
        atom::Atom,
        clause::CClause,
        literal::{CLiteral, Literal},
    },
    types::err::{self, BuildError},
};

/// The state of an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EngineState {
    /// Clauses may be recorded; no operation has concluded since.
    Input,

    /// A public operation is underway.
    Solving,

    /// The recorded formula was found satisfiable.
    Satisfiable,

    /// The recorded formula was found unsatisfiable.
    Unsatisfiable,

    /// The last operation was interrupted before a conclusion.
    Unknown,
}

/// The mode a propagation happens in.
///
/// The modes share one propagation routine and differ only in side effects:
/// search commits and synthesises binaries, a first level probe scores and
/// collects windfalls, a second level probe does neither.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Top level search: effects are permanent until explicitly popped.
    Searching,

    /// A single lookahead probe.
    Lookahead1,

    /// A probe nested within double lookahead.
    Lookahead2,
}

/// Whether recording a clause changed the formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClauseOk {
    /// The clause was recorded.
    Added,

    /// The clause was a tautology, and skipped.
    Skipped,
}

/// A generic engine, parameterised to a source of randomness.
///
/// Requires a source of [rng](rand::Rng) which (also) implements
/// [Default](std::default::Default).
pub struct GenericEngine<R: rand::Rng + std::default::Default> {
    /// The configuration of the engine.
    pub config: Config,

    /// Counters related to the engine.
    pub counters: Counters,

    /// The status of the engine.
    pub state: EngineState,

    /// The source of rng.
    pub rng: R,

    // The recorded formula.
    /// The number of atoms issued.
    pub(crate) atom_count: Atom,

    /// Every recorded clause, verbatim.
    pub(crate) formula: Vec<CClause>,

    /// Atoms an external simplifier has eliminated, to be skipped.
    pub(crate) eliminated: Vec<bool>,

    /// External constraint watches to install at initialisation.
    pub(crate) external_watches: Vec<(CLiteral, u32)>,

    /// The external constraint propagator, if any.
    pub(crate) extension: Option<Box<dyn Extension>>,

    // Assignment and trail.
    /// Per atom, the truth stamp: zero if unassigned, otherwise the level
    /// the atom was assigned at with the polarity in the low bit.
    pub(crate) stamp: Vec<TruthLevel>,

    /// The truth level assignments are currently made at.
    pub(crate) level: TruthLevel,

    /// Literals assigned true, in assignment order.
    pub(crate) trail: Vec<CLiteral>,

    /// Per push, the trail length at the time.
    pub(crate) trail_lim: Vec<usize>,

    /// The propagation queue head: trail entries before it are propagated.
    pub(crate) qhead: usize,

    /// Per push, the queue head at the time.
    pub(crate) qhead_lim: Vec<usize>,

    /// Atoms without a value, maintained in search mode only.
    pub(crate) freevars: SparseSet,

    /// Whether a conflict has been observed and not yet recovered from.
    pub(crate) inconsistent: bool,

    /// The mode of the present propagation.
    pub(crate) mode: Mode,

    /// The negations of the hypotheses pushed so far, prefixed to DRAT
    /// steps as their justification context.
    pub(crate) assumptions: Vec<CLiteral>,

    // The binary implication graph.
    /// Per literal, the literals it implies.
    pub(crate) binary: Vec<Vec<CLiteral>>,

    /// Literal indicies whose adjacency grew, in order, for deletion.
    pub(crate) binary_trail: Vec<u32>,

    /// Per push, the binary trail length at the time.
    pub(crate) binary_trail_lim: Vec<usize>,

    /// Per literal, the epoch of its last implication stamp.
    pub(crate) bstamp: Vec<u32>,

    /// The current implication stamp epoch.
    pub(crate) bstamp_id: u32,

    /// Binaries synthesised by transitive closure so far.
    pub(crate) tc1_count: u64,

    /// Per push, the synthesis count at the time.
    pub(crate) tc1_count_lim: Vec<u64>,

    // The clause arena and its watches.
    /// Long clauses (ternaries included, for full occurrence scans).
    pub(crate) arena: ClauseArena,

    /// Per literal, the constraints to re-examine when it becomes true.
    pub(crate) watches: Vec<WatchList>,

    /// Per literal, every arena clause containing its negation.
    pub(crate) full_watches: Vec<Vec<ClauseRef>>,

    /// Long clauses retired during propagation, in retirement order.
    pub(crate) retired_clauses: Vec<ClauseRef>,

    /// Per push, the retired clause count at the time.
    pub(crate) retired_clause_lim: Vec<usize>,

    /// Ternary clauses retired during propagation, in retirement order.
    pub(crate) retired_ternary: Vec<Ternary>,

    /// Per push, the retired ternary count at the time.
    pub(crate) retired_ternary_lim: Vec<usize>,

    // Pre-selection.
    /// Iterates of the scoring fixpoint, each a per literal table.
    pub(crate) h: Vec<Vec<f64>>,

    /// The index into `h` of the scores currently in use.
    pub(crate) heur: usize,

    /// Per atom, the product of its two literal scores.
    pub(crate) rating: Vec<f64>,

    /// The candidates surviving pre-selection.
    pub(crate) candidates: Vec<Candidate>,

    /// When non-empty, restricts candidates to these atoms.
    pub(crate) select_vars: HashSet<Atom>,

    // Strongly connected components.
    /// Per literal, the record of the component search.
    pub(crate) dfs: Vec<DfsInfo>,

    /// Per literal, its unexplored arcs.
    pub(crate) arcs: Vec<Vec<CLiteral>>,

    /// Literals ranked so far in the component search.
    pub(crate) rank_counter: u32,

    /// Head of the chain of literals on the component stack.
    pub(crate) active: Option<CLiteral>,

    /// Head of the chain of literals whose component is settled.
    pub(crate) settled: Option<CLiteral>,

    /// The first root of the lookahead forest.
    pub(crate) root_child: Option<CLiteral>,

    // The lookahead table.
    /// Probe literals in forest pre-order, with their level offsets.
    pub(crate) lookahead: Vec<LookaheadEntry>,

    /// Per literal, its probe score and double lookahead epoch.
    pub(crate) lits: Vec<LitInfo>,

    /// The current double lookahead epoch.
    pub(crate) istamp_id: u32,

    /// Literals forced during the present probe.
    pub(crate) wstack: Vec<CLiteral>,

    /// The weighted new binary score of the present probe.
    pub(crate) weighted_new_binaries: f64,

    /// The score a probe must reach to trigger double lookahead.
    pub(crate) delta_trigger: f64,

    // The prefix filter.
    /// The path signature of the current branch, one bit per decision.
    pub(crate) prefix: u64,

    /// Per atom, the branch context its rating was last considered in.
    pub(crate) vprefix: Vec<VarPrefix>,

    // Results and plumbing.
    /// The satisfying assignment, populated when search concludes with one.
    pub(crate) model: Vec<Option<bool>>,

    /// The DRAT transcriber, if a sink has been supplied.
    pub(crate) transcriber: Option<Transcriber>,

    /// When the present public operation began.
    pub(crate) started: Option<Instant>,
}

impl<R: rand::Rng + std::default::Default> GenericEngine<R> {
    /// An engine using `rng` as its source of randomness.
    pub fn with_rng(config: Config, rng: R) -> Self {
        GenericEngine {
            config,
            counters: Counters::default(),
            state: EngineState::Input,
            rng,

            atom_count: 0,
            formula: Vec::default(),
            eliminated: Vec::default(),
            external_watches: Vec::default(),
            extension: None,

            stamp: Vec::default(),
            level: FIXED_TRUTH,
            trail: Vec::default(),
            trail_lim: Vec::default(),
            qhead: 0,
            qhead_lim: Vec::default(),
            freevars: SparseSet::default(),
            inconsistent: false,
            mode: Mode::Searching,
            assumptions: Vec::default(),

            binary: Vec::default(),
            binary_trail: Vec::default(),
            binary_trail_lim: Vec::default(),
            bstamp: Vec::default(),
            bstamp_id: 0,
            tc1_count: 0,
            tc1_count_lim: Vec::default(),

            arena: ClauseArena::default(),
            watches: Vec::default(),
            full_watches: Vec::default(),
            retired_clauses: Vec::default(),
            retired_clause_lim: Vec::default(),
            retired_ternary: Vec::default(),
            retired_ternary_lim: Vec::default(),

            h: Vec::default(),
            heur: 0,
            rating: Vec::default(),
            candidates: Vec::default(),
            select_vars: HashSet::default(),

            dfs: Vec::default(),
            arcs: Vec::default(),
            rank_counter: 0,
            active: None,
            settled: None,
            root_child: None,

            lookahead: Vec::default(),
            lits: Vec::default(),
            istamp_id: 0,
            wstack: Vec::default(),
            weighted_new_binaries: 0.0,
            delta_trigger: 0.0,

            prefix: 0,
            vprefix: Vec::default(),

            model: Vec::default(),
            transcriber: None,
            started: None,
        }
    }

    /// A fresh atom.
    pub fn fresh_atom(&mut self) -> Atom {
        let atom = self.atom_count;
        self.atom_count += 1;
        self.eliminated.push(false);
        atom
    }

    /// A fresh atom, as its positive literal.
    pub fn fresh_literal(&mut self) -> CLiteral {
        CLiteral::new(self.fresh_atom(), true)
    }

    /// Record `clause`, to take effect from the next public operation.
    ///
    /// Repeat literals are dropped and a tautological clause is skipped.
    /// An empty clause, or a clause over an atom the engine has not issued,
    /// is an error.
    pub fn add_clause(
        &mut self,
        clause: impl Into<CClause>,
    ) -> Result<ClauseOk, err::ErrorKind> {
        let mut clause: CClause = clause.into();

        if clause.is_empty() {
            return Err(BuildError::EmptyClause.into());
        }
        if clause.iter().any(|l| l.atom() >= self.atom_count) {
            return Err(BuildError::UnknownAtom.into());
        }

        clause.sort_unstable();
        clause.dedup();

        // adjacent after sorting, as literal order is atom then polarity
        if clause.windows(2).any(|w| w[0].atom() == w[1].atom()) {
            return Ok(ClauseOk::Skipped);
        }

        self.formula.push(clause);
        self.state = EngineState::Input;
        Ok(ClauseOk::Added)
    }

    /// Note an external simplifier has eliminated `atom`.
    /// Eliminated atoms are never free and never pre-selected.
    pub fn set_eliminated(&mut self, atom: Atom, eliminated: bool) {
        self.eliminated[atom as usize] = eliminated;
    }

    /// Install `extension` as the external constraint propagator.
    pub fn set_extension(&mut self, extension: Box<dyn Extension>) {
        self.extension = Some(extension);
    }

    /// Ask for the extension to be consulted whenever `literal` becomes
    /// true, on behalf of the opaque `constraint`.
    pub fn watch_external(&mut self, literal: CLiteral, constraint: u32) {
        self.external_watches.push((literal, constraint));
    }

    /// Transcribe DRAT steps to `sink`, when enabled by
    /// [config.drat](crate::config::Config).
    pub fn transcribe_to(&mut self, sink: Box<dyn std::io::Write>) {
        self.transcriber = Some(Transcriber::new(sink));
    }

    /// The number of atoms issued.
    pub fn atom_count(&self) -> Atom {
        self.atom_count
    }

    /// The value of `atom` on the present assignment, if any.
    pub fn value_of(&self, atom: Atom) -> Option<bool> {
        match self.stamp.get(atom as usize) {
            None | Some(0) => None,
            Some(stamp) => Some(stamp & 1 == 0),
        }
    }

    /// The model found by the last [search](GenericEngine::search), an
    /// entry per atom.
    /// Empty unless the last search concluded satisfiable.
    pub fn model(&self) -> &[Option<bool>] {
        &self.model
    }

    /// The report corresponding to the state of the engine.
    pub fn report(&self) -> Report {
        match self.state {
            EngineState::Satisfiable => Report::Satisfiable,
            EngineState::Unsatisfiable => Report::Unsatisfiable,
            _ => Report::Unknown,
        }
    }

    /// The assignment as a string of integer literals, for inspection.
    pub fn valuation_string(&self) -> String {
        let mut string = String::new();
        for atom in 0..self.atom_count {
            match self.value_of(atom) {
                None => {}
                Some(true) => string.push_str(&format!("{atom} ")),
                Some(false) => string.push_str(&format!("-{atom} ")),
            }
        }
        string.trim_end().to_string()
    }

    /// Poll the configured resource limits.
    ///
    /// Called at each decision and each lookahead pass iteration.
    /// An error here unwinds the operation, leaving an unknown result.
    pub fn checkpoint(&self) -> Result<(), err::ErrorKind> {
        let time_limit = self.config.time_limit.value;
        if !time_limit.is_zero() {
            if let Some(started) = self.started {
                if started.elapsed() > time_limit {
                    return Err(err::CheckpointError::Cancelled.into());
                }
            }
        }

        let ceiling = self.config.memory_limit.value;
        if ceiling != 0 && self.memory_estimate() > ceiling {
            return Err(err::CheckpointError::OutOfMemory.into());
        }

        Ok(())
    }

    /// An estimate of the bytes held by the growable databases.
    ///
    /// Only the clause arena and the binary implication graph grow during
    /// an operation, so the estimate covers exactly those.
    pub fn memory_estimate(&self) -> usize {
        let live_edges = (self.counters.add_binary - self.counters.del_binary) as usize;
        (self.arena.literal_count() + 2 * live_edges) * std::mem::size_of::<CLiteral>()
    }

    /// Enter a public operation: reset the clock, notify the extension, and
    /// rebuild the working databases from the recorded formula.
    pub(crate) fn enter_op(&mut self) {
        self.started = Some(Instant::now());
        self.state = EngineState::Solving;
        self.mode = Mode::Searching;
        self.level = FIXED_TRUTH;

        if let Some(extension) = self.extension.as_mut() {
            extension.set_lookahead(true);
        }

        self.rebuild();
    }

    /// Leave a public operation: notify the extension and flush the proof.
    pub(crate) fn leave_op(&mut self) {
        if let Some(extension) = self.extension.as_mut() {
            extension.set_lookahead(false);
        }
        if let Some(transcriber) = self.transcriber.as_mut() {
            transcriber.flush();
        }
    }

    /// Rebuild every working database from the recorded formula, and close
    /// under propagation.
    ///
    /// Units conflicting at this point set the inconsistency flag rather
    /// than erroring, in which case the caller observes unsatisfiability.
    fn rebuild(&mut self) {
        let atoms = self.atom_count as usize;
        let literals = 2 * atoms;

        self.inconsistent = false;
        self.qhead = 0;
        self.trail.clear();
        self.trail_lim.clear();
        self.qhead_lim.clear();
        self.assumptions.clear();

        self.binary.clear();
        self.binary.resize_with(literals, Vec::new);
        self.binary_trail.clear();
        self.binary_trail_lim.clear();
        self.bstamp.clear();
        self.bstamp.resize(literals, 0);
        self.bstamp_id = 0;
        self.tc1_count = 0;
        self.tc1_count_lim.clear();

        self.arena.clear();
        self.watches.clear();
        self.watches.resize_with(literals, Vec::new);
        self.full_watches.clear();
        self.full_watches.resize_with(literals, Vec::new);
        self.retired_clauses.clear();
        self.retired_clause_lim.clear();
        self.retired_ternary.clear();
        self.retired_ternary_lim.clear();

        self.stamp.clear();
        self.stamp.resize(atoms, 0);
        self.freevars.clear();
        for atom in 0..self.atom_count {
            if !self.eliminated[atom as usize] {
                self.freevars.insert(atom);
            }
        }

        self.h.clear();
        self.heur = 0;
        self.rating.clear();
        self.rating.resize(atoms, 0.0);
        self.candidates.clear();

        self.dfs.clear();
        self.dfs.resize_with(literals, DfsInfo::default);
        self.arcs.clear();
        self.arcs.resize_with(literals, Vec::new);
        self.rank_counter = 0;
        self.active = None;
        self.settled = None;
        self.root_child = None;

        self.lookahead.clear();
        self.lits.clear();
        self.lits.resize_with(literals, LitInfo::default);
        self.istamp_id = 0;
        self.wstack.clear();
        self.weighted_new_binaries = 0.0;
        self.delta_trigger = atoms as f64 / 10.0;

        self.prefix = 0;
        self.vprefix.clear();
        self.vprefix.resize_with(atoms, VarPrefix::default);

        self.model.clear();

        // Binary and longer clauses first, then units, so clause attachment
        // never sees an assigned watch.
        let formula = std::mem::take(&mut self.formula);

        for clause in &formula {
            match clause.len() {
                0 | 1 => {}

                2 => self.add_binary(clause[0], clause[1]),

                _ => {
                    let reference = self.arena.record(clause);
                    self.attach_clause(reference);
                    for literal in clause {
                        self.full_watches[literal.negate().index()].push(reference);
                    }
                }
            }
        }

        for clause in &formula {
            if clause.len() == 1 {
                self.assign(clause[0]);
            }
        }

        self.formula = formula;

        for (literal, constraint) in self.external_watches.clone() {
            self.watches[literal.index()].push(Watcher::Extension { constraint });
        }

        self.propagate();
        self.qhead = self.trail.len();
    }
}
