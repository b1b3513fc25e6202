/*!
Counters on engine activity.

The counters are cumulative over the lifetime of the engine, across public
operations.
They feed no heuristic, with one exception: the difference between binaries
added and deleted is the live edge count used by the memory ceiling of
[checkpoint](crate::context::GenericEngine::checkpoint).
*/

/// Counters related to an engine.
#[derive(Clone, Copy, Debug, Default)]
pub struct Counters {
    /// Assignments made while in search mode.
    pub propagations: u64,

    /// Branching decisions committed by search.
    pub decisions: u64,

    /// Edges added to the binary implication graph.
    pub add_binary: u64,

    /// Edges removed from the binary implication graph on backtracking.
    pub del_binary: u64,

    /// Ternary clauses watched.
    pub add_ternary: u64,

    /// Ternary clauses retired.
    pub del_ternary: u64,

    /// Binaries synthesised by the transitive closure step.
    pub tc1_binaries: u64,

    /// Windfall binaries learnt from lookahead probes.
    pub windfall_binaries: u64,

    /// Literals committed as autarkies.
    pub autarky_propagations: u64,

    /// Equivalences learnt from zero weight probes.
    pub autarky_equivalences: u64,

    /// Rounds of double lookahead entered.
    pub double_lookahead_rounds: u64,

    /// Units derived within double lookahead.
    pub double_lookahead_propagations: u64,
}
