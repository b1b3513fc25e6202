/*!
What can go wrong, as types.

- Conflicts are *not* errors.
  A conflict during search is recovered from by backtracking, and a conflict
  with the trail empty is the unsatisfiable result.
  Both are handled as control flow through the engine's inconsistency flag.
- The errors here, then, are either external interruptions (a resource limit
  raised from a [checkpoint](crate::context::GenericEngine::checkpoint)) or
  a misuse of the external interface (an empty clause, a literal over an
  unknown atom).

Call sites qualify these types as `err::ErrorKind` and so on, importing the
module rather than each enum, which keeps the error paths visually distinct
from the operations that raise them.
*/

/// A union of varied error kinds.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// An error while recording clauses.
    Build(BuildError),

    /// An interruption raised from a checkpoint poll.
    Checkpoint(CheckpointError),
}

/// Noted errors when recording a clause.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildError {
    /// Some attempt was made to record an empty clause.
    EmptyClause,

    /// A literal mentions an atom the engine has not issued.
    UnknownAtom,
}

impl From<BuildError> for ErrorKind {
    fn from(e: BuildError) -> Self {
        ErrorKind::Build(e)
    }
}

/// Interruptions raised from a checkpoint poll.
///
/// After either interruption the engine is in a consistent state for
/// inspection of counters and configuration, but not for continued search,
/// and the interrupted operation reports an unknown result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CheckpointError {
    /// The configured time limit was exceeded.
    Cancelled,

    /// The configured memory ceiling was exceeded.
    OutOfMemory,
}

impl From<CheckpointError> for ErrorKind {
    fn from(e: CheckpointError) -> Self {
        ErrorKind::Checkpoint(e)
    }
}
