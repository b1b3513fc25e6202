/*!
High-level reports from an engine.

A report is the externally meaningful result of a public operation, in
contrast to the [state](crate::context::EngineState) of the engine which may
record intermediate detail.
*/

pub mod drat;

/// A report on the satisfiability of the recorded formula.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Report {
    /// The formula is satisfiable, and a model may be read from the engine.
    Satisfiable,

    /// The formula is unsatisfiable.
    Unsatisfiable,

    /// Satisfiability was not determined, e.g. as a resource limit was met.
    Unknown,
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Satisfiable => write!(f, "SATISFIABLE"),
            Self::Unsatisfiable => write!(f, "UNSATISFIABLE"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
