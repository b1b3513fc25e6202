/*!
Log targets.

The library logs through the [log] facade and never installs an
implementation of its own, so logging costs nothing unless the embedding
application provides one.
Every call names one of the targets below, which keeps the (verbose, trace
level) output filterable by subsystem: with
[env_logger](https://docs.rs/env_logger), for example,
`RUST_LOG=lookahead` narrows the stream to probe activity alone.
*/

/// Targets to be used within a [log]! macro.
pub mod targets {
    pub const BACKTRACK: &str = "backtrack";
    pub const BINARY: &str = "binary";
    pub const EXTENSION: &str = "extension";
    pub const LOOKAHEAD: &str = "lookahead";
    pub const PRESELECT: &str = "preselect";
    pub const PROPAGATION: &str = "propagation";
    pub const SCC: &str = "scc";
    pub const SEARCH: &str = "search";
}
