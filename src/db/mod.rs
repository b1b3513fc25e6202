/*!
The data considered during a search, and methods for revising it.

- The [binary] implication graph, with its deletion trail.
- The [clause] arena of long clauses.
- [Watch lists](watch) over ternary clauses, long clauses, and external
  constraints.
- The [trail] of assignments, together with the truth stamps which make one
  assignment array shared between search and nested lookahead.

Each module attaches its methods to the
[engine](crate::context::GenericEngine) directly, as the hot paths
(propagation above all) read and write several of these structures at once.
*/

pub mod binary;
pub mod clause;
pub mod trail;
pub mod watch;
