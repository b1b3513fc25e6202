/*!
An opaque hook for external constraint propagators.

An enclosing solver may keep constraints the engine has no representation
for --- cardinality, xor, pseudo-boolean --- and still let the engine drive
search over them.
The engine sees such a constraint only as a watch entry holding an opaque
identifier, registered through
[watch_external](crate::context::GenericEngine::watch_external).
When the watched literal becomes true the engine delegates to the
extension's [propagate](Extension::propagate), which reports what the engine
should do with the watch and, possibly, a consequence of the constraint.

[set_lookahead](Extension::set_lookahead) is toggled at entry and exit of
every public operation, so the extension may route its own bookkeeping
differently while the engine is active.
*/

use crate::structures::literal::CLiteral;

/// The outcome of delegating a propagation to an extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExtensionPropagation {
    /// Nothing followed, keep the watch.
    Keep,

    /// Nothing followed, drop the watch.
    Drop,

    /// The constraint implies `literal` under the current assignment.
    /// `keep` reports whether to keep the watch.
    Implied { literal: CLiteral, keep: bool },

    /// The constraint conflicts with the current assignment.
    Conflict,
}

/// An external constraint propagator.
pub trait Extension {
    /// `literal` became true and is watched on behalf of `constraint`.
    fn propagate(&mut self, literal: CLiteral, constraint: u32) -> ExtensionPropagation;

    /// Note the engine is entering (`active`) or leaving (`!active`) a
    /// public operation.
    fn set_lookahead(&mut self, active: bool);
}
