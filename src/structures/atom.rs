/*!
(The internal representation of) a boolean variable.

Each variable is a `u32` *v* such that the variables of an engine are exactly
[0..*n*) for some *n*.
This allows a variable to be used as the index of parallel arrays (ratings,
truth stamps, prefix caches, and so on) without indirection.

# Notes
- In the logic literature these are often called 'atoms', in the SAT
  literature 'variables'. 'Atom' is used here for symmetry with literals.
*/

/// A boolean variable, aka. an 'atom'.
pub type Atom = u32;
