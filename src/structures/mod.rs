//! The abstract elements of a formula, and their representations.

pub mod atom;
pub mod clause;
pub mod literal;
