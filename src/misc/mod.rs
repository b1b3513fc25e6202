//! Odds and ends supporting the rest of the library.

pub mod log;
