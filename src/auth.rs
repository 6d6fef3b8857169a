//! Strongly typed identifiers shared across the broker domain.

pub mod id;

pub use id::*;
