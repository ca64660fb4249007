//! Core database data structures.
//!
//! - `dict`: the generic incremental-rehashing dictionary (hash map)
//!   implementation that is this crate's reason for existing.

pub mod dict;

pub use dict::*;
