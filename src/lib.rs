//! Zumic's incremental-rehashing dictionary.
//!
//! A single-threaded, generic associative container whose resize work is
//! spread one bucket at a time across subsequent operations rather than
//! performed in one blocking pass — suitable as the primary key-value index
//! inside a latency-sensitive server, where a stop-the-world resize would
//! violate response-time budgets.
//!
//! - `database` — the dictionary engine: bucket arrays, rehash state
//!   machine, scan cursor, and iterator safety contract.

/// The dictionary engine (`Dict`, `DictConfig`, the `Entry` API, scan cursor,
/// iterators, random sampling, hashing helpers, and stats reporting).
pub mod database;

/// The dictionary type itself, its `Entry` API, configuration, and the
/// ambient hashing/sampling/scan/iteration surface around it.
pub use database::{
    disable_resize, enable_resize, get_hash_seed, hash_bytes, hash_bytes_ci, set_hash_seed, Dict,
    DictConfig, DictIterator, DictNode, DictRefIter, Entry, OccupiedEntry, RandomSource,
    RehashState, SafeIter, ScanCursor, SmallRngSource, VacantEntry,
};
