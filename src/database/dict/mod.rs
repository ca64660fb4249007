//! An in-memory associative container with incremental rehashing (§1-§9):
//! resize work is spread one bucket at a time across subsequent operations
//! instead of happening in one blocking pass.

mod config;
mod dict;
pub mod entry;
mod global;
mod hash;
mod iter;
mod node;
mod sample;
mod scan;
mod state;
mod stats;
mod table;

pub use config::DictConfig;
pub use dict::{Dict, DictRefIter};
pub use entry::{Entry, OccupiedEntry, VacantEntry};
pub use global::{disable_resize, enable_resize, get_hash_seed, set_hash_seed};
pub use hash::{hash_bytes, hash_bytes_ci};
pub use iter::{DictIterator, SafeIter};
pub use node::DictNode;
pub use sample::{RandomSource, SmallRngSource};
pub use scan::ScanCursor;
pub use state::RehashState;
