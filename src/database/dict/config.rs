use serde::{Deserialize, Serialize};

/// Compile-time defaults for the dictionary's tunables, overridable per
/// instance by the embedder.
///
/// Mirrors the role `Settings` plays in the reference workspace: a plain,
/// serializable value the embedder can snapshot for telemetry or tweak at
/// construction time, rather than a set of hardcoded constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictConfig {
    /// Smallest table size a dictionary ever expands to (a power of two).
    pub initial_size: usize,
    /// Load-factor threshold (`used / size`) above which expansion proceeds
    /// even while global resizing is disabled.
    pub force_resize_ratio: usize,
    /// How many empty buckets `rehash(n)` may visit, per requested bucket
    /// `n`, before yielding — bounds worst-case time when the old table is
    /// sparse.
    pub rehash_empty_visit_multiplier: usize,
}

impl DictConfig {
    pub const DEFAULT_INITIAL_SIZE: usize = 4;
    pub const DEFAULT_FORCE_RESIZE_RATIO: usize = 5;
    pub const DEFAULT_REHASH_EMPTY_VISIT_MULTIPLIER: usize = 10;
}

impl Default for DictConfig {
    fn default() -> Self {
        DictConfig {
            initial_size: Self::DEFAULT_INITIAL_SIZE,
            force_resize_ratio: Self::DEFAULT_FORCE_RESIZE_RATIO,
            rehash_empty_visit_multiplier: Self::DEFAULT_REHASH_EMPTY_VISIT_MULTIPLIER,
        }
    }
}
