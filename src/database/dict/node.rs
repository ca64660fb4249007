use serde::{Deserialize, Serialize};

/// One entry in a bucket's collision chain.
///
/// Stands in for the original's heap-allocated entry with an explicit
/// tagged-union value slot: here the value slot is simply the caller's `V`
/// type parameter, and ownership/destruction is ordinary Rust `Drop` rather
/// than an explicit callback.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DictNode<K, V> {
    pub(crate) key: K,
    pub(crate) val: V,
    pub(crate) next: Option<Box<DictNode<K, V>>>,
}

impl<K, V> DictNode<K, V> {
    pub(crate) fn new(
        key: K,
        val: V,
        next: Option<Box<DictNode<K, V>>>,
    ) -> Box<Self> {
        Box::new(DictNode { key, val, next })
    }

    /// The entry's key.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// The entry's value.
    #[inline]
    pub fn value(&self) -> &V {
        &self.val
    }

    /// A mutable reference to the entry's value.
    #[inline]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.val
    }

    /// A raw address identifying this node's heap allocation, stable for its
    /// lifetime. Used by callers that want to key a secondary index off the
    /// entry itself (`find_by_node_ptr`), matching the original's pointer-keyed
    /// expire tables.
    #[inline]
    pub fn node_ptr(&self) -> usize {
        self as *const Self as usize
    }
}
