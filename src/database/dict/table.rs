use serde::{Deserialize, Serialize};

use super::node::DictNode;

/// A single bucket array: a power-of-two–sized vector of chain heads plus
/// the bookkeeping the rehash engine and load-factor checks need.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Table<K, V> {
    pub(crate) buckets: Vec<Option<Box<DictNode<K, V>>>>,
    pub(crate) size_mask: usize,
    pub(crate) used: usize,
}

impl<K, V> Table<K, V> {
    /// The empty, unallocated table (`size == 0`).
    pub(crate) fn empty() -> Self {
        Table {
            buckets: Vec::new(),
            size_mask: 0,
            used: 0,
        }
    }

    /// Allocates a table with exactly `size` buckets. `size` must already be
    /// a power of two (callers are responsible for rounding); `size == 0` is
    /// accepted and produces the empty table.
    pub(crate) fn with_size(size: usize) -> Self {
        if size == 0 {
            return Table::empty();
        }

        debug_assert!(size.is_power_of_two(), "table size must be a power of two");

        let mut buckets = Vec::with_capacity(size);
        buckets.resize_with(size, || None);

        Table {
            buckets,
            size_mask: size - 1,
            used: 0,
        }
    }

    #[inline]
    pub(crate) fn size(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn is_empty_table(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Head of the chain at `idx`, read-only.
    #[inline]
    pub(crate) fn bucket(
        &self,
        idx: usize,
    ) -> Option<&DictNode<K, V>> {
        self.buckets[idx].as_deref()
    }

    /// Mutable head-of-chain slot at `idx`, for callers that need to splice
    /// or replace an entire chain in place (the scan cursor's `bucket_fn`).
    #[inline]
    pub(crate) fn bucket_slot_mut(
        &mut self,
        idx: usize,
    ) -> &mut Option<Box<DictNode<K, V>>> {
        &mut self.buckets[idx]
    }

    /// Index of the bucket holding `hash`, under this table's mask.
    #[inline]
    pub(crate) fn index_for(
        &self,
        hash: u64,
    ) -> usize {
        (hash as usize) & self.size_mask
    }

    /// A stable address identifying this table's backing allocation — part of
    /// the unsafe iterator's shape fingerprint. `0` for an unallocated table.
    pub(crate) fn addr(&self) -> u64 {
        if self.buckets.is_empty() {
            0
        } else {
            self.buckets.as_ptr() as u64
        }
    }

    pub(crate) fn clear(&mut self) {
        self.buckets.clear();
        self.size_mask = 0;
        self.used = 0;
    }

    /// Length of the collision chain rooted at `idx`.
    pub(crate) fn chain_len(
        &self,
        idx: usize,
    ) -> usize {
        let mut len = 0;
        let mut cur = self.buckets[idx].as_deref();

        while let Some(node) = cur {
            len += 1;
            cur = node.next.as_deref();
        }

        len
    }
}

impl<K, V> Table<K, V>
where
    K: Eq,
{
    /// Finds the entry for `key` in the chain hashing to `hash`, if present.
    pub(crate) fn find(
        &self,
        hash: u64,
        key: &K,
    ) -> Option<&DictNode<K, V>> {
        let idx = self.index_for(hash);
        let mut cur = self.buckets[idx].as_deref();

        while let Some(node) = cur {
            if &node.key == key {
                return Some(node);
            }
            cur = node.next.as_deref();
        }

        None
    }

    /// Mutable counterpart of [`Table::find`], yielding only the value.
    ///
    /// Locates the chain position with a read-only walk first, then
    /// re-walks that many links with a `&mut` chain to reach it — returning
    /// `&mut node.val` directly out of a single reborrowing loop ties the
    /// borrow of `slot` to every iteration (including the one that
    /// reassigns `slot = &mut node.next`), which the borrow checker
    /// rejects without `unsafe`, so the search and the mutable access are
    /// kept as two separate passes instead.
    pub(crate) fn find_mut(
        &mut self,
        hash: u64,
        key: &K,
    ) -> Option<&mut V> {
        let idx = self.index_for(hash);

        let mut pos = 0usize;
        let mut cur = self.buckets[idx].as_deref();
        let mut found = false;
        while let Some(node) = cur {
            if &node.key == key {
                found = true;
                break;
            }
            cur = node.next.as_deref();
            pos += 1;
        }
        if !found {
            return None;
        }

        let mut slot = &mut self.buckets[idx];
        for _ in 0..pos {
            slot = &mut slot.as_mut().unwrap().next;
        }
        Some(&mut slot.as_mut().unwrap().val)
    }

    /// Prepends `node` to the chain at `hash`'s bucket (O(1) head insertion)
    /// and bumps `used`. Caller must already know `key` is absent.
    pub(crate) fn insert_head(
        &mut self,
        hash: u64,
        mut node: Box<DictNode<K, V>>,
    ) {
        let idx = self.index_for(hash);
        node.next = self.buckets[idx].take();
        self.buckets[idx] = Some(node);
        self.used += 1;
    }

    /// Unlinks and returns the node for `key` hashing to `hash`, if present.
    pub(crate) fn remove(
        &mut self,
        hash: u64,
        key: &K,
    ) -> Option<Box<DictNode<K, V>>> {
        let idx = self.index_for(hash);
        let mut cur = &mut self.buckets[idx];

        loop {
            match cur {
                None => return None,
                Some(node) if &node.key == key => {
                    let next = node.next.take();
                    let removed = std::mem::replace(cur, next);
                    self.used -= 1;
                    return removed;
                }
                Some(node) => {
                    cur = &mut node.next;
                }
            }
        }
    }
}
