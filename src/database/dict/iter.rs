//! The two mutation-aware cursor styles from §4.5, as external iterators:
//! neither holds a borrow of the `Dict` between calls, which is what lets a
//! caller mutate the dictionary while one of these is "live" — exactly the
//! hazard the unsafe flavor is built to detect and the safe flavor is built
//! to tolerate.

use std::hash::{BuildHasher, Hash};

use super::dict::Dict;

/// Walks bucket-order, chaining through the current bucket (by position,
/// re-walked from the bucket head each call) before advancing to the next
/// bucket, switching from `ht[0]` to `ht[1]` mid-walk if a rehash is armed.
/// Shared by both iterator flavors below.
struct Cursor {
    table_idx: usize,
    bucket_idx: usize,
    chain_pos: usize,
}

impl Cursor {
    fn new() -> Self {
        Cursor {
            table_idx: 0,
            bucket_idx: 0,
            chain_pos: 0,
        }
    }

    fn advance<'d, K, V, S>(
        &mut self,
        dict: &'d Dict<K, V, S>,
    ) -> Option<(&'d K, &'d V)>
    where
        K: Hash + Eq,
        S: BuildHasher,
    {
        loop {
            let table = dict.table(self.table_idx);

            if self.bucket_idx >= table.size() {
                if self.table_idx == 0 && dict.is_rehashing() {
                    self.table_idx = 1;
                    self.bucket_idx = 0;
                    self.chain_pos = 0;
                    continue;
                }
                return None;
            }

            let mut cur = table.bucket(self.bucket_idx);
            for _ in 0..self.chain_pos {
                match cur {
                    Some(node) => cur = node.next.as_deref(),
                    None => break,
                }
            }

            match cur {
                Some(node) => {
                    self.chain_pos += 1;
                    return Some((&node.key, &node.val));
                }
                None => {
                    self.bucket_idx += 1;
                    self.chain_pos = 0;
                }
            }
        }
    }
}

/// The hazard-carrying iterator (`dictGetIterator` in the original). Taking
/// one does **not** stop the dictionary from being mutated — that's the
/// point being demonstrated — but [`DictIterator::release`] recomputes the
/// dictionary's shape fingerprint and panics if it no longer matches the one
/// captured on the first [`DictIterator::next`] call.
pub struct DictIterator<K, V, S> {
    cursor: Cursor,
    fingerprint: Option<u64>,
    _marker: std::marker::PhantomData<fn() -> (K, V, S)>,
}

impl<K, V, S> DictIterator<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub(crate) fn new() -> Self {
        DictIterator {
            cursor: Cursor::new(),
            fingerprint: None,
            _marker: std::marker::PhantomData,
        }
    }

    /// Advances the cursor by one entry, computing the shape fingerprint on
    /// the very first call.
    pub fn next<'d>(
        &mut self,
        dict: &'d Dict<K, V, S>,
    ) -> Option<(&'d K, &'d V)> {
        if self.fingerprint.is_none() {
            self.fingerprint = Some(dict.fingerprint());
        }
        self.cursor.advance(dict)
    }

    /// Ends the iteration. Panics if `dict`'s shape changed since the first
    /// `next()` call — the original's "programming error, abort in
    /// debug/test builds" stance for unsafe-iterator misuse.
    pub fn release(self, dict: &Dict<K, V, S>) {
        if let Some(expected) = self.fingerprint {
            let actual = dict.fingerprint();
            if actual != expected {
                tracing::error!(
                    expected,
                    actual,
                    "dictionary mutated during unsafe iteration"
                );
            }
            assert_eq!(
                actual, expected,
                "dictionary was mutated during unsafe iteration (fingerprint mismatch)"
            );
        }
    }
}

/// The mutation-tolerant iterator (`dictGetSafeIterator`). Its first `next()`
/// call pauses incremental rehashing on `dict`; [`SafeIter::release`] resumes
/// it. Any other mutation is fine — the cursor just re-walks by position, so
/// deleting the entry just yielded is always safe, and other concurrent
/// inserts/removals may cause entries to be skipped or revisited rather than
/// corrupting anything.
pub struct SafeIter<K, V, S> {
    cursor: Cursor,
    paused: bool,
    _marker: std::marker::PhantomData<fn() -> (K, V, S)>,
}

impl<K, V, S> SafeIter<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub(crate) fn new() -> Self {
        SafeIter {
            cursor: Cursor::new(),
            paused: false,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn next<'d>(
        &mut self,
        dict: &'d mut Dict<K, V, S>,
    ) -> Option<(&'d K, &'d V)> {
        if !self.paused {
            dict.pause_rehashing();
            self.paused = true;
        }
        let dict: &'d Dict<K, V, S> = dict;
        self.cursor.advance(dict)
    }

    pub fn release(mut self, dict: &mut Dict<K, V, S>) {
        if self.paused {
            dict.resume_rehashing();
            self.paused = false;
        }
    }
}
