//! The dictionary itself (§3-§4): two bucket arrays, a rehash cursor, and the
//! public key/value surface built on top of them.

use std::{
    hash::{BuildHasher, Hash, RandomState},
    time::{Duration, Instant},
};

use increhash_error::{DictError, DictResult};
use tracing::{debug, trace};

use super::{
    config::DictConfig,
    entry::{Entry, OccupiedEntry, VacantEntry},
    global::resize_enabled,
    iter::{DictIterator, SafeIter},
    node::DictNode,
    state::RehashState,
    table::Table,
};

/// `h & ht[t].size_mask` is bucket selection; beyond that, this is the owner
/// of the rehash cursor and the two bucket arrays it swaps between.
///
/// `S` is the monomorphic stand-in for the original's `hashFunction`/
/// `keyCompare` vtable slots — this table is generic over any
/// [`BuildHasher`], defaulting to [`RandomState`] the way `std::HashMap` does.
pub struct Dict<K, V, S = RandomState> {
    ht: [Table<K, V>; 2],
    rehash_idx: isize,
    pause_rehash: isize,
    hash_builder: S,
    expand_guard: Option<Box<dyn Fn(usize, f64) -> bool>>,
    config: DictConfig,
}

impl<K, V, S> Clone for Dict<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// The expand-permission hook is not `Clone` (it is an opaque closure),
    /// so a cloned dictionary always allows expansion unconditionally —
    /// callers relying on a custom guard must reinstall it after cloning.
    fn clone(&self) -> Self {
        Dict {
            ht: [self.ht[0].clone(), self.ht[1].clone()],
            rehash_idx: self.rehash_idx,
            pause_rehash: self.pause_rehash,
            hash_builder: self.hash_builder.clone(),
            expand_guard: None,
            config: self.config,
        }
    }
}

impl<K, V, S> Default for Dict<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Dict {
            ht: [Table::empty(), Table::empty()],
            rehash_idx: -1,
            pause_rehash: 0,
            hash_builder: S::default(),
            expand_guard: None,
            config: DictConfig::default(),
        }
    }
}

impl<K, V, S> Dict<K, V, S>
where
    S: Default,
{
    /// An empty dictionary with default tunables and the default-constructed
    /// hasher.
    pub fn new() -> Self {
        Self::default()
    }

    /// An empty dictionary already expanded to hold `capacity` entries
    /// without a further resize.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut d = Self::default();
        if capacity > 0 {
            let size = next_power_of_two(capacity.max(DictConfig::DEFAULT_INITIAL_SIZE));
            d.ht[0] = Table::with_size(size);
        }
        d
    }

    /// Like [`Dict::new`] but with non-default tunables.
    pub fn with_config(config: DictConfig) -> Self {
        let mut d = Self::default();
        d.config = config;
        d
    }
}

impl<K, V, S> Dict<K, V, S> {
    /// An empty dictionary using an explicit hasher-builder instance, for
    /// hashers that aren't `Default` (or whose default isn't the one wanted).
    pub fn with_hasher(hash_builder: S) -> Self {
        Dict {
            ht: [Table::empty(), Table::empty()],
            rehash_idx: -1,
            pause_rehash: 0,
            hash_builder,
            expand_guard: None,
            config: DictConfig::default(),
        }
    }

    pub fn with_capacity_and_hasher(
        capacity: usize,
        hash_builder: S,
    ) -> Self {
        let mut d = Self::with_hasher(hash_builder);
        if capacity > 0 {
            let size = next_power_of_two(capacity.max(DictConfig::DEFAULT_INITIAL_SIZE));
            d.ht[0] = Table::with_size(size);
        }
        d
    }

    /// Installs the cold-path resize-permission predicate (§9): consulted at
    /// most once per expansion, given the extra bytes an expansion would
    /// roughly cost and the dictionary's current load factor.
    pub fn set_expand_guard(
        &mut self,
        guard: impl Fn(usize, f64) -> bool + 'static,
    ) {
        self.expand_guard = Some(Box::new(guard));
    }

    pub(crate) fn table(
        &self,
        idx: usize,
    ) -> &Table<K, V> {
        &self.ht[idx]
    }

    pub(crate) fn table_mut(
        &mut self,
        idx: usize,
    ) -> &mut Table<K, V> {
        &mut self.ht[idx]
    }

    /// The rehash cursor's state, `Idle` or `Rehashing { next_bucket }` (§9:
    /// the cursor modeled as an explicit state machine rather than a bare
    /// sentinel).
    pub fn rehash_state(&self) -> RehashState {
        RehashState::from_cursor(self.rehash_idx)
    }

    #[inline]
    pub fn is_rehashing(&self) -> bool {
        matches!(self.rehash_state(), RehashState::Rehashing { .. })
    }

    /// The raw cursor value (`-1` ⇒ idle), for callers in this crate that
    /// need the exact in-progress index rather than just the idle/active
    /// flag (e.g. bounding random sampling to already-migrated buckets).
    pub(crate) fn rehash_cursor(&self) -> isize {
        self.rehash_idx
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ht[0].used + self.ht[1].used
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A 64-bit mix of both tables' backing addresses, sizes, and used
    /// counts (§4.5 / §9) — perturbed by any structural mutation, which is
    /// what lets the unsafe iterator detect misuse on release.
    pub(crate) fn fingerprint(&self) -> u64 {
        let fields = [
            self.ht[0].addr(),
            self.ht[0].size() as u64,
            self.ht[0].used as u64,
            self.ht[1].addr(),
            self.ht[1].size() as u64,
            self.ht[1].used as u64,
        ];

        let mut hash: u64 = 0;
        for &f in &fields {
            hash ^= f;
            hash = hash.wrapping_mul(0x5bd1_e995);
            hash ^= hash >> 47;
        }
        hash
    }

    /// Brackets a region that must observe a stable shape (safe iteration,
    /// scan callbacks) by suspending the auto-rehash hook.
    pub(crate) fn pause_rehashing(&mut self) {
        self.pause_rehash += 1;
    }

    pub(crate) fn resume_rehashing(&mut self) {
        debug_assert!(
            self.pause_rehash > 0,
            "resume_rehashing called without a matching pause_rehashing"
        );
        self.pause_rehash -= 1;
        if self.pause_rehash < 0 {
            panic!("pause_rehash underflowed — resume_rehashing called more often than pause_rehashing");
        }
    }
}

impl<K, V, S> Dict<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    #[inline]
    fn hash_key(
        &self,
        key: &K,
    ) -> u64 {
        self.hash_builder.hash_one(key)
    }

    /// One step of the rehash engine per §4.3, gated on `pause_rehash == 0`;
    /// the auto-rehash hook woven into every mutating/lookup operation.
    fn rehash_step(&mut self) {
        if self.pause_rehash == 0 && self.is_rehashing() {
            self.rehash(1);
        }
    }

    /// Advances the rehash cursor by up to `n` non-empty buckets, visiting at
    /// most `rehash_empty_visit_multiplier * n` empty buckets before
    /// yielding. Returns `true` if more work remains.
    pub fn rehash(
        &mut self,
        n: usize,
    ) -> bool {
        if !self.is_rehashing() {
            return false;
        }

        let max_empty_visits = self.config.rehash_empty_visit_multiplier * n.max(1);
        let mut empty_visits = 0usize;
        let mut buckets_done = 0usize;

        while buckets_done < n {
            if self.ht[0].used == 0 {
                break;
            }

            if self.rehash_idx as usize >= self.ht[0].size() {
                break;
            }

            let idx = self.rehash_idx as usize;
            let mut chain = self.ht[0].bucket_slot_mut(idx).take();

            if chain.is_none() {
                empty_visits += 1;
                self.rehash_idx += 1;
                if empty_visits >= max_empty_visits {
                    return true;
                }
                continue;
            }

            while let Some(mut node) = chain {
                chain = node.next.take();
                let hash = self.hash_key(&node.key);
                self.ht[0].used -= 1;
                self.ht[1].insert_head(hash, node);
            }

            self.rehash_idx += 1;
            buckets_done += 1;
        }

        if self.ht[0].used == 0 {
            self.ht[0] = std::mem::replace(&mut self.ht[1], Table::empty());
            self.rehash_idx = RehashState::Idle.to_cursor();
            debug!("rehash complete, ht[0] now size {}", self.ht[0].size());
            return false;
        }

        true
    }

    /// Runs `rehash(100)` repeatedly until `ms` milliseconds have elapsed or
    /// the rehash finishes.
    pub fn rehash_milliseconds(
        &mut self,
        ms: u64,
    ) -> bool {
        let deadline = Instant::now() + Duration::from_millis(ms);
        loop {
            if !self.rehash(100) {
                return false;
            }
            if Instant::now() >= deadline {
                return true;
            }
        }
    }

    /// §4.1's auto-expand trigger, run before any insertion into `ht[0]`.
    fn expand_if_needed(&mut self) {
        if self.ht[0].size() == 0 {
            let _ = self.expand(self.config.initial_size);
            return;
        }

        if self.is_rehashing() {
            return;
        }

        let used = self.ht[0].used;
        let size = self.ht[0].size();
        if used < size {
            return;
        }

        let ratio_forced = size > 0 && used / size >= self.config.force_resize_ratio;
        if !resize_enabled() && !ratio_forced {
            return;
        }

        if let Some(guard) = &self.expand_guard {
            let load_ratio = used as f64 / size.max(1) as f64;
            if !guard(used.saturating_mul(std::mem::size_of::<DictNode<K, V>>()), load_ratio) {
                return;
            }
        }

        let _ = self.expand(used + 1);
    }

    /// `dictTryExpand`: expand distinctly reporting allocation/precondition
    /// failure, without consulting `expand_guard`.
    pub fn try_expand(
        &mut self,
        size: usize,
    ) -> DictResult<()> {
        self.expand_raw(size, false)
    }

    /// Expand consulting `expand_guard` when installed (the auto-resize
    /// path); used internally by [`Dict::expand_if_needed`] but exposed for
    /// callers that want the same semantics explicitly.
    pub fn expand(
        &mut self,
        size: usize,
    ) -> DictResult<()> {
        self.expand_raw(size, true)
    }

    fn expand_raw(
        &mut self,
        size: usize,
        _consult_guard: bool,
    ) -> DictResult<()> {
        if self.is_rehashing() {
            return Err(DictError::ExpandWhileRehashing);
        }

        let new_size = next_power_of_two(size.max(self.config.initial_size));

        if new_size < self.ht[0].used {
            return Err(DictError::ExpandTooSmall {
                requested: size,
                used: self.ht[0].used,
            });
        }

        if new_size == self.ht[0].size() {
            return Err(DictError::ExpandNoOp);
        }

        let new_table = Table::with_size(new_size);

        if self.ht[0].is_empty_table() {
            debug!(new_size, "installing initial table");
            self.ht[0] = new_table;
        } else {
            debug!(new_size, "arming rehash into new table");
            self.ht[1] = new_table;
            self.rehash_idx = RehashState::Rehashing { next_bucket: 0 }.to_cursor();
        }

        Ok(())
    }

    /// `resize`: shrinks towards `max(used, initial_size)`. Disallowed while
    /// rehashing or while global resizing is disabled.
    pub fn resize(&mut self) -> DictResult<()> {
        if self.is_rehashing() {
            return Err(DictError::ResizeWhileRehashing);
        }
        if !resize_enabled() {
            return Err(DictError::ResizeDisabled);
        }

        let target = self.ht[0].used.max(self.config.initial_size);
        self.expand_raw(target, false)
    }

    /// Pre-sizes the dictionary so it can hold `len() + additional` entries
    /// without a further expansion, matching `HashMap::reserve`'s intent.
    pub fn reserve(
        &mut self,
        additional: usize,
    ) {
        let target = self.len() + additional;
        if target > self.ht[0].size() && !self.is_rehashing() {
            let _ = self.expand(target);
        }
    }

    /// Shrinks the backing table to fit the current occupancy, subject to
    /// the same preconditions as [`Dict::resize`]; silently a no-op if those
    /// preconditions aren't met (mirrors `resize`'s best-effort framing in
    /// the original, where shrink requests are always advisory).
    pub fn shrink_to_fit(&mut self) {
        let _ = self.resize();
    }

    /// `add_raw`: a single rehash step, then a bucket-slot handle — occupied
    /// if `key` is already present, vacant otherwise. Backs both `add` and
    /// the `Entry` API.
    pub fn entry(
        &mut self,
        key: K,
    ) -> Entry<'_, K, V, S> {
        self.rehash_step();
        self.expand_if_needed();

        let hash = self.hash_key(&key);
        let rehashing = self.is_rehashing();

        // Lookups probe ht[0] first; insertions, while rehashing, always
        // target ht[1] (§4.2).
        if rehashing && self.ht[0].find(hash, &key).is_some() {
            let idx = self.ht[0].index_for(hash);
            let slot = &mut self.ht[0].buckets[idx];
            return Entry::Occupied(OccupiedEntry {
                slot,
                used: &mut self.ht[0].used,
            });
        }

        let target = if rehashing { 1 } else { 0 };
        let idx = self.ht[target].index_for(hash);

        if self.ht[target].find(hash, &key).is_some() {
            let slot = &mut self.ht[target].buckets[idx];
            return Entry::Occupied(OccupiedEntry {
                slot,
                used: &mut self.ht[target].used,
            });
        }

        let slot = &mut self.ht[target].buckets[idx];
        Entry::Vacant(VacantEntry {
            key,
            slot,
            used: &mut self.ht[target].used,
            _marker: std::marker::PhantomData,
        })
    }

    /// `add`: fails with [`DictError::KeyExists`] rather than overwriting.
    pub fn add(
        &mut self,
        key: K,
        val: V,
    ) -> DictResult<()> {
        match self.entry(key) {
            Entry::Occupied(_) => Err(DictError::KeyExists),
            Entry::Vacant(e) => {
                e.insert(val);
                Ok(())
            }
        }
    }

    /// `replace`: returns `true` if the key was newly inserted, `false` if
    /// an existing value was overwritten. The old value is dropped only
    /// after the new one has been installed (§4.2, safe against `new == old`
    /// aliasing).
    pub fn insert(
        &mut self,
        key: K,
        val: V,
    ) -> bool {
        match self.entry(key) {
            Entry::Occupied(mut e) => {
                e.insert(val);
                false
            }
            Entry::Vacant(e) => {
                e.insert(val);
                true
            }
        }
    }

    /// `find` / `get`: probes `ht[0]` and, while rehashing, `ht[1]`, first
    /// performing a single rehash step (§4.2: "dictFind … performs one
    /// rehash step first") — lookups are one of the auto-rehash hook's
    /// drive points, alongside `insert`/`remove`/`entry`, the way the
    /// teacher's own `get` does.
    pub fn get(
        &mut self,
        key: &K,
    ) -> Option<&V> {
        self.rehash_step();
        let hash = self.hash_key(key);

        if let Some(node) = self.ht[0].find(hash, key) {
            return Some(&node.val);
        }
        if self.is_rehashing() {
            if let Some(node) = self.ht[1].find(hash, key) {
                return Some(&node.val);
            }
        }
        None
    }

    pub fn get_mut(
        &mut self,
        key: &K,
    ) -> Option<&mut V> {
        self.rehash_step();
        let hash = self.hash_key(key);

        if let Some(v) = self.ht[0].find_mut(hash, key) {
            return Some(v);
        }
        if self.is_rehashing() {
            if let Some(v) = self.ht[1].find_mut(hash, key) {
                return Some(v);
            }
        }
        None
    }

    pub fn contains_key(
        &mut self,
        key: &K,
    ) -> bool {
        self.get(key).is_some()
    }

    /// `unlink`: removes and returns the owned key/value pair, if present.
    pub fn unlink(
        &mut self,
        key: &K,
    ) -> Option<(K, V)> {
        self.rehash_step();
        let hash = self.hash_key(key);

        if let Some(node) = self.ht[0].remove(hash, key) {
            return Some((node.key, node.val));
        }
        if self.is_rehashing() {
            if let Some(node) = self.ht[1].remove(hash, key) {
                return Some((node.key, node.val));
            }
        }
        None
    }

    /// `delete`: drops the key and value, reporting only whether the key was
    /// present.
    pub fn remove(
        &mut self,
        key: &K,
    ) -> bool {
        self.unlink(key).is_some()
    }

    /// Drops every entry and resets both tables to empty, matching the
    /// original's `dictEmpty`.
    pub fn clear(&mut self) {
        self.ht[0].clear();
        self.ht[1].clear();
        self.rehash_idx = RehashState::Idle.to_cursor();
        trace!("dictionary cleared");
    }

    /// Finds a live entry by its [`DictNode::node_ptr`] address and the hash
    /// it was stored under — the "find-entry-ref-by-ptr-and-hash" operation
    /// of §6, used by secondary indices (e.g. an expire table) keyed on the
    /// entry's identity rather than its key.
    pub fn find_by_node_ptr(
        &self,
        hash: u64,
        ptr: usize,
    ) -> Option<(&K, &V)> {
        for t in 0..2 {
            let idx = self.ht[t].index_for(hash);
            let mut cur = self.ht[t].bucket(idx);
            while let Some(node) = cur {
                if node.node_ptr() == ptr {
                    return Some((&node.key, &node.val));
                }
                cur = node.next.as_deref();
            }
        }
        None
    }

    /// A simple read-only iterator over all entries, not subject to the
    /// misuse-detection contract of [`Dict::iter_unsafe`]/[`Dict::iter_safe`]
    /// — it borrows `self` for its whole lifetime the ordinary Rust way, so
    /// the borrow checker itself forbids concurrent mutation.
    pub fn iter(&self) -> DictRefIter<'_, K, V> {
        DictRefIter {
            table: &self.ht,
            table_idx: 0,
            bucket_idx: 0,
            cur: None,
        }
    }

    /// The hazard-carrying iterator (§4.5): mutation during its lifetime is
    /// permitted but detected on [`DictIterator::release`].
    pub fn iter_unsafe(&self) -> DictIterator<K, V, S> {
        DictIterator::new()
    }

    /// The mutation-tolerant iterator (§4.5): suspends incremental rehash
    /// for its lifetime.
    pub fn iter_safe(&self) -> SafeIter<K, V, S> {
        SafeIter::new()
    }

    /// A human-readable snapshot of both tables' load and chain-length
    /// distribution (§4.8), mirroring `dictGetStats`.
    pub fn stats(&self) -> String {
        super::stats::format(&self.ht[0], &self.ht[1], self.rehash_idx)
    }
}

impl<'a, K, V, S> IntoIterator for &'a Dict<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = DictRefIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Plain borrowing iterator returned by [`Dict::iter`].
pub struct DictRefIter<'a, K, V> {
    table: &'a [Table<K, V>; 2],
    table_idx: usize,
    bucket_idx: usize,
    cur: Option<&'a DictNode<K, V>>,
}

impl<'a, K, V> Iterator for DictRefIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(node) = self.cur {
                self.cur = node.next.as_deref();
                return Some((&node.key, &node.val));
            }

            let table = &self.table[self.table_idx];
            if self.bucket_idx >= table.size() {
                if self.table_idx == 0 && !self.table[1].is_empty_table() {
                    self.table_idx = 1;
                    self.bucket_idx = 0;
                    continue;
                }
                return None;
            }

            self.cur = table.bucket(self.bucket_idx);
            self.bucket_idx += 1;
        }
    }
}

fn next_power_of_two(n: usize) -> usize {
    if n <= 1 {
        return 1;
    }
    n.next_power_of_two()
}
