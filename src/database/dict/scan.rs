//! The reversed-bit scan cursor (§4.4): a stateless, `u64`-wide traversal
//! token that visits every logical slot exactly once even if a rehash
//! completes mid-scan, without requiring the caller to hold any lock or
//! iterator object between steps.

use std::hash::{BuildHasher, Hash};

use super::{dict::Dict, node::DictNode};

/// Opaque scan progress. `ScanCursor::START` begins a traversal; `scan()`
/// returns the next cursor to pass back in, and the traversal is complete
/// once it returns a cursor equal to `ScanCursor::START` again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScanCursor(pub u64);

impl ScanCursor {
    pub const START: ScanCursor = ScanCursor(0);

    #[inline]
    pub fn is_start(&self) -> bool {
        self.0 == 0
    }
}

/// `v |= !mask; v = rev(v); v += 1; v = rev(v)` — the classic reversed-bit
/// increment, fixed at 64 bits per §9's portability note regardless of the
/// host's native word width.
fn advance(
    v: u64,
    mask: u64,
) -> u64 {
    let v = v | !mask;
    let v = v.reverse_bits();
    let v = v.wrapping_add(1);
    v.reverse_bits()
}

impl<K, V, S> Dict<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Performs one step of a full, rehash-tolerant traversal starting from
    /// `cursor`. `visit` is called for every live entry in the buckets this
    /// step reports; `bucket_fn`, if given, is called once per bucket
    /// (before `visit` walks its chain) so a caller can rewrite the bucket
    /// atomically — e.g. an active-expiration sweep filtering a chain in
    /// place.
    pub fn scan(
        &mut self,
        cursor: ScanCursor,
        visit: &mut dyn FnMut(&K, &V),
        mut bucket_fn: Option<&mut dyn FnMut(&mut Option<Box<DictNode<K, V>>>)>,
    ) -> ScanCursor {
        if self.is_empty() {
            return ScanCursor::START;
        }

        let v = cursor.0;

        if !self.is_rehashing() {
            let mask = self.table(0).size_mask as u64;
            let idx = (v & mask) as usize;
            Self::emit_bucket(
                self.table_mut(0),
                idx,
                visit,
                bucket_fn.as_mut().map(|f| &mut **f),
            );
            return ScanCursor(advance(v, mask));
        }

        let (small, large) = if self.table(0).size() <= self.table(1).size() {
            (0, 1)
        } else {
            (1, 0)
        };

        let m0 = self.table(small).size_mask as u64;
        let m1 = self.table(large).size_mask as u64;

        let idx0 = (v & m0) as usize;
        Self::emit_bucket(self.table_mut(small), idx0, visit, bucket_fn.as_deref_mut());

        let mut vv = v;
        loop {
            let idx1 = (vv & m1) as usize;
            Self::emit_bucket(self.table_mut(large), idx1, visit, bucket_fn.as_deref_mut());
            vv = advance(vv, m1);
            if vv & (m0 ^ m1) == 0 {
                break;
            }
        }

        ScanCursor(vv)
    }

    fn emit_bucket(
        table: &mut super::table::Table<K, V>,
        idx: usize,
        visit: &mut dyn FnMut(&K, &V),
        bucket_fn: Option<&mut dyn FnMut(&mut Option<Box<DictNode<K, V>>>)>,
    ) {
        if let Some(bf) = bucket_fn {
            bf(table.bucket_slot_mut(idx));
        }

        let mut cur = table.bucket(idx);
        while let Some(node) = cur {
            visit(&node.key, &node.val);
            cur = node.next.as_deref();
        }
    }
}
