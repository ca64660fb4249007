//! Random sampling (§4.6): biased-but-cheap single-key sampling, a
//! chain-length-bias-reducing "fair" variant built on top of it, and a raw
//! windowed sampler the other two share.

use std::hash::{BuildHasher, Hash};

use rand::{rngs::SmallRng, Rng, SeedableRng};

use super::dict::Dict;

/// The injected RNG abstraction all sampling consults — uniform over the
/// platform word width, seedable, not required to be cryptographic.
pub trait RandomSource {
    fn next_u64(&mut self) -> u64;
}

/// The default embedding: `rand`'s `SmallRng`, reseedable from entropy or a
/// caller-supplied seed for reproducible tests.
pub struct SmallRngSource(SmallRng);

impl SmallRngSource {
    pub fn from_entropy() -> Self {
        SmallRngSource(SmallRng::from_entropy())
    }

    pub fn from_seed(seed: u64) -> Self {
        SmallRngSource(SmallRng::seed_from_u64(seed))
    }
}

impl Default for SmallRngSource {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl RandomSource for SmallRngSource {
    fn next_u64(&mut self) -> u64 {
        self.0.gen()
    }
}

/// Reduces chain-length bias in [`Dict::get_fair_random_key`]'s sampling
/// pool before it's appropriate to pay for a full scan.
const FAIR_SAMPLE_SIZE: usize = 15;

/// Caps how many consecutive empty buckets [`Dict::get_some_keys`] will skip,
/// proportional to the number of entries still wanted.
const EMPTY_SKIP_FACTOR: usize = 10;

impl<K, V, S> Dict<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Repeatedly samples a random bucket (covering both tables while
    /// rehashing, skipping buckets already migrated out of `ht[0]`) until a
    /// non-empty one turns up, then picks a uniformly random position along
    /// its chain. Biased towards entries in short chains near the start of
    /// long ones; documented, not fixed, per §4.6.
    pub fn get_random_key<R: RandomSource>(
        &self,
        rng: &mut R,
    ) -> Option<(&K, &V)> {
        if self.is_empty() {
            return None;
        }

        loop {
            let table_idx = self.pick_nonempty_table(rng)?;
            let table = self.table(table_idx);
            if table.size() == 0 {
                continue;
            }

            let mut idx = (rng.next_u64() as usize) & table.size_mask;
            let cursor = self.rehash_cursor();
            if table_idx == 0 && self.is_rehashing() && (idx as isize) < cursor {
                // buckets below rehash_idx in ht[0] have already migrated out.
                idx = cursor as usize
                    + ((rng.next_u64() as usize) % (table.size() - cursor as usize).max(1));
                if idx >= table.size() {
                    continue;
                }
            }

            let chain_len = table.chain_len(idx);
            if chain_len == 0 {
                continue;
            }

            let skip = (rng.next_u64() as usize) % chain_len;
            let mut cur = table.bucket(idx);
            for _ in 0..skip {
                cur = cur.and_then(|n| n.next.as_deref());
            }
            if let Some(node) = cur {
                return Some((&node.key, &node.val));
            }
        }
    }

    fn pick_nonempty_table<R: RandomSource>(
        &self,
        rng: &mut R,
    ) -> Option<usize> {
        if !self.is_rehashing() {
            return Some(0);
        }
        if self.table(0).used == 0 {
            return Some(1);
        }
        if self.table(1).used == 0 {
            return Some(0);
        }
        Some((rng.next_u64() % 2) as usize)
    }

    /// Reduces chain-length bias: draws a small pool via
    /// [`Dict::get_some_keys`] and picks uniformly among it, falling back to
    /// [`Dict::get_random_key`] if the dictionary is too sparse to fill even
    /// that pool.
    pub fn get_fair_random_key<R: RandomSource>(
        &self,
        rng: &mut R,
    ) -> Option<(&K, &V)> {
        let mut pool: Vec<(&K, &V)> = Vec::with_capacity(FAIR_SAMPLE_SIZE);
        self.get_some_keys(rng, FAIR_SAMPLE_SIZE, &mut pool);

        if pool.is_empty() {
            return self.get_random_key(rng);
        }

        let i = (rng.next_u64() as usize) % pool.len();
        Some(pool[i])
    }

    /// Fills `out` with up to `count` entries drawn from a contiguous window
    /// of consecutive buckets starting at a random offset, across both
    /// tables while rehashing. Intended for sampling, not exhaustive
    /// enumeration — gives up after a bounded run of empty buckets.
    pub fn get_some_keys<R: RandomSource>(
        &self,
        rng: &mut R,
        count: usize,
        out: &mut Vec<(&K, &V)>,
    ) {
        if self.is_empty() || count == 0 {
            return;
        }

        let max_empty_skips = EMPTY_SKIP_FACTOR * count;
        let mut empty_skips = 0usize;

        let tables: [usize; 2] = if self.is_rehashing() { [0, 1] } else { [0, 0] };
        let start_table = tables[0];

        let table = self.table(start_table);
        if table.size() == 0 {
            return;
        }
        let mut idx = (rng.next_u64() as usize) & table.size_mask;

        'outer: for t in if self.is_rehashing() { 0..2 } else { 0..1 } {
            let table = self.table(t);
            if table.size() == 0 {
                continue;
            }
            if t == 1 {
                idx &= table.size_mask;
            }

            let mut visited = 0usize;
            while visited < table.size() {
                if out.len() >= count {
                    break 'outer;
                }

                let chain_empty = table.bucket(idx).is_none();
                if chain_empty {
                    empty_skips += 1;
                    if empty_skips >= max_empty_skips {
                        break 'outer;
                    }
                } else {
                    let mut cur = table.bucket(idx);
                    while let Some(node) = cur {
                        if out.len() >= count {
                            break;
                        }
                        out.push((&node.key, &node.val));
                        cur = node.next.as_deref();
                    }
                }

                idx = (idx + 1) & table.size_mask;
                visited += 1;
            }
        }
    }
}
