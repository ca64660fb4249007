//! Standalone byte-buffer hashing, independent of a `Dict`'s own
//! `BuildHasher`. The table never calls these on its own hot path — they
//! exist for callers that want the same keyed hash the original exposed
//! (e.g. computing a stable hash for a key before it's wrapped in whatever
//! `K` the caller's `Dict` actually uses).

use std::hash::Hasher;

use siphasher::sip::SipHasher13;

use super::global::get_hash_seed;

fn keyed_hasher() -> SipHasher13 {
    let seed = get_hash_seed();
    let k0 = u64::from_le_bytes(seed[0..8].try_into().unwrap());
    let k1 = u64::from_le_bytes(seed[8..16].try_into().unwrap());
    SipHasher13::new_with_keys(k0, k1)
}

/// SipHash-1-3 over `bytes`, keyed by the process-wide seed set through
/// [`super::set_hash_seed`].
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut hasher = keyed_hasher();
    hasher.write(bytes);
    hasher.finish()
}

/// Case-insensitive variant: lower-cases ASCII bytes before mixing, matching
/// the original's `dictGenCaseHashFunction` for table types whose keys are
/// ASCII strings compared case-insensitively.
pub fn hash_bytes_ci(bytes: &[u8]) -> u64 {
    let mut hasher = keyed_hasher();
    for chunk in bytes.chunks(64) {
        let lowered: Vec<u8> = chunk.iter().map(u8::to_ascii_lowercase).collect();
        hasher.write(&lowered);
    }
    hasher.finish()
}
