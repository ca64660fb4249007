use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex, OnceLock,
};

/// Process-wide switch consulted by the auto-expand trigger (§4.1) and by
/// [`super::Dict::resize`]. Long-lived persistence routines that want a
/// stable view of the table during a point-in-time snapshot toggle this off
/// for their duration; it does not pause an already-armed rehash.
static RESIZE_ENABLED: AtomicBool = AtomicBool::new(true);

pub fn enable_resize() {
    RESIZE_ENABLED.store(true, Ordering::Relaxed);
}

pub fn disable_resize() {
    RESIZE_ENABLED.store(false, Ordering::Relaxed);
}

pub(crate) fn resize_enabled() -> bool {
    RESIZE_ENABLED.load(Ordering::Relaxed)
}

static HASH_SEED: OnceLock<Mutex<[u8; 16]>> = OnceLock::new();

fn seed_cell() -> &'static Mutex<[u8; 16]> {
    HASH_SEED.get_or_init(|| Mutex::new([0u8; 16]))
}

/// Sets the 16-byte key used by [`super::hash_bytes`] / [`super::hash_bytes_ci`].
/// Process-wide, matching the original's single embedder-settable seed.
pub fn set_hash_seed(seed: [u8; 16]) {
    *seed_cell().lock().unwrap() = seed;
}

pub fn get_hash_seed() -> [u8; 16] {
    *seed_cell().lock().unwrap()
}
