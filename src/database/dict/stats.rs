//! Human-readable reporting (§4.8), mirroring the original's `dictGetStats`
//! as an owned `String` instead of a caller-supplied buffer.

use super::table::Table;

/// The chain-length histogram caps its explicit buckets here; anything
/// longer is folded into a single "longer" tally alongside the longest
/// chain actually observed.
const HISTOGRAM_CAP: usize = 50;

fn describe_table<K, V>(
    label: &str,
    table: &Table<K, V>,
    out: &mut String,
) {
    use std::fmt::Write as _;

    let size = table.size();
    let used = table.used;
    let load_factor = if size == 0 { 0.0 } else { used as f64 / size as f64 };

    let _ = writeln!(out, "{label}: size={size} used={used} load_factor={load_factor:.4}");

    if size == 0 {
        return;
    }

    let mut histogram = vec![0usize; HISTOGRAM_CAP + 1];
    let mut longest = 0usize;

    for idx in 0..size {
        let len = table.chain_len(idx);
        longest = longest.max(len);
        let bucket = len.min(HISTOGRAM_CAP);
        histogram[bucket] += 1;
    }

    let _ = writeln!(out, "  longest chain: {longest}");
    for (len, count) in histogram.iter().enumerate() {
        if *count == 0 {
            continue;
        }
        if len == HISTOGRAM_CAP {
            let _ = writeln!(out, "  chains >= {len}: {count}");
        } else {
            let _ = writeln!(out, "  chains of length {len}: {count}");
        }
    }
}

pub(crate) fn format<K, V>(
    ht0: &Table<K, V>,
    ht1: &Table<K, V>,
    rehash_idx: isize,
) -> String {
    let mut out = String::new();
    describe_table("ht[0]", ht0, &mut out);
    if rehash_idx != -1 {
        out.push_str(&format!("rehashing, next_bucket={rehash_idx}\n"));
        describe_table("ht[1]", ht1, &mut out);
    }
    out
}
