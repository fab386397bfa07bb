//! Hierarchical binning over the genome, as used by the Tabix/CSI indexing
//! scheme: a 6-level tree with `MIN_SHIFT=14`, `DEPTH=5` and a fan-out of 8
//! per level, giving bins that span 16Kbp at the leaves up to 512Mbp at the
//! root.

pub const MIN_SHIFT: u32 = 14;
pub const DEPTH: u32 = 5;

/// Bin id reserved for per-reference mapped/unmapped record counts. Never a
/// real spatial bin; excluded from query candidate sets.
pub const PSEUDO_BIN: u32 = 37450;

/// Size in bytes of one linear-index window.
pub const LINEAR_INDEX_WINDOW: u64 = 1 << 14;

/// Returns the bin that fully contains the half-open interval `[beg, end)`
/// (zero-based coordinates).
pub fn bin_for_pos(beg: u64, end: u64) -> u32 {
    let end = end.max(beg + 1) - 1;
    let mut s = MIN_SHIFT;
    let mut t = ((1u64 << (DEPTH * 3)) - 1) / 7;

    for l2 in 0..DEPTH {
        let l = DEPTH - l2;
        if beg >> s == end >> s {
            return (t + (beg >> s)) as u32;
        }
        s += 3;
        t -= 1 << ((l - 1) * 3);
    }

    0
}

/// Returns every bin that can overlap the half-open interval `[beg, end)`.
/// This is a superset of the bins that actually contain overlapping records
/// (see spec's note on approximate coverage); pruning happens later via the
/// linear index.
pub fn bins_for_interval(beg: u64, end: u64) -> Vec<u32> {
    let mut bins = Vec::new();
    let end = end.max(beg + 1) - 1;
    let mut s = MIN_SHIFT + DEPTH * 3;
    let mut t: u64 = 0;

    for l in 0..=DEPTH {
        let b = t + (beg >> s);
        let e = t + (end >> s);
        for i in b..=e {
            bins.push(i as u32);
        }
        s -= 3;
        t += 1 << (l * 3);
    }

    bins
}

/// Index into the per-reference linear index (one entry per 16Kbp window)
/// that covers zero-based position `pos`.
pub fn linear_index_bucket(pos: u64) -> usize {
    (pos >> MIN_SHIFT) as usize
}
