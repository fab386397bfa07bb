//! Resolves a `(reference, begin, end)` region to the minimal, sorted,
//! non-overlapping list of BGZF chunks worth scanning.

use crate::bin::bins_for_interval;
use crate::index::ReferenceIndex;
use crate::voffset::VirtualOffset;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlannedChunk {
    pub begin: VirtualOffset,
    pub end: VirtualOffset,
}

/// Collects every chunk from every bin that can overlap `[begin, end)`,
/// drops chunks the linear index proves end before any record of interest,
/// sorts by start offset, and coalesces runs of overlapping/adjacent chunks
/// into single reads.
pub fn plan_chunks(reference: &ReferenceIndex, begin: u64, end: u64) -> Vec<PlannedChunk> {
    let min_voffset = reference.min_voffset_for(begin);

    let mut candidates: Vec<PlannedChunk> = bins_for_interval(begin, end)
        .into_iter()
        .filter_map(|bin| reference.bins.get(&bin))
        .flat_map(|chunks| chunks.iter())
        .filter(|chunk| chunk.end > min_voffset)
        .map(|chunk| PlannedChunk {
            begin: chunk.begin,
            end: chunk.end,
        })
        .collect();

    candidates.sort_by_key(|c| c.begin);

    let mut merged: Vec<PlannedChunk> = Vec::with_capacity(candidates.len());
    for chunk in candidates {
        match merged.last_mut() {
            Some(last) if chunk.begin <= last.end => {
                if chunk.end > last.end {
                    last.end = chunk.end;
                }
            }
            _ => merged.push(chunk),
        }
    }

    merged
}
