//! Tabix `.tbi` index: binary decoding plus the decompression wrapper needed
//! to read one from a BGZF-compressed `.tbi` file.

pub mod tbi;

pub use tbi::{Chunk, PseudoBinCounts, ReferenceIndex, TabixIndex};

use crate::TabixError;
use std::io::Read;

impl TabixIndex {
    /// Reads a `.tbi` index from its on-disk, BGZF-compressed form.
    pub fn from_bgzf_reader<R: Read>(reader: R) -> Result<Self, TabixError> {
        let decoder = flate2::read::MultiGzDecoder::new(reader);
        TabixIndex::from_reader(decoder)
    }
}
