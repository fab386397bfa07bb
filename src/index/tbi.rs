//! Binary decoder for the Tabix `.tbi` index format.
//!
//! A `.tbi` file is itself BGZF-compressed and begins with the magic `TBI\1`
//! followed by a fixed header, a NUL-separated reference-name table, and then
//! one binning tree + linear index per reference, in the order names appear.

use crate::bin::PSEUDO_BIN;
use crate::format::Format;
use crate::voffset::VirtualOffset;
use crate::{BinaryReader, TabixError};
use std::collections::HashMap;
use std::io::Read;

const MAGIC: [u8; 4] = *b"TBI\x01";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    pub begin: VirtualOffset,
    pub end: VirtualOffset,
}

/// Mapped/unmapped record counts stored under the pseudo-bin, when present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PseudoBinCounts {
    pub mapped: u64,
    pub unmapped: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReferenceIndex {
    pub bins: HashMap<u32, Vec<Chunk>>,
    pub pseudo: Option<PseudoBinCounts>,
    /// Linear index: `linear[i]` is the minimum virtual offset of any record
    /// whose alignment overlaps the 16Kbp window `i`, after the forward-fill
    /// fixup described in `bin.rs`.
    pub linear: Vec<VirtualOffset>,
}

impl ReferenceIndex {
    /// Smallest virtual offset worth seeking to for a query starting at
    /// zero-based position `begin`: chunks entirely before this offset cannot
    /// contain a record overlapping `begin` or later. Per spec, a bucket
    /// beyond the end of the linear index yields `VirtualOffset::MIN` (no
    /// pruning), not the array's last entry.
    pub fn min_voffset_for(&self, begin: u64) -> VirtualOffset {
        let bucket = crate::bin::linear_index_bucket(begin);
        self.linear.get(bucket).copied().unwrap_or(VirtualOffset::MIN)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabixIndex {
    pub format: Format,
    pub col_seq: u32,
    pub col_beg: u32,
    pub col_end: u32,
    pub meta: u8,
    pub skip: u32,
    pub names: Vec<String>,
    pub name_to_ref_id: HashMap<String, u32>,
    pub references: Vec<ReferenceIndex>,
}

impl TabixIndex {
    pub fn ref_id(&self, name: &str) -> Option<u32> {
        self.name_to_ref_id.get(name).copied()
    }

    /// Parses a `.tbi` index from an already-decompressed byte stream (the
    /// caller is responsible for running it through BGZF/gzip decompression;
    /// see [`crate::query::TabixReader::new`]).
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, TabixError> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(TabixError::malformed_index("missing TBI\\1 magic"));
        }

        let n_ref = reader.read_le_i32()?;
        if n_ref < 0 {
            return Err(TabixError::malformed_index("negative n_ref"));
        }
        let format = Format::from_raw(reader.read_le_i32()?)?;
        let col_seq = read_positive_i32(&mut reader, "col_seq")?;
        let col_beg = read_positive_i32(&mut reader, "col_beg")?;
        let col_end = reader.read_le_i32()?.max(0) as u32;
        let meta_raw = reader.read_le_i32()?;
        let meta = u8::try_from(meta_raw.rem_euclid(256)).unwrap_or(b'#');
        let skip = reader.read_le_i32()?.max(0) as u32;
        let l_nm = reader.read_le_i32()?;
        if l_nm < 0 {
            return Err(TabixError::malformed_index("negative l_nm"));
        }

        let mut name_bytes = vec![0u8; l_nm as usize];
        reader.read_exact(&mut name_bytes)?;
        let names = split_names(&name_bytes)?;
        if names.len() != n_ref as usize {
            return Err(TabixError::malformed_index(format!(
                "name count {} does not match n_ref {}",
                names.len(),
                n_ref
            )));
        }

        let mut name_to_ref_id = HashMap::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if name_to_ref_id.insert(name.clone(), i as u32).is_some() {
                return Err(TabixError::malformed_index(format!(
                    "duplicate reference name: {name}"
                )));
            }
        }

        let mut references = Vec::with_capacity(n_ref as usize);
        for _ in 0..n_ref {
            references.push(read_reference_index(&mut reader)?);
        }

        Ok(TabixIndex {
            format,
            col_seq,
            col_beg,
            col_end,
            meta,
            skip,
            names,
            name_to_ref_id,
            references,
        })
    }
}

fn read_positive_i32<R: Read>(reader: &mut R, field: &'static str) -> Result<u32, TabixError> {
    let v = reader.read_le_i32()?;
    if v <= 0 {
        return Err(TabixError::malformed_index(format!(
            "{field} must be positive, got {v}"
        )));
    }
    Ok(v as u32)
}

fn split_names(data: &[u8]) -> Result<Vec<String>, TabixError> {
    data.split(|&b| b == 0)
        .filter(|chunk| !chunk.is_empty())
        .map(|chunk| {
            std::str::from_utf8(chunk)
                .map(str::to_owned)
                .map_err(|_| TabixError::malformed_index("reference name is not valid UTF-8"))
        })
        .collect()
}

fn read_reference_index<R: Read>(reader: &mut R) -> Result<ReferenceIndex, TabixError> {
    let n_bin = reader.read_le_i32()?;
    if n_bin < 0 {
        return Err(TabixError::malformed_index("negative n_bin"));
    }

    let mut bins = HashMap::with_capacity(n_bin as usize);
    let mut pseudo = None;
    for _ in 0..n_bin {
        let bin_id = reader.read_le_u32()?;
        let n_chunk = reader.read_le_i32()?;
        if n_chunk < 0 {
            return Err(TabixError::malformed_index("negative n_chunk"));
        }

        if bin_id == PSEUDO_BIN {
            if n_chunk != 2 {
                return Err(TabixError::malformed_index(
                    "pseudo-bin must carry exactly 2 chunks",
                ));
            }
            let unmapped_begin = reader.read_le_u64()?;
            let unmapped_end = reader.read_le_u64()?;
            let mapped_count = reader.read_le_u64()?;
            let unmapped_count = reader.read_le_u64()?;
            let _ = (unmapped_begin, unmapped_end);
            pseudo = Some(PseudoBinCounts {
                mapped: mapped_count,
                unmapped: unmapped_count,
            });
            continue;
        }

        let mut chunks = Vec::with_capacity(n_chunk as usize);
        for _ in 0..n_chunk {
            let begin = VirtualOffset::from_raw(reader.read_le_u64()?);
            let end = VirtualOffset::from_raw(reader.read_le_u64()?);
            chunks.push(Chunk { begin, end });
        }

        if bins.insert(bin_id, chunks).is_some() {
            return Err(TabixError::malformed_index(format!(
                "duplicate bin id {bin_id} within one reference"
            )));
        }
    }

    let n_intv = reader.read_le_i32()?;
    if n_intv < 0 {
        return Err(TabixError::malformed_index("negative n_intv"));
    }
    let mut linear = Vec::with_capacity(n_intv as usize);
    for _ in 0..n_intv {
        linear.push(VirtualOffset::from_raw(reader.read_le_u64()?));
    }
    forward_fill(&mut linear);

    Ok(ReferenceIndex {
        bins,
        pseudo,
        linear,
    })
}

/// The on-disk linear index stores `0` for windows with no overlapping
/// record's start recorded yet; per the Tabix spec these inherit the nearest
/// following non-zero entry, since a query starting in such a window can
/// still only need to seek as far back as the next window that does have
/// data.
fn forward_fill(linear: &mut [VirtualOffset]) {
    let mut next = VirtualOffset::MIN;
    for entry in linear.iter_mut().rev() {
        if entry.raw() == 0 {
            *entry = next;
        } else {
            next = *entry;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn write_u32_le(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    fn write_i32_le(buf: &mut Vec<u8>, v: i32) {
        buf.extend_from_slice(&v.to_le_bytes());
    }
    fn write_u64_le(buf: &mut Vec<u8>, v: u64) {
        buf.extend_from_slice(&v.to_le_bytes());
    }

    fn minimal_index_bytes(names: &[&str]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MAGIC);
        write_i32_le(&mut buf, names.len() as i32); // n_ref
        write_i32_le(&mut buf, 0); // format: generic
        write_i32_le(&mut buf, 1); // col_seq
        write_i32_le(&mut buf, 2); // col_beg
        write_i32_le(&mut buf, 3); // col_end
        write_i32_le(&mut buf, b'#' as i32); // meta
        write_i32_le(&mut buf, 0); // skip
        let mut name_bytes = Vec::new();
        for name in names {
            name_bytes.extend_from_slice(name.as_bytes());
            name_bytes.push(0);
        }
        write_i32_le(&mut buf, name_bytes.len() as i32); // l_nm
        buf.extend_from_slice(&name_bytes);
        for _ in names {
            write_i32_le(&mut buf, 0); // n_bin
            write_i32_le(&mut buf, 0); // n_intv
        }
        buf
    }

    #[test]
    fn parses_minimal_index_with_no_bins() {
        let bytes = minimal_index_bytes(&["chr1", "chr2"]);
        let index = TabixIndex::from_reader(&bytes[..]).unwrap();
        assert_eq!(index.names, vec!["chr1", "chr2"]);
        assert_eq!(index.ref_id("chr2"), Some(1));
        assert_eq!(index.ref_id("chr3"), None);
        assert_eq!(index.references.len(), 2);
    }

    #[test]
    fn rejects_bad_magic() {
        let err = TabixIndex::from_reader(&b"NOPE"[..]).unwrap_err();
        assert!(matches!(err, TabixError::MalformedIndex { .. }));
    }

    #[test]
    fn rejects_duplicate_bin_ids() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MAGIC);
        write_i32_le(&mut buf, 1);
        write_i32_le(&mut buf, 0);
        write_i32_le(&mut buf, 1);
        write_i32_le(&mut buf, 2);
        write_i32_le(&mut buf, 3);
        write_i32_le(&mut buf, b'#' as i32);
        write_i32_le(&mut buf, 0);
        let name_bytes = b"chr1\0";
        write_i32_le(&mut buf, name_bytes.len() as i32);
        buf.extend_from_slice(name_bytes);
        write_i32_le(&mut buf, 2); // n_bin
        write_u32_le(&mut buf, 100); // bin id
        write_i32_le(&mut buf, 0); // n_chunk
        write_u32_le(&mut buf, 100); // duplicate bin id
        write_i32_le(&mut buf, 0);
        write_i32_le(&mut buf, 0); // n_intv

        let err = TabixIndex::from_reader(&buf[..]).unwrap_err();
        assert!(matches!(err, TabixError::MalformedIndex { .. }));
    }

    #[test]
    fn forward_fill_propagates_from_next_nonzero_entry() {
        let mut linear = vec![
            VirtualOffset::from_raw(0),
            VirtualOffset::from_raw(0),
            VirtualOffset::encode(10, 0),
            VirtualOffset::from_raw(0),
            VirtualOffset::encode(20, 0),
        ];
        forward_fill(&mut linear);
        assert_eq!(linear[0], VirtualOffset::encode(10, 0));
        assert_eq!(linear[1], VirtualOffset::encode(10, 0));
        assert_eq!(linear[3], VirtualOffset::encode(20, 0));
    }

    #[test]
    fn pseudo_bin_is_parsed_out_of_the_bin_map() {
        let mut buf = Vec::new();
        buf.extend_from_slice(&MAGIC);
        write_i32_le(&mut buf, 1);
        write_i32_le(&mut buf, 0);
        write_i32_le(&mut buf, 1);
        write_i32_le(&mut buf, 2);
        write_i32_le(&mut buf, 3);
        write_i32_le(&mut buf, b'#' as i32);
        write_i32_le(&mut buf, 0);
        let name_bytes = b"chr1\0";
        write_i32_le(&mut buf, name_bytes.len() as i32);
        buf.extend_from_slice(name_bytes);
        write_i32_le(&mut buf, 1); // n_bin
        write_u32_le(&mut buf, PSEUDO_BIN);
        write_i32_le(&mut buf, 2); // n_chunk (always 2 for pseudo-bin)
        write_u64_le(&mut buf, 0); // unmapped_begin
        write_u64_le(&mut buf, 0); // unmapped_end
        write_u64_le(&mut buf, 42); // mapped_count
        write_u64_le(&mut buf, 7); // unmapped_count
        write_i32_le(&mut buf, 0); // n_intv

        let index = TabixIndex::from_reader(&buf[..]).unwrap();
        assert!(!index.references[0].bins.contains_key(&PSEUDO_BIN));
        let pseudo = index.references[0].pseudo.unwrap();
        assert_eq!(pseudo.mapped, 42);
        assert_eq!(pseudo.unmapped, 7);
    }
}
