//! tabix-reader
//! ============
//!
//! Random-access reads into [Tabix](https://samtools.github.io/hts-specs/tabix.pdf)-indexed,
//! [BGZF](https://samtools.github.io/hts-specs/SAMv1.pdf)-compressed genomic data files
//! (VCF, GFF, BED and similar tab-delimited formats).
//!
//! Given a `.tbi` index and its data file, [`query::TabixReader`] resolves a
//! `(reference, begin, end)` region to the minimal set of BGZF chunks that can
//! contain overlapping records, decompresses only those chunks, and yields the
//! overlapping lines in file order.
//!
//! This crate is read-only: it never writes BGZF blocks or Tabix indices.
//!
//! Feature flags
//! -------------
//!
//! * `log`: emit diagnostics via the [log](https://github.com/rust-lang/log) crate. Default.
//! * `rust_backend`: use `miniz_oxide` for the [flate2](https://github.com/rust-lang/flate2-rs) backend. Default.
//! * `zlib`, `zlib-ng`, `zlib-ng-compat`, `cloudflare_zlib`: alternative flate2 backends.

pub mod error;

mod deflate;

pub mod bgzf;
pub mod bin;
pub mod format;
pub mod header;
pub mod index;
pub mod planner;
pub mod query;
pub mod voffset;

#[cfg(test)]
mod tests_support;

pub use error::TabixError;
pub use query::{Fetch, TabixReader};
pub use voffset::VirtualOffset;

use std::io;

/// End-of-file marker. Every well-formed BGZF stream ends with this 28-byte
/// empty deflate block.
pub const EOF_MARKER: [u8; 28] = [
    0x1f, 0x8b, 0x08, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0xff, 0x06, 0x00, 0x42, 0x43, 0x02, 0x00,
    0x1b, 0x00, 0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
];

pub(crate) trait BinaryReader: io::Read {
    fn read_le_u8(&mut self) -> io::Result<u8> {
        let mut buf: [u8; 1] = [0];
        self.read_exact(&mut buf)?;
        Ok(u8::from_le_bytes(buf))
    }
    fn read_le_u16(&mut self) -> io::Result<u16> {
        let mut buf: [u8; 2] = [0, 0];
        self.read_exact(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }
    fn read_le_u32(&mut self) -> io::Result<u32> {
        let mut buf: [u8; 4] = [0, 0, 0, 0];
        self.read_exact(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }
    fn read_le_i32(&mut self) -> io::Result<i32> {
        let mut buf: [u8; 4] = [0, 0, 0, 0];
        self.read_exact(&mut buf)?;
        Ok(i32::from_le_bytes(buf))
    }
    fn read_le_u64(&mut self) -> io::Result<u64> {
        let mut buf: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 0];
        self.read_exact(&mut buf)?;
        Ok(u64::from_le_bytes(buf))
    }
    fn read_until(&mut self, byte: u8, buf: &mut Vec<u8>) -> io::Result<usize> {
        let mut tmp = [0u8];
        let mut total_bytes: usize = 0;
        loop {
            let l = self.read(&mut tmp)?;
            if l == 0 {
                break;
            }
            buf.extend_from_slice(&tmp);
            total_bytes += 1;
            if tmp[0] == byte {
                break;
            }
        }

        Ok(total_bytes)
    }
}

impl<R: io::Read> BinaryReader for R {}
