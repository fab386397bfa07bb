//! Test-only fixture builders.
//!
//! This crate never writes BGZF or Tabix files as part of its public API
//! (writing indices is an explicit non-goal), but tests need realistic byte
//! streams to exercise the reader/decoder against. These helpers build them
//! directly with `flate2`, mirroring the framing `header.rs`/`bgzf.rs` parse,
//! without introducing a public writer type.

use flate2::Crc;
use std::convert::TryInto;
use std::io::{self, Write};

/// Appends one BGZF member containing `data` to `out`. Uses a fixed `mtime`
/// so fixtures are reproducible across test runs.
pub(crate) fn write_bgzf_block(out: &mut Vec<u8>, data: &[u8], mtime: u32) -> io::Result<()> {
    assert!(data.len() <= 0xffff, "BGZF block payload must fit in 64KiB");

    let mut deflated = Vec::new();
    {
        let mut encoder =
            flate2::write::DeflateEncoder::new(&mut deflated, flate2::Compression::default());
        encoder.write_all(data)?;
        encoder.finish()?;
    }

    let mut crc = Crc::new();
    crc.update(data);

    // header: fixed 10 bytes + XLEN(2) + BC subfield(6)
    let extra_len: u16 = 6;
    let block_size: u64 = 10 + 2 + u64::from(extra_len) + deflated.len() as u64 + 8;
    let bsize: u16 = (block_size - 1).try_into().expect("block too large");

    out.extend_from_slice(&[0x1f, 0x8b, 0x08, 0x04]); // ID1 ID2 CM FLG(FEXTRA)
    out.extend_from_slice(&mtime.to_le_bytes());
    out.push(0); // XFL
    out.push(0xff); // OS unknown
    out.extend_from_slice(&extra_len.to_le_bytes());
    out.extend_from_slice(&[b'B', b'C', 2, 0]);
    out.extend_from_slice(&bsize.to_le_bytes());
    out.extend_from_slice(&deflated);
    out.extend_from_slice(&crc.sum().to_le_bytes());
    out.extend_from_slice(&(data.len() as u32).to_le_bytes());

    Ok(())
}

/// Appends the 28-byte BGZF EOF marker.
pub(crate) fn write_eof_marker(out: &mut Vec<u8>) {
    out.extend_from_slice(&crate::EOF_MARKER);
}

/// Splits `lines` (each without trailing `\n`) across `block_size` so a
/// single record may straddle a block boundary, producing a multi-block BGZF
/// stream. Returns the stream bytes and the zero-based uncompressed offset
/// of the first byte of each line.
pub(crate) fn write_bgzf_stream(lines: &[&[u8]], block_size: usize) -> (Vec<u8>, Vec<u64>) {
    let mut payload = Vec::new();
    let mut line_offsets = Vec::new();
    for line in lines {
        line_offsets.push(payload.len() as u64);
        payload.extend_from_slice(line);
        payload.push(b'\n');
    }

    let mut out = Vec::new();
    let mut pos = 0;
    while pos < payload.len() {
        let end = (pos + block_size).min(payload.len());
        write_bgzf_block(&mut out, &payload[pos..end], 0).unwrap();
        pos = end;
    }
    write_eof_marker(&mut out);

    (out, line_offsets)
}
