//! BGZF block loading with a small LRU cache of decompressed blocks.
//!
//! Tabix queries revisit the same block repeatedly (several chunks can land
//! in one block, and adjacent chunks from coalescing still need the block
//! they start in read again for a handful of bytes), so blocks are cached by
//! their compressed offset rather than decompressed on every access.

use crate::deflate::Decompress;
use crate::header::BgzfHeader;
use crate::voffset::VirtualOffset;
use crate::TabixError;
use std::collections::HashMap;
use std::io::{self, Read, Seek, SeekFrom};

const DEFAULT_CACHE_LIMIT: usize = 32;

struct CachedBlock {
    /// Compressed size of this member, including header and footer.
    block_size: u64,
    payload: Vec<u8>,
}

/// Reads BGZF-compressed data by compressed byte offset, caching the most
/// recently used decompressed blocks.
pub struct BgzfReader<R> {
    inner: R,
    cache: HashMap<u64, CachedBlock>,
    cache_order: Vec<u64>,
    cache_limit: usize,
    decompress: Decompress,
}

impl<R: Read + Seek> BgzfReader<R> {
    pub fn new(inner: R) -> Self {
        Self::with_cache_limit(inner, DEFAULT_CACHE_LIMIT)
    }

    pub fn with_cache_limit(inner: R, cache_limit: usize) -> Self {
        BgzfReader {
            inner,
            cache: HashMap::new(),
            cache_order: Vec::with_capacity(cache_limit),
            cache_limit,
            decompress: Decompress::new(),
        }
    }

    /// Loads (decompressing if necessary) the block starting at `coffset` and
    /// returns its decompressed payload and total compressed size.
    fn load_block(&mut self, coffset: u64) -> Result<(&[u8], u64), TabixError> {
        if !self.cache.contains_key(&coffset) {
            self.decode_block(coffset)?;
        } else {
            self.touch(coffset);
        }
        let block = self.cache.get(&coffset).expect("just inserted or present");
        Ok((&block.payload, block.block_size))
    }

    fn touch(&mut self, coffset: u64) {
        if let Some(pos) = self.cache_order.iter().position(|&c| c == coffset) {
            let c = self.cache_order.remove(pos);
            self.cache_order.push(c);
        }
    }

    fn decode_block(&mut self, coffset: u64) -> Result<(), TabixError> {
        self.inner.seek(SeekFrom::Start(coffset))?;
        let header = BgzfHeader::from_reader(&mut self.inner)?;
        let block_size = u64::from(header.block_size()?);
        let compressed_len = block_size
            .checked_sub(header.header_size())
            .and_then(|v| v.checked_sub(8 /* CRC32 + ISIZE footer */))
            .ok_or_else(|| TabixError::malformed_block("block size smaller than its own header"))?;

        let mut compressed = vec![0u8; compressed_len as usize];
        self.inner.read_exact(&mut compressed)?;
        let crc32 = read_le_u32(&mut self.inner)?;
        let isize_ = read_le_u32(&mut self.inner)?;

        let mut payload = vec![0u8; isize_ as usize];
        let written = self
            .decompress
            .decompress(&compressed, &mut payload)
            .map_err(|e| TabixError::malformed_block(format!("deflate error: {e}")))?;
        if written != payload.len() {
            return Err(TabixError::malformed_block(
                "decompressed size does not match ISIZE footer",
            ));
        }

        let mut crc = crate::deflate::Crc::new();
        crc.update(&payload);
        if crc.sum() != crc32 {
            return Err(TabixError::malformed_block("CRC32 mismatch"));
        }

        #[cfg(feature = "log")]
        log::trace!(
            "decoded BGZF block at coffset={} ({} bytes compressed, {} bytes decompressed)",
            coffset,
            block_size,
            payload.len()
        );

        if self.cache_limit <= self.cache_order.len() {
            let evicted = self.cache_order.remove(0);
            self.cache.remove(&evicted);
            #[cfg(feature = "log")]
            log::trace!("evicted cached block at coffset={}", evicted);
        }
        self.cache_order.push(coffset);
        self.cache.insert(
            coffset,
            CachedBlock {
                block_size,
                payload,
            },
        );

        Ok(())
    }

    /// Reads the bytes of the virtual stream starting at `begin` (inclusive)
    /// and ending at `end` (exclusive), following the BGZF block chain as
    /// needed. `end` may fall anywhere in a later block, including its first
    /// byte (an empty range is returned in that case).
    pub fn read_virtual_range(
        &mut self,
        begin: VirtualOffset,
        end: VirtualOffset,
    ) -> Result<Vec<u8>, TabixError> {
        if begin >= end {
            return Ok(Vec::new());
        }
        let mut out = Vec::new();
        let mut coffset = begin.coffset();
        let mut uoffset = begin.uoffset() as usize;
        loop {
            let (payload, block_size) = self.load_block(coffset)?;
            let payload_len = payload.len();
            let stop_here = coffset == end.coffset();
            let slice_end = if stop_here {
                (end.uoffset() as usize).min(payload_len)
            } else {
                payload_len
            };
            if uoffset < slice_end {
                out.extend_from_slice(&payload[uoffset..slice_end]);
            }
            if stop_here {
                break;
            }
            coffset += block_size;
            uoffset = 0;
            if coffset > end.coffset() && payload_len == 0 {
                // Ran off the end of the virtual stream (truncated file).
                break;
            }
        }
        Ok(out)
    }

    /// Reads a single line (without the trailing `\n`) starting at the given
    /// virtual offset, following block boundaries as needed. Returns `None`
    /// at end of stream (an empty, final BGZF block).
    pub fn read_line_at(&mut self, start: VirtualOffset) -> Result<Option<(Vec<u8>, VirtualOffset)>, TabixError> {
        let mut out = Vec::new();
        let mut coffset = start.coffset();
        let mut uoffset = start.uoffset() as usize;
        loop {
            let (payload, block_size) = self.load_block(coffset)?;
            if payload.is_empty() {
                return if out.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some((out, VirtualOffset::encode(coffset, uoffset as u16))))
                };
            }
            if uoffset >= payload.len() {
                coffset += block_size;
                uoffset = 0;
                continue;
            }
            match payload[uoffset..].iter().position(|&b| b == b'\n') {
                Some(rel) => {
                    out.extend_from_slice(&payload[uoffset..uoffset + rel]);
                    let next = VirtualOffset::encode(coffset, (uoffset + rel + 1) as u16);
                    return Ok(Some((out, next)));
                }
                None => {
                    out.extend_from_slice(&payload[uoffset..]);
                    coffset += block_size;
                    uoffset = 0;
                }
            }
        }
    }
}

fn read_le_u32<R: Read>(r: &mut R) -> io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}
