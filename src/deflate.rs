//! Binding to the DEFLATE library used for BGZF block decompression.
//!
//! This crate is read-only, so only decompression is needed; compression
//! support is deliberately not carried over from the teacher crate this was
//! adapted from.

use thiserror::Error;

use flate2::Status;
pub use flate2::Crc;

/// Decompress Error
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DecompressError {
    #[error("Decompress Error: Insufficient space")]
    InsufficientSpace,
    #[error("Decompress Error: Bad data")]
    BadData,
    #[error("Decompress Error: {0}")]
    Other(String),
}

/// flate2 based decompressor, reused across blocks to amortize allocation.
#[derive(Debug)]
pub struct Decompress(flate2::Decompress);

impl Decompress {
    pub fn new() -> Self {
        Decompress(flate2::Decompress::new(false))
    }

    pub fn decompress(
        &mut self,
        compressed_data: &[u8],
        decompressed_data: &mut [u8],
    ) -> Result<usize, DecompressError> {
        self.0.reset(false);
        match self
            .0
            .decompress(
                compressed_data,
                decompressed_data,
                flate2::FlushDecompress::Finish,
            )
            .map_err(|e| {
                DecompressError::Other(e.message().unwrap_or("Unknown Error").to_string())
            })? {
            Status::StreamEnd => Ok(self.0.total_out().try_into().unwrap()),
            Status::Ok => Err(DecompressError::InsufficientSpace),
            Status::BufError => Err(DecompressError::InsufficientSpace),
        }
    }
}

impl Default for Decompress {
    fn default() -> Self {
        Self::new()
    }
}
