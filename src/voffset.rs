//! BGZF virtual file offsets.
//!
//! A virtual offset addresses a byte in the decompressed virtual stream
//! formed by concatenating every BGZF block's payload. The high 48 bits
//! select the compressed byte offset of the block ("coffset"); the low 16
//! bits select a byte within that block's decompressed payload ("uoffset").
//! See "4.1.1 Random access" of the SAM spec.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VirtualOffset(u64);

impl VirtualOffset {
    pub const MIN: VirtualOffset = VirtualOffset(0);

    /// Builds a virtual offset from a block compressed offset and a
    /// within-block uncompressed offset. `uoffset` is masked to 16 bits, as a
    /// BGZF block's decompressed payload is never larger than 65536 bytes.
    pub fn encode(coffset: u64, uoffset: u16) -> Self {
        VirtualOffset((coffset << 16) | u64::from(uoffset))
    }

    pub fn from_raw(raw: u64) -> Self {
        VirtualOffset(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }

    pub fn coffset(self) -> u64 {
        self.0 >> 16
    }

    pub fn uoffset(self) -> u16 {
        (self.0 & 0xffff) as u16
    }
}

impl fmt::Display for VirtualOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(coffset={}, uoffset={})", self.0, self.coffset(), self.uoffset())
    }
}

impl From<u64> for VirtualOffset {
    fn from(raw: u64) -> Self {
        VirtualOffset::from_raw(raw)
    }
}

impl From<VirtualOffset> for u64 {
    fn from(v: VirtualOffset) -> u64 {
        v.raw()
    }
}
