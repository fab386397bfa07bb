//! BGZF member (gzip) header parsing.
//!
//! A BGZF file is a concatenation of independent gzip "members", each
//! carrying a `BC` extra-subfield that records the member's total on-disk
//! size. This module only parses headers (no header writing -- this crate
//! is read-only); see spec.md section 4.1 for the full byte layout.

use crate::error::TabixError;
use crate::BinaryReader;
use std::convert::TryInto;
use std::io;

pub const GZIP_ID1: u8 = 31;
pub const GZIP_ID2: u8 = 139;
pub const DEFLATE: u8 = 8;

pub const FLAG_FTEXT: u8 = 1;
pub const FLAG_FHCRC: u8 = 2;
pub const FLAG_FEXTRA: u8 = 4;
pub const FLAG_FNAME: u8 = 8;
pub const FLAG_FCOMMENT: u8 = 16;

/// A single gzip EXTRA subfield (`SI1`, `SI2`, data).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraField {
    pub sub_field_id1: u8,
    pub sub_field_id2: u8,
    pub data: Vec<u8>,
}

/// A parsed gzip/BGZF member header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BgzfHeader {
    pub compression_method: u8,
    pub flags: u8,
    pub modified_time: u32,
    pub extra_flags: u8,
    pub operation_system: u8,
    pub extra_field_len: Option<u16>,
    pub extra_field: Vec<ExtraField>,
    pub file_name: Option<Vec<u8>>,
    pub comment: Option<Vec<u8>>,
    pub crc16: Option<u16>,
}

impl BgzfHeader {
    /// Finds the `BC` (`SI1=0x42, SI2=0x43`) subfield and returns the total
    /// on-disk block size it records. Per spec.md section 4.1, the reader
    /// must scan for this subfield rather than assume a fixed position --
    /// other subfields are permitted to precede or follow it.
    pub fn block_size(&self) -> Result<u16, TabixError> {
        self.extra_field
            .iter()
            .find(|x| x.sub_field_id1 == b'B' && x.sub_field_id2 == b'C' && x.data.len() == 2)
            .map(|x| {
                let mut bytes: [u8; 2] = [0, 0];
                bytes.copy_from_slice(&x.data[0..2]);
                u16::from_le_bytes(bytes) + 1
            })
            .ok_or(TabixError::NotBgzf {
                reason: "missing BC extra subfield",
            })
    }

    /// Total byte length of the header itself (gzip fixed fields plus any
    /// EXTRA/FNAME/FCOMMENT/FHCRC fields present).
    pub fn header_size(&self) -> u64 {
        10u64
            + self.extra_field_len.map(|x| u64::from(x) + 2).unwrap_or(0)
            + self
                .file_name
                .as_ref()
                .map(|x| x.len() as u64 + if x.ends_with(&[0]) { 0 } else { 1 })
                .unwrap_or(0)
            + self
                .comment
                .as_ref()
                .map(|x| x.len() as u64 + if x.ends_with(&[0]) { 0 } else { 1 })
                .unwrap_or(0)
            + self.crc16.map(|_| 2).unwrap_or(0)
    }

    /// Parses a gzip header from `reader`. Validates magic, compression
    /// method and flag bits; fails with [`TabixError::MalformedBlock`] on
    /// anything that doesn't look like BGZF.
    pub fn from_reader<R: io::Read>(reader: &mut R) -> Result<Self, TabixError> {
        let mut header_data = [0u8; 10];
        reader.read_exact(&mut header_data)?;

        let id1 = header_data[0];
        let id2 = header_data[1];
        if id1 != GZIP_ID1 || id2 != GZIP_ID2 {
            return Err(TabixError::NotGzip);
        }
        let compression_method = header_data[2];
        if compression_method != DEFLATE {
            return Err(TabixError::malformed_block("unsupported compression method"));
        }
        let flags = header_data[3];
        if flags | 0x1f != 0x1f {
            return Err(TabixError::malformed_block("unsupported gzip flag bits"));
        }
        let modified_time = u32::from_le_bytes(header_data[4..8].try_into().unwrap());
        let extra_flags = header_data[8];
        let operation_system = header_data[9];

        let (extra_field_len, extra_field) = if flags & FLAG_FEXTRA != 0 {
            let len = reader.read_le_u16()?;
            let mut remain_bytes = len;
            let mut fields = Vec::new();
            while remain_bytes > 4 {
                let mut buf = [0u8; 4];
                reader.read_exact(&mut buf)?;
                let sub_field_id1 = buf[0];
                let sub_field_id2 = buf[1];
                let sub_field_len = u16::from_le_bytes([buf[2], buf[3]]);
                let mut buf: Vec<u8> = vec![0; sub_field_len as usize];
                reader.read_exact(&mut buf)?;
                fields.push(ExtraField {
                    sub_field_id1,
                    sub_field_id2,
                    data: buf,
                });
                remain_bytes -= 4 + sub_field_len;
            }
            if remain_bytes != 0 {
                return Err(TabixError::malformed_block("invalid EXTRA field framing"));
            }

            (Some(len), fields)
        } else {
            (None, Vec::new())
        };

        let file_name = if flags & FLAG_FNAME != 0 {
            let mut buf = Vec::new();
            reader.read_until(0, &mut buf)?;
            Some(buf)
        } else {
            None
        };

        let comment = if flags & FLAG_FCOMMENT != 0 {
            let mut buf = Vec::new();
            reader.read_until(0, &mut buf)?;
            Some(buf)
        } else {
            None
        };

        let crc16 = if flags & FLAG_FHCRC != 0 {
            Some(reader.read_le_u16()?)
        } else {
            None
        };

        Ok(BgzfHeader {
            compression_method,
            flags,
            modified_time,
            extra_flags,
            operation_system,
            extra_field_len,
            extra_field,
            file_name,
            comment,
            crc16,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::tests_support::write_bgzf_block;

    #[test]
    fn block_size_finds_bc_subfield_among_others() {
        let mut block = Vec::new();
        write_bgzf_block(&mut block, b"hello world", 0).unwrap();
        let header = BgzfHeader::from_reader(&mut &block[..]).unwrap();
        let size = header.block_size().unwrap();
        assert_eq!(size as usize, block.len());
    }

    #[test]
    fn rejects_non_gzip_magic() {
        let data = [0u8; 20];
        let err = BgzfHeader::from_reader(&mut &data[..]).unwrap_err();
        assert!(matches!(err, TabixError::NotGzip));
    }
}
