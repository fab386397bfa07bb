//! Interpretation of the Tabix index header's `format` field: which preset
//! (generic / SAM / VCF) governs column semantics, and whether coordinates in
//! the data file are already zero-based.

use crate::TabixError;

const FORMAT_GENERIC: i32 = 0;
const FORMAT_SAM: i32 = 1;
const FORMAT_VCF: i32 = 2;
const FLAG_ZERO_BASED: i32 = 0x10000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Generic,
    Sam,
    Vcf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Format {
    preset: Preset,
    zero_based: bool,
}

impl Format {
    /// Decodes the raw `format` field of a `.tbi` header. Bits outside the
    /// known preset values and the zero-based flag make the index
    /// unreadable, since there is no safe way to guess column semantics.
    pub fn from_raw(raw: i32) -> Result<Self, TabixError> {
        let zero_based = raw & FLAG_ZERO_BASED != 0;
        let preset_bits = raw & !FLAG_ZERO_BASED;
        let preset = match preset_bits {
            FORMAT_GENERIC => Preset::Generic,
            FORMAT_SAM => Preset::Sam,
            FORMAT_VCF => Preset::Vcf,
            other => {
                return Err(TabixError::malformed_index(format!(
                    "unrecognized format field: {other}"
                )))
            }
        };
        Ok(Format { preset, zero_based })
    }

    pub fn preset(self) -> Preset {
        self.preset
    }

    pub fn zero_based(self) -> bool {
        self.zero_based
    }

    /// Converts a record's raw begin column value into a zero-based position.
    ///
    /// The `0x10000` bit only switches the *generic* preset between 1-based
    /// and zero-based columns. SAM's `POS` and VCF's `POS` are always
    /// 1-based regardless of that bit, so those presets unconditionally
    /// subtract one.
    pub fn begin_from_raw(self, raw_begin: u64) -> Result<u64, TabixError> {
        let one_based = match self.preset {
            Preset::Sam | Preset::Vcf => true,
            Preset::Generic => !self.zero_based,
        };
        if one_based {
            raw_begin
                .checked_sub(1)
                .ok_or_else(|| TabixError::line_parse_failure("one-based begin column was zero"))
        } else {
            Ok(raw_begin)
        }
    }

    /// Converts a record's zero-based begin and its raw end column value into
    /// a zero-based, exclusive end position.
    ///
    /// VCF indices carry no usable end column (`col_end` points at `REF`, an
    /// allele string, not a coordinate): the tab-delimited VCF path this
    /// crate supports treats every record as spanning a single base,
    /// `[begin, begin + 1)`, which is the approximation the original spec
    /// permits in place of an `INFO/END`-aware VCF parser.
    pub fn end_from_raw(self, begin: u64, raw_end: Option<u64>) -> u64 {
        match self.preset {
            Preset::Vcf => begin + 1,
            _ => raw_end.unwrap_or(begin + 1),
        }
    }

    /// Whether a record's end column (`col_end`) should be read at all:
    /// never for VCF (see [`Self::end_from_raw`]), and never when the index
    /// itself declares no end column (`col_end == 0`).
    pub fn needs_end_column(self, col_end: u32) -> bool {
        !matches!(self.preset, Preset::Vcf) && col_end > 0
    }
}
