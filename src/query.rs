//! The public query engine: resolves a genomic region to matching lines.

use crate::bgzf::BgzfReader;
use crate::format::Format;
use crate::index::TabixIndex;
use crate::planner::{self, PlannedChunk};
use crate::voffset::VirtualOffset;
use crate::TabixError;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

/// A Tabix-indexed, BGZF-compressed data file opened for random-access
/// reads.
pub struct TabixReader<R> {
    data: BgzfReader<R>,
    index: TabixIndex,
}

impl<R: Read + Seek> TabixReader<R> {
    /// Opens a reader given the data file handle and the (still
    /// BGZF-compressed) `.tbi` index contents.
    pub fn new(data: R, index: impl Read) -> Result<Self, TabixError> {
        let index = TabixIndex::from_bgzf_reader(index)?;
        Ok(TabixReader {
            data: BgzfReader::new(data),
            index,
        })
    }

    /// Reference names in index order.
    pub fn references(&self) -> &[String] {
        &self.index.names
    }

    /// Returns a lazy iterator over lines overlapping `[begin, end)`.
    /// `begin` is 1-based inclusive, `end` is half-open, matching the
    /// conventional Tabix CLI's `region` argument regardless of whether the
    /// index itself stores zero-based coordinates. An unknown `ref_name` or
    /// an empty `[begin, end)` range yields an empty iterator, not an error.
    pub fn fetch(&mut self, ref_name: &str, begin: u64, end: u64) -> Result<Fetch<'_, R>, TabixError> {
        let ref_id = match self.index.ref_id(ref_name) {
            Some(id) => id,
            None => return Ok(Fetch::empty(&mut self.data)),
        };
        if begin >= end {
            return Ok(Fetch::empty(&mut self.data));
        }

        let zbegin = begin.saturating_sub(1);
        let zend = end.saturating_sub(1);

        let reference = &self.index.references[ref_id as usize];
        let chunks = planner::plan_chunks(reference, zbegin, zend);

        #[cfg(feature = "log")]
        log::debug!(
            "fetch {ref_name}:{begin}-{end} resolved to {} chunk(s) after coalescing",
            chunks.len()
        );

        let cursor = chunks.first().map(|c| c.begin).unwrap_or(VirtualOffset::MIN);
        let skip_remaining = if chunks.first().map(|c| c.begin) == Some(VirtualOffset::MIN) {
            self.index.skip
        } else {
            0
        };
        let done = chunks.is_empty();

        Ok(Fetch {
            reader: &mut self.data,
            chunks,
            chunk_idx: 0,
            cursor,
            ref_name: ref_name.to_owned(),
            col_seq: self.index.col_seq,
            col_beg: self.index.col_beg,
            col_end: self.index.col_end,
            meta: self.index.meta,
            format: self.index.format,
            skip_remaining,
            zbegin,
            zend,
            done,
        })
    }
}

impl TabixReader<std::io::BufReader<std::fs::File>> {
    /// Opens `path` and its sibling `<path>.tbi` index.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, TabixError> {
        let path = path.as_ref();
        let data = std::io::BufReader::new(std::fs::File::open(path)?);
        let mut index_path = PathBuf::from(path);
        let mut file_name = index_path
            .file_name()
            .map(|n| n.to_owned())
            .unwrap_or_default();
        file_name.push(".tbi");
        index_path.set_file_name(file_name);
        let index = std::io::BufReader::new(std::fs::File::open(index_path)?);
        TabixReader::new(data, index)
    }
}

/// Lazily yields the lines of one [`TabixReader::fetch`] query, in file
/// order. Dropping this iterator early cancels the query with no leftover
/// state beyond the file handle.
pub struct Fetch<'a, R> {
    reader: &'a mut BgzfReader<R>,
    chunks: Vec<PlannedChunk>,
    chunk_idx: usize,
    cursor: VirtualOffset,
    ref_name: String,
    col_seq: u32,
    col_beg: u32,
    col_end: u32,
    meta: u8,
    format: Format,
    skip_remaining: u32,
    zbegin: u64,
    zend: u64,
    done: bool,
}

impl<'a, R> Fetch<'a, R> {
    fn empty(reader: &'a mut BgzfReader<R>) -> Self {
        Fetch {
            reader,
            chunks: Vec::new(),
            chunk_idx: 0,
            cursor: VirtualOffset::MIN,
            ref_name: String::new(),
            col_seq: 1,
            col_beg: 2,
            col_end: 3,
            meta: b'#',
            format: Format::from_raw(0).expect("0 is a valid format value"),
            skip_remaining: 0,
            zbegin: 0,
            zend: 0,
            done: true,
        }
    }

    fn advance_chunk(&mut self) {
        self.chunk_idx += 1;
        if let Some(chunk) = self.chunks.get(self.chunk_idx) {
            self.cursor = chunk.begin;
        }
    }
}

impl<'a, R: Read + Seek> Iterator for Fetch<'a, R> {
    type Item = Result<Vec<u8>, TabixError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            let Some(chunk) = self.chunks.get(self.chunk_idx) else {
                self.done = true;
                return None;
            };
            if self.cursor >= chunk.end {
                self.advance_chunk();
                continue;
            }

            let read = self.reader.read_line_at(self.cursor);
            let (line, next_cursor) = match read {
                Ok(Some(pair)) => pair,
                Ok(None) => {
                    self.advance_chunk();
                    continue;
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            };
            self.cursor = next_cursor;

            if self.skip_remaining > 0 {
                self.skip_remaining -= 1;
                continue;
            }
            if line.first() == Some(&self.meta) {
                continue;
            }

            match parse_span(&line, self.col_seq, self.col_beg, self.col_end, self.format) {
                Ok((seq, line_begin, line_end)) => {
                    if line_begin >= self.zend {
                        self.done = true;
                        return None;
                    }
                    if seq == self.ref_name.as_bytes() && line_begin < self.zend && line_end > self.zbegin {
                        return Some(Ok(line));
                    }
                }
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Splits `line` on tabs (only as far as needed), and computes its
/// zero-based half-open span `[line_begin, line_end)` and raw sequence-name
/// bytes, per `format`.
fn parse_span<'l>(
    line: &'l [u8],
    col_seq: u32,
    col_beg: u32,
    col_end: u32,
    format: Format,
) -> Result<(&'l [u8], u64, u64), TabixError> {
    let use_end_column = format.needs_end_column(col_end);
    let needed = col_seq.max(col_beg).max(if use_end_column { col_end } else { 0 });
    let fields: Vec<&[u8]> = line.split(|&b| b == b'\t').take(needed as usize).collect();
    if fields.len() < needed as usize {
        return Err(TabixError::line_parse_failure(format!(
            "line has fewer than {needed} columns"
        )));
    }

    let seq = column(&fields, col_seq)?;
    let raw_begin = parse_u64(column(&fields, col_beg)?)?;
    let begin = format.begin_from_raw(raw_begin)?;
    let raw_end = if use_end_column {
        Some(parse_u64(column(&fields, col_end)?)?)
    } else {
        None
    };
    let end = format.end_from_raw(begin, raw_end);

    Ok((seq, begin, end))
}

fn column<'l>(fields: &[&'l [u8]], one_based: u32) -> Result<&'l [u8], TabixError> {
    fields
        .get(one_based as usize - 1)
        .copied()
        .ok_or_else(|| TabixError::line_parse_failure(format!("missing column {one_based}")))
}

fn parse_u64(field: &[u8]) -> Result<u64, TabixError> {
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| {
            TabixError::line_parse_failure(format!(
                "expected an integer coordinate, got {:?}",
                String::from_utf8_lossy(field)
            ))
        })
}
