use thiserror::Error;

/// Errors produced while decoding a Tabix index, reading BGZF blocks, or
/// parsing data-file lines during a query.
///
/// `UnknownReference` and `EmptyRegion` are deliberately *not* variants here:
/// both are non-error outcomes, reported by
/// [`crate::query::TabixReader::fetch`] returning an iterator that simply
/// yields nothing.
#[derive(Debug, Error)]
pub enum TabixError {
    #[error("not gzip format")]
    NotGzip,
    #[error("not BGZF format: {reason}")]
    NotBgzf { reason: &'static str },
    #[error("malformed Tabix index: {reason}")]
    MalformedIndex { reason: String },
    #[error("malformed BGZF block: {reason}")]
    MalformedBlock { reason: String },
    #[error("failed to parse data line: {reason}")]
    LineParseFailure { reason: String },
    #[error("Utf8 error: {0}")]
    Utf8Error(#[from] std::str::Utf8Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl TabixError {
    pub(crate) fn malformed_index(reason: impl Into<String>) -> Self {
        TabixError::MalformedIndex {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_block(reason: impl Into<String>) -> Self {
        TabixError::MalformedBlock {
            reason: reason.into(),
        }
    }

    pub(crate) fn line_parse_failure(reason: impl Into<String>) -> Self {
        TabixError::LineParseFailure {
            reason: reason.into(),
        }
    }

    pub fn into_io_error(self) -> std::io::Error {
        self.into()
    }
}

/// Converts a [`TabixError`] into an [`std::io::Error`], for use inside
/// [`std::io::Read`]/[`std::io::BufRead`] implementations that cannot return
/// this crate's richer error type.
impl From<TabixError> for std::io::Error {
    fn from(e: TabixError) -> std::io::Error {
        match e {
            TabixError::Io(e) => e,
            other => std::io::Error::new(std::io::ErrorKind::Other, other),
        }
    }
}
