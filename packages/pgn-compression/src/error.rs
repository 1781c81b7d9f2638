use crate::container::Scheme;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PgnCompressionError {
    #[error("input is not valid UTF-8: {0}")]
    InvalidInput(#[from] std::str::Utf8Error),
    #[error("corrupt stream: {0}")]
    CorruptStream(#[from] CorruptStreamError),
    #[error("unsupported scheme tag {tag:#04x} (format version {version})")]
    UnsupportedScheme { tag: u8, version: u8 },
    #[error("encoder limit exceeded: {0}")]
    Encoding(String),
}

impl PgnCompressionError {
    pub fn is_corrupt_stream(&self) -> bool {
        matches!(self, PgnCompressionError::CorruptStream(_))
    }
}

/// Reasons a compressed container was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorruptStreamError {
    #[error("container truncated: need {needed} bytes, got {available}")]
    Truncated { needed: usize, available: usize },
    #[error("container holds a {found} stream, expected {expected}")]
    SchemeMismatch { expected: Scheme, found: Scheme },
    #[error("variable-length integer overflows 64 bits")]
    VarintOverflow,
    #[error("bit stream ended before the declared symbol count was decoded")]
    UnexpectedEndOfBits,
    #[error("no code matches the bits at position {position}")]
    InvalidCode { position: usize },
    #[error("{bits} unused bits remain after the last symbol")]
    TrailingBits { bits: usize },
    #[error("inconsistent code table: {0}")]
    InconsistentTable(&'static str),
    #[error("code length {length} exceeds the 64-bit limit")]
    CodeLengthOverflow { length: usize },
    #[error("failed to decode code table: {0}")]
    TableDecode(String),
    #[error("failed to decode structural payload: {0}")]
    PayloadDecode(String),
    #[error("decoded text is not valid UTF-8")]
    InvalidUtf8,
    #[error("decoded text does not re-encode to the same container")]
    NonCanonical,
}

pub type Result<T> = std::result::Result<T, PgnCompressionError>;
