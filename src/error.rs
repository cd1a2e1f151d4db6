//! Error types for classic-compress

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("truncated input while reading {0}")]
    Truncated(&'static str),

    #[error("bad container magic")]
    BadMagic,

    #[error("unsupported container version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown pipeline id {0}")]
    UnknownPipeline(u8),

    #[error("pipeline mismatch: expected {expected}, found {found}")]
    PipelineMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("{0} trailing bytes after container")]
    TrailingData(usize),

    #[error("huffman decoding error: {0}")]
    HuffmanError(String),

    #[error("metadata mismatch: {0}")]
    MetadataMismatch(String),

    #[error("malformed rle data: {0}")]
    MalformedRle(String),

    #[error("invalid lz77 token: {0}")]
    InvalidToken(String),

    #[error("back-reference offset {offset} exceeds {available} bytes produced")]
    InvalidBackReference { offset: usize, available: usize },

    #[error("bwt index {index} out of range for block of {len} bytes")]
    InvalidBwtIndex { index: usize, len: usize },

    #[error("decompression size mismatch: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unsupported extension '{extension}', supported: {supported}")]
    UnsupportedExtension {
        extension: String,
        supported: String,
    },

    #[error("unknown implementation '{implementation}' for '{extension}', available: {available}")]
    UnknownImplementation {
        extension: String,
        implementation: String,
        available: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    SerializationError(String),
}
