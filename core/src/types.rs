use std::io;
use thiserror::Error;

use crate::{
    compression::CompressionError,
    filters::FilterError,
    headers::HeaderError,
};

/// Unified error covering codec, wire format, filter and resource failures.
/// - `From<T>` impls enable `?` across the block/chunk layers.
/// - Callers distinguish bad input (`is_bad_input`) from internal resource
///   exhaustion (`is_resource_exhaustion`).
#[derive(Debug, Error)]
pub enum BlockzipError {
    /// Codec backend failed to compress or decompress a stream.
    #[error("codec error: {0}")]
    Codec(#[from] CompressionError),

    /// Chunk header or block table is corrupt or truncated.
    #[error("format error: {0}")]
    Format(#[from] HeaderError),

    /// Filter was handed mismatched buffers.
    #[error("filter error: {0}")]
    Filter(#[from] FilterError),

    /// A mandatory buffer could not be allocated.
    #[error("allocation of {bytes} bytes for {what} failed")]
    Allocation { what: &'static str, bytes: usize },

    /// Destination buffer too small for the decoded chunk.
    #[error("destination too small: have {have}, need {need}")]
    DestinationTooSmall { have: usize, need: usize },

    /// Source exceeds what one chunk can describe.
    #[error("source too large for one chunk: {have} > {max}")]
    SourceTooLarge { have: usize, max: usize },

    /// Chunk index outside the container.
    #[error("chunk index {index} out of range (count {count})")]
    ChunkOutOfRange { index: usize, count: usize },

    /// Container frame index is corrupt or inconsistent with its chunks.
    #[error("frame error: {0}")]
    Frame(String),

    /// Configuration could not be parsed at all (unparsable JSON, not a bad value).
    #[error("configuration parse error: {0}")]
    ConfigParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl BlockzipError {
    /// Data handed to the engine is corrupt, truncated or otherwise unusable.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            BlockzipError::Codec(_)
                | BlockzipError::Format(_)
                | BlockzipError::Filter(_)
                | BlockzipError::Frame(_)
                | BlockzipError::DestinationTooSmall { .. }
                | BlockzipError::SourceTooLarge { .. }
                | BlockzipError::ChunkOutOfRange { .. }
        )
    }

    /// The engine itself ran out of resources; the input may be fine.
    pub fn is_resource_exhaustion(&self) -> bool {
        matches!(self, BlockzipError::Allocation { .. })
    }
}

pub type Result<T> = std::result::Result<T, BlockzipError>;
