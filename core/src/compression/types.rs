//! compression/types.rs
//! Codec identifiers, classification and the block codec traits.
use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compression::constants::codec_ids;
use crate::utils::enum_name_or_hex;

/// Codec identifiers as stored in the chunk header.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionCodec {
    Store  = codec_ids::STORE,
    Lz4    = codec_ids::LZ4,
    Lz4hc  = codec_ids::LZ4HC,
    Snappy = codec_ids::SNAPPY,
    Zlib   = codec_ids::ZLIB,
    Zstd   = codec_ids::ZSTD,
}

impl Default for CompressionCodec {
    fn default() -> Self {
        CompressionCodec::Lz4
    }
}

impl CompressionCodec {
    pub fn name(self) -> &'static str {
        match self {
            CompressionCodec::Store  => "store",
            CompressionCodec::Lz4    => "lz4",
            CompressionCodec::Lz4hc  => "lz4hc",
            CompressionCodec::Snappy => "snappy",
            CompressionCodec::Zlib   => "zlib",
            CompressionCodec::Zstd   => "zstd",
        }
    }

    /// Fast codecs that profit from byte-lane splitting regardless of header mode.
    pub fn is_fast(self) -> bool {
        matches!(self, CompressionCodec::Snappy | CompressionCodec::Lz4)
    }

    /// Codecs that legacy readers expect to see split.
    pub fn is_legacy_split(self) -> bool {
        matches!(self, CompressionCodec::Lz4hc | CompressionCodec::Zlib)
    }

    /// Codecs that already exploit cross-byte redundancy.
    pub fn is_high_ratio(self) -> bool {
        matches!(self, CompressionCodec::Lz4hc | CompressionCodec::Zlib | CompressionCodec::Zstd)
    }

    pub fn verify(raw: u8) -> Result<Self, CompressionError> {
        Self::try_from_primitive(raw).map_err(|_| CompressionError::UnsupportedCodec { codec_id: raw })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompressionError {
    #[error("unsupported compression codec: {}", codec_label(.codec_id))]
    UnsupportedCodec { codec_id: u8 },
    #[error("codec {codec} init failed: {msg}")]
    CodecInitFailed { codec: String, msg: String },
    #[error("codec {codec} process failed: {msg}")]
    CodecProcessFailed { codec: String, msg: String },
    #[error("codec {codec} produced {actual} bytes, expected {expected}")]
    SizeMismatch { codec: String, expected: usize, actual: usize },
}

fn codec_label(raw: &u8) -> String {
    enum_name_or_hex::<CompressionCodec>(*raw)
}

impl CompressionError {
    pub(crate) fn process(codec: CompressionCodec, e: impl ToString) -> Self {
        CompressionError::CodecProcessFailed { codec: codec.name().into(), msg: e.to_string() }
    }
}

// Require Send so trait objects can move into worker threads.
pub trait Compressor: Send {
    /// Compress one stream at `clevel` (1..=9), appending to `out`.
    /// Returns the number of bytes appended.
    fn compress_block(&mut self, clevel: u8, input: &[u8], out: &mut Vec<u8>) -> Result<usize, CompressionError>;
}

pub trait Decompressor: Send {
    /// Decompress one stream that must expand to exactly `expected_len` bytes,
    /// appending to `out`.
    fn decompress_block(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError>;
}

/// Shared post-condition for every backend.
pub(crate) fn check_len(codec: CompressionCodec, expected: usize, actual: usize) -> Result<(), CompressionError> {
    if expected != actual {
        return Err(CompressionError::SizeMismatch { codec: codec.name().into(), expected, actual });
    }
    Ok(())
}
