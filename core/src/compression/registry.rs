//! compression/registry.rs
//! Codec registry and factory functions.

use crate::compression::constants::{LZ4HC_MAX_LEVEL, ZSTD_MAX_LEVEL};
use crate::compression::types::{CompressionCodec, CompressionError, Compressor, Decompressor};
use crate::compression::codecs::{lz4, lz4hc, snappy, store, zlib, zstd};

pub struct CodecInfo {
    pub codec: CompressionCodec,
    /// Codec-native level used for the caller's `clevel` 1..=9.
    pub level_range: (i32, i32),
}

impl CodecInfo {
    pub fn name(&self) -> &'static str {
        self.codec.name()
    }

    pub fn is_high_ratio(&self) -> bool {
        self.codec.is_high_ratio()
    }
}

pub fn resolve(codec: CompressionCodec) -> CodecInfo {
    let level_range = match codec {
        CompressionCodec::Store | CompressionCodec::Lz4 | CompressionCodec::Snappy => (0, 0),
        CompressionCodec::Lz4hc => (1, LZ4HC_MAX_LEVEL),
        CompressionCodec::Zlib  => (1, 9),
        CompressionCodec::Zstd  => (1, ZSTD_MAX_LEVEL),
    };
    CodecInfo { codec, level_range }
}

pub fn create_compressor(codec: CompressionCodec)
    -> Result<Box<dyn Compressor + Send>, CompressionError>
{
    match codec {
        CompressionCodec::Store  => Ok(Box::new(store::StoreCompressor::new())),
        CompressionCodec::Lz4    => lz4::Lz4Compressor::new(),
        CompressionCodec::Lz4hc  => lz4hc::Lz4hcCompressor::new(),
        CompressionCodec::Snappy => snappy::SnappyCompressor::new(),
        CompressionCodec::Zlib   => zlib::ZlibCompressor::new(),
        CompressionCodec::Zstd   => zstd::ZstdCompressor::new(),
    }
}

pub fn create_decompressor(codec: CompressionCodec)
    -> Result<Box<dyn Decompressor + Send>, CompressionError>
{
    match codec {
        CompressionCodec::Store  => Ok(Box::new(store::StoreDecompressor::new())),
        CompressionCodec::Lz4    => lz4::Lz4Decompressor::new(),
        CompressionCodec::Lz4hc  => lz4hc::Lz4hcDecompressor::new(),
        CompressionCodec::Snappy => snappy::SnappyDecompressor::new(),
        CompressionCodec::Zlib   => zlib::ZlibDecompressor::new(),
        CompressionCodec::Zstd   => zstd::ZstdDecompressor::new(),
    }
}

/// Map a caller level (1..=9) onto the codec's native scale.
pub fn native_level(codec: CompressionCodec, clevel: u8) -> i32 {
    let (lo, hi) = resolve(codec).level_range;
    if hi == lo {
        return lo;
    }
    let clevel = clevel.clamp(1, 9) as i32;
    if clevel == 9 {
        return hi;
    }
    (lo + (clevel - 1) * (hi - lo) / 8).clamp(lo, hi)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn info_follows_codec() {
        let info = resolve(CompressionCodec::Zstd);
        assert_eq!(info.name(), "zstd");
        assert!(info.is_high_ratio());
        assert!(!resolve(CompressionCodec::Snappy).is_high_ratio());
        assert_eq!(native_level(CompressionCodec::Zstd, 9), ZSTD_MAX_LEVEL);
        assert_eq!(native_level(CompressionCodec::Lz4, 9), 0);
    }
}
