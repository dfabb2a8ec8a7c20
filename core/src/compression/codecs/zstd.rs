//! src/compression/codecs/zstd.rs
//!
//! Zstd block codec.
//!
//! Design notes:
//! - Uses the bulk API: each stream is a standalone zstd frame.
//! - A bulk context is kept per compressor/decompressor and reused across
//!   streams, so one Context never reallocates zstd state per block.
//! - Errors are mapped into `CompressionError` variants with codec context.

use crate::compression::registry::native_level;
use crate::compression::types::{check_len, CompressionCodec, CompressionError, Compressor, Decompressor};

pub struct ZstdCompressor {
    inner: zstd::bulk::Compressor<'static>,
    level: i32,
}

pub struct ZstdDecompressor {
    inner: zstd::bulk::Decompressor<'static>,
}

impl ZstdCompressor {
    /// # Errors
    /// - Returns `CompressionError::CodecInitFailed` if the zstd context cannot be created.
    pub fn new() -> Result<Box<dyn Compressor + Send>, CompressionError> {
        let level = native_level(CompressionCodec::Zstd, crate::constants::DEFAULT_CLEVEL);
        let inner = zstd::bulk::Compressor::new(level)
            .map_err(|e| CompressionError::CodecInitFailed { codec: "zstd".into(), msg: e.to_string() })?;
        Ok(Box::new(Self { inner, level }))
    }
}

impl Compressor for ZstdCompressor {
    fn compress_block(&mut self, clevel: u8, input: &[u8], out: &mut Vec<u8>) -> Result<usize, CompressionError> {
        let level = native_level(CompressionCodec::Zstd, clevel);
        if level != self.level {
            self.inner.set_compression_level(level)
                .map_err(|e| CompressionError::process(CompressionCodec::Zstd, e))?;
            self.level = level;
        }

        let compressed = self.inner.compress(input)
            .map_err(|e| CompressionError::process(CompressionCodec::Zstd, e))?;
        out.extend_from_slice(&compressed);
        Ok(compressed.len())
    }
}

impl ZstdDecompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        let inner = zstd::bulk::Decompressor::new()
            .map_err(|e| CompressionError::CodecInitFailed { codec: "zstd".into(), msg: e.to_string() })?;
        Ok(Box::new(Self { inner }))
    }
}

impl Decompressor for ZstdDecompressor {
    fn decompress_block(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        // Decompress with known output size
        let decompressed = self.inner.decompress(input, expected_len)
            .map_err(|e| CompressionError::process(CompressionCodec::Zstd, e))?;

        check_len(CompressionCodec::Zstd, expected_len, decompressed.len())?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
