//! codecs/lz4hc.rs
//! LZ4 high-compression mode via the liblz4 bindings.
use lz4::block::{compress, decompress, CompressionMode};

use crate::compression::registry::native_level;
use crate::compression::types::{check_len, CompressionCodec, CompressionError, Compressor, Decompressor};

pub struct Lz4hcCompressor;

pub struct Lz4hcDecompressor;

impl Lz4hcCompressor {
    pub fn new() -> Result<Box<dyn Compressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Compressor for Lz4hcCompressor {
    fn compress_block(&mut self, clevel: u8, input: &[u8], out: &mut Vec<u8>) -> Result<usize, CompressionError> {
        let level = native_level(CompressionCodec::Lz4hc, clevel);
        // Raw block, no size prefix: the chunk header carries the length.
        let compressed = compress(input, Some(CompressionMode::HIGHCOMPRESSION(level)), false)
            .map_err(|e| CompressionError::process(CompressionCodec::Lz4hc, e))?;
        out.extend_from_slice(&compressed);
        Ok(compressed.len())
    }
}

impl Lz4hcDecompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Decompressor for Lz4hcDecompressor {
    fn decompress_block(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let size = i32::try_from(expected_len)
            .map_err(|e| CompressionError::process(CompressionCodec::Lz4hc, e))?;
        let decompressed = decompress(input, Some(size))
            .map_err(|e| CompressionError::process(CompressionCodec::Lz4hc, e))?;
        check_len(CompressionCodec::Lz4hc, expected_len, decompressed.len())?;
        out.extend_from_slice(&decompressed);
        Ok(())
    }
}
