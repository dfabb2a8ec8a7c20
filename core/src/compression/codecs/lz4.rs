//! codecs/lz4.rs
//! LZ4 block codec (fast mode) via lz4_flex.
use lz4_flex::block::{compress_into, decompress_into, get_maximum_output_size};

use crate::compression::types::{check_len, CompressionCodec, CompressionError, Compressor, Decompressor};

/// LZ4 has no effort levels in block mode; `clevel` only gates store vs compress
/// upstream.
pub struct Lz4Compressor;

pub struct Lz4Decompressor;

impl Lz4Compressor {
    pub fn new() -> Result<Box<dyn Compressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Compressor for Lz4Compressor {
    fn compress_block(&mut self, _clevel: u8, input: &[u8], out: &mut Vec<u8>) -> Result<usize, CompressionError> {
        let start = out.len();
        out.resize(start + get_maximum_output_size(input.len()), 0);
        let written = compress_into(input, &mut out[start..])
            .map_err(|e| CompressionError::process(CompressionCodec::Lz4, e))?;
        out.truncate(start + written);
        Ok(written)
    }
}

impl Lz4Decompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Decompressor for Lz4Decompressor {
    fn decompress_block(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let start = out.len();
        out.resize(start + expected_len, 0);
        let written = decompress_into(input, &mut out[start..])
            .map_err(|e| CompressionError::process(CompressionCodec::Lz4, e))?;
        out.truncate(start + written);
        check_len(CompressionCodec::Lz4, expected_len, written)
    }
}
