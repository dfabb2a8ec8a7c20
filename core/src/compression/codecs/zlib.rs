//! Zlib (deflate with zlib wrapper) via flate2.

use std::io::Read;
use std::io::Write;
use flate2::{Compression, write::ZlibEncoder, read::ZlibDecoder};

use crate::compression::registry::native_level;
use crate::compression::types::{check_len, CompressionCodec, CompressionError, Compressor, Decompressor};

pub struct ZlibCompressor;

impl ZlibCompressor {
    pub fn new() -> Result<Box<dyn Compressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Compressor for ZlibCompressor {
    fn compress_block(&mut self, clevel: u8, input: &[u8], out: &mut Vec<u8>) -> Result<usize, CompressionError> {
        let level = Compression::new(native_level(CompressionCodec::Zlib, clevel) as u32);
        let start = out.len();

        // Encode this stream as its own zlib stream, straight into `out`
        let mut enc = ZlibEncoder::new(&mut *out, level);
        enc.write_all(input)
            .map_err(|e| CompressionError::process(CompressionCodec::Zlib, e))?;
        enc.finish()
            .map_err(|e| CompressionError::process(CompressionCodec::Zlib, e))?;

        Ok(out.len() - start)
    }
}

pub struct ZlibDecompressor;

impl ZlibDecompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self))
    }
}

impl Decompressor for ZlibDecompressor {
    fn decompress_block(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        let start = out.len();
        out.reserve(expected_len);

        // Never read past what the header promised; a longer stream is corrupt.
        let mut dec = ZlibDecoder::new(input).take(expected_len as u64 + 1);
        dec.read_to_end(out)
            .map_err(|e| CompressionError::process(CompressionCodec::Zlib, e))?;

        check_len(CompressionCodec::Zlib, expected_len, out.len() - start)
    }
}
