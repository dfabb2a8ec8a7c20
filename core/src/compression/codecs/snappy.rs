//! codecs/snappy.rs
//! Snappy raw format via `snap`. Encoder/decoder state is reused across streams.
use snap::raw::{decompress_len, max_compress_len, Decoder, Encoder};

use crate::compression::types::{check_len, CompressionCodec, CompressionError, Compressor, Decompressor};

pub struct SnappyCompressor {
    encoder: Encoder,
}

pub struct SnappyDecompressor {
    decoder: Decoder,
}

impl SnappyCompressor {
    pub fn new() -> Result<Box<dyn Compressor + Send>, CompressionError> {
        Ok(Box::new(Self { encoder: Encoder::new() }))
    }
}

impl Compressor for SnappyCompressor {
    fn compress_block(&mut self, _clevel: u8, input: &[u8], out: &mut Vec<u8>) -> Result<usize, CompressionError> {
        let start = out.len();
        out.resize(start + max_compress_len(input.len()), 0);
        let written = self.encoder.compress(input, &mut out[start..])
            .map_err(|e| CompressionError::process(CompressionCodec::Snappy, e))?;
        out.truncate(start + written);
        Ok(written)
    }
}

impl SnappyDecompressor {
    pub fn new() -> Result<Box<dyn Decompressor + Send>, CompressionError> {
        Ok(Box::new(Self { decoder: Decoder::new() }))
    }
}

impl Decompressor for SnappyDecompressor {
    fn decompress_block(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        // Reject before allocating: the stream states its own length.
        let declared = decompress_len(input)
            .map_err(|e| CompressionError::process(CompressionCodec::Snappy, e))?;
        check_len(CompressionCodec::Snappy, expected_len, declared)?;

        let start = out.len();
        out.resize(start + expected_len, 0);
        let written = self.decoder.decompress(input, &mut out[start..])
            .map_err(|e| CompressionError::process(CompressionCodec::Snappy, e))?;
        out.truncate(start + written);
        check_len(CompressionCodec::Snappy, expected_len, written)
    }
}
