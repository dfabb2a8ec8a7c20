//! codecs/store.rs
//! Pass-through codec. Used for clevel 0 and as a reference backend in tests.

use crate::compression::types::{check_len, CompressionCodec, CompressionError, Compressor, Decompressor};

pub struct StoreCompressor;
pub struct StoreDecompressor;

impl StoreCompressor {
    pub fn new() -> Self { Self }
}
impl StoreDecompressor {
    pub fn new() -> Self { Self }
}

impl Compressor for StoreCompressor {
    fn compress_block(&mut self, _clevel: u8, input: &[u8], out: &mut Vec<u8>) -> Result<usize, CompressionError> {
        out.extend_from_slice(input);
        Ok(input.len())
    }
}

impl Decompressor for StoreDecompressor {
    fn decompress_block(&mut self, input: &[u8], expected_len: usize, out: &mut Vec<u8>) -> Result<(), CompressionError> {
        check_len(CompressionCodec::Store, expected_len, input.len())?;
        out.extend_from_slice(input);
        Ok(())
    }
}
