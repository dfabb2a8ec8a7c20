//! src/headers/encode.rs
//!
//! Chunk header encoding.
//!
//! Design notes:
//! - Serializes `ChunkHeader` into a fixed 28-byte little-endian buffer.
//! - Field order must match `decode.rs` exactly.
//! - The chunk writer reserves the header up front and patches it once
//!   `cbytes` is known, so encoding writes into a caller slice.

use byteorder::{ByteOrder, LittleEndian};

use crate::headers::types::{ChunkHeader, HeaderError, OFFSET_LEN};

/// Serialize `h` into the first `ChunkHeader::LEN` bytes of `out`.
pub fn encode_chunk_header(h: &ChunkHeader, out: &mut [u8]) -> Result<(), HeaderError> {
    if out.len() < ChunkHeader::LEN {
        return Err(HeaderError::BufferTooShort { have: out.len(), need: ChunkHeader::LEN });
    }

    out[0..4].copy_from_slice(&h.magic);                  // 0..4   magic
    out[4] = h.version;                                   // 4      version
    out[5] = h.codec as u8;                               // 5      codec id
    out[6] = h.filter as u8;                              // 6      filter id
    out[7] = h.flags.bits();                              // 7      flags
    out[8] = h.typesize;                                  // 8      typesize
    out[9] = h.clevel;                                    // 9      clevel
    out[10..12].copy_from_slice(&h.reserved);             // 10..12 reserved
    LittleEndian::write_u32(&mut out[12..16], h.nbytes);    // 12..16 nbytes
    LittleEndian::write_u32(&mut out[16..20], h.blocksize); // 16..20 blocksize
    LittleEndian::write_u32(&mut out[20..24], h.cbytes);    // 20..24 cbytes
    LittleEndian::write_u32(&mut out[24..28], h.checksum);  // 24..28 checksum

    Ok(())
}

/// Convenience wrapper returning the header as an owned array.
pub fn encode_chunk_header_array(h: &ChunkHeader) -> Result<[u8; ChunkHeader::LEN], HeaderError> {
    let mut out = [0u8; ChunkHeader::LEN];
    encode_chunk_header(h, &mut out)?;
    Ok(out)
}

/// Write entry `index` of the block offset table that starts at `ChunkHeader::LEN`.
pub fn put_block_offset(chunk: &mut [u8], index: usize, offset: u32) -> Result<(), HeaderError> {
    let at = ChunkHeader::LEN + index * OFFSET_LEN;
    if chunk.len() < at + OFFSET_LEN {
        return Err(HeaderError::BufferTooShort { have: chunk.len(), need: at + OFFSET_LEN });
    }
    LittleEndian::write_u32(&mut chunk[at..at + OFFSET_LEN], offset);
    Ok(())
}

/// Append a stream length prefix to a block under construction.
#[inline]
pub fn push_stream_len(out: &mut Vec<u8>, len: u32) {
    let mut prefix = [0u8; OFFSET_LEN];
    LittleEndian::write_u32(&mut prefix, len);
    out.extend_from_slice(&prefix);
}
