//! src/headers/decode.rs
//!
//! Chunk header decoding.
//!
//! Design notes:
//! - Deserializes the fixed 28-byte header and validates it before any
//!   payload byte is touched.
//! - The block offset table is checked against the header so a corrupt
//!   offset surfaces as `HeaderError`, never as a slice panic.

use byteorder::{ByteOrder, LittleEndian};

use crate::compression::CompressionCodec;
use crate::filters::FilterKind;
use crate::headers::types::{ChunkFlags, ChunkHeader, HeaderError, OFFSET_LEN};

/// Deserialize and validate the header at the start of `buf`.
#[inline]
pub fn decode_chunk_header(buf: &[u8]) -> Result<ChunkHeader, HeaderError> {
    if buf.len() < ChunkHeader::LEN {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need: ChunkHeader::LEN });
    }

    let mut magic = [0u8; 4];
    magic.copy_from_slice(&buf[0..4]);
    let version = buf[4];

    // Report bad magic/version before interpreting the remaining fields.
    if magic != crate::constants::MAGIC_CHUNK {
        return Err(HeaderError::InvalidMagic { have: magic, need: crate::constants::MAGIC_CHUNK });
    }

    let codec = CompressionCodec::verify(buf[5])
        .map_err(|_| HeaderError::UnknownCodec { raw: buf[5] })?;
    let filter = FilterKind::verify(buf[6])
        .ok_or(HeaderError::UnknownFilter { raw: buf[6] })?;
    let flags = ChunkFlags::from_bits(buf[7])
        .ok_or(HeaderError::InvalidFlags { raw: buf[7] })?;

    let h = ChunkHeader {
        magic,
        version,
        codec,
        filter,
        flags,
        typesize: buf[8],
        clevel: buf[9],
        reserved: [buf[10], buf[11]],
        nbytes: LittleEndian::read_u32(&buf[12..16]),
        blocksize: LittleEndian::read_u32(&buf[16..20]),
        cbytes: LittleEndian::read_u32(&buf[20..24]),
        checksum: LittleEndian::read_u32(&buf[24..28]),
    };
    h.validate()?;

    if buf.len() < h.cbytes as usize {
        return Err(HeaderError::BufferTooShort { have: buf.len(), need: h.cbytes as usize });
    }

    Ok(h)
}

/// Read the block offset table of a validated, non-memcpyed chunk.
///
/// Offsets are absolute within the chunk, strictly increasing and inside
/// the payload region.
pub fn decode_block_offsets(chunk: &[u8], h: &ChunkHeader) -> Result<Vec<u32>, HeaderError> {
    let nblocks = h.nblocks();
    let payload_start = ChunkHeader::LEN + h.table_len();
    let end = h.cbytes as usize;
    if chunk.len() < end {
        return Err(HeaderError::BufferTooShort { have: chunk.len(), need: end });
    }

    let mut offsets = Vec::with_capacity(nblocks);
    let mut prev: Option<u32> = None;
    for index in 0..nblocks {
        let at = ChunkHeader::LEN + index * OFFSET_LEN;
        let offset = LittleEndian::read_u32(&chunk[at..at + OFFSET_LEN]);
        let in_range = (offset as usize) >= payload_start && (offset as usize) < end;
        let ascending = prev.map_or(true, |p| offset > p);
        if !in_range || !ascending {
            return Err(HeaderError::InvalidBlockOffset { index, offset, start: payload_start, end });
        }
        prev = Some(offset);
        offsets.push(offset);
    }
    Ok(offsets)
}

/// Byte range `[start, end)` of block `index` given the decoded offsets.
pub fn block_span(offsets: &[u32], index: usize, h: &ChunkHeader) -> (usize, usize) {
    let start = offsets[index] as usize;
    let end = offsets
        .get(index + 1)
        .map_or(h.cbytes as usize, |&next| next as usize);
    (start, end)
}

/// Split one stream `[u32 csize][bytes]` off the front of `block`.
///
/// Returns the stream payload and the rest of the block.
pub fn take_stream(block: &[u8], index: usize) -> Result<(&[u8], &[u8]), HeaderError> {
    if block.len() < OFFSET_LEN {
        return Err(HeaderError::TruncatedBlock { index, have: block.len(), need: OFFSET_LEN });
    }
    let csize = LittleEndian::read_u32(&block[..OFFSET_LEN]) as usize;
    let rest = &block[OFFSET_LEN..];
    if rest.len() < csize {
        return Err(HeaderError::TruncatedBlock { index, have: rest.len(), need: csize });
    }
    Ok(rest.split_at(csize))
}
