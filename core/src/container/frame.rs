//! container/frame.rs
//! Minimal contiguous serialization of a container.
//!
//! ```text
//! [ magic "BKZF" (4) ][ version (2) ][ index_len (4) ][ index (bincode) ][ chunk 0 ][ chunk 1 ] ...
//! ```
//!
//! The index carries the typesize and, per chunk, its offset within the
//! chunk region plus both sizes, so a reader can locate chunk `i` without
//! walking the ones before it.

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::constants::{FRAME_FORMAT_VERSION, MAGIC_FRAME};
use crate::container::{Chunk, ChunkedContainer};
use crate::headers::HeaderError;
use crate::types::{BlockzipError, Result};

const PREAMBLE_LEN: usize = 4 + 2 + 4;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameIndex {
    pub typesize: u32,
    pub offsets: Vec<u64>,
    pub cbytes: Vec<u64>,
    pub nbytes: Vec<u64>,
}

fn corrupt(msg: impl Into<String>) -> BlockzipError {
    BlockzipError::Frame(msg.into())
}

impl ChunkedContainer {
    pub fn frame_index(&self) -> FrameIndex {
        let mut index = FrameIndex { typesize: self.typesize as u32, ..Default::default() };
        let mut offset = 0u64;
        for chunk in self.chunks() {
            index.offsets.push(offset);
            index.cbytes.push(chunk.cbytes() as u64);
            index.nbytes.push(chunk.nbytes() as u64);
            offset += chunk.cbytes() as u64;
        }
        index
    }

    /// Serialize the container into one contiguous buffer.
    pub fn to_frame(&self) -> Result<Vec<u8>> {
        let index = bincode::serde::encode_to_vec(self.frame_index(), bincode::config::standard())
            .map_err(|e| corrupt(e.to_string()))?;

        let mut out = crate::utils::try_with_capacity(
            PREAMBLE_LEN + index.len() + self.total_compressed_bytes(),
            "frame output",
        )?;
        let mut preamble = [0u8; PREAMBLE_LEN];
        preamble[0..4].copy_from_slice(&MAGIC_FRAME);
        LittleEndian::write_u16(&mut preamble[4..6], FRAME_FORMAT_VERSION);
        LittleEndian::write_u32(&mut preamble[6..10], index.len() as u32);
        out.extend_from_slice(&preamble);
        out.extend_from_slice(&index);
        for chunk in self.chunks() {
            out.extend_from_slice(chunk.bytes());
        }
        Ok(out)
    }

    /// Rebuild a container from `to_frame` output. Chunks share `frame`'s memory.
    pub fn from_frame(frame: Bytes) -> Result<Self> {
        if frame.len() < PREAMBLE_LEN {
            return Err(HeaderError::BufferTooShort { have: frame.len(), need: PREAMBLE_LEN }.into());
        }
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&frame[0..4]);
        if magic != MAGIC_FRAME {
            return Err(HeaderError::InvalidMagic { have: magic, need: MAGIC_FRAME }.into());
        }
        let version = LittleEndian::read_u16(&frame[4..6]);
        if version != FRAME_FORMAT_VERSION {
            return Err(corrupt(format!("unsupported version {}", version)));
        }
        let index_len = LittleEndian::read_u32(&frame[6..10]) as usize;
        let chunks_start = PREAMBLE_LEN + index_len;
        if frame.len() < chunks_start {
            return Err(HeaderError::BufferTooShort { have: frame.len(), need: chunks_start }.into());
        }

        let (index, _): (FrameIndex, usize) = bincode::serde::decode_from_slice(
            &frame[PREAMBLE_LEN..chunks_start],
            bincode::config::standard(),
        )
        .map_err(|e| corrupt(e.to_string()))?;

        let n = index.offsets.len();
        if index.cbytes.len() != n || index.nbytes.len() != n {
            return Err(corrupt("index columns differ in length"));
        }

        let mut container = ChunkedContainer::new(index.typesize as usize);
        for i in 0..n {
            let end = (chunks_start as u64)
                .checked_add(index.offsets[i])
                .and_then(|start| start.checked_add(index.cbytes[i]))
                .ok_or_else(|| corrupt(format!("chunk {} extent overflows", i)))?;
            let start = end - index.cbytes[i];
            if end > frame.len() as u64 {
                return Err(HeaderError::BufferTooShort { have: frame.len(), need: end as usize }.into());
            }
            let chunk = Chunk::from_bytes(frame.slice(start as usize..end as usize))?;
            if chunk.nbytes() as u64 != index.nbytes[i] {
                return Err(corrupt(format!("chunk {} size disagrees with index", i)));
            }
            container.push(chunk);
        }
        Ok(container)
    }
}
