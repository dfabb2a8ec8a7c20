//! container/mod.rs
//! Ordered, append-only collection of independently compressed chunks.
//!
//! Design notes:
//! - Chunk bytes are immutable `Bytes`; cloning a container or handing a
//!   chunk to a worker never copies payload.
//! - Every appended chunk has its header validated, so readers can trust
//!   the per-chunk sizes without re-parsing.
//! - Chunk order is logical array order.

pub mod frame;

use bytes::Bytes;

use crate::context::Context;
use crate::headers::{decode_chunk_header, ChunkHeader};
use crate::types::{BlockzipError, Result};

pub use frame::FrameIndex;

/// One independently compressed unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    data: Bytes,
    header: ChunkHeader,
}

impl Chunk {
    /// Wrap chunk bytes, validating the header.
    pub fn from_bytes(data: Bytes) -> Result<Self> {
        let header = decode_chunk_header(&data)?;
        if data.len() != header.cbytes as usize {
            return Err(BlockzipError::Format(crate::headers::HeaderError::InvalidLength {
                nbytes: header.nbytes,
                cbytes: data.len() as u32,
            }));
        }
        Ok(Self { data, header })
    }

    pub fn bytes(&self) -> &Bytes {
        &self.data
    }

    pub fn header(&self) -> &ChunkHeader {
        &self.header
    }

    /// Uncompressed size.
    pub fn nbytes(&self) -> usize {
        self.header.nbytes as usize
    }

    /// Compressed size, header included.
    pub fn cbytes(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChunkedContainer {
    typesize: usize,
    chunks: Vec<Chunk>,
    nbytes: usize,
    cbytes: usize,
}

impl ChunkedContainer {
    pub fn new(typesize: usize) -> Self {
        Self { typesize, ..Default::default() }
    }

    pub fn typesize(&self) -> usize {
        self.typesize
    }

    /// Append an already compressed chunk. Returns its index.
    pub fn append_chunk(&mut self, data: Bytes) -> Result<usize> {
        let chunk = Chunk::from_bytes(data)?;
        Ok(self.push(chunk))
    }

    pub(crate) fn push(&mut self, chunk: Chunk) -> usize {
        self.nbytes += chunk.nbytes();
        self.cbytes += chunk.cbytes();
        self.chunks.push(chunk);
        self.chunks.len() - 1
    }

    /// Compress `src` as one chunk with `ctx` and append it.
    pub fn append_buffer(&mut self, ctx: &mut Context, src: &[u8]) -> Result<usize> {
        let data = ctx.compress_chunk(src)?;
        self.append_chunk(data)
    }

    /// Compress a typed slice as one chunk.
    pub fn append_typed<T: bytemuck::Pod>(&mut self, ctx: &mut Context, items: &[T]) -> Result<usize> {
        self.append_buffer(ctx, bytemuck::cast_slice(items))
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn chunk(&self, index: usize) -> Option<&Chunk> {
        self.chunks.get(index)
    }

    /// Compressed bytes and uncompressed size of chunk `index`.
    pub fn chunk_at(&self, index: usize) -> Result<(&[u8], usize)> {
        let chunk = self.chunks.get(index).ok_or(BlockzipError::ChunkOutOfRange {
            index,
            count: self.chunks.len(),
        })?;
        Ok((chunk.bytes().as_ref(), chunk.nbytes()))
    }

    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.iter()
    }

    pub fn total_uncompressed_bytes(&self) -> usize {
        self.nbytes
    }

    pub fn total_compressed_bytes(&self) -> usize {
        self.cbytes
    }

    /// Largest uncompressed chunk; sizes a reusable decode buffer.
    pub fn max_chunk_nbytes(&self) -> usize {
        self.chunks.iter().map(Chunk::nbytes).max().unwrap_or(0)
    }

    /// Decode chunk `index` into the front of `dst`.
    pub fn decompress_chunk(&self, ctx: &mut Context, index: usize, dst: &mut [u8]) -> Result<usize> {
        let (data, _) = self.chunk_at(index)?;
        ctx.decompress_chunk(data, dst)
    }

    /// Uncompressed byte offset of chunk `index` within the logical array.
    pub fn chunk_offset(&self, index: usize) -> Result<usize> {
        if index > self.chunks.len() {
            return Err(BlockzipError::ChunkOutOfRange { index, count: self.chunks.len() });
        }
        Ok(self.chunks[..index].iter().map(Chunk::nbytes).sum())
    }
}
