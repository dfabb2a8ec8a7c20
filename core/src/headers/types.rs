use std::fmt;
use thiserror::Error;

use crate::compression::CompressionCodec;
use crate::constants::{CHUNK_FORMAT_VERSION, MAGIC_CHUNK, MAX_CHUNK_NBYTES, MAX_TYPESIZE};
use crate::filters::FilterKind;
use crate::utils::enum_name_or_hex;

/// Header length of every chunk on the wire.
pub const CHUNK_HEADER_LEN: usize = 28;

/// Width of one entry of the block offset table and of a stream length prefix.
pub const OFFSET_LEN: usize = 4;

bitflags::bitflags! {
    /// ## Chunk flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ChunkFlags: u8 {
        /// Blocks of this chunk were written as one stream per byte lane
        const SPLIT = crate::constants::flags::SPLIT;

        /// Written with the extended header layout (LZ4HC/Zlib are not split by Auto)
        const EXTENDED_HEADER = crate::constants::flags::EXTENDED_HEADER;

        /// Payload is the raw source; no block table, no streams
        const MEMCPYED = crate::constants::flags::MEMCPYED;
    }
}

/// Fixed-size chunk header.
///
/// ```text
/// [ magic     (4) ]  "BKZ1"
/// [ version   (1) ]
/// [ codec     (1) ]
/// [ filter    (1) ]
/// [ flags     (1) ]
/// [ typesize  (1) ]
/// [ clevel    (1) ]
/// [ reserved  (2) ]
/// [ nbytes    (4) ]  uncompressed length
/// [ blocksize (4) ]
/// [ cbytes    (4) ]  whole chunk length, header included
/// [ checksum  (4) ]  CRC32 of the uncompressed bytes
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkHeader {
    pub magic: [u8; 4],
    pub version: u8,
    pub codec: CompressionCodec,
    pub filter: FilterKind,
    pub flags: ChunkFlags,
    pub typesize: u8,
    pub clevel: u8,
    pub reserved: [u8; 2],
    pub nbytes: u32,
    pub blocksize: u32,
    pub cbytes: u32,
    pub checksum: u32,
}

impl ChunkHeader {
    pub const LEN: usize = CHUNK_HEADER_LEN;

    pub fn new(codec: CompressionCodec, filter: FilterKind, typesize: u8, clevel: u8) -> Self {
        Self {
            magic: MAGIC_CHUNK,
            version: CHUNK_FORMAT_VERSION,
            codec,
            filter,
            flags: ChunkFlags::empty(),
            typesize,
            clevel,
            reserved: [0u8; 2],
            nbytes: 0,
            blocksize: 0,
            cbytes: Self::LEN as u32,
            checksum: 0,
        }
    }

    pub fn is_memcpyed(&self) -> bool {
        self.flags.contains(ChunkFlags::MEMCPYED)
    }

    pub fn is_split(&self) -> bool {
        self.flags.contains(ChunkFlags::SPLIT)
    }

    /// Number of blocks the payload is cut into (0 for memcpyed or empty chunks).
    pub fn nblocks(&self) -> usize {
        if self.is_memcpyed() || self.nbytes == 0 || self.blocksize == 0 {
            return 0;
        }
        (self.nbytes as usize).div_ceil(self.blocksize as usize)
    }

    /// Uncompressed length of block `index`; the last block may be short.
    pub fn block_len(&self, index: usize) -> usize {
        let bs = self.blocksize as usize;
        let start = index * bs;
        (self.nbytes as usize).saturating_sub(start).min(bs)
    }

    /// Bytes taken by the block offset table that follows the header.
    pub fn table_len(&self) -> usize {
        self.nblocks() * OFFSET_LEN
    }

    pub fn validate(&self) -> Result<(), HeaderError> {
        if self.magic != MAGIC_CHUNK {
            return Err(HeaderError::InvalidMagic { have: self.magic, need: MAGIC_CHUNK });
        }
        if self.version == 0 || self.version > CHUNK_FORMAT_VERSION {
            return Err(HeaderError::UnsupportedVersion { have: self.version });
        }
        if self.typesize == 0 || self.typesize as usize > MAX_TYPESIZE {
            return Err(HeaderError::InvalidTypesize { have: self.typesize });
        }
        if self.reserved != [0u8; 2] {
            return Err(HeaderError::ReservedBytesNonZero { reserved: self.reserved });
        }
        if self.nbytes as usize > MAX_CHUNK_NBYTES {
            return Err(HeaderError::InvalidLength { nbytes: self.nbytes, cbytes: self.cbytes });
        }
        if (self.cbytes as usize) < Self::LEN {
            return Err(HeaderError::InvalidLength { nbytes: self.nbytes, cbytes: self.cbytes });
        }

        if self.is_memcpyed() {
            if self.cbytes as usize != Self::LEN + self.nbytes as usize {
                return Err(HeaderError::InvalidLength { nbytes: self.nbytes, cbytes: self.cbytes });
            }
        } else if self.nbytes > 0 {
            if self.blocksize == 0 || self.blocksize > self.nbytes {
                return Err(HeaderError::InvalidBlocksize { blocksize: self.blocksize, nbytes: self.nbytes });
            }
            if (self.cbytes as usize) < Self::LEN + self.table_len() {
                return Err(HeaderError::InvalidLength { nbytes: self.nbytes, cbytes: self.cbytes });
            }
        }
        Ok(())
    }
}

pub fn fmt_bytes(b: &[u8]) -> String {
    if b.iter().all(|&c| c.is_ascii_graphic() || c == b' ') {
        format!("b\"{}\"", String::from_utf8_lossy(b))
    } else {
        let hex: String = b.iter().map(|c| format!("{:02x}", c)).collect();
        format!("0x{}", hex)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HeaderError {
    #[error("chunk buffer too short: {have} < {need}")]
    BufferTooShort { have: usize, need: usize },

    #[error("invalid magic: expected {}, got {}", fmt_bytes(.need), fmt_bytes(.have))]
    InvalidMagic { have: [u8; 4], need: [u8; 4] },

    #[error("unsupported chunk format version: {have}")]
    UnsupportedVersion { have: u8 },

    #[error("unknown compression codec: {}", codec_label(.raw))]
    UnknownCodec { raw: u8 },

    #[error("unknown filter: {}", filter_label(.raw))]
    UnknownFilter { raw: u8 },

    #[error("invalid chunk flags: 0x{raw:02x}")]
    InvalidFlags { raw: u8 },

    #[error("invalid typesize: {have}")]
    InvalidTypesize { have: u8 },

    #[error("reserved bytes must be zero, got {}", fmt_bytes(.reserved))]
    ReservedBytesNonZero { reserved: [u8; 2] },

    #[error("invalid blocksize {blocksize} for {nbytes} uncompressed bytes")]
    InvalidBlocksize { blocksize: u32, nbytes: u32 },

    #[error("inconsistent chunk lengths: nbytes {nbytes}, cbytes {cbytes}")]
    InvalidLength { nbytes: u32, cbytes: u32 },

    #[error("block {index} offset {offset} outside chunk payload ({start}..{end})")]
    InvalidBlockOffset { index: usize, offset: u32, start: usize, end: usize },

    #[error("block {index} truncated: stream needs {need} bytes, {have} left")]
    TruncatedBlock { index: usize, have: usize, need: usize },

    #[error("block {index} stream lengths disagree with header")]
    StreamLengthMismatch { index: usize },

    #[error("checksum mismatch: stored 0x{stored:08x}, computed 0x{computed:08x}")]
    ChecksumMismatch { stored: u32, computed: u32 },
}

fn codec_label(raw: &u8) -> String {
    enum_name_or_hex::<CompressionCodec>(*raw)
}

fn filter_label(raw: &u8) -> String {
    enum_name_or_hex::<FilterKind>(*raw)
}

impl fmt::Display for ChunkHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "chunk v{} {}+{:?} ts={} clevel={} nbytes={} blocksize={} cbytes={} flags={:?}",
            self.version,
            self.codec.name(),
            self.filter,
            self.typesize,
            self.clevel,
            self.nbytes,
            self.blocksize,
            self.cbytes,
            self.flags,
        )
    }
}
