/// Magic number for the chunk wire layout.
/// "BKZ1" = blockzip chunk v1
pub const MAGIC_CHUNK: [u8; 4] = *b"BKZ1";
pub const CHUNK_FORMAT_VERSION: u8 = 1;

/// Magic number for a serialized container frame.
pub const MAGIC_FRAME: [u8; 4] = *b"BKZF";
pub const FRAME_FORMAT_VERSION: u16 = 1;

/// Size of the L1 data cache. 32 KiB is the common case.
pub const L1: usize = 32 * 1024;
/// Size of the L2 cache. 256 KiB is the common case.
pub const L2: usize = 256 * 1024;

/// Maximum number of byte-lane streams a block is split into.
pub const MAX_STREAMS: usize = 16;

/// Minimum number of elements in a block before splitting pays off,
/// and the smallest block size the tuner will propose.
pub const MIN_BUFFERSIZE: usize = 32;

/// Largest element size a chunk header can describe.
pub const MAX_TYPESIZE: usize = 255;

/// Upper bound for tuner-proposed block sizes; keeps a block plus its
/// filtered copy resident in L2.
pub const MAX_BLOCKSIZE: usize = 4 * L2 * MAX_STREAMS;

/// Max uncompressed bytes in a single chunk (2 GiB - 1, u32 wire fields).
pub const MAX_CHUNK_NBYTES: usize = i32::MAX as usize;

/// Compression level bounds (0 = store, 9 = maximum effort).
pub const MIN_CLEVEL: u8 = 0;
pub const MAX_CLEVEL: u8 = 9;
pub const DEFAULT_CLEVEL: u8 = 5;

/// Defaults when the pipeline thread count is not configured.
pub const DEFAULT_NTHREADS: usize = 4;
/// Environment variable consulted once at pipeline construction.
pub const ENV_NTHREADS: &str = "BLOCKZIP_NTHREADS";

/// Chunk flag bitmask (mirrored in `headers::ChunkFlags`).
pub mod flags {
    pub const SPLIT: u8           = 0x01;
    pub const EXTENDED_HEADER: u8 = 0x02;
    pub const MEMCPYED: u8        = 0x04;
}
