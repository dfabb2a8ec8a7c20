/// Stable codec IDs (u8) for the chunk header.
pub mod codec_ids {
    pub const STORE: u8  = 0x00;
    pub const LZ4: u8    = 0x01;
    pub const LZ4HC: u8  = 0x02;
    pub const SNAPPY: u8 = 0x03;
    pub const ZLIB: u8   = 0x04;
    pub const ZSTD: u8   = 0x05;
}

/// Largest zstd level used when the caller asks for maximum effort.
pub const ZSTD_MAX_LEVEL: i32 = 19;
/// LZ4-HC accepts 1..=12; levels above 9 are reached only through this cap.
pub const LZ4HC_MAX_LEVEL: i32 = 12;
