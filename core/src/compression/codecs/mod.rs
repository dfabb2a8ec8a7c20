//! compression/codecs/mod.rs
//! One file per backend; each exposes a compressor/decompressor pair.

pub mod lz4;
pub mod lz4hc;
pub mod snappy;
pub mod store;
pub mod zlib;
pub mod zstd;

pub use lz4::*;
pub use lz4hc::*;
pub use snappy::*;
pub use store::*;
pub use zlib::*;
pub use zstd::*;
