//! headers/mod.rs
//! Chunk wire layout: fixed header, block offset table, length-prefixed streams.
//!
//! ```text
//! [ header (28) ][ block offsets (nblocks x 4) ][ block 0 ][ block 1 ] ...
//! block := [ csize (4) ][ stream bytes ] x nstreams
//! ```
//!
//! A stream with `csize` equal to its raw length is stored uncompressed.
//! A `MEMCPYED` chunk carries the raw source right after the header.

pub mod decode;
pub mod encode;
pub mod types;

pub use decode::*;
pub use encode::*;
pub use types::*;
