//! compression/mod.rs
//! Codec backends behind a uniform block interface.
//!
//! Notes:
//! - Every call compresses one independent stream; no state spans streams,
//!   so any stream of any chunk can be decoded on any thread.
//! - Backends are opaque: this module only wraps the codec crates.
//! - Registry resolves codec IDs to implementations.

pub mod constants;
pub mod types;
pub mod registry;
pub mod codecs;

pub use constants::*;
pub use types::*;
pub use registry::*;
