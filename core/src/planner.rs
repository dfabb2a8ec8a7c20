//! planner.rs
//! Block split decision and per-block stream layout.
//!
//! Design notes:
//! - `should_split` is a pure function of its arguments; it never logs and
//!   never consults global state. The one-time warning for an unknown mode
//!   is emitted by `normalize_split_mode` when parameters are validated.
//! - Splitting groups same-lane bytes into separate streams, which pays off
//!   for fast codecs and costs ratio for codecs that already model cross-byte
//!   redundancy.

use serde::{Deserialize, Serialize};

use crate::compression::CompressionCodec;
use crate::constants::{MAX_STREAMS, MIN_BUFFERSIZE};
use crate::headers::ChunkFlags;
use crate::params::ConfigWarning;

/// Raw split-mode codes as accepted in configuration.
pub mod split_codes {
    pub const ALWAYS: u8 = 1;
    pub const NEVER: u8 = 2;
    pub const AUTO: u8 = 3;
    pub const FORWARD_COMPAT: u8 = 4;
}

/// How a block is divided into streams before the codec runs.
///
/// Serialized as its raw code so unknown values from configuration survive
/// parsing and can be reported as a fallback instead of a parse failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u8", into = "u8")]
pub enum SplitMode {
    Always,
    Never,
    Auto,
    ForwardCompat,
    Unknown(u8),
}

impl Default for SplitMode {
    fn default() -> Self {
        SplitMode::ForwardCompat
    }
}

impl SplitMode {
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            split_codes::ALWAYS => SplitMode::Always,
            split_codes::NEVER => SplitMode::Never,
            split_codes::AUTO => SplitMode::Auto,
            split_codes::FORWARD_COMPAT => SplitMode::ForwardCompat,
            other => SplitMode::Unknown(other),
        }
    }

    pub fn raw(self) -> u8 {
        match self {
            SplitMode::Always => split_codes::ALWAYS,
            SplitMode::Never => split_codes::NEVER,
            SplitMode::Auto => split_codes::AUTO,
            SplitMode::ForwardCompat => split_codes::FORWARD_COMPAT,
            SplitMode::Unknown(raw) => raw,
        }
    }
}

impl From<u8> for SplitMode {
    fn from(raw: u8) -> Self {
        SplitMode::from_raw(raw)
    }
}

impl From<SplitMode> for u8 {
    fn from(mode: SplitMode) -> Self {
        mode.raw()
    }
}

/// Decide whether a block of `blocksize` bytes is compressed as one stream
/// per byte lane.
///
/// `flags` are the chunk's header flags; only `EXTENDED_HEADER` matters here.
/// An `Unknown` mode behaves as `ForwardCompat`.
pub fn should_split(
    mode: SplitMode,
    codec: CompressionCodec,
    typesize: usize,
    blocksize: usize,
    flags: ChunkFlags,
) -> bool {
    match mode {
        SplitMode::Always => return true,
        SplitMode::Never => return false,
        SplitMode::Auto | SplitMode::ForwardCompat | SplitMode::Unknown(_) => {}
    }

    if typesize == 0 {
        return false;
    }

    let extended_header = flags.contains(ChunkFlags::EXTENDED_HEADER);
    let codec_prefers_split = codec.is_fast() || (!extended_header && codec.is_legacy_split());

    codec_prefers_split
        && typesize <= MAX_STREAMS
        && blocksize / typesize >= MIN_BUFFERSIZE
}

/// Map an unrecognized mode onto `ForwardCompat`.
///
/// The fallback is expected behaviour, so it is reported as
/// `ConfigWarning::SplitModeFallback` rather than `InvalidValue`.
pub fn normalize_split_mode(mode: SplitMode) -> (SplitMode, Option<ConfigWarning>) {
    match mode {
        SplitMode::Unknown(raw) => (
            SplitMode::ForwardCompat,
            Some(ConfigWarning::SplitModeFallback { raw }),
        ),
        known => (known, None),
    }
}

/// Number of streams block `block_len` is written as.
///
/// A block is only split when the chunk is split and the block is a whole
/// number of elements; a short trailing block stays one stream.
pub fn streams_for_block(split: bool, typesize: usize, block_len: usize) -> usize {
    if split && typesize > 1 && block_len % typesize == 0 {
        typesize
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_mode_codes_survive_round_trip() {
        for raw in 0..=8u8 {
            assert_eq!(SplitMode::from_raw(raw).raw(), raw);
        }
    }

    #[test]
    fn leftover_block_is_single_stream() {
        assert_eq!(streams_for_block(true, 4, 64), 4);
        assert_eq!(streams_for_block(true, 4, 66), 1);
        assert_eq!(streams_for_block(false, 4, 64), 1);
    }
}
