//! filters/mod.rs
//! Reversible byte-level transforms applied to a block before the codec.
//!
//! Design notes:
//! - Every filter is a pure function of (direction, typesize, src) into dst.
//! - `Forward` followed by `Inverse` reproduces the input exactly.
//! - When typesize does not divide the block, the aligned prefix is
//!   transformed and the trailing bytes are copied unchanged.

pub mod bytedelta;
pub mod shuffle;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use bytedelta::{bytedelta_decode, bytedelta_encode};
pub use shuffle::{shuffle, unshuffle};

/// Filter identifiers as stored in the chunk header.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterKind {
    NoFilter  = 0,
    Shuffle   = 1,
    ByteDelta = 2,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Inverse,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("filter buffers differ in length: src {src}, dst {dst}")]
    LengthMismatch { src: usize, dst: usize },
    #[error("invalid typesize {0}")]
    InvalidTypesize(usize),
}

impl Default for FilterKind {
    fn default() -> Self {
        FilterKind::Shuffle
    }
}

impl FilterKind {
    pub fn verify(raw: u8) -> Option<Self> {
        Self::try_from_primitive(raw).ok()
    }
}

/// Apply `filter` in `direction` to `src`, writing the result into `dst`.
///
/// `dst` must be exactly as long as `src`.
pub fn apply(
    filter: FilterKind,
    direction: Direction,
    typesize: usize,
    src: &[u8],
    dst: &mut [u8],
) -> Result<(), FilterError> {
    if src.len() != dst.len() {
        return Err(FilterError::LengthMismatch { src: src.len(), dst: dst.len() });
    }
    if typesize == 0 {
        return Err(FilterError::InvalidTypesize(typesize));
    }

    match (filter, direction) {
        (FilterKind::NoFilter, _) => dst.copy_from_slice(src),
        (FilterKind::Shuffle, Direction::Forward) => shuffle(typesize, src, dst),
        (FilterKind::Shuffle, Direction::Inverse) => unshuffle(typesize, src, dst),
        (FilterKind::ByteDelta, Direction::Forward) => bytedelta_encode(typesize, src, dst),
        (FilterKind::ByteDelta, Direction::Inverse) => bytedelta_decode(typesize, src, dst),
    }
    Ok(())
}
