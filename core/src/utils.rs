use std::fmt;
use num_enum::TryFromPrimitive;

use crate::types::BlockzipError;

pub fn compute_checksum(data: &[u8]) -> u32 {
    use crc32fast::Hasher;
    let mut hasher = Hasher::new();
    hasher.update(data);
    hasher.finalize()
}

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

/// Reserve a zero-filled buffer of exactly `len` bytes.
///
/// Scratch buffers are mandatory for any block or chunk operation, so failure
/// surfaces as `BlockzipError::Allocation` instead of aborting the process.
pub fn try_alloc_zeroed(len: usize, what: &'static str) -> Result<Vec<u8>, BlockzipError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| BlockzipError::Allocation { what, bytes: len })?;
    buf.resize(len, 0);
    Ok(buf)
}

/// Grow `buf` to `len` bytes (zero-filled) reusing its allocation when possible.
pub fn try_resize(buf: &mut Vec<u8>, len: usize, what: &'static str) -> Result<(), BlockzipError> {
    if buf.capacity() < len {
        buf.try_reserve_exact(len - buf.len())
            .map_err(|_| BlockzipError::Allocation { what, bytes: len })?;
    }
    buf.resize(len, 0);
    Ok(())
}

/// Empty buffer with exactly `cap` bytes reserved.
pub fn try_with_capacity(cap: usize, what: &'static str) -> Result<Vec<u8>, BlockzipError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(cap)
        .map_err(|_| BlockzipError::Allocation { what, bytes: cap })?;
    Ok(buf)
}
