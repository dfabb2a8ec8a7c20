//! filters/shuffle.rs
//! Byte transposition between element-major and byte-lane-major layouts.
//!
//! A block of `n` elements of `typesize` bytes is viewed as an `n × typesize`
//! byte matrix; shuffling writes it out column by column so that byte `j` of
//! every element lands in lane `j`. Bytes past the last whole element are
//! copied verbatim.

/// Element-major → lane-major.
pub fn shuffle(typesize: usize, src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    let nelems = src.len() / typesize;
    let aligned = nelems * typesize;

    if typesize > 1 && nelems > 1 {
        for (i, elem) in src[..aligned].chunks_exact(typesize).enumerate() {
            for (j, &b) in elem.iter().enumerate() {
                dst[j * nelems + i] = b;
            }
        }
    } else {
        dst[..aligned].copy_from_slice(&src[..aligned]);
    }
    dst[aligned..].copy_from_slice(&src[aligned..]);
}

/// Lane-major → element-major.
pub fn unshuffle(typesize: usize, src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    let nelems = src.len() / typesize;
    let aligned = nelems * typesize;

    if typesize > 1 && nelems > 1 {
        for (i, elem) in dst[..aligned].chunks_exact_mut(typesize).enumerate() {
            for (j, b) in elem.iter_mut().enumerate() {
                *b = src[j * nelems + i];
            }
        }
    } else {
        dst[..aligned].copy_from_slice(&src[..aligned]);
    }
    dst[aligned..].copy_from_slice(&src[aligned..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shuffle_groups_byte_lanes() {
        // three little-endian u16: 0x0201, 0x0403, 0x0605
        let src = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06];
        let mut dst = [0u8; 6];
        shuffle(2, &src, &mut dst);
        assert_eq!(dst, [0x01, 0x03, 0x05, 0x02, 0x04, 0x06]);
    }

    #[test]
    fn trailing_bytes_pass_through() {
        let src = [1u8, 2, 3, 4, 5, 6, 7];
        let mut dst = [0u8; 7];
        shuffle(3, &src, &mut dst);
        assert_eq!(dst, [1, 4, 2, 5, 3, 6, 7]);

        let mut back = [0u8; 7];
        unshuffle(3, &dst, &mut back);
        assert_eq!(back, src);
    }
}
