//! filters/bytedelta.rs
//! Shuffle followed by a per-lane byte delta.
//!
//! After transposition each lane holds byte `j` of consecutive elements. The
//! first byte of a lane is stored verbatim and every following byte becomes the
//! wrapping difference from its predecessor in the same lane. Slowly varying
//! numeric data turns into long runs of small values.

/// Shuffle and delta-encode in a single pass.
pub fn bytedelta_encode(typesize: usize, src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    let nelems = src.len() / typesize;
    let aligned = nelems * typesize;

    for j in 0..typesize {
        let lane = &mut dst[j * nelems..(j + 1) * nelems];
        let mut prev = 0u8;
        for (i, out) in lane.iter_mut().enumerate() {
            let cur = src[i * typesize + j];
            *out = cur.wrapping_sub(prev);
            prev = cur;
        }
    }
    dst[aligned..].copy_from_slice(&src[aligned..]);
}

/// Undo the per-lane delta (running sum) and unshuffle in a single pass.
pub fn bytedelta_decode(typesize: usize, src: &[u8], dst: &mut [u8]) {
    debug_assert_eq!(src.len(), dst.len());
    let nelems = src.len() / typesize;
    let aligned = nelems * typesize;

    for j in 0..typesize {
        let lane = &src[j * nelems..(j + 1) * nelems];
        let mut acc = 0u8;
        for (i, &d) in lane.iter().enumerate() {
            acc = acc.wrapping_add(d);
            dst[i * typesize + j] = acc;
        }
    }
    dst[aligned..].copy_from_slice(&src[aligned..]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_becomes_constant_deltas() {
        let src: Vec<u8> = (0u32..8).flat_map(|v| (v * 3).to_le_bytes()).collect();
        let mut enc = vec![0u8; src.len()];
        bytedelta_encode(4, &src, &mut enc);

        // lane 0: 0 then +3 seven times; other lanes all zero
        assert_eq!(&enc[..8], &[0, 3, 3, 3, 3, 3, 3, 3]);
        assert!(enc[8..].iter().all(|&b| b == 0));

        let mut dec = vec![0u8; src.len()];
        bytedelta_decode(4, &enc, &mut dec);
        assert_eq!(dec, src);
    }
}
