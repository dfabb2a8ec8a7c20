#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use blockzip_core::filters::{apply, shuffle, unshuffle, Direction, FilterError, FilterKind};

    fn ramp(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i * 7 + i / 13) as u8).collect()
    }

    fn round_trip(filter: FilterKind, typesize: usize, src: &[u8]) -> Vec<u8> {
        let mut fwd = vec![0u8; src.len()];
        apply(filter, Direction::Forward, typesize, src, &mut fwd).unwrap();
        let mut back = vec![0u8; src.len()];
        apply(filter, Direction::Inverse, typesize, &fwd, &mut back).unwrap();
        back
    }

    #[test]
    fn test_round_trip_all_typesizes_and_lengths() {
        // sub-block, exact multiples, multi-block, unaligned tails
        let lengths = [0usize, 1, 7, 16, 17, 64, 255, 1024, 4099, 65_536 + 3];
        for typesize in 1..=17 {
            for &len in &lengths {
                let src = ramp(len);
                for filter in [FilterKind::NoFilter, FilterKind::Shuffle, FilterKind::ByteDelta] {
                    assert_eq!(
                        round_trip(filter, typesize, &src),
                        src,
                        "filter {:?} typesize {} len {}",
                        filter,
                        typesize,
                        len
                    );
                }
            }
        }
    }

    #[test]
    fn test_shuffle_transposes_lanes() {
        // two u32 elements: [a0 a1 a2 a3][b0 b1 b2 b3]
        let src = [0xa0, 0xa1, 0xa2, 0xa3, 0xb0, 0xb1, 0xb2, 0xb3];
        let mut dst = [0u8; 8];
        shuffle(4, &src, &mut dst);
        assert_eq!(dst, [0xa0, 0xb0, 0xa1, 0xb1, 0xa2, 0xb2, 0xa3, 0xb3]);

        let mut back = [0u8; 8];
        unshuffle(4, &dst, &mut back);
        assert_eq!(back, src);
    }

    #[test]
    fn test_unaligned_tail_is_copied_unchanged() {
        let src = ramp(4 * 10 + 3);
        let mut dst = vec![0u8; src.len()];
        apply(FilterKind::Shuffle, Direction::Forward, 4, &src, &mut dst).unwrap();
        assert_eq!(&dst[40..], &src[40..]);

        apply(FilterKind::ByteDelta, Direction::Forward, 4, &src, &mut dst).unwrap();
        assert_eq!(&dst[40..], &src[40..]);
    }

    #[test]
    fn test_shuffle_degenerates_to_copy() {
        let src = ramp(33);
        let mut dst = vec![0u8; src.len()];

        // typesize 1
        apply(FilterKind::Shuffle, Direction::Forward, 1, &src, &mut dst).unwrap();
        assert_eq!(dst, src);

        // fewer than two elements
        apply(FilterKind::Shuffle, Direction::Forward, 20, &src, &mut dst).unwrap();
        assert_eq!(dst, src);
    }

    #[test]
    fn test_bytedelta_single_lane_still_deltas() {
        let src = [10u8, 12, 15, 15, 14];
        let mut dst = [0u8; 5];
        apply(FilterKind::ByteDelta, Direction::Forward, 1, &src, &mut dst).unwrap();
        assert_eq!(dst, [10, 2, 3, 0, 255]);
    }

    #[test]
    fn test_length_mismatch_is_rejected() {
        let src = ramp(16);
        let mut dst = vec![0u8; 15];
        let err = apply(FilterKind::Shuffle, Direction::Forward, 4, &src, &mut dst).unwrap_err();
        assert_eq!(err, FilterError::LengthMismatch { src: 16, dst: 15 });
    }

    #[test]
    fn test_zero_typesize_is_rejected() {
        let src = ramp(16);
        let mut dst = vec![0u8; 16];
        let err = apply(FilterKind::ByteDelta, Direction::Forward, 0, &src, &mut dst).unwrap_err();
        assert_eq!(err, FilterError::InvalidTypesize(0));
    }

    #[test]
    fn test_filter_ids_are_stable() {
        assert_eq!(FilterKind::verify(0), Some(FilterKind::NoFilter));
        assert_eq!(FilterKind::verify(1), Some(FilterKind::Shuffle));
        assert_eq!(FilterKind::verify(2), Some(FilterKind::ByteDelta));
        assert_eq!(FilterKind::verify(3), None);
    }

    proptest! {
        #[test]
        fn prop_shuffle_round_trip(
            typesize in 1usize..=17,
            data in proptest::collection::vec(any::<u8>(), 0..2048),
        ) {
            prop_assert_eq!(round_trip(FilterKind::Shuffle, typesize, &data), data);
        }

        #[test]
        fn prop_bytedelta_round_trip(
            typesize in 1usize..=17,
            data in proptest::collection::vec(any::<u8>(), 0..2048),
        ) {
            prop_assert_eq!(round_trip(FilterKind::ByteDelta, typesize, &data), data);
        }
    }
}
