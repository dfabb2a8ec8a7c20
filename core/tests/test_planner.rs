#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use blockzip_core::compression::CompressionCodec;
    use blockzip_core::headers::ChunkFlags;
    use blockzip_core::params::ConfigWarning;
    use blockzip_core::planner::{normalize_split_mode, should_split, SplitMode};

    const ALL_CODECS: [CompressionCodec; 6] = [
        CompressionCodec::Store,
        CompressionCodec::Lz4,
        CompressionCodec::Lz4hc,
        CompressionCodec::Snappy,
        CompressionCodec::Zlib,
        CompressionCodec::Zstd,
    ];

    fn extended() -> ChunkFlags {
        ChunkFlags::EXTENDED_HEADER
    }

    fn legacy() -> ChunkFlags {
        ChunkFlags::empty()
    }

    #[test]
    fn test_always_and_never_ignore_everything_else() {
        for codec in ALL_CODECS {
            for flags in [extended(), legacy()] {
                assert!(should_split(SplitMode::Always, codec, 255, 1, flags));
                assert!(!should_split(SplitMode::Never, codec, 4, 1 << 20, flags));
            }
        }
    }

    #[test]
    fn test_fast_codec_splits_small_types() {
        assert!(should_split(SplitMode::Auto, CompressionCodec::Lz4, 4, 32 * 1024, extended()));
        assert!(should_split(SplitMode::ForwardCompat, CompressionCodec::Snappy, 8, 32 * 1024, extended()));
        assert!(should_split(SplitMode::Auto, CompressionCodec::Lz4, 16, 16 * 32, extended()));
    }

    #[test]
    fn test_typesize_above_stream_limit_is_not_split() {
        assert!(!should_split(SplitMode::Auto, CompressionCodec::Lz4, 17, 1 << 20, extended()));
        assert!(!should_split(SplitMode::ForwardCompat, CompressionCodec::Lz4, 17, 1 << 20, legacy()));
    }

    #[test]
    fn test_too_few_elements_is_not_split() {
        // 31 elements of 4 bytes
        assert!(!should_split(SplitMode::Auto, CompressionCodec::Lz4, 4, 4 * 31, extended()));
        assert!(should_split(SplitMode::Auto, CompressionCodec::Lz4, 4, 4 * 32, extended()));
    }

    #[test]
    fn test_legacy_codecs_split_only_without_extended_header() {
        for codec in [CompressionCodec::Lz4hc, CompressionCodec::Zlib] {
            assert!(should_split(SplitMode::Auto, codec, 4, 32 * 1024, legacy()));
            assert!(!should_split(SplitMode::Auto, codec, 4, 32 * 1024, extended()));
        }
    }

    #[test]
    fn test_high_ratio_codec_is_not_split() {
        for flags in [extended(), legacy()] {
            assert!(!should_split(SplitMode::Auto, CompressionCodec::Zstd, 4, 32 * 1024, flags));
        }
    }

    #[test]
    fn test_unknown_mode_behaves_as_forward_compat() {
        for codec in ALL_CODECS {
            for ts in [1usize, 2, 4, 8, 16, 17] {
                let a = should_split(SplitMode::Unknown(42), codec, ts, 64 * 1024, extended());
                let b = should_split(SplitMode::ForwardCompat, codec, ts, 64 * 1024, extended());
                assert_eq!(a, b, "codec {:?} ts {}", codec, ts);
            }
        }
    }

    #[test]
    fn test_normalize_reports_fallback() {
        let (mode, warning) = normalize_split_mode(SplitMode::Unknown(9));
        assert_eq!(mode, SplitMode::ForwardCompat);
        let warning = warning.expect("fallback warning");
        assert_eq!(warning, ConfigWarning::SplitModeFallback { raw: 9 });
        assert!(warning.is_fallback());

        let (mode, warning) = normalize_split_mode(SplitMode::Auto);
        assert_eq!(mode, SplitMode::Auto);
        assert!(warning.is_none());
    }

    #[test]
    fn test_split_mode_json_codes() {
        let mode: SplitMode = serde_json::from_str("3").unwrap();
        assert_eq!(mode, SplitMode::Auto);
        let mode: SplitMode = serde_json::from_str("77").unwrap();
        assert_eq!(mode, SplitMode::Unknown(77));
        assert_eq!(serde_json::to_string(&SplitMode::Never).unwrap(), "2");
    }

    proptest! {
        #[test]
        fn prop_should_split_is_pure(
            raw in 0u8..8,
            codec_idx in 0usize..6,
            typesize in 1usize..64,
            blocksize in 0usize..(1 << 20),
            ext in any::<bool>(),
        ) {
            let mode = SplitMode::from_raw(raw);
            let codec = ALL_CODECS[codec_idx];
            let flags = if ext { extended() } else { legacy() };
            let first = should_split(mode, codec, typesize, blocksize, flags);
            for _ in 0..4 {
                prop_assert_eq!(should_split(mode, codec, typesize, blocksize, flags), first);
            }
        }
    }
}
