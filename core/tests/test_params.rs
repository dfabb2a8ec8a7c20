#[cfg(test)]
mod tests {
    use blockzip_core::compression::CompressionCodec;
    use blockzip_core::filters::FilterKind;
    use blockzip_core::headers::ChunkFlags;
    use blockzip_core::params::{CompressionParams, ConfigWarning, DecompressionParams};
    use blockzip_core::pipeline::PipelineConfig;
    use blockzip_core::planner::SplitMode;
    use blockzip_core::types::BlockzipError;

    #[test]
    fn test_defaults() {
        let p = CompressionParams::default();
        assert_eq!(p.codec, CompressionCodec::Lz4);
        assert_eq!(p.clevel, 5);
        assert_eq!(p.blocksize, 0);
        assert_eq!(p.splitmode, SplitMode::ForwardCompat);
        assert_eq!(p.filter, FilterKind::Shuffle);
        assert_eq!(p.nthreads, None);
        assert_eq!(p.header_flags(), ChunkFlags::EXTENDED_HEADER);
        assert_eq!(p.clone().with_extended_header(false).header_flags(), ChunkFlags::empty());
    }

    #[test]
    fn test_from_json_partial() {
        let p = CompressionParams::from_json(
            r#"{ "codec": "zstd", "clevel": 7, "filter": "byte_delta", "splitmode": 3, "typesize": 4 }"#,
        )
        .unwrap();
        assert_eq!(p.codec, CompressionCodec::Zstd);
        assert_eq!(p.clevel, 7);
        assert_eq!(p.filter, FilterKind::ByteDelta);
        assert_eq!(p.splitmode, SplitMode::Auto);
        assert_eq!(p.typesize, 4);
        // untouched fields keep their defaults
        assert!(p.extended_header);
        assert_eq!(p.blocksize, 0);
    }

    #[test]
    fn test_json_round_trip() {
        let p = CompressionParams::new(CompressionCodec::Snappy, 3, 2)
            .with_blocksize(8192)
            .with_nthreads(6)
            .with_splitmode(SplitMode::Never);
        let json = p.to_json().unwrap();
        assert_eq!(CompressionParams::from_json(&json).unwrap(), p);
    }

    #[test]
    fn test_unparsable_json_is_an_error() {
        let err = CompressionParams::from_json("{ not json").unwrap_err();
        assert!(matches!(err, BlockzipError::ConfigParse(_)));

        let err = CompressionParams::from_json(r#"{ "codec": "brotli" }"#).unwrap_err();
        assert!(matches!(err, BlockzipError::ConfigParse(_)));
    }

    #[test]
    fn test_unknown_split_code_parses_then_falls_back() {
        let mut p = CompressionParams::from_json(r#"{ "splitmode": 42 }"#).unwrap();
        assert_eq!(p.splitmode, SplitMode::Unknown(42));

        let warnings = p.validate();
        assert_eq!(warnings, vec![ConfigWarning::SplitModeFallback { raw: 42 }]);
        assert_eq!(p.splitmode, SplitMode::ForwardCompat);
    }

    #[test]
    fn test_validate_substitutes_defaults() {
        let mut p = CompressionParams {
            clevel: 15,
            typesize: 0,
            blocksize: 7,
            nthreads: Some(0),
            ..Default::default()
        };
        let warnings = p.validate();

        let fields: Vec<&str> = warnings
            .iter()
            .filter_map(|w| match w {
                ConfigWarning::InvalidValue { field, .. } => Some(*field),
                ConfigWarning::SplitModeFallback { .. } => None,
            })
            .collect();
        assert_eq!(fields, vec!["clevel", "typesize", "blocksize", "nthreads"]);

        assert_eq!(p.clevel, 5);
        assert_eq!(p.typesize, 1);
        assert_eq!(p.blocksize, 32);
        assert_eq!(p.nthreads, None);

        // validated params are stable
        assert!(p.validate().is_empty());
    }

    #[test]
    fn test_oversized_typesize_falls_back() {
        let mut p = CompressionParams::default().with_typesize(300);
        let warnings = p.validate();
        assert_eq!(warnings.len(), 1);
        assert_eq!(p.typesize, 1);
        assert!(warnings[0].to_string().contains("typesize"));
    }

    #[test]
    fn test_decompression_params() {
        let mut p = DecompressionParams::from_json(r#"{ "nthreads": 0 }"#).unwrap();
        assert_eq!(p.validate().len(), 1);
        assert_eq!(p.nthreads, None);

        let p = DecompressionParams::default().with_nthreads(3);
        assert_eq!(PipelineConfig::from_decompression(&p).nthreads, Some(3));
    }

    #[test]
    fn test_pipeline_config_from_compression() {
        let p = CompressionParams::default().with_nthreads(5);
        assert_eq!(PipelineConfig::from_compression(&p).nthreads, Some(5));
        assert!(PipelineConfig::all_cores().nthreads.unwrap() >= 1);
    }
}
