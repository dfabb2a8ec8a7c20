#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use blockzip_core::compression::CompressionCodec;
    use blockzip_core::container::ChunkedContainer;
    use blockzip_core::context::Context;
    use blockzip_core::params::CompressionParams;
    use blockzip_core::types::BlockzipError;

    fn values(range: std::ops::Range<i64>) -> Vec<i64> {
        range.collect()
    }

    fn decode_i64(bytes: &[u8]) -> Vec<i64> {
        bytes
            .chunks_exact(8)
            .map(|b| i64::from_ne_bytes(b.try_into().unwrap()))
            .collect()
    }

    fn sample_container() -> (ChunkedContainer, Vec<Vec<i64>>) {
        let mut ctx = Context::new(CompressionParams::new(CompressionCodec::Zstd, 5, 8));
        let mut container = ChunkedContainer::new(8);
        let parts = vec![values(0..1000), values(1000..1500), values(-20..0), Vec::new()];
        for part in &parts {
            container.append_typed(&mut ctx, part).unwrap();
        }
        (container, parts)
    }

    #[test]
    fn test_append_and_sizes() {
        let (container, parts) = sample_container();
        assert_eq!(container.typesize(), 8);
        assert_eq!(container.chunk_count(), 4);
        assert!(!container.is_empty());

        let total: usize = parts.iter().map(|p| p.len() * 8).sum();
        assert_eq!(container.total_uncompressed_bytes(), total);
        assert_eq!(
            container.total_compressed_bytes(),
            container.chunks().map(|c| c.cbytes()).sum::<usize>()
        );
        assert_eq!(container.max_chunk_nbytes(), 8000);
        assert_eq!(container.chunk_offset(0).unwrap(), 0);
        assert_eq!(container.chunk_offset(2).unwrap(), 12_000);
        assert_eq!(container.chunk_offset(4).unwrap(), total);
    }

    #[test]
    fn test_chunks_decode_independently() {
        let (container, parts) = sample_container();
        let mut ctx = Context::for_decompression();
        let mut scratch = vec![0u8; container.max_chunk_nbytes()];

        // out of order on purpose
        for i in [2, 0, 3, 1] {
            let n = container.decompress_chunk(&mut ctx, i, &mut scratch).unwrap();
            assert_eq!(decode_i64(&scratch[..n]), parts[i]);
        }
    }

    #[test]
    fn test_chunk_at_out_of_range() {
        let (container, _) = sample_container();
        let (bytes, nbytes) = container.chunk_at(1).unwrap();
        assert_eq!(nbytes, 4000);
        assert_eq!(Context::chunk_info(bytes).unwrap().nbytes, 4000);

        let err = container.chunk_at(4).unwrap_err();
        assert!(matches!(err, BlockzipError::ChunkOutOfRange { index: 4, count: 4 }));
        assert!(err.is_bad_input());
        assert!(container.chunk(4).is_none());
        assert!(container.chunk_offset(5).is_err());
    }

    #[test]
    fn test_append_rejects_garbage_and_trailing_bytes() {
        let mut container = ChunkedContainer::new(1);
        assert!(container.append_chunk(Bytes::from_static(b"not a chunk at all, clearly")).is_err());

        let mut ctx = Context::new(CompressionParams::new(CompressionCodec::Lz4, 5, 1));
        let chunk = ctx.compress_chunk(b"hello hello hello hello").unwrap();
        let mut padded = chunk.to_vec();
        padded.push(0);
        assert!(container.append_chunk(Bytes::from(padded)).is_err());
        assert!(container.is_empty());

        assert_eq!(container.append_chunk(chunk).unwrap(), 0);
    }

    #[test]
    fn test_frame_round_trip() {
        let (container, parts) = sample_container();
        let frame = container.to_frame().unwrap();
        let restored = ChunkedContainer::from_frame(Bytes::from(frame)).unwrap();

        assert_eq!(restored.typesize(), 8);
        assert_eq!(restored.chunk_count(), container.chunk_count());
        assert_eq!(restored.frame_index(), container.frame_index());

        let mut ctx = Context::for_decompression();
        for (i, part) in parts.iter().enumerate() {
            let mut dst = vec![0u8; part.len() * 8];
            restored.decompress_chunk(&mut ctx, i, &mut dst).unwrap();
            assert_eq!(&decode_i64(&dst), part);
        }
    }

    #[test]
    fn test_empty_frame_round_trip() {
        let container = ChunkedContainer::new(4);
        let frame = container.to_frame().unwrap();
        let restored = ChunkedContainer::from_frame(Bytes::from(frame)).unwrap();
        assert!(restored.is_empty());
        assert_eq!(restored.typesize(), 4);
    }

    #[test]
    fn test_frame_rejects_bad_magic_and_truncation() {
        let (container, _) = sample_container();
        let frame = container.to_frame().unwrap();

        let mut bad = frame.clone();
        bad[0] = b'Z';
        let err = ChunkedContainer::from_frame(Bytes::from(bad)).unwrap_err();
        assert!(err.is_bad_input());

        for cut in [0, 5, 12, frame.len() - 1] {
            let err = ChunkedContainer::from_frame(Bytes::copy_from_slice(&frame[..cut])).unwrap_err();
            assert!(err.is_bad_input(), "cut {}: {}", cut, err);
        }
    }
}
