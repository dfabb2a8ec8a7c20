#[cfg(test)]
mod tests {
    use blockzip_core::compression::CompressionCodec;
    use blockzip_core::filters::FilterKind;
    use blockzip_core::headers::{
        decode_block_offsets, decode_chunk_header, encode_chunk_header_array, put_block_offset, take_stream,
        ChunkFlags, ChunkHeader, HeaderError,
    };

    fn header(nbytes: u32, blocksize: u32) -> ChunkHeader {
        let mut h = ChunkHeader::new(CompressionCodec::Zstd, FilterKind::ByteDelta, 8, 7);
        h.flags = ChunkFlags::SPLIT | ChunkFlags::EXTENDED_HEADER;
        h.nbytes = nbytes;
        h.blocksize = blocksize;
        h.cbytes = (ChunkHeader::LEN + h.table_len() + 64) as u32;
        h.checksum = 0xdead_beef;
        h
    }

    fn wire(h: &ChunkHeader) -> Vec<u8> {
        let mut buf = encode_chunk_header_array(h).unwrap().to_vec();
        buf.resize(h.cbytes as usize, 0);
        buf
    }

    #[test]
    fn test_header_layout_is_little_endian() {
        let h = header(1000, 256);
        let buf = wire(&h);
        assert_eq!(&buf[0..4], b"BKZ1");
        assert_eq!(buf[5], CompressionCodec::Zstd as u8);
        assert_eq!(buf[6], FilterKind::ByteDelta as u8);
        assert_eq!(buf[7], 0x03);
        assert_eq!(&buf[12..16], &1000u32.to_le_bytes());
        assert_eq!(&buf[24..28], &0xdead_beefu32.to_le_bytes());

        assert_eq!(decode_chunk_header(&buf).unwrap(), h);
    }

    #[test]
    fn test_block_geometry() {
        let h = header(1000, 256);
        assert_eq!(h.nblocks(), 4);
        assert_eq!(h.table_len(), 16);
        assert_eq!(h.block_len(0), 256);
        assert_eq!(h.block_len(3), 1000 - 3 * 256);
        assert_eq!(h.block_len(4), 0);
    }

    fn rejected(mutate: impl Fn(&mut ChunkHeader)) -> HeaderError {
        let mut h = header(1000, 256);
        mutate(&mut h);
        h.validate().unwrap_err()
    }

    #[test]
    fn test_validation_rejects_inconsistent_fields() {
        assert_eq!(rejected(|h| h.version = 9), HeaderError::UnsupportedVersion { have: 9 });
        assert!(matches!(rejected(|h| h.typesize = 0), HeaderError::InvalidTypesize { .. }));
        assert!(matches!(rejected(|h| h.reserved = [0, 1]), HeaderError::ReservedBytesNonZero { .. }));
        assert!(matches!(rejected(|h| h.blocksize = 0), HeaderError::InvalidBlocksize { .. }));
        assert!(matches!(rejected(|h| h.blocksize = 2000), HeaderError::InvalidBlocksize { .. }));
        assert!(matches!(rejected(|h| h.cbytes = 20), HeaderError::InvalidLength { .. }));
        // memcpyed chunks must be exactly header + source
        assert!(matches!(rejected(|h| h.flags |= ChunkFlags::MEMCPYED), HeaderError::InvalidLength { .. }));
    }

    #[test]
    fn test_unknown_ids_are_named_in_errors() {
        let mut buf = wire(&header(1000, 256));
        buf[5] = 0x42;
        let err = decode_chunk_header(&buf).unwrap_err();
        assert_eq!(err, HeaderError::UnknownCodec { raw: 0x42 });
        assert!(err.to_string().contains("0x42"));

        let mut buf = wire(&header(1000, 256));
        buf[6] = 9;
        assert_eq!(decode_chunk_header(&buf).unwrap_err(), HeaderError::UnknownFilter { raw: 9 });

        let mut buf = wire(&header(1000, 256));
        buf[7] = 0x80;
        assert_eq!(decode_chunk_header(&buf).unwrap_err(), HeaderError::InvalidFlags { raw: 0x80 });
    }

    #[test]
    fn test_block_offsets_must_ascend_inside_payload() {
        let h = header(1000, 256);
        let mut buf = wire(&h);
        let start = (ChunkHeader::LEN + h.table_len()) as u32;
        for (i, off) in [start, start + 10, start + 20, start + 30].into_iter().enumerate() {
            put_block_offset(&mut buf, i, off).unwrap();
        }
        assert_eq!(decode_block_offsets(&buf, &h).unwrap(), vec![start, start + 10, start + 20, start + 30]);

        put_block_offset(&mut buf, 2, start + 5).unwrap();
        assert!(matches!(
            decode_block_offsets(&buf, &h).unwrap_err(),
            HeaderError::InvalidBlockOffset { index: 2, .. }
        ));

        put_block_offset(&mut buf, 0, 0).unwrap();
        assert!(matches!(
            decode_block_offsets(&buf, &h).unwrap_err(),
            HeaderError::InvalidBlockOffset { index: 0, .. }
        ));
    }

    #[test]
    fn test_take_stream() {
        let block = [3u8, 0, 0, 0, 0xa, 0xb, 0xc, 1, 0, 0, 0, 0xd];
        let (first, rest) = take_stream(&block, 0).unwrap();
        assert_eq!(first, &[0xa, 0xb, 0xc]);
        let (second, rest) = take_stream(rest, 0).unwrap();
        assert_eq!(second, &[0xd]);
        assert!(rest.is_empty());

        assert!(matches!(take_stream(&block[..2], 5), Err(HeaderError::TruncatedBlock { index: 5, .. })));
        assert!(matches!(take_stream(&block[..6], 1), Err(HeaderError::TruncatedBlock { index: 1, have: 2, need: 3 })));
    }
}
