//! context.rs
//! Per-session compression / decompression state.
//!
//! Design notes:
//! - A Context owns its parameters, tuner, codec handles, scratch buffers
//!   and telemetry. It is `Send` but not `Sync`: one per thread.
//! - The tuner only sees parameters between blocks. Each callback runs
//!   against a snapshot that is restored if the callback fails.
//! - Within one chunk the codec, filter, typesize and split decision are
//!   fixed; only the level may move between blocks.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::time::Instant;

use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;
use tracing::{debug, warn};

use crate::compression::{create_compressor, create_decompressor, CompressionCodec, Compressor, Decompressor};
use crate::constants::{MAX_BLOCKSIZE, MAX_CHUNK_NBYTES, MAX_CLEVEL};
use crate::filters::{self, Direction, FilterKind};
use crate::headers::{
    block_span, decode_block_offsets, decode_chunk_header, encode_chunk_header, push_stream_len,
    put_block_offset, take_stream, ChunkFlags, ChunkHeader, HeaderError, OFFSET_LEN,
};
use crate::params::{CompressionParams, ConfigWarning};
use crate::planner::{should_split, streams_for_block};
use crate::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::tuning::{
    compute_blocksize, default_tuner, BlockSample, TunerFactory, TuningError, TuningStrategy, STUNE_DEFAULTS,
};
use crate::types::{BlockzipError, Result};
use crate::utils::{compute_checksum, try_alloc_zeroed, try_resize, try_with_capacity};

/// Fixed per-block encoding choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockLayout {
    pub codec: CompressionCodec,
    pub filter: FilterKind,
    pub typesize: usize,
    pub split: bool,
}

impl BlockLayout {
    fn from_header(h: &ChunkHeader) -> Self {
        Self {
            codec: h.codec,
            filter: h.filter,
            typesize: h.typesize as usize,
            split: h.is_split(),
        }
    }
}

pub struct Context {
    params: CompressionParams,
    tuner: Box<dyn TuningStrategy>,
    compressor: Option<(CompressionCodec, Box<dyn Compressor + Send>)>,
    decompressors: HashMap<CompressionCodec, Box<dyn Decompressor + Send>>,
    /// Filtered copy of the block being processed.
    filtered: Vec<u8>,
    /// Codec output for one stream on the decode side.
    scratch: Vec<u8>,
    counters: TelemetryCounters,
    timer: TelemetryTimer,
    warnings: Vec<ConfigWarning>,
}

impl Context {
    /// Context driven by the default `stune` tuner.
    pub fn new(params: CompressionParams) -> Self {
        Self::with_tuner(params, default_tuner())
    }

    /// Context for reading chunks only; every setting comes from chunk headers.
    pub fn for_decompression() -> Self {
        Self::new(CompressionParams::default())
    }

    /// Validate `params` (substituting defaults) and create a tuner from `factory`.
    ///
    /// A tuner that fails to initialize is replaced by the default one.
    pub fn with_tuner(mut params: CompressionParams, factory: &dyn TunerFactory) -> Self {
        let mut warnings = params.validate();
        let mut counters = TelemetryCounters::default();

        let mut tuner = factory.create();
        match tuner.init(&params) {
            Ok(w) => warnings.extend(w),
            Err(e) => {
                warn!(
                    target: "blockzip::tuning",
                    tuner = factory.name(),
                    error = %e,
                    "tuner init failed, using stune"
                );
                counters.add_tuning_failure();
                tuner.free();
                tuner = STUNE_DEFAULTS.create();
                if let Ok(w) = tuner.init(&params) {
                    warnings.extend(w);
                }
            }
        }

        debug!(
            target: "blockzip::context",
            codec = params.codec.name(),
            clevel = params.clevel,
            typesize = params.typesize,
            tuner = tuner.name(),
            "context configured"
        );

        Self {
            params,
            tuner,
            compressor: None,
            decompressors: HashMap::new(),
            filtered: Vec::new(),
            scratch: Vec::new(),
            counters,
            timer: TelemetryTimer::new(),
            warnings,
        }
    }

    pub fn params(&self) -> &CompressionParams {
        &self.params
    }

    /// Configuration values that were replaced by defaults.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.warnings
    }

    pub fn tuner_name(&self) -> &'static str {
        self.tuner.name()
    }

    pub fn counters(&self) -> &TelemetryCounters {
        &self.counters
    }

    pub fn telemetry(&self) -> TelemetrySnapshot {
        TelemetrySnapshot::from(&self.counters, &self.timer)
    }

    /// Move accumulated counters and stage times out, leaving zeros behind.
    pub fn take_telemetry(&mut self) -> (TelemetryCounters, StageTimes) {
        let counters = std::mem::take(&mut self.counters);
        let times = std::mem::take(&mut self.timer.stage_times);
        (counters, times)
    }

    /// Layout a standalone block of `block_len` bytes gets under the current parameters.
    pub fn block_layout(&self, block_len: usize) -> BlockLayout {
        let p = &self.params;
        BlockLayout {
            codec: p.codec,
            filter: p.filter,
            typesize: p.typesize,
            split: should_split(p.splitmode, p.codec, p.typesize, block_len, p.header_flags()),
        }
    }

    // ---------------------------------------------------------------------
    // Block level
    // ---------------------------------------------------------------------

    /// Compress one block: split decision, forward filter, per-stream codec.
    ///
    /// The tuner is updated with the elapsed time and may adjust parameters
    /// for the next call.
    pub fn compress_block(&mut self, block: &[u8]) -> Result<Vec<u8>> {
        let layout = self.block_layout(block.len());
        let clevel = self.params.clevel;
        let mut out = try_with_capacity(block.len() + OFFSET_LEN * layout.typesize.max(1), "block output")?;

        let t = Instant::now();
        self.encode_block(block, layout, clevel, &mut out)?;
        self.after_block(&BlockSample::new(t.elapsed(), block.len(), out.len()));
        Ok(out)
    }

    /// Inverse of `compress_block` under the same codec, filter and typesize.
    pub fn decompress_block(&mut self, compressed: &[u8], block_len: usize) -> Result<Vec<u8>> {
        let layout = self.block_layout(block_len);
        let mut dst = try_alloc_zeroed(block_len, "block output")?;
        self.decode_block(compressed, layout, 0, &mut dst)?;
        Ok(dst)
    }

    fn ensure_compressor(&mut self, codec: CompressionCodec) -> Result<()> {
        let current = self.compressor.as_ref().map(|(c, _)| *c);
        if current != Some(codec) {
            self.compressor = Some((codec, create_compressor(codec)?));
        }
        Ok(())
    }

    fn decompressor_for(
        cache: &mut HashMap<CompressionCodec, Box<dyn Decompressor + Send>>,
        codec: CompressionCodec,
    ) -> Result<&mut Box<dyn Decompressor + Send>> {
        match cache.entry(codec) {
            Entry::Occupied(e) => Ok(e.into_mut()),
            Entry::Vacant(v) => Ok(v.insert(create_decompressor(codec)?)),
        }
    }

    /// Append the streams of `src` to `out`. Returns the bytes appended.
    fn encode_block(&mut self, src: &[u8], layout: BlockLayout, clevel: u8, out: &mut Vec<u8>) -> Result<usize> {
        let start = out.len();
        let len = src.len();
        if clevel > 0 {
            self.ensure_compressor(layout.codec)?;
        }

        try_resize(&mut self.filtered, len, "filter scratch")?;
        let t = Instant::now();
        filters::apply(layout.filter, Direction::Forward, layout.typesize, src, &mut self.filtered[..len])?;
        self.timer.add_stage_time(Stage::Filter, t.elapsed());

        let nstreams = streams_for_block(layout.split, layout.typesize, len);
        let stream_len = len / nstreams;
        let mut raw_streams = 0;

        let t = Instant::now();
        for s in 0..nstreams {
            let stream = &self.filtered[s * stream_len..(s + 1) * stream_len];
            let prefix_at = out.len();
            push_stream_len(out, 0);

            let csize = match (&mut self.compressor, clevel) {
                (Some((_, compressor)), level) if level > 0 && !stream.is_empty() => {
                    compressor.compress_block(level, stream, out)?
                }
                _ => stream.len(),
            };

            // Keep codec output only when it is strictly smaller.
            let written = if clevel == 0 || csize >= stream.len() {
                out.truncate(prefix_at + OFFSET_LEN);
                out.extend_from_slice(stream);
                raw_streams += 1;
                stream.len()
            } else {
                csize
            };
            LittleEndian::write_u32(&mut out[prefix_at..prefix_at + OFFSET_LEN], written as u32);
        }
        self.timer.add_stage_time(Stage::Compress, t.elapsed());
        self.counters.add_block(nstreams, raw_streams);

        Ok(out.len() - start)
    }

    /// Decode one block into `dst`, whose length is the block's uncompressed size.
    fn decode_block(&mut self, block: &[u8], layout: BlockLayout, index: usize, dst: &mut [u8]) -> Result<()> {
        let len = dst.len();
        try_resize(&mut self.filtered, len, "filter scratch")?;

        let nstreams = streams_for_block(layout.split, layout.typesize, len);
        let stream_len = len / nstreams;
        let mut rest = block;
        let mut raw_streams = 0;

        let t = Instant::now();
        for s in 0..nstreams {
            let (payload, tail) = take_stream(rest, index)?;
            rest = tail;
            let target = &mut self.filtered[s * stream_len..(s + 1) * stream_len];

            if payload.len() == stream_len {
                target.copy_from_slice(payload);
                raw_streams += 1;
            } else if payload.len() > stream_len {
                return Err(HeaderError::StreamLengthMismatch { index }.into());
            } else {
                let decompressor = Self::decompressor_for(&mut self.decompressors, layout.codec)?;
                self.scratch.clear();
                decompressor.decompress_block(payload, stream_len, &mut self.scratch)?;
                target.copy_from_slice(&self.scratch);
            }
        }
        if !rest.is_empty() {
            return Err(HeaderError::StreamLengthMismatch { index }.into());
        }
        self.timer.add_stage_time(Stage::Decompress, t.elapsed());

        let t = Instant::now();
        filters::apply(layout.filter, Direction::Inverse, layout.typesize, &self.filtered[..len], dst)?;
        self.timer.add_stage_time(Stage::Unfilter, t.elapsed());
        self.counters.add_block(nstreams, raw_streams);
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Tuning
    // ---------------------------------------------------------------------

    /// Run one tuner callback against a parameter snapshot.
    fn tune<F>(&mut self, callback: &'static str, f: F)
    where
        F: FnOnce(&mut dyn TuningStrategy, &mut CompressionParams) -> std::result::Result<(), TuningError>,
    {
        let t = Instant::now();
        let snapshot = self.params.clone();
        match f(self.tuner.as_mut(), &mut self.params) {
            Ok(()) => {
                if self.params.clevel > MAX_CLEVEL {
                    self.params.clevel = MAX_CLEVEL;
                }
            }
            Err(e) => {
                self.params = snapshot;
                self.counters.add_tuning_failure();
                warn!(
                    target: "blockzip::tuning",
                    tuner = self.tuner.name(),
                    callback,
                    error = %e,
                    "tuner callback failed, parameters unchanged"
                );
            }
        }
        self.timer.add_stage_time(Stage::Tune, t.elapsed());
    }

    fn after_block(&mut self, sample: &BlockSample) {
        self.tune("update", |tuner, _| tuner.update(sample));
        self.tune("next_cparams", |tuner, params| tuner.next_cparams(params));
    }

    /// Block size for a chunk of `srcsize` bytes, never 0 for a non-empty source
    /// and never above MAX_BLOCKSIZE.
    fn chunk_blocksize(&mut self, srcsize: usize) -> usize {
        let t = Instant::now();
        let proposed = match self.tuner.next_blocksize(&self.params, srcsize) {
            Ok(bs) => bs,
            Err(e) => {
                self.counters.add_tuning_failure();
                warn!(
                    target: "blockzip::tuning",
                    tuner = self.tuner.name(),
                    callback = "next_blocksize",
                    error = %e,
                    "tuner callback failed, using cache-aware default"
                );
                compute_blocksize(&self.params, srcsize)
            }
        };
        self.timer.add_stage_time(Stage::Tune, t.elapsed());

        // a tuner may propose anything; blocks stay within MAX_BLOCKSIZE
        match proposed {
            0 => srcsize.min(MAX_BLOCKSIZE),
            bs => bs.min(MAX_BLOCKSIZE).min(srcsize),
        }
    }

    // ---------------------------------------------------------------------
    // Chunk level
    // ---------------------------------------------------------------------

    /// Compress `src` into a self-describing chunk.
    ///
    /// Stored raw (`MEMCPYED`) when clevel is 0 or compression does not shrink it.
    pub fn compress_chunk(&mut self, src: &[u8]) -> Result<Bytes> {
        if src.len() > MAX_CHUNK_NBYTES {
            return Err(BlockzipError::SourceTooLarge { have: src.len(), max: MAX_CHUNK_NBYTES });
        }

        let t = Instant::now();
        let checksum = compute_checksum(src);
        self.timer.add_stage_time(Stage::Checksum, t.elapsed());

        let blocksize = self.chunk_blocksize(src.len());
        let p = &self.params;
        let mut header = ChunkHeader::new(p.codec, p.filter, p.typesize as u8, p.clevel);
        header.nbytes = src.len() as u32;
        header.blocksize = blocksize as u32;
        header.checksum = checksum;
        header.flags = p.header_flags();
        if should_split(p.splitmode, p.codec, p.typesize, blocksize, header.flags) {
            header.flags |= ChunkFlags::SPLIT;
        }

        if p.clevel == 0 || src.is_empty() {
            return self.memcpyed_chunk(header, src);
        }

        let layout = BlockLayout::from_header(&header);
        let nblocks = header.nblocks();
        let table_end = ChunkHeader::LEN + header.table_len();
        let mut out = try_with_capacity(table_end + src.len() + nblocks * OFFSET_LEN, "chunk output")?;
        out.resize(table_end, 0);

        for (i, block) in src.chunks(blocksize).enumerate() {
            let offset = out.len();
            put_block_offset(&mut out, i, offset as u32)?;

            let clevel = self.params.clevel.max(1);
            let t = Instant::now();
            self.encode_block(block, layout, clevel, &mut out)?;
            self.after_block(&BlockSample::new(t.elapsed(), block.len(), out.len() - offset));

            if out.len() >= ChunkHeader::LEN + src.len() {
                debug!(target: "blockzip::context", nbytes = src.len(), "chunk does not compress, storing raw");
                return self.memcpyed_chunk(header, src);
            }
        }

        header.cbytes = out.len() as u32;
        encode_chunk_header(&header, &mut out[..ChunkHeader::LEN])?;
        self.counters.add_chunk(src.len(), out.len(), table_end, false);
        debug!(
            target: "blockzip::context",
            nbytes = src.len(),
            cbytes = out.len(),
            blocksize,
            nblocks,
            split = header.is_split(),
            "chunk compressed"
        );
        Ok(Bytes::from(out))
    }

    fn memcpyed_chunk(&mut self, mut header: ChunkHeader, src: &[u8]) -> Result<Bytes> {
        header.flags = (header.flags - ChunkFlags::SPLIT) | ChunkFlags::MEMCPYED;
        header.cbytes = (ChunkHeader::LEN + src.len()) as u32;

        let mut out = try_alloc_zeroed(ChunkHeader::LEN, "chunk output")?;
        out.try_reserve_exact(src.len())
            .map_err(|_| BlockzipError::Allocation { what: "chunk output", bytes: src.len() })?;
        encode_chunk_header(&header, &mut out[..ChunkHeader::LEN])?;
        out.extend_from_slice(src);

        self.counters.add_chunk(src.len(), out.len(), ChunkHeader::LEN, true);
        Ok(Bytes::from(out))
    }

    /// Decode a chunk into the front of `dst`. Returns the uncompressed size.
    pub fn decompress_chunk(&mut self, chunk: &[u8], dst: &mut [u8]) -> Result<usize> {
        let header = decode_chunk_header(chunk)?;
        let nbytes = header.nbytes as usize;
        if dst.len() < nbytes {
            return Err(BlockzipError::DestinationTooSmall { have: dst.len(), need: nbytes });
        }
        let dst = &mut dst[..nbytes];

        if header.is_memcpyed() {
            dst.copy_from_slice(&chunk[ChunkHeader::LEN..ChunkHeader::LEN + nbytes]);
        } else {
            let offsets = decode_block_offsets(chunk, &header)?;
            let layout = BlockLayout::from_header(&header);
            let bs = header.blocksize as usize;
            for index in 0..offsets.len() {
                let (start, end) = block_span(&offsets, index, &header);
                let block_start = index * bs;
                let block_len = header.block_len(index);
                self.decode_block(
                    &chunk[start..end],
                    layout,
                    index,
                    &mut dst[block_start..block_start + block_len],
                )?;
            }
        }

        let t = Instant::now();
        let computed = compute_checksum(dst);
        self.timer.add_stage_time(Stage::Checksum, t.elapsed());
        if computed != header.checksum {
            return Err(HeaderError::ChecksumMismatch { stored: header.checksum, computed }.into());
        }

        let overhead = ChunkHeader::LEN + header.table_len();
        self.counters.add_chunk(nbytes, header.cbytes as usize, overhead, header.is_memcpyed());
        Ok(nbytes)
    }

    /// Decode a chunk into a freshly allocated buffer.
    pub fn decompress_chunk_to_vec(&mut self, chunk: &[u8]) -> Result<Vec<u8>> {
        let header = decode_chunk_header(chunk)?;
        let mut dst = try_alloc_zeroed(header.nbytes as usize, "chunk output")?;
        self.decompress_chunk(chunk, &mut dst)?;
        Ok(dst)
    }

    /// Read a chunk's header without decompressing it.
    pub fn chunk_info(chunk: &[u8]) -> Result<ChunkHeader> {
        Ok(decode_chunk_header(chunk)?)
    }
}

impl Drop for Context {
    fn drop(&mut self) {
        self.tuner.free();
    }
}
