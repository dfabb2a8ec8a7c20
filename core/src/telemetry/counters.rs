//! telemetry/counters.rs
//! Mutable counters collected by a Context or a pipeline worker.
//!
//! Converted into an immutable `TelemetrySnapshot` when a run ends.
use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub chunks: u64,
    /// Chunks stored raw because compression did not pay off or clevel was 0.
    pub chunks_memcpyed: u64,
    pub blocks: u64,
    pub blocks_split: u64,
    pub streams: u64,
    /// Streams kept raw because the codec output was not smaller.
    pub streams_raw: u64,
    pub bytes_uncompressed: u64,
    pub bytes_compressed: u64,
    /// Header and offset-table bytes.
    pub bytes_overhead: u64,
    /// Tuner callbacks that failed and were rolled back.
    pub tuning_failures: u64,
}

impl TelemetryCounters {
    /// Record one block written or read with `nstreams` streams.
    pub fn add_block(&mut self, nstreams: usize, raw_streams: usize) {
        self.blocks += 1;
        if nstreams > 1 {
            self.blocks_split += 1;
        }
        self.streams += nstreams as u64;
        self.streams_raw += raw_streams as u64;
    }

    /// Record one whole chunk.
    pub fn add_chunk(&mut self, nbytes: usize, cbytes: usize, overhead: usize, memcpyed: bool) {
        self.chunks += 1;
        if memcpyed {
            self.chunks_memcpyed += 1;
        }
        self.bytes_uncompressed += nbytes as u64;
        self.bytes_compressed += cbytes as u64;
        self.bytes_overhead += overhead as u64;
    }

    pub fn add_tuning_failure(&mut self) {
        self.tuning_failures += 1;
    }

    // Workers accumulate locally and merge once after the join.
    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.chunks += other.chunks;
        self.chunks_memcpyed += other.chunks_memcpyed;
        self.blocks += other.blocks;
        self.blocks_split += other.blocks_split;
        self.streams += other.streams;
        self.streams_raw += other.streams_raw;
        self.bytes_uncompressed += other.bytes_uncompressed;
        self.bytes_compressed += other.bytes_compressed;
        self.bytes_overhead += other.bytes_overhead;
        self.tuning_failures += other.tuning_failures;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
