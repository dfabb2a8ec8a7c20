//! pipeline/mod.rs
//! Multi-threaded chunk processing over a `ChunkedContainer`.
//!
//! Design notes:
//! - Scoped OS threads; no thread outlives a call and every call blocks.
//! - Each worker owns one Context, one scratch buffer and one accumulator.
//!   The container is shared read-only; there are no locks in the parallel
//!   region.
//! - All workers are joined before anything is combined. Accumulators,
//!   telemetry and errors are taken in worker-index order, the tail last.

pub mod compress;
pub mod decompress;
pub mod parallelism;

use std::thread::ScopedJoinHandle;

use thiserror::Error;

use crate::telemetry::{StageTimes, TelemetryCounters, TelemetrySnapshot};
use crate::types::BlockzipError;

pub use decompress::ChunkPipeline;
pub use parallelism::{Partition, PipelineConfig, RemainderPolicy, ThreadProfile};

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Processing chunk `chunk` failed on `worker`. The tail uses `worker == workers`.
    #[error("worker {worker} failed on chunk {chunk}: {source}")]
    Chunk {
        worker: usize,
        chunk: usize,
        #[source]
        source: BlockzipError,
    },

    /// Worker-level failure not tied to a chunk (scratch allocation).
    #[error("worker {worker} failed: {source}")]
    Worker {
        worker: usize,
        #[source]
        source: BlockzipError,
    },

    #[error("worker {worker} panicked")]
    WorkerPanicked { worker: usize },
}

impl PipelineError {
    pub fn worker(&self) -> usize {
        match self {
            PipelineError::Chunk { worker, .. }
            | PipelineError::Worker { worker, .. }
            | PipelineError::WorkerPanicked { worker } => *worker,
        }
    }

    pub fn chunk(&self) -> Option<usize> {
        match self {
            PipelineError::Chunk { chunk, .. } => Some(*chunk),
            _ => None,
        }
    }
}

/// Result of a pipeline run plus merged telemetry.
#[derive(Debug, Clone)]
pub struct PipelineOutput<A> {
    pub value: A,
    pub telemetry: TelemetrySnapshot,
}

/// Per-worker outcome handed back across the join.
pub(crate) struct WorkerReport<A> {
    pub value: A,
    pub counters: TelemetryCounters,
    pub stage_times: StageTimes,
}

/// Join every handle, mapping a panic to `WorkerPanicked`. Order is preserved.
pub(crate) fn join_in_order<T>(
    handles: Vec<(usize, ScopedJoinHandle<'_, Result<T, PipelineError>>)>,
) -> Vec<Result<T, PipelineError>> {
    handles
        .into_iter()
        .map(|(worker, handle)| match handle.join() {
            Ok(result) => result,
            Err(_) => Err(PipelineError::WorkerPanicked { worker }),
        })
        .collect()
}
