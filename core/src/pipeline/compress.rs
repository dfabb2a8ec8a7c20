//! pipeline/compress.rs
//! Parallel compression of one buffer into a container.
//!
//! Workers send finished chunks over a bounded channel to the calling
//! thread; chunks are appended in chunk-index order once everything joined.

use std::thread;

use bytes::Bytes;
use crossbeam::channel::{bounded, Sender};
use tracing::debug;

use crate::container::ChunkedContainer;
use crate::context::Context;
use crate::params::CompressionParams;
use crate::pipeline::decompress::ChunkPipeline;
use crate::pipeline::{join_in_order, PipelineError, PipelineOutput, WorkerReport};
use crate::telemetry::{StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::tuning::TunerFactory;
use crate::types::BlockzipError;

impl ChunkPipeline {
    /// Cut `src` into chunks of `chunk_size` bytes (rounded down to whole
    /// elements, 0 = one chunk), compress them in parallel and append them
    /// to `container` in order. Returns the number of chunks appended.
    ///
    /// Each worker builds its own Context from `params` and `tuner`.
    pub fn compress_into(
        &self,
        container: &mut ChunkedContainer,
        src: &[u8],
        chunk_size: usize,
        params: &CompressionParams,
        tuner: &dyn TunerFactory,
    ) -> Result<PipelineOutput<usize>, PipelineError> {
        let mut timer = TelemetryTimer::new();

        // Validate once so workers do not repeat the same warnings.
        let mut params = params.clone();
        params.validate();
        let params = &params;

        let ts = params.typesize.max(1);
        let chunk_size = match chunk_size {
            0 => src.len().max(1),
            cs => (cs - cs % ts).max(ts),
        };
        let pieces: Vec<&[u8]> = src.chunks(chunk_size).collect();
        let n = pieces.len();
        let partition = self.partition(n);
        let owners = partition.owners(n);
        let pieces = &pieces;

        let mut slots: Vec<Option<Bytes>> = vec![None; n];
        let results = thread::scope(|s| {
            let (tx, rx) = bounded::<(usize, Bytes)>(partition.groups.len() * 2);
            let handles = partition
                .groups
                .iter()
                .enumerate()
                .map(|(w, group)| {
                    let tx = tx.clone();
                    (w, s.spawn(move || compress_group(w, group, pieces, params, tuner, &tx)))
                })
                .collect();
            drop(tx);

            for (index, data) in rx.iter() {
                slots[index] = Some(data);
            }
            join_in_order(handles)
        });

        let mut reports = Vec::with_capacity(results.len() + 1);
        for result in results {
            reports.push(result?);
        }

        if !partition.tail.is_empty() {
            let worker = partition.groups.len();
            let mut ctx = Context::with_tuner(params.clone(), tuner);
            for &chunk in &partition.tail {
                let data = ctx
                    .compress_chunk(pieces[chunk])
                    .map_err(|source| PipelineError::Chunk { worker, chunk, source })?;
                slots[chunk] = Some(data);
            }
            let (counters, stage_times) = ctx.take_telemetry();
            reports.push(WorkerReport { value: (), counters, stage_times });
        }

        for (chunk, slot) in slots.into_iter().enumerate() {
            let worker = owners[chunk];
            let data = slot.ok_or(PipelineError::Chunk {
                worker,
                chunk,
                source: BlockzipError::ChunkOutOfRange { index: chunk, count: n },
            })?;
            container
                .append_chunk(data)
                .map_err(|source| PipelineError::Chunk { worker, chunk, source })?;
        }

        let mut counters = TelemetryCounters::default();
        let mut stage_times = StageTimes::default();
        for report in &reports {
            counters.merge(&report.counters);
            stage_times.merge(&report.stage_times);
        }
        timer.finish();
        debug!(target: "blockzip::pipeline", chunks = n, chunk_size, "compress_into done");

        Ok(PipelineOutput {
            value: n,
            telemetry: TelemetrySnapshot::with_stage_times(&counters, stage_times, timer.elapsed()),
        })
    }
}

fn compress_group(
    worker: usize,
    indices: &[usize],
    pieces: &[&[u8]],
    params: &CompressionParams,
    tuner: &dyn TunerFactory,
    tx: &Sender<(usize, Bytes)>,
) -> Result<WorkerReport<()>, PipelineError> {
    let mut ctx = Context::with_tuner(params.clone(), tuner);
    debug!(target: "blockzip::pipeline", worker, chunks = indices.len(), tuner = ctx.tuner_name(), "worker start");

    for &chunk in indices {
        let data = ctx
            .compress_chunk(pieces[chunk])
            .map_err(|source| PipelineError::Chunk { worker, chunk, source })?;
        // Only fails once the collector is gone.
        if tx.send((chunk, data)).is_err() {
            break;
        }
    }

    let (counters, stage_times) = ctx.take_telemetry();
    Ok(WorkerReport { value: (), counters, stage_times })
}
