//! pipeline/decompress.rs
//! Parallel decompression with a deterministic reduction.

use std::thread;
use std::time::Instant;

use tracing::debug;

use crate::container::{Chunk, ChunkedContainer};
use crate::context::Context;
use crate::params::ConfigWarning;
use crate::pipeline::parallelism::{Partition, PipelineConfig, RemainderPolicy, ThreadProfile};
use crate::pipeline::{join_in_order, PipelineError, PipelineOutput, WorkerReport};
use crate::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::utils::try_alloc_zeroed;

#[derive(Debug, Clone)]
pub struct ChunkPipeline {
    profile: ThreadProfile,
}

impl ChunkPipeline {
    /// Resolve the worker count once (explicit, environment, default).
    pub fn new(config: &PipelineConfig) -> Self {
        Self { profile: ThreadProfile::resolve(config) }
    }

    pub fn with_profile(profile: ThreadProfile) -> Self {
        Self { profile }
    }

    pub fn workers(&self) -> usize {
        self.profile.workers
    }

    pub fn remainder(&self) -> RemainderPolicy {
        self.profile.remainder
    }

    pub(crate) fn partition(&self, n: usize) -> Partition {
        Partition::new(n, self.profile.workers, self.profile.remainder)
    }

    /// Thread-count values that were replaced during resolution.
    pub fn warnings(&self) -> &[ConfigWarning] {
        &self.profile.warnings
    }

    /// Decompress every chunk and fold it into per-worker accumulators.
    ///
    /// `fold(acc, chunk_index, bytes)` runs on the owning worker, indices
    /// ascending. Accumulators are combined in worker-index order after all
    /// workers have joined, the tail (if any) last. The result is independent
    /// of the worker count when `fold`/`combine` are commutative and
    /// associative and `init` is their identity.
    pub fn map_reduce<A, I, F, C>(
        &self,
        container: &ChunkedContainer,
        init: I,
        fold: F,
        mut combine: C,
    ) -> Result<PipelineOutput<A>, PipelineError>
    where
        A: Send,
        I: Fn() -> A + Sync,
        F: Fn(&mut A, usize, &[u8]) + Sync,
        C: FnMut(A, A) -> A,
    {
        let mut timer = TelemetryTimer::new();
        let n = container.chunk_count();
        let partition = self.partition(n);
        debug!(
            target: "blockzip::pipeline",
            chunks = n,
            workers = partition.groups.len(),
            tail = partition.tail.len(),
            "map_reduce start"
        );

        let init = &init;
        let fold = &fold;
        let results = thread::scope(|s| {
            let handles = partition
                .groups
                .iter()
                .enumerate()
                .map(|(w, group)| (w, s.spawn(move || fold_group(w, group, container, init(), fold))))
                .collect();
            join_in_order(handles)
        });

        let mut reports = Vec::with_capacity(results.len() + 1);
        for result in results {
            reports.push(result?);
        }

        // Tail runs on the calling thread after the join.
        if !partition.tail.is_empty() {
            let worker = partition.groups.len();
            reports.push(fold_group(worker, &partition.tail, container, init(), fold)?);
        }

        let t = Instant::now();
        let mut counters = TelemetryCounters::default();
        let mut stage_times = StageTimes::default();
        let mut value: Option<A> = None;
        for report in reports {
            counters.merge(&report.counters);
            stage_times.merge(&report.stage_times);
            value = Some(match value {
                None => report.value,
                Some(acc) => combine(acc, report.value),
            });
        }
        let value = value.unwrap_or_else(init);
        stage_times.add(Stage::Reduce, t.elapsed());

        timer.finish();
        debug!(target: "blockzip::pipeline", chunks = n, "map_reduce done");
        Ok(PipelineOutput {
            value,
            telemetry: TelemetrySnapshot::with_stage_times(&counters, stage_times, timer.elapsed()),
        })
    }

    /// Decompress the whole container into one buffer in chunk order.
    ///
    /// Each worker decodes straight into its chunks' disjoint regions of the
    /// output.
    pub fn decompress_all(&self, container: &ChunkedContainer) -> Result<PipelineOutput<Vec<u8>>, PipelineError> {
        let mut timer = TelemetryTimer::new();
        let n = container.chunk_count();
        let partition = self.partition(n);
        let owners = partition.owners(n);
        let nworkers = partition.groups.len();

        let mut out = try_alloc_zeroed(container.total_uncompressed_bytes(), "array output")
            .map_err(|source| PipelineError::Worker { worker: 0, source })?;

        let mut reports = Vec::with_capacity(nworkers + 1);
        {
            // One slot per worker plus the tail.
            let mut assigned: Vec<Vec<(usize, &mut [u8])>> = (0..=nworkers).map(|_| Vec::new()).collect();
            let mut rest: &mut [u8] = &mut out;
            for (i, chunk) in container.chunks().enumerate() {
                let (head, tail) = std::mem::take(&mut rest).split_at_mut(chunk.nbytes());
                assigned[owners[i]].push((i, head));
                rest = tail;
            }
            let tail_work = assigned.pop().unwrap_or_default();

            let results = thread::scope(|s| {
                let handles = assigned
                    .into_iter()
                    .enumerate()
                    .map(|(w, work)| (w, s.spawn(move || decode_group(w, work, container))))
                    .collect();
                join_in_order(handles)
            });
            for result in results {
                reports.push(result?);
            }
            if !tail_work.is_empty() {
                reports.push(decode_group(nworkers, tail_work, container)?);
            }
        }

        let mut counters = TelemetryCounters::default();
        let mut stage_times = StageTimes::default();
        for report in &reports {
            counters.merge(&report.counters);
            stage_times.merge(&report.stage_times);
        }
        timer.finish();

        Ok(PipelineOutput {
            value: out,
            telemetry: TelemetrySnapshot::with_stage_times(&counters, stage_times, timer.elapsed()),
        })
    }
}

fn fold_group<A, F>(
    worker: usize,
    indices: &[usize],
    container: &ChunkedContainer,
    mut acc: A,
    fold: &F,
) -> Result<WorkerReport<A>, PipelineError>
where
    F: Fn(&mut A, usize, &[u8]),
{
    let scratch_len = indices
        .iter()
        .filter_map(|&i| container.chunk(i))
        .map(Chunk::nbytes)
        .max()
        .unwrap_or(0);
    let mut scratch = try_alloc_zeroed(scratch_len, "worker scratch")
        .map_err(|source| PipelineError::Worker { worker, source })?;
    let mut ctx = Context::for_decompression();

    debug!(target: "blockzip::pipeline", worker, chunks = indices.len(), "worker start");
    for &chunk in indices {
        let nbytes = container
            .decompress_chunk(&mut ctx, chunk, &mut scratch)
            .map_err(|source| PipelineError::Chunk { worker, chunk, source })?;
        fold(&mut acc, chunk, &scratch[..nbytes]);
    }

    let (counters, stage_times) = ctx.take_telemetry();
    Ok(WorkerReport { value: acc, counters, stage_times })
}

fn decode_group(
    worker: usize,
    work: Vec<(usize, &mut [u8])>,
    container: &ChunkedContainer,
) -> Result<WorkerReport<()>, PipelineError> {
    let mut ctx = Context::for_decompression();
    debug!(target: "blockzip::pipeline", worker, chunks = work.len(), "worker start");
    for (chunk, dst) in work {
        container
            .decompress_chunk(&mut ctx, chunk, dst)
            .map_err(|source| PipelineError::Chunk { worker, chunk, source })?;
    }
    let (counters, stage_times) = ctx.take_telemetry();
    Ok(WorkerReport { value: (), counters, stage_times })
}
