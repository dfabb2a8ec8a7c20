//! pipeline/parallelism.rs
//! Thread count resolution and chunk partitioning.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::{DEFAULT_NTHREADS, ENV_NTHREADS};
use crate::params::{CompressionParams, ConfigWarning, DecompressionParams};

/// Where the `N mod W` leftover chunks go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemainderPolicy {
    /// Calling thread processes them after the join, combined last.
    Tail,
    /// Leftover chunk `k` is appended to worker `k`'s group.
    #[default]
    RoundRobin,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Explicit worker count; `None` consults the environment.
    pub nthreads: Option<usize>,
    pub remainder: RemainderPolicy,
}

impl PipelineConfig {
    pub fn new(nthreads: usize, remainder: RemainderPolicy) -> Self {
        Self { nthreads: Some(nthreads), remainder }
    }

    pub fn with_nthreads(mut self, nthreads: usize) -> Self {
        self.nthreads = Some(nthreads);
        self
    }

    pub fn with_remainder(mut self, remainder: RemainderPolicy) -> Self {
        self.remainder = remainder;
        self
    }

    /// One worker per logical core.
    pub fn all_cores() -> Self {
        Self { nthreads: Some(num_cpus::get().max(1)), ..Default::default() }
    }

    pub fn from_compression(params: &CompressionParams) -> Self {
        Self { nthreads: params.nthreads, ..Default::default() }
    }

    pub fn from_decompression(params: &DecompressionParams) -> Self {
        Self { nthreads: params.nthreads, ..Default::default() }
    }
}

/// Resolved worker count and remainder policy for one pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadProfile {
    pub workers: usize,
    pub remainder: RemainderPolicy,
    pub warnings: Vec<ConfigWarning>,
}

impl ThreadProfile {
    pub fn single_threaded() -> Self {
        Self { workers: 1, remainder: RemainderPolicy::default(), warnings: Vec::new() }
    }

    /// Explicit config, else `BLOCKZIP_NTHREADS`, else `DEFAULT_NTHREADS`.
    ///
    /// The environment is read once, here.
    pub fn resolve(config: &PipelineConfig) -> Self {
        let env = std::env::var(ENV_NTHREADS).ok();
        Self::resolve_with(config, env.as_deref())
    }

    /// `resolve` with the environment value supplied by the caller.
    pub fn resolve_with(config: &PipelineConfig, env: Option<&str>) -> Self {
        let mut warnings = Vec::new();

        let explicit = match config.nthreads {
            Some(0) => {
                warnings.push(ConfigWarning::InvalidValue {
                    field: "nthreads",
                    value: "0".into(),
                    fallback: "environment or default".into(),
                });
                None
            }
            other => other,
        };

        let from_env = match (explicit, env) {
            (None, Some(raw)) => match raw.trim().parse::<usize>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    warnings.push(ConfigWarning::InvalidValue {
                        field: ENV_NTHREADS,
                        value: raw.to_string(),
                        fallback: DEFAULT_NTHREADS.to_string(),
                    });
                    None
                }
            },
            _ => None,
        };

        for w in &warnings {
            w.log();
        }

        let workers = explicit.or(from_env).unwrap_or(DEFAULT_NTHREADS);
        debug!(target: "blockzip::pipeline", workers, remainder = ?config.remainder, "thread profile resolved");
        Self { workers, remainder: config.remainder, warnings }
    }
}

/// Chunk indices per worker, plus the indices left to the calling thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    pub groups: Vec<Vec<usize>>,
    pub tail: Vec<usize>,
}

impl Partition {
    /// Contiguous groups of `n / workers` indices; leftovers per `policy`.
    ///
    /// Every group is ascending.
    pub fn new(n: usize, workers: usize, policy: RemainderPolicy) -> Self {
        let workers = workers.max(1);
        let per_worker = n / workers;
        let mut groups: Vec<Vec<usize>> = (0..workers)
            .map(|w| (w * per_worker..(w + 1) * per_worker).collect())
            .collect();

        let leftover = workers * per_worker..n;
        let tail = match policy {
            RemainderPolicy::Tail => leftover.collect(),
            RemainderPolicy::RoundRobin => {
                for (k, index) in leftover.enumerate() {
                    groups[k].push(index);
                }
                Vec::new()
            }
        };
        Self { groups, tail }
    }

    /// Owner of each chunk index; the tail is owner `groups.len()`.
    pub fn owners(&self, n: usize) -> Vec<usize> {
        let mut owners = vec![self.groups.len(); n];
        for (w, group) in self.groups.iter().enumerate() {
            for &i in group {
                owners[i] = w;
            }
        }
        owners
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_policy_leaves_remainder_to_caller() {
        let p = Partition::new(7, 3, RemainderPolicy::Tail);
        assert_eq!(p.groups, vec![vec![0, 1], vec![2, 3], vec![4, 5]]);
        assert_eq!(p.tail, vec![6]);
    }

    #[test]
    fn round_robin_appends_remainder_in_order() {
        let p = Partition::new(8, 3, RemainderPolicy::RoundRobin);
        assert_eq!(p.groups, vec![vec![0, 1, 6], vec![2, 3, 7], vec![4, 5]]);
        assert!(p.tail.is_empty());
    }
}
