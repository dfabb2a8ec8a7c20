//! src/telemetry/snapshot.rs
//!
//! Immutable view of a finished run: counters, derived ratios and stage times.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub counters: TelemetryCounters,
    /// compressed / uncompressed; 0 when nothing was processed.
    pub compression_ratio: f64,
    pub throughput_bytes_per_sec: f64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer) -> Self {
        Self::with_stage_times(counters, timer.stage_times.clone(), timer.elapsed())
    }

    pub fn with_stage_times(counters: &TelemetryCounters, stage_times: StageTimes, elapsed: Duration) -> Self {
        let compression_ratio = if counters.bytes_uncompressed > 0 {
            counters.bytes_compressed as f64 / counters.bytes_uncompressed as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_uncompressed as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            counters: counters.clone(),
            compression_ratio,
            throughput_bytes_per_sec: throughput,
            elapsed,
            stage_times,
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
