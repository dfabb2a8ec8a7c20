//! telemetry/timers.rs
//! Per-stage wall time for block and chunk processing.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Filter,
    Unfilter,
    Compress,
    Decompress,
    Tune,
    Checksum,
    Reduce,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Filter,
        Stage::Unfilter,
        Stage::Compress,
        Stage::Decompress,
        Stage::Tune,
        Stage::Checksum,
        Stage::Reduce,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Filter     => "filter",
            Stage::Unfilter   => "unfilter",
            Stage::Compress   => "compress",
            Stage::Decompress => "decompress",
            Stage::Tune       => "tune",
            Stage::Checksum   => "checksum",
            Stage::Reduce     => "reduce",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accumulated time per stage; `None` until a stage is first charged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StageTimes {
    slots: [Option<Duration>; 7],
}

impl StageTimes {
    pub fn add(&mut self, stage: Stage, dur: Duration) {
        let slot = &mut self.slots[stage as usize];
        *slot = Some(slot.unwrap_or(Duration::ZERO) + dur);
    }

    pub fn get(&self, stage: Stage) -> Duration {
        self.slots[stage as usize].unwrap_or(Duration::ZERO)
    }

    /// Sum over stages. Summed across workers this exceeds wall time.
    pub fn total(&self) -> Duration {
        self.slots.iter().flatten().sum()
    }

    pub fn has_all(&self, expected: &[Stage]) -> bool {
        expected.iter().all(|&s| self.slots[s as usize].is_some())
    }

    pub fn merge(&mut self, other: &StageTimes) {
        for (stage, dur) in other.iter() {
            self.add(stage, dur);
        }
    }

    /// Charged stages in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (Stage, Duration)> + '_ {
        Stage::ALL
            .iter()
            .filter_map(move |&s| self.slots[s as usize].map(|d| (s, d)))
    }
}

/// Wall clock of one run plus the stage times charged during it.
#[derive(Clone, Debug)]
pub struct TelemetryTimer {
    started: Instant,
    finished: Option<Instant>,
    pub stage_times: StageTimes,
}

impl Default for TelemetryTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl TelemetryTimer {
    pub fn new() -> Self {
        Self { started: Instant::now(), finished: None, stage_times: StageTimes::default() }
    }

    /// Freeze `elapsed`; later stage charges are still recorded.
    pub fn finish(&mut self) {
        self.finished = Some(Instant::now());
    }

    pub fn add_stage_time(&mut self, stage: Stage, dur: Duration) {
        self.stage_times.add(stage, dur);
    }

    pub fn elapsed(&self) -> Duration {
        self.finished.unwrap_or_else(Instant::now).duration_since(self.started)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_accumulates_and_marks_stages() {
        let mut a = StageTimes::default();
        a.add(Stage::Compress, Duration::from_millis(2));
        let mut b = StageTimes::default();
        b.add(Stage::Compress, Duration::from_millis(3));
        b.add(Stage::Reduce, Duration::ZERO);

        a.merge(&b);
        assert_eq!(a.get(Stage::Compress), Duration::from_millis(5));
        assert!(a.has_all(&[Stage::Compress, Stage::Reduce]));
        assert!(!a.has_all(&[Stage::Filter]));
        assert_eq!(a.iter().map(|(s, _)| s).collect::<Vec<_>>(), vec![Stage::Compress, Stage::Reduce]);
    }
}
