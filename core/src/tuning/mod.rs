//! tuning/mod.rs
//! Pluggable block-size / parameter tuning ("btune").
//!
//! Design notes:
//! - A `TunerFactory` is chosen when a Context is configured; the Context
//!   owns the produced `Box<dyn TuningStrategy>` exclusively.
//! - Strategies only see parameters between blocks. A callback that fails
//!   leaves the Context parameters as they were before the call.
//! - `STUNE_DEFAULTS` is an immutable process-wide factory handed out by
//!   reference; it carries no state of its own.

pub mod climb;
pub mod stune;

use std::time::Duration;

use thiserror::Error;

use crate::params::{CompressionParams, ConfigWarning};

pub use climb::{ClimbConfig, ClimbFactory, ClimbTuner};
pub use stune::{base_blocksize, compute_blocksize, fit_blocksize, StuneFactory, StuneTuner};

/// Timing feedback for one compressed block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockSample {
    pub elapsed: Duration,
    /// Uncompressed bytes of the block.
    pub nbytes: usize,
    /// Bytes written for the block, stream prefixes included.
    pub cbytes: usize,
}

impl BlockSample {
    pub fn new(elapsed: Duration, nbytes: usize, cbytes: usize) -> Self {
        Self { elapsed, nbytes, cbytes }
    }

    /// Nanoseconds spent per uncompressed byte; `None` for empty blocks.
    pub fn ns_per_byte(&self) -> Option<f64> {
        if self.nbytes == 0 {
            return None;
        }
        Some(self.elapsed.as_nanos() as f64 / self.nbytes as f64)
    }

    /// Uncompressed bytes per second; `None` when nothing was timed.
    pub fn throughput(&self) -> Option<f64> {
        let secs = self.elapsed.as_secs_f64();
        if secs <= 0.0 || self.nbytes == 0 {
            return None;
        }
        Some(self.nbytes as f64 / secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TuningError {
    #[error("tuner could not allocate {bytes} bytes of state")]
    Allocation { bytes: usize },
    #[error("tuner rejected sample: {0}")]
    InvalidSample(String),
    #[error("tuner used after free")]
    Freed,
}

/// Adaptive policy proposing block sizes and parameters from timing feedback.
pub trait TuningStrategy: Send {
    fn name(&self) -> &'static str;

    /// Validate configuration against `params`. Invalid tuner settings fall
    /// back to defaults and are reported, never rejected.
    fn init(&mut self, params: &CompressionParams) -> Result<Vec<ConfigWarning>, TuningError>;

    /// Block size for a chunk of `srcsize` bytes.
    fn next_blocksize(&mut self, params: &CompressionParams, srcsize: usize) -> Result<usize, TuningError>;

    /// Adjust parameters before the next block.
    fn next_cparams(&mut self, params: &mut CompressionParams) -> Result<(), TuningError>;

    /// Fold the measurement of the block just compressed.
    fn update(&mut self, sample: &BlockSample) -> Result<(), TuningError>;

    /// Release state. A second call is a no-op.
    fn free(&mut self);
}

/// Produces a fresh strategy instance per Context.
pub trait TunerFactory: Send + Sync {
    fn name(&self) -> &'static str;
    fn create(&self) -> Box<dyn TuningStrategy>;
}

/// Process-wide default strategy factory.
pub static STUNE_DEFAULTS: StuneFactory = StuneFactory;

pub fn default_tuner() -> &'static dyn TunerFactory {
    &STUNE_DEFAULTS
}

/// Exponential moving average step shared by the built-in strategies.
#[inline]
pub(crate) fn ema(prev: Option<f64>, sample: f64, alpha: f64) -> f64 {
    match prev {
        Some(p) => alpha * sample + (1.0 - alpha) * p,
        None => sample,
    }
}
