//! tuning/climb.rs
//! Hill-climbing tuner.
//!
//! Starts from the cache-aware size of `stune` and doubles the block size
//! while the moving average of time-per-byte keeps improving by more than
//! `tolerance`. Only samples taken at the size under trial are judged, once
//! per trial, so a proposal is measured before it is accepted or frozen.
//! Optionally lowers the compression level when throughput drops below a
//! floor.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::constants::MAX_BLOCKSIZE;
use crate::params::{CompressionParams, ConfigWarning};
use crate::tuning::stune::{base_blocksize, fit_blocksize};
use crate::tuning::{ema, BlockSample, TunerFactory, TuningError, TuningStrategy};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimbConfig {
    /// Relative improvement required to keep growing, in (0, 1).
    pub tolerance: f64,
    /// EMA smoothing factor, in (0, 1].
    pub alpha: f64,
    /// Lower clevel by one when throughput (bytes/s) falls below this.
    pub min_throughput: Option<f64>,
    /// Recent samples kept for inspection.
    pub max_history: usize,
}

impl Default for ClimbConfig {
    fn default() -> Self {
        Self { tolerance: 0.05, alpha: 0.5, min_throughput: None, max_history: 64 }
    }
}

impl ClimbConfig {
    fn validate(&mut self) -> Vec<ConfigWarning> {
        let defaults = ClimbConfig::default();
        let mut warnings = Vec::new();
        if !(self.tolerance > 0.0 && self.tolerance < 1.0) {
            warnings.push(ConfigWarning::InvalidValue {
                field: "climb.tolerance",
                value: self.tolerance.to_string(),
                fallback: defaults.tolerance.to_string(),
            });
            self.tolerance = defaults.tolerance;
        }
        if !(self.alpha > 0.0 && self.alpha <= 1.0) {
            warnings.push(ConfigWarning::InvalidValue {
                field: "climb.alpha",
                value: self.alpha.to_string(),
                fallback: defaults.alpha.to_string(),
            });
            self.alpha = defaults.alpha;
        }
        if let Some(floor) = self.min_throughput {
            if !(floor.is_finite() && floor > 0.0) {
                warnings.push(ConfigWarning::InvalidValue {
                    field: "climb.min_throughput",
                    value: floor.to_string(),
                    fallback: "none".into(),
                });
                self.min_throughput = None;
            }
        }
        warnings
    }
}

#[derive(Debug)]
pub struct ClimbTuner {
    config: ClimbConfig,
    blocksize: Option<usize>,
    /// The current proposal has been judged.
    judged: bool,
    best: Option<f64>,
    ema_cost: Option<f64>,
    last_throughput: Option<f64>,
    frozen: bool,
    history: VecDeque<f64>,
    freed: bool,
}

impl ClimbTuner {
    pub fn new(config: ClimbConfig) -> Self {
        Self {
            config,
            blocksize: None,
            judged: false,
            best: None,
            ema_cost: None,
            last_throughput: None,
            frozen: false,
            history: VecDeque::new(),
            freed: false,
        }
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Current unclamped block size proposal.
    pub fn current_blocksize(&self) -> Option<usize> {
        self.blocksize
    }

    /// Recent time-per-byte samples, oldest first.
    pub fn history(&self) -> &VecDeque<f64> {
        &self.history
    }

    fn record(&mut self, cost: f64) -> Result<(), TuningError> {
        if self.config.max_history == 0 {
            return Ok(());
        }
        if self.history.len() >= self.config.max_history {
            self.history.pop_front();
        }
        self.history
            .try_reserve(1)
            .map_err(|_| TuningError::Allocation { bytes: std::mem::size_of::<f64>() })?;
        self.history.push_back(cost);
        Ok(())
    }

    fn grow(&mut self) {
        if let Some(bs) = self.blocksize {
            let next = bs.saturating_mul(2);
            if next > MAX_BLOCKSIZE {
                self.frozen = true;
                debug!(target: "blockzip::tuning", blocksize = bs, "climb reached max block size");
            } else {
                self.blocksize = Some(next);
                self.judged = false;
            }
        }
    }
}

impl TuningStrategy for ClimbTuner {
    fn name(&self) -> &'static str {
        "climb"
    }

    fn init(&mut self, _params: &CompressionParams) -> Result<Vec<ConfigWarning>, TuningError> {
        let warnings = self.config.validate();
        for w in &warnings {
            w.log();
        }
        self.history
            .try_reserve(self.config.max_history)
            .map_err(|_| TuningError::Allocation {
                bytes: self.config.max_history * std::mem::size_of::<f64>(),
            })?;
        Ok(warnings)
    }

    fn next_blocksize(&mut self, params: &CompressionParams, srcsize: usize) -> Result<usize, TuningError> {
        if self.freed {
            return Err(TuningError::Freed);
        }
        let proposal = match self.blocksize {
            Some(bs) => bs,
            None => {
                let bs = base_blocksize(params);
                self.blocksize = Some(bs);
                bs
            }
        };
        Ok(fit_blocksize(proposal, params, srcsize))
    }

    fn next_cparams(&mut self, params: &mut CompressionParams) -> Result<(), TuningError> {
        if self.freed {
            return Err(TuningError::Freed);
        }
        if let (Some(floor), Some(measured)) = (self.config.min_throughput, self.last_throughput) {
            if measured < floor && params.clevel > 1 {
                params.clevel -= 1;
                debug!(
                    target: "blockzip::tuning",
                    clevel = params.clevel,
                    measured,
                    floor,
                    "throughput below floor, lowering clevel"
                );
            }
        }
        Ok(())
    }

    fn update(&mut self, sample: &BlockSample) -> Result<(), TuningError> {
        if self.freed {
            return Err(TuningError::Freed);
        }
        let Some(cost) = sample.ns_per_byte() else {
            return Ok(());
        };
        if !cost.is_finite() {
            return Err(TuningError::InvalidSample(format!("non-finite cost {}", cost)));
        }

        self.record(cost)?;
        self.last_throughput = sample.throughput();

        // blocks of an earlier size, short tails and small sources say
        // nothing about the proposal
        if self.frozen || self.judged || self.blocksize != Some(sample.nbytes) {
            return Ok(());
        }
        self.judged = true;
        let smoothed = ema(self.ema_cost, cost, self.config.alpha);
        self.ema_cost = Some(smoothed);

        match self.best {
            None => {
                self.best = Some(smoothed);
                self.grow();
            }
            Some(best) if smoothed < best * (1.0 - self.config.tolerance) => {
                self.best = Some(smoothed);
                self.grow();
            }
            Some(_) => {
                self.frozen = true;
                debug!(
                    target: "blockzip::tuning",
                    blocksize = ?self.blocksize,
                    ns_per_byte = smoothed,
                    "climb converged"
                );
            }
        }
        Ok(())
    }

    fn free(&mut self) {
        if self.freed {
            debug!(target: "blockzip::tuning", tuner = "climb", "free called on released tuner");
            return;
        }
        self.freed = true;
        self.history = VecDeque::new();
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClimbFactory {
    pub config: ClimbConfig,
}

impl ClimbFactory {
    pub fn new(config: ClimbConfig) -> Self {
        Self { config }
    }
}

impl TunerFactory for ClimbFactory {
    fn name(&self) -> &'static str {
        "climb"
    }

    fn create(&self) -> Box<dyn TuningStrategy> {
        Box::new(ClimbTuner::new(self.config.clone()))
    }
}
