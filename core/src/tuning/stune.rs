//! tuning/stune.rs
//! Static cache-aware default tuner.
//!
//! The block size is decided once, from cache sizes, codec class and level,
//! then held for the lifetime of the tuner. Parameters are never changed;
//! timings only feed a moving average kept for diagnostics.

use tracing::debug;

use crate::constants::{L1, L2, MAX_BLOCKSIZE, MAX_STREAMS, MIN_BUFFERSIZE};
use crate::params::{CompressionParams, ConfigWarning};
use crate::planner::should_split;
use crate::tuning::{ema, BlockSample, TunerFactory, TuningError, TuningStrategy};

const EMA_ALPHA: f64 = 0.25;

/// Source-independent block size: the user's choice, else scaled from L1 by
/// codec class, level and split. Bounded by [MIN_BUFFERSIZE, MAX_BLOCKSIZE]
/// and a whole number of elements.
pub fn base_blocksize(params: &CompressionParams) -> usize {
    let ts = params.typesize.max(1);
    let high_ratio = params.codec.is_high_ratio();

    let bs = if params.blocksize > 0 {
        params.blocksize.clamp(MIN_BUFFERSIZE, MAX_BLOCKSIZE)
    } else {
        let mut bs = L1;
        if high_ratio {
            bs *= 2;
        }
        bs = match params.clevel {
            0 => bs / 4,
            1 => bs / 2,
            2 => bs,
            3 => bs * 2,
            4 | 5 => bs * 4,
            6..=8 => bs * 8,
            _ => bs * 8 * if high_ratio { 2 } else { 1 },
        };
        if should_split(params.splitmode, params.codec, ts, bs, params.header_flags()) {
            bs *= ts;
        }
        let cap = (4 * L2 * ts.min(MAX_STREAMS)).min(MAX_BLOCKSIZE);
        bs.clamp(MIN_BUFFERSIZE, cap)
    };
    round_to_elements(bs, ts)
}

/// Fit a held block size to a source of `srcsize` bytes.
///
/// Without a user block size a source smaller than L1 is one block.
pub fn fit_blocksize(held: usize, params: &CompressionParams, srcsize: usize) -> usize {
    let ts = params.typesize.max(1);
    let bs = if params.blocksize == 0 && srcsize < L1 { srcsize } else { held.min(srcsize) };
    round_to_elements(bs, ts)
}

/// Cache-aware block size for a source of `srcsize` bytes.
pub fn compute_blocksize(params: &CompressionParams, srcsize: usize) -> usize {
    fit_blocksize(base_blocksize(params), params, srcsize)
}

fn round_to_elements(bs: usize, ts: usize) -> usize {
    if bs >= ts {
        bs - bs % ts
    } else {
        bs
    }
}

#[derive(Debug, Default)]
pub struct StuneTuner {
    blocksize: Option<usize>,
    ema_ns_per_byte: Option<f64>,
    samples: u64,
    freed: bool,
}

impl StuneTuner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moving average of nanoseconds per byte over all updates.
    pub fn average_ns_per_byte(&self) -> Option<f64> {
        self.ema_ns_per_byte
    }
}

impl TuningStrategy for StuneTuner {
    fn name(&self) -> &'static str {
        "stune"
    }

    fn init(&mut self, params: &CompressionParams) -> Result<Vec<ConfigWarning>, TuningError> {
        let mut warnings = Vec::new();
        if params.blocksize > MAX_BLOCKSIZE {
            warnings.push(ConfigWarning::InvalidValue {
                field: "blocksize",
                value: params.blocksize.to_string(),
                fallback: MAX_BLOCKSIZE.to_string(),
            });
            self.blocksize = Some(MAX_BLOCKSIZE);
        }
        for w in &warnings {
            w.log();
        }
        Ok(warnings)
    }

    fn next_blocksize(&mut self, params: &CompressionParams, srcsize: usize) -> Result<usize, TuningError> {
        if self.freed {
            return Err(TuningError::Freed);
        }
        let held = match self.blocksize {
            Some(bs) => bs,
            None => {
                let bs = base_blocksize(params);
                debug!(target: "blockzip::tuning", blocksize = bs, srcsize, "stune block size decided");
                self.blocksize = Some(bs);
                bs
            }
        };
        Ok(fit_blocksize(held, params, srcsize))
    }

    fn next_cparams(&mut self, _params: &mut CompressionParams) -> Result<(), TuningError> {
        if self.freed {
            return Err(TuningError::Freed);
        }
        Ok(())
    }

    fn update(&mut self, sample: &BlockSample) -> Result<(), TuningError> {
        if self.freed {
            return Err(TuningError::Freed);
        }
        if let Some(cost) = sample.ns_per_byte() {
            self.ema_ns_per_byte = Some(ema(self.ema_ns_per_byte, cost, EMA_ALPHA));
            self.samples += 1;
        }
        Ok(())
    }

    fn free(&mut self) {
        if self.freed {
            debug!(target: "blockzip::tuning", tuner = "stune", "free called on released tuner");
            return;
        }
        debug!(target: "blockzip::tuning", tuner = "stune", samples = self.samples, "tuner released");
        self.freed = true;
        self.ema_ns_per_byte = None;
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct StuneFactory;

impl TunerFactory for StuneFactory {
    fn name(&self) -> &'static str {
        "stune"
    }

    fn create(&self) -> Box<dyn TuningStrategy> {
        Box::new(StuneTuner::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compression::CompressionCodec;

    #[test]
    fn small_sources_are_one_block() {
        let params = CompressionParams::new(CompressionCodec::Lz4, 5, 4);
        assert_eq!(compute_blocksize(&params, 1000), 1000);
    }

    #[test]
    fn held_size_ignores_the_first_source() {
        let params = CompressionParams::new(CompressionCodec::Lz4, 5, 8);
        let mut tuner = StuneTuner::new();
        tuner.init(&params).unwrap();
        assert_eq!(tuner.next_blocksize(&params, 0).unwrap(), 0);
        assert_eq!(tuner.next_blocksize(&params, 16).unwrap(), 16);
        assert_eq!(tuner.next_blocksize(&params, 8 << 20).unwrap(), base_blocksize(&params));
    }

    #[test]
    fn block_size_is_a_multiple_of_typesize() {
        let params = CompressionParams::new(CompressionCodec::Zstd, 9, 12);
        let bs = compute_blocksize(&params, 10 * 1024 * 1024);
        assert_eq!(bs % 12, 0);
        assert!(bs >= MIN_BUFFERSIZE && bs <= MAX_BLOCKSIZE);
    }
}
