//! blockzip-core
//!
//! Blocked filter-and-codec compression engine with pluggable tuning.
//! Pure Rust API; codec backends come from their crates.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod utils;

// Building blocks
pub mod compression;
pub mod filters;
pub mod headers;
pub mod params;
pub mod planner;
pub mod telemetry;
pub mod tuning;

// Sessions and containers
pub mod container;
pub mod context;

// Parallel layer
pub mod pipeline;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::compression::CompressionCodec;
    pub use crate::container::{Chunk, ChunkedContainer};
    pub use crate::context::Context;
    pub use crate::filters::FilterKind;
    pub use crate::params::{CompressionParams, ConfigWarning, DecompressionParams};
    pub use crate::pipeline::{ChunkPipeline, PipelineConfig, PipelineError, RemainderPolicy};
    pub use crate::planner::SplitMode;
    pub use crate::telemetry::TelemetrySnapshot;
    pub use crate::tuning::{default_tuner, ClimbConfig, ClimbFactory, TunerFactory, TuningStrategy, STUNE_DEFAULTS};
    pub use crate::types::{BlockzipError, Result};
}
