//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots.
//!
//! Notes:
//! - Workers keep their own counters and timers; nothing is shared while
//!   chunks are processed.
//! - Per-worker values are merged in worker-index order after the join, so a
//!   snapshot is reproducible for a given partition.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
