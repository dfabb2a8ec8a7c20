//! params.rs
//! Compression / decompression parameters and configuration warnings.
//!
//! Invalid values never abort: `validate` substitutes a default, logs it at
//! target `blockzip::config` and returns the warning so callers can inspect it.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::compression::CompressionCodec;
use crate::constants::{DEFAULT_CLEVEL, MAX_CLEVEL, MAX_TYPESIZE, MIN_BUFFERSIZE};
use crate::filters::FilterKind;
use crate::headers::ChunkFlags;
use crate::planner::{normalize_split_mode, SplitMode};
use crate::types::BlockzipError;

/// A configuration value that was replaced by a default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// Unrecognized split mode; `ForwardCompat` is used instead.
    SplitModeFallback { raw: u8 },
    /// A value outside its valid range.
    InvalidValue { field: &'static str, value: String, fallback: String },
}

impl ConfigWarning {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ConfigWarning::SplitModeFallback { .. })
    }

    /// Emit the warning once at target `blockzip::config`.
    pub fn log(&self) {
        match self {
            ConfigWarning::SplitModeFallback { raw } => warn!(
                target: "blockzip::config",
                raw = *raw,
                fallback = true,
                "unrecognized split mode, using forward-compatible splitting"
            ),
            ConfigWarning::InvalidValue { field, value, fallback } => warn!(
                target: "blockzip::config",
                field = *field,
                value = %value,
                fallback = %fallback,
                "invalid configuration value replaced by default"
            ),
        }
    }
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigWarning::SplitModeFallback { raw } =>
                write!(f, "unrecognized split mode {}, using forward-compat", raw),
            ConfigWarning::InvalidValue { field, value, fallback } =>
                write!(f, "invalid {}: {} (using {})", field, value, fallback),
        }
    }
}

fn invalid(field: &'static str, value: impl ToString, fallback: impl ToString) -> ConfigWarning {
    ConfigWarning::InvalidValue { field, value: value.to_string(), fallback: fallback.to_string() }
}

/// Parameters that drive one Context.
///
/// Owned by the Context; the tuner may adjust them between blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionParams {
    pub codec: CompressionCodec,
    /// 0 stores the chunk raw, 9 is maximum effort.
    pub clevel: u8,
    /// 0 lets the tuner choose.
    pub blocksize: usize,
    pub splitmode: SplitMode,
    pub filter: FilterKind,
    pub typesize: usize,
    /// Worker threads for pipelines; `None` resolves from the environment.
    pub nthreads: Option<usize>,
    /// Extended header mode; legacy mode keeps LZ4HC/Zlib split under Auto.
    pub extended_header: bool,
}

impl Default for CompressionParams {
    fn default() -> Self {
        Self {
            codec: CompressionCodec::default(),
            clevel: DEFAULT_CLEVEL,
            blocksize: 0,
            splitmode: SplitMode::default(),
            filter: FilterKind::default(),
            typesize: 8,
            nthreads: None,
            extended_header: true,
        }
    }
}

impl CompressionParams {
    pub fn new(codec: CompressionCodec, clevel: u8, typesize: usize) -> Self {
        Self { codec, clevel, typesize, ..Default::default() }
    }

    pub fn with_codec(mut self, codec: CompressionCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_clevel(mut self, clevel: u8) -> Self {
        self.clevel = clevel;
        self
    }

    pub fn with_blocksize(mut self, blocksize: usize) -> Self {
        self.blocksize = blocksize;
        self
    }

    pub fn with_splitmode(mut self, splitmode: SplitMode) -> Self {
        self.splitmode = splitmode;
        self
    }

    pub fn with_filter(mut self, filter: FilterKind) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_typesize(mut self, typesize: usize) -> Self {
        self.typesize = typesize;
        self
    }

    pub fn with_nthreads(mut self, nthreads: usize) -> Self {
        self.nthreads = Some(nthreads);
        self
    }

    pub fn with_extended_header(mut self, extended: bool) -> Self {
        self.extended_header = extended;
        self
    }

    /// Parse from JSON. Missing fields take their defaults; out-of-range values
    /// are left for `validate`.
    pub fn from_json(s: &str) -> Result<Self, BlockzipError> {
        serde_json::from_str(s).map_err(|e| BlockzipError::ConfigParse(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, BlockzipError> {
        serde_json::to_string(self).map_err(|e| BlockzipError::ConfigParse(e.to_string()))
    }

    /// Header flags implied by these parameters (before the split decision).
    pub fn header_flags(&self) -> ChunkFlags {
        if self.extended_header {
            ChunkFlags::EXTENDED_HEADER
        } else {
            ChunkFlags::empty()
        }
    }

    /// Replace invalid values with defaults, logging each substitution.
    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        if self.clevel > MAX_CLEVEL {
            warnings.push(invalid("clevel", self.clevel, DEFAULT_CLEVEL));
            self.clevel = DEFAULT_CLEVEL;
        }

        if self.typesize == 0 || self.typesize > MAX_TYPESIZE {
            warnings.push(invalid("typesize", self.typesize, 1));
            self.typesize = 1;
        }

        if self.blocksize != 0 && self.blocksize < MIN_BUFFERSIZE {
            warnings.push(invalid("blocksize", self.blocksize, MIN_BUFFERSIZE));
            self.blocksize = MIN_BUFFERSIZE;
        }

        let (mode, warning) = normalize_split_mode(self.splitmode);
        self.splitmode = mode;
        warnings.extend(warning);

        if self.nthreads == Some(0) {
            warnings.push(invalid("nthreads", 0, "auto"));
            self.nthreads = None;
        }

        for w in &warnings {
            w.log();
        }
        warnings
    }
}

/// Parameters for decompression-side pipelines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecompressionParams {
    pub nthreads: Option<usize>,
}

impl DecompressionParams {
    pub fn with_nthreads(mut self, nthreads: usize) -> Self {
        self.nthreads = Some(nthreads);
        self
    }

    pub fn from_json(s: &str) -> Result<Self, BlockzipError> {
        serde_json::from_str(s).map_err(|e| BlockzipError::ConfigParse(e.to_string()))
    }

    pub fn validate(&mut self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();
        if self.nthreads == Some(0) {
            warnings.push(invalid("nthreads", 0, "auto"));
            self.nthreads = None;
        }
        for w in &warnings {
            w.log();
        }
        warnings
    }
}
