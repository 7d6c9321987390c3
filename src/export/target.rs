//! Target format and export configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Target format for export
///
/// A fixed token selecting the destination runtime. Only the mobile tensor
/// bundle is currently supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TargetFormat {
    /// Mobile tensor bundle (`.mtb`)
    #[default]
    Mobile,
}

impl TargetFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &str {
        match self {
            TargetFormat::Mobile => "mtb",
        }
    }
}

/// Numeric precision of the exported artifact
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum Precision {
    /// Full-precision f32 weights
    #[default]
    Float32,
    /// Per-tensor symmetric int8 weights
    Int8,
}

impl Precision {
    /// Suffix appended to the artifact file stem
    pub fn suffix(&self) -> &str {
        match self {
            Precision::Float32 => "float32",
            Precision::Int8 => "int8",
        }
    }
}

/// Configuration for exporting a model
#[derive(Debug, Clone, Default)]
pub struct ExportConfig {
    /// Target format
    pub target: TargetFormat,

    /// Weight precision
    pub precision: Precision,

    /// Output directory; defaults to the checkpoint's directory
    pub output_dir: Option<PathBuf>,
}

impl ExportConfig {
    /// Create new export config with target format
    pub fn new(target: TargetFormat) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Set weight precision
    pub fn with_precision(mut self, precision: Precision) -> Self {
        self.precision = precision;
        self
    }

    /// Set output directory
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }
}

/// Derive the artifact path from the source checkpoint and config
///
/// `best.safetensors` exported at float32 becomes `best_float32.mtb`, next
/// to the checkpoint unless an output directory is set.
pub fn derive_output_path(source: &Path, config: &ExportConfig) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("model");

    let file = format!(
        "{stem}_{}.{}",
        config.precision.suffix(),
        config.target.extension()
    );

    match &config.output_dir {
        Some(dir) => dir.join(file),
        None => source.with_file_name(file),
    }
}
