//! Error types for Exportar

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Checkpoint not found: {}", .0.display())]
    CheckpointNotFound(PathBuf),

    #[error("Checkpoint corrupt: {0}")]
    CheckpointCorrupt(String),

    #[error("Unsupported operator '{op}' in layer '{layer}'")]
    UnsupportedOperator { layer: String, op: String },

    #[error("Export failed: {0}")]
    ExportFailed(String),

    #[error("Artifact invalid: {0}")]
    ArtifactInvalid(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
