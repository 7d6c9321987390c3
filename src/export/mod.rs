//! Format exporter - model handle to mobile artifact
//!
//! The export pipeline runs graph trace, operator lowering, optional
//! quantization, and serialization, in that order. All stages complete in
//! memory; the artifact file is the last thing created, so any failure
//! leaves the filesystem untouched.

mod artifact;
mod lower;
mod target;
mod trace;

pub use artifact::{read_artifact, Artifact, ArtifactHeader, TensorEntry, MAGIC, VERSION};
pub use lower::{lower, LoweredOp, MobileOp};
pub use target::{derive_output_path, ExportConfig, Precision, TargetFormat};
pub use trace::{trace, TracedGraph, TracedOp, GRAPH_INPUT};

use crate::checkpoint::Model;
use crate::quant::{self, QuantMode};
use crate::Result;
use std::path::{Path, PathBuf};

/// Result of a successful export
#[derive(Debug, Clone)]
pub struct ExportReport {
    /// Path of the written artifact
    pub artifact: PathBuf,

    /// Number of lowered operations
    pub ops: usize,

    /// Number of tensors in the bundle
    pub tensors: usize,

    /// Total artifact size in bytes
    pub bytes: u64,
}

/// Export a model to a mobile artifact
///
/// Writes exactly one output file, at a path derived from the source
/// checkpoint's stem and the configured precision. An existing artifact at
/// that path is overwritten.
pub fn export_model(model: &Model, source: &Path, config: &ExportConfig) -> Result<ExportReport> {
    let traced = trace(model)?;
    let ops = lower(&traced)?;

    let mut blob: Vec<u8> = Vec::new();
    let mut tensors = Vec::with_capacity(model.parameters.len());

    for param in &model.parameters {
        let entry = match config.precision {
            Precision::Float32 => {
                let bytes: &[u8] = bytemuck::cast_slice(&param.data);
                let entry = TensorEntry {
                    name: param.name.clone(),
                    dtype: "f32".to_string(),
                    shape: param.shape.clone(),
                    offset: blob.len(),
                    len: bytes.len(),
                    scale: None,
                    zero_point: None,
                };
                blob.extend_from_slice(bytes);
                entry
            }
            Precision::Int8 => {
                let q = quant::quantize_tensor(&param.data, &param.shape, QuantMode::Symmetric, 8);
                let bytes: &[u8] = bytemuck::cast_slice(&q.data);
                let entry = TensorEntry {
                    name: param.name.clone(),
                    dtype: "i8".to_string(),
                    shape: param.shape.clone(),
                    offset: blob.len(),
                    len: bytes.len(),
                    scale: Some(q.params.scale),
                    zero_point: Some(q.params.zero_point),
                };
                blob.extend_from_slice(bytes);
                entry
            }
        };
        tensors.push(entry);
    }

    let header = ArtifactHeader {
        metadata: model.metadata.clone(),
        precision: config.precision,
        ops,
        tensors,
    };

    let out_path = derive_output_path(source, config);
    let bytes = artifact::write_artifact(&out_path, &header, &blob)?;

    Ok(ExportReport {
        artifact: out_path,
        ops: header.ops.len(),
        tensors: header.tensors.len(),
        bytes,
    })
}
