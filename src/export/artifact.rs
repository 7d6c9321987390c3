//! Mobile tensor bundle serialization
//!
//! The `.mtb` container is a single file:
//!
//! ```text
//! magic "MTB1" | u32 LE version | u64 LE header length | header JSON | tensor blob
//! ```
//!
//! The JSON header carries model metadata, the lowered op table, and a
//! tensor index whose offsets point into the trailing blob. The whole
//! bundle is assembled in memory and written with one `fs::write`, so a
//! failed export never leaves a partial file behind.

use super::lower::LoweredOp;
use super::target::Precision;
use crate::checkpoint::ModelMetadata;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File magic for mobile tensor bundles
pub const MAGIC: [u8; 4] = *b"MTB1";

/// Current container version
pub const VERSION: u32 = 1;

/// Fixed prefix: magic + version + header length
const PREFIX_LEN: usize = 4 + 4 + 8;

/// Entry in the artifact tensor index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TensorEntry {
    /// Tensor name
    pub name: String,

    /// Element type ("f32" or "i8")
    pub dtype: String,

    /// Tensor shape
    pub shape: Vec<usize>,

    /// Byte offset into the blob
    pub offset: usize,

    /// Byte length in the blob
    pub len: usize,

    /// Quantization scale (int8 tensors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<f32>,

    /// Quantization zero-point (int8 tensors only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zero_point: Option<i32>,
}

/// Artifact header: everything except the tensor blob
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Model metadata carried over from the checkpoint
    pub metadata: ModelMetadata,

    /// Weight precision of the bundle
    pub precision: Precision,

    /// Lowered operations in execution order
    pub ops: Vec<LoweredOp>,

    /// Tensor index
    pub tensors: Vec<TensorEntry>,
}

/// A decoded artifact
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Decoded header
    pub header: ArtifactHeader,

    /// Raw tensor blob
    pub blob: Vec<u8>,
}

impl Artifact {
    /// Get the raw bytes of a tensor by name
    pub fn tensor_bytes(&self, name: &str) -> Option<&[u8]> {
        let entry = self.header.tensors.iter().find(|t| t.name == name)?;
        let end = entry.offset.checked_add(entry.len)?;
        self.blob.get(entry.offset..end)
    }
}

/// Encode an artifact to its on-disk byte layout
pub fn encode_artifact(header: &ArtifactHeader, blob: &[u8]) -> Result<Vec<u8>> {
    let mut header_json = serde_json::to_vec(header)
        .map_err(|e| Error::ExportFailed(format!("header serialization failed: {e}")))?;

    // Pad the header with spaces so the blob starts 8-byte aligned,
    // same trick the safetensors format uses.
    while header_json.len() % 8 != 0 {
        header_json.push(b' ');
    }

    let mut out = Vec::with_capacity(PREFIX_LEN + header_json.len() + blob.len());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.extend_from_slice(&(header_json.len() as u64).to_le_bytes());
    out.extend_from_slice(&header_json);
    out.extend_from_slice(blob);
    Ok(out)
}

/// Write an artifact bundle to disk, returning its total size in bytes
pub fn write_artifact(path: &Path, header: &ArtifactHeader, blob: &[u8]) -> Result<u64> {
    let bytes = encode_artifact(header, blob)?;
    std::fs::write(path, &bytes)?;
    Ok(bytes.len() as u64)
}

/// Read an artifact bundle from disk
pub fn read_artifact(path: impl AsRef<Path>) -> Result<Artifact> {
    let data = std::fs::read(path.as_ref())?;

    if data.len() < PREFIX_LEN {
        return Err(Error::ArtifactInvalid("file too short".to_string()));
    }
    if data[..4] != MAGIC {
        return Err(Error::ArtifactInvalid("bad magic".to_string()));
    }

    let version = u32::from_le_bytes(data[4..8].try_into().unwrap());
    if version != VERSION {
        return Err(Error::ArtifactInvalid(format!(
            "unsupported container version {version}"
        )));
    }

    let header_len = u64::from_le_bytes(data[8..16].try_into().unwrap()) as usize;
    let blob_start = PREFIX_LEN
        .checked_add(header_len)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| Error::ArtifactInvalid("header length out of bounds".to_string()))?;

    let header: ArtifactHeader = serde_json::from_slice(&data[PREFIX_LEN..blob_start])
        .map_err(|e| Error::ArtifactInvalid(format!("header JSON invalid: {e}")))?;

    let blob = data[blob_start..].to_vec();

    for entry in &header.tensors {
        let in_bounds = entry
            .offset
            .checked_add(entry.len)
            .is_some_and(|end| end <= blob.len());
        if !in_bounds {
            return Err(Error::ArtifactInvalid(format!(
                "tensor {} extends past end of blob",
                entry.name
            )));
        }
    }

    Ok(Artifact { header, blob })
}
