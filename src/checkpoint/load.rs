//! Checkpoint loading functionality

use super::format::CheckpointFormat;
use super::model::{LayerSpec, Model, ModelMetadata, ModelState, Parameter};
use crate::{Error, Result};
use std::path::Path;

/// Load a model checkpoint from a file
///
/// The format is detected from the file extension. A missing file maps to
/// [`Error::CheckpointNotFound`]; anything that does not deserialize into
/// the checkpoint schema maps to [`Error::CheckpointCorrupt`]. Errors are
/// propagated, never recovered locally.
///
/// # Example
///
/// ```no_run
/// use exportar::checkpoint::load_checkpoint;
///
/// let model = load_checkpoint("best.safetensors").unwrap();
/// println!("Loaded model: {}", model.metadata.name);
/// ```
pub fn load_checkpoint(path: impl AsRef<Path>) -> Result<Model> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::CheckpointNotFound(path.to_path_buf()));
    }

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .ok_or_else(|| Error::CheckpointCorrupt("checkpoint has no file extension".to_string()))?;

    let format = CheckpointFormat::from_extension(ext).ok_or_else(|| {
        Error::CheckpointCorrupt(format!("unrecognized checkpoint extension: {ext}"))
    })?;

    // Handle SafeTensors separately (binary format)
    if format == CheckpointFormat::SafeTensors {
        return load_safetensors(path);
    }

    let content = std::fs::read_to_string(path)?;

    let state: ModelState = match format {
        CheckpointFormat::Json => serde_json::from_str(&content)
            .map_err(|e| Error::CheckpointCorrupt(format!("JSON deserialization failed: {e}")))?,
        CheckpointFormat::Yaml => serde_yaml::from_str(&content)
            .map_err(|e| Error::CheckpointCorrupt(format!("YAML deserialization failed: {e}")))?,
        CheckpointFormat::SafeTensors => unreachable!(), // Handled above
    };

    Model::from_state(state)
}

/// Load a checkpoint from SafeTensors format (HuggingFace compatible)
///
/// The graph rides in the SafeTensors header metadata as a JSON string
/// under the "graph" key.
fn load_safetensors(path: &Path) -> Result<Model> {
    let data = std::fs::read(path)?;

    let (_, st_metadata) = safetensors::SafeTensors::read_metadata(&data)
        .map_err(|e| Error::CheckpointCorrupt(format!("SafeTensors parsing failed: {e}")))?;

    let custom_meta = st_metadata.metadata();
    let name = custom_meta
        .as_ref()
        .and_then(|m| m.get("name").cloned())
        .unwrap_or_else(|| "unknown".to_string());
    let architecture = custom_meta
        .as_ref()
        .and_then(|m| m.get("architecture").cloned())
        .unwrap_or_else(|| "unknown".to_string());

    let mut metadata = ModelMetadata::new(name, architecture);
    if let Some(version) = custom_meta.as_ref().and_then(|m| m.get("version")) {
        metadata.version = version.clone();
    }

    let graph: Vec<LayerSpec> = match custom_meta.as_ref().and_then(|m| m.get("graph")) {
        Some(json) => serde_json::from_str(json)
            .map_err(|e| Error::CheckpointCorrupt(format!("graph metadata invalid: {e}")))?,
        None => Vec::new(),
    };

    let safetensors = safetensors::SafeTensors::deserialize(&data)
        .map_err(|e| Error::CheckpointCorrupt(format!("SafeTensors parsing failed: {e}")))?;

    let mut parameters = Vec::new();
    for name in safetensors.names() {
        let view = safetensors
            .tensor(name)
            .map_err(|e| Error::CheckpointCorrupt(format!("tensor {name} unreadable: {e}")))?;

        if view.dtype() != safetensors::tensor::Dtype::F32 {
            return Err(Error::CheckpointCorrupt(format!(
                "tensor {name} has dtype {:?}, expected F32",
                view.dtype()
            )));
        }

        let values: &[f32] = bytemuck::cast_slice(view.data());
        parameters.push(Parameter::new(
            name.to_string(),
            view.shape().to_vec(),
            values.to_vec(),
        ));
    }

    // SafeTensors iteration order is not stable; keep the table deterministic.
    parameters.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Model::new(metadata, graph, parameters))
}
