//! Checkpoint saving functionality

use super::format::{CheckpointFormat, SaveConfig};
use super::model::Model;
use crate::{Error, Result};
use safetensors::tensor::{Dtype, TensorView};
use std::collections::HashMap;
use std::path::Path;

/// Save a model checkpoint to a file
///
/// # Example
///
/// ```no_run
/// use exportar::checkpoint::{save_checkpoint, CheckpointFormat, Model, ModelMetadata, SaveConfig};
///
/// let model = Model::new(ModelMetadata::new("my-model", "detector"), vec![], vec![]);
/// let config = SaveConfig::new(CheckpointFormat::Json);
///
/// save_checkpoint(&model, "model.json", &config).unwrap();
/// ```
pub fn save_checkpoint(model: &Model, path: impl AsRef<Path>, config: &SaveConfig) -> Result<()> {
    let path = path.as_ref();

    match config.format {
        CheckpointFormat::SafeTensors => save_safetensors(model, path),
        CheckpointFormat::Json => {
            let state = model.to_state();
            let data = if config.pretty {
                serde_json::to_string_pretty(&state)
            } else {
                serde_json::to_string(&state)
            }
            .map_err(|e| Error::CheckpointCorrupt(format!("JSON serialization failed: {e}")))?;
            std::fs::write(path, data)?;
            Ok(())
        }
        CheckpointFormat::Yaml => {
            let state = model.to_state();
            let data = serde_yaml::to_string(&state)
                .map_err(|e| Error::CheckpointCorrupt(format!("YAML serialization failed: {e}")))?;
            std::fs::write(path, data)?;
            Ok(())
        }
    }
}

/// Save checkpoint in SafeTensors format (HuggingFace compatible)
fn save_safetensors(model: &Model, path: &Path) -> Result<()> {
    // Collect tensor data with proper lifetime management
    let tensor_data: Vec<(String, Vec<u8>, Vec<usize>)> = model
        .parameters
        .iter()
        .map(|p| {
            let bytes: Vec<u8> = bytemuck::cast_slice(&p.data).to_vec();
            (p.name.clone(), bytes, p.shape.clone())
        })
        .collect();

    let views: Vec<(&str, TensorView<'_>)> = tensor_data
        .iter()
        .map(|(name, bytes, shape)| {
            let view = TensorView::new(Dtype::F32, shape.clone(), bytes).map_err(|e| {
                Error::CheckpointCorrupt(format!("tensor {name} not viewable: {e}"))
            })?;
            Ok((name.as_str(), view))
        })
        .collect::<Result<_>>()?;

    let graph_json = serde_json::to_string(&model.graph)
        .map_err(|e| Error::CheckpointCorrupt(format!("graph serialization failed: {e}")))?;

    let mut metadata = HashMap::new();
    metadata.insert("name".to_string(), model.metadata.name.clone());
    metadata.insert(
        "architecture".to_string(),
        model.metadata.architecture.clone(),
    );
    metadata.insert("version".to_string(), model.metadata.version.clone());
    metadata.insert("graph".to_string(), graph_json);

    let bytes = safetensors::serialize(views, &Some(metadata)).map_err(|e| {
        Error::CheckpointCorrupt(format!("SafeTensors serialization failed: {e}"))
    })?;

    std::fs::write(path, bytes)?;
    Ok(())
}
