//! The linear load-then-export sequence
//!
//! Loader and exporter run once each, synchronously. Errors from either
//! stage propagate unchanged; there is no retry or recovery.

use crate::checkpoint::load_checkpoint;
use crate::export::{export_model, ExportConfig, ExportReport};
use crate::Result;
use std::path::Path;

/// Load a checkpoint and export it to a mobile artifact
///
/// # Example
///
/// ```no_run
/// use exportar::{run_export, ExportConfig};
///
/// let report = run_export("best.safetensors", &ExportConfig::default()).unwrap();
/// println!("Export complete: {}", report.artifact.display());
/// ```
pub fn run_export(checkpoint: impl AsRef<Path>, config: &ExportConfig) -> Result<ExportReport> {
    let checkpoint = checkpoint.as_ref();
    let model = load_checkpoint(checkpoint)?;
    export_model(&model, checkpoint, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checkpoint::{
        save_checkpoint, CheckpointFormat, LayerSpec, Model, ModelMetadata, Parameter, SaveConfig,
    };
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn write_sample_checkpoint(dir: &Path) -> std::path::PathBuf {
        let params = vec![Parameter::new("head.weight", vec![2], vec![0.3, -0.7])];
        let graph = vec![LayerSpec {
            name: "head".to_string(),
            op: "fully_connected".to_string(),
            inputs: vec!["input".to_string()],
            params: vec!["head.weight".to_string()],
            attrs: HashMap::new(),
        }];
        let model = Model::new(ModelMetadata::new("pipeline-test", "classifier"), graph, params);

        let path = dir.join("best.json");
        save_checkpoint(&model, &path, &SaveConfig::new(CheckpointFormat::Json)).unwrap();
        path
    }

    #[test]
    fn test_run_export_end_to_end() {
        let dir = TempDir::new().unwrap();
        let checkpoint = write_sample_checkpoint(dir.path());

        let report = run_export(&checkpoint, &ExportConfig::default()).unwrap();
        assert_eq!(report.artifact, dir.path().join("best_float32.mtb"));
        assert!(report.artifact.exists());
    }

    #[test]
    fn test_run_export_missing_checkpoint() {
        let dir = TempDir::new().unwrap();
        let result = run_export(dir.path().join("absent.json"), &ExportConfig::default());
        assert!(matches!(result, Err(crate::Error::CheckpointNotFound(_))));
    }

    #[test]
    fn test_run_export_is_repeatable() {
        let dir = TempDir::new().unwrap();
        let checkpoint = write_sample_checkpoint(dir.path());

        run_export(&checkpoint, &ExportConfig::default()).unwrap();
        let report = run_export(&checkpoint, &ExportConfig::default()).unwrap();
        assert!(report.artifact.exists());
    }
}
