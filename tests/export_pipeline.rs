//! Integration tests for the load-then-export pipeline

use exportar::checkpoint::{
    save_checkpoint, CheckpointFormat, LayerSpec, Model, ModelMetadata, Parameter, SaveConfig,
};
use exportar::export::{read_artifact, MobileOp};
use exportar::{run_export, Error, ExportConfig, Precision};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn layer(name: &str, op: &str, inputs: &[&str], params: &[&str]) -> LayerSpec {
    LayerSpec {
        name: name.to_string(),
        op: op.to_string(),
        inputs: inputs.iter().map(|s| s.to_string()).collect(),
        params: params.iter().map(|s| s.to_string()).collect(),
        attrs: HashMap::new(),
    }
}

/// A small detector-shaped model: conv backbone, upsample neck, detect head
///
/// Weights are drawn from a fixed seed so repeated calls build identical
/// models.
fn detector_model() -> Model {
    let mut rng = StdRng::seed_from_u64(42);
    let mut weights = |n: usize| -> Vec<f32> {
        (0..n).map(|_| rng.gen_range(-1.0f32..1.0)).collect()
    };

    let params = vec![
        Parameter::new("backbone.conv1.weight", vec![4, 2], weights(8)),
        Parameter::new("backbone.conv1.bias", vec![4], weights(4)),
        Parameter::new("head.weight", vec![2, 4], weights(8)),
    ];
    let graph = vec![
        layer(
            "conv1",
            "conv2d",
            &["input"],
            &["backbone.conv1.weight", "backbone.conv1.bias"],
        ),
        layer("act1", "relu", &["conv1"], &[]),
        layer("pool1", "max_pool2d", &["act1"], &[]),
        layer("up1", "upsample", &["pool1"], &[]),
        layer("cat1", "concat", &["act1", "up1"], &[]),
        layer("head", "fully_connected", &["cat1"], &["head.weight"]),
        layer("scores", "sigmoid", &["head"], &[]),
    ];
    Model::new(ModelMetadata::new("best", "detector"), graph, params)
}

fn write_checkpoint(dir: &Path, format: CheckpointFormat) -> PathBuf {
    let path = dir.join(format!("best.{}", format.extension()));
    save_checkpoint(&detector_model(), &path, &SaveConfig::new(format)).unwrap();
    path
}

fn non_checkpoint_files(dir: &Path, checkpoint: &Path) -> Vec<PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p != checkpoint)
        .collect()
}

#[test]
fn valid_checkpoint_produces_exactly_one_artifact() {
    let dir = TempDir::new().unwrap();
    let checkpoint = write_checkpoint(dir.path(), CheckpointFormat::Json);

    let report = run_export(&checkpoint, &ExportConfig::default()).unwrap();

    let produced = non_checkpoint_files(dir.path(), &checkpoint);
    assert_eq!(produced, vec![report.artifact.clone()]);
    assert_eq!(report.artifact, dir.path().join("best_float32.mtb"));
}

#[test]
fn missing_checkpoint_fails_before_any_output() {
    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("best.json");

    let result = run_export(&checkpoint, &ExportConfig::default());
    assert!(matches!(result, Err(Error::CheckpointNotFound(_))));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn corrupt_checkpoint_fails_before_any_output() {
    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("best.json");
    std::fs::write(&checkpoint, b"{ not a checkpoint }").unwrap();

    let result = run_export(&checkpoint, &ExportConfig::default());
    assert!(matches!(result, Err(Error::CheckpointCorrupt(_))));
    assert!(non_checkpoint_files(dir.path(), &checkpoint).is_empty());
}

#[test]
fn unsupported_operator_fails_before_any_output() {
    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("best.json");

    let mut model = detector_model();
    model.graph.push(layer("rnn", "gru", &["scores"], &[]));
    save_checkpoint(
        &model,
        &checkpoint,
        &SaveConfig::new(CheckpointFormat::Json),
    )
    .unwrap();

    let result = run_export(&checkpoint, &ExportConfig::default());
    match result {
        Err(Error::UnsupportedOperator { layer, op }) => {
            assert_eq!(layer, "rnn");
            assert_eq!(op, "gru");
        }
        other => panic!("expected UnsupportedOperator, got {other:?}"),
    }
    assert!(non_checkpoint_files(dir.path(), &checkpoint).is_empty());
}

#[test]
fn rerun_overwrites_artifact_with_no_residual_state() {
    let dir = TempDir::new().unwrap();
    let checkpoint = write_checkpoint(dir.path(), CheckpointFormat::Json);

    let first = run_export(&checkpoint, &ExportConfig::default()).unwrap();
    let first_bytes = std::fs::read(&first.artifact).unwrap();

    let second = run_export(&checkpoint, &ExportConfig::default()).unwrap();
    let second_bytes = std::fs::read(&second.artifact).unwrap();

    assert_eq!(first.artifact, second.artifact);
    assert_eq!(first_bytes, second_bytes);
    assert_eq!(non_checkpoint_files(dir.path(), &checkpoint).len(), 1);
}

#[test]
fn export_from_yaml_checkpoint() {
    let dir = TempDir::new().unwrap();
    let checkpoint = write_checkpoint(dir.path(), CheckpointFormat::Yaml);

    let report = run_export(&checkpoint, &ExportConfig::default()).unwrap();
    assert_eq!(report.artifact, dir.path().join("best_float32.mtb"));
    assert_eq!(report.ops, 7);
}

#[test]
fn export_from_safetensors_checkpoint() {
    let dir = TempDir::new().unwrap();
    let checkpoint = write_checkpoint(dir.path(), CheckpointFormat::SafeTensors);

    let report = run_export(&checkpoint, &ExportConfig::default()).unwrap();
    let artifact = read_artifact(&report.artifact).unwrap();

    assert_eq!(artifact.header.metadata.name, "best");
    assert_eq!(artifact.header.ops.len(), 7);
    assert_eq!(artifact.header.ops[0].kind, MobileOp::Conv2d);
    assert_eq!(artifact.header.tensors.len(), 3);
}

#[test]
fn float32_artifact_preserves_weights() {
    let dir = TempDir::new().unwrap();
    let checkpoint = write_checkpoint(dir.path(), CheckpointFormat::Json);

    let report = run_export(&checkpoint, &ExportConfig::default()).unwrap();
    let artifact = read_artifact(&report.artifact).unwrap();

    let model = detector_model();
    for param in &model.parameters {
        let bytes = artifact.tensor_bytes(&param.name).unwrap();
        let values: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(values, param.data.as_slice());
    }
}

#[test]
fn int8_export_quantizes_all_tensors() {
    let dir = TempDir::new().unwrap();
    let checkpoint = write_checkpoint(dir.path(), CheckpointFormat::Json);
    let config = ExportConfig::default().with_precision(Precision::Int8);

    let report = run_export(&checkpoint, &config).unwrap();
    assert_eq!(report.artifact, dir.path().join("best_int8.mtb"));

    let artifact = read_artifact(&report.artifact).unwrap();
    assert_eq!(artifact.header.precision, Precision::Int8);
    for entry in &artifact.header.tensors {
        assert_eq!(entry.dtype, "i8");
        assert!(entry.scale.unwrap() > 0.0);
        assert_eq!(entry.zero_point, Some(0));
        assert_eq!(entry.len, entry.shape.iter().product::<usize>());
    }
}

#[test]
fn int8_weights_dequantize_close_to_originals() {
    let dir = TempDir::new().unwrap();
    let checkpoint = write_checkpoint(dir.path(), CheckpointFormat::Json);
    let config = ExportConfig::default().with_precision(Precision::Int8);

    let report = run_export(&checkpoint, &config).unwrap();
    let artifact = read_artifact(&report.artifact).unwrap();

    let model = detector_model();
    for param in &model.parameters {
        let entry = artifact
            .header
            .tensors
            .iter()
            .find(|t| t.name == param.name)
            .unwrap();
        let scale = entry.scale.unwrap();
        let quantized: &[i8] = bytemuck::cast_slice(artifact.tensor_bytes(&param.name).unwrap());

        for (orig, &q) in param.data.iter().zip(quantized) {
            let recovered = q as f32 * scale;
            assert!(
                (orig - recovered).abs() <= scale / 2.0 + 1e-6,
                "{}: {orig} vs {recovered}",
                param.name
            );
        }
    }
}

#[test]
fn output_dir_is_honored() {
    let dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let checkpoint = write_checkpoint(dir.path(), CheckpointFormat::Json);

    let config = ExportConfig::default().with_output_dir(out.path());
    let report = run_export(&checkpoint, &config).unwrap();

    assert_eq!(report.artifact, out.path().join("best_float32.mtb"));
    assert!(report.artifact.exists());
    assert!(non_checkpoint_files(dir.path(), &checkpoint).is_empty());
}

#[test]
fn graphless_checkpoint_fails_export() {
    let dir = TempDir::new().unwrap();
    let checkpoint = dir.path().join("bare.json");

    let model = Model::new(
        ModelMetadata::new("bare", "unknown"),
        vec![],
        vec![Parameter::new("w", vec![1], vec![1.0])],
    );
    save_checkpoint(
        &model,
        &checkpoint,
        &SaveConfig::new(CheckpointFormat::Json),
    )
    .unwrap();

    let result = run_export(&checkpoint, &ExportConfig::default());
    assert!(matches!(result, Err(Error::ExportFailed(_))));
    assert!(non_checkpoint_files(dir.path(), &checkpoint).is_empty());
}
