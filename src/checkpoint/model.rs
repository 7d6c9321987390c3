//! Model handle and its serializable state

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Model metadata carried through loading and export
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Model architecture type (e.g., "detector", "classifier")
    pub architecture: String,

    /// Model version
    pub version: String,

    /// Custom metadata fields
    #[serde(default)]
    pub custom: HashMap<String, serde_json::Value>,
}

impl ModelMetadata {
    /// Create new metadata with minimal fields
    pub fn new(name: impl Into<String>, architecture: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            architecture: architecture.into(),
            version: "0.1.0".to_string(),
            custom: HashMap::new(),
        }
    }

    /// Add custom metadata field
    pub fn with_custom(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.custom.insert(key.into(), value);
        self
    }
}

/// One layer of the model graph
///
/// Layers are stored in execution order. `inputs` name either the graph
/// input ("input") or earlier layers; `params` name entries in the model's
/// parameter table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Layer name, unique within the graph
    pub name: String,

    /// Operator name (e.g., "conv2d", "relu")
    pub op: String,

    /// Names of input activations
    #[serde(default)]
    pub inputs: Vec<String>,

    /// Names of parameters consumed by this layer
    #[serde(default)]
    pub params: Vec<String>,

    /// Operator attributes (stride, padding, axis, ...)
    #[serde(default)]
    pub attrs: HashMap<String, serde_json::Value>,
}

/// A named weight tensor
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    /// Parameter name (e.g., "backbone.conv1.weight")
    pub name: String,

    /// Tensor shape
    pub shape: Vec<usize>,

    /// Flat f32 values, row-major
    pub data: Vec<f32>,
}

impl Parameter {
    /// Create a new parameter, flat shape
    pub fn new(name: impl Into<String>, shape: Vec<usize>, data: Vec<f32>) -> Self {
        Self {
            name: name.into(),
            shape,
            data,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the parameter holds no values
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Shape/name record in the serialized parameter table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name
    pub name: String,

    /// Parameter shape
    pub shape: Vec<usize>,
}

/// Serializable checkpoint state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelState {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Graph layers in execution order
    #[serde(default)]
    pub graph: Vec<LayerSpec>,

    /// Parameter table
    pub parameters: Vec<ParameterInfo>,

    /// Flattened parameter data, concatenated in table order
    pub data: Vec<f32>,
}

/// In-memory model handle produced by the checkpoint loader
#[derive(Debug, Clone)]
pub struct Model {
    /// Model metadata
    pub metadata: ModelMetadata,

    /// Graph layers in execution order
    pub graph: Vec<LayerSpec>,

    /// Model parameters
    pub parameters: Vec<Parameter>,
}

impl Model {
    /// Create a new model handle
    pub fn new(
        metadata: ModelMetadata,
        graph: Vec<LayerSpec>,
        parameters: Vec<Parameter>,
    ) -> Self {
        Self {
            metadata,
            graph,
            parameters,
        }
    }

    /// Get parameter by name
    pub fn get_parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Convert model to serializable state
    pub fn to_state(&self) -> ModelState {
        let mut data = Vec::new();
        let parameters: Vec<ParameterInfo> = self
            .parameters
            .iter()
            .map(|p| {
                data.extend_from_slice(&p.data);
                ParameterInfo {
                    name: p.name.clone(),
                    shape: p.shape.clone(),
                }
            })
            .collect();

        ModelState {
            metadata: self.metadata.clone(),
            graph: self.graph.clone(),
            parameters,
            data,
        }
    }

    /// Create model from serializable state
    ///
    /// Validates that the parameter table is consistent with the flattened
    /// data block; a mismatch means the checkpoint does not match the
    /// expected schema.
    pub fn from_state(state: ModelState) -> Result<Self> {
        let expected: usize = state
            .parameters
            .iter()
            .map(|p| p.shape.iter().product::<usize>())
            .sum();

        if expected != state.data.len() {
            return Err(Error::CheckpointCorrupt(format!(
                "parameter table declares {expected} values but data block holds {}",
                state.data.len()
            )));
        }

        let mut offset = 0;
        let parameters: Vec<Parameter> = state
            .parameters
            .into_iter()
            .map(|info| {
                let size: usize = info.shape.iter().product();
                let data = state.data[offset..offset + size].to_vec();
                offset += size;
                Parameter::new(info.name, info.shape, data)
            })
            .collect();

        Ok(Self {
            metadata: state.metadata,
            graph: state.graph,
            parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model() -> Model {
        let params = vec![
            Parameter::new("conv.weight", vec![2, 2], vec![1.0, 2.0, 3.0, 4.0]),
            Parameter::new("conv.bias", vec![2], vec![0.1, 0.2]),
        ];
        let graph = vec![LayerSpec {
            name: "conv".to_string(),
            op: "conv2d".to_string(),
            inputs: vec!["input".to_string()],
            params: vec!["conv.weight".to_string(), "conv.bias".to_string()],
            attrs: HashMap::new(),
        }];
        Model::new(ModelMetadata::new("test", "detector"), graph, params)
    }

    #[test]
    fn test_metadata_creation() {
        let meta = ModelMetadata::new("best", "detector");
        assert_eq!(meta.name, "best");
        assert_eq!(meta.architecture, "detector");
        assert_eq!(meta.version, "0.1.0");
    }

    #[test]
    fn test_metadata_with_custom() {
        let meta = ModelMetadata::new("best", "detector")
            .with_custom("img_size", serde_json::json!(640))
            .with_custom("classes", serde_json::json!(80));

        assert_eq!(meta.custom.len(), 2);
        assert_eq!(meta.custom.get("classes").unwrap(), &serde_json::json!(80));
    }

    #[test]
    fn test_parameter_access() {
        let model = sample_model();
        assert!(model.get_parameter("conv.weight").is_some());
        assert!(model.get_parameter("conv.bias").is_some());
        assert!(model.get_parameter("nonexistent").is_none());
    }

    #[test]
    fn test_state_round_trip() {
        let original = sample_model();
        let state = original.to_state();
        let restored = Model::from_state(state).unwrap();

        assert_eq!(original.metadata.name, restored.metadata.name);
        assert_eq!(original.graph.len(), restored.graph.len());
        assert_eq!(original.parameters, restored.parameters);
    }

    #[test]
    fn test_from_state_rejects_truncated_data() {
        let mut state = sample_model().to_state();
        state.data.pop();

        let result = Model::from_state(state);
        assert!(matches!(result, Err(crate::Error::CheckpointCorrupt(_))));
    }

    #[test]
    fn test_from_state_rejects_extra_data() {
        let mut state = sample_model().to_state();
        state.data.push(9.0);

        assert!(Model::from_state(state).is_err());
    }

    #[test]
    fn test_parameter_len() {
        let p = Parameter::new("w", vec![3], vec![1.0, 2.0, 3.0]);
        assert_eq!(p.len(), 3);
        assert!(!p.is_empty());
        assert!(Parameter::new("z", vec![0], vec![]).is_empty());
    }
}
