//! Graph tracing
//!
//! Walks the model graph in execution order, resolving every input and
//! parameter reference before lowering begins. A trace that fails leaves
//! no artifact on disk.

use crate::checkpoint::Model;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Name of the implicit graph input
pub const GRAPH_INPUT: &str = "input";

/// A resolved operation in execution order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracedOp {
    /// Layer name
    pub name: String,

    /// Operator name as stored in the checkpoint
    pub op: String,

    /// Resolved input activations
    pub inputs: Vec<String>,

    /// Resolved parameter names
    pub params: Vec<String>,

    /// Operator attributes
    pub attrs: HashMap<String, serde_json::Value>,
}

/// A traced model graph
#[derive(Debug, Clone)]
pub struct TracedGraph {
    /// Operations in execution order
    pub ops: Vec<TracedOp>,
}

/// Trace the model graph
///
/// Verifies that every layer's inputs name either the graph input or an
/// earlier layer, that every referenced parameter exists, and that layer
/// names are unique.
pub fn trace(model: &Model) -> Result<TracedGraph> {
    if model.graph.is_empty() {
        return Err(Error::ExportFailed("model graph is empty".to_string()));
    }

    let mut defined: HashSet<&str> = HashSet::new();
    defined.insert(GRAPH_INPUT);

    let mut ops = Vec::with_capacity(model.graph.len());

    for layer in &model.graph {
        if !defined.insert(layer.name.as_str()) {
            return Err(Error::ExportFailed(format!(
                "duplicate layer name '{}'",
                layer.name
            )));
        }

        for input in &layer.inputs {
            // The layer itself was just inserted; self-reference is a cycle.
            if input == &layer.name || !defined.contains(input.as_str()) {
                return Err(Error::ExportFailed(format!(
                    "layer '{}' reads undefined input '{input}'",
                    layer.name
                )));
            }
        }

        for param in &layer.params {
            if model.get_parameter(param).is_none() {
                return Err(Error::ExportFailed(format!(
                    "layer '{}' references missing parameter '{param}'",
                    layer.name
                )));
            }
        }

        ops.push(TracedOp {
            name: layer.name.clone(),
            op: layer.op.clone(),
            inputs: layer.inputs.clone(),
            params: layer.params.clone(),
            attrs: layer.attrs.clone(),
        });
    }

    Ok(TracedGraph { ops })
}
