//! Operator lowering
//!
//! Maps traced operators onto the mobile runtime's fixed op set. Any
//! operator outside the set aborts the export with
//! [`Error::UnsupportedOperator`](crate::Error::UnsupportedOperator).

use super::trace::{TracedGraph, TracedOp};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Operators the mobile runtime can execute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MobileOp {
    Conv2d,
    DepthwiseConv2d,
    FullyConnected,
    Relu,
    Sigmoid,
    Softmax,
    Add,
    Concat,
    MaxPool2d,
    Upsample,
}

impl MobileOp {
    /// Map a checkpoint operator name onto the mobile op set
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "conv2d" => Some(MobileOp::Conv2d),
            "depthwise_conv2d" => Some(MobileOp::DepthwiseConv2d),
            "fully_connected" | "linear" => Some(MobileOp::FullyConnected),
            "relu" => Some(MobileOp::Relu),
            "sigmoid" => Some(MobileOp::Sigmoid),
            "softmax" => Some(MobileOp::Softmax),
            "add" => Some(MobileOp::Add),
            "concat" => Some(MobileOp::Concat),
            "max_pool2d" | "maxpool2d" => Some(MobileOp::MaxPool2d),
            "upsample" => Some(MobileOp::Upsample),
            _ => None,
        }
    }
}

/// An operation lowered to the mobile op set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoweredOp {
    /// Layer name
    pub name: String,

    /// Lowered operator kind
    pub kind: MobileOp,

    /// Input activations
    pub inputs: Vec<String>,

    /// Parameter names, resolved against the artifact tensor index
    pub params: Vec<String>,

    /// Operator attributes
    pub attrs: HashMap<String, serde_json::Value>,
}

/// Lower a traced graph onto the mobile op set
pub fn lower(graph: &TracedGraph) -> Result<Vec<LoweredOp>> {
    graph.ops.iter().map(lower_op).collect()
}

fn lower_op(op: &TracedOp) -> Result<LoweredOp> {
    let kind = MobileOp::from_name(&op.op).ok_or_else(|| Error::UnsupportedOperator {
        layer: op.name.clone(),
        op: op.op.clone(),
    })?;

    Ok(LoweredOp {
        name: op.name.clone(),
        kind,
        inputs: op.inputs.clone(),
        params: op.params.clone(),
        attrs: op.attrs.clone(),
    })
}
