//! Per-tensor 8-bit quantization for int8 exports
//!
//! Weight tensors are quantized one at a time with a single scale (and,
//! for asymmetric mode, a zero-point). Quantized values follow the mobile
//! int8 convention: q in [-128, 127], with symmetric weights restricted to
//! [-127, 127] and zero-point pinned at 0.

use serde::{Deserialize, Serialize};

/// Quantization mode: symmetric or asymmetric
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QuantMode {
    /// Symmetric: zero-point = 0, range = [-max_abs, max_abs]
    #[default]
    Symmetric,
    /// Asymmetric: zero-point != 0, range = [min, max]
    Asymmetric,
}

/// Quantization parameters for a tensor
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct QuantParams {
    /// Scale factor
    pub scale: f32,
    /// Zero point (0 for symmetric quantization)
    pub zero_point: i32,
    /// Quantization mode
    pub mode: QuantMode,
    /// Bit width
    pub bits: u8,
}

/// Quantized tensor with per-tensor parameters
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct QuantizedTensor {
    /// Quantized integer data
    pub data: Vec<i8>,
    /// Quantization parameters
    pub params: QuantParams,
    /// Original shape
    pub shape: Vec<usize>,
}

impl QuantizedTensor {
    /// Memory usage in bytes (data plus scale/zero-point)
    pub fn memory_bytes(&self) -> usize {
        self.data.len() + 8
    }
}

/// Calibrate per-tensor quantization parameters
///
/// # Arguments
/// * `values` - Input tensor values
/// * `bits` - Bit width (8 for int8 export)
/// * `mode` - Symmetric or asymmetric quantization
pub fn calibrate(values: &[f32], bits: u8, mode: QuantMode) -> QuantParams {
    let (scale, zero_point) = match mode {
        QuantMode::Symmetric => {
            let max_abs = values
                .iter()
                .map(|v| v.abs())
                .fold(0.0f32, f32::max)
                .max(1e-8);

            let qmax = ((1i32 << (bits - 1)) - 1) as f32;
            (max_abs / qmax, 0)
        }
        QuantMode::Asymmetric => {
            let (min_val, max_val) = values.iter().fold((f32::MAX, f32::MIN), |(min, max), &v| {
                (min.min(v), max.max(v))
            });

            let min_val = min_val.min(0.0);
            let max_val = max_val.max(0.0);
            let range = (max_val - min_val).max(1e-8);
            let levels = ((1i32 << bits) - 1) as f32;
            let scale = range / levels;
            let qmin = -(1i32 << (bits - 1));
            let zero_point =
                (qmin as f32 - (min_val / scale).round()).round() as i32;
            let zero_point = zero_point.clamp(qmin, -qmin - 1);
            (scale, zero_point)
        }
    };

    QuantParams {
        scale,
        zero_point,
        mode,
        bits,
    }
}

/// Quantize values with the given parameters
pub fn quantize(values: &[f32], params: &QuantParams) -> Vec<i8> {
    let qmax = ((1i32 << (params.bits - 1)) - 1) as f32;
    let qmin = match params.mode {
        QuantMode::Symmetric => -qmax,
        QuantMode::Asymmetric => -(qmax + 1.0),
    };

    values
        .iter()
        .map(|&v| {
            let q = (v / params.scale).round() + params.zero_point as f32;
            q.clamp(qmin, qmax) as i8
        })
        .collect()
}

/// Calibrate and quantize a tensor in one step
pub fn quantize_tensor(values: &[f32], shape: &[usize], mode: QuantMode, bits: u8) -> QuantizedTensor {
    let params = calibrate(values, bits, mode);
    QuantizedTensor {
        data: quantize(values, &params),
        params,
        shape: shape.to_vec(),
    }
}

/// Recover approximate f32 values from a quantized tensor
pub fn dequantize(tensor: &QuantizedTensor) -> Vec<f32> {
    tensor
        .data
        .iter()
        .map(|&q| (q as i32 - tensor.params.zero_point) as f32 * tensor.params.scale)
        .collect()
}
