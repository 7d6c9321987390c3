//! # Exportar: Checkpoint Loading & Mobile Export
//!
//! Exportar loads trained-model checkpoints and converts them into a compact
//! bundle suited to mobile inference runtimes: graph trace, operator lowering,
//! optional int8 quantization, and single-file serialization.
//!
//! ## Architecture
//!
//! - **checkpoint**: Checkpoint loading and saving (JSON, YAML, SafeTensors)
//! - **export**: Graph tracing, operator lowering, and artifact serialization
//! - **quant**: Per-tensor 8-bit quantization for int8 exports
//! - **pipeline**: The linear load-then-export sequence
//!
//! ## Example
//!
//! ```no_run
//! use exportar::{run_export, ExportConfig};
//!
//! let report = run_export("best.safetensors", &ExportConfig::default()).unwrap();
//! println!("wrote {}", report.artifact.display());
//! ```

pub mod checkpoint;
pub mod export;
pub mod pipeline;
pub mod quant;

pub mod error;

// Re-export commonly used types
pub use checkpoint::{load_checkpoint, save_checkpoint, Model, ModelMetadata};
pub use error::{Error, Result};
pub use export::{export_model, ExportConfig, ExportReport, Precision, TargetFormat};
pub use pipeline::run_export;
