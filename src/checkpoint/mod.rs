//! Checkpoint I/O - Loading and saving model checkpoints
//!
//! Provides functionality to read a serialized checkpoint from disk into an
//! in-memory model handle, supporting multiple serialization formats.

mod format;
mod load;
mod model;
mod save;

pub use format::{CheckpointFormat, SaveConfig};
pub use load::load_checkpoint;
pub use model::{LayerSpec, Model, ModelMetadata, ModelState, Parameter, ParameterInfo};
pub use save::save_checkpoint;
