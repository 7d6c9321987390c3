//! Checkpoint serialization format definitions

use serde::{Deserialize, Serialize};

/// Supported checkpoint serialization formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckpointFormat {
    /// JSON format (human-readable, larger file size)
    Json,

    /// YAML format (human-readable, good for small models)
    Yaml,

    /// SafeTensors format (HuggingFace compatible, efficient binary)
    SafeTensors,
}

impl CheckpointFormat {
    /// Get file extension for this format
    pub fn extension(&self) -> &str {
        match self {
            CheckpointFormat::Json => "json",
            CheckpointFormat::Yaml => "yaml",
            CheckpointFormat::SafeTensors => "safetensors",
        }
    }

    /// Detect format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(CheckpointFormat::Json),
            "yaml" | "yml" => Some(CheckpointFormat::Yaml),
            "safetensors" => Some(CheckpointFormat::SafeTensors),
            _ => None,
        }
    }
}

/// Configuration for saving checkpoints
#[derive(Debug, Clone)]
pub struct SaveConfig {
    /// Serialization format
    pub format: CheckpointFormat,

    /// Whether to pretty-print (for text formats)
    pub pretty: bool,
}

impl SaveConfig {
    /// Create new save config with format
    pub fn new(format: CheckpointFormat) -> Self {
        Self {
            format,
            pretty: true,
        }
    }

    /// Enable/disable pretty printing
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self::new(CheckpointFormat::Json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_extension() {
        assert_eq!(CheckpointFormat::Json.extension(), "json");
        assert_eq!(CheckpointFormat::Yaml.extension(), "yaml");
        assert_eq!(CheckpointFormat::SafeTensors.extension(), "safetensors");
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            CheckpointFormat::from_extension("json"),
            Some(CheckpointFormat::Json)
        );
        assert_eq!(
            CheckpointFormat::from_extension("JSON"),
            Some(CheckpointFormat::Json)
        );
        assert_eq!(
            CheckpointFormat::from_extension("yml"),
            Some(CheckpointFormat::Yaml)
        );
        assert_eq!(
            CheckpointFormat::from_extension("safetensors"),
            Some(CheckpointFormat::SafeTensors)
        );
        assert_eq!(CheckpointFormat::from_extension("pt"), None);
    }

    #[test]
    fn test_save_config_builder() {
        let config = SaveConfig::new(CheckpointFormat::Yaml).with_pretty(false);
        assert_eq!(config.format, CheckpointFormat::Yaml);
        assert!(!config.pretty);
    }

    #[test]
    fn test_save_config_default() {
        let config = SaveConfig::default();
        assert_eq!(config.format, CheckpointFormat::Json);
        assert!(config.pretty);
    }
}
