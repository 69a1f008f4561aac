use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Tunables for structure files and extraction bundles. Every field may be omitted in TOML.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Decimal places for sizes and matrices in structure files.
    pub structure_precision: u32,
    /// Unit label written to extraction metadata sizes.
    pub size_unit: String,
    /// Factor from source units to `size_unit`.
    pub size_unit_scale: f64,
    pub size_precision: u32,
    pub model_entry_name: String,
    pub metadata_entry_name: String,
    /// Bundle file stem when the extracted object has no name.
    pub fallback_extract_name: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            structure_precision: 6,
            size_unit: "cm".to_string(),
            size_unit_scale: 100.0,
            size_precision: 1,
            model_entry_name: "model.glb".to_string(),
            metadata_entry_name: "metadata.json".to_string(),
            fallback_extract_name: "extracted_model".to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let source = std::fs::read_to_string(path)?;
        Self::from_toml_str(&source)
    }
}
