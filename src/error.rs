//! Error types for loading, restructuring and extracting scenes.

use thiserror::Error;

use crate::extraction::ExtractionState;

/// Failures of the binary scene-file codec and of bundle packaging.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("glTF error: {0}")]
    Gltf(#[from] gltf::Error),

    #[error("glTF file contains no scene")]
    NoScene,

    #[error("model requires {0} mesh compression, which cannot be decoded; export it uncompressed")]
    CompressedMesh(String),

    #[error("primitive without positions in mesh {0}")]
    MissingPositions(String),

    #[error("object not found in scene")]
    ObjectNotFound,

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary chunk exceeds the GLB size limit")]
    TooLarge,

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures surfaced by structure export and import.
#[derive(Error, Debug)]
pub enum StructureError {
    #[error("nothing to export: no tree data")]
    EmptyInput,

    #[error("no model loaded")]
    NoModel,

    #[error("structure file does not match the expected shape: {0}")]
    Validation(#[from] serde_json::Error),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Failures of the extraction baker and packaging.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("object not found in scene")]
    NodeNotFound,

    #[error("clone diverged from original at {path}: {original} children vs {clone} in clone")]
    StructureMismatch {
        path: String,
        original: usize,
        clone: usize,
    },

    #[error("cannot {action} while the extraction session is in {state:?}")]
    TransitionRefused {
        action: &'static str,
        state: ExtractionState,
    },

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Failures loading an [`AnalyzerConfig`](crate::config::AnalyzerConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Toml(#[from] toml::de::Error),
}
