//! Subtree extraction: bake world placement into geometry, adjust, and package.

pub mod baker;
pub mod bundle;
pub mod session;

pub use baker::{
    prepare_extraction, rotate_extracted, Axis, ExtractionData, ExtractionMetadata, ParseAxisError,
};
pub use bundle::{extract_and_bake, package_extraction, ExtractionBundle};
pub use session::{ExtractionSession, ExtractionState};
