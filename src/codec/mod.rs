//! Binary scene-file codec: GLB decode into a [`Scene`](crate::scene_graph::Scene), encode
//! back out, and summary statistics.

pub mod glb_export;
pub mod gltf_import;
pub mod report;

pub use glb_export::{write_scene_glb, write_subtree_glb};
pub use gltf_import::load_glb;
pub use report::SceneReport;
