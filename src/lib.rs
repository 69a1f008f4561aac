//! Inspect, rename and extract parts of binary glTF scenes.
//!
//! A loaded file becomes a [`scene_graph::Scene`]. The [`structure`] module projects it to a
//! path-addressed JSON structure and applies renames back onto it, and [`extraction`] bakes a
//! subtree's world placement into its geometry so it can be saved on its own and restored later.

pub mod codec;
pub mod config;
pub mod error;
pub mod extraction;
pub mod math;
pub mod scene_graph;
pub mod store;
pub mod structure;

pub use config::AnalyzerConfig;
pub use store::StructureStore;
