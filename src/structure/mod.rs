//! Path-addressed projections of a scene hierarchy: structure export and rename import.

pub mod bounds;
pub mod export;
pub mod import;
pub mod path;
pub mod tree;

pub use bounds::{bounding_size, world_bounds};
pub use export::{to_export_nodes, to_json, ExportNode, Size3, STRUCTURE_PRECISION};
pub use import::{apply_structure_updates, parse_structure, SyncReport};
pub use path::{find_object_by_path, ROOT_PLACEHOLDER};
pub use tree::{generate_tree_data, ProjectedNode};
