pub mod geometry;
pub mod material;
pub mod object3d;
pub mod scene;
pub mod transform;

// Re-export main types for convenience
pub use geometry::{MeshGeometry, Primitive};
pub use material::{ImageSource, MaterialLibrary};
pub use object3d::{NodeKind, Object3D, ObjectId};
pub use scene::Scene;
pub use transform::Transform;
