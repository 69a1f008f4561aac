use glam::{Mat3, Mat4, Vec2, Vec3};
use gltf::mesh::Mode;

use crate::math::AABB;

/// One draw call worth of vertices with optional per-vertex attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Primitive {
    pub positions: Vec<Vec3>,
    pub normals: Option<Vec<Vec3>>,
    pub tex_coords: Option<Vec<Vec2>>,
    pub indices: Option<Vec<u32>>,
    /// Topology as read from the file; points and lines are kept as-is.
    pub mode: Mode,
    /// Index into the owning scene's [`MaterialLibrary`](super::MaterialLibrary).
    pub material: Option<usize>,
}

impl Default for Primitive {
    fn default() -> Self {
        Self {
            positions: Vec::new(),
            normals: None,
            tex_coords: None,
            indices: None,
            mode: Mode::Triangles,
            material: None,
        }
    }
}

impl Primitive {
    pub fn from_positions(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Geometry owned by a mesh node. Cloning duplicates every buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshGeometry {
    pub name: Option<String>,
    pub primitives: Vec<Primitive>,
}

impl MeshGeometry {
    pub fn new(primitives: Vec<Primitive>) -> Self {
        Self {
            name: None,
            primitives,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.primitives.iter().map(Primitive::vertex_count).sum()
    }

    /// Transforms positions as points and normals with the normal matrix of `matrix`.
    pub fn apply_matrix(&mut self, matrix: &Mat4) {
        let normal_matrix = Mat3::from_mat4(*matrix).inverse().transpose();

        for primitive in &mut self.primitives {
            for position in &mut primitive.positions {
                *position = matrix.transform_point3(*position);
            }

            if let Some(normals) = &mut primitive.normals {
                for normal in normals.iter_mut() {
                    *normal = (normal_matrix * *normal).normalize_or_zero();
                }
            }
        }
    }

    pub fn translate(&mut self, offset: Vec3) {
        for primitive in &mut self.primitives {
            for position in &mut primitive.positions {
                *position += offset;
            }
        }
    }

    pub fn bounding_box(&self) -> AABB {
        AABB::from_points(
            self.primitives
                .iter()
                .flat_map(|primitive| primitive.positions.iter().copied()),
        )
    }

    /// The local box carried through `matrix`, so a rotated mesh measures by its box corners.
    pub fn bounds_transformed(&self, matrix: &Mat4) -> AABB {
        self.bounding_box().transformed(matrix)
    }
}
