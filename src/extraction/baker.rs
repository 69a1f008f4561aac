use std::f32::consts::FRAC_PI_2;
use std::str::FromStr;

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AnalyzerConfig;
use crate::error::ExtractionError;
use crate::scene_graph::{ObjectId, Scene};
use crate::structure::bounds::world_bounds;
use crate::structure::export::round_to;

const FALLBACK_METADATA_NAME: &str = "Extracted Node";

const RESTORE_NOTE: &str = "Use restoreMatrix to put the baked model back in place. Do not apply \
originalWorldMatrix: its rotation and scale are already baked into the geometry.";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldCenter {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasuredSize {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub unit: String,
}

/// Contents of `metadata.json` in an extraction bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionMetadata {
    pub name: String,
    pub original_path: String,
    /// Informational. Reapplying it would double the baked rotation and scale.
    pub original_world_matrix: [f32; 16],
    pub world_center: WorldCenter,
    /// Pure translation by `world_center`.
    pub restore_matrix: [f32; 16],
    pub note: String,
    pub size: MeasuredSize,
}

/// A baked, detached copy of one subtree plus the metadata to put it back.
#[derive(Debug)]
pub struct ExtractionData {
    /// Owns the clone exclusively; nothing here aliases the live scene.
    pub scene: Scene,
    pub root: ObjectId,
    pub metadata: ExtractionMetadata,
    /// Handle of the extracted object in the live scene, for context only.
    pub original: ObjectId,
    pub file_stem: String,
}

impl ExtractionData {
    pub fn world_center(&self) -> Vec3 {
        let center = self.metadata.world_center;
        Vec3::new(center.x, center.y, center.z)
    }

    pub fn restore_matrix(&self) -> Mat4 {
        Mat4::from_cols_array(&self.metadata.restore_matrix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Quarter turn about this axis.
    pub fn quarter_turn(&self) -> Mat4 {
        match self {
            Axis::X => Mat4::from_rotation_x(FRAC_PI_2),
            Axis::Y => Mat4::from_rotation_y(FRAC_PI_2),
            Axis::Z => Mat4::from_rotation_z(FRAC_PI_2),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown axis {0:?}, expected x, y or z")]
pub struct ParseAxisError(String);

impl FromStr for Axis {
    type Err = ParseAxisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Axis::X),
            "y" => Ok(Axis::Y),
            "z" => Ok(Axis::Z),
            _ => Err(ParseAxisError(s.to_string())),
        }
    }
}

/// Clones the subtree at `id` and bakes each mesh's world transform into its vertices.
///
/// The clone is re-centred on the world bounding-box centre of the original and every
/// local transform in it is reset to identity. The live scene is only read.
pub fn prepare_extraction(
    scene: &Scene,
    id: ObjectId,
    config: &AnalyzerConfig,
) -> Result<ExtractionData, ExtractionError> {
    let world_matrix = scene.world_matrix(id).ok_or(ExtractionError::NodeNotFound)?;
    let (mut clone, clone_root) = scene
        .clone_subtree(id)
        .ok_or(ExtractionError::NodeNotFound)?;

    // Measured on the original, before any vertex is touched.
    let bounds = world_bounds(scene, id);
    let center = bounds.map(|bounds| bounds.center()).unwrap_or(Vec3::ZERO);
    let size = bounds.map(|bounds| bounds.size()).unwrap_or(Vec3::ZERO);

    bake_node(scene, id, &mut clone, clone_root, center)?;

    let name = scene
        .get_object(id)
        .map(|object| object.name.clone())
        .unwrap_or_default();
    let file_stem = if name.is_empty() {
        config.fallback_extract_name.clone()
    } else {
        name.clone()
    };

    log::debug!("Prepared extraction of {:?}: center {:?}, size {:?}", name, center, size);

    let to_unit =
        |value: f32| round_to(value as f64 * config.size_unit_scale, config.size_precision);

    let metadata = ExtractionMetadata {
        name: if name.is_empty() {
            FALLBACK_METADATA_NAME.to_string()
        } else {
            name
        },
        original_path: scene.path_of(id),
        original_world_matrix: world_matrix.to_cols_array(),
        world_center: WorldCenter {
            x: center.x,
            y: center.y,
            z: center.z,
        },
        restore_matrix: Mat4::from_translation(center).to_cols_array(),
        note: RESTORE_NOTE.to_string(),
        size: MeasuredSize {
            x: to_unit(size.x),
            y: to_unit(size.y),
            z: to_unit(size.z),
            unit: config.size_unit.clone(),
        },
    };

    Ok(ExtractionData {
        scene: clone,
        root: clone_root,
        metadata,
        original: id,
        file_stem,
    })
}

/// Walks original and clone in lock-step by child index.
fn bake_node(
    original_scene: &Scene,
    original_id: ObjectId,
    clone_scene: &mut Scene,
    clone_id: ObjectId,
    center: Vec3,
) -> Result<(), ExtractionError> {
    let original = original_scene
        .get_object(original_id)
        .ok_or(ExtractionError::NodeNotFound)?;
    let clone = clone_scene
        .get_object_mut(clone_id)
        .ok_or(ExtractionError::NodeNotFound)?;

    if original.is_mesh() {
        if let Some(geometry) = clone.geometry.as_mut() {
            geometry.apply_matrix(&original.transform.get_world_matrix());
            geometry.translate(-center);
        }
    }

    clone.transform.reset();

    if original.child_ids.len() != clone.child_ids.len() {
        return Err(ExtractionError::StructureMismatch {
            path: original_scene.path_of(original_id),
            original: original.child_ids.len(),
            clone: clone.child_ids.len(),
        });
    }

    let clone_children = clone.child_ids.clone();
    for (&original_child, clone_child) in original.child_ids.iter().zip(clone_children) {
        bake_node(original_scene, original_child, clone_scene, clone_child, center)?;
    }

    Ok(())
}

/// Rotates every mesh in the extracted clone a quarter turn about `axis`, in place.
///
/// Four turns about the same axis restore the original orientation.
pub fn rotate_extracted(data: &mut ExtractionData, axis: Axis) {
    let rotation = axis.quarter_turn();

    for id in data.scene.descendants(data.root) {
        if let Some(object) = data.scene.get_object_mut(id) {
            if !object.is_mesh() {
                continue;
            }
            if let Some(geometry) = object.geometry.as_mut() {
                geometry.apply_matrix(&rotation);
            }
        }
    }
}
