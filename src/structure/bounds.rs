use glam::Vec3;

use crate::math::AABB;
use crate::scene_graph::{ObjectId, Scene};

/// World-space box around all geometry at or below `id`.
///
/// `None` when nothing measurable is found: no geometry, an empty box, or non-finite values.
pub fn world_bounds(scene: &Scene, id: ObjectId) -> Option<AABB> {
    scene.get_object(id)?;
    scene.update_transforms();

    let bounds = scene
        .descendants(id)
        .into_iter()
        .filter_map(|object_id| scene.get_object(object_id))
        .filter_map(|object| {
            object.geometry.as_ref().map(|geometry| {
                geometry.bounds_transformed(&object.transform.get_world_matrix())
            })
        })
        .fold(AABB::EMPTY, |acc, bounds| acc.union(&bounds));

    (!bounds.is_empty() && bounds.is_finite()).then_some(bounds)
}

/// Size of [`world_bounds`] in source units. `None` means unknown, never a zero vector stand-in.
pub fn bounding_size(scene: &Scene, id: ObjectId) -> Option<Vec3> {
    world_bounds(scene, id).map(|bounds| bounds.size())
}
