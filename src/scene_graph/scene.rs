use std::rc::Rc;

use glam::Mat4;
use id_arena::Arena;

use crate::scene_graph::material::MaterialLibrary;
use crate::scene_graph::object3d::{Object3D, ObjectId};

/// Arena-backed node hierarchy. Child order is significant and stable.
pub struct Scene {
    pub objects: Arena<Object3D>,
    /// Materials and textures of the source file, indexed by `Primitive::material`.
    pub library: Rc<MaterialLibrary>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scene")
            .field("objects", &self.objects.len())
            .field("materials", &self.library.materials.len())
            .finish()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            library: Rc::default(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    /// Adds `object` as the last child of `parent`.
    pub fn add_child(&mut self, parent: ObjectId, object: Object3D) -> ObjectId {
        let object_id = self.add_object(object);
        self.set_object_parent(object_id, Some(parent));
        object_id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    pub fn get_object_mut(&mut self, id: ObjectId) -> Option<&mut Object3D> {
        self.objects.get_mut(id)
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    /// Objects without a parent, in allocation order.
    pub fn roots(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id)
    }

    pub fn root(&self) -> Option<ObjectId> {
        self.roots().next()
    }

    pub fn children_of(&self, id: ObjectId) -> &[ObjectId] {
        self.objects
            .get(id)
            .map(|object| object.child_ids.as_slice())
            .unwrap_or(&[])
    }

    /// `id` and all of its descendants, depth-first pre-order.
    pub fn descendants(&self, id: ObjectId) -> Vec<ObjectId> {
        let mut out = Vec::new();
        let mut stack = vec![id];

        while let Some(current) = stack.pop() {
            if let Some(object) = self.objects.get(current) {
                out.push(current);
                stack.extend(object.child_ids.iter().rev().copied());
            }
        }

        out
    }

    pub fn rename(&mut self, id: ObjectId, name: impl Into<String>) -> bool {
        match self.objects.get_mut(id) {
            Some(object) => {
                object.name = name.into();
                true
            }
            None => false,
        }
    }

    /// Slash-joined names from the top-level object down to `id`.
    ///
    /// Empty names are skipped and an unnamed root container does not contribute a segment.
    pub fn path_of(&self, id: ObjectId) -> String {
        let mut segments = Vec::new();
        let mut current = self.objects.get(id);

        while let Some(object) = current {
            if !object.name.is_empty() {
                segments.push(object.name.as_str());
            }
            current = object.parent(self);
        }

        segments.reverse();
        segments.join("/")
    }

    /// Recomputes world matrices for every root and its descendants.
    pub fn update_transforms(&self) {
        for root_id in self.roots() {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY, false);
        }
    }

    fn update_object_transform_recursive(
        &self,
        object_id: ObjectId,
        parent_world_matrix: Mat4,
        parent_changed: bool,
    ) {
        if let Some(object) = self.objects.get(object_id) {
            let changed = parent_changed || object.transform.is_world_dirty();
            if changed {
                let local_matrix = *object.transform.get_local_matrix();
                object
                    .transform
                    .set_world_matrix(parent_world_matrix * local_matrix);
            }

            let world_matrix = *object.transform.get_world_matrix();
            for &child_id in &object.child_ids {
                self.update_object_transform_recursive(child_id, world_matrix, changed);
            }
        }
    }

    /// Accumulated world matrix of `id`, evaluated from the current local transforms.
    pub fn world_matrix(&self, id: ObjectId) -> Option<Mat4> {
        self.update_transforms();
        self.objects
            .get(id)
            .map(|object| *object.transform.get_world_matrix())
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        // Remove from old parent's children list
        if let Some(child) = self.objects.get(child_id) {
            if let Some(old_parent_id) = child.parent_id {
                if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                    old_parent.child_ids.retain(|&id| id != child_id);
                }
            }
        }

        // Set new parent and add to new parent's children list
        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;

            if let Some(new_parent_id) = new_parent_id {
                if let Some(new_parent) = self.objects.get_mut(new_parent_id) {
                    new_parent.child_ids.push(child_id);
                }
            }
        }

        self.invalidate_object_hierarchy(child_id);
    }

    /// Deep copy of the subtree at `id` into a new, detached scene.
    ///
    /// Geometry is duplicated, so edits to the copy never reach this scene. Returns the
    /// new scene and the id of the copied root inside it.
    pub fn clone_subtree(&self, id: ObjectId) -> Option<(Scene, ObjectId)> {
        let source = self.objects.get(id)?;
        let mut copy = Scene {
            objects: Arena::new(),
            library: Rc::clone(&self.library),
        };

        let root_id = copy.add_object(Self::detached_copy(source));
        self.clone_children_into(id, &mut copy, root_id);
        copy.invalidate_object_hierarchy(root_id);

        Some((copy, root_id))
    }

    fn clone_children_into(&self, source_id: ObjectId, target: &mut Scene, target_id: ObjectId) {
        for &child_id in self.children_of(source_id) {
            if let Some(child) = self.objects.get(child_id) {
                let copied_id = target.add_child(target_id, Self::detached_copy(child));
                self.clone_children_into(child_id, target, copied_id);
            }
        }
    }

    fn detached_copy(object: &Object3D) -> Object3D {
        Object3D {
            parent_id: None,
            child_ids: Vec::new(),
            ..object.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::geometry::{MeshGeometry, Primitive};
    use crate::scene_graph::object3d::NodeKind;
    use crate::scene_graph::transform::Transform;
    use glam::Vec3;

    fn sample_scene() -> (Scene, ObjectId, ObjectId, ObjectId) {
        let mut scene = Scene::new();
        let root = scene.add_object(Object3D::group("Scene"));
        let parent = scene.add_child(
            root,
            Object3D::group("Parent").with_transform(Transform::from_translation(Vec3::X)),
        );
        let child = scene.add_child(
            parent,
            Object3D::mesh(
                "Child",
                MeshGeometry::new(vec![Primitive::from_positions(vec![Vec3::ZERO])]),
            )
            .with_transform(Transform::from_translation(Vec3::Y)),
        );
        (scene, root, parent, child)
    }

    #[test]
    fn test_world_matrix_accumulates() {
        let (scene, _, _, child) = sample_scene();
        let world = scene.world_matrix(child).unwrap();
        assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_world_matrix_follows_parent_edit() {
        let (mut scene, _, parent, child) = sample_scene();
        scene.world_matrix(child);

        scene
            .get_object_mut(parent)
            .unwrap()
            .transform
            .set_translation(Vec3::new(0.0, 0.0, 3.0));

        let world = scene.world_matrix(child).unwrap();
        assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::new(0.0, 1.0, 3.0));
    }

    #[test]
    fn test_descendants_are_preorder() {
        let (scene, root, parent, child) = sample_scene();
        assert_eq!(scene.descendants(root), vec![root, parent, child]);
        assert_eq!(scene.root(), Some(root));
    }

    #[test]
    fn test_path_of_skips_empty_names() {
        let (mut scene, root, _, child) = sample_scene();
        assert_eq!(scene.path_of(child), "Scene/Parent/Child");

        scene.rename(root, "");
        assert_eq!(scene.path_of(child), "Parent/Child");
    }

    #[test]
    fn test_clone_subtree_is_detached() {
        let (scene, _, parent, child) = sample_scene();
        let (mut copy, copy_root) = scene.clone_subtree(parent).unwrap();

        assert_eq!(copy.object_count(), 2);
        let copy_root_object = copy.get_object(copy_root).unwrap();
        assert!(copy_root_object.parent_id.is_none());
        assert_eq!(copy_root_object.name, "Parent");

        let copy_child = copy.children_of(copy_root)[0];
        assert_eq!(copy.get_object(copy_child).unwrap().kind, NodeKind::Mesh);

        copy.get_object_mut(copy_child)
            .unwrap()
            .geometry
            .as_mut()
            .unwrap()
            .translate(Vec3::Z);

        let original = scene.get_object(child).unwrap().geometry.as_ref().unwrap();
        assert_eq!(original.primitives[0].positions[0], Vec3::ZERO);
    }

    #[test]
    fn test_clone_subtree_keeps_material_library() {
        let (mut scene, _, parent, _) = sample_scene();
        scene.library = Rc::new(MaterialLibrary {
            materials: vec![gltf::json::Material::default()],
            ..Default::default()
        });

        let (copy, _) = scene.clone_subtree(parent).unwrap();
        assert!(Rc::ptr_eq(&copy.library, &scene.library));
    }

    #[test]
    fn test_reparent_moves_child() {
        let (mut scene, root, parent, child) = sample_scene();
        scene.set_object_parent(child, Some(root));
        assert_eq!(scene.children_of(root), &[parent, child]);
        assert!(scene.children_of(parent).is_empty());
        let world = scene.world_matrix(child).unwrap();
        assert_eq!(world.transform_point3(Vec3::ZERO), Vec3::Y);
    }
}
