use crate::scene_graph::{ObjectId, Scene};

/// Placeholder that addresses an unnamed root, e.g. `Scene/Group1/Mesh1`.
pub const ROOT_PLACEHOLDER: &str = "Scene";

/// Resolves a slash-delimited path such as `Scene/Group1/Mesh1` or `Group1/Mesh1` below `root`.
///
/// The first segment is consumed as the root itself when it equals the root's name, or when
/// the root is unnamed and the segment is [`ROOT_PLACEHOLDER`]. Each remaining segment picks
/// the first child with that name; duplicate sibling names resolve to the first one.
pub fn find_object_by_path(scene: &Scene, root: ObjectId, path: &str) -> Option<ObjectId> {
    let root_object = scene.get_object(root)?;
    let mut segments = path.split('/').peekable();

    if let Some(&first) = segments.peek() {
        if root_object.name == first || (root_object.name.is_empty() && first == ROOT_PLACEHOLDER)
        {
            segments.next();
        }
    }

    segments.try_fold(root, |current, segment| {
        scene
            .children_of(current)
            .iter()
            .copied()
            .find(|&child| {
                scene
                    .get_object(child)
                    .is_some_and(|object| object.name == segment)
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene_graph::Object3D;

    struct Fixture {
        scene: Scene,
        root: ObjectId,
        child_a: ObjectId,
        grand_child: ObjectId,
        child_b: ObjectId,
    }

    fn fixture(root_name: &str) -> Fixture {
        let mut scene = Scene::new();
        let root = scene.add_object(Object3D::group(root_name));
        let child_a = scene.add_child(root, Object3D::group("ChildA"));
        let grand_child = scene.add_child(child_a, Object3D::group("GrandChild"));
        let child_b = scene.add_child(root, Object3D::group("ChildB"));
        Fixture {
            scene,
            root,
            child_a,
            grand_child,
            child_b,
        }
    }

    #[test]
    fn test_finds_objects_with_root_segment() {
        let f = fixture("Scene");
        assert_eq!(find_object_by_path(&f.scene, f.root, "Scene/ChildA"), Some(f.child_a));
        assert_eq!(
            find_object_by_path(&f.scene, f.root, "Scene/ChildA/GrandChild"),
            Some(f.grand_child)
        );
        assert_eq!(find_object_by_path(&f.scene, f.root, "Scene/ChildB"), Some(f.child_b));
        assert_eq!(find_object_by_path(&f.scene, f.root, "Scene"), Some(f.root));
    }

    #[test]
    fn test_finds_objects_without_root_segment() {
        let f = fixture("Scene");
        assert_eq!(find_object_by_path(&f.scene, f.root, "ChildA"), Some(f.child_a));
        assert_eq!(
            find_object_by_path(&f.scene, f.root, "ChildA/GrandChild"),
            Some(f.grand_child)
        );
    }

    #[test]
    fn test_unnamed_root_accepts_placeholder() {
        let f = fixture("");
        assert_eq!(find_object_by_path(&f.scene, f.root, "Scene/ChildB"), Some(f.child_b));
        assert_eq!(find_object_by_path(&f.scene, f.root, "ChildB"), Some(f.child_b));
    }

    #[test]
    fn test_named_root_does_not_accept_placeholder() {
        let f = fixture("Model");
        assert_eq!(find_object_by_path(&f.scene, f.root, "Scene/ChildA"), None);
        assert_eq!(find_object_by_path(&f.scene, f.root, "Model/ChildA"), Some(f.child_a));
    }

    #[test]
    fn test_missing_segment_is_not_found() {
        let f = fixture("Scene");
        assert_eq!(find_object_by_path(&f.scene, f.root, "Scene/Ghost"), None);
        assert_eq!(find_object_by_path(&f.scene, f.root, "Scene/ChildA/Ghost"), None);
        assert_eq!(find_object_by_path(&f.scene, f.root, "Ghost/ChildA"), None);
        assert_eq!(find_object_by_path(&f.scene, f.root, ""), None);
    }

    #[test]
    fn test_duplicate_siblings_resolve_to_first() {
        let mut f = fixture("Scene");
        let twin = f.scene.add_child(f.root, Object3D::group("ChildA"));
        f.scene.add_child(twin, Object3D::group("OnlyOnTwin"));

        assert_eq!(find_object_by_path(&f.scene, f.root, "ChildA"), Some(f.child_a));
        assert_eq!(find_object_by_path(&f.scene, f.root, "ChildA/OnlyOnTwin"), None);
    }
}
