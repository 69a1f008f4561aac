use crate::error::StructureError;
use crate::scene_graph::{ObjectId, Scene};
use crate::structure::export::ExportNode;
use crate::structure::path::find_object_by_path;

/// Outcome of [`apply_structure_updates`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub renamed: usize,
    pub unresolved: Vec<String>,
}

/// Parses and validates a structure file. Nothing is applied here, so a malformed file
/// leaves the scene untouched.
pub fn parse_structure(json: &str) -> Result<Vec<ExportNode>, StructureError> {
    Ok(serde_json::from_str(json)?)
}

/// Renames live objects to match `nodes`, children before parents.
///
/// Paths are looked up exactly as stored. Since they embed ancestor names, handling children
/// first keeps every lookup running against ancestors that have not been renamed yet.
/// Unresolved paths are logged and skipped; earlier renames are kept.
pub fn apply_structure_updates(
    scene: &mut Scene,
    root: ObjectId,
    nodes: &[ExportNode],
) -> SyncReport {
    let mut report = SyncReport::default();
    process_nodes(scene, root, nodes, &mut report);
    report
}

fn process_nodes(
    scene: &mut Scene,
    root: ObjectId,
    nodes: &[ExportNode],
    report: &mut SyncReport,
) {
    for node in nodes {
        if !node.children.is_empty() {
            process_nodes(scene, root, &node.children, report);
        }

        let Some(target) = find_object_by_path(scene, root, &node.path) else {
            log::warn!("Object not found for path: {}", node.path);
            report.unresolved.push(node.path.clone());
            continue;
        };

        if let Some(object) = scene.get_object_mut(target) {
            if object.name != node.name {
                log::info!("Renaming: {} -> {} (path: {})", object.name, node.name, node.path);
                object.name = node.name.clone();
                report.renamed += 1;
            }
        }
    }
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

    fn fixture() -> Fixture {
        let mut scene = Scene::new();
        let root = scene.add_object(Object3D::group("Scene"));
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

    fn entry(name: &str, path: &str, children: Vec<ExportNode>) -> ExportNode {
        ExportNode {
            name: name.into(),
            path: path.into(),
            type_: "Group".into(),
            size: None,
            matrix: [0.0; 16],
            children,
        }
    }

    fn name_of(scene: &Scene, id: ObjectId) -> &str {
        &scene.get_object(id).unwrap().name
    }

    #[test]
    fn test_renames_bottom_up() {
        let mut f = fixture();
        let nodes = vec![
            entry(
                "NewChildA",
                "Scene/ChildA",
                vec![entry("NewGrandChild", "Scene/ChildA/GrandChild", vec![])],
            ),
            entry("ChildB", "Scene/ChildB", vec![]),
        ];

        let report = apply_structure_updates(&mut f.scene, f.root, &nodes);

        assert_eq!(name_of(&f.scene, f.grand_child), "NewGrandChild");
        assert_eq!(name_of(&f.scene, f.child_a), "NewChildA");
        assert_eq!(name_of(&f.scene, f.child_b), "ChildB");
        assert_eq!(report.renamed, 2);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn test_absent_entries_are_left_alone() {
        let mut f = fixture();
        let nodes = vec![
            entry("A2", "ChildA", vec![]),
            entry("G2", "ChildA/GrandChild", vec![]),
        ];

        // The grandchild entry comes after its parent's rename, so its stored path is stale.
        let report = apply_structure_updates(&mut f.scene, f.root, &nodes);

        assert_eq!(name_of(&f.scene, f.child_a), "A2");
        assert_eq!(name_of(&f.scene, f.grand_child), "GrandChild");
        assert_eq!(name_of(&f.scene, f.child_b), "ChildB");
        assert_eq!(report.unresolved, vec!["ChildA/GrandChild".to_string()]);
    }

    #[test]
    fn test_unresolved_path_does_not_touch_others() {
        let mut f = fixture();
        let nodes = vec![
            entry("NonExistent", "Scene/Ghost", vec![]),
            entry("RenamedB", "Scene/ChildB", vec![]),
        ];

        let report = apply_structure_updates(&mut f.scene, f.root, &nodes);

        assert_eq!(report.unresolved, vec!["Scene/Ghost".to_string()]);
        assert_eq!(name_of(&f.scene, f.child_a), "ChildA");
        assert_eq!(name_of(&f.scene, f.grand_child), "GrandChild");
        assert_eq!(name_of(&f.scene, f.child_b), "RenamedB");
    }

    #[test]
    fn test_parse_rejects_bad_shapes() {
        let valid = r#"[{"name":"A","path":"A","type":"Mesh","size":null,
            "matrix":[1,0,0,0,0,1,0,0,0,0,1,0,0,0,0,1],"children":[]}]"#;
        let nodes = parse_structure(valid).unwrap();
        assert_eq!(nodes[0].type_, "Mesh");
        assert_eq!(nodes[0].matrix[15], 1.0);

        let short_matrix = r#"[{"name":"A","path":"A","type":"Mesh","size":null,
            "matrix":[1,0,0],"children":[]}]"#;
        assert!(matches!(
            parse_structure(short_matrix),
            Err(StructureError::Validation(_))
        ));

        let missing_size = r#"[{"name":"A","path":"A","type":"Mesh",
            "matrix":[1,0,0,0,0,1,0,0,0,0,1,0,0,0,0,1],"children":[]}]"#;
        assert!(parse_structure(missing_size).is_err());

        let bad_size = r#"[{"name":"A","path":"A","type":"Mesh","size":{"x":1},
            "matrix":[1,0,0,0,0,1,0,0,0,0,1,0,0,0,0,1],"children":[]}]"#;
        assert!(parse_structure(bad_size).is_err());

        assert!(parse_structure(r#"{"name":"A"}"#).is_err());
    }
}
