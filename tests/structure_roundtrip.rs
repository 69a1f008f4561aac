use std::io::{Cursor, Read};

use approx::assert_abs_diff_eq;
use glam::{Quat, Vec3};

use structure_analyzer::codec::{load_glb, write_scene_glb};
use structure_analyzer::extraction::{Axis, ExtractionMetadata, ExtractionState};
use structure_analyzer::scene_graph::{MeshGeometry, Object3D, Primitive, Scene, Transform};
use structure_analyzer::structure::{
    apply_structure_updates, bounding_size, find_object_by_path, generate_tree_data,
    parse_structure, to_export_nodes, to_json, STRUCTURE_PRECISION,
};
use structure_analyzer::{AnalyzerConfig, StructureStore};

fn cube(half: f32) -> MeshGeometry {
    let mut positions = Vec::new();
    for x in [-half, half] {
        for y in [-half, half] {
            for z in [-half, half] {
                positions.push(Vec3::new(x, y, z));
            }
        }
    }
    MeshGeometry::new(vec![Primitive {
        normals: Some(vec![Vec3::Y; positions.len()]),
        positions,
        tex_coords: None,
        indices: Some(vec![0, 1, 2, 2, 1, 3]),
        ..Default::default()
    }])
}

/// Scene/Vehicle(translated, rotated)/{Wheel, Body/Seat}, Scene/Ground
fn vehicle_scene() -> Scene {
    let mut scene = Scene::new();
    let root = scene.add_object(Object3D::group("Scene"));
    let vehicle = scene.add_child(
        root,
        Object3D::group("Vehicle").with_transform(Transform::from_trs(
            Vec3::new(4.0, 0.0, -2.0),
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_4),
            Vec3::splat(0.5),
        )),
    );
    scene.add_child(
        vehicle,
        Object3D::mesh("Wheel", cube(0.5))
            .with_transform(Transform::from_translation(Vec3::new(1.0, 0.0, 0.0))),
    );
    let body = scene.add_child(vehicle, Object3D::group("Body"));
    scene.add_child(
        body,
        Object3D::mesh("Seat", cube(0.25))
            .with_transform(Transform::from_translation(Vec3::new(0.0, 1.0, 0.0))),
    );
    scene.add_child(root, Object3D::group("Ground"));
    scene
}

fn names(scene: &Scene) -> Vec<String> {
    let root = scene.root().unwrap();
    scene
        .descendants(root)
        .into_iter()
        .map(|id| scene.get_object(id).unwrap().name.clone())
        .collect()
}

#[test]
fn export_then_import_through_json_keeps_names() {
    let mut scene = vehicle_scene();
    let root = scene.root().unwrap();
    let before = names(&scene);

    let tree = generate_tree_data(&scene, root);
    let json = to_json(&to_export_nodes(&scene, &tree, STRUCTURE_PRECISION)).unwrap();
    let nodes = parse_structure(&json).unwrap();
    let report = apply_structure_updates(&mut scene, root, &nodes);

    assert_eq!(report.renamed, 0);
    assert!(report.unresolved.is_empty());
    assert_eq!(names(&scene), before);
}

#[test]
fn renaming_a_parent_and_child_in_one_file() {
    let mut scene = vehicle_scene();
    let root = scene.root().unwrap();
    let tree = generate_tree_data(&scene, root);
    let mut nodes = to_export_nodes(&scene, &tree, STRUCTURE_PRECISION);

    nodes[0].name = "Car".to_string();
    nodes[0].children[1].children[0].name = "DriverSeat".to_string();
    apply_structure_updates(&mut scene, root, &nodes);

    assert!(find_object_by_path(&scene, root, "Car/Body/DriverSeat").is_some());
    assert!(find_object_by_path(&scene, root, "Scene/Car/Wheel").is_some());
    assert!(find_object_by_path(&scene, root, "Vehicle").is_none());
    assert!(find_object_by_path(&scene, root, "Ground").is_some());
}

#[test]
fn exported_sizes_and_matrices() {
    let scene = vehicle_scene();
    let root = scene.root().unwrap();
    let tree = generate_tree_data(&scene, root);
    let nodes = to_export_nodes(&scene, &tree, STRUCTURE_PRECISION);

    let wheel = &nodes[0].children[0];
    assert_eq!(wheel.path, "Vehicle/Wheel");
    // Local matrix only: translation by (1, 0, 0).
    assert_eq!(wheel.matrix[12], 1.0);
    // Size is world space, so the vehicle's 0.5 scale shows up.
    let size = wheel.size.unwrap();
    assert_abs_diff_eq!(size.y, 0.5, epsilon = 1e-6);

    let ground = &nodes[1];
    assert!(ground.size.is_none());
    let vehicle = scene.children_of(root)[0];
    assert!(bounding_size(&scene, vehicle).is_some());
}

#[test]
fn extraction_flow_produces_restorable_bundle() {
    let encoded = write_scene_glb(&vehicle_scene()).unwrap();
    let mut store = StructureStore::new(AnalyzerConfig::default());
    store.load_model(&encoded).unwrap();

    let scene = store.model().unwrap();
    let root = store.model_root().unwrap();
    let seat = find_object_by_path(scene, root, "Scene/Vehicle/Body/Seat").unwrap();
    let seat_world = scene.world_matrix(seat).unwrap();
    let seat_corner = seat_world.transform_point3(Vec3::splat(-0.25));

    store.select_node(Some(seat));
    store.start_extraction().unwrap();
    let session = store.extraction_mut();
    assert_eq!(session.state(), ExtractionState::ExtractionMenu);

    session.enter_adjust_orientation();
    for _ in 0..4 {
        session.rotate(Axis::X);
    }
    session.confirm();
    let bundle = session.finalize().unwrap().unwrap();
    assert_eq!(bundle.file_name, "Seat.zip");

    let mut archive = zip::ZipArchive::new(Cursor::new(bundle.bytes)).unwrap();
    let mut metadata_json = String::new();
    archive
        .by_name("metadata.json")
        .unwrap()
        .read_to_string(&mut metadata_json)
        .unwrap();
    let metadata: ExtractionMetadata = serde_json::from_str(&metadata_json).unwrap();
    assert_eq!(metadata.original_path, "Scene/Vehicle/Body/Seat");
    assert_eq!(metadata.size.unit, "cm");
    assert_abs_diff_eq!(metadata.size.y, 25.0, epsilon = 1e-9);

    let mut model = Vec::new();
    archive
        .by_name("model.glb")
        .unwrap()
        .read_to_end(&mut model)
        .unwrap();
    let baked = load_glb(&model).unwrap();
    let baked_root = baked.root().unwrap();
    let baked_seat = baked.get_object(baked.children_of(baked_root)[0]).unwrap();
    let corner = baked_seat.geometry.as_ref().unwrap().primitives[0].positions[0];

    let restore = glam::Mat4::from_cols_array(&metadata.restore_matrix);
    let restored = restore.transform_point3(corner);
    assert!(
        restored.abs_diff_eq(seat_corner, 1e-4),
        "{restored} != {seat_corner}"
    );

    // The live model is untouched by baking.
    let live_seat = store.find_object_by_id(seat).unwrap();
    assert_eq!(
        live_seat.transform.translation(),
        Vec3::new(0.0, 1.0, 0.0)
    );
}
