use std::collections::HashMap;
use std::rc::Rc;

use glam::{Quat, Vec2, Vec3};
use gltf::buffer;

use crate::error::CodecError;
use crate::scene_graph::{
    ImageSource, MaterialLibrary, MeshGeometry, NodeKind, Object3D, ObjectId, Primitive, Scene,
};

pub type Buffers<'a> = &'a [buffer::Data];

/// Required extensions whose vertex data cannot be read without a dedicated decoder.
const COMPRESSED_MESH_EXTENSIONS: &[&str] =
    &["KHR_draco_mesh_compression", "EXT_meshopt_compression"];

/// Decodes a GLB (or embedded glTF) file into a scene rooted at a `Group` for the default scene.
///
/// Images are carried as encoded bytes and never decoded.
pub fn load_glb(bytes: &[u8]) -> Result<Scene, CodecError> {
    reject_compressed_meshes(bytes)?;

    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)?;
    let buffers = gltf::import_buffers(&document, None, blob)?;
    let gltf_scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or(CodecError::NoScene)?;

    let mut scene = Scene::new();
    scene.library = Rc::new(material_library(&document, &buffers));

    let mut importer = GltfImporter::new(&buffers);
    importer.spawn_gltf_scene(&mut scene, &gltf_scene)?;

    let unsupported = document.animations().count()
        + document.skins().count()
        + document.cameras().count();
    if unsupported > 0 {
        log::warn!("{} animations, skins or cameras are not kept on export", unsupported);
    }

    log::debug!("Loaded glTF scene {:?}: {} objects", gltf_scene.name(), scene.object_count());

    Ok(scene)
}

fn reject_compressed_meshes(bytes: &[u8]) -> Result<(), CodecError> {
    let gltf = gltf::Gltf::from_slice_without_validation(bytes)?;
    let compressed = gltf
        .extensions_required()
        .find(|extension| COMPRESSED_MESH_EXTENSIONS.contains(extension));

    match compressed {
        Some(extension) => Err(CodecError::CompressedMesh(extension.to_string())),
        None => Ok(()),
    }
}

fn material_library(document: &gltf::Document, buffers: Buffers) -> MaterialLibrary {
    let json = document.as_json();

    let images = document
        .images()
        .zip(&json.images)
        .map(|(image, declared)| {
            let data = match image.source() {
                gltf::image::Source::View { view, .. } => buffers
                    .get(view.buffer().index())
                    .and_then(|buffer| buffer.0.get(view.offset()..view.offset() + view.length()))
                    .map(<[u8]>::to_vec),
                gltf::image::Source::Uri { .. } => None,
            };

            ImageSource {
                image: declared.clone(),
                data,
            }
        })
        .collect();

    MaterialLibrary {
        materials: json.materials.clone(),
        textures: json.textures.clone(),
        samplers: json.samplers.clone(),
        images,
        extensions_used: json
            .extensions_used
            .iter()
            .filter(|extension| !COMPRESSED_MESH_EXTENSIONS.contains(&extension.as_str()))
            .cloned()
            .collect(),
    }
}

struct GltfImporter<'a> {
    buffers: Buffers<'a>,
    gltf_mesh_to_geometry: HashMap<usize, MeshGeometry>,
}

impl<'a> GltfImporter<'a> {
    fn new(buffers: Buffers<'a>) -> Self {
        Self {
            buffers,
            gltf_mesh_to_geometry: HashMap::new(),
        }
    }

    fn spawn_gltf_scene(
        &mut self,
        scene: &mut Scene,
        gltf_scene: &gltf::Scene,
    ) -> Result<ObjectId, CodecError> {
        let root = scene.add_object(Object3D::group(gltf_scene.name().unwrap_or_default()));

        for node in gltf_scene.nodes() {
            self.spawn_gltf_node(scene, &node, root)?;
        }

        Ok(root)
    }

    fn spawn_gltf_node(
        &mut self,
        scene: &mut Scene,
        node: &gltf::Node,
        parent: ObjectId,
    ) -> Result<ObjectId, CodecError> {
        let mut object = Object3D::new(node.name().unwrap_or_default(), NodeKind::Object3D);
        let (translation, rotation, scale) = node.transform().decomposed();

        object.transform.set_transform(
            translation.into(),
            Quat::from_array(rotation),
            Vec3::from(scale),
        );

        if let Some(mesh) = node.mesh() {
            object.kind = NodeKind::Mesh;
            object.geometry = Some(self.geometry_for(mesh)?);
        }

        let object_id = scene.add_child(parent, object);

        for child in node.children() {
            self.spawn_gltf_node(scene, &child, object_id)?;
        }

        Ok(object_id)
    }

    /// Every node gets its own copy, even when the file instances one mesh several times.
    fn geometry_for(&mut self, mesh: gltf::Mesh) -> Result<MeshGeometry, CodecError> {
        if let Some(geometry) = self.gltf_mesh_to_geometry.get(&mesh.index()) {
            return Ok(geometry.clone());
        }

        let geometry = geometry_from_gltf(mesh.clone(), self.buffers)?;
        self.gltf_mesh_to_geometry
            .insert(mesh.index(), geometry.clone());
        Ok(geometry)
    }
}

fn geometry_from_gltf(mesh: gltf::Mesh, buffers: Buffers) -> Result<MeshGeometry, CodecError> {
    let mesh_name = mesh
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("mesh {}", mesh.index()));
    let mut primitives = Vec::new();

    for primitive in mesh.primitives() {
        let reader =
            primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));

        let positions = reader
            .read_positions()
            .ok_or_else(|| CodecError::MissingPositions(mesh_name.clone()))?
            .map(Vec3::from)
            .collect::<Vec<Vec3>>();
        let normals = reader
            .read_normals()
            .map(|normals| normals.map(Vec3::from).collect::<Vec<Vec3>>());
        let tex_coords = reader
            .read_tex_coords(0)
            .map(|tex_coords| tex_coords.into_f32().map(Vec2::from).collect::<Vec<Vec2>>());
        let indices = reader
            .read_indices()
            .map(|indices| indices.into_u32().collect::<Vec<u32>>());

        primitives.push(Primitive {
            positions,
            normals,
            tex_coords,
            indices,
            mode: primitive.mode(),
            material: primitive.material().index(),
        });
    }

    Ok(MeshGeometry {
        name: mesh.name().map(String::from),
        primitives,
    })
}
