use std::borrow::Cow;
use std::collections::BTreeMap;

use glam::{Quat, Vec2, Vec3};
use gltf::json;
use gltf::json::validation::{Checked::Valid, USize64};

use crate::error::CodecError;
use crate::math::AABB;
use crate::scene_graph::{MaterialLibrary, MeshGeometry, ObjectId, Scene};

/// Encodes every root of `scene` as a GLB. Each root acts as the glTF scene container:
/// its children become the scene's top-level nodes and its name becomes the scene name.
pub fn write_scene_glb(scene: &Scene) -> Result<Vec<u8>, CodecError> {
    let mut writer = GlbWriter::new(scene);

    for root in scene.roots() {
        let nodes = scene
            .children_of(root)
            .iter()
            .map(|&child| writer.push_node(child))
            .collect::<Result<Vec<_>, _>>()?;
        let name = scene
            .get_object(root)
            .map(|object| object.name.clone())
            .filter(|name| !name.is_empty());
        writer.push_scene(name, nodes);
    }

    writer.finish()
}

/// Encodes the subtree at `id` as a GLB whose only top-level node is `id` itself.
pub fn write_subtree_glb(scene: &Scene, id: ObjectId) -> Result<Vec<u8>, CodecError> {
    let mut writer = GlbWriter::new(scene);
    let node = writer.push_node(id)?;
    writer.push_scene(None, vec![node]);
    writer.finish()
}

struct GlbWriter<'a> {
    scene: &'a Scene,
    root: json::Root,
    bin: Vec<u8>,
}

impl<'a> GlbWriter<'a> {
    fn new(scene: &'a Scene) -> Self {
        Self {
            scene,
            root: json::Root::default(),
            bin: Vec::new(),
        }
    }

    fn push_scene(&mut self, name: Option<String>, nodes: Vec<json::Index<json::Node>>) {
        let index = json::Index::new(self.root.scenes.len() as u32);
        self.root.scenes.push(json::Scene {
            extensions: Default::default(),
            extras: Default::default(),
            name,
            nodes,
        });

        if self.root.scene.is_none() {
            self.root.scene = Some(index);
        }
    }

    fn push_node(&mut self, id: ObjectId) -> Result<json::Index<json::Node>, CodecError> {
        let scene = self.scene;
        let object = scene.get_object(id).ok_or(CodecError::ObjectNotFound)?;

        let children = object
            .child_ids
            .iter()
            .map(|&child| self.push_node(child))
            .collect::<Result<Vec<_>, _>>()?;

        let mesh = object
            .geometry
            .as_ref()
            .map(|geometry| self.push_mesh(geometry));

        let transform = &object.transform;
        let translation = transform.translation();
        let rotation = transform.rotation();
        let scale = transform.scale();

        let node = json::Node {
            children: (!children.is_empty()).then_some(children),
            mesh,
            name: (!object.name.is_empty()).then(|| object.name.clone()),
            translation: (translation != Vec3::ZERO).then(|| translation.to_array()),
            rotation: (rotation != Quat::IDENTITY)
                .then(|| json::scene::UnitQuaternion(rotation.to_array())),
            scale: (scale != Vec3::ONE).then(|| scale.to_array()),
            ..Default::default()
        };

        let index = json::Index::new(self.root.nodes.len() as u32);
        self.root.nodes.push(node);
        Ok(index)
    }

    fn push_mesh(&mut self, geometry: &MeshGeometry) -> json::Index<json::Mesh> {
        let mut primitives = Vec::with_capacity(geometry.primitives.len());

        for primitive in &geometry.primitives {
            let mut attributes = BTreeMap::new();

            let bounds = AABB::from_points(primitive.positions.iter().copied());
            let positions = self.push_vec3_accessor(&primitive.positions, Some(bounds));
            attributes.insert(Valid(json::mesh::Semantic::Positions), positions);

            if let Some(normals) = &primitive.normals {
                let normals = self.push_vec3_accessor(normals, None);
                attributes.insert(Valid(json::mesh::Semantic::Normals), normals);
            }

            if let Some(tex_coords) = &primitive.tex_coords {
                let tex_coords = self.push_vec2_accessor(tex_coords);
                attributes.insert(Valid(json::mesh::Semantic::TexCoords(0)), tex_coords);
            }

            let indices = primitive
                .indices
                .as_ref()
                .map(|indices| self.push_index_accessor(indices));

            let material = primitive
                .material
                .filter(|&material| material < self.scene.library.materials.len())
                .map(|material| json::Index::new(material as u32));

            primitives.push(json::mesh::Primitive {
                attributes,
                extensions: Default::default(),
                extras: Default::default(),
                indices,
                material,
                mode: Valid(primitive.mode),
                targets: None,
            });
        }

        let index = json::Index::new(self.root.meshes.len() as u32);
        self.root.meshes.push(json::Mesh {
            extensions: Default::default(),
            extras: Default::default(),
            name: geometry.name.clone(),
            primitives,
            weights: None,
        });
        index
    }

    /// Copies materials, textures, samplers and images with their indices unchanged.
    fn push_library(&mut self, library: &MaterialLibrary) {
        self.root.materials = library.materials.clone();
        self.root.textures = library.textures.clone();
        self.root.samplers = library.samplers.clone();
        self.root.extensions_used = library.extensions_used.clone();

        for source in &library.images {
            let mut image = source.image.clone();
            image.buffer_view = source.data.as_ref().map(|data| self.push_view(data, None));
            if image.buffer_view.is_some() {
                image.uri = None;
            }
            self.root.images.push(image);
        }
    }

    fn push_view(
        &mut self,
        bytes: &[u8],
        target: Option<json::buffer::Target>,
    ) -> json::Index<json::buffer::View> {
        let offset = self.bin.len();
        self.bin.extend_from_slice(bytes);
        pad_to_four(&mut self.bin, 0);

        let index = json::Index::new(self.root.buffer_views.len() as u32);
        self.root.buffer_views.push(json::buffer::View {
            buffer: json::Index::new(0),
            byte_length: USize64::from(bytes.len()),
            byte_offset: Some(USize64::from(offset)),
            byte_stride: None,
            extensions: Default::default(),
            extras: Default::default(),
            name: None,
            target: target.map(Valid),
        });
        index
    }

    fn push_accessor(
        &mut self,
        view: json::Index<json::buffer::View>,
        count: usize,
        component_type: json::accessor::ComponentType,
        type_: json::accessor::Type,
        bounds: Option<AABB>,
    ) -> json::Index<json::Accessor> {
        let (min, max) = match bounds.filter(|bounds| !bounds.is_empty()) {
            Some(bounds) => (
                Some(json::Value::from(bounds.min.to_array().to_vec())),
                Some(json::Value::from(bounds.max.to_array().to_vec())),
            ),
            None => (None, None),
        };

        let index = json::Index::new(self.root.accessors.len() as u32);
        self.root.accessors.push(json::Accessor {
            buffer_view: Some(view),
            byte_offset: Some(USize64(0)),
            count: USize64::from(count),
            component_type: Valid(json::accessor::GenericComponentType(component_type)),
            extensions: Default::default(),
            extras: Default::default(),
            type_: Valid(type_),
            min,
            max,
            name: None,
            normalized: false,
            sparse: None,
        });
        index
    }

    fn push_vec3_accessor(
        &mut self,
        data: &[Vec3],
        bounds: Option<AABB>,
    ) -> json::Index<json::Accessor> {
        let view = self.push_view(
            bytemuck::cast_slice(data),
            Some(json::buffer::Target::ArrayBuffer),
        );
        self.push_accessor(
            view,
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec3,
            bounds,
        )
    }

    fn push_vec2_accessor(&mut self, data: &[Vec2]) -> json::Index<json::Accessor> {
        let view = self.push_view(
            bytemuck::cast_slice(data),
            Some(json::buffer::Target::ArrayBuffer),
        );
        self.push_accessor(
            view,
            data.len(),
            json::accessor::ComponentType::F32,
            json::accessor::Type::Vec2,
            None,
        )
    }

    fn push_index_accessor(&mut self, indices: &[u32]) -> json::Index<json::Accessor> {
        let view = self.push_view(
            bytemuck::cast_slice(indices),
            Some(json::buffer::Target::ElementArrayBuffer),
        );
        self.push_accessor(
            view,
            indices.len(),
            json::accessor::ComponentType::U32,
            json::accessor::Type::Scalar,
            None,
        )
    }

    fn finish(mut self) -> Result<Vec<u8>, CodecError> {
        let scene = self.scene;
        self.push_library(&scene.library);

        let has_bin = !self.bin.is_empty();
        if has_bin {
            self.root.buffers.push(json::Buffer {
                byte_length: USize64::from(self.bin.len()),
                extensions: Default::default(),
                extras: Default::default(),
                name: None,
                uri: None,
            });
        }

        let mut json_bytes = json::serialize::to_vec(&self.root)?;
        pad_to_four(&mut json_bytes, b' ');

        // 12-byte file header, then an 8-byte header per chunk.
        let mut length = 12 + 8 + json_bytes.len();
        if has_bin {
            length += 8 + self.bin.len();
        }

        let glb = gltf::binary::Glb {
            header: gltf::binary::Header {
                magic: *b"glTF",
                version: 2,
                length: u32::try_from(length).map_err(|_| CodecError::TooLarge)?,
            },
            json: Cow::Owned(json_bytes),
            bin: has_bin.then_some(Cow::Owned(self.bin)),
        };

        Ok(glb.to_vec()?)
    }
}

fn pad_to_four(bytes: &mut Vec<u8>, fill: u8) {
    while bytes.len() % 4 != 0 {
        bytes.push(fill);
    }
}
