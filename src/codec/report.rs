use serde::Serialize;

use crate::error::CodecError;

/// Summary statistics of an encoded scene file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneReport {
    pub total_size_bytes: usize,
    pub mesh_count: usize,
    pub draw_calls: usize,
    pub texture_count: usize,
    pub material_count: usize,
}

impl SceneReport {
    pub fn from_glb(bytes: &[u8]) -> Result<Self, CodecError> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        Ok(Self::from_document(&gltf.document, bytes.len()))
    }

    pub fn from_document(document: &gltf::Document, total_size_bytes: usize) -> Self {
        Self {
            total_size_bytes,
            mesh_count: document.meshes().len(),
            draw_calls: document
                .meshes()
                .map(|mesh| mesh.primitives().len())
                .sum(),
            texture_count: document.textures().len(),
            material_count: document.materials().len(),
        }
    }
}
