use gltf::json;

/// An image as declared in the source file.
#[derive(Debug, Clone)]
pub struct ImageSource {
    pub image: json::Image,
    /// Encoded bytes of an image stored in a buffer view. `None` when `image.uri` holds it.
    pub data: Option<Vec<u8>>,
}

/// Appearance data read from the source file and written back unchanged on export.
///
/// Indices between materials, textures, samplers and images are those of the source file.
#[derive(Debug, Clone, Default)]
pub struct MaterialLibrary {
    pub materials: Vec<json::Material>,
    pub textures: Vec<json::Texture>,
    pub samplers: Vec<json::texture::Sampler>,
    pub images: Vec<ImageSource>,
    pub extensions_used: Vec<String>,
}

impl MaterialLibrary {
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty() && self.textures.is_empty() && self.images.is_empty()
    }
}
