use id_arena::Id;

use crate::scene_graph::geometry::MeshGeometry;
use crate::scene_graph::scene::Scene;
use crate::scene_graph::transform::Transform;

pub type ObjectId = Id<Object3D>;

/// Type tag of a node, as written to structure files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Group,
    Object3D,
    Mesh,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Group => "Group",
            NodeKind::Object3D => "Object3D",
            NodeKind::Mesh => "Mesh",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct Object3D {
    /// Display name. Not unique among siblings and may be empty.
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub geometry: Option<MeshGeometry>,
    pub visible: bool,
    pub parent_id: Option<ObjectId>,
    pub child_ids: Vec<ObjectId>,
}

impl Object3D {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Default::default()
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn mesh(name: impl Into<String>, geometry: MeshGeometry) -> Self {
        Self {
            geometry: Some(geometry),
            ..Self::new(name, NodeKind::Mesh)
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn is_mesh(&self) -> bool {
        self.kind == NodeKind::Mesh && self.geometry.is_some()
    }

    /// Name shown in trees: the type tag stands in for an empty name.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.kind.as_str()
        } else {
            &self.name
        }
    }

    pub fn parent<'a>(&self, scene: &'a Scene) -> Option<&'a Object3D> {
        self.parent_id.and_then(|id| scene.get_object(id))
    }
}

impl Default for Object3D {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: NodeKind::Object3D,
            transform: Transform::identity(),
            geometry: None,
            visible: true,
            parent_id: None,
            child_ids: Vec::new(),
        }
    }
}
