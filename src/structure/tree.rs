use crate::scene_graph::{NodeKind, ObjectId, Scene};

/// UI-facing mirror of one scene object. Rebuilt after every structural change.
///
/// `id` is a handle into the scene's arena, not an owning reference: once the scene drops or
/// replaces the object, lookups through it simply fail.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectedNode {
    pub id: ObjectId,
    pub name: String,
    pub kind: NodeKind,
    pub visible: bool,
    pub children: Vec<ProjectedNode>,
}

impl ProjectedNode {
    /// Depth-first search by id.
    pub fn find(&self, id: ObjectId) -> Option<&ProjectedNode> {
        if self.id == id {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(id))
    }
}

/// Projects the children of `root`, recursively. The root itself is not part of the tree.
pub fn generate_tree_data(scene: &Scene, root: ObjectId) -> Vec<ProjectedNode> {
    scene
        .children_of(root)
        .iter()
        .filter_map(|&child_id| {
            let child = scene.get_object(child_id)?;
            Some(ProjectedNode {
                id: child_id,
                name: child.display_name().to_string(),
                kind: child.kind,
                visible: child.visible,
                children: generate_tree_data(scene, child_id),
            })
        })
        .collect()
}

/// Number of nodes in a projected forest.
pub fn count_nodes(tree: &[ProjectedNode]) -> usize {
    tree.iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}
