use crate::codec::{load_glb, write_scene_glb};
use crate::config::AnalyzerConfig;
use crate::error::{CodecError, ExtractionError, StructureError};
use crate::extraction::ExtractionSession;
use crate::scene_graph::{Object3D, ObjectId, Scene};
use crate::structure::{
    apply_structure_updates, generate_tree_data, parse_structure, to_export_nodes, to_json,
    ExportNode, ProjectedNode, SyncReport,
};

/// State behind one analyzer view: the loaded model, its projected tree, the current
/// selection, the last user-facing error and the extraction session.
///
/// Owned by the front end and passed to whatever needs it; there is no global instance.
#[derive(Debug, Default)]
pub struct StructureStore {
    config: AnalyzerConfig,
    model: Option<Scene>,
    tree_data: Vec<ProjectedNode>,
    selected_node_id: Option<ObjectId>,
    error: Option<String>,
    extraction: ExtractionSession,
}

impl StructureStore {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            extraction: ExtractionSession::new(config.clone()),
            config,
            ..Default::default()
        }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn model(&self) -> Option<&Scene> {
        self.model.as_ref()
    }

    pub fn model_root(&self) -> Option<ObjectId> {
        self.model.as_ref().and_then(Scene::root)
    }

    pub fn tree_data(&self) -> &[ProjectedNode] {
        &self.tree_data
    }

    pub fn selected_node_id(&self) -> Option<ObjectId> {
        self.selected_node_id
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn extraction(&self) -> &ExtractionSession {
        &self.extraction
    }

    pub fn extraction_mut(&mut self) -> &mut ExtractionSession {
        &mut self.extraction
    }

    /// Decodes `bytes` and replaces the current model. On failure the model and tree are
    /// cleared and the message is kept in [`error`](Self::error).
    pub fn load_model(&mut self, bytes: &[u8]) -> Result<(), StructureError> {
        self.error = None;

        match load_glb(bytes) {
            Ok(scene) => {
                self.set_model(scene);
                Ok(())
            }
            Err(err) => {
                self.error = Some(format!("Failed to load model: {}", err));
                self.model = None;
                self.tree_data.clear();
                Err(err.into())
            }
        }
    }

    pub fn set_model(&mut self, scene: Scene) {
        self.model = Some(scene);
        self.selected_node_id = None;
        self.extraction.cancel();
        self.refresh_tree();
    }

    /// Rebuilds the projected tree from the live hierarchy.
    pub fn refresh_tree(&mut self) {
        self.tree_data = match (self.model.as_ref(), self.model_root()) {
            (Some(scene), Some(root)) => generate_tree_data(scene, root),
            _ => Vec::new(),
        };
    }

    pub fn select_node(&mut self, id: Option<ObjectId>) {
        self.selected_node_id = id;
    }

    pub fn clear_selection(&mut self) {
        self.selected_node_id = None;
    }

    pub fn find_object_by_id(&self, id: ObjectId) -> Option<&Object3D> {
        self.model.as_ref()?.get_object(id)
    }

    /// Structure entries for the whole tree.
    pub fn export_tree(&mut self) -> Result<Vec<ExportNode>, StructureError> {
        let Some(scene) = self.model.as_ref().filter(|_| !self.tree_data.is_empty()) else {
            self.error = Some("Nothing to export: no tree data".to_string());
            return Err(StructureError::EmptyInput);
        };

        Ok(to_export_nodes(
            scene,
            &self.tree_data,
            self.config.structure_precision,
        ))
    }

    pub fn export_tree_json(&mut self) -> Result<String, StructureError> {
        let nodes = self.export_tree()?;
        Ok(to_json(&nodes).map_err(CodecError::from)?)
    }

    /// Validates `json` and applies its renames. A file that fails validation changes nothing.
    pub fn import_structure(&mut self, json: &str) -> Result<SyncReport, StructureError> {
        let root = self.model_root().ok_or(StructureError::NoModel)?;

        let nodes = match parse_structure(json) {
            Ok(nodes) => nodes,
            Err(err) => {
                self.error = Some(format!("Import failed: {}", err));
                return Err(err);
            }
        };

        let scene = self.model.as_mut().ok_or(StructureError::NoModel)?;
        let report = apply_structure_updates(scene, root, &nodes);
        self.refresh_tree();
        Ok(report)
    }

    /// The whole live hierarchy, re-encoded.
    pub fn export_model(&self) -> Result<Vec<u8>, StructureError> {
        let scene = self.model.as_ref().ok_or(StructureError::NoModel)?;
        Ok(write_scene_glb(scene)?)
    }

    /// Starts extracting the selected object. No model or no valid selection does nothing.
    pub fn start_extraction(&mut self) -> Result<(), ExtractionError> {
        let Some(scene) = self.model.as_ref() else {
            return Ok(());
        };
        let selected = self
            .selected_node_id
            .filter(|&id| scene.get_object(id).is_some());

        self.extraction.start_extraction(scene, selected)
    }

    pub fn reset(&mut self) {
        self.model = None;
        self.tree_data.clear();
        self.selected_node_id = None;
        self.error = None;
        self.extraction.cancel();
    }
}
