use crate::config::AnalyzerConfig;
use crate::error::ExtractionError;
use crate::extraction::baker::{prepare_extraction, rotate_extracted, Axis, ExtractionData};
use crate::extraction::bundle::{package_extraction, ExtractionBundle};
use crate::scene_graph::{ObjectId, Scene};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExtractionState {
    #[default]
    Default,
    ExtractionMenu,
    PreviewLocation,
    AdjustOrientation,
}

/// Drives one extraction at a time: prepare, preview or adjust, then finalize or cancel.
///
/// Transitions that do not apply in the current state are ignored and reported as `false`.
#[derive(Debug, Default)]
pub struct ExtractionSession {
    state: ExtractionState,
    data: Option<ExtractionData>,
    config: AnalyzerConfig,
}

impl ExtractionSession {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            state: ExtractionState::Default,
            data: None,
            config,
        }
    }

    pub fn state(&self) -> ExtractionState {
        self.state
    }

    pub fn data(&self) -> Option<&ExtractionData> {
        self.data.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.state != ExtractionState::Default
    }

    /// Bakes `selected` and opens the extraction menu, replacing any extraction in flight.
    /// Without a selection this does nothing.
    pub fn start_extraction(
        &mut self,
        scene: &Scene,
        selected: Option<ObjectId>,
    ) -> Result<(), ExtractionError> {
        let Some(id) = selected else {
            return Ok(());
        };

        let data = prepare_extraction(scene, id, &self.config)?;
        if self.data.is_some() {
            log::debug!("Discarding previous extraction in flight");
        }
        self.data = Some(data);
        self.state = ExtractionState::ExtractionMenu;
        Ok(())
    }

    pub fn enter_preview_location(&mut self) -> bool {
        self.transition(ExtractionState::ExtractionMenu, ExtractionState::PreviewLocation)
    }

    pub fn enter_adjust_orientation(&mut self) -> bool {
        self.transition(ExtractionState::ExtractionMenu, ExtractionState::AdjustOrientation)
    }

    /// Quarter turn of the extracted geometry. Only while adjusting orientation.
    pub fn rotate(&mut self, axis: Axis) -> bool {
        if self.state != ExtractionState::AdjustOrientation {
            return false;
        }

        match self.data.as_mut() {
            Some(data) => {
                rotate_extracted(data, axis);
                true
            }
            None => false,
        }
    }

    /// Back to the extraction menu from orientation adjustment or location preview.
    pub fn confirm(&mut self) -> bool {
        match self.state {
            ExtractionState::AdjustOrientation | ExtractionState::PreviewLocation => {
                self.state = ExtractionState::ExtractionMenu;
                true
            }
            _ => false,
        }
    }

    /// Adjusts orientation by `rotations` in order and returns to the extraction menu.
    ///
    /// Fails on the first step the current state refuses.
    pub fn apply_orientation(&mut self, rotations: &[Axis]) -> Result<(), ExtractionError> {
        if !self.enter_adjust_orientation() {
            return Err(self.refused("adjust orientation"));
        }
        for &axis in rotations {
            if !self.rotate(axis) {
                return Err(self.refused("rotate"));
            }
        }
        if !self.confirm() {
            return Err(self.refused("confirm orientation"));
        }
        Ok(())
    }

    /// Packages the extraction and ends the session.
    ///
    /// Returns `Ok(None)` outside the extraction menu. If packaging fails the session stays
    /// in the menu with its data so the caller can retry or cancel.
    pub fn finalize(&mut self) -> Result<Option<ExtractionBundle>, ExtractionError> {
        if self.state != ExtractionState::ExtractionMenu {
            return Ok(None);
        }
        let Some(data) = self.data.as_ref() else {
            return Ok(None);
        };

        let bundle = package_extraction(data, &self.config)?;
        self.cancel();
        Ok(Some(bundle))
    }

    /// Drops any extraction data and returns to the default state.
    pub fn cancel(&mut self) {
        self.data = None;
        self.state = ExtractionState::Default;
    }

    fn refused(&self, action: &'static str) -> ExtractionError {
        ExtractionError::TransitionRefused {
            action,
            state: self.state,
        }
    }

    fn transition(&mut self, from: ExtractionState, to: ExtractionState) -> bool {
        if self.state == from && self.data.is_some() {
            self.state = to;
            true
        } else {
            false
        }
    }
}
