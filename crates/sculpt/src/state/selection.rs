use serde::{Deserialize, Serialize};
use shared::ShapeId;

/// Manipulation handle kind attached to the selected shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GizmoMode {
    Translate,
    Scale,
}

/// Single-shape selection with its transform gizmo
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    attached: Option<(ShapeId, GizmoMode)>,
}

impl SelectionState {
    /// Selected shape, if any
    pub fn selected(&self) -> Option<&ShapeId> {
        self.attached.as_ref().map(|(id, _)| id)
    }

    pub fn gizmo(&self) -> Option<GizmoMode> {
        self.attached.as_ref().map(|(_, mode)| *mode)
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected().is_some_and(|s| s == id)
    }

    /// Attach the gizmo to `id`, replacing any previous selection
    pub fn attach(&mut self, id: ShapeId, mode: GizmoMode) {
        self.attached = Some((id, mode));
    }

    pub fn detach(&mut self) {
        self.attached = None;
    }

    /// Drop the selection if it refers to a shape that no longer exists
    pub fn retain(&mut self, exists: impl Fn(&str) -> bool) {
        if self.selected().is_some_and(|id| !exists(id)) {
            self.attached = None;
        }
    }
}
