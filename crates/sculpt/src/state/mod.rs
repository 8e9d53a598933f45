pub mod draw;
pub mod projects;
pub mod registry;
pub mod selection;
pub mod settings;
pub mod tool;

use glam::Vec3;

pub use draw::{CircleDraft, DrawBuffer};
pub use projects::ProjectLibrary;
pub use registry::{Geometry, MeshRegistry, Shape};
pub use selection::{GizmoMode, SelectionState};
pub use settings::EditorSettings;
pub use tool::{ToolMode, ToolState};

use crate::ops::csg::ManifoldEvaluator;
use crate::ports::{CsgEvaluator, DetachedScene, LogNotifier, Notifier, PickingPort, RayHit, ScenePort};
use crate::replay::ReplayEngine;
use crate::viewport::camera::ArcBallCamera;
use crate::viewport::picking::MeshPicker;

/// Combined editor state, owned by whoever drives the controller
pub struct AppState {
    pub registry: MeshRegistry,
    pub tool: ToolState,
    pub draw: DrawBuffer,
    /// In-progress circle-draw gesture
    pub circle_draft: Option<CircleDraft>,
    pub replay: ReplayEngine,
    pub selection: SelectionState,
    pub camera: ArcBallCamera,
    pub settings: EditorSettings,
    pub projects: ProjectLibrary,
    pub picker: Box<dyn PickingPort>,
    pub csg: Box<dyn CsgEvaluator>,
    pub notifier: Box<dyn Notifier>,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Box::new(DetachedScene), Box::new(LogNotifier), EditorSettings::load())
    }
}

impl AppState {
    /// Editor with the default picker and CSG kernel
    pub fn new(scene: Box<dyn ScenePort>, notifier: Box<dyn Notifier>, settings: EditorSettings) -> Self {
        Self {
            registry: MeshRegistry::with_scene(scene),
            tool: ToolState::default(),
            draw: DrawBuffer::default(),
            circle_draft: None,
            replay: ReplayEngine::default(),
            selection: SelectionState::default(),
            camera: ArcBallCamera::new(),
            settings,
            projects: ProjectLibrary::default(),
            picker: Box::new(MeshPicker),
            csg: Box::new(ManifoldEvaluator),
            notifier,
        }
    }

    pub fn notify(&mut self, message: &str) {
        self.notifier.notify(message);
    }

    /// Nearest shape along a world-space ray
    pub fn pick(&self, origin: Vec3, direction: Vec3) -> Option<RayHit> {
        self.picker.cast_ray(origin, direction, self.registry.all())
    }

    /// Detach the gizmo if its shape is gone
    pub fn prune_selection(&mut self) {
        let registry = &self.registry;
        self.selection.retain(|id| registry.contains(id));
    }

    /// Drop every in-progress gesture and the repeat prompt
    pub fn reset_gestures(&mut self) {
        self.selection.detach();
        self.draw.clear();
        self.circle_draft = None;
        self.replay.hide_prompt();
    }
}
