//! Headless test harness: an `AppState` wired to a recording scene graph and
//! notification log, plus gesture helpers that stand in for the pointer.

use glam::{DVec3, Vec3};
use shared::{Primitive, ShapeId, Transform};
use tokio::sync::watch;

use crate::controller::{self, PointerRay};
use crate::error::EditError;
use crate::ops::PrimitiveKind;
use crate::persistence;
use crate::ports::{NotificationLog, SceneGraph};
use crate::replay::{self, RepeatReport};
use crate::state::{AppState, EditorSettings, Geometry, Shape, ToolMode};
use crate::validation::MeshValidator;
use crate::viewport::mesh::MeshData;

/// Headless harness: editor state plus handles on its scene sink and notifier
pub struct TestHarness {
    pub app: AppState,
    pub scene: SceneGraph,
    pub notifications: NotificationLog,
}

impl TestHarness {
    /// Empty editor with headless settings (no pause between repeats)
    pub fn new() -> Self {
        Self::with_settings(EditorSettings::headless())
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        let scene = SceneGraph::new();
        let notifications = NotificationLog::new();
        let app = AppState::new(Box::new(scene.clone()), Box::new(notifications.clone()), settings);
        Self {
            app,
            scene,
            notifications,
        }
    }

    // ── Scene manipulation ────────────────────────────────────

    /// Insert a shape directly and return its id
    pub fn add_shape(&mut self, shape: Shape) -> Result<ShapeId, EditError> {
        self.app.registry.add(shape)
    }

    /// Unit cube at `position`
    pub fn create_cube(&mut self, position: [f64; 3]) -> ShapeId {
        let shape = Shape::new(
            "Cube",
            Geometry::Primitive(Primitive::unit_box()),
            Transform::at(position),
            self.app.settings.colors.default_color,
        );
        self.add_shape(shape).unwrap_or_default()
    }

    /// Palette primitive through the controller
    pub fn add_primitive(&mut self, kind: PrimitiveKind, position: Option<Vec3>) -> Option<ShapeId> {
        controller::add_primitive(&mut self.app, kind, position).ok().flatten()
    }

    pub fn clear(&mut self) {
        let _ = controller::clear_all(&mut self.app, true);
        self.notifications.clear();
    }

    // ── Tools and gestures ────────────────────────────────────

    /// Make `mode` active without toggling it off
    pub fn set_tool(&mut self, mode: ToolMode) {
        if !self.app.tool.is_active(mode) {
            controller::toggle_tool(&mut self.app, mode);
        }
    }

    /// Press and release along `pointer`
    pub fn click(&mut self, pointer: PointerRay) -> Result<(), EditError> {
        controller::pointer_down(&mut self.app, pointer)?;
        controller::pointer_up(&mut self.app)
    }

    /// Click the top of whatever lies under `point`, looking straight down
    pub fn click_from_above(&mut self, point: Vec3) -> Result<(), EditError> {
        let height = self.app.settings.replay.probe_height;
        self.click(PointerRay::new(point + Vec3::Y * height, Vec3::NEG_Y))
    }

    /// Pointer ray along the camera forward that samples `point` at draw depth
    pub fn ray_through(&self, point: Vec3) -> PointerRay {
        let forward = self.app.camera.forward();
        let depth = self.app.settings.draw.draw_depth;
        PointerRay::new(point - forward * depth, forward)
    }

    /// Drag through world points at draw depth: down, moves, up
    pub fn stroke(&mut self, points: &[Vec3]) -> Result<(), EditError> {
        let Some((first, rest)) = points.split_first() else {
            return Ok(());
        };
        let down = self.ray_through(*first);
        controller::pointer_down(&mut self.app, down)?;
        for p in rest {
            let ray = self.ray_through(*p);
            controller::pointer_move(&mut self.app, ray);
        }
        controller::pointer_up(&mut self.app)
    }

    pub fn shapeify(&mut self) -> Option<ShapeId> {
        controller::shapeify(&mut self.app).ok().flatten()
    }

    pub fn merge_all(&mut self) -> Option<ShapeId> {
        controller::merge_all(&mut self.app).ok().flatten()
    }

    // ── Replay ────────────────────────────────────────────────

    pub fn repeat(&mut self, distance: f32) -> Result<(), EditError> {
        replay::repeat_once(&mut self.app, distance)
    }

    pub async fn repeat_many(
        &mut self,
        count: u32,
        distance: f32,
        cancel: Option<watch::Receiver<bool>>,
    ) -> Result<RepeatReport, EditError> {
        replay::repeat_many(&mut self.app, count, distance, cancel).await
    }

    // ── Inspection ────────────────────────────────────────────

    pub fn shape_count(&self) -> usize {
        self.app.registry.len()
    }

    pub fn ids(&self) -> Vec<ShapeId> {
        self.app.registry.ids()
    }

    pub fn shape(&self, id: &str) -> Option<&Shape> {
        self.app.registry.get(id)
    }

    pub fn position_of(&self, id: &str) -> Option<Vec3> {
        self.shape(id)
            .map(|s| DVec3::from_array(s.transform.position).as_vec3())
    }

    /// Registry and scene graph hold the same ids in the same order
    pub fn is_in_sync(&self) -> bool {
        self.scene.node_ids() == self.app.registry.ids()
    }

    pub fn last_notification(&self) -> Option<String> {
        self.notifications.last()
    }

    pub fn notified(&self, message: &str) -> bool {
        self.notifications.messages().iter().any(|m| m == message)
    }

    /// World-space mesh of a shape
    pub fn mesh_of(&self, id: &str) -> Option<MeshData> {
        self.shape(id).map(Shape::world_mesh)
    }

    /// Structural problems of a shape's mesh, empty when valid
    pub fn validate_mesh(&self, id: &str) -> Option<Vec<String>> {
        self.mesh_of(id).map(|mesh| MeshValidator::new(&mesh).validate_all())
    }

    // ── Persistence ───────────────────────────────────────────

    pub fn export_project_json(&self, name: &str) -> String {
        let project = persistence::to_project_file(name, &self.app.registry);
        serde_json::to_string_pretty(&project).unwrap_or_default()
    }

    pub fn load_project_json(&mut self, json: &str) -> Result<(), String> {
        persistence::load_project_json(&mut self.app.registry, json)
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}
