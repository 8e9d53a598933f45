//! Interfaces to the collaborators the editing core consumes: ray picking,
//! the scene sink mirroring the registry, user notifications and the CSG
//! evaluator. Default implementations live next to the code they wrap.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use shared::ShapeId;

use crate::error::SceneError;
use crate::state::registry::Shape;
use crate::viewport::mesh::MeshData;

/// Nearest ray/shape intersection
#[derive(Debug, Clone, PartialEq)]
pub struct RayHit {
    pub shape_id: ShapeId,
    /// World-space hit point
    pub point: Vec3,
    /// Distance along the ray
    pub distance: f32,
}

/// Resolves a world-space ray to the nearest shape it hits
pub trait PickingPort {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, candidates: &[Shape]) -> Option<RayHit>;
}

/// Render-side scene graph, keyed by shape id only
pub trait ScenePort {
    fn add_node(&mut self, shape: &Shape) -> Result<(), SceneError>;
    fn remove_node(&mut self, id: &ShapeId) -> Result<(), SceneError>;
}

/// Fire-and-forget user notifications
pub trait Notifier {
    fn notify(&mut self, message: &str);
}

/// Boolean evaluator on closed triangle meshes (world space)
pub trait CsgEvaluator {
    /// Whether the two solids share any volume
    fn intersects(&self, a: &MeshData, b: &MeshData) -> bool;
    /// `target - cutter`, `None` when the result is empty
    fn subtract(&self, target: &MeshData, cutter: &MeshData) -> Option<MeshData>;
    /// Prism over a 2D polygon in the XY plane, spanning `depth` centered on Z = 0
    fn extrude_polygon(&self, polygon: &[[f64; 2]], depth: f64) -> Option<MeshData>;
}

/// Scene sink that renders nothing
#[derive(Debug, Default)]
pub struct DetachedScene;

impl ScenePort for DetachedScene {
    fn add_node(&mut self, _shape: &Shape) -> Result<(), SceneError> {
        Ok(())
    }

    fn remove_node(&mut self, _id: &ShapeId) -> Result<(), SceneError> {
        Ok(())
    }
}

/// Scene sink that records node ids.
///
/// Clones share the same node list, so a handle kept outside the registry
/// observes every mirrored mutation.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    nodes: Rc<RefCell<Vec<ShapeId>>>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Node ids in insertion order
    pub fn node_ids(&self) -> Vec<ShapeId> {
        self.nodes.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.nodes.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.borrow().is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.borrow().iter().any(|n| n == id)
    }
}

impl ScenePort for SceneGraph {
    fn add_node(&mut self, shape: &Shape) -> Result<(), SceneError> {
        let mut nodes = self.nodes.borrow_mut();
        if nodes.contains(&shape.id) {
            return Err(SceneError::DuplicateNode(shape.id.clone()));
        }
        nodes.push(shape.id.clone());
        Ok(())
    }

    fn remove_node(&mut self, id: &ShapeId) -> Result<(), SceneError> {
        let mut nodes = self.nodes.borrow_mut();
        match nodes.iter().position(|n| n == id) {
            Some(pos) => {
                nodes.remove(pos);
                Ok(())
            }
            None => Err(SceneError::MissingNode(id.clone())),
        }
    }
}

/// Notifier that emits through `tracing`
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, message: &str) {
        tracing::info!(target: "sculpt::notify", "{message}");
    }
}

/// Notifier that keeps every message. Clones share the log.
#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    messages: Rc<RefCell<Vec<String>>>,
}

impl NotificationLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.messages.borrow().last().cloned()
    }

    pub fn clear(&self) {
        self.messages.borrow_mut().clear();
    }
}

impl Notifier for NotificationLog {
    fn notify(&mut self, message: &str) {
        tracing::debug!("notify: {message}");
        self.messages.borrow_mut().push(message.to_string());
    }
}
