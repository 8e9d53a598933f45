//! Transient pointer-gesture state: the freehand draw buffer and the
//! circle-draw draft.

use glam::Vec3;

use crate::viewport::picking::Aabb;

/// Points of the current drag gesture
#[derive(Debug, Clone, Default)]
pub struct DrawBuffer {
    points: Vec<Vec3>,
    active: bool,
}

impl DrawBuffer {
    /// Start a new gesture, dropping any previous points
    pub fn begin(&mut self) {
        self.points.clear();
        self.active = true;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Append a sample. In straight-lines mode only the first and the
    /// current point are kept.
    pub fn push(&mut self, point: Vec3, straight_lines: bool) {
        if !self.active {
            return;
        }
        if straight_lines && !self.points.is_empty() {
            self.points.truncate(1);
        }
        self.points.push(point);
    }

    /// Finish the gesture; the points stay until taken or cleared
    pub fn end(&mut self) {
        self.active = false;
    }

    /// Remove and return the collected points
    pub fn take(&mut self) -> Vec<Vec3> {
        self.active = false;
        std::mem::take(&mut self.points)
    }

    pub fn clear(&mut self) {
        self.points.clear();
        self.active = false;
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Whether a finished stroke is flat enough to call for a 3D follow-up:
/// at least `min_points` samples and one bounding-box extent under `threshold`.
pub fn is_nearly_planar(points: &[Vec3], min_points: usize, threshold: f32) -> bool {
    if points.len() < min_points {
        return false;
    }
    let size = Aabb::from_points(points).size();
    size.x < threshold || size.y < threshold || size.z < threshold
}

/// In-progress circle-draw gesture
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleDraft {
    pub center: Vec3,
    pub radius: f32,
}

impl CircleDraft {
    pub fn new(center: Vec3) -> Self {
        Self {
            center,
            radius: 0.0,
        }
    }

    /// Radius from the pointer position on the horizontal plane through the center
    pub fn update(&mut self, pointer_on_plane: Vec3) {
        self.radius = pointer_on_plane.distance(self.center);
    }
}
