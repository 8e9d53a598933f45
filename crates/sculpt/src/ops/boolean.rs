//! Boolean subtraction: circular bores and sketch (freeform silhouette) cuts.

use glam::{Mat4, Quat, Vec2, Vec3};
use kurbo::{BezPath, Shape as _};
use serde::{Deserialize, Serialize};
use shared::{ShapeId, Transform};

use crate::error::EditError;
use crate::ports::CsgEvaluator;
use crate::state::registry::{Geometry, MeshRegistry, Shape};
use crate::state::settings::CarveSettings;
use crate::viewport::mesh::{frustum, MeshData};
use crate::viewport::picking::Aabb;

/// Replace `target` with `target - cutter` (world space).
///
/// `NoIntersection` leaves the registry untouched. A cut that consumes the
/// whole target removes it; the returned id is then `None`.
pub fn boolean_cut(
    registry: &mut MeshRegistry,
    csg: &dyn CsgEvaluator,
    target: &str,
    cutter: &MeshData,
) -> Result<Option<ShapeId>, EditError> {
    let shape = registry.get(target).ok_or(EditError::NoTarget)?;
    let world = shape.world_mesh();

    if !csg.intersects(&world, cutter) {
        return Err(EditError::NoIntersection);
    }

    let replacement: Vec<Shape> = csg
        .subtract(&world, cutter)
        .map(|result| {
            Shape::new(
                shape.name.clone(),
                Geometry::Mesh(result),
                Transform::new(),
                shape.color,
            )
        })
        .into_iter()
        .collect();

    let old = shape.id.clone();
    let mut ids = registry.replace(&[old], replacement)?;
    tracing::info!("carved {target} ({} result shapes)", ids.len());
    Ok(ids.pop())
}

/// Cylinder cutter centered at `point`, its axis pointing at `view_origin`
pub fn bore_cutter(point: Vec3, view_origin: Vec3, settings: &CarveSettings) -> MeshData {
    let axis = (view_origin - point).try_normalize().unwrap_or(Vec3::Y);
    let cylinder = frustum(
        settings.bore_radius,
        settings.bore_radius,
        settings.bore_length,
        settings.bore_segments,
    );
    let matrix = Mat4::from_rotation_translation(Quat::from_rotation_arc(Vec3::Y, axis), point);
    cylinder.transformed(&matrix)
}

/// Punch a circular hole through `target` at `point`
pub fn circular_bore(
    registry: &mut MeshRegistry,
    csg: &dyn CsgEvaluator,
    target: &str,
    point: Vec3,
    view_origin: Vec3,
    settings: &CarveSettings,
) -> Result<Option<ShapeId>, EditError> {
    let cutter = bore_cutter(point, view_origin, settings);
    boolean_cut(registry, csg, target, &cutter)
}

/// Planar silhouette of a stroke, ready to be extruded along `direction`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SketchProfile {
    /// Stroke points in the view right/up plane, relative to the first point
    pub polygon: Vec<Vec2>,
    /// Centroid of the stroke in world space
    pub center: Vec3,
    /// View direction the cutter is extruded along
    pub direction: Vec3,
}

/// Orthonormal right/up pair for a view direction
pub fn view_basis(direction: Vec3) -> (Vec3, Vec3) {
    let dir = direction.normalize_or_zero();
    let right = dir.cross(Vec3::Y).try_normalize().unwrap_or(Vec3::X);
    let up = right.cross(dir).normalize_or_zero();
    (right, up)
}

impl SketchProfile {
    /// Project a world-space stroke onto the plane facing `direction`
    pub fn from_stroke(points: &[Vec3], direction: Vec3) -> Result<Self, EditError> {
        if points.len() < 3 {
            return Err(EditError::InsufficientInput(
                "Draw a more complex shape to carve!".into(),
            ));
        }
        let (right, up) = view_basis(direction);
        let origin = points[0];
        let polygon = points
            .iter()
            .map(|p| {
                let rel = *p - origin;
                Vec2::new(rel.dot(right), rel.dot(up))
            })
            .collect();
        let center = points.iter().copied().sum::<Vec3>() / points.len() as f32;

        Ok(Self {
            polygon,
            center,
            direction: direction.normalize_or_zero(),
        })
    }

    /// Same silhouette moved to a new center
    pub fn moved_to(&self, center: Vec3) -> Self {
        Self {
            center,
            ..self.clone()
        }
    }

    /// Polygon as counter-clockwise `f64` points
    fn ccw_polygon(&self) -> Vec<[f64; 2]> {
        let mut points: Vec<[f64; 2]> = self
            .polygon
            .iter()
            .map(|p| [p.x as f64, p.y as f64])
            .collect();

        let mut path = BezPath::new();
        path.move_to((points[0][0], points[0][1]));
        for p in &points[1..] {
            path.line_to((p[0], p[1]));
        }
        path.close_path();

        if path.area() < 0.0 {
            points.reverse();
        }
        points
    }
}

/// Extruded world-space cutter for a sketch profile, centered on the profile center
pub fn sketch_cutter(
    csg: &dyn CsgEvaluator,
    profile: &SketchProfile,
    settings: &CarveSettings,
) -> Result<MeshData, EditError> {
    let too_simple = || EditError::InsufficientInput("Draw a more complex shape to carve!".into());
    if profile.polygon.len() < 3 {
        return Err(too_simple());
    }

    let prism = csg
        .extrude_polygon(&profile.ccw_polygon(), settings.sketch_depth as f64)
        .ok_or_else(too_simple)?;

    let bounds = Aabb::from_mesh(&prism);
    let (right, up) = view_basis(profile.direction);
    let basis = Mat4::from_cols(
        right.extend(0.0),
        up.extend(0.0),
        (-profile.direction.normalize_or_zero()).extend(0.0),
        profile.center.extend(1.0),
    );
    let matrix = basis * Mat4::from_translation(-bounds.center());
    Ok(prism.transformed(&matrix))
}

/// Carve the profile out of every shape it overlaps. Returns how many were carved.
pub fn freeform_cut(
    registry: &mut MeshRegistry,
    csg: &dyn CsgEvaluator,
    profile: &SketchProfile,
    settings: &CarveSettings,
) -> Result<usize, EditError> {
    let cutter = sketch_cutter(csg, profile, settings)?;

    let mut carved = 0;
    for id in registry.ids() {
        match boolean_cut(registry, csg, &id, &cutter) {
            Ok(_) => carved += 1,
            Err(EditError::NoIntersection) => {}
            Err(e) => return Err(e),
        }
    }

    if carved == 0 {
        return Err(EditError::NoIntersection);
    }
    Ok(carved)
}
