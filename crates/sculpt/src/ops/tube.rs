//! Freehand tube: a capped tube swept along a Catmull-Rom curve through the
//! stroke points.

use glam::Vec3;
use shared::{ShapeId, Transform};

use crate::error::EditError;
use crate::state::registry::{Geometry, MeshRegistry, Shape};
use crate::state::settings::EditorSettings;
use crate::viewport::mesh::MeshData;

/// Stroke points with consecutive duplicates removed
fn distinct_points(points: &[Vec3]) -> Vec<Vec3> {
    let mut out: Vec<Vec3> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().map_or(true, |last| last.distance_squared(*p) > 1e-12) {
            out.push(*p);
        }
    }
    out
}

/// Point on a uniform Catmull-Rom spline through `points`, `t` in [0, 1].
/// End tangents come from reflected phantom points.
pub fn catmull_rom(points: &[Vec3], t: f32) -> Vec3 {
    let n = points.len();
    match n {
        0 => return Vec3::ZERO,
        1 => return points[0],
        _ => {}
    }

    let scaled = t.clamp(0.0, 1.0) * (n - 1) as f32;
    let seg = (scaled.floor() as usize).min(n - 2);
    let u = scaled - seg as f32;

    let p1 = points[seg];
    let p2 = points[seg + 1];
    let p0 = if seg == 0 { p1 * 2.0 - p2 } else { points[seg - 1] };
    let p3 = if seg + 2 < n { points[seg + 2] } else { p2 * 2.0 - p1 };

    let u2 = u * u;
    let u3 = u2 * u;
    0.5 * ((2.0 * p1)
        + (p2 - p0) * u
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * u2
        + (3.0 * p1 - p0 - 3.0 * p2 + p3) * u3)
}

/// Unit vector perpendicular to `v`
fn any_perpendicular(v: Vec3) -> Vec3 {
    let axis = if v.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
    v.cross(axis).normalize_or_zero()
}

/// Closed tube mesh along the curve through `points`
pub fn tube_mesh(points: &[Vec3], radius: f32, tubular_segments: u32, radial_segments: u32) -> MeshData {
    let tubular = tubular_segments.max(1) as usize;
    let radial = radial_segments.max(3) as usize;

    let centers: Vec<Vec3> = (0..=tubular)
        .map(|i| catmull_rom(points, i as f32 / tubular as f32))
        .collect();

    let mut tangents = Vec::with_capacity(centers.len());
    for i in 0..centers.len() {
        let prev = centers[i.saturating_sub(1)];
        let next = centers[(i + 1).min(centers.len() - 1)];
        let t = (next - prev).try_normalize();
        let fallback = tangents.last().copied().unwrap_or(Vec3::Z);
        tangents.push(t.unwrap_or(fallback));
    }

    // Parallel-transported frame
    let mut normal = any_perpendicular(tangents[0]);
    let mut positions = Vec::with_capacity(centers.len() * radial + 2);
    for (center, tangent) in centers.iter().zip(&tangents) {
        normal = (normal - *tangent * normal.dot(*tangent))
            .try_normalize()
            .unwrap_or_else(|| any_perpendicular(*tangent));
        let binormal = tangent.cross(normal);
        for j in 0..radial {
            let v = std::f32::consts::TAU * j as f32 / radial as f32;
            let (s, c) = v.sin_cos();
            positions.push(*center + (normal * c + binormal * s) * radius);
        }
    }

    let idx = |i: usize, j: usize| (i * radial + j % radial) as u32;
    let mut indices = Vec::with_capacity(tubular * radial * 6 + radial * 6);
    for i in 0..tubular {
        for j in 0..radial {
            let a = idx(i, j);
            let b = idx(i, j + 1);
            let c = idx(i + 1, j);
            let d = idx(i + 1, j + 1);
            indices.extend_from_slice(&[a, b, c, b, d, c]);
        }
    }

    positions.push(centers[0]);
    let start = (positions.len() - 1) as u32;
    positions.push(centers[tubular]);
    let end = (positions.len() - 1) as u32;
    for j in 0..radial {
        indices.extend_from_slice(&[start, idx(0, j + 1), idx(0, j)]);
        indices.extend_from_slice(&[end, idx(tubular, j), idx(tubular, j + 1)]);
    }

    MeshData::new(positions, indices)
}

/// Turn a freehand stroke into a tube shape
pub fn add_tube(
    registry: &mut MeshRegistry,
    points: &[Vec3],
    settings: &EditorSettings,
) -> Result<ShapeId, EditError> {
    let points = distinct_points(points);
    if points.len() < 2 {
        return Err(EditError::InsufficientInput("Draw something first!".into()));
    }

    let shaping = &settings.shaping;
    let mesh = tube_mesh(
        &points,
        shaping.tube_radius,
        shaping.tube_tubular_segments,
        shaping.tube_radial_segments,
    );
    tracing::info!(
        "tube through {} points ({} tris)",
        points.len(),
        mesh.triangle_count()
    );

    registry.add(Shape::new(
        "Sketch",
        Geometry::Mesh(mesh),
        Transform::new(),
        settings.colors.tube_color,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::MeshValidator;

    #[test]
    fn spline_passes_through_endpoints() {
        let pts = [Vec3::ZERO, Vec3::new(1.0, 1.0, 0.0), Vec3::new(2.0, 0.0, 0.0)];
        assert!((catmull_rom(&pts, 0.0) - pts[0]).length() < 1e-6);
        assert!((catmull_rom(&pts, 0.5) - pts[1]).length() < 1e-6);
        assert!((catmull_rom(&pts, 1.0) - pts[2]).length() < 1e-6);
    }

    #[test]
    fn straight_tube_is_closed_and_outward() {
        let mesh = tube_mesh(&[Vec3::ZERO, Vec3::new(0.0, 0.0, 2.0)], 0.1, 64, 8);
        let v = MeshValidator::new(&mesh);
        assert!(v.validate_all().is_empty());
        assert!(v.is_closed());
        assert!(v.signed_volume() > 0.0);
        assert!((v.dimensions()[2] - 2.0).abs() < 1e-4);
    }

    #[test]
    fn tube_needs_two_distinct_points() {
        let mut registry = MeshRegistry::default();
        let settings = EditorSettings::default();
        let err = add_tube(&mut registry, &[Vec3::ONE, Vec3::ONE], &settings).unwrap_err();
        assert_eq!(err, EditError::InsufficientInput("Draw something first!".into()));
        assert!(registry.is_empty());
    }

    #[test]
    fn tube_uses_sketch_color() {
        let mut registry = MeshRegistry::default();
        let settings = EditorSettings::default();
        let id = add_tube(
            &mut registry,
            &[Vec3::ZERO, Vec3::X, Vec3::new(1.0, 1.0, 0.0)],
            &settings,
        )
        .unwrap();
        let shape = registry.get(&id).unwrap();
        assert_eq!(shape.color, 0xff00ff);
        assert_eq!(shape.name, "Sketch");
    }
}
