//! Factory functions for shapes, persisted records and gesture paths used in
//! tests and scripted sessions.

use glam::Vec3;
use shared::*;

use crate::state::registry::{Geometry, Shape};
use crate::viewport::mesh::MeshData;

// ── Shape factories ─────────────────────────────────────────────

/// Shape with a primitive at `position`
pub fn primitive_shape(name: &str, primitive: Primitive, position: [f64; 3]) -> Shape {
    Shape::new(name, Geometry::Primitive(primitive), Transform::at(position), DEFAULT_COLOR)
}

/// Unit cube at `position`
pub fn cube_at(position: [f64; 3]) -> Shape {
    primitive_shape("Cube", Primitive::unit_box(), position)
}

/// Box with explicit dimensions
pub fn box_shape(w: f64, h: f64, d: f64, position: [f64; 3]) -> Shape {
    primitive_shape(
        "Cube",
        Primitive::Box {
            width: w,
            height: h,
            depth: d,
        },
        position,
    )
}

pub fn sphere_at(radius: f64, position: [f64; 3]) -> Shape {
    primitive_shape(
        "Sphere",
        Primitive::Sphere {
            radius,
            width_segments: 32,
            height_segments: 16,
        },
        position,
    )
}

pub fn cylinder_at(radius: f64, height: f64, position: [f64; 3]) -> Shape {
    primitive_shape(
        "Cylinder",
        Primitive::Cylinder {
            radius_top: radius,
            radius_bottom: radius,
            height,
            radial_segments: 32,
        },
        position,
    )
}

/// Raw mesh shape with identity transform
pub fn mesh_shape(mesh: MeshData) -> Shape {
    Shape::new("Shape", Geometry::Mesh(mesh), Transform::new(), DEFAULT_COLOR)
}

// ── Persisted records ───────────────────────────────────────────

pub fn cube_record(position: [f64; 3], color: u32) -> ShapeRecord {
    let primitive = Primitive::unit_box();
    ShapeRecord {
        kind: primitive.kind().to_string(),
        parameters: primitive.parameters(),
        position,
        rotation: [0.0; 3],
        scale: [1.0; 3],
        color,
    }
}

/// Record of a kind the loader does not know
pub fn unknown_record(kind: &str, position: [f64; 3]) -> ShapeRecord {
    ShapeRecord {
        kind: kind.to_string(),
        parameters: Default::default(),
        position,
        rotation: [0.0; 3],
        scale: [1.0; 3],
        color: DEFAULT_COLOR,
    }
}

pub fn project(name: &str, shapes: Vec<ShapeRecord>) -> ProjectFile {
    ProjectFile::new(name, shapes)
}

// ── Gesture paths ───────────────────────────────────────────────

/// Closed square outline in the plane through `center` spanned by `right`/`up`
pub fn square_outline(center: Vec3, right: Vec3, up: Vec3, half: f32) -> Vec<Vec3> {
    [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)]
        .into_iter()
        .map(|(r, u)| center + right * (r * half) + up * (u * half))
        .collect()
}

/// `n` points sampled along a planar arc in the XZ plane
pub fn flat_arc(center: Vec3, radius: f32, n: usize) -> Vec<Vec3> {
    (0..n)
        .map(|i| {
            let a = std::f32::consts::PI * i as f32 / (n.max(2) - 1) as f32;
            center + Vec3::new(a.cos() * radius, 0.0, a.sin() * radius)
        })
        .collect()
}

/// `n` points along a rising helix
pub fn helix(center: Vec3, radius: f32, rise: f32, n: usize) -> Vec<Vec3> {
    (0..n)
        .map(|i| {
            let a = std::f32::consts::TAU * i as f32 / n.max(1) as f32;
            center + Vec3::new(a.cos() * radius, rise * i as f32 / n.max(1) as f32, a.sin() * radius)
        })
        .collect()
}
