//! CSG evaluator backed by the vcad / manifold kernel.

use manifold_rs::{Manifold, Mesh};
use vcad::Part;

use crate::ports::CsgEvaluator;
use crate::viewport::mesh::MeshData;

/// Default `CsgEvaluator` on `vcad::Part` booleans
#[derive(Debug, Default)]
pub struct ManifoldEvaluator;

/// Convert a welded triangle mesh into a CSG part.
/// Returns None if the kernel rejects the mesh (open or non-manifold).
fn to_part(name: &str, mesh: &MeshData) -> Option<Part> {
    if mesh.is_empty() {
        return None;
    }
    let manifold = Mesh::new(&mesh.flat_positions(), &mesh.indices).to_manifold();
    if manifold.is_empty() {
        tracing::warn!(
            "{name}: mesh with {} triangles is not a closed manifold",
            mesh.triangle_count()
        );
        return None;
    }
    Some(Part::new(name, manifold))
}

/// Extract the triangle mesh of a part, None when empty
fn part_mesh(part: &Part) -> Option<MeshData> {
    let mesh = part.to_mesh();
    let positions = mesh.vertices();
    let indices = mesh.indices();

    tracing::debug!(
        "part_mesh: {} vertices, {} tris",
        positions.len() / 3,
        indices.len() / 3
    );

    if positions.is_empty() || indices.is_empty() {
        return None;
    }
    Some(MeshData::from_flat(&positions, &indices))
}

impl CsgEvaluator for ManifoldEvaluator {
    fn intersects(&self, a: &MeshData, b: &MeshData) -> bool {
        let (Some(a), Some(b)) = (to_part("target", a), to_part("cutter", b)) else {
            return false;
        };
        part_mesh(&a.intersection(&b)).is_some()
    }

    fn subtract(&self, target: &MeshData, cutter: &MeshData) -> Option<MeshData> {
        let target_part = to_part("target", target)?;
        let Some(cutter_part) = to_part("cutter", cutter) else {
            return Some(target.clone());
        };
        part_mesh(&target_part.difference(&cutter_part))
    }

    fn extrude_polygon(&self, polygon: &[[f64; 2]], depth: f64) -> Option<MeshData> {
        if polygon.len() < 3 || depth <= 0.0 {
            return None;
        }
        let polygon_data: Vec<f64> = polygon.iter().flat_map(|p| [p[0], p[1]]).collect();
        let polygon_slice: &[f64] = &polygon_data;

        let manifold = Manifold::extrude(
            &[polygon_slice],
            depth,
            1,   // n_divisions
            0.0, // twist_degrees
            1.0, // scale_top_x
            1.0, // scale_top_y
        );

        if manifold.is_empty() {
            tracing::warn!("Manifold::extrude returned empty geometry for {} points", polygon.len());
            return None;
        }

        let centered = manifold.translate(0.0, 0.0, -depth / 2.0);
        part_mesh(&Part::new("extrusion", centered))
    }
}

#[cfg(test)]
mod tests {
    use glam::{Mat4, Vec3};

    use super::*;
    use crate::validation::MeshValidator;
    use crate::viewport::mesh::cube;

    #[test]
    fn overlapping_cubes_intersect() {
        let a = cube(1.0, 1.0, 1.0);
        let b = cube(1.0, 1.0, 1.0).transformed(&Mat4::from_translation(Vec3::new(0.5, 0.0, 0.0)));
        assert!(ManifoldEvaluator.intersects(&a, &b));
    }

    #[test]
    fn disjoint_cubes_do_not_intersect() {
        let a = cube(1.0, 1.0, 1.0);
        let b = cube(1.0, 1.0, 1.0).transformed(&Mat4::from_translation(Vec3::new(5.0, 0.0, 0.0)));
        assert!(!ManifoldEvaluator.intersects(&a, &b));
    }

    #[test]
    fn subtract_removes_volume() {
        let a = cube(2.0, 2.0, 2.0);
        let b = cube(1.0, 4.0, 1.0);
        let result = ManifoldEvaluator.subtract(&a, &b).unwrap();
        let volume = MeshValidator::new(&result).signed_volume();
        assert!((volume - 6.0).abs() < 1e-3, "volume = {volume}");
    }

    #[test]
    fn extrusion_is_centered_on_z() {
        let square = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
        let prism = ManifoldEvaluator.extrude_polygon(&square, 4.0).unwrap();
        let aabb = MeshValidator::new(&prism).aabb();
        assert!((aabb.min.z + 2.0).abs() < 1e-4);
        assert!((aabb.max.z - 2.0).abs() < 1e-4);
    }
}
