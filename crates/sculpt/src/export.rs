use std::io::Cursor;

use shared::ShapeId;

use crate::state::registry::MeshRegistry;
use crate::viewport::mesh::MeshData;

/// Every shape's mesh with its world transform baked in, in registry order
pub fn baked_meshes(registry: &MeshRegistry) -> Vec<(ShapeId, MeshData)> {
    registry
        .all()
        .iter()
        .map(|shape| (shape.id.clone(), shape.world_mesh()))
        .collect()
}

/// Facets for `stl_io`. Normals come from the winding; degenerate facets get a
/// zero normal.
pub fn stl_triangles(meshes: &[(ShapeId, MeshData)]) -> Vec<stl_io::Triangle> {
    meshes
        .iter()
        .flat_map(|(_, mesh)| mesh.triangles())
        .map(|[a, b, c]| {
            let normal = (b - a).cross(c - a).normalize_or_zero();
            stl_io::Triangle {
                normal: stl_io::Normal::new(normal.to_array()),
                vertices: [
                    stl_io::Vertex::new(a.to_array()),
                    stl_io::Vertex::new(b.to_array()),
                    stl_io::Vertex::new(c.to_array()),
                ],
            }
        })
        .collect()
}

/// Encode meshes as one binary STL document
pub fn build_stl(meshes: &[(ShapeId, MeshData)]) -> std::io::Result<Vec<u8>> {
    let triangles = stl_triangles(meshes);
    let mut cursor = Cursor::new(Vec::new());
    stl_io::write_stl(&mut cursor, triangles.iter())?;
    let bytes = cursor.into_inner();
    tracing::debug!("STL: {} facets, {} bytes", triangles.len(), bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use shared::{Primitive, Transform};

    use super::*;
    use crate::state::registry::{Geometry, Shape};

    fn registry_with_cubes() -> MeshRegistry {
        let mut registry = MeshRegistry::default();
        for x in [0.0, 3.0] {
            registry
                .add(Shape::new(
                    "Cube",
                    Geometry::Primitive(Primitive::unit_box()),
                    Transform::at([x, 0.0, 0.0]),
                    0,
                ))
                .unwrap();
        }
        registry
    }

    #[test]
    fn baked_meshes_follow_registry_order() {
        let registry = registry_with_cubes();
        let baked = baked_meshes(&registry);
        assert_eq!(baked.len(), 2);
        assert_eq!(baked[0].0, registry.all()[0].id);
        let max_x = baked[1].1.positions.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        assert!((max_x - 3.5).abs() < 1e-6);
    }

    #[test]
    fn stl_length_matches_facet_count() {
        let registry = registry_with_cubes();
        let stl = build_stl(&baked_meshes(&registry)).unwrap();
        assert_eq!(stl.len(), 80 + 4 + 24 * 50);
        assert_eq!(u32::from_le_bytes([stl[80], stl[81], stl[82], stl[83]]), 24);
    }

    #[test]
    fn stl_reads_back_with_world_positions() {
        let registry = registry_with_cubes();
        let stl = build_stl(&baked_meshes(&registry)).unwrap();
        let mesh = stl_io::read_stl(&mut Cursor::new(stl)).unwrap();
        assert_eq!(mesh.faces.len(), 24);
        let max_x = mesh.vertices.iter().map(|v| v[0]).fold(f32::MIN, f32::max);
        assert!((max_x - 3.5).abs() < 1e-6);
        for face in &mesh.faces {
            let n = face.normal;
            assert!(((n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn empty_scene_is_header_only() {
        assert_eq!(build_stl(&[]).unwrap().len(), 84);
    }
}
