use glam::Vec3;

use crate::error::EditError;
use crate::state::registry::{Geometry, MeshRegistry};
use crate::viewport::mesh::MeshData;

/// Curve a local-space mesh around the Z axis.
///
/// With `r = 1/k`: `x' = sin(x·k)·(r + y)`, `y' = cos(x·k)·(r + y) − r`, `z' = z`.
pub fn bend_mesh(mesh: &MeshData, k: f32) -> MeshData {
    if k.abs() <= f32::EPSILON {
        return mesh.clone();
    }
    let r = 1.0 / k;
    let positions = mesh
        .positions
        .iter()
        .map(|p| {
            let angle = p.x * k;
            let (s, c) = angle.sin_cos();
            Vec3::new(s * (r + p.y), c * (r + p.y) - r, p.z)
        })
        .collect();
    MeshData::new(positions, mesh.indices.clone())
}

/// Bend a shape in place. Primitives become meshes first; the transform is kept.
pub fn bend_shape(registry: &mut MeshRegistry, target: &str, k: f32) -> Result<(), EditError> {
    let shape = registry.get_mut(target).ok_or(EditError::NoTarget)?;
    let mesh = shape.local_mesh();
    if mesh.positions.is_empty() {
        return Err(EditError::InsufficientInput(
            "This design has nothing to bend.".into(),
        ));
    }
    let bent = bend_mesh(&mesh, k);
    tracing::info!("bent {} ({} vertices, k={k})", shape.name, bent.vertex_count());
    shape.geometry = Geometry::Mesh(bent);
    Ok(())
}
