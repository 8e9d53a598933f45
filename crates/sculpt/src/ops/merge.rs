use shared::{ShapeId, Transform};

use crate::error::EditError;
use crate::state::registry::{Geometry, MeshRegistry, Shape};
use crate::viewport::mesh::MeshData;

/// Bake the listed shapes to world space and replace them with one shape.
pub fn merge(registry: &mut MeshRegistry, ids: &[ShapeId], color: u32) -> Result<ShapeId, EditError> {
    let shapes: Vec<&Shape> = ids.iter().filter_map(|id| registry.get(id)).collect();
    if shapes.len() < 2 {
        return Err(EditError::InsufficientInput(
            "At least two designs needed to connect.".into(),
        ));
    }

    let mut combined = MeshData::default();
    for shape in &shapes {
        combined.append(&shape.world_mesh());
    }
    let old: Vec<ShapeId> = shapes.iter().map(|s| s.id.clone()).collect();
    tracing::info!(
        "merging {} shapes into {} triangles",
        old.len(),
        combined.triangle_count()
    );

    let merged = Shape::new("Shape", Geometry::Mesh(combined), Transform::new(), color);
    let mut new_ids = registry.replace(&old, vec![merged])?;
    new_ids.pop().ok_or(EditError::NoTarget)
}

/// Merge every shape in the registry
pub fn merge_all(registry: &mut MeshRegistry, color: u32) -> Result<ShapeId, EditError> {
    let ids = registry.ids();
    merge(registry, &ids, color)
}
