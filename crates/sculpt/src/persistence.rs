//! Project serialization: registry <-> versioned `ProjectFile`.

use shared::{Primitive, ProjectFile, ShapeRecord, SCHEMA_VERSION};

use crate::error::PersistenceError;
use crate::state::registry::{Geometry, MeshRegistry, Shape};

/// Kind stored for derived meshes; it has no loadable primitive
pub const MESH_KIND: &str = "Mesh";

/// Display name for a shape of the given primitive
pub fn primitive_display_name(primitive: &Primitive) -> &'static str {
    match primitive {
        Primitive::Box { .. } => "Cube",
        Primitive::Sphere { .. } => "Sphere",
        Primitive::Cylinder { .. } => "Cylinder",
        Primitive::Cone { .. } => "Cone",
        Primitive::Torus { .. } => "Circle",
        Primitive::Ring { .. } => "Ring",
    }
}

pub fn shape_record(shape: &Shape) -> ShapeRecord {
    let (kind, parameters) = match &shape.geometry {
        Geometry::Primitive(p) => (p.kind().to_string(), p.parameters()),
        Geometry::Mesh(_) => (MESH_KIND.to_string(), Default::default()),
    };
    ShapeRecord {
        kind,
        parameters,
        position: shape.transform.position,
        rotation: shape.transform.rotation,
        scale: shape.transform.scale,
        color: shape.color,
    }
}

/// Snapshot of every shape in registry order
pub fn to_project_file(name: &str, registry: &MeshRegistry) -> ProjectFile {
    ProjectFile::new(name, registry.all().iter().map(shape_record).collect())
}

/// Parse and version-check a project document
pub fn parse_project(json: &str) -> Result<ProjectFile, PersistenceError> {
    let project: ProjectFile = serde_json::from_str(json)?;
    if project.version > SCHEMA_VERSION {
        return Err(PersistenceError::UnsupportedVersion {
            found: project.version,
            supported: SCHEMA_VERSION,
        });
    }
    Ok(project)
}

/// Rebuild a live shape. Unknown kinds become a unit box at the stored transform.
pub fn restore_shape(record: &ShapeRecord) -> Shape {
    let primitive = Primitive::from_persisted(&record.kind, &record.parameters).unwrap_or_else(|| {
        tracing::warn!("Unknown persisted kind {:?}, loading a unit box", record.kind);
        Primitive::unit_box()
    });
    Shape::new(
        primitive_display_name(&primitive),
        Geometry::Primitive(primitive),
        record.transform(),
        record.color,
    )
}

/// Replace the registry contents with the project's shapes
pub fn load_project(registry: &mut MeshRegistry, project: &ProjectFile) -> Result<usize, PersistenceError> {
    registry.clear()?;
    for record in &project.shapes {
        registry.add(restore_shape(record))?;
    }
    tracing::info!("loaded {:?}: {} shapes", project.name, project.shapes.len());
    Ok(project.shapes.len())
}

/// Parse `json` and load it into the registry
pub fn load_project_json(registry: &mut MeshRegistry, json: &str) -> Result<ProjectFile, PersistenceError> {
    let project = parse_project(json)?;
    load_project(registry, &project)?;
    Ok(project)
}
