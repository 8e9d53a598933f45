//! Shape registry: exclusive owner of every live shape.
//!
//! Each mutation is mirrored to the scene sink before the registry itself
//! changes, so a failing sink leaves both sides in agreement.

use glam::{EulerRot, Mat4, Quat, Vec3};
use shared::{Primitive, ShapeId, Transform};

use crate::error::EditError;
use crate::ports::{DetachedScene, ScenePort};
use crate::viewport::mesh::{tessellate, MeshData};

/// Shape geometry: a parametric primitive or a derived raw mesh
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Primitive(Primitive),
    Mesh(MeshData),
}

impl Geometry {
    /// Local-space triangle mesh
    pub fn to_mesh(&self) -> MeshData {
        match self {
            Geometry::Primitive(p) => tessellate(p),
            Geometry::Mesh(m) => m.clone(),
        }
    }

    pub fn primitive(&self) -> Option<&Primitive> {
        match self {
            Geometry::Primitive(p) => Some(p),
            Geometry::Mesh(_) => None,
        }
    }
}

/// Live editable shape
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub id: ShapeId,
    pub name: String,
    pub geometry: Geometry,
    pub transform: Transform,
    /// 0xRRGGBB
    pub color: u32,
}

impl Shape {
    /// New shape with a fresh uuid v4 id
    pub fn new(name: impl Into<String>, geometry: Geometry, transform: Transform, color: u32) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            geometry,
            transform,
            color,
        }
    }

    /// Local -> world matrix
    pub fn world_matrix(&self) -> Mat4 {
        transform_matrix(&self.transform)
    }

    pub fn local_mesh(&self) -> MeshData {
        self.geometry.to_mesh()
    }

    /// Mesh with the world transform baked in
    pub fn world_mesh(&self) -> MeshData {
        self.local_mesh().transformed(&self.world_matrix())
    }
}

/// Scale, then Euler XYZ rotation, then translation
pub fn transform_matrix(t: &Transform) -> Mat4 {
    let v = |a: [f64; 3]| Vec3::new(a[0] as f32, a[1] as f32, a[2] as f32);
    let r = v(t.rotation);
    Mat4::from_scale_rotation_translation(
        v(t.scale),
        Quat::from_euler(EulerRot::XYZ, r.x, r.y, r.z),
        v(t.position),
    )
}

/// Ordered collection of live shapes, mirrored into a scene sink
pub struct MeshRegistry {
    shapes: Vec<Shape>,
    scene: Box<dyn ScenePort>,
    /// Monotonically increasing version counter for cache invalidation
    version: u64,
}

impl Default for MeshRegistry {
    fn default() -> Self {
        Self::with_scene(Box::new(DetachedScene))
    }
}

impl MeshRegistry {
    pub fn with_scene(scene: Box<dyn ScenePort>) -> Self {
        Self {
            shapes: Vec::new(),
            scene,
            version: 0,
        }
    }

    /// Current registry version (increments on every mutation)
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// All shapes in insertion order
    pub fn all(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn ids(&self) -> Vec<ShapeId> {
        self.shapes.iter().map(|s| s.id.clone()).collect()
    }

    pub fn get(&self, id: &str) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    /// Mutable access; counts as a mutation
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Shape> {
        let shape = self.shapes.iter_mut().find(|s| s.id == id)?;
        self.version += 1;
        Some(shape)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Insert a shape and return its id
    pub fn add(&mut self, shape: Shape) -> Result<ShapeId, EditError> {
        self.scene.add_node(&shape)?;
        let id = shape.id.clone();
        tracing::debug!("registry add {} ({id})", shape.name);
        self.shapes.push(shape);
        self.version += 1;
        Ok(id)
    }

    /// Remove a shape; `Ok(None)` if it was not present
    pub fn remove(&mut self, id: &str) -> Result<Option<Shape>, EditError> {
        let Some(pos) = self.shapes.iter().position(|s| s.id == id) else {
            return Ok(None);
        };
        self.scene.remove_node(&self.shapes[pos].id)?;
        let shape = self.shapes.remove(pos);
        tracing::debug!("registry remove {} ({id})", shape.name);
        self.version += 1;
        Ok(Some(shape))
    }

    /// Remove `old_ids` and insert `new_shapes` as one transaction.
    /// Returns the ids of the inserted shapes.
    pub fn replace(
        &mut self,
        old_ids: &[ShapeId],
        new_shapes: Vec<Shape>,
    ) -> Result<Vec<ShapeId>, EditError> {
        for id in old_ids {
            self.remove(id)?;
        }
        new_shapes
            .into_iter()
            .map(|shape| self.add(shape))
            .collect()
    }

    /// Remove every shape
    pub fn clear(&mut self) -> Result<(), EditError> {
        while let Some(shape) = self.shapes.last() {
            self.scene.remove_node(&shape.id)?;
            self.shapes.pop();
        }
        self.version += 1;
        Ok(())
    }
}
