use glam::Vec3;

use super::mesh::MeshData;
use crate::ports::{PickingPort, RayHit};
use crate::state::registry::Shape;

/// A ray in world space
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Point at distance `t` along the ray
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_points(points: &[Vec3]) -> Self {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for p in points {
            min = min.min(*p);
            max = max.max(*p);
        }
        Self { min, max }
    }

    pub fn from_mesh(data: &MeshData) -> Self {
        Self::from_points(&data.positions)
    }

    /// Center of the bounding box
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Extent along each axis (zero for an empty box)
    pub fn size(&self) -> Vec3 {
        (self.max - self.min).max(Vec3::ZERO)
    }
}

/// Ray-AABB intersection using the slab method.
/// Returns the distance along the ray to the nearest hit, or None.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb) -> Option<f32> {
    let inv_dir = Vec3::new(
        1.0 / ray.direction.x,
        1.0 / ray.direction.y,
        1.0 / ray.direction.z,
    );

    let t1 = (aabb.min - ray.origin) * inv_dir;
    let t2 = (aabb.max - ray.origin) * inv_dir;

    // NaN from 0 * inf (ray on a slab boundary) must not reject the box
    let lo = t1.min(t2);
    let hi = t1.max(t2);
    let tmin = [lo.x, lo.y, lo.z]
        .into_iter()
        .filter(|t| !t.is_nan())
        .fold(f32::NEG_INFINITY, f32::max);
    let tmax = [hi.x, hi.y, hi.z]
        .into_iter()
        .filter(|t| !t.is_nan())
        .fold(f32::INFINITY, f32::min);

    if tmax < 0.0 || tmin > tmax {
        return None;
    }

    Some(if tmin < 0.0 { tmax } else { tmin })
}

/// Möller-Trumbore ray-triangle intersection algorithm.
/// Returns the distance along the ray if hit, or None if no intersection.
pub fn ray_triangle_intersect(ray: &Ray, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;

    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    // Intersection is behind ray origin
    if t > EPSILON {
        Some(t)
    } else {
        None
    }
}

/// Distance to the nearest triangle of `mesh` hit by the ray
pub fn pick_triangle(ray: &Ray, mesh: &MeshData) -> Option<f32> {
    mesh.triangles()
        .filter_map(|[v0, v1, v2]| ray_triangle_intersect(ray, v0, v1, v2))
        .min_by(f32::total_cmp)
}

/// Intersection of the ray with the plane through `point` with `normal`
pub fn ray_plane(ray: &Ray, point: Vec3, normal: Vec3) -> Option<Vec3> {
    let denom = ray.direction.dot(normal);
    if denom.abs() < 1e-6 {
        return None;
    }
    let t = (point - ray.origin).dot(normal) / denom;
    if t < 0.0 {
        return None;
    }
    Some(ray.at(t))
}

/// Default picker: world-space AABB prefilter, then exact triangle test
#[derive(Debug, Default)]
pub struct MeshPicker;

impl PickingPort for MeshPicker {
    fn cast_ray(&self, origin: Vec3, direction: Vec3, candidates: &[Shape]) -> Option<RayHit> {
        let ray = Ray::new(origin, direction);
        let mut best: Option<RayHit> = None;

        for shape in candidates {
            let mesh = shape.world_mesh();
            if mesh.is_empty() || ray_aabb(&ray, &Aabb::from_mesh(&mesh)).is_none() {
                continue;
            }
            if let Some(dist) = pick_triangle(&ray, &mesh) {
                if best.as_ref().map_or(true, |b| dist < b.distance) {
                    best = Some(RayHit {
                        shape_id: shape.id.clone(),
                        point: ray.at(dist),
                        distance: dist,
                    });
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use shared::{Primitive, Transform};

    use super::*;
    use crate::state::registry::Geometry;

    fn cube_at(pos: [f64; 3]) -> Shape {
        Shape::new(
            "Cube",
            Geometry::Primitive(Primitive::unit_box()),
            Transform::at(pos),
            0,
        )
    }

    #[test]
    fn test_ray_aabb_hit_and_miss() {
        let aabb = Aabb {
            min: Vec3::splat(-1.0),
            max: Vec3::splat(1.0),
        };
        let hit = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!((ray_aabb(&hit, &aabb).unwrap() - 4.0).abs() < 1e-5);

        let miss = Ray::new(Vec3::new(3.0, 0.0, 5.0), Vec3::NEG_Z);
        assert!(ray_aabb(&miss, &aabb).is_none());
    }

    #[test]
    fn test_ray_triangle_intersect() {
        let ray = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::NEG_Z);
        let t = ray_triangle_intersect(&ray, Vec3::ZERO, Vec3::X, Vec3::Y);
        assert!((t.unwrap() - 1.0).abs() < 1e-6);

        let behind = Ray::new(Vec3::new(0.2, 0.2, 1.0), Vec3::Z);
        assert!(ray_triangle_intersect(&behind, Vec3::ZERO, Vec3::X, Vec3::Y).is_none());
    }

    #[test]
    fn test_picker_returns_nearest_shape() {
        let near = cube_at([0.0, 0.0, 2.0]);
        let far = cube_at([0.0, 0.0, -2.0]);
        let shapes = vec![far.clone(), near.clone()];

        let hit = MeshPicker
            .cast_ray(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z, &shapes)
            .unwrap();
        assert_eq!(hit.shape_id, near.id);
        assert!((hit.point.z - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_picker_straight_down_probe() {
        let shapes = vec![cube_at([0.0, 0.5, 0.0])];
        let hit = MeshPicker
            .cast_ray(Vec3::new(0.1, 10.5, 0.1), Vec3::NEG_Y, &shapes)
            .unwrap();
        assert!((hit.point.y - 1.0).abs() < 1e-4);

        let miss = MeshPicker.cast_ray(Vec3::new(3.0, 10.5, 0.0), Vec3::NEG_Y, &shapes);
        assert!(miss.is_none());
    }

    #[test]
    fn test_ray_plane_ground() {
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::new(1.0, -1.0, 0.0));
        let p = ray_plane(&ray, Vec3::ZERO, Vec3::Y).unwrap();
        assert!((p - Vec3::new(5.0, 0.0, 0.0)).length() < 1e-4);
        let up = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y);
        assert!(ray_plane(&up, Vec3::ZERO, Vec3::Y).is_none());
    }
}
