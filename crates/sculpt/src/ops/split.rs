//! Planar split: clip a shape against a world-space plane into two halves.

use std::collections::HashMap;

use glam::Vec3;
use shared::ShapeId;

use crate::error::EditError;
use crate::state::registry::{Geometry, MeshRegistry, Shape};
use crate::viewport::mesh::MeshData;

/// Clip `mesh` to the half-space where `side * distances[i] >= 0`.
///
/// Edges crossing the plane are split and their new vertices shared between
/// neighbouring triangles. Each boundary loop on the plane is closed with a
/// fan cap, so clipping a closed convex section yields a closed mesh.
pub fn clip_mesh(mesh: &MeshData, distances: &[f32], side: f32) -> MeshData {
    let sd: Vec<f32> = distances.iter().map(|d| d * side).collect();

    let mut positions: Vec<Vec3> = Vec::new();
    let mut on_plane: Vec<bool> = Vec::new();
    let mut kept: HashMap<u32, u32> = HashMap::new();
    let mut crossings: HashMap<(u32, u32), u32> = HashMap::new();
    let mut indices: Vec<u32> = Vec::new();

    for tri in mesh.indices.chunks_exact(3) {
        let mut polygon: Vec<u32> = Vec::with_capacity(4);

        for k in 0..3 {
            let a = tri[k];
            let b = tri[(k + 1) % 3];
            let (da, db) = (sd[a as usize], sd[b as usize]);

            if da >= 0.0 {
                let idx = *kept.entry(a).or_insert_with(|| {
                    positions.push(mesh.positions[a as usize]);
                    on_plane.push(da == 0.0);
                    (positions.len() - 1) as u32
                });
                polygon.push(idx);
            }

            if (da > 0.0 && db < 0.0) || (da < 0.0 && db > 0.0) {
                let key = (a.min(b), b.max(a));
                let idx = *crossings.entry(key).or_insert_with(|| {
                    let (lo, hi) = (key.0 as usize, key.1 as usize);
                    let t = sd[lo] / (sd[lo] - sd[hi]);
                    positions.push(mesh.positions[lo].lerp(mesh.positions[hi], t));
                    on_plane.push(true);
                    (positions.len() - 1) as u32
                });
                polygon.push(idx);
            }
        }

        for k in 1..polygon.len().saturating_sub(1) {
            let t = [polygon[0], polygon[k], polygon[k + 1]];
            if t[0] != t[1] && t[1] != t[2] && t[0] != t[2] {
                indices.extend_from_slice(&t);
            }
        }
    }

    cap_boundary_loops(&mut positions, &mut indices, &on_plane);
    MeshData::new(positions, indices)
}

/// Close every boundary loop that lies on the clipping plane
fn cap_boundary_loops(positions: &mut Vec<Vec3>, indices: &mut Vec<u32>, on_plane: &[bool]) {
    let mut directed: HashMap<(u32, u32), usize> = HashMap::new();
    for tri in indices.chunks_exact(3) {
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            *directed.entry((a, b)).or_default() += 1;
        }
    }

    // Boundary edge a -> b has no twin b -> a
    let mut next: HashMap<u32, u32> = HashMap::new();
    for &(a, b) in directed.keys() {
        let on_cut = on_plane[a as usize] && on_plane[b as usize];
        if on_cut && !directed.contains_key(&(b, a)) {
            next.insert(a, b);
        }
    }

    let mut starts: Vec<u32> = next.keys().copied().collect();
    starts.sort_unstable();

    let mut visited: HashMap<u32, bool> = HashMap::new();
    for start in starts {
        if visited.contains_key(&start) {
            continue;
        }
        let mut ring = Vec::new();
        let mut cur = start;
        while visited.insert(cur, true).is_none() {
            ring.push(cur);
            match next.get(&cur) {
                Some(&n) => cur = n,
                None => break,
            }
        }
        if ring.len() < 3 || cur != start {
            continue;
        }

        let center = ring.iter().map(|&i| positions[i as usize]).sum::<Vec3>() / ring.len() as f32;
        positions.push(center);
        let c = (positions.len() - 1) as u32;
        for k in 0..ring.len() {
            let a = ring[k];
            let b = ring[(k + 1) % ring.len()];
            indices.extend_from_slice(&[c, b, a]);
        }
    }
}

/// Build both halves of `shape` cut by the plane through `point` with `normal`.
/// The +normal half comes first; each is pushed `separation` away from the plane.
pub fn split_halves(shape: &Shape, point: Vec3, normal: Vec3, separation: f32) -> [Shape; 2] {
    let normal = normal.normalize_or_zero();
    let matrix = shape.world_matrix();
    let local = shape.local_mesh();

    let distances: Vec<f32> = local
        .positions
        .iter()
        .map(|p| normal.dot(matrix.transform_point3(*p) - point))
        .collect();

    [1.0_f32, -1.0].map(|side| {
        let half = clip_mesh(&local, &distances, side);
        tracing::debug!("split half {side}: {} tris", half.triangle_count());

        let offset = normal * side * separation;
        let mut transform = shape.transform.clone();
        for (axis, delta) in transform.position.iter_mut().zip(offset.to_array()) {
            *axis += delta as f64;
        }

        Shape::new(shape.name.clone(), Geometry::Mesh(half), transform, shape.color)
    })
}

/// Replace `target` with its two halves. Returns the new ids.
pub fn plane_split(
    registry: &mut MeshRegistry,
    target: &str,
    point: Vec3,
    normal: Vec3,
    separation: f32,
) -> Result<Vec<ShapeId>, EditError> {
    let shape = registry.get(target).ok_or(EditError::NoTarget)?;
    let halves = split_halves(shape, point, normal, separation);
    let old = shape.id.clone();
    let ids = registry.replace(&[old], halves.into())?;
    tracing::info!("split {target} at {point:?} along {normal:?}");
    Ok(ids)
}
