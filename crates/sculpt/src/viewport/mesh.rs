use glam::{Mat4, Vec3};
use shared::{Primitive, MAX_SEGMENTS};

/// CPU-side indexed triangle mesh in local or world space.
///
/// Vertices are welded (shared between adjacent triangles) and triangles wind
/// counter-clockwise when seen from outside.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    /// One normal per position
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build a mesh and compute its vertex normals
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        let mut mesh = Self {
            positions,
            normals: Vec::new(),
            indices,
        };
        mesh.recompute_normals();
        mesh
    }

    /// Build from flat `[x, y, z, ...]` buffers as returned by the CSG kernel
    pub fn from_flat(vertices: &[f32], indices: &[u32]) -> Self {
        let positions = vertices
            .chunks_exact(3)
            .map(|c| Vec3::new(c[0], c[1], c[2]))
            .collect();
        Self::new(positions, indices.to_vec())
    }

    /// Flat `[x, y, z, ...]` position buffer
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| [p.x, p.y, p.z]).collect()
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Corner positions of triangle `tri`
    pub fn triangle(&self, tri: usize) -> [Vec3; 3] {
        let i0 = self.indices[tri * 3] as usize;
        let i1 = self.indices[tri * 3 + 1] as usize;
        let i2 = self.indices[tri * 3 + 2] as usize;
        [self.positions[i0], self.positions[i1], self.positions[i2]]
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        (0..self.triangle_count()).map(move |t| self.triangle(t))
    }

    /// Area-weighted smooth vertex normals
    pub fn recompute_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let (i0, i1, i2) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            let p0 = self.positions[i0];
            let face = (self.positions[i1] - p0).cross(self.positions[i2] - p0);
            normals[i0] += face;
            normals[i1] += face;
            normals[i2] += face;
        }
        for n in &mut normals {
            *n = n.normalize_or_zero();
        }
        self.normals = normals;
    }

    /// Copy with every position mapped through `matrix`.
    /// Mirroring transforms flip the winding back to outward-facing.
    pub fn transformed(&self, matrix: &Mat4) -> MeshData {
        let positions = self
            .positions
            .iter()
            .map(|p| matrix.transform_point3(*p))
            .collect();

        let mut indices = self.indices.clone();
        if matrix.determinant() < 0.0 {
            for tri in indices.chunks_exact_mut(3) {
                tri.swap(1, 2);
            }
        }

        MeshData::new(positions, indices)
    }

    /// Append another mesh, offsetting its indices
    pub fn append(&mut self, other: &MeshData) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}

/// Tessellate a primitive into a welded local-space mesh
pub fn tessellate(primitive: &Primitive) -> MeshData {
    match primitive {
        Primitive::Box {
            width,
            height,
            depth,
        } => cube(*width as f32, *height as f32, *depth as f32),
        Primitive::Sphere {
            radius,
            width_segments,
            height_segments,
        } => sphere(*radius as f32, *width_segments, *height_segments),
        Primitive::Cylinder {
            radius_top,
            radius_bottom,
            height,
            radial_segments,
        } => frustum(
            *radius_top as f32,
            *radius_bottom as f32,
            *height as f32,
            *radial_segments,
        ),
        Primitive::Cone {
            radius,
            height,
            radial_segments,
        } => frustum(0.0, *radius as f32, *height as f32, *radial_segments),
        Primitive::Torus {
            radius,
            tube,
            radial_segments,
            tubular_segments,
        } => torus(
            *radius as f32,
            *tube as f32,
            *radial_segments,
            *tubular_segments,
        ),
        Primitive::Ring {
            inner_radius,
            outer_radius,
            theta_segments,
        } => ring(*inner_radius as f32, *outer_radius as f32, *theta_segments),
    }
}

/// Axis-aligned box centered at the origin, 8 shared corners
pub fn cube(w: f32, h: f32, d: f32) -> MeshData {
    let (hw, hh, hd) = (w * 0.5, h * 0.5, d * 0.5);

    // Corner index bits: x | y << 1 | z << 2, bit set = positive side
    let positions = (0..8u32)
        .map(|i| {
            Vec3::new(
                if i & 1 != 0 { hw } else { -hw },
                if i & 2 != 0 { hh } else { -hh },
                if i & 4 != 0 { hd } else { -hd },
            )
        })
        .collect();

    let faces: [[u32; 4]; 6] = [
        [4, 5, 7, 6], // +Z
        [1, 0, 2, 3], // -Z
        [1, 3, 7, 5], // +X
        [0, 4, 6, 2], // -X
        [2, 6, 7, 3], // +Y
        [0, 1, 5, 4], // -Y
    ];

    let mut indices = Vec::with_capacity(36);
    for [a, b, c, d] in faces {
        indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    MeshData::new(positions, indices)
}

/// UV sphere with single-vertex poles
pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let w = width_segments.clamp(3, MAX_SEGMENTS);
    let h = height_segments.clamp(2, MAX_SEGMENTS);

    let mut positions = Vec::with_capacity(w as usize * (h as usize - 1) + 2);
    positions.push(Vec3::new(0.0, radius, 0.0));
    for r in 1..h {
        let phi = std::f32::consts::PI * r as f32 / h as f32;
        let (sp, cp) = phi.sin_cos();
        for s in 0..w {
            let theta = std::f32::consts::TAU * s as f32 / w as f32;
            let (st, ct) = theta.sin_cos();
            positions.push(Vec3::new(sp * ct, cp, sp * st) * radius);
        }
    }
    positions.push(Vec3::new(0.0, -radius, 0.0));

    let north = 0u32;
    let south = (positions.len() - 1) as u32;
    let ring = |r: u32, s: u32| 1 + (r - 1) * w + (s % w);

    let mut indices = Vec::new();
    for s in 0..w {
        indices.extend_from_slice(&[north, ring(1, s + 1), ring(1, s)]);
    }
    for r in 1..h - 1 {
        for s in 0..w {
            let a = ring(r, s);
            let b = ring(r, s + 1);
            let c = ring(r + 1, s);
            let d = ring(r + 1, s + 1);
            indices.extend_from_slice(&[a, d, c, a, b, d]);
        }
    }
    for s in 0..w {
        indices.extend_from_slice(&[ring(h - 1, s), ring(h - 1, s + 1), south]);
    }

    MeshData::new(positions, indices)
}

/// Capped frustum along Y. A zero radius collapses that end to an apex (cone).
pub fn frustum(radius_top: f32, radius_bottom: f32, height: f32, segments: u32) -> MeshData {
    let n = segments.clamp(3, MAX_SEGMENTS);
    let hh = height * 0.5;
    let mut positions = Vec::new();

    let rim = |radius: f32, y: f32, positions: &mut Vec<Vec3>| -> (Vec<u32>, bool) {
        if radius <= f32::EPSILON {
            positions.push(Vec3::new(0.0, y, 0.0));
            return (vec![(positions.len() - 1) as u32; n as usize], true);
        }
        let start = positions.len() as u32;
        for j in 0..n {
            let theta = std::f32::consts::TAU * j as f32 / n as f32;
            let (s, c) = theta.sin_cos();
            positions.push(Vec3::new(radius * c, y, radius * s));
        }
        ((start..start + n).collect(), false)
    };

    let (top, top_apex) = rim(radius_top, hh, &mut positions);
    let (bottom, bottom_apex) = rim(radius_bottom, -hh, &mut positions);

    let mut indices = Vec::new();
    let push_tri = |tri: [u32; 3], indices: &mut Vec<u32>| {
        if tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2] {
            indices.extend_from_slice(&tri);
        }
    };

    for j in 0..n as usize {
        let k = (j + 1) % n as usize;
        let (a, b, c, d) = (top[j], top[k], bottom[j], bottom[k]);
        push_tri([a, d, c], &mut indices);
        push_tri([a, b, d], &mut indices);
    }

    if !top_apex {
        positions.push(Vec3::new(0.0, hh, 0.0));
        let center = (positions.len() - 1) as u32;
        for j in 0..n as usize {
            let k = (j + 1) % n as usize;
            push_tri([center, top[k], top[j]], &mut indices);
        }
    }
    if !bottom_apex {
        positions.push(Vec3::new(0.0, -hh, 0.0));
        let center = (positions.len() - 1) as u32;
        for j in 0..n as usize {
            let k = (j + 1) % n as usize;
            push_tri([center, bottom[j], bottom[k]], &mut indices);
        }
    }

    MeshData::new(positions, indices)
}

/// Torus in the local XY plane (axis = Z)
pub fn torus(radius: f32, tube: f32, radial_segments: u32, tubular_segments: u32) -> MeshData {
    let radial = radial_segments.clamp(3, MAX_SEGMENTS);
    let tubular = tubular_segments.clamp(3, MAX_SEGMENTS);

    let mut positions = Vec::with_capacity(radial as usize * tubular as usize);
    for i in 0..tubular {
        let u = std::f32::consts::TAU * i as f32 / tubular as f32;
        let (su, cu) = u.sin_cos();
        for j in 0..radial {
            let v = std::f32::consts::TAU * j as f32 / radial as f32;
            let (sv, cv) = v.sin_cos();
            let rim = radius + tube * cv;
            positions.push(Vec3::new(rim * cu, rim * su, tube * sv));
        }
    }

    let idx = |i: u32, j: u32| (i % tubular) * radial + (j % radial);
    let mut indices = Vec::with_capacity(radial as usize * tubular as usize * 6);
    for i in 0..tubular {
        for j in 0..radial {
            let a = idx(i, j);
            let b = idx(i, j + 1);
            let c = idx(i + 1, j);
            let d = idx(i + 1, j + 1);
            indices.extend_from_slice(&[a, c, b, b, c, d]);
        }
    }

    MeshData::new(positions, indices)
}

/// Flat annulus in the local XY plane facing +Z
pub fn ring(inner_radius: f32, outer_radius: f32, theta_segments: u32) -> MeshData {
    let n = theta_segments.clamp(3, MAX_SEGMENTS);
    let mut positions = Vec::with_capacity(n as usize * 2);
    for j in 0..n {
        let theta = std::f32::consts::TAU * j as f32 / n as f32;
        let (s, c) = theta.sin_cos();
        positions.push(Vec3::new(inner_radius * c, inner_radius * s, 0.0));
        positions.push(Vec3::new(outer_radius * c, outer_radius * s, 0.0));
    }

    let mut indices = Vec::with_capacity(n as usize * 6);
    for j in 0..n {
        let k = (j + 1) % n;
        let (a, b) = (j * 2, j * 2 + 1);
        let (c, d) = (k * 2, k * 2 + 1);
        indices.extend_from_slice(&[a, b, d, a, d, c]);
    }

    MeshData::new(positions, indices)
}
