//! Triangle meshes for [`Geometry`] shapes.
//!
//! Vertices are interleaved `position.xyz, normal.xyz`; triangles wind
//! counter-clockwise when seen from the side the normal points to.

use glam::Vec3;

use crate::scene::Geometry;

/// Floats per interleaved vertex.
pub const VERTEX_STRIDE: usize = 6;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MeshData {
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn from_geometry(geometry: &Geometry) -> Self {
        let mut mesh = Self::default();
        match *geometry {
            Geometry::Plane { width, height } => {
                let (hx, hy) = (width / 2.0, height / 2.0);
                mesh.push_quad(
                    Vec3::new(-hx, -hy, 0.0),
                    Vec3::new(width, 0.0, 0.0),
                    Vec3::new(0.0, height, 0.0),
                );
            }
            Geometry::Box {
                width,
                height,
                depth,
            } => {
                let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
                let (x, y, z) = (
                    Vec3::new(width, 0.0, 0.0),
                    Vec3::new(0.0, height, 0.0),
                    Vec3::new(0.0, 0.0, depth),
                );
                mesh.push_quad(Vec3::new(-hx, -hy, hz), x, y);
                mesh.push_quad(Vec3::new(hx, -hy, -hz), -x, y);
                mesh.push_quad(Vec3::new(hx, -hy, hz), -z, y);
                mesh.push_quad(Vec3::new(-hx, -hy, -hz), z, y);
                mesh.push_quad(Vec3::new(-hx, hy, hz), x, -z);
                mesh.push_quad(Vec3::new(-hx, -hy, -hz), x, z);
            }
        }
        mesh
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / VERTEX_STRIDE
    }

    pub fn position(&self, index: u32) -> Vec3 {
        let start = index as usize * VERTEX_STRIDE;
        Vec3::from_slice(&self.vertices[start..start + 3])
    }

    pub fn normal(&self, index: u32) -> Vec3 {
        let start = index as usize * VERTEX_STRIDE + 3;
        Vec3::from_slice(&self.vertices[start..start + 3])
    }

    /// Adds the parallelogram spanned by `u` and `v`; it faces `u x v`.
    fn push_quad(&mut self, corner: Vec3, u: Vec3, v: Vec3) {
        let base = self.vertex_count() as u32;
        let normal = u.cross(v).normalize();
        for position in [corner, corner + u, corner + u + v, corner + v] {
            self.vertices.extend_from_slice(&position.to_array());
            self.vertices.extend_from_slice(&normal.to_array());
        }
        self.indices
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }
}
