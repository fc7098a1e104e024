use relief_geom::{Vec2, Vec3};

use crate::MeshData;

/// Accumulates a triangulated grid before baking it into flat buffers.
///
/// Vertices split into two pools: mesh vertices (non-negative indices) that
/// end up in the emitted buffers, and border vertices (negative indices)
/// that exist only so edge normals agree with the neighbouring chunk.
/// Border triangles contribute to normal accumulation and nothing else.
pub(crate) struct MeshBuilder {
    vertices: Vec<Vec3>,
    uvs: Vec<Vec2>,
    triangles: Vec<u32>,
    border_vertices: Vec<Vec3>,
    border_triangles: Vec<i32>,
    flat_shading: bool,
}

impl MeshBuilder {
    pub(crate) fn new(mesh_vertex_count: usize, border_vertex_count: usize, flat_shading: bool) -> Self {
        Self {
            vertices: vec![Vec3::ZERO; mesh_vertex_count],
            uvs: vec![Vec2::ZERO; mesh_vertex_count],
            triangles: Vec::new(),
            border_vertices: vec![Vec3::ZERO; border_vertex_count],
            border_triangles: Vec::new(),
            flat_shading,
        }
    }

    pub(crate) fn set_vertex(&mut self, index: i32, position: Vec3, uv: Vec2) {
        if index < 0 {
            self.border_vertices[(-index - 1) as usize] = position;
        } else {
            self.vertices[index as usize] = position;
            self.uvs[index as usize] = uv;
        }
    }

    pub(crate) fn add_triangle(&mut self, a: i32, b: i32, c: i32) {
        if a < 0 || b < 0 || c < 0 {
            self.border_triangles.extend([a, b, c]);
        } else {
            self.triangles.extend([a as u32, b as u32, c as u32]);
        }
    }

    fn position(&self, index: i32) -> Vec3 {
        if index < 0 {
            self.border_vertices[(-index - 1) as usize]
        } else {
            self.vertices[index as usize]
        }
    }

    fn smooth_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.vertices.len()];
        for tri in self.triangles.chunks_exact(3) {
            let n = surface_normal(
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            );
            for &i in tri {
                normals[i as usize] += n;
            }
        }
        // Border triangles pull edge normals toward the neighbouring chunk's
        // geometry so seams shade consistently.
        for tri in self.border_triangles.chunks_exact(3) {
            let n = surface_normal(
                self.position(tri[0]),
                self.position(tri[1]),
                self.position(tri[2]),
            );
            for &i in tri {
                if i >= 0 {
                    normals[i as usize] += n;
                }
            }
        }
        for n in &mut normals {
            *n = n.normalized();
        }
        normals
    }

    pub(crate) fn bake(self) -> MeshData {
        if self.flat_shading {
            self.bake_flat()
        } else {
            self.bake_smooth()
        }
    }

    fn bake_smooth(self) -> MeshData {
        let normals = self.smooth_normals();
        let mut out = MeshData {
            positions: Vec::with_capacity(self.vertices.len() * 3),
            normals: Vec::with_capacity(self.vertices.len() * 3),
            uvs: Vec::with_capacity(self.uvs.len() * 2),
            indices: self.triangles,
        };
        for v in &self.vertices {
            out.positions.extend_from_slice(&[v.x, v.y, v.z]);
        }
        for n in &normals {
            out.normals.extend_from_slice(&[n.x, n.y, n.z]);
        }
        for uv in &self.uvs {
            out.uvs.extend_from_slice(&[uv.x, uv.y]);
        }
        out
    }

    /// Flat shading duplicates every vertex per triangle and gives the three
    /// copies the triangle's own normal; border bookkeeping is unnecessary.
    fn bake_flat(self) -> MeshData {
        let tri_count = self.triangles.len() / 3;
        let mut out = MeshData {
            positions: Vec::with_capacity(tri_count * 9),
            normals: Vec::with_capacity(tri_count * 9),
            uvs: Vec::with_capacity(tri_count * 6),
            indices: Vec::with_capacity(self.triangles.len()),
        };
        for tri in self.triangles.chunks_exact(3) {
            let (a, b, c) = (
                self.vertices[tri[0] as usize],
                self.vertices[tri[1] as usize],
                self.vertices[tri[2] as usize],
            );
            let n = surface_normal(a, b, c);
            for &i in tri {
                let v = self.vertices[i as usize];
                let uv = self.uvs[i as usize];
                out.indices.push((out.positions.len() / 3) as u32);
                out.positions.extend_from_slice(&[v.x, v.y, v.z]);
                out.normals.extend_from_slice(&[n.x, n.y, n.z]);
                out.uvs.extend_from_slice(&[uv.x, uv.y]);
            }
        }
        out
    }
}

fn surface_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalized()
}
