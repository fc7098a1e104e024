//! CPU terrain meshing: LOD-stepped grids from elevation maps, with a
//! border ring of helper vertices so chunk seams shade without cracks.
#![forbid(unsafe_code)]

mod mesh_build;

use mesh_build::MeshBuilder;
use relief_geom::{Vec2, Vec3};
use relief_heightmap::HeightMap;

/// Chunk sizes whose vertex grids every supported LOD stride divides evenly.
pub const SUPPORTED_CHUNK_SIZES: [u32; 9] = [48, 72, 96, 120, 144, 168, 192, 216, 240];
/// Flat shading duplicates vertices per triangle, so only the smaller sizes
/// stay under a sane vertex budget.
pub const SUPPORTED_FLATSHADED_CHUNK_SIZES: [u32; 3] = [48, 72, 96];
pub const NUM_SUPPORTED_LODS: usize = 5;

#[derive(Clone, Copy, Debug)]
pub struct MeshSettings {
    /// World units per grid cell.
    pub scale: f32,
    pub flat_shading: bool,
    pub chunk_size_index: usize,
    pub flatshaded_chunk_size_index: usize,
}

impl Default for MeshSettings {
    fn default() -> Self {
        Self {
            scale: 2.5,
            flat_shading: false,
            chunk_size_index: 0,
            flatshaded_chunk_size_index: 0,
        }
    }
}

impl MeshSettings {
    pub fn chunk_size(&self) -> u32 {
        if self.flat_shading {
            SUPPORTED_FLATSHADED_CHUNK_SIZES[self.flatshaded_chunk_size_index]
        } else {
            SUPPORTED_CHUNK_SIZES[self.chunk_size_index]
        }
    }

    /// Vertices along one edge of the full-detail chunk.
    pub fn verts_per_line(&self) -> usize {
        self.chunk_size() as usize + 1
    }

    /// Height map edge length: the vertex grid plus one border sample on
    /// each side for seam normals.
    pub fn sample_count(&self) -> usize {
        self.verts_per_line() + 2
    }

    /// Edge length of the chunk in world units.
    pub fn world_size(&self) -> f32 {
        (self.verts_per_line() - 1) as f32 * self.scale
    }

    pub fn validate(&mut self) {
        self.scale = self.scale.max(0.01);
        self.chunk_size_index = self.chunk_size_index.min(SUPPORTED_CHUNK_SIZES.len() - 1);
        self.flatshaded_chunk_size_index = self
            .flatshaded_chunk_size_index
            .min(SUPPORTED_FLATSHADED_CHUNK_SIZES.len() - 1);
    }
}

/// Baked mesh buffers, ready for upload. Positions and normals are xyz
/// triples, uvs are xy pairs, indices address whole vertices.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    pub positions: Vec<f32>,
    pub normals: Vec<f32>,
    pub uvs: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len() / 3
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Number of emitted vertices along one edge for a given LOD.
pub fn edge_vertex_count(settings: &MeshSettings, lod: usize) -> usize {
    let step = 1usize << lod;
    (settings.verts_per_line() - 1) / step + 1
}

/// Triangulate an elevation map at the given level of detail.
///
/// The height map must be `sample_count()` on a side: its outermost ring
/// feeds border vertices that only contribute to edge normals and never
/// appear in the emitted buffers. Vertex stride doubles per LOD, so LOD 0
/// emits every interior sample and LOD 4 emits every sixteenth.
pub fn generate_terrain_mesh(height_map: &HeightMap, settings: &MeshSettings, lod: usize) -> MeshData {
    debug_assert!(lod < NUM_SUPPORTED_LODS);
    debug_assert_eq!(height_map.width, settings.sample_count());
    debug_assert_eq!(height_map.height, settings.sample_count());

    let verts_per_line = settings.verts_per_line();
    let step = 1usize << lod;
    let edge = (verts_per_line - 1) / step + 1;

    // Sample columns touched at this LOD: the border column on each side,
    // and every step-th interior column.
    let mut cols: Vec<usize> = Vec::with_capacity(edge + 2);
    cols.push(0);
    for i in 0..edge {
        cols.push(1 + i * step);
    }
    cols.push(settings.sample_count() - 1);
    let logical = cols.len();

    // Perimeter of the logical grid holds border vertices (negative
    // indices), the interior holds emitted vertices.
    let mut index_map = vec![0i32; logical * logical];
    let mut mesh_index = 0i32;
    let mut border_index = -1i32;
    for j in 0..logical {
        for i in 0..logical {
            let on_border = i == 0 || j == 0 || i == logical - 1 || j == logical - 1;
            index_map[j * logical + i] = if on_border {
                let idx = border_index;
                border_index -= 1;
                idx
            } else {
                let idx = mesh_index;
                mesh_index += 1;
                idx
            };
        }
    }

    let border_vertex_count = (-border_index - 1) as usize;
    let mut builder = MeshBuilder::new(mesh_index as usize, border_vertex_count, settings.flat_shading);

    let top_left = -((verts_per_line - 1) as f32) / 2.0 * settings.scale;
    let span = (verts_per_line - 1) as f32;
    for j in 0..logical {
        for i in 0..logical {
            let (gx, gy) = (cols[i], cols[j]);
            let h = height_map.get(gx, gy);
            let pos = Vec3::new(
                top_left + (gx as f32 - 1.0) * settings.scale,
                h,
                top_left + (gy as f32 - 1.0) * settings.scale,
            );
            let uv = Vec2::new((gx as f32 - 1.0) / span, (gy as f32 - 1.0) / span);
            builder.set_vertex(index_map[j * logical + i], pos, uv);
        }
    }

    for j in 0..logical - 1 {
        for i in 0..logical - 1 {
            let a = index_map[j * logical + i];
            let b = index_map[j * logical + i + 1];
            let c = index_map[(j + 1) * logical + i];
            let d = index_map[(j + 1) * logical + i + 1];
            builder.add_triangle(a, c, d);
            builder.add_triangle(a, d, b);
        }
    }

    builder.bake()
}
