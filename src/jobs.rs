use relief_heightmap::HeightMap;
use relief_mesh_cpu::MeshData;
use relief_runtime::Runtime;

use crate::coord::ChunkCoord;

/// Completed background work, routed back to its chunk on the main thread.
pub enum TerrainJobOut {
    HeightMap {
        coord: ChunkCoord,
        height_map: HeightMap,
    },
    Mesh {
        coord: ChunkCoord,
        lod_index: usize,
        mesh: MeshData,
    },
}

pub type TerrainRuntime = Runtime<TerrainJobOut>;
