use relief_geom::Vec3;
use relief_mesh_cpu::MeshData;

use crate::config::MaterialLayer;
use crate::coord::ChunkCoord;

/// Opaque identifier for a spawned point-of-interest object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PoiHandle(pub u64);

/// Rendering-side sink for streaming output. The grid pushes meshes,
/// colliders and visibility changes through this seam; what a renderer
/// does with them is its own business.
pub trait ChunkScene {
    /// Called once at startup with the material layer bands and the derived
    /// world height range so the terrain material can map elevation to color.
    fn configure_material(&mut self, layers: &[MaterialLayer], min_height: f32, max_height: f32);

    /// A mesh for `coord` at the given LOD index is ready for display.
    fn apply_mesh(&mut self, coord: ChunkCoord, lod_index: usize, mesh: &MeshData);

    /// A physics collider for `coord` is ready.
    fn apply_collider(&mut self, coord: ChunkCoord, mesh: &MeshData);

    fn set_visible(&mut self, coord: ChunkCoord, visible: bool);
}

/// Spawns and despawns point-of-interest objects at world positions.
pub trait PoiFactory {
    fn instantiate(&mut self, position: Vec3) -> PoiHandle;
    fn destroy(&mut self, handle: PoiHandle);
}
