use std::sync::Arc;

use log::debug;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use relief_geom::{Bounds2, Vec2, Vec3};
use relief_heightmap::{HeightMap, generate_height_map};
use relief_mesh_cpu::generate_terrain_mesh;

use crate::config::TerrainParams;
use crate::coord::ChunkCoord;
use crate::jobs::{TerrainJobOut, TerrainRuntime};
use crate::scene::{ChunkScene, PoiFactory, PoiHandle};

/// Colliders bake only when the viewer is this close to the chunk edge.
pub const COLLIDER_GENERATION_DST_THRESHOLD: f32 = 5.0;

/// Borrowed streaming state handed down from the grid each pass.
pub struct StreamCtx<'a> {
    pub runtime: &'a TerrainRuntime,
    pub params: &'a TerrainParams,
    pub viewer: Vec2,
}

/// What a visibility pass did to a chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VisibilityTransition {
    Unchanged,
    Shown,
    Hidden,
}

#[derive(Default)]
struct LodMeshSlot {
    mesh: Option<relief_mesh_cpu::MeshData>,
    requested: bool,
}

#[derive(Default)]
struct PoiState {
    /// The spawn roll happens once per chunk lifetime; re-entering the
    /// window restores the remembered position instead of re-rolling.
    evaluated: bool,
    position: Option<Vec3>,
    handle: Option<PoiHandle>,
}

pub struct TerrainChunk {
    pub coord: ChunkCoord,
    bounds: Bounds2,
    height_map: Option<Arc<HeightMap>>,
    lod_meshes: Vec<LodMeshSlot>,
    previous_lod_index: Option<usize>,
    visible: bool,
    has_collider: bool,
    poi: PoiState,
}

impl TerrainChunk {
    /// Index a new chunk and kick off its height map job.
    pub fn new(coord: ChunkCoord, ctx: &StreamCtx) -> Self {
        let world_size = ctx.params.mesh.world_size();
        let center = coord.world_center(world_size);
        let bounds = Bounds2::new(center, Vec2::splat(world_size));

        let sample_count = ctx.params.mesh.sample_count();
        let sample_center = center / ctx.params.mesh.scale;
        let settings = ctx.params.height_map.clone();
        ctx.runtime.submit(move || TerrainJobOut::HeightMap {
            coord,
            height_map: generate_height_map(sample_count, sample_count, &settings, sample_center),
        });
        debug!("chunk {coord}: height map requested");

        let mut lod_meshes = Vec::with_capacity(ctx.params.lods.len());
        lod_meshes.resize_with(ctx.params.lods.len(), LodMeshSlot::default);

        Self {
            coord,
            bounds,
            height_map: None,
            lod_meshes,
            previous_lod_index: None,
            visible: false,
            has_collider: false,
            poi: PoiState::default(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_collider(&self) -> bool {
        self.has_collider
    }

    pub fn height_map_received(&self) -> bool {
        self.height_map.is_some()
    }

    pub fn on_height_map_received(&mut self, height_map: HeightMap) {
        self.height_map = Some(Arc::new(height_map));
    }

    pub fn on_mesh_received(&mut self, lod_index: usize, mesh: relief_mesh_cpu::MeshData) {
        self.lod_meshes[lod_index].mesh = Some(mesh);
    }

    /// Re-evaluate visibility and LOD against the viewer. Applies a newly
    /// appropriate mesh when its slot is filled, requests it when not, and
    /// reports whether visibility flipped. No-op until the height map is in.
    pub fn update(&mut self, ctx: &StreamCtx, scene: &mut dyn ChunkScene) -> VisibilityTransition {
        if self.height_map.is_none() {
            return VisibilityTransition::Unchanged;
        }
        let sqr_dst = self.bounds.sqr_distance(ctx.viewer);
        let max_view = ctx.params.max_view_dst();
        let was_visible = self.visible;
        let visible = sqr_dst <= max_view * max_view;

        if visible {
            let lod_index = lod_index_for(ctx.params, sqr_dst);
            if Some(lod_index) != self.previous_lod_index {
                if self.lod_meshes[lod_index].mesh.is_some() {
                    self.previous_lod_index = Some(lod_index);
                    if let Some(mesh) = &self.lod_meshes[lod_index].mesh {
                        scene.apply_mesh(self.coord, lod_index, mesh);
                    }
                } else if !self.lod_meshes[lod_index].requested {
                    self.lod_meshes[lod_index].requested = true;
                    self.request_mesh(lod_index, ctx);
                }
            }
        }

        if visible == was_visible {
            return VisibilityTransition::Unchanged;
        }
        self.visible = visible;
        scene.set_visible(self.coord, visible);
        if visible {
            VisibilityTransition::Shown
        } else {
            VisibilityTransition::Hidden
        }
    }

    /// Collider path: request the collider LOD mesh once the viewer is in
    /// its visibility band, bake the collider once the viewer is nearly on
    /// top of the chunk. Bakes at most once per chunk.
    pub fn update_collision_mesh(&mut self, ctx: &StreamCtx, scene: &mut dyn ChunkScene) {
        if self.has_collider {
            return;
        }
        let sqr_dst = self.bounds.sqr_distance(ctx.viewer);
        let ci = ctx.params.collider_lod_index;

        if sqr_dst < ctx.params.lods[ci].sqr_visible_dst_threshold()
            && !self.lod_meshes[ci].requested
            && self.height_map.is_some()
        {
            self.lod_meshes[ci].requested = true;
            self.request_mesh(ci, ctx);
        }

        if sqr_dst < COLLIDER_GENERATION_DST_THRESHOLD * COLLIDER_GENERATION_DST_THRESHOLD {
            if let Some(mesh) = &self.lod_meshes[ci].mesh {
                scene.apply_collider(self.coord, mesh);
                self.has_collider = true;
                debug!("chunk {}: collider baked", self.coord);
            }
        }
    }

    /// Spawn or despawn the chunk's point of interest to match visibility.
    /// The roll is deterministic per chunk and happens at most once.
    pub fn update_poi(&mut self, ctx: &StreamCtx, factory: &mut dyn PoiFactory) {
        if !ctx.params.poi.enable {
            return;
        }
        if self.visible {
            if self.poi.handle.is_some() {
                return;
            }
            if !self.poi.evaluated {
                if let Some(hm) = self.height_map.clone() {
                    self.poi.position = self.roll_poi(ctx, &hm);
                    self.poi.evaluated = true;
                }
            }
            if let Some(pos) = self.poi.position {
                self.poi.handle = Some(factory.instantiate(pos));
                debug!("chunk {}: poi spawned at y={}", self.coord, pos.y);
            }
        } else if let Some(handle) = self.poi.handle.take() {
            factory.destroy(handle);
        }
    }

    /// First low-enough sample that also wins its roll gets the spawn; the
    /// row-major scan biases placement toward the low-x low-z corner.
    fn roll_poi(&self, ctx: &StreamCtx, hm: &HeightMap) -> Option<Vec3> {
        let poi = ctx.params.poi;
        let mut rng =
            ChaCha8Rng::seed_from_u64(poi_seed(ctx.params.height_map.noise.seed, self.coord));
        let world_size = ctx.params.mesh.world_size();
        let scale = ctx.params.mesh.scale;
        for y in 0..hm.height {
            for x in 0..hm.width {
                let h = hm.get(x, y);
                if h < poi.height_threshold && rng.random::<f32>() < poi.spawn_chance {
                    return Some(Vec3::new(
                        self.coord.cx as f32 * world_size + x as f32 * scale,
                        h,
                        self.coord.cz as f32 * world_size + y as f32 * scale,
                    ));
                }
            }
        }
        None
    }

    fn request_mesh(&self, lod_index: usize, ctx: &StreamCtx) {
        let Some(hm) = self.height_map.clone() else {
            return;
        };
        let settings = ctx.params.mesh;
        let lod = ctx.params.lods[lod_index].lod;
        let coord = self.coord;
        ctx.runtime.submit(move || TerrainJobOut::Mesh {
            coord,
            lod_index,
            mesh: generate_terrain_mesh(&hm, &settings, lod),
        });
        debug!("chunk {coord}: mesh requested (lod index {lod_index})");
    }
}

/// Pick the LOD band for a squared viewer distance: the last threshold the
/// distance exceeds bumps the index one further out.
fn lod_index_for(params: &TerrainParams, sqr_dst: f32) -> usize {
    let mut lod_index = 0;
    for (i, lod) in params.lods.iter().enumerate().take(params.lods.len() - 1) {
        if sqr_dst > lod.sqr_visible_dst_threshold() {
            lod_index = i + 1;
        } else {
            break;
        }
    }
    lod_index
}

fn poi_seed(world_seed: u64, coord: ChunkCoord) -> u64 {
    world_seed ^ (((coord.cx as u32 as u64) << 32) | coord.cz as u32 as u64)
}
