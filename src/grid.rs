use hashbrown::{HashMap, HashSet};
use log::{debug, info};
use relief_geom::Vec2;
use relief_runtime::default_worker_count;

use crate::chunk::{StreamCtx, TerrainChunk, VisibilityTransition};
use crate::config::TerrainParams;
use crate::coord::ChunkCoord;
use crate::jobs::{TerrainJobOut, TerrainRuntime};
use crate::scene::{ChunkScene, PoiFactory};

/// Owns the chunk index and drives streaming from viewer movement.
///
/// Chunks are indexed forever once created; leaving the window only hides
/// them. `tick` is the single entry point and must run on the thread that
/// owns the scene.
pub struct TerrainGrid {
    params: TerrainParams,
    runtime: TerrainRuntime,
    chunks: HashMap<ChunkCoord, TerrainChunk>,
    visible: Vec<ChunkCoord>,
    chunks_visible_radius: i32,
    last_window_viewer: Vec2,
    last_tick_viewer: Option<Vec2>,
    window_initialized: bool,
}

impl TerrainGrid {
    pub fn new(params: TerrainParams, scene: &mut dyn ChunkScene) -> Self {
        scene.configure_material(
            &params.layers,
            params.height_map.min_height(),
            params.height_map.max_height(),
        );

        let workers = if params.workers == 0 {
            default_worker_count()
        } else {
            params.workers
        };
        let radius = (params.max_view_dst() / params.mesh.world_size()).round() as i32;
        info!(
            "terrain grid: chunk size {} world units, window radius {}, {} workers",
            params.mesh.world_size(),
            radius,
            workers
        );

        Self {
            params,
            runtime: TerrainRuntime::new(workers),
            chunks: HashMap::new(),
            visible: Vec::new(),
            chunks_visible_radius: radius,
            last_window_viewer: Vec2::ZERO,
            last_tick_viewer: None,
            window_initialized: false,
        }
    }

    /// One streaming pass: drain finished jobs, refresh colliders if the
    /// viewer moved at all, and recompute the visible window if it moved
    /// past the threshold. The first tick always computes a window.
    pub fn tick(&mut self, viewer: Vec2, scene: &mut dyn ChunkScene, poi: &mut dyn PoiFactory) {
        self.drain_results(viewer, scene, poi);

        if self.last_tick_viewer != Some(viewer) {
            self.refresh_colliders(viewer, scene);
        }

        let displacement = (viewer - self.last_window_viewer).length_sq();
        let threshold = self.params.viewer_move_threshold;
        if !self.window_initialized || displacement > threshold * threshold {
            self.update_visible_chunks(viewer, scene, poi);
            self.last_window_viewer = viewer;
            self.window_initialized = true;
        }

        self.last_tick_viewer = Some(viewer);
    }

    fn drain_results(&mut self, viewer: Vec2, scene: &mut dyn ChunkScene, poi: &mut dyn PoiFactory) {
        let results = self.runtime.drain_results();
        if results.is_empty() {
            return;
        }
        let Self {
            params,
            runtime,
            chunks,
            visible,
            ..
        } = self;
        let ctx = StreamCtx {
            runtime: &*runtime,
            params: &*params,
            viewer,
        };
        for out in results {
            match out {
                TerrainJobOut::HeightMap { coord, height_map } => {
                    if let Some(chunk) = chunks.get_mut(&coord) {
                        chunk.on_height_map_received(height_map);
                        let t = chunk.update(&ctx, scene);
                        apply_transition(visible, coord, t);
                        chunk.update_poi(&ctx, poi);
                    }
                }
                TerrainJobOut::Mesh {
                    coord,
                    lod_index,
                    mesh,
                } => {
                    if let Some(chunk) = chunks.get_mut(&coord) {
                        chunk.on_mesh_received(lod_index, mesh);
                        let t = chunk.update(&ctx, scene);
                        apply_transition(visible, coord, t);
                        chunk.update_poi(&ctx, poi);
                        // A stationary viewer still needs the collider baked
                        // once the collider-LOD mesh lands.
                        if lod_index == ctx.params.collider_lod_index {
                            chunk.update_collision_mesh(&ctx, scene);
                        }
                    }
                }
            }
        }
    }

    fn refresh_colliders(&mut self, viewer: Vec2, scene: &mut dyn ChunkScene) {
        let Self {
            params,
            runtime,
            chunks,
            visible,
            ..
        } = self;
        let ctx = StreamCtx {
            runtime: &*runtime,
            params: &*params,
            viewer,
        };
        for coord in visible.iter() {
            if let Some(chunk) = chunks.get_mut(coord) {
                chunk.update_collision_mesh(&ctx, scene);
            }
        }
    }

    fn update_visible_chunks(
        &mut self,
        viewer: Vec2,
        scene: &mut dyn ChunkScene,
        poi: &mut dyn PoiFactory,
    ) {
        let Self {
            params,
            runtime,
            chunks,
            visible,
            chunks_visible_radius,
            ..
        } = self;
        let ctx = StreamCtx {
            runtime: &*runtime,
            params: &*params,
            viewer,
        };

        // Chunks visible last pass get re-evaluated first; anything they
        // hide must not be re-shown by the window sweep below.
        let mut updated: HashSet<ChunkCoord> = HashSet::new();
        for coord in visible.clone() {
            updated.insert(coord);
            if let Some(chunk) = chunks.get_mut(&coord) {
                let t = chunk.update(&ctx, scene);
                apply_transition(visible, coord, t);
                chunk.update_poi(&ctx, poi);
            }
        }

        let center = ChunkCoord::from_viewer(viewer, ctx.params.mesh.world_size());
        let r = *chunks_visible_radius;
        for zo in -r..=r {
            for xo in -r..=r {
                let coord = center.offset(xo, zo);
                if updated.contains(&coord) {
                    continue;
                }
                if let Some(chunk) = chunks.get_mut(&coord) {
                    let t = chunk.update(&ctx, scene);
                    apply_transition(visible, coord, t);
                    chunk.update_poi(&ctx, poi);
                } else {
                    debug!("indexing chunk {coord}");
                    chunks.insert(coord, TerrainChunk::new(coord, &ctx));
                }
            }
        }
    }

    /// Chunks ever indexed; never shrinks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_indexed(&self, coord: ChunkCoord) -> bool {
        self.chunks.contains_key(&coord)
    }

    pub fn visible_coords(&self) -> &[ChunkCoord] {
        &self.visible
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    /// Background jobs submitted but not yet delivered.
    pub fn pending_jobs(&self) -> usize {
        self.runtime.pending()
    }

    pub fn params(&self) -> &TerrainParams {
        &self.params
    }
}

fn apply_transition(visible: &mut Vec<ChunkCoord>, coord: ChunkCoord, t: VisibilityTransition) {
    match t {
        VisibilityTransition::Unchanged => {}
        VisibilityTransition::Shown => {
            if !visible.contains(&coord) {
                visible.push(coord);
            }
        }
        VisibilityTransition::Hidden => {
            visible.retain(|c| *c != coord);
        }
    }
}
