//! Viewer-centric terrain streaming: elevation maps and LOD meshes built on
//! background workers, a chunk grid that follows the viewer, and trait seams
//! toward whatever renders the result.
#![forbid(unsafe_code)]

pub mod chunk;
pub mod config;
pub mod coord;
pub mod grid;
pub mod jobs;
pub mod scene;

pub use chunk::{COLLIDER_GENERATION_DST_THRESHOLD, StreamCtx, TerrainChunk, VisibilityTransition};
pub use config::{MaterialLayer, TerrainConfig, TerrainParams, load_params_from_path};
pub use coord::ChunkCoord;
pub use grid::TerrainGrid;
pub use jobs::{TerrainJobOut, TerrainRuntime};
pub use scene::{ChunkScene, PoiFactory, PoiHandle};
