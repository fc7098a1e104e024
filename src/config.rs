use serde::Deserialize;
use std::error::Error;
use std::fs;
use std::path::Path;

use relief_geom::Vec2;
use relief_heightmap::{HeightCurve, HeightMapSettings, NoiseSettings, NormalizeMode};
use relief_mesh_cpu::{MeshSettings, NUM_SUPPORTED_LODS};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct TerrainConfig {
    #[serde(default)]
    pub noise: Noise,
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub mesh: Mesh,
    #[serde(default = "default_lods")]
    pub lods: Vec<LodConfig>,
    #[serde(default)]
    pub viewer: Viewer,
    #[serde(default)]
    pub poi: Poi,
    #[serde(default)]
    pub layers: Vec<MaterialLayer>,
    #[serde(default)]
    pub runtime: RuntimeCfg,
}

/// One band of the terrain material, blended by normalized height. Handed
/// to the rendering collaborator at startup and never read again.
#[derive(Clone, Debug, Deserialize)]
pub struct MaterialLayer {
    pub texture: String,
    #[serde(default = "default_tint")]
    pub tint: [f32; 3],
    #[serde(default)]
    pub tint_strength: f32,
    /// Normalized height at which this layer starts, in [0,1].
    #[serde(default)]
    pub start_height: f32,
    #[serde(default)]
    pub blend_strength: f32,
    #[serde(default = "default_texture_scale")]
    pub texture_scale: f32,
}
fn default_tint() -> [f32; 3] {
    [1.0, 1.0, 1.0]
}
fn default_texture_scale() -> f32 {
    1.0
}

#[derive(Clone, Debug, Deserialize)]
pub struct Noise {
    #[serde(default = "default_noise_scale")]
    pub scale: f32,
    #[serde(default = "default_octaves")]
    pub octaves: u32,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
    #[serde(default)]
    pub seed: u64,
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(default = "default_normalize")]
    pub normalize: Normalize,
}
fn default_noise_scale() -> f32 {
    50.0
}
fn default_octaves() -> u32 {
    6
}
fn default_persistence() -> f32 {
    0.6
}
fn default_lacunarity() -> f32 {
    2.0
}
fn default_normalize() -> Normalize {
    Normalize::Global
}
impl Default for Noise {
    fn default() -> Self {
        Self {
            scale: default_noise_scale(),
            octaves: default_octaves(),
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
            seed: 0,
            offset: [0.0, 0.0],
            normalize: default_normalize(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Normalize {
    Global,
    Local,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Height {
    #[serde(default = "default_multiplier")]
    pub multiplier: f32,
    /// Piecewise-linear remap curve as (noise value, factor) pairs.
    #[serde(default)]
    pub curve: Vec<[f32; 2]>,
    #[serde(default)]
    pub use_falloff: bool,
}
fn default_multiplier() -> f32 {
    25.0
}
impl Default for Height {
    fn default() -> Self {
        Self {
            multiplier: default_multiplier(),
            curve: Vec::new(),
            use_falloff: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Mesh {
    #[serde(default = "default_mesh_scale")]
    pub scale: f32,
    #[serde(default)]
    pub flat_shading: bool,
    #[serde(default)]
    pub chunk_size_index: usize,
    #[serde(default)]
    pub flatshaded_chunk_size_index: usize,
}
fn default_mesh_scale() -> f32 {
    2.5
}
impl Default for Mesh {
    fn default() -> Self {
        Self {
            scale: default_mesh_scale(),
            flat_shading: false,
            chunk_size_index: 0,
            flatshaded_chunk_size_index: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct LodConfig {
    pub lod: usize,
    pub visible_dst_threshold: f32,
}
fn default_lods() -> Vec<LodConfig> {
    vec![
        LodConfig {
            lod: 0,
            visible_dst_threshold: 200.0,
        },
        LodConfig {
            lod: 1,
            visible_dst_threshold: 400.0,
        },
        LodConfig {
            lod: 4,
            visible_dst_threshold: 600.0,
        },
    ]
}

#[derive(Clone, Debug, Deserialize)]
pub struct Viewer {
    /// Viewer displacement, in world units, before the visible window is
    /// recomputed.
    #[serde(default = "default_move_threshold")]
    pub move_threshold: f32,
    /// Which entry of `lods` feeds collider meshes.
    #[serde(default)]
    pub collider_lod_index: usize,
}
fn default_move_threshold() -> f32 {
    25.0
}
impl Default for Viewer {
    fn default() -> Self {
        Self {
            move_threshold: default_move_threshold(),
            collider_lod_index: 0,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Poi {
    #[serde(default)]
    pub enable: bool,
    /// Elevation below which a chunk qualifies for a spawn.
    #[serde(default = "default_poi_height")]
    pub height_threshold: f32,
    #[serde(default = "default_poi_chance")]
    pub spawn_chance: f32,
}
fn default_poi_height() -> f32 {
    2.0
}
fn default_poi_chance() -> f32 {
    0.1
}
impl Default for Poi {
    fn default() -> Self {
        Self {
            enable: false,
            height_threshold: default_poi_height(),
            spawn_chance: default_poi_chance(),
        }
    }
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct RuntimeCfg {
    /// Worker thread count; 0 picks a count from available parallelism.
    #[serde(default)]
    pub workers: usize,
}

/// Runtime-ready parameters flattened out of [`TerrainConfig`], with
/// out-of-range values clamped.
#[derive(Clone, Debug)]
pub struct TerrainParams {
    pub height_map: HeightMapSettings,
    pub mesh: MeshSettings,
    pub lods: Vec<LodInfo>,
    pub collider_lod_index: usize,
    pub viewer_move_threshold: f32,
    pub poi: PoiParams,
    pub layers: Vec<MaterialLayer>,
    pub workers: usize,
}

#[derive(Clone, Copy, Debug)]
pub struct LodInfo {
    pub lod: usize,
    pub visible_dst_threshold: f32,
}

impl LodInfo {
    #[inline]
    pub fn sqr_visible_dst_threshold(&self) -> f32 {
        self.visible_dst_threshold * self.visible_dst_threshold
    }
}

#[derive(Clone, Copy, Debug)]
pub struct PoiParams {
    pub enable: bool,
    pub height_threshold: f32,
    pub spawn_chance: f32,
}

impl Default for TerrainParams {
    fn default() -> Self {
        Self::from_config(&TerrainConfig::default())
    }
}

impl TerrainParams {
    pub fn from_config(cfg: &TerrainConfig) -> Self {
        let mut height_map = HeightMapSettings {
            noise: NoiseSettings {
                scale: cfg.noise.scale,
                octaves: cfg.noise.octaves,
                persistence: cfg.noise.persistence,
                lacunarity: cfg.noise.lacunarity,
                seed: cfg.noise.seed,
                offset: Vec2::new(cfg.noise.offset[0], cfg.noise.offset[1]),
                normalize_mode: match cfg.noise.normalize {
                    Normalize::Global => NormalizeMode::Global,
                    Normalize::Local => NormalizeMode::Local,
                },
            },
            height_curve: if cfg.height.curve.is_empty() {
                HeightCurve::identity()
            } else {
                HeightCurve::new(cfg.height.curve.iter().map(|k| (k[0], k[1])).collect())
            },
            height_multiplier: cfg.height.multiplier,
            use_falloff: cfg.height.use_falloff,
        };
        height_map.validate();

        let mut mesh = MeshSettings {
            scale: cfg.mesh.scale,
            flat_shading: cfg.mesh.flat_shading,
            chunk_size_index: cfg.mesh.chunk_size_index,
            flatshaded_chunk_size_index: cfg.mesh.flatshaded_chunk_size_index,
        };
        mesh.validate();

        let mut lods: Vec<LodInfo> = cfg
            .lods
            .iter()
            .map(|l| LodInfo {
                lod: l.lod.min(NUM_SUPPORTED_LODS - 1),
                visible_dst_threshold: l.visible_dst_threshold.max(0.0),
            })
            .collect();
        if lods.is_empty() {
            lods = default_lods()
                .iter()
                .map(|l| LodInfo {
                    lod: l.lod,
                    visible_dst_threshold: l.visible_dst_threshold,
                })
                .collect();
        }
        lods.sort_by(|a, b| a.visible_dst_threshold.total_cmp(&b.visible_dst_threshold));

        Self {
            height_map,
            mesh,
            collider_lod_index: cfg.viewer.collider_lod_index.min(lods.len() - 1),
            lods,
            viewer_move_threshold: cfg.viewer.move_threshold.max(0.0),
            poi: PoiParams {
                enable: cfg.poi.enable,
                height_threshold: cfg.poi.height_threshold,
                spawn_chance: cfg.poi.spawn_chance.clamp(0.0, 1.0),
            },
            layers: cfg.layers.clone(),
            workers: cfg.runtime.workers,
        }
    }

    /// Outermost LOD threshold; nothing farther than this is visible.
    pub fn max_view_dst(&self) -> f32 {
        self.lods
            .last()
            .map(|l| l.visible_dst_threshold)
            .unwrap_or(0.0)
    }
}

pub fn load_params_from_path(path: &Path) -> Result<TerrainParams, Box<dyn Error>> {
    let s = fs::read_to_string(path)?;
    let cfg: TerrainConfig = toml::from_str(&s)?;
    Ok(TerrainParams::from_config(&cfg))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg: TerrainConfig = toml::from_str("").unwrap();
        let params = TerrainParams::from_config(&cfg);
        assert_eq!(params.lods.len(), 3);
        assert_eq!(params.max_view_dst(), 600.0);
        assert_eq!(params.height_map.height_multiplier, 25.0);
        assert!(!params.poi.enable);
    }

    #[test]
    fn lods_are_sorted_and_clamped() {
        let cfg: TerrainConfig = toml::from_str(
            r#"
            [[lods]]
            lod = 9
            visible_dst_threshold = 500.0
            [[lods]]
            lod = 0
            visible_dst_threshold = 120.0
            "#,
        )
        .unwrap();
        let params = TerrainParams::from_config(&cfg);
        assert_eq!(params.lods[0].visible_dst_threshold, 120.0);
        assert_eq!(params.lods[1].lod, NUM_SUPPORTED_LODS - 1);
        assert_eq!(params.max_view_dst(), 500.0);
    }

    #[test]
    fn curve_keys_flow_into_height_settings() {
        let cfg: TerrainConfig = toml::from_str(
            r#"
            [height]
            multiplier = 40.0
            curve = [[0.0, 0.0], [0.5, 0.1], [1.0, 1.0]]
            "#,
        )
        .unwrap();
        let params = TerrainParams::from_config(&cfg);
        assert_eq!(params.height_map.max_height(), 40.0);
        assert_eq!(params.height_map.min_height(), 0.0);
    }

    #[test]
    fn material_layers_parse_with_defaults() {
        let cfg: TerrainConfig = toml::from_str(
            r#"
            [[layers]]
            texture = "grass"
            start_height = 0.1
            [[layers]]
            texture = "snow"
            tint = [0.9, 0.9, 1.0]
            start_height = 0.8
            "#,
        )
        .unwrap();
        let params = TerrainParams::from_config(&cfg);
        assert_eq!(params.layers.len(), 2);
        assert_eq!(params.layers[0].tint, [1.0, 1.0, 1.0]);
        assert_eq!(params.layers[0].texture_scale, 1.0);
        assert_eq!(params.layers[1].start_height, 0.8);
    }

    #[test]
    fn spawn_chance_is_clamped_to_unit_interval() {
        let cfg: TerrainConfig = toml::from_str(
            r#"
            [poi]
            enable = true
            spawn_chance = 3.0
            "#,
        )
        .unwrap();
        let params = TerrainParams::from_config(&cfg);
        assert_eq!(params.poi.spawn_chance, 1.0);
    }
}
