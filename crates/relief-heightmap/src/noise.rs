use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use relief_geom::Vec2;

/// Fixed permutation seed for the coherent-noise primitive. The primitive is
/// a pure function of position; world seeds enter through the per-octave
/// offsets instead, so tiles sharing a seed line up across chunk borders.
const PRIMITIVE_SEED: i32 = 1337;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Remap this grid's own min/max to [0,1]. Output depends on the grid's
    /// contents, so adjacent tiles will NOT join seamlessly.
    Local,
    /// Divide by the theoretical octave-amplitude sum. Consistent absolute
    /// scale across independently generated tiles; required for streaming.
    #[default]
    Global,
}

#[derive(Clone, Debug)]
pub struct NoiseSettings {
    pub scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub seed: u64,
    pub offset: Vec2,
    pub normalize_mode: NormalizeMode,
}

impl Default for NoiseSettings {
    fn default() -> Self {
        Self {
            scale: 50.0,
            octaves: 6,
            persistence: 0.6,
            lacunarity: 2.0,
            seed: 0,
            offset: Vec2::ZERO,
            normalize_mode: NormalizeMode::Global,
        }
    }
}

impl NoiseSettings {
    /// Clamp degenerate values. The configuration layer calls this once on
    /// load; generation itself assumes settings are already sane.
    pub fn validate(&mut self) {
        self.scale = self.scale.max(0.01);
        self.octaves = self.octaves.max(1);
        self.lacunarity = self.lacunarity.max(1.0);
        self.persistence = self.persistence.clamp(0.0, 1.0);
    }
}

fn perlin_primitive() -> FastNoiseLite {
    let mut noise = FastNoiseLite::with_seed(PRIMITIVE_SEED);
    noise.set_noise_type(Some(NoiseType::Perlin));
    noise.set_frequency(Some(1.0));
    noise
}

#[inline]
pub fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if b > a {
        ((v - a) / (b - a)).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Generate a `width * height` row-major fractal noise grid centered on
/// `sample_center` (in sample units). Identical settings and center always
/// reproduce the same grid bit for bit.
pub fn generate_noise_map(
    width: usize,
    height: usize,
    settings: &NoiseSettings,
    sample_center: Vec2,
) -> Vec<f32> {
    let mut map = vec![0.0f32; width * height];

    // One offset per octave, drawn from the seeded sequence. Same seed,
    // same offsets, same terrain.
    let mut prng = ChaCha8Rng::seed_from_u64(settings.seed);
    let octaves = settings.octaves.max(1) as usize;
    let mut octave_offsets = Vec::with_capacity(octaves);
    let mut max_possible_height = 0.0f32;
    let mut amplitude = 1.0f32;
    for _ in 0..octaves {
        let dx = prng.random_range(-100_000..100_000) as f32;
        let dy = prng.random_range(-100_000..100_000) as f32;
        octave_offsets.push(Vec2::new(
            dx + settings.offset.x + sample_center.x,
            dy - settings.offset.y - sample_center.y,
        ));
        max_possible_height += amplitude;
        amplitude *= settings.persistence;
    }

    let noise = perlin_primitive();
    let half_width = width as f32 / 2.0;
    let half_height = height as f32 / 2.0;
    let mut min_local = f32::MAX;
    let mut max_local = f32::MIN;

    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0f32;
            let mut frequency = 1.0f32;
            let mut value = 0.0f32;
            for off in &octave_offsets {
                let sx = (x as f32 - half_width + off.x) / settings.scale * frequency;
                let sy = (y as f32 - half_height + off.y) / settings.scale * frequency;
                value += noise.get_noise_2d(sx, sy) * amplitude;
                amplitude *= settings.persistence;
                frequency *= settings.lacunarity;
            }
            if value > max_local {
                max_local = value;
            }
            if value < min_local {
                min_local = value;
            }
            map[y * width + x] = match settings.normalize_mode {
                // Lower bound only: extreme octave sums may exceed 1.
                NormalizeMode::Global => ((value + 1.0) / (max_possible_height / 0.9)).max(0.0),
                NormalizeMode::Local => value,
            };
        }
    }

    if settings.normalize_mode == NormalizeMode::Local {
        for v in &mut map {
            *v = inverse_lerp(min_local, max_local, *v);
        }
    }

    map
}
