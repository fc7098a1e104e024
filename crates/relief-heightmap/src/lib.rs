//! Elevation map generation: fractal value noise, remap curve, falloff.
#![forbid(unsafe_code)]

mod curve;
mod falloff;
mod noise;
mod texture;

pub use curve::HeightCurve;
pub use falloff::generate_falloff_map;
pub use noise::{NoiseSettings, NormalizeMode, generate_noise_map, inverse_lerp};
pub use texture::color_map_from_height_map;

use relief_geom::Vec2;

/// Row-major elevation grid with min/max tracked at construction.
/// Immutable afterwards; share it behind an `Arc` with any number of
/// concurrent mesh jobs.
#[derive(Clone, Debug)]
pub struct HeightMap {
    pub width: usize,
    pub height: usize,
    values: Vec<f32>,
    pub min_value: f32,
    pub max_value: f32,
}

impl HeightMap {
    pub fn from_values(width: usize, height: usize, values: Vec<f32>) -> Self {
        debug_assert_eq!(values.len(), width * height);
        let mut min_value = f32::MAX;
        let mut max_value = f32::MIN;
        for &v in &values {
            if v < min_value {
                min_value = v;
            }
            if v > max_value {
                max_value = v;
            }
        }
        Self {
            width,
            height,
            values,
            min_value,
            max_value,
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[self.idx(x, y)]
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }
}

#[derive(Clone, Debug)]
pub struct HeightMapSettings {
    pub noise: NoiseSettings,
    pub height_curve: HeightCurve,
    pub height_multiplier: f32,
    pub use_falloff: bool,
}

impl Default for HeightMapSettings {
    fn default() -> Self {
        Self {
            noise: NoiseSettings::default(),
            height_curve: HeightCurve::identity(),
            height_multiplier: 25.0,
            use_falloff: false,
        }
    }
}

impl HeightMapSettings {
    pub fn min_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(0.0)
    }

    pub fn max_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(1.0)
    }

    pub fn validate(&mut self) {
        self.noise.validate();
    }
}

/// Build an elevation grid: fractal noise, optional edge falloff, then the
/// remap curve and vertical multiplier, tracking the post-remap min/max.
///
/// The curve is cloned before evaluation; its lookup cache must never be
/// shared with another concurrently running generation job.
pub fn generate_height_map(
    width: usize,
    height: usize,
    settings: &HeightMapSettings,
    sample_center: Vec2,
) -> HeightMap {
    let mut values = generate_noise_map(width, height, &settings.noise, sample_center);
    let curve = settings.height_curve.clone();
    let falloff = settings
        .use_falloff
        .then(|| generate_falloff_map(width, height));

    let mut min_value = f32::MAX;
    let mut max_value = f32::MIN;
    for i in 0..values.len() {
        let mut v = values[i];
        if let Some(falloff) = &falloff {
            v = (v - falloff[i]).clamp(0.0, 1.0);
        }
        v *= curve.evaluate(v) * settings.height_multiplier;
        if v > max_value {
            max_value = v;
        }
        if v < min_value {
            min_value = v;
        }
        values[i] = v;
    }

    HeightMap {
        width,
        height,
        values,
        min_value,
        max_value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> HeightMapSettings {
        HeightMapSettings {
            noise: NoiseSettings {
                seed: 7,
                ..NoiseSettings::default()
            },
            height_curve: HeightCurve::identity(),
            height_multiplier: 20.0,
            use_falloff: false,
        }
    }

    #[test]
    fn min_max_bracket_every_value() {
        let map = generate_height_map(35, 35, &settings(), Vec2::new(64.0, 64.0));
        assert!(map.values().iter().all(|v| *v >= map.min_value));
        assert!(map.values().iter().all(|v| *v <= map.max_value));
        assert!(map.min_value < map.max_value);
    }

    #[test]
    fn generation_is_deterministic() {
        let s = settings();
        let a = generate_height_map(20, 20, &s, Vec2::ZERO);
        let b = generate_height_map(20, 20, &s, Vec2::ZERO);
        assert_eq!(a.values(), b.values());
        assert_eq!(a.min_value, b.min_value);
        assert_eq!(a.max_value, b.max_value);
    }

    #[test]
    fn multiplier_scales_heights() {
        let mut s = settings();
        let a = generate_height_map(16, 16, &s, Vec2::ZERO);
        s.height_multiplier *= 2.0;
        let b = generate_height_map(16, 16, &s, Vec2::ZERO);
        for (va, vb) in a.values().iter().zip(b.values()) {
            assert!((vb - va * 2.0).abs() < 1.0e-3);
        }
    }

    #[test]
    fn falloff_sinks_tile_edges() {
        let mut s = settings();
        s.use_falloff = true;
        let size = 33;
        let map = generate_height_map(size, size, &s, Vec2::ZERO);
        // Corners are fully faded out.
        assert_eq!(map.get(0, 0), 0.0);
        assert_eq!(map.get(size - 1, size - 1), 0.0);
    }

    #[test]
    fn derived_height_range_uses_curve_endpoints() {
        let s = HeightMapSettings {
            height_curve: HeightCurve::new(vec![(0.0, 0.1), (1.0, 0.9)]),
            height_multiplier: 10.0,
            ..HeightMapSettings::default()
        };
        assert!((s.min_height() - 1.0).abs() < 1.0e-6);
        assert!((s.max_height() - 9.0).abs() < 1.0e-6);
    }
}
