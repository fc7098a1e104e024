use proptest::prelude::*;
use relief_geom::Vec2;
use relief_heightmap::{NoiseSettings, NormalizeMode, generate_noise_map};

fn arb_settings(mode: NormalizeMode) -> impl Strategy<Value = NoiseSettings> {
    (
        5.0f32..200.0,
        1u32..6,
        0.2f32..0.9,
        1.5f32..3.0,
        any::<u64>(),
        -500.0f32..500.0,
        -500.0f32..500.0,
    )
        .prop_map(
            move |(scale, octaves, persistence, lacunarity, seed, ox, oy)| NoiseSettings {
                scale,
                octaves,
                persistence,
                lacunarity,
                seed,
                offset: Vec2::new(ox, oy),
                normalize_mode: mode,
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn generation_is_deterministic_for_any_settings(
        s in arb_settings(NormalizeMode::Global),
        cx in -1000.0f32..1000.0,
        cy in -1000.0f32..1000.0,
    ) {
        let center = Vec2::new(cx, cy);
        let a = generate_noise_map(17, 17, &s, center);
        let b = generate_noise_map(17, 17, &s, center);
        prop_assert_eq!(a, b);
    }

    #[test]
    fn global_mode_output_is_non_negative(s in arb_settings(NormalizeMode::Global)) {
        let m = generate_noise_map(16, 16, &s, Vec2::ZERO);
        prop_assert!(m.iter().all(|v| *v >= 0.0));
    }

    #[test]
    fn local_mode_output_stays_in_unit_interval(s in arb_settings(NormalizeMode::Local)) {
        let m = generate_noise_map(16, 16, &s, Vec2::ZERO);
        prop_assert!(m.iter().all(|v| (0.0..=1.0).contains(v)));
    }
}
