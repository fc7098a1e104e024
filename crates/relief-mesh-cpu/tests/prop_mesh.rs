use proptest::prelude::*;
use relief_geom::Vec2;
use relief_heightmap::{HeightMapSettings, NoiseSettings, generate_height_map};
use relief_mesh_cpu::{
    MeshSettings, NUM_SUPPORTED_LODS, edge_vertex_count, generate_terrain_mesh,
};

fn arb_mesh_input() -> impl Strategy<Value = (MeshSettings, usize, u64)> {
    (0usize..NUM_SUPPORTED_LODS, any::<bool>(), any::<u64>(), 0.5f32..10.0).prop_map(
        |(lod, flat_shading, seed, scale)| {
            let settings = MeshSettings {
                scale,
                flat_shading,
                chunk_size_index: 0,
                flatshaded_chunk_size_index: 0,
            };
            (settings, lod, seed)
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn mesh_buffers_are_always_consistent((settings, lod, seed) in arb_mesh_input()) {
        let n = settings.sample_count();
        let hm_settings = HeightMapSettings {
            noise: NoiseSettings { seed, ..NoiseSettings::default() },
            ..HeightMapSettings::default()
        };
        let map = generate_height_map(n, n, &hm_settings, Vec2::ZERO);
        let mesh = generate_terrain_mesh(&map, &settings, lod);

        prop_assert_eq!(mesh.positions.len() % 3, 0);
        prop_assert_eq!(mesh.normals.len(), mesh.positions.len());
        prop_assert_eq!(mesh.uvs.len() / 2, mesh.vertex_count());
        prop_assert_eq!(mesh.indices.len() % 3, 0);

        let vcount = mesh.vertex_count() as u32;
        prop_assert!(mesh.indices.iter().all(|i| *i < vcount));

        let edge = edge_vertex_count(&settings, lod);
        prop_assert_eq!(mesh.triangle_count(), 2 * (edge - 1) * (edge - 1));
        if settings.flat_shading {
            prop_assert_eq!(mesh.vertex_count(), mesh.indices.len());
        } else {
            prop_assert_eq!(mesh.vertex_count(), edge * edge);
        }
    }
}
