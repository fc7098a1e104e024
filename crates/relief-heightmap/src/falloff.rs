/// Edge falloff map: 0 in the middle, rising toward 1 at the borders.
/// Subtracted from a noise grid to sink terrain toward the tile edges
/// (island-style previews). Row-major, same indexing as a height map.
pub fn generate_falloff_map(width: usize, height: usize) -> Vec<f32> {
    let mut map = vec![0.0f32; width * height];
    for y in 0..height {
        for x in 0..width {
            let nx = x as f32 / width as f32 * 2.0 - 1.0;
            let ny = y as f32 / height as f32 * 2.0 - 1.0;
            map[y * width + x] = falloff_curve(nx.abs().max(ny.abs()));
        }
    }
    map
}

fn falloff_curve(value: f32) -> f32 {
    let a = 3.0f32;
    let b = 2.2f32;
    let va = value.powf(a);
    va / (va + (b - b * value).powf(a))
}
