use crate::HeightMap;
use crate::noise::inverse_lerp;

/// Grayscale RGBA color buffer from a height map: black at the map's
/// minimum, white at its maximum. Turning the buffer into an actual
/// texture resource is the renderer's job.
pub fn color_map_from_height_map(map: &HeightMap) -> Vec<u8> {
    let mut out = Vec::with_capacity(map.width * map.height * 4);
    for y in 0..map.height {
        for x in 0..map.width {
            let t = inverse_lerp(map.min_value, map.max_value, map.get(x, y));
            let c = (t * 255.0).round() as u8;
            out.extend_from_slice(&[c, c, c, 255]);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extremes_map_to_black_and_white() {
        let map = HeightMap::from_values(2, 1, vec![1.0, 5.0]);
        let buf = color_map_from_height_map(&map);
        assert_eq!(buf.len(), 8);
        assert_eq!(&buf[0..4], &[0, 0, 0, 255]);
        assert_eq!(&buf[4..8], &[255, 255, 255, 255]);
    }

    #[test]
    fn flat_map_does_not_divide_by_zero() {
        let map = HeightMap::from_values(2, 2, vec![3.0; 4]);
        let buf = color_map_from_height_map(&map);
        assert_eq!(buf.len(), 16);
        assert!(buf.chunks_exact(4).all(|px| px[3] == 255));
    }
}
