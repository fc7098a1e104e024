use proptest::prelude::*;
use relief_geom::{Bounds2, Vec2};

fn bounded_f32() -> impl Strategy<Value = f32> {
    -1.0e4f32..1.0e4f32
}

fn positive_f32() -> impl Strategy<Value = f32> {
    1.0e-2f32..1.0e4f32
}

fn arb_vec2() -> impl Strategy<Value = Vec2> {
    (bounded_f32(), bounded_f32()).prop_map(|(x, y)| Vec2::new(x, y))
}

fn arb_bounds() -> impl Strategy<Value = Bounds2> {
    (arb_vec2(), positive_f32(), positive_f32())
        .prop_map(|(c, w, h)| Bounds2::new(c, Vec2::new(w, h)))
}

proptest! {
    // Any point inside the bounds is at distance zero.
    #[test]
    fn inside_points_have_zero_distance(b in arb_bounds(), tx in 0.0f32..=1.0, ty in 0.0f32..=1.0) {
        let min = b.min();
        let max = b.max();
        let p = Vec2::new(min.x + (max.x - min.x) * tx, min.y + (max.y - min.y) * ty);
        prop_assert!(b.sqr_distance(p) <= 1.0e-3);
    }

    #[test]
    fn distance_is_never_negative(b in arb_bounds(), p in arb_vec2()) {
        prop_assert!(b.sqr_distance(p) >= 0.0);
    }

    // Distance to a point pushed straight out along +x from the center
    // matches the gap to the right edge.
    #[test]
    fn axis_gap_matches(b in arb_bounds(), gap in 0.0f32..1.0e3) {
        let p = Vec2::new(b.max().x + gap, b.center.y);
        let d = b.sqr_distance(p);
        let expect = gap * gap;
        prop_assert!((d - expect).abs() <= 1.0e-2 + 1.0e-4 * expect.abs());
    }

    #[test]
    fn vec2_add_sub_roundtrip(a in arb_vec2(), v in arb_vec2()) {
        let back = a + v - v;
        prop_assert!((back.x - a.x).abs() <= 1.0e-2);
        prop_assert!((back.y - a.y).abs() <= 1.0e-2);
    }
}
