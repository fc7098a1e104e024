use std::cell::Cell;

/// Piecewise-linear remap curve over [0, 1].
///
/// Evaluation caches the index of the last segment hit, which makes repeated
/// nearby lookups cheap when sweeping a grid. The cache is interior state
/// (`Cell`), so the type is `!Sync`: a curve instance cannot be shared
/// between worker threads and must be cloned into each generation job.
#[derive(Clone, Debug)]
pub struct HeightCurve {
    keys: Vec<(f32, f32)>,
    last_segment: Cell<usize>,
}

impl HeightCurve {
    /// Keys are `(t, value)` pairs; they are sorted by `t` on construction.
    /// An empty key list falls back to the identity curve.
    pub fn new(mut keys: Vec<(f32, f32)>) -> Self {
        if keys.is_empty() {
            keys.push((0.0, 0.0));
            keys.push((1.0, 1.0));
        }
        keys.sort_by(|a, b| a.0.total_cmp(&b.0));
        Self {
            keys,
            last_segment: Cell::new(0),
        }
    }

    pub fn identity() -> Self {
        Self::new(vec![(0.0, 0.0), (1.0, 1.0)])
    }

    /// Evaluate at `t`, clamping to the first/last key outside the range.
    pub fn evaluate(&self, t: f32) -> f32 {
        let keys = &self.keys;
        let last = keys.len() - 1;
        if t <= keys[0].0 {
            return keys[0].1;
        }
        if t >= keys[last].0 {
            return keys[last].1;
        }

        let mut seg = self.last_segment.get().min(last - 1);
        while t < keys[seg].0 {
            seg -= 1;
        }
        while t >= keys[seg + 1].0 {
            seg += 1;
        }
        self.last_segment.set(seg);

        let (t0, v0) = keys[seg];
        let (t1, v1) = keys[seg + 1];
        let u = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
        v0 + (v1 - v0) * u
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_clamp() {
        let c = HeightCurve::new(vec![(0.0, 0.2), (1.0, 0.8)]);
        assert_eq!(c.evaluate(-1.0), 0.2);
        assert_eq!(c.evaluate(2.0), 0.8);
    }

    #[test]
    fn interpolates_linearly() {
        let c = HeightCurve::identity();
        assert!((c.evaluate(0.25) - 0.25).abs() < 1.0e-6);
        assert!((c.evaluate(0.75) - 0.75).abs() < 1.0e-6);
    }

    #[test]
    fn multi_segment_lookup_matches_regardless_of_query_order() {
        let c = HeightCurve::new(vec![(0.0, 0.0), (0.4, 0.1), (0.7, 0.6), (1.0, 1.0)]);
        // Jump around so the segment cache is exercised in both directions.
        let probes = [0.9f32, 0.1, 0.65, 0.05, 0.95, 0.45];
        let fresh = HeightCurve::new(vec![(0.0, 0.0), (0.4, 0.1), (0.7, 0.6), (1.0, 1.0)]);
        for p in probes {
            assert!((c.evaluate(p) - fresh.clone().evaluate(p)).abs() < 1.0e-6);
        }
    }

    #[test]
    fn unsorted_keys_are_sorted() {
        let c = HeightCurve::new(vec![(1.0, 1.0), (0.0, 0.0), (0.5, 0.9)]);
        assert!((c.evaluate(0.5) - 0.9).abs() < 1.0e-6);
    }

    #[test]
    fn clone_carries_independent_cache() {
        let a = HeightCurve::new(vec![(0.0, 0.0), (0.5, 0.5), (1.0, 1.0)]);
        let _ = a.evaluate(0.9);
        let b = a.clone();
        assert!((b.evaluate(0.1) - 0.1).abs() < 1.0e-6);
        assert!((a.evaluate(0.1) - 0.1).abs() < 1.0e-6);
    }
}
