//! In-place mid/side splitting (§4.12). Uses the `0.5`-scaled convention —
//! `m = (l+r)*0.5, s = (l-r)*0.5` — so `combine(split(l, r)) == (l, r)`
//! exactly, with no compensating gain stage on recombine.

#[inline]
pub fn split(l: f64, r: f64) -> (f64, f64) {
    (0.5 * (l + r), 0.5 * (l - r))
}

#[inline]
pub fn combine(m: f64, s: f64) -> (f64, f64) {
    (m + s, m - s)
}

/// Splits a stereo block in place: `left`/`right` become `mid`/`side`.
pub fn split_block(left: &mut [f64], right: &mut [f64]) {
    debug_assert_eq!(left.len(), right.len());
    for (l, r) in left.iter_mut().zip(right.iter_mut()) {
        let (m, s) = split(*l, *r);
        *l = m;
        *r = s;
    }
}

/// Combines a mid/side block in place back into left/right.
pub fn combine_block(mid: &mut [f64], side: &mut [f64]) {
    debug_assert_eq!(mid.len(), side.len());
    for (m, s) in mid.iter_mut().zip(side.iter_mut()) {
        let (l, r) = combine(*m, *s);
        *m = l;
        *s = r;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn split_then_combine_round_trips_exactly() {
        let (m, s) = split(0.8, -0.3);
        let (l, r) = combine(m, s);
        assert_relative_eq!(l, 0.8, epsilon = 1e-15);
        assert_relative_eq!(r, -0.3, epsilon = 1e-15);
    }

    #[test]
    fn block_round_trip_matches_sample_round_trip() {
        let mut l = vec![0.1, 0.5, -0.9, 0.0];
        let mut r = vec![0.2, -0.4, 0.3, 0.0];
        let l0 = l.clone();
        let r0 = r.clone();
        split_block(&mut l, &mut r);
        combine_block(&mut l, &mut r);
        for i in 0..l.len() {
            assert_relative_eq!(l[i], l0[i], epsilon = 1e-15);
            assert_relative_eq!(r[i], r0[i], epsilon = 1e-15);
        }
    }

    #[test]
    fn mono_signal_has_zero_side() {
        let (m, s) = split(0.6, 0.6);
        assert_relative_eq!(m, 0.6, epsilon = 1e-15);
        assert_relative_eq!(s, 0.0, epsilon = 1e-15);
    }
}
