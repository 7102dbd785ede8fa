//! Analog prototype ("ideal") coefficient family.
//!
//! Returns continuous-time rational coefficients in `s`, used only to
//! evaluate a target frequency response (§4.9 IdealFilter) — never to
//! process audio directly. Closed forms below are reproduced from the
//! matched family's own prototype derivations so that both families agree
//! on what "ideal" means for a given `(type, w0, g, q)`.

use super::{Coeffs4, Coeffs6};

#[inline]
pub fn get1_low_pass(w0: f64) -> Coeffs4 {
    [1.0, w0, 0.0, w0]
}

#[inline]
pub fn get1_high_pass(w0: f64) -> Coeffs4 {
    [1.0, w0, 1.0, 0.0]
}

#[inline]
pub fn get1_tilt_shelf(w0: f64, g: f64) -> Coeffs4 {
    let a = g.sqrt();
    [1.0, a * w0, a, w0]
}

#[inline]
pub fn get1_low_shelf(w0: f64, g: f64) -> Coeffs4 {
    let a = g.sqrt();
    [1.0, w0 / a, 1.0, w0 * a]
}

#[inline]
pub fn get1_high_shelf(w0: f64, g: f64) -> Coeffs4 {
    let a = g.sqrt();
    [1.0 / a, w0, a, w0]
}

#[inline]
pub fn get2_low_pass(w0: f64, q: f64) -> Coeffs6 {
    let w02 = w0 * w0;
    [1.0, w0 / q, w02, 0.0, 0.0, w02]
}

#[inline]
pub fn get2_high_pass(w0: f64, q: f64) -> Coeffs6 {
    [1.0, w0 / q, w0 * w0, 1.0, 0.0, 0.0]
}

#[inline]
pub fn get2_band_pass(w0: f64, q: f64) -> Coeffs6 {
    [1.0, w0 / q, w0 * w0, 0.0, w0 / q, 0.0]
}

#[inline]
pub fn get2_notch(w0: f64, q: f64) -> Coeffs6 {
    let w02 = w0 * w0;
    [1.0, w0 / q, w02, 1.0, 0.0, w02]
}

#[inline]
pub fn get2_peak(w0: f64, g: f64, q: f64) -> Coeffs6 {
    let w02 = w0 * w0;
    let a = g.sqrt();
    [1.0, w0 / (a * q), w02, 1.0, w0 * a / q, w02]
}

#[inline]
pub fn get2_tilt_shelf(w0: f64, g: f64, q: f64) -> Coeffs6 {
    let a = g.sqrt();
    let awq = a.sqrt() * w0 / q;
    let w02 = w0 * w0;
    [1.0, awq, a * w02, a, awq, w02]
}

#[inline]
pub fn get2_low_shelf(w0: f64, g: f64, q: f64) -> Coeffs6 {
    let a = g.sqrt();
    let awq = a.sqrt() * w0 / q;
    let w02 = w0 * w0;
    [a, awq, w02, a, a * awq, a * a * w02]
}

#[inline]
pub fn get2_high_shelf(w0: f64, g: f64, q: f64) -> Coeffs6 {
    let a = g.sqrt();
    let awq = a.sqrt() * w0 / q;
    let w02 = w0 * w0;
    [1.0, awq, a * w02, a * a, a * awq, a * w02]
}

/// Magnitude-squared of a six-coefficient s-domain rational function at
/// `s = jw`: `(b2^2*w^2 + (b0 - b1*w^2)^2) / (a2^2*w^2 + (a0 - a1*w^2)^2)`.
#[inline]
pub fn magnitude2(c: Coeffs6, w: f64) -> f64 {
    let w2 = w * w;
    let num = c[5] * c[5] * w2 + (c[3] - c[4] * w2).powi(2);
    let den = c[2] * c[2] * w2 + (c[0] - c[1] * w2).powi(2);
    num / den
}

#[inline]
pub fn magnitude(c: Coeffs6, w: f64) -> f64 {
    magnitude2(c, w).sqrt()
}

/// Complex response at `s = jw`, `(b0 + b1*s + b2*s^2) / (a0 + a1*s + a2*s^2)`.
#[inline]
pub fn response(c: Coeffs6, w: f64) -> num_complex::Complex64 {
    use num_complex::Complex64;
    let s = Complex64::new(0.0, w);
    let num = Complex64::new(c[3], 0.0) + Complex64::new(c[4], 0.0) * s + Complex64::new(c[5], 0.0) * s * s;
    let den = Complex64::new(c[0], 0.0) + Complex64::new(c[1], 0.0) * s + Complex64::new(c[2], 0.0) * s * s;
    num / den
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn peak_center_magnitude_matches_gain() {
        let w0 = 0.3;
        let g = 4.0;
        let q = 1.0;
        let c = get2_peak(w0, g, q);
        assert_relative_eq!(magnitude(c, w0), g, epsilon = 1e-9);
    }

    #[test]
    fn low_pass_dc_and_high_freq() {
        let w0 = 0.2;
        let c = get2_low_pass(w0, 0.707);
        assert_relative_eq!(magnitude(c, 0.0), 1.0, epsilon = 1e-9);
        assert!(magnitude(c, 100.0) < 1e-3);
    }

    #[test]
    fn unity_gain_shelves_are_flat() {
        let w0 = 0.25;
        let q = 0.707;
        let low = get2_low_shelf(w0, 1.0, q);
        let high = get2_high_shelf(w0, 1.0, q);
        for w in [0.001, w0, 10.0] {
            assert_relative_eq!(magnitude(low, w), 1.0, epsilon = 1e-6);
            assert_relative_eq!(magnitude(high, w), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn shelves_reach_distinct_asymptotes() {
        let w0 = 0.25;
        let g = 4.0;
        let low = get2_low_shelf(w0, g, 0.707);
        let dc = magnitude(low, 1e-4);
        let hf = magnitude(low, 50.0);
        assert!((dc - hf).abs() > 0.1, "shelf should not be flat for g != 1");
    }
}
