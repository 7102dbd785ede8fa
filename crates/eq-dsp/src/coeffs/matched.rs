//! Matched-z (Vicanek) digital coefficient family.
//!
//! Implements the pole-matching and magnitude-matching procedure from
//! Martin Vicanek's "Matched One-Pole Digital Shelving Filters" and
//! "Matched Second Order Digital Filters": the digital biquad's poles are
//! placed to match the analog prototype's poles exactly, and its zeros are
//! then solved so the digital magnitude matches the analog magnitude at
//! three probe frequencies.

use super::{sanitize, Coeffs6};

/// Solve the denominator `a1, a2` for an analog 2nd-order prototype
/// `s^2 + 2*b*w0*s + c*w0^2` pole-matched onto the digital plane at `w0`.
/// `b²≥c` is the overdamped (real pole) branch, `b²<c` the underdamped
/// (complex pole) branch.
fn solve_a(w0: f64, b: f64, c: f64) -> (f64, f64) {
    let radius = (-b * w0).exp();
    if b * b >= c {
        let angle = w0 * (b * b - c).sqrt();
        (-2.0 * radius * angle.cosh(), radius * radius)
    } else {
        let angle = w0 * (c - b * b).sqrt();
        (-2.0 * radius * angle.cos(), radius * radius)
    }
}

/// `A = [(1+a1+a2)^2, (1-a1+a2)^2, -4*a2]` (with `a0` normalized to 1).
fn get_ab(a1: f64, a2: f64) -> [f64; 3] {
    [(1.0 + a1 + a2).powi(2), (1.0 - a1 + a2).powi(2), -4.0 * a2]
}

fn check_ab(b: [f64; 3]) -> bool {
    b[0] >= 0.0 && b[1] >= 0.0 && b[0] + b[1] + b[2] >= 0.0
}

/// Recover `b0, b1, b2` from the solved `B = [B0, B1, B2]` system.
fn get_b(b: [f64; 3]) -> (f64, f64, f64) {
    let a0 = b[0].max(0.0).sqrt();
    let a1 = b[1].max(0.0).sqrt();
    let w = 0.5 * (a0 + a1);
    let b0 = 0.5 * (w + (w * w + b[2]).max(0.0).sqrt());
    let b1 = 0.5 * (a0 - a1);
    let b2 = if b0.abs() > 1e-18 { -b[2] / (4.0 * b0) } else { 0.0 };
    (b0, b1, b2)
}

fn phi(w: f64) -> [f64; 3] {
    let s2 = (0.5 * w).sin().powi(2);
    let phi0 = 1.0 - s2;
    let phi1 = s2;
    [phi0, phi1, 4.0 * phi0 * phi1]
}

/// Solve the 3x3 system `rows[i] . x = rhs[i]` via Cramer's rule.
fn linear_solve(rows: [[f64; 3]; 3], rhs: [f64; 3]) -> Option<[f64; 3]> {
    fn det3(m: [[f64; 3]; 3]) -> f64 {
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }
    let d = det3(rows);
    if d.abs() < 1e-18 {
        return None;
    }
    let mut result = [0.0; 3];
    for col in 0..3 {
        let mut m = rows;
        for row in 0..3 {
            m[row][col] = rhs[row];
        }
        result[col] = det3(m) / d;
    }
    Some(result)
}

/// Given the pole-matched denominator `a = [1, a1, a2]` and the analog
/// magnitude-squared function, solve for `B` at the given probe
/// frequencies and recover `b0, b1, b2`.
fn solve_numerator(a1: f64, a2: f64, probes: [f64; 3], magnitude2_at: impl Fn(f64) -> f64) -> Option<(f64, f64, f64)> {
    let a = get_ab(a1, a2);
    let rows = probes.map(phi);
    let rhs = std::array::from_fn(|i| {
        let m2 = magnitude2_at(probes[i]);
        m2 * (rows[i][0] * a[0] + rows[i][1] * a[1] + rows[i][2] * a[2])
    });
    let b = linear_solve(rows, rhs)?;
    if !check_ab(b) {
        return None;
    }
    Some(get_b(b))
}

/// Assemble the final digital biquad `[1, a1, a2, b0, b1, b2]`, sanitized
/// to pass-through on any non-finite result (§7).
#[inline]
fn assemble(a1: f64, a2: f64, b0: f64, b1: f64, b2: f64) -> Coeffs6 {
    sanitize([1.0, a1, a2, b0, b1, b2])
}

#[inline]
pub fn get2_low_pass(w0: f64, q: f64) -> Coeffs6 {
    let b = 1.0 / (2.0 * q);
    let (a1, a2) = solve_a(w0, b, 1.0);
    let mag2 = |w: f64| super::ideal::magnitude2(super::ideal::get2_low_pass(w0, q), w);
    match solve_numerator(a1, a2, [0.0, w0, std::f64::consts::PI], mag2) {
        Some((b0, b1, b2)) => assemble(a1, a2, b0, b1, b2),
        None => super::PASS_THROUGH,
    }
}

#[inline]
pub fn get2_high_pass(w0: f64, q: f64) -> Coeffs6 {
    let b = 1.0 / (2.0 * q);
    let (a1, a2) = solve_a(w0, b, 1.0);
    let mag2 = |w: f64| super::ideal::magnitude2(super::ideal::get2_high_pass(w0, q), w);
    match solve_numerator(a1, a2, [0.0, w0, std::f64::consts::PI], mag2) {
        Some((b0, b1, b2)) => assemble(a1, a2, b0, b1, b2),
        None => super::PASS_THROUGH,
    }
}

#[inline]
pub fn get2_notch(w0: f64, q: f64) -> Coeffs6 {
    let b = 1.0 / (2.0 * q);
    let (a1, a2) = solve_a(w0, b, 1.0);
    let mag2 = |w: f64| super::ideal::magnitude2(super::ideal::get2_notch(w0, q), w);
    match solve_numerator(a1, a2, [0.0, w0, std::f64::consts::PI], mag2) {
        Some((b0, b1, b2)) => assemble(a1, a2, b0, b1, b2),
        None => super::PASS_THROUGH,
    }
}

#[inline]
pub fn get2_peak(w0: f64, g: f64, q: f64) -> Coeffs6 {
    let b = 1.0 / (2.0 * q);
    let (a1, a2) = solve_a(w0, b, 1.0);
    let mag2 = |w: f64| super::ideal::magnitude2(super::ideal::get2_peak(w0, g, q), w);
    match solve_numerator(a1, a2, [0.0, w0, std::f64::consts::PI], mag2) {
        Some((b0, b1, b2)) => assemble(a1, a2, b0, b1, b2),
        None => super::PASS_THROUGH,
    }
}

/// Band-pass re-attempts with shrinking probe frequencies (up to 20 trials)
/// if `check_AB` fails; on exhaustion it installs the last computed `B`
/// anyway — a deliberately preserved divergence, see SPEC_FULL.md §9.
#[inline]
pub fn get2_band_pass(w0: f64, q: f64) -> Coeffs6 {
    let b = 1.0 / (2.0 * q);
    let (a1, a2) = solve_a(w0, b, 1.0);
    let mag2 = |w: f64| super::ideal::magnitude2(super::ideal::get2_band_pass(w0, q), w);
    let a = get_ab(a1, a2);

    let mut shrink = 1.0_f64;
    let mut last: Option<[f64; 3]> = None;
    for _ in 0..20 {
        let probes = [w0 * 0.5 * shrink, w0 * shrink, (w0 * 2.0 * shrink).min(std::f64::consts::PI)];
        let rows = probes.map(phi);
        let rhs = std::array::from_fn(|i| {
            let m2 = mag2(probes[i]);
            m2 * (rows[i][0] * a[0] + rows[i][1] * a[1] + rows[i][2] * a[2])
        });
        if let Some(b) = linear_solve(rows, rhs) {
            last = Some(b);
            if check_ab(b) {
                let (b0, b1, b2) = get_b(b);
                return assemble(a1, a2, b0, b1, b2);
            }
        }
        shrink *= 0.85;
    }
    match last {
        Some(b) => {
            let (b0, b1, b2) = get_b(b);
            assemble(a1, a2, b0, b1, b2)
        }
        None => super::PASS_THROUGH,
    }
}

/// `g > 1` reuses the `1/g` path and swaps numerator/denominator, then
/// renormalizes so the denominator's leading coefficient is 1 again.
#[inline]
pub fn get2_tilt_shelf(w0: f64, g: f64, q: f64) -> Coeffs6 {
    if g > 1.0 {
        let low = get2_tilt_shelf_low_g(w0, 1.0 / g, q);
        let swapped = [low[3], low[4], low[5], low[0], low[1], low[2]];
        return swapped.scale_by(swapped[0]);
    }
    get2_tilt_shelf_low_g(w0, g, q)
}

fn get2_tilt_shelf_low_g(w0: f64, g: f64, q: f64) -> Coeffs6 {
    let b = g.sqrt() / (2.0 * q);
    let (a1, a2) = solve_a(w0, b, g);
    let mag2 = |w: f64| super::ideal::magnitude2(super::ideal::get2_tilt_shelf(w0, g, q), w);
    let a = get_ab(a1, a2);

    let mut shrink = 1.0_f64;
    let mut last: Option<[f64; 3]> = None;
    for _ in 0..20 {
        let probes = [0.0, w0 * shrink, (std::f64::consts::PI * shrink).max(w0 * 1.01)];
        let rows = probes.map(phi);
        let rhs = std::array::from_fn(|i| {
            let m2 = mag2(probes[i]);
            m2 * (rows[i][0] * a[0] + rows[i][1] * a[1] + rows[i][2] * a[2])
        });
        if let Some(b) = linear_solve(rows, rhs) {
            last = Some(b);
            if check_ab(b) {
                let (b0, b1, b2) = get_b(b);
                return assemble(a1, a2, b0, b1, b2);
            }
        }
        shrink *= 0.9;
    }
    match last {
        Some(b) => {
            let (b0, b1, b2) = get_b(b);
            assemble(a1, a2, b0, b1, b2)
        }
        None => super::PASS_THROUGH,
    }
}

#[inline]
pub fn get2_low_shelf(w0: f64, g: f64, q: f64) -> Coeffs6 {
    get2_tilt_shelf(w0, g, q)
}

/// High-shelf shares the tilt-shelf's pole placement (both prototypes have
/// a unit leading denominator coefficient) but matches its own magnitude
/// target, so it gets its own numerator solve rather than reusing tilt's.
#[inline]
pub fn get2_high_shelf(w0: f64, g: f64, q: f64) -> Coeffs6 {
    if g > 1.0 {
        let low = get2_high_shelf_low_g(w0, 1.0 / g, q);
        let swapped = [low[3], low[4], low[5], low[0], low[1], low[2]];
        return swapped.scale_by(swapped[0]);
    }
    get2_high_shelf_low_g(w0, g, q)
}

fn get2_high_shelf_low_g(w0: f64, g: f64, q: f64) -> Coeffs6 {
    let b = g.sqrt() / (2.0 * q);
    let (a1, a2) = solve_a(w0, b, g);
    let mag2 = |w: f64| super::ideal::magnitude2(super::ideal::get2_high_shelf(w0, g, q), w);
    match solve_numerator(a1, a2, [0.0, w0, std::f64::consts::PI * 0.999], mag2) {
        Some((b0, b1, b2)) => assemble(a1, a2, b0, b1, b2),
        None => super::PASS_THROUGH,
    }
}

trait ScaleCoeffs {
    fn scale_by(self, s: f64) -> Self;
}

impl ScaleCoeffs for Coeffs6 {
    fn scale_by(self, s: f64) -> Self {
        if s.abs() < 1e-18 || !s.is_finite() {
            return super::PASS_THROUGH;
        }
        [self[0] / s, self[1] / s, self[2] / s, self[3] / s, self[4] / s, self[5] / s]
    }
}
