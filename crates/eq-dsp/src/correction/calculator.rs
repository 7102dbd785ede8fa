//! Per-structure correction vector policy (§4.11): given a band's ideal
//! complex response `P(w)` and its realized IIR complex response `B(w)` on
//! the same frequency grid, derive the bin-wise correction that FIR
//! correction applies.

use num_complex::Complex64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CorrectionPolicy {
    /// Full phase correction: ratio `P/B` everywhere past a short fade-in.
    Matched,
    /// Leaves the low end alone (minimum phase); matches magnitude and
    /// cleans phase from the low-mid up.
    Mixed,
    /// Magnitude-only correction, driving the response toward zero phase.
    Zero,
}

pub type CorrectionVector = Vec<Complex64>;

const MAGNITUDE_CLAMP: f64 = 10_000.0;
const ZERO_CLAMP_DB: f64 = 40.0;

impl CorrectionPolicy {
    fn fade_in_start(self) -> usize {
        match self {
            CorrectionPolicy::Matched => 16,
            CorrectionPolicy::Mixed => 4,
            CorrectionPolicy::Zero => 0,
        }
    }

    fn fade_in_end(self) -> usize {
        match self {
            CorrectionPolicy::Matched => 128,
            CorrectionPolicy::Mixed => 256,
            CorrectionPolicy::Zero => 0,
        }
    }
}

/// Computes one band's correction vector from its `(ideal, realized)`
/// response pairs, per the policy's fade-in/clamp rules.
pub fn band_correction(policy: CorrectionPolicy, responses: &[(Complex64, Complex64)]) -> CorrectionVector {
    let mut out = Vec::with_capacity(responses.len());
    let mut carry = Complex64::new(1.0, 0.0);
    let start = policy.fade_in_start();
    let end = policy.fade_in_end();

    for (i, &(p, b)) in responses.iter().enumerate() {
        let c = match policy {
            CorrectionPolicy::Zero => {
                let ratio = if b.norm() > 1e-12 { p.norm() / b.norm() } else { carry.norm() };
                let clamp = 10f64.powf(ZERO_CLAMP_DB / 20.0);
                Complex64::new(ratio.clamp(1.0 / clamp, clamp), 0.0)
            }
            CorrectionPolicy::Matched | CorrectionPolicy::Mixed => {
                let z = if b.norm() > 1e-12 { p / b } else { carry };
                if i < start {
                    Complex64::new(1.0, 0.0)
                } else if i < end && end > start {
                    let t = ((i - start) as f64 / (end - start) as f64).clamp(0.0, 1.0);
                    // logarithmic growth: k -> 0 slowly at first, reaches 1 at `end`.
                    let k = (1.0 + 9.0 * t).log10();
                    let (mag, arg) = z.to_polar();
                    Complex64::from_polar(1.0 + k * (mag - 1.0), k * arg)
                } else {
                    z
                }
            }
        };
        carry = c;
        out.push(c);
    }

    out
}

/// Multiplies all selected bands' correction vectors together, clamping
/// the resulting magnitude at [`MAGNITUDE_CLAMP`] by scaling the vector
/// back (never the phase).
pub fn combine_bands(vectors: &[CorrectionVector]) -> CorrectionVector {
    let Some(len) = vectors.first().map(Vec::len) else {
        return Vec::new();
    };
    let mut combined = vec![Complex64::new(1.0, 0.0); len];
    for v in vectors {
        debug_assert_eq!(v.len(), len);
        for (c, &bin) in combined.iter_mut().zip(v.iter()) {
            *c *= bin;
        }
    }
    for c in combined.iter_mut() {
        let mag = c.norm();
        if mag > MAGNITUDE_CLAMP {
            *c *= MAGNITUDE_CLAMP / mag;
        }
    }
    combined
}
