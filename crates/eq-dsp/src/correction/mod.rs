//! FFT-based spectral correction (§4.10, §4.11): an overlap-add frame
//! processor (`fir`) driven by a correction vector, and the per-structure
//! policy (`calculator`) that derives that vector from a band's ideal vs.
//! realized response.

pub mod calculator;
pub mod fir;

pub use calculator::{CorrectionPolicy, CorrectionVector};
pub use fir::FirCorrection;

/// Chooses the FFT order by sample rate and correction policy (§4.10):
/// zero-phase defaults to 10, mixed-phase to 11, matched-phase to 9, each
/// bumped by one/two/three octaves as the sample rate climbs.
pub fn fft_order_for(sample_rate: f64, policy: CorrectionPolicy) -> u32 {
    let base = match policy {
        CorrectionPolicy::Matched => 9,
        CorrectionPolicy::Mixed => 11,
        CorrectionPolicy::Zero => 10,
    };
    let bump = if sample_rate <= 50_000.0 {
        0
    } else if sample_rate <= 100_000.0 {
        1
    } else if sample_rate <= 200_000.0 {
        2
    } else {
        3
    };
    base + bump
}
