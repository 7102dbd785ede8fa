//! Parallel peak/shelf topology: `dry + (10^(gain/20) - 1) * aux`, where
//! `aux` is the dry signal run through a matching band-pass (Peak),
//! low-pass (LowShelf) or high-pass (HighShelf) cascade. A gain-only change
//! costs one multiply; the aux cascade is untouched.

use crate::coeffs::{matched, Coeffs6};
use crate::kernel::TdfCascade;
use crate::Processor;
use eq_core::FilterType;

#[derive(Debug, Clone, Default)]
pub struct ParallelCascade {
    aux: TdfCascade,
    multiplier: f64,
}

impl ParallelCascade {
    /// Designs the auxiliary pass cascade for the given type, capped at
    /// order 4 for Peak and order 2 for shelves (§4.3).
    pub fn set_design(&mut self, filter_type: FilterType, w0: f64, q: f64, order: usize) {
        let k = match filter_type {
            FilterType::Peak => (order / 2).clamp(1, 2),
            _ => 1,
        };
        let mut sections: Vec<Coeffs6> = Vec::with_capacity(k);
        for _ in 0..k {
            let section = match filter_type {
                FilterType::Peak => matched::get2_band_pass(w0, q),
                FilterType::LowShelf => matched::get2_low_pass(w0, q),
                FilterType::HighShelf => matched::get2_high_pass(w0, q),
                _ => crate::coeffs::PASS_THROUGH,
            };
            sections.push(section);
        }
        self.aux.set_cascade(&sections);
    }

    #[inline]
    pub fn set_gain_db(&mut self, gain_db: f64) {
        self.multiplier = 10f64.powf(gain_db / 20.0) - 1.0;
    }

    #[inline]
    pub fn process_sample(&mut self, dry: f64) -> f64 {
        let aux = self.aux.process_sample(dry);
        dry + self.multiplier * aux
    }

    pub fn process_block(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

impl Processor for ParallelCascade {
    fn reset(&mut self) {
        self.aux.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_gain_is_transparent() {
        let mut p = ParallelCascade::default();
        p.set_design(FilterType::Peak, 0.3, 1.0, 2);
        p.set_gain_db(0.0);
        assert_eq!(p.process_sample(0.42), 0.42);
    }

    #[test]
    fn positive_gain_boosts_band() {
        let mut p = ParallelCascade::default();
        p.set_design(FilterType::Peak, 0.3, 1.0, 2);
        p.set_gain_db(6.0);
        let mut out = 0.0;
        for i in 0..200 {
            out = p.process_sample((i as f64 * 0.3).sin());
        }
        assert!(out.is_finite());
    }
}
