//! State-variable (Chamberlin/Zavalishin) biquad cascade, used when
//! per-sample coefficient automation (dynamic EQ) is in play: its mix
//! coefficients make the filter well-behaved under rapid modulation where
//! TDF-II can ring.

use crate::coeffs::Coeffs6;
use crate::{Processor, MAX_CASCADE};

#[derive(Debug, Clone, Copy, Default)]
struct SvfSection {
    g: f64,
    r2: f64,
    h: f64,
    chp: f64,
    cbp: f64,
    clp: f64,
    s1: f64,
    s2: f64,
}

impl SvfSection {
    fn update(&mut self, c: Coeffs6) {
        let (a0, a1, a2, b0, b1, b2) = (c[0], c[1], c[2], c[3], c[4], c[5]);
        let t1 = (-a0 - a1 - a2).abs().sqrt();
        let t2 = (-a0 + a1 - a2).abs().sqrt();
        let t2_safe = if t2.abs() < 1e-18 { 1e-18 } else { t2 };
        self.g = t1 / t2_safe;
        self.r2 = 2.0 * (a0 - a2) / (t1 * t2_safe);
        self.h = 1.0 / (self.g * (self.r2 + self.g) + 1.0);

        let denom_hp = a0 - a1 + a2;
        let denom_lp = a0 + a1 + a2;
        self.chp = if denom_hp.abs() > 1e-18 { (b0 - b1 + b2) / denom_hp } else { 0.0 };
        self.cbp = 2.0 * (b2 - b0) / (t1 * t2_safe);
        self.clp = if denom_lp.abs() > 1e-18 { (b0 + b1 + b2) / denom_lp } else { 0.0 };

        if !self.g.is_finite() || !self.h.is_finite() {
            self.g = 0.0;
            self.r2 = 0.0;
            self.h = 1.0;
            self.chp = 1.0;
            self.cbp = 0.0;
            self.clp = 0.0;
        }
    }

    #[inline]
    fn process(&mut self, x: f64) -> f64 {
        let y_hp = self.h * (x - self.s1 * (self.g + self.r2) - self.s2);
        let y_bp = y_hp * self.g + self.s1;
        self.s1 = y_hp * self.g + y_bp;
        let y_lp = y_bp * self.g + self.s2;
        self.s2 = y_bp * self.g + y_lp;
        self.chp * y_hp + self.cbp * y_bp + self.clp * y_lp
    }

    /// Keeps state warm (for Bypass status) without the weighted mix.
    #[inline]
    fn process_bypass(&mut self, x: f64) -> f64 {
        let y_hp = self.h * (x - self.s1 * (self.g + self.r2) - self.s2);
        let y_bp = y_hp * self.g + self.s1;
        self.s1 = y_hp * self.g + y_bp;
        let y_lp = y_bp * self.g + self.s2;
        self.s2 = y_bp * self.g + y_lp;
        y_hp - self.r2 * y_bp + y_lp
    }

    fn reset(&mut self) {
        self.s1 = 0.0;
        self.s2 = 0.0;
    }
}

#[derive(Debug, Clone)]
pub struct SvfCascade {
    sections: [SvfSection; MAX_CASCADE],
    count: usize,
}

impl Default for SvfCascade {
    fn default() -> Self {
        Self {
            sections: [SvfSection::default(); MAX_CASCADE],
            count: 0,
        }
    }
}

impl SvfCascade {
    pub fn set_cascade(&mut self, coeffs: &[Coeffs6]) {
        self.count = coeffs.len().min(MAX_CASCADE);
        for (section, c) in self.sections.iter_mut().zip(coeffs.iter()) {
            section.update(*c);
        }
    }

    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        let mut x = input;
        for section in &mut self.sections[..self.count] {
            x = section.process(x);
        }
        x
    }

    #[inline]
    pub fn process_sample_bypass(&mut self, input: f64) -> f64 {
        let mut x = input;
        for section in &mut self.sections[..self.count] {
            x = section.process_bypass(x);
        }
        x
    }

    pub fn process_block(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

impl Processor for SvfCascade {
    fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coeffs::matched;
    use crate::kernel::TdfCascade;

    #[test]
    fn svf_agrees_with_tdf_on_lowpass() {
        let c = matched::get2_low_pass(0.3, 0.8);
        let mut svf = SvfCascade::default();
        svf.set_cascade(&[c]);
        let mut tdf = TdfCascade::default();
        tdf.set_cascade(&[c]);

        let input: Vec<f64> = (0..500).map(|i| (i as f64 * 0.037).sin()).collect();
        let mut max_diff = 0.0_f64;
        for &x in &input {
            let a = svf.process_sample(x);
            let b = tdf.process_sample(x);
            max_diff = max_diff.max((a - b).abs());
        }
        assert!(max_diff < 1e-3, "max_diff = {max_diff}");
    }
}
