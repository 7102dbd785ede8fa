//! Analog-prototype response evaluation (§4.9 IdealFilter), used only to
//! compute target frequency responses for FIR correction — never to
//! process audio. Wraps [`crate::coeffs::ideal`] to aggregate a cascade's
//! magnitude and to evaluate a realized digital biquad's complex response
//! at `z = e^{jw}`.

use crate::coeffs::{ideal, Coeffs4, Coeffs6};
use crate::design::{equal_ripple_edge_factor, stagger_qs};
use crate::MAX_CASCADE;
use eq_core::FilterType;
use num_complex::Complex64;

/// Widens a first-order section into the six-tuple form (`a2 = b2 = 0`) so
/// it can be evaluated and cascaded alongside second-order sections.
#[inline]
fn widen(c: Coeffs4) -> Coeffs6 {
    [c[0], c[1], 0.0, c[2], c[3], 0.0]
}

/// Mirrors [`crate::design::cascade`]'s topology with analog-prototype
/// sections instead of realized digital ones, producing the "ideal" half of
/// a correction pair (§4.9, §4.11 step 4).
pub fn ideal_cascade(filter_type: FilterType, order: usize, w0: f64, q0: f64, gain_db: f64) -> Vec<Coeffs6> {
    let gain_linear = 10f64.powf(gain_db / 20.0);
    match filter_type {
        FilterType::LowPass | FilterType::HighPass => stagger_qs(order, q0)
            .iter()
            .take(MAX_CASCADE)
            .map(|&q| match filter_type {
                FilterType::LowPass => ideal::get2_low_pass(w0, q),
                _ => ideal::get2_high_pass(w0, q),
            })
            .collect(),
        FilterType::BandPass | FilterType::Notch => {
            let k = (order / 2).max(1).min(MAX_CASCADE);
            let edge_q = q0 * equal_ripple_edge_factor(order);
            (0..k)
                .map(|_| match filter_type {
                    FilterType::BandPass => ideal::get2_band_pass(w0, edge_q),
                    _ => ideal::get2_notch(w0, edge_q),
                })
                .collect()
        }
        FilterType::Peak if order >= 4 => {
            let bandwidth_octaves = 1.0 / q0;
            let low_w0 = w0 * 2f64.powf(-bandwidth_octaves / 2.0);
            let high_w0 = w0 * 2f64.powf(bandwidth_octaves / 2.0);
            vec![ideal::get2_low_shelf(low_w0, gain_linear, q0), ideal::get2_high_shelf(high_w0, gain_linear, q0)]
        }
        FilterType::BandShelf => {
            let bandwidth_octaves = 1.0 / q0;
            let low_w0 = w0 * 2f64.powf(-bandwidth_octaves / 2.0);
            let high_w0 = w0 * 2f64.powf(bandwidth_octaves / 2.0);
            vec![ideal::get2_low_shelf(low_w0, gain_linear, q0), ideal::get2_high_shelf(high_w0, gain_linear, q0)]
        }
        FilterType::Peak => vec![ideal::get2_peak(w0, gain_linear, q0)],
        FilterType::LowShelf => {
            if order == 1 {
                vec![widen(ideal::get1_low_shelf(w0, gain_linear))]
            } else {
                vec![ideal::get2_low_shelf(w0, gain_linear, q0)]
            }
        }
        FilterType::HighShelf => {
            if order == 1 {
                vec![widen(ideal::get1_high_shelf(w0, gain_linear))]
            } else {
                vec![ideal::get2_high_shelf(w0, gain_linear, q0)]
            }
        }
        FilterType::TiltShelf => {
            if order == 1 {
                vec![widen(ideal::get1_tilt_shelf(w0, gain_linear))]
            } else {
                vec![ideal::get2_tilt_shelf(w0, gain_linear, q0)]
            }
        }
    }
}

/// Analog-prototype and realized-digital section pairs for one band's
/// current static parameters, ready for [`response_grid`]. The digital half
/// mirrors [`crate::design::cascade`] exactly, widening its optional
/// first-order section into the same six-tuple form as the analog half.
pub fn analog_and_digital_sections(filter_type: FilterType, order: usize, w0: f64, q0: f64, gain_db: f64) -> (Vec<Coeffs6>, Vec<Coeffs6>) {
    let analog = ideal_cascade(filter_type, order, w0, q0, gain_db);
    let designed = crate::design::cascade(filter_type, order, w0, q0, gain_db);
    let mut digital = designed.sections;
    if let Some(first_order) = designed.first_order {
        digital.insert(0, widen(first_order));
    }
    (analog, digital)
}

/// Aggregate magnitude of a cascade of analog prototypes at `w`: the
/// product of each section's magnitude, since cascaded sections multiply.
pub fn cascade_magnitude(sections: &[Coeffs6], w: f64) -> f64 {
    sections.iter().fold(1.0, |acc, &c| acc * ideal::magnitude(c, w))
}

/// Aggregate complex response of a cascade of analog prototypes at `w`.
pub fn cascade_response(sections: &[Coeffs6], w: f64) -> Complex64 {
    sections.iter().fold(Complex64::new(1.0, 0.0), |acc, &c| acc * ideal::response(c, w))
}

/// Complex response of a realized digital biquad `[a0,a1,a2,b0,b1,b2]`
/// (`a0` normalized away) at `z = e^{jw}`:
/// `(b0 + b1*z⁻¹ + b2*z⁻²) / (1 + a1*z⁻¹ + a2*z⁻²)`.
#[inline]
pub fn digital_response(c: Coeffs6, w: f64) -> Complex64 {
    let z_inv = Complex64::from_polar(1.0, -w);
    let num = Complex64::new(c[3], 0.0) + Complex64::new(c[4], 0.0) * z_inv + Complex64::new(c[5], 0.0) * z_inv * z_inv;
    let den = Complex64::new(1.0, 0.0) + Complex64::new(c[1] / c[0], 0.0) * z_inv + Complex64::new(c[2] / c[0], 0.0) * z_inv * z_inv;
    num / den
}

/// Aggregate complex response of a digital cascade at `z = e^{jw}`.
pub fn digital_cascade_response(sections: &[Coeffs6], w: f64) -> Complex64 {
    sections.iter().fold(Complex64::new(1.0, 0.0), |acc, &c| acc * digital_response(c, w))
}

/// Evaluates both the analog-prototype and the realized digital responses
/// across a frequency grid (in radians/sample), returning `(ideal, realized)`
/// pairs suitable for [`crate::correction`]'s bin-wise division.
pub fn response_grid(analog_sections: &[Coeffs6], digital_sections: &[Coeffs6], grid: &[f64]) -> Vec<(Complex64, Complex64)> {
    grid.iter()
        .map(|&w| (cascade_response(analog_sections, w), digital_cascade_response(digital_sections, w)))
        .collect()
}
