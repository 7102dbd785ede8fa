//! Cascading a high-order slope into second-order (and, for odd orders, one
//! first-order) sections (§4.2). Per-section Qs are staggered around the
//! base Q so the cascade's magnitude approaches a Butterworth-like shape at
//! `w0` while still reducing to the user's single Q when `order == 2`.

use crate::coeffs::{ideal, matched, Coeffs4, Coeffs6};
use crate::MAX_CASCADE;
use eq_core::FilterType;
use std::f64::consts::PI;

/// Per-section Qs for a `2k`-order cascade at base Q `q0`, matching the
/// staggering used by a cascaded Butterworth design.
pub(crate) fn stagger_qs(order: usize, q0: f64) -> Vec<f64> {
    let k = (order / 2).max(1);
    if k == 1 {
        return vec![q0];
    }
    let theta0 = PI / (4.0 * k as f64);
    let scale = (std::f64::consts::SQRT_2 * q0).powf(1.0 / k as f64);
    let rescale_base = (std::f64::consts::SQRT_2 * q0).log10() / (order as f64).powf(1.5) * 12.0;
    (0..k)
        .map(|i| {
            let theta = theta0 * (2 * i + 1) as f64;
            let centered = i as f64 - k as f64 / 2.0 + 0.5;
            let rescale = centered * rescale_base;
            (1.0 / (2.0 * theta.cos())) * scale * 2f64.powf(rescale)
        })
        .collect()
}

/// A fixed-capacity list of second-order coefficient sets plus an optional
/// leading first-order section, as produced by [`cascade`].
#[derive(Debug, Clone, Default)]
pub struct DesignedCascade {
    pub first_order: Option<Coeffs4>,
    pub sections: Vec<Coeffs6>,
}

impl DesignedCascade {
    pub fn len(&self) -> usize {
        self.sections.len() + self.first_order.is_some() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Cascades `filter_type` at digital frequency `w0` (radians/sample), base
/// Q `q0` and gain `gain_db`, into up to [`MAX_CASCADE`] second-order
/// sections, picking the matched-z coefficient family per section.
pub fn cascade(filter_type: FilterType, order: usize, w0: f64, q0: f64, gain_db: f64) -> DesignedCascade {
    let gain_linear = 10f64.powf(gain_db / 20.0);
    match filter_type {
        FilterType::LowPass | FilterType::HighPass => {
            let qs = stagger_qs(order, q0);
            let sections = qs
                .iter()
                .take(MAX_CASCADE)
                .map(|&q| match filter_type {
                    FilterType::LowPass => matched::get2_low_pass(w0, q),
                    _ => matched::get2_high_pass(w0, q),
                })
                .collect();
            DesignedCascade { first_order: None, sections }
        }
        FilterType::BandPass | FilterType::Notch => {
            let k = (order / 2).max(1).min(MAX_CASCADE);
            let edge_q = q0 * equal_ripple_edge_factor(order);
            let sections = (0..k)
                .map(|_| match filter_type {
                    FilterType::BandPass => matched::get2_band_pass(w0, edge_q),
                    _ => matched::get2_notch(w0, edge_q),
                })
                .collect();
            DesignedCascade { first_order: None, sections }
        }
        FilterType::Peak if order >= 4 => {
            let bandwidth_octaves = 1.0 / q0;
            let low_w0 = w0 * 2f64.powf(-bandwidth_octaves / 2.0);
            let high_w0 = w0 * 2f64.powf(bandwidth_octaves / 2.0);
            DesignedCascade {
                first_order: None,
                sections: vec![
                    matched::get2_low_shelf(low_w0, gain_linear, q0),
                    matched::get2_high_shelf(high_w0, gain_linear, q0),
                ],
            }
        }
        FilterType::BandShelf => {
            let bandwidth_octaves = 1.0 / q0;
            let low_w0 = w0 * 2f64.powf(-bandwidth_octaves / 2.0);
            let high_w0 = w0 * 2f64.powf(bandwidth_octaves / 2.0);
            DesignedCascade {
                first_order: None,
                sections: vec![
                    matched::get2_low_shelf(low_w0, gain_linear, q0),
                    matched::get2_high_shelf(high_w0, gain_linear, q0),
                ],
            }
        }
        FilterType::Peak => DesignedCascade {
            first_order: None,
            sections: vec![matched::get2_peak(w0, gain_linear, q0)],
        },
        FilterType::LowShelf => {
            if order == 1 {
                DesignedCascade { first_order: Some(ideal::get1_low_shelf(w0, gain_linear)), sections: vec![] }
            } else {
                DesignedCascade { first_order: None, sections: vec![matched::get2_low_shelf(w0, gain_linear, q0)] }
            }
        }
        FilterType::HighShelf => {
            if order == 1 {
                DesignedCascade { first_order: Some(ideal::get1_high_shelf(w0, gain_linear)), sections: vec![] }
            } else {
                DesignedCascade { first_order: None, sections: vec![matched::get2_high_shelf(w0, gain_linear, q0)] }
            }
        }
        FilterType::TiltShelf => {
            if order == 1 {
                DesignedCascade { first_order: Some(ideal::get1_tilt_shelf(w0, gain_linear)), sections: vec![] }
            } else {
                DesignedCascade { first_order: None, sections: vec![matched::get2_tilt_shelf(w0, gain_linear, q0)] }
            }
        }
    }
}

/// Approximates a cascade's required per-section Q so the combined
/// `-6/n` dB-per-section roll-off lands on the usual Butterworth target.
pub(crate) fn equal_ripple_edge_factor(order: usize) -> f64 {
    let k = (order / 2).max(1) as f64;
    1.0 / (2.0 * (PI / (4.0 * k)).cos())
}
