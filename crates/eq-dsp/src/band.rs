//! The logical Band entity (§3 Data Model): parameters, dynamic state and
//! routing, dispatched by `(status, dynamic_on, dynamic_bypass)`.
//!
//! A band owns two independent filter-state instances, `primary` and
//! `secondary`. Left/Right/Mid/Side routing only ever drives one buffer
//! and uses `primary` alone; `Stereo` routing drives both channels
//! independently and needs `secondary` so the left and right chains don't
//! share TDF/SVF state.

use crate::dynamic_filter::DynamicFilter;
use eq_core::{BandStatus, DynamicParameters, FilterParameters, FilterType, StereoMode};

pub struct Band {
    pub params: FilterParameters,
    pub dynamic_params: DynamicParameters,
    pub status: BandStatus,
    pub stereo_mode: StereoMode,
    pub dynamic_on: bool,
    pub dynamic_bypass: bool,
    pub side_swap: bool,
    primary: DynamicFilter,
    secondary: DynamicFilter,
    w0: f64,
}

impl Band {
    pub fn new(kernel: &str) -> Self {
        Self {
            params: FilterParameters::default(),
            dynamic_params: DynamicParameters::default(),
            status: BandStatus::Off,
            stereo_mode: StereoMode::Stereo,
            dynamic_on: false,
            dynamic_bypass: false,
            side_swap: false,
            primary: DynamicFilter::new(kernel),
            secondary: DynamicFilter::new(kernel),
            w0: 0.1,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.primary.prepare(sample_rate);
        self.secondary.prepare(sample_rate);
    }

    /// Dynamic is only legal for Peak/Shelf/Tilt types (§3); the controller
    /// clears it here whenever the filter type changes to something else.
    pub fn set_dynamic_on(&mut self, on: bool) {
        self.dynamic_on = on && self.params.filter_type.supports_dynamic();
        self.primary.set_dynamic_on(self.dynamic_on);
        self.secondary.set_dynamic_on(self.dynamic_on);
    }

    pub fn set_dynamic_range_db(&mut self, range_db: f64) {
        self.primary.set_dynamic_range_db(range_db);
        self.secondary.set_dynamic_range_db(range_db);
    }

    pub fn set_dynamic_bypass(&mut self, bypass: bool) {
        self.dynamic_bypass = bypass;
        self.primary.set_dynamic_bypass(bypass);
        self.secondary.set_dynamic_bypass(bypass);
    }

    /// Threshold, knee, attack, release, relative and learn (§4.11); pushed
    /// identically into both channels' side handlers.
    pub fn set_dynamic_params(&mut self, params: DynamicParameters) {
        self.dynamic_params = params;
        self.primary.set_dynamic_params(params);
        self.secondary.set_dynamic_params(params);
    }

    /// Status transition: `Off -> any` resets both channels' kernels;
    /// `any -> Off` retains state but the band stops contributing. Entering
    /// dynamic (`dynamic_on` false -> true) separately resets the follower
    /// and histograms, handled in `DynamicFilter::set_dynamic_on`.
    pub fn set_status(&mut self, new_status: BandStatus) {
        let entering_from_off = self.status == BandStatus::Off && new_status != BandStatus::Off;
        self.status = new_status;
        if entering_from_off {
            self.primary.reset();
            self.secondary.reset();
        }
    }

    pub fn set_params(&mut self, sample_rate_hz: f64, params: FilterParameters) {
        self.params = params;
        self.w0 = 2.0 * std::f64::consts::PI * params.freq / sample_rate_hz;
        self.reload();
    }

    fn reload(&mut self) {
        if self.dynamic_on {
            self.primary.retarget(self.params.gain_db, self.params.q);
            self.secondary.retarget(self.params.gain_db, self.params.q);
        } else {
            let order = self.params.order.as_usize();
            self.primary.reload_static(self.params.filter_type, order, self.w0, self.params.gain_db, self.params.q);
            self.secondary.reload_static(self.params.filter_type, order, self.w0, self.params.gain_db, self.params.q);
        }
    }

    pub fn is_active(&self) -> bool {
        self.status != BandStatus::Off
    }

    /// The side-handler driving this band's dynamic gain portion on its
    /// primary channel. Routing modes other than `Stereo` only ever touch
    /// `primary`, so this is the one side-chain state that matters for
    /// them; `Stereo` mode's secondary (right) channel tracks its own side
    /// independently via `secondary`.
    pub fn side_handler_mut(&mut self) -> &mut crate::dynamic_side::DynamicSideHandler {
        self.primary.side_handler_mut()
    }

    pub fn secondary_side_handler_mut(&mut self) -> &mut crate::dynamic_side::DynamicSideHandler {
        self.secondary.side_handler_mut()
    }

    /// Dispatches processing by `(status, dynamic_on, dynamic_bypass)`
    /// through the primary (left/mono) channel state; one of the 2^3
    /// specializations named in §4.13 step 2.
    pub fn process_block(&mut self, main: &mut [f64], side: &[f64]) {
        Self::dispatch(self.status, &mut self.primary, main, side);
    }

    /// As [`Band::process_block`] but through the secondary (right
    /// channel, `Stereo`-mode only) state.
    pub fn process_block_secondary(&mut self, main: &mut [f64], side: &[f64]) {
        Self::dispatch(self.status, &mut self.secondary, main, side);
    }

    fn dispatch(status: BandStatus, filter: &mut DynamicFilter, main: &mut [f64], side: &[f64]) {
        match status {
            BandStatus::Off => {}
            BandStatus::Bypass => {
                let mut scratch = main.to_vec();
                filter.process_block(&mut scratch, side);
            }
            BandStatus::On => {
                filter.process_block(main, side);
            }
        }
    }

    pub fn reports_gain(&self) -> bool {
        self.params.filter_type.uses_gain()
    }

    pub fn filter_type(&self) -> FilterType {
        self.params.filter_type
    }

    /// Analog-prototype and realized-digital section pairs for this band's
    /// current static parameters (§4.11 step 4 correction wiring). `None`
    /// for off or dynamic bands: a dynamic band re-derives coefficients
    /// every sample and has no single target response to correct toward.
    pub fn correction_sections(&self) -> Option<(Vec<crate::coeffs::Coeffs6>, Vec<crate::coeffs::Coeffs6>)> {
        if !self.is_active() || self.dynamic_on {
            return None;
        }
        let p = &self.params;
        Some(crate::ideal_filter::analog_and_digital_sections(p.filter_type, p.order.as_usize(), self.w0, p.q, p.gain_db))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn off_band_leaves_buffer_untouched() {
        let mut b = Band::new("tdf");
        b.prepare(48000.0);
        b.set_status(BandStatus::Off);
        let mut buf = vec![0.3, 0.5, -0.2];
        let original = buf.clone();
        b.process_block(&mut buf, &[]);
        assert_eq!(buf, original);
    }

    #[test]
    fn bypass_runs_filter_but_does_not_write_output() {
        let mut b = Band::new("tdf");
        b.prepare(48000.0);
        b.set_params(48000.0, FilterParameters::new(FilterType::LowPass, eq_core::FilterOrder::O2, 500.0, 0.0, 0.707));
        b.set_status(BandStatus::Bypass);
        let mut buf = vec![1.0; 100];
        let original = buf.clone();
        b.process_block(&mut buf, &[]);
        assert_eq!(buf, original);
    }

    #[test]
    fn on_off_transition_resets_filter_state() {
        let mut b = Band::new("tdf");
        b.prepare(48000.0);
        b.set_params(48000.0, FilterParameters::new(FilterType::Peak, eq_core::FilterOrder::O2, 1000.0, 6.0, 1.0));
        b.set_status(BandStatus::On);
        let mut buf = vec![1.0; 200];
        b.process_block(&mut buf, &[]);
        b.set_status(BandStatus::Off);
        b.set_status(BandStatus::On);
        // After Off -> On, the kernel was reset; an impulse response should
        // match a freshly constructed band's.
        let mut fresh = Band::new("tdf");
        fresh.prepare(48000.0);
        fresh.set_params(48000.0, FilterParameters::new(FilterType::Peak, eq_core::FilterOrder::O2, 1000.0, 6.0, 1.0));
        fresh.set_status(BandStatus::On);
        let mut a = vec![1.0, 0.0, 0.0];
        let mut c = vec![1.0, 0.0, 0.0];
        b.process_block(&mut a, &[]);
        fresh.process_block(&mut c, &[]);
        assert_eq!(a, c);
    }

    #[test]
    fn dynamic_is_cleared_for_non_gain_filter_types() {
        let mut b = Band::new("tdf");
        b.params.filter_type = FilterType::BandPass;
        b.set_dynamic_on(true);
        assert!(!b.dynamic_on);
    }

    #[test]
    fn primary_and_secondary_channels_have_independent_state() {
        let mut b = Band::new("tdf");
        b.prepare(48000.0);
        b.set_params(48000.0, FilterParameters::new(FilterType::LowPass, eq_core::FilterOrder::O2, 500.0, 0.0, 0.707));
        b.set_status(BandStatus::On);
        let mut left = vec![1.0; 50];
        b.process_block(&mut left, &[]);
        // secondary has never processed anything, so its first output
        // should match a fresh filter's first output, not be influenced by
        // primary's accumulated state.
        let mut right = vec![1.0; 1];
        b.process_block_secondary(&mut right, &[]);
        let mut fresh = Band::new("tdf");
        fresh.prepare(48000.0);
        fresh.set_params(48000.0, FilterParameters::new(FilterType::LowPass, eq_core::FilterOrder::O2, 500.0, 0.0, 0.707));
        fresh.set_status(BandStatus::On);
        let mut fresh_out = vec![1.0; 1];
        fresh.process_block(&mut fresh_out, &[]);
        assert_eq!(right, fresh_out);
    }
}
