//! Composes a [`Tracker`], the knee-shaped portion curve (§4.7) and a
//! [`Follower`] into the per-sample gain portion that
//! [`crate::dynamic_filter`] scales a band's target gain by. `p` in
//! `[0, 1]` is zero at/below `threshold - knee/2`, one at/above
//! `threshold + knee/2`, and a squared ramp through the knee. A pair of
//! decaying [`Histogram`]s track the side level's recent distribution so
//! `dynamic_learn` can estimate threshold/knee and `dynamic_relative` can
//! offset the threshold by the side signal's measured loudness (§4.6).

use crate::dynamics::{Follower, Tracker, TrackerMode};
use crate::histogram::Histogram;

const MIN_DB: f64 = -100.0;
const HIST_BINS: usize = 100;
const HIST_MIN_DB: f64 = -100.0;
const HIST_MAX_DB: f64 = 0.0;

#[inline]
fn amplitude_to_db(x: f64) -> f64 {
    if x <= 1e-10 {
        MIN_DB
    } else {
        20.0 * x.log10()
    }
}

/// §4.7 step 2: zero at/below `threshold - knee/2`, one at/above
/// `threshold + knee/2`, a squared ramp in between.
#[inline]
fn portion_from_db(level_db: f64, threshold_db: f64, knee_db: f64) -> f64 {
    let knee = (knee_db * 0.5).max(1e-6);
    let low = threshold_db - knee;
    let slope = 0.5 / knee;
    ((level_db - low) * slope).clamp(0.0, 1.0).powi(2)
}

#[derive(Debug, Clone)]
pub struct DynamicSideHandler {
    tracker: Tracker,
    follower: Follower,
    threshold_db: f64,
    knee_db: f64,
    relative: bool,
    learn: bool,
    /// Short half-life (~10 s): p90-p10 spread estimates the knee.
    short_hist: Histogram,
    /// Long half-life (~100 s): the median estimates the threshold.
    long_hist: Histogram,
}

impl Default for DynamicSideHandler {
    fn default() -> Self {
        Self {
            tracker: Tracker::new(TrackerMode::Rms),
            follower: Follower::default(),
            threshold_db: -18.0,
            knee_db: 6.0,
            relative: false,
            learn: false,
            short_hist: Histogram::new(HIST_BINS, HIST_MIN_DB, HIST_MAX_DB),
            long_hist: Histogram::new(HIST_BINS, HIST_MIN_DB, HIST_MAX_DB),
        }
    }
}

impl DynamicSideHandler {
    pub fn prepare(&mut self, sample_rate: f64, rms_window_seconds: f64) {
        self.tracker.prepare(sample_rate, rms_window_seconds);
        self.follower.prepare(sample_rate);
        // Half-life 10s / 100s: decay^(sr*halflife) = 0.1.
        self.short_hist.set_decay_rate(0.1_f64.powf(1.0 / (10.0 * sample_rate)));
        self.long_hist.set_decay_rate(0.1_f64.powf(1.0 / (100.0 * sample_rate)));
    }

    pub fn set_tracker_mode(&mut self, mode: TrackerMode) {
        self.tracker = Tracker::new(mode);
    }

    pub fn set_threshold(&mut self, threshold_db: f64) {
        self.threshold_db = threshold_db;
    }

    pub fn set_knee(&mut self, knee_db: f64) {
        self.knee_db = knee_db.max(0.0);
    }

    /// Threshold is offset by the side signal's measured long-term loudness
    /// (the long histogram's median) instead of read as an absolute dBFS
    /// value.
    pub fn set_relative(&mut self, relative: bool) {
        self.relative = relative;
    }

    /// Threshold and knee are overridden every sample by the histograms'
    /// learned estimate instead of the configured fixed values.
    pub fn set_learn(&mut self, learn: bool) {
        self.learn = learn;
    }

    pub fn set_attack_release(&mut self, attack_ms: f64, release_ms: f64, smooth_portion: f64) {
        self.follower.update(attack_ms, release_ms, smooth_portion);
    }

    /// Feeds one side-chain sample, returns the smoothed gain portion in
    /// `[0, 1]` that scales the band's max dynamic gain.
    #[inline]
    pub fn process_sample(&mut self, side: f64) -> f64 {
        let level = self.tracker.track(side);
        let level_db = amplitude_to_db(level);
        self.short_hist.push(level_db);
        self.long_hist.push(level_db);

        let threshold_db = if self.learn {
            self.long_hist.value_at_percentile(0.5)
        } else if self.relative {
            self.long_hist.value_at_percentile(0.5) + self.threshold_db
        } else {
            self.threshold_db
        };
        let knee_db = if self.learn {
            let p90 = self.short_hist.value_at_percentile(0.9);
            let p10 = self.short_hist.value_at_percentile(0.1);
            (p90 - p10).max(0.0)
        } else {
            self.knee_db
        };

        let raw_portion = portion_from_db(level_db, threshold_db, knee_db);
        self.follower.process_sample(raw_portion)
    }

    pub fn reset(&mut self) {
        self.tracker.reset();
        self.follower.reset();
        self.short_hist.reset();
        self.long_hist.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn silence_produces_zero_portion() {
        let mut h = DynamicSideHandler::default();
        h.prepare(48000.0, 0.01);
        h.set_threshold(-18.0);
        h.set_knee(6.0);
        h.set_attack_release(5.0, 50.0, 1.0);
        let mut portion = 1.0;
        for _ in 0..2000 {
            portion = h.process_sample(0.0);
        }
        assert!(portion < 0.01, "portion = {portion}");
    }

    #[test]
    fn loud_signal_above_threshold_ramps_portion_up() {
        let mut h = DynamicSideHandler::default();
        h.prepare(48000.0, 0.01);
        h.set_threshold(-18.0);
        h.set_knee(0.0);
        h.set_attack_release(1.0, 50.0, 1.0);
        let mut portion = 0.0;
        for _ in 0..4000 {
            portion = h.process_sample(0.9);
        }
        assert!(portion > 0.1, "portion = {portion}");
    }

    #[test]
    fn steady_state_at_upper_knee_edge_saturates_to_one() {
        // §8 Dynamic law: at dB = T + W/2 + delta, steady-state p = 1.
        let mut h = DynamicSideHandler::default();
        h.prepare(48000.0, 0.0);
        h.set_threshold(-18.0);
        h.set_knee(6.0);
        h.set_attack_release(1.0, 1.0, 1.0);
        // -18 + 3 (W/2) + 3 dB margin = -12 dBFS constant tone.
        let amplitude = 10f64.powf(-12.0 / 20.0);
        let mut portion = 0.0;
        for _ in 0..4000 {
            portion = h.process_sample(amplitude);
        }
        assert!(portion > 0.999, "portion = {portion}");
    }

    #[test]
    fn steady_state_below_lower_knee_edge_is_zero() {
        let mut h = DynamicSideHandler::default();
        h.prepare(48000.0, 0.0);
        h.set_threshold(-18.0);
        h.set_knee(6.0);
        h.set_attack_release(1.0, 1.0, 1.0);
        // -18 - 3 (W/2) - 3 dB margin = -24 dBFS constant tone.
        let amplitude = 10f64.powf(-24.0 / 20.0);
        let mut portion = 1.0;
        for _ in 0..4000 {
            portion = h.process_sample(amplitude);
        }
        assert!(portion < 0.001, "portion = {portion}");
    }

    #[test]
    fn learn_estimates_threshold_near_measured_loudness() {
        let mut h = DynamicSideHandler::default();
        h.prepare(48000.0, 0.0);
        h.set_learn(true);
        h.set_attack_release(1.0, 1.0, 1.0);
        let amplitude = 10f64.powf(-20.0 / 20.0);
        for _ in 0..480_000 {
            h.process_sample(amplitude);
        }
        let learned = h.long_hist.value_at_percentile(0.5);
        assert!((-22.0..=-18.0).contains(&learned), "learned threshold = {learned}");
    }
}
