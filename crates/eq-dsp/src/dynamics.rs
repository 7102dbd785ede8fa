//! Side-chain dynamics building blocks (§4.6): a level tracker, a
//! three-mode envelope follower and a soft-knee gain computer. These three
//! compose in `dynamic_side` into the per-sample gain portion that drives a
//! dynamic band.

use std::f64::consts::PI;

/// Converts a side-chain sample into a tracked level. RMS averages energy
/// over a short window; Peak follows `|x|` directly, smoothed only by the
/// downstream follower.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerMode {
    Peak,
    Rms,
}

/// A boxcar RMS tracker: a ring sized to the averaging window holds the
/// last `N` squared samples, and each push adds the incoming square and
/// subtracts the one falling out of the window, so `sum_squared / N` is
/// always the instantaneous mean-square over exactly the last `N` samples
/// (no exponential tail, unlike a one-pole smoother).
#[derive(Debug, Clone)]
pub struct Tracker {
    mode: TrackerMode,
    ring: Vec<f64>,
    pos: usize,
    sum_squared: f64,
}

impl Tracker {
    pub fn new(mode: TrackerMode) -> Self {
        Self { mode, ring: vec![0.0], pos: 0, sum_squared: 0.0 }
    }

    /// `window_seconds` sizes the RMS ring; ignored in Peak mode. A window
    /// of zero collapses the ring to one sample, i.e. instantaneous `|x|`.
    pub fn prepare(&mut self, sample_rate: f64, window_seconds: f64) {
        let len = ((sample_rate * window_seconds.max(0.0)).round() as usize).max(1);
        self.ring = vec![0.0; len];
        self.pos = 0;
        self.sum_squared = 0.0;
    }

    #[inline]
    pub fn track(&mut self, x: f64) -> f64 {
        match self.mode {
            TrackerMode::Peak => x.abs(),
            TrackerMode::Rms => {
                let sq = x * x;
                self.sum_squared += sq - self.ring[self.pos];
                self.ring[self.pos] = sq;
                self.pos = (self.pos + 1) % self.ring.len();
                (self.sum_squared.max(0.0) / self.ring.len() as f64).sqrt()
            }
        }
    }

    pub fn reset(&mut self) {
        self.ring.iter_mut().for_each(|bin| *bin = 0.0);
        self.sum_squared = 0.0;
        self.pos = 0;
    }
}

/// Follower smoothing state, chosen per-block from `smooth_portion` so the
/// per-sample path never branches on a threshold comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FollowerState {
    /// `smooth_portion` below ~1e-4: following is a no-op, input passes straight through.
    Off,
    /// `smooth_portion` above ~0.9999: a single one-pole filter, attack and
    /// release coefficients collapse onto the same path.
    Full,
    /// General case: two one-pole stages, gated by whether the input rose or fell.
    Mix,
}

/// A one-pole attack/release envelope follower in the style of the original
/// `PSFollower`: `smooth_portion` biases how much of the step the follower's
/// *first* stage contributes versus the portion carried straight through,
/// letting the same structure span from "off" to "fully smoothed".
#[derive(Debug, Clone)]
pub struct Follower {
    exp_factor: f64,
    attack: f64,
    release: f64,
    smooth_portion: f64,
    state: FollowerState,
    last: f64,
}

impl Default for Follower {
    fn default() -> Self {
        Self {
            exp_factor: 0.0,
            attack: 0.0,
            release: 0.0,
            smooth_portion: 1.0,
            state: FollowerState::Full,
            last: 0.0,
        }
    }
}

impl Follower {
    pub fn prepare(&mut self, sample_rate: f64) {
        self.exp_factor = -2.0 * PI * 1000.0 / sample_rate;
    }

    /// `attack_ms`/`release_ms` are the standard exponential time constants;
    /// `smooth_portion` in `[0, 1]` selects Off/Mix/Full.
    pub fn update(&mut self, attack_ms: f64, release_ms: f64, smooth_portion: f64) {
        self.attack = (self.exp_factor / attack_ms.max(1e-6)).exp();
        self.release = (self.exp_factor / release_ms.max(1e-6)).exp();
        self.smooth_portion = smooth_portion.clamp(0.0, 1.0);
        self.state = if self.smooth_portion < 1e-4 {
            FollowerState::Off
        } else if self.smooth_portion > 0.9999 {
            FollowerState::Full
        } else {
            FollowerState::Mix
        };
    }

    #[inline]
    pub fn process_sample(&mut self, x: f64) -> f64 {
        let y = match self.state {
            FollowerState::Off => x,
            FollowerState::Full => {
                let coeff = if x > self.last { self.attack } else { self.release };
                coeff * self.last + (1.0 - coeff) * x
            }
            FollowerState::Mix => {
                let coeff = if x > self.last { self.attack } else { self.release };
                let smoothed = coeff * self.last + (1.0 - coeff) * x;
                self.smooth_portion * smoothed + (1.0 - self.smooth_portion) * x
            }
        };
        self.last = y;
        y
    }

    pub fn reset(&mut self) {
        self.last = 0.0;
    }
}

/// Soft-knee gain computer: below the knee it is transparent, above it is a
/// straight line at `1/ratio` slope, and inside the knee a quadratic blends
/// the two so the transfer curve has a continuous first derivative.
#[derive(Debug, Clone, Copy)]
pub struct Computer {
    threshold_db: f64,
    ratio: f64,
    knee_db: f64,
}

impl Default for Computer {
    fn default() -> Self {
        Self { threshold_db: 0.0, ratio: 1.0, knee_db: 0.0 }
    }
}

impl Computer {
    pub fn new(threshold_db: f64, ratio: f64, knee_db: f64) -> Self {
        Self { threshold_db, ratio: ratio.max(1.0), knee_db: knee_db.max(0.0) }
    }

    pub fn set_threshold(&mut self, threshold_db: f64) {
        self.threshold_db = threshold_db;
    }

    pub fn set_ratio(&mut self, ratio: f64) {
        self.ratio = ratio.max(1.0);
    }

    pub fn set_knee(&mut self, knee_db: f64) {
        self.knee_db = knee_db.max(0.0);
    }

    /// Maps an input level in dB to a gain reduction in dB (always `<= 0`).
    #[inline]
    pub fn gain_reduction_db(&self, level_db: f64) -> f64 {
        let half_knee = self.knee_db * 0.5;
        let delta = level_db - self.threshold_db;
        let slope = 1.0 / self.ratio - 1.0;

        if delta < -half_knee {
            0.0
        } else if delta > half_knee {
            slope * delta
        } else {
            let knee_pos = delta + half_knee;
            slope * knee_pos * knee_pos / (2.0 * self.knee_db.max(1e-9))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rms_tracker_converges_on_constant_amplitude() {
        let mut t = Tracker::new(TrackerMode::Rms);
        t.prepare(48000.0, 0.01);
        let mut level = 0.0;
        for _ in 0..48000 {
            level = t.track(0.5);
        }
        assert_relative_eq!(level, 0.5, epsilon = 1e-3);
    }

    #[test]
    fn peak_tracker_is_instantaneous() {
        let mut t = Tracker::new(TrackerMode::Peak);
        assert_eq!(t.track(-0.7), 0.7);
        assert_eq!(t.track(0.2), 0.2);
    }

    #[test]
    fn follower_off_state_passes_through() {
        let mut f = Follower::default();
        f.prepare(48000.0);
        f.update(10.0, 100.0, 0.0);
        assert_eq!(f.process_sample(0.8), 0.8);
        assert_eq!(f.process_sample(0.1), 0.1);
    }

    #[test]
    fn follower_full_state_smooths_a_step() {
        let mut f = Follower::default();
        f.prepare(48000.0);
        f.update(5.0, 5.0, 1.0);
        let mut y = 0.0;
        for _ in 0..10 {
            y = f.process_sample(1.0);
        }
        assert!(y > 0.0 && y < 1.0);
    }

    #[test]
    fn computer_below_knee_is_transparent() {
        let c = Computer::new(-18.0, 4.0, 6.0);
        assert_eq!(c.gain_reduction_db(-40.0), 0.0);
    }

    #[test]
    fn computer_above_knee_follows_ratio_slope() {
        let c = Computer::new(-18.0, 4.0, 0.0);
        let gr = c.gain_reduction_db(-8.0);
        // 10 dB over threshold, ratio 4:1, no knee: output rises 2.5 dB, so
        // gain reduction is -(10 - 2.5) = -7.5 dB.
        assert_relative_eq!(gr, -7.5, epsilon = 1e-9);
    }

    #[test]
    fn computer_knee_is_continuous_at_boundaries() {
        let c = Computer::new(-18.0, 4.0, 6.0);
        let just_inside = c.gain_reduction_db(-18.0 - 3.0 + 1e-6);
        let just_outside = c.gain_reduction_db(-18.0 - 3.0 - 1e-6);
        assert_relative_eq!(just_inside, just_outside, epsilon = 1e-3);
    }
}
