//! eq-dsp: the real-time processing core of a dynamic parametric equalizer.
//!
//! ## Modules
//! - `coeffs` - analog prototype and matched-z (Vicanek) biquad coefficient families
//! - `design` - cascading a filter order into second-order sections
//! - `kernel` - TDF, SVF and parallel realization kernels
//! - `empty_cell` - lock-free parameter hand-off from control to audio thread
//! - `smoothing` - per-sample parameter ramps
//! - `dynamics` - side-chain tracker, follower and soft-knee computer
//! - `histogram` - decaying streaming histogram for auto threshold/knee learning
//! - `dynamic_side` - composes follower + computer into a per-sample gain portion
//! - `dynamic_filter` - wraps a kernel with dynamic gain/Q modulation
//! - `ideal_filter` - analog-prototype response evaluation
//! - `correction` - FFT overlap-add correction and its per-structure vector calculator
//! - `ms` - in-place mid/side splitting
//! - `band` - the logical Band entity and its dispatch
//! - `controller` - the top-level orchestrator

pub mod band;
pub mod coeffs;
pub mod controller;
pub mod correction;
pub mod design;
pub mod dynamic_filter;
pub mod dynamic_side;
pub mod dynamics;
pub mod empty_cell;
pub mod histogram;
pub mod ideal_filter;
pub mod kernel;
pub mod ms;
pub mod smoothing;

use eq_core::Sample;

/// Shared lifecycle for anything holding per-channel filter state.
pub trait Processor: Send + Sync {
    fn reset(&mut self);

    /// Latency contributed by this stage, in samples.
    fn latency(&self) -> usize {
        0
    }
}

/// A processor operating on one channel at a time.
pub trait MonoProcessor: Processor {
    fn process_sample(&mut self, input: Sample) -> Sample;

    fn process_block(&mut self, buffer: &mut [Sample]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }
}

/// A processor operating on a stereo pair jointly.
pub trait StereoProcessor: Processor {
    fn process_sample(&mut self, left: Sample, right: Sample) -> (Sample, Sample);

    fn process_block(&mut self, left: &mut [Sample], right: &mut [Sample]) {
        debug_assert_eq!(left.len(), right.len());
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            (*l, *r) = self.process_sample(*l, *r);
        }
    }
}

/// Anything that needs to re-derive internal constants when the transport's
/// sample rate changes.
pub trait ProcessorConfig {
    fn set_sample_rate(&mut self, sample_rate: f64);
}

/// Fixed per-band cascade capacity (see DESIGN.md: cascade counts are fixed
/// at compile time so the audio path never grows the heap).
pub const MAX_CASCADE: usize = 8;

/// Fixed number of bands a single `Controller` can host.
pub const MAX_BANDS: usize = 16;
