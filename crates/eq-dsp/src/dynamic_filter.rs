//! Wraps a kernel with dynamic gain/Q modulation driven by a
//! [`crate::dynamic_side::DynamicSideHandler`] (§4.8). Static bands take the
//! per-block fast path; dynamic bands re-derive coefficients per sample.

use crate::dynamic_side::DynamicSideHandler;
use crate::kernel::{ParallelCascade, TdfCascade};
use crate::Processor;
use crate::smoothing::{SmoothedKind, SmoothedValue};
use crate::design;
use eq_core::{DynamicParameters, FilterType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kernel {
    Tdf,
    Parallel,
}

pub struct DynamicFilter {
    kernel_kind: Kernel,
    tdf: TdfCascade,
    parallel: ParallelCascade,
    side: DynamicSideHandler,
    gain_db: SmoothedValue,
    q: SmoothedValue,
    filter_type: FilterType,
    order: usize,
    w0: f64,
    base_gain_db: f64,
    base_q: f64,
    dynamic_on: bool,
    dynamic_bypass: bool,
    dynamic_range_db: f64,
}

impl DynamicFilter {
    pub fn new(kernel: &str) -> Self {
        Self {
            kernel_kind: if kernel == "parallel" { Kernel::Parallel } else { Kernel::Tdf },
            tdf: TdfCascade::default(),
            parallel: ParallelCascade::default(),
            side: DynamicSideHandler::default(),
            gain_db: SmoothedValue::new(SmoothedKind::FixLin, 0.0),
            q: SmoothedValue::new(SmoothedKind::FixLin, 0.707),
            filter_type: FilterType::Peak,
            order: 2,
            w0: 0.1,
            base_gain_db: 0.0,
            base_q: 0.707,
            dynamic_on: false,
            dynamic_bypass: false,
            dynamic_range_db: 12.0,
        }
    }

    pub fn prepare(&mut self, sample_rate: f64) {
        self.gain_db.prepare(sample_rate, 0.02);
        self.q.prepare(sample_rate, 0.02);
        self.side.prepare(sample_rate, 0.01);
    }

    /// Dynamic is legal only for Peak/LowShelf/HighShelf/TiltShelf (§3). On
    /// `off -> on`, the follower and histograms are reset (§4.13 state
    /// machine) so a previous program's learned/smoothed state doesn't leak
    /// into the newly (re-)enabled dynamic band.
    pub fn set_dynamic_on(&mut self, on: bool) {
        let new_on = on && self.filter_type.supports_dynamic();
        if new_on && !self.dynamic_on {
            self.side.reset();
        }
        self.dynamic_on = new_on;
    }

    pub fn set_dynamic_bypass(&mut self, bypass: bool) {
        self.dynamic_bypass = bypass;
    }

    pub fn set_dynamic_range_db(&mut self, range_db: f64) {
        self.dynamic_range_db = range_db;
    }

    /// Threshold, knee, attack, release, relative and learn (§4.11
    /// "reconcile dynamic parameters"); pushed straight into the side
    /// handler since these aren't part of the lock-free `EmptyCell` record
    /// (§4.4 only covers freq/gain/q/type/order).
    pub fn set_dynamic_params(&mut self, params: DynamicParameters) {
        self.side.set_threshold(params.threshold_db);
        self.side.set_knee(params.knee_db);
        self.side.set_attack_release(params.attack_ms, params.release_ms, 1.0);
        self.side.set_relative(params.relative);
        self.side.set_learn(params.learn);
    }

    pub fn side_handler_mut(&mut self) -> &mut DynamicSideHandler {
        &mut self.side
    }

    /// Reloads static coefficients: called on a non-dynamic-value change.
    pub fn reload_static(&mut self, filter_type: FilterType, order: usize, w0: f64, gain_db: f64, q: f64) {
        self.filter_type = filter_type;
        self.order = order;
        self.w0 = w0;
        self.base_gain_db = gain_db;
        self.base_q = q;
        self.gain_db.set_current_and_target(gain_db);
        self.q.set_current_and_target(q);
        self.rebuild_cascade(gain_db, q);
    }

    /// Retargets the smoothed gain/Q without touching the cascade; used
    /// when only freq/gain/Q changed on a dynamic band.
    pub fn retarget(&mut self, gain_db: f64, q: f64) {
        self.base_gain_db = gain_db;
        self.base_q = q;
        self.gain_db.set_target(gain_db);
        self.q.set_target(q);
    }

    fn rebuild_cascade(&mut self, gain_db: f64, q: f64) {
        match self.kernel_kind {
            Kernel::Tdf => {
                let designed = design::cascade(self.filter_type, self.order, self.w0, q, gain_db);
                self.tdf.set_cascade(&designed.sections);
            }
            Kernel::Parallel => {
                self.parallel.set_design(self.filter_type, self.w0, q, self.order);
                self.parallel.set_gain_db(gain_db);
            }
        }
    }

    pub fn process_block(&mut self, main: &mut [f64], side: &[f64]) {
        if !self.dynamic_on {
            let smoothing = self.gain_db.is_smoothing() || self.q.is_smoothing();
            if smoothing {
                for sample in main.iter_mut() {
                    let g = self.gain_db.next();
                    let q = self.q.next();
                    self.rebuild_cascade(g, q);
                    *sample = self.process_one(*sample);
                }
            } else {
                self.process_block_fast(main);
            }
            return;
        }

        debug_assert_eq!(main.len(), side.len());
        for (m, &s) in main.iter_mut().zip(side.iter()) {
            let p = if self.dynamic_bypass { 0.0 } else { self.side.process_sample(s) };
            let target_gain = self.base_gain_db + p * self.dynamic_range_db;
            let target_q = self.base_q;
            self.rebuild_cascade(target_gain, target_q);
            *m = self.process_one(*m);
        }
    }

    #[inline]
    fn process_one(&mut self, x: f64) -> f64 {
        match self.kernel_kind {
            Kernel::Tdf => self.tdf.process_sample(x),
            Kernel::Parallel => self.parallel.process_sample(x),
        }
    }

    fn process_block_fast(&mut self, main: &mut [f64]) {
        match self.kernel_kind {
            Kernel::Tdf => self.tdf.process_block(main),
            Kernel::Parallel => self.parallel.process_block(main),
        }
    }

    pub fn reset(&mut self) {
        self.tdf.reset();
        self.parallel.reset();
        self.side.reset();
    }
}

impl std::fmt::Debug for DynamicFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamicFilter")
            .field("filter_type", &self.filter_type)
            .field("dynamic_on", &self.dynamic_on)
            .finish()
    }
}
