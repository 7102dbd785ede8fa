//! Per-sample parameter ramps (§4.5). Four variants share one shape but
//! differ in how the per-sample increment is derived and applied.

/// Selects the ramp law.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmoothedKind {
    /// Finite linear ramp over a fixed sample count.
    Lin,
    /// Finite multiplicative (exponential) ramp over a fixed sample count.
    Mul,
    /// Fixed-rate linear step, independent of distance to target.
    FixLin,
    /// Fixed-rate multiplicative step, independent of distance to target.
    FixMul,
}

#[derive(Debug, Clone, Copy)]
pub struct SmoothedValue {
    kind: SmoothedKind,
    current: f64,
    target: f64,
    inc: f64,
    increase_inc: f64,
    decrease_inc: f64,
    max_count: i32,
    count: i32,
    is_increasing: bool,
}

impl SmoothedValue {
    pub fn new(kind: SmoothedKind, initial: f64) -> Self {
        Self {
            kind,
            current: initial,
            target: initial,
            inc: 0.0,
            increase_inc: 0.0,
            decrease_inc: 0.0,
            max_count: 0,
            count: 0,
            is_increasing: false,
        }
    }

    /// `length_seconds` is a ramp duration for Lin/Mul, or the time to cross
    /// a fixed step for FixLin/FixMul.
    pub fn prepare(&mut self, sample_rate: f64, length_seconds: f64) {
        match self.kind {
            SmoothedKind::Lin | SmoothedKind::Mul => {
                self.max_count = (sample_rate * length_seconds) as i32;
            }
            SmoothedKind::FixLin => {
                self.inc = 1.0 / (sample_rate * length_seconds);
                self.increase_inc = self.inc;
                self.decrease_inc = -self.inc;
            }
            SmoothedKind::FixMul => {
                self.inc = 2f64.powf(1.0 / (sample_rate * length_seconds));
                self.increase_inc = self.inc;
                self.decrease_inc = 1.0 / self.inc;
            }
        }
    }

    pub fn set_target(&mut self, x: f64) {
        self.target = x;
        if (self.current - self.target).abs() < 1e-10 {
            self.count = 0;
            return;
        }
        match self.kind {
            SmoothedKind::Lin => {
                self.inc = (self.target - self.current) / self.max_count.max(1) as f64;
                self.count = self.max_count;
            }
            SmoothedKind::Mul => {
                self.inc = ((self.target / self.current).ln() / self.max_count.max(1) as f64).exp();
                self.count = self.max_count;
            }
            SmoothedKind::FixLin | SmoothedKind::FixMul => {
                self.count = 1;
                self.is_increasing = self.target > self.current;
            }
        }
    }

    pub fn set_current_and_target(&mut self, x: f64) {
        self.current = x;
        self.target = x;
        self.count = 0;
    }

    #[inline]
    pub fn current(&self) -> f64 {
        self.current
    }

    #[inline]
    pub fn target(&self) -> f64 {
        self.target
    }

    #[inline]
    pub fn is_smoothing(&self) -> bool {
        self.count > 0
    }

    pub fn next(&mut self) -> f64 {
        if self.count == 0 {
            return self.current;
        }
        match self.kind {
            SmoothedKind::Lin => {
                self.current += self.inc;
                self.count -= 1;
                self.current
            }
            SmoothedKind::Mul => {
                self.current *= self.inc;
                self.count -= 1;
                self.current
            }
            SmoothedKind::FixLin => {
                if self.is_increasing {
                    self.current += self.increase_inc;
                    if self.current > self.target {
                        self.current = self.target;
                        self.count = 0;
                    }
                } else {
                    self.current += self.decrease_inc;
                    if self.current < self.target {
                        self.current = self.target;
                        self.count = 0;
                    }
                }
                self.current
            }
            SmoothedKind::FixMul => {
                if self.is_increasing {
                    self.current *= self.increase_inc;
                    if self.current > self.target {
                        self.current = self.target;
                        self.count = 0;
                    }
                } else {
                    self.current *= self.decrease_inc;
                    if self.current < self.target {
                        self.current = self.target;
                        self.count = 0;
                    }
                }
                self.current
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn lin_reaches_target_in_exactly_n_steps() {
        let mut s = SmoothedValue::new(SmoothedKind::Lin, 0.0);
        s.prepare(1000.0, 0.1); // N = 100
        s.set_target(1.0);
        for _ in 0..100 {
            s.next();
        }
        assert_relative_eq!(s.current(), 1.0, epsilon = 1e-12);
        assert!(!s.is_smoothing());
    }

    #[test]
    fn fix_mul_monotonically_increases_and_stops() {
        let mut s = SmoothedValue::new(SmoothedKind::FixMul, 1.0);
        s.prepare(48000.0, 0.01);
        s.set_target(2.0);
        let mut prev = s.current();
        let mut stopped_at = None;
        for i in 0..100_000 {
            let v = s.next();
            assert!(v >= prev - 1e-15);
            prev = v;
            if !s.is_smoothing() {
                stopped_at = Some(i);
                break;
            }
        }
        assert!(stopped_at.is_some());
        assert_relative_eq!(s.current(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn tiny_delta_snaps_immediately() {
        let mut s = SmoothedValue::new(SmoothedKind::Lin, 1.0);
        s.prepare(48000.0, 0.05);
        s.set_target(1.0 + 1e-12);
        assert!(!s.is_smoothing());
    }
}
