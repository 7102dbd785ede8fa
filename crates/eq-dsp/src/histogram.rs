//! Decaying streaming histogram (§4.6/C9), used to learn a side-chain's
//! threshold and knee from its recent level distribution rather than fixed
//! dB constants. Counts decay by a constant factor on every push so the
//! histogram forgets old program material smoothly instead of with a hard
//! window edge.

/// Bin `i` covers `[min + i*step, min + (i+1)*step)`.
#[derive(Debug, Clone)]
pub struct Histogram {
    bins: Vec<f64>,
    min: f64,
    max: f64,
    step: f64,
    decay_rate: f64,
    total: f64,
}

const DEFAULT_DECAY: f64 = 0.9997697679981565;

impl Histogram {
    pub fn new(num_bins: usize, min: f64, max: f64) -> Self {
        let num_bins = num_bins.max(1);
        Self {
            bins: vec![0.0; num_bins],
            min,
            max,
            step: (max - min) / num_bins as f64,
            decay_rate: DEFAULT_DECAY,
            total: 0.0,
        }
    }

    pub fn set_decay_rate(&mut self, decay_rate: f64) {
        self.decay_rate = decay_rate;
    }

    #[inline]
    fn bin_index(&self, x: f64) -> usize {
        let clamped = x.clamp(self.min, self.max - 1e-9);
        (((clamped - self.min) / self.step) as usize).min(self.bins.len() - 1)
    }

    /// Decays all existing counts, then adds one hit at `x`.
    pub fn push(&mut self, x: f64) {
        self.total *= self.decay_rate;
        for bin in &mut self.bins {
            *bin *= self.decay_rate;
        }
        let idx = self.bin_index(x);
        self.bins[idx] += 1.0;
        self.total += 1.0;
    }

    /// Linear-interpolated cumulative percentile (`0.0..=1.0`) of value `x`
    /// within the decayed distribution accumulated so far.
    pub fn percentile(&self, x: f64) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        let idx = self.bin_index(x);
        let cumulative_before: f64 = self.bins[..idx].iter().sum();
        let bin_start = self.min + idx as f64 * self.step;
        let frac = ((x - bin_start) / self.step).clamp(0.0, 1.0);
        let cumulative = cumulative_before + frac * self.bins[idx];
        (cumulative / self.total).clamp(0.0, 1.0)
    }

    /// Inverts `percentile`: the value below which `p` of the mass lies.
    pub fn value_at_percentile(&self, p: f64) -> f64 {
        if self.total <= 0.0 {
            return self.min;
        }
        let target = p.clamp(0.0, 1.0) * self.total;
        let mut cumulative = 0.0;
        for (i, &count) in self.bins.iter().enumerate() {
            if cumulative + count >= target {
                let bin_start = self.min + i as f64 * self.step;
                let frac = if count > 0.0 { (target - cumulative) / count } else { 0.0 };
                return bin_start + frac * self.step;
            }
            cumulative += count;
        }
        self.max
    }

    pub fn reset(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0.0);
        self.total = 0.0;
    }
}

/// Mirrors a [`Histogram`]'s bin counts into atomics every `sync_period`
/// pushes, so a control thread can read percentiles without locking the
/// audio thread's histogram.
pub struct AtomicHistogram {
    inner: Histogram,
    mirror: Vec<std::sync::atomic::AtomicU64>,
    mirror_total: std::sync::atomic::AtomicU64,
    pushes_since_sync: usize,
    sync_period: usize,
}

impl AtomicHistogram {
    pub fn new(num_bins: usize, min: f64, max: f64) -> Self {
        let inner = Histogram::new(num_bins, min, max);
        let mirror = (0..inner.bins.len())
            .map(|_| std::sync::atomic::AtomicU64::new(0))
            .collect();
        Self {
            inner,
            mirror,
            mirror_total: std::sync::atomic::AtomicU64::new(0),
            pushes_since_sync: 0,
            sync_period: 1000,
        }
    }

    pub fn push(&mut self, x: f64) {
        self.inner.push(x);
        self.pushes_since_sync += 1;
        if self.pushes_since_sync >= self.sync_period {
            self.sync();
        }
    }

    fn sync(&mut self) {
        use std::sync::atomic::Ordering;
        for (slot, &value) in self.mirror.iter().zip(self.inner.bins.iter()) {
            slot.store(value.to_bits(), Ordering::Relaxed);
        }
        self.mirror_total.store(self.inner.total.to_bits(), Ordering::Release);
        self.pushes_since_sync = 0;
    }

    /// Reads the last-synced snapshot; may lag the live audio-thread state
    /// by up to `sync_period` pushes.
    pub fn percentile_snapshot(&self, x: f64) -> f64 {
        use std::sync::atomic::Ordering;
        let total = f64::from_bits(self.mirror_total.load(Ordering::Acquire));
        if total <= 0.0 {
            return 0.0;
        }
        let idx = self.inner.bin_index(x);
        let cumulative_before: f64 = self.mirror[..idx]
            .iter()
            .map(|a| f64::from_bits(a.load(Ordering::Relaxed)))
            .sum();
        let bin_value = f64::from_bits(self.mirror[idx].load(Ordering::Relaxed));
        let bin_start = self.inner.min + idx as f64 * self.inner.step;
        let frac = ((x - bin_start) / self.inner.step).clamp(0.0, 1.0);
        ((cumulative_before + frac * bin_value) / total).clamp(0.0, 1.0)
    }
}
