//! Lock-free parameter hand-off from a control thread to the audio thread
//! (§4.4). There is exactly one audio reader and any number of UI writers;
//! last-writer-wins is the desired UI semantics.

use eq_core::FilterType;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

#[inline]
fn load_f64(cell: &AtomicU64) -> f64 {
    f64::from_bits(cell.load(Ordering::Relaxed))
}

#[inline]
fn store_f64(cell: &AtomicU64, value: f64) {
    cell.store(value.to_bits(), Ordering::Relaxed);
}

/// One band's atomic parameter record plus the two dirty bits that publish
/// it to the audio thread.
pub struct EmptyCell {
    freq: AtomicU64,
    gain: AtomicU64,
    q: AtomicU64,
    order: AtomicU64,
    filter_type: AtomicU64,
    dirty_para: AtomicBool,
    dirty_fgq: AtomicBool,
}

impl EmptyCell {
    pub fn new(freq: f64, gain_db: f64, q: f64, order: u8, filter_type: FilterType) -> Self {
        Self {
            freq: AtomicU64::new(freq.to_bits()),
            gain: AtomicU64::new(gain_db.to_bits()),
            q: AtomicU64::new(q.to_bits()),
            order: AtomicU64::new(order as u64),
            filter_type: AtomicU64::new(filter_type_to_u64(filter_type)),
            dirty_para: AtomicBool::new(true),
            dirty_fgq: AtomicBool::new(true),
        }
    }

    pub fn set_freq(&self, x: f64) {
        store_f64(&self.freq, x);
        self.dirty_fgq.store(true, Ordering::Release);
    }

    pub fn set_gain(&self, x: f64) {
        store_f64(&self.gain, x);
        self.dirty_fgq.store(true, Ordering::Release);
    }

    pub fn set_q(&self, x: f64) {
        store_f64(&self.q, x);
        self.dirty_fgq.store(true, Ordering::Release);
    }

    pub fn set_order(&self, order: u8) {
        self.order.store(order as u64, Ordering::Relaxed);
        self.dirty_para.store(true, Ordering::Release);
    }

    pub fn set_filter_type(&self, filter_type: FilterType) {
        self.filter_type.store(filter_type_to_u64(filter_type), Ordering::Relaxed);
        self.dirty_para.store(true, Ordering::Release);
    }

    #[inline]
    pub fn freq(&self) -> f64 {
        load_f64(&self.freq)
    }

    #[inline]
    pub fn gain(&self) -> f64 {
        load_f64(&self.gain)
    }

    #[inline]
    pub fn q(&self) -> f64 {
        load_f64(&self.q)
    }

    #[inline]
    pub fn order(&self) -> u8 {
        self.order.load(Ordering::Relaxed) as u8
    }

    #[inline]
    pub fn filter_type(&self) -> FilterType {
        filter_type_from_u64(self.filter_type.load(Ordering::Relaxed))
    }

    /// Called once per block by the audio thread: returns whether the
    /// type/order changed since the last call, clearing the flag.
    #[inline]
    pub fn take_dirty_para(&self) -> bool {
        self.dirty_para.swap(false, Ordering::Acquire)
    }

    /// Called once per block by the audio thread: returns whether
    /// freq/gain/Q changed since the last call, clearing the flag.
    #[inline]
    pub fn take_dirty_fgq(&self) -> bool {
        self.dirty_fgq.swap(false, Ordering::Acquire)
    }
}

fn filter_type_to_u64(t: FilterType) -> u64 {
    match t {
        FilterType::Peak => 0,
        FilterType::LowShelf => 1,
        FilterType::LowPass => 2,
        FilterType::HighShelf => 3,
        FilterType::HighPass => 4,
        FilterType::Notch => 5,
        FilterType::BandPass => 6,
        FilterType::TiltShelf => 7,
        FilterType::BandShelf => 8,
    }
}

fn filter_type_from_u64(v: u64) -> FilterType {
    match v {
        0 => FilterType::Peak,
        1 => FilterType::LowShelf,
        2 => FilterType::LowPass,
        3 => FilterType::HighShelf,
        4 => FilterType::HighPass,
        5 => FilterType::Notch,
        6 => FilterType::BandPass,
        7 => FilterType::TiltShelf,
        _ => FilterType::BandShelf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_cell_starts_dirty() {
        let cell = EmptyCell::new(1000.0, 0.0, 0.707, 2, FilterType::Peak);
        assert!(cell.take_dirty_para());
        assert!(cell.take_dirty_fgq());
        assert!(!cell.take_dirty_para());
        assert!(!cell.take_dirty_fgq());
    }

    #[test]
    fn set_freq_only_dirties_fgq() {
        let cell = EmptyCell::new(1000.0, 0.0, 0.707, 2, FilterType::Peak);
        cell.take_dirty_para();
        cell.take_dirty_fgq();
        cell.set_freq(500.0);
        assert!(!cell.take_dirty_para());
        assert!(cell.take_dirty_fgq());
        assert_eq!(cell.freq(), 500.0);
    }

    #[test]
    fn set_order_dirties_para_only() {
        let cell = EmptyCell::new(1000.0, 0.0, 0.707, 2, FilterType::Peak);
        cell.take_dirty_para();
        cell.take_dirty_fgq();
        cell.set_order(4);
        assert!(cell.take_dirty_para());
        assert!(!cell.take_dirty_fgq());
    }
}
