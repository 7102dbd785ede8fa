//! The top-level orchestrator (§4.13): per-block parameter reconciliation,
//! band routing across stereo/L/R/M/S groups, dynamic processing and
//! optional FFT correction.

use crate::band::Band;
use crate::correction::{self, CorrectionPolicy, FirCorrection};
use crate::empty_cell::EmptyCell;
use crate::ideal_filter;
use crate::ms;
use crate::MAX_BANDS;
use eq_core::{EqError, EqResult, FilterParameters, FilterStructure, StereoMode};
use num_complex::Complex64;
use std::f64::consts::PI;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Optional analyzer hook (§4.13 step 3): a `None` tap costs one branch
/// per block, never a call.
pub trait AnalyzerTap: Send + Sync {
    fn on_block(&self, pre_main: &[f64], post_main: &[f64], side: &[f64]);
}

pub struct Prepare {
    pub sample_rate_hz: f64,
    pub max_block: usize,
}

pub struct Controller {
    bands: Vec<Band>,
    cells: Vec<Arc<EmptyCell>>,
    structure: FilterStructure,
    sample_rate_hz: f64,
    max_block: usize,
    latency: AtomicUsize,
    correction_l: Option<FirCorrection>,
    correction_r: Option<FirCorrection>,
    correction_m: Option<FirCorrection>,
    correction_s: Option<FirCorrection>,
    scratch_m: Vec<f64>,
    scratch_s: Vec<f64>,
    scratch_side_m: Vec<f64>,
    scratch_side_s: Vec<f64>,
    analyzer: Option<Arc<dyn AnalyzerTap>>,
}

impl Controller {
    pub fn new(num_bands: usize) -> Self {
        let n = num_bands.min(MAX_BANDS);
        Self {
            bands: (0..n).map(|_| Band::new("tdf")).collect(),
            cells: (0..n)
                .map(|_| Arc::new(EmptyCell::new(1000.0, 0.0, 0.707, 2, eq_core::FilterType::Peak)))
                .collect(),
            structure: FilterStructure::Minimum,
            sample_rate_hz: 48_000.0,
            max_block: 0,
            latency: AtomicUsize::new(0),
            correction_l: None,
            correction_r: None,
            correction_m: None,
            correction_s: None,
            scratch_m: Vec::new(),
            scratch_s: Vec::new(),
            scratch_side_m: Vec::new(),
            scratch_side_s: Vec::new(),
            analyzer: None,
        }
    }

    pub fn set_analyzer_tap(&mut self, tap: Option<Arc<dyn AnalyzerTap>>) {
        self.analyzer = tap;
    }

    pub fn cell(&self, band_index: usize) -> Arc<EmptyCell> {
        self.cells[band_index].clone()
    }

    pub fn prepare(&mut self, prep: &Prepare) -> EqResult<()> {
        let sample_rate = eq_core::SampleRate::from_u32(prep.sample_rate_hz as u32)
            .map_err(|_| EqError::InvalidSampleRate(prep.sample_rate_hz as u32))?;
        let _ = sample_rate;
        self.sample_rate_hz = prep.sample_rate_hz;
        self.max_block = prep.max_block;
        self.scratch_m = vec![0.0; prep.max_block];
        self.scratch_s = vec![0.0; prep.max_block];
        self.scratch_side_m = vec![0.0; prep.max_block];
        self.scratch_side_s = vec![0.0; prep.max_block];
        for band in &mut self.bands {
            band.prepare(prep.sample_rate_hz);
        }
        self.rebuild_correction();
        log::debug!("controller prepared: sr={} max_block={}", prep.sample_rate_hz, prep.max_block);
        Ok(())
    }

    pub fn set_structure(&mut self, structure: FilterStructure) {
        if structure != self.structure {
            self.structure = structure;
            self.rebuild_correction();
            if structure.is_zero_latency() {
                self.latency.store(0, Ordering::Release);
            }
            log::debug!("filter structure changed to {structure:?}");
        }
    }

    fn rebuild_correction(&mut self) {
        if !self.structure.has_correction() || self.max_block == 0 {
            self.correction_l = None;
            self.correction_r = None;
            self.correction_m = None;
            self.correction_s = None;
            return;
        }
        let policy = policy_for(self.structure);
        let order = correction::fft_order_for(self.sample_rate_hz, policy);
        self.correction_l = Some(FirCorrection::new(order));
        self.correction_r = Some(FirCorrection::new(order));
        self.correction_m = Some(FirCorrection::new(order));
        self.correction_s = Some(FirCorrection::new(order));
        let new_latency = self.correction_l.as_ref().unwrap().latency();
        if new_latency != self.latency.load(Ordering::Acquire) {
            self.latency.store(new_latency, Ordering::Release);
            log::debug!("latency changed to {new_latency} samples");
        }
        self.rebuild_correction_vectors();
    }

    /// §4.11 step 4: computes and installs each correction channel's
    /// bin-wise vector from its contributing on/non-dynamic bands' ideal vs.
    /// realized response, recomputed whenever a band or the structure
    /// changes. Dynamic bands are excluded — see [`Band::correction_sections`].
    fn rebuild_correction_vectors(&mut self) {
        if !self.structure.has_correction() {
            return;
        }
        let policy = policy_for(self.structure);
        let l = self.correction_l.as_ref().map(FirCorrection::bins);
        let r = self.correction_r.as_ref().map(FirCorrection::bins);
        let m = self.correction_m.as_ref().map(FirCorrection::bins);
        let s = self.correction_s.as_ref().map(FirCorrection::bins);

        if let Some(bins) = l {
            let v = self.correction_vector_for(policy, bins, |b| matches!(b.stereo_mode, StereoMode::Stereo | StereoMode::Left));
            self.correction_l.as_mut().unwrap().set_correction(&v);
        }
        if let Some(bins) = r {
            let v = self.correction_vector_for(policy, bins, |b| matches!(b.stereo_mode, StereoMode::Stereo | StereoMode::Right));
            self.correction_r.as_mut().unwrap().set_correction(&v);
        }
        if let Some(bins) = m {
            let v = self.correction_vector_for(policy, bins, |b| b.stereo_mode == StereoMode::Mid);
            self.correction_m.as_mut().unwrap().set_correction(&v);
        }
        if let Some(bins) = s {
            let v = self.correction_vector_for(policy, bins, |b| b.stereo_mode == StereoMode::Side);
            self.correction_s.as_mut().unwrap().set_correction(&v);
        }
    }

    /// Combines the correction vectors of every active, non-dynamic band
    /// matching `routed_to_channel` into one bin-wise vector; a channel with
    /// no contributing bands gets the identity vector.
    fn correction_vector_for(&self, policy: CorrectionPolicy, bins: usize, routed_to_channel: impl Fn(&Band) -> bool) -> correction::CorrectionVector {
        let grid: Vec<f64> = (0..bins).map(|i| PI * i as f64 / (bins - 1).max(1) as f64).collect();
        let vectors: Vec<_> = self
            .bands
            .iter()
            .filter(|b| routed_to_channel(b))
            .filter_map(Band::correction_sections)
            .map(|(analog, digital)| {
                let responses = ideal_filter::response_grid(&analog, &digital, &grid);
                correction::calculator::band_correction(policy, &responses)
            })
            .collect();
        if vectors.is_empty() {
            vec![Complex64::new(1.0, 0.0); bins]
        } else {
            correction::calculator::combine_bands(&vectors)
        }
    }

    pub fn latency_samples(&self) -> usize {
        self.latency.load(Ordering::Acquire)
    }

    pub fn set_band_params(&mut self, band_index: usize, params: FilterParameters) {
        self.bands[band_index].set_params(self.sample_rate_hz, params);
        self.rebuild_correction_vectors();
    }

    pub fn set_band_status(&mut self, band_index: usize, status: eq_core::BandStatus) {
        self.bands[band_index].set_status(status);
        self.rebuild_correction_vectors();
    }

    pub fn set_band_stereo_mode(&mut self, band_index: usize, mode: StereoMode) {
        self.bands[band_index].stereo_mode = mode;
        self.rebuild_correction_vectors();
    }

    pub fn set_band_dynamic(&mut self, band_index: usize, on: bool, range_db: f64) {
        self.bands[band_index].set_dynamic_on(on);
        self.bands[band_index].set_dynamic_range_db(range_db);
        self.rebuild_correction_vectors();
    }

    /// §4.11/§4.13 "reconcile dynamic parameters": threshold, knee, attack,
    /// release, relative and learn. Pushed directly into the band rather
    /// than through the `EmptyCell` path, which only carries the six
    /// coefficient-affecting fields (§4.4).
    pub fn set_band_dynamic_params(&mut self, band_index: usize, params: eq_core::DynamicParameters) {
        self.bands[band_index].set_dynamic_params(params);
    }

    /// Drains every dirty [`EmptyCell`] into its band (§4.13 step 1).
    fn reconcile_cells(&mut self) {
        let mut any_dirty = false;
        for (band, cell) in self.bands.iter_mut().zip(self.cells.iter()) {
            let para_dirty = cell.take_dirty_para();
            let fgq_dirty = cell.take_dirty_fgq();
            if para_dirty || fgq_dirty {
                let order = eq_core::FilterOrder::from_u8(cell.order());
                let params = FilterParameters::new(cell.filter_type(), order, cell.freq(), cell.gain(), cell.q());
                band.set_params(self.sample_rate_hz, params);
                any_dirty = true;
            }
        }
        if any_dirty {
            self.rebuild_correction_vectors();
        }
    }

    /// Processes one block: `main`/`side` are `[left, right]` planar
    /// buffers of equal length `<= max_block`.
    pub fn process(&mut self, main: &mut [Vec<f64>; 2], side: &[Vec<f64>; 2]) -> EqResult<()> {
        let n = main[0].len();
        if n > self.max_block {
            return Err(EqError::BlockTooLarge { requested: n, max: self.max_block });
        }

        self.reconcile_cells();

        let pre_main: Option<(Vec<f64>, Vec<f64>)> = self
            .analyzer
            .as_ref()
            .map(|_| (main[0].clone(), main[1].clone()));

        self.process_stereo_and_lr(main, side);
        self.process_ms(main, side);

        if self.structure.has_correction() {
            self.process_correction(main);
        }

        if let Some(tap) = &self.analyzer {
            if let Some((pre_l, _pre_r)) = pre_main {
                tap.on_block(&pre_l, &main[0], &side[0]);
            }
        }

        Ok(())
    }

    /// `Stereo`-routed bands process both channels through independent
    /// primary/secondary state; `Left`/`Right`-routed bands only ever
    /// touch one channel and use `primary` alone.
    fn process_stereo_and_lr(&mut self, main: &mut [Vec<f64>; 2], side: &[Vec<f64>; 2]) {
        let (main_l, main_r) = main.split_at_mut(1);
        for band in &mut self.bands {
            if !band.is_active() {
                continue;
            }
            match band.stereo_mode {
                StereoMode::Stereo => {
                    let side_l = if band.side_swap { &side[1] } else { &side[0] };
                    let side_r = if band.side_swap { &side[0] } else { &side[1] };
                    band.process_block(&mut main_l[0], side_l);
                    band.process_block_secondary(&mut main_r[0], side_r);
                }
                StereoMode::Left => {
                    let side_channel = if band.side_swap { &side[1] } else { &side[0] };
                    band.process_block(&mut main_l[0], side_channel);
                }
                StereoMode::Right => {
                    let side_channel = if band.side_swap { &side[0] } else { &side[1] };
                    band.process_block(&mut main_r[0], side_channel);
                }
                StereoMode::Mid | StereoMode::Side => {}
            }
        }
    }

    fn process_ms(&mut self, main: &mut [Vec<f64>; 2], side: &[Vec<f64>; 2]) {
        let has_ms_band = self.bands.iter().any(|b| b.is_active() && matches!(b.stereo_mode, StereoMode::Mid | StereoMode::Side));
        if !has_ms_band {
            return;
        }
        let n = main[0].len();
        self.scratch_m[..n].copy_from_slice(&main[0][..n]);
        self.scratch_s[..n].copy_from_slice(&main[1][..n]);
        ms::split_block(&mut self.scratch_m[..n], &mut self.scratch_s[..n]);
        self.scratch_side_m[..n].copy_from_slice(&side[0][..n]);
        self.scratch_side_s[..n].copy_from_slice(&side[1][..n]);
        ms::split_block(&mut self.scratch_side_m[..n], &mut self.scratch_side_s[..n]);

        for band in &mut self.bands {
            if band.is_active() && band.stereo_mode == StereoMode::Mid {
                band.process_block(&mut self.scratch_m[..n], &self.scratch_side_m[..n]);
            } else if band.is_active() && band.stereo_mode == StereoMode::Side {
                band.process_block(&mut self.scratch_s[..n], &self.scratch_side_s[..n]);
            }
        }

        ms::combine_block(&mut self.scratch_m[..n], &mut self.scratch_s[..n]);
        main[0][..n].copy_from_slice(&self.scratch_m[..n]);
        main[1][..n].copy_from_slice(&self.scratch_s[..n]);
    }

    /// §4.11 step 4: L/R correction applies directly to the main buffers;
    /// M/S correction needs a split/combine around the correction pass
    /// since `correction_m`/`correction_s` are built from Mid/Side-routed
    /// bands' responses, not the realized L/R signal.
    fn process_correction(&mut self, main: &mut [Vec<f64>; 2]) {
        let has_ms_band = self.bands.iter().any(|b| b.is_active() && matches!(b.stereo_mode, StereoMode::Mid | StereoMode::Side));
        if has_ms_band && (self.correction_m.is_some() || self.correction_s.is_some()) {
            let n = main[0].len();
            self.scratch_m[..n].copy_from_slice(&main[0][..n]);
            self.scratch_s[..n].copy_from_slice(&main[1][..n]);
            ms::split_block(&mut self.scratch_m[..n], &mut self.scratch_s[..n]);
            if let Some(fir) = &mut self.correction_m {
                fir.process_block(&mut self.scratch_m[..n]);
            }
            if let Some(fir) = &mut self.correction_s {
                fir.process_block(&mut self.scratch_s[..n]);
            }
            ms::combine_block(&mut self.scratch_m[..n], &mut self.scratch_s[..n]);
            main[0][..n].copy_from_slice(&self.scratch_m[..n]);
            main[1][..n].copy_from_slice(&self.scratch_s[..n]);
        }
        if let Some(fir) = &mut self.correction_l {
            fir.process_block(&mut main[0]);
        }
        if let Some(fir) = &mut self.correction_r {
            fir.process_block(&mut main[1]);
        }
    }

    pub fn reset(&mut self) {
        for band in &mut self.bands {
            band.set_status(eq_core::BandStatus::Off);
        }
        if let Some(fir) = &mut self.correction_l {
            fir.reset();
        }
        if let Some(fir) = &mut self.correction_r {
            fir.reset();
        }
        if let Some(fir) = &mut self.correction_m {
            fir.reset();
        }
        if let Some(fir) = &mut self.correction_s {
            fir.reset();
        }
    }
}

fn policy_for(structure: FilterStructure) -> CorrectionPolicy {
    match structure {
        FilterStructure::Matched => CorrectionPolicy::Matched,
        FilterStructure::Mixed => CorrectionPolicy::Mixed,
        _ => CorrectionPolicy::Zero,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eq_core::{FilterOrder, FilterType};

    fn silent_buffers(n: usize) -> ([Vec<f64>; 2], [Vec<f64>; 2]) {
        ([vec![0.0; n], vec![0.0; n]], [vec![0.0; n], vec![0.0; n]])
    }

    #[test]
    fn prepare_rejects_unsupported_sample_rate() {
        let mut c = Controller::new(4);
        let err = c.prepare(&Prepare { sample_rate_hz: 22_050.0, max_block: 512 });
        assert!(err.is_err());
    }

    #[test]
    fn process_rejects_oversized_block() {
        let mut c = Controller::new(4);
        c.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 64 }).unwrap();
        let (mut main, side) = silent_buffers(128);
        let err = c.process(&mut main, &side);
        assert!(err.is_err());
    }

    #[test]
    fn minimum_structure_reports_zero_latency() {
        let mut c = Controller::new(4);
        c.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 512 }).unwrap();
        c.set_structure(FilterStructure::Minimum);
        assert_eq!(c.latency_samples(), 0);
    }

    #[test]
    fn matched_structure_reports_nonzero_latency() {
        let mut c = Controller::new(4);
        c.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 512 }).unwrap();
        c.set_structure(FilterStructure::Matched);
        assert!(c.latency_samples() > 0);
    }

    #[test]
    fn off_bands_leave_silence_silent() {
        let mut c = Controller::new(2);
        c.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 256 }).unwrap();
        let (mut main, side) = silent_buffers(256);
        c.process(&mut main, &side).unwrap();
        assert!(main[0].iter().all(|&x| x == 0.0));
    }

    #[test]
    fn on_peak_band_processes_without_panicking() {
        let mut c = Controller::new(2);
        c.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 512 }).unwrap();
        c.set_band_params(0, FilterParameters::new(FilterType::Peak, FilterOrder::O2, 1000.0, 6.0, 1.0));
        c.set_band_status(0, eq_core::BandStatus::On);
        let mut main = [
            (0..512).map(|i| (i as f64 * 0.1).sin()).collect(),
            (0..512).map(|i| (i as f64 * 0.1).sin()).collect(),
        ];
        let side = [vec![0.0; 512], vec![0.0; 512]];
        c.process(&mut main, &side).unwrap();
        assert!(main[0].iter().all(|x| x.is_finite()));
    }
}
