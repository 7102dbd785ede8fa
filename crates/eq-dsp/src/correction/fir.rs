//! Overlap-add (4:1 overlap) FFT frame processor (§4.10). The correction
//! vector is supplied by [`super::calculator`]; this module owns only the
//! window/FIFO/FFT bookkeeping, so a coefficient-vector rebuild never
//! touches the per-sample path.

use num_complex::Complex64;
use realfft::{ComplexToReal, RealFftPlanner, RealToComplex};
use std::f64::consts::PI;
use std::sync::Arc;

/// One channel's overlap-add state for a fixed FFT size `frame_size = 2^order`.
pub struct FirCorrection {
    frame_size: usize,
    hop: usize,
    pos: usize,
    count: usize,
    input_fifo: Vec<f64>,
    output_fifo: Vec<f64>,
    fft_in: Vec<f64>,
    fft_scratch: Vec<Complex64>,
    fft_data: Vec<Complex64>,
    analysis_window: Vec<f64>,
    synthesis_window: Vec<f64>,
    forward: Arc<dyn RealToComplex<f64>>,
    inverse: Arc<dyn ComplexToReal<f64>>,
    correction: Vec<Complex64>,
}

impl FirCorrection {
    pub fn new(order: u32) -> Self {
        let frame_size = 1usize << order;
        let hop = frame_size / 4;
        let mut planner = RealFftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(frame_size);
        let inverse = planner.plan_fft_inverse(frame_size);
        let bins = frame_size / 2 + 1;

        let analysis_window = periodic_hann(frame_size, 1.0 / frame_size as f64);
        let synthesis_window = periodic_hann(frame_size, 2.0 / 3.0);

        Self {
            frame_size,
            hop,
            pos: 0,
            count: 0,
            input_fifo: vec![0.0; frame_size],
            output_fifo: vec![0.0; frame_size],
            fft_in: forward.make_input_vec(),
            fft_scratch: forward.make_scratch_vec(),
            fft_data: forward.make_output_vec(),
            analysis_window,
            synthesis_window,
            forward,
            inverse,
            correction: vec![Complex64::new(1.0, 0.0); bins],
        }
    }

    pub fn latency(&self) -> usize {
        self.frame_size
    }

    pub fn frame_size(&self) -> usize {
        self.frame_size
    }

    /// Number of distinct FFT bins a correction vector must cover.
    pub fn bins(&self) -> usize {
        self.frame_size / 2 + 1
    }

    /// Installs a new bin-wise correction vector (length `frame_size/2+1`),
    /// swapped in whole between frames — never touched mid-frame.
    pub fn set_correction(&mut self, correction: &[Complex64]) {
        debug_assert_eq!(correction.len(), self.correction.len());
        self.correction.copy_from_slice(correction);
    }

    /// Processes one sample: writes it into the input FIFO, reads and
    /// clears the already-synthesized output FIFO slot, and runs a frame
    /// once per `hop` samples.
    #[inline]
    pub fn process_sample(&mut self, input: f64) -> f64 {
        self.input_fifo[self.pos] = input;
        let output = self.output_fifo[self.pos];
        self.output_fifo[self.pos] = 0.0;
        self.pos = (self.pos + 1) % self.frame_size;
        self.count += 1;
        if self.count >= self.hop {
            self.count = 0;
            self.process_frame();
        }
        output
    }

    pub fn process_block(&mut self, buffer: &mut [f64]) {
        for sample in buffer.iter_mut() {
            *sample = self.process_sample(*sample);
        }
    }

    fn process_frame(&mut self) {
        for i in 0..self.frame_size {
            let src = (self.pos + i) % self.frame_size;
            self.fft_in[i] = self.input_fifo[src] * self.analysis_window[i];
        }

        if self
            .forward
            .process_with_scratch(&mut self.fft_in, &mut self.fft_data, &mut self.fft_scratch)
            .is_err()
        {
            return;
        }

        for (bin, &c) in self.fft_data.iter_mut().zip(self.correction.iter()) {
            *bin *= c;
        }

        if self
            .inverse
            .process_with_scratch(&mut self.fft_data, &mut self.fft_in, &mut self.fft_scratch)
            .is_err()
        {
            return;
        }

        let norm = 1.0 / self.frame_size as f64;
        for i in 0..self.frame_size {
            let dst = (self.pos + i) % self.frame_size;
            self.output_fifo[dst] += self.fft_in[i] * norm * self.synthesis_window[i];
        }
    }

    pub fn reset(&mut self) {
        self.input_fifo.iter_mut().for_each(|x| *x = 0.0);
        self.output_fifo.iter_mut().for_each(|x| *x = 0.0);
        self.pos = 0;
        self.count = 0;
    }
}

/// A periodic (DFT-even) Hann window, scaled by `gain`.
fn periodic_hann(size: usize, gain: f64) -> Vec<f64> {
    (0..size)
        .map(|i| gain * 0.5 * (1.0 - (2.0 * PI * i as f64 / size as f64).cos()))
        .collect()
}
