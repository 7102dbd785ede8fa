use eq_core::{BandStatus, FilterOrder, FilterParameters, FilterStructure, FilterType, StereoMode};
use eq_dsp::controller::{Controller, Prepare};

fn sine_block(n: usize, freq_hz: f64, sample_rate: f64) -> Vec<f64> {
    (0..n).map(|i| (2.0 * std::f64::consts::PI * freq_hz * i as f64 / sample_rate).sin()).collect()
}

#[test]
fn prepare_then_process_silence_stays_silent() {
    let mut controller = Controller::new(4);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 512 }).unwrap();
    controller.set_band_params(0, FilterParameters::new(FilterType::Peak, FilterOrder::O2, 1000.0, 12.0, 1.0));
    controller.set_band_status(0, BandStatus::On);

    let mut main = [vec![0.0; 512], vec![0.0; 512]];
    let side = [vec![0.0; 512], vec![0.0; 512]];
    controller.process(&mut main, &side).unwrap();
    assert!(main[0].iter().all(|&x| x == 0.0));
    assert!(main[1].iter().all(|&x| x == 0.0));
}

#[test]
fn off_band_does_not_alter_signal_at_all() {
    let mut controller = Controller::new(2);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 256 }).unwrap();
    controller.set_band_params(0, FilterParameters::new(FilterType::LowPass, FilterOrder::O4, 200.0, 0.0, 0.707));
    controller.set_band_status(0, BandStatus::Off);

    let original = sine_block(256, 1000.0, 48_000.0);
    let mut main = [original.clone(), original.clone()];
    let side = [vec![0.0; 256], vec![0.0; 256]];
    controller.process(&mut main, &side).unwrap();
    assert_eq!(main[0], original);
    assert_eq!(main[1], original);
}

#[test]
fn left_routed_band_leaves_right_channel_untouched() {
    let mut controller = Controller::new(2);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 256 }).unwrap();
    controller.set_band_params(0, FilterParameters::new(FilterType::Peak, FilterOrder::O2, 1000.0, 12.0, 1.0));
    controller.set_band_status(0, BandStatus::On);
    controller.set_band_stereo_mode(0, StereoMode::Left);

    let original = sine_block(256, 1000.0, 48_000.0);
    let mut main = [original.clone(), original.clone()];
    let side = [vec![0.0; 256], vec![0.0; 256]];
    controller.process(&mut main, &side).unwrap();
    assert_eq!(main[1], original);
    assert_ne!(main[0], original);
}

#[test]
fn mid_side_routed_band_processes_without_corrupting_finiteness() {
    let mut controller = Controller::new(2);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 256 }).unwrap();
    controller.set_band_params(0, FilterParameters::new(FilterType::HighShelf, FilterOrder::O2, 5000.0, -6.0, 0.707));
    controller.set_band_status(0, BandStatus::On);
    controller.set_band_stereo_mode(0, StereoMode::Side);

    let l = sine_block(256, 1000.0, 48_000.0);
    let r: Vec<f64> = sine_block(256, 1000.0, 48_000.0).iter().map(|x| -x).collect();
    let mut main = [l, r];
    let side = [vec![0.0; 256], vec![0.0; 256]];
    controller.process(&mut main, &side).unwrap();
    assert!(main[0].iter().all(|x| x.is_finite()));
    assert!(main[1].iter().all(|x| x.is_finite()));
}

#[test]
fn dynamic_band_reacts_to_loud_side_signal() {
    let mut controller = Controller::new(2);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 2048 }).unwrap();
    controller.set_band_params(0, FilterParameters::new(FilterType::Peak, FilterOrder::O2, 1000.0, 0.0, 1.0));
    controller.set_band_status(0, BandStatus::On);
    controller.set_band_dynamic(0, true, 12.0);

    let main_in = sine_block(2048, 1000.0, 48_000.0);
    let mut main = [main_in.clone(), main_in];
    let side_in = sine_block(2048, 1000.0, 48_000.0).iter().map(|x| x * 0.9).collect::<Vec<_>>();
    let side = [side_in.clone(), side_in];
    controller.process(&mut main, &side).unwrap();
    assert!(main[0].iter().all(|x| x.is_finite()));
}

#[test]
fn matched_structure_applies_fft_correction_and_reports_latency() {
    let mut controller = Controller::new(2);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 4096 }).unwrap();
    controller.set_structure(FilterStructure::Matched);
    assert!(controller.latency_samples() > 0);

    controller.set_band_params(0, FilterParameters::new(FilterType::Peak, FilterOrder::O2, 2000.0, 9.0, 1.2));
    controller.set_band_status(0, BandStatus::On);

    let input = sine_block(4096, 2000.0, 48_000.0);
    let mut main = [input.clone(), input];
    let side = [vec![0.0; 4096], vec![0.0; 4096]];
    controller.process(&mut main, &side).unwrap();
    assert!(main[0].iter().all(|x| x.is_finite()));
}

#[test]
fn matched_structure_with_side_band_runs_ms_correction_path() {
    let mut controller = Controller::new(2);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 4096 }).unwrap();
    controller.set_structure(FilterStructure::Matched);
    controller.set_band_params(0, FilterParameters::new(FilterType::HighShelf, FilterOrder::O2, 6000.0, -9.0, 0.707));
    controller.set_band_status(0, BandStatus::On);
    controller.set_band_stereo_mode(0, StereoMode::Side);

    let l = sine_block(4096, 1500.0, 48_000.0);
    let r: Vec<f64> = sine_block(4096, 1500.0, 48_000.0).iter().map(|x| -x).collect();
    let mut main = [l, r];
    let side = [vec![0.0; 4096], vec![0.0; 4096]];
    controller.process(&mut main, &side).unwrap();
    assert!(main[0].iter().all(|x| x.is_finite()));
    assert!(main[1].iter().all(|x| x.is_finite()));
}

#[test]
fn dynamic_band_with_reconciled_threshold_gates_on_loud_side_only() {
    let mut controller = Controller::new(1);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 4096 }).unwrap();
    controller.set_band_params(0, FilterParameters::new(FilterType::Peak, FilterOrder::O2, 1000.0, 12.0, 1.0));
    controller.set_band_status(0, BandStatus::On);
    controller.set_band_dynamic(0, true, 12.0);
    controller.set_band_dynamic_params(
        0,
        eq_core::DynamicParameters::new(-18.0, 6.0, 10.0, 100.0, false, false),
    );

    let main_in = sine_block(4096, 1000.0, 48_000.0);
    let mut quiet_main = [main_in.clone(), main_in.clone()];
    let quiet_side = sine_block(4096, 1000.0, 48_000.0).iter().map(|x| x * 10f64.powf(-40.0 / 20.0)).collect::<Vec<_>>();
    controller.process(&mut quiet_main, &[quiet_side.clone(), quiet_side]).unwrap();

    let mut controller2 = Controller::new(1);
    controller2.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 4096 }).unwrap();
    controller2.set_band_params(0, FilterParameters::new(FilterType::Peak, FilterOrder::O2, 1000.0, 12.0, 1.0));
    controller2.set_band_status(0, BandStatus::On);
    controller2.set_band_dynamic(0, true, 12.0);
    controller2.set_band_dynamic_params(
        0,
        eq_core::DynamicParameters::new(-18.0, 6.0, 10.0, 100.0, false, false),
    );
    let mut loud_main = [main_in.clone(), main_in];
    let loud_side = sine_block(4096, 1000.0, 48_000.0).iter().map(|x| x * 10f64.powf(-6.0 / 20.0)).collect::<Vec<_>>();
    controller2.process(&mut loud_main, &[loud_side.clone(), loud_side]).unwrap();

    // A side signal 40 dB below threshold leaves the band near its base
    // gain; one 6 dB above threshold drives it toward full +12 dB gain, so
    // the loud run's output energy should clearly exceed the quiet run's.
    let energy = |buf: &[f64]| buf.iter().map(|x| x * x).sum::<f64>();
    assert!(energy(&loud_main[0]) > energy(&quiet_main[0]) * 2.0);
}

#[test]
fn oversized_block_is_rejected_without_panicking() {
    let mut controller = Controller::new(1);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 128 }).unwrap();
    let mut main = [vec![0.0; 256], vec![0.0; 256]];
    let side = [vec![0.0; 256], vec![0.0; 256]];
    let result = controller.process(&mut main, &side);
    assert!(result.is_err());
}
