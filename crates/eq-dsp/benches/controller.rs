use criterion::{criterion_group, criterion_main, Criterion};
use eq_core::{FilterOrder, FilterParameters, FilterType};
use eq_dsp::controller::{Controller, Prepare};

fn bench_minimum_structure_block(c: &mut Criterion) {
    let mut controller = Controller::new(8);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 512 }).unwrap();
    for i in 0..4 {
        controller.set_band_params(i, FilterParameters::new(FilterType::Peak, FilterOrder::O2, 200.0 * (i as f64 + 1.0), 4.0, 1.0));
        controller.set_band_status(i, eq_core::BandStatus::On);
    }
    let mut main = [vec![0.0_f64; 512], vec![0.0_f64; 512]];
    for (i, s) in main[0].iter_mut().enumerate() {
        *s = (i as f64 * 0.01).sin();
    }
    main[1] = main[0].clone();
    let side = [vec![0.0_f64; 512], vec![0.0_f64; 512]];

    c.bench_function("controller_minimum_4_peak_bands_512_block", |b| {
        b.iter(|| {
            let mut buf = main.clone();
            controller.process(&mut buf, &side).unwrap();
        })
    });
}

fn bench_matched_structure_block(c: &mut Criterion) {
    let mut controller = Controller::new(8);
    controller.prepare(&Prepare { sample_rate_hz: 48_000.0, max_block: 512 }).unwrap();
    controller.set_structure(eq_core::FilterStructure::Matched);
    controller.set_band_params(0, FilterParameters::new(FilterType::Peak, FilterOrder::O2, 1000.0, 6.0, 1.0));
    controller.set_band_status(0, eq_core::BandStatus::On);
    let main = [vec![0.0_f64; 512], vec![0.0_f64; 512]];
    let side = [vec![0.0_f64; 512], vec![0.0_f64; 512]];

    c.bench_function("controller_matched_1_band_512_block", |b| {
        b.iter(|| {
            let mut buf = main.clone();
            controller.process(&mut buf, &side).unwrap();
        })
    });
}

criterion_group!(benches, bench_minimum_structure_block, bench_matched_structure_block);
criterion_main!(benches);
