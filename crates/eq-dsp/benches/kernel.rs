use criterion::{black_box, criterion_group, criterion_main, Criterion};
use eq_dsp::coeffs::matched;
use eq_dsp::kernel::{SvfCascade, TdfCascade};

fn bench_tdf_cascade(c: &mut Criterion) {
    let coeffs = matched::get2_peak(0.3, 4.0, 1.0);
    let mut cascade = TdfCascade::default();
    cascade.set_cascade(&[coeffs, coeffs]);
    let input: Vec<f64> = (0..1024).map(|i| (i as f64 * 0.01).sin()).collect();

    c.bench_function("tdf_cascade_1024_samples", |b| {
        b.iter(|| {
            for &x in &input {
                black_box(cascade.process_sample(black_box(x)));
            }
        })
    });
}

fn bench_svf_cascade(c: &mut Criterion) {
    let coeffs = matched::get2_peak(0.3, 4.0, 1.0);
    let mut cascade = SvfCascade::default();
    cascade.set_cascade(&[coeffs, coeffs]);
    let input: Vec<f64> = (0..1024).map(|i| (i as f64 * 0.01).sin()).collect();

    c.bench_function("svf_cascade_1024_samples", |b| {
        b.iter(|| {
            for &x in &input {
                black_box(cascade.process_sample(black_box(x)));
            }
        })
    });
}

criterion_group!(benches, bench_tdf_cascade, bench_svf_cascade);
criterion_main!(benches);
