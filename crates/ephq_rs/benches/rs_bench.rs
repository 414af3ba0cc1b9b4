use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ephq_core::mock::MockEngine;
use ephq_rs::*;

fn facade_benchmarks(c: &mut Criterion) {
    if init_with_engine(Box::new(MockEngine::new()), DataSource::BuiltIn).is_err() {
        return;
    }
    let here = GeoLocation::new(77.21, 28.61, 216.0);
    let atm = Atmosphere::new(1013.25, 25.0);

    c.bench_function("live_position_moon", |b| {
        b.iter(|| live_position(BodyId::MOON, black_box(2_460_000.5), &here, &atm))
    });

    c.bench_function("whats_up", |b| {
        let pair = JulianDatePair::new(2_460_000.5, 2_460_000.5008);
        b.iter(|| whats_up(black_box(&pair), &here, &atm))
    });
}

criterion_group!(benches, facade_benchmarks);
criterion_main!(benches);
