use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ephq_core::mock::MockEngine;
use ephq_core::{Atmosphere, BodyId, Ephemeris, GeoLocation, SearchDirection};
use ephq_query::{FlatLayout, compute_position, search_solar_local, whats_up};
use ephq_time::JulianDatePair;

const UT: f64 = 2_460_000.5;

fn position_bench(c: &mut Criterion) {
    let mock = MockEngine::new();
    let eph = Ephemeris::new(mock.clone());
    let loc = GeoLocation::new(-122.42, 37.77, 16.0);
    let atm = Atmosphere::new(1013.25, 15.0);

    let mut group = c.benchmark_group("query_position");
    group.bench_function("compute_position", |b| {
        b.iter(|| {
            // The mock keeps a call log; keep it from growing without bound.
            mock.clear_calls();
            eph.with_session(|s| {
                compute_position(s, black_box(BodyId::MARS), UT + 0.0008, UT, &loc, &atm)
            })
            .expect("position should succeed")
            .to_flat()
        })
    });
    group.bench_function("whats_up", |b| {
        let time = JulianDatePair::new(UT, UT + 0.0008);
        b.iter(|| {
            mock.clear_calls();
            eph.with_session(|s| whats_up(s, black_box(&time), &loc, &atm))
                .expect("table should succeed")
        })
    });
    group.finish();
}

fn eclipse_bench(c: &mut Criterion) {
    let mock = MockEngine::new();
    let eph = Ephemeris::new(mock.clone());
    let loc = GeoLocation::new(2.35, 48.85, 35.0);

    let mut group = c.benchmark_group("query_eclipse");
    group.bench_function("search_solar_local", |b| {
        b.iter(|| {
            mock.clear_calls();
            eph.with_session(|s| {
                search_solar_local(s, black_box(UT), &loc, SearchDirection::Forward)
            })
            .expect("search should succeed")
            .to_flat()
        })
    });
    group.finish();
}

criterion_group!(benches, position_bench, eclipse_bench);
criterion_main!(benches);
