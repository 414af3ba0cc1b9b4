use std::ptr;

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use ephq_core::DataSource;
use ephq_core::mock::MockEngine;
use ephq_ffi_c::{
    EPHQ_POSITION_LEN, EPHQ_SOLAR_LOCAL_LEN, EphqStatus, ephq_position_live, ephq_rise,
    ephq_solar_local,
};

const GEOPOS: [f64; 3] = [77.21, 28.61, 216.0];

fn ffi_benchmarks(c: &mut Criterion) {
    if ephq_rs::init_with_engine(Box::new(MockEngine::new()), DataSource::BuiltIn).is_err() {
        return;
    }

    c.bench_function("ffi_position_live", |b| {
        let mut out = [0.0; EPHQ_POSITION_LEN];
        b.iter(|| {
            let status = unsafe {
                ephq_position_live(
                    ptr::null(),
                    0,
                    1,
                    black_box(2_460_000.5),
                    GEOPOS.as_ptr(),
                    1013.25,
                    25.0,
                    out.as_mut_ptr(),
                    out.len(),
                )
            };
            assert_eq!(status, EphqStatus::Ok);
        })
    });

    c.bench_function("ffi_rise", |b| {
        b.iter(|| unsafe {
            ephq_rise(ptr::null(), 0, 0, black_box(2_460_000.5), GEOPOS.as_ptr(), 0.0, 0.0)
        })
    });

    c.bench_function("ffi_solar_local", |b| {
        let mut out = [0.0; EPHQ_SOLAR_LOCAL_LEN];
        b.iter(|| unsafe {
            ephq_solar_local(
                ptr::null(),
                0,
                black_box(2_460_000.5),
                GEOPOS.as_ptr(),
                0,
                out.as_mut_ptr(),
                out.len(),
            )
        })
    });
}

criterion_group!(benches, ffi_benchmarks);
criterion_main!(benches);
