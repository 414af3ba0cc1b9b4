//! End-to-end contract of the query layer over the in-memory engine.

use ephq_core::mock::{MockEngine, Primitive};
use ephq_core::{
    Atmosphere, BodyId, DataSource, EclipseClass, Ephemeris, EphemerisError, GeoLocation,
    SearchDirection,
};
use ephq_query::{
    FlatLayout, calendar_to_julian, compute_position, search_lunar_global, search_lunar_local,
    search_occultation_local, search_solar_global, search_solar_local,
};
use ephq_time::UtcTime;
use proptest::prelude::*;

fn observer() -> GeoLocation {
    GeoLocation::new(151.21, -33.87, 58.0)
}

fn facade() -> (MockEngine, Ephemeris<MockEngine>) {
    let mock = MockEngine::new();
    (mock.clone(), Ephemeris::new(mock))
}

#[test]
fn calendar_then_position_layout() {
    let (_, eph) = facade();
    let flat = eph
        .with_session(|s| {
            let t = calendar_to_julian(s, &UtcTime::new(2024, 4, 8, 18, 17, 0.0))?;
            let p = compute_position(s, BodyId::SUN, t.tt, t.ut1, &observer(), &Atmosphere::default())?;
            Ok::<_, EphemerisError>((t.to_flat(), p.to_flat()))
        })
        .unwrap();
    assert_eq!(flat.0.len(), 2);
    assert!(flat.0[0] > flat.0[1], "tt first, then ut1");
    assert_eq!(flat.1.len(), 6);
    assert!((0.0..360.0).contains(&flat.1[3]));
}

#[test]
fn solar_local_secondary_failure_emits_no_buffer() {
    let (mock, eph) = facade();
    mock.set_failing(Primitive::Calc, true);
    let result = eph.with_session(|s| {
        search_solar_local(s, 2_460_000.5, &observer(), SearchDirection::Forward)
            .map(|e| e.to_flat())
    });
    assert!(matches!(result, Err(EphemerisError::Engine(_))));
    assert_eq!(mock.closes(), 1);
}

#[test]
fn every_emitted_azimuth_is_north_origin() {
    let (_, eph) = facade();
    let jd = 2_460_000.5;
    let loc = observer();
    let (solar, lunar, occ) = eph
        .with_session(|s| {
            Ok::<_, EphemerisError>((
                search_solar_local(s, jd, &loc, SearchDirection::Forward)?,
                search_lunar_local(s, jd, &loc, SearchDirection::Forward)?,
                search_occultation_local(s, jd, &loc, BodyId::VENUS, SearchDirection::Forward)?,
            ))
        })
        .unwrap();
    for az in [
        solar.sun_azimuth_deg(),
        solar.moon.azimuth_deg,
        lunar.moon_azimuth_deg(),
        occ.moon_start.azimuth_deg,
        occ.moon_end.azimuth_deg,
    ] {
        assert!((0.0..360.0).contains(&az), "azimuth {az}");
    }
    assert_eq!(solar.to_flat()[10], 20.0);
    assert_eq!(lunar.to_flat()[15], 170.0);
}

#[test]
fn bundled_source_selects_installed_tables() {
    let mock = MockEngine::new();
    let eph = Ephemeris::new(mock.clone());
    let source = DataSource::Bundled("/opt/ephe".into());
    eph.with_session_using(&source, |s| {
        search_lunar_global(s, 2_460_000.5, SearchDirection::Forward)
    })
    .unwrap();
    assert_eq!(
        mock.flags_of(Primitive::LunEclipseWhen),
        vec![ephq_core::CalcFlags::SWIEPH]
    );
}

#[test]
fn global_classes_survive_encoding() {
    let (_, eph) = facade();
    let g = eph
        .with_session(|s| search_solar_global(s, 2_460_000.5, SearchDirection::Forward))
        .unwrap();
    let flat = g.to_flat();
    assert_eq!(EclipseClass::from_code(flat[0] as i32), g.class);
    assert_eq!(&flat[1..], &g.instants);
}

proptest! {
    #[test]
    fn later_calendar_input_gives_later_ut1(
        day in 1u32..=28,
        hour in 0u32..24,
        minute in 0u32..60,
        step_min in 1u32..(60 * 24 * 30),
    ) {
        let (_, eph) = facade();
        let t1 = UtcTime::new(2010, 6, day, hour, minute, 0.0);
        let t2 = t1.with_offset_minutes(step_min as i32);
        let (a, b) = eph.with_session(|s| {
            Ok::<_, EphemerisError>((calendar_to_julian(s, &t1)?, calendar_to_julian(s, &t2)?))
        }).unwrap();
        prop_assert!(a.ut1 < b.ut1);
        prop_assert!(a.tt >= a.ut1);
    }
}
