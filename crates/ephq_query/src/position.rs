//! Body positions: equatorial coordinates, horizon projection, magnitude.

use ephq_core::{
    Atmosphere, BodyId, CalcFlags, Engine, Epoch, GeoLocation, HorizonEvent, Result, Session,
};
use ephq_time::JulianDatePair;
use log::debug;

use crate::azimuth::rotate_azimuth;
use crate::engine_error;
use crate::riseset::horizon_crossing;

/// Horizontal coordinates, azimuth north-origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Horizontal {
    pub azimuth_deg: f64,
    pub altitude_deg: f64,
}

/// Topocentric apparent position of one body.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionResult {
    pub right_ascension_deg: f64,
    pub declination_deg: f64,
    pub distance_au: f64,
    /// North-origin azimuth.
    pub azimuth_deg: f64,
    /// Apparent (refracted) altitude.
    pub altitude_deg: f64,
    pub magnitude: f64,
}

/// One row of the "what's up" table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyEntry {
    pub body: BodyId,
    pub position: PositionResult,
    /// Next set after the query instant; `None` if the body does not set.
    pub next_set: Option<f64>,
}

/// Position of `body`: equatorial at `jd_tt`, horizontal at `jd_ut1`.
///
/// Either calculation failing fails the whole call; nothing partial is
/// returned.
pub fn compute_position<E: Engine>(
    session: &mut Session<'_, E>,
    body: BodyId,
    jd_tt: f64,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<PositionResult> {
    session.apply_observer(location);
    let flags = CalcFlags::topocentric_equatorial(session.data_source());
    debug!("position of {body} at tt={jd_tt} ut1={jd_ut1}");

    let xx = session
        .engine()
        .calc(Epoch::Terrestrial(jd_tt), body, flags)
        .map_err(engine_error("calc"))?;
    let xaz = session
        .engine()
        .azalt(jd_ut1, location, atmosphere, [xx[0], xx[1], xx[2]]);
    let attr = session
        .engine()
        .pheno(Epoch::Terrestrial(jd_tt), body, flags)
        .map_err(engine_error("pheno"))?;

    Ok(PositionResult {
        right_ascension_deg: xx[0],
        declination_deg: xx[1],
        distance_au: xx[2],
        azimuth_deg: rotate_azimuth(xaz[0]),
        altitude_deg: xaz[2],
        magnitude: attr[4],
    })
}

/// Position from a single UT1 instant; terrestrial time comes from the
/// engine's ΔT.
pub fn compute_position_ut<E: Engine>(
    session: &mut Session<'_, E>,
    body: BodyId,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<PositionResult> {
    let jd_tt = jd_ut1 + session.engine().delta_t(jd_ut1);
    compute_position(session, body, jd_tt, jd_ut1, location, atmosphere)
}

/// The Moon's horizontal position at `jd_ut1` for the session's observer.
///
/// Uses a refraction-free projection and reports the true altitude.
pub fn moon_horizontal<E: Engine>(session: &mut Session<'_, E>, jd_ut1: f64) -> Result<Horizontal> {
    let observer = session.require_observer()?;
    let flags = CalcFlags::topocentric_equatorial(session.data_source());
    let xx = session
        .engine()
        .calc(Epoch::Ut1(jd_ut1), BodyId::MOON, flags)
        .map_err(engine_error("calc (moon)"))?;
    let xaz = session
        .engine()
        .azalt(jd_ut1, &observer, &Atmosphere::default(), [xx[0], xx[1], xx[2]]);
    Ok(Horizontal {
        azimuth_deg: rotate_azimuth(xaz[0]),
        altitude_deg: xaz[1],
    })
}

/// Position and next set time for the Sun, Moon and planets.
///
/// Any engine failure aborts the table.
pub fn whats_up<E: Engine>(
    session: &mut Session<'_, E>,
    time: &JulianDatePair,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<Vec<SkyEntry>> {
    BodyId::PLANETS
        .iter()
        .map(|&body| {
            let position = compute_position(session, body, time.tt, time.ut1, location, atmosphere)?;
            let next_set =
                horizon_crossing(session, body, time.ut1, location, atmosphere, HorizonEvent::Set)?;
            Ok(SkyEntry {
                body,
                position,
                next_set,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ephq_core::mock::{MockEngine, Primitive};
    use ephq_core::{DataSource, Ephemeris, EphemerisError};

    const TT: f64 = 2_451_545.000_8;
    const UT: f64 = 2_451_545.0;

    fn observer() -> GeoLocation {
        GeoLocation::new(-122.42, 37.77, 16.0)
    }

    #[test]
    fn position_fields_and_rotation() {
        let eph = Ephemeris::new(MockEngine::new());
        let p = eph
            .with_session(|s| {
                compute_position(s, BodyId::MARS, TT, UT, &observer(), &Atmosphere::default())
            })
            .unwrap();
        assert_eq!(p.right_ascension_deg, 170.0);
        assert_eq!(p.declination_deg, 37.77);
        assert_eq!(p.azimuth_deg, 350.0);
        assert_eq!(p.altitude_deg, 37.77);
        assert_eq!(p.magnitude, 1.0);
    }

    #[test]
    fn refraction_changes_apparent_altitude() {
        let eph = Ephemeris::new(MockEngine::new());
        let p = eph
            .with_session(|s| {
                compute_position(s, BodyId::SUN, TT, UT, &observer(), &Atmosphere::new(1013.25, 15.0))
            })
            .unwrap();
        assert!((p.altitude_deg - 38.27).abs() < 1e-9);
    }

    #[test]
    fn position_uses_topocentric_equatorial_flags() {
        let mock = MockEngine::new();
        let eph = Ephemeris::with_default_source(mock.clone(), DataSource::Bundled("/ephe".into()));
        eph.with_session(|s| {
            compute_position(s, BodyId::VENUS, TT, UT, &observer(), &Atmosphere::default())
        })
        .unwrap();
        let expected = CalcFlags::SWIEPH | CalcFlags::EQUATORIAL | CalcFlags::TOPOCTR;
        assert_eq!(mock.flags_of(Primitive::Calc), vec![expected]);
        assert_eq!(mock.flags_of(Primitive::Pheno), vec![expected]);
    }

    #[test]
    fn pheno_failure_yields_no_result_and_closes() {
        let mock = MockEngine::new();
        mock.set_failing(Primitive::Pheno, true);
        let eph = Ephemeris::new(mock.clone());
        let err = eph
            .with_session(|s| {
                compute_position(s, BodyId::SUN, TT, UT, &observer(), &Atmosphere::default())
            })
            .unwrap_err();
        assert!(matches!(err, EphemerisError::Engine(_)));
        assert_eq!(mock.closes(), 1);
        assert_eq!(mock.count(Primitive::Calc), 1);
    }

    #[test]
    fn repeated_positions_are_bit_identical() {
        let eph = Ephemeris::new(MockEngine::new());
        let run = || {
            eph.with_session(|s| {
                compute_position(s, BodyId::JUPITER, TT, UT, &observer(), &Atmosphere::default())
            })
            .unwrap()
        };
        let a = run();
        let b = run();
        assert_eq!(a.azimuth_deg.to_bits(), b.azimuth_deg.to_bits());
        assert_eq!(a.magnitude.to_bits(), b.magnitude.to_bits());
        assert_eq!(a, b);
    }

    #[test]
    fn live_position_derives_terrestrial_time() {
        let mock = MockEngine::new();
        let eph = Ephemeris::new(mock.clone());
        eph.with_session(|s| {
            compute_position_ut(s, BodyId::MOON, UT, &observer(), &Atmosphere::default())
        })
        .unwrap();
        let calc = mock
            .call_log()
            .into_iter()
            .find(|c| c.primitive == Primitive::Calc)
            .unwrap();
        let Some(Epoch::Terrestrial(tt)) = calc.epoch else {
            panic!("calc not in terrestrial time: {:?}", calc.epoch);
        };
        assert!((tt - UT - ephq_core::mock::MOCK_DELTA_T_DAYS).abs() < 1e-9);
    }

    #[test]
    fn moon_horizontal_requires_observer() {
        let eph = Ephemeris::new(MockEngine::new());
        let err = eph.with_session(|s| moon_horizontal(s, UT)).unwrap_err();
        assert!(matches!(err, EphemerisError::Engine(_)));
    }

    #[test]
    fn moon_horizontal_true_altitude() {
        let eph = Ephemeris::new(MockEngine::new());
        let h = eph
            .with_session(|s| {
                s.apply_observer(&observer());
                moon_horizontal(s, UT)
            })
            .unwrap();
        // Moon ra 50° raw → 230° north-origin.
        assert_eq!(h.azimuth_deg, 230.0);
        assert_eq!(h.altitude_deg, 37.77);
    }

    #[test]
    fn whats_up_lists_ten_bodies() {
        let eph = Ephemeris::new(MockEngine::new());
        let time = JulianDatePair::new(UT, TT);
        let rows = eph
            .with_session(|s| whats_up(s, &time, &observer(), &Atmosphere::default()))
            .unwrap();
        assert_eq!(rows.len(), 10);
        assert_eq!(rows[0].body, BodyId::SUN);
        assert_eq!(rows[9].body, BodyId::PLUTO);
        assert_eq!(rows[3].next_set, Some(UT + 0.75));
    }

    #[test]
    fn whats_up_aborts_on_failure() {
        let mock = MockEngine::new();
        mock.set_failing(Primitive::RiseTrans, true);
        let eph = Ephemeris::new(mock.clone());
        let time = JulianDatePair::new(UT, TT);
        let result = eph.with_session(|s| whats_up(s, &time, &observer(), &Atmosphere::default()));
        assert!(result.is_err());
        assert_eq!(mock.count(Primitive::RiseTrans), 1);
    }
}
