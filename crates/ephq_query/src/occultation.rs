//! Lunar occultation searches.

use ephq_core::{
    BodyId, EclipseClass, Engine, GeoLocation, Result, SearchDirection, SearchMode, Session,
};
use log::debug;

use crate::eclipse::is_visible_locally;
use crate::eclipse_types::{GlobalEclipse, LocalOccultation, first};
use crate::engine_error;
use crate::position::moon_horizontal;

/// Next (or previous) occultation of `body` by the Moon, anywhere on Earth.
///
/// The engine is asked for a single attempt: a conjunction without an
/// occultation ends the search instead of moving on to the next month.
pub fn search_occultation_global<E: Engine>(
    session: &mut Session<'_, E>,
    jd_ut1: f64,
    body: BodyId,
    direction: SearchDirection,
) -> Result<GlobalEclipse> {
    let flags = session.source_flags();
    let found = session
        .engine()
        .lun_occult_when_glob(jd_ut1, body, flags, direction, SearchMode::SingleAttempt)
        .map_err(engine_error("lun_occult_when_glob"))?;
    debug!("occultation of {body} {direction:?} of {jd_ut1}: max {}", found.tret[0]);
    Ok(GlobalEclipse {
        class: EclipseClass::from_code(found.class),
        instants: first(&found.tret),
    })
}

/// Next (or previous) occultation of `body` visible from `location`, with
/// the Moon's horizontal position at disappearance and reappearance.
pub fn search_occultation_local<E: Engine>(
    session: &mut Session<'_, E>,
    jd_ut1: f64,
    location: &GeoLocation,
    body: BodyId,
    direction: SearchDirection,
) -> Result<LocalOccultation> {
    session.apply_observer(location);
    let flags = session.source_flags();
    let found = session
        .engine()
        .lun_occult_when_loc(jd_ut1, body, flags, location, direction)
        .map_err(engine_error("lun_occult_when_loc"))?;

    let moon_start = moon_horizontal(session, found.tret[1])?;
    let moon_end = moon_horizontal(session, found.tret[4])?;
    Ok(LocalOccultation {
        class: EclipseClass::from_code(found.class),
        instants: found.tret,
        moon_start,
        moon_end,
    })
}

/// Bodies the Moon is searched against when scanning every planet.
pub const OCCULTABLE_PLANETS: [BodyId; 8] = [
    BodyId::MERCURY,
    BodyId::VENUS,
    BodyId::MARS,
    BodyId::JUPITER,
    BodyId::SATURN,
    BodyId::URANUS,
    BodyId::NEPTUNE,
    BodyId::PLUTO,
];

/// First occultation of one planet after (or before) the scan start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlanetOccultation {
    pub body: BodyId,
    pub global: GlobalEclipse,
    /// Present when the event is visible from the observer.
    pub local: Option<LocalOccultation>,
}

/// Next occultation of each of [`OCCULTABLE_PLANETS`] from one start.
///
/// Every planet gets a local and a global search from `jd_ut1`; the first
/// failure aborts the scan.
pub fn next_occultations_all_planets<E: Engine>(
    session: &mut Session<'_, E>,
    jd_ut1: f64,
    location: &GeoLocation,
    direction: SearchDirection,
) -> Result<Vec<PlanetOccultation>> {
    OCCULTABLE_PLANETS
        .iter()
        .map(|&body| {
            let local = search_occultation_local(session, jd_ut1, location, body, direction)?;
            let global = search_occultation_global(session, jd_ut1, body, direction)?;
            let visible = is_visible_locally(global.maximum(), local.maximum());
            Ok(PlanetOccultation {
                body,
                global,
                local: visible.then_some(local),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ephq_core::mock::{MockEngine, Primitive};
    use ephq_core::{Ephemeris, EphemerisError, Epoch};

    const UT: f64 = 2_460_000.5;

    #[test]
    fn global_uses_single_attempt() {
        let mock = MockEngine::new();
        let eph = Ephemeris::new(mock.clone());
        let g = eph
            .with_session(|s| search_occultation_global(s, UT, BodyId::VENUS, SearchDirection::Forward))
            .unwrap();
        assert!(g.maximum() > UT);
        assert_eq!(mock.search_modes(), vec![SearchMode::SingleAttempt]);
    }

    #[test]
    fn local_recomputes_moon_at_both_contacts() {
        let mock = MockEngine::new();
        let eph = Ephemeris::new(mock.clone());
        let local = eph
            .with_session(|s| {
                search_occultation_local(
                    s,
                    UT,
                    &GeoLocation::new(-70.0, -33.4, 500.0),
                    BodyId::MARS,
                    SearchDirection::Backward,
                )
            })
            .unwrap();
        assert!(local.maximum() < UT);
        let epochs: Vec<Option<Epoch>> = mock
            .call_log()
            .iter()
            .filter(|c| c.primitive == Primitive::Calc)
            .map(|c| c.epoch)
            .collect();
        assert_eq!(
            epochs,
            vec![Some(Epoch::Ut1(local.start())), Some(Epoch::Ut1(local.end()))]
        );
        assert_eq!(local.moon_start.azimuth_deg, 230.0);
        assert_eq!(local.moon_end.altitude_deg, -33.4);
    }

    #[test]
    fn local_secondary_failure_aborts() {
        let mock = MockEngine::new();
        mock.set_failing(Primitive::Calc, true);
        let eph = Ephemeris::new(mock.clone());
        let err = eph
            .with_session(|s| {
                search_occultation_local(
                    s,
                    UT,
                    &GeoLocation::new(0.0, 0.0, 0.0),
                    BodyId::JUPITER,
                    SearchDirection::Forward,
                )
            })
            .unwrap_err();
        assert!(matches!(err, EphemerisError::Engine(_)));
        assert_eq!(mock.closes(), 1);
    }

    #[test]
    fn unknown_body_fails() {
        let eph = Ephemeris::new(MockEngine::new());
        let err = eph
            .with_session(|s| search_occultation_global(s, UT, BodyId(99), SearchDirection::Forward))
            .unwrap_err();
        assert!(err.diagnostic().contains("99"));
    }

    #[test]
    fn all_planets_scan_searches_each_body_once() {
        let mock = MockEngine::new();
        let eph = Ephemeris::new(mock.clone());
        let here = GeoLocation::new(-0.13, 51.5, 20.0);
        let scan = eph
            .with_session(|s| next_occultations_all_planets(s, UT, &here, SearchDirection::Forward))
            .unwrap();
        let bodies: Vec<BodyId> = scan.iter().map(|o| o.body).collect();
        assert_eq!(bodies, OCCULTABLE_PLANETS.to_vec());
        assert_eq!(mock.occulted_bodies(Primitive::LunOccultWhenLoc), bodies);
        assert_eq!(mock.occulted_bodies(Primitive::LunOccultWhenGlob), bodies);
        // every search starts from the same instant
        assert!(
            mock.call_log()
                .iter()
                .filter(|c| c.primitive == Primitive::LunOccultWhenGlob)
                .all(|c| c.epoch == Some(Epoch::Ut1(UT)))
        );
        assert!(scan.iter().all(|o| o.local.is_some()));
        assert_eq!(mock.closes(), 1);
    }

    #[test]
    fn all_planets_scan_stops_at_first_failure() {
        let mock = MockEngine::new();
        mock.set_failing(Primitive::LunOccultWhenGlob, true);
        let eph = Ephemeris::new(mock.clone());
        let err = eph
            .with_session(|s| {
                next_occultations_all_planets(
                    s,
                    UT,
                    &GeoLocation::new(0.0, 0.0, 0.0),
                    SearchDirection::Backward,
                )
            })
            .unwrap_err();
        assert!(matches!(err, EphemerisError::Engine(_)));
        assert_eq!(mock.occulted_bodies(Primitive::LunOccultWhenLoc), vec![BodyId::MERCURY]);
    }
}
