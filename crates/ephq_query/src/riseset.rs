//! Rise, set and meridian transit searches.

use ephq_core::{
    Atmosphere, BodyId, Engine, EphemerisError, GeoLocation, HorizonEvent, Result, Session,
};
use log::debug;

use crate::engine_error;

/// Next horizon event after `jd_ut1`, or `None` when the body never
/// crosses (circumpolar or never rises).
///
/// Refraction settings are dropped for transits.
pub fn horizon_crossing<E: Engine>(
    session: &mut Session<'_, E>,
    body: BodyId,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
    event: HorizonEvent,
) -> Result<Option<f64>> {
    session.apply_observer(location);
    let flags = session.source_flags();
    let atmosphere = if event.uses_refraction() {
        *atmosphere
    } else {
        Atmosphere::default()
    };
    session
        .engine()
        .rise_trans(jd_ut1, body, flags, event, location, &atmosphere)
        .map_err(engine_error("rise_trans"))
}

/// Next rise, set or transit of `body` after `jd_ut1`.
///
/// "No such event" and engine failure are both [`EphemerisError::Engine`];
/// the former carries the message `no event found`.
pub fn find_event<E: Engine>(
    session: &mut Session<'_, E>,
    body: BodyId,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
    event: HorizonEvent,
) -> Result<f64> {
    match horizon_crossing(session, body, jd_ut1, location, atmosphere, event)? {
        Some(jd) => Ok(jd),
        None => {
            debug!("{event:?} of {body} after {jd_ut1}: no event found");
            Err(EphemerisError::Engine("no event found".into()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ephq_core::mock::{MockEngine, Primitive};
    use ephq_core::{CalcFlags, Ephemeris};

    const UT: f64 = 2_460_000.5;

    fn find(mock: &MockEngine, lat: f64, event: HorizonEvent) -> Result<f64> {
        let eph = Ephemeris::new(mock.clone());
        eph.with_session(|s| {
            find_event(
                s,
                BodyId::SUN,
                UT,
                &GeoLocation::new(0.0, lat, 0.0),
                &Atmosphere::new(1013.25, 10.0),
                event,
            )
        })
    }

    #[test]
    fn finds_each_event_kind() {
        let mock = MockEngine::new();
        assert_eq!(find(&mock, 40.0, HorizonEvent::Rise).unwrap(), UT + 0.25);
        assert_eq!(find(&mock, 40.0, HorizonEvent::Transit).unwrap(), UT + 0.5);
        assert_eq!(find(&mock, 40.0, HorizonEvent::Set).unwrap(), UT + 0.75);
        assert_eq!(mock.closes(), 3);
    }

    #[test]
    fn searches_use_source_flag_only() {
        let mock = MockEngine::new();
        find(&mock, 40.0, HorizonEvent::Rise).unwrap();
        assert_eq!(mock.flags_of(Primitive::RiseTrans), vec![CalcFlags::MOSEPH]);
    }

    #[test]
    fn no_event_is_engine_error() {
        let mock = MockEngine::new();
        let err = find(&mock, 85.0, HorizonEvent::Set).unwrap_err();
        assert_eq!(err, EphemerisError::Engine("no event found".into()));
        assert_eq!(mock.closes(), 1);
    }

    #[test]
    fn engine_failure_is_engine_error() {
        let mock = MockEngine::new();
        mock.set_failing(Primitive::RiseTrans, true);
        let err = find(&mock, 40.0, HorizonEvent::Rise).unwrap_err();
        assert!(matches!(err, EphemerisError::Engine(msg) if msg.contains("injected")));
    }
}
