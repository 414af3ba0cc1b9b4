//! Calendar ⇄ Julian Date conversion through the engine.

use ephq_core::{Engine, EphemerisError, Result, Session};
use ephq_time::{EngineDateString, JulianDatePair, UtcTime};
use log::debug;

/// Convert a Gregorian UTC timestamp to the UT1/TT pair.
///
/// An invalid calendar date is a [`EphemerisError::Conversion`] carrying
/// the engine's diagnostic.
pub fn calendar_to_julian<E: Engine>(
    session: &mut Session<'_, E>,
    utc: &UtcTime,
) -> Result<JulianDatePair> {
    session.engine().utc_to_jd(utc).map_err(|fault| {
        debug!("utc_to_jd({utc}) failed: {fault}");
        EphemerisError::Conversion(fault.message)
    })
}

/// Render a UT1 Julian Date as `_Y_M_D_H_Mi_S.s_`. Never fails.
pub fn julian_to_calendar<E: Engine>(session: &mut Session<'_, E>, jd_ut1: f64) -> EngineDateString {
    let utc = session.engine().jd_ut1_to_utc(jd_ut1);
    EngineDateString::from_utc(&utc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ephq_core::Ephemeris;
    use ephq_core::mock::{MockEngine, Primitive};

    #[test]
    fn j2000_reference_epoch() {
        let eph = Ephemeris::new(MockEngine::new());
        let pair = eph
            .with_session(|s| calendar_to_julian(s, &UtcTime::new(2000, 1, 1, 12, 0, 0.0)))
            .unwrap();
        assert!((pair.ut1 - 2_451_545.0).abs() < 1e-9);
        assert!(pair.tt > pair.ut1);
    }

    #[test]
    fn impossible_day_is_conversion_error() {
        let mock = MockEngine::new();
        let eph = Ephemeris::new(mock.clone());
        let err = eph
            .with_session(|s| calendar_to_julian(s, &UtcTime::new(2023, 2, 30, 0, 0, 0.0)))
            .unwrap_err();
        match err {
            EphemerisError::Conversion(msg) => assert!(msg.contains("day 30"), "{msg}"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(mock.closes(), 1);
    }

    #[test]
    fn julian_renders_engine_string() {
        let mock = MockEngine::new();
        let eph = Ephemeris::new(mock.clone());
        let s = eph.with_session(|s| julian_to_calendar(s, 2_451_545.0));
        assert_eq!(s.as_str(), "_2000_1_1_12_0_0.0_");
        assert!(mock.calls().contains(&Primitive::JdToUtc));
    }
}
