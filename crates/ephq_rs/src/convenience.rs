//! One function per query, each running in its own session on the
//! singleton's default data source.

use ephq_core::{
    Atmosphere, BodyId, DataSource, Engine, GeoLocation, HorizonEvent, SearchDirection, Session,
};
use ephq_query::{
    GlobalEclipse, GroundPoint, LocalLunarEclipse, LocalOccultation, LocalSolarEclipse,
    PlanetOccultation, PositionResult, SeriesEntry, SkyEntry,
};
use ephq_time::{EngineDateString, JulianDatePair, UtcTime};

use crate::error::EphqError;
use crate::global::{SharedEphemeris, ephemeris};

fn query<T>(
    f: impl FnOnce(&mut Session<'_, Box<dyn Engine>>) -> ephq_core::Result<T>,
) -> Result<T, EphqError> {
    Ok(ephemeris()?.with_session(f)?)
}

fn default_source(eph: &SharedEphemeris) -> DataSource {
    eph.default_source().clone()
}

/// Gregorian UTC → UT1/TT pair.
pub fn utc_to_jd(utc: &UtcTime) -> Result<JulianDatePair, EphqError> {
    query(|s| ephq_query::calendar_to_julian(s, utc))
}

/// UT1 Julian Date → `_Y_M_D_H_Mi_S.s_`.
pub fn jd_to_utc(jd_ut1: f64) -> Result<EngineDateString, EphqError> {
    query(|s| Ok(ephq_query::julian_to_calendar(s, jd_ut1)))
}

/// Topocentric position of `body` at a UTC instant.
///
/// Conversion and position share one session.
pub fn position(
    body: BodyId,
    utc: &UtcTime,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<PositionResult, EphqError> {
    query(|s| {
        let t = ephq_query::calendar_to_julian(s, utc)?;
        ephq_query::compute_position(s, body, t.tt, t.ut1, location, atmosphere)
    })
}

/// Topocentric position at an explicit UT1/TT pair.
pub fn position_at(
    body: BodyId,
    time: &JulianDatePair,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<PositionResult, EphqError> {
    query(|s| ephq_query::compute_position(s, body, time.tt, time.ut1, location, atmosphere))
}

/// Topocentric position from UT1 alone; TT is derived from ΔT.
pub fn live_position(
    body: BodyId,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<PositionResult, EphqError> {
    query(|s| ephq_query::compute_position_ut(s, body, jd_ut1, location, atmosphere))
}

/// Every named body's position and next set.
pub fn whats_up(
    time: &JulianDatePair,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<Vec<SkyEntry>, EphqError> {
    query(|s| ephq_query::whats_up(s, time, location, atmosphere))
}

fn next_event(
    body: BodyId,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
    event: HorizonEvent,
) -> Result<f64, EphqError> {
    query(|s| ephq_query::find_event(s, body, jd_ut1, location, atmosphere, event))
}

pub fn next_rise(
    body: BodyId,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<f64, EphqError> {
    next_event(body, jd_ut1, location, atmosphere, HorizonEvent::Rise)
}

pub fn next_set(
    body: BodyId,
    jd_ut1: f64,
    location: &GeoLocation,
    atmosphere: &Atmosphere,
) -> Result<f64, EphqError> {
    next_event(body, jd_ut1, location, atmosphere, HorizonEvent::Set)
}

/// Next upper meridian transit. Refraction does not apply.
pub fn next_transit(body: BodyId, jd_ut1: f64, location: &GeoLocation) -> Result<f64, EphqError> {
    next_event(
        body,
        jd_ut1,
        location,
        &Atmosphere::default(),
        HorizonEvent::Transit,
    )
}

pub fn solar_eclipse_global(
    jd_ut1: f64,
    direction: SearchDirection,
) -> Result<GlobalEclipse, EphqError> {
    query(|s| ephq_query::search_solar_global(s, jd_ut1, direction))
}

pub fn solar_eclipse_local(
    jd_ut1: f64,
    location: &GeoLocation,
    direction: SearchDirection,
) -> Result<LocalSolarEclipse, EphqError> {
    query(|s| ephq_query::search_solar_local(s, jd_ut1, location, direction))
}

/// Central-line point of the solar eclipse in progress at `jd_ut1`.
pub fn solar_eclipse_ground_point(jd_ut1: f64) -> Result<GroundPoint, EphqError> {
    query(|s| ephq_query::solar_eclipse_ground_point(s, jd_ut1))
}

/// Central-line points from `begin` in `samples` equal steps to `end`.
pub fn solar_eclipse_ground_track(
    begin: f64,
    end: f64,
    samples: usize,
) -> Result<Vec<GroundPoint>, EphqError> {
    query(|s| ephq_query::solar_eclipse_ground_track(s, begin, end, samples))
}

pub fn lunar_eclipse_global(
    jd_ut1: f64,
    direction: SearchDirection,
) -> Result<GlobalEclipse, EphqError> {
    query(|s| ephq_query::search_lunar_global(s, jd_ut1, direction))
}

pub fn lunar_eclipse_local(
    jd_ut1: f64,
    location: &GeoLocation,
    direction: SearchDirection,
) -> Result<LocalLunarEclipse, EphqError> {
    query(|s| ephq_query::search_lunar_local(s, jd_ut1, location, direction))
}

/// Next lunar occultation of `body`, wherever it is visible.
pub fn occultation_global(
    jd_ut1: f64,
    body: BodyId,
    direction: SearchDirection,
) -> Result<GlobalEclipse, EphqError> {
    query(|s| ephq_query::search_occultation_global(s, jd_ut1, body, direction))
}

pub fn occultation_local(
    jd_ut1: f64,
    location: &GeoLocation,
    body: BodyId,
    direction: SearchDirection,
) -> Result<LocalOccultation, EphqError> {
    query(|s| ephq_query::search_occultation_local(s, jd_ut1, location, body, direction))
}

/// Next occultation of every planet from Mercury to Pluto, one session.
pub fn next_occultations_all_planets(
    jd_ut1: f64,
    location: &GeoLocation,
    direction: SearchDirection,
) -> Result<Vec<PlanetOccultation>, EphqError> {
    query(|s| ephq_query::next_occultations_all_planets(s, jd_ut1, location, direction))
}

pub fn solar_eclipse_series(
    start_ut1: f64,
    location: &GeoLocation,
    direction: SearchDirection,
    count: usize,
) -> Result<Vec<SeriesEntry<LocalSolarEclipse>>, EphqError> {
    let eph = ephemeris()?;
    let source = default_source(eph);
    Ok(ephq_query::solar_eclipse_series(
        eph, &source, start_ut1, location, direction, count,
    )?)
}

pub fn lunar_eclipse_series(
    start_ut1: f64,
    location: &GeoLocation,
    direction: SearchDirection,
    count: usize,
) -> Result<Vec<SeriesEntry<LocalLunarEclipse>>, EphqError> {
    let eph = ephemeris()?;
    let source = default_source(eph);
    Ok(ephq_query::lunar_eclipse_series(
        eph, &source, start_ut1, location, direction, count,
    )?)
}

pub fn occultation_series(
    start_ut1: f64,
    location: &GeoLocation,
    body: BodyId,
    direction: SearchDirection,
    count: usize,
) -> Result<Vec<SeriesEntry<LocalOccultation>>, EphqError> {
    let eph = ephemeris()?;
    let source = default_source(eph);
    Ok(ephq_query::occultation_series(
        eph, &source, start_ut1, location, body, direction, count,
    )?)
}
