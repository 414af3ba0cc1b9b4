//! Solar and lunar eclipse searches, global and local.

use ephq_core::{EclipseClass, Engine, GeoLocation, Result, SearchDirection, Session};
use log::debug;

use crate::azimuth::rotate_azimuth;
use crate::eclipse_types::{
    GlobalEclipse, GroundPoint, LocalLunarEclipse, LocalSolarEclipse, first,
};
use crate::engine_error;
use crate::position::moon_horizontal;

/// Largest gap, in days, between a local and a global maximum for the local
/// event to be the same eclipse.
pub const LOCAL_MATCH_WINDOW_DAYS: f64 = 1.0;

/// Whether a local search found the same event as the global one.
pub fn is_visible_locally(global_max: f64, local_max: f64) -> bool {
    (local_max - global_max).abs() <= LOCAL_MATCH_WINDOW_DAYS
}

/// Next (or previous) solar eclipse anywhere on Earth.
pub fn search_solar_global<E: Engine>(
    session: &mut Session<'_, E>,
    jd_ut1: f64,
    direction: SearchDirection,
) -> Result<GlobalEclipse> {
    let flags = session.source_flags();
    let found = session
        .engine()
        .sol_eclipse_when_glob(jd_ut1, flags, direction)
        .map_err(engine_error("sol_eclipse_when_glob"))?;
    debug!("solar eclipse {direction:?} of {jd_ut1}: max {}", found.tret[0]);
    Ok(GlobalEclipse {
        class: EclipseClass::from_code(found.class),
        instants: first(&found.tret),
    })
}

/// Next (or previous) solar eclipse visible from `location`, with the
/// Moon's horizontal position at local maximum.
///
/// A failure computing the Moon's position fails the whole search.
pub fn search_solar_local<E: Engine>(
    session: &mut Session<'_, E>,
    jd_ut1: f64,
    location: &GeoLocation,
    direction: SearchDirection,
) -> Result<LocalSolarEclipse> {
    session.apply_observer(location);
    let flags = session.source_flags();
    let found = session
        .engine()
        .sol_eclipse_when_loc(jd_ut1, flags, location, direction)
        .map_err(engine_error("sol_eclipse_when_loc"))?;

    let mut attributes: [f64; 11] = first(&found.attr);
    attributes[4] = rotate_azimuth(attributes[4]);
    let moon = moon_horizontal(session, found.tret[0])?;

    Ok(LocalSolarEclipse {
        class: EclipseClass::from_code(found.class),
        instants: first(&found.tret),
        attributes,
        moon,
    })
}

/// Central-line point of the solar eclipse in progress at `jd_ut1`.
///
/// The engine reports no distinct "no eclipse" outcome here; confirm the
/// eclipse with [`search_solar_global`] first.
pub fn solar_eclipse_ground_point<E: Engine>(
    session: &mut Session<'_, E>,
    jd_ut1: f64,
) -> Result<GroundPoint> {
    let flags = session.source_flags();
    let found = session
        .engine()
        .sol_eclipse_where(jd_ut1, flags)
        .map_err(engine_error("sol_eclipse_where"))?;
    Ok(GroundPoint {
        longitude_deg: found.geopos[0],
        latitude_deg: found.geopos[1],
    })
}

/// Central-line points from `begin` to `end` in `samples` equal steps,
/// `samples + 1` points in all.
pub fn solar_eclipse_ground_track<E: Engine>(
    session: &mut Session<'_, E>,
    begin: f64,
    end: f64,
    samples: usize,
) -> Result<Vec<GroundPoint>> {
    let step = if samples == 0 {
        0.0
    } else {
        (end - begin) / samples as f64
    };
    (0..=samples)
        .map(|i| solar_eclipse_ground_point(session, begin + step * i as f64))
        .collect()
}

/// Next (or previous) lunar eclipse.
pub fn search_lunar_global<E: Engine>(
    session: &mut Session<'_, E>,
    jd_ut1: f64,
    direction: SearchDirection,
) -> Result<GlobalEclipse> {
    let flags = session.source_flags();
    let found = session
        .engine()
        .lun_eclipse_when(jd_ut1, flags, direction)
        .map_err(engine_error("lun_eclipse_when"))?;
    debug!("lunar eclipse {direction:?} of {jd_ut1}: max {}", found.tret[0]);
    Ok(GlobalEclipse {
        class: EclipseClass::from_code(found.class),
        instants: first(&found.tret),
    })
}

/// Next (or previous) lunar eclipse visible from `location`.
pub fn search_lunar_local<E: Engine>(
    session: &mut Session<'_, E>,
    jd_ut1: f64,
    location: &GeoLocation,
    direction: SearchDirection,
) -> Result<LocalLunarEclipse> {
    session.apply_observer(location);
    let flags = session.source_flags();
    let found = session
        .engine()
        .lun_eclipse_when_loc(jd_ut1, flags, location, direction)
        .map_err(engine_error("lun_eclipse_when_loc"))?;

    let mut attributes: [f64; 11] = first(&found.attr);
    attributes[4] = rotate_azimuth(attributes[4]);
    Ok(LocalLunarEclipse {
        class: EclipseClass::from_code(found.class),
        instants: found.tret,
        attributes,
    })
}
