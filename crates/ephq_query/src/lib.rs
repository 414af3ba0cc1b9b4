//! Ephemeris queries: time conversion, positions, horizon events, eclipses
//! and lunar occultations.
//!
//! Every query runs inside a caller-supplied [`Session`], so the engine's
//! process-wide state is configured and torn down once per request. Results
//! come back as typed records; [`encode::FlatLayout`] flattens them into
//! the fixed-order `f64` buffers of the external boundary.
//!
//! Azimuths leaving this crate are north-origin, in `[0, 360)`.

pub mod azimuth;
pub mod eclipse;
pub mod eclipse_types;
pub mod encode;
pub mod occultation;
pub mod position;
pub mod riseset;
pub mod series;
pub mod time;

pub use azimuth::rotate_azimuth;
pub use eclipse::{
    is_visible_locally, search_lunar_global, search_lunar_local, search_solar_global,
    search_solar_local, solar_eclipse_ground_point, solar_eclipse_ground_track,
};
pub use eclipse_types::{
    GlobalEclipse, GroundPoint, LocalLunarEclipse, LocalOccultation, LocalSolarEclipse,
};
pub use encode::{EncodeError, FlatBuffer, FlatLayout};
pub use occultation::{
    OCCULTABLE_PLANETS, PlanetOccultation, next_occultations_all_planets,
    search_occultation_global, search_occultation_local,
};
pub use position::{
    Horizontal, PositionResult, SkyEntry, compute_position, compute_position_ut, moon_horizontal,
    whats_up,
};
pub use riseset::{find_event, horizon_crossing};
pub use series::{
    LocalView, SeriesEntry, lunar_eclipse_series, occultation_series, solar_eclipse_series,
};
pub use time::{calendar_to_julian, julian_to_calendar};

pub use ephq_core::{EphemerisError, Result, Session};

use ephq_core::EngineFault;
use log::debug;

/// Map an engine fault to [`EphemerisError::Engine`], logging it once.
pub(crate) fn engine_error(op: &'static str) -> impl FnOnce(EngineFault) -> EphemerisError {
    move |fault| {
        debug!("{op} failed: {fault}");
        fault.into()
    }
}
