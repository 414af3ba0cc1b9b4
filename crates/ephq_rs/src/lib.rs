//! Process-wide ephemeris facade.
//!
//! Holds the one engine the process may use and offers each query as a
//! plain function, so callers never handle sessions themselves.
//!
//! # Quick start
//!
//! ```rust,ignore
//! use ephq_rs::*;
//!
//! let config = EphqConfig::from_toml_str("ephe_path = \"/usr/share/ephe\"").unwrap();
//! init(&config).expect("ephemeris init");
//!
//! let here = GeoLocation::new(-122.42, 37.77, 16.0);
//! let utc = UtcTime::new(2024, 4, 8, 18, 0, 0.0);
//! let moon = position(BodyId::MOON, &utc, &here, &Atmosphere::default()).unwrap();
//! println!("Moon at az {:.2}°, alt {:.2}°", moon.azimuth_deg, moon.altitude_deg);
//! ```

pub mod convenience;
pub mod error;
pub mod global;

pub use convenience::{
    jd_to_utc, live_position, lunar_eclipse_global, lunar_eclipse_local, lunar_eclipse_series,
    next_occultations_all_planets, next_rise, next_set, next_transit, occultation_global,
    occultation_local, occultation_series, position, position_at, solar_eclipse_global,
    solar_eclipse_ground_point, solar_eclipse_ground_track, solar_eclipse_local,
    solar_eclipse_series, utc_to_jd, whats_up,
};
pub use error::EphqError;
pub use global::{
    SharedEphemeris, ephemeris, init, init_from_file, init_with_engine, is_initialized,
};

pub use ephq_config::EphqConfig;
pub use ephq_core::{
    Atmosphere, BodyId, DataSource, EclipseClass, Engine, EphemerisError, GeoLocation,
    HorizonEvent, SearchDirection,
};
pub use ephq_query::{
    FlatLayout, GlobalEclipse, GroundPoint, Horizontal, LocalLunarEclipse, LocalOccultation,
    LocalSolarEclipse, LocalView, OCCULTABLE_PLANETS, PlanetOccultation, PositionResult,
    SeriesEntry, SkyEntry,
};
pub use ephq_time::{EngineDateString, JulianDatePair, UtcTime};
