//! Engine primitive contract and session discipline for the ephemeris facade.
//!
//! The numerical engine behind the facade keeps its data-source path and
//! topocentric location as process-wide mutable state. This crate names the
//! primitives the facade uses ([`Engine`]), the value types flowing through
//! them, and the serialized [`Ephemeris`] / [`Session`] pair that makes
//! every configure → invoke → close sequence one critical section.

pub mod eclipse_class;
pub mod engine;
pub mod error;
#[cfg(any(test, feature = "mock-engine"))]
pub mod mock;
pub mod session;

use std::path::{Path, PathBuf};

use bitflags::bitflags;

pub use eclipse_class::EclipseClass;
pub use engine::{Engine, EclipseSearch, EclipseWhere, LocalEclipseSearch};
pub use error::{EngineFault, EphemerisError, Result};
pub use session::{Ephemeris, Session};

pub use ephq_time::{JulianDatePair, UtcTime};

// ---------------------------------------------------------------------------
// Bodies
// ---------------------------------------------------------------------------

/// Engine body number, passed through without interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub i32);

impl BodyId {
    pub const SUN: Self = Self(0);
    pub const MOON: Self = Self(1);
    pub const MERCURY: Self = Self(2);
    pub const VENUS: Self = Self(3);
    pub const MARS: Self = Self(4);
    pub const JUPITER: Self = Self(5);
    pub const SATURN: Self = Self(6);
    pub const URANUS: Self = Self(7);
    pub const NEPTUNE: Self = Self(8);
    pub const PLUTO: Self = Self(9);

    /// Sun, Moon and the planets in engine order.
    pub const PLANETS: [Self; 10] = [
        Self::SUN,
        Self::MOON,
        Self::MERCURY,
        Self::VENUS,
        Self::MARS,
        Self::JUPITER,
        Self::SATURN,
        Self::URANUS,
        Self::NEPTUNE,
        Self::PLUTO,
    ];

    pub const fn code(self) -> i32 {
        self.0
    }

    /// English name for the ten named bodies.
    pub const fn name(self) -> Option<&'static str> {
        match self.0 {
            0 => Some("Sun"),
            1 => Some("Moon"),
            2 => Some("Mercury"),
            3 => Some("Venus"),
            4 => Some("Mars"),
            5 => Some("Jupiter"),
            6 => Some("Saturn"),
            7 => Some("Uranus"),
            8 => Some("Neptune"),
            9 => Some("Pluto"),
            _ => None,
        }
    }
}

impl From<i32> for BodyId {
    fn from(code: i32) -> Self {
        Self(code)
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "body {}", self.0),
        }
    }
}

// ---------------------------------------------------------------------------
// Flags
// ---------------------------------------------------------------------------

bitflags! {
    /// Computation flags, numerically identical to the engine's `SEFLG_*`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CalcFlags: i32 {
        /// Installed high-precision tables.
        const SWIEPH = 2;
        /// Built-in reduced-precision model.
        const MOSEPH = 4;
        const SPEED = 256;
        const EQUATORIAL = 2048;
        const TOPOCTR = 32 * 1024;
    }
}

impl CalcFlags {
    /// The data-source bit for `source`.
    pub fn for_source(source: &DataSource) -> Self {
        match source {
            DataSource::Bundled(_) => Self::SWIEPH,
            DataSource::BuiltIn => Self::MOSEPH,
        }
    }

    /// Flags for topocentric equatorial positions.
    pub fn topocentric_equatorial(source: &DataSource) -> Self {
        Self::for_source(source) | Self::EQUATORIAL | Self::TOPOCTR
    }
}

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

/// Where the engine reads its ephemeris from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum DataSource {
    /// Directory of installed ephemeris files.
    Bundled(PathBuf),
    /// The engine's built-in approximate model.
    #[default]
    BuiltIn,
}

impl DataSource {
    /// `None` and the empty path both mean [`DataSource::BuiltIn`].
    pub fn from_path(path: Option<&Path>) -> Self {
        match path {
            Some(p) if !p.as_os_str().is_empty() => Self::Bundled(p.to_path_buf()),
            _ => Self::BuiltIn,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Bundled(p) => Some(p),
            Self::BuiltIn => None,
        }
    }

    pub fn is_built_in(&self) -> bool {
        matches!(self, Self::BuiltIn)
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

/// Geographic observer location (WGS84-style, altitude above sea level).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    /// Longitude in degrees, east positive.
    pub longitude_deg: f64,
    /// Latitude in degrees, north positive.
    pub latitude_deg: f64,
    pub altitude_m: f64,
}

impl GeoLocation {
    pub fn new(longitude_deg: f64, latitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            longitude_deg,
            latitude_deg,
            altitude_m,
        }
    }

    /// From the boundary triple `[lon, lat, alt]`.
    pub fn from_array(v: [f64; 3]) -> Self {
        Self::new(v[0], v[1], v[2])
    }

    /// The engine's `geopos` triple `[lon, lat, alt]`.
    pub fn to_array(self) -> [f64; 3] {
        [self.longitude_deg, self.latitude_deg, self.altitude_m]
    }
}

/// Ambient conditions for refraction. Zero pressure disables refraction.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Atmosphere {
    pub pressure_hpa: f64,
    pub temperature_c: f64,
}

impl Atmosphere {
    pub fn new(pressure_hpa: f64, temperature_c: f64) -> Self {
        Self {
            pressure_hpa,
            temperature_c,
        }
    }
}

// ---------------------------------------------------------------------------
// Search parameters
// ---------------------------------------------------------------------------

/// Search direction for eclipse and occultation searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchDirection {
    #[default]
    Forward,
    Backward,
}

impl SearchDirection {
    /// Boundary code: `0` forward, `1` backward.
    pub const fn code(self) -> i32 {
        match self {
            Self::Forward => 0,
            Self::Backward => 1,
        }
    }

    pub const fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Forward),
            1 => Some(Self::Backward),
            _ => None,
        }
    }

    pub const fn is_backward(self) -> bool {
        matches!(self, Self::Backward)
    }
}

/// How hard an occultation search tries before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SearchMode {
    /// Keep searching until an event is found.
    #[default]
    Exhaustive,
    /// Stop after the first conjunction whether or not it occults.
    SingleAttempt,
}

/// Horizon event kinds for rise/transit/set searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HorizonEvent {
    Rise,
    Set,
    /// Upper meridian transit.
    Transit,
}

impl HorizonEvent {
    /// The engine's `SE_CALC_*` selector.
    pub const fn code(self) -> i32 {
        match self {
            Self::Rise => 1,
            Self::Set => 2,
            Self::Transit => 4,
        }
    }

    /// Whether refraction parameters influence the result.
    pub const fn uses_refraction(self) -> bool {
        !matches!(self, Self::Transit)
    }
}

/// An instant tagged with the time scale it is expressed in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Epoch {
    /// Julian Date in UT1.
    Ut1(f64),
    /// Julian Date in terrestrial time.
    Terrestrial(f64),
}

impl Epoch {
    pub fn jd(self) -> f64 {
        match self {
            Self::Ut1(jd) | Self::Terrestrial(jd) => jd,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_names() {
        assert_eq!(BodyId::MOON.to_string(), "Moon");
        assert_eq!(BodyId(15).to_string(), "body 15");
        assert_eq!(BodyId::PLANETS.len(), 10);
        assert_eq!(BodyId::PLANETS[9], BodyId::PLUTO);
    }

    #[test]
    fn flag_values_match_engine() {
        assert_eq!(CalcFlags::SWIEPH.bits(), 2);
        assert_eq!(CalcFlags::MOSEPH.bits(), 4);
        assert_eq!(CalcFlags::EQUATORIAL.bits(), 2048);
        assert_eq!(CalcFlags::TOPOCTR.bits(), 32768);
        let f = CalcFlags::topocentric_equatorial(&DataSource::BuiltIn);
        assert_eq!(f.bits(), 4 | 2048 | 32768);
    }

    #[test]
    fn empty_path_is_built_in() {
        assert_eq!(DataSource::from_path(Some(Path::new(""))), DataSource::BuiltIn);
        assert_eq!(DataSource::from_path(None), DataSource::BuiltIn);
        let bundled = DataSource::from_path(Some(Path::new("/usr/share/ephe")));
        assert_eq!(bundled.path(), Some(Path::new("/usr/share/ephe")));
        assert_eq!(CalcFlags::for_source(&bundled), CalcFlags::SWIEPH);
    }

    #[test]
    fn direction_codes() {
        assert_eq!(SearchDirection::from_code(0), Some(SearchDirection::Forward));
        assert_eq!(SearchDirection::from_code(1), Some(SearchDirection::Backward));
        assert_eq!(SearchDirection::from_code(2), None);
        assert_eq!(SearchDirection::Backward.code(), 1);
    }

    #[test]
    fn geolocation_array_order() {
        let loc = GeoLocation::from_array([-122.4, 37.8, 16.0]);
        assert_eq!(loc.longitude_deg, -122.4);
        assert_eq!(loc.to_array(), [-122.4, 37.8, 16.0]);
    }

    #[test]
    fn transit_ignores_refraction() {
        assert!(HorizonEvent::Rise.uses_refraction());
        assert!(!HorizonEvent::Transit.uses_refraction());
        assert_eq!(HorizonEvent::Set.code(), 2);
    }
}
