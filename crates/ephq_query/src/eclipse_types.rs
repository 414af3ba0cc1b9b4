//! Records returned by eclipse and occultation searches.
//!
//! Instants are UT1 Julian Dates; slots the engine leaves unused are zero.
//! Slot meanings follow the engine:
//!
//! | global slot | solar            | lunar             |
//! |-------------|------------------|-------------------|
//! | 0           | maximum          | maximum           |
//! | 1           | local noon       | (unused)          |
//! | 2           | begin            | partial begin     |
//! | 3           | end              | partial end       |
//! | 4           | totality begin   | totality begin    |
//! | 5           | totality end     | totality end      |
//! | 6           | center-line begin| penumbral begin   |
//! | 7           | center-line end  | penumbral end     |

use ephq_core::EclipseClass;

use crate::position::Horizontal;

/// Result of a global (Earth-wide) eclipse or occultation search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlobalEclipse {
    pub class: EclipseClass,
    pub instants: [f64; 8],
}

impl GlobalEclipse {
    pub fn maximum(&self) -> f64 {
        self.instants[0]
    }

    /// Solar eclipse or occultation `(begin, end)`.
    pub fn solar_span(&self) -> (f64, f64) {
        (self.instants[2], self.instants[3])
    }

    /// Lunar eclipse `(penumbral begin, penumbral end)`.
    pub fn penumbral_span(&self) -> (f64, f64) {
        (self.instants[6], self.instants[7])
    }
}

/// Local circumstances of a solar eclipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalSolarEclipse {
    pub class: EclipseClass,
    /// Maximum, then first to fourth contact.
    pub instants: [f64; 5],
    /// Engine attributes 0..=10; index 4 (Sun azimuth) is north-origin.
    pub attributes: [f64; 11],
    /// The Moon at local maximum.
    pub moon: Horizontal,
}

impl LocalSolarEclipse {
    pub fn maximum(&self) -> f64 {
        self.instants[0]
    }

    pub fn first_contact(&self) -> f64 {
        self.instants[1]
    }

    pub fn sun_azimuth_deg(&self) -> f64 {
        self.attributes[4]
    }
}

/// Local circumstances of a lunar eclipse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalLunarEclipse {
    pub class: EclipseClass,
    pub instants: [f64; 10],
    /// Engine attributes 0..=10; index 4 (Moon azimuth) is north-origin.
    pub attributes: [f64; 11],
}

impl LocalLunarEclipse {
    pub fn maximum(&self) -> f64 {
        self.instants[0]
    }

    pub fn moon_azimuth_deg(&self) -> f64 {
        self.attributes[4]
    }
}

/// Local circumstances of a lunar occultation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalOccultation {
    pub class: EclipseClass,
    pub instants: [f64; 10],
    /// The Moon at disappearance (slot 1).
    pub moon_start: Horizontal,
    /// The Moon at reappearance (slot 4).
    pub moon_end: Horizontal,
}

impl LocalOccultation {
    pub fn maximum(&self) -> f64 {
        self.instants[0]
    }

    pub fn start(&self) -> f64 {
        self.instants[1]
    }

    pub fn end(&self) -> f64 {
        self.instants[4]
    }
}

/// Geographic point on an eclipse's central line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundPoint {
    pub longitude_deg: f64,
    pub latitude_deg: f64,
}

pub(crate) fn first<const N: usize>(src: &[f64]) -> [f64; N] {
    let mut out = [0.0; N];
    out.copy_from_slice(&src[..N]);
    out
}
