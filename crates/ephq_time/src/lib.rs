//! Calendar ⇄ Julian Date types shared by every layer of the facade.
//!
//! This crate provides:
//! - Gregorian calendar ⇄ Julian Date arithmetic
//! - `UtcTime`, the calendar timestamp callers hand to the facade
//! - `JulianDatePair`, the UT1 / terrestrial-time pair the engine derives
//! - `EngineDateString`, the fixed-width text rendering of a UT1 instant
//!
//! Leap seconds and ΔT are the engine's business; nothing here models them.

pub mod engine_date;
pub mod error;
pub mod julian;
pub mod utc_time;

pub use engine_date::EngineDateString;
pub use error::TimeError;
pub use julian::{
    J2000_JD, SECONDS_PER_DAY, UNIX_EPOCH_JD, calendar_to_jd, days_in_month, is_leap_year,
    jd_to_calendar,
};
pub use utc_time::UtcTime;

/// The two epochs the engine derives from one calendar timestamp.
///
/// Positions are evaluated in terrestrial time; horizon geometry in UT1.
/// For any real date `tt >= ut1`, and both grow with the calendar input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JulianDatePair {
    /// Julian Date in UT1.
    pub ut1: f64,
    /// Julian Date in terrestrial (ephemeris) time.
    pub tt: f64,
}

impl JulianDatePair {
    pub fn new(ut1: f64, tt: f64) -> Self {
        Self { ut1, tt }
    }

    /// Build from the engine's native output order, `[tt, ut1]`.
    pub fn from_engine_order(dret: [f64; 2]) -> Self {
        Self {
            tt: dret[0],
            ut1: dret[1],
        }
    }

    /// The engine's native output order, `[tt, ut1]`.
    pub fn to_engine_order(self) -> [f64; 2] {
        [self.tt, self.ut1]
    }

    /// TT − UT1 in seconds.
    pub fn delta_t_seconds(self) -> f64 {
        (self.tt - self.ut1) * SECONDS_PER_DAY
    }
}
