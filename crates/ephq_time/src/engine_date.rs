//! Fixed-width text rendering of a UT1 instant.
//!
//! The layout is `_Y_M_D_H_Mi_S.s_`: integer fields without padding, seconds
//! with one decimal place, every field wrapped in underscores. Rendering
//! never fails; parsing is the only place a malformed string is detected.

use std::fmt;

use crate::error::TimeError;
use crate::utc_time::UtcTime;

/// A calendar instant in the engine's `_Y_M_D_H_Mi_S.s_` text form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EngineDateString(String);

impl EngineDateString {
    /// Render calendar fields. Out-of-range fields are rendered as-is.
    pub fn from_utc(t: &UtcTime) -> Self {
        Self(format!(
            "_{}_{}_{}_{}_{}_{:2.1}_",
            t.year, t.month, t.day, t.hour, t.minute, t.second
        ))
    }

    /// Wrap an arbitrary string without checking it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Parse the fields back into a [`UtcTime`].
    ///
    /// Only the layout is checked; call [`UtcTime::validate`] for calendar
    /// sanity.
    pub fn parse(&self) -> Result<UtcTime, TimeError> {
        let malformed = || TimeError::MalformedDateString(self.0.clone());

        let inner = self
            .0
            .strip_prefix('_')
            .and_then(|s| s.strip_suffix('_'))
            .ok_or_else(malformed)?;
        let fields: Vec<&str> = inner.split('_').collect();
        let [y, mo, d, h, mi, s] = fields.as_slice() else {
            return Err(malformed());
        };

        let year = y.trim().parse::<i32>().map_err(|_| malformed())?;
        let month = mo.trim().parse::<u32>().map_err(|_| malformed())?;
        let day = d.trim().parse::<u32>().map_err(|_| malformed())?;
        let hour = h.trim().parse::<u32>().map_err(|_| malformed())?;
        let minute = mi.trim().parse::<u32>().map_err(|_| malformed())?;
        let second = s.trim().parse::<f64>().map_err(|_| malformed())?;
        Ok(UtcTime::new(year, month, day, hour, minute, second))
    }
}

impl fmt::Display for EngineDateString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<EngineDateString> for String {
    fn from(s: EngineDateString) -> Self {
        s.0
    }
}
