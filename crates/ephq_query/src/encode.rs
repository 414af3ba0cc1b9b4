//! Flat `f64` layouts for the external boundary.
//!
//! Each record has one fixed field order and length. A record is flattened
//! whole or not at all; there is no partially written buffer.
//!
//! | record              | len | layout |
//! |---------------------|-----|--------|
//! | `JulianDatePair`    | 2   | `tt, ut1` |
//! | `PositionResult`    | 6   | `ra, dec, distance, azimuth, altitude, magnitude` |
//! | `GlobalEclipse`     | 9   | `class, instants[0..8]` |
//! | `LocalSolarEclipse` | 19  | `class, instants[0..5], attributes[0..11], moon az, moon alt` |
//! | `GroundPoint`       | 2   | `longitude, latitude` |
//! | `LocalLunarEclipse` | 22  | `class, instants[0..10], attributes[0..11]` |
//! | `LocalOccultation`  | 15  | `class, instants[0..10], start az, start alt, end az, end alt` |

use ephq_core::EclipseClass;
use ephq_time::JulianDatePair;
use thiserror::Error;

use crate::eclipse_types::{
    GlobalEclipse, GroundPoint, LocalLunarEclipse, LocalOccultation, LocalSolarEclipse,
};
use crate::position::{Horizontal, PositionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeError {
    #[error("output buffer too small: need {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
}

/// Append-only builder for a flat record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatBuffer(Vec<f64>);

impl FlatBuffer {
    pub fn with_capacity(n: usize) -> Self {
        Self(Vec::with_capacity(n))
    }

    pub fn push(&mut self, v: f64) {
        self.0.push(v);
    }

    pub fn extend_from_slice(&mut self, v: &[f64]) {
        self.0.extend_from_slice(v);
    }

    pub fn push_class(&mut self, class: EclipseClass) {
        self.0.push(f64::from(class.bits()));
    }

    pub fn push_horizontal(&mut self, h: &Horizontal) {
        self.0.push(h.azimuth_deg);
        self.0.push(h.altitude_deg);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<f64> {
        self.0
    }
}

/// A record with a fixed flat layout.
pub trait FlatLayout {
    /// Number of `f64` slots in the layout.
    const LEN: usize;

    /// Append the fields in layout order.
    fn push_fields(&self, out: &mut FlatBuffer);

    fn to_flat(&self) -> Vec<f64> {
        let mut buf = FlatBuffer::with_capacity(Self::LEN);
        self.push_fields(&mut buf);
        debug_assert_eq!(buf.len(), Self::LEN);
        buf.into_vec()
    }

    /// Write the layout into the front of `out`, returning the slot count.
    ///
    /// `out` is untouched when it is too short.
    fn write_flat(&self, out: &mut [f64]) -> Result<usize, EncodeError> {
        if out.len() < Self::LEN {
            return Err(EncodeError::BufferTooSmall {
                needed: Self::LEN,
                got: out.len(),
            });
        }
        out[..Self::LEN].copy_from_slice(&self.to_flat());
        Ok(Self::LEN)
    }
}

impl FlatLayout for JulianDatePair {
    const LEN: usize = 2;

    fn push_fields(&self, out: &mut FlatBuffer) {
        out.extend_from_slice(&self.to_engine_order());
    }
}

impl FlatLayout for PositionResult {
    const LEN: usize = 6;

    fn push_fields(&self, out: &mut FlatBuffer) {
        out.extend_from_slice(&[
            self.right_ascension_deg,
            self.declination_deg,
            self.distance_au,
            self.azimuth_deg,
            self.altitude_deg,
            self.magnitude,
        ]);
    }
}

impl FlatLayout for GlobalEclipse {
    const LEN: usize = 9;

    fn push_fields(&self, out: &mut FlatBuffer) {
        out.push_class(self.class);
        out.extend_from_slice(&self.instants);
    }
}

impl FlatLayout for LocalSolarEclipse {
    const LEN: usize = 19;

    fn push_fields(&self, out: &mut FlatBuffer) {
        out.push_class(self.class);
        out.extend_from_slice(&self.instants);
        out.extend_from_slice(&self.attributes);
        out.push_horizontal(&self.moon);
    }
}

impl FlatLayout for GroundPoint {
    const LEN: usize = 2;

    fn push_fields(&self, out: &mut FlatBuffer) {
        out.push(self.longitude_deg);
        out.push(self.latitude_deg);
    }
}

impl FlatLayout for LocalLunarEclipse {
    const LEN: usize = 22;

    fn push_fields(&self, out: &mut FlatBuffer) {
        out.push_class(self.class);
        out.extend_from_slice(&self.instants);
        out.extend_from_slice(&self.attributes);
    }
}

impl FlatLayout for LocalOccultation {
    const LEN: usize = 15;

    fn push_fields(&self, out: &mut FlatBuffer) {
        out.push_class(self.class);
        out.extend_from_slice(&self.instants);
        out.push_horizontal(&self.moon_start);
        out.push_horizontal(&self.moon_end);
    }
}
