//! Swiss Ephemeris backend for the ephemeris facade.
//!
//! [`SwissEphemeris`] implements [`ephq_core::Engine`] on top of the C
//! library `libswe`. The library keeps its ephemeris path and topocentric
//! location in global state, so at most one handle exists per process;
//! [`acquire_engine`] hands it out and dropping it releases the slot.
//!
//! When the build script cannot locate `libswe` the crate compiles without
//! the backend and [`acquire_engine`] returns [`SweError::NotLinked`].

#[cfg(swe_linked)]
mod backend;
#[cfg(swe_linked)]
mod ffi;

use std::sync::atomic::{AtomicBool, Ordering};

use ephq_core::{Engine, EphemerisError};
use thiserror::Error;

#[cfg(swe_linked)]
pub use backend::SwissEphemeris;

static ACQUIRED: AtomicBool = AtomicBool::new(false);

/// Errors from acquiring the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SweError {
    #[error("swiss ephemeris library was not linked into this build")]
    NotLinked,
    #[error("swiss ephemeris is already in use by another handle")]
    AlreadyAcquired,
}

impl From<SweError> for EphemerisError {
    fn from(err: SweError) -> Self {
        EphemerisError::Engine(err.to_string())
    }
}

/// Whether this build carries the Swiss Ephemeris backend.
pub const fn is_linked() -> bool {
    cfg!(swe_linked)
}

/// Take the process-wide Swiss Ephemeris handle as a boxed engine.
pub fn acquire_engine() -> Result<Box<dyn Engine>, SweError> {
    #[cfg(swe_linked)]
    {
        Ok(Box::new(SwissEphemeris::acquire()?))
    }
    #[cfg(not(swe_linked))]
    {
        log::warn!("swiss ephemeris requested but libswe was not found at build time");
        Err(SweError::NotLinked)
    }
}

#[cfg_attr(not(swe_linked), allow(dead_code))]
fn claim() -> Result<(), SweError> {
    ACQUIRED
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .map(|_| ())
        .map_err(|_| SweError::AlreadyAcquired)
}

#[cfg_attr(not(swe_linked), allow(dead_code))]
fn release() {
    ACQUIRED.store(false, Ordering::Release);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_is_exclusive() {
        // Exercised only here so no other test in this binary races it.
        claim().unwrap();
        assert_eq!(claim(), Err(SweError::AlreadyAcquired));
        release();
        claim().unwrap();
        release();
    }

    #[test]
    fn error_maps_to_engine_error() {
        let err: EphemerisError = SweError::NotLinked.into();
        assert!(matches!(err, EphemerisError::Engine(msg) if msg.contains("not linked")));
    }
}
