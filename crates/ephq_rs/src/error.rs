//! Error type for the facade singleton.

use ephq_config::ConfigError;
use ephq_core::EphemerisError;
use ephq_swe::SweError;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EphqError {
    #[error("ephemeris not initialized; call init() first")]
    NotInitialized,
    #[error("ephemeris already initialized")]
    AlreadyInitialized,
    #[error(transparent)]
    Ephemeris(#[from] EphemerisError),
    #[error(transparent)]
    Backend(#[from] SweError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl EphqError {
    /// The query error, when this is one.
    pub fn as_ephemeris(&self) -> Option<&EphemerisError> {
        match self {
            Self::Ephemeris(e) => Some(e),
            _ => None,
        }
    }
}
