//! The process-wide ephemeris.
//!
//! The engine's state is global to the process, so the facade is too: one
//! [`Ephemeris`] set up once by [`init`] (or [`init_with_engine`]) and
//! shared by every caller afterwards.

use std::path::Path;
use std::sync::OnceLock;

use ephq_config::EphqConfig;
use ephq_core::{DataSource, Engine, Ephemeris};

use crate::error::EphqError;

/// The engine handle the singleton holds.
pub type SharedEphemeris = Ephemeris<Box<dyn Engine>>;

static EPHEMERIS: OnceLock<SharedEphemeris> = OnceLock::new();

/// Initialize with the Swiss Ephemeris backend and `config`'s data source.
pub fn init(config: &EphqConfig) -> Result<(), EphqError> {
    if is_initialized() {
        return Err(EphqError::AlreadyInitialized);
    }
    let engine = ephq_swe::acquire_engine()?;
    init_with_engine(engine, config.data_source())
}

/// Load `path`, apply environment overrides, then [`init`].
pub fn init_from_file(path: &Path) -> Result<EphqConfig, EphqError> {
    let mut config = EphqConfig::load(path)?;
    config.apply_env();
    config.validate()?;
    init(&config)?;
    Ok(config)
}

/// Initialize with any engine, e.g. an in-memory one in tests.
pub fn init_with_engine(
    engine: Box<dyn Engine>,
    default_source: DataSource,
) -> Result<(), EphqError> {
    log::debug!("initializing ephemeris facade ({default_source:?})");
    EPHEMERIS
        .set(Ephemeris::with_default_source(engine, default_source))
        .map_err(|_| EphqError::AlreadyInitialized)
}

pub fn is_initialized() -> bool {
    EPHEMERIS.get().is_some()
}

/// The initialized singleton.
pub fn ephemeris() -> Result<&'static SharedEphemeris, EphqError> {
    EPHEMERIS.get().ok_or(EphqError::NotInitialized)
}
