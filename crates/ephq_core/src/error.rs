//! Error types for facade operations and engine primitives.

use thiserror::Error;

/// Errors surfaced by facade operations.
///
/// Both kinds carry the engine's diagnostic text where one exists.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EphemerisError {
    /// The calendar input was rejected.
    #[error("conversion error: {0}")]
    Conversion(String),
    /// The engine reported a failure, or no event was found.
    #[error("engine error: {0}")]
    Engine(String),
}

impl EphemerisError {
    /// The diagnostic text without the kind prefix.
    pub fn diagnostic(&self) -> &str {
        match self {
            Self::Conversion(msg) | Self::Engine(msg) => msg,
        }
    }
}

pub type Result<T> = std::result::Result<T, EphemerisError>;

/// A failed engine primitive: the engine's return code and error text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {code})")]
pub struct EngineFault {
    pub code: i32,
    pub message: String,
}

impl EngineFault {
    /// The engine's generic error return.
    pub const ERR: i32 = -1;

    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// A fault with the generic error code.
    pub fn err(message: impl Into<String>) -> Self {
        Self::new(Self::ERR, message)
    }
}

impl From<EngineFault> for EphemerisError {
    fn from(fault: EngineFault) -> Self {
        Self::Engine(fault.message)
    }
}
