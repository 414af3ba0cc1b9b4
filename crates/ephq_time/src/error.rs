//! Error types for calendar handling.

use thiserror::Error;

/// Errors from calendar validation or engine date-string parsing.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum TimeError {
    /// The calendar fields do not name a real Gregorian instant.
    #[error("invalid date: {0}")]
    InvalidDate(String),
    /// An engine date string could not be parsed back into fields.
    #[error("malformed engine date string: {0:?}")]
    MalformedDateString(String),
}
