//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` where a core
//! constructor can fail.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("hour {0} is outside 0..=23")]
    InvalidHour(u8),

    #[error("coordinate ({lat}, {lon}) is not a valid WGS-84 position")]
    InvalidCoordinate { lat: f64, lon: f64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `rr-core`.
pub type CoreResult<T> = Result<T, CoreError>;
