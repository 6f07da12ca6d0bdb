// SPDX-License-Identifier: MIT OR Apache-2.0
//! Errors for the fallible surfaces of the cinema crate.
//!
//! Playback itself never fails; only configuration I/O does.

use thiserror::Error;

/// Cinema errors
#[derive(Debug, Error)]
pub enum CinemaError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON content could not be parsed
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Value could not be serialized to RON
    #[error("Serialization error: {0}")]
    Serialize(#[from] ron::Error),

    /// Configuration values are out of range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for cinema operations
pub type Result<T> = std::result::Result<T, CinemaError>;
