//! Core error types

use thiserror::Error;

/// Settings-related errors
#[derive(Error, Debug)]
pub enum SettingsError {
    /// Invalid settings content
    #[error("Invalid settings: {0}")]
    Invalid(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialize error
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
