//! Errors raised while building a [`GestureConfig`](crate::GestureConfig).
//!
//! Gesture handling itself has no failure path; only loading and validating
//! configuration can go wrong.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed gesture config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("deadzone `{name}` has min {min} greater than max {max}")]
    InvalidDeadzone { name: &'static str, min: f32, max: f32 },

    #[error("invalid value for `{name}`: {reason}")]
    InvalidValue { name: &'static str, reason: String },
}
