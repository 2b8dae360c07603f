//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias.
//! Variants cover invalid parameters and configuration, missing pipeline inputs, raster
//! size mismatches and per-cell stage failures.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid parameter in {context}: {message}")]
    InvalidParameter { context: String, message: String },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("stage '{stage}' is missing required input '{input}'")]
    MissingInput { stage: String, input: String },

    #[error("stage '{stage}' expected a {expected}x{expected} raster, got {actual}")]
    DimensionMismatch {
        stage: String,
        expected: usize,
        actual: String,
    },

    #[error("stage '{stage}' failed at ({x}, {y}): {message}")]
    Stage {
        stage: String,
        x: usize,
        y: usize,
        message: String,
    },
}

impl Error {
    pub(crate) fn invalid_parameter(
        context: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            context: context.into(),
            message: message.into(),
        }
    }

    pub(crate) fn missing_input(stage: impl Into<String>, input: impl Into<String>) -> Self {
        Error::MissingInput {
            stage: stage.into(),
            input: input.into(),
        }
    }
}
