//! Error types

use std::num::ParseIntError;

/// Reasons a single query parameter value was rejected while decoding.
///
/// Decoding never fails as a whole; these are logged and the default is used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    /// The value is not an integer.
    #[error("{key}: not a number: {value:?}")]
    NotANumber {
        key: &'static str,
        value: String,
        #[source]
        source: ParseIntError,
    },

    /// The value is an integer but outside the accepted range.
    #[error("{key}: must be a positive integer, got {value}")]
    OutOfRange { key: &'static str, value: i128 },

    /// A `sort` value not shaped like `<column>:<asc|desc>`.
    #[error("sort: expected `<column>:<asc|desc>`, got {0:?}")]
    MalformedSort(String),
}

/// Errors that can occur while loading a view configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),

    /// The configuration parsed but holds an unusable value.
    #[error("invalid config value for `{field}`: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

/// Errors that can occur while loading a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid dataset: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two rows share the same identifier.
    #[error("duplicate row id: {0}")]
    DuplicateId(String),
}
