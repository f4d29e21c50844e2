//! CLI error type.

use memlane_lib::error::{ConfigError, DataError};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{path}: {source}")]
    Config {
        path: String,
        #[source]
        source: ConfigError,
    },

    #[error("{path}: {source}")]
    Data {
        path: String,
        #[source]
        source: DataError,
    },

    #[error("bundled dataset: {0}")]
    BundledData(#[source] DataError),

    #[error("failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),
}
