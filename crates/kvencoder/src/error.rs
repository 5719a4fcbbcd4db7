//! Errors raised while loading encoder settings.

use std::{io, path::PathBuf, result::Result as StdResult};

use thiserror::Error;

/// Convenient result type for the encoder crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors produced while loading encoder settings.
///
/// Encoding itself never fails.
#[derive(Debug, Error)]
pub enum Error {
    /// The settings file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Read {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The settings file extension is neither `.ron` nor `.json`.
    #[error("unsupported settings format for {} (expected .ron or .json)", path.display())]
    UnsupportedFormat {
        /// Offending path.
        path: PathBuf,
    },

    /// RON settings failed to parse.
    #[error("RON settings error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    /// JSON settings failed to parse.
    #[error("JSON settings error: {0}")]
    Json(#[from] serde_json::Error),
}
