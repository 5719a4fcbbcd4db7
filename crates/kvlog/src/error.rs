//! Errors raised while setting up logging.

use std::result::Result as StdResult;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;

/// Convenient result type for the kvlog crate.
pub type Result<T> = StdResult<T, Error>;

/// Errors raised while setting up logging.
#[derive(Debug, Error)]
pub enum Error {
    /// The encoder settings file could not be loaded.
    #[error("Log format error: {0}")]
    Settings(#[from] kvencoder::Error),

    /// A global subscriber was already installed.
    #[error("Logging init error: {0}")]
    Init(#[from] TryInitError),
}
