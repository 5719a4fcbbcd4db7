#![warn(missing_docs)]

//! Logging setup that writes kvencoder lines.
//!
//! This crate connects `tracing` to the kvencoder line format:
//! - [`layer`]: a tracing layer that encodes events and writes them out
//! - [`visit`]: typed collection of event fields
//! - CLI argument parsing for log level and line format configuration

use std::{env, path::PathBuf};

use clap::Args;
use kvencoder::{EncoderSettings, KvEncoder};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod error;
pub mod layer;
pub mod visit;

pub use error::{Error, Result};
pub use layer::KvLayer;

/// Logging controls for CLI apps.
#[derive(Debug, Clone, Default, Args)]
pub struct LogArgs {
    /// Set log level to trace for the given targets
    #[arg(long, conflicts_with_all = ["debug", "log_level", "log_filter"])]
    pub trace: bool,

    /// Set log level to debug for the given targets
    #[arg(long, conflicts_with_all = ["trace", "log_level", "log_filter"])]
    pub debug: bool,

    /// Set a single log level (error|warn|info|debug|trace)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Set an explicit tracing filter directive (overrides other flags)
    /// e.g. "kvencoder=trace,my_app=debug"
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Encoder settings file (.ron or .json) controlling the line format
    #[arg(long)]
    pub log_format: Option<PathBuf>,
}

/// Build a filter directive string that sets the same `level` for every target.
///
/// With no targets the level applies globally.
pub fn level_spec_for(level: &str, targets: &[&str]) -> String {
    let lvl = level.to_ascii_lowercase();
    if targets.is_empty() {
        return lvl;
    }
    targets
        .iter()
        .map(|t| format!("{}={}", t, lvl))
        .collect::<Vec<_>>()
        .join(",")
}

/// Compute the final filter spec string with precedence:
/// - `log_filter`
/// - `trace`/`debug`/`log_level` (scoped to `targets`)
/// - `RUST_LOG` env
/// - default to `info` scoped to `targets`
pub fn compute_spec(
    trace: bool,
    debug: bool,
    log_level: Option<&str>,
    log_filter: Option<&str>,
    targets: &[&str],
) -> String {
    if let Some(spec) = log_filter {
        return spec.to_string();
    }
    if trace {
        return level_spec_for("trace", targets);
    }
    if debug {
        return level_spec_for("debug", targets);
    }
    if let Some(lvl) = log_level {
        return level_spec_for(lvl, targets);
    }
    env::var("RUST_LOG").unwrap_or_else(|_| level_spec_for("info", targets))
}

/// Create an `EnvFilter` from a spec string.
pub fn env_filter_from_spec(spec: &str) -> EnvFilter {
    EnvFilter::new(spec)
}

impl LogArgs {
    /// The filter spec these arguments select.
    pub fn spec(&self, targets: &[&str]) -> String {
        compute_spec(
            self.trace,
            self.debug,
            self.log_level.as_deref(),
            self.log_filter.as_deref(),
            targets,
        )
    }

    /// Encoder settings from `--log-format`, or the defaults.
    pub fn settings(&self) -> Result<EncoderSettings> {
        match &self.log_format {
            Some(path) => Ok(EncoderSettings::load_from_path(path)?),
            None => Ok(EncoderSettings::default()),
        }
    }
}

/// Install a global subscriber that writes kvencoder lines to stderr.
///
/// `targets` scopes the level flags; pass the crate names of the application.
pub fn init(args: &LogArgs, targets: &[&str]) -> Result<()> {
    let settings = args.settings()?;
    let spec = args.spec(targets);
    let layer = KvLayer::new(KvEncoder::new(settings.build()));
    tracing_subscriber::registry()
        .with(env_filter_from_spec(&spec))
        .with(layer)
        .try_init()?;
    tracing::debug!(spec = %spec, "logging initialized");
    Ok(())
}
