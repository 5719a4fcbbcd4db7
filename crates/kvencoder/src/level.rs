//! Log severity levels.

use std::fmt::{self, Display};

/// Severity of a log entry, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Level {
    /// Very fine-grained diagnostics.
    Trace,
    /// Debugging output.
    Debug,
    /// Normal operational messages.
    Info,
    /// Something unexpected that the program recovered from.
    Warn,
    /// An operation failed.
    Error,
    /// Severe error that panics in development builds.
    DPanic,
    /// Error after which the caller panics.
    Panic,
    /// Error after which the caller exits.
    Fatal,
}

impl Level {
    /// Lowercase name, e.g. `info`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::DPanic => "dpanic",
            Self::Panic => "panic",
            Self::Fatal => "fatal",
        }
    }

    /// Uppercase name, e.g. `INFO`.
    pub const fn as_capital_str(self) -> &'static str {
        match self {
            Self::Trace => "TRACE",
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warn => "WARN",
            Self::Error => "ERROR",
            Self::DPanic => "DPANIC",
            Self::Panic => "PANIC",
            Self::Fatal => "FATAL",
        }
    }

    /// ANSI SGR color code used by the colored level formatters.
    pub(crate) const fn ansi_color(self) -> u8 {
        match self {
            Self::Trace => 36,
            Self::Debug => 35,
            Self::Info => 34,
            Self::Warn => 33,
            Self::Error | Self::DPanic | Self::Panic | Self::Fatal => 31,
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<tracing::Level> for Level {
    fn from(level: tracing::Level) -> Self {
        match level {
            tracing::Level::TRACE => Self::Trace,
            tracing::Level::DEBUG => Self::Debug,
            tracing::Level::INFO => Self::Info,
            tracing::Level::WARN => Self::Warn,
            _ => Self::Error,
        }
    }
}
