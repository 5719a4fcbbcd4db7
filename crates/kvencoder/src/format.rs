//! Built-in level, time, duration, and caller formatters.
//!
//! Each formatter writes straight into the working buffer. The enums name the
//! built-ins so they can be selected from settings files.

use std::{fmt::Write, sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    Buffer, Caller, Level,
    config::{CallerFormatter, DurationFormatter, LevelFormatter, TimeFormatter},
};

/// Nanoseconds per second.
const NANOS_PER_SEC: f64 = 1e9;

/// Nanoseconds per millisecond.
const NANOS_PER_MILLI: f64 = 1e6;

/// Named level formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LevelFormat {
    /// `INFO`
    #[default]
    Capital,
    /// `INFO` wrapped in an ANSI color.
    CapitalColor,
    /// `info`
    Lowercase,
    /// `info` wrapped in an ANSI color.
    Color,
}

impl LevelFormat {
    /// The formatter function this name selects.
    pub fn formatter(self) -> LevelFormatter {
        match self {
            Self::Capital => Arc::new(capital_level),
            Self::CapitalColor => Arc::new(capital_color_level),
            Self::Lowercase => Arc::new(lowercase_level),
            Self::Color => Arc::new(color_level),
        }
    }
}

/// Named time formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimeFormat {
    /// `2024-01-01T00:00:00Z`
    Rfc3339,
    /// `2024-01-01T00:00:00.5Z`, fractional seconds with trailing zeros trimmed.
    Rfc3339Nano,
    /// `2024-01-01T00:00:00.000Z`
    #[default]
    Iso8601,
    /// Float seconds since the Unix epoch.
    Epoch,
    /// Float milliseconds since the Unix epoch.
    Millis,
    /// Integer nanoseconds since the Unix epoch.
    Nanos,
}

impl TimeFormat {
    /// The formatter function this name selects.
    pub fn formatter(self) -> TimeFormatter {
        match self {
            Self::Rfc3339 => Arc::new(rfc3339_time),
            Self::Rfc3339Nano => Arc::new(rfc3339_nano_time),
            Self::Iso8601 => Arc::new(iso8601_time),
            Self::Epoch => Arc::new(epoch_seconds_time),
            Self::Millis => Arc::new(epoch_millis_time),
            Self::Nanos => Arc::new(epoch_nanos_time),
        }
    }
}

/// Named duration formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DurationFormat {
    /// Float seconds: two seconds render as `2`.
    #[default]
    Seconds,
    /// Float milliseconds.
    Millis,
    /// Integer nanoseconds.
    Nanos,
    /// Human form such as `1.5s` or `250ms`.
    String,
}

impl DurationFormat {
    /// The formatter function this name selects.
    pub fn formatter(self) -> DurationFormatter {
        match self {
            Self::Seconds => Arc::new(seconds_duration),
            Self::Millis => Arc::new(millis_duration),
            Self::Nanos => Arc::new(nanos_duration),
            Self::String => Arc::new(string_duration),
        }
    }
}

/// Named caller formatters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CallerFormat {
    /// Last directory, file name and line: `net/conn.rs:42`.
    #[default]
    Short,
    /// Full path and line.
    Full,
    /// Short form followed by `@` and the enclosing function or module:
    /// `net/conn.rs:42@app::net`.
    Function,
}

impl CallerFormat {
    /// The formatter function this name selects.
    pub fn formatter(self) -> CallerFormatter {
        match self {
            Self::Short => Arc::new(short_caller),
            Self::Full => Arc::new(full_caller),
            Self::Function => Arc::new(function_caller),
        }
    }
}

/// Write `INFO`.
pub fn capital_level(level: Level, buf: &mut Buffer) {
    buf.append_str(level.as_capital_str());
}

/// Write `info`.
pub fn lowercase_level(level: Level, buf: &mut Buffer) {
    buf.append_str(level.as_str());
}

/// Write `INFO` wrapped in its ANSI color.
pub fn capital_color_level(level: Level, buf: &mut Buffer) {
    let _ignored = write!(
        buf,
        "\x1b[{}m{}\x1b[0m",
        level.ansi_color(),
        level.as_capital_str()
    );
}

/// Write `info` wrapped in its ANSI color.
pub fn color_level(level: Level, buf: &mut Buffer) {
    let _ignored = write!(
        buf,
        "\x1b[{}m{}\x1b[0m",
        level.ansi_color(),
        level.as_str()
    );
}

/// Write RFC 3339 with whole seconds.
pub fn rfc3339_time(t: &DateTime<Utc>, buf: &mut Buffer) {
    let _ignored = write!(buf, "{}", t.format("%Y-%m-%dT%H:%M:%SZ"));
}

/// Write RFC 3339 with as many fractional digits as needed, up to nine.
pub fn rfc3339_nano_time(t: &DateTime<Utc>, buf: &mut Buffer) {
    let _ignored = write!(buf, "{}", t.format("%Y-%m-%dT%H:%M:%S"));
    let nanos = t.timestamp_subsec_nanos() % 1_000_000_000;
    if nanos > 0 {
        let digits = format!("{nanos:09}");
        buf.append_byte(b'.');
        buf.append_str(digits.trim_end_matches('0'));
    }
    buf.append_byte(b'Z');
}

/// Write ISO 8601 with millisecond precision.
pub fn iso8601_time(t: &DateTime<Utc>, buf: &mut Buffer) {
    let _ignored = write!(buf, "{}", t.format("%Y-%m-%dT%H:%M:%S%.3fZ"));
}

/// Write float seconds since the epoch.
pub fn epoch_seconds_time(t: &DateTime<Utc>, buf: &mut Buffer) {
    buf.append_float(
        t.timestamp() as f64 + f64::from(t.timestamp_subsec_nanos()) / NANOS_PER_SEC,
    );
}

/// Write float milliseconds since the epoch.
pub fn epoch_millis_time(t: &DateTime<Utc>, buf: &mut Buffer) {
    buf.append_float(
        t.timestamp() as f64 * 1e3 + f64::from(t.timestamp_subsec_nanos()) / NANOS_PER_MILLI,
    );
}

/// Write integer nanoseconds since the epoch.
pub fn epoch_nanos_time(t: &DateTime<Utc>, buf: &mut Buffer) {
    let nanos = i128::from(t.timestamp()) * 1_000_000_000 + i128::from(t.timestamp_subsec_nanos());
    let _ignored = write!(buf, "{nanos}");
}

/// Write float seconds.
pub fn seconds_duration(d: Duration, buf: &mut Buffer) {
    buf.append_float(d.as_secs_f64());
}

/// Write float milliseconds.
pub fn millis_duration(d: Duration, buf: &mut Buffer) {
    buf.append_float(d.as_nanos() as f64 / NANOS_PER_MILLI);
}

/// Write integer nanoseconds.
pub fn nanos_duration(d: Duration, buf: &mut Buffer) {
    let _ignored = write!(buf, "{}", d.as_nanos());
}

/// Write a human-readable duration such as `1.5s`.
pub fn string_duration(d: Duration, buf: &mut Buffer) {
    let _ignored = write!(buf, "{d:?}");
}

/// Write `dir/file.rs:line`.
pub fn short_caller(caller: &Caller, buf: &mut Buffer) {
    buf.append_str(caller.trimmed_path());
    buf.append_byte(b':');
    buf.append_uint(u64::from(caller.line));
}

/// Write `/full/path/file.rs:line`.
pub fn full_caller(caller: &Caller, buf: &mut Buffer) {
    buf.append_str(&caller.file);
    buf.append_byte(b':');
    buf.append_uint(u64::from(caller.line));
}

/// Write the short form, then `@function` when the call site names one.
pub fn function_caller(caller: &Caller, buf: &mut Buffer) {
    short_caller(caller, buf);
    if let Some(function) = &caller.function {
        buf.append_byte(b'@');
        buf.append_str(function);
    }
}
