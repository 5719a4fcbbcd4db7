//! Immutable encoder configuration.

use std::{
    fmt::{self, Debug},
    sync::Arc,
    time::Duration,
};

use chrono::{DateTime, Utc};

use crate::{Buffer, Caller, EncoderSettings, Level};

/// Writes a level into the working buffer.
pub type LevelFormatter = Arc<dyn Fn(Level, &mut Buffer) + Send + Sync>;
/// Writes a timestamp into the working buffer.
pub type TimeFormatter = Arc<dyn Fn(&DateTime<Utc>, &mut Buffer) + Send + Sync>;
/// Writes a duration into the working buffer.
pub type DurationFormatter = Arc<dyn Fn(Duration, &mut Buffer) + Send + Sync>;
/// Writes a call site into the working buffer.
pub type CallerFormatter = Arc<dyn Fn(&Caller, &mut Buffer) + Send + Sync>;

/// Key names and formatter functions shared by every encoder cloned from the
/// same root.
///
/// Only `caller_key` affects the encoded line: an empty caller key suppresses
/// the call site. The remaining keys are carried for front-ends that need
/// them.
#[derive(Clone)]
pub struct EncoderConfig {
    /// Key naming the timestamp.
    pub time_key: String,
    /// Key naming the level.
    pub level_key: String,
    /// Key naming the call site; empty disables caller output.
    pub caller_key: String,
    /// Key naming the message.
    pub message_key: String,
    /// Key naming the logger.
    pub name_key: String,
    /// Key naming a stack trace.
    pub stacktrace_key: String,
    /// Level formatter.
    level: LevelFormatter,
    /// Time formatter.
    time: TimeFormatter,
    /// Duration formatter.
    duration: DurationFormatter,
    /// Caller formatter.
    caller: CallerFormatter,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        EncoderSettings::default().build()
    }
}

impl EncoderConfig {
    /// Assemble a configuration from keys in `settings` and explicit formatters.
    pub(crate) fn from_parts(
        settings: &EncoderSettings,
        level: LevelFormatter,
        time: TimeFormatter,
        duration: DurationFormatter,
        caller: CallerFormatter,
    ) -> Self {
        Self {
            time_key: settings.time_key.clone(),
            level_key: settings.level_key.clone(),
            caller_key: settings.caller_key.clone(),
            message_key: settings.message_key.clone(),
            name_key: settings.name_key.clone(),
            stacktrace_key: settings.stacktrace_key.clone(),
            level,
            time,
            duration,
            caller,
        }
    }

    /// Replace the caller key. An empty key disables caller output.
    pub fn with_caller_key(mut self, key: impl Into<String>) -> Self {
        self.caller_key = key.into();
        self
    }

    /// Replace the level formatter.
    pub fn with_level_formatter(
        mut self,
        f: impl Fn(Level, &mut Buffer) + Send + Sync + 'static,
    ) -> Self {
        self.level = Arc::new(f);
        self
    }

    /// Replace the time formatter.
    pub fn with_time_formatter(
        mut self,
        f: impl Fn(&DateTime<Utc>, &mut Buffer) + Send + Sync + 'static,
    ) -> Self {
        self.time = Arc::new(f);
        self
    }

    /// Replace the duration formatter.
    pub fn with_duration_formatter(
        mut self,
        f: impl Fn(Duration, &mut Buffer) + Send + Sync + 'static,
    ) -> Self {
        self.duration = Arc::new(f);
        self
    }

    /// Replace the caller formatter.
    pub fn with_caller_formatter(
        mut self,
        f: impl Fn(&Caller, &mut Buffer) + Send + Sync + 'static,
    ) -> Self {
        self.caller = Arc::new(f);
        self
    }

    /// Render `level` into `buf`.
    pub fn format_level(&self, level: Level, buf: &mut Buffer) {
        (self.level)(level, buf);
    }

    /// Render `time` into `buf`.
    pub fn format_time(&self, time: &DateTime<Utc>, buf: &mut Buffer) {
        (self.time)(time, buf);
    }

    /// Render `duration` into `buf`.
    pub fn format_duration(&self, duration: Duration, buf: &mut Buffer) {
        (self.duration)(duration, buf);
    }

    /// Render `caller` into `buf`.
    pub fn format_caller(&self, caller: &Caller, buf: &mut Buffer) {
        (self.caller)(caller, buf);
    }
}

impl Debug for EncoderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncoderConfig")
            .field("time_key", &self.time_key)
            .field("level_key", &self.level_key)
            .field("caller_key", &self.caller_key)
            .field("message_key", &self.message_key)
            .field("name_key", &self.name_key)
            .field("stacktrace_key", &self.stacktrace_key)
            .finish_non_exhaustive()
    }
}
