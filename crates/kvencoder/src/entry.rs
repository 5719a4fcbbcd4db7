//! A single log occurrence.

use chrono::{DateTime, Utc};

use crate::Level;

/// Source location that produced an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    /// Source file path as recorded at the call site.
    pub file: String,
    /// 1-based line number.
    pub line: u32,
    /// Enclosing function or module path, when known.
    pub function: Option<String>,
}

impl Caller {
    /// Construct a call site from a file path and line.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
            function: None,
        }
    }

    /// Attach the enclosing function or module path.
    pub fn with_function(mut self, function: impl Into<String>) -> Self {
        self.function = Some(function.into());
        self
    }

    /// The file path trimmed to its last directory and file name.
    ///
    /// `src/net/conn.rs` becomes `net/conn.rs`; paths with fewer than two
    /// components are returned unchanged.
    pub fn trimmed_path(&self) -> &str {
        let Some(last) = self.file.rfind('/') else {
            return &self.file;
        };
        match self.file[..last].rfind('/') {
            Some(prev) => &self.file[prev + 1..],
            None => &self.file,
        }
    }
}

/// One log occurrence. Fields are supplied alongside the entry when encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Severity.
    pub level: Level,
    /// When the entry was produced.
    pub time: DateTime<Utc>,
    /// Call site, when captured.
    pub caller: Option<Caller>,
    /// Human-readable message. Not part of the encoded line.
    pub message: String,
    /// Name of the emitting logger, if any.
    pub logger_name: Option<String>,
}

impl Entry {
    /// Construct an entry with no caller, message, or logger name.
    pub fn new(level: Level, time: DateTime<Utc>) -> Self {
        Self {
            level,
            time,
            caller: None,
            message: String::new(),
            logger_name: None,
        }
    }

    /// Construct an entry stamped with the current time.
    pub fn now(level: Level) -> Self {
        Self::new(level, Utc::now())
    }

    /// Attach a call site.
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Attach a message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a logger name.
    pub fn with_logger_name(mut self, name: impl Into<String>) -> Self {
        self.logger_name = Some(name.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trimmed_path_keeps_last_directory() {
        assert_eq!(
            Caller::new("/home/u/src/net/conn.rs", 9).trimmed_path(),
            "net/conn.rs"
        );
        assert_eq!(Caller::new("net/conn.rs", 9).trimmed_path(), "net/conn.rs");
        assert_eq!(Caller::new("conn.rs", 9).trimmed_path(), "conn.rs");
    }
}
