//! Serializable encoder settings and the loader that reads them from disk.

use std::{fs, path::Path};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    CallerFormat, DurationFormat, EncoderConfig, Error, LevelFormat, Result, TimeFormat,
};

/// Key names and named formatters, as written in a settings file.
///
/// Every field is optional in the file; omitted fields take their defaults.
///
/// ```ron
/// (
///     callerKey: "",
///     timeFormat: rfc3339,
///     durationFormat: string,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct EncoderSettings {
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
    pub level_format: LevelFormat,
    /// Time formatter.
    pub time_format: TimeFormat,
    /// Duration formatter.
    pub duration_format: DurationFormat,
    /// Caller formatter.
    pub caller_format: CallerFormat,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            time_key: "ts".to_string(),
            level_key: "level".to_string(),
            caller_key: "caller".to_string(),
            message_key: "msg".to_string(),
            name_key: "logger".to_string(),
            stacktrace_key: "stacktrace".to_string(),
            level_format: LevelFormat::default(),
            time_format: TimeFormat::default(),
            duration_format: DurationFormat::default(),
            caller_format: CallerFormat::default(),
        }
    }
}

impl EncoderSettings {
    /// Parse settings from RON text.
    pub fn from_ron_str(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }

    /// Parse settings from JSON text.
    pub fn from_json_str(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load settings from a `.ron` or `.json` file.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        if !matches!(ext.as_deref(), Some("ron" | "json")) {
            return Err(Error::UnsupportedFormat {
                path: path.to_path_buf(),
            });
        }
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "loading encoder settings");
        match ext.as_deref() {
            Some("json") => Self::from_json_str(&text),
            _ => Self::from_ron_str(&text),
        }
    }

    /// Build the immutable configuration these settings describe.
    pub fn build(&self) -> EncoderConfig {
        EncoderConfig::from_parts(
            self,
            self.level_format.formatter(),
            self.time_format.formatter(),
            self.duration_format.formatter(),
            self.caller_format.formatter(),
        )
    }
}

#[cfg(test)]
mod tests {
    use std::{env, process};

    use super::*;

    #[test]
    fn ron_overrides_defaults() {
        let s = EncoderSettings::from_ron_str(
            r#"(callerKey: "", timeFormat: rfc3339, durationFormat: string)"#,
        )
        .expect("parse");
        assert_eq!(s.caller_key, "");
        assert_eq!(s.time_format, TimeFormat::Rfc3339);
        assert_eq!(s.duration_format, DurationFormat::String);
        assert_eq!(s.level_format, LevelFormat::Capital);
        assert_eq!(s.time_key, "ts");
    }

    #[test]
    fn json_overrides_defaults() {
        let s = EncoderSettings::from_json_str(
            r#"{"levelFormat": "capitalColor", "callerFormat": "full", "messageKey": "m"}"#,
        )
        .expect("parse");
        assert_eq!(s.level_format, LevelFormat::CapitalColor);
        assert_eq!(s.caller_format, CallerFormat::Full);
        assert_eq!(s.message_key, "m");
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(matches!(
            EncoderSettings::from_ron_str("(timeFormat: sundial)"),
            Err(Error::Ron(_))
        ));
        assert!(matches!(
            EncoderSettings::from_json_str(r#"{"separator": "|"}"#),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn load_rejects_unknown_extension() {
        let err = EncoderSettings::load_from_path(Path::new("settings.toml")).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { .. }));
    }

    #[test]
    fn load_reports_missing_file() {
        let path = env::temp_dir().join("kvencoder-settings-does-not-exist.ron");
        let err = EncoderSettings::load_from_path(&path).unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert!(err.to_string().contains("kvencoder-settings-does-not-exist.ron"));
    }

    #[test]
    fn load_reads_json_file() {
        let path = env::temp_dir().join(format!("kvencoder-settings-{}.json", process::id()));
        fs::write(&path, r#"{"timeFormat": "nanos"}"#).expect("write settings");
        let loaded = EncoderSettings::load_from_path(&path);
        let _ignored = fs::remove_file(&path);
        assert_eq!(loaded.expect("load").time_format, TimeFormat::Nanos);
    }
}
