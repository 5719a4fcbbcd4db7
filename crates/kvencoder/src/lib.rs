#![warn(missing_docs)]

//! Encode structured log entries as single `||`-delimited key=value lines.
//!
//! A line looks like:
//!
//! ```text
//! [INFO][2024-01-01T00:00:00.000Z][net/conn.rs:42] _undef||du=2||val=105||ok=false
//! ```
//!
//! - [`KvEncoder`]: appends typed values into a pooled working buffer and
//!   assembles complete lines with [`KvEncoder::encode_entry`].
//! - [`Field`] / [`Value`]: the closed set of encodable value types.
//! - [`EncoderConfig`]: key names and pluggable level, time, duration and
//!   caller formatters, built from [`EncoderSettings`].
//! - [`BufferPool`] / [`SyncPool`] / [`PooledBuffer`]: working buffer reuse
//!   with guaranteed release.
//!
//! ```
//! use std::time::Duration;
//!
//! use kvencoder::{EncoderSettings, Entry, Field, KvEncoder, Level};
//!
//! let encoder = KvEncoder::new(EncoderSettings::default().build());
//! let entry = Entry::now(Level::Info);
//! let line = encoder.encode_entry(
//!     &entry,
//!     &[Field::duration("du", Duration::from_secs(2)), Field::int("val", 105)],
//! );
//! assert!(line.as_bytes().ends_with(b" _undef||du=2||val=105\n"));
//! ```

mod buffer;
mod config;
mod encoder;
mod entry;
mod error;
mod field;
pub mod format;
mod level;
mod settings;

pub use buffer::{Buffer, BufferPool, PooledBuffer, SyncPool};
pub use config::{CallerFormatter, DurationFormatter, EncoderConfig, LevelFormatter, TimeFormatter};
pub use encoder::{DEFAULT_TAG, ELEMENT_SEPARATOR, KvEncoder};
pub use entry::{Caller, Entry};
pub use error::{Error, Result};
pub use field::{Complex64, Complex128, Field, Value};
pub use format::{CallerFormat, DurationFormat, LevelFormat, TimeFormat};
pub use level::Level;
pub use settings::EncoderSettings;
