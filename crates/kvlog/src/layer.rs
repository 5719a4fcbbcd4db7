//! Write tracing events as kvencoder lines.
//!
//! [`KvLayer`] turns every event it sees into an [`Entry`] plus typed fields,
//! encodes it, and writes the finished line to its writer in one call.
//!
//! Usage:
//! - Build a [`KvEncoder`] from [`kvencoder::EncoderSettings`].
//! - Install `KvLayer::new(encoder)` in a subscriber; it writes to stderr.
//! - Use [`KvLayer::with_writer`] to target any `MakeWriter` instead.
//!
//! Write failures are counted and otherwise ignored; logging never fails the
//! caller.

use std::{
    io::{self, Write},
    sync::atomic::{AtomicU64, Ordering},
};

use kvencoder::{Caller, Entry, KvEncoder, Level};
use tracing::{Event, Subscriber};
use tracing_subscriber::{
    fmt::MakeWriter,
    layer::{Context, Layer},
};

use crate::visit::collect_fields;

/// Tracing layer that encodes events as `||`-delimited key=value lines.
pub struct KvLayer<W = fn() -> io::Stderr> {
    /// Root encoder; each event is encoded in a clone of it.
    encoder: KvEncoder,
    /// Produces the writer each line goes to.
    make_writer: W,
    /// Count of lines that failed to write.
    write_errors: AtomicU64,
}

impl KvLayer {
    /// Create a layer writing to stderr.
    pub fn new(encoder: KvEncoder) -> Self {
        Self {
            encoder,
            make_writer: io::stderr,
            write_errors: AtomicU64::new(0),
        }
    }
}

impl<W> KvLayer<W> {
    /// Replace the writer lines are sent to.
    pub fn with_writer<W2>(self, make_writer: W2) -> KvLayer<W2>
    where
        W2: for<'w> MakeWriter<'w> + 'static,
    {
        KvLayer {
            encoder: self.encoder,
            make_writer,
            write_errors: self.write_errors,
        }
    }

    /// The encoder events are rendered with.
    pub fn encoder(&self) -> &KvEncoder {
        &self.encoder
    }

    /// Number of lines that could not be written.
    pub fn write_errors(&self) -> u64 {
        self.write_errors.load(Ordering::Relaxed)
    }
}

impl<S, W> Layer<S> for KvLayer<W>
where
    S: Subscriber,
    W: for<'w> MakeWriter<'w> + 'static,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        let collected = collect_fields(event, &self.encoder.config().message_key);

        let mut entry = Entry::now(Level::from(*meta.level())).with_logger_name(meta.target());
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            let mut caller = Caller::new(file, line);
            if let Some(module) = meta.module_path() {
                caller = caller.with_function(module);
            }
            entry = entry.with_caller(caller);
        }
        if let Some(message) = collected.message {
            entry = entry.with_message(message);
        }

        let line = self.encoder.encode_entry(&entry, &collected.fields);
        let mut writer = self.make_writer.make_writer_for(meta);
        if writer.write_all(line.as_bytes()).is_err() {
            self.write_errors.fetch_add(1, Ordering::Relaxed);
        }
    }
}
