//! Collect `tracing` event fields as typed kvencoder fields.

use std::{error::Error as StdError, fmt::Debug};

use kvencoder::Field;
use tracing::{
    Event,
    field::{Field as EventField, Visit},
};

/// Name `tracing` gives the formatted message of an event.
const MESSAGE_FIELD: &str = "message";

/// Fields extracted from one tracing event.
#[derive(Debug, Clone, Default)]
pub struct Collected {
    /// The event message, if the event had one.
    pub message: Option<String>,
    /// Every field in declaration order, the message renamed to the message key.
    pub fields: Vec<Field>,
}

/// Record every field of `event`.
///
/// The `message` field is renamed to `message_key`; an empty `message_key`
/// keeps the message out of the field list.
pub fn collect_fields(event: &Event<'_>, message_key: &str) -> Collected {
    let mut vis = FieldVisitor {
        message_key,
        out: Collected::default(),
    };
    event.record(&mut vis);
    vis.out
}

/// Visitor mapping each recorded value onto the matching [`Field`] variant.
struct FieldVisitor<'a> {
    /// Key the event message is stored under.
    message_key: &'a str,
    /// Accumulated output.
    out: Collected,
}

impl FieldVisitor<'_> {
    /// Push a field, applying the message rename.
    fn push(&mut self, name: &str, make: impl FnOnce(String) -> Field) {
        let key = if name == MESSAGE_FIELD {
            if self.message_key.is_empty() {
                return;
            }
            self.message_key
        } else {
            name
        };
        self.out.fields.push(make(key.to_string()));
    }

    /// Record a textual value, capturing it as the message when applicable.
    fn push_text(&mut self, name: &str, text: String) {
        if name == MESSAGE_FIELD {
            self.out.message = Some(text.clone());
        }
        self.push(name, |k| Field::string(k, text));
    }
}

impl Visit for FieldVisitor<'_> {
    fn record_i64(&mut self, field: &EventField, value: i64) {
        self.push(field.name(), |k| Field::int(k, value));
    }

    fn record_u64(&mut self, field: &EventField, value: u64) {
        self.push(field.name(), |k| Field::uint(k, value));
    }

    fn record_f64(&mut self, field: &EventField, value: f64) {
        self.push(field.name(), |k| Field::float(k, value));
    }

    fn record_bool(&mut self, field: &EventField, value: bool) {
        self.push(field.name(), |k| Field::bool(k, value));
    }

    fn record_i128(&mut self, field: &EventField, value: i128) {
        self.push_text(field.name(), value.to_string());
    }

    fn record_u128(&mut self, field: &EventField, value: u128) {
        self.push_text(field.name(), value.to_string());
    }

    fn record_str(&mut self, field: &EventField, value: &str) {
        self.push_text(field.name(), value.to_string());
    }

    fn record_error(&mut self, field: &EventField, value: &(dyn StdError + 'static)) {
        self.push_text(field.name(), value.to_string());
    }

    fn record_debug(&mut self, field: &EventField, value: &dyn Debug) {
        self.push_text(field.name(), format!("{value:?}"));
    }
}
