//! The field encoder and entry assembler.
//!
//! An encoded entry is one line:
//!
//! ```text
//! [<level>][<time>][<caller>] _undef||key=value||key=value\n
//! ```
//!
//! Values are written without escaping. A string containing `||`, `=`,
//! brackets or a newline will break the framing for downstream readers.

use std::{
    fmt::{self, Debug},
    sync::Arc,
    time::Duration,
};

use base64::{Engine, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};

use crate::{
    BufferPool, Complex128, EncoderConfig, Entry, Field, PooledBuffer, SyncPool, Value,
};

/// Token written before every keyed field, including the first.
pub const ELEMENT_SEPARATOR: &str = "||";

/// Tag written after the envelope of every line, before any field.
pub const DEFAULT_TAG: &str = "_undef";

/// Encodes fields and entries into a pooled working buffer.
///
/// An encoder pairs a shared [`EncoderConfig`] with one working buffer.
/// Cloning shares the configuration and acquires a fresh buffer from the same
/// pool, so each clone can be written independently on its own thread.
pub struct KvEncoder {
    /// Shared, read-only configuration.
    config: Arc<EncoderConfig>,
    /// Working buffer owned by this instance.
    buf: PooledBuffer,
}

impl KvEncoder {
    /// Create an encoder drawing buffers from the process-wide pool.
    pub fn new(config: EncoderConfig) -> Self {
        Self::with_pool(config, SyncPool::shared())
    }

    /// Create an encoder drawing buffers from `pool`.
    pub fn with_pool(config: EncoderConfig, pool: Arc<dyn BufferPool>) -> Self {
        Self {
            config: Arc::new(config),
            buf: PooledBuffer::acquire(pool),
        }
    }

    /// The shared configuration.
    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    /// Bytes accumulated so far by this instance.
    pub fn as_bytes(&self) -> &[u8] {
        self.buf.as_bytes()
    }

    /// Give up the encoder, keeping its working buffer.
    pub fn into_buffer(self) -> PooledBuffer {
        self.buf
    }

    /// Encode one entry as a complete line.
    ///
    /// The line is built in a fresh clone of this encoder, so `self` is left
    /// untouched and concurrent calls never share a buffer. The caller owns
    /// the returned buffer; dropping it releases it to the pool.
    pub fn encode_entry(&self, entry: &Entry, fields: &[Field]) -> PooledBuffer {
        let mut line = self.clone();

        line.buf.append_byte(b'[');
        self.config.format_level(entry.level, &mut line.buf);
        line.buf.append_byte(b']');

        line.buf.append_byte(b'[');
        self.config.format_time(&entry.time, &mut line.buf);
        line.buf.append_byte(b']');

        line.buf.append_byte(b'[');
        if let Some(caller) = &entry.caller
            && !self.config.caller_key.is_empty()
        {
            self.config.format_caller(caller, &mut line.buf);
        }
        line.buf.append_byte(b']');

        // Downstream line splitting depends on this space.
        line.buf.append_byte(b' ');

        line.append_str(DEFAULT_TAG);
        for field in fields {
            line.add_field(field);
        }
        line.buf.append_byte(b'\n');
        line.into_buffer()
    }

    /// Accepted for interface compatibility; namespaces have no effect on
    /// the output.
    pub fn open_namespace(&mut self, _name: &str) {}

    /// Write `||key=`.
    fn add_key(&mut self, key: &str) {
        self.buf.append_str(ELEMENT_SEPARATOR);
        self.buf.append_str(key);
        self.buf.append_byte(b'=');
    }

    /// Add a keyed field of any type.
    pub fn add_field(&mut self, field: &Field) {
        self.add_value(&field.key, &field.value);
    }

    /// Add a keyed value of any type.
    pub fn add_value(&mut self, key: &str, value: &Value) {
        self.add_key(key);
        self.append_value(value);
    }

    /// Add a keyed boolean.
    pub fn add_bool(&mut self, key: &str, v: bool) {
        self.add_key(key);
        self.append_bool(v);
    }

    /// Add a keyed signed integer of any width.
    pub fn add_int(&mut self, key: &str, v: impl Into<i64>) {
        self.add_key(key);
        self.append_int(v);
    }

    /// Add a keyed unsigned integer of any width.
    pub fn add_uint(&mut self, key: &str, v: impl Into<u64>) {
        self.add_key(key);
        self.append_uint(v);
    }

    /// Add a keyed pointer-sized signed integer as a signed integer.
    pub fn add_isize(&mut self, key: &str, v: isize) {
        self.add_key(key);
        self.append_isize(v);
    }

    /// Add a keyed pointer-sized unsigned integer as an unsigned integer.
    pub fn add_usize(&mut self, key: &str, v: usize) {
        self.add_key(key);
        self.append_usize(v);
    }

    /// Add a keyed pointer-sized unsigned integer.
    pub fn add_uintptr(&mut self, key: &str, v: usize) {
        self.add_key(key);
        self.append_uintptr(v);
    }

    /// Add a keyed float; 32-bit values are widened.
    pub fn add_float(&mut self, key: &str, v: impl Into<f64>) {
        self.add_key(key);
        self.append_float(v);
    }

    /// Add a keyed complex number; 64-bit complex values are widened.
    pub fn add_complex(&mut self, key: &str, v: impl Into<Complex128>) {
        self.add_key(key);
        self.append_complex(v);
    }

    /// Add a keyed string, unescaped.
    pub fn add_string(&mut self, key: &str, v: &str) {
        self.add_key(key);
        self.append_str(v);
    }

    /// Add a keyed byte string, unescaped.
    pub fn add_byte_string(&mut self, key: &str, v: &[u8]) {
        self.add_key(key);
        self.append_byte_string(v);
    }

    /// Add keyed binary data as base64.
    pub fn add_binary(&mut self, key: &str, v: &[u8]) {
        self.add_key(key);
        self.append_binary(v);
    }

    /// Add a keyed duration via the configured duration formatter.
    pub fn add_duration(&mut self, key: &str, v: Duration) {
        self.add_key(key);
        self.append_duration(v);
    }

    /// Add a keyed timestamp via the configured time formatter.
    pub fn add_time(&mut self, key: &str, v: &DateTime<Utc>) {
        self.add_key(key);
        self.append_time(v);
    }

    /// Add a keyed nested object.
    pub fn add_object(&mut self, key: &str, fields: &[Field]) {
        self.add_key(key);
        self.append_object(fields);
    }

    /// Add a keyed nested array.
    pub fn add_array(&mut self, key: &str, values: &[Value]) {
        self.add_key(key);
        self.append_array(values);
    }

    /// Add a keyed value with no dedicated encoding.
    pub fn add_reflected(&mut self, key: &str, v: &dyn Debug) {
        self.add_key(key);
        self.append_reflected(v);
    }

    /// Append an unkeyed value of any type.
    pub fn append_value(&mut self, value: &Value) {
        match value {
            Value::Bool(v) => self.append_bool(*v),
            Value::Int(v) => self.append_int(*v),
            Value::Uint(v) => self.append_uint(*v),
            Value::Uintptr(v) => self.append_uintptr(*v),
            Value::Float(v) => self.append_float(*v),
            Value::Complex(v) => self.append_complex(*v),
            Value::String(v) => self.append_str(v),
            Value::ByteString(v) => self.append_byte_string(v),
            Value::Binary(v) => self.append_binary(v),
            Value::Duration(v) => self.append_duration(*v),
            Value::Time(v) => self.append_time(v),
            Value::Object(v) => self.append_object(v),
            Value::Array(v) => self.append_array(v),
            Value::Reflected(v) => self.append_reflected(&**v),
        }
    }

    /// Append `true` or `false`.
    pub fn append_bool(&mut self, v: bool) {
        self.buf.append_bool(v);
    }

    /// Append a signed integer of any width.
    pub fn append_int(&mut self, v: impl Into<i64>) {
        self.buf.append_int(v.into());
    }

    /// Append an unsigned integer of any width.
    pub fn append_uint(&mut self, v: impl Into<u64>) {
        self.buf.append_uint(v.into());
    }

    /// Append a pointer-sized signed integer, widened to 64 bits.
    pub fn append_isize(&mut self, v: isize) {
        self.buf.append_int(v as i64);
    }

    /// Append a pointer-sized unsigned integer, widened to 64 bits.
    pub fn append_usize(&mut self, v: usize) {
        self.buf.append_uint(v as u64);
    }

    /// Append a pointer-sized unsigned integer.
    pub fn append_uintptr(&mut self, v: usize) {
        self.buf.append_uint(v as u64);
    }

    /// Append a float; 32-bit values are widened.
    pub fn append_float(&mut self, v: impl Into<f64>) {
        self.buf.append_float(v.into());
    }

    /// Append `<re>+<im>i`.
    pub fn append_complex(&mut self, v: impl Into<Complex128>) {
        let c = v.into();
        self.buf.append_float(c.re);
        self.buf.append_byte(b'+');
        self.buf.append_float(c.im);
        self.buf.append_byte(b'i');
    }

    /// Append a string verbatim.
    pub fn append_str(&mut self, v: &str) {
        self.buf.append_str(v);
    }

    /// Append a byte string verbatim.
    pub fn append_byte_string(&mut self, v: &[u8]) {
        self.buf.append_bytes(v);
    }

    /// Append binary data as padded standard base64.
    pub fn append_binary(&mut self, v: &[u8]) {
        self.buf.append_str(&STANDARD.encode(v));
    }

    /// Append a duration via the configured duration formatter.
    pub fn append_duration(&mut self, v: Duration) {
        self.config.format_duration(v, &mut self.buf);
    }

    /// Append a timestamp via the configured time formatter.
    pub fn append_time(&mut self, v: &DateTime<Utc>) {
        self.config.format_time(v, &mut self.buf);
    }

    /// Append `{` + each field through the keyed path + `}`.
    pub fn append_object(&mut self, fields: &[Field]) {
        self.buf.append_byte(b'{');
        for field in fields {
            self.add_field(field);
        }
        self.buf.append_byte(b'}');
    }

    /// Append `[` + each value with no separators + `]`.
    pub fn append_array(&mut self, values: &[Value]) {
        self.buf.append_byte(b'[');
        for value in values {
            self.append_value(value);
        }
        self.buf.append_byte(b']');
    }

    /// Append a generic rendering of `v`. The exact format is not stable.
    pub fn append_reflected(&mut self, v: &dyn Debug) {
        self.buf.append_debug(v);
    }
}

impl Clone for KvEncoder {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            buf: PooledBuffer::acquire(Arc::clone(self.buf.pool())),
        }
    }
}

impl Debug for KvEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KvEncoder")
            .field("config", &self.config)
            .field("buf", &self.buf)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::{Caller, Complex64, EncoderSettings, Level, TimeFormat};

    fn encoder() -> KvEncoder {
        KvEncoder::with_pool(
            EncoderSettings::default().build(),
            Arc::new(SyncPool::new()),
        )
    }

    fn value(v: impl Into<Value>) -> String {
        let mut enc = encoder();
        enc.append_value(&v.into());
        String::from_utf8(enc.as_bytes().to_vec()).expect("utf8")
    }

    fn field(f: &Field) -> String {
        let mut enc = encoder();
        enc.add_field(f);
        String::from_utf8(enc.as_bytes().to_vec()).expect("utf8")
    }

    #[test]
    fn scalars() {
        assert_eq!(value(true), "true");
        assert_eq!(value(false), "false");
        assert_eq!(value(-7), "-7");
        assert_eq!(value(i8::MIN), "-128");
        assert_eq!(value(u32::MAX), "4294967295");
        assert_eq!(value(u64::MAX), "18446744073709551615");
        assert_eq!(value(Value::Uintptr(0xff)), "255");
        assert_eq!(value(3.25), "3.25");
        assert_eq!(value(0.1f32), "0.10000000149011612");
    }

    #[test]
    fn complex_numbers() {
        assert_eq!(value(Complex128::new(1.0, 2.5)), "1+2.5i");
        assert_eq!(value(Complex128::new(1.0, -2.0)), "1+-2i");
        assert_eq!(value(Complex64::new(0.5, 0.25)), "0.5+0.25i");
    }

    #[test]
    fn strings_are_not_escaped() {
        assert_eq!(value("a||b=c\n"), "a||b=c\n");
        assert_eq!(
            field(&Field::byte_string("raw", b"x]y".to_vec())),
            "||raw=x]y"
        );
    }

    #[test]
    fn binary_is_base64() {
        assert_eq!(field(&Field::binary("bin", b"hello".to_vec())), "||bin=aGVsbG8=");
        assert_eq!(field(&Field::binary("bin", Vec::new())), "||bin=");
    }

    #[test]
    fn durations_and_times_use_configured_formatters() {
        assert_eq!(value(Duration::from_secs(2)), "2");
        let cfg = EncoderSettings {
            time_format: TimeFormat::Rfc3339,
            ..EncoderSettings::default()
        }
        .build();
        let mut enc = KvEncoder::with_pool(cfg, Arc::new(SyncPool::new()));
        let t = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .expect("valid date");
        enc.add_time("at", &t);
        assert_eq!(enc.as_bytes(), b"||at=2024-01-01T00:00:00Z");
    }

    #[test]
    fn nested_object_keeps_leading_separator() {
        let f = Field::object("obj", [Field::int("a", 1), Field::int("b", 2)]);
        assert_eq!(field(&f), "||obj={||a=1||b=2}");
    }

    #[test]
    fn nested_array_has_no_separators() {
        assert_eq!(field(&Field::array("arr", [1, 2, 3])), "||arr=[123]");
        let mixed = Field::array(
            "mixed",
            [
                Value::from("x"),
                Value::Array(vec![Value::from(true)]),
                Value::Object(vec![Field::int("k", 9)]),
            ],
        );
        assert_eq!(field(&mixed), "||mixed=[x[true]{||k=9}]");
    }

    #[test]
    fn reflected_uses_debug() {
        #[derive(Debug)]
        #[allow(dead_code, reason = "fields are read through Debug")]
        struct User {
            name: &'static str,
            age: u8,
        }
        assert_eq!(
            field(&Field::reflect("ref", User { name: "deen", age: 26 })),
            "||ref=User { name: \"deen\", age: 26 }"
        );
    }

    #[test]
    fn namespaces_are_ignored() {
        let mut enc = encoder();
        enc.open_namespace("ns");
        enc.add_int("a", 1);
        assert_eq!(enc.as_bytes(), b"||a=1");
    }

    #[test]
    fn keyed_adders_match_field_path() {
        let mut enc = encoder();
        enc.add_bool("b", true);
        enc.add_uint("u", 5u8);
        enc.add_float("f", 1.5f32);
        enc.add_string("s", "x");
        enc.add_uintptr("p", 16);
        enc.add_complex("c", Complex128::new(1.0, 1.0));
        enc.add_duration("d", Duration::from_millis(250));
        enc.add_reflected("r", &Some(1));
        assert_eq!(
            enc.as_bytes(),
            b"||b=true||u=5||f=1.5||s=x||p=16||c=1+1i||d=0.25||r=Some(1)"
        );
    }

    #[test]
    fn pointer_sized_adders_match_value_conversion() {
        let mut enc = encoder();
        enc.add_isize("i", -3);
        enc.add_usize("u", usize::MAX);
        let mut via_value = encoder();
        via_value.add_value("i", &Value::from(-3isize));
        via_value.add_value("u", &Value::from(usize::MAX));
        assert_eq!(enc.as_bytes(), via_value.as_bytes());
        assert!(enc.as_bytes().starts_with(b"||i=-3||u="));
    }

    #[test]
    fn clone_gets_fresh_buffer() {
        let mut enc = encoder();
        enc.add_int("a", 1);
        let clone = enc.clone();
        assert!(clone.as_bytes().is_empty());
        assert_eq!(enc.as_bytes(), b"||a=1");
    }

    #[test]
    fn encode_entry_leaves_encoder_untouched() {
        let enc = encoder();
        let entry = Entry::now(Level::Info).with_caller(Caller::new("a/b.rs", 1));
        let line = enc.encode_entry(&entry, &[Field::int("n", 1)]);
        assert!(line.as_bytes().ends_with(b" _undef||n=1\n"));
        assert!(enc.as_bytes().is_empty());
    }
}
