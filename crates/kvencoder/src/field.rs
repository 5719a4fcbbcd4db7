//! Typed key/value fields attached to a log entry.

use std::{
    fmt::Debug,
    sync::Arc,
    time::Duration,
};

use chrono::{DateTime, Utc};

/// Complex number with 64-bit parts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex128 {
    /// Real part.
    pub re: f64,
    /// Imaginary part.
    pub im: f64,
}

impl Complex128 {
    /// Construct from real and imaginary parts.
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
}

/// Complex number with 32-bit parts; widened to [`Complex128`] when encoded.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Complex64 {
    /// Real part.
    pub re: f32,
    /// Imaginary part.
    pub im: f32,
}

impl Complex64 {
    /// Construct from real and imaginary parts.
    pub const fn new(re: f32, im: f32) -> Self {
        Self { re, im }
    }
}

impl From<Complex64> for Complex128 {
    fn from(c: Complex64) -> Self {
        Self::new(f64::from(c.re), f64::from(c.im))
    }
}

/// A value of any encodable type.
///
/// Integer and float widths are not distinguished: narrower values widen into
/// `Int`, `Uint` and `Float` through the `From` impls.
#[derive(Debug, Clone)]
pub enum Value {
    /// `true` or `false`.
    Bool(bool),
    /// Any signed integer.
    Int(i64),
    /// Any unsigned integer.
    Uint(u64),
    /// Pointer-sized unsigned integer.
    Uintptr(usize),
    /// 32- or 64-bit float.
    Float(f64),
    /// Complex number.
    Complex(Complex128),
    /// UTF-8 text, written verbatim.
    String(String),
    /// Raw bytes, written verbatim.
    ByteString(Vec<u8>),
    /// Opaque bytes, written as base64.
    Binary(Vec<u8>),
    /// Rendered by the configured duration formatter.
    Duration(Duration),
    /// Rendered by the configured time formatter.
    Time(DateTime<Utc>),
    /// Nested set of keyed fields.
    Object(Vec<Field>),
    /// Ordered sequence of unkeyed values.
    Array(Vec<Value>),
    /// Anything else; rendered through `Debug`.
    Reflected(Arc<dyn Debug + Send + Sync>),
}

/// Implement `From<$t> for Value` by widening into the given variant.
macro_rules! widen_into {
    ($variant:ident, $wide:ty: $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Self::$variant(<$wide>::from(v))
                }
            }
        )+
    };
}

widen_into!(Int, i64: i8, i16, i32, i64);
widen_into!(Uint, u64: u8, u16, u32, u64);
widen_into!(Float, f64: f32, f64);
widen_into!(Complex, Complex128: Complex64, Complex128);

impl From<isize> for Value {
    fn from(v: isize) -> Self {
        Self::Int(v as i64)
    }
}

impl From<usize> for Value {
    fn from(v: usize) -> Self {
        Self::Uint(v as u64)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<Duration> for Value {
    fn from(v: Duration) -> Self {
        Self::Duration(v)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(v: DateTime<Utc>) -> Self {
        Self::Time(v)
    }
}

impl From<Vec<Field>> for Value {
    fn from(v: Vec<Field>) -> Self {
        Self::Object(v)
    }
}

/// One keyed datum attached to a log entry.
#[derive(Debug, Clone)]
pub struct Field {
    /// Field name.
    pub key: String,
    /// Field value.
    pub value: Value,
}

impl Field {
    /// Construct a field from anything convertible into a [`Value`].
    pub fn new(key: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Boolean field.
    pub fn bool(key: impl Into<String>, v: bool) -> Self {
        Self::new(key, Value::Bool(v))
    }

    /// Signed integer field of any width.
    pub fn int(key: impl Into<String>, v: impl Into<i64>) -> Self {
        Self::new(key, Value::Int(v.into()))
    }

    /// Unsigned integer field of any width.
    pub fn uint(key: impl Into<String>, v: impl Into<u64>) -> Self {
        Self::new(key, Value::Uint(v.into()))
    }

    /// Pointer-sized unsigned integer field.
    pub fn uintptr(key: impl Into<String>, v: usize) -> Self {
        Self::new(key, Value::Uintptr(v))
    }

    /// Float field; 32-bit values are widened.
    pub fn float(key: impl Into<String>, v: impl Into<f64>) -> Self {
        Self::new(key, Value::Float(v.into()))
    }

    /// Complex number field; 64-bit complex values are widened.
    pub fn complex(key: impl Into<String>, v: impl Into<Complex128>) -> Self {
        Self::new(key, Value::Complex(v.into()))
    }

    /// String field.
    pub fn string(key: impl Into<String>, v: impl Into<String>) -> Self {
        Self::new(key, Value::String(v.into()))
    }

    /// Byte-string field, written verbatim.
    pub fn byte_string(key: impl Into<String>, v: impl Into<Vec<u8>>) -> Self {
        Self::new(key, Value::ByteString(v.into()))
    }

    /// Binary field, written as base64.
    pub fn binary(key: impl Into<String>, v: impl Into<Vec<u8>>) -> Self {
        Self::new(key, Value::Binary(v.into()))
    }

    /// Duration field.
    pub fn duration(key: impl Into<String>, v: Duration) -> Self {
        Self::new(key, Value::Duration(v))
    }

    /// Timestamp field.
    pub fn time(key: impl Into<String>, v: DateTime<Utc>) -> Self {
        Self::new(key, Value::Time(v))
    }

    /// Nested object field.
    pub fn object(key: impl Into<String>, fields: impl IntoIterator<Item = Self>) -> Self {
        Self::new(key, Value::Object(fields.into_iter().collect()))
    }

    /// Nested array field.
    pub fn array<V: Into<Value>>(
        key: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        Self::new(
            key,
            Value::Array(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Field holding any `Debug` value with no dedicated encoding.
    pub fn reflect(key: impl Into<String>, v: impl Debug + Send + Sync + 'static) -> Self {
        Self::new(key, Value::Reflected(Arc::new(v)))
    }
}
