//! PHP serialize writer.
//!
//! [`Writer`] appends the canonical PHP encoding of a [`PhpValue`] to a byte
//! buffer. Strings are written with their UTF-8 byte length, lists with
//! indices `0..n-1`, and object members that are not public are re-mangled
//! the way PHP expects.

use std::io::Write as _;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::bind::PhpType;
use crate::error::Result;
use crate::types::{ArrayKey, PhpProperty, PhpValue, Visibility};

/// Encoder options.
#[derive(Debug, Clone, Default)]
pub struct EncodeConfig {
    /// Emit record members declared private or protected.
    pub include_private: bool,
    /// Emit record members declared static.
    pub include_static: bool,
    /// Write empty strings as `N;`.
    pub empty_string_as_null: bool,
    /// Leave record members that encode to null out of the object entirely.
    pub skip_null_members: bool,
}

/// A byte-buffer writer for PHP serialized data.
#[derive(Debug, Default)]
pub struct Writer {
    buf: Vec<u8>,
    config: EncodeConfig,
}

impl Writer {
    /// Create a writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a writer with custom options.
    pub fn with_config(config: EncodeConfig) -> Self {
        Self {
            buf: Vec::new(),
            config,
        }
    }

    /// Bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer and return its buffer.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    /// Append the encoding of `value`.
    pub fn write_value(&mut self, value: &PhpValue<'_>) {
        match value {
            PhpValue::Null => self.buf.extend_from_slice(b"N;"),
            PhpValue::Bool(b) => self.buf.extend_from_slice(if *b { b"b:1;" } else { b"b:0;" }),
            PhpValue::Int(i) => self.write_int(*i),
            PhpValue::Float(f) => self.write_float(*f),
            PhpValue::String(s) => {
                if s.is_empty() && self.config.empty_string_as_null {
                    self.buf.extend_from_slice(b"N;");
                } else {
                    self.write_string(s);
                }
            }
            PhpValue::List(items) => {
                self.write_header(b'a', items.len());
                for (index, item) in items.iter().enumerate() {
                    self.write_int(index as i64);
                    self.write_value(item);
                }
                self.buf.push(b'}');
            }
            PhpValue::Map(entries) => {
                self.write_header(b'a', entries.len());
                for (key, item) in entries {
                    self.write_key(key);
                    self.write_value(item);
                }
                self.buf.push(b'}');
            }
            PhpValue::Object {
                class_name,
                properties,
            } => self.write_object(class_name, properties),
        }
    }

    fn write_int(&mut self, value: i64) {
        // Writing into a Vec cannot fail
        let _ = write!(self.buf, "i:{};", value);
    }

    fn write_float(&mut self, value: f64) {
        self.buf.extend_from_slice(b"d:");
        if value.is_nan() {
            self.buf.extend_from_slice(b"NAN");
        } else if value.is_infinite() {
            self.buf
                .extend_from_slice(if value > 0.0 { b"INF".as_slice() } else { b"-INF" });
        } else {
            let _ = write!(self.buf, "{}", value);
        }
        self.buf.push(b';');
    }

    fn write_string(&mut self, bytes: &[u8]) {
        let _ = write!(self.buf, "s:{}:\"", bytes.len());
        self.buf.extend_from_slice(bytes);
        self.buf.extend_from_slice(b"\";");
    }

    fn write_key(&mut self, key: &ArrayKey<'_>) {
        match key {
            ArrayKey::Int(i) => self.write_int(*i),
            ArrayKey::String(s) => self.write_string(s),
        }
    }

    fn write_header(&mut self, tag: u8, count: usize) {
        let _ = write!(self.buf, "{}:{}:{{", tag as char, count);
    }

    fn write_object(&mut self, class_name: &str, properties: &[PhpProperty<'_>]) {
        let _ = write!(
            self.buf,
            "O:{}:\"{}\":{}:{{",
            class_name.len(),
            class_name,
            properties.len()
        );

        let mut mangled = Vec::new();
        for property in properties {
            mangled.clear();
            match property.visibility {
                Visibility::Public => {}
                Visibility::Protected => mangled.extend_from_slice(b"\0*\0"),
                Visibility::Private => {
                    let owner = property.declaring_class.as_deref().unwrap_or(class_name);
                    mangled.push(0);
                    mangled.extend_from_slice(owner.as_bytes());
                    mangled.push(0);
                }
            }
            mangled.extend_from_slice(property.name.as_bytes());
            self.write_string(&mangled);
            self.write_value(&property.value);
        }

        self.buf.push(b'}');
    }
}

/// Serialize a host value with default options.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::to_bytes;
///
/// assert_eq!(to_bytes(&vec![1, 2]).unwrap(), b"a:2:{i:0;i:1;i:1;i:2;}");
/// assert_eq!(to_bytes(&"héllo".to_string()).unwrap(), "s:6:\"héllo\";".as_bytes());
/// ```
pub fn to_bytes<T: PhpType>(value: &T) -> Result<Vec<u8>> {
    to_bytes_with_config(value, &EncodeConfig::default())
}

/// Serialize a host value with custom options.
pub fn to_bytes_with_config<T: PhpType>(value: &T, config: &EncodeConfig) -> Result<Vec<u8>> {
    #[cfg(feature = "tracing")]
    trace!(?config, "to_bytes called");

    let php = value.to_php(config)?;
    let mut writer = Writer::with_config(config.clone());
    writer.write_value(&php);

    #[cfg(feature = "tracing")]
    debug!(bytes = writer.as_bytes().len(), value_type = php.type_name(), "Encode completed");

    Ok(writer.into_bytes())
}

/// Serialize an already-built [`PhpValue`].
pub fn value_to_bytes(value: &PhpValue<'_>) -> Vec<u8> {
    let mut writer = Writer::new();
    writer.write_value(value);
    writer.into_bytes()
}
