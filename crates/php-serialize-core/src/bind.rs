//! Typed binding between PHP values and host types.
//!
//! Binding happens in two steps. [`Parser::parse_as`] reads the stream under
//! a [`TypeDescriptor`], rejecting tokens that disagree with the target while
//! the byte offset is still known. [`PhpType::from_php`] then converts the
//! checked value into the host type. Encoding runs [`PhpType::to_php`] and
//! hands the result to the [`Writer`](crate::Writer).
//!
//! # Example
//!
//! ```rust
//! use std::collections::BTreeMap;
//! use php_serialize_core::{from_bytes_as, to_bytes};
//!
//! let data = br#"a:2:{s:5:"apple";i:3;s:4:"pear";i:5;}"#;
//! let stock: BTreeMap<String, u32> = from_bytes_as(data).unwrap();
//! assert_eq!(stock["pear"], 5);
//!
//! assert_eq!(to_bytes(&stock).unwrap(), data);
//! ```

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

use bstr::BString;
use indexmap::IndexMap;

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

use crate::descriptor::{PrimitiveKind, TypeDescriptor};
use crate::error::{ErrorKind, PhpSerializeError, Result};
use crate::parser::{Parser, ParserConfig};
use crate::types::{ArrayKey, PhpProperty, PhpValue};
use crate::writer::EncodeConfig;

/// A host type that can be read from and written to PHP serialized data.
///
/// Implemented for the std scalar, text and collection types. Records,
/// enumerations and string-parsed types get an implementation from
/// [`php_record!`](crate::php_record), [`php_enum!`](crate::php_enum) and
/// [`php_string_like!`](crate::php_string_like).
pub trait PhpType: Sized {
    /// The wire shape of this type.
    fn descriptor() -> TypeDescriptor;

    /// Convert a decoded value.
    fn from_php(value: PhpValue<'_>) -> Result<Self>;

    /// Convert to a value ready for the writer.
    fn to_php(&self, config: &EncodeConfig) -> Result<PhpValue<'_>>;

    /// Convert to an array key, for use as a map key.
    fn to_php_key(&self) -> Result<ArrayKey<'_>> {
        match self.to_php(&EncodeConfig::default())? {
            PhpValue::Int(i) => Ok(ArrayKey::Int(i)),
            PhpValue::Bool(b) => Ok(ArrayKey::Int(i64::from(b))),
            PhpValue::String(s) => Ok(ArrayKey::String(s)),
            other => Err(PhpSerializeError::unsupported(format!(
                "{} as an array key",
                other.type_name()
            ))),
        }
    }
}

impl<'a> Parser<'a> {
    /// Parse the next value under `ty`.
    ///
    /// The result is a [`PhpValue`] whose shape already matches `ty`: typed
    /// sequences come back as lists in index order, typed map keys are
    /// normalized to the key type, and record properties with no matching
    /// member are dropped.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, ty), level = "trace", fields(pos = self.position(), target = %ty.describe())))]
    pub fn parse_as(&mut self, ty: &TypeDescriptor) -> Result<PhpValue<'a>> {
        self.check_depth()?;

        let tag = self.peek_byte()?;
        let pos = self.position();
        if token_name(tag).is_none() {
            return Err(self.unexpected_token(tag));
        }
        if tag == b'N' && !ty.accepts_null() {
            return Err(self.mismatch(ty, tag, pos));
        }

        match ty {
            TypeDescriptor::Dynamic => self.parse_value(),
            TypeDescriptor::Nullable(inner) => {
                if tag == b'N' {
                    self.parse_null()
                } else {
                    self.parse_as(inner)
                }
            }
            TypeDescriptor::Primitive(kind) => self.parse_primitive(*kind, tag, pos),
            TypeDescriptor::Enum { .. } | TypeDescriptor::StringLike { .. } => {
                if tag != b's' {
                    return Err(self.mismatch(ty, tag, pos));
                }
                let text = self.read_text()?;
                check_text(ty, &text).map_err(|e| self.locate(e, pos))?;
                Ok(PhpValue::String(text_bytes(text)))
            }
            TypeDescriptor::Sequence(item) => {
                if tag != b'a' {
                    return Err(self.mismatch(ty, tag, pos));
                }
                self.parse_sequence(item)
            }
            TypeDescriptor::Map { key, value } => {
                if !key.is_key() {
                    return Err(self.error_at(
                        ErrorKind::UnsupportedType(format!("{} as an array key", key.describe())),
                        pos,
                    ));
                }
                if tag != b'a' {
                    return Err(self.mismatch(ty, tag, pos));
                }
                self.parse_typed_map(key, value)
            }
            TypeDescriptor::Record(record) => {
                if tag != b'O' {
                    return Err(self.mismatch(ty, tag, pos));
                }
                self.parse_record(record)
            }
        }
    }

    /// Parse the next value and convert it to `T`.
    pub fn read<T: PhpType>(&mut self) -> Result<T> {
        let start = self.position();

        #[cfg(feature = "tracing")]
        trace!(target_type = std::any::type_name::<T>(), pos = start, "Typed read");

        let value = self.parse_as(&T::descriptor())?;
        T::from_php(value).map_err(|e| self.locate(e, start))
    }

    fn parse_primitive(&mut self, kind: PrimitiveKind, tag: u8, pos: usize) -> Result<PhpValue<'a>> {
        match (kind, tag) {
            (PrimitiveKind::Bool, b'b') => self.read_bool().map(PhpValue::Bool),
            (PrimitiveKind::Str | PrimitiveKind::Bytes, b'N') => {
                self.parse_null()?;
                Ok(PhpValue::String(Cow::Borrowed(&b""[..])))
            }
            (PrimitiveKind::Bytes, b's') => self.read_string().map(PhpValue::String),
            (PrimitiveKind::Str | PrimitiveKind::Char, b's') => {
                let text = self.read_text()?;
                check_text(&TypeDescriptor::Primitive(kind), &text).map_err(|e| self.locate(e, pos))?;
                Ok(PhpValue::String(text_bytes(text)))
            }
            (kind, b'i') if kind.is_integer() || kind.is_float() => {
                let value = self.read_int()?;
                if kind.is_integer() {
                    kind.check_int(value).map_err(|e| self.locate(e, pos))?;
                }
                Ok(PhpValue::Int(value))
            }
            (kind, b'd') if kind.is_integer() || kind.is_float() => {
                let value = self.read_float()?;
                kind.check_float(value).map_err(|e| self.locate(e, pos))?;
                Ok(PhpValue::Float(value))
            }
            _ => Err(self.mismatch(&TypeDescriptor::Primitive(kind), tag, pos)),
        }
    }

    /// Strict list parsing: keys must be a permutation of `0..n-1`.
    fn parse_sequence(&mut self, item: &TypeDescriptor) -> Result<PhpValue<'a>> {
        let count = self.read_array_header()?;
        self.enter();

        let mut entries = Vec::with_capacity(count.min(1024));
        for found in 0..count {
            self.check_entry("array", count, found)?;
            let key_pos = self.position();
            let index = match self.read_array_key()? {
                ArrayKey::Int(i) if i >= 0 && (i as u64) < count as u64 => i as usize,
                key => {
                    return Err(self.error_at(
                        ErrorKind::MalformedArray(format!(
                            "key {} is not an index of a {}-entry sequence",
                            key, count
                        )),
                        key_pos,
                    ))
                }
            };
            let value = self.parse_as(item)?;
            entries.push((index, key_pos, value));
        }

        self.leave();
        self.expect_close("array", count)?;

        if entries.windows(2).any(|w| w[0].0 >= w[1].0) {
            entries.sort_by_key(|(index, _, _)| *index);
            if let Some(w) = entries.windows(2).find(|w| w[0].0 == w[1].0) {
                return Err(self.error_at(
                    ErrorKind::MalformedArray(format!("duplicate index {}", w[1].0)),
                    w[1].1,
                ));
            }
        }

        Ok(PhpValue::List(entries.into_iter().map(|(_, _, v)| v).collect()))
    }

    fn parse_typed_map(&mut self, key_ty: &TypeDescriptor, value_ty: &TypeDescriptor) -> Result<PhpValue<'a>> {
        let count = self.read_array_header()?;
        self.enter();

        let mut entries = Vec::with_capacity(count.min(1024));
        for found in 0..count {
            self.check_entry("array", count, found)?;
            let key_pos = self.position();
            let key = self.read_array_key()?;
            let key = coerce_key(key, key_ty).map_err(|e| self.locate(e, key_pos))?;
            let value = self.parse_as(value_ty)?;
            entries.push((key, value));
        }

        self.leave();
        self.expect_close("array", count)?;
        Ok(PhpValue::Map(entries))
    }

    fn parse_record(&mut self, record: &crate::descriptor::RecordDescriptor) -> Result<PhpValue<'a>> {
        let (class_name, count) = self.read_object_header()?;
        self.enter();

        let mut properties = Vec::with_capacity(count.min(1024));
        for found in 0..count {
            self.check_entry("object", count, found)?;
            let (name, visibility, declaring_class) = self.read_property_name()?;
            match record.find(&name) {
                Some(member) => {
                    let value = self.parse_as(&member.descriptor())?;
                    properties.push(PhpProperty {
                        name,
                        visibility,
                        declaring_class,
                        value,
                    });
                }
                None => {
                    #[cfg(feature = "tracing")]
                    debug!(record = record.name, field = %name, "Discarding unknown field");
                    self.parse_value()?;
                }
            }
        }

        self.leave();
        self.expect_close("object", count)?;
        Ok(PhpValue::Object {
            class_name,
            properties,
        })
    }

    #[cold]
    fn mismatch(&self, ty: &TypeDescriptor, tag: u8, pos: usize) -> PhpSerializeError {
        self.error_at(
            ErrorKind::TypeMismatch {
                expected: ty.describe(),
                found: token_name(tag).unwrap_or("unknown"),
            },
            pos,
        )
    }
}

fn token_name(tag: u8) -> Option<&'static str> {
    Some(match tag {
        b'N' => "null",
        b'b' => "boolean",
        b'i' => "integer",
        b'd' => "float",
        b's' => "string",
        b'a' => "array",
        b'O' => "object",
        _ => return None,
    })
}

fn text_bytes(text: Cow<'_, str>) -> Cow<'_, [u8]> {
    match text {
        Cow::Borrowed(s) => Cow::Borrowed(s.as_bytes()),
        Cow::Owned(s) => Cow::Owned(s.into_bytes()),
    }
}

/// Check text against char, enum and string-like descriptors.
fn check_text(ty: &TypeDescriptor, text: &str) -> Result<()> {
    match ty {
        TypeDescriptor::Primitive(PrimitiveKind::Char) if text.chars().count() != 1 => {
            Err(PhpSerializeError::conversion(format!("{:?}", text), "char"))
        }
        TypeDescriptor::Enum { name, variants } if !variants.iter().any(|v| *v == text) => {
            Err(PhpSerializeError::conversion(format!("{:?}", text), *name)
                .with_context(format!("expected one of: {}", variants.join(", "))))
        }
        TypeDescriptor::StringLike { name, parse } => parse(text).map_err(|reason| {
            PhpSerializeError::conversion(format!("{:?}", text), *name).with_context(reason)
        }),
        _ => Ok(()),
    }
}

/// Normalize an array key for a map whose keys are `ty`.
///
/// Integer key types accept string keys holding a decimal integer. Text key
/// types accept integer keys as their decimal text.
pub fn coerce_key<'a>(key: ArrayKey<'a>, ty: &TypeDescriptor) -> Result<ArrayKey<'a>> {
    match ty {
        TypeDescriptor::Primitive(kind) if kind.is_integer() => match key {
            ArrayKey::Int(i) => {
                kind.check_int(i)?;
                Ok(ArrayKey::Int(i))
            }
            ArrayKey::String(s) => {
                let wide = std::str::from_utf8(&s)
                    .ok()
                    .and_then(|t| t.parse::<i128>().ok())
                    .ok_or_else(|| {
                        PhpSerializeError::conversion(ArrayKey::String(s.clone()), kind.name())
                    })?;
                kind.check_wide(wide)?;
                // Only u64/usize keys above i64::MAX stay textual
                Ok(i64::try_from(wide).map_or(ArrayKey::String(s), ArrayKey::Int))
            }
        },
        // Remaining key types are carried as text
        ty if ty.is_key() => {
            let key = match key {
                ArrayKey::Int(i) => ArrayKey::String(Cow::Owned(i.to_string().into_bytes())),
                key => key,
            };
            if !matches!(ty, TypeDescriptor::Primitive(PrimitiveKind::Bytes)) {
                let text = key
                    .as_str()
                    .ok_or_else(|| PhpSerializeError::detached(ErrorKind::InvalidUtf8))?;
                check_text(ty, text)?;
            }
            Ok(key)
        }
        other => Err(PhpSerializeError::unsupported(format!(
            "{} as an array key",
            other.describe()
        ))),
    }
}

/// Borrow the text of a string value.
pub fn expect_text<'v>(value: &'v PhpValue<'_>, target: &str) -> Result<&'v str> {
    match value {
        PhpValue::String(bytes) => std::str::from_utf8(bytes)
            .map_err(|_| PhpSerializeError::detached(ErrorKind::InvalidUtf8)),
        other => Err(PhpSerializeError::type_mismatch(target, other.type_name())),
    }
}

/// Items of a sequence value.
///
/// Lists are taken as they are. Maps are accepted when their keys are a
/// permutation of `0..n-1`, and come back in index order.
pub fn sequence_items(value: PhpValue<'_>) -> Result<Vec<PhpValue<'_>>> {
    match value {
        PhpValue::List(items) => Ok(items),
        PhpValue::Map(entries) => {
            let len = entries.len();
            let mut slots: Vec<Option<PhpValue<'_>>> = (0..len).map(|_| None).collect();
            for (key, item) in entries {
                let slot = match key {
                    ArrayKey::Int(i) if i >= 0 && (i as u64) < len as u64 => &mut slots[i as usize],
                    key => {
                        return Err(PhpSerializeError::detached(ErrorKind::MalformedArray(
                            format!("key {} is not an index of a {}-entry sequence", key, len),
                        )))
                    }
                };
                if slot.replace(item).is_some() {
                    return Err(PhpSerializeError::detached(ErrorKind::MalformedArray(
                        "duplicate index".into(),
                    )));
                }
            }
            // Every slot is filled: len distinct keys in 0..len
            Ok(slots.into_iter().flatten().collect())
        }
        other => Err(PhpSerializeError::type_mismatch("sequence", other.type_name())),
    }
}

/// Convert the entries of a map value into `(K, V)` pairs.
///
/// Lists are accepted as maps keyed by index.
pub fn map_entries<K: PhpType, V: PhpType, C: FromIterator<(K, V)>>(value: PhpValue<'_>) -> Result<C> {
    let key_ty = K::descriptor();
    let entries = match value {
        PhpValue::Map(entries) => entries,
        PhpValue::List(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (ArrayKey::Int(i as i64), v))
            .collect(),
        other => return Err(PhpSerializeError::type_mismatch("map", other.type_name())),
    };

    entries
        .into_iter()
        .map(|(key, item)| -> Result<(K, V)> {
            let key = coerce_key(key, &key_ty)?;
            Ok((K::from_php(key.into_value())?, V::from_php(item)?))
        })
        .collect()
}

/// Fill a record from an object value.
///
/// `assign` is called with the host field name of every property that binds
/// to a member. Properties with no matching member are skipped.
pub fn bind_record<'a>(
    value: PhpValue<'a>,
    descriptor: &TypeDescriptor,
    mut assign: impl FnMut(&str, PhpValue<'a>) -> Result<()>,
) -> Result<()> {
    let TypeDescriptor::Record(record) = descriptor else {
        return Err(PhpSerializeError::unsupported(descriptor.describe()));
    };
    let properties = match value {
        PhpValue::Object { properties, .. } => properties,
        other => return Err(PhpSerializeError::type_mismatch(record.name, other.type_name())),
    };

    for property in properties {
        match record.find(&property.name) {
            Some(member) => assign(member.name, property.value).map_err(|e| {
                if e.context.is_some() {
                    e
                } else {
                    e.with_context(format!("field `{}::{}`", record.name, member.name))
                }
            })?,
            None => {
                #[cfg(feature = "tracing")]
                debug!(record = record.name, field = %property.name, "Discarding unknown field");
            }
        }
    }
    Ok(())
}

/// Append one record member to `properties` unless `config` excludes it.
pub fn push_member<'v, T: PhpType>(
    properties: &mut Vec<PhpProperty<'v>>,
    descriptor: &TypeDescriptor,
    field: &str,
    value: &'v T,
    config: &EncodeConfig,
) -> Result<()> {
    let member = match descriptor {
        TypeDescriptor::Record(record) => record.field(field),
        _ => None,
    };
    let Some(member) = member else {
        return Err(PhpSerializeError::unsupported(format!(
            "{} has no member `{}`",
            descriptor.describe(),
            field
        )));
    };
    if !member.is_encoded(config) {
        return Ok(());
    }

    let value = value.to_php(config)?;
    let encodes_null =
        value.is_null() || (config.empty_string_as_null && value.byte_len() == Some(0));
    if config.skip_null_members && encodes_null {
        return Ok(());
    }

    properties.push(PhpProperty {
        name: Cow::Borrowed(member.binding_name()),
        visibility: member.visibility,
        declaring_class: None,
        value,
    });
    Ok(())
}

/// Wrap encoded members into an object named after the record.
pub fn record_value<'v>(descriptor: &TypeDescriptor, properties: Vec<PhpProperty<'v>>) -> PhpValue<'v> {
    let class_name = match descriptor {
        TypeDescriptor::Record(record) => record.php_name(),
        _ => "stdClass",
    };
    PhpValue::Object {
        class_name: Cow::Borrowed(class_name),
        properties,
    }
}

/// Parse `data` and bind it to `T`.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::from_bytes_as;
///
/// let n: Option<i32> = from_bytes_as(b"N;").unwrap();
/// assert_eq!(n, None);
/// assert!(from_bytes_as::<i32>(b"N;").is_err());
/// ```
pub fn from_bytes_as<T: PhpType>(data: &[u8]) -> Result<T> {
    Parser::new(data).read()
}

/// Parse `data` with custom configuration and bind it to `T`.
pub fn from_bytes_as_with_config<T: PhpType>(data: &[u8], config: ParserConfig) -> Result<T> {
    Parser::with_config(data, config).read()
}

/// Parse an array of `T` without list/map disambiguation.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::from_bytes_seq;
///
/// // Keys may arrive in any order
/// let items: Vec<String> = from_bytes_seq(br#"a:2:{i:1;s:1:"b";i:0;s:1:"a";}"#).unwrap();
/// assert_eq!(items, ["a", "b"]);
/// ```
pub fn from_bytes_seq<T: PhpType>(data: &[u8]) -> Result<Vec<T>> {
    from_bytes_as(data)
}

/// Parse an array into an insertion-ordered map.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::from_bytes_map;
///
/// let map = from_bytes_map::<i64, String>(br#"a:2:{i:5;s:1:"x";s:1:"7";s:1:"y";}"#).unwrap();
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [5, 7]);
/// ```
pub fn from_bytes_map<K, V>(data: &[u8]) -> Result<IndexMap<K, V>>
where
    K: PhpType + Eq + Hash,
    V: PhpType,
{
    from_bytes_as(data)
}

impl PhpType for bool {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Primitive(PrimitiveKind::Bool)
    }

    fn from_php(value: PhpValue<'_>) -> Result<Self> {
        match value {
            PhpValue::Bool(b) => Ok(b),
            other => Err(PhpSerializeError::type_mismatch("bool", other.type_name())),
        }
    }

    fn to_php(&self, _config: &EncodeConfig) -> Result<PhpValue<'_>> {
        Ok(PhpValue::Bool(*self))
    }
}

macro_rules! impl_integer {
    ($($ty:ty => $kind:ident, $encode:expr;)*) => {$(
        impl PhpType for $ty {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::Primitive(PrimitiveKind::$kind)
            }

            fn from_php(value: PhpValue<'_>) -> Result<Self> {
                let kind = PrimitiveKind::$kind;
                match value {
                    PhpValue::Int(i) => {
                        <$ty>::try_from(i).map_err(|_| PhpSerializeError::conversion(i, kind.name()))
                    }
                    PhpValue::Float(f) => {
                        kind.check_float(f)?;
                        Ok(f as $ty)
                    }
                    // Textual map keys
                    PhpValue::String(ref s) => std::str::from_utf8(s)
                        .ok()
                        .and_then(|t| t.parse::<$ty>().ok())
                        .ok_or_else(|| PhpSerializeError::conversion(&value, kind.name())),
                    other => Err(PhpSerializeError::type_mismatch(kind.name(), other.type_name())),
                }
            }

            fn to_php(&self, _config: &EncodeConfig) -> Result<PhpValue<'_>> {
                let encode: fn($ty) -> PhpValue<'static> = $encode;
                Ok(encode(*self))
            }

            fn to_php_key(&self) -> Result<ArrayKey<'_>> {
                Ok(match i64::try_from(*self) {
                    Ok(i) => ArrayKey::Int(i),
                    Err(_) => ArrayKey::String(Cow::Owned(self.to_string().into_bytes())),
                })
            }
        }
    )*};
}

// Widths that may not fit a 32-bit PHP int are written as floats
impl_integer! {
    i8 => I8, |v| PhpValue::Int(i64::from(v));
    i16 => I16, |v| PhpValue::Int(i64::from(v));
    i32 => I32, |v| PhpValue::Int(i64::from(v));
    u8 => U8, |v| PhpValue::Int(i64::from(v));
    u16 => U16, |v| PhpValue::Int(i64::from(v));
    u32 => U32, |v| if v > i32::MAX as u32 {
        PhpValue::Float(f64::from(v))
    } else {
        PhpValue::Int(i64::from(v))
    };
    i64 => I64, |v| PhpValue::Float(v as f64);
    u64 => U64, |v| PhpValue::Float(v as f64);
    isize => Isize, |v| PhpValue::Float(v as f64);
    usize => Usize, |v| PhpValue::Float(v as f64);
}

impl PhpType for f64 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Primitive(PrimitiveKind::F64)
    }

    fn from_php(value: PhpValue<'_>) -> Result<Self> {
        match value {
            PhpValue::Float(f) => Ok(f),
            PhpValue::Int(i) => Ok(i as f64),
            other => Err(PhpSerializeError::type_mismatch("f64", other.type_name())),
        }
    }

    fn to_php(&self, _config: &EncodeConfig) -> Result<PhpValue<'_>> {
        Ok(PhpValue::Float(*self))
    }
}

impl PhpType for f32 {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Primitive(PrimitiveKind::F32)
    }

    fn from_php(value: PhpValue<'_>) -> Result<Self> {
        match value {
            PhpValue::Float(f) => {
                PrimitiveKind::F32.check_float(f)?;
                Ok(f as f32)
            }
            PhpValue::Int(i) => Ok(i as f32),
            other => Err(PhpSerializeError::type_mismatch("f32", other.type_name())),
        }
    }

    fn to_php(&self, _config: &EncodeConfig) -> Result<PhpValue<'_>> {
        Ok(PhpValue::Float(f64::from(*self)))
    }
}

impl PhpType for char {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Primitive(PrimitiveKind::Char)
    }

    fn from_php(value: PhpValue<'_>) -> Result<Self> {
        let text = expect_text(&value, "char")?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(PhpSerializeError::conversion(format!("{:?}", text), "char")),
        }
    }

    fn to_php(&self, _config: &EncodeConfig) -> Result<PhpValue<'_>> {
        Ok(PhpValue::from(self.to_string()))
    }
}

impl PhpType for String {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Primitive(PrimitiveKind::Str)
    }

    fn from_php(value: PhpValue<'_>) -> Result<Self> {
        match value {
            PhpValue::String(bytes) => String::from_utf8(bytes.into_owned())
                .map_err(|_| PhpSerializeError::detached(ErrorKind::InvalidUtf8)),
            PhpValue::Null => Ok(String::new()),
            other => Err(PhpSerializeError::type_mismatch("string", other.type_name())),
        }
    }

    fn to_php(&self, _config: &EncodeConfig) -> Result<PhpValue<'_>> {
        Ok(PhpValue::from(self.as_str()))
    }
}

impl PhpType for BString {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Primitive(PrimitiveKind::Bytes)
    }

    fn from_php(value: PhpValue<'_>) -> Result<Self> {
        match value {
            PhpValue::String(bytes) => Ok(BString::from(bytes.into_owned())),
            PhpValue::Null => Ok(BString::default()),
            other => Err(PhpSerializeError::type_mismatch("byte string", other.type_name())),
        }
    }

    fn to_php(&self, _config: &EncodeConfig) -> Result<PhpValue<'_>> {
        Ok(PhpValue::String(Cow::Borrowed(self.as_slice())))
    }
}

impl<T: PhpType> PhpType for Option<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Nullable(Box::new(T::descriptor()))
    }

    fn from_php(value: PhpValue<'_>) -> Result<Self> {
        match value {
            PhpValue::Null => Ok(None),
            value => T::from_php(value).map(Some),
        }
    }

    fn to_php(&self, config: &EncodeConfig) -> Result<PhpValue<'_>> {
        match self {
            Some(value) => value.to_php(config),
            None => Ok(PhpValue::Null),
        }
    }
}

impl<T: PhpType> PhpType for Box<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }

    fn from_php(value: PhpValue<'_>) -> Result<Self> {
        T::from_php(value).map(Box::new)
    }

    fn to_php(&self, config: &EncodeConfig) -> Result<PhpValue<'_>> {
        (**self).to_php(config)
    }

    fn to_php_key(&self) -> Result<ArrayKey<'_>> {
        (**self).to_php_key()
    }
}

impl<T: PhpType> PhpType for Vec<T> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Sequence(Box::new(T::descriptor()))
    }

    fn from_php(value: PhpValue<'_>) -> Result<Self> {
        sequence_items(value)?.into_iter().map(T::from_php).collect()
    }

    fn to_php(&self, config: &EncodeConfig) -> Result<PhpValue<'_>> {
        self.iter()
            .map(|item| item.to_php(config))
            .collect::<Result<_>>()
            .map(PhpValue::List)
    }
}

macro_rules! impl_map {
    ($map:ident < K $(: $kbound:ident $(+ $kbounds:ident)*)?, V $(, $s:ident: $sbound:ident + $sbounds:ident)? >) => {
        impl<K, V $(, $s)?> PhpType for $map<K, V $(, $s)?>
        where
            K: PhpType $(+ $kbound $(+ $kbounds)*)?,
            V: PhpType,
            $($s: $sbound + $sbounds,)?
        {
            fn descriptor() -> TypeDescriptor {
                TypeDescriptor::Map {
                    key: Box::new(K::descriptor()),
                    value: Box::new(V::descriptor()),
                }
            }

            fn from_php(value: PhpValue<'_>) -> Result<Self> {
                map_entries(value)
            }

            fn to_php(&self, config: &EncodeConfig) -> Result<PhpValue<'_>> {
                self.iter()
                    .map(|(key, item)| -> Result<_> { Ok((key.to_php_key()?, item.to_php(config)?)) })
                    .collect::<Result<_>>()
                    .map(PhpValue::Map)
            }
        }
    };
}

impl_map!(HashMap<K: Eq + Hash, V, S: BuildHasher + Default>);
impl_map!(BTreeMap<K: Ord, V>);
impl_map!(IndexMap<K: Eq + Hash, V, S: BuildHasher + Default>);

impl PhpType for PhpValue<'static> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::Dynamic
    }

    fn from_php(value: PhpValue<'_>) -> Result<Self> {
        Ok(value.into_owned())
    }

    fn to_php(&self, _config: &EncodeConfig) -> Result<PhpValue<'_>> {
        Ok(self.as_borrowed())
    }
}

php_string_like!(IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr);
