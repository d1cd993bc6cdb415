//! PHP value types.

use std::borrow::Cow;
use std::fmt;

use bstr::ByteSlice;

/// A PHP value that can be serialized or deserialized.
///
/// PHP has a single array construct. The reader recovers whether an array was
/// written as a 0-based list or as a key/value map and produces
/// [`PhpValue::List`] or [`PhpValue::Map`] accordingly.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PhpValue<'a> {
    /// PHP null value.
    #[default]
    Null,

    /// PHP boolean value.
    Bool(bool),

    /// PHP integer value.
    Int(i64),

    /// PHP float/double value.
    Float(f64),

    /// PHP string value (may contain non-UTF8 bytes).
    /// Uses Cow for zero-copy when possible.
    String(Cow<'a, [u8]>),

    /// PHP array whose keys are exactly `0..n-1` in encounter order.
    List(Vec<PhpValue<'a>>),

    /// PHP array with arbitrary integer or string keys, in insertion order.
    Map(Vec<(ArrayKey<'a>, PhpValue<'a>)>),

    /// PHP object value.
    Object {
        /// The class name of the object.
        class_name: Cow<'a, str>,
        /// Object properties with their names and values, in stream order.
        properties: Vec<PhpProperty<'a>>,
    },
}

/// Key of a PHP array entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ArrayKey<'a> {
    /// Integer key (`i:` production).
    Int(i64),
    /// String key (`s:` production).
    String(Cow<'a, [u8]>),
}

/// A PHP object property.
#[derive(Debug, Clone, PartialEq)]
pub struct PhpProperty<'a> {
    /// Property name, without PHP's visibility mangling.
    pub name: Cow<'a, str>,
    /// Property visibility.
    pub visibility: Visibility,
    /// For private properties, the class that declared it.
    pub declaring_class: Option<Cow<'a, str>>,
    /// Property value.
    pub value: PhpValue<'a>,
}

/// PHP property visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    /// Public property.
    #[default]
    Public,
    /// Protected property (prefixed with `\0*\0`).
    Protected,
    /// Private property (prefixed with `\0ClassName\0`).
    Private,
}

impl Visibility {
    /// Map a Rust field visibility, as written in source, to a member visibility.
    ///
    /// `pub` is public, an empty visibility is private and any restricted
    /// `pub(..)` form is protected.
    pub fn from_rust_visibility(vis: &str) -> Self {
        match vis.trim() {
            "pub" => Visibility::Public,
            "" => Visibility::Private,
            _ => Visibility::Protected,
        }
    }
}

impl<'a> PhpProperty<'a> {
    /// A public property.
    pub fn new(name: impl Into<Cow<'a, str>>, value: PhpValue<'a>) -> Self {
        Self {
            name: name.into(),
            visibility: Visibility::Public,
            declaring_class: None,
            value,
        }
    }

    /// Convert to an owned property that doesn't borrow from the input.
    pub fn into_owned(self) -> PhpProperty<'static> {
        PhpProperty {
            name: Cow::Owned(self.name.into_owned()),
            visibility: self.visibility,
            declaring_class: self.declaring_class.map(|c| Cow::Owned(c.into_owned())),
            value: self.value.into_owned(),
        }
    }
}

impl<'a> ArrayKey<'a> {
    /// Get the key as an integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            ArrayKey::Int(i) => Some(*i),
            ArrayKey::String(_) => None,
        }
    }

    /// Get the key as a UTF-8 string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ArrayKey::String(s) => std::str::from_utf8(s).ok(),
            ArrayKey::Int(_) => None,
        }
    }

    /// Turn the key into the value it was read from.
    pub fn into_value(self) -> PhpValue<'a> {
        match self {
            ArrayKey::Int(i) => PhpValue::Int(i),
            ArrayKey::String(s) => PhpValue::String(s),
        }
    }

    /// Convert to an owned key that doesn't borrow from the input.
    pub fn into_owned(self) -> ArrayKey<'static> {
        match self {
            ArrayKey::Int(i) => ArrayKey::Int(i),
            ArrayKey::String(s) => ArrayKey::String(Cow::Owned(s.into_owned())),
        }
    }
}

impl From<i64> for ArrayKey<'_> {
    fn from(value: i64) -> Self {
        ArrayKey::Int(value)
    }
}

impl<'a> From<&'a str> for ArrayKey<'a> {
    fn from(value: &'a str) -> Self {
        ArrayKey::String(Cow::Borrowed(value.as_bytes()))
    }
}

impl fmt::Display for ArrayKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayKey::Int(i) => write!(f, "{}", i),
            ArrayKey::String(s) => write!(f, "\"{}\"", s.as_bstr()),
        }
    }
}

impl<'a> PhpValue<'a> {
    /// Check if the value is null.
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, PhpValue::Null)
    }

    /// Check if the value is a boolean.
    #[inline]
    pub fn is_bool(&self) -> bool {
        matches!(self, PhpValue::Bool(_))
    }

    /// Check if the value is an integer.
    #[inline]
    pub fn is_int(&self) -> bool {
        matches!(self, PhpValue::Int(_))
    }

    /// Check if the value is a float.
    #[inline]
    pub fn is_float(&self) -> bool {
        matches!(self, PhpValue::Float(_))
    }

    /// Check if the value is a string.
    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, PhpValue::String(_))
    }

    /// Check if the value is a list.
    #[inline]
    pub fn is_list(&self) -> bool {
        matches!(self, PhpValue::List(_))
    }

    /// Check if the value is a map.
    #[inline]
    pub fn is_map(&self) -> bool {
        matches!(self, PhpValue::Map(_))
    }

    /// Check if the value is an object.
    #[inline]
    pub fn is_object(&self) -> bool {
        matches!(self, PhpValue::Object { .. })
    }

    /// Get the value as a boolean.
    #[inline]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PhpValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the value as an integer.
    #[inline]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PhpValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the value as a float.
    #[inline]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            PhpValue::Float(f) => Some(*f),
            PhpValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Get the value as a byte slice.
    #[inline]
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            PhpValue::String(s) => Some(s.as_ref()),
            _ => None,
        }
    }

    /// Get the value as a UTF-8 string.
    #[inline]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhpValue::String(s) => std::str::from_utf8(s.as_ref()).ok(),
            _ => None,
        }
    }

    /// Byte length of a string value, as written in its `s:<len>:` prefix.
    #[inline]
    pub fn byte_len(&self) -> Option<usize> {
        self.as_bytes().map(<[u8]>::len)
    }

    /// Get the value as a list.
    #[inline]
    pub fn as_list(&self) -> Option<&[PhpValue<'a>]> {
        match self {
            PhpValue::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Get the value as map entries.
    #[inline]
    pub fn as_map(&self) -> Option<&[(ArrayKey<'a>, PhpValue<'a>)]> {
        match self {
            PhpValue::Map(entries) => Some(entries.as_slice()),
            _ => None,
        }
    }

    /// Class name of an object value.
    #[inline]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            PhpValue::Object { class_name, .. } => Some(class_name.as_ref()),
            _ => None,
        }
    }

    /// Properties of an object value.
    #[inline]
    pub fn properties(&self) -> Option<&[PhpProperty<'a>]> {
        match self {
            PhpValue::Object { properties, .. } => Some(properties.as_slice()),
            _ => None,
        }
    }

    /// Take the properties out of an object value.
    pub fn into_properties(self) -> Option<Vec<PhpProperty<'a>>> {
        match self {
            PhpValue::Object { properties, .. } => Some(properties),
            _ => None,
        }
    }

    /// Look up an object property or a string-keyed map entry by name.
    ///
    /// The first match in stream order wins.
    pub fn get(&self, name: &str) -> Option<&PhpValue<'a>> {
        match self {
            PhpValue::Object { properties, .. } => properties
                .iter()
                .find(|p| p.name == name)
                .map(|p| &p.value),
            PhpValue::Map(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, ArrayKey::String(s) if s.as_ref() == name.as_bytes()))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up a list element or an integer-keyed map entry.
    pub fn get_index(&self, index: i64) -> Option<&PhpValue<'a>> {
        match self {
            PhpValue::List(items) => usize::try_from(index).ok().and_then(|i| items.get(i)),
            PhpValue::Map(entries) => entries
                .iter()
                .find(|(k, _)| *k == ArrayKey::Int(index))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Borrow every owned string of this value, producing a view tied to `self`.
    pub fn as_borrowed(&self) -> PhpValue<'_> {
        match self {
            PhpValue::Null => PhpValue::Null,
            PhpValue::Bool(b) => PhpValue::Bool(*b),
            PhpValue::Int(i) => PhpValue::Int(*i),
            PhpValue::Float(f) => PhpValue::Float(*f),
            PhpValue::String(s) => PhpValue::String(Cow::Borrowed(s.as_ref())),
            PhpValue::List(items) => PhpValue::List(items.iter().map(PhpValue::as_borrowed).collect()),
            PhpValue::Map(entries) => PhpValue::Map(
                entries
                    .iter()
                    .map(|(k, v)| {
                        let key = match k {
                            ArrayKey::Int(i) => ArrayKey::Int(*i),
                            ArrayKey::String(s) => ArrayKey::String(Cow::Borrowed(s.as_ref())),
                        };
                        (key, v.as_borrowed())
                    })
                    .collect(),
            ),
            PhpValue::Object {
                class_name,
                properties,
            } => PhpValue::Object {
                class_name: Cow::Borrowed(class_name.as_ref()),
                properties: properties
                    .iter()
                    .map(|p| PhpProperty {
                        name: Cow::Borrowed(p.name.as_ref()),
                        visibility: p.visibility,
                        declaring_class: p.declaring_class.as_deref().map(Cow::Borrowed),
                        value: p.value.as_borrowed(),
                    })
                    .collect(),
            },
        }
    }

    /// Convert to an owned value that doesn't borrow from the input.
    pub fn into_owned(self) -> PhpValue<'static> {
        match self {
            PhpValue::Null => PhpValue::Null,
            PhpValue::Bool(b) => PhpValue::Bool(b),
            PhpValue::Int(i) => PhpValue::Int(i),
            PhpValue::Float(f) => PhpValue::Float(f),
            PhpValue::String(s) => PhpValue::String(Cow::Owned(s.into_owned())),
            PhpValue::List(items) => {
                PhpValue::List(items.into_iter().map(PhpValue::into_owned).collect())
            }
            PhpValue::Map(entries) => PhpValue::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k.into_owned(), v.into_owned()))
                    .collect(),
            ),
            PhpValue::Object {
                class_name,
                properties,
            } => PhpValue::Object {
                class_name: Cow::Owned(class_name.into_owned()),
                properties: properties.into_iter().map(PhpProperty::into_owned).collect(),
            },
        }
    }

    /// Get a type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            PhpValue::Null => "null",
            PhpValue::Bool(_) => "boolean",
            PhpValue::Int(_) => "integer",
            PhpValue::Float(_) => "float",
            PhpValue::String(_) => "string",
            PhpValue::List(_) => "list",
            PhpValue::Map(_) => "map",
            PhpValue::Object { .. } => "object",
        }
    }
}

impl From<bool> for PhpValue<'_> {
    fn from(value: bool) -> Self {
        PhpValue::Bool(value)
    }
}

impl From<i64> for PhpValue<'_> {
    fn from(value: i64) -> Self {
        PhpValue::Int(value)
    }
}

impl From<f64> for PhpValue<'_> {
    fn from(value: f64) -> Self {
        PhpValue::Float(value)
    }
}

impl<'a> From<&'a str> for PhpValue<'a> {
    fn from(value: &'a str) -> Self {
        PhpValue::String(Cow::Borrowed(value.as_bytes()))
    }
}

impl From<String> for PhpValue<'_> {
    fn from(value: String) -> Self {
        PhpValue::String(Cow::Owned(value.into_bytes()))
    }
}

impl<'a, T: Into<PhpValue<'a>>> From<Option<T>> for PhpValue<'a> {
    fn from(value: Option<T>) -> Self {
        value.map_or(PhpValue::Null, Into::into)
    }
}

impl fmt::Display for PhpValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpValue::Null => write!(f, "null"),
            PhpValue::Bool(b) => write!(f, "{}", b),
            PhpValue::Int(i) => write!(f, "{}", i),
            PhpValue::Float(fl) => write!(f, "{}", fl),
            PhpValue::String(s) => write!(f, "\"{}\"", s.as_bstr()),
            PhpValue::List(items) => {
                write!(f, "[")?;
                for (i, v) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, "]")
            }
            PhpValue::Map(entries) => {
                write!(f, "[")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} => {}", k, v)?;
                }
                write!(f, "]")
            }
            PhpValue::Object {
                class_name,
                properties,
            } => {
                write!(f, "{} {{", class_name)?;
                for (i, p) in properties.iter().enumerate() {
                    if i > 0 {
                        write!(f, ",")?;
                    }
                    write!(f, " {}: {}", p.name, p.value)?;
                }
                write!(f, " }}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_object() -> PhpValue<'static> {
        PhpValue::Object {
            class_name: Cow::Borrowed("User"),
            properties: vec![
                PhpProperty::new("name", PhpValue::from("Alice")),
                PhpProperty::new("age", PhpValue::Int(30)),
            ],
        }
    }

    #[test]
    fn test_get_object_property() {
        let user = sample_object();
        assert_eq!(user.class_name(), Some("User"));
        assert_eq!(user.get("name").and_then(PhpValue::as_str), Some("Alice"));
        assert_eq!(user.get("age").and_then(PhpValue::as_int), Some(30));
        assert!(user.get("missing").is_none());
    }

    #[test]
    fn test_get_map_entry_and_index() {
        let map = PhpValue::Map(vec![
            (ArrayKey::from("x"), PhpValue::Int(1)),
            (ArrayKey::Int(7), PhpValue::Int(2)),
        ]);
        assert_eq!(map.get("x"), Some(&PhpValue::Int(1)));
        assert_eq!(map.get_index(7), Some(&PhpValue::Int(2)));

        let list = PhpValue::List(vec![PhpValue::Int(10), PhpValue::Int(20)]);
        assert_eq!(list.get_index(1), Some(&PhpValue::Int(20)));
        assert_eq!(list.get_index(-1), None);
    }

    #[test]
    fn test_byte_len_counts_utf8_bytes() {
        let value = PhpValue::from("héllo");
        assert_eq!(value.byte_len(), Some(6));
    }

    #[test]
    fn test_rust_visibility_mapping() {
        assert_eq!(Visibility::from_rust_visibility("pub"), Visibility::Public);
        assert_eq!(Visibility::from_rust_visibility(""), Visibility::Private);
        assert_eq!(
            Visibility::from_rust_visibility("pub(crate)"),
            Visibility::Protected
        );
    }

    #[test]
    fn test_display() {
        let map = PhpValue::Map(vec![(ArrayKey::from("k"), PhpValue::from("v"))]);
        assert_eq!(map.to_string(), "[\"k\" => \"v\"]");
        assert_eq!(sample_object().to_string(), "User { name: \"Alice\", age: 30 }");
        assert_eq!(
            PhpValue::String(Cow::Borrowed(b"a\xffb")).to_string(),
            "\"a\u{FFFD}b\""
        );
    }

    #[test]
    fn test_as_borrowed_and_into_owned_preserve_content() {
        let owned = sample_object().into_owned();
        assert_eq!(owned.as_borrowed(), owned);
    }
}
