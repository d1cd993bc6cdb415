//! JSON conversion for PHP values.
//!
//! This module provides conversion from `PhpValue` to JSON using serde_json.
//! Enable the `serde` feature to use this module.

use serde::{Serialize, Serializer};
use serde_json::{json, Map, Value as JsonValue};

use crate::types::{ArrayKey, PhpValue, Visibility};

/// Convert a PHP value to a JSON value.
///
/// # Mapping Rules
///
/// | PHP Type | JSON Type |
/// |----------|-----------|
/// | `null` | `null` |
/// | `bool` | `boolean` |
/// | `int` | `number` |
/// | `float` | `number` (`null` for NaN, `"Infinity"`/`"-Infinity"`) |
/// | `string` | `string` (lossy UTF-8 conversion) |
/// | list | `array` |
/// | map | `object` (integer keys as decimal text) |
/// | `object` | `object` with `__class__` field |
///
/// Private properties are keyed `Class::name` and protected ones `*name`.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes, to_json};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = from_bytes(data).unwrap();
/// let json = to_json(&php_value);
/// assert_eq!(json, serde_json::json!({"name": "Alice", "age": 30}));
/// ```
pub fn to_json(value: &PhpValue<'_>) -> JsonValue {
    match value {
        PhpValue::Null => JsonValue::Null,
        PhpValue::Bool(b) => JsonValue::Bool(*b),
        PhpValue::Int(i) => json!(*i),
        PhpValue::Float(f) => {
            if f.is_nan() {
                JsonValue::Null
            } else if f.is_infinite() {
                if f.is_sign_positive() {
                    json!("Infinity")
                } else {
                    json!("-Infinity")
                }
            } else {
                json!(*f)
            }
        }
        PhpValue::String(s) => JsonValue::String(String::from_utf8_lossy(s).into_owned()),
        PhpValue::List(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        PhpValue::Map(entries) => {
            let mut map = Map::new();
            for (k, v) in entries {
                let key = match k {
                    ArrayKey::String(s) => String::from_utf8_lossy(s).into_owned(),
                    ArrayKey::Int(i) => i.to_string(),
                };
                map.insert(key, to_json(v));
            }
            JsonValue::Object(map)
        }
        PhpValue::Object {
            class_name,
            properties,
        } => {
            let mut map = Map::new();
            map.insert("__class__".to_string(), json!(class_name.as_ref()));

            for prop in properties {
                let key = match prop.visibility {
                    Visibility::Private => {
                        let class = prop.declaring_class.as_deref().unwrap_or(class_name);
                        format!("{}::{}", class, prop.name)
                    }
                    Visibility::Protected => format!("*{}", prop.name),
                    Visibility::Public => prop.name.to_string(),
                };
                map.insert(key, to_json(&prop.value));
            }

            JsonValue::Object(map)
        }
    }
}

/// Convert a PHP value to a JSON string.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes, json::to_json_string};
///
/// let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
/// let php_value = from_bytes(data).unwrap();
/// let json_str = to_json_string(&php_value).unwrap();
/// // JSON key order is not guaranteed, so check contents
/// assert!(json_str.contains(r#""name":"Alice""#));
/// assert!(json_str.contains(r#""age":30"#));
/// ```
pub fn to_json_string(value: &PhpValue<'_>) -> serde_json::Result<String> {
    let json = to_json(value);
    serde_json::to_string(&json)
}

/// Convert a PHP value to a pretty-printed JSON string.
pub fn to_json_string_pretty(value: &PhpValue<'_>) -> serde_json::Result<String> {
    let json = to_json(value);
    serde_json::to_string_pretty(&json)
}

/// Serializes with the same mapping as [`to_json`].
impl Serialize for PhpValue<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        to_json(self).serialize(serializer)
    }
}
