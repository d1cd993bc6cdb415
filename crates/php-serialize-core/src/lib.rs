//! Bidirectional PHP serialize/unserialize codec.
//!
//! This crate reads and writes the byte format produced by PHP's `serialize()`.
//! Untyped decoding yields a borrowed [`PhpValue`] tree; typed decoding binds
//! straight into Rust types through the [`PhpType`] trait.
//!
//! # Features
//!
//! - **Zero-copy parsing** - Strings borrow from the input buffer
//! - **Typed binding** - Records, enums, sequences and maps via [`PhpType`]
//! - **List/map recovery** - PHP arrays come back as [`PhpValue::List`] or
//!   [`PhpValue::Map`] depending on their keys
//! - **UTF-8 aware** - String lengths are byte counts on both sides
//! - **Detailed errors** - Byte offsets, expected vs. found, and an input preview
//!
//! # Quick Start
//!
//! ```rust
//! use php_serialize_core::{from_bytes, PhpValue};
//!
//! let data = br#"a:2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
//! let value = from_bytes(data).unwrap();
//!
//! if let PhpValue::Map(entries) = &value {
//!     for (key, val) in entries {
//!         println!("{} => {}", key, val);
//!     }
//! }
//! assert_eq!(value.get("age"), Some(&PhpValue::Int(30)));
//! ```
//!
//! # Typed Records
//!
//! ```rust
//! use php_serialize_core::{from_bytes_as, php_record, to_bytes};
//!
//! php_record! {
//!     #[derive(Debug, Default)]
//!     pub struct Foo {
//!         pub a: i32,
//!     }
//! }
//!
//! // Unknown fields are skipped
//! let foo: Foo = from_bytes_as(br#"O:3:"Foo":2:{s:1:"a";i:1;s:1:"z";i:2;}"#).unwrap();
//! assert_eq!(foo.a, 1);
//! assert_eq!(to_bytes(&foo).unwrap(), br#"O:3:"Foo":1:{s:1:"a";i:1;}"#);
//! ```
//!
//! # Supported Types
//!
//! | PHP Type | Rust Type |
//! |----------|-----------|
//! | `null` | `PhpValue::Null` |
//! | `bool` | `PhpValue::Bool(bool)` |
//! | `int` | `PhpValue::Int(i64)` |
//! | `float` | `PhpValue::Float(f64)` |
//! | `string` | `PhpValue::String(Cow<[u8]>)` |
//! | `array` (keys `0..n-1`) | `PhpValue::List(Vec<PhpValue>)` |
//! | `array` (other keys) | `PhpValue::Map(Vec<(ArrayKey, PhpValue)>)` |
//! | `object` | `PhpValue::Object { class_name, properties }` |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::redundant_closure_for_method_calls)]
#![allow(clippy::inline_always)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::float_cmp)]

#[macro_use]
mod macros;

pub mod bind;
pub mod descriptor;
pub mod error;
pub mod parser;
pub mod types;
pub mod writer;

#[cfg(feature = "serde")]
pub mod json;

pub use bind::{from_bytes_as, from_bytes_as_with_config, from_bytes_map, from_bytes_seq, PhpType};
pub use descriptor::{MemberDescriptor, PrimitiveKind, RecordDescriptor, TypeDescriptor};
pub use error::{ErrorKind, PhpSerializeError, Result};
pub use parser::{from_bytes, from_bytes_assoc, from_bytes_with_config, Parser, ParserConfig};
pub use types::{ArrayKey, PhpProperty, PhpValue, Visibility};
pub use writer::{to_bytes, to_bytes_with_config, value_to_bytes, EncodeConfig, Writer};

#[cfg(feature = "serde")]
pub use json::to_json;
