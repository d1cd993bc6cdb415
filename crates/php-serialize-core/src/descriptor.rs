//! Runtime descriptions of host types.
//!
//! A [`TypeDescriptor`] tells the typed reader what shape to expect next in
//! the stream and how to check it. Descriptors are plain data; records carry
//! one [`MemberDescriptor`] per field, and member types are produced lazily by
//! a function pointer so that a record may refer to itself.

use crate::error::{PhpSerializeError, Result};
use crate::types::Visibility;
use crate::writer::EncodeConfig;

/// Scalar and text targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum PrimitiveKind {
    Bool,
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
    F32,
    F64,
    Char,
    Str,
    /// Raw byte string, not required to be UTF-8.
    Bytes,
}

impl PrimitiveKind {
    /// Rust spelling of the type.
    pub fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::I8 => "i8",
            Self::I16 => "i16",
            Self::I32 => "i32",
            Self::I64 => "i64",
            Self::Isize => "isize",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::Usize => "usize",
            Self::F32 => "f32",
            Self::F64 => "f64",
            Self::Char => "char",
            Self::Str => "string",
            Self::Bytes => "byte string",
        }
    }

    /// Whether the kind is one of the integer types.
    pub fn is_integer(self) -> bool {
        matches!(
            self,
            Self::I8
                | Self::I16
                | Self::I32
                | Self::I64
                | Self::Isize
                | Self::U8
                | Self::U16
                | Self::U32
                | Self::U64
                | Self::Usize
        )
    }

    /// Whether the kind is `f32` or `f64`.
    pub fn is_float(self) -> bool {
        matches!(self, Self::F32 | Self::F64)
    }

    /// Whether values of this kind can be used as PHP array keys.
    pub fn is_key(self) -> bool {
        self.is_integer() || self.is_text()
    }

    /// Whether the kind is carried by the string production.
    pub fn is_text(self) -> bool {
        matches!(self, Self::Str | Self::Bytes | Self::Char)
    }

    fn int_range(self) -> (i128, i128) {
        match self {
            Self::I8 => (i8::MIN.into(), i8::MAX.into()),
            Self::I16 => (i16::MIN.into(), i16::MAX.into()),
            Self::I32 => (i32::MIN.into(), i32::MAX.into()),
            Self::I64 => (i64::MIN.into(), i64::MAX.into()),
            Self::Isize => (isize::MIN as i128, isize::MAX as i128),
            Self::U8 => (0, u8::MAX.into()),
            Self::U16 => (0, u16::MAX.into()),
            Self::U32 => (0, u32::MAX.into()),
            Self::U64 => (0, u64::MAX.into()),
            Self::Usize => (0, usize::MAX as i128),
            _ => (0, -1),
        }
    }

    /// Check that an integer literal fits this kind.
    pub fn check_int(self, value: i64) -> Result<()> {
        self.check_wide(i128::from(value))
    }

    /// Like [`check_int`](Self::check_int), for values that may exceed `i64`.
    pub fn check_wide(self, value: i128) -> Result<()> {
        let (min, max) = self.int_range();
        if (min..=max).contains(&value) {
            Ok(())
        } else {
            Err(PhpSerializeError::conversion(value, self.name()))
        }
    }

    /// Check that a float literal fits this kind.
    ///
    /// Integer kinds need a finite, integral value in range. Values past the
    /// 64-bit edges saturate instead of failing, since `f64` cannot represent
    /// those bounds exactly. `f32` only needs the value to be in range when
    /// finite.
    pub fn check_float(self, value: f64) -> Result<()> {
        let fits = if self.is_integer() {
            let (min, max) = self.int_range();
            let saturating = matches!(self, Self::I64 | Self::U64 | Self::Isize | Self::Usize);
            value.is_finite()
                && value.fract() == 0.0
                && (saturating || (value >= min as f64 && value <= max as f64))
                && (!saturating || min < 0 || value >= 0.0)
        } else {
            match self {
                Self::F64 => true,
                Self::F32 => !value.is_finite() || value.abs() <= f64::from(f32::MAX),
                _ => false,
            }
        };

        if fits {
            Ok(())
        } else {
            Err(PhpSerializeError::conversion(value, self.name()))
        }
    }
}

/// Validates the text form of a string-like type.
pub type ParseCheck = fn(&str) -> std::result::Result<(), String>;

/// What a host type looks like on the wire.
#[derive(Debug, Clone)]
pub enum TypeDescriptor {
    /// A scalar or text value.
    Primitive(PrimitiveKind),
    /// `N;` or the inner type.
    Nullable(Box<TypeDescriptor>),
    /// A string naming one of a fixed set of cases.
    Enum {
        /// Host type name.
        name: &'static str,
        /// Accepted case names.
        variants: &'static [&'static str],
    },
    /// A type carried as a string and parsed from its text form.
    StringLike {
        /// Host type name.
        name: &'static str,
        /// Validates the text before conversion.
        parse: ParseCheck,
    },
    /// An ordered collection.
    Sequence(Box<TypeDescriptor>),
    /// A keyed collection.
    Map {
        /// Key type.
        key: Box<TypeDescriptor>,
        /// Value type.
        value: Box<TypeDescriptor>,
    },
    /// A record bound to a PHP object. Built once per type.
    Record(&'static RecordDescriptor),
    /// Any value, bound to [`PhpValue`](crate::PhpValue).
    Dynamic,
}

impl TypeDescriptor {
    /// Human-readable name, used in error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Primitive(kind) => kind.name().to_string(),
            Self::Nullable(inner) => format!("Option<{}>", inner.describe()),
            Self::Enum { name, .. } | Self::StringLike { name, .. } => (*name).to_string(),
            Self::Sequence(item) => format!("Vec<{}>", item.describe()),
            Self::Map { key, value } => format!("map<{}, {}>", key.describe(), value.describe()),
            Self::Record(record) => record.name.to_string(),
            Self::Dynamic => "any value".to_string(),
        }
    }

    /// Whether values of this type may be PHP array keys.
    pub fn is_key(&self) -> bool {
        match self {
            Self::Primitive(kind) => kind.is_key(),
            Self::Enum { .. } | Self::StringLike { .. } => true,
            _ => false,
        }
    }

    /// Whether `N;` is an acceptable encoding.
    pub fn accepts_null(&self) -> bool {
        matches!(
            self,
            Self::Nullable(_)
                | Self::Dynamic
                | Self::Primitive(PrimitiveKind::Str | PrimitiveKind::Bytes)
        )
    }
}

/// The fields of a record and their PHP names.
#[derive(Debug, Clone)]
pub struct RecordDescriptor {
    /// Host type name.
    pub name: &'static str,
    /// Class name used on the wire instead of `name`.
    pub alias: Option<&'static str>,
    /// Members in declaration order.
    pub members: Vec<MemberDescriptor>,
}

impl RecordDescriptor {
    /// Start a descriptor for a record named `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            alias: None,
            members: Vec::new(),
        }
    }

    /// Set the class name written to the stream.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Append a member.
    pub fn member(mut self, member: MemberDescriptor) -> Self {
        self.members.push(member);
        self
    }

    /// The class name written to the stream.
    pub fn php_name(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    /// Find the member bound to property `property`.
    ///
    /// A member matches by its alias if it has one, and by its own name
    /// otherwise. Ignored members never match.
    pub fn find(&self, property: &str) -> Option<&MemberDescriptor> {
        self.members
            .iter()
            .find(|m| !m.ignored && m.binding_name() == property)
    }

    /// Look a member up by its host field name.
    pub fn field(&self, name: &str) -> Option<&MemberDescriptor> {
        self.members.iter().find(|m| m.name == name)
    }
}

/// One field of a record.
#[derive(Debug, Clone)]
pub struct MemberDescriptor {
    /// Host field name.
    pub name: &'static str,
    /// Property name used on the wire instead of `name`.
    pub alias: Option<&'static str>,
    /// Produces the member's type on demand.
    pub ty: fn() -> TypeDescriptor,
    /// PHP visibility of the property.
    pub visibility: Visibility,
    /// Class-level rather than per-instance.
    pub is_static: bool,
    /// Never read or written.
    pub ignored: bool,
}

impl MemberDescriptor {
    /// A public, non-static member.
    pub fn new(name: &'static str, ty: fn() -> TypeDescriptor) -> Self {
        Self {
            name,
            alias: None,
            ty,
            visibility: Visibility::Public,
            is_static: false,
            ignored: false,
        }
    }

    /// Bind to a different property name.
    pub fn alias(mut self, alias: &'static str) -> Self {
        self.alias = Some(alias);
        self
    }

    /// Set the member's visibility.
    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the member static.
    pub fn static_member(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Exclude the member from encoding and decoding.
    pub fn ignored(mut self) -> Self {
        self.ignored = true;
        self
    }

    /// The property name this member reads and writes.
    pub fn binding_name(&self) -> &'static str {
        self.alias.unwrap_or(self.name)
    }

    /// Whether the encoder writes this member under `config`.
    pub fn is_encoded(&self, config: &EncodeConfig) -> bool {
        !self.ignored
            && (!self.is_static || config.include_static)
            && (self.visibility == Visibility::Public || config.include_private)
    }

    /// The member's type.
    pub fn descriptor(&self) -> TypeDescriptor {
        (self.ty)()
    }
}
