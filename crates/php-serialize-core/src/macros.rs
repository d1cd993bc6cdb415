//! Registration macros for host types.

/// Define a struct and bind it to a PHP object.
///
/// Every field type must implement [`PhpType`](crate::PhpType) and the struct
/// must implement `Default`; fields missing from the input keep their default.
///
/// Field visibility becomes the PHP property visibility: `pub` is public, no
/// modifier is private and `pub(..)` is protected. Non-public members are only
/// written when [`EncodeConfig::include_private`](crate::EncodeConfig) is set.
///
/// Field options, written after any doc comments:
///
/// - `#[php(rename = "name")]` reads and writes the property as `name`
/// - `#[php(static)]` marks a static member, written only with
///   [`EncodeConfig::include_static`](crate::EncodeConfig)
/// - `#[php(skip)]` never reads or writes the field
///
/// `struct Name as "PhpName"` sets the class name used on the wire.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes_as, php_record, to_bytes};
///
/// php_record! {
///     /// A user account.
///     #[derive(Debug, Default, PartialEq)]
///     pub struct User as "App\\User" {
///         pub id: i32,
///         #[php(rename = "display_name")]
///         pub name: String,
///         password_hash: String,
///     }
/// }
///
/// let user = User { id: 7, name: "Ann".into(), password_hash: "x".into() };
/// let bytes = to_bytes(&user).unwrap();
/// assert_eq!(
///     bytes,
///     br#"O:8:"App\User":2:{s:2:"id";i:7;s:12:"display_name";s:3:"Ann";}"#
/// );
///
/// let back: User = from_bytes_as(&bytes).unwrap();
/// assert_eq!(back.name, "Ann");
/// assert_eq!(back.password_hash, "");
/// ```
#[macro_export]
macro_rules! php_record {
    (@options $member:expr $(,)?) => {
        $member
    };
    (@options $member:expr, rename = $alias:literal $(, $($rest:tt)*)?) => {
        $crate::php_record!(@options $member.alias($alias) $(, $($rest)*)?)
    };
    (@options $member:expr, static $(, $($rest:tt)*)?) => {
        $crate::php_record!(@options $member.static_member() $(, $($rest)*)?)
    };
    (@options $member:expr, skip $(, $($rest:tt)*)?) => {
        $crate::php_record!(@options $member.ignored() $(, $($rest)*)?)
    };

    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(as $alias:literal)? {
            $(
                $(#[doc = $doc:expr])*
                $(#[php($($opt:tt)*)])*
                $fvis:vis $field:ident : $ty:ty
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[doc = $doc])*
                $fvis $field: $ty,
            )*
        }

        impl $crate::PhpType for $name {
            fn descriptor() -> $crate::TypeDescriptor {
                static RECORD: ::std::sync::OnceLock<$crate::RecordDescriptor> =
                    ::std::sync::OnceLock::new();
                $crate::TypeDescriptor::Record(RECORD.get_or_init(|| {
                    $crate::RecordDescriptor::new(stringify!($name))
                        $(.alias($alias))?
                        $(
                            .member($crate::php_record!(@options
                                $crate::MemberDescriptor::new(
                                    stringify!($field),
                                    <$ty as $crate::PhpType>::descriptor,
                                )
                                .visibility($crate::Visibility::from_rust_visibility(stringify!($fvis)))
                                $(, $($opt)*)*
                            ))
                        )*
                }))
            }

            fn from_php(value: $crate::PhpValue<'_>) -> $crate::Result<Self> {
                let descriptor = <Self as $crate::PhpType>::descriptor();
                let mut record = <Self as ::core::default::Default>::default();
                $crate::bind::bind_record(value, &descriptor, |field, value| {
                    $(
                        if field == stringify!($field) {
                            record.$field = <$ty as $crate::PhpType>::from_php(value)?;
                            return ::core::result::Result::Ok(());
                        }
                    )*
                    let _ = (field, value);
                    ::core::result::Result::Ok(())
                })?;
                ::core::result::Result::Ok(record)
            }

            fn to_php(
                &self,
                config: &$crate::EncodeConfig,
            ) -> $crate::Result<$crate::PhpValue<'_>> {
                let descriptor = <Self as $crate::PhpType>::descriptor();
                let mut properties = ::std::vec::Vec::new();
                $(
                    $crate::bind::push_member(
                        &mut properties,
                        &descriptor,
                        stringify!($field),
                        &self.$field,
                        config,
                    )?;
                )*
                ::core::result::Result::Ok($crate::bind::record_value(&descriptor, properties))
            }
        }
    };
}

/// Define a fieldless enum carried as its variant name.
///
/// ```rust
/// use php_serialize_core::{from_bytes_as, php_enum, to_bytes};
///
/// php_enum! {
///     #[derive(Debug, Clone, Copy, PartialEq)]
///     pub enum Status {
///         Active,
///         Suspended,
///     }
/// }
///
/// assert_eq!(to_bytes(&Status::Active).unwrap(), b"s:6:\"Active\";");
/// assert_eq!(from_bytes_as::<Status>(b"s:9:\"Suspended\";").unwrap(), Status::Suspended);
/// assert!(from_bytes_as::<Status>(b"s:4:\"Gone\";").is_err());
/// ```
#[macro_export]
macro_rules! php_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $(
                $(#[$vmeta])*
                $variant,
            )*
        }

        impl $crate::PhpType for $name {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::Enum {
                    name: stringify!($name),
                    variants: &[$(stringify!($variant)),*],
                }
            }

            fn from_php(value: $crate::PhpValue<'_>) -> $crate::Result<Self> {
                let text = $crate::bind::expect_text(&value, stringify!($name))?;
                $(
                    if text == stringify!($variant) {
                        return ::core::result::Result::Ok(Self::$variant);
                    }
                )*
                ::core::result::Result::Err($crate::PhpSerializeError::conversion(
                    ::std::format!("{:?}", text),
                    stringify!($name),
                ))
            }

            fn to_php(
                &self,
                _config: &$crate::EncodeConfig,
            ) -> $crate::Result<$crate::PhpValue<'_>> {
                let name: &'static str = match self {
                    $(Self::$variant => stringify!($variant),)*
                };
                ::core::result::Result::Ok($crate::PhpValue::from(name))
            }
        }
    };
}

/// Carry existing `FromStr + Display` types as PHP strings.
///
/// ```rust
/// use std::str::FromStr;
/// use php_serialize_core::{from_bytes_as, php_string_like, to_bytes};
///
/// #[derive(Debug, PartialEq)]
/// struct Cents(u64);
///
/// impl FromStr for Cents {
///     type Err = std::num::ParseIntError;
///
///     fn from_str(s: &str) -> Result<Self, Self::Err> {
///         s.trim_end_matches('c').parse().map(Cents)
///     }
/// }
///
/// impl std::fmt::Display for Cents {
///     fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
///         write!(f, "{}c", self.0)
///     }
/// }
///
/// php_string_like!(Cents);
///
/// assert_eq!(to_bytes(&Cents(250)).unwrap(), b"s:4:\"250c\";");
/// assert_eq!(from_bytes_as::<Cents>(b"s:3:\"99c\";").unwrap(), Cents(99));
/// ```
#[macro_export]
macro_rules! php_string_like {
    ($($ty:ty),* $(,)?) => {$(
        impl $crate::PhpType for $ty {
            fn descriptor() -> $crate::TypeDescriptor {
                $crate::TypeDescriptor::StringLike {
                    name: stringify!($ty),
                    parse: |text: &str| {
                        text.parse::<$ty>()
                            .map(drop)
                            .map_err(|e| ::std::string::ToString::to_string(&e))
                    },
                }
            }

            fn from_php(value: $crate::PhpValue<'_>) -> $crate::Result<Self> {
                let text = $crate::bind::expect_text(&value, stringify!($ty))?;
                text.parse::<$ty>().map_err(|e| {
                    $crate::PhpSerializeError::conversion(::std::format!("{:?}", text), stringify!($ty))
                        .with_context(::std::string::ToString::to_string(&e))
                })
            }

            fn to_php(
                &self,
                _config: &$crate::EncodeConfig,
            ) -> $crate::Result<$crate::PhpValue<'_>> {
                ::core::result::Result::Ok($crate::PhpValue::from(::std::string::ToString::to_string(self)))
            }
        }
    )*};
}
