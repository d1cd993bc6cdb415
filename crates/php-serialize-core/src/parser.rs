//! Zero-copy PHP serialize parser.
//!
//! This module provides the grammar reader. A [`Parser`] owns one cursor over
//! one borrowed buffer; strings borrow directly from that buffer.
//!
//! # Whitespace
//!
//! Bytes `<= 0x20` are skipped wherever the grammar expects a significant
//! token. String payloads are always read raw.
//!
//! # Arrays
//!
//! PHP uses one array production for both lists and maps. Untyped parsing
//! recovers the shape:
//!
//! 1. Entries are read under the list hypothesis. Keys exactly `0..n-1` in
//!    order give a [`PhpValue::List`]; any other in-range integer keys give a
//!    [`PhpValue::Map`].
//! 2. A string key makes the array a [`PhpValue::Map`]. Entries already read
//!    are kept and the rest are read as map entries.
//! 3. A negative or out-of-range key does the same, then fails with
//!    [`ErrorKind::MalformedArray`] unless
//!    [`ParserConfig::recover_malformed_arrays`] is set.
//!
//! No entry is read twice, so parsing stays linear in the input length.
//!
//! # Tracing Support
//!
//! Enable the `tracing` feature for detailed parsing instrumentation:
//!
//! ```toml
//! php-serialize-core = { version = "0.2", features = ["tracing"] }
//! ```

use std::borrow::Cow;

use memchr::memchr;

#[cfg(feature = "tracing")]
use tracing::{debug, instrument, trace, warn};

use crate::error::{ErrorKind, PhpSerializeError, Result};
use crate::types::{ArrayKey, PhpProperty, PhpValue, Visibility};

/// Maximum nesting depth to prevent stack overflow.
const MAX_DEPTH: usize = 512;

/// Parser configuration options.
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Maximum nesting depth for arrays and objects.
    pub max_depth: usize,
    /// Return the array as a map instead of failing when it holds an
    /// out-of-range integer key.
    pub recover_malformed_arrays: bool,
    /// Strip `"` bytes from both ends of every string payload.
    ///
    /// Some legacy producers relied on this. It loses data for strings that
    /// start or end with a quote, so it is off by default.
    pub trim_string_quotes: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            recover_malformed_arrays: false,
            trim_string_quotes: false,
        }
    }
}

/// A zero-copy PHP deserialize parser.
pub struct Parser<'a> {
    /// Input data.
    data: &'a [u8],
    /// Current position in the input.
    pos: usize,
    /// Parser configuration.
    config: ParserConfig,
    /// Current nesting depth.
    depth: usize,
}

/// Why the list hypothesis was abandoned.
enum ListFault {
    /// A string key turned up; the array is a map.
    StringKey,
    /// An integer key outside `0..count`.
    OutOfRange { key: i64, position: usize },
}

impl<'a> Parser<'a> {
    /// Create a new parser with default configuration.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_config(data, ParserConfig::default())
    }

    /// Create a new parser with custom configuration.
    pub fn with_config(data: &'a [u8], config: ParserConfig) -> Self {
        Self {
            data,
            pos: 0,
            config,
            depth: 0,
        }
    }

    /// Current byte offset of the cursor.
    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// The configuration this parser was created with.
    #[inline]
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse the input and return a PHP value.
    ///
    /// This is the main entry point for parsing PHP serialized data.
    /// If the `tracing` feature is enabled, this method will emit trace events.
    #[cfg_attr(feature = "tracing", instrument(skip(self), fields(data_len = self.data.len())))]
    pub fn parse(&mut self) -> Result<PhpValue<'a>> {
        #[cfg(feature = "tracing")]
        debug!(data_len = self.data.len(), "Starting PHP deserialize");

        let result = self.parse_value();

        #[cfg(feature = "tracing")]
        match &result {
            Ok(value) => debug!(value_type = value.type_name(), "Parse completed successfully"),
            Err(e) => warn!(error = %e, "Parse failed"),
        }

        result
    }

    /// Parse a single value at the current position.
    ///
    /// This is the core parsing dispatch function that routes to type-specific parsers.
    #[cfg_attr(feature = "tracing", instrument(skip(self), level = "trace", fields(pos = self.pos, depth = self.depth)))]
    pub fn parse_value(&mut self) -> Result<PhpValue<'a>> {
        self.check_depth()?;

        let type_byte = self.peek_byte()?;

        #[cfg(feature = "tracing")]
        trace!(type_marker = %char::from(type_byte), pos = self.pos, "Parsing value");

        match type_byte {
            b'N' => self.parse_null(),
            b'b' => self.read_bool().map(PhpValue::Bool),
            b'i' => self.read_int().map(PhpValue::Int),
            b'd' => self.read_float().map(PhpValue::Float),
            b's' => self.read_string().map(PhpValue::String),
            b'a' => self.parse_array(),
            b'O' => self.parse_object(),
            _ => Err(self.unexpected_token(type_byte)),
        }
    }

    /// Parse an array as a map without trying the list hypothesis.
    ///
    /// Every key is kept as written, so even `a:2:{i:0;..;i:1;..}` comes back
    /// as a [`PhpValue::Map`].
    pub fn parse_assoc_array(&mut self) -> Result<PhpValue<'a>> {
        self.check_depth()?;
        let count = self.read_array_header()?;

        self.depth += 1;
        let mut entries = Vec::with_capacity(count.min(1024));
        self.parse_map_entries(&mut entries, count)?;
        self.depth -= 1;

        self.expect_close("array", count)?;
        Ok(PhpValue::Map(entries))
    }

    /// Parse a null value: `N;`
    pub(crate) fn parse_null(&mut self) -> Result<PhpValue<'a>> {
        self.expect_byte(b'N')?;
        self.expect_byte(b';')?;
        Ok(PhpValue::Null)
    }

    /// Parse a boolean value: `b:0;` or `b:1;`
    pub(crate) fn read_bool(&mut self) -> Result<bool> {
        self.expect_byte(b'b')?;
        self.expect_byte(b':')?;

        let value_pos = self.pos;
        let value_byte = self.read_byte()?;
        let value = match value_byte {
            b'0' => false,
            b'1' => true,
            _ => {
                return Err(PhpSerializeError::new(
                    ErrorKind::MalformedLiteral {
                        expected: "'0' or '1'".into(),
                        found: describe_byte(value_byte),
                    },
                    self.pos - 1,
                )
                .with_input_preview(self.data, value_pos))
            }
        };

        self.expect_byte(b';')?;
        Ok(value)
    }

    /// Parse an integer value: `i:<value>;`
    pub(crate) fn read_int(&mut self) -> Result<i64> {
        self.expect_byte(b'i')?;
        self.expect_byte(b':')?;
        self.skip_insignificant();

        let start = self.pos;
        let mut end = start;
        if matches!(self.data.get(end), Some(b'-' | b'+')) {
            end += 1;
        }
        let digits_start = end;
        while matches!(self.data.get(end), Some(b) if b.is_ascii_digit()) {
            end += 1;
        }

        if end == digits_start {
            return Err(self.malformed_at("an integer", end));
        }

        // The slice is ASCII sign + digits, so from_utf8 cannot fail here.
        let literal = std::str::from_utf8(&self.data[start..end]).unwrap_or_default();
        let value: i64 = literal.parse().map_err(|_| {
            PhpSerializeError::new(
                ErrorKind::ConversionError {
                    value: literal.to_string(),
                    target: "i64".into(),
                },
                start,
            )
        })?;

        self.pos = end;
        self.expect_byte(b';')?;
        Ok(value)
    }

    /// Parse a float/double value: `d:<value>;`
    pub(crate) fn read_float(&mut self) -> Result<f64> {
        self.expect_byte(b'd')?;
        self.expect_byte(b':')?;
        self.skip_insignificant();

        let start = self.pos;
        let literal = trim_insignificant_end(self.read_until(b';')?);

        let float_str = std::str::from_utf8(literal)
            .ok()
            .filter(|s| is_float_literal(s))
            .ok_or_else(|| {
                PhpSerializeError::new(
                    ErrorKind::MalformedLiteral {
                        expected: "a float literal".into(),
                        found: String::from_utf8_lossy(literal).into_owned(),
                    },
                    start,
                )
                .with_input_preview(self.data, start)
            })?;

        // Handle special PHP float values
        let float_value: f64 = match float_str {
            "INF" => f64::INFINITY,
            "-INF" => f64::NEG_INFINITY,
            "NAN" => f64::NAN,
            _ => float_str.parse().map_err(|_| {
                PhpSerializeError::new(
                    ErrorKind::MalformedLiteral {
                        expected: "a float literal".into(),
                        found: float_str.to_string(),
                    },
                    start,
                )
            })?,
        };

        self.expect_byte(b';')?;
        Ok(float_value)
    }

    /// Parse a string value: `s:<len>:"<data>";`
    ///
    /// The length is a byte count. A payload that is shorter or longer than
    /// declared is a [`ErrorKind::LengthMismatch`].
    pub(crate) fn read_string(&mut self) -> Result<Cow<'a, [u8]>> {
        self.read_string_slice().map(Cow::Borrowed)
    }

    fn read_string_slice(&mut self) -> Result<&'a [u8]> {
        self.expect_byte(b's')?;
        self.expect_byte(b':')?;

        let len = self.read_length("string length")?;

        self.expect_byte(b':')?;
        self.expect_byte(b'"')?;

        let payload = self.read_payload("string", len)?;
        self.expect_byte(b';')?;

        Ok(if self.config.trim_string_quotes {
            trim_quotes(payload)
        } else {
            payload
        })
    }

    /// Read a string and require it to be UTF-8.
    pub(crate) fn read_text(&mut self) -> Result<Cow<'a, str>> {
        let pos = self.pos;
        let bytes = self.read_string_slice()?;
        std::str::from_utf8(bytes)
            .map(Cow::Borrowed)
            .map_err(|_| PhpSerializeError::new(ErrorKind::InvalidUtf8, pos))
    }

    /// Parse an array value: `a:<count>:{<key><value>...}`
    ///
    /// Every entry is read once. When the list hypothesis fails part way
    /// through, the entries read so far carry over as map entries and the
    /// rest of the array is read as a map.
    fn parse_array(&mut self) -> Result<PhpValue<'a>> {
        let count = self.read_array_header()?;

        self.depth += 1;
        let (pairs, fault) = self.parse_list_entries(count)?;
        let value = match fault {
            None if pairs.iter().enumerate().all(|(i, (key, _))| *key == i as i64) => {
                PhpValue::List(pairs.into_iter().map(|(_, v)| v).collect())
            }
            None => PhpValue::Map(int_entries(pairs)),
            Some(ListFault::StringKey) => {
                let mut entries = int_entries(pairs);
                self.parse_map_entries(&mut entries, count)?;
                PhpValue::Map(entries)
            }
            Some(ListFault::OutOfRange { key, position }) => {
                #[cfg(feature = "tracing")]
                warn!(key, count, pos = position, "Array index out of range, reading the rest as map");

                let mut entries = int_entries(pairs);
                let value = self.parse_value()?;
                entries.push((ArrayKey::Int(key), value));
                self.parse_map_entries(&mut entries, count)?;
                if !self.config.recover_malformed_arrays {
                    self.expect_close("array", count)?;
                    return Err(PhpSerializeError::new(
                        ErrorKind::MalformedArray(format!(
                            "index {} is out of range for {} entries",
                            key, count
                        )),
                        position,
                    )
                    .with_input_preview(self.data, position));
                }
                PhpValue::Map(entries)
            }
        };
        self.depth -= 1;

        self.expect_close("array", count)?;
        Ok(value)
    }

    /// Read entries under the list hypothesis until one breaks it.
    ///
    /// On [`ListFault::OutOfRange`] the offending key has been consumed and
    /// its value has not.
    fn parse_list_entries(
        &mut self,
        count: usize,
    ) -> Result<(Vec<(i64, PhpValue<'a>)>, Option<ListFault>)> {
        let mut pairs = Vec::with_capacity(count.min(1024)); // Cap initial allocation

        for found in 0..count {
            self.check_entry("array", count, found)?;
            let key_pos = self.pos;
            if self.peek_byte()? != b'i' {
                return Ok((pairs, Some(ListFault::StringKey)));
            }
            let key = self.read_int()?;
            if key < 0 || key as u64 >= count as u64 {
                let fault = ListFault::OutOfRange {
                    key,
                    position: key_pos,
                };
                return Ok((pairs, Some(fault)));
            }
            let value = self.parse_value()?;
            pairs.push((key, value));
        }

        Ok((pairs, None))
    }

    /// Read key/value entries into `entries` until it holds `count`.
    fn parse_map_entries(
        &mut self,
        entries: &mut Vec<(ArrayKey<'a>, PhpValue<'a>)>,
        count: usize,
    ) -> Result<()> {
        for found in entries.len()..count {
            self.check_entry("array", count, found)?;
            let key = self.read_array_key()?;
            let value = self.parse_value()?;
            entries.push((key, value));
        }

        Ok(())
    }

    /// Read an array key, which is either an integer or a string production.
    pub(crate) fn read_array_key(&mut self) -> Result<ArrayKey<'a>> {
        match self.peek_byte()? {
            b'i' => self.read_int().map(ArrayKey::Int),
            b's' => self.read_string().map(ArrayKey::String),
            other => Err(PhpSerializeError::new(
                ErrorKind::MalformedLiteral {
                    expected: "an integer or string key".into(),
                    found: describe_byte(other),
                },
                self.pos,
            )
            .with_input_preview(self.data, self.pos)),
        }
    }

    /// Parse an object value: `O:<namelen>:"<name>":<count>:{<prop>...}`
    fn parse_object(&mut self) -> Result<PhpValue<'a>> {
        let (class_name, count) = self.read_object_header()?;

        self.depth += 1;
        let mut properties = Vec::with_capacity(count.min(1024));

        for found in 0..count {
            self.check_entry("object", count, found)?;
            let (name, visibility, declaring_class) = self.read_property_name()?;
            let value = self.parse_value()?;
            properties.push(PhpProperty {
                name,
                visibility,
                declaring_class,
                value,
            });
        }

        self.depth -= 1;
        self.expect_close("object", count)?;

        Ok(PhpValue::Object {
            class_name,
            properties,
        })
    }

    /// Read `a:<count>:{` and return the declared entry count.
    pub(crate) fn read_array_header(&mut self) -> Result<usize> {
        self.expect_byte(b'a')?;
        self.expect_byte(b':')?;
        let count = self.read_length("array length")?;
        self.expect_byte(b':')?;
        self.expect_byte(b'{')?;
        Ok(count)
    }

    /// Read `O:<len>:"<name>":<count>:{` and return the class name and field count.
    pub(crate) fn read_object_header(&mut self) -> Result<(Cow<'a, str>, usize)> {
        self.expect_byte(b'O')?;
        self.expect_byte(b':')?;

        let name_len = self.read_length("class name length")?;
        self.expect_byte(b':')?;
        self.expect_byte(b'"')?;

        let name_pos = self.pos;
        let name_bytes = self.read_payload("class name", name_len)?;
        let class_name = std::str::from_utf8(name_bytes)
            .map_err(|_| PhpSerializeError::new(ErrorKind::InvalidUtf8, name_pos))?;

        self.expect_byte(b':')?;
        let count = self.read_length("property count")?;
        self.expect_byte(b':')?;
        self.expect_byte(b'{')?;

        Ok((Cow::Borrowed(class_name), count))
    }

    /// Read an object property name and split off PHP's visibility mangling.
    pub(crate) fn read_property_name(
        &mut self,
    ) -> Result<(Cow<'a, str>, Visibility, Option<Cow<'a, str>>)> {
        let pos = self.pos;
        let tag = self.peek_byte()?;
        if tag != b's' {
            return Err(PhpSerializeError::new(
                ErrorKind::MalformedLiteral {
                    expected: "a string property name".into(),
                    found: describe_byte(tag),
                },
                pos,
            )
            .with_input_preview(self.data, pos));
        }

        let bytes = self.read_string_slice()?;
        split_property_name(bytes).ok_or_else(|| PhpSerializeError::new(ErrorKind::InvalidUtf8, pos))
    }

    /// Require that entry number `found` of a `count`-entry container exists.
    pub(crate) fn check_entry(&mut self, what: &'static str, count: usize, found: usize) -> Result<()> {
        if self.peek_byte()? == b'}' {
            return Err(PhpSerializeError::new(
                ErrorKind::LengthMismatch {
                    what,
                    expected: count,
                    found,
                },
                self.pos,
            )
            .with_input_preview(self.data, self.pos));
        }
        Ok(())
    }

    /// Consume the closing `}` of a container that declared `count` entries.
    pub(crate) fn expect_close(&mut self, what: &'static str, count: usize) -> Result<()> {
        let pos = self.pos;
        match self.peek_byte()? {
            b'}' => {
                self.read_byte()?;
                Ok(())
            }
            b'i' | b's' | b'N' | b'b' | b'd' | b'a' | b'O' => Err(PhpSerializeError::new(
                ErrorKind::LengthMismatch {
                    what,
                    expected: count,
                    found: count + 1,
                },
                pos,
            )
            .with_context("entries continue past the declared count")
            .with_input_preview(self.data, pos)),
            other => Err(PhpSerializeError::new(
                ErrorKind::MalformedLiteral {
                    expected: "'}'".into(),
                    found: describe_byte(other),
                },
                pos,
            )
            .with_input_preview(self.data, pos)),
        }
    }

    /// Fail with [`ErrorKind::MaxDepthExceeded`] once nesting is too deep.
    pub(crate) fn check_depth(&self) -> Result<()> {
        if self.depth > self.config.max_depth {
            #[cfg(feature = "tracing")]
            warn!(depth = self.depth, max_depth = self.config.max_depth, "Max depth exceeded");
            return Err(PhpSerializeError::new(
                ErrorKind::MaxDepthExceeded(self.config.max_depth),
                self.pos,
            ));
        }
        Ok(())
    }

    /// Enter a nested container.
    #[inline]
    pub(crate) fn enter(&mut self) {
        self.depth += 1;
    }

    /// Leave a nested container.
    #[inline]
    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }

    // Helper methods - marked #[inline] for performance on hot paths

    /// Skip bytes `<= 0x20`.
    #[inline(always)]
    fn skip_insignificant(&mut self) {
        while matches!(self.data.get(self.pos), Some(&b) if b <= 0x20) {
            self.pos += 1;
        }
    }

    /// Peek at the next significant byte without consuming it.
    #[inline(always)]
    pub(crate) fn peek_byte(&mut self) -> Result<u8> {
        self.skip_insignificant();
        self.data
            .get(self.pos)
            .copied()
            .ok_or_else(|| PhpSerializeError::new(ErrorKind::UnexpectedEof, self.pos))
    }

    /// Read and consume the next significant byte.
    #[inline(always)]
    fn read_byte(&mut self) -> Result<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        Ok(byte)
    }

    /// Expect a specific byte, returning an error if it doesn't match.
    #[inline]
    fn expect_byte(&mut self, expected: u8) -> Result<()> {
        let byte = self.read_byte()?;
        if byte != expected {
            return Err(self.make_unexpected_char_error(expected, byte));
        }
        Ok(())
    }

    /// Create an unexpected character error with proper context.
    #[cold]
    #[inline(never)]
    fn make_unexpected_char_error(&self, expected: u8, found: u8) -> PhpSerializeError {
        PhpSerializeError::new(
            ErrorKind::MalformedLiteral {
                expected: describe_byte(expected),
                found: describe_byte(found),
            },
            self.pos - 1,
        )
        .with_input_preview(self.data, self.pos.saturating_sub(1))
    }

    /// Build an error at `pos` with an input preview.
    #[cold]
    #[inline(never)]
    pub(crate) fn error_at(&self, kind: ErrorKind, pos: usize) -> PhpSerializeError {
        PhpSerializeError::new(kind, pos).with_input_preview(self.data, pos)
    }

    /// Pin a detached error to `pos`. Errors that already carry a position
    /// are returned unchanged.
    #[cold]
    #[inline(never)]
    pub(crate) fn locate(&self, err: PhpSerializeError, pos: usize) -> PhpSerializeError {
        if err.position.is_some() {
            return err;
        }
        err.with_position(pos).with_input_preview(self.data, pos)
    }

    /// Create an error for a byte that starts no known production.
    #[cold]
    #[inline(never)]
    pub(crate) fn unexpected_token(&self, found: u8) -> PhpSerializeError {
        #[cfg(feature = "tracing")]
        warn!(type_byte = %char::from(found), pos = self.pos, "Unknown type marker");
        PhpSerializeError::new(ErrorKind::UnexpectedToken(found as char), self.pos)
            .with_input_preview(self.data, self.pos)
    }

    #[cold]
    #[inline(never)]
    fn malformed_at(&self, expected: &str, pos: usize) -> PhpSerializeError {
        let found = self
            .data
            .get(pos)
            .map_or_else(|| "end of input".to_string(), |&b| describe_byte(b));
        PhpSerializeError::new(
            ErrorKind::MalformedLiteral {
                expected: expected.to_string(),
                found,
            },
            pos,
        )
        .with_input_preview(self.data, pos)
    }

    /// Read a non-negative decimal length or count.
    fn read_length(&mut self, what: &str) -> Result<usize> {
        self.skip_insignificant();
        let start = self.pos;
        let mut end = start;
        while matches!(self.data.get(end), Some(b) if b.is_ascii_digit()) {
            end += 1;
        }
        if end == start {
            return Err(self.malformed_at(what, start));
        }

        let digits = std::str::from_utf8(&self.data[start..end]).unwrap_or_default();
        let value = digits.parse().map_err(|_| {
            PhpSerializeError::new(
                ErrorKind::ConversionError {
                    value: digits.to_string(),
                    target: "usize".into(),
                },
                start,
            )
        })?;
        self.pos = end;
        Ok(value)
    }

    /// Read exactly `len` raw bytes followed by a raw closing `"`.
    fn read_payload(&mut self, what: &'static str, len: usize) -> Result<&'a [u8]> {
        let start = self.pos;
        let end = start.checked_add(len);
        match end {
            Some(end) if self.data.get(end) == Some(&b'"') => {
                self.pos = end + 1;
                Ok(&self.data[start..end])
            }
            _ => Err(PhpSerializeError::new(
                ErrorKind::LengthMismatch {
                    what,
                    expected: len,
                    found: payload_length(&self.data[start..]),
                },
                start,
            )
            .with_input_preview(self.data, start)),
        }
    }

    /// Read bytes until the delimiter, using SIMD-accelerated search.
    #[inline]
    fn read_until(&mut self, delimiter: u8) -> Result<&'a [u8]> {
        let start = self.pos;
        match memchr(delimiter, &self.data[start..]) {
            Some(offset) => {
                let result = &self.data[start..start + offset];
                self.pos = start + offset;
                Ok(result)
            }
            None => Err(self.make_delimiter_not_found_error(delimiter)),
        }
    }

    /// Create a delimiter not found error with proper context.
    #[cold]
    #[inline(never)]
    fn make_delimiter_not_found_error(&self, delimiter: u8) -> PhpSerializeError {
        PhpSerializeError::new(
            ErrorKind::MalformedLiteral {
                expected: describe_byte(delimiter),
                found: "end of input".into(),
            },
            self.data.len(),
        )
        .with_input_preview(self.data, self.pos)
    }
}

/// Length of the payload actually present before its `";` terminator.
///
/// Falls back to the number of remaining bytes when no terminator exists.
fn payload_length(rest: &[u8]) -> usize {
    let mut search = 0;
    while let Some(offset) = memchr(b'"', &rest[search..]) {
        let quote = search + offset;
        if rest.get(quote + 1) == Some(&b';') {
            return quote;
        }
        search = quote + 1;
    }
    rest.len()
}

fn int_entries(pairs: Vec<(i64, PhpValue<'_>)>) -> Vec<(ArrayKey<'_>, PhpValue<'_>)> {
    pairs.into_iter().map(|(k, v)| (ArrayKey::Int(k), v)).collect()
}

fn trim_insignificant_end(mut literal: &[u8]) -> &[u8] {
    while let [rest @ .., last] = literal {
        if *last > 0x20 {
            break;
        }
        literal = rest;
    }
    literal
}

fn trim_quotes(mut payload: &[u8]) -> &[u8] {
    while let [b'"', rest @ ..] = payload {
        payload = rest;
    }
    while let [rest @ .., b'"'] = payload {
        payload = rest;
    }
    payload
}

/// Sign, digits, at most one `.`, an optional exponent, or PHP's INF/NAN.
fn is_float_literal(s: &str) -> bool {
    if matches!(s, "INF" | "-INF" | "NAN") {
        return true;
    }
    let body = s.strip_prefix(['-', '+']).unwrap_or(s);
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(idx) => (&body[..idx], Some(&body[idx + 1..])),
        None => (body, None),
    };

    let mut dots = 0;
    let mut digits = 0;
    for b in mantissa.bytes() {
        match b {
            b'.' => dots += 1,
            b'0'..=b'9' => digits += 1,
            _ => return false,
        }
    }
    if dots > 1 || digits == 0 {
        return false;
    }

    match exponent {
        None => true,
        Some(exp) => {
            let exp = exp.strip_prefix(['-', '+']).unwrap_or(exp);
            !exp.is_empty() && exp.bytes().all(|b| b.is_ascii_digit())
        }
    }
}

fn describe_byte(byte: u8) -> String {
    if byte.is_ascii_graphic() {
        format!("'{}'", byte as char)
    } else {
        format!("byte 0x{:02x}", byte)
    }
}

/// Split a property name into name, visibility and declaring class.
///
/// Private: `\0ClassName\0propName`, protected: `\0*\0propName`,
/// public: `propName`. Returns `None` when the name is not UTF-8.
fn split_property_name(name: &[u8]) -> Option<(Cow<'_, str>, Visibility, Option<Cow<'_, str>>)> {
    if let [0, rest @ ..] = name {
        if let Some(second_null) = memchr(0, rest) {
            let prefix = std::str::from_utf8(&rest[..second_null]).ok()?;
            let actual_name = std::str::from_utf8(&rest[second_null + 1..]).ok()?;

            return Some(if prefix == "*" {
                (Cow::Borrowed(actual_name), Visibility::Protected, None)
            } else {
                (
                    Cow::Borrowed(actual_name),
                    Visibility::Private,
                    Some(Cow::Borrowed(prefix)),
                )
            });
        }
    }

    // Public property, or a malformed prefix kept verbatim
    std::str::from_utf8(name)
        .ok()
        .map(|n| (Cow::Borrowed(n), Visibility::Public, None))
}

/// Parse PHP serialized data from bytes.
///
/// This is the primary API for untyped decoding.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes, PhpValue};
///
/// let value = from_bytes(b"a:3:{i:0;i:10;i:1;i:20;i:2;i:30;}").unwrap();
/// assert_eq!(
///     value,
///     PhpValue::List(vec![PhpValue::Int(10), PhpValue::Int(20), PhpValue::Int(30)])
/// );
/// ```
#[inline]
pub fn from_bytes(data: &[u8]) -> Result<PhpValue<'_>> {
    #[cfg(feature = "tracing")]
    trace!(data_len = data.len(), "from_bytes called");

    let mut parser = Parser::new(data);
    parser.parse()
}

/// Parse PHP serialized data from bytes with custom configuration.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes_with_config, ParserConfig};
///
/// let config = ParserConfig {
///     recover_malformed_arrays: true,
///     ..Default::default()
/// };
/// let value = from_bytes_with_config(b"a:2:{i:0;i:1;i:5;i:2;}", config).unwrap();
/// assert!(value.is_map());
/// ```
#[inline]
pub fn from_bytes_with_config(data: &[u8], config: ParserConfig) -> Result<PhpValue<'_>> {
    #[cfg(feature = "tracing")]
    trace!(data_len = data.len(), ?config, "from_bytes_with_config called");

    let mut parser = Parser::with_config(data, config);
    parser.parse()
}

/// Parse a serialized array as an associative map, skipping list detection.
///
/// # Example
///
/// ```rust
/// use php_serialize_core::{from_bytes_assoc, ArrayKey, PhpValue};
///
/// let value = from_bytes_assoc(b"a:1:{i:0;s:1:\"a\";}").unwrap();
/// assert_eq!(value.as_map().unwrap()[0].0, ArrayKey::Int(0));
/// ```
#[inline]
pub fn from_bytes_assoc(data: &[u8]) -> Result<PhpValue<'_>> {
    let mut parser = Parser::new(data);
    parser.parse_assoc_array()
}

#[cfg(test)]
#[allow(clippy::approx_constant)]
mod tests {
    use super::*;

    fn bytes(s: &str) -> PhpValue<'_> {
        PhpValue::String(Cow::Borrowed(s.as_bytes()))
    }

    #[test]
    fn test_null() {
        let result = from_bytes(b"N;").unwrap();
        assert_eq!(result, PhpValue::Null);
    }

    #[test]
    fn test_bool() {
        assert_eq!(from_bytes(b"b:0;").unwrap(), PhpValue::Bool(false));
        assert_eq!(from_bytes(b"b:1;").unwrap(), PhpValue::Bool(true));
        let err = from_bytes(b"b:2;").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedLiteral { .. }));
        assert_eq!(err.position, Some(2));
    }

    #[test]
    fn test_int() {
        assert_eq!(from_bytes(b"i:0;").unwrap(), PhpValue::Int(0));
        assert_eq!(from_bytes(b"i:42;").unwrap(), PhpValue::Int(42));
        assert_eq!(from_bytes(b"i:-123;").unwrap(), PhpValue::Int(-123));
        assert_eq!(from_bytes(b"i:+7;").unwrap(), PhpValue::Int(7));
        assert_eq!(
            from_bytes(b"i:9223372036854775807;").unwrap(),
            PhpValue::Int(i64::MAX)
        );
    }

    #[test]
    fn test_int_overflow_is_conversion_error() {
        let err = from_bytes(b"i:9223372036854775808;").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::ConversionError { .. }));
    }

    #[test]
    fn test_float() {
        assert_eq!(from_bytes(b"d:0;").unwrap(), PhpValue::Float(0.0));
        assert_eq!(from_bytes(b"d:3.14;").unwrap(), PhpValue::Float(3.14));
        assert_eq!(from_bytes(b"d:-2.5;").unwrap(), PhpValue::Float(-2.5));
        assert_eq!(from_bytes(b"d:1.0E+25;").unwrap(), PhpValue::Float(1.0e25));
        assert!(matches!(from_bytes(b"d:INF;").unwrap(), PhpValue::Float(f) if f.is_infinite() && f.is_sign_positive()));
        assert!(matches!(from_bytes(b"d:-INF;").unwrap(), PhpValue::Float(f) if f.is_infinite() && f.is_sign_negative()));
        assert!(matches!(from_bytes(b"d:NAN;").unwrap(), PhpValue::Float(f) if f.is_nan()));
    }

    #[test]
    fn test_whitespace_before_terminator() {
        assert_eq!(from_bytes(b"d:1.5 ;").unwrap(), PhpValue::Float(1.5));
        assert_eq!(from_bytes(b"d:\t-2\n;").unwrap(), PhpValue::Float(-2.0));
        assert_eq!(from_bytes(b"i:1 ;").unwrap(), PhpValue::Int(1));
    }

    #[test]
    fn test_float_rejects_two_decimal_points() {
        let err = from_bytes(b"d:1.2.3;").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedLiteral { .. }));
        assert!(from_bytes(b"d:inf;").is_err());
    }

    #[test]
    fn test_string() {
        assert_eq!(from_bytes(b"s:0:\"\";").unwrap(), bytes(""));
        assert_eq!(from_bytes(b"s:5:\"hello\";").unwrap(), bytes("hello"));
    }

    #[test]
    fn test_string_byte_length_is_utf8() {
        let result = from_bytes("s:6:\"héllo\";".as_bytes()).unwrap();
        assert_eq!(result.as_str(), Some("héllo"));
        assert_eq!(result.byte_len(), Some(6));

        // Character count instead of byte count is rejected
        let err = from_bytes("s:5:\"héllo\";".as_bytes()).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::LengthMismatch { what: "string", expected: 5, found: 6 }
        ));
    }

    #[test]
    fn test_string_korean() {
        // "한글" = 6 bytes in UTF-8
        let korean = b"s:6:\"\xed\x95\x9c\xea\xb8\x80\";";
        let result = from_bytes(korean).unwrap();
        assert_eq!(result.as_str(), Some("한글"));
    }

    #[test]
    fn test_truncated_string_is_length_mismatch() {
        let err = from_bytes(b"s:10:\"abc\";").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::LengthMismatch {
                what: "string",
                expected: 10,
                found: 3
            }
        );
        assert_eq!(err.position, Some(6));
    }

    #[test]
    fn test_unterminated_string() {
        let err = from_bytes(b"s:10:\"hello").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::LengthMismatch {
                what: "string",
                expected: 10,
                found: 5
            }
        );
    }

    #[test]
    fn test_string_with_semicolon() {
        let result = from_bytes(b"s:11:\"hello;world\";").unwrap();
        assert_eq!(result.as_str(), Some("hello;world"));
    }

    #[test]
    fn test_string_with_quotes() {
        // PHP uses length-based strings, no escape needed
        let result = from_bytes(b"s:8:\"say \"hi\"\";").unwrap();
        assert_eq!(result.as_str(), Some("say \"hi\""));
    }

    #[test]
    fn test_trim_string_quotes() {
        let config = ParserConfig {
            trim_string_quotes: true,
            ..Default::default()
        };
        let result = from_bytes_with_config(b"s:8:\"say \"hi\"\";", config).unwrap();
        assert_eq!(result.as_str(), Some("say \"hi"));
    }

    #[test]
    fn test_special_string_binary() {
        let data = b"s:5:\"a\x00b\x00c\";";
        let result = from_bytes(data).unwrap();
        assert_eq!(result.as_bytes(), Some(b"a\x00b\x00c".as_slice()));
    }

    #[test]
    fn test_whitespace_between_tokens() {
        let data = b"a:2:{\n  i:0; s:1:\"a\";\n  i:1; N;\n}";
        let result = from_bytes(data).unwrap();
        assert_eq!(result, PhpValue::List(vec![bytes("a"), PhpValue::Null]));
    }

    #[test]
    fn test_array_empty() {
        assert_eq!(from_bytes(b"a:0:{}").unwrap(), PhpValue::List(vec![]));
    }

    #[test]
    fn test_array_list() {
        let result = from_bytes(b"a:3:{i:0;i:10;i:1;i:20;i:2;i:30;}").unwrap();
        assert_eq!(
            result,
            PhpValue::List(vec![PhpValue::Int(10), PhpValue::Int(20), PhpValue::Int(30)])
        );
    }

    #[test]
    fn test_array_string_keys_is_map() {
        let result = from_bytes(b"a:2:{s:1:\"x\";i:1;s:1:\"y\";i:2;}").unwrap();
        assert_eq!(
            result,
            PhpValue::Map(vec![
                (ArrayKey::from("x"), PhpValue::Int(1)),
                (ArrayKey::from("y"), PhpValue::Int(2)),
            ])
        );
    }

    #[test]
    fn test_array_out_of_range_index_is_malformed() {
        let err = from_bytes(b"a:2:{i:0;i:1;i:5;i:2;}").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedArray(_)));
        assert_eq!(err.position, Some(13));

        let err = from_bytes(b"a:1:{i:-1;i:1;}").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedArray(_)));
    }

    #[test]
    fn test_array_out_of_range_index_recovered() {
        let config = ParserConfig {
            recover_malformed_arrays: true,
            ..Default::default()
        };
        let result = from_bytes_with_config(b"a:2:{i:0;i:1;i:5;i:2;}", config).unwrap();
        assert_eq!(
            result,
            PhpValue::Map(vec![
                (ArrayKey::Int(0), PhpValue::Int(1)),
                (ArrayKey::Int(5), PhpValue::Int(2)),
            ])
        );
    }

    #[test]
    fn test_array_malformed_inside_container_consumes_stream() {
        // The nested error is reported, not a resynchronization failure
        let err = from_bytes(b"a:1:{s:1:\"k\";a:1:{i:3;N;}}").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedArray(_)));
    }

    #[test]
    fn test_array_unordered_indices_is_map() {
        let result = from_bytes(b"a:2:{i:1;s:1:\"b\";i:0;s:1:\"a\";}").unwrap();
        assert_eq!(
            result,
            PhpValue::Map(vec![
                (ArrayKey::Int(1), bytes("b")),
                (ArrayKey::Int(0), bytes("a")),
            ])
        );
    }

    #[test]
    fn test_array_mixed_keys_is_map() {
        let result = from_bytes(b"a:2:{i:0;s:1:\"a\";s:1:\"k\";s:1:\"b\";}").unwrap();
        assert_eq!(
            result,
            PhpValue::Map(vec![
                (ArrayKey::Int(0), bytes("a")),
                (ArrayKey::from("k"), bytes("b")),
            ])
        );
    }

    fn nest(depth: usize, wrap: impl Fn(&str) -> String) -> Vec<u8> {
        let mut data = "N;".to_string();
        for _ in 0..depth {
            data = wrap(&data);
        }
        data.into_bytes()
    }

    fn map_depth(mut value: &PhpValue<'_>) -> usize {
        let mut depth = 0;
        while let PhpValue::Map(entries) = value {
            assert_eq!(entries[0].0, ArrayKey::Int(0));
            value = &entries[0].1;
            depth += 1;
        }
        depth
    }

    #[test]
    fn test_nested_mixed_keys_read_each_entry_once() {
        let data = nest(40, |inner| format!("a:2:{{i:0;{}s:1:\"k\";N;}}", inner));
        let result = from_bytes(&data).unwrap();
        assert_eq!(map_depth(&result), 40);
    }

    #[test]
    fn test_nested_out_of_range_recovery_reads_each_entry_once() {
        let config = ParserConfig {
            recover_malformed_arrays: true,
            ..Default::default()
        };
        let data = nest(40, |inner| format!("a:2:{{i:0;{}i:5;N;}}", inner));
        let result = from_bytes_with_config(&data, config).unwrap();
        assert_eq!(map_depth(&result), 40);

        let err = from_bytes(&data).unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedArray(_)));
    }

    #[test]
    fn test_assoc_array_keeps_integer_keys() {
        let result = from_bytes_assoc(b"a:2:{i:0;i:10;i:1;i:20;}").unwrap();
        assert_eq!(
            result,
            PhpValue::Map(vec![
                (ArrayKey::Int(0), PhpValue::Int(10)),
                (ArrayKey::Int(1), PhpValue::Int(20)),
            ])
        );
    }

    #[test]
    fn test_array_count_mismatch() {
        let err = from_bytes(b"a:3:{i:0;i:1;}").unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::LengthMismatch {
                what: "array",
                expected: 3,
                found: 1
            }
        );

        let err = from_bytes(b"a:1:{i:0;i:1;i:1;i:2;}").unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::LengthMismatch { what: "array", expected: 1, .. }
        ));
    }

    #[test]
    fn test_object() {
        let data = br#"O:8:"stdClass":2:{s:4:"name";s:5:"Alice";s:3:"age";i:30;}"#;
        let result = from_bytes(data).unwrap();
        assert_eq!(result.class_name(), Some("stdClass"));
        let properties = result.properties().unwrap();
        assert_eq!(properties.len(), 2);
        assert_eq!(properties[0].name.as_ref(), "name");
        assert_eq!(properties[0].visibility, Visibility::Public);
        assert_eq!(result.get("age"), Some(&PhpValue::Int(30)));
    }

    #[test]
    fn test_object_private_protected() {
        // Private: \0ClassName\0propName  (\0Test\0priv = 10 bytes: 1+4+1+4)
        // Protected: \0*\0propName  (\0*\0prot = 7 bytes: 1+1+1+4)
        let data = b"O:4:\"Test\":3:{s:3:\"pub\";s:6:\"public\";s:10:\"\x00Test\x00priv\";s:7:\"private\";s:7:\"\x00*\x00prot\";s:9:\"protected\";}";
        let result = from_bytes(data).unwrap();
        let properties = result.properties().unwrap();

        assert_eq!(properties[0].name.as_ref(), "pub");
        assert_eq!(properties[0].visibility, Visibility::Public);

        assert_eq!(properties[1].name.as_ref(), "priv");
        assert_eq!(properties[1].visibility, Visibility::Private);
        assert_eq!(properties[1].declaring_class.as_deref(), Some("Test"));

        assert_eq!(properties[2].name.as_ref(), "prot");
        assert_eq!(properties[2].visibility, Visibility::Protected);
    }

    #[test]
    fn test_object_field_count_mismatch() {
        let err = from_bytes(br#"O:3:"Foo":2:{s:1:"a";i:1;}"#).unwrap_err();
        assert_eq!(
            err.kind,
            ErrorKind::LengthMismatch {
                what: "object",
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_object_class_name_length_mismatch() {
        let err = from_bytes(br#"O:5:"Foo":0:{}"#).unwrap_err();
        assert!(matches!(
            err.kind,
            ErrorKind::LengthMismatch { what: "class name", expected: 5, .. }
        ));
    }

    #[test]
    fn test_nested_array_depth() {
        let mut data = String::from("s:4:\"leaf\";");
        for _ in 0..100 {
            data = format!("a:1:{{s:1:\"k\";{}}}", data);
        }
        let result = from_bytes(data.as_bytes()).unwrap();
        assert!(result.is_map());
    }

    #[test]
    fn test_max_depth_exceeded() {
        let mut data = String::from("N;");
        for _ in 0..10 {
            data = format!("a:1:{{i:0;{}}}", data);
        }
        let config = ParserConfig {
            max_depth: 4,
            ..Default::default()
        };
        let err = from_bytes_with_config(data.as_bytes(), config).unwrap_err();
        assert_eq!(err.kind, ErrorKind::MaxDepthExceeded(4));
    }

    #[test]
    fn test_error_invalid_type() {
        let err = from_bytes(b"X:1;").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedToken('X'));
        assert_eq!(err.position, Some(0));
    }

    #[test]
    fn test_unsupported_php_tags_are_unexpected_tokens() {
        for data in [&b"R:1;"[..], b"E:13:\"Status:Active\";", b"C:1:\"A\":0:{}"] {
            let err = from_bytes(data).unwrap_err();
            assert!(matches!(err.kind, ErrorKind::UnexpectedToken(_)));
        }
    }

    #[test]
    fn test_error_invalid_int() {
        let err = from_bytes(b"i:abc;").unwrap_err();
        assert!(matches!(err.kind, ErrorKind::MalformedLiteral { .. }));
    }

    #[test]
    fn test_empty_input() {
        let err = from_bytes(b"  ").unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnexpectedEof);
    }
}
