// SPDX-License-Identifier: Apache-2.0

//! The callback interface between the parser and its user.

#[cfg(feature = "alloc")]
use alloc::borrow::Cow;
#[cfg(feature = "alloc")]
use alloc::string::String;

use crate::escape_processor::{self, EscapeError};
use crate::ParseError;

/// A string as it appears in the input: raw bytes between the quotes, escapes intact.
///
/// Holds the byte offsets of the content within the original input, end exclusive.
/// Nothing is copied or decoded until asked for.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct JsonStr<'a> {
    raw: &'a [u8],
    start: usize,
    end: usize,
}

impl<'a> JsonStr<'a> {
    pub(crate) fn new(raw: &'a [u8], start: usize, end: usize) -> Self {
        Self { raw, start, end }
    }

    /// The raw, still escaped bytes.
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    /// Offset of the first content byte in the input.
    pub fn start(&self) -> usize {
        self.start
    }

    /// Offset one past the last content byte in the input.
    pub fn end(&self) -> usize {
        self.end
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Whether decoding would change anything.
    pub fn has_escapes(&self) -> bool {
        self.raw.contains(&b'\\')
    }

    /// The raw bytes as `str`, escapes intact.
    pub fn as_raw_str(&self) -> Result<&'a str, core::str::Utf8Error> {
        core::str::from_utf8(self.raw)
    }

    /// Decodes escapes into `out`, returning the decoded length.
    ///
    /// `out` never needs more than [`JsonStr::len`] bytes.
    pub fn decode_into(&self, out: &mut [u8]) -> Result<usize, EscapeError> {
        escape_processor::unescape(self.raw, out)
    }

    /// Decoded content, borrowed from the input when there is nothing to decode.
    #[cfg(feature = "alloc")]
    pub fn unescaped(&self) -> Result<Cow<'a, str>, EscapeError> {
        if !self.has_escapes() {
            return self
                .as_raw_str()
                .map(Cow::Borrowed)
                .map_err(|_| EscapeError::InvalidUtf8);
        }
        let mut buf = self.raw.to_vec();
        let len = escape_processor::unescape_in_place(&mut buf)?;
        buf.truncate(len);
        String::from_utf8(buf)
            .map(Cow::Owned)
            .map_err(|_| EscapeError::InvalidUtf8)
    }
}

impl PartialEq<str> for JsonStr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.raw == other.as_bytes()
    }
}

impl PartialEq<&str> for JsonStr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.raw == other.as_bytes()
    }
}

impl core::fmt::Debug for JsonStr<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self.as_raw_str() {
            Ok(s) => write!(f, "{:?}@{}..{}", s, self.start, self.end),
            Err(_) => write!(f, "{:?}@{}..{}", self.raw, self.start, self.end),
        }
    }
}

/// Type tag of a [`Value`]. Discriminants follow the historical bit assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ValueKind {
    Null = 0,
    Bool = 1 << 0,
    Integer = 1 << 1,
    Hex = 1 << 2,
    Float = 1 << 3,
    String = 1 << 4,
}

/// A scalar value reported through [`Driver::set_value`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Null,
    Bool(bool),
    Integer(i64),
    /// An integer written as `0x...`.
    Hex(u64),
    Float(f64),
    String(JsonStr<'a>),
}

impl Value<'_> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Integer(_) => ValueKind::Integer,
            Value::Hex(_) => ValueKind::Hex,
            Value::Float(_) => ValueKind::Float,
            Value::String(_) => ValueKind::String,
        }
    }
}

/// Receives parse events.
///
/// Every method has an empty default, so a driver only implements what it cares
/// about; events without an implementation are skipped. Events arrive in document
/// order on the calling thread. The implementing type carries whatever context the
/// driver needs; the parser never looks at it.
///
/// Structure is validated regardless of which callbacks are implemented.
#[allow(unused_variables)]
pub trait Driver<'input> {
    /// Name of an object member, before its flags and value.
    fn set_name(&mut self, name: JsonStr<'input>) {}

    fn open_array(&mut self) {}

    fn close_array(&mut self) {}

    fn open_object(&mut self) {}

    fn close_object(&mut self) {}

    /// A scalar value, either an array element or the value of the last named member.
    fn set_value(&mut self, value: Value<'input>) {}

    /// One word of a `(flag,flag)` list attached to the preceding name or string value.
    fn add_flag(&mut self, flag: JsonStr<'input>) {}

    /// Start of a `%...%` base64 block.
    fn open_data(&mut self) {}

    /// Decoded bytes of the current block, in order, at most
    /// [`DATA_CHUNK_SIZE`](crate::DATA_CHUNK_SIZE) at a time.
    fn add_data(&mut self, data: &[u8]) {}

    fn close_data(&mut self) {}

    /// Called once when parsing fails, with the input remaining from the failure point.
    fn error(&mut self, error: ParseError, context: &'input [u8]) {}

    /// Polled before every token; returning `true` stops the parse with
    /// [`ErrorKind::Cancelled`](crate::ErrorKind::Cancelled).
    fn cancelled(&self) -> bool {
        false
    }
}

impl<'input, D: Driver<'input> + ?Sized> Driver<'input> for &mut D {
    fn set_name(&mut self, name: JsonStr<'input>) {
        (**self).set_name(name)
    }
    fn open_array(&mut self) {
        (**self).open_array()
    }
    fn close_array(&mut self) {
        (**self).close_array()
    }
    fn open_object(&mut self) {
        (**self).open_object()
    }
    fn close_object(&mut self) {
        (**self).close_object()
    }
    fn set_value(&mut self, value: Value<'input>) {
        (**self).set_value(value)
    }
    fn add_flag(&mut self, flag: JsonStr<'input>) {
        (**self).add_flag(flag)
    }
    fn open_data(&mut self) {
        (**self).open_data()
    }
    fn add_data(&mut self, data: &[u8]) {
        (**self).add_data(data)
    }
    fn close_data(&mut self) {
        (**self).close_data()
    }
    fn error(&mut self, error: ParseError, context: &'input [u8]) {
        (**self).error(error, context)
    }
    fn cancelled(&self) -> bool {
        (**self).cancelled()
    }
}

/// A driver that ignores everything; parsing with it only validates the input.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullDriver;

impl Driver<'_> for NullDriver {}
