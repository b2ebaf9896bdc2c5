// SPDX-License-Identifier: Apache-2.0

use crate::escape_processor::EscapeError;

/// Categories of parse failure.
///
/// Each kind maps to a stable negative status code, see [`ErrorKind::code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The parse stack could not grow: the document may be fine, the memory budget was not.
    NoStack,
    /// Malformed base64 data block.
    Base64,
    /// A value was expected but the input did not start one, or the value was malformed.
    Value,
    /// Malformed array element: neither `,` nor `]` followed a value.
    ListElement,
    /// Malformed object element: bad name, missing `:`, or neither `,` nor `}` after a value.
    ObjectElement,
    /// Anything else: empty document, trailing content after the root value.
    Parse,
    /// Malformed string literal: bad escape, control character, or missing closing quote.
    String,
    /// The driver asked to stop.
    Cancelled,
}

impl ErrorKind {
    /// The negative integer status returned by the C-style API.
    pub const fn code(self) -> i32 {
        match self {
            ErrorKind::NoStack => -1,
            ErrorKind::Base64 => -2,
            ErrorKind::Value => -3,
            ErrorKind::ListElement => -4,
            ErrorKind::ObjectElement => -5,
            ErrorKind::Parse => -6,
            ErrorKind::String => -7,
            ErrorKind::Cancelled => -8,
        }
    }

    const fn description(self) -> &'static str {
        match self {
            ErrorKind::NoStack => "parse stack exhausted",
            ErrorKind::Base64 => "malformed base64 block",
            ErrorKind::Value => "malformed value",
            ErrorKind::ListElement => "malformed array element",
            ErrorKind::ObjectElement => "malformed object element",
            ErrorKind::Parse => "parse error",
            ErrorKind::String => "malformed string",
            ErrorKind::Cancelled => "cancelled by driver",
        }
    }
}

/// A parse failure: what went wrong and where.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ParseError {
    kind: ErrorKind,
    position: usize,
}

impl ParseError {
    pub const fn new(kind: ErrorKind, position: usize) -> Self {
        Self { kind, position }
    }

    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Byte offset into the input where the failure was detected.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Negative status code, see [`ErrorKind::code`].
    pub const fn code(&self) -> i32 {
        self.kind.code()
    }
}

/// Converts a parse result into the C-style status: zero on success, negative on failure.
pub fn status(result: Result<(), ParseError>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.code(),
    }
}

impl From<EscapeError> for ErrorKind {
    fn from(_: EscapeError) -> Self {
        ErrorKind::String
    }
}

impl core::fmt::Debug for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}({}) at {}", self.kind, self.code(), self.position)
    }
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{} (code {}) at byte {}",
            self.kind.description(),
            self.code(),
            self.position
        )
    }
}
