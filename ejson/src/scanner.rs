// SPDX-License-Identifier: Apache-2.0

use crate::escape_processor::EscapeProcessor;
use crate::parse_error::{ErrorKind, ParseError};

/// Classification of the next significant input byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    Comma,
    Colon,
    Quote,
    FlagsStart,
    DataDelimiter,
    Number,
    True,
    False,
    Null,
    End,
    Other(u8),
}

/// Forward-only cursor over the input.
///
/// Input ends at the slice bounds or at the first NUL byte, whichever comes first.
#[derive(Debug)]
pub(crate) struct Scanner<'a> {
    data: &'a [u8],
    pos: usize,
}

pub(crate) const fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b' ' | b'\t' | b'\n' | b'\r')
}

const fn is_number_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'+' | b'-')
}

const fn is_flag_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'_' | b'-')
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        let end = input.iter().position(|&b| b == 0).unwrap_or(input.len());
        Self {
            data: input.get(..end).unwrap_or(input),
            pos: 0,
        }
    }

    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Input from `pos` to the end, used as error context.
    pub fn rest_from(&self, pos: usize) -> &'a [u8] {
        self.data.get(pos..).unwrap_or(&[])
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        self.data.get(start..end).unwrap_or(&[])
    }

    pub fn peek(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    pub fn bump(&mut self) {
        if self.pos < self.data.len() {
            self.pos += 1;
        }
    }

    pub fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(is_whitespace) {
            self.pos += 1;
        }
    }

    /// Skips whitespace and classifies the next byte without consuming it.
    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let Some(byte) = self.peek() else {
            return Token::End;
        };
        match byte {
            b'{' => Token::ObjectStart,
            b'}' => Token::ObjectEnd,
            b'[' => Token::ArrayStart,
            b']' => Token::ArrayEnd,
            b',' => Token::Comma,
            b':' => Token::Colon,
            b'"' => Token::Quote,
            b'(' => Token::FlagsStart,
            b'%' => Token::DataDelimiter,
            b'-' | b'0'..=b'9' => Token::Number,
            b't' => Token::True,
            b'f' => Token::False,
            b'n' => Token::Null,
            other => Token::Other(other),
        }
    }

    /// Consumes `word` if the input continues with it.
    pub fn match_literal(&mut self, word: &[u8]) -> bool {
        let matched = self
            .data
            .get(self.pos..)
            .is_some_and(|rest| rest.starts_with(word));
        if matched {
            self.pos += word.len();
        }
        matched
    }

    /// Scans a quoted string starting at the opening quote.
    ///
    /// Returns the raw content bounds, excluding the quotes. Escapes are validated
    /// but not decoded.
    pub fn scan_string(&mut self) -> Result<(usize, usize), ParseError> {
        self.bump();
        let start = self.pos;
        loop {
            match self.peek() {
                None => return Err(ParseError::new(ErrorKind::String, self.pos)),
                Some(b'"') => {
                    let end = self.pos;
                    self.bump();
                    return Ok((start, end));
                }
                Some(b'\\') => {
                    let seq = self.rest_from(self.pos);
                    let len = EscapeProcessor::escape_len(seq)
                        .map_err(|e| ParseError::new(e.into(), self.pos))?;
                    self.pos += len;
                }
                Some(byte) if byte < 0x20 => {
                    return Err(ParseError::new(ErrorKind::String, self.pos))
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    /// Consumes the maximal run of bytes that can belong to a number literal.
    pub fn scan_number(&mut self) -> (usize, usize) {
        let start = self.pos;
        while self.peek().is_some_and(is_number_byte) {
            self.pos += 1;
        }
        (start, self.pos)
    }

    /// Consumes a flag word, returning its bounds; empty bounds when none is present.
    pub fn scan_flag_word(&mut self) -> (usize, usize) {
        let start = self.pos;
        while self.peek().is_some_and(is_flag_byte) {
            self.pos += 1;
        }
        (start, self.pos)
    }
}
