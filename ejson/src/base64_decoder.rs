// SPDX-License-Identifier: Apache-2.0

//! Incremental base64 decoding for `%...%` data blocks.
//!
//! Bytes are fed one at a time; decoded output is collected in a fixed chunk and
//! handed to a sink whenever the chunk fills up, so a block of any size is decoded
//! with constant memory.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Largest slice handed to the sink at once.
pub const DATA_CHUNK_SIZE: usize = 64;

/// Errors in a base64 body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Base64Error {
    /// A byte outside the alphabet, padding and whitespace.
    InvalidCharacter(u8),
    /// `=` where padding is not allowed, or data after padding.
    InvalidPadding,
    /// The block ended in the middle of a 4-character group.
    IncompleteGroup,
    /// A complete group that does not decode canonically, e.g. nonzero trailing bits.
    InvalidGroup,
}

impl core::fmt::Display for Base64Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Base64Error::InvalidCharacter(c) => write!(f, "invalid base64 character {:?}", *c as char),
            Base64Error::InvalidPadding => f.write_str("misplaced base64 padding"),
            Base64Error::IncompleteGroup => f.write_str("incomplete base64 group"),
            Base64Error::InvalidGroup => f.write_str("non-canonical base64 group"),
        }
    }
}

const fn is_alphabet(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'+' | b'/')
}

/// Streaming decoder for the standard base64 alphabet.
///
/// ```
/// use ejson::Base64Decoder;
/// let mut out = Vec::new();
/// let mut decoder = Base64Decoder::new();
/// for &b in b"aGVs bG8=" {
///     decoder.push(b, &mut |chunk: &[u8]| out.extend_from_slice(chunk)).unwrap();
/// }
/// decoder.finish(&mut |chunk: &[u8]| out.extend_from_slice(chunk)).unwrap();
/// assert_eq!(out, b"hello");
/// ```
#[derive(Debug)]
pub struct Base64Decoder {
    group: [u8; 4],
    filled: usize,
    padding: usize,
    /// Set once a padded group completed; only whitespace may follow.
    terminated: bool,
    chunk: [u8; DATA_CHUNK_SIZE],
    chunk_len: usize,
}

impl Default for Base64Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Base64Decoder {
    pub fn new() -> Self {
        Self {
            group: [0; 4],
            filled: 0,
            padding: 0,
            terminated: false,
            chunk: [0; DATA_CHUNK_SIZE],
            chunk_len: 0,
        }
    }

    /// Feeds one input byte. Whitespace is ignored.
    pub fn push<F>(&mut self, byte: u8, sink: &mut F) -> Result<(), Base64Error>
    where
        F: FnMut(&[u8]) + ?Sized,
    {
        if crate::scanner::is_whitespace(byte) {
            return Ok(());
        }
        if self.terminated {
            return Err(Base64Error::InvalidPadding);
        }
        if byte == b'=' {
            // Padding may only fill the third and fourth slot of a group
            if self.filled < 2 {
                return Err(Base64Error::InvalidPadding);
            }
            self.padding += 1;
        } else if !is_alphabet(byte) {
            return Err(Base64Error::InvalidCharacter(byte));
        } else if self.padding > 0 {
            return Err(Base64Error::InvalidPadding);
        }
        self.store(byte, sink)
    }

    /// Ends the block, flushing buffered output.
    pub fn finish<F>(&mut self, sink: &mut F) -> Result<(), Base64Error>
    where
        F: FnMut(&[u8]) + ?Sized,
    {
        if self.filled != 0 {
            return Err(Base64Error::IncompleteGroup);
        }
        self.flush(sink);
        *self = Self::new();
        Ok(())
    }

    fn store<F>(&mut self, byte: u8, sink: &mut F) -> Result<(), Base64Error>
    where
        F: FnMut(&[u8]) + ?Sized,
    {
        if let Some(slot) = self.group.get_mut(self.filled) {
            *slot = byte;
        }
        self.filled += 1;
        if self.filled < 4 {
            return Ok(());
        }

        let mut bytes = [0u8; 3];
        let len = STANDARD
            .decode_slice(self.group, &mut bytes)
            .map_err(|_| Base64Error::InvalidGroup)?;
        for &byte in bytes.iter().take(len) {
            self.emit(byte, sink);
        }
        self.terminated = self.padding > 0;
        self.filled = 0;
        self.padding = 0;
        Ok(())
    }

    fn emit<F>(&mut self, byte: u8, sink: &mut F)
    where
        F: FnMut(&[u8]) + ?Sized,
    {
        if self.chunk_len == DATA_CHUNK_SIZE {
            self.flush(sink);
        }
        if let Some(slot) = self.chunk.get_mut(self.chunk_len) {
            *slot = byte;
            self.chunk_len += 1;
        }
    }

    fn flush<F>(&mut self, sink: &mut F)
    where
        F: FnMut(&[u8]) + ?Sized,
    {
        if self.chunk_len > 0 {
            sink(&self.chunk[..self.chunk_len]);
            self.chunk_len = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(input: &[u8]) -> Result<(std::vec::Vec<u8>, usize), Base64Error> {
        let mut out = std::vec::Vec::new();
        let mut chunks = 0;
        let mut sink = |chunk: &[u8]| {
            assert!(!chunk.is_empty() && chunk.len() <= DATA_CHUNK_SIZE);
            out.extend_from_slice(chunk);
            chunks += 1;
        };
        let mut decoder = Base64Decoder::new();
        for &byte in input {
            decoder.push(byte, &mut sink)?;
        }
        decoder.finish(&mut sink)?;
        Ok((out, chunks))
    }

    #[test]
    fn test_padding_variants() {
        assert_eq!(decode(b"").unwrap().0, b"");
        assert_eq!(decode(b"TWFu").unwrap().0, b"Man");
        assert_eq!(decode(b"TWE=").unwrap().0, b"Ma");
        assert_eq!(decode(b"TQ==").unwrap().0, b"M");
        assert_eq!(decode(b"+/+/").unwrap().0, [0xFB, 0xFF, 0xBF]);
    }

    #[test]
    fn test_whitespace_is_ignored() {
        assert_eq!(
            decode(b" aGVs\nbG8g\td29y bGQ= ").unwrap().0,
            b"hello world"
        );
    }

    #[test]
    fn test_large_block_is_chunked() {
        // 150 groups of "AAAA" -> 450 zero bytes
        let input = b"AAAA".repeat(150);
        let (out, chunks) = decode(&input).unwrap();
        assert_eq!(out.len(), 450);
        assert!(out.iter().all(|&b| b == 0));
        assert_eq!(chunks, 450_usize.div_ceil(DATA_CHUNK_SIZE));
    }

    #[test]
    fn test_invalid_bodies() {
        assert_eq!(decode(b"TW*u"), Err(Base64Error::InvalidCharacter(b'*')));
        assert_eq!(decode(b"TWF"), Err(Base64Error::IncompleteGroup));
        assert_eq!(decode(b"T"), Err(Base64Error::IncompleteGroup));
        assert_eq!(decode(b"T==="), Err(Base64Error::InvalidPadding));
        assert_eq!(decode(b"=AAA"), Err(Base64Error::InvalidPadding));
        assert_eq!(decode(b"TQ=u"), Err(Base64Error::InvalidPadding));
        assert_eq!(decode(b"TQ==TWFu"), Err(Base64Error::InvalidPadding));
        // "TR==" carries nonzero bits past the single decoded byte
        assert_eq!(decode(b"TR=="), Err(Base64Error::InvalidGroup));
    }

    #[test]
    fn test_decoder_is_reusable_after_finish() {
        let mut out = std::vec::Vec::new();
        let mut sink = |chunk: &[u8]| out.extend_from_slice(chunk);
        let mut decoder = Base64Decoder::new();
        for &b in b"TQ==" {
            decoder.push(b, &mut sink).unwrap();
        }
        decoder.finish(&mut sink).unwrap();
        for &b in b"TWFu" {
            decoder.push(b, &mut sink).unwrap();
        }
        decoder.finish(&mut sink).unwrap();
        assert_eq!(out, b"MMan");
    }
}
