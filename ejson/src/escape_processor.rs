// SPDX-License-Identifier: Apache-2.0

//! JSON string escape decoding.
//!
//! The parser reports strings as raw, still escaped spans. Drivers that need the
//! logical content call [`unescape`] (into a separate buffer) or
//! [`unescape_in_place`] (overwriting the raw bytes), both of which produce output
//! that is never longer than the input.

/// Errors produced while decoding escape sequences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeError {
    /// Backslash followed by a character that is not a JSON escape, or at end of span.
    InvalidEscapeSequence,
    /// `\u` not followed by four hex digits.
    InvalidUnicodeHex,
    /// The output buffer is shorter than the decoded content.
    BufferFull,
    /// Decoded bytes are not valid UTF-8 (only from `str` conversions).
    InvalidUtf8,
}

impl core::fmt::Display for EscapeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let msg = match self {
            EscapeError::InvalidEscapeSequence => "invalid escape sequence",
            EscapeError::InvalidUnicodeHex => "invalid hex digits in unicode escape",
            EscapeError::BufferFull => "output buffer too small",
            EscapeError::InvalidUtf8 => "decoded string is not valid UTF-8",
        };
        f.write_str(msg)
    }
}

/// Code point substituted for lone or unmatched UTF-16 surrogates.
pub const REPLACEMENT_CHARACTER: char = '\u{FFFD}';

/// Pure helpers for escape sequence processing, shared by the scanner and the decoder.
pub struct EscapeProcessor;

impl EscapeProcessor {
    /// Process a simple escape sequence character and return the unescaped byte.
    ///
    /// # Arguments
    /// * `escape_char` - The character following the backslash in an escape sequence
    pub fn process_simple_escape(escape_char: u8) -> Result<u8, EscapeError> {
        match escape_char {
            b'n' => Ok(b'\n'),
            b't' => Ok(b'\t'),
            b'r' => Ok(b'\r'),
            b'\\' => Ok(b'\\'),
            b'"' => Ok(b'"'),
            b'/' => Ok(b'/'),
            b'b' => Ok(0x08), // Backspace
            b'f' => Ok(0x0C), // Form feed
            _ => Err(EscapeError::InvalidEscapeSequence),
        }
    }

    /// Numeric value (0-15) of a hexadecimal digit.
    pub fn validate_hex_digit(byte: u8) -> Result<u32, EscapeError> {
        match byte {
            b'0'..=b'9' => Ok((byte - b'0') as u32),
            b'a'..=b'f' => Ok(byte.wrapping_sub(b'a').wrapping_add(10) as u32),
            b'A'..=b'F' => Ok(byte.wrapping_sub(b'A').wrapping_add(10) as u32),
            _ => Err(EscapeError::InvalidUnicodeHex),
        }
    }

    /// Check if a Unicode codepoint is a high surrogate (0xD800-0xDBFF)
    pub fn is_high_surrogate(codepoint: u32) -> bool {
        (0xD800..=0xDBFF).contains(&codepoint)
    }

    /// Check if a Unicode codepoint is a low surrogate (0xDC00-0xDFFF)
    pub fn is_low_surrogate(codepoint: u32) -> bool {
        (0xDC00..=0xDFFF).contains(&codepoint)
    }

    /// Combine a high and low surrogate pair into a single Unicode codepoint
    pub fn combine_surrogate_pair(high: u32, low: u32) -> Option<u32> {
        if !Self::is_high_surrogate(high) || !Self::is_low_surrogate(low) {
            return None;
        }
        Some(0x10000 + ((high & 0x3FF) << 10) + (low & 0x3FF))
    }

    /// Parses exactly four hex digits.
    pub fn parse_hex4(hex: &[u8]) -> Result<u32, EscapeError> {
        if hex.len() != 4 {
            return Err(EscapeError::InvalidUnicodeHex);
        }
        hex.iter().try_fold(0u32, |acc, &byte| {
            Ok((acc << 4) | Self::validate_hex_digit(byte)?)
        })
    }

    /// Validates the escape sequence starting at the backslash in `seq` and
    /// returns its length in bytes (2 for simple escapes, 6 for `\uXXXX`).
    pub fn escape_len(seq: &[u8]) -> Result<usize, EscapeError> {
        match seq.get(1) {
            Some(b'u') => {
                let hex = seq.get(2..6).ok_or(EscapeError::InvalidUnicodeHex)?;
                Self::parse_hex4(hex)?;
                Ok(6)
            }
            Some(&c) => Self::process_simple_escape(c).map(|_| 2),
            None => Err(EscapeError::InvalidEscapeSequence),
        }
    }
}

/// Read/write access used by the decoder loop.
///
/// Implemented once for a separate output buffer and once for in-place decoding,
/// so that both share the same loop. Writes never overtake reads.
trait EscapeBuffer {
    fn input_len(&self) -> usize;
    fn read(&self, pos: usize) -> Option<u8>;
    fn write(&mut self, pos: usize, byte: u8) -> Result<(), EscapeError>;
}

struct SplitBuffer<'a, 'b> {
    src: &'a [u8],
    dst: &'b mut [u8],
}

impl EscapeBuffer for SplitBuffer<'_, '_> {
    fn input_len(&self) -> usize {
        self.src.len()
    }
    fn read(&self, pos: usize) -> Option<u8> {
        self.src.get(pos).copied()
    }
    fn write(&mut self, pos: usize, byte: u8) -> Result<(), EscapeError> {
        let slot = self.dst.get_mut(pos).ok_or(EscapeError::BufferFull)?;
        *slot = byte;
        Ok(())
    }
}

struct InPlaceBuffer<'a>(&'a mut [u8]);

impl EscapeBuffer for InPlaceBuffer<'_> {
    fn input_len(&self) -> usize {
        self.0.len()
    }
    fn read(&self, pos: usize) -> Option<u8> {
        self.0.get(pos).copied()
    }
    fn write(&mut self, pos: usize, byte: u8) -> Result<(), EscapeError> {
        let slot = self.0.get_mut(pos).ok_or(EscapeError::BufferFull)?;
        *slot = byte;
        Ok(())
    }
}

/// Decodes the raw string content `raw` (without the surrounding quotes) into `out`.
///
/// Returns the number of bytes written. `out` needs at most `raw.len()` bytes.
///
/// ```
/// let mut out = [0u8; 16];
/// let len = ejson::unescape(br"a\tb\/c", &mut out).unwrap();
/// assert_eq!(&out[..len], b"a\tb/c");
/// ```
pub fn unescape(raw: &[u8], out: &mut [u8]) -> Result<usize, EscapeError> {
    decode(&mut SplitBuffer { src: raw, dst: out })
}

/// Decodes `buf` in place, returning the decoded length.
///
/// Bytes past the returned length are left in an unspecified state.
pub fn unescape_in_place(buf: &mut [u8]) -> Result<usize, EscapeError> {
    decode(&mut InPlaceBuffer(buf))
}

fn read_hex4<B: EscapeBuffer>(buf: &B, start: usize) -> Result<u32, EscapeError> {
    let mut hex = [0u8; 4];
    for (i, slot) in hex.iter_mut().enumerate() {
        *slot = buf
            .read(start + i)
            .ok_or(EscapeError::InvalidUnicodeHex)?;
    }
    EscapeProcessor::parse_hex4(&hex)
}

/// Looks for a `\uXXXX` low surrogate at `pos`, without consuming anything.
fn peek_low_surrogate<B: EscapeBuffer>(buf: &B, pos: usize) -> Option<u32> {
    if buf.read(pos)? != b'\\' || buf.read(pos + 1)? != b'u' {
        return None;
    }
    read_hex4(buf, pos + 2)
        .ok()
        .filter(|&cp| EscapeProcessor::is_low_surrogate(cp))
}

fn decode<B: EscapeBuffer>(buf: &mut B) -> Result<usize, EscapeError> {
    let len = buf.input_len();
    let mut read = 0;
    let mut write = 0;

    while let Some(byte) = buf.read(read) {
        if byte != b'\\' {
            buf.write(write, byte)?;
            read += 1;
            write += 1;
            continue;
        }
        let escape = buf
            .read(read + 1)
            .ok_or(EscapeError::InvalidEscapeSequence)?;
        if escape != b'u' {
            buf.write(write, EscapeProcessor::process_simple_escape(escape)?)?;
            read += 2;
            write += 1;
            continue;
        }

        let unit = read_hex4(buf, read + 2)?;
        read += 6;
        let codepoint = if EscapeProcessor::is_high_surrogate(unit) {
            match peek_low_surrogate(buf, read)
                .and_then(|low| EscapeProcessor::combine_surrogate_pair(unit, low))
            {
                Some(combined) => {
                    read += 6;
                    combined
                }
                None => REPLACEMENT_CHARACTER as u32,
            }
        } else {
            unit
        };
        let ch = char::from_u32(codepoint).unwrap_or(REPLACEMENT_CHARACTER);
        let mut utf8 = [0u8; 4];
        for &b in ch.encode_utf8(&mut utf8).as_bytes() {
            buf.write(write, b)?;
            write += 1;
        }
    }
    debug_assert!(write <= len);
    Ok(write)
}
