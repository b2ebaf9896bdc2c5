// SPDX-License-Identifier: Apache-2.0

use crate::Value;

/// Parses a number literal: signed decimal integer, `0x` hex integer, or float.
///
/// A `.`, `e` or `E` anywhere in a decimal literal makes it a float. Hex literals
/// are unsigned. Returns `None` for malformed literals and integer overflow.
pub(crate) fn parse_number(bytes: &[u8]) -> Option<Value<'static>> {
    let (negative, digits) = match bytes.split_first() {
        Some((b'-', rest)) => (true, rest),
        _ => (false, bytes),
    };

    if let Some(hex) = digits
        .strip_prefix(b"0x")
        .or_else(|| digits.strip_prefix(b"0X"))
    {
        if negative {
            return None;
        }
        return parse_hex(hex).map(Value::Hex);
    }

    if digits.iter().any(|b| matches!(b, b'.' | b'e' | b'E')) {
        return parse_float(bytes).map(Value::Float);
    }

    parse_integer(digits, negative).map(Value::Integer)
}

fn parse_hex(hex: &[u8]) -> Option<u64> {
    if hex.is_empty() {
        return None;
    }
    hex.iter().try_fold(0u64, |acc, &b| {
        let digit = (b as char).to_digit(16)?;
        acc.checked_mul(16)?.checked_add(digit as u64)
    })
}

fn parse_integer(digits: &[u8], negative: bool) -> Option<i64> {
    if digits.is_empty() {
        return None;
    }
    // Accumulate towards the sign so i64::MIN stays representable
    digits.iter().try_fold(0i64, |acc, &b| {
        if !b.is_ascii_digit() {
            return None;
        }
        let digit = (b - b'0') as i64;
        let acc = acc.checked_mul(10)?;
        if negative {
            acc.checked_sub(digit)
        } else {
            acc.checked_add(digit)
        }
    })
}

fn parse_float(bytes: &[u8]) -> Option<f64> {
    let valid = bytes
        .iter()
        .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-'));
    if !valid || !bytes.iter().any(u8::is_ascii_digit) {
        return None;
    }
    core::str::from_utf8(bytes).ok()?.parse().ok()
}
