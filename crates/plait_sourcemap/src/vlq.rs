//! Base64 VLQ, the integer encoding used in `mappings`.
//!
//! A value is shifted left one bit with the sign folded into bit 0, then
//! written least-significant group first in 5-bit groups. Bit 5 of each
//! base64 digit marks that another group follows.

use crate::SourceMapError;

const BASE64: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

const VLQ_BASE_SHIFT: u32 = 5;
const VLQ_BASE_MASK: u64 = (1 << VLQ_BASE_SHIFT) - 1;
const VLQ_CONTINUATION_BIT: u64 = 1 << VLQ_BASE_SHIFT;

/// Append the encoding of `value` to `out`.
pub fn encode(value: i64, out: &mut String) {
    let mut vlq = if value < 0 {
        (value.unsigned_abs() << 1) | 1
    } else {
        (value as u64) << 1
    };
    loop {
        let mut digit = vlq & VLQ_BASE_MASK;
        vlq >>= VLQ_BASE_SHIFT;
        if vlq > 0 {
            digit |= VLQ_CONTINUATION_BIT;
        }
        out.push(BASE64[digit as usize] as char);
        if vlq == 0 {
            break;
        }
    }
}

/// Encode a single value into a fresh string.
pub fn encode_to_string(value: i64) -> String {
    let mut out = String::new();
    encode(value, &mut out);
    out
}

/// Decode every value in `input`, e.g. one mapping segment.
pub fn decode(input: &str) -> Result<Vec<i64>, SourceMapError> {
    let mut values = Vec::new();
    let mut accumulator: u64 = 0;
    let mut shift: u32 = 0;
    let mut in_value = false;
    for ch in input.chars() {
        let digit = base64_value(ch).ok_or(SourceMapError::InvalidBase64(ch))?;
        if shift >= 64 {
            return Err(SourceMapError::VlqOverflow);
        }
        accumulator |= (digit & VLQ_BASE_MASK) << shift;
        in_value = true;
        if digit & VLQ_CONTINUATION_BIT != 0 {
            shift += VLQ_BASE_SHIFT;
            continue;
        }
        let magnitude = (accumulator >> 1) as i64;
        values.push(if accumulator & 1 == 1 { -magnitude } else { magnitude });
        accumulator = 0;
        shift = 0;
        in_value = false;
    }
    if in_value {
        return Err(SourceMapError::UnterminatedVlq);
    }
    Ok(values)
}

fn base64_value(ch: char) -> Option<u64> {
    let value = match ch {
        'A'..='Z' => ch as u32 - 'A' as u32,
        'a'..='z' => ch as u32 - 'a' as u32 + 26,
        '0'..='9' => ch as u32 - '0' as u32 + 52,
        '+' => 62,
        '/' => 63,
        _ => return None,
    };
    Some(u64::from(value))
}
