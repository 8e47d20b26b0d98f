//! Base32 codec over the RFC 4648 alphabet.
//!
//! Encoding emits lowercase symbols, most-significant bit first across byte
//! boundaries. Decoding is lenient in the ways authenticator users expect:
//! either case is accepted, trailing padding and whitespace are stripped,
//! and spaces, tabs and line breaks inside the body are skipped.

use crate::otp::types::{OtpError, OtpResult};

const ALPHABET: &[u8; 32] = b"abcdefghijklmnopqrstuvwxyz234567";

/// Stripped from the end of the input before decoding.
const TRAILING: &[char] = &['=', ' ', '\t', '\n', '\r', '\0', '\x0b'];

/// Skipped anywhere in the body.
const SKIPPED: &[u8] = b" \r\n\t";

const PAD: char = '=';

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Encode
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Encode bytes to Base32. Use `pad_right = false` for secrets embedded in
/// URLs.
pub fn encode(data: &[u8], pad_right: bool) -> String {
    let mut out = String::with_capacity((data.len() * 8 + 4) / 5 + 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for &byte in data {
        buffer = (buffer << 8) | byte as u32;
        bits += 8;
        while bits >= 5 {
            bits -= 5;
            out.push(ALPHABET[((buffer >> bits) & 0x1f) as usize] as char);
        }
        buffer &= (1 << bits) - 1;
    }

    // Left-align the final partial group.
    if bits > 0 {
        out.push(ALPHABET[((buffer << (5 - bits)) & 0x1f) as usize] as char);
    }

    if pad_right {
        let pad = (8 - (data.len() % 5 * 8 + 4) / 5) % 8;
        out.extend(std::iter::repeat(PAD).take(pad));
    }

    out
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Decode
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Decode a Base32 string.
///
/// Fails with [`OtpError::InvalidEncoding`] on the first byte that is neither
/// an alphabet symbol nor skippable whitespace. Bits left over after the last
/// full byte are discarded.
pub fn decode(encoded: &str) -> OtpResult<Vec<u8>> {
    let trimmed = encoded.trim_end_matches(TRAILING);
    let mut out = Vec::with_capacity(trimmed.len() * 5 / 8);
    let mut buffer: u32 = 0;
    let mut bits: u32 = 0;

    for (offset, &byte) in trimmed.as_bytes().iter().enumerate() {
        let value = match symbol_value(byte) {
            Some(v) => v,
            None if SKIPPED.contains(&byte) => continue,
            None => {
                log::debug!("base32: rejected byte {} at offset {}", byte, offset);
                return Err(OtpError::InvalidEncoding { byte, offset });
            }
        };

        buffer = (buffer << 5) | value as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    Ok(out)
}

fn symbol_value(byte: u8) -> Option<u8> {
    match byte {
        b'a'..=b'z' => Some(byte - b'a'),
        b'A'..=b'Z' => Some(byte - b'A'),
        b'2'..=b'7' => Some(byte - b'2' + 26),
        _ => None,
    }
}
