//! Random secret generation.

use rand::Rng;
use rand::RngCore;

use crate::otp::base32;

/// Default length of a generated secret, in characters.
pub const DEFAULT_SECRET_LENGTH: usize = 16;

const DIGITS: &[u8] = b"234567";
const LOWERCASE: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Which character classes a generated secret may draw from. All classes
/// stay inside the Base32 alphabet, so any combination decodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretCharset {
    /// `2`–`7`.
    pub numbers: bool,
    /// `a`–`z`.
    pub lowercase: bool,
    /// `A`–`Z`.
    pub uppercase: bool,
}

impl Default for SecretCharset {
    fn default() -> Self {
        Self {
            numbers: true,
            lowercase: true,
            uppercase: true,
        }
    }
}

impl SecretCharset {
    pub fn numbers(mut self, on: bool) -> Self {
        self.numbers = on;
        self
    }

    pub fn lowercase(mut self, on: bool) -> Self {
        self.lowercase = on;
        self
    }

    pub fn uppercase(mut self, on: bool) -> Self {
        self.uppercase = on;
        self
    }

    fn pool(&self) -> Vec<u8> {
        let mut pool = Vec::with_capacity(DIGITS.len() + LOWERCASE.len() + UPPERCASE.len());
        if self.numbers {
            pool.extend_from_slice(DIGITS);
        }
        if self.lowercase {
            pool.extend_from_slice(LOWERCASE);
        }
        if self.uppercase {
            pool.extend_from_slice(UPPERCASE);
        }
        pool
    }
}

/// Generate a random secret of `length` characters drawn from `charset`.
///
/// Returns an empty string when every class is disabled.
pub fn generate_secret(length: usize, charset: SecretCharset) -> String {
    let pool = charset.pool();
    if pool.is_empty() {
        log::warn!("generate_secret: no character class enabled, returning empty secret");
        return String::new();
    }
    let mut rng = rand::thread_rng();
    (0..length)
        .map(|_| pool[rng.gen_range(0..pool.len())] as char)
        .collect()
}

/// Generate `byte_length` random key bytes and return them Base-32 encoded
/// (unpadded, lowercase).
pub fn generate_key_secret(byte_length: usize) -> String {
    let mut buf = vec![0u8; byte_length];
    rand::thread_rng().fill_bytes(&mut buf);
    base32::encode(&buf, false)
}
