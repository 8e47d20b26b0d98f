//! Core OTP generation (RFC 4226 §5.3).
//!
//! HMAC over the 8-byte big-endian counter, dynamic truncation to a 31-bit
//! integer, and reduction to a zero-padded decimal string. Both drivers
//! delegate here; nothing in this module holds state.

use hmac::{Hmac, Mac};
use md5::Md5;
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};

use crate::otp::types::*;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Generation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Compute an OTP for raw key bytes and a moving factor (counter or time-step).
pub fn generate(key: &[u8], input: u64, algo: Algorithm, digits: u32) -> OtpResult<String> {
    if !(1..=MAX_DIGITS).contains(&digits) {
        return Err(OtpError::InvalidDigits(digits));
    }
    let hmac_result = compute_hmac(key, &counter_bytes(input), algo);
    Ok(truncate(&hmac_result, digits))
}

/// Generate from a driver config: checks and decodes the secret first.
pub fn generate_from_config(config: &OtpConfig, input: u64) -> OtpResult<String> {
    let key = config.secret_bytes()?;
    generate(&key, input, config.algorithm, config.digits)
}

/// The OATH byte string: `input` as 8 big-endian bytes.
pub fn counter_bytes(input: u64) -> [u8; 8] {
    input.to_be_bytes()
}

macro_rules! hmac_digest {
    ($digest:ty, $key:expr, $data:expr) => {{
        let mut mac =
            <Hmac<$digest> as Mac>::new_from_slice($key).expect("HMAC accepts any key length");
        mac.update($data);
        mac.finalize().into_bytes().to_vec()
    }};
}

/// Compute HMAC(key, message) using the specified algorithm.
fn compute_hmac(key: &[u8], data: &[u8], algo: Algorithm) -> Vec<u8> {
    match algo {
        Algorithm::Sha1 => hmac_digest!(Sha1, key, data),
        Algorithm::Sha224 => hmac_digest!(Sha224, key, data),
        Algorithm::Sha256 => hmac_digest!(Sha256, key, data),
        Algorithm::Sha384 => hmac_digest!(Sha384, key, data),
        Algorithm::Sha512 => hmac_digest!(Sha512, key, data),
        Algorithm::Md5 => hmac_digest!(Md5, key, data),
        Algorithm::Ripemd160 => hmac_digest!(Ripemd160, key, data),
    }
}

/// Dynamic truncation per RFC 4226 §5.3.
///
/// Digests shorter than `offset + 4` bytes (MD5) read the missing bytes as
/// zero.
fn truncate(hmac_result: &[u8], digits: u32) -> String {
    let offset = (hmac_result[hmac_result.len() - 1] & 0x0f) as usize;
    let byte = |i: usize| hmac_result.get(offset + i).copied().unwrap_or(0) as u32;
    let binary = ((byte(0) & 0x7f) << 24) | (byte(1) << 16) | (byte(2) << 8) | byte(3);
    let modulus = 10u64.pow(digits);
    let code = binary as u64 % modulus;
    format!("{:0>width$}", code, width = digits as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const RFC4226_KEY: &[u8] = b"12345678901234567890";

    // ── RFC 4226 Appendix D ──────────────────────────────────────

    #[test]
    fn rfc4226_hotp_vectors() {
        let expected = [
            "755224", "287082", "359152", "969429", "338314",
            "254676", "287922", "162583", "399871", "520489",
        ];
        for (counter, exp) in expected.iter().enumerate() {
            let code = generate(RFC4226_KEY, counter as u64, Algorithm::Sha1, 6).unwrap();
            assert_eq!(&code, exp, "HOTP mismatch at counter {}", counter);
        }
    }

    #[test]
    fn counter_bytes_big_endian() {
        assert_eq!(counter_bytes(0), [0; 8]);
        assert_eq!(counter_bytes(1), [0, 0, 0, 0, 0, 0, 0, 1]);
        assert_eq!(counter_bytes(0x0102_0304_0506_0708), [1, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(counter_bytes(u64::MAX), [0xff; 8]);
    }

    #[test]
    fn truncate_rfc4226_example() {
        // RFC 4226 §5.4 worked example digest
        let digest = [
            0x1f, 0x86, 0x98, 0x69, 0x0e, 0x02, 0xca, 0x16, 0x61, 0x85, 0x50, 0xef, 0x7f, 0x19,
            0xda, 0x8e, 0x94, 0x5b, 0x55, 0x5a,
        ];
        assert_eq!(truncate(&digest, 6), "872921");
        assert_eq!(truncate(&digest, 10), "1357872921");
    }

    #[test]
    fn truncate_clears_sign_bit() {
        let mut digest = [0xffu8; 20];
        digest[19] = 0x00;
        // offset 0 → 0x7fffffff
        assert_eq!(truncate(&digest, 10), "2147483647");
    }

    // ── Digits ───────────────────────────────────────────────────

    #[test]
    fn output_length_matches_digits() {
        for digits in 1..=MAX_DIGITS {
            let code = generate(RFC4226_KEY, 0, Algorithm::Sha1, digits).unwrap();
            assert_eq!(code.len(), digits as usize);
            assert!(code.chars().all(|c| c.is_ascii_digit()));
        }
        assert_eq!(generate(RFC4226_KEY, 0, Algorithm::Sha1, 10).unwrap(), "1284755224");
        assert_eq!(generate(RFC4226_KEY, 0, Algorithm::Sha1, 1).unwrap(), "4");
    }

    #[test]
    fn rejects_digits_out_of_range() {
        assert_eq!(
            generate(RFC4226_KEY, 0, Algorithm::Sha1, 0),
            Err(OtpError::InvalidDigits(0))
        );
        assert_eq!(
            generate(RFC4226_KEY, 0, Algorithm::Sha1, 11),
            Err(OtpError::InvalidDigits(11))
        );
    }

    // ── Algorithms ───────────────────────────────────────────────

    #[test]
    fn deterministic_for_every_algorithm() {
        for algo in [
            Algorithm::Sha1,
            Algorithm::Sha224,
            Algorithm::Sha256,
            Algorithm::Sha384,
            Algorithm::Sha512,
            Algorithm::Md5,
            Algorithm::Ripemd160,
        ] {
            let a = generate(RFC4226_KEY, 42, algo, 8).unwrap();
            let b = generate(RFC4226_KEY, 42, algo, 8).unwrap();
            assert_eq!(a, b, "{} not deterministic", algo);
        }
    }

    #[test]
    fn ripemd160_eight_digits() {
        // "ABCDEFGHIJK" decodes to these six bytes
        let key = [0x00, 0x44, 0x32, 0x14, 0xc7, 0x42];
        assert_eq!(generate(&key, 1, Algorithm::Ripemd160, 8).unwrap(), "36605754");
    }

    #[test]
    fn algorithms_differ() {
        let sha1 = generate(RFC4226_KEY, 1, Algorithm::Sha1, 8).unwrap();
        let sha256 = generate(RFC4226_KEY, 1, Algorithm::Sha256, 8).unwrap();
        assert_ne!(sha1, sha256);
    }

    #[test]
    fn empty_key_is_accepted() {
        assert_eq!(generate(&[], 0, Algorithm::Sha1, 6).unwrap().len(), 6);
    }

    // ── From config ──────────────────────────────────────────────

    #[test]
    fn config_without_secret_fails() {
        assert_eq!(
            generate_from_config(&OtpConfig::new(), 0),
            Err(OtpError::MissingSecret)
        );
    }

    #[test]
    fn config_with_undecodable_secret_fails() {
        let cfg = OtpConfig::new().with_secret("not base32!");
        assert_eq!(
            generate_from_config(&cfg, 0),
            Err(OtpError::InvalidEncoding { byte: b'!', offset: 10 })
        );
    }

    #[test]
    fn config_matches_raw_key() {
        let cfg = OtpConfig::new().with_secret("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ");
        assert_eq!(generate_from_config(&cfg, 9).unwrap(), "520489");
    }
}
