//! Core types for the HOTP/TOTP drivers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::otp::base32;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Defaults
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Default OTP length (RFC 4226 recommends at least 6).
pub const DEFAULT_DIGITS: u32 = 6;
/// Largest digit count the 31-bit truncated code can fill.
pub const MAX_DIGITS: u32 = 10;
/// Default TOTP time-step in seconds (RFC 6238).
pub const DEFAULT_INTERVAL: u64 = 30;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Algorithm
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Hash algorithm used for HMAC-based OTP.
///
/// Serialised by its URI name and parsed through [`FromStr`], so a config
/// file accepts the same spellings as [`Algorithm::from_str`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Algorithm {
    #[default]
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
    Md5,
    Ripemd160,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.uri_name())
    }
}

impl FromStr for Algorithm {
    type Err = OtpError;

    /// Parse a digest name, case-insensitive, with or without a dash or an
    /// `HMAC` prefix (`sha1`, `SHA-256`, `hmac-sha512`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_uppercase();
        let name = upper
            .strip_prefix("HMAC-")
            .or_else(|| upper.strip_prefix("HMAC"))
            .unwrap_or(&upper)
            .replace('-', "");
        match name.as_str() {
            "SHA1" => Ok(Self::Sha1),
            "SHA224" => Ok(Self::Sha224),
            "SHA256" => Ok(Self::Sha256),
            "SHA384" => Ok(Self::Sha384),
            "SHA512" => Ok(Self::Sha512),
            "MD5" => Ok(Self::Md5),
            "RIPEMD160" => Ok(Self::Ripemd160),
            _ => Err(OtpError::UnsupportedAlgorithm(s.to_string())),
        }
    }
}

impl Algorithm {
    /// Name used for the `algorithm` parameter of `otpauth://` URLs.
    pub fn uri_name(&self) -> &'static str {
        match self {
            Self::Sha1 => "SHA1",
            Self::Sha224 => "SHA224",
            Self::Sha256 => "SHA256",
            Self::Sha384 => "SHA384",
            Self::Sha512 => "SHA512",
            Self::Md5 => "MD5",
            Self::Ripemd160 => "RIPEMD160",
        }
    }
}

impl TryFrom<String> for Algorithm {
    type Error = OtpError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Algorithm> for String {
    fn from(algo: Algorithm) -> String {
        algo.uri_name().to_string()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Configuration
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Configuration owned by a single HOTP or TOTP driver.
///
/// Missing fields fall back to the RFC defaults when deserialising, so a
/// stored config only needs to carry what differs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OtpConfig {
    /// Base-32 encoded shared secret.
    pub secret: Option<String>,
    /// HMAC digest.
    pub algorithm: Algorithm,
    /// Number of digits in the generated code.
    pub digits: u32,
    /// TOTP time-step in seconds. Ignored by HOTP.
    pub interval: u64,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            secret: None,
            algorithm: Algorithm::default(),
            digits: DEFAULT_DIGITS,
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl fmt::Debug for OtpConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OtpConfig")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("algorithm", &self.algorithm)
            .field("digits", &self.digits)
            .field("interval", &self.interval)
            .finish()
    }
}

impl OtpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: set the Base-32 secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Builder: set algorithm.
    pub fn with_algorithm(mut self, algo: Algorithm) -> Self {
        self.algorithm = algo;
        self
    }

    /// Builder: set digit count.
    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    /// Builder: set the TOTP time-step.
    pub fn with_interval(mut self, interval: u64) -> Self {
        self.interval = interval;
        self
    }

    /// Load a config from JSON. Absent fields take their defaults.
    ///
    /// An unknown `algorithm` name fails with `UnsupportedAlgorithm`; any
    /// other malformed input with `InvalidConfig`.
    pub fn from_json(json: &str) -> OtpResult<Self> {
        let value: serde_json::Value =
            serde_json::from_str(json).map_err(|e| OtpError::InvalidConfig(e.to_string()))?;
        if let Some(name) = value.get("algorithm").and_then(|v| v.as_str()) {
            name.parse::<Algorithm>()?;
        }
        serde_json::from_value(value).map_err(|e| OtpError::InvalidConfig(e.to_string()))
    }

    pub fn to_json(&self) -> OtpResult<String> {
        serde_json::to_string(self).map_err(|e| OtpError::InvalidConfig(e.to_string()))
    }

    /// The configured secret, or `MissingSecret` when unset or blank.
    pub fn secret_str(&self) -> OtpResult<&str> {
        match self.secret.as_deref() {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(OtpError::MissingSecret),
        }
    }

    /// Decode the configured secret into raw key bytes.
    ///
    /// A secret that decodes to no bytes at all (only padding, or fewer than
    /// eight bits of data) counts as missing.
    pub fn secret_bytes(&self) -> OtpResult<Vec<u8>> {
        let key = base32::decode(self.secret_str()?)?;
        if key.is_empty() {
            return Err(OtpError::MissingSecret);
        }
        Ok(key)
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Error type
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Crate-level error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OtpError {
    #[error("no secret configured")]
    MissingSecret,

    #[error("encoded string contains unexpected char #{byte} at offset {offset}")]
    InvalidEncoding { byte: u8, offset: usize },

    #[error("unsupported HMAC algorithm '{0}'")]
    UnsupportedAlgorithm(String),

    #[error("digit count {0} is outside 1..=10")]
    InvalidDigits(u32),

    #[error("interval must be at least one second")]
    InvalidInterval,

    #[error("timestamp {0} is before the Unix epoch")]
    InvalidTimestamp(i64),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type OtpResult<T> = Result<T, OtpError>;

impl From<OtpError> for String {
    fn from(e: OtpError) -> String {
        e.to_string()
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  Verification result
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Outcome of a windowed verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResult {
    pub valid: bool,
    /// How many time-steps or counters off the match was (0 = exact).
    pub drift: i64,
    /// The counter or time-step that matched (if any).
    pub matched_counter: Option<u64>,
}

impl VerifyResult {
    pub(crate) fn matched(counter: u64, drift: i64) -> Self {
        Self {
            valid: true,
            drift,
            matched_counter: Some(counter),
        }
    }

    pub(crate) fn no_match() -> Self {
        Self {
            valid: false,
            drift: 0,
            matched_counter: None,
        }
    }
}
