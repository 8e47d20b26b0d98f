//! `otpauth://` provisioning URLs, as consumed by authenticator apps:
//! <https://github.com/google/google-authenticator/wiki/Key-Uri-Format>
//!
//! Minimal form: `otpauth://totp/LABEL?secret=BASE32`, or
//! `otpauth://hotp/LABEL?secret=BASE32&counter=N`. `issuer`, `algorithm`,
//! `digits` and `period` are appended only when set or non-default.

use std::fmt;

use crate::otp::types::*;

/// Which OTP flavour a URL provisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpKind {
    Totp,
    Hotp { counter: u64 },
}

impl fmt::Display for OtpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Totp => write!(f, "totp"),
            Self::Hotp { .. } => write!(f, "hotp"),
        }
    }
}

/// Builder for an `otpauth://` URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningUri {
    pub kind: OtpKind,
    pub label: String,
    /// Passed through unchanged; assumed to already be Base-32.
    pub secret: String,
    pub issuer: Option<String>,
    pub algorithm: Algorithm,
    pub digits: u32,
    pub period: u64,
}

impl ProvisioningUri {
    pub fn totp(label: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::new(OtpKind::Totp, label.into(), secret.into())
    }

    pub fn hotp(label: impl Into<String>, secret: impl Into<String>, counter: u64) -> Self {
        Self::new(OtpKind::Hotp { counter }, label.into(), secret.into())
    }

    fn new(kind: OtpKind, label: String, secret: String) -> Self {
        Self {
            kind,
            label,
            secret,
            issuer: None,
            algorithm: Algorithm::default(),
            digits: DEFAULT_DIGITS,
            period: DEFAULT_INTERVAL,
        }
    }

    /// Builder: set issuer (shown as `Issuer:label` and `issuer=`).
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    pub fn with_algorithm(mut self, algo: Algorithm) -> Self {
        self.algorithm = algo;
        self
    }

    pub fn with_digits(mut self, digits: u32) -> Self {
        self.digits = digits;
        self
    }

    pub fn with_period(mut self, period: u64) -> Self {
        self.period = period;
        self
    }

    /// Carry algorithm, digits and interval over from a driver config.
    pub fn with_config(self, config: &OtpConfig) -> Self {
        self.with_algorithm(config.algorithm)
            .with_digits(config.digits)
            .with_period(config.interval)
    }

    pub fn build(&self) -> String {
        let label = url_encode(&self.label);
        let path = match &self.issuer {
            Some(iss) if !iss.is_empty() => format!("{}:{}", url_encode(iss), label),
            _ => label,
        };

        let mut params = vec![format!("secret={}", self.secret)];

        if let Some(iss) = self.issuer.as_deref().filter(|i| !i.is_empty()) {
            params.push(format!("issuer={}", url_encode(iss)));
        }

        if self.algorithm != Algorithm::Sha1 {
            params.push(format!("algorithm={}", self.algorithm.uri_name()));
        }

        if self.digits != DEFAULT_DIGITS {
            params.push(format!("digits={}", self.digits));
        }

        match self.kind {
            OtpKind::Totp if self.period != DEFAULT_INTERVAL => {
                params.push(format!("period={}", self.period));
            }
            OtpKind::Hotp { counter } => params.push(format!("counter={}", counter)),
            OtpKind::Totp => {}
        }

        format!("otpauth://{}/{}?{}", self.kind, path, params.join("&"))
    }
}

impl fmt::Display for ProvisioningUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.build())
    }
}

/// Form-urlencode a label component (space becomes `+`).
fn url_encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
