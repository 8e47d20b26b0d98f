//! # oath-otp – HOTP / TOTP one-time passwords
//!
//! Counter-based and time-based one-time password crate:
//!
//! - **RFC 4226 / 6238** – HOTP & TOTP generation and verification with SHA-1,
//!   SHA-2 and MD5 HMAC digests
//! - **Base32** – RFC 4648 alphabet codec used for shared secrets
//! - **otpauth:// URLs** – Provisioning URLs for authenticator apps
//! - **Secrets** – Random Base32-alphabet secret generation
//!
//! The crate is a pure computation library: callers own the secret, the
//! HOTP counter and (through [`otp::Clock`]) the time source.

pub mod otp;

pub use otp::*;
