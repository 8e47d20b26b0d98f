//! OTP crate: sub-modules.

pub mod types;
pub mod base32;
pub mod core;
pub mod clock;
pub mod hotp;
pub mod totp;
pub mod uri;
pub mod secret;

// Re-export top-level items for convenience.
pub use types::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use hotp::Hotp;
pub use totp::Totp;
pub use uri::ProvisioningUri;
pub use secret::{generate_secret, SecretCharset};
