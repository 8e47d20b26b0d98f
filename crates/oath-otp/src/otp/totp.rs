//! TOTP driver (time-based, RFC 6238).
//!
//! The moving factor is `timestamp / interval`. Timestamps come from the
//! caller or from the driver's [`Clock`]; anything before the Unix epoch is
//! rejected rather than rounded.

use crate::otp::clock::{Clock, SystemClock};
use crate::otp::core;
use crate::otp::hotp::codes_match;
use crate::otp::secret::{self, SecretCharset};
use crate::otp::types::*;
use crate::otp::uri::ProvisioningUri;

/// Verification windows wider than this many steps each side get logged.
const WIDE_WINDOW: u32 = 16;

/// Time-based one-time passwords for one secret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Totp<C = SystemClock> {
    config: OtpConfig,
    clock: C,
}

impl Default for Totp<SystemClock> {
    fn default() -> Self {
        Self::from_config(OtpConfig::default())
    }
}

impl Totp<SystemClock> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: OtpConfig) -> Self {
        Self {
            config,
            clock: SystemClock,
        }
    }
}

impl<C: Clock> Totp<C> {
    /// Swap the time source.
    pub fn with_clock<D: Clock>(self, clock: D) -> Totp<D> {
        Totp {
            config: self.config,
            clock,
        }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Setters
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    pub fn set_secret(&mut self, secret: impl Into<String>) -> &mut Self {
        self.config.secret = Some(secret.into());
        self
    }

    pub fn set_algorithm(&mut self, algo: Algorithm) -> &mut Self {
        self.config.algorithm = algo;
        self
    }

    /// Select the digest by name; unknown names leave the config untouched.
    pub fn set_algorithm_name(&mut self, name: &str) -> OtpResult<&mut Self> {
        self.config.algorithm = name.parse()?;
        Ok(self)
    }

    pub fn set_digits(&mut self, digits: u32) -> &mut Self {
        self.config.digits = digits;
        self
    }

    /// Seconds a password stays valid.
    pub fn set_interval(&mut self, interval: u64) -> &mut Self {
        self.config.interval = interval;
        self
    }

    /// Random secret suitable for [`set_secret`](Self::set_secret).
    pub fn generate_secret(&self, length: usize, charset: SecretCharset) -> String {
        secret::generate_secret(length, charset)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Time steps
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// The time-step counter for a Unix timestamp.
    ///
    /// Timestamps before the epoch fail with `InvalidTimestamp` rather than
    /// being floored or truncated: the two roundings disagree there, and no
    /// RFC 6238 counter is defined for them.
    pub fn time_code(&self, timestamp: i64) -> OtpResult<u64> {
        let interval = self.interval()?;
        if timestamp < 0 {
            return Err(OtpError::InvalidTimestamp(timestamp));
        }
        Ok(timestamp as u64 / interval)
    }

    /// Seconds until the step containing `timestamp` ends.
    pub fn remaining_seconds(&self, timestamp: i64) -> OtpResult<u64> {
        let interval = self.interval()?;
        if timestamp < 0 {
            return Err(OtpError::InvalidTimestamp(timestamp));
        }
        Ok(interval - timestamp as u64 % interval)
    }

    fn interval(&self) -> OtpResult<u64> {
        match self.config.interval {
            0 => Err(OtpError::InvalidInterval),
            i => Ok(i),
        }
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Generation / verification
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// The password for a specific Unix timestamp.
    pub fn timestamp(&self, timestamp: i64) -> OtpResult<String> {
        let step = self.time_code(timestamp)?;
        core::generate_from_config(&self.config, step)
    }

    /// The password for the clock's current time.
    pub fn now(&self) -> OtpResult<String> {
        self.timestamp(self.clock.now())
    }

    /// `true` if `otp` is valid at `timestamp` (the clock's time when `None`),
    /// allowing `discrepancy` intervals of skew on either side.
    pub fn verify(&self, otp: &str, discrepancy: u32, timestamp: Option<i64>) -> OtpResult<bool> {
        Ok(self.verify_with_drift(otp, discrepancy, timestamp)?.valid)
    }

    /// Like [`verify`](Self::verify), reporting which offset matched.
    ///
    /// Offsets are tried from `-discrepancy` upward and the first match wins.
    /// Offsets that land before the epoch count as non-matching.
    pub fn verify_with_drift(
        &self,
        otp: &str,
        discrepancy: u32,
        timestamp: Option<i64>,
    ) -> OtpResult<VerifyResult> {
        let ts = timestamp.unwrap_or_else(|| self.clock.now());
        self.time_code(ts)?;
        let key = self.config.secret_bytes()?;
        let interval = i64::try_from(self.config.interval).map_err(|_| OtpError::InvalidInterval)?;

        if discrepancy > WIDE_WINDOW {
            log::debug!(
                "totp: verifying across {} steps (discrepancy {})",
                2 * discrepancy as u64 + 1,
                discrepancy
            );
        }

        let d = discrepancy as i64;
        for i in -d..=d {
            let shifted = match i.checked_mul(interval).and_then(|o| ts.checked_add(o)) {
                Some(t) if t >= 0 => t,
                _ => continue,
            };
            let step = shifted as u64 / interval as u64;
            let expected = core::generate(&key, step, self.config.algorithm, self.config.digits)?;
            if codes_match(otp, &expected) {
                return Ok(VerifyResult::matched(step, i));
            }
        }

        Ok(VerifyResult::no_match())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Provisioning
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `otpauth://totp/<name>?secret=<secret>`.
    pub fn provisioning_url(&self, name: &str) -> OtpResult<String> {
        let secret = self.config.secret_str()?;
        Ok(ProvisioningUri::totp(name, secret).build())
    }

    /// URL builder carrying this driver's algorithm, digits and interval.
    pub fn provisioning_uri(&self, name: &str) -> OtpResult<ProvisioningUri> {
        let secret = self.config.secret_str()?;
        Ok(ProvisioningUri::totp(name, secret).with_config(&self.config))
    }
}
