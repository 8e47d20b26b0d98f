//! HOTP driver (counter-based, RFC 4226).

use subtle::ConstantTimeEq;

use crate::otp::core;
use crate::otp::secret::{self, SecretCharset};
use crate::otp::types::*;
use crate::otp::uri::ProvisioningUri;

/// Counter-based one-time passwords for one secret.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Hotp {
    config: OtpConfig,
}

impl Hotp {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: OtpConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
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

    /// Random secret suitable for [`set_secret`](Self::set_secret).
    pub fn generate_secret(&self, length: usize, charset: SecretCharset) -> String {
        secret::generate_secret(length, charset)
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Generation / verification
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// The password for a specific counter value.
    pub fn counter(&self, count: u64) -> OtpResult<String> {
        core::generate_from_config(&self.config, count)
    }

    /// `true` if `otp` is the password for `counter`.
    pub fn verify(&self, otp: &str, counter: u64) -> OtpResult<bool> {
        let expected = self.counter(counter)?;
        Ok(codes_match(otp, &expected))
    }

    /// Check `counter..=counter + look_ahead` and report the first counter
    /// whose password matches, so the caller can resynchronise.
    pub fn verify_window(&self, otp: &str, counter: u64, look_ahead: u64) -> OtpResult<VerifyResult> {
        let key = self.config.secret_bytes()?;
        let end = counter.saturating_add(look_ahead);
        for c in counter..=end {
            let expected = core::generate(&key, c, self.config.algorithm, self.config.digits)?;
            if codes_match(otp, &expected) {
                let drift = counter_drift(c, counter);
                if drift > 0 {
                    log::debug!("hotp: matched {} counter(s) ahead", drift);
                }
                return Ok(VerifyResult::matched(c, drift));
            }
        }
        Ok(VerifyResult::no_match())
    }

    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
    //  Provisioning
    // ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

    /// `otpauth://hotp/<name>?secret=<secret>&counter=<initial_count>`.
    pub fn provisioning_url(&self, name: &str, initial_count: u64) -> OtpResult<String> {
        let secret = self.config.secret_str()?;
        Ok(ProvisioningUri::hotp(name, secret, initial_count).build())
    }

    /// URL builder carrying this driver's algorithm and digits, for callers
    /// that want the extended parameters.
    pub fn provisioning_uri(&self, name: &str, initial_count: u64) -> OtpResult<ProvisioningUri> {
        let secret = self.config.secret_str()?;
        Ok(ProvisioningUri::hotp(name, secret, initial_count).with_config(&self.config))
    }
}

/// Counters ahead of `start`, clamped to `i64::MAX`.
fn counter_drift(matched: u64, start: u64) -> i64 {
    i64::try_from(matched - start).unwrap_or(i64::MAX)
}

/// Constant-time over equal-length inputs.
pub(crate) fn codes_match(given: &str, expected: &str) -> bool {
    given.len() == expected.len() && bool::from(given.as_bytes().ct_eq(expected.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    // Secret: "12345678901234567890" (ASCII)
    const RFC4226_SECRET: &str = "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ";

    fn rfc_hotp() -> Hotp {
        let mut hotp = Hotp::new();
        hotp.set_secret(RFC4226_SECRET);
        hotp
    }

    #[test]
    fn rfc4226_vectors() {
        let hotp = rfc_hotp();
        assert_eq!(hotp.counter(0).unwrap(), "755224");
        assert_eq!(hotp.counter(1).unwrap(), "287082");
        assert_eq!(hotp.counter(9).unwrap(), "520489");
    }

    #[test]
    fn missing_secret() {
        let hotp = Hotp::new();
        assert_eq!(hotp.counter(0), Err(OtpError::MissingSecret));
        assert_eq!(hotp.verify("755224", 0), Err(OtpError::MissingSecret));
        assert_eq!(hotp.provisioning_url("a", 0), Err(OtpError::MissingSecret));
    }

    #[test]
    fn verify_exact() {
        let hotp = rfc_hotp();
        assert!(hotp.verify("755224", 0).unwrap());
        assert!(!hotp.verify("755224", 1).unwrap());
        assert!(!hotp.verify("755225", 0).unwrap());
        assert!(!hotp.verify("75522", 0).unwrap());
        assert!(!hotp.verify("", 0).unwrap());
    }

    #[test]
    fn verify_window_lookahead() {
        let hotp = rfc_hotp();
        let vr = hotp.verify_window("969429", 1, 5).unwrap();
        assert!(vr.valid);
        assert_eq!(vr.matched_counter, Some(3));
        assert_eq!(vr.drift, 2);
    }

    #[test]
    fn verify_window_exhausted() {
        let hotp = rfc_hotp();
        // counter 9 is outside 0..=3
        let vr = hotp.verify_window("520489", 0, 3).unwrap();
        assert_eq!(vr, VerifyResult::no_match());
    }

    #[test]
    fn verify_window_saturates_at_max() {
        let hotp = rfc_hotp();
        let otp = hotp.counter(u64::MAX).unwrap();
        let vr = hotp.verify_window(&otp, u64::MAX - 1, 10).unwrap();
        assert_eq!(vr.matched_counter, Some(u64::MAX));
    }

    #[test]
    fn settings_change_output() {
        let mut hotp = rfc_hotp();
        hotp.set_algorithm_name("sha256").unwrap().set_digits(8);
        assert_eq!(hotp.config().algorithm, Algorithm::Sha256);
        assert_eq!(hotp.counter(1).unwrap().len(), 8);
        assert_ne!(hotp.counter(1).unwrap(), "94287082");
    }

    #[test]
    fn unsupported_algorithm_name_keeps_config() {
        let mut hotp = rfc_hotp();
        assert!(matches!(
            hotp.set_algorithm_name("whirlpool"),
            Err(OtpError::UnsupportedAlgorithm(_))
        ));
        assert_eq!(hotp.config().algorithm, Algorithm::Sha1);
    }

    #[test]
    fn ripemd160_by_name() {
        let mut hotp = Hotp::new();
        hotp.set_secret("ABCDEFGHIJK").set_digits(8);
        hotp.set_algorithm_name("ripemd160").unwrap();
        assert_eq!(hotp.config().algorithm, Algorithm::Ripemd160);
        assert!(hotp.verify("36605754", 1).unwrap());
    }

    #[test]
    fn drift_saturates_instead_of_wrapping() {
        assert_eq!(counter_drift(5, 3), 2);
        assert_eq!(counter_drift(u64::MAX, 0), i64::MAX);
        assert_eq!(counter_drift(i64::MAX as u64 + 1, 0), i64::MAX);
    }

    #[test]
    fn provisioning_url() {
        let mut hotp = Hotp::new();
        hotp.set_secret("ABCDEFGHIJK");
        assert_eq!(
            hotp.provisioning_url("Accountname", 1).unwrap(),
            "otpauth://hotp/Accountname?secret=ABCDEFGHIJK&counter=1"
        );
    }

    #[test]
    fn provisioning_uri_extended() {
        let mut hotp = rfc_hotp();
        hotp.set_digits(8);
        let uri = hotp.provisioning_uri("bob", 5).unwrap().with_issuer("Acme");
        assert_eq!(
            uri.build(),
            format!(
                "otpauth://hotp/Acme:bob?secret={}&issuer=Acme&digits=8&counter=5",
                RFC4226_SECRET
            )
        );
    }

    #[test]
    fn codes_match_requires_equal_length() {
        assert!(codes_match("123456", "123456"));
        assert!(!codes_match("123456", "123457"));
        assert!(!codes_match("12345", "123456"));
    }
}
