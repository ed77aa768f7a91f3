//! This library generates and verifies time-based one-time passwords ([rfc-6238](https://tools.ietf.org/html/rfc6238)),
//! creates base32 secrets from a pluggable entropy source, and formats the `otpauth://` URIs that authenticator apps scan.
//!
//! The [TOTP] engine never stores a secret: every call takes the base32 secret it works on.
//! Randomness and time come from the [EntropySource] and [Clock] it was built with.
//!
//! Be aware that some authenticator apps will accept the `SHA256`
//! and `SHA512` algorithms but silently fallback to `SHA1` which will
//! make the `verify_code()` function fail due to mismatched algorithms.
//!
//! Use the `SHA1` algorithm to avoid this problem.
//!
//! # Examples
//!
//! ```rust
//! use tfa_rs::TOTP;
//!
//! let totp = TOTP::new("Github", 6, 30, "sha1").unwrap();
//! let secret = totp.create_secret(160, true).unwrap();
//!
//! let code = totp.get_code(&secret, 1496641949).unwrap();
//! assert!(totp.verify_code(&secret, &code, 1, 1496641949).unwrap());
//!
//! let uri = totp.get_qr_text("constantoine@github.com", &secret);
//! assert!(uri.starts_with("otpauth://totp/constantoine%40github.com?secret="));
//! ```
//!
//! ```rust
//! use tfa_rs::{clock::FixedClock, entropy::OsEntropy, TOTP};
//!
//! let totp = TOTP::with_sources("Test Case", 6, 30, "sha1", OsEntropy, FixedClock(1496641949)).unwrap();
//! let code = totp.get_code_current("K4C54QRWAECUQPRDCCQRRKC3VWPDEUMN").unwrap();
//! assert_eq!(code, "186332");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod base32;
pub mod clock;
mod config;
pub mod entropy;
mod error;
#[cfg(feature = "remote")]
mod http;
pub mod qr;
mod secret;
mod uri;
pub mod validator;

pub use clock::{Clock, ClockError, FixedClock, SystemClock};
pub use config::TotpConfig;
pub use entropy::{EntropyError, EntropySource, OsEntropy};
pub use error::{TotpError, UriError};
pub use qr::{QrError, QrRenderer};
pub use secret::Secret;
pub use uri::ProvisioningUri;
pub use validator::ConfigError;

use crate::base32::Base32Error;
use constant_time_eq::constant_time_eq;

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

use core::fmt;

use hmac::Mac;
use log::{debug, trace, warn};

type HmacSha1 = hmac::Hmac<sha1::Sha1>;
type HmacSha256 = hmac::Hmac<sha2::Sha256>;
type HmacSha512 = hmac::Hmac<sha2::Sha512>;
type HmacMd5 = hmac::Hmac<md5::Md5>;

pub const DEFAULT_DIGITS: usize = 6;
pub const DEFAULT_PERIOD: u64 = 30;
pub const DEFAULT_DISCREPANCY: u8 = 1;
pub const DEFAULT_SECRET_BITS: usize = 80;
pub const DEFAULT_LENIENCY: u64 = 5;
pub const DEFAULT_QR_SIZE: u32 = 200;

/// Algorithm enum holds the keyed hashes a [TOTP] can sign with: the three standard algorithms as per the
/// [reference implementation](https://tools.ietf.org/html/rfc6238#appendix-A), plus MD5 for legacy tokens
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub enum Algorithm {
    #[default]
    SHA1,
    SHA256,
    SHA512,
    MD5,
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::SHA1 => f.write_str("SHA1"),
            Algorithm::SHA256 => f.write_str("SHA256"),
            Algorithm::SHA512 => f.write_str("SHA512"),
            Algorithm::MD5 => f.write_str("MD5"),
        }
    }
}

impl std::str::FromStr for Algorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validator::validate_algorithm(s)
    }
}

impl Algorithm {
    fn hash<D>(mut digest: D, data: &[u8]) -> Vec<u8>
    where
        D: Mac,
    {
        digest.update(data);
        digest.finalize().into_bytes().to_vec()
    }

    fn sign(&self, key: &[u8], data: &[u8]) -> Vec<u8> {
        const ANY_KEY: &str = "HMAC can take a key of any size";
        match self {
            Algorithm::SHA1 => Algorithm::hash(HmacSha1::new_from_slice(key).expect(ANY_KEY), data),
            Algorithm::SHA256 => {
                Algorithm::hash(HmacSha256::new_from_slice(key).expect(ANY_KEY), data)
            }
            Algorithm::SHA512 => {
                Algorithm::hash(HmacSha512::new_from_slice(key).expect(ANY_KEY), data)
            }
            Algorithm::MD5 => Algorithm::hash(HmacMd5::new_from_slice(key).expect(ANY_KEY), data),
        }
    }
}

/// The counter for `time`: whole periods since the epoch, plus `offset` *periods' worth of slices*.
///
/// The offset is multiplied by the period rather than added as a number of slices. This is kept
/// for compatibility with codes issued by existing deployments; [TOTP::verify_code] does not use it.
/// The result saturates instead of wrapping.
///
/// # Panics
///
/// Panics if `period` is 0. A [TOTP] never has a zero period.
pub fn time_slice(period: u64, time: u64, offset: i64) -> u64 {
    let period_signed = i64::try_from(period).unwrap_or(i64::MAX);
    (time / period).saturating_add_signed(offset.saturating_mul(period_signed))
}

/// Compare two codes in time that depends only on their length.
///
/// Inputs of different lengths are unequal; their content is not looked at.
pub fn constant_time_equals(a: &[u8], b: &[u8]) -> bool {
    constant_time_eq(a, b)
}

/// TOTP holds the configuration used to generate and verify auth codes, along with the
/// [EntropySource] new secrets are drawn from and the [Clock] "now" is read from.
///
/// The configuration is validated once, in the constructors, and can't change afterwards.
#[derive(Debug, Clone)]
pub struct TOTP<E = OsEntropy, C = SystemClock> {
    /// The "Github" in `otpauth://...&issuer=Github`. May be empty
    issuer: String,
    /// The number of digits composing the auth code. Per [rfc-4226](https://tools.ietf.org/html/rfc4226#section-5.3), this should oscilate between 6 and 8 digits
    digits: usize,
    /// Duration in seconds of a step. The recommended value per [rfc-6238](https://tools.ietf.org/html/rfc6238#section-5.2) is 30 seconds
    period: u64,
    /// SHA-1 is the most widespread algorithm used, and for totp pursposes, SHA-1 hash collisions are [not a problem](https://tools.ietf.org/html/rfc4226#appendix-B.2) as HMAC-SHA-1 is not impacted
    algorithm: Algorithm,
    entropy: E,
    clock: C,
}

impl<E, C> PartialEq for TOTP<E, C> {
    /// Will not check for issuer, entropy or clock
    /// As they aren't taken in account for token generation/token checking
    fn eq(&self, other: &Self) -> bool {
        self.algorithm == other.algorithm
            && self.digits == other.digits
            && self.period == other.period
    }
}

impl<E, C> fmt::Display for TOTP<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "digits: {}; period: {}; alg: {}; issuer: <{}>",
            self.digits, self.period, self.algorithm, self.issuer
        )
    }
}

impl TOTP {
    /// Will create a new instance of TOTP running on [OsEntropy] and [SystemClock]. See [with_sources](#method.with_sources)
    ///
    /// # Errors
    ///
    /// Will return a [ConfigError] when `digits` or `period` is 0, or `algorithm` isn't one of sha1, sha256, sha512 or md5
    pub fn new<S: Into<String>>(
        issuer: S,
        digits: usize,
        period: u64,
        algorithm: &str,
    ) -> Result<TOTP, ConfigError> {
        TOTP::with_sources(issuer, digits, period, algorithm, OsEntropy, SystemClock)
    }

    /// Will create a TOTP with the defaults: 6 digits, 30 seconds, SHA1
    pub fn with_defaults<S: Into<String>>(issuer: S) -> TOTP {
        TOTP {
            issuer: issuer.into(),
            digits: DEFAULT_DIGITS,
            period: DEFAULT_PERIOD,
            algorithm: Algorithm::SHA1,
            entropy: OsEntropy,
            clock: SystemClock,
        }
    }
}

impl<E: EntropySource, C: Clock> TOTP<E, C> {
    /// Will create a new instance of TOTP with given parameters and sources
    ///
    /// * `issuer`: free text, may be empty
    /// * `digits`: must be greater than 0. Most apps only understand 6 to 8
    /// * `period`: seconds per step, must be greater than 0
    /// * `algorithm`: `sha1`, `sha256`, `sha512` or `md5`, case insensitive
    ///
    /// ```rust
    /// use tfa_rs::{entropy::HashChainEntropy, SystemClock, TOTP};
    /// let totp = TOTP::with_sources("", 8, 60, "SHA256", HashChainEntropy::default(), SystemClock).unwrap();
    /// assert_eq!(totp.digits(), 8);
    /// ```
    ///
    /// # Errors
    ///
    /// Checks run in the order code length, period, algorithm, and the first failure is returned
    pub fn with_sources<S: Into<String>>(
        issuer: S,
        digits: usize,
        period: u64,
        algorithm: &str,
        entropy: E,
        clock: C,
    ) -> Result<TOTP<E, C>, ConfigError> {
        let digits = validator::validate_code_length(digits)?;
        let period = validator::validate_period(period)?;
        let algorithm = validator::validate_algorithm(algorithm)?;
        Ok(TOTP::assemble(
            issuer.into(),
            digits,
            period,
            algorithm,
            entropy,
            clock,
        ))
    }

    fn assemble(
        issuer: String,
        digits: usize,
        period: u64,
        algorithm: Algorithm,
        entropy: E,
        clock: C,
    ) -> TOTP<E, C> {
        debug!(
            "TOTP configured: {} digits, {}s period, {}, entropy {}, clock {}",
            digits,
            period,
            algorithm,
            entropy.name(),
            clock.name()
        );
        TOTP {
            issuer,
            digits,
            period,
            algorithm,
            entropy,
            clock,
        }
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    pub fn digits(&self) -> usize {
        self.digits
    }

    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub fn entropy(&self) -> &E {
        &self.entropy
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Will compute the code for a raw (decoded) secret and a time slice
    ///
    /// Only the low 32 bits of the slice take part, as the 8 bytes counter is 4 zero bytes
    /// followed by the big endian slice.
    pub fn compute_code(&self, secret: &[u8], time_slice: u64) -> String {
        let mut counter = [0u8; 8];
        counter[4..].copy_from_slice(&(time_slice as u32).to_be_bytes());
        let result = self.algorithm.sign(secret, &counter);

        let offset = (result[result.len() - 1] & 15) as usize;
        // MD5 digests are 16 bytes, so the window can run past the end; missing bytes read as 0
        let mut window = [0u8; 4];
        for (slot, byte) in window.iter_mut().zip(result.iter().skip(offset)) {
            *slot = *byte;
        }
        let value = u64::from(u32::from_be_bytes(window) & 0x7fff_ffff);

        let code = match u32::try_from(self.digits)
            .ok()
            .and_then(|digits| 10_u64.checked_pow(digits))
        {
            Some(modulus) => value % modulus,
            None => value,
        };
        format!("{:0width$}", code, width = self.digits)
    }

    /// The time slice `time` falls in
    pub fn time_slice(&self, time: u64) -> u64 {
        time_slice(self.period, time, 0)
    }

    /// Will generate the code of a base32 secret for the provided timestamp in seconds
    ///
    /// # Errors
    ///
    /// Will return a [Base32Error] when the secret isn't valid base32
    pub fn get_code(&self, secret: &str, time: u64) -> Result<String, Base32Error> {
        let key = crate::base32::decode(secret)?;
        Ok(self.compute_code(&key, self.time_slice(time)))
    }

    /// Will generate the code of a base32 secret according to the TOTP's clock
    pub fn get_code_current(&self, secret: &str) -> Result<String, TotpError> {
        let time = self.clock.time()?;
        Ok(self.get_code(secret, time)?)
    }

    /// Will check if `code` is valid for the provided timestamp in seconds, accepting codes from up to
    /// `discrepancy` steps before or after. Every step of the window is computed and compared, whatever matches
    ///
    /// # Errors
    ///
    /// Will return a [Base32Error] when the secret isn't valid base32
    pub fn verify_code(
        &self,
        secret: &str,
        code: &str,
        discrepancy: u8,
        time: u64,
    ) -> Result<bool, Base32Error> {
        let key = crate::base32::decode(secret)?;
        let period = i64::try_from(self.period).unwrap_or(i64::MAX);
        let discrepancy = i64::from(discrepancy);

        let mut result = false;
        for i in -discrepancy..=discrepancy {
            let step_time = time.saturating_add_signed(i.saturating_mul(period));
            let candidate = self.compute_code(&key, self.time_slice(step_time));
            result |= constant_time_equals(candidate.as_bytes(), code.as_bytes());
        }
        Ok(result)
    }

    /// Will check if `code` is valid according to the TOTP's clock, see [verify_code](#method.verify_code)
    pub fn verify_code_current(
        &self,
        secret: &str,
        code: &str,
        discrepancy: u8,
    ) -> Result<bool, TotpError> {
        let time = self.clock.time()?;
        Ok(self.verify_code(secret, code, discrepancy, time)?)
    }

    /// Will create a new base32 secret carrying `bits` bits of entropy, one character per 5 bits
    ///
    /// Each character is the low 5 bits of one byte from the entropy source. No padding is ever added.
    ///
    /// # Errors
    ///
    /// Will return [EntropyError::Insecure] without requesting any bytes when `require_secure` is set
    /// and the entropy source is not cryptographically secure, and whatever the source returns when it fails
    pub fn create_secret(&self, bits: usize, require_secure: bool) -> Result<String, EntropyError> {
        let count = bits / 5 + usize::from(bits % 5 != 0);
        if !self.entropy.is_secure() {
            if require_secure {
                return Err(EntropyError::Insecure);
            }
            warn!(
                "creating a secret from insecure entropy source {}",
                self.entropy.name()
            );
        }
        let bytes = self.entropy.get_bytes(count)?;
        if bytes.len() < count {
            return Err(EntropyError::Unavailable(format!(
                "{} returned {} of {} bytes",
                self.entropy.name(),
                bytes.len(),
                count
            )));
        }
        debug!("created a {} characters secret", count);
        Ok(bytes[..count]
            .iter()
            .map(|byte| crate::base32::ALPHABET[(byte & 31) as usize] as char)
            .collect())
    }

    /// Will check that every provider agrees with the TOTP's clock within `leniency` seconds
    ///
    /// # Errors
    ///
    /// Will return [ClockError::Skew] naming the first provider that is off by more than `leniency`,
    /// or the [ClockError::Unavailable] of a clock that can't tell the time
    pub fn validate_time<P: Clock>(&self, providers: &[P], leniency: u64) -> Result<(), ClockError> {
        for provider in providers {
            let own = self.clock.time()?;
            let theirs = provider.time()?;
            let difference = own.abs_diff(theirs);
            trace!(
                "{} is {}s away from {}",
                provider.name(),
                difference,
                self.clock.name()
            );
            if difference > leniency {
                return Err(ClockError::Skew {
                    provider: provider.name(),
                    leniency,
                    difference,
                });
            }
        }
        Ok(())
    }

    /// Will check the TOTP's clock against [default_remote_clocks](clock/fn.default_remote_clocks.html)
    #[cfg(feature = "remote")]
    #[cfg_attr(docsrs, doc(cfg(feature = "remote")))]
    pub fn validate_time_remote(&self, leniency: u64) -> Result<(), ClockError> {
        let providers = clock::default_remote_clocks()?;
        self.validate_time(&providers[..], leniency)
    }

    /// Give the ttl (in seconds) of the code current at `time`
    pub fn ttl(&self, time: u64) -> u64 {
        self.period - (time % self.period)
    }

    /// Give the ttl (in seconds) of the current code, according to the TOTP's clock
    pub fn ttl_current(&self) -> Result<u64, ClockError> {
        Ok(self.ttl(self.clock.time()?))
    }

    /// Returns the timestamp of the first second for the next step
    /// given the provided timestamp in seconds
    pub fn next_step(&self, time: u64) -> u64 {
        (time / self.period)
            .saturating_add(1)
            .saturating_mul(self.period)
    }

    /// The provisioning URI for `secret`, see [get_qr_text](#method.get_qr_text)
    pub fn provisioning_uri(&self, label: &str, secret: &str) -> ProvisioningUri {
        ProvisioningUri {
            label: label.to_string(),
            secret: secret.to_string(),
            issuer: self.issuer.clone(),
            period: self.period,
            algorithm: self.algorithm,
            digits: self.digits,
        }
    }

    /// Will generate the standard URI used to automatically add TOTP auths. Usually used with qr codes
    ///
    /// Every value is percent-encoded as per rfc-3986
    pub fn get_qr_text(&self, label: &str, secret: &str) -> String {
        self.provisioning_uri(label, secret).to_string()
    }

    /// Will return a QR code of the provisioning URI as a `data:` URI, which you can embed in HTML without needing
    /// to store the image as a file
    ///
    /// # Errors
    ///
    /// Will return [QrError::InvalidSize] when `size` is 0 or above [qr::MAX_SIZE], before the renderer is called, and the renderer's error when it fails
    pub fn image_to_data<R: QrRenderer + ?Sized>(
        &self,
        renderer: &R,
        label: &str,
        secret: &str,
        size: u32,
    ) -> Result<String, QrError> {
        qr::data_uri(renderer, &self.get_qr_text(label, secret), size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const SECRET: &str = "K4C54QRWAECUQPRDCCQRRKC3VWPDEUMN";
    const CODE: &str = "186332";
    const ISSUE_TIME: u64 = 1496641949;

    /// Yields 0, 1, 2, ... and counts requests
    struct SequenceEntropy {
        secure: bool,
        requests: Cell<usize>,
    }

    impl SequenceEntropy {
        fn new(secure: bool) -> SequenceEntropy {
            SequenceEntropy {
                secure,
                requests: Cell::new(0),
            }
        }
    }

    impl EntropySource for SequenceEntropy {
        fn get_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
            self.requests.set(self.requests.get() + 1);
            Ok((0..count).map(|i| i as u8).collect())
        }

        fn is_secure(&self) -> bool {
            self.secure
        }
    }

    struct ShortEntropy;

    impl EntropySource for ShortEntropy {
        fn get_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
            Ok(vec![0; count / 2])
        }

        fn is_secure(&self) -> bool {
            true
        }
    }

    struct BrokenClock;

    impl Clock for BrokenClock {
        fn time(&self) -> Result<u64, ClockError> {
            Err(ClockError::Unavailable {
                provider: "BrokenClock".to_string(),
                reason: "unplugged".to_string(),
            })
        }
    }

    fn totp() -> TOTP<OsEntropy, FixedClock> {
        TOTP::with_sources("Test Case", 6, 30, "sha1", OsEntropy, FixedClock(ISSUE_TIME)).unwrap()
    }

    fn totp_with(secure: bool) -> TOTP<SequenceEntropy, SystemClock> {
        TOTP::with_sources(
            "Test Case",
            6,
            30,
            "sha1",
            SequenceEntropy::new(secure),
            SystemClock,
        )
        .unwrap()
    }

    #[test]
    fn default_values() {
        let totp = TOTP::with_defaults("Github");
        assert_eq!(totp.issuer(), "Github");
        assert_eq!(totp.algorithm(), Algorithm::SHA1);
        assert_eq!(totp.digits(), 6);
        assert_eq!(totp.period(), 30);
        assert_eq!(totp, TOTP::new("Other", 6, 30, "sha1").unwrap());
    }

    #[test]
    fn new_invalid_digits() {
        assert_eq!(
            TOTP::new("Test Case", 0, 30, "sha1").unwrap_err(),
            ConfigError::CodeLength(0)
        );
    }

    #[test]
    fn new_invalid_period() {
        assert_eq!(
            TOTP::new("Test Case", 6, 0, "sha1").unwrap_err(),
            ConfigError::Period(0)
        );
    }

    #[test]
    fn new_invalid_algorithm() {
        assert_eq!(
            TOTP::new("Test Case", 6, 30, "invalid algorithm").unwrap_err(),
            ConfigError::Algorithm("invalid algorithm".to_string())
        );
    }

    #[test]
    fn new_reports_first_failure() {
        assert_eq!(
            TOTP::new("Test Case", 0, 0, "invalid algorithm").unwrap_err(),
            ConfigError::CodeLength(0)
        );
        assert_eq!(
            TOTP::new("Test Case", 6, 0, "invalid algorithm").unwrap_err(),
            ConfigError::Period(0)
        );
    }

    #[test]
    fn new_algorithms() {
        assert_eq!(TOTP::new("", 6, 30, "SHA256").unwrap().algorithm(), Algorithm::SHA256);
        assert_eq!(TOTP::new("", 6, 30, " sha512").unwrap().algorithm(), Algorithm::SHA512);
        assert_eq!(TOTP::new("", 6, 30, "md5").unwrap().algorithm(), Algorithm::MD5);
        assert_eq!("Sha1".parse::<Algorithm>(), Ok(Algorithm::SHA1));
    }

    #[test]
    fn comparison() {
        let reference = TOTP::new("A", 6, 30, "sha1").unwrap();
        assert_ne!(reference, TOTP::new("A", 8, 30, "sha1").unwrap());
        assert_ne!(reference, TOTP::new("A", 6, 60, "sha1").unwrap());
        assert_ne!(reference, TOTP::new("A", 6, 30, "sha256").unwrap());
    }

    #[test]
    fn display() {
        assert_eq!(
            totp().to_string(),
            "digits: 6; period: 30; alg: SHA1; issuer: <Test Case>"
        );
    }

    #[test]
    fn generate_golden_code() {
        assert_eq!(totp().get_code(SECRET, ISSUE_TIME).unwrap(), CODE);
    }

    #[test]
    fn generate_current_uses_clock() {
        assert_eq!(totp().get_code_current(SECRET).unwrap(), CODE);
        let broken =
            TOTP::with_sources("", 6, 30, "sha1", OsEntropy, BrokenClock).unwrap();
        assert!(matches!(
            broken.get_code_current(SECRET),
            Err(TotpError::Clock(ClockError::Unavailable { .. }))
        ));
    }

    #[test]
    fn generate_other_algorithms() {
        for (algorithm, six, eight) in [
            ("sha1", "186332", "85186332"),
            ("sha256", "983237", "07983237"),
            ("sha512", "058681", "65058681"),
            ("md5", "375397", "03375397"),
        ] {
            let totp6 = TOTP::new("", 6, 30, algorithm).unwrap();
            let totp8 = TOTP::new("", 8, 30, algorithm).unwrap();
            assert_eq!(totp6.get_code(SECRET, ISSUE_TIME).unwrap(), six);
            assert_eq!(totp8.get_code(SECRET, ISSUE_TIME).unwrap(), eight);
        }
    }

    #[test]
    fn rfc6238_vectors() {
        let sha1 = TOTP::new("", 8, 30, "sha1").unwrap();
        let key = b"12345678901234567890";
        assert_eq!(sha1.compute_code(key, sha1.time_slice(59)), "94287082");
        assert_eq!(sha1.compute_code(key, sha1.time_slice(1111111109)), "07081804");

        let sha256 = TOTP::new("", 8, 30, "sha256").unwrap();
        let key = b"12345678901234567890123456789012";
        assert_eq!(sha256.compute_code(key, sha256.time_slice(59)), "46119246");

        let sha512 = TOTP::new("", 8, 30, "sha512").unwrap();
        let key = b"1234567890123456789012345678901234567890123456789012345678901234";
        assert_eq!(sha512.compute_code(key, sha512.time_slice(59)), "90693936");
    }

    #[test]
    fn code_is_function_of_slice() {
        let key = crate::base32::decode(SECRET).unwrap();
        let thirty = TOTP::new("", 6, 30, "sha1").unwrap();
        let sixty = TOTP::new("", 6, 60, "sha1").unwrap();
        let slice = thirty.time_slice(ISSUE_TIME);
        assert_eq!(sixty.time_slice(slice * 60), slice);
        assert_eq!(
            thirty.get_code(SECRET, ISSUE_TIME).unwrap(),
            sixty.get_code(SECRET, slice * 60 + 59).unwrap()
        );
        assert_eq!(thirty.compute_code(&key, slice), CODE);
    }

    #[test]
    fn code_length_padding() {
        let key = crate::base32::decode(SECRET).unwrap();
        for digits in 1..=12 {
            let totp = TOTP::new("", digits, 30, "sha1").unwrap();
            let code = totp.compute_code(&key, 0);
            assert_eq!(code.len(), digits);
            assert!(code.bytes().all(|b| b.is_ascii_digit()));
        }
    }

    #[test]
    fn compute_code_any_input() {
        let totp = TOTP::new("", 6, 30, "md5").unwrap();
        for slice in 0..64 {
            assert_eq!(totp.compute_code(&[], slice).len(), 6);
        }
        assert_eq!(totp.compute_code(b"key", u64::MAX).len(), 6);
    }

    #[test]
    fn only_low_32_bits_of_slice() {
        let totp = totp();
        let key = crate::base32::decode(SECRET).unwrap();
        let slice = totp.time_slice(ISSUE_TIME);
        assert_eq!(totp.compute_code(&key, slice + (1 << 32)), CODE);
    }

    #[test]
    fn invalid_secret() {
        assert_eq!(
            totp().get_code("K4C54QRW1ECUQPRD", ISSUE_TIME),
            Err(Base32Error::InvalidCharacter('1'))
        );
        assert!(totp().verify_code("not base32", CODE, 1, ISSUE_TIME).is_err());
        assert!(matches!(
            totp().verify_code_current("k4c54qrw", CODE, 1),
            Err(TotpError::Encoding(_))
        ));
    }

    #[test]
    fn time_slices() {
        assert_eq!(time_slice(30, 0, 0), 0);
        assert_eq!(time_slice(30, 29, 0), 0);
        assert_eq!(time_slice(30, 30, 0), 1);
        assert_eq!(time_slice(30, ISSUE_TIME, 0), 49888064);
        // offsets count in periods
        assert_eq!(time_slice(30, ISSUE_TIME, 1), 49888094);
        assert_eq!(time_slice(30, ISSUE_TIME, -1), 49888034);
        assert_eq!(time_slice(30, 0, -1), 0);
        assert_eq!(time_slice(1, u64::MAX, 1), u64::MAX);
    }

    #[test]
    fn time_slices_monotonic() {
        for period in [1, 7, 30, 60] {
            let mut previous = 0;
            for t in 0..400 {
                let slice = time_slice(period, t, 0);
                assert!(slice >= previous);
                assert_eq!(slice, time_slice(period, t - t % period, 0));
                previous = slice;
            }
        }
    }

    #[test]
    fn verify_window() {
        let totp = totp();
        // ISSUE_TIME is the last second of its slice
        let slice_start = ISSUE_TIME - 29;
        assert!(totp.verify_code(SECRET, CODE, 1, ISSUE_TIME).unwrap());
        assert!(totp.verify_code(SECRET, CODE, 0, ISSUE_TIME).unwrap());
        assert!(totp.verify_code(SECRET, CODE, 0, slice_start).unwrap());
        assert!(totp.verify_code(SECRET, CODE, 0, slice_start + 29).unwrap());
        assert!(!totp.verify_code(SECRET, CODE, 0, slice_start + 30).unwrap());
        assert!(!totp.verify_code(SECRET, CODE, 0, slice_start - 1).unwrap());
        assert!(!totp.verify_code(SECRET, CODE, 0, ISSUE_TIME + 30).unwrap());
    }

    #[test]
    fn verify_discrepancy() {
        let totp = totp();
        assert!(totp.verify_code(SECRET, "629042", 1, ISSUE_TIME).unwrap());
        assert!(totp.verify_code(SECRET, "529745", 1, ISSUE_TIME).unwrap());
        assert!(!totp.verify_code(SECRET, "629042", 0, ISSUE_TIME).unwrap());
        assert!(totp.verify_code(SECRET, CODE, 1, ISSUE_TIME + 30).unwrap());
        assert!(totp.verify_code(SECRET, CODE, 2, ISSUE_TIME + 60).unwrap());
        assert!(!totp.verify_code(SECRET, CODE, 1, ISSUE_TIME + 60).unwrap());
    }

    #[test]
    fn verify_rejects_other_input() {
        let totp = totp();
        for bad in ["", "18633", "1863320", " 186332", "abcdef", "186333"] {
            assert!(!totp.verify_code(SECRET, bad, 1, ISSUE_TIME).unwrap());
        }
    }

    #[test]
    fn verify_near_epoch() {
        let totp = totp();
        let code = totp.get_code(SECRET, 0).unwrap();
        assert!(totp.verify_code(SECRET, &code, 3, 0).unwrap());
    }

    #[test]
    fn verify_current() {
        let totp = totp();
        assert!(totp.verify_code_current(SECRET, CODE, 0).unwrap());
        assert!(!totp.verify_code_current(SECRET, "000000", 0).unwrap());
    }

    #[test]
    fn constant_time_comparison() {
        assert!(constant_time_equals(b"186332", b"186332"));
        assert!(!constant_time_equals(b"186332", b"186333"));
        assert!(!constant_time_equals(b"186332", b"18633"));
        assert!(!constant_time_equals(b"", b"0"));
        assert!(constant_time_equals(b"", b""));
    }

    #[test]
    fn create_secret_from_sequence() {
        let totp = totp_with(true);
        assert_eq!(
            totp.create_secret(DEFAULT_SECRET_BITS, true).unwrap(),
            "ABCDEFGHIJKLMNOP"
        );
        assert_eq!(totp.entropy().requests.get(), 1);
    }

    #[test]
    fn create_secret_insecure_source() {
        let totp = totp_with(false);
        assert_eq!(totp.create_secret(160, true), Err(EntropyError::Insecure));
        assert_eq!(totp.entropy().requests.get(), 0);
        assert_eq!(totp.create_secret(160, false).unwrap().len(), 32);
        assert_eq!(totp.entropy().requests.get(), 1);
    }

    #[test]
    fn create_secret_length() {
        let totp = TOTP::with_defaults("");
        for bits in [0, 1, 4, 5, 6, 80, 128, 160, 161] {
            let secret = totp.create_secret(bits, true).unwrap();
            assert_eq!(secret.len(), (bits + 4) / 5);
            assert!(secret.bytes().all(|b| crate::base32::ALPHABET.contains(&b)));
            assert!(!secret.contains('='));
        }
    }

    #[test]
    fn create_secret_wraps_alphabet() {
        // bytes 32.. reuse the low five bits
        let totp = totp_with(true);
        let secret = totp.create_secret(200, true).unwrap();
        assert_eq!(secret, "ABCDEFGHIJKLMNOPQRSTUVWXYZ234567ABCDEFGH");
    }

    #[test]
    fn create_secret_huge_request() {
        let totp = TOTP::with_defaults("");
        assert!(matches!(
            totp.create_secret(usize::MAX, false),
            Err(EntropyError::Unavailable(_))
        ));
        assert!(matches!(
            totp.create_secret(usize::MAX - 4, true),
            Err(EntropyError::Unavailable(_))
        ));
        let insecure = totp_with(false);
        assert_eq!(insecure.create_secret(usize::MAX, true), Err(EntropyError::Insecure));
        assert_eq!(insecure.entropy().requests.get(), 0);
    }

    #[test]
    fn create_secret_short_read() {
        let totp = TOTP::with_sources("", 6, 30, "sha1", ShortEntropy, SystemClock).unwrap();
        assert!(matches!(
            totp.create_secret(80, true),
            Err(EntropyError::Unavailable(_))
        ));
    }

    #[test]
    fn created_secret_verifies() {
        let totp = TOTP::with_defaults("");
        let secret = totp.create_secret(160, true).unwrap();
        let code = totp.get_code(&secret, ISSUE_TIME).unwrap();
        assert!(totp.verify_code(&secret, &code, 0, ISSUE_TIME).unwrap());
    }

    #[test]
    fn validate_time_within_leniency() {
        let totp = totp();
        assert!(totp
            .validate_time(&[FixedClock(ISSUE_TIME + 4)], DEFAULT_LENIENCY)
            .is_ok());
        assert!(totp
            .validate_time(&[FixedClock(ISSUE_TIME - 5)], DEFAULT_LENIENCY)
            .is_ok());
        assert!(totp.validate_time::<FixedClock>(&[], 0).is_ok());
    }

    #[test]
    fn validate_time_skew() {
        let totp = totp();
        assert_eq!(
            totp.validate_time(&[FixedClock(ISSUE_TIME + 4)], 0),
            Err(ClockError::Skew {
                provider: "FixedClock(1496641953)".to_string(),
                leniency: 0,
                difference: 4,
            })
        );
    }

    #[test]
    fn validate_time_names_offender() {
        let totp = totp();
        let providers: Vec<Box<dyn Clock>> = vec![
            Box::new(FixedClock(ISSUE_TIME)),
            Box::new(FixedClock(ISSUE_TIME - 10)),
            Box::new(BrokenClock),
        ];
        assert!(matches!(
            totp.validate_time(&providers, 5),
            Err(ClockError::Skew { provider, difference: 10, .. }) if provider == "FixedClock(1496641939)"
        ));
        assert!(matches!(
            totp.validate_time(&providers, 10),
            Err(ClockError::Unavailable { .. })
        ));
    }

    #[test]
    fn validate_time_system_clock() {
        let totp = TOTP::with_defaults("");
        assert!(totp.validate_time(&[SystemClock], 1).is_ok());
    }

    #[test]
    fn ttl() {
        let totp = totp();
        assert_eq!(totp.ttl(ISSUE_TIME), 1);
        assert_eq!(totp.ttl(ISSUE_TIME - 29), 30);
        assert_eq!(totp.ttl_current().unwrap(), 1);
        assert!(TOTP::with_defaults("").ttl_current().unwrap() <= 30);
    }

    #[test]
    fn next_step() {
        let totp = totp();
        assert_eq!(totp.next_step(0), 30);
        assert_eq!(totp.next_step(29), 30);
        assert_eq!(totp.next_step(30), 60);
        assert_eq!(totp.next_step(ISSUE_TIME), ISSUE_TIME + 1);
    }

    #[test]
    fn qr_text() {
        assert_eq!(
            totp().get_qr_text("Test Case:user@example.com", SECRET),
            "otpauth://totp/Test%20Case%3Auser%40example.com?secret=K4C54QRWAECUQPRDCCQRRKC3VWPDEUMN&issuer=Test%20Case&period=30&algorithm=SHA1&digits=6"
        );
    }

    #[test]
    fn qr_text_other_settings() {
        let totp = TOTP::new("", 8, 60, "sha512").unwrap();
        assert_eq!(
            totp.get_qr_text("me", "ABC="),
            "otpauth://totp/me?secret=ABC%3D&issuer=&period=60&algorithm=SHA512&digits=8"
        );
    }

    struct StaticRenderer;

    impl QrRenderer for StaticRenderer {
        fn get_image(&self, _text: &str, size: u32) -> Result<Vec<u8>, QrError> {
            Ok(vec![size as u8])
        }

        fn mime_type(&self) -> &str {
            "image/gif"
        }
    }

    #[test]
    fn image_data() {
        let totp = totp();
        assert_eq!(
            totp.image_to_data(&StaticRenderer, "user", SECRET, 1).unwrap(),
            "data:image/gif;base64,AQ=="
        );
        assert_eq!(
            totp.image_to_data(&StaticRenderer, "user", SECRET, 0),
            Err(QrError::InvalidSize(0))
        );
        assert_eq!(
            totp.image_to_data(&StaticRenderer, "user", SECRET, u32::MAX),
            Err(QrError::InvalidSize(u32::MAX))
        );
    }

    #[test]
    #[cfg(feature = "qr")]
    fn image_data_png() {
        let data = totp()
            .image_to_data(&qr::PngQrRenderer, "user", SECRET, DEFAULT_QR_SIZE)
            .unwrap();
        assert!(data.starts_with("data:image/png;base64,iVBORw0KGgo"));
    }
}
