use crate::clock::{Clock, SystemClock};
use crate::entropy::{EntropySource, OsEntropy};
use crate::validator::{validate_algorithm, validate_code_length, validate_period, ConfigError};
use crate::{Algorithm, DEFAULT_DIGITS, DEFAULT_PERIOD, TOTP};

#[cfg(feature = "serde_support")]
use serde::{Deserialize, Serialize};

/// Validated set of options to create a [TOTP](struct.TOTP.html)
///
/// # Example
/// ```
/// use tfa_rs::{TotpConfig, TOTP};
///
/// let mut config = TotpConfig::with_defaults("issuer");
///
/// // optional, set digits, period, algorithm
/// config.digits(8).unwrap();
/// config.period(60).unwrap();
/// config.algorithm("sha256").unwrap();
///
/// let totp = TOTP::try_from(config).unwrap();
/// assert_eq!(totp.digits(), 8);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
pub struct TotpConfig {
    /// The "Github" part of the provisioning URI. May be empty
    issuer: String,
    /// The number of digits composing the auth code
    digits: usize,
    /// The recommended value per [rfc-6238](https://tools.ietf.org/html/rfc6238#section-5.2) is 30 seconds
    period: u64,
    /// SHA-1
    algorithm: Algorithm,
}

impl Default for TotpConfig {
    fn default() -> Self {
        TotpConfig::with_defaults("")
    }
}

impl TotpConfig {
    /// Create a set of options that can be turned into a [TOTP](struct.TOTP.html)
    ///
    /// # Errors
    ///
    /// will return a [ConfigError](enum.ConfigError.html) when
    /// - `digits` is 0
    /// - `period` is 0
    /// - `algorithm` is not sha1, sha256, sha512 or md5
    pub fn new<S: Into<String>>(
        issuer: S,
        digits: usize,
        period: u64,
        algorithm: &str,
    ) -> Result<TotpConfig, ConfigError> {
        Ok(TotpConfig {
            digits: validate_code_length(digits)?,
            period: validate_period(period)?,
            algorithm: validate_algorithm(algorithm)?,
            issuer: issuer.into(),
        })
    }

    /// Create a set of options with a default value of 6 for `digits`, 30 for `period` and SHA1
    pub fn with_defaults<S: Into<String>>(issuer: S) -> TotpConfig {
        TotpConfig {
            issuer: issuer.into(),
            digits: DEFAULT_DIGITS,
            period: DEFAULT_PERIOD,
            algorithm: Algorithm::SHA1,
        }
    }

    /// Set the `digits`
    pub fn digits(&mut self, value: usize) -> Result<(), ConfigError> {
        self.digits = validate_code_length(value)?;
        Ok(())
    }

    /// Set the `period`
    pub fn period(&mut self, value: u64) -> Result<(), ConfigError> {
        self.period = validate_period(value)?;
        Ok(())
    }

    /// Set the `algorithm` by name
    pub fn algorithm(&mut self, value: &str) -> Result<(), ConfigError> {
        self.algorithm = validate_algorithm(value)?;
        Ok(())
    }

    /// Set the `issuer`
    pub fn issuer<S: Into<String>>(&mut self, value: S) {
        self.issuer = value.into();
    }
}

impl<E: EntropySource, C: Clock> TOTP<E, C> {
    /// Will create a TOTP from a [TotpConfig], with the given sources
    ///
    /// # Errors
    ///
    /// A deserialized config is checked again, and will fail like [TotpConfig::new]
    pub fn from_config(config: TotpConfig, entropy: E, clock: C) -> Result<TOTP<E, C>, ConfigError> {
        let digits = validate_code_length(config.digits)?;
        let period = validate_period(config.period)?;
        Ok(TOTP::assemble(
            config.issuer,
            digits,
            period,
            config.algorithm,
            entropy,
            clock,
        ))
    }

    /// The options this TOTP was built with
    pub fn to_config(&self) -> TotpConfig {
        TotpConfig {
            issuer: self.issuer().to_string(),
            digits: self.digits(),
            period: self.period(),
            algorithm: self.algorithm(),
        }
    }
}

impl TryFrom<TotpConfig> for TOTP {
    type Error = ConfigError;

    /// Try to create a [TOTP](struct.TOTP.html) running on the OS sources from a [TotpConfig]
    fn try_from(config: TotpConfig) -> Result<Self, Self::Error> {
        TOTP::from_config(config, OsEntropy, SystemClock)
    }
}

#[cfg(test)]
mod tests {
    use super::{TotpConfig, TOTP};
    use crate::clock::FixedClock;
    use crate::entropy::HashChainEntropy;
    use crate::validator::ConfigError;
    use crate::Algorithm;

    const ISSUER: &str = "Test Case";

    #[test]
    fn new_config_digits() {
        for x in 0..=20 {
            let config = TotpConfig::new(ISSUER, x, 30, "sha1");
            if x == 0 {
                assert_eq!(config.unwrap_err(), ConfigError::CodeLength(0));
            } else {
                assert!(config.is_ok());
            }
        }
    }

    #[test]
    fn new_config_order() {
        assert_eq!(
            TotpConfig::new(ISSUER, 6, 0, "nope").unwrap_err(),
            ConfigError::Period(0)
        );
        assert_eq!(
            TotpConfig::new(ISSUER, 6, 30, "nope").unwrap_err(),
            ConfigError::Algorithm("nope".to_string())
        );
    }

    #[test]
    fn config_with_default_set_values() {
        let mut config = TotpConfig::default();
        assert_eq!(config, TotpConfig::new("", 6, 30, "SHA1").unwrap());
        config.issuer(ISSUER);
        assert_eq!(config.issuer, ISSUER);

        assert_eq!(config.digits(0), Err(ConfigError::CodeLength(0)));
        assert_eq!(config.digits, 6);
        assert!(config.digits(8).is_ok());
        assert_eq!(config.digits, 8);

        assert_eq!(config.period(0), Err(ConfigError::Period(0)));
        assert_eq!(config.period, 30);
        assert!(config.period(60).is_ok());
        assert_eq!(config.period, 60);

        assert!(config.algorithm("sha3").is_err());
        assert_eq!(config.algorithm, Algorithm::SHA1);
        assert!(config.algorithm("MD5").is_ok());
        assert_eq!(config.algorithm, Algorithm::MD5);
    }

    #[test]
    fn config_to_totp_ok() {
        let config = TotpConfig::new(ISSUER, 8, 60, "sha512").unwrap();
        let totp = TOTP::try_from(config.clone()).unwrap();
        assert_eq!(totp.issuer(), ISSUER);
        assert_eq!(totp.digits(), 8);
        assert_eq!(totp.period(), 60);
        assert_eq!(totp.algorithm(), Algorithm::SHA512);
        assert_eq!(totp.to_config(), config);
    }

    #[test]
    fn config_to_totp_revalidates() {
        let config = TotpConfig {
            issuer: String::new(),
            digits: 6,
            period: 0,
            algorithm: Algorithm::SHA1,
        };
        assert_eq!(TOTP::try_from(config).unwrap_err(), ConfigError::Period(0));
    }

    #[test]
    fn config_with_sources() {
        let totp = TOTP::from_config(
            TotpConfig::with_defaults(ISSUER),
            HashChainEntropy::default(),
            FixedClock(1496641949),
        )
        .unwrap();
        assert_eq!(
            totp.get_code_current("K4C54QRWAECUQPRDCCQRRKC3VWPDEUMN").unwrap(),
            "186332"
        );
    }

    #[test]
    #[cfg(feature = "serde_support")]
    fn config_serde() {
        let config = TotpConfig::new(ISSUER, 8, 60, "sha256").unwrap();
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(
            json,
            r#"{"issuer":"Test Case","digits":8,"period":60,"algorithm":"SHA256"}"#
        );
        let back: TotpConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
