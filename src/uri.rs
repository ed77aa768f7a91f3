//! `otpauth://totp/` provisioning URIs, as scanned by authenticator apps.

use crate::config::TotpConfig;
use crate::validator::ConfigError;
use crate::Algorithm;

#[cfg(feature = "otpauth")]
use crate::{
    base32, validator, DEFAULT_DIGITS, DEFAULT_PERIOD, UriError, TOTP,
};
#[cfg(feature = "otpauth")]
use url::Url;

/// The fields of an `otpauth://totp/` URI.
///
/// Its [Display](std::fmt::Display) is the URI, every value percent-encoded:
/// `otpauth://totp/{label}?secret={secret}&issuer={issuer}&period={period}&algorithm={algorithm}&digits={digits}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningUri {
    /// Usually `Issuer:account`, shown by the app next to the code
    pub label: String,
    /// Base32 secret
    pub secret: String,
    pub issuer: String,
    pub period: u64,
    pub algorithm: Algorithm,
    pub digits: usize,
}

impl std::fmt::Display for ProvisioningUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "otpauth://totp/{}?secret={}&issuer={}&period={}&algorithm={}&digits={}",
            urlencoding::encode(&self.label),
            urlencoding::encode(&self.secret),
            urlencoding::encode(&self.issuer),
            self.period,
            urlencoding::encode(&self.algorithm.to_string()),
            self.digits,
        )
    }
}

impl ProvisioningUri {
    /// The engine options carried by the URI
    pub fn to_config(&self) -> Result<TotpConfig, ConfigError> {
        TotpConfig::new(
            self.issuer.as_str(),
            self.digits,
            self.period,
            &self.algorithm.to_string(),
        )
    }
}

#[cfg(feature = "otpauth")]
#[cfg_attr(docsrs, doc(cfg(feature = "otpauth")))]
impl ProvisioningUri {
    /// Read a provisioning URI. Missing `issuer`, `period`, `algorithm` and `digits` take the defaults
    ///
    /// # Errors
    ///
    /// Will return an [UriError] when the URI is malformed, isn't `otpauth://totp/`, has no valid base32
    /// secret, or carries a value the engine would refuse
    pub fn parse<S: AsRef<str>>(uri: S) -> Result<ProvisioningUri, UriError> {
        let url = Url::parse(uri.as_ref()).map_err(UriError::Url)?;
        if url.scheme() != "otpauth" {
            return Err(UriError::Scheme(url.scheme().to_string()));
        }
        if url.host_str() != Some("totp") {
            return Err(UriError::Host(
                url.host_str().unwrap_or_default().to_string(),
            ));
        }

        let path = url.path().trim_start_matches('/');
        let label = urlencoding::decode(path)
            .map_err(|_| UriError::Label(path.to_string()))?
            .into_owned();

        let mut secret = None;
        let mut issuer = String::new();
        let mut period = DEFAULT_PERIOD;
        let mut algorithm = Algorithm::SHA1;
        let mut digits = DEFAULT_DIGITS;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "secret" => {
                    base32::decode(&value).map_err(|_| UriError::Secret(value.to_string()))?;
                    secret = Some(value.into_owned());
                }
                "issuer" => issuer = value.into_owned(),
                "period" => {
                    period = value
                        .parse::<u64>()
                        .map_err(|_| UriError::Period(value.to_string()))?;
                }
                "algorithm" => algorithm = validator::validate_algorithm(&value)?,
                "digits" => {
                    digits = value
                        .parse::<usize>()
                        .map_err(|_| UriError::Digits(value.to_string()))?;
                }
                _ => {}
            }
        }

        let secret = match secret {
            Some(secret) if !secret.is_empty() => secret,
            _ => return Err(UriError::Secret(String::new())),
        };
        Ok(ProvisioningUri {
            label,
            secret,
            issuer,
            period: validator::validate_period(period)?,
            algorithm,
            digits: validator::validate_code_length(digits)?,
        })
    }
}

#[cfg(feature = "otpauth")]
impl std::str::FromStr for ProvisioningUri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ProvisioningUri::parse(s)
    }
}

#[cfg(feature = "otpauth")]
#[cfg_attr(docsrs, doc(cfg(feature = "otpauth")))]
impl TOTP {
    /// Generate a TOTP from the standard otpauth URI, returning it with the URI's label and secret
    ///
    /// ```rust
    /// use tfa_rs::TOTP;
    /// let (totp, uri) = TOTP::from_uri(
    ///     "otpauth://totp/Github%3Aconstantoine?secret=K4C54QRWAECUQPRDCCQRRKC3VWPDEUMN&issuer=Github&digits=8",
    /// ).unwrap();
    /// assert_eq!(totp.digits(), 8);
    /// assert_eq!(uri.label, "Github:constantoine");
    /// ```
    pub fn from_uri<S: AsRef<str>>(uri: S) -> Result<(TOTP, ProvisioningUri), UriError> {
        let uri = ProvisioningUri::parse(uri)?;
        let totp = TOTP::try_from(uri.to_config()?)?;
        Ok((totp, uri))
    }
}
