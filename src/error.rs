#[cfg(feature = "otpauth")]
use url::ParseError;

use crate::base32::Base32Error;
use crate::clock::ClockError;
use crate::entropy::EntropyError;
use crate::qr::QrError;
use crate::validator::ConfigError;

/// Different ways reading an `otpauth://` provisioning URI failed.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum UriError {
    #[cfg(feature = "otpauth")]
    Url(ParseError),
    Scheme(String),
    Host(String),
    Label(String),
    Secret(String),
    Algorithm(String),
    Digits(String),
    Period(String),
    Config(ConfigError),
}

impl std::error::Error for UriError {}

impl std::fmt::Display for UriError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UriError::Algorithm(algo) => write!(
                f,
                "Algorithm can only be SHA1, SHA256, SHA512 or MD5, not \"{}\"",
                algo
            ),
            UriError::Config(e) => write!(f, "{}", e),
            UriError::Digits(digits) => write!(f, "Could not parse \"{}\" as a number.", digits),
            UriError::Host(host) => write!(f, "Host should be totp, not \"{}\"", host),
            UriError::Label(label) => write!(f, "Couldn't URL decode \"{}\"", label),
            UriError::Period(period) => write!(f, "Could not parse \"{}\" as a number.", period),
            UriError::Scheme(scheme) => write!(f, "Scheme should be otpauth, not \"{}\"", scheme),
            UriError::Secret(secret) => write!(
                f,
                "Secret \"{}\" is not a valid base32 string",
                secret
            ),
            #[cfg(feature = "otpauth")]
            UriError::Url(e) => write!(f, "Error parsing URL: {}", e),
        }
    }
}

impl From<ConfigError> for UriError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Algorithm(name) => UriError::Algorithm(name),
            other => UriError::Config(other),
        }
    }
}

/// Any failure of this crate, for callers that don't need to tell them apart.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum TotpError {
    Config(ConfigError),
    Encoding(Base32Error),
    Entropy(EntropyError),
    Clock(ClockError),
    Qr(QrError),
    Uri(UriError),
}

impl std::error::Error for TotpError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TotpError::Config(e) => Some(e),
            TotpError::Encoding(e) => Some(e),
            TotpError::Entropy(e) => Some(e),
            TotpError::Clock(e) => Some(e),
            TotpError::Qr(e) => Some(e),
            TotpError::Uri(e) => Some(e),
        }
    }
}

impl std::fmt::Display for TotpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TotpError::Config(e) => write!(f, "{}", e),
            TotpError::Encoding(e) => write!(f, "{}", e),
            TotpError::Entropy(e) => write!(f, "{}", e),
            TotpError::Clock(e) => write!(f, "{}", e),
            TotpError::Qr(e) => write!(f, "{}", e),
            TotpError::Uri(e) => write!(f, "{}", e),
        }
    }
}

impl From<ConfigError> for TotpError {
    fn from(e: ConfigError) -> Self {
        TotpError::Config(e)
    }
}

impl From<Base32Error> for TotpError {
    fn from(e: Base32Error) -> Self {
        TotpError::Encoding(e)
    }
}

impl From<EntropyError> for TotpError {
    fn from(e: EntropyError) -> Self {
        TotpError::Entropy(e)
    }
}

impl From<ClockError> for TotpError {
    fn from(e: ClockError) -> Self {
        TotpError::Clock(e)
    }
}

impl From<QrError> for TotpError {
    fn from(e: QrError) -> Self {
        TotpError::Qr(e)
    }
}

impl From<UriError> for TotpError {
    fn from(e: UriError) -> Self {
        TotpError::Uri(e)
    }
}
