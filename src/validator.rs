use crate::Algorithm;

/// A configuration value was rejected while building a [TOTP](struct.TOTP.html)
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ConfigError {
    /// The code length must be greater than zero
    CodeLength(usize),
    /// The period must be greater than zero
    Period(u64),
    /// The algorithm must be one of sha1, sha256, sha512 or md5
    Algorithm(String),
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::CodeLength(digits) => write!(
                f,
                "Code length should be greater than zero, {} is not allowed",
                digits
            ),
            ConfigError::Period(period) => write!(
                f,
                "Issue period should be greater than zero, {} is not allowed",
                period
            ),
            ConfigError::Algorithm(algorithm) => write!(
                f,
                "Unsupported algorithm \"{}\", expected one of sha1, sha256, sha512 or md5",
                algorithm
            ),
        }
    }
}

pub fn validate_code_length(digits: usize) -> Result<usize, ConfigError> {
    if digits == 0 {
        Err(ConfigError::CodeLength(digits))
    } else {
        Ok(digits)
    }
}

pub fn validate_period(period: u64) -> Result<u64, ConfigError> {
    if period == 0 {
        Err(ConfigError::Period(period))
    } else {
        Ok(period)
    }
}

/// Names are trimmed and matched case-insensitively, so `" SHA256 "` is accepted
pub fn validate_algorithm(name: &str) -> Result<Algorithm, ConfigError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "sha1" => Ok(Algorithm::SHA1),
        "sha256" => Ok(Algorithm::SHA256),
        "sha512" => Ok(Algorithm::SHA512),
        "md5" => Ok(Algorithm::MD5),
        _ => Err(ConfigError::Algorithm(name.to_string())),
    }
}
