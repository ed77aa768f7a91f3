//! Representation of a secret either a "raw" \[u8\] or "base 32" encoded String
//!
//! [TOTP](struct.TOTP.html) methods take base32 text. [Secret] converts between that and the raw
//! key bytes that other systems store.
//!
//! # Examples
//!
//! - Use a "raw" secret
//! ```
//! use tfa_rs::{Secret, TOTP};
//!
//! let secret_raw = Secret::Raw(b"plain-string-secret-123".to_vec());
//! let totp = TOTP::with_defaults("");
//!
//! let encoded = secret_raw.to_encoded().to_string();
//! println!("code from raw secret:\t{}", totp.get_code_current(&encoded).unwrap());
//! ```
//!
//! - Generate a secret
//! ```
//! use tfa_rs::{entropy::OsEntropy, Secret};
//!
//! let secret = Secret::generate_secret(&OsEntropy).unwrap();
//! assert_eq!(secret.to_bytes().unwrap().len(), 20);
//! ```

use constant_time_eq::constant_time_eq;

use crate::base32::{self, Base32Error};
use crate::entropy::{EntropyError, EntropySource};

/// Byte length of [Secret::generate_secret], 160 bits
pub const GENERATED_SECRET_LEN: usize = 20;

/// Shared secret between client and server to validate token against/generate token from.
#[derive(Debug, Clone, Eq)]
#[cfg_attr(feature = "zeroize", derive(zeroize::Zeroize, zeroize::ZeroizeOnDrop))]
pub enum Secret {
    /// Non-encoded "raw" secret.
    Raw(Vec<u8>),
    /// Base32 encoded secret.
    Encoded(String),
}

impl PartialEq for Secret {
    /// Will check that to_bytes() returns the same.
    /// One secret can be Raw, and the other Encoded.
    /// An encoded secret that doesn't decode equals nothing.
    fn eq(&self, other: &Self) -> bool {
        match (self.to_bytes(), other.to_bytes()) {
            (Ok(ours), Ok(theirs)) => constant_time_eq(&ours, &theirs),
            _ => false,
        }
    }
}

impl Secret {
    /// Get the inner String value as a Vec of bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, Base32Error> {
        match self {
            Secret::Raw(s) => Ok(s.to_vec()),
            Secret::Encoded(s) => base32::decode(s),
        }
    }

    /// Try to transform a `Secret::Encoded` into a `Secret::Raw`
    pub fn to_raw(&self) -> Result<Self, Base32Error> {
        match self {
            Secret::Raw(_) => Ok(self.clone()),
            Secret::Encoded(s) => base32::decode(s).map(Secret::Raw),
        }
    }

    /// Transforms a `Secret::Raw` into a `Secret::Encoded`, without padding.
    pub fn to_encoded(&self) -> Self {
        match self {
            Secret::Raw(s) => Secret::Encoded(base32::encode(s)),
            Secret::Encoded(_) => self.clone(),
        }
    }

    /// Generate a binary value of 160 bits,
    /// the recomended size from [rfc-4226](https://www.rfc-editor.org/rfc/rfc4226#section-4).
    ///
    /// > The length of the shared secret MUST be at least 128 bits.
    /// > This document RECOMMENDs a shared secret length of 160 bits.
    ///
    /// ⚠️ The generated secret is not guaranteed to be a valid UTF-8 sequence.
    ///
    /// # Errors
    ///
    /// Will return [EntropyError::Insecure] if `entropy` is not cryptographically secure
    pub fn generate_secret<E: EntropySource + ?Sized>(entropy: &E) -> Result<Secret, EntropyError> {
        if !entropy.is_secure() {
            return Err(EntropyError::Insecure);
        }
        let bytes = entropy.get_bytes(GENERATED_SECRET_LEN)?;
        if bytes.len() != GENERATED_SECRET_LEN {
            return Err(EntropyError::Unavailable(format!(
                "expected {} bytes, got {}",
                GENERATED_SECRET_LEN,
                bytes.len()
            )));
        }
        Ok(Secret::Raw(bytes))
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Secret::Raw(bytes) => {
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
            Secret::Encoded(s) => write!(f, "{}", s),
        }
    }
}
