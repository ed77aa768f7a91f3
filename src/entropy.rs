//! Sources of random bytes for [secret generation](struct.TOTP.html#method.create_secret).
//!
//! Only [OsEntropy] reports itself as cryptographically secure. The other sources exist for
//! environments without a working OS generator and say so through [EntropySource::is_secure],
//! so that [TOTP::create_secret](struct.TOTP.html#method.create_secret) can refuse them.
//!
//! ```
//! use tfa_rs::entropy::{select_entropy, DeviceFileEntropy, EntropySource, HashChainEntropy, OsEntropy};
//!
//! let source = select_entropy(vec![
//!     Box::new(OsEntropy),
//!     Box::new(DeviceFileEntropy::default()),
//!     Box::new(HashChainEntropy::default()),
//! ])
//! .unwrap();
//! assert_eq!(source.get_bytes(20).unwrap().len(), 20);
//! ```

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, trace};
use rand::TryRngCore;

use crate::Algorithm;

/// Different ways an entropy source failed to serve a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntropyError {
    /// A secure source was required but the configured one is not.
    Insecure,
    /// The source could not produce the requested bytes.
    Unavailable(String),
}

impl std::error::Error for EntropyError {}

impl std::fmt::Display for EntropyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntropyError::Insecure => {
                write!(f, "Entropy source is not cryptographically secure")
            }
            EntropyError::Unavailable(reason) => {
                write!(f, "Entropy source is unavailable: {}", reason)
            }
        }
    }
}

/// Largest request, in bytes, the bundled sources serve.
pub const MAX_REQUEST: usize = 1 << 20;

/// Zeroed buffer for `count` bytes, refusing sizes that are out of reach.
fn buffer(count: usize) -> Result<Vec<u8>, EntropyError> {
    if count > MAX_REQUEST {
        return Err(EntropyError::Unavailable(format!(
            "{} bytes requested, at most {} are served",
            count, MAX_REQUEST
        )));
    }
    let mut bytes = Vec::new();
    bytes
        .try_reserve_exact(count)
        .map_err(|e| EntropyError::Unavailable(e.to_string()))?;
    bytes.resize(count, 0);
    Ok(bytes)
}

/// A supplier of raw random bytes.
pub trait EntropySource {
    /// Exactly `count` bytes, or [EntropyError::Unavailable].
    fn get_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError>;

    /// Whether the output is suitable for cryptographic secrets.
    fn is_secure(&self) -> bool;

    /// Whether the source can currently serve requests. Used by [select_entropy].
    fn is_available(&self) -> bool {
        true
    }

    fn name(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

impl<T: EntropySource + ?Sized> EntropySource for Box<T> {
    fn get_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
        (**self).get_bytes(count)
    }

    fn is_secure(&self) -> bool {
        (**self).is_secure()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

impl<T: EntropySource + ?Sized> EntropySource for &T {
    fn get_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
        (**self).get_bytes(count)
    }

    fn is_secure(&self) -> bool {
        (**self).is_secure()
    }

    fn is_available(&self) -> bool {
        (**self).is_available()
    }

    fn name(&self) -> String {
        (**self).name()
    }
}

/// The operating system's CSPRNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn get_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
        let mut bytes = buffer(count)?;
        rand::rngs::OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| EntropyError::Unavailable(e.to_string()))?;
        Ok(bytes)
    }

    fn is_secure(&self) -> bool {
        true
    }

    fn is_available(&self) -> bool {
        rand::rngs::OsRng.try_fill_bytes(&mut [0u8; 1]).is_ok()
    }

    fn name(&self) -> String {
        "OsEntropy".to_string()
    }
}

static HASH_CHAIN_CALLS: AtomicU64 = AtomicU64::new(0);

/// Repeated keyed hashing seeded from the clock and process id.
///
/// Predictable by anyone who can guess the seed, hence never secure.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashChainEntropy {
    algorithm: Algorithm,
}

impl HashChainEntropy {
    pub fn new(algorithm: Algorithm) -> HashChainEntropy {
        HashChainEntropy { algorithm }
    }

    fn seed() -> Vec<u8> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos())
            .unwrap_or_default();
        let call = HASH_CHAIN_CALLS.fetch_add(1, Ordering::Relaxed);
        let mut seed = Vec::with_capacity(28);
        seed.extend_from_slice(&nanos.to_be_bytes());
        seed.extend_from_slice(&call.to_be_bytes());
        seed.extend_from_slice(&std::process::id().to_be_bytes());
        seed
    }
}

impl EntropySource for HashChainEntropy {
    fn get_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
        let seed = HashChainEntropy::seed();
        let mut state = self.algorithm.sign(&seed, b"tfa-rs hash chain");
        let mut bytes = buffer(count)?;
        for (round, slot) in bytes.iter_mut().enumerate() {
            state = self.algorithm.sign(&state, &(round as u64).to_be_bytes());
            *slot = state[state[0] as usize % state.len()];
        }
        Ok(bytes)
    }

    fn is_secure(&self) -> bool {
        false
    }

    fn name(&self) -> String {
        format!("HashChainEntropy({})", self.algorithm)
    }
}

/// Reads bytes from a character device such as `/dev/urandom`.
///
/// The device can't be vouched for, so `secure` is whatever the caller asserts.
#[derive(Debug, Clone)]
pub struct DeviceFileEntropy {
    path: PathBuf,
    secure: bool,
}

impl DeviceFileEntropy {
    pub fn new<P: AsRef<Path>>(path: P, secure: bool) -> DeviceFileEntropy {
        DeviceFileEntropy {
            path: path.as_ref().to_path_buf(),
            secure,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for DeviceFileEntropy {
    fn default() -> Self {
        DeviceFileEntropy::new("/dev/urandom", false)
    }
}

impl EntropySource for DeviceFileEntropy {
    fn get_bytes(&self, count: usize) -> Result<Vec<u8>, EntropyError> {
        let mut bytes = buffer(count)?;
        File::open(&self.path)
            .and_then(|mut file| file.read_exact(&mut bytes))
            .map_err(|e| EntropyError::Unavailable(format!("{}: {}", self.path.display(), e)))?;
        Ok(bytes)
    }

    fn is_secure(&self) -> bool {
        self.secure
    }

    fn is_available(&self) -> bool {
        self.path.exists()
    }

    fn name(&self) -> String {
        format!("DeviceFileEntropy({})", self.path.display())
    }
}

/// Pick the first available source, in the order given.
///
/// # Errors
///
/// [EntropyError::Unavailable] when no candidate is available.
pub fn select_entropy(
    candidates: Vec<Box<dyn EntropySource + Send + Sync>>,
) -> Result<Box<dyn EntropySource + Send + Sync>, EntropyError> {
    for candidate in candidates {
        if candidate.is_available() {
            debug!(
                "selected entropy source {} (secure: {})",
                candidate.name(),
                candidate.is_secure()
            );
            return Ok(candidate);
        }
        trace!("entropy source {} is unavailable", candidate.name());
    }
    Err(EntropyError::Unavailable(
        "no entropy source is available".to_string(),
    ))
}
