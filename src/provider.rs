//! Wrapping-provider capability traits.
//!
//! Anything that can wrap and unwrap a byte buffer under a stable identity
//! can protect another key: master keys, key pairs, and unsealed DEKs all
//! implement both traits.

use crate::ciphertext::Ciphertext;
use crate::error::{CryptoError, Result};

/// Error returned across the provider boundary. Downcast to the concrete
/// error type for programmatic matching.
pub type ProviderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Maximum length of a provider identity.
pub const MAX_PROVIDER_ID_LEN: usize = 63;

pub trait Encrypter {
    fn encrypt(&self, plaintext: &[u8]) -> core::result::Result<Ciphertext, ProviderError>;

    /// Stable identity. Persisted as the envelope lookup key, so it must not
    /// change across restarts for the same underlying key.
    fn id(&self) -> String;
}

pub trait Decrypter {
    fn decrypt(&self, ct: &Ciphertext) -> core::result::Result<Vec<u8>, ProviderError>;

    /// Same contract as [`Encrypter::id`].
    fn id(&self) -> String;
}

/// Check an identity against the provider contract: non-empty, at most
/// [`MAX_PROVIDER_ID_LEN`] characters from `[A-Za-z0-9_-]`.
pub fn validate_provider_id(id: &str) -> Result<()> {
    let ok = !id.is_empty()
        && id.len() <= MAX_PROVIDER_ID_LEN
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
    if ok {
        Ok(())
    } else {
        Err(CryptoError::InvalidProviderId(id.to_string()))
    }
}
