//! Ciphertext value type: nonce[12] || data[*] || tag[16], kept as three fields.
//!
//! Framing is left to the storage layer. The only ways to obtain a
//! `Ciphertext` are [`Ciphertext::new`] and deserialization, and both pass
//! through the same length checks.

use serde::{Deserialize, Serialize};

use crate::error::{CryptoError, Result};

/// AES-GCM nonce size (96 bits).
pub const NONCE_BYTES: usize = 12;

/// AES-GCM authentication tag size (128 bits).
pub const TAG_BYTES: usize = 16;

/// Immutable authenticated ciphertext.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCiphertext", into = "RawCiphertext")]
pub struct Ciphertext {
    nonce: [u8; NONCE_BYTES],
    data: Vec<u8>,
    tag: [u8; TAG_BYTES],
}

impl Ciphertext {
    /// Validate and build a ciphertext. `data` may be empty.
    pub fn new(nonce: &[u8], data: &[u8], tag: &[u8]) -> Result<Self> {
        let nonce: [u8; NONCE_BYTES] = nonce
            .try_into()
            .map_err(|_| CryptoError::InvalidNonce { actual: nonce.len() })?;
        let tag: [u8; TAG_BYTES] = tag
            .try_into()
            .map_err(|_| CryptoError::InvalidTag { actual: tag.len() })?;
        Ok(Self {
            nonce,
            data: data.to_vec(),
            tag,
        })
    }

    /// Split an AEAD output (`data || tag`) produced under `nonce`.
    pub(crate) fn from_sealed(nonce: [u8; NONCE_BYTES], mut sealed: Vec<u8>) -> Result<Self> {
        if sealed.len() < TAG_BYTES {
            return Err(CryptoError::Encryption);
        }
        let tag_bytes = sealed.split_off(sealed.len() - TAG_BYTES);
        let tag: [u8; TAG_BYTES] = tag_bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::Encryption)?;
        Ok(Self {
            nonce,
            data: sealed,
            tag,
        })
    }

    /// Wrap an opaque payload that has no nonce or tag of its own (RSA-OAEP).
    pub(crate) fn unframed(data: Vec<u8>) -> Self {
        Self {
            nonce: [0u8; NONCE_BYTES],
            data,
            tag: [0u8; TAG_BYTES],
        }
    }

    pub fn nonce(&self) -> &[u8; NONCE_BYTES] {
        &self.nonce
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn tag(&self) -> &[u8; TAG_BYTES] {
        &self.tag
    }

    /// `data || tag`, the layout AEAD implementations expect.
    pub(crate) fn sealed_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.data.len() + TAG_BYTES);
        out.extend_from_slice(&self.data);
        out.extend_from_slice(&self.tag);
        out
    }
}

impl core::fmt::Debug for Ciphertext {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Ciphertext")
            .field("nonce_len", &NONCE_BYTES)
            .field("data_len", &self.data.len())
            .field("tag_len", &TAG_BYTES)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Storage-facing record
// ---------------------------------------------------------------------------

/// Column-level view of a ciphertext as a storage backend hands it over.
///
/// Any field may be missing (NULL column, absent JSON key); conversion into
/// [`Ciphertext`] rejects that with [`CryptoError::NilParameter`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCiphertext {
    #[serde(default)]
    pub nonce: Option<Vec<u8>>,
    #[serde(default)]
    pub data: Option<Vec<u8>>,
    #[serde(default)]
    pub tag: Option<Vec<u8>>,
}

impl TryFrom<RawCiphertext> for Ciphertext {
    type Error = CryptoError;

    fn try_from(raw: RawCiphertext) -> Result<Self> {
        match (raw.nonce, raw.data, raw.tag) {
            (Some(nonce), Some(data), Some(tag)) => Ciphertext::new(&nonce, &data, &tag),
            _ => Err(CryptoError::NilParameter),
        }
    }
}

impl From<Ciphertext> for RawCiphertext {
    fn from(ct: Ciphertext) -> Self {
        Self {
            nonce: Some(ct.nonce.to_vec()),
            data: Some(ct.data),
            tag: Some(ct.tag.to_vec()),
        }
    }
}
