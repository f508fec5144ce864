//! Single-slot holder for raw key bytes.
//!
//! The slot holds at most one key and is read only through
//! [`Vault::use_key`]. There is no internal locking: mutation takes
//! `&mut self`, so sharing a vault across threads needs a caller-side lock.

use openk_crypto::{ct_copy, secure_wipe};
use zeroize::Zeroizing;

use crate::error::{KmsError, Result};

#[derive(Default)]
pub struct Vault {
    key: Option<Zeroizing<Vec<u8>>>,
}

impl Vault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy `key` into the empty slot.
    pub fn store(&mut self, key: &[u8]) -> Result<()> {
        if self.has_key() {
            return Err(KmsError::KeyPresent);
        }
        if key.is_empty() {
            return Err(KmsError::InvalidKey);
        }

        let mut slot = Zeroizing::new(vec![0u8; key.len()]);
        ct_copy(&mut slot[..], key);
        self.key = Some(slot);
        Ok(())
    }

    pub fn has_key(&self) -> bool {
        self.key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Run `op` against the stored key. The borrow cannot outlive `op`.
    pub fn use_key<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        match &self.key {
            Some(key) if !key.is_empty() => op(&key[..]),
            _ => Err(KmsError::NoKey),
        }
    }

    /// Zero and release the slot. Safe on an empty vault.
    pub fn cleanup(&mut self) {
        if let Some(mut key) = self.key.take() {
            secure_wipe(&mut key[..]);
        }
    }
}

impl Drop for Vault {
    fn drop(&mut self) {
        self.cleanup();
    }
}

impl std::fmt::Debug for Vault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vault")
            .field("has_key", &self.has_key())
            .finish()
    }
}
