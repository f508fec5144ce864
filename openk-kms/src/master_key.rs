//! Password-derived master key.
//!
//! Two independent 32-byte secrets come out of one password:
//!
//! - the protection key, `PBKDF2(password, salt = username)`, which wraps
//!   other keys
//! - the authentication key, `PBKDF2(password, salt = AUTH_SALT)`, which is
//!   handed to the authentication layer and never encrypts anything.

use openk_crypto::{aead, kdf, Ciphertext, Decrypter, Encrypter, ProviderError};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::KdfConfig;
use crate::error::{KmsError, Result};
use crate::key_derivation::KeyDerivation;
use crate::vault::Vault;

const ID_PREFIX: &str = "masterkey-";
const ID_DOMAIN: &[u8] = b"openk-masterkey-id";
const ID_HEX_CHARS: usize = 32;

pub struct MasterKey {
    protection: Vault,
    auth: Vault,
    config: KdfConfig,
    // set by the first successful derive, survives clear()
    derived: bool,
}

impl MasterKey {
    pub fn new() -> Self {
        Self::with_config(KdfConfig::default())
    }

    pub fn with_config(config: KdfConfig) -> Self {
        Self {
            protection: Vault::new(),
            auth: Vault::new(),
            config,
            derived: false,
        }
    }

    /// Master key using the parameters stored for a user.
    pub fn for_derivation(kd: &KeyDerivation) -> Result<Self> {
        kd.validate()?;
        Ok(Self::with_config(KdfConfig::from_derivation(kd)))
    }

    pub fn config(&self) -> &KdfConfig {
        &self.config
    }

    /// Derive both secrets. Single-shot per instance: any later call fails
    /// with [`KmsError::KeyAlreadySet`], even after [`MasterKey::clear`].
    pub fn derive(&mut self, password: &[u8], username: &str) -> Result<()> {
        let password_empty = (password.len() as u64).ct_eq(&0u64);
        let username_empty = (username.len() as u64).ct_eq(&0u64);
        if bool::from(password_empty) {
            return Err(KmsError::InvalidPassword);
        }
        if bool::from(username_empty) {
            return Err(KmsError::InvalidUsername);
        }
        if self.derived || self.protection.has_key() || self.auth.has_key() {
            return Err(KmsError::KeyAlreadySet);
        }
        self.config.validate()?;

        let iterations = self.config.iterations;
        let protection = kdf::derive_key32(password, username.as_bytes(), iterations)
            .map_err(KmsError::crypto("master key derive"))?;
        let auth = kdf::derive_key32(password, self.config.auth_salt.as_bytes(), iterations)
            .map_err(KmsError::crypto("master key derive"))?;

        if let Err(e) = self
            .protection
            .store(&protection[..])
            .and_then(|_| self.auth.store(&auth[..]))
        {
            self.clear();
            return Err(e);
        }
        self.derived = true;

        debug!(iterations, "master key derived");
        Ok(())
    }

    pub fn has_key(&self) -> bool {
        self.protection.has_key() && self.auth.has_key()
    }

    /// Wipe both secrets. Idempotent.
    pub fn clear(&mut self) {
        let had_key = self.has_key();
        self.protection.cleanup();
        self.auth.cleanup();
        if had_key {
            debug!("master key cleared");
        }
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Ciphertext> {
        self.with_protection_key(|key| {
            aead::encrypt(key, plaintext).map_err(KmsError::crypto("master key encrypt"))
        })
    }

    pub fn decrypt(&self, ct: &Ciphertext) -> Result<Vec<u8>> {
        self.with_protection_key(|key| {
            aead::decrypt(key, ct).map_err(KmsError::crypto("master key decrypt"))
        })
    }

    /// Copy of the authentication key, wiped when dropped.
    pub fn get_auth_key(&self) -> Result<Zeroizing<Vec<u8>>> {
        if !self.has_key() {
            return Err(KmsError::KeyNotDerived);
        }
        self.auth.use_key(|key| Ok(Zeroizing::new(key.to_vec())))
    }

    /// Stable provider identity, or `""` before derivation.
    ///
    /// A one-way fingerprint of the protection key, so the same password,
    /// username and configuration always produce the same ID.
    pub fn id(&self) -> String {
        self.protection
            .use_key(|key| {
                let mut hasher = Sha256::new();
                hasher.update(ID_DOMAIN);
                hasher.update(key);
                let digest = hex::encode(hasher.finalize());
                Ok(format!("{}{}", ID_PREFIX, &digest[..ID_HEX_CHARS]))
            })
            .unwrap_or_default()
    }

    fn with_protection_key<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        if !self.has_key() {
            return Err(KmsError::KeyNotDerived);
        }
        self.protection.use_key(op)
    }
}

impl Default for MasterKey {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterKey")
            .field("has_key", &self.has_key())
            .field("iterations", &self.config.iterations)
            .finish()
    }
}

impl Encrypter for MasterKey {
    fn encrypt(&self, plaintext: &[u8]) -> std::result::Result<Ciphertext, ProviderError> {
        MasterKey::encrypt(self, plaintext).map_err(Into::into)
    }

    fn id(&self) -> String {
        MasterKey::id(self)
    }
}

impl Decrypter for MasterKey {
    fn decrypt(&self, ct: &Ciphertext) -> std::result::Result<Vec<u8>, ProviderError> {
        MasterKey::decrypt(self, ct).map_err(Into::into)
    }

    fn id(&self) -> String {
        MasterKey::id(self)
    }
}
