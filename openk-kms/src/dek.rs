//! Data encryption keys and their envelopes.
//!
//! A DEK is generated once, then wrapped ("sealed") under one or more
//! providers. Each wrap is an envelope keyed by the provider's ID, so any
//! of those providers can later unseal the DEK on its own.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use openk_crypto::aead::{self, AES_KEY_BYTES};
use openk_crypto::{
    validate_provider_id, Algorithm, Ciphertext, Decrypter, Encrypter, KeyState, ProviderError,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{KmsError, Result};
use crate::vault::Vault;

const ID_PREFIX: &str = "dek-";

// ---------------------------------------------------------------------------
// Storage records
// ---------------------------------------------------------------------------

/// A DEK before storage assigns IDs.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialDek {
    pub algorithm: Algorithm,
    pub created: DateTime<Utc>,
    pub state: KeyState,
    pub envelopes: Vec<InitialEnvelope>,
}

/// The DEK key wrapped under a single provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialEnvelope {
    pub algorithm: Algorithm,
    pub key: Ciphertext,
    pub created: DateTime<Utc>,
    pub state: KeyState,
    pub encrypter_id: String,
}

impl InitialDek {
    /// Attach another wrap. At most one envelope per provider.
    pub fn add_envelope(&mut self, envelope: InitialEnvelope) -> Result<()> {
        if self
            .envelopes
            .iter()
            .any(|e| e.encrypter_id == envelope.encrypter_id)
        {
            return Err(KmsError::DuplicateEnvelope(envelope.encrypter_id));
        }
        self.envelopes.push(envelope);
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dek {
    pub id: String,
    pub algorithm: Algorithm,
    pub created: DateTime<Utc>,
    pub state: KeyState,
    /// Keyed by provider ID.
    pub envelopes: HashMap<String, Envelope>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub id: String,
    pub dek_id: String,
    pub algorithm: Algorithm,
    pub key: Ciphertext,
    pub created: DateTime<Utc>,
    pub state: KeyState,
    pub encrypter_id: String,
}

impl Dek {
    /// Build the stored form of `initial` under `id`, assigning envelope IDs.
    pub fn from_initial(id: impl Into<String>, initial: InitialDek) -> Result<Self> {
        if initial.envelopes.is_empty() {
            return Err(KmsError::InvalidDek);
        }

        let mut dek = Self {
            id: id.into(),
            algorithm: initial.algorithm,
            created: initial.created,
            state: initial.state,
            envelopes: HashMap::with_capacity(initial.envelopes.len()),
        };
        for envelope in initial.envelopes {
            dek.insert_envelope(envelope)?;
        }
        Ok(dek)
    }

    /// Store an envelope created after the DEK was persisted.
    pub fn insert_envelope(&mut self, initial: InitialEnvelope) -> Result<&Envelope> {
        if self.envelopes.contains_key(&initial.encrypter_id) {
            return Err(KmsError::DuplicateEnvelope(initial.encrypter_id));
        }

        let provider_id = initial.encrypter_id.clone();
        let envelope = Envelope {
            id: Uuid::new_v4().to_string(),
            dek_id: self.id.clone(),
            algorithm: initial.algorithm,
            key: initial.key,
            created: initial.created,
            state: initial.state,
            encrypter_id: initial.encrypter_id,
        };
        Ok(self.envelopes.entry(provider_id).or_insert(envelope))
    }

    /// Revoke one provider's access without touching the others.
    pub fn revoke_envelope(&mut self, provider_id: &str) -> Result<()> {
        let envelope = self
            .envelopes
            .get_mut(provider_id)
            .ok_or(KmsError::NoValidEnvelope)?;
        envelope.state = KeyState::Destroyed;
        debug!(dek_id = %self.id, encrypter_id = provider_id, "dek envelope revoked");
        Ok(())
    }

    /// Recover the raw key through the envelope that matches `dec`.
    pub fn unseal(&self, dec: &dyn Decrypter) -> Result<UnsealedDek> {
        if self.state.is_destroyed() {
            warn!(dek_id = %self.id, "dek unseal refused: dek revoked");
            return Err(KmsError::KeyRevoked);
        }

        let provider_id = dec.id();
        let envelope = match self.envelopes.get(&provider_id) {
            Some(envelope) => envelope,
            None => {
                warn!(dek_id = %self.id, encrypter_id = %provider_id, "dek unseal refused: no envelope");
                return Err(KmsError::NoValidEnvelope);
            }
        };
        if envelope.state.is_destroyed() {
            warn!(dek_id = %self.id, encrypter_id = %provider_id, "dek unseal refused: envelope revoked");
            return Err(KmsError::KeyRevoked);
        }

        let id = Uuid::parse_str(&self.id).map_err(|source| KmsError::InvalidId {
            kind: "DEK",
            id: self.id.clone(),
            source,
        })?;

        let key = Zeroizing::new(
            dec.decrypt(&envelope.key)
                .map_err(KmsError::provider("dek unseal"))?,
        );
        if key.len() != AES_KEY_BYTES {
            return Err(KmsError::InvalidDek);
        }

        let mut vault = Vault::new();
        vault.store(&key[..])?;

        debug!(dek_id = %self.id, encrypter_id = %provider_id, "dek unsealed");
        Ok(UnsealedDek {
            id: Some(id),
            key: vault,
            state: self.state,
        })
    }
}

// ---------------------------------------------------------------------------
// Runtime form
// ---------------------------------------------------------------------------

/// A DEK with its raw key in memory. Never persisted.
#[derive(Debug)]
pub struct UnsealedDek {
    id: Option<Uuid>,
    key: Vault,
    state: KeyState,
}

impl UnsealedDek {
    /// Fresh random key, `Active`, with no identity until stored and reloaded.
    pub fn generate() -> Result<Self> {
        let raw = aead::generate_key().map_err(KmsError::crypto("dek generate"))?;
        let mut key = Vault::new();
        key.store(&raw[..])?;
        Ok(Self {
            id: None,
            key,
            state: KeyState::Active,
        })
    }

    /// Wrap the key under `enc` and return the pre-storage record.
    pub fn seal(&self, enc: &dyn Encrypter) -> Result<InitialDek> {
        let envelope = self.create_envelope(enc)?;
        debug!(encrypter_id = %envelope.encrypter_id, "dek sealed");
        Ok(InitialDek {
            algorithm: Algorithm::Aes256Gcm,
            created: Utc::now(),
            state: self.state,
            envelopes: vec![envelope],
        })
    }

    /// Wrap the key under one more provider.
    pub fn create_envelope(&self, enc: &dyn Encrypter) -> Result<InitialEnvelope> {
        if self.state.is_destroyed() {
            return Err(KmsError::KeyRevoked);
        }
        let encrypter_id = enc.id();
        validate_provider_id(&encrypter_id).map_err(KmsError::crypto("dek create envelope"))?;

        let key = self.with_key(|key| {
            enc.encrypt(key)
                .map_err(KmsError::provider("dek create envelope"))
        })?;

        debug!(encrypter_id = %encrypter_id, "dek envelope created");
        Ok(InitialEnvelope {
            algorithm: Algorithm::Aes256Gcm,
            key,
            created: Utc::now(),
            state: KeyState::Active,
            encrypter_id,
        })
    }

    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Ciphertext> {
        self.with_key(|key| aead::encrypt(key, plaintext).map_err(KmsError::crypto("dek encrypt")))
    }

    pub fn decrypt(&self, ct: &Ciphertext) -> Result<Vec<u8>> {
        self.with_key(|key| aead::decrypt(key, ct).map_err(KmsError::crypto("dek decrypt")))
    }

    /// Wipe the key and mark the DEK destroyed. Idempotent.
    pub fn clear(&mut self) {
        if !self.state.is_destroyed() {
            debug!(dek_id = %self.id(), "dek cleared");
        }
        self.key.cleanup();
        self.state = KeyState::Destroyed;
    }

    /// `dek-<uuid>`, or `""` for a DEK that has not been stored yet.
    pub fn id(&self) -> String {
        self.id
            .map(|id| format!("{}{}", ID_PREFIX, id))
            .unwrap_or_default()
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    pub fn has_key(&self) -> bool {
        self.key.has_key()
    }

    fn with_key<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&[u8]) -> Result<T>,
    {
        if self.state.is_destroyed() {
            return Err(KmsError::KeyRevoked);
        }
        if !self.key.has_key() {
            return Err(KmsError::InvalidDek);
        }
        self.key.use_key(|key| {
            if key.len() != AES_KEY_BYTES {
                return Err(KmsError::InvalidDek);
            }
            op(key)
        })
    }
}

impl Encrypter for UnsealedDek {
    fn encrypt(&self, plaintext: &[u8]) -> std::result::Result<Ciphertext, ProviderError> {
        UnsealedDek::encrypt(self, plaintext).map_err(Into::into)
    }

    fn id(&self) -> String {
        UnsealedDek::id(self)
    }
}

impl Decrypter for UnsealedDek {
    fn decrypt(&self, ct: &Ciphertext) -> std::result::Result<Vec<u8>, ProviderError> {
        UnsealedDek::decrypt(self, ct).map_err(Into::into)
    }

    fn id(&self) -> String {
        UnsealedDek::id(self)
    }
}
