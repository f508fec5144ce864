//! RSA key pairs with a sealed private key.
//!
//! Unlike a DEK, a key pair has exactly one protector: the provider whose
//! ID is recorded at creation. An unsealed key pair is itself a wrapping
//! provider (key-encrypting key).

use chrono::{DateTime, Utc};
use openk_crypto::rsa_oaep::{self, RSA_MIN_BITS};
use openk_crypto::{
    validate_provider_id, Algorithm, Ciphertext, Decrypter, Encrypter, KeyState, ProviderError,
    RsaPrivateKey, RsaPublicKey,
};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use tracing::{debug, warn};
use uuid::Uuid;
use zeroize::Zeroizing;

use crate::error::{KmsError, Result};

const ID_PREFIX: &str = "keypair-";

/// A key pair before storage assigns an ID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialKeyPair {
    pub algorithm: Algorithm,
    /// SPKI DER, in the clear.
    pub public_key: Vec<u8>,
    /// PKCS#8 DER, sealed under `encrypter_id`.
    pub private_key: Ciphertext,
    pub created: DateTime<Utc>,
    pub state: KeyState,
    pub encrypter_id: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    pub id: String,
    pub algorithm: Algorithm,
    pub public_key: Vec<u8>,
    pub private_key: Ciphertext,
    pub created: DateTime<Utc>,
    pub state: KeyState,
    pub encrypter_id: String,
}

impl KeyPair {
    pub fn from_initial(id: impl Into<String>, initial: InitialKeyPair) -> Self {
        Self {
            id: id.into(),
            algorithm: initial.algorithm,
            public_key: initial.public_key,
            private_key: initial.private_key,
            created: initial.created,
            state: initial.state,
            encrypter_id: initial.encrypter_id,
        }
    }

    /// Recover the private key. `dec` must be the provider that sealed it.
    pub fn unseal(&self, dec: &dyn Decrypter) -> Result<UnsealedKeyPair> {
        if self.state.is_destroyed() {
            warn!(key_pair_id = %self.id, "key pair unseal refused: revoked");
            return Err(KmsError::KeyRevoked);
        }
        let provider_id = dec.id();
        if self.encrypter_id != provider_id {
            warn!(
                key_pair_id = %self.id,
                encrypter_id = %provider_id,
                "key pair unseal refused: decrypter mismatch"
            );
            return Err(KmsError::DecrypterIdMismatch);
        }

        let id = Uuid::parse_str(&self.id).map_err(|source| KmsError::InvalidId {
            kind: "key pair",
            id: self.id.clone(),
            source,
        })?;

        let der = Zeroizing::new(
            dec.decrypt(&self.private_key)
                .map_err(KmsError::provider("key pair unseal"))?,
        );
        let private_key =
            rsa_oaep::import_private_key(&der[..]).map_err(KmsError::crypto("key pair unseal"))?;
        let public_key = private_key.to_public_key();

        let derived = rsa_oaep::export_public_key(&public_key)
            .map_err(KmsError::crypto("key pair unseal"))?;
        if !bool::from(derived.as_slice().ct_eq(self.public_key.as_slice())) {
            warn!(key_pair_id = %self.id, "key pair unseal refused: public key mismatch");
            return Err(KmsError::PublicKeyMismatch);
        }

        debug!(key_pair_id = %self.id, encrypter_id = %provider_id, "key pair unsealed");
        Ok(UnsealedKeyPair {
            id: Some(id),
            private_key: Some(private_key),
            public_key,
            state: self.state,
        })
    }
}

/// Live RSA key material.
pub struct UnsealedKeyPair {
    id: Option<Uuid>,
    private_key: Option<RsaPrivateKey>,
    public_key: RsaPublicKey,
    state: KeyState,
}

impl UnsealedKeyPair {
    /// Fresh RSA-2048 pair, `Active`, with no identity until stored.
    pub fn generate() -> Result<Self> {
        Self::generate_with_bits(RSA_MIN_BITS)
    }

    pub fn generate_with_bits(bits: usize) -> Result<Self> {
        let private_key =
            rsa_oaep::generate_key_pair(bits).map_err(KmsError::crypto("key pair generate"))?;
        let public_key = private_key.to_public_key();
        Ok(Self {
            id: None,
            private_key: Some(private_key),
            public_key,
            state: KeyState::Active,
        })
    }

    /// Seal the private key under `enc`.
    pub fn initial_seal(&self, enc: &dyn Encrypter) -> Result<InitialKeyPair> {
        let private_key = self.live_private_key()?;
        let encrypter_id = enc.id();
        validate_provider_id(&encrypter_id).map_err(KmsError::crypto("key pair seal"))?;

        let public_der = rsa_oaep::export_public_key(&self.public_key)
            .map_err(KmsError::crypto("key pair seal"))?;
        let private_der = rsa_oaep::export_private_key(private_key)
            .map_err(KmsError::crypto("key pair seal"))?;
        let sealed = enc
            .encrypt(&private_der[..])
            .map_err(KmsError::provider("key pair seal"))?;
        drop(private_der);

        debug!(encrypter_id = %encrypter_id, "key pair sealed");
        Ok(InitialKeyPair {
            algorithm: Algorithm::RsaOaepSha256,
            public_key: public_der,
            private_key: sealed,
            created: Utc::now(),
            state: KeyState::Active,
            encrypter_id,
        })
    }

    pub fn encrypt(&self, data: &[u8]) -> Result<Ciphertext> {
        if self.state.is_destroyed() {
            return Err(KmsError::KeyRevoked);
        }
        rsa_oaep::encrypt(&self.public_key, data).map_err(KmsError::crypto("key pair encrypt"))
    }

    pub fn decrypt(&self, ct: &Ciphertext) -> Result<Vec<u8>> {
        let private_key = self.live_private_key()?;
        rsa_oaep::decrypt(private_key, ct.data()).map_err(KmsError::crypto("key pair decrypt"))
    }

    /// Drop the private key and mark the pair destroyed. Idempotent.
    ///
    /// Dropping `RsaPrivateKey` zeroizes the private exponent, the primes
    /// and the CRT values.
    pub fn clear(&mut self) {
        if self.private_key.take().is_some() {
            debug!(key_pair_id = %self.id(), "key pair cleared");
        }
        self.state = KeyState::Destroyed;
    }

    /// `keypair-<uuid>`, or `""` for a pair that has not been stored yet.
    pub fn id(&self) -> String {
        self.id
            .map(|id| format!("{}{}", ID_PREFIX, id))
            .unwrap_or_default()
    }

    pub fn state(&self) -> KeyState {
        self.state
    }

    pub fn public_key(&self) -> &RsaPublicKey {
        &self.public_key
    }

    /// SPKI DER of the public key.
    pub fn public_key_der(&self) -> Result<Vec<u8>> {
        rsa_oaep::export_public_key(&self.public_key).map_err(KmsError::crypto("key pair export"))
    }

    fn live_private_key(&self) -> Result<&RsaPrivateKey> {
        if self.state.is_destroyed() {
            return Err(KmsError::KeyRevoked);
        }
        self.private_key.as_ref().ok_or(KmsError::KeyRevoked)
    }
}

impl std::fmt::Debug for UnsealedKeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnsealedKeyPair")
            .field("id", &self.id)
            .field("has_private_key", &self.private_key.is_some())
            .field("state", &self.state)
            .finish()
    }
}

impl Encrypter for UnsealedKeyPair {
    fn encrypt(&self, plaintext: &[u8]) -> std::result::Result<Ciphertext, ProviderError> {
        UnsealedKeyPair::encrypt(self, plaintext).map_err(Into::into)
    }

    fn id(&self) -> String {
        UnsealedKeyPair::id(self)
    }
}

impl Decrypter for UnsealedKeyPair {
    fn decrypt(&self, ct: &Ciphertext) -> std::result::Result<Vec<u8>, ProviderError> {
        UnsealedKeyPair::decrypt(self, ct).map_err(Into::into)
    }

    fn id(&self) -> String {
        UnsealedKeyPair::id(self)
    }
}
