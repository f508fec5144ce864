//! # openk KMS
//!
//! Key lifecycle for the openk key-management core.
//!
//! A password-derived [`MasterKey`] wraps data encryption keys
//! ([`UnsealedDek`]) and RSA key pairs ([`UnsealedKeyPair`]); key pairs and
//! unsealed DEKs can in turn wrap other DEKs. Wrapped keys leave this crate
//! only as plain records ([`InitialDek`], [`Dek`], [`InitialKeyPair`],
//! [`KeyPair`]) for an external storage layer to persist.
//!
//! Built on `openk-crypto` for AES-256-GCM, RSA-OAEP-SHA256 and PBKDF2.
//!
//! ## Quick Start
//!
//! ```
//! use openk_kms::*;
//!
//! let mut mk = MasterKey::with_config(KdfConfig::with_iterations(1_000));
//! mk.derive(b"password", "alice").unwrap();
//!
//! // Generate and seal a DEK, then persist it under a UUID
//! let dek = UnsealedDek::generate().unwrap();
//! let record = Dek::from_initial(uuid::Uuid::new_v4().to_string(), dek.seal(&mk).unwrap()).unwrap();
//!
//! // Later: unseal and use
//! let dek = record.unseal(&mk).unwrap();
//! let ct = dek.encrypt(b"hello").unwrap();
//! assert_eq!(dek.decrypt(&ct).unwrap(), b"hello");
//! ```
//!
//! ## Concurrency
//!
//! Nothing here is internally synchronized. Every mutating operation takes
//! `&mut self`; share an instance across threads behind a `Mutex`.

#![deny(unsafe_code)]

pub mod config;
pub mod dek;
pub mod error;
pub mod key_derivation;
pub mod key_pair;
pub mod master_key;
pub mod vault;

// Re-export main types for convenience
pub use config::{KdfConfig, AUTH_SALT};
pub use dek::{Dek, Envelope, InitialDek, InitialEnvelope, UnsealedDek};
pub use error::{KmsError, Result};
pub use key_derivation::{
    validate_username, InitialKeyDerivation, KeyDerivation, MAX_USERNAME_BYTES, MIN_ITERATIONS,
};
pub use key_pair::{InitialKeyPair, KeyPair, UnsealedKeyPair};
pub use master_key::MasterKey;
pub use vault::Vault;

pub use openk_crypto::{
    Algorithm, Ciphertext, CryptoError, Decrypter, Encrypter, ErrorKind, KeyState, ProviderError,
};

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn master_key(password: &[u8], username: &str) -> MasterKey {
        let mut mk = MasterKey::with_config(KdfConfig::with_iterations(1_000));
        mk.derive(password, username).unwrap();
        mk
    }

    fn persist_dek(initial: InitialDek) -> Dek {
        // round-trip through JSON like a storage backend would
        let dek = Dek::from_initial(Uuid::new_v4().to_string(), initial).unwrap();
        serde_json::from_str(&serde_json::to_string(&dek).unwrap()).unwrap()
    }

    fn persist_key_pair(initial: InitialKeyPair) -> KeyPair {
        let kp = KeyPair::from_initial(Uuid::new_v4().to_string(), initial);
        serde_json::from_str(&serde_json::to_string(&kp).unwrap()).unwrap()
    }

    // === Scenarios ===

    #[test]
    fn test_scenario_dek_seal_unseal_use() {
        let mk_a = master_key(b"pw-a", "alice");
        let dek = UnsealedDek::generate().unwrap();
        let record = persist_dek(dek.seal(&mk_a).unwrap());

        let unsealed = record.unseal(&mk_a).unwrap();
        let ct = unsealed.encrypt(b"hello").unwrap();
        assert_eq!(unsealed.decrypt(&ct).unwrap(), b"hello");
    }

    #[test]
    fn test_scenario_foreign_master_key() {
        let mk_a = master_key(b"pw-a", "alice");
        let mk_b = master_key(b"pw-b", "bob");
        let record = persist_dek(UnsealedDek::generate().unwrap().seal(&mk_a).unwrap());

        let err = record.unseal(&mk_b).unwrap_err();
        assert!(matches!(err, KmsError::NoValidEnvelope));
        assert_eq!(err.kind(), ErrorKind::StateConflict);
    }

    #[test]
    fn test_scenario_key_pair_encrypter_id_mutated() {
        let mk = master_key(b"pw", "alice");
        let kp = UnsealedKeyPair::generate().unwrap();
        let mut record = persist_key_pair(kp.initial_seal(&mk).unwrap());
        assert_eq!(record.encrypter_id, mk.id());

        record.encrypter_id = "masterkey-ffffffffffffffffffffffffffffffff".to_string();
        assert!(matches!(record.unseal(&mk), Err(KmsError::DecrypterIdMismatch)));
    }

    #[test]
    fn test_scenario_derive_twice() {
        let mut mk = master_key(b"pw", "alice");
        let ct = mk.encrypt(b"still here").unwrap();

        let err = mk.derive(b"pw", "alice").unwrap_err();
        assert!(matches!(err, KmsError::KeyAlreadySet));
        assert_eq!(mk.decrypt(&ct).unwrap(), b"still here");
    }

    #[test]
    fn test_scenario_aes_key_size() {
        use openk_crypto::aead;
        assert_eq!(
            aead::encrypt(&[0u8; 31], b"x").unwrap_err(),
            CryptoError::KeySize { expected: 32, actual: 31 }
        );
        assert!(aead::encrypt(&[0u8; 32], b"x").is_ok());
    }

    // === Envelope targeting ===

    #[test]
    fn test_envelope_targeting() {
        let a = master_key(b"pw", "a");
        let b = master_key(b"pw", "b");
        let c = master_key(b"pw", "c");

        let dek = UnsealedDek::generate().unwrap();
        let ct = dek.encrypt(b"shared").unwrap();
        let mut initial = dek.seal(&a).unwrap();
        initial.add_envelope(dek.create_envelope(&b).unwrap()).unwrap();
        let record = persist_dek(initial);

        assert_eq!(record.unseal(&a).unwrap().decrypt(&ct).unwrap(), b"shared");
        assert_eq!(record.unseal(&b).unwrap().decrypt(&ct).unwrap(), b"shared");
        assert!(matches!(record.unseal(&c), Err(KmsError::NoValidEnvelope)));
    }

    #[test]
    fn test_envelope_added_after_persist() {
        let a = master_key(b"pw", "a");
        let b = master_key(b"pw", "b");
        let mut record = persist_dek(UnsealedDek::generate().unwrap().seal(&a).unwrap());

        let unsealed = record.unseal(&a).unwrap();
        let dek_id = record
            .insert_envelope(unsealed.create_envelope(&b).unwrap())
            .unwrap()
            .dek_id
            .clone();
        assert_eq!(dek_id, record.id);
        assert!(record.unseal(&b).is_ok());
    }

    // === Key-state gating ===

    #[test]
    fn test_destroyed_blocks_everything() {
        let mk = master_key(b"pw", "alice");

        let mut dek = UnsealedDek::generate().unwrap();
        let ct = dek.encrypt(b"x").unwrap();
        dek.clear();
        for err in [
            dek.encrypt(b"x").unwrap_err(),
            dek.decrypt(&ct).unwrap_err(),
            dek.seal(&mk).unwrap_err(),
        ] {
            assert!(matches!(err, KmsError::KeyRevoked));
            assert_eq!(err.kind(), ErrorKind::StateConflict);
        }

        let mut kp = UnsealedKeyPair::generate().unwrap();
        let ct = kp.encrypt(b"x").unwrap();
        kp.clear();
        for err in [
            kp.encrypt(b"x").unwrap_err(),
            kp.decrypt(&ct).unwrap_err(),
            kp.initial_seal(&mk).unwrap_err(),
        ] {
            assert!(matches!(err, KmsError::KeyRevoked));
        }
    }

    #[test]
    fn test_pending_rotation_still_usable() {
        let mk = master_key(b"pw", "alice");
        let mut record = persist_dek(UnsealedDek::generate().unwrap().seal(&mk).unwrap());
        assert!(record.state.can_transition_to(KeyState::PendingRotation));
        record.state = KeyState::PendingRotation;

        let dek = record.unseal(&mk).unwrap();
        assert_eq!(dek.state(), KeyState::PendingRotation);
        assert!(dek.encrypt(b"x").is_ok());
    }

    // === Idempotent clear ===

    #[test]
    fn test_clear_twice_everywhere() {
        let mut mk = master_key(b"pw", "alice");
        let mut dek = UnsealedDek::generate().unwrap();
        let mut kp = UnsealedKeyPair::generate().unwrap();

        for _ in 0..2 {
            mk.clear();
            dek.clear();
            kp.clear();
        }
        assert!(!mk.has_key());
        assert_eq!(dek.state(), KeyState::Destroyed);
        assert_eq!(kp.state(), KeyState::Destroyed);
    }

    // === Key hierarchy ===

    #[test]
    fn test_master_key_to_key_pair_to_dek() {
        let mk = master_key(b"pw", "alice");
        let kp_record = persist_key_pair(UnsealedKeyPair::generate().unwrap().initial_seal(&mk).unwrap());

        let kek = kp_record.unseal(&mk).unwrap();
        let dek = UnsealedDek::generate().unwrap();
        let ct = dek.encrypt(b"deep").unwrap();
        let dek_record = persist_dek(dek.seal(&kek).unwrap());

        // fresh process: re-derive, re-unseal both layers
        let mk2 = master_key(b"pw", "alice");
        let kek2 = kp_record.unseal(&mk2).unwrap();
        assert_eq!(kek2.id(), kek.id());
        let dek2 = dek_record.unseal(&kek2).unwrap();
        assert_eq!(dek2.decrypt(&ct).unwrap(), b"deep");
    }
}
