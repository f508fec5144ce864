//! # openk-crypto
//!
//! Cryptographic primitives for the openk key-management core.
//!
//! ## Quick Start
//!
//! ```rust
//! use openk_crypto::aead;
//!
//! let key = aead::generate_key().unwrap();
//! let ct = aead::encrypt(&key[..], b"secret").unwrap();
//! let pt = aead::decrypt(&key[..], &ct).unwrap();
//!
//! assert_eq!(pt, b"secret");
//! ```
//!
//! ## Contents
//!
//! - **AES-256-GCM**: random nonce per call, uniform decryption failure
//! - **RSA-OAEP-SHA256**: PKCS#8 / SPKI DER import and export, 2048-bit floor
//! - **PBKDF2-HMAC-SHA256**: deterministic password-based derivation
//! - **Ciphertext / Algorithm / KeyState**: validated value types
//! - **Encrypter / Decrypter**: the wrapping-provider seam
//!
//! ## What's NOT Provided
//!
//! - Key lifecycle (see `openk-kms`)
//! - Wire framing of ciphertexts
//! - Persistence

#![deny(unsafe_code)]

pub mod aead;
pub mod algorithm;
pub mod ciphertext;
pub mod error;
pub mod kdf;
pub mod key_state;
pub mod provider;
pub mod rsa_oaep;
pub mod wipe;

pub use algorithm::Algorithm;
pub use ciphertext::{Ciphertext, RawCiphertext, NONCE_BYTES, TAG_BYTES};
pub use error::{CryptoError, ErrorKind, Result};
pub use key_state::KeyState;
pub use provider::{validate_provider_id, Decrypter, Encrypter, ProviderError, MAX_PROVIDER_ID_LEN};
pub use wipe::{ct_copy, secure_wipe};

/// Re-exported so callers can name key types without a direct `rsa` dependency.
pub use rsa::{RsaPrivateKey, RsaPublicKey};
