//! RSA-OAEP-SHA256 key wrapping.
//!
//! Private keys travel as PKCS#8 DER, public keys as SPKI DER. Import
//! rejects anything that is not an RSA key of at least [`RSA_MIN_BITS`].

use rand_core::OsRng;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::ciphertext::Ciphertext;
use crate::error::{CryptoError, Result};

/// Minimum accepted modulus size.
pub const RSA_MIN_BITS: usize = 2048;

/// Extended modulus size.
pub const RSA_4096_BITS: usize = 4096;

// SHA-256 output length.
const HASH_BYTES: usize = 32;

pub fn generate_key_pair(bits: usize) -> Result<RsaPrivateKey> {
    if bits < RSA_MIN_BITS {
        return Err(CryptoError::RsaKeySize { bits });
    }
    RsaPrivateKey::new(&mut OsRng, bits).map_err(|_| CryptoError::Randomness)
}

/// Export as PKCS#8 DER. The buffer is wiped on drop.
pub fn export_private_key(key: &RsaPrivateKey) -> Result<Zeroizing<Vec<u8>>> {
    let doc = key
        .to_pkcs8_der()
        .map_err(|_| CryptoError::InvalidPrivateKey)?;
    Ok(Zeroizing::new(doc.as_bytes().to_vec()))
}

pub fn import_private_key(der: &[u8]) -> Result<RsaPrivateKey> {
    let key = RsaPrivateKey::from_pkcs8_der(der).map_err(|_| CryptoError::InvalidPrivateKey)?;
    check_bits(key.size())?;
    Ok(key)
}

/// Export as SPKI (X.509 SubjectPublicKeyInfo) DER.
pub fn export_public_key(key: &RsaPublicKey) -> Result<Vec<u8>> {
    let doc = key
        .to_public_key_der()
        .map_err(|_| CryptoError::InvalidPublicKey)?;
    Ok(doc.as_bytes().to_vec())
}

pub fn import_public_key(der: &[u8]) -> Result<RsaPublicKey> {
    let key = RsaPublicKey::from_public_key_der(der).map_err(|_| CryptoError::InvalidPublicKey)?;
    check_bits(key.size())?;
    Ok(key)
}

fn check_bits(size_bytes: usize) -> Result<()> {
    let bits = size_bytes * 8;
    if bits < RSA_MIN_BITS {
        return Err(CryptoError::RsaKeySize { bits });
    }
    Ok(())
}

/// Largest plaintext OAEP/SHA-256 accepts under `key`: `k - 2*hLen - 2`.
pub fn max_message_len(key: &RsaPublicKey) -> usize {
    key.size().saturating_sub(2 * HASH_BYTES + 2)
}

/// OAEP/SHA-256 encryption, no label.
///
/// RSA has no nonce or tag; the result carries zeroed ones and the whole
/// RSA output in `data`.
pub fn encrypt(key: &RsaPublicKey, msg: &[u8]) -> Result<Ciphertext> {
    let max = max_message_len(key);
    if msg.len() > max {
        return Err(CryptoError::MessageTooLong {
            max,
            actual: msg.len(),
        });
    }
    let out = key
        .encrypt(&mut OsRng, Oaep::new::<Sha256>(), msg)
        .map_err(|_| CryptoError::Encryption)?;
    Ok(Ciphertext::unframed(out))
}

/// Blinded OAEP/SHA-256 decryption. Malformed input fails with the
/// generic [`CryptoError::Decryption`].
pub fn decrypt(key: &RsaPrivateKey, ciphertext: &[u8]) -> Result<Vec<u8>> {
    key.decrypt_blinded(&mut OsRng, Oaep::new::<Sha256>(), ciphertext)
        .map_err(|_| CryptoError::Decryption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::OnceLock;

    fn test_key() -> &'static RsaPrivateKey {
        static KEY: OnceLock<RsaPrivateKey> = OnceLock::new();
        KEY.get_or_init(|| generate_key_pair(RSA_MIN_BITS).unwrap())
    }

    #[test]
    fn test_rejects_small_modulus() {
        assert!(matches!(
            generate_key_pair(1024),
            Err(CryptoError::RsaKeySize { bits: 1024 })
        ));
    }

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = test_key();
        let ct = encrypt(&key.to_public_key(), b"wrapped dek material").unwrap();
        assert_eq!(ct.nonce(), &[0u8; 12]);
        assert_eq!(ct.tag(), &[0u8; 16]);
        assert_eq!(ct.data().len(), 256);
        assert_eq!(decrypt(key, ct.data()).unwrap(), b"wrapped dek material");
    }

    #[test]
    fn test_max_message_len() {
        let public = test_key().to_public_key();
        let max = max_message_len(&public);
        assert_eq!(max, 256 - 66);
        assert!(encrypt(&public, &vec![7u8; max]).is_ok());
        assert_eq!(
            encrypt(&public, &vec![7u8; max + 1]).unwrap_err(),
            CryptoError::MessageTooLong { max, actual: max + 1 }
        );
    }

    #[test]
    fn test_pkcs8_roundtrip() {
        let key = test_key();
        let der = export_private_key(key).unwrap();
        let back = import_private_key(&der).unwrap();
        assert!(back == *key);
    }

    #[test]
    fn test_spki_roundtrip() {
        let public = test_key().to_public_key();
        let der = export_public_key(&public).unwrap();
        assert_eq!(import_public_key(&der).unwrap(), public);
    }

    // RFC 8410 section 10.3 Ed25519 private key
    const ED25519_PKCS8: &str =
        "302e020100300506032b657004220420d4ee72dbf913584ad5b6d8f1f769f8ad3afe7c28cbf1d4fbe097a88f44755842";

    #[test]
    fn test_import_rejects_small_modulus() {
        // built directly, generate_key_pair refuses this size
        let small = RsaPrivateKey::new(&mut OsRng, 1024).unwrap();

        let der = export_private_key(&small).unwrap();
        assert_eq!(import_private_key(&der).unwrap_err(), CryptoError::RsaKeySize { bits: 1024 });

        let der = export_public_key(&small.to_public_key()).unwrap();
        assert_eq!(import_public_key(&der).unwrap_err(), CryptoError::RsaKeySize { bits: 1024 });
    }

    #[test]
    fn test_import_rejects_non_rsa_key() {
        let der = hex::decode(ED25519_PKCS8).unwrap();
        assert_eq!(import_private_key(&der).unwrap_err(), CryptoError::InvalidPrivateKey);
    }

    #[test]
    fn test_rsa_4096_roundtrip() {
        let key = generate_key_pair(RSA_4096_BITS).unwrap();
        let public = key.to_public_key();
        assert_eq!(max_message_len(&public), 512 - 66);

        let ct = encrypt(&public, b"wrapped under 4096").unwrap();
        assert_eq!(ct.data().len(), 512);
        assert_eq!(decrypt(&key, ct.data()).unwrap(), b"wrapped under 4096");
    }

    #[test]
    fn test_import_garbage() {
        assert_eq!(import_private_key(b"not a key").unwrap_err(), CryptoError::InvalidPrivateKey);
        assert_eq!(import_public_key(&[]).unwrap_err(), CryptoError::InvalidPublicKey);
    }

    #[test]
    fn test_public_der_is_not_a_private_key() {
        let der = export_public_key(&test_key().to_public_key()).unwrap();
        assert_eq!(import_private_key(&der).unwrap_err(), CryptoError::InvalidPrivateKey);
    }

    #[test]
    fn test_tampered_ciphertext_fails_generically() {
        let key = test_key();
        let ct = encrypt(&key.to_public_key(), b"secret").unwrap();
        let mut data = ct.data().to_vec();
        data[10] ^= 0x80;
        assert_eq!(decrypt(key, &data).unwrap_err(), CryptoError::Decryption);
        assert_eq!(decrypt(key, &data[..100]).unwrap_err(), CryptoError::Decryption);
    }
}
