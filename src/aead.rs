//! AEAD: AES-256-GCM

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use getrandom::getrandom;
use zeroize::Zeroizing;

use crate::ciphertext::{Ciphertext, NONCE_BYTES};
use crate::error::{CryptoError, Result};

/// AES-256 key size in bytes.
pub const AES_KEY_BYTES: usize = 32;

/// Generate a fresh random AES-256 key.
pub fn generate_key() -> Result<Zeroizing<[u8; AES_KEY_BYTES]>> {
    let mut key = Zeroizing::new([0u8; AES_KEY_BYTES]);
    getrandom(&mut key[..]).map_err(|_| CryptoError::Randomness)?;
    Ok(key)
}

/// Generate a random 12-byte nonce. Used during encryption only.
pub fn generate_nonce() -> Result<[u8; NONCE_BYTES]> {
    let mut n = [0u8; NONCE_BYTES];
    getrandom(&mut n).map_err(|_| CryptoError::Randomness)?;
    Ok(n)
}

fn cipher(key: &[u8]) -> Result<Aes256Gcm> {
    if key.len() != AES_KEY_BYTES {
        return Err(CryptoError::KeySize {
            expected: AES_KEY_BYTES,
            actual: key.len(),
        });
    }
    Aes256Gcm::new_from_slice(key).map_err(|_| CryptoError::KeySize {
        expected: AES_KEY_BYTES,
        actual: key.len(),
    })
}

/// Encrypt `plaintext` under `key` with a fresh random nonce.
///
/// An empty plaintext is valid and yields empty `data` with a real tag.
pub fn encrypt(key: &[u8], plaintext: &[u8]) -> Result<Ciphertext> {
    let cipher = cipher(key)?;
    let nonce = generate_nonce()?;
    let sealed = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|_| CryptoError::Encryption)?;
    Ciphertext::from_sealed(nonce, sealed)
}

/// Authenticated decryption. Every tampering case returns the same
/// [`CryptoError::Decryption`].
pub fn decrypt(key: &[u8], ct: &Ciphertext) -> Result<Vec<u8>> {
    let cipher = cipher(key)?;
    let sealed = ct.sealed_bytes();
    cipher
        .decrypt(Nonce::from_slice(ct.nonce()), sealed.as_slice())
        .map_err(|_| CryptoError::Decryption)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ciphertext::TAG_BYTES;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = generate_key().unwrap();
        let plaintext = b"Hello, openk! This is secret data.";

        let ct = encrypt(&key[..], plaintext).unwrap();
        assert_eq!(ct.data().len(), plaintext.len());
        let decrypted = decrypt(&key[..], &ct).unwrap();

        assert_eq!(&decrypted, plaintext);
    }

    #[test]
    fn test_empty_plaintext() {
        let key = generate_key().unwrap();
        let ct = encrypt(&key[..], b"").unwrap();
        assert!(ct.data().is_empty());
        assert_eq!(ct.tag().len(), TAG_BYTES);
        let decrypted = decrypt(&key[..], &ct).unwrap();
        assert!(decrypted.is_empty());
    }

    #[test]
    fn test_key_size_checked() {
        let err = encrypt(&[0u8; 31], b"data").unwrap_err();
        assert_eq!(err, CryptoError::KeySize { expected: 32, actual: 31 });
        assert!(encrypt(&[0u8; 32], b"data").is_ok());
        assert!(matches!(encrypt(&[0u8; 33], b"data"), Err(CryptoError::KeySize { .. })));
        assert!(matches!(encrypt(&[], b"data"), Err(CryptoError::KeySize { .. })));
    }

    #[test]
    fn test_decrypt_key_size_checked() {
        let key = generate_key().unwrap();
        let ct = encrypt(&key[..], b"data").unwrap();
        assert!(matches!(decrypt(&key[..16], &ct), Err(CryptoError::KeySize { .. })));
    }

    #[test]
    fn test_wrong_key_fails() {
        let key1 = generate_key().unwrap();
        let key2 = generate_key().unwrap();
        let ct = encrypt(&key1[..], b"secret").unwrap();
        assert_eq!(decrypt(&key2[..], &ct), Err(CryptoError::Decryption));
    }

    #[test]
    fn test_nonce_never_repeats() {
        let key = generate_key().unwrap();
        let a = encrypt(&key[..], b"same").unwrap();
        let b = encrypt(&key[..], b"same").unwrap();
        assert_ne!(a.nonce(), b.nonce());
        assert_ne!(a.data(), b.data());
    }

    #[test]
    fn test_tampered_nonce_fails() {
        let key = generate_key().unwrap();
        let ct = encrypt(&key[..], b"secret").unwrap();
        let mut nonce = *ct.nonce();
        nonce[0] ^= 0x01;
        let bad = Ciphertext::new(&nonce, ct.data(), ct.tag()).unwrap();
        assert_eq!(decrypt(&key[..], &bad), Err(CryptoError::Decryption));
    }

    #[test]
    fn test_generated_keys_differ() {
        let k1 = generate_key().unwrap();
        let k2 = generate_key().unwrap();
        assert_ne!(&k1[..], &k2[..]);
    }
}
