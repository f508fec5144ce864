//! PBKDF2-HMAC-SHA256 password-based key derivation.

use getrandom::getrandom;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result};

/// Random salt size for [`generate_salt`] (128 bits).
pub const DEFAULT_SALT_BYTES: usize = 16;

/// Derived master key size (256 bits).
pub const MASTER_KEY_BYTES: usize = 32;

pub const DEFAULT_ITERATIONS: u32 = 100_000;

/// Usernames double as salts, so any non-empty salt is accepted.
pub const MIN_SALT_BYTES: usize = 1;

/// Random salt for callers that do not salt with a username.
pub fn generate_salt() -> Result<[u8; DEFAULT_SALT_BYTES]> {
    let mut salt = [0u8; DEFAULT_SALT_BYTES];
    getrandom(&mut salt).map_err(|_| CryptoError::Randomness)?;
    Ok(salt)
}

/// Deterministic: identical arguments always produce identical output.
pub fn derive_key(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    key_len: usize,
) -> Result<Zeroizing<Vec<u8>>> {
    if password.is_empty() {
        return Err(CryptoError::EmptyPassword);
    }
    if salt.len() < MIN_SALT_BYTES {
        return Err(CryptoError::InvalidSalt);
    }
    if iterations == 0 {
        return Err(CryptoError::InvalidIterations);
    }
    if key_len == 0 {
        return Err(CryptoError::InvalidKeyLength);
    }

    let mut out = Zeroizing::new(vec![0u8; key_len]);
    pbkdf2::pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out);
    Ok(out)
}

/// Fixed-size variant of [`derive_key`] for 256-bit keys.
pub fn derive_key32(
    password: &[u8],
    salt: &[u8],
    iterations: u32,
) -> Result<Zeroizing<[u8; MASTER_KEY_BYTES]>> {
    let v = derive_key(password, salt, iterations, MASTER_KEY_BYTES)?;
    let mut out = Zeroizing::new([0u8; MASTER_KEY_BYTES]);
    out.copy_from_slice(&v);
    Ok(out)
}

/// [`derive_key`] with [`DEFAULT_ITERATIONS`] and [`MASTER_KEY_BYTES`].
pub fn derive_master_key(password: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    derive_key(password, salt, DEFAULT_ITERATIONS, MASTER_KEY_BYTES)
}
