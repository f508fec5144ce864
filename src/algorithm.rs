//! Supported algorithms and their persisted numeric codes.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Algorithm identifiers as stored alongside wrapped keys.
///
/// Persisted as a `u8` code. Unknown codes are rejected, never mapped onto a
/// known variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Algorithm {
    /// RSA with OAEP padding and SHA-256. Used for key wrapping.
    RsaOaepSha256,
    /// AES-256 in GCM mode. Used for data and key encryption.
    Aes256Gcm,
}

impl Algorithm {
    pub const fn code(self) -> u8 {
        match self {
            Algorithm::RsaOaepSha256 => 0,
            Algorithm::Aes256Gcm => 1,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(Algorithm::RsaOaepSha256),
            1 => Some(Algorithm::Aes256Gcm),
            _ => None,
        }
    }

    /// Whether `code` names a known algorithm.
    pub const fn is_valid_code(code: u8) -> bool {
        Self::from_code(code).is_some()
    }

    pub const fn name(self) -> &'static str {
        match self {
            Algorithm::RsaOaepSha256 => "RSA-OAEP-SHA256",
            Algorithm::Aes256Gcm => "AES-256-GCM",
        }
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<u8> for Algorithm {
    type Error = CryptoError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(CryptoError::UnknownAlgorithm(code))
    }
}

impl From<Algorithm> for u8 {
    fn from(alg: Algorithm) -> u8 {
        alg.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Algorithm::RsaOaepSha256.to_string(), "RSA-OAEP-SHA256");
        assert_eq!(Algorithm::Aes256Gcm.to_string(), "AES-256-GCM");
    }

    #[test]
    fn test_codes_roundtrip() {
        for alg in [Algorithm::RsaOaepSha256, Algorithm::Aes256Gcm] {
            assert_eq!(Algorithm::try_from(alg.code()).unwrap(), alg);
            assert!(Algorithm::is_valid_code(alg.code()));
        }
    }

    #[test]
    fn test_unknown_code_is_invalid() {
        for code in [2u8, 3, 42, 255] {
            assert!(!Algorithm::is_valid_code(code));
            assert_eq!(Algorithm::try_from(code), Err(CryptoError::UnknownAlgorithm(code)));
        }
    }
}
