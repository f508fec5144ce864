//! Unified error type for the openk primitives.

use core::fmt;

/// Coarse classification shared by every error in the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed input. Recoverable by correcting the input, never retried.
    Validation,
    /// Operation attempted against an object in an incompatible lifecycle state.
    StateConflict,
    /// Authentication or decryption failure. Carries no detail about the cause.
    Cryptographic,
    /// Required key material or entropy is not available.
    ResourceAbsence,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::StateConflict => write!(f, "state conflict"),
            ErrorKind::Cryptographic => write!(f, "cryptographic failure"),
            ErrorKind::ResourceAbsence => write!(f, "resource absence"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    // Ciphertext construction
    NilParameter,
    InvalidNonce { actual: usize },
    InvalidTag { actual: usize },

    // AES-256-GCM
    KeySize { expected: usize, actual: usize },
    Encryption,
    /// Uniform failure for every decryption path (oracle discipline).
    Decryption,

    // RSA-OAEP
    RsaKeySize { bits: usize },
    InvalidPrivateKey,
    InvalidPublicKey,
    MessageTooLong { max: usize, actual: usize },

    // PBKDF2
    EmptyPassword,
    InvalidSalt,
    InvalidIterations,
    InvalidKeyLength,

    // Providers
    InvalidProviderId(String),
    UnknownAlgorithm(u8),
    UnknownKeyState(u8),

    /// Entropy source unavailable.
    Randomness,
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Decryption | Self::Encryption | Self::MessageTooLong { .. } => {
                ErrorKind::Cryptographic
            }
            Self::Randomness => ErrorKind::ResourceAbsence,
            _ => ErrorKind::Validation,
        }
    }
}

impl fmt::Display for CryptoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NilParameter => write!(f, "parameter cannot be nil"),
            Self::InvalidNonce { actual } => {
                write!(f, "nonce must be 12 bytes, got {}", actual)
            }
            Self::InvalidTag { actual } => write!(f, "tag must be 16 bytes, got {}", actual),
            Self::KeySize { expected, actual } => {
                write!(f, "AES key must be {} bytes, got {}", expected, actual)
            }
            Self::Encryption => write!(f, "encryption failed"),
            Self::Decryption => write!(f, "decryption failed"),
            Self::RsaKeySize { bits } => {
                write!(f, "RSA key size must be at least 2048 bits, got {}", bits)
            }
            Self::InvalidPrivateKey => write!(f, "invalid RSA private key"),
            Self::InvalidPublicKey => write!(f, "invalid RSA public key"),
            Self::MessageTooLong { max, actual } => write!(
                f,
                "message too long for RSA-OAEP encryption ({} > {} bytes)",
                actual, max
            ),
            Self::EmptyPassword => write!(f, "password cannot be empty"),
            Self::InvalidSalt => write!(f, "salt cannot be empty"),
            Self::InvalidIterations => write!(f, "iteration count must be positive"),
            Self::InvalidKeyLength => write!(f, "derived key length must be positive"),
            Self::InvalidProviderId(id) => write!(f, "invalid provider ID {:?}", id),
            Self::UnknownAlgorithm(code) => write!(f, "unknown algorithm code {}", code),
            Self::UnknownKeyState(code) => write!(f, "unknown key state code {}", code),
            Self::Randomness => write!(f, "random number generator unavailable"),
        }
    }
}

impl std::error::Error for CryptoError {}

pub type Result<T> = core::result::Result<T, CryptoError>;
