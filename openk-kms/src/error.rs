//! Error types for the key lifecycle layer.

use openk_crypto::{CryptoError, ErrorKind, ProviderError};
use thiserror::Error;

/// Result type for lifecycle operations.
pub type Result<T> = std::result::Result<T, KmsError>;

#[derive(Debug, Error)]
pub enum KmsError {
    // Vault
    #[error("no key available")]
    NoKey,

    #[error("vault already contains a key")]
    KeyPresent,

    #[error("invalid key material")]
    InvalidKey,

    // Master key
    #[error("password cannot be empty")]
    InvalidPassword,

    #[error("username cannot be empty")]
    InvalidUsername,

    #[error("master key already derived")]
    KeyAlreadySet,

    #[error("master key not derived")]
    KeyNotDerived,

    #[error("invalid KDF configuration: {0}")]
    Config(&'static str),

    // DEK / key pair
    #[error("key has been revoked")]
    KeyRevoked,

    #[error("invalid DEK")]
    InvalidDek,

    #[error("no valid envelope found for decrypter")]
    NoValidEnvelope,

    #[error("envelope for provider {0:?} already exists")]
    DuplicateEnvelope(String),

    #[error("decrypter ID mismatch")]
    DecrypterIdMismatch,

    #[error("public key does not match sealed private key")]
    PublicKeyMismatch,

    #[error("invalid {kind} ID {id:?}")]
    InvalidId {
        kind: &'static str,
        id: String,
        #[source]
        source: uuid::Error,
    },

    // Key derivation records
    #[error("username cannot be empty")]
    UsernameEmpty,

    #[error("username exceeds maximum length ({actual} > {max} bytes)")]
    UsernameLength { max: usize, actual: usize },

    #[error("username contains invalid characters")]
    UsernameInvalid,

    #[error("iterations below minimum value ({actual} < {min})")]
    IterationsInvalid { min: u32, actual: u32 },

    // Wrapped causes
    #[error("{context}: {source}")]
    Crypto {
        context: &'static str,
        #[source]
        source: CryptoError,
    },

    #[error("{context}: {source}")]
    Provider {
        context: &'static str,
        #[source]
        source: ProviderError,
    },
}

impl KmsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NoKey | Self::KeyNotDerived => ErrorKind::ResourceAbsence,
            Self::KeyPresent
            | Self::KeyAlreadySet
            | Self::KeyRevoked
            | Self::NoValidEnvelope
            | Self::DuplicateEnvelope(_)
            | Self::DecrypterIdMismatch => ErrorKind::StateConflict,
            Self::PublicKeyMismatch => ErrorKind::Cryptographic,
            Self::Crypto { source, .. } => source.kind(),
            Self::Provider { source, .. } => {
                if let Some(e) = source.downcast_ref::<CryptoError>() {
                    e.kind()
                } else if let Some(e) = source.downcast_ref::<KmsError>() {
                    e.kind()
                } else {
                    ErrorKind::Cryptographic
                }
            }
            _ => ErrorKind::Validation,
        }
    }

    /// Innermost primitive error, looking through provider boundaries.
    pub fn crypto_cause(&self) -> Option<&CryptoError> {
        match self {
            Self::Crypto { source, .. } => Some(source),
            Self::Provider { source, .. } => source
                .downcast_ref::<CryptoError>()
                .or_else(|| source.downcast_ref::<KmsError>()?.crypto_cause()),
            _ => None,
        }
    }

    /// Lifecycle error raised inside a provider, if any.
    pub fn provider_cause(&self) -> Option<&KmsError> {
        match self {
            Self::Provider { source, .. } => source.downcast_ref::<KmsError>(),
            _ => None,
        }
    }

    pub(crate) fn crypto(context: &'static str) -> impl FnOnce(CryptoError) -> KmsError {
        move |source| KmsError::Crypto { context, source }
    }

    pub(crate) fn provider(context: &'static str) -> impl FnOnce(ProviderError) -> KmsError {
        move |source| KmsError::Provider { context, source }
    }
}
