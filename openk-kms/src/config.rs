//! Key-derivation configuration.

use openk_crypto::kdf::DEFAULT_ITERATIONS;
use serde::{Deserialize, Serialize};

use crate::error::{KmsError, Result};
use crate::key_derivation::KeyDerivation;

/// Application-wide salt for the authentication key. Never user-controlled.
pub const AUTH_SALT: &str = "auth4openk";

/// PBKDF2 parameters used by [`MasterKey`](crate::MasterKey).
///
/// Missing fields fall back to the defaults when deserialized.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KdfConfig {
    pub iterations: u32,
    pub auth_salt: String,
}

impl Default for KdfConfig {
    fn default() -> Self {
        Self {
            iterations: DEFAULT_ITERATIONS,
            auth_salt: AUTH_SALT.to_string(),
        }
    }
}

impl KdfConfig {
    pub fn with_iterations(iterations: u32) -> Self {
        Self {
            iterations,
            ..Self::default()
        }
    }

    /// Parameters recorded for a user.
    pub fn from_derivation(kd: &KeyDerivation) -> Self {
        Self::with_iterations(kd.iterations)
    }

    pub fn validate(&self) -> Result<()> {
        if self.iterations == 0 {
            return Err(KmsError::Config("iterations must be positive"));
        }
        if self.auth_salt.is_empty() {
            return Err(KmsError::Config("auth salt cannot be empty"));
        }
        Ok(())
    }
}
