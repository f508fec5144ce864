//! Per-user key-derivation parameters as exchanged with storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{KmsError, Result};

/// Lowest PBKDF2 iteration count a stored record may carry.
pub const MIN_ITERATIONS: u32 = 100_000;

/// Longest accepted username, in bytes.
pub const MAX_USERNAME_BYTES: usize = 255;

/// Parameters before storage assigns an ID.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitialKeyDerivation {
    pub username: String,
    pub iterations: u32,
}

/// Parameters as stored in the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyDerivation {
    pub id: String,
    pub username: String,
    pub iterations: u32,
    pub created_at: DateTime<Utc>,
}

impl KeyDerivation {
    pub fn new_initial(username: impl Into<String>, iterations: u32) -> Result<InitialKeyDerivation> {
        let username = username.into();
        validate_username(&username)?;
        validate_iterations(iterations)?;
        Ok(InitialKeyDerivation {
            username,
            iterations,
        })
    }

    /// Build the stored form, stamping the creation time.
    pub fn from_initial(id: impl Into<String>, initial: InitialKeyDerivation) -> Self {
        Self {
            id: id.into(),
            username: initial.username,
            iterations: initial.iterations,
            created_at: Utc::now(),
        }
    }

    /// Re-check a record loaded from storage.
    pub fn validate(&self) -> Result<()> {
        validate_username(&self.username)?;
        validate_iterations(self.iterations)
    }
}

/// Non-empty, at most [`MAX_USERNAME_BYTES`], printable ASCII only.
pub fn validate_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(KmsError::UsernameEmpty);
    }
    if username.len() > MAX_USERNAME_BYTES {
        return Err(KmsError::UsernameLength {
            max: MAX_USERNAME_BYTES,
            actual: username.len(),
        });
    }
    if !username.bytes().all(|b| (0x20..=0x7E).contains(&b)) {
        return Err(KmsError::UsernameInvalid);
    }
    Ok(())
}

fn validate_iterations(iterations: u32) -> Result<()> {
    if iterations < MIN_ITERATIONS {
        return Err(KmsError::IterationsInvalid {
            min: MIN_ITERATIONS,
            actual: iterations,
        });
    }
    Ok(())
}
