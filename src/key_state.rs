//! Key lifecycle state machine.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CryptoError;

/// Key lifecycle state.
///
/// ```text
/// ACTIVE ↔ PENDING_ROTATION
///   ↕          │
/// INACTIVE ────┴──→ DESTROYED
/// ```
///
/// `Destroyed` is terminal and blocks every cryptographic use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum KeyState {
    /// Enabled and available for use.
    Active,
    /// Usable, but scheduled for replacement.
    PendingRotation,
    /// Disabled, can be re-enabled.
    Inactive,
    /// Permanently deactivated.
    Destroyed,
}

impl KeyState {
    pub const fn code(self) -> u8 {
        match self {
            KeyState::Active => 0,
            KeyState::PendingRotation => 1,
            KeyState::Inactive => 2,
            KeyState::Destroyed => 3,
        }
    }

    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(KeyState::Active),
            1 => Some(KeyState::PendingRotation),
            2 => Some(KeyState::Inactive),
            3 => Some(KeyState::Destroyed),
            _ => None,
        }
    }

    pub fn is_destroyed(&self) -> bool {
        matches!(self, KeyState::Destroyed)
    }

    /// Whether key material in this state may be used for cryptography.
    pub fn is_usable(&self) -> bool {
        matches!(self, KeyState::Active | KeyState::PendingRotation)
    }

    /// Valid transitions from this state.
    pub fn valid_transitions(&self) -> &[KeyState] {
        match self {
            KeyState::Active => &[
                KeyState::PendingRotation,
                KeyState::Inactive,
                KeyState::Destroyed,
            ],
            KeyState::PendingRotation => {
                &[KeyState::Active, KeyState::Inactive, KeyState::Destroyed]
            }
            KeyState::Inactive => &[KeyState::Active, KeyState::Destroyed],
            KeyState::Destroyed => &[],
        }
    }

    /// Check if transitioning to `target` is valid.
    pub fn can_transition_to(&self, target: KeyState) -> bool {
        self.valid_transitions().contains(&target)
    }
}

impl fmt::Display for KeyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyState::Active => write!(f, "Active"),
            KeyState::PendingRotation => write!(f, "PendingRotation"),
            KeyState::Inactive => write!(f, "Inactive"),
            KeyState::Destroyed => write!(f, "Destroyed"),
        }
    }
}

impl TryFrom<u8> for KeyState {
    type Error = CryptoError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Self::from_code(code).ok_or(CryptoError::UnknownKeyState(code))
    }
}

impl From<KeyState> for u8 {
    fn from(state: KeyState) -> u8 {
        state.code()
    }
}
