//! Caller-input checks shared by registry operations.
//!
//! Nicknames have no length or charset rules beyond being non-empty; the
//! registry stores exactly what the caller passes (case-sensitive, untrimmed).

use crate::errors::RegistryError;

/// Accept any non-empty nickname.
pub fn validate_nick(nick: &str) -> Result<&str, RegistryError> {
    if nick.is_empty() {
        return Err(RegistryError::EmptyNickname);
    }
    Ok(nick)
}

/// Convert a signed points delta into the unsigned credit applied to a total.
pub fn validate_points_delta(points: i64) -> Result<u64, RegistryError> {
    u64::try_from(points).map_err(|_| RegistryError::NegativePoints)
}
