use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;
use crate::types::{ParentToken, PinVerification};

/// Parent PIN hashing and verification using Argon2id.
pub struct PinManager;

impl PinManager {
    /// Hash a PIN with a fresh random salt.
    pub fn hash_pin(pin: &SecretString) -> crate::Result<String> {
        let pin_bytes = pin.expose_secret().as_bytes();
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(pin_bytes, &salt)
            .map_err(|e| Error::PinHash(e.to_string()))?
            .to_string();
        Ok(hash)
    }

    /// Verify an entered PIN against a stored hash.
    ///
    /// A mismatched PIN returns `Ok(false)`; only a malformed hash or an
    /// internal hashing failure is an error.
    pub fn verify_pin(pin: &SecretString, hash: &str) -> crate::Result<bool> {
        let pin_bytes = pin.expose_secret().as_bytes();
        let parsed_hash = PasswordHash::new(hash).map_err(|e| Error::PinHash(e.to_string()))?;

        match Argon2::default().verify_password(pin_bytes, &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::PinHash(e.to_string())),
        }
    }
}

/// Check an entered PIN against the stored hash, if any.
///
/// This is the only place a `ParentToken` is minted, so every override path
/// is forced through a successful verification.
pub fn check_pin(pin: &SecretString, stored_hash: Option<&str>) -> crate::Result<PinVerification> {
    let Some(hash) = stored_hash else {
        return Ok(PinVerification::NotSet);
    };

    if PinManager::verify_pin(pin, hash)? {
        Ok(PinVerification::Success(ParentToken { _priv: () }))
    } else {
        Ok(PinVerification::Failure)
    }
}
