//! Registered users and credential checks.
//!
//! Identities are registration-time snapshots: immutable once created and
//! never destroyed within a process lifetime. The raw credential is hashed
//! on entry and never stored.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};

use crate::core_types::UserId;
use crate::error::CoreError;

/// Minimum username length accepted at registration.
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 4;

/// A registered user.
///
/// # Invariants (enforced by private fields):
/// - `user_id` and `username` never change after registration
/// - `password_hash` is a PHC-format argon2 string, never the raw credential
#[derive(Debug, Clone)]
pub struct Identity {
    user_id: UserId,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl Identity {
    /// Build an identity from already-validated input, hashing the credential.
    pub(crate) fn new(user_id: UserId, username: String, password: &str) -> Result<Self, CoreError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|_| CoreError::CredentialHash)?
            .to_string();

        Ok(Self {
            user_id,
            username,
            password_hash,
            created_at: Utc::now(),
        })
    }

    #[inline]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[inline]
    pub fn username(&self) -> &str {
        &self.username
    }

    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Check a login attempt against the stored hash.
    pub(crate) fn verify_password(&self, password: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }
}

/// Validate registration input before any state is touched.
pub(crate) fn validate_registration(username: &str, password: &str) -> Result<(), CoreError> {
    if username.trim().len() < MIN_USERNAME_LEN {
        return Err(CoreError::TooShort {
            field: "username",
            min: MIN_USERNAME_LEN,
        });
    }
    if password.len() < MIN_PASSWORD_LEN {
        return Err(CoreError::TooShort {
            field: "password",
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}
