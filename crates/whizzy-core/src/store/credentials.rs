//! Email/password checks and salted password digests.

use rand::RngCore;

use crate::error::{Field, Result, WhizzyError};

/// Shortest password the auth service accepts.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Canonical form used for account lookups.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Local checks run before any sign-in or sign-up call.
///
/// # Errors
///
/// Returns [`WhizzyError::MissingFields`] for empty inputs or
/// [`WhizzyError::InvalidEmail`] when the address has no `@`.
pub fn check_login_input(email: &str, password: &str) -> Result<()> {
    let mut missing = Vec::new();
    if email.trim().is_empty() {
        missing.push(Field::Email);
    }
    if password.is_empty() {
        missing.push(Field::Password);
    }
    if !missing.is_empty() {
        return Err(WhizzyError::MissingFields(missing));
    }
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(()),
        _ => Err(WhizzyError::InvalidEmail(email.to_string())),
    }
}

/// Sign-up checks: everything [`check_login_input`] does plus the minimum
/// password length.
///
/// # Errors
///
/// Returns [`WhizzyError::WeakPassword`] for passwords shorter than
/// [`MIN_PASSWORD_LEN`] characters.
pub fn check_signup_input(email: &str, password: &str) -> Result<()> {
    check_login_input(email, password)?;
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(WhizzyError::WeakPassword {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// BLAKE3 digest of a password under a random per-account salt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordDigest {
    pub salt: String,
    pub hash: String,
}

impl PasswordDigest {
    /// Digest `password` under a fresh random salt.
    #[must_use]
    pub fn derive(password: &str) -> Self {
        let mut bytes = [0_u8; 16];
        rand::thread_rng().fill_bytes(&mut bytes);
        let salt: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        let hash = digest(&salt, password).to_hex().to_string();
        Self { salt, hash }
    }

    /// Constant-time comparison against a candidate password.
    #[must_use]
    pub fn verify(&self, password: &str) -> bool {
        blake3::Hash::from_hex(&self.hash)
            .is_ok_and(|stored| stored == digest(&self.salt, password))
    }
}

fn digest(salt: &str, password: &str) -> blake3::Hash {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"\0");
    hasher.update(password.as_bytes());
    hasher.finalize()
}
