// ── Login gate ──
//
// Optional local password in front of every remote operation. The hash is
// a PHC string (argon2id with a random salt) kept in the credential
// record; no hash means the gate is off.

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::store::CredentialStore;

/// Salt and hash `password` into a PHC string.
pub fn hash_password(password: &str) -> Result<String, CoreError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CoreError::Internal(format!("password hashing failed: {e}")))
}

/// Check `password` against a stored PHC hash.
///
/// The digest comparison is constant-time. An unparsable hash never
/// matches.
pub fn verify_password(password: &str, hash: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            warn!(error = %e, "stored password hash is malformed");
            false
        }
    }
}

/// Verifies the local password before remote access is granted.
#[derive(Debug, Clone)]
pub struct LoginGate {
    credentials: CredentialStore,
}

impl LoginGate {
    pub fn new(credentials: CredentialStore) -> Self {
        Self { credentials }
    }

    /// Whether a password hash is stored.
    pub fn is_enforced(&self) -> Result<bool, CoreError> {
        Ok(self
            .credentials
            .get()?
            .is_some_and(|c| c.password_hash.is_some()))
    }

    /// Check a password. Always `false` when no hash is stored, so callers
    /// check [`is_enforced`](Self::is_enforced) first.
    pub fn verify(&self, password: &SecretString) -> Result<bool, CoreError> {
        let hash = self.credentials.get()?.and_then(|c| c.password_hash);
        let ok = hash.is_some_and(|h| verify_password(password.expose_secret(), &h));
        debug!(ok, "login gate check");
        Ok(ok)
    }

    /// Set or replace the login password.
    ///
    /// When a gate is enforced `current` must match it. `new` must be
    /// non-empty and equal to `confirm`. Clearing the gate goes through
    /// [`CredentialStore::save`] with [`PasswordUpdate::Clear`].
    ///
    /// [`PasswordUpdate::Clear`]: crate::store::PasswordUpdate::Clear
    pub fn change_password(
        &self,
        current: Option<&SecretString>,
        new: &SecretString,
        confirm: &SecretString,
    ) -> Result<(), CoreError> {
        let record = self.credentials.get()?.ok_or(CoreError::NotConfigured)?;

        if let Some(ref hash) = record.password_hash {
            let matches =
                current.is_some_and(|pw| verify_password(pw.expose_secret(), hash));
            if !matches {
                return Err(CoreError::validation("current password is incorrect"));
            }
        }

        if new.expose_secret().is_empty() {
            return Err(CoreError::validation("new password must not be empty"));
        }
        if new.expose_secret() != confirm.expose_secret() {
            return Err(CoreError::validation("new passwords do not match"));
        }

        let hash = hash_password(new.expose_secret())?;
        self.credentials.set_password_hash(&hash)
    }
}
