use rusqlite::{OptionalExtension, params};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, info};

use super::Database;
use crate::auth;
use crate::error::CoreError;

/// Password-field value meaning "keep the stored hash".
pub const UNCHANGED_PASSWORD: &str = "\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}\u{2022}";

/// The singleton connection record.
#[derive(Debug, Clone)]
pub struct ApiCredentials {
    pub key: String,
    pub secret: SecretString,
    pub host: String,
    pub port: u16,
    /// PHC-format argon2 hash. `None` disables the login gate.
    pub password_hash: Option<String>,
}

/// What to do with the login password on save.
#[derive(Debug, Clone)]
pub enum PasswordUpdate {
    /// Hash and store a new password.
    Set(SecretString),
    /// Remove the stored hash, disabling the login gate.
    Clear,
    /// Keep whatever hash is stored.
    Unchanged,
}

impl PasswordUpdate {
    /// Interpret a password form field: blank clears, the
    /// [`UNCHANGED_PASSWORD`] sentinel keeps, anything else sets.
    pub fn from_field(field: &str) -> Self {
        if field.is_empty() {
            Self::Clear
        } else if field == UNCHANGED_PASSWORD {
            Self::Unchanged
        } else {
            Self::Set(SecretString::from(field.to_owned()))
        }
    }
}

/// Persists the single [`ApiCredentials`] record.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    db: Database,
}

impl CredentialStore {
    pub(crate) fn new(db: Database) -> Self {
        Self { db }
    }

    /// The stored record, if any.
    pub fn get(&self) -> Result<Option<ApiCredentials>, CoreError> {
        let conn = self.db.lock()?;
        let row = conn
            .query_row(
                "SELECT api_key, api_secret, url, port, password_hash FROM api_info WHERE id = 1",
                [],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, i64>(3)?,
                        row.get::<_, Option<String>>(4)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(key, secret, host, port, password_hash)| {
            let port = u16::try_from(port)
                .map_err(|_| CoreError::Storage(format!("stored port {port} is out of range")))?;
            Ok(ApiCredentials {
                key,
                secret: SecretString::from(secret),
                host,
                port,
                password_hash: password_hash.filter(|h| !h.is_empty()),
            })
        })
        .transpose()
    }

    /// Whether first-run setup has happened.
    pub fn is_configured(&self) -> Result<bool, CoreError> {
        Ok(self.get()?.is_some())
    }

    /// Insert or update the record.
    ///
    /// Every field is validated before anything is written, so a rejected
    /// save leaves an existing record untouched.
    pub fn save(
        &self,
        key: &str,
        secret: &SecretString,
        host: &str,
        port: u16,
        password: &PasswordUpdate,
    ) -> Result<(), CoreError> {
        let key = key.trim();
        let host = host.trim();
        let secret = secret.expose_secret().trim();

        let missing: Vec<&str> = [("API key", key), ("API secret", secret), ("host", host)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(CoreError::validation(format!(
                "{} must not be empty",
                missing.join(", ")
            )));
        }
        if port == 0 {
            return Err(CoreError::validation("port must be between 1 and 65535"));
        }

        let new_hash = match password {
            PasswordUpdate::Set(plain) => Some(auth::hash_password(plain.expose_secret())?),
            PasswordUpdate::Clear | PasswordUpdate::Unchanged => None,
        };

        let conn = self.db.lock()?;
        match password {
            PasswordUpdate::Unchanged => conn.execute(
                "INSERT INTO api_info (id, api_key, api_secret, url, port)
                 VALUES (1, ?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET
                     api_key = excluded.api_key,
                     api_secret = excluded.api_secret,
                     url = excluded.url,
                     port = excluded.port",
                params![key, secret, host, port],
            )?,
            PasswordUpdate::Set(_) | PasswordUpdate::Clear => conn.execute(
                "INSERT INTO api_info (id, api_key, api_secret, url, port, password_hash)
                 VALUES (1, ?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                     api_key = excluded.api_key,
                     api_secret = excluded.api_secret,
                     url = excluded.url,
                     port = excluded.port,
                     password_hash = excluded.password_hash",
                params![key, secret, host, port, new_hash],
            )?,
        };

        info!(host, port, "saved firewall credentials");
        Ok(())
    }

    /// Replace only the password hash.
    pub(crate) fn set_password_hash(&self, hash: &str) -> Result<(), CoreError> {
        let conn = self.db.lock()?;
        let updated = conn.execute(
            "UPDATE api_info SET password_hash = ?1 WHERE id = 1",
            params![hash],
        )?;
        if updated == 0 {
            return Err(CoreError::NotConfigured);
        }
        debug!("updated login password");
        Ok(())
    }
}
