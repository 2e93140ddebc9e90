//! Credential storage and password hashing.
//! ------------------------------------------
//! Exactly one salted Argon2 hash per username, persisted as a JSON record
//! under `cred/<username>` in the injected key-value store. Plaintext
//! passwords exist only as borrowed arguments; they are never stored and
//! never logged.

use std::collections::BTreeSet;

use anyhow::anyhow;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use password_hash::{PasswordHash, SaltString};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::storage::SharedStore;

const CRED_PREFIX: &str = "cred/";

/// Persisted credential row: the hash plus the user's granted permission set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CredentialRecord {
    pub username: String,
    /// Argon2 PHC string; embeds algorithm parameters and per-record salt.
    pub password_hash: String,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub(crate) fn hash_password(password: &str) -> anyhow::Result<String> {
    let mut salt_bytes = [0u8; 16];
    getrandom::getrandom(&mut salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| anyhow!(e.to_string()))?;
    let argon2 = Argon2::default();
    let phc = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow!(e.to_string()))?
        .to_string();
    Ok(phc)
}

/// Constant-time PHC verification; any parse failure counts as a mismatch.
pub(crate) fn verify_password(hash: &str, password: &str) -> bool {
    if let Ok(parsed) = PasswordHash::new(hash) {
        Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok()
    } else {
        false
    }
}

/// Mapping from username to salted password hash over a `SharedStore` handle.
///
/// Registration is strict: an already-taken username is a `DuplicateUser`
/// error, never a silent overwrite. Password changes are an explicit
/// operation so the two intents stay distinguishable at call sites.
pub struct CredentialStore {
    store: SharedStore,
    config: AuthConfig,
    // Serializes check-then-write sequences so concurrent registration of the
    // same username admits exactly one winner.
    write_lock: Mutex<()>,
}

impl CredentialStore {
    pub fn new(store: SharedStore) -> Self {
        Self::with_config(store, AuthConfig::default())
    }

    pub fn with_config(store: SharedStore, config: AuthConfig) -> Self {
        Self { store, config, write_lock: Mutex::new(()) }
    }

    fn key(username: &str) -> String {
        format!("{CRED_PREFIX}{username}")
    }

    fn validate_username(&self, username: &str) -> AuthResult<()> {
        // Surrounding whitespace is rejected outright rather than trimmed, so
        // " alice" can never shadow "alice" under a different key.
        if username.is_empty()
            || username.trim() != username
            || username.len() > self.config.max_username_len
            // '/' is reserved as the key namespace separator
            || username.contains(['\r', '\n', '\0', '/'])
        {
            return Err(AuthError::InvalidInput("malformed username".into()));
        }
        Ok(())
    }

    fn validate_password(&self, password: &str) -> AuthResult<()> {
        if password.is_empty() || password.len() > self.config.max_password_len {
            return Err(AuthError::InvalidInput("malformed password".into()));
        }
        Ok(())
    }

    fn get_record(&self, username: &str) -> AuthResult<Option<CredentialRecord>> {
        match self.store.get(&Self::key(username))? {
            Some(raw) => {
                let rec = serde_json::from_slice(&raw)
                    .map_err(|e| AuthError::Storage(e.into()))?;
                Ok(Some(rec))
            }
            None => Ok(None),
        }
    }

    fn put_record(&self, rec: &CredentialRecord) -> AuthResult<()> {
        let body = serde_json::to_vec(rec).map_err(|e| AuthError::Storage(e.into()))?;
        self.store.put(&Self::key(&rec.username), &body)?;
        Ok(())
    }

    /// Register a new user with no permissions.
    pub fn register(&self, username: &str, password: &str) -> AuthResult<()> {
        self.register_with_permissions(username, password, &[])
    }

    /// Register a new user carrying an initial permission set.
    pub fn register_with_permissions(
        &self,
        username: &str,
        password: &str,
        permissions: &[&str],
    ) -> AuthResult<()> {
        self.validate_username(username)?;
        self.validate_password(password)?;
        // Hash outside the lock: Argon2 is deliberately slow.
        let hash = hash_password(password)?;
        let _guard = self.write_lock.lock();
        if self.store.get(&Self::key(username))?.is_some() {
            return Err(AuthError::DuplicateUser(username.to_string()));
        }
        let now = Utc::now();
        let rec = CredentialRecord {
            username: username.to_string(),
            password_hash: hash,
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: now,
            updated_at: now,
        };
        self.put_record(&rec)?;
        debug!(target: "custodia::security", "registered user '{}'", username);
        Ok(())
    }

    /// Unknown usernames are a no-match, not an error.
    pub fn lookup(&self, username: &str) -> AuthResult<Option<CredentialRecord>> {
        self.get_record(username)
    }

    pub fn delete(&self, username: &str) -> AuthResult<()> {
        let _guard = self.write_lock.lock();
        if self.store.delete(&Self::key(username))? {
            debug!(target: "custodia::security", "deleted user '{}'", username);
            Ok(())
        } else {
            Err(AuthError::NotFound(format!("user '{}'", username)))
        }
    }

    /// Explicit password change; the only way to replace a stored hash.
    pub fn change_password(&self, username: &str, new_password: &str) -> AuthResult<()> {
        self.validate_password(new_password)?;
        let hash = hash_password(new_password)?;
        let _guard = self.write_lock.lock();
        let mut rec = self
            .get_record(username)?
            .ok_or_else(|| AuthError::NotFound(format!("user '{}'", username)))?;
        rec.password_hash = hash;
        rec.updated_at = Utc::now();
        self.put_record(&rec)?;
        debug!(target: "custodia::security", "password changed for '{}'", username);
        Ok(())
    }

    /// Add a permission to the user's granted set.
    pub fn grant(&self, username: &str, permission: &str) -> AuthResult<()> {
        let _guard = self.write_lock.lock();
        let mut rec = self
            .get_record(username)?
            .ok_or_else(|| AuthError::NotFound(format!("user '{}'", username)))?;
        if rec.permissions.insert(permission.to_string()) {
            rec.updated_at = Utc::now();
            self.put_record(&rec)?;
        }
        Ok(())
    }

    /// Remove a permission from the user's granted set; removing one the user
    /// never held is a no-op.
    pub fn revoke(&self, username: &str, permission: &str) -> AuthResult<()> {
        let _guard = self.write_lock.lock();
        let mut rec = self
            .get_record(username)?
            .ok_or_else(|| AuthError::NotFound(format!("user '{}'", username)))?;
        if rec.permissions.remove(permission) {
            rec.updated_at = Utc::now();
            self.put_record(&rec)?;
        }
        Ok(())
    }

    /// Verify a password against the stored hash. Unknown user and wrong
    /// password both come back as a plain `false`.
    pub fn verify(&self, username: &str, password: &str) -> AuthResult<bool> {
        match self.get_record(username)? {
            Some(rec) => Ok(verify_password(&rec.password_hash, password)),
            None => Ok(false),
        }
    }
}
