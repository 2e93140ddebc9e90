//! Session issue, validation and logout over the shared key-value registry.
//! A session is Active from `open_session` until `logout` (or expiry); the
//! terminated state is final and ids are never reused.

use base64::Engine;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::config::AuthConfig;
use crate::error::{AuthError, AuthResult};
use crate::storage::SharedStore;
use crate::tprintln;

use super::principal::Principal;

pub type SessionToken = String;

const SESS_PREFIX: &str = "sess/";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Session {
    pub session_id: SessionToken,
    pub username: String,
    pub issued_at: DateTime<Utc>,
    /// `None` for non-expiring registries.
    pub expires_at: Option<DateTime<Utc>>,
}

fn gen_id() -> anyhow::Result<String> {
    // 256-bit random token, base64url without padding
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf))
}

// Session ids are bearer secrets: only a short prefix ever reaches logs.
fn sid_prefix(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Registry of currently valid session identifiers, keyed `sess/<id>` in the
/// injected store. Expired entries are pruned lazily on read.
pub struct SessionManager {
    store: SharedStore,
    ttl: Option<Duration>,
}

impl SessionManager {
    pub fn new(store: SharedStore) -> Self {
        Self::with_config(store, &AuthConfig::default())
    }

    pub fn with_config(store: SharedStore, config: &AuthConfig) -> Self {
        // TTLs beyond the representable range degrade to no expiry.
        let ttl = config
            .session_ttl_secs
            .and_then(|secs| Duration::try_seconds(i64::try_from(secs).unwrap_or(i64::MAX)));
        Self { store, ttl }
    }

    fn key(id: &str) -> String {
        format!("{SESS_PREFIX}{id}")
    }

    /// Issue a fresh session for an authenticated principal.
    pub fn open_session(&self, principal: &Principal) -> AuthResult<Session> {
        let now = Utc::now();
        let sid = gen_id()?;
        let sess = Session {
            session_id: sid.clone(),
            username: principal.username.clone(),
            issued_at: now,
            expires_at: self.ttl.and_then(|ttl| now.checked_add_signed(ttl)),
        };
        let body = serde_json::to_vec(&sess).map_err(|e| AuthError::Storage(e.into()))?;
        self.store.put(&Self::key(&sid), &body)?;
        tprintln!("session.open user={} sid={}..", principal.username, sid_prefix(&sid));
        Ok(sess)
    }

    /// Return the live session record, pruning it if expired.
    pub fn validate(&self, session_id: &str) -> AuthResult<Option<Session>> {
        let Some(raw) = self.store.get(&Self::key(session_id))? else {
            return Ok(None);
        };
        let sess: Session =
            serde_json::from_slice(&raw).map_err(|e| AuthError::Storage(e.into()))?;
        if let Some(exp) = sess.expires_at {
            if exp <= Utc::now() {
                self.store.delete(&Self::key(session_id))?;
                return Ok(None);
            }
        }
        Ok(Some(sess))
    }

    pub fn is_active(&self, session_id: &str) -> AuthResult<bool> {
        Ok(self.validate(session_id)?.is_some())
    }

    /// Terminate a session. An unknown or already-terminated id comes back as
    /// `NotFound`; callers that want idempotent logout treat that as a no-op.
    pub fn logout(&self, session_id: &str) -> AuthResult<()> {
        if self.store.delete(&Self::key(session_id))? {
            tprintln!("session.logout sid={}..", sid_prefix(session_id));
            Ok(())
        } else {
            Err(AuthError::NotFound(format!("session '{}..'", sid_prefix(session_id))))
        }
    }
}
