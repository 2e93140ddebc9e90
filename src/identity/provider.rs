use tracing::debug;

use crate::error::{AuthError, AuthResult};
use crate::security::{verify_password, CredentialStore};

use super::principal::{Attrs, Principal};
use super::session::{Session, SessionManager};

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub ip: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub session: Session,
    pub principal: Principal,
}

pub trait AuthProvider: Send + Sync {
    fn login(&self, req: &LoginRequest) -> AuthResult<LoginResponse>;
}

/// Authenticator over an injected credential store and session manager.
/// No ambient state: every handle arrives at construction.
pub struct LocalAuthProvider {
    creds: CredentialStore,
    sessions: SessionManager,
}

impl LocalAuthProvider {
    pub fn new(creds: CredentialStore, sessions: SessionManager) -> Self {
        Self { creds, sessions }
    }

    pub fn credentials(&self) -> &CredentialStore { &self.creds }

    pub fn sessions(&self) -> &SessionManager { &self.sessions }

    /// Verify a username/password pair against the credential store.
    /// Unknown users and wrong passwords fail identically, so the result
    /// never confirms whether a username exists.
    pub fn authenticate(&self, username: &str, password: &str) -> AuthResult<Principal> {
        let Some(rec) = self.creds.lookup(username)? else {
            return Err(AuthError::AuthFailure);
        };
        if !verify_password(&rec.password_hash, password) {
            return Err(AuthError::AuthFailure);
        }
        Ok(Principal {
            username: rec.username,
            permissions: rec.permissions,
            attrs: Attrs::default(),
        })
    }
}

impl AuthProvider for LocalAuthProvider {
    fn login(&self, req: &LoginRequest) -> AuthResult<LoginResponse> {
        let mut principal = self.authenticate(&req.username, &req.password)?;
        principal.attrs.ip = req.ip.clone();
        let session = self.sessions.open_session(&principal)?;
        debug!(target: "custodia::auth", "login user='{}'", req.username);
        Ok(LoginResponse { session, principal })
    }
}
