//! Unified error model for the authentication core.
//! Every failure surfaces as a typed result to the immediate caller; nothing
//! here terminates the process, retries internally, or prints.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    /// Malformed or empty username/password at registration.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Registration collision: the username is already taken. Password
    /// changes go through `CredentialStore::change_password`, never through
    /// re-registration.
    #[error("user already exists: {0}")]
    DuplicateUser(String),

    /// Generic authentication rejection. Carries no detail so callers cannot
    /// tell an unknown user apart from a wrong password.
    #[error("authentication failed")]
    AuthFailure,

    /// Operation referenced a missing user or session.
    #[error("not found: {0}")]
    NotFound(String),

    /// Underlying storage or system failure, always propagated.
    #[error("storage error: {0}")]
    Storage(#[from] anyhow::Error),
}

impl AuthError {
    /// Stable machine-readable code for callers that map errors onto a
    /// protocol surface.
    pub fn code_str(&self) -> &'static str {
        match self {
            AuthError::InvalidInput(_) => "invalid_input",
            AuthError::DuplicateUser(_) => "duplicate_user",
            AuthError::AuthFailure => "auth_failure",
            AuthError::NotFound(_) => "not_found",
            AuthError::Storage(_) => "storage_error",
        }
    }
}

pub type AuthResult<T> = Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_mapping() {
        assert_eq!(AuthError::InvalidInput("x".into()).code_str(), "invalid_input");
        assert_eq!(AuthError::DuplicateUser("u".into()).code_str(), "duplicate_user");
        assert_eq!(AuthError::AuthFailure.code_str(), "auth_failure");
        assert_eq!(AuthError::NotFound("s".into()).code_str(), "not_found");
        assert_eq!(AuthError::Storage(anyhow::anyhow!("io")).code_str(), "storage_error");
    }

    #[test]
    fn auth_failure_display_has_no_detail() {
        // The message must stay identical for unknown-user and bad-password
        // paths, so it may not embed any caller-supplied value.
        assert_eq!(AuthError::AuthFailure.to_string(), "authentication failed");
    }
}
