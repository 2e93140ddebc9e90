//! Runtime configuration for the authentication core.
//! Deserializable so a host process can embed it in its own config file, with
//! environment-variable overrides for standalone use.

use serde::Deserialize;

pub const DEFAULT_MAX_USERNAME_LEN: usize = 64;
pub const DEFAULT_MAX_PASSWORD_LEN: usize = 512;
pub const DEFAULT_SESSION_TTL_SECS: u64 = 3600;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Upper bound on accepted username length at registration.
    pub max_username_len: usize,
    /// Upper bound on accepted password length at registration.
    pub max_password_len: usize,
    /// Session lifetime in seconds; `None` means sessions never expire.
    pub session_ttl_secs: Option<u64>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            max_username_len: DEFAULT_MAX_USERNAME_LEN,
            max_password_len: DEFAULT_MAX_PASSWORD_LEN,
            session_ttl_secs: Some(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

impl AuthConfig {
    /// Defaults overridden by `CUSTODIA_*` environment variables.
    /// `CUSTODIA_SESSION_TTL_SECS=none` disables expiry entirely.
    pub fn from_env() -> Self {
        let mut cfg = Self::default();
        if let Ok(v) = std::env::var("CUSTODIA_MAX_USERNAME_LEN") {
            if let Ok(n) = v.parse() { cfg.max_username_len = n; }
        }
        if let Ok(v) = std::env::var("CUSTODIA_MAX_PASSWORD_LEN") {
            if let Ok(n) = v.parse() { cfg.max_password_len = n; }
        }
        if let Ok(v) = std::env::var("CUSTODIA_SESSION_TTL_SECS") {
            if v.eq_ignore_ascii_case("none") {
                cfg.session_ttl_secs = None;
            } else if let Ok(n) = v.parse() {
                cfg.session_ttl_secs = Some(n);
            }
        }
        cfg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cfg = AuthConfig::default();
        assert_eq!(cfg.max_username_len, DEFAULT_MAX_USERNAME_LEN);
        assert_eq!(cfg.max_password_len, DEFAULT_MAX_PASSWORD_LEN);
        assert_eq!(cfg.session_ttl_secs, Some(DEFAULT_SESSION_TTL_SECS));
    }

    #[test]
    fn deserializes_partial_config() {
        let cfg: AuthConfig = serde_json::from_str(r#"{"session_ttl_secs": 60}"#).unwrap();
        assert_eq!(cfg.session_ttl_secs, Some(60));
        assert_eq!(cfg.max_username_len, DEFAULT_MAX_USERNAME_LEN);
    }
}
