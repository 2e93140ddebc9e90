use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attrs {
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
}

/// Minimal authenticated principal: the username plus whatever permissions
/// were on record at authentication time.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Principal {
    pub username: String,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default)]
    pub attrs: Attrs,
}

impl Principal {
    pub fn named(username: impl Into<String>) -> Self {
        Self { username: username.into(), ..Default::default() }
    }

    pub fn with_permissions<I, S>(username: impl Into<String>, perms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            username: username.into(),
            permissions: perms.into_iter().map(Into::into).collect(),
            attrs: Attrs::default(),
        }
    }
}
