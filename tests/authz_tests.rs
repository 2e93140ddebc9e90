//! Authorization tests: permission intersection, admin bypass, and the
//! grant/revoke flow through the credential store.

use anyhow::Result;

use custodia::identity::{authorize, LocalAuthProvider, Principal, SessionManager};
use custodia::security::CredentialStore;
use custodia::storage::MemoryStore;

fn provider() -> LocalAuthProvider {
    let store = MemoryStore::shared();
    LocalAuthProvider::new(
        CredentialStore::new(store.clone()),
        SessionManager::new(store),
    )
}

#[test]
fn read_permission_allows_read_but_not_write() {
    let p = Principal::with_permissions("alice", ["read"]);
    assert!(authorize(&p, &["read"]));
    assert!(!authorize(&p, &["write"]));
}

#[test]
fn any_overlap_authorizes() {
    let p = Principal::with_permissions("alice", ["read", "calculate"]);
    // Intersection policy: one shared permission is enough
    assert!(authorize(&p, &["write", "calculate"]));
    assert!(!authorize(&p, &["write", "delete"]));
}

#[test]
fn admin_bypasses_every_check() {
    let p = Principal::with_permissions("root", ["admin"]);
    assert!(authorize(&p, &["read"]));
    assert!(authorize(&p, &["write", "delete", "schema"]));
}

#[test]
fn registered_permissions_flow_through_authentication() -> Result<()> {
    let auth = provider();
    auth.credentials()
        .register_with_permissions("alice", "pw123", &["read"])?;

    let principal = auth.authenticate("alice", "pw123")?;
    assert!(authorize(&principal, &["read"]));
    assert!(!authorize(&principal, &["write"]));
    Ok(())
}

#[test]
fn grant_and_revoke_take_effect_on_next_authentication() -> Result<()> {
    let auth = provider();
    auth.credentials().register("alice", "pw123")?;

    let before = auth.authenticate("alice", "pw123")?;
    assert!(!authorize(&before, &["write"]));

    auth.credentials().grant("alice", "write")?;
    let granted = auth.authenticate("alice", "pw123")?;
    assert!(authorize(&granted, &["write"]));

    auth.credentials().revoke("alice", "write")?;
    // Revoking again is a no-op, not an error
    auth.credentials().revoke("alice", "write")?;
    let revoked = auth.authenticate("alice", "pw123")?;
    assert!(!authorize(&revoked, &["write"]));
    Ok(())
}

#[test]
fn grant_for_unknown_user_is_not_found() {
    let auth = provider();
    assert!(auth.credentials().grant("ghost", "read").is_err());
    assert!(auth.credentials().revoke("ghost", "read").is_err());
}
