//! Pure authorization predicate over principal permission sets.

use super::principal::Principal;

/// Permission that authorizes every request.
pub const ADMIN_PERMISSION: &str = "admin";

/// A principal is authorized when it holds [`ADMIN_PERMISSION`] or when any
/// required permission appears in its granted set. An empty requirement
/// authorizes nothing for non-admin principals. No side effects: pure
/// function of its inputs.
pub fn authorize(principal: &Principal, required: &[&str]) -> bool {
    if principal.permissions.contains(ADMIN_PERMISSION) {
        return true;
    }
    required.iter().any(|p| principal.permissions.contains(*p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_policy() {
        let p = Principal::with_permissions("alice", ["read"]);
        assert!(authorize(&p, &["read"]));
        assert!(authorize(&p, &["read", "write"]));
        assert!(!authorize(&p, &["write"]));
        assert!(!authorize(&p, &[]));
    }

    #[test]
    fn admin_authorizes_everything() {
        let p = Principal::with_permissions("root", ["admin"]);
        assert!(authorize(&p, &["write"]));
        assert!(authorize(&p, &["anything-at-all"]));
        // Admin bypass even with an empty requirement
        assert!(authorize(&p, &[]));
    }

    #[test]
    fn no_permissions_denies() {
        let p = Principal::named("nobody");
        assert!(!authorize(&p, &["read"]));
    }
}
