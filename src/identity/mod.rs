//! Central identity handling: authentication, authorization and sessions.
//! Keep the public surface thin and split implementation across sub-modules.

mod authorizer;
mod principal;
mod provider;
mod session;

pub use authorizer::{authorize, ADMIN_PERMISSION};
pub use principal::{Attrs, Principal};
pub use provider::{AuthProvider, LocalAuthProvider, LoginRequest, LoginResponse};
pub use session::{Session, SessionManager, SessionToken};
