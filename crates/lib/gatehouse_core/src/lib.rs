//! # gatehouse_core
//!
//! Identity, permission and credential logic for Gatehouse, including the
//! cross-device login-token protocol.

pub mod auth;
pub mod clock;
pub mod config;
pub mod login_tokens;
pub mod migrate;
pub mod models;
pub mod oauth;
pub mod permissions;
pub mod providers;
pub mod service;
pub mod store;
pub mod users;
pub mod validation;

pub use auth::AuthError;
pub use config::AuthConfig;
pub use service::{AuthService, LogoutScope};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_not_empty() {
        assert!(!version().is_empty());
    }
}
