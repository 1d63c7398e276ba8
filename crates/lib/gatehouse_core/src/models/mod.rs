//! Domain models shared by the stores, the protocol and the HTTP layer.

pub mod auth;
pub mod login_token;
pub mod user;
