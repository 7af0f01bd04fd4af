//! Authentication Module
//! Mission: Two-stage login (password + OTP) feeding a JWT-protected API

pub mod api;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod otp;
pub mod secret;
pub mod session;
pub mod user_store;

pub use api::AuthState;
pub use jwt::JwtHandler;
pub use middleware::{require_auth, AccessGate};
pub use otp::LoginSessionStore;
pub use user_store::UserStore;
