//! Middleware for observability.
//!
//! Request logging with latency tracking. Authentication middleware lives
//! in `auth::middleware`, next to the token machinery it depends on.

pub mod logging;

pub use logging::request_logging;
