//! Application Secret Provider
//! Mission: Load the session-signing secret exactly once, fail closed

use parking_lot::Mutex;
use std::env;
use tracing::error;

use crate::auth::models::TokenError;

/// Process-wide cache for a secret sourced from one environment variable.
///
/// The environment read happens under the lock, so concurrent first callers
/// cannot race to two different cached values: one reader wins and everyone
/// observes that value for the rest of the process lifetime. A failed read
/// caches nothing, so a later call retries the environment.
pub struct SecretCache {
    var: &'static str,
    cached: Mutex<Option<String>>,
}

impl SecretCache {
    pub const fn new(var: &'static str) -> Self {
        Self {
            var,
            cached: Mutex::new(None),
        }
    }

    /// Cached value if already loaded, otherwise one environment read.
    ///
    /// Absent or empty values are a configuration error. There is no
    /// default secret.
    pub fn get(&self) -> Result<String, TokenError> {
        let mut cached = self.cached.lock();
        if let Some(secret) = cached.as_ref() {
            return Ok(secret.clone());
        }

        match env::var(self.var) {
            Ok(value) if !value.is_empty() => {
                *cached = Some(value.clone());
                Ok(value)
            }
            _ => {
                error!("{} is not defined", self.var);
                Err(TokenError::Configuration)
            }
        }
    }
}

static APPLICATION_SECRET: SecretCache = SecretCache::new("APPLICATION_SECRET");

/// The secret used to mint session credentials.
pub fn application_secret() -> Result<String, TokenError> {
    APPLICATION_SECRET.get()
}
