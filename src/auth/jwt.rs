//! JWT Token Handler
//! Mission: Sign and verify access tokens pinned to HMAC-SHA256

use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde_json::json;
use std::env;
use tracing::debug;

use crate::auth::models::Claims;

const DEFAULT_TTL_MINUTES: i64 = 15;

/// Verification failure, classified.
///
/// Expiry is the one case callers may distinguish, so a client can refresh
/// instead of re-running the whole login flow. Everything else collapses
/// into `Invalid`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyError {
    Expired,
    Invalid,
}

impl std::fmt::Display for VerifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifyError::Expired => write!(f, "Token expired"),
            VerifyError::Invalid => write!(f, "Invalid token"),
        }
    }
}

impl std::error::Error for VerifyError {}

/// JWT handler for access token operations
pub struct JwtHandler {
    secret: String,
    ttl_minutes: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with the signing secret
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            ttl_minutes: DEFAULT_TTL_MINUTES,
        }
    }

    /// Build from `JWT_SECRET`, `None` when unset or empty.
    ///
    /// There is no fallback value.
    pub fn from_env() -> Option<Self> {
        let secret = env::var("JWT_SECRET").ok().filter(|s| !s.is_empty())?;

        let ttl_minutes = env::var("ACCESS_TOKEN_TTL_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_TTL_MINUTES);

        Some(Self {
            secret,
            ttl_minutes,
        })
    }

    /// Override the token lifetime (negative values produce already-expired
    /// tokens, which the tests use).
    pub fn with_ttl_minutes(mut self, minutes: i64) -> Self {
        self.ttl_minutes = minutes;
        self
    }

    /// Sign an access token for a principal, returning the token and its
    /// lifetime in seconds.
    pub fn generate_token(&self, principal: &str) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::minutes(self.ttl_minutes))
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let expires_in = (self.ttl_minutes * 60) as usize;

        let mut extra = serde_json::Map::new();
        extra.insert("iat".to_string(), json!(now.timestamp()));

        let claims = Claims {
            sub: principal.to_string(),
            exp: expiration,
            extra,
        };

        debug!(
            "Signing access token for {}, expires in {}m",
            principal, self.ttl_minutes
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign access token")?;

        Ok((token, expires_in))
    }

    /// Verify a token and extract its claims.
    ///
    /// The acceptable algorithm set is pinned to HS256; whatever algorithm
    /// the token's own header declares is ignored, closing the algorithm
    /// confusion hole.
    pub fn validate_token(&self, token: &str) -> Result<Claims, VerifyError> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => VerifyError::Expired,
            _ => VerifyError::Invalid,
        })?;

        Ok(decoded.claims)
    }
}
