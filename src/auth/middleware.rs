//! Access Verification Gate
//! Mission: Protect API endpoints with pinned-algorithm JWT validation

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::sync::Arc;
use tracing::{error, warn};

use crate::auth::jwt::{JwtHandler, VerifyError};
use crate::auth::models::Claims;

/// Gate configuration shared across requests.
///
/// `handler` is `None` when `JWT_SECRET` was absent at startup; every
/// protected request then fails closed with a 500 before any request data
/// is inspected.
pub struct AccessGate {
    handler: Option<Arc<JwtHandler>>,
}

impl AccessGate {
    pub fn new(handler: Option<Arc<JwtHandler>>) -> Self {
        Self { handler }
    }

    pub fn from_env() -> Self {
        Self {
            handler: JwtHandler::from_env().map(Arc::new),
        }
    }
}

/// Middleware that admits or rejects requests bearing a JWT access token.
///
/// Terminal on the first matching condition, in order: unconfigured secret,
/// missing/mis-schemed header, empty token, invalid signature or structure,
/// expiry. On success the decoded claim set is attached to the request
/// extensions for downstream handlers.
pub async fn require_auth(
    State(gate): State<Arc<AccessGate>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AuthError> {
    // Configuration is checked before any request-derived data.
    let handler = gate.handler.as_ref().ok_or(AuthError::ServerConfig)?;

    let auth_header = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    // Scheme prefix is case-sensitive with a single trailing space.
    let rest = auth_header
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AuthError::TokenRequired)?;

    let token = rest.split(' ').next().unwrap_or("");
    if token.is_empty() {
        return Err(AuthError::TokenMissing);
    }

    let claims = handler.validate_token(token).map_err(|e| match e {
        VerifyError::Expired => AuthError::TokenExpired,
        VerifyError::Invalid => AuthError::InvalidToken,
    })?;

    // Make the claims available to handlers behind the gate.
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}

/// Extract claims from a request (use behind the gate)
pub fn extract_claims(req: &Request) -> Option<&Claims> {
    req.extensions().get::<Claims>()
}

/// Gate rejections.
///
/// The 401 messages are deliberately terse and, except for expiry, give no
/// hint of why verification failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    ServerConfig,
    TokenRequired,
    TokenMissing,
    InvalidToken,
    TokenExpired,
}

impl AuthError {
    fn status(&self) -> StatusCode {
        match self {
            AuthError::ServerConfig => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn message(&self) -> &'static str {
        match self {
            AuthError::ServerConfig => "Server configuration error",
            AuthError::TokenRequired => "Authorization token required",
            AuthError::TokenMissing => "Token missing",
            AuthError::InvalidToken => "Invalid token",
            AuthError::TokenExpired => "Token expired",
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        // Only the failure category is logged, never the token itself.
        if self == AuthError::ServerConfig {
            error!("JWT signing secret is not configured");
        } else {
            warn!(reason = self.message(), "Rejected protected request");
        }

        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    #[test]
    fn test_auth_error_statuses() {
        assert_eq!(
            AuthError::ServerConfig.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::TokenRequired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenMissing.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::InvalidToken.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::TokenExpired.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
    }

    #[test]
    fn test_expired_is_distinguishable_from_invalid() {
        assert_ne!(
            AuthError::TokenExpired.message(),
            AuthError::InvalidToken.message()
        );
    }

    #[test]
    fn test_extract_claims_from_request() {
        let mut req = HttpRequest::new(Body::empty());
        assert!(extract_claims(&req).is_none());

        let claims = Claims {
            sub: "user@example.com".to_string(),
            exp: 1234567890,
            extra: serde_json::Map::new(),
        };
        req.extensions_mut().insert(claims);

        let extracted = extract_claims(&req);
        assert_eq!(extracted.map(|c| c.sub.as_str()), Some("user@example.com"));
    }
}
