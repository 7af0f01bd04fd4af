//! Authentication API Endpoints
//! Mission: Drive the login → OTP → token-exchange flow

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{info, warn};

use crate::auth::{
    jwt::JwtHandler,
    middleware::extract_claims,
    models::{LoginRequest, LoginResponse, TokenError, TokenResponse, VerifyOtpRequest},
    otp::{LoginSessionStore, OtpError},
    session::mint_session_token,
    user_store::UserStore,
};

/// Shared auth state
#[derive(Clone)]
pub struct AuthState {
    pub users: Arc<UserStore>,
    pub sessions: Arc<LoginSessionStore>,

    // `None` when JWT_SECRET is unset; the exchange endpoint then fails
    // closed, mirroring the verification gate.
    pub jwt: Option<Arc<JwtHandler>>,
}

/// Login endpoint - POST /login
///
/// Password check, then a session credential is minted and an OTP issued
/// for the second factor.
pub async fn login(
    State(state): State<AuthState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthApiError> {
    info!("Login attempt: {}", payload.email);

    let valid = state
        .users
        .verify_password(&payload.email, &payload.password)
        .map_err(|_| AuthApiError::Internal)?;

    if !valid {
        warn!("Failed login attempt: {}", payload.email);
        return Err(AuthApiError::InvalidCredentials);
    }

    let session_id = mint_session_token(&payload.email)?;
    let otp = state.sessions.create(&session_id, &payload.email);

    // Stand-in for the out-of-band delivery channel. The OTP goes to the
    // server log only, never into the HTTP response.
    info!("[OTP] {} -> {}", payload.email, otp);

    Ok(Json(LoginResponse {
        login_session_id: session_id,
    }))
}

/// OTP verification endpoint - POST /auth/verify-otp
pub async fn verify_otp(
    State(state): State<AuthState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> Result<Json<Value>, AuthApiError> {
    state
        .sessions
        .verify_otp(&payload.login_session_id, &payload.otp)?;

    info!("OTP verified, login session upgraded");

    Ok(Json(json!({ "message": "OTP verified" })))
}

/// Token exchange endpoint - POST /auth/token
///
/// Presents the session credential as a bearer; a verified session is
/// consumed and traded for a signed access token.
pub async fn exchange_token(
    State(state): State<AuthState>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AuthApiError> {
    let jwt = state.jwt.as_deref().ok_or(AuthApiError::ServerConfig)?;

    let session_id = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|rest| rest.split(' ').next().unwrap_or(""))
        .filter(|t| !t.is_empty())
        .ok_or(AuthApiError::SessionRequired)?;

    let principal = state.sessions.consume_verified(session_id)?;

    let (access_token, expires_in) = jwt
        .generate_token(&principal)
        .map_err(|_| AuthApiError::Internal)?;

    info!("Access token issued for {}", principal);

    Ok(Json(TokenResponse {
        access_token,
        expires_in,
    }))
}

/// Protected resource - GET /protected (behind the verification gate)
pub async fn protected(req: Request) -> Result<Json<Value>, AuthApiError> {
    let claims = extract_claims(&req).ok_or(AuthApiError::Unauthorized)?;

    Ok(Json(json!({
        "message": "Access granted",
        "sub": claims.sub,
    })))
}

/// Health check - GET /health
pub async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// Auth API errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthApiError {
    InvalidCredentials,
    InvalidEmail,
    SessionRequired,
    InvalidSession,
    InvalidOtp,
    SessionNotVerified,
    Unauthorized,
    ServerConfig,
    Internal,
}

impl From<TokenError> for AuthApiError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Configuration => AuthApiError::ServerConfig,
            TokenError::InvalidPrincipal => AuthApiError::InvalidEmail,
        }
    }
}

impl From<OtpError> for AuthApiError {
    fn from(e: OtpError) -> Self {
        match e {
            OtpError::UnknownSession | OtpError::SessionExpired => AuthApiError::InvalidSession,
            OtpError::InvalidOtp => AuthApiError::InvalidOtp,
            OtpError::NotVerified => AuthApiError::SessionNotVerified,
        }
    }
}

impl IntoResponse for AuthApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthApiError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid email or password")
            }
            AuthApiError::InvalidEmail => (StatusCode::BAD_REQUEST, "Valid email is required"),
            AuthApiError::SessionRequired => (StatusCode::UNAUTHORIZED, "Login session required"),
            AuthApiError::InvalidSession => {
                (StatusCode::UNAUTHORIZED, "Invalid or expired login session")
            }
            AuthApiError::InvalidOtp => (StatusCode::UNAUTHORIZED, "Invalid OTP"),
            AuthApiError::SessionNotVerified => {
                (StatusCode::UNAUTHORIZED, "Login session not verified")
            }
            AuthApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthApiError::ServerConfig => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server configuration error")
            }
            AuthApiError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        };

        if status.is_server_error() {
            warn!(reason = message, "Auth request failed");
        }

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            AuthApiError::InvalidCredentials.into_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthApiError::InvalidEmail.into_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthApiError::ServerConfig.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_minter_errors_translate() {
        assert_eq!(
            AuthApiError::from(TokenError::Configuration),
            AuthApiError::ServerConfig
        );
        assert_eq!(
            AuthApiError::from(TokenError::InvalidPrincipal),
            AuthApiError::InvalidEmail
        );
    }

    #[test]
    fn test_otp_errors_translate() {
        assert_eq!(
            AuthApiError::from(OtpError::SessionExpired),
            AuthApiError::InvalidSession
        );
        assert_eq!(
            AuthApiError::from(OtpError::NotVerified),
            AuthApiError::SessionNotVerified
        );
    }
}
