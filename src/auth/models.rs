//! Authentication Models
//! Mission: Define the wire types and error taxonomy for the auth flow

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: String,
}

/// JWT claims payload.
///
/// `sub` and `exp` are the minimum the gate requires; anything else the
/// exchange step put into the token survives the round trip via `extra`
/// and is handed to downstream handlers untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (principal, e.g. email)
    pub exp: usize,  // expiration timestamp (unix seconds)
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response: the opaque session credential awaiting OTP verification
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    #[serde(rename = "loginSessionId")]
    pub login_session_id: String,
}

/// OTP verification request body
#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    #[serde(rename = "loginSessionId")]
    pub login_session_id: String,
    pub otp: String,
}

/// Token exchange response
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_in: usize, // seconds until expiration
}

/// Failures of the session-credential minter and its secret provider.
///
/// `Configuration` is raised by the secret provider and must reach the
/// caller unchanged; it is never substituted with a default secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Signing secret is missing, empty, or unusable.
    Configuration,
    /// Principal is empty or blank.
    InvalidPrincipal,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::Configuration => write!(f, "Server configuration error"),
            TokenError::InvalidPrincipal => write!(f, "Valid principal is required"),
        }
    }
}

impl std::error::Error for TokenError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_session_id_wire_name() {
        let response = LoginResponse {
            login_session_id: "abc123".to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"loginSessionId":"abc123"}"#);
    }

    #[test]
    fn test_claims_extra_round_trip() {
        let json = r#"{"sub":"u1","exp":1234567890,"role":"admin"}"#;
        let claims: Claims = serde_json::from_str(json).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.exp, 1234567890);
        assert_eq!(claims.extra["role"], "admin");

        let back = serde_json::to_value(&claims).unwrap();
        assert_eq!(back["role"], "admin");
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            email: "user@example.com".to_string(),
            password_hash: "hash".to_string(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hash"));
    }
}
