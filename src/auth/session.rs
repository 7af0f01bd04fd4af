//! Session Credential Minter
//! Mission: Mint opaque HMAC session credentials for authenticated principals

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::auth::models::TokenError;
use crate::auth::secret;

type HmacSha256 = Hmac<Sha256>;

/// Mint an opaque session credential for `principal`.
///
/// The credential is the base64-encoded HMAC-SHA256 of
/// `principal:<unix millis>` under the application secret. The timestamp
/// decorrelates repeated mints for the same principal; it is not an
/// embedded expiry. The holder cannot verify the credential, only the
/// server side can, by looking it up in the session store.
///
/// Secret-provider failures propagate unchanged; there are no retries.
pub fn mint_session_token(principal: &str) -> Result<String, TokenError> {
    if principal.trim().is_empty() {
        return Err(TokenError::InvalidPrincipal);
    }

    let secret = secret::application_secret()?;

    sign(principal, &secret, Utc::now().timestamp_millis())
}

fn sign(principal: &str, secret: &str, issued_at_millis: i64) -> Result<String, TokenError> {
    let payload = format!("{principal}:{issued_at_millis}");

    // HMAC-SHA256 accepts keys of any length; a rejected key means the
    // provisioned secret is unusable.
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| TokenError::Configuration)?;
    mac.update(payload.as_bytes());

    Ok(BASE64.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_is_44_char_base64() {
        // SHA-256 digest is 32 bytes; padded base64 of that is 44 chars.
        let token = sign("user@example.com", "s3cr3t", 1_700_000_000_000).unwrap();
        assert_eq!(token.len(), 44);
        assert!(BASE64.decode(&token).is_ok());
    }

    #[test]
    fn test_timestamp_decorrelates_mints() {
        let first = sign("user@example.com", "s3cr3t", 1_700_000_000_000).unwrap();
        let second = sign("user@example.com", "s3cr3t", 1_700_000_000_001).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_same_inputs_are_deterministic() {
        let first = sign("user@example.com", "s3cr3t", 1_700_000_000_000).unwrap();
        let second = sign("user@example.com", "s3cr3t", 1_700_000_000_000).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_secret_changes_credential() {
        let first = sign("user@example.com", "s3cr3t", 1_700_000_000_000).unwrap();
        let second = sign("user@example.com", "other", 1_700_000_000_000).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_empty_principal_rejected() {
        assert_eq!(mint_session_token(""), Err(TokenError::InvalidPrincipal));
        assert_eq!(mint_session_token("   "), Err(TokenError::InvalidPrincipal));
    }

    #[test]
    fn test_mint_with_configured_secret() {
        std::env::set_var("APPLICATION_SECRET", "s3cr3t");
        let token = mint_session_token("user@example.com").unwrap();
        assert_eq!(token.len(), 44);
    }
}
