//! Login Session & OTP Store
//! Mission: Track pending login sessions between password check and token exchange

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;

const DEFAULT_SESSION_TTL_MINUTES: i64 = 5;

/// A login session awaiting (or past) OTP verification.
#[derive(Debug, Clone)]
struct LoginSession {
    principal: String,
    otp: String,
    verified: bool,
    issued_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpError {
    UnknownSession,
    SessionExpired,
    InvalidOtp,
    NotVerified,
}

impl std::fmt::Display for OtpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OtpError::UnknownSession => write!(f, "Unknown login session"),
            OtpError::SessionExpired => write!(f, "Login session expired"),
            OtpError::InvalidOtp => write!(f, "Invalid OTP"),
            OtpError::NotVerified => write!(f, "Login session not verified"),
        }
    }
}

impl std::error::Error for OtpError {}

/// In-memory store of issued session credentials, keyed by the credential
/// string itself. The credential is opaque to its holder; this lookup table
/// is what makes it meaningful server-side, and removal on consumption is
/// what makes it single-use.
pub struct LoginSessionStore {
    sessions: RwLock<HashMap<String, LoginSession>>,
    ttl: Duration,
}

impl LoginSessionStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(DEFAULT_SESSION_TTL_MINUTES))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    /// Register a freshly minted session credential and issue its OTP.
    pub fn create(&self, session_id: &str, principal: &str) -> String {
        let otp = generate_otp();

        self.sessions.write().insert(
            session_id.to_string(),
            LoginSession {
                principal: principal.to_string(),
                otp: otp.clone(),
                verified: false,
                issued_at: Utc::now(),
            },
        );

        otp
    }

    /// Current OTP for a pending session.
    ///
    /// This is the seam for the out-of-band delivery channel; the HTTP
    /// layer never returns it to the client.
    pub fn pending_otp(&self, session_id: &str) -> Option<String> {
        self.sessions
            .read()
            .get(session_id)
            .map(|s| s.otp.clone())
    }

    /// Mark a session verified when the presented OTP matches.
    pub fn verify_otp(&self, session_id: &str, otp: &str) -> Result<(), OtpError> {
        let mut sessions = self.sessions.write();

        let session = sessions
            .get_mut(session_id)
            .ok_or(OtpError::UnknownSession)?;

        if Utc::now() - session.issued_at >= self.ttl {
            sessions.remove(session_id);
            return Err(OtpError::SessionExpired);
        }

        if session.otp != otp {
            return Err(OtpError::InvalidOtp);
        }

        session.verified = true;
        Ok(())
    }

    /// Exchange-side consumption: return the principal of a verified,
    /// unexpired session exactly once, removing it from the store.
    pub fn consume_verified(&self, session_id: &str) -> Result<String, OtpError> {
        let mut sessions = self.sessions.write();

        let session = sessions.get(session_id).ok_or(OtpError::UnknownSession)?;

        if Utc::now() - session.issued_at >= self.ttl {
            sessions.remove(session_id);
            return Err(OtpError::SessionExpired);
        }

        if !session.verified {
            return Err(OtpError::NotVerified);
        }

        sessions
            .remove(session_id)
            .map(|s| s.principal)
            .ok_or(OtpError::UnknownSession)
    }
}

impl Default for LoginSessionStore {
    fn default() -> Self {
        Self::new()
    }
}

fn generate_otp() -> String {
    format!("{:06}", rand::thread_rng().gen_range(0..1_000_000))
}
