//! Authgate - OTP-gated bearer-token service
//! Mission: Password login, OTP upgrade, JWT-protected resources

use anyhow::{Context, Result};
use dotenv::dotenv;
use std::net::SocketAddr;
use std::sync::Arc;
use std::{env, path::Path};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use authgate_backend::auth::{AccessGate, AuthState, JwtHandler, LoginSessionStore, UserStore};
use authgate_backend::server;

#[tokio::main]
async fn main() -> Result<()> {
    load_env();
    init_tracing();

    info!("Authgate starting");

    let db_path = env::var("AUTH_DB_PATH").unwrap_or_else(|_| "authgate_users.db".to_string());
    let users = Arc::new(UserStore::new(&db_path)?);
    info!("User store initialized at: {}", db_path);

    // Secrets are provisioned from the environment. The access-token secret
    // is independent from the session-minting APPLICATION_SECRET; a failure
    // against one is never masked by the other.
    let jwt = JwtHandler::from_env().map(Arc::new);
    if jwt.is_none() {
        warn!("JWT_SECRET is not set; token exchange and protected routes will refuse requests");
    }

    let gate = Arc::new(AccessGate::new(jwt.clone()));
    let sessions = Arc::new(LoginSessionStore::new());

    let state = AuthState {
        users,
        sessions,
        jwt,
    };

    let app = server::app(state, gate);

    let port = env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}

fn load_env() {
    // Standard dotenv search (cwd + parents), then the manifest directory
    // for runs started elsewhere with --manifest-path.
    let _ = dotenv();

    let manifest_env = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
    if manifest_env.exists() {
        let _ = dotenv::from_path(&manifest_env);
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "authgate_backend=debug,authgate=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
