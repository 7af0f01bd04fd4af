//! Router assembly.
//!
//! Public routes carry the login flow; `/protected` sits behind the access
//! verification gate. The same composed app is served by the binary and
//! driven in-process by the integration tests.

use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::auth::{api, middleware::require_auth, AccessGate, AuthState};
use crate::middleware::request_logging;

pub fn app(state: AuthState, gate: Arc<AccessGate>) -> Router {
    let public_routes = Router::new().route("/health", get(api::health_check));

    let auth_routes = Router::new()
        .route("/login", post(api::login))
        .route("/auth/verify-otp", post(api::verify_otp))
        .route("/auth/token", post(api::exchange_token))
        .with_state(state);

    let protected_routes = Router::new()
        .route("/protected", get(api::protected))
        .route_layer(from_fn_with_state(gate, require_auth));

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(protected_routes)
        .layer(from_fn(request_logging))
        .layer(CorsLayer::permissive())
}
