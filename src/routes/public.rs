use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any
/// client: the health probe and the identity gateway (register/login). No
/// data endpoint lives here; everything role-scoped sits behind the
/// authentication layer.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // A simple, unauthenticated endpoint used for monitoring and load
        // balancer checks. Returns "ok" immediately to verify the service is
        // running and responsive.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/register
        // Creates an account, hashes the password and issues the first
        // bearer token. Duplicate emails are rejected with a conflict.
        .route("/auth/register", post(handlers::register))
        // POST /auth/login
        // Verifies credentials and issues a fresh bearer token.
        .route("/auth/login", post(handlers::login))
}
