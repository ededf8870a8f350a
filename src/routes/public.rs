use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /session  (Bearer <Auth0 token>)
        // DELETE /session
        // Login writes the session record; logout clears it and is safe to repeat.
        .route("/session", post(handlers::login).delete(handlers::logout))
        // GET /navigate?path=/productos/3
        // Evaluates the route guard. Without a session the decision is a redirect to login,
        // which is why this endpoint cannot sit behind the session layer.
        .route("/navigate", get(handlers::navigate))
        // GET /navigate/current
        .route("/navigate/current", get(handlers::current_navigation))
}
