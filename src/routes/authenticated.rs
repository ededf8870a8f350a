use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// Endpoints that only make sense with a stored session. The router above wraps this module
/// in the session middleware, so a request without a session never reaches a handler.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /session/me
        // Email and active role of the logged-in identity.
        .route("/session/me", get(handlers::get_session))
        // POST /session/acknowledge
        // The user confirmed the "no branch" error. Ends the session.
        .route("/session/acknowledge", post(handlers::acknowledge_block))
        // GET /menu?sucursal_id=3
        // Sidebar entries for the active role.
        .route("/menu", get(handlers::get_menu))
        // GET /menu/actions
        // Screen actions (e.g. "productos.agregar") the active role may trigger.
        .route("/menu/actions", get(handlers::get_actions))
}
