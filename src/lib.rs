use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod claims;
pub mod config;
pub mod directory;
pub mod error;
pub mod filters;
pub mod guard;
pub mod handlers;
pub mod menu;
pub mod models;
pub mod navigation;
pub mod rules;
pub mod session;

pub mod routes;
use auth::ActiveSession;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use directory::{DirectoryState, HttpBranchDirectory, MockBranchDirectory};
pub use guard::RouteGuard;
pub use navigation::NavigationTracker;
pub use session::{FileSessionStore, InMemorySessionStore, SessionState};

/// ApiDoc
///
/// OpenAPI document for the gate, served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::get_session, handlers::logout, handlers::acknowledge_block,
        handlers::navigate, handlers::current_navigation, handlers::get_menu,
        handlers::get_actions
    ),
    components(
        schemas(
            models::SessionSummary, models::GuardDecision, models::RedirectReason,
            models::BlockAction, models::NavigationResponse, models::LogoutResponse,
            models::MenuEntry,
        )
    ),
    tags(
        (name = "buen-sabor-gate", description = "El Buen Sabor dashboard access gate")
    )
)]
struct ApiDoc;

/// AppState
///
/// Everything a request may need, shared across all requests: the session store, the branch
/// directory, the guard built on both, the navigation ordering and the configuration.
#[derive(Clone)]
pub struct AppState {
    pub session: SessionState,
    pub directory: DirectoryState,
    pub guard: RouteGuard,
    pub navigation: Arc<NavigationTracker>,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(session: SessionState, directory: DirectoryState, config: AppConfig) -> Self {
        let guard = RouteGuard::new(session.clone(), directory.clone(), &config);
        Self {
            session,
            directory,
            guard,
            navigation: Arc::new(NavigationTracker::new()),
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.session.clone()
    }
}

impl FromRef<AppState> for DirectoryState {
    fn from_ref(app_state: &AppState) -> DirectoryState {
        app_state.directory.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// session_middleware
///
/// Lets a request through only when a session record is stored. `ActiveSession` rejects with
/// 401 before the handler runs otherwise.
async fn session_middleware(_session: ActiveSession, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routes, the session layer, request correlation, tracing and CORS.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                session_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Request span carrying method, URI and the `x-request-id` set above, so every log line of
/// a navigation can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
