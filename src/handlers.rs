use crate::{
    AppState,
    auth::{ActiveSession, LoginClaims},
    menu,
    models::{
        GuardDecision, LogoutResponse, MenuEntry, NavigationResponse, SessionRecord,
        SessionSummary,
    },
    rules,
};
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Deserialize;

// --- Query Structs ---

/// NavigateQuery
///
/// The dashboard path the user is trying to open (GET /navigate).
#[derive(Deserialize, utoipa::IntoParams)]
pub struct NavigateQuery {
    /// Dashboard path, e.g. `/productos/3`.
    pub path: String,
}

/// MenuQuery
#[derive(Deserialize, utoipa::IntoParams)]
pub struct MenuQuery {
    /// Branch the sidebar links should point at. Defaults to 1.
    pub sucursal_id: Option<i64>,
}

// --- Handlers ---

/// login
///
/// [Public Route] Verifies the Auth0 token and stores its claims as the session record,
/// replacing whatever session was there before.
#[utoipa::path(
    post,
    path = "/session",
    responses(
        (status = 200, description = "Session stored", body = SessionSummary),
        (status = 401, description = "Missing, invalid or expired token")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    LoginClaims(claims): LoginClaims,
) -> Result<Json<SessionSummary>, StatusCode> {
    let record = SessionRecord::from_claims(claims).map_err(|e| {
        tracing::error!("could not serialize login claims: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    state.session.write(&record).await.map_err(|e| {
        tracing::error!("could not persist session: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    state.navigation.reset().await;

    let summary = summarize(&state, &record);
    tracing::info!(email = ?summary.email, role = ?summary.role, "session started");
    Ok(Json(summary))
}

/// get_session
///
/// [Authenticated Route] Email and active role of the stored identity.
#[utoipa::path(
    get,
    path = "/session/me",
    responses(
        (status = 200, description = "Active session", body = SessionSummary),
        (status = 401, description = "No session")
    )
)]
pub async fn get_session(
    State(state): State<AppState>,
    ActiveSession(record): ActiveSession,
) -> Json<SessionSummary> {
    Json(summarize(&state, &record))
}

/// logout
///
/// [Public Route] Clears the session record. Idempotent.
#[utoipa::path(
    delete,
    path = "/session",
    responses((status = 200, description = "Logged out", body = LogoutResponse))
)]
pub async fn logout(State(state): State<AppState>) -> Result<Json<LogoutResponse>, StatusCode> {
    end_session(&state).await.map(Json)
}

/// acknowledge_block
///
/// [Authenticated Route] The dashboard confirmed the blocking error of the current
/// navigation. Acknowledgment always ends the session; there is no retry path.
///
/// Returns 409 when the current outcome is not a block.
#[utoipa::path(
    post,
    path = "/session/acknowledge",
    responses(
        (status = 200, description = "Session terminated", body = LogoutResponse),
        (status = 409, description = "Nothing to acknowledge")
    )
)]
pub async fn acknowledge_block(
    State(state): State<AppState>,
    _session: ActiveSession,
) -> Result<Json<LogoutResponse>, StatusCode> {
    let blocked = state
        .navigation
        .current()
        .await
        .is_some_and(|current| current.decision.is_block());
    if !blocked {
        return Err(StatusCode::CONFLICT);
    }

    tracing::info!("blocking error acknowledged, forcing logout");
    end_session(&state).await.map(Json)
}

/// navigate
///
/// [Public Route] Runs the route guard for one navigation and publishes its decision.
/// A navigation overtaken by a newer one before finishing answers 409 and does not
/// replace the newer outcome.
#[utoipa::path(
    get,
    path = "/navigate",
    params(NavigateQuery),
    responses(
        (status = 200, description = "Guard decision", body = NavigationResponse),
        (status = 409, description = "Superseded by a newer navigation")
    )
)]
pub async fn navigate(
    State(state): State<AppState>,
    Query(query): Query<NavigateQuery>,
) -> Result<Json<NavigationResponse>, StatusCode> {
    let ticket = state.navigation.begin();
    tracing::debug!(navigation_id = %ticket.id, generation = ticket.generation, path = %query.path, "navigation started");

    let decision: GuardDecision = state.guard.evaluate_path(&query.path).await;

    state
        .navigation
        .commit(ticket, &query.path, decision)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::info!("{}", e);
            StatusCode::CONFLICT
        })
}

/// current_navigation
///
/// [Public Route] The most recently committed navigation outcome.
#[utoipa::path(
    get,
    path = "/navigate/current",
    responses(
        (status = 200, description = "Current outcome", body = NavigationResponse),
        (status = 404, description = "No navigation committed yet")
    )
)]
pub async fn current_navigation(
    State(state): State<AppState>,
) -> Result<Json<NavigationResponse>, StatusCode> {
    state
        .navigation
        .current()
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// get_menu
///
/// [Authenticated Route] Sidebar entries for the active role. An identity without a
/// role gets an empty menu.
#[utoipa::path(
    get,
    path = "/menu",
    params(MenuQuery),
    responses(
        (status = 200, description = "Sidebar entries", body = [MenuEntry]),
        (status = 401, description = "No session")
    )
)]
pub async fn get_menu(
    State(state): State<AppState>,
    ActiveSession(record): ActiveSession,
    Query(query): Query<MenuQuery>,
) -> Json<Vec<MenuEntry>> {
    let entries = state
        .guard
        .claims()
        .active_role(&record.claims)
        .and_then(|role| {
            rules::table_role(&role, state.guard.superadmin_role())
                .map(|role| menu::menu_for_role(role, query.sucursal_id.unwrap_or(1)))
        })
        .unwrap_or_default();
    Json(entries)
}

/// get_actions
///
/// [Authenticated Route] Screen actions the active role may trigger, such as adding products.
#[utoipa::path(
    get,
    path = "/menu/actions",
    responses(
        (status = 200, description = "Permitted action keys", body = [String]),
        (status = 401, description = "No session")
    )
)]
pub async fn get_actions(
    State(state): State<AppState>,
    ActiveSession(record): ActiveSession,
) -> Json<Vec<String>> {
    let actions = state
        .guard
        .claims()
        .active_role(&record.claims)
        .and_then(|role| {
            rules::table_role(&role, state.guard.superadmin_role()).map(menu::actions_for_role)
        })
        .unwrap_or_default();
    Json(actions)
}

// --- Helpers ---

fn summarize(state: &AppState, record: &SessionRecord) -> SessionSummary {
    let claims = state.guard.claims();
    let roles = claims.roles(&record.claims);
    SessionSummary {
        email: claims.email(&record.claims),
        role: roles.first().cloned(),
        roles,
    }
}

async fn end_session(state: &AppState) -> Result<LogoutResponse, StatusCode> {
    state.session.clear().await.map_err(|e| {
        tracing::error!("could not clear session: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;
    state.navigation.reset().await;

    Ok(LogoutResponse {
        redirect: state.config.login_view.clone(),
        federated_logout_url: state.config.logout_url(),
    })
}
