use buen_sabor_gate::{
    AppState, FileSessionStore, HttpBranchDirectory,
    config::{AppConfig, Env},
    create_router,
    directory::DirectoryState,
    rules,
    session::SessionState,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, sets up logging, wires the session store and the branch directory
/// into the shared state and serves the gate.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging: RUST_LOG wins, otherwise sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "buen_sabor_gate=debug,tower_http=info".into());

    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Gate starting in {:?} mode", config.env);

    let unknown = rules::unknown_roles(&config.roles, &config.superadmin_role);
    if !unknown.is_empty() {
        tracing::warn!(?unknown, "route table references roles outside the configured role set");
    }

    // 3. Session store (durable, survives restarts)
    let session = Arc::new(FileSessionStore::new(config.session_store_path.clone())) as SessionState;
    tracing::info!(path = %config.session_store_path.display(), "session store ready");

    // 4. Branch directory (platform REST API)
    let directory = Arc::new(HttpBranchDirectory::new(
        &config.api_base_url,
        config.lookup_timeout,
    )) as DirectoryState;

    // 5. State, router, server
    let bind_addr = config.bind_addr.clone();
    let app = create_router(AppState::new(session, directory, config));

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: could not bind the HTTP listener. Check BIND_ADDR.");

    tracing::info!("Listening on {}", bind_addr);
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server terminated unexpectedly.");
}
