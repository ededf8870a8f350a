use std::{env, path::PathBuf, time::Duration};

/// AppConfig
///
/// Holds the gate's entire configuration state. Immutable once loaded and shared with every
/// request through `FromRef`, so the guard, the session endpoints and the directory client
/// all see the same role set, redirect targets and upstream API location.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls logging format and which secrets are mandatory.
    pub env: Env,
    // Base URL of the platform REST API (employee directory lives under it).
    pub api_base_url: String,
    // Auth0 audience. Doubles as the namespace of the roles claim (`{audience}/roles`).
    pub auth0_audience: String,
    // Auth0 tenant domain and client id, only needed to build the federated logout URL.
    pub auth0_domain: Option<String>,
    pub auth0_client_id: Option<String>,
    // HS256 secret used to validate login tokens when no RSA key is configured.
    pub jwt_secret: String,
    // RS256 public key (PEM). Takes precedence over the shared secret.
    pub jwt_public_key_pem: Option<String>,
    // Location of the durable session document.
    pub session_store_path: PathBuf,
    // The closed set of role names the dashboard knows about.
    pub roles: Vec<String>,
    // Role exempt from the branch-membership check.
    pub superadmin_role: String,
    // Redirect target for identities whose role is not allowed on a view.
    pub default_view: String,
    // Redirect target for navigations without a session.
    pub login_view: String,
    // Upper bound on the single branch lookup performed per navigation.
    pub lookup_timeout: Duration,
    pub bind_addr: String,
    // Accept `x-dev-email`/`x-dev-role` logins. Only honoured in `Env::Local`.
    pub dev_bypass: bool,
}

/// Env
///
/// Runtime context: local development (pretty logs, permissive fallbacks) or production
/// (JSON logs, every secret explicitly set).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const DEFAULT_ROLES: [&str; 4] = ["SUPERADMIN", "ADMIN", "EMPLEADO", "COCINERO"];
const LOCAL_JWT_SECRET: &str = "buen-sabor-local-development-secret";

impl Default for AppConfig {
    /// Safe, non-panicking configuration for test scaffolding.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: "http://localhost:8080".to_string(),
            auth0_audience: "https://buen-sabor-api".to_string(),
            auth0_domain: None,
            auth0_client_id: None,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            jwt_public_key_pem: None,
            session_store_path: PathBuf::from(".session/usuario.json"),
            roles: DEFAULT_ROLES.iter().map(|r| r.to_string()).collect(),
            superadmin_role: "SUPERADMIN".to_string(),
            default_view: "/dashboard/1".to_string(),
            login_view: "/login".to_string(),
            lookup_timeout: Duration::from_millis(5000),
            bind_addr: "0.0.0.0:3000".to_string(),
            dev_bypass: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads the configuration from environment variables, failing fast when a value that
    /// production cannot run without is missing.
    ///
    /// # Panics
    /// Panics in `production` when `API_BASE_URL` is unset, or when neither `AUTH_JWT_SECRET`
    /// nor `AUTH_RSA_PUBLIC_KEY` is provided.
    pub fn load() -> Self {
        let defaults = Self::default();

        let env = match env::var("APP_ENV").unwrap_or_else(|_| "local".to_string()).as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_public_key_pem = env::var("AUTH_RSA_PUBLIC_KEY").ok();

        let (api_base_url, jwt_secret) = match env {
            Env::Production => {
                let api = env::var("API_BASE_URL")
                    .expect("FATAL: API_BASE_URL must be set in production.");
                let secret = match env::var("AUTH_JWT_SECRET") {
                    Ok(secret) => secret,
                    Err(_) if jwt_public_key_pem.is_some() => String::new(),
                    Err(_) => panic!(
                        "FATAL: AUTH_JWT_SECRET or AUTH_RSA_PUBLIC_KEY must be set in production."
                    ),
                };
                (api, secret)
            }
            Env::Local => (
                env::var("API_BASE_URL").unwrap_or(defaults.api_base_url),
                env::var("AUTH_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            ),
        };

        let roles = env::var("APP_ROLES")
            .map(|raw| parse_role_list(&raw))
            .ok()
            .filter(|roles| !roles.is_empty())
            .unwrap_or(defaults.roles);

        let lookup_timeout = env::var("LOOKUP_TIMEOUT_MS")
            .ok()
            .and_then(|ms| ms.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.lookup_timeout);

        let dev_bypass = env == Env::Local
            && env::var("AUTH_DEV_BYPASS").is_ok_and(|v| matches!(v.as_str(), "1" | "true"));

        Self {
            env,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            auth0_audience: env::var("AUTH0_AUDIENCE").unwrap_or(defaults.auth0_audience),
            auth0_domain: env::var("AUTH0_DOMAIN").ok(),
            auth0_client_id: env::var("AUTH0_CLIENT_ID").ok(),
            jwt_secret,
            jwt_public_key_pem,
            session_store_path: env::var("SESSION_STORE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.session_store_path),
            roles,
            superadmin_role: env::var("SUPERADMIN_ROLE").unwrap_or(defaults.superadmin_role),
            default_view: env::var("DEFAULT_VIEW").unwrap_or(defaults.default_view),
            login_view: env::var("LOGIN_VIEW").unwrap_or(defaults.login_view),
            lookup_timeout,
            bind_addr: env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            dev_bypass,
        }
    }

    /// Auth0 federated logout URL, when the tenant is configured.
    pub fn logout_url(&self) -> Option<String> {
        match (&self.auth0_domain, &self.auth0_client_id) {
            (Some(domain), Some(client_id)) => Some(format!(
                "https://{}/v2/logout?client_id={}",
                domain.trim_end_matches('/'),
                client_id
            )),
            _ => None,
        }
    }
}

fn parse_role_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}
