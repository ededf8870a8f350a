use buen_sabor_gate::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic, time::Duration};

// --- Setup/Teardown Utilities ---

const CONFIG_VARS: [&str; 9] = [
    "APP_ENV",
    "API_BASE_URL",
    "AUTH_JWT_SECRET",
    "AUTH_RSA_PUBLIC_KEY",
    "APP_ROLES",
    "LOOKUP_TIMEOUT_MS",
    "AUTH0_AUDIENCE",
    "SESSION_STORE_PATH",
    "AUTH_DEV_BYPASS",
];

/// Runs `test` with the given variables set (and every other config variable removed),
/// restoring the original environment afterwards.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn production_without_api_base_fails_fast() {
    let result = run_with_env(&[("APP_ENV", "production"), ("AUTH_JWT_SECRET", "s")], || {
        panic::catch_unwind(AppConfig::load)
    });

    assert!(result.is_err(), "production must require API_BASE_URL");
}

#[test]
#[serial]
fn production_without_any_token_key_fails_fast() {
    let result = run_with_env(
        &[("APP_ENV", "production"), ("API_BASE_URL", "https://api.buensabor.com")],
        || panic::catch_unwind(AppConfig::load),
    );

    assert!(result.is_err(), "production must require a token key");
}

#[test]
#[serial]
fn production_accepts_rsa_key_instead_of_secret() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://api.buensabor.com/"),
            ("AUTH_RSA_PUBLIC_KEY", "-----BEGIN PUBLIC KEY-----"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.api_base_url, "https://api.buensabor.com");
    assert!(config.jwt_public_key_pem.is_some());
}

#[test]
#[serial]
fn local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.api_base_url, "http://localhost:8080");
    assert_eq!(config.default_view, "/dashboard/1");
    assert_eq!(config.login_view, "/login");
    assert_eq!(config.superadmin_role, "SUPERADMIN");
    assert_eq!(config.roles, vec!["SUPERADMIN", "ADMIN", "EMPLEADO", "COCINERO"]);
    assert_eq!(config.lookup_timeout, Duration::from_millis(5000));
    assert!(!config.dev_bypass, "dev login bypass must be opt-in");
}

#[test]
#[serial]
fn dev_bypass_opt_in_is_ignored_in_production() {
    let local = run_with_env(&[("AUTH_DEV_BYPASS", "true")], AppConfig::load);
    assert!(local.dev_bypass);

    let production = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("API_BASE_URL", "https://api.buensabor.com"),
            ("AUTH_JWT_SECRET", "s"),
            ("AUTH_DEV_BYPASS", "true"),
        ],
        AppConfig::load,
    );
    assert!(!production.dev_bypass);
}

#[test]
#[serial]
fn role_set_and_timeout_are_configurable() {
    let config = run_with_env(
        &[
            ("APP_ROLES", "SUPERADMIN, ADMIN, CAJERO"),
            ("LOOKUP_TIMEOUT_MS", "750"),
            ("AUTH0_AUDIENCE", "https://api.elbuensabor.test"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.roles, vec!["SUPERADMIN", "ADMIN", "CAJERO"]);
    assert_eq!(config.lookup_timeout, Duration::from_millis(750));
    assert_eq!(config.auth0_audience, "https://api.elbuensabor.test");
}

#[test]
#[serial]
fn invalid_timeout_and_empty_roles_fall_back() {
    let config = run_with_env(
        &[("APP_ROLES", " , "), ("LOOKUP_TIMEOUT_MS", "soon")],
        AppConfig::load,
    );

    assert_eq!(config.roles.len(), 4);
    assert_eq!(config.lookup_timeout, Duration::from_millis(5000));
}
