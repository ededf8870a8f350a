use buen_sabor_gate::{
    InMemorySessionStore, MockBranchDirectory, RouteGuard,
    config::AppConfig,
    models::{BlockAction, GuardDecision, RedirectReason, SessionRecord},
    rules,
    session::SessionStore,
};
use serde_json::json;
use std::sync::Arc;

// --- Helpers ---

const ROLES_CLAIM: &str = "https://buen-sabor-api/roles";

fn record(role: &str) -> SessionRecord {
    let claims = json!({
        "email": "usuario@buensabor.com",
        "name": "Usuario de prueba",
        ROLES_CLAIM: [role],
    });
    SessionRecord::from_claims(claims.as_object().cloned().unwrap()).unwrap()
}

struct Fixture {
    guard: RouteGuard,
    store: Arc<InMemorySessionStore>,
    directory: Arc<MockBranchDirectory>,
}

fn fixture(session: Option<SessionRecord>, directory: MockBranchDirectory) -> Fixture {
    let store = Arc::new(match session {
        Some(record) => InMemorySessionStore::with_record(record),
        None => InMemorySessionStore::new(),
    });
    let directory = Arc::new(directory);
    let guard = RouteGuard::new(store.clone(), directory.clone(), &AppConfig::default());
    Fixture { guard, store, directory }
}

fn every_lookup_outcome() -> Vec<MockBranchDirectory> {
    vec![
        MockBranchDirectory::with_branch(7),
        MockBranchDirectory::without_branch(),
        MockBranchDirectory::new_failing(),
        MockBranchDirectory::with_status(404),
        MockBranchDirectory::with_status(500),
    ]
}

fn is_login_redirect(decision: &GuardDecision) -> bool {
    matches!(
        decision,
        GuardDecision::Redirect { to, reason: RedirectReason::NoSession } if to == "/login"
    )
}

fn is_default_redirect(decision: &GuardDecision) -> bool {
    matches!(
        decision,
        GuardDecision::Redirect { to, reason: RedirectReason::RoleNotPermitted } if to == "/dashboard/1"
    )
}

// --- Scenarios ---

#[tokio::test]
async fn scenario_a_employee_with_branch_renders_view() {
    let f = fixture(Some(record("EMPLEADO")), MockBranchDirectory::with_branch(7));

    let decision = f.guard.evaluate("categorias", Some(&["ADMIN", "EMPLEADO"])).await;

    assert_eq!(
        decision,
        GuardDecision::Render {
            view: "categorias".to_string()
        }
    );
    assert_eq!(f.directory.calls(), 1);
}

#[tokio::test]
async fn scenario_b_employee_with_failed_lookup_is_blocked_until_logout() {
    let f = fixture(Some(record("EMPLEADO")), MockBranchDirectory::new_failing());

    let decision = f.guard.evaluate("inicio", None).await;

    match decision {
        GuardDecision::Block {
            title,
            message,
            on_acknowledge,
        } => {
            assert_eq!(title, "Error");
            assert!(message.contains("sucursal"));
            assert_eq!(on_acknowledge, BlockAction::Logout);
        }
        other => panic!("expected a block, got {:?}", other),
    }
}

#[tokio::test]
async fn scenario_c_no_session_redirects_to_login() {
    let f = fixture(None, MockBranchDirectory::with_branch(1));

    let decision = f.guard.evaluate("productos", Some(&["ADMIN"])).await;

    assert!(is_login_redirect(&decision));
}

#[tokio::test]
async fn scenario_d_cocinero_on_admin_route_goes_to_default_view() {
    let f = fixture(Some(record("COCINERO")), MockBranchDirectory::with_branch(1));

    let decision = f.guard.evaluate("empresa", Some(&["ADMIN", "SUPERADMIN"])).await;

    assert!(is_default_redirect(&decision));
}

#[tokio::test]
async fn scenario_e_superadmin_renders_despite_failed_lookup() {
    let f = fixture(Some(record("SUPERADMIN")), MockBranchDirectory::new_failing());

    let decision = f.guard.evaluate("empresa", Some(&["ADMIN", "SUPERADMIN"])).await;

    assert!(decision.is_render());
}

// --- Properties ---

#[tokio::test]
async fn no_session_never_triggers_a_lookup() {
    for path in ["/empresa", "/productos/2", "/empleados/9", "/dashboard/1"] {
        let f = fixture(None, MockBranchDirectory::with_branch(1));
        let decision = f.guard.evaluate_path(path).await;

        assert!(is_login_redirect(&decision), "{} should go to login", path);
        assert_eq!(f.directory.calls(), 0, "{} performed a lookup", path);
    }
}

#[tokio::test]
async fn superadmin_is_never_blocked_on_branch() {
    for directory in every_lookup_outcome() {
        let f = fixture(Some(record("SUPERADMIN")), directory);
        for rule in rules::ROUTES {
            let decision = f.guard.evaluate_rule(rule).await;
            assert!(!decision.is_block(), "superadmin blocked on {}", rule.view);
        }
    }
}

#[tokio::test]
async fn role_redirect_does_not_depend_on_lookup_outcome() {
    for directory in every_lookup_outcome() {
        let f = fixture(Some(record("COCINERO")), directory);
        let rule = rules::rule_for_view("empleados").unwrap();

        assert!(is_default_redirect(&f.guard.evaluate_rule(rule).await));
    }
}

#[tokio::test]
async fn unspecified_roles_admit_any_identity_with_a_branch() {
    for role in ["ADMIN", "EMPLEADO", "COCINERO", "SUPERADMIN", "ROL_NUEVO"] {
        let f = fixture(Some(record(role)), MockBranchDirectory::with_branch(3));
        assert!(f.guard.evaluate("perfil", None).await.is_render(), "{} not admitted", role);
    }
}

#[tokio::test]
async fn employee_without_branch_assignment_is_blocked() {
    let f = fixture(Some(record("ADMIN")), MockBranchDirectory::without_branch());
    assert!(f.guard.evaluate("inicio", None).await.is_block());
}

#[tokio::test]
async fn missing_email_claim_is_treated_as_unresolved_branch() {
    let claims = json!({ ROLES_CLAIM: ["EMPLEADO"] }).as_object().cloned().unwrap();
    let f = fixture(
        Some(SessionRecord::from_claims(claims).unwrap()),
        MockBranchDirectory::with_branch(1),
    );

    assert!(f.guard.evaluate("inicio", None).await.is_block());
    assert_eq!(f.directory.calls(), 0);
}

#[tokio::test]
async fn only_first_role_counts() {
    let claims = json!({
        "email": "doble@buensabor.com",
        ROLES_CLAIM: ["COCINERO", "ADMIN"],
    })
    .as_object()
    .cloned()
    .unwrap();
    let f = fixture(
        Some(SessionRecord::from_claims(claims).unwrap()),
        MockBranchDirectory::with_branch(1),
    );

    let decision = f.guard.evaluate("empleados", Some(&["ADMIN", "SUPERADMIN"])).await;
    assert!(is_default_redirect(&decision));
}

#[tokio::test]
async fn repeated_evaluation_is_idempotent_and_read_only() {
    let f = fixture(Some(record("EMPLEADO")), MockBranchDirectory::with_branch(4));
    let before = f.store.read().await.unwrap();

    let first = f.guard.evaluate_path("/promociones/4").await;
    for _ in 0..5 {
        assert_eq!(f.guard.evaluate_path("/promociones/4").await, first);
    }

    assert_eq!(f.store.read().await.unwrap(), before);
    // One lookup per navigation, no caching across navigations.
    assert_eq!(f.directory.calls(), 6);
}

#[tokio::test]
async fn route_table_paths_map_to_expected_decisions_for_employee() {
    let f = fixture(Some(record("EMPLEADO")), MockBranchDirectory::with_branch(2));

    assert!(f.guard.evaluate_path("/productos/2").await.is_render());
    assert!(f.guard.evaluate_path("/categorias/2").await.is_render());
    assert!(is_default_redirect(&f.guard.evaluate_path("/empleados/2").await));
    assert!(is_default_redirect(&f.guard.evaluate_path("/empresa").await));
}
