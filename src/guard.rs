use std::time::Duration;

use crate::{
    claims::ClaimsAccessor,
    config::AppConfig,
    directory::DirectoryState,
    error::{GuardError, LookupError},
    models::{BlockAction, GuardDecision, RedirectReason, SessionRecord},
    rules::{self, RouteRule},
    session::SessionState,
};

pub const BLOCK_TITLE: &str = "Error";
pub const BLOCK_MESSAGE: &str =
    "El usuario no pertenece a una sucursal, consulte al administrador.";

/// GuardState
///
/// The per-navigation state machine. `Resolving` is the only state that suspends (on the
/// branch lookup); every other state moves synchronously to its successor or terminates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    Resolving,
    Unauthenticated,
    RoleCheck,
    BranchCheck,
    Authorized,
}

/// RouteGuard
///
/// Decides whether one navigation may render its view. Reads the session store, performs at
/// most one branch lookup and returns a declarative `GuardDecision`. It never writes the
/// session and never logs anyone out; acting on a `Block` is the caller's job.
#[derive(Clone)]
pub struct RouteGuard {
    session: SessionState,
    directory: DirectoryState,
    claims: ClaimsAccessor,
    superadmin_role: String,
    default_view: String,
    login_view: String,
    lookup_timeout: Duration,
}

impl RouteGuard {
    pub fn new(session: SessionState, directory: DirectoryState, config: &AppConfig) -> Self {
        Self {
            session,
            directory,
            claims: ClaimsAccessor::new(&config.auth0_audience),
            superadmin_role: config.superadmin_role.clone(),
            default_view: config.default_view.clone(),
            login_view: config.login_view.clone(),
            lookup_timeout: config.lookup_timeout,
        }
    }

    pub fn claims(&self) -> &ClaimsAccessor {
        &self.claims
    }

    pub fn superadmin_role(&self) -> &str {
        &self.superadmin_role
    }

    /// Evaluates a dashboard path against the static route table.
    ///
    /// Paths outside the table are not guarded views: they fall through to the default view
    /// for authenticated identities and to the login view otherwise, without a lookup.
    pub async fn evaluate_path(&self, path: &str) -> GuardDecision {
        match rules::resolve(path) {
            Some(matched) => self.evaluate_rule(matched.rule).await,
            None => match self.read_session().await {
                Some(_) => GuardDecision::Redirect {
                    to: self.default_view.clone(),
                    reason: RedirectReason::UnknownRoute,
                },
                None => self.decision_for(GuardError::NoSession),
            },
        }
    }

    pub async fn evaluate_rule(&self, rule: &RouteRule) -> GuardDecision {
        self.evaluate(rule.view, rule.allowed_roles).await
    }

    /// Runs the state machine for one navigation to `view`.
    pub async fn evaluate(&self, view: &str, allowed_roles: Option<&[&str]>) -> GuardDecision {
        let record = self.read_session().await;

        let mut state = GuardState::Resolving;
        let mut branch: Option<i64> = None;
        let mut role: Option<String> = None;

        loop {
            tracing::trace!(view, ?state, "guard transition");
            state = match state {
                GuardState::Resolving => match &record {
                    None => GuardState::Unauthenticated,
                    Some(record) => {
                        branch = self.lookup_branch(record).await;
                        GuardState::RoleCheck
                    }
                },
                GuardState::Unauthenticated => {
                    return self.finish(view, Err(GuardError::NoSession));
                }
                GuardState::RoleCheck => {
                    role = record.as_ref().and_then(|r| self.claims.active_role(&r.claims));
                    let table_role = role
                        .as_deref()
                        .and_then(|r| rules::table_role(r, &self.superadmin_role));
                    let permitted = match allowed_roles {
                        None => true,
                        Some(allowed) => table_role.is_some_and(|r| allowed.contains(&r)),
                    };
                    if !permitted {
                        return self.finish(view, Err(GuardError::RoleNotPermitted { role }));
                    }
                    GuardState::BranchCheck
                }
                GuardState::BranchCheck => {
                    let exempt = role.as_deref() == Some(self.superadmin_role.as_str());
                    if !exempt && branch.is_none() {
                        return self.finish(view, Err(GuardError::BranchUnresolved));
                    }
                    GuardState::Authorized
                }
                GuardState::Authorized => return self.finish(view, Ok(())),
            };
        }
    }

    /// Turns a guard failure into the decision the dashboard acts on.
    pub fn decision_for(&self, error: GuardError) -> GuardDecision {
        match error {
            GuardError::NoSession => GuardDecision::Redirect {
                to: self.login_view.clone(),
                reason: RedirectReason::NoSession,
            },
            GuardError::RoleNotPermitted { .. } => GuardDecision::Redirect {
                to: self.default_view.clone(),
                reason: RedirectReason::RoleNotPermitted,
            },
            GuardError::BranchUnresolved | GuardError::LookupTransport(_) => GuardDecision::Block {
                title: BLOCK_TITLE.to_string(),
                message: BLOCK_MESSAGE.to_string(),
                on_acknowledge: BlockAction::Logout,
            },
        }
    }

    fn finish(&self, view: &str, outcome: Result<(), GuardError>) -> GuardDecision {
        match outcome {
            Ok(()) => {
                tracing::debug!(view, "navigation authorized");
                GuardDecision::Render {
                    view: view.to_string(),
                }
            }
            Err(error) => {
                tracing::info!(view, %error, "navigation not authorized");
                self.decision_for(error)
            }
        }
    }

    /// A store that cannot be read counts as "no session": the guard only ever fails
    /// toward the login screen.
    async fn read_session(&self) -> Option<SessionRecord> {
        match self.session.read().await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!("session store read failed: {}", e);
                None
            }
        }
    }

    /// The single branch lookup of a navigation. Every failure is logged and collapses to
    /// "no branch"; nothing is retried.
    async fn lookup_branch(&self, record: &SessionRecord) -> Option<i64> {
        let result = match self.claims.email(&record.claims) {
            None => Err(LookupError::MissingEmail),
            Some(email) => {
                match tokio::time::timeout(self.lookup_timeout, self.directory.find_by_email(&email))
                    .await
                {
                    Ok(result) => result,
                    Err(_) => Err(LookupError::Timeout {
                        millis: self.lookup_timeout.as_millis() as u64,
                    }),
                }
            }
        };

        match result {
            Ok(empleado) => {
                let branch = empleado.branch_id();
                if branch.is_none() {
                    tracing::warn!("employee record has no branch assigned");
                }
                branch
            }
            Err(e) => {
                tracing::warn!(error = %GuardError::from(e), "branch lookup failed");
                None
            }
        }
    }
}
