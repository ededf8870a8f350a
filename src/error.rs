//! Error types for the access gate.
//!
//! None of these reach the dashboard as failures: the guard folds every one of them into a
//! `GuardDecision`, and the HTTP edge maps the infrastructure ones to status codes.

/// Why a navigation did not render.
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// No session record is stored
    #[error("no active session")]
    NoSession,

    /// Active role is not in the route's allowed set
    #[error("role {role:?} is not permitted on this view")]
    RoleNotPermitted { role: Option<String> },

    /// Non-superadmin identity without a resolvable branch
    #[error("identity does not belong to a branch")]
    BranchUnresolved,

    /// The branch lookup itself failed; handled exactly like `BranchUnresolved`
    #[error("branch lookup failed: {0}")]
    LookupTransport(#[from] LookupError),
}

/// Outcome bookkeeping for overlapping navigations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum NavigationError {
    /// A later navigation was started before this one committed
    #[error("navigation {generation} was superseded by {latest}")]
    Superseded { generation: u64, latest: u64 },
}

/// Failure of the single branch-directory call made per navigation.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("directory answered with status {0}")]
    Status(u16),

    #[error("could not decode directory response: {0}")]
    Decode(String),

    #[error("session carries no email claim")]
    MissingEmail,

    #[error("lookup timed out after {millis}ms")]
    Timeout { millis: u64 },
}

/// Failure of the session persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("session record could not be serialized: {0}")]
    Serialization(#[from] serde_json::Error),
}
