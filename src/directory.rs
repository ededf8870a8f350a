use async_trait::async_trait;
use std::{sync::Arc, time::Duration};

use crate::{error::LookupError, models::Empleado};

// 1. BranchDirectory Contract
/// BranchDirectory
///
/// Abstract contract for resolving which branch an identity belongs to. The real
/// implementation asks the platform API; tests plug in `MockBranchDirectory`.
#[async_trait]
pub trait BranchDirectory: Send + Sync {
    /// Looks up the employee record registered under `email`.
    ///
    /// Any non-2xx answer, transport failure or undecodable body is an error. A record
    /// without a branch is *not* an error here: the caller decides what that means.
    async fn find_by_email(&self, email: &str) -> Result<Empleado, LookupError>;
}

/// DirectoryState
///
/// Shared handle to the branch directory inside the application state.
pub type DirectoryState = Arc<dyn BranchDirectory>;

// 2. The Real Implementation (platform REST API)
/// HttpBranchDirectory
///
/// Calls `GET {api_base}/empleado/findByEmail?email=<email>`.
#[derive(Clone)]
pub struct HttpBranchDirectory {
    client: reqwest::Client,
    api_base: String,
}

impl HttpBranchDirectory {
    pub fn new(api_base: &str, timeout: Duration) -> Self {
        // Falls back to a client without a timeout if the builder rejects the settings;
        // the guard still bounds the call with its own timeout.
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/empleado/findByEmail", self.api_base)
    }
}

#[async_trait]
impl BranchDirectory for HttpBranchDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Empleado, LookupError> {
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| LookupError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        response
            .json::<Empleado>()
            .await
            .map_err(|e| LookupError::Decode(e.to_string()))
    }
}

// 3. The Mock Implementation (For Unit Tests)
/// MockBranchDirectory
///
/// Returns a canned employee or a canned failure and counts how often it was asked.
pub struct MockBranchDirectory {
    outcome: MockOutcome,
    calls: std::sync::atomic::AtomicUsize,
    delay: Option<Duration>,
}

enum MockOutcome {
    Branch(i64),
    NoBranch,
    Status(u16),
    Transport,
}

impl MockBranchDirectory {
    /// Every lookup resolves to an employee of branch `id`.
    pub fn with_branch(id: i64) -> Self {
        Self::from_outcome(MockOutcome::Branch(id))
    }

    /// Every lookup resolves to an employee that has no branch assigned.
    pub fn without_branch() -> Self {
        Self::from_outcome(MockOutcome::NoBranch)
    }

    /// Every lookup fails as if the network were down.
    pub fn new_failing() -> Self {
        Self::from_outcome(MockOutcome::Transport)
    }

    /// Every lookup answers with the given HTTP status.
    pub fn with_status(status: u16) -> Self {
        Self::from_outcome(MockOutcome::Status(status))
    }

    /// Delays each answer, to exercise lookup timeouts and overlapping navigations.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn from_outcome(outcome: MockOutcome) -> Self {
        Self {
            outcome,
            calls: std::sync::atomic::AtomicUsize::new(0),
            delay: None,
        }
    }
}

#[async_trait]
impl BranchDirectory for MockBranchDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Empleado, LookupError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.outcome {
            MockOutcome::Branch(id) => Ok(Empleado {
                id: Some(1),
                email: Some(email.to_string()),
                nombre: None,
                sucursal: Some(crate::models::BranchRef { id, nombre: None }),
            }),
            MockOutcome::NoBranch => Ok(Empleado {
                id: Some(1),
                email: Some(email.to_string()),
                ..Empleado::default()
            }),
            MockOutcome::Status(code) => Err(LookupError::Status(code)),
            MockOutcome::Transport => Err(LookupError::Transport(
                "Mock Directory Error: Simulation requested".to_string(),
            )),
        }
    }
}
