use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    error::NavigationError,
    models::{GuardDecision, NavigationResponse},
};

/// NavigationTicket
///
/// Identity of one navigation attempt. Only the newest ticket may publish its outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigationTicket {
    pub generation: u64,
    pub id: Uuid,
}

/// NavigationTracker
///
/// Orders overlapping navigations. Each `begin` supersedes all earlier tickets, so a slow
/// lookup from an abandoned navigation can never overwrite the outcome of a later one.
#[derive(Default)]
pub struct NavigationTracker {
    latest: AtomicU64,
    current: Mutex<Option<NavigationResponse>>,
}

impl NavigationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> NavigationTicket {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        NavigationTicket {
            generation,
            id: Uuid::new_v4(),
        }
    }

    /// Publishes `decision` as the current outcome if `ticket` is still the newest.
    pub async fn commit(
        &self,
        ticket: NavigationTicket,
        path: &str,
        decision: GuardDecision,
    ) -> Result<NavigationResponse, NavigationError> {
        let mut current = self.current.lock().await;

        let latest = self.latest.load(Ordering::SeqCst);
        if ticket.generation != latest {
            tracing::debug!(
                navigation_id = %ticket.id,
                generation = ticket.generation,
                latest,
                "dropping outcome of superseded navigation"
            );
            return Err(NavigationError::Superseded {
                generation: ticket.generation,
                latest,
            });
        }

        let response = NavigationResponse {
            generation: ticket.generation,
            path: path.to_string(),
            decision,
        };
        *current = Some(response.clone());
        Ok(response)
    }

    /// The last committed outcome, if any navigation has completed.
    pub async fn current(&self) -> Option<NavigationResponse> {
        self.current.lock().await.clone()
    }

    /// Forgets the committed outcome and invalidates every ticket still in flight, so a
    /// navigation evaluated against the previous session cannot publish after login/logout.
    pub async fn reset(&self) {
        let mut current = self.current.lock().await;
        let latest = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        *current = None;
        tracing::debug!(latest, "navigation outcomes reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(view: &str) -> GuardDecision {
        GuardDecision::Render {
            view: view.to_string(),
        }
    }

    #[tokio::test]
    async fn newest_ticket_commits() {
        let tracker = NavigationTracker::new();
        let ticket = tracker.begin();
        let response = tracker.commit(ticket, "/productos/1", render("productos")).await.unwrap();

        assert_eq!(response.generation, 1);
        assert_eq!(tracker.current().await, Some(response));
    }

    #[tokio::test]
    async fn superseded_ticket_cannot_overwrite_later_outcome() {
        let tracker = NavigationTracker::new();
        let stale = tracker.begin();
        let fresh = tracker.begin();

        tracker.commit(fresh, "/categorias/1", render("categorias")).await.unwrap();
        let err = tracker
            .commit(stale, "/productos/1", render("productos"))
            .await
            .unwrap_err();

        assert_eq!(err, NavigationError::Superseded { generation: 1, latest: 2 });
        assert_eq!(tracker.current().await.unwrap().path, "/categorias/1");
    }

    #[tokio::test]
    async fn stale_ticket_is_rejected_even_before_the_newer_one_commits() {
        let tracker = NavigationTracker::new();
        let stale = tracker.begin();
        let _fresh = tracker.begin();

        assert!(tracker.commit(stale, "/insumos/1", render("insumos")).await.is_err());
        assert!(tracker.current().await.is_none());
    }

    #[tokio::test]
    async fn reset_clears_outcome_and_keeps_generations_increasing() {
        let tracker = NavigationTracker::new();
        let t = tracker.begin();
        tracker.commit(t, "/empresa", render("empresa")).await.unwrap();
        tracker.reset().await;

        assert!(tracker.current().await.is_none());
        assert_eq!(tracker.begin().generation, 3);
    }

    #[tokio::test]
    async fn reset_invalidates_in_flight_tickets() {
        let tracker = NavigationTracker::new();
        let in_flight = tracker.begin();
        tracker.reset().await;

        let err = tracker
            .commit(in_flight, "/empresa", render("empresa"))
            .await
            .unwrap_err();
        assert_eq!(err, NavigationError::Superseded { generation: 1, latest: 2 });
        assert!(tracker.current().await.is_none());

        let next = tracker.begin();
        assert!(tracker.commit(next, "/empresa", render("empresa")).await.is_ok());
    }
}
