//! Single-flight coordination of the token refresh call.
//!
//! At most one refresh is ever in flight. The first caller to hit an
//! authorization failure becomes the leader and performs the call;
//! everyone else parks on a continuation that the leader resolves, in
//! arrival order, when the refresh settles.

use tokio::sync::{Mutex, oneshot};

use crate::error::RefreshError;

pub(crate) type RefreshOutcome = std::result::Result<String, RefreshError>;

/// What [`RefreshCoordinator::begin`] handed this caller.
pub(crate) enum RefreshTicket {
    /// No refresh was in flight; this caller must perform it and report
    /// the outcome through `finish`.
    Leader,
    /// A refresh is already in flight; await its outcome here.
    Follower(oneshot::Receiver<RefreshOutcome>),
}

#[derive(Default)]
pub(crate) struct RefreshCoordinator {
    state: Mutex<RefreshState>,
}

#[derive(Default)]
struct RefreshState {
    in_flight: bool,
    waiters: Vec<oneshot::Sender<RefreshOutcome>>,
}

impl RefreshCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn begin(&self) -> RefreshTicket {
        let mut state = self.state.lock().await;
        if state.in_flight {
            let (tx, rx) = oneshot::channel();
            state.waiters.push(tx);
            RefreshTicket::Follower(rx)
        } else {
            state.in_flight = true;
            RefreshTicket::Leader
        }
    }

    /// Settle the in-flight refresh. Waiters are resumed in arrival
    /// order, each with a clone of the outcome.
    pub async fn finish(&self, outcome: RefreshOutcome) {
        let mut state = self.state.lock().await;
        state.in_flight = false;
        for waiter in state.waiters.drain(..) {
            let _ = waiter.send(outcome.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_caller_leads_then_followers_queue() {
        let coordinator = RefreshCoordinator::new();
        assert!(matches!(coordinator.begin().await, RefreshTicket::Leader));

        let RefreshTicket::Follower(rx) = coordinator.begin().await else {
            panic!("expected follower while a refresh is in flight");
        };

        coordinator.finish(Ok("fresh".to_string())).await;
        assert_eq!(rx.await.unwrap().unwrap(), "fresh");
    }

    #[tokio::test]
    async fn settling_allows_a_new_leader() {
        let coordinator = RefreshCoordinator::new();
        assert!(matches!(coordinator.begin().await, RefreshTicket::Leader));
        coordinator
            .finish(Err(RefreshError::new("expired")))
            .await;
        assert!(matches!(coordinator.begin().await, RefreshTicket::Leader));
    }

    #[tokio::test]
    async fn every_waiter_receives_the_outcome() {
        let coordinator = RefreshCoordinator::new();
        assert!(matches!(coordinator.begin().await, RefreshTicket::Leader));

        let mut waiters = Vec::new();
        for _ in 0..3 {
            match coordinator.begin().await {
                RefreshTicket::Follower(rx) => waiters.push(rx),
                RefreshTicket::Leader => panic!("second leader while in flight"),
            }
        }

        coordinator.finish(Err(RefreshError::new("expired"))).await;
        for rx in waiters {
            let outcome = rx.await.unwrap();
            assert_eq!(outcome.unwrap_err().message, "expired");
        }
    }
}
