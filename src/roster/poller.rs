use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::board::RosterBoard;
use super::service::RosterService;

/// Refreshes the board for one permit on a fixed interval.
///
/// Dropping the poller stops it. A failed refresh keeps the previous board.
pub struct RosterPoller {
    service: Arc<RosterService>,
    every: Duration,
    permit_id: String,
    board: watch::Receiver<Option<RosterBoard>>,
    task: JoinHandle<()>,
}

impl RosterPoller {
    pub fn spawn(service: Arc<RosterService>, permit_id: impl Into<String>, every: Duration) -> Self {
        let permit_id = permit_id.into();
        let (board, task) = Self::start(service.clone(), permit_id.clone(), every);
        Self {
            service,
            every,
            permit_id,
            board,
            task,
        }
    }

    fn start(
        service: Arc<RosterService>,
        permit_id: String,
        every: Duration,
    ) -> (watch::Receiver<Option<RosterBoard>>, JoinHandle<()>) {
        let (tx, rx) = watch::channel(None);
        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                match service.board(&permit_id, Utc::now()).await {
                    Ok(board) => {
                        debug!(permit_id = %permit_id, inside = board.inside_count(), "Roster refreshed");
                        tx.send_replace(Some(board));
                    }
                    Err(e) => {
                        warn!(permit_id = %permit_id, error = %e, "Roster refresh failed");
                        service.notifier().error(&format!("Could not refresh entries: {e}"));
                    }
                }
            }
        });
        (rx, task)
    }

    pub fn permit_id(&self) -> &str {
        &self.permit_id
    }

    /// Latest board, if any refresh has succeeded.
    pub fn board(&self) -> Option<RosterBoard> {
        self.board.borrow().clone()
    }

    /// Receiver that wakes on every successful refresh.
    pub fn subscribe(&self) -> watch::Receiver<Option<RosterBoard>> {
        self.board.clone()
    }

    /// Stop polling the current permit and start on another.
    pub fn switch_to(&mut self, permit_id: impl Into<String>) {
        self.task.abort();
        self.permit_id = permit_id.into();
        let (board, task) = Self::start(self.service.clone(), self.permit_id.clone(), self.every);
        self.board = board;
        self.task = task;
    }
}

impl Drop for RosterPoller {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mocks::InMemoryBackend;
    use crate::models::EntryRole;
    use crate::notify::RecordingNotifier;

    fn service(backend: Arc<InMemoryBackend>) -> Arc<RosterService> {
        Arc::new(RosterService::new(backend, Arc::new(RecordingNotifier::new()), 60))
    }

    #[tokio::test(start_paused = true)]
    async fn polls_every_interval_until_dropped() {
        let backend = Arc::new(InMemoryBackend::new());
        let poller = RosterPoller::spawn(service(backend.clone()), "cs-1", Duration::from_secs(60));

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(backend.call_count("entries"), 1);
        assert!(poller.board().is_some());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(backend.call_count("entries"), 2);

        drop(poller);
        tokio::time::sleep(Duration::from_secs(180)).await;
        assert_eq!(backend.call_count("entries"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refresh_keeps_last_board() {
        let backend = Arc::new(InMemoryBackend::new());
        let roster = service(backend.clone());
        roster.check_in("cs-1", "Anan", EntryRole::Entrant).await.unwrap();

        let poller = RosterPoller::spawn(roster, "cs-1", Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(poller.board().unwrap().entrants.len(), 1);

        backend.fail_next(503, "service unavailable");
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(poller.board().unwrap().entrants.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn switching_permit_restarts_on_new_subject() {
        let backend = Arc::new(InMemoryBackend::new());
        let roster = service(backend.clone());
        roster.check_in("cs-2", "Somchai", EntryRole::Standby).await.unwrap();

        let mut poller = RosterPoller::spawn(roster, "cs-1", Duration::from_secs(60));
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(poller.board().unwrap().inside_count(), 0);

        poller.switch_to("cs-2");
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(poller.permit_id(), "cs-2");
        assert_eq!(poller.board().unwrap().standby.len(), 1);
    }
}
