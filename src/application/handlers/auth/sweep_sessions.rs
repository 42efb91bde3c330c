//! SessionSweeper - Background service deleting expired sessions.
//!
//! Best-effort maintenance only. `SessionGuard` checks expiry on every
//! access, so a stopped or failing sweeper never lets an expired session
//! through.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `interval` | 300s | Time between sweeps |
//!
//! ## Graceful Shutdown
//!
//! The loop exits when the shutdown watch channel flips to `true` or its
//! sender is dropped.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use crate::domain::foundation::DomainError;
use crate::ports::{Clock, SessionStore};

/// Periodically deletes sessions with `expires_at < now`.
pub struct SessionSweeper {
    sessions: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    interval: Duration,
}

impl SessionSweeper {
    pub fn new(sessions: Arc<dyn SessionStore>, clock: Arc<dyn Clock>, interval: Duration) -> Self {
        Self {
            sessions,
            clock,
            interval,
        }
    }

    /// Runs one sweep. Returns the number of sessions deleted.
    pub async fn sweep_once(&self) -> Result<u64, DomainError> {
        let removed = self.sessions.delete_expired(self.clock.now()).await?;
        if removed > 0 {
            tracing::info!(removed, "Expired sessions swept");
        } else {
            tracing::debug!("Session sweep found nothing to remove");
        }
        Ok(removed)
    }

    /// Run the sweep loop until the shutdown signal is received.
    ///
    /// Sweep failures are logged and the loop continues.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.interval);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    // Err means the sender is gone; no signal can arrive.
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::debug!("Session sweeper stopping");
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        tracing::error!(error = %e, "Session sweep failed");
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryStore, ManualClock};
    use crate::domain::foundation::{Timestamp, UserId};
    use crate::domain::session::Session;

    fn ts(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(secs).unwrap()
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_sessions() {
        let store = InMemoryStore::new();
        let clock = Arc::new(ManualClock::at_unix(0));
        let user = UserId::new();
        store.insert(&Session::new("short".into(), user, ts(0), 10)).await.unwrap();
        store.insert(&Session::new("long".into(), user, ts(0), 1000)).await.unwrap();

        let sweeper = SessionSweeper::new(Arc::new(store.clone()), clock.clone(), Duration::from_secs(300));
        clock.advance_secs(11);

        assert_eq!(sweeper.sweep_once().await.unwrap(), 1);
        assert!(store.find("short").await.unwrap().is_none());
        assert!(store.find("long").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn sweep_failure_is_an_error_not_a_panic() {
        let store = InMemoryStore::new();
        store.set_unavailable(true);
        let sweeper = SessionSweeper::new(
            Arc::new(store),
            Arc::new(ManualClock::at_unix(0)),
            Duration::from_secs(300),
        );
        assert!(sweeper.sweep_once().await.is_err());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown_signal() {
        let store = InMemoryStore::new();
        let clock = Arc::new(ManualClock::at_unix(100));
        store
            .insert(&Session::new("old".into(), UserId::new(), ts(0), 10))
            .await
            .unwrap();

        let sweeper = SessionSweeper::new(Arc::new(store.clone()), clock, Duration::from_millis(10));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(async move { sweeper.run(shutdown_rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        assert_eq!(store.session_count().await, 0);
    }

    #[tokio::test]
    async fn run_stops_when_shutdown_sender_is_dropped() {
        let sweeper = SessionSweeper::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(ManualClock::at_unix(0)),
            Duration::from_secs(300),
        );
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        drop(shutdown_tx);

        tokio::time::timeout(Duration::from_secs(1), sweeper.run(shutdown_rx))
            .await
            .expect("sweeper should return once the sender is gone");
    }
}
