// ── VPN connection-info poll ──
//
// Re-fetches the WireGuard connection info on an interval while a status
// view is open. Stopping (or dropping) the handle cancels the task: no
// request is issued afterwards and an in-flight one is abandoned.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use opnly_api::FirewallClient;

use crate::error::CoreError;

/// Latest poll result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollUpdate {
    /// No response yet.
    Pending,
    /// Connection info as reported by the appliance.
    Info(String),
    /// The last fetch failed; polling continues.
    Failed(CoreError),
}

/// Handle to a running poll.
pub struct StatusPoll {
    cancel: CancellationToken,
    updates: watch::Receiver<PollUpdate>,
    handle: Option<JoinHandle<()>>,
}

impl StatusPoll {
    /// Start polling. The first fetch happens immediately.
    ///
    /// Fails with `ValidationError` for a zero interval.
    pub fn spawn(client: Arc<FirewallClient>, interval: Duration) -> Result<Self, CoreError> {
        if interval.is_zero() {
            return Err(CoreError::validation("poll interval must be greater than zero"));
        }
        let cancel = CancellationToken::new();
        let (tx, updates) = watch::channel(PollUpdate::Pending);
        let handle = tokio::spawn(poll_task(client, interval, tx, cancel.clone()));
        debug!(?interval, "status poll started");
        Ok(Self {
            cancel,
            updates,
            handle: Some(handle),
        })
    }

    /// A receiver for poll results.
    pub fn updates(&self) -> watch::Receiver<PollUpdate> {
        self.updates.clone()
    }

    /// The most recent result.
    pub fn latest(&self) -> PollUpdate {
        self.updates.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Cancel the poll and wait for the task to exit.
    pub async fn stop(&mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for StatusPoll {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_task(
    client: Arc<FirewallClient>,
    interval: Duration,
    tx: watch::Sender<PollUpdate>,
    cancel: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let update = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            result = client.wireguard_showconf() => match result {
                Ok(info) => PollUpdate::Info(info),
                Err(e) => {
                    warn!(error = %e, "VPN status poll failed");
                    PollUpdate::Failed(e.into())
                }
            },
        };

        if tx.send(update).is_err() {
            break;
        }
    }

    debug!("status poll stopped");
}
