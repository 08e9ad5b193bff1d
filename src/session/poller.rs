//! Poll loop — fixed-cadence mailbox checks with no overlapping requests.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::manager::Command;
use crate::provider::MailProvider;

/// Spawn the poll loop for one session epoch.
///
/// Each iteration waits for the tick, runs one fetch, and only then becomes
/// eligible for the next tick — at most one request is ever outstanding. The
/// returned watch sender stops the loop; stopping twice is a no-op, and a
/// fetch that settles after the stop signal is dropped here rather than sent
/// back. Results that do get sent carry `epoch` so the manager can discard
/// anything from a session that has since been replaced.
pub(crate) fn spawn_poller(
    provider: Arc<dyn MailProvider>,
    address_id: String,
    epoch: u64,
    interval: Duration,
    cmd_tx: mpsc::Sender<Command>,
) -> watch::Sender<bool> {
    let (stop_tx, mut stop_rx) = watch::channel(false);

    tokio::spawn(async move {
        let start = tokio::time::Instant::now() + interval;
        let mut tick = tokio::time::interval_at(start, interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(address_id = %address_id, epoch, "Poll loop started");

        loop {
            tokio::select! {
                _ = stop_rx.changed() => break,
                _ = tick.tick() => {}
            }
            if *stop_rx.borrow() {
                break;
            }

            let outcome = provider.fetch_messages(&address_id).await;

            // Stopped while the request was in flight: discard, never apply.
            if *stop_rx.borrow() {
                break;
            }

            if cmd_tx
                .send(Command::PollSettled { epoch, outcome })
                .await
                .is_err()
            {
                break;
            }
        }

        debug!(address_id = %address_id, epoch, "Poll loop stopped");
    });

    stop_tx
}
