//! Async dispatch loop on tokio.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;

use super::{Inbound, Reconciler};

/// Consume `rx` until every sender is gone, handling each message as it
/// arrives and flushing match renders when their debounce deadline passes.
///
/// Pending renders are flushed once more when the channel closes. The
/// reconciler is handed back so callers can inspect it.
pub async fn dispatch_loop(
    mut reconciler: Reconciler,
    mut rx: UnboundedReceiver<Inbound>,
) -> Reconciler {
    loop {
        let wait = reconciler
            .next_deadline()
            .map(|deadline| (deadline - reconciler.now_ms()).max(0))
            .map(|ms| Duration::from_millis(ms as u64));

        tokio::select! {
            message = rx.recv() => match message {
                Some(message) => {
                    reconciler.handle(message);
                }
                None => break,
            },
            _ = sleep_for(wait) => {
                reconciler.flush();
            }
        }
    }
    let rendered = reconciler.flush_all();
    tracing::debug!(rendered, "dispatch loop closed");
    reconciler
}

async fn sleep_for(wait: Option<Duration>) {
    match wait {
        Some(wait) => tokio::time::sleep(wait).await,
        None => std::future::pending().await,
    }
}
