use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{sleep_until, Instant};
use tracing::trace;

use common::{NodeStateSnapshot, NodeStatus};

use crate::node::RobotNode;

/// Receivers for the periodically republished node state and status.
/// On-demand callers can use [`RobotNode::sample_state`] and
/// [`RobotNode::sample_status`] directly at any frequency.
pub struct ReporterHandles {
    pub state: watch::Receiver<NodeStateSnapshot>,
    pub status: watch::Receiver<NodeStatus>,
}

/// Spawns the background sampling loop. Each tick recomputes fresh
/// snapshots from the driver's current readings; sampling never waits on an
/// in-flight operation. The loop stops once `shutdown` is set.
pub fn spawn_reporters(
    node: Arc<RobotNode>,
    period: Duration,
    shutdown: Arc<AtomicBool>,
) -> ReporterHandles {
    let (state_tx, state_rx) = watch::channel(node.sample_state());
    let (status_tx, status_rx) = watch::channel(node.sample_status());

    tokio::spawn(async move {
        let mut next_tick = Instant::now();
        while !shutdown.load(Ordering::Relaxed) {
            next_tick += period;
            sleep_until(next_tick).await;

            let state = node.sample_state();
            let status = node.sample_status();
            trace!(
                busy = status.busy,
                available = state.is_available(),
                "Published node snapshot"
            );
            state_tx.send_replace(state);
            status_tx.send_replace(status);
        }
    });

    ReporterHandles {
        state: state_rx,
        status: status_rx,
    }
}
