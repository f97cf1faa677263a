//! Host-side consumer of the outbound queue.

use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use super::callbacks::Callbacks;
use crate::bridge::{BridgeQueue, Progress};
use crate::protocol::Response;

/// Deliver responses to the data callback until the worker exits, then
/// call the completion callback once.
///
/// The finished flag is read before the drain. The worker sets it only after
/// its final write, so a drain that follows a `true` read is the last one
/// needed and nothing is left behind when completion fires.
pub(crate) async fn run(
    outbound: Arc<BridgeQueue<Response>>,
    progress: Arc<Progress>,
    callbacks: Rc<Callbacks>,
) {
    loop {
        progress.wait().await;
        let finished = progress.is_finished();

        let batch = outbound.drain_all();
        if !batch.is_empty() {
            debug!(responses = batch.len(), "delivering drained responses");
        }
        for response in batch {
            callbacks.emit_data(response);
        }

        if finished {
            debug!("worker exited; completing session");
            callbacks.emit_complete();
            return;
        }
    }
}
