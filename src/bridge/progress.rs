//! Coalescing wake-up from the worker thread to the host event loop.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// An opaque "the outbound queue may hold new items" signal.
///
/// Signals are not counted: any number of [`signal`](Self::signal) calls made
/// while the host is busy collapse into a single wake-up. [`finish`](Self::finish)
/// marks the worker as exited; because it is stored after the worker's last
/// write, a drain performed after observing it sees every response.
#[derive(Debug, Default)]
pub struct Progress {
    notify: Notify,
    finished: AtomicBool,
}

impl Progress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wake the host. Callable from any thread.
    pub fn signal(&self) {
        self.notify.notify_one();
    }

    /// Record that the worker left its serving loop, then wake the host.
    pub fn finish(&self) {
        self.finished.store(true, Ordering::Release);
        self.notify.notify_one();
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }

    /// Wait for the next wake-up, or return at once if one is pending.
    pub async fn wait(&self) {
        self.notify.notified().await;
    }
}
