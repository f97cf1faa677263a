//! Thread-safe plumbing between one worker thread and the host event loop.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────┐   BridgeQueue<Request>    ┌──────────────────────┐
//! │  Host event loop     │ ────────────────────────▶ │  Worker thread       │
//! │  (single thread)     │                           │  (owns the engine)   │
//! │                      │ ◀──────────────────────── │                      │
//! └──────────────────────┘   BridgeQueue<Response>   └──────────────────────┘
//!            ▲                                                  │
//!            └──────────────── Progress (coalescing wake) ──────┘
//! ```
//!
//! The worker blocks in [`BridgeQueue::read`]; the host never blocks and
//! recovers everything pending with [`BridgeQueue::drain_all`] each time
//! [`Progress`] wakes it, since several writes may share one wake-up.

mod progress;
mod queue;

pub use progress::Progress;
pub use queue::BridgeQueue;
