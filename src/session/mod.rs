//! Minification sessions.
//!
//! ```text
//! host thread                                   worker thread
//! ┌──────────────────────┐                      ┌──────────────────────────┐
//! │ Session              │  inbound queue       │ bootstrap (once)         │
//! │  send(Request) ──────┼─────────────────────▶│  source → compile → run  │
//! │                      │                      │  → globals → entry point │
//! │ adapter (spawn_local)│  outbound queue      │ serving loop             │
//! │  drain → on_data ◀───┼──────────────────────┤  read → transform → write│
//! │  finished → complete │  progress signal     │  terminate → release     │
//! └──────────────────────┘                      └──────────────────────────┘
//! ```
//!
//! Bootstrap failures are terminal and go to the error callback exactly once.
//! Per-request failures come back through the data callback as
//! [`Response::Failure`](crate::protocol::Response::Failure).

mod adapter;
mod bootstrap;
mod callbacks;
mod handle;
mod pipeline;
mod worker;

pub use bootstrap::bootstrap;
pub use callbacks::{CompleteCallback, DataCallback, ErrorCallback};
pub use handle::Session;
pub use pipeline::transform;
