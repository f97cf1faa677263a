//! A pool of sessions behind an async request/response API.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    Minifier (host thread)                │
//! │  minify(code) ─▶ uuid id ─▶ pending[id] = oneshot tx     │
//! │        │                                                 │
//! │        ▼ round robin                                     │
//! │  ┌──────────┐  ┌──────────┐       ┌──────────┐           │
//! │  │ Session 0│  │ Session 1│  ...  │ Session n│           │
//! │  └────┬─────┘  └────┬─────┘       └────┬─────┘           │
//! │       └─────────────┴── on_data ───────┘                 │
//! │                        │                                 │
//! │                        ▼                                 │
//! │            pending.remove(id).send(response)             │
//! └──────────────────────────────────────────────────────────┘
//! ```

mod error;
mod minifier;

pub use error::{PoolError, PoolResult};
pub use minifier::Minifier;
