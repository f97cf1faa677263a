//! The host-facing session handle.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use tracing::{debug, warn};

use super::adapter;
use super::callbacks::Callbacks;
use super::worker::{Channels, Worker};
use crate::config::{EngineSettings, Settings};
use crate::engine::{Engine, LuaEngine, ScriptSource};
use crate::error::{EngineResult, SessionError};
use crate::protocol::{Request, Response};

/// One worker thread, one engine context and the two queues between them.
///
/// A session must be created and used on the host thread. [`start`](Self::start)
/// spawns the host-side adapter with [`tokio::task::spawn_local`], so it has to
/// be called from inside a [`tokio::task::LocalSet`].
///
/// # Example
///
/// ```ignore
/// use puglify::{Request, Session};
///
/// let local = tokio::task::LocalSet::new();
/// local.run_until(async {
///     let session = Session::create(
///         |response| println!("{} -> {:?}", response.id(), response.code()),
///         || println!("done"),
///         |err| eprintln!("bootstrap failed: {err}"),
///     );
///     session.start();
///     session.send(Request::minify("1", "a", "function f(x){return x+1;}"));
///     session.send(Request::terminate());
/// }).await;
/// ```
pub struct Session {
    channels: Channels,
    callbacks: Rc<Callbacks>,
    /// `None` once bootstrap has failed.
    worker: RefCell<Option<Worker>>,
    started: Cell<bool>,
    input_closed: Cell<bool>,
}

impl Session {
    /// Create a session over the bundled minifier with default settings.
    pub fn create(
        on_data: impl FnMut(Response) + 'static,
        on_complete: impl FnMut() + 'static,
        on_error: impl FnMut(SessionError) + 'static,
    ) -> Self {
        Self::with_settings(&Settings::default().engine, on_data, on_complete, on_error)
    }

    /// Create a sandboxed Lua session configured by `settings`.
    pub fn with_settings(
        settings: &EngineSettings,
        on_data: impl FnMut(Response) + 'static,
        on_complete: impl FnMut() + 'static,
        on_error: impl FnMut(SessionError) + 'static,
    ) -> Self {
        let memory_limit = settings.memory_limit;
        Self::with_engine(
            move || LuaEngine::sandboxed(memory_limit),
            settings.script_source(),
            settings.entry_point.clone(),
            on_data,
            on_complete,
            on_error,
        )
    }

    /// Create a session over any engine.
    ///
    /// `factory` runs on the worker thread, so the engine itself never has to
    /// be `Send`. Bootstrap completes before this returns; if it fails,
    /// `on_error` has already been called and the engine released.
    pub fn with_engine<E, F>(
        factory: F,
        source: ScriptSource,
        entry_point: impl Into<String>,
        on_data: impl FnMut(Response) + 'static,
        on_complete: impl FnMut() + 'static,
        on_error: impl FnMut(SessionError) + 'static,
    ) -> Self
    where
        E: Engine + 'static,
        F: FnOnce() -> EngineResult<E> + Send + 'static,
    {
        let callbacks = Rc::new(Callbacks::new(
            Box::new(on_data),
            Box::new(on_complete),
            Box::new(on_error),
        ));
        let channels = Channels::default();

        let worker = match Worker::spawn(factory, source, entry_point.into(), &channels) {
            Ok(worker) => Some(worker),
            Err(err) => {
                warn!(kind = ?err.kind(), error = %err, "session bootstrap failed");
                callbacks.emit_error(err);
                None
            }
        };

        Self {
            channels,
            callbacks,
            worker: RefCell::new(worker),
            started: Cell::new(false),
            input_closed: Cell::new(false),
        }
    }

    /// Release the worker into its serving loop and begin delivering results.
    ///
    /// Later calls, and calls after a failed bootstrap, do nothing.
    pub fn start(&self) {
        if self.started.get() {
            return;
        }
        let mut worker = self.worker.borrow_mut();
        let Some(worker) = worker.as_mut() else {
            debug!("start ignored: bootstrap failed");
            return;
        };

        self.started.set(true);
        tokio::task::spawn_local(adapter::run(
            Arc::clone(&self.channels.outbound),
            Arc::clone(&self.channels.progress),
            Rc::clone(&self.callbacks),
        ));
        worker.release();
        debug!("session started");
    }

    /// Queue a request for the worker. Never blocks.
    pub fn send(&self, request: Request) {
        if self.input_closed.get() {
            warn!(id = %request.id, event = %request.event, "request sent after input was closed");
        }
        debug!(id = %request.id, event = %request.event, "request queued");
        self.channels.inbound.write(request);
    }

    /// Mark the input side closed.
    ///
    /// This is advisory only: the worker keeps serving until it reads a
    /// terminate request.
    pub fn close_input(&self) {
        self.input_closed.set(true);
    }

    pub fn is_input_closed(&self) -> bool {
        self.input_closed.get()
    }

    pub fn is_started(&self) -> bool {
        self.started.get()
    }

    /// Whether bootstrap failed and the error callback has been called.
    pub fn bootstrap_failed(&self) -> bool {
        self.worker.borrow().is_none()
    }

    pub fn set_on_data(&self, callback: impl FnMut(Response) + 'static) {
        self.callbacks.set_data(Box::new(callback));
    }

    pub fn set_on_complete(&self, callback: impl FnMut() + 'static) {
        self.callbacks.set_complete(Box::new(callback));
    }

    pub fn set_on_error(&self, callback: impl FnMut(SessionError) + 'static) {
        self.callbacks.set_error(Box::new(callback));
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // An unstarted worker exits when its start gate is dropped with us.
        if self.started.get() {
            self.channels.inbound.write(Request::terminate());
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("started", &self.started.get())
            .field("input_closed", &self.input_closed.get())
            .field("bootstrap_failed", &self.bootstrap_failed())
            .field("pending_requests", &self.channels.inbound.len())
            .finish()
    }
}
