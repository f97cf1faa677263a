//! The session's background thread: bootstrap, start gate, serving loop.

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use tracing::debug;

use super::bootstrap::bootstrap;
use super::pipeline::transform;
use crate::bridge::{BridgeQueue, Progress};
use crate::engine::{Engine, ScriptSource};
use crate::error::{EngineResult, ErrorKind, SessionError};
use crate::protocol::{Request, Response};

const WORKER_THREAD_NAME: &str = "puglify-worker";

/// State shared between the host and the worker thread.
#[derive(Clone, Default)]
pub(crate) struct Channels {
    pub inbound: Arc<BridgeQueue<Request>>,
    pub outbound: Arc<BridgeQueue<Response>>,
    pub progress: Arc<Progress>,
}

/// Host-side view of a bootstrapped worker thread.
///
/// The thread parks on the start gate after bootstrap. Dropping the worker
/// without [`release`](Self::release) closes the gate and the thread exits
/// without serving.
pub(crate) struct Worker {
    start_gate: Option<mpsc::Sender<()>>,
}

impl Worker {
    /// Spawn the thread and wait for bootstrap to finish on it.
    ///
    /// On failure the thread has already dropped its engine and been joined.
    pub fn spawn<E, F>(
        factory: F,
        source: ScriptSource,
        entry_point: String,
        channels: &Channels,
    ) -> Result<Self, SessionError>
    where
        E: Engine + 'static,
        F: FnOnce() -> EngineResult<E> + Send + 'static,
    {
        let (ready_tx, ready_rx) = mpsc::channel();
        let (gate_tx, gate_rx) = mpsc::channel();
        let channels = channels.clone();

        let thread = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || {
                run(factory, &source, &entry_point, ready_tx, gate_rx, &channels);
            })
            .map_err(|err| SessionError::context_unavailable(err.to_string()))?;
        debug!("worker thread spawned");

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self {
                start_gate: Some(gate_tx),
            }),
            Ok(Err(err)) => {
                let _ = thread.join();
                Err(err)
            }
            Err(_) => {
                let _ = thread.join();
                Err(SessionError::with_detail(
                    ErrorKind::RuntimeFailure,
                    "worker thread exited during bootstrap",
                ))
            }
        }
    }

    /// Let the thread enter its serving loop. Returns `false` if it already has.
    pub fn release(&mut self) -> bool {
        match self.start_gate.take() {
            Some(gate) => gate.send(()).is_ok(),
            None => false,
        }
    }
}

fn run<E, F>(
    factory: F,
    source: &ScriptSource,
    entry_point: &str,
    ready: mpsc::Sender<Result<(), SessionError>>,
    gate: mpsc::Receiver<()>,
    channels: &Channels,
) where
    E: Engine,
    F: FnOnce() -> EngineResult<E>,
{
    let engine = match factory() {
        Ok(engine) => engine,
        Err(err) => {
            let _ = ready.send(Err(SessionError::context_unavailable(err.message())));
            return;
        }
    };

    let function = match bootstrap(&engine, source, entry_point) {
        Ok(function) => function,
        Err(err) => {
            drop(engine);
            let _ = ready.send(Err(err));
            return;
        }
    };
    let _ = ready.send(Ok(()));

    if gate.recv().is_err() {
        debug!("session dropped before start; releasing engine");
        return;
    }

    serve(&engine, &function, channels);

    drop(function);
    drop(engine);
    debug!("engine released");
    channels.progress.finish();
}

/// Serve requests until a terminate request is read.
fn serve<E: Engine>(engine: &E, entry_point: &E::Function, channels: &Channels) {
    loop {
        let request = channels.inbound.read();

        if request.is_terminate() {
            debug!("terminate received; leaving serving loop");
            return;
        }
        if !request.is_minify() {
            debug!(id = %request.id, event = %request.event, "discarding request with unknown event");
            continue;
        }

        let Request { id, name, code, .. } = request;
        let outcome = transform(engine, entry_point, &code);
        channels
            .outbound
            .write(Response::from_outcome(id, name, outcome));
        channels.progress.signal();
    }
}
