//! Round-robin pool of minification sessions.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::rc::Rc;

use futures::future::join_all;
use tokio::sync::oneshot;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::{PoolError, PoolResult};
use crate::config::Settings;
use crate::error::SessionError;
use crate::protocol::{Request, Response};
use crate::session::Session;

/// Requests awaiting a response: id → (session index, waiter).
type Pending = Rc<RefCell<HashMap<String, (usize, oneshot::Sender<Response>)>>>;

/// A pool of started sessions answering requests by id.
///
/// Each call picks the next session in turn, tags the request with a fresh
/// UUID and resolves once that session's data callback sees the id again.
/// Like [`Session`], a `Minifier` lives on the host thread inside a
/// [`tokio::task::LocalSet`].
///
/// # Example
///
/// ```ignore
/// use puglify::{Minifier, Settings};
///
/// let pool = Minifier::new(&Settings::default())?;
/// let response = pool.minify("let  answer = 42;").await?;
/// assert_eq!(response.code().and_then(|c| c.as_str()), Some("let answer=42"));
/// ```
pub struct Minifier {
    sessions: Vec<Session>,
    /// Per-session flag, set once the session can no longer answer.
    closed: Rc<Vec<Cell<bool>>>,
    pending: Pending,
    next: Cell<usize>,
}

impl Minifier {
    /// Create and start `pool.threads` sessions configured by `settings`.
    ///
    /// Fails with the first bootstrap error; sessions already started are
    /// terminated.
    pub fn new(settings: &Settings) -> PoolResult<Self> {
        let threads = settings.pool.thread_count();
        let pending: Pending = Rc::default();
        let closed: Rc<Vec<Cell<bool>>> = Rc::new((0..threads).map(|_| Cell::new(false)).collect());
        let mut sessions = Vec::with_capacity(threads);

        for index in 0..threads {
            let failure = Rc::new(RefCell::new(None));
            let session = Session::with_settings(
                &settings.engine,
                deliver(&pending),
                close_session(&pending, &closed, index),
                {
                    let failure = Rc::clone(&failure);
                    move |err: SessionError| {
                        failure.borrow_mut().replace(err);
                    }
                },
            );

            let failed = failure.borrow_mut().take();
            if let Some(err) = failed {
                return Err(PoolError::Bootstrap(err));
            }
            session.start();
            sessions.push(session);
        }

        info!(threads, "minifier pool ready");
        Ok(Self {
            sessions,
            closed,
            pending,
            next: Cell::new(0),
        })
    }

    /// Minify `code`, using the generated request id as its name.
    pub fn minify(&self, code: impl Into<String>) -> impl Future<Output = PoolResult<Response>> {
        let id = Uuid::new_v4().to_string();
        self.submit(id.clone(), id, code.into())
    }

    /// Minify `code` under an explicit `name`.
    pub fn minify_named(
        &self,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> impl Future<Output = PoolResult<Response>> {
        self.submit(Uuid::new_v4().to_string(), name.into(), code.into())
    }

    /// Minify every `(name, code)` pair concurrently, keyed by name.
    pub async fn minify_many<I, N, C>(&self, sources: I) -> PoolResult<BTreeMap<String, Response>>
    where
        I: IntoIterator<Item = (N, C)>,
        N: Into<String>,
        C: Into<String>,
    {
        let requests = sources.into_iter().map(|(name, code)| {
            let name = name.into();
            let response = self.minify_named(name.clone(), code);
            async move { response.await.map(|response| (name, response)) }
        });
        join_all(requests).await.into_iter().collect()
    }

    /// Ask every session to stop once its queued requests are served.
    ///
    /// Requests submitted afterwards fail with [`PoolError::Closed`].
    pub fn terminate(&self) {
        for (session, closed) in self.sessions.iter().zip(self.closed.iter()) {
            if !closed.replace(true) {
                session.send(Request::terminate());
            }
        }
        debug!(sessions = self.sessions.len(), "minifier pool terminating");
    }

    /// Number of sessions in the pool.
    pub fn size(&self) -> usize {
        self.sessions.len()
    }

    /// Requests sent but not yet answered.
    pub fn pending(&self) -> usize {
        self.pending.borrow().len()
    }

    fn submit(
        &self,
        id: String,
        name: String,
        code: String,
    ) -> impl Future<Output = PoolResult<Response>> {
        let index = self.next.get();
        self.next.set((index + 1) % self.sessions.len());

        let receiver = if self.closed[index].get() {
            None
        } else {
            let (tx, rx) = oneshot::channel();
            self.pending.borrow_mut().insert(id.clone(), (index, tx));
            self.sessions[index].send(Request::minify(id, name, code));
            Some(rx)
        };

        async move {
            match receiver {
                Some(rx) => rx.await.map_err(|_| PoolError::Closed),
                None => Err(PoolError::Closed),
            }
        }
    }
}

impl std::fmt::Debug for Minifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Minifier")
            .field("sessions", &self.sessions.len())
            .field("pending", &self.pending())
            .finish()
    }
}

/// Data callback: hand each response to whoever is waiting on its id.
fn deliver(pending: &Pending) -> impl FnMut(Response) + 'static {
    let pending = Rc::clone(pending);
    move |response: Response| {
        let waiter = pending.borrow_mut().remove(response.id());
        match waiter {
            Some((_, tx)) => {
                let _ = tx.send(response);
            }
            None => debug!(id = %response.id(), "dropping response with no waiter"),
        }
    }
}

/// Completion callback: fail everything still waiting on session `index`.
fn close_session(
    pending: &Pending,
    closed: &Rc<Vec<Cell<bool>>>,
    index: usize,
) -> impl FnMut() + 'static {
    let pending = Rc::clone(pending);
    let closed = Rc::clone(closed);
    move || {
        closed[index].set(true);
        pending.borrow_mut().retain(|_, (owner, _)| *owner != index);
        debug!(session = index, "minifier session completed");
    }
}
