//! Rebindable host callbacks.
//!
//! Slots are only ever touched from the host thread, so plain `RefCell`s
//! suffice. A callback is taken out of its slot for the duration of the call,
//! which lets it install its own replacement without a re-entrant borrow.

use std::cell::RefCell;

use crate::error::SessionError;
use crate::protocol::Response;

pub type DataCallback = Box<dyn FnMut(Response)>;
pub type CompleteCallback = Box<dyn FnMut()>;
pub type ErrorCallback = Box<dyn FnMut(SessionError)>;

struct Slot<F: ?Sized> {
    current: RefCell<Option<Box<F>>>,
}

impl<F: ?Sized> Slot<F> {
    fn new(callback: Box<F>) -> Self {
        Self {
            current: RefCell::new(Some(callback)),
        }
    }

    fn replace(&self, callback: Box<F>) {
        *self.current.borrow_mut() = Some(callback);
    }

    /// Invoke the current callback. A replacement installed during the call wins.
    fn with(&self, invoke: impl FnOnce(&mut F)) {
        let taken = self.current.borrow_mut().take();
        let Some(mut callback) = taken else {
            return;
        };
        invoke(&mut *callback);

        let mut slot = self.current.borrow_mut();
        if slot.is_none() {
            *slot = Some(callback);
        }
    }
}

/// The three host callbacks of one session.
pub(crate) struct Callbacks {
    data: Slot<dyn FnMut(Response)>,
    complete: Slot<dyn FnMut()>,
    error: Slot<dyn FnMut(SessionError)>,
}

impl Callbacks {
    pub fn new(data: DataCallback, complete: CompleteCallback, error: ErrorCallback) -> Self {
        Self {
            data: Slot::new(data),
            complete: Slot::new(complete),
            error: Slot::new(error),
        }
    }

    pub fn set_data(&self, callback: DataCallback) {
        self.data.replace(callback);
    }

    pub fn set_complete(&self, callback: CompleteCallback) {
        self.complete.replace(callback);
    }

    pub fn set_error(&self, callback: ErrorCallback) {
        self.error.replace(callback);
    }

    pub fn emit_data(&self, response: Response) {
        self.data.with(|callback| callback(response));
    }

    pub fn emit_complete(&self) {
        self.complete.with(|callback| callback());
    }

    pub fn emit_error(&self, error: SessionError) {
        self.error.with(|callback| callback(error));
    }
}
