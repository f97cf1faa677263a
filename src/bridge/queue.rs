//! FIFO mailbox with a blocking read and an atomic batch drain.

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

/// A thread-safe FIFO queue for exactly one consumer.
///
/// `write` never blocks. `read` parks the calling thread until an item is
/// available. `drain_all` takes every buffered item in one critical section,
/// so a write racing with a drain lands wholly in this batch or the next.
#[derive(Debug)]
pub struct BridgeQueue<T> {
    buffer: Mutex<VecDeque<T>>,
    available: Condvar,
}

impl<T> BridgeQueue<T> {
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(VecDeque::new()),
            available: Condvar::new(),
        }
    }

    /// Append `item` to the back of the queue and wake a blocked reader.
    pub fn write(&self, item: T) {
        self.lock().push_back(item);
        self.available.notify_all();
    }

    /// Remove and return the front item, blocking while the queue is empty.
    pub fn read(&self) -> T {
        let mut buffer = self.lock();
        loop {
            if let Some(item) = buffer.pop_front() {
                return item;
            }
            buffer = self
                .available
                .wait(buffer)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Remove and return the front item without blocking.
    pub fn try_read(&self) -> Option<T> {
        self.lock().pop_front()
    }

    /// Remove every buffered item, oldest first, leaving the queue empty.
    pub fn drain_all(&self) -> Vec<T> {
        let drained = std::mem::take(&mut *self.lock());
        drained.into()
    }

    /// Number of items currently buffered.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // Every critical section leaves the deque consistent; poisoning is ignored.
    fn lock(&self) -> MutexGuard<'_, VecDeque<T>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for BridgeQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
