//! Per-client pending-message queue.
//!
//! Each registered client owns one `Mailbox`: a FIFO queue of messages
//! awaiting pickup. Deposits append to the tail; a pull atomically takes
//! the whole queue. Delivery is at-most-once — once drained, a message is
//! never stored again, even if the response carrying it is lost.

use std::sync::{Mutex, PoisonError};

use bytes::Bytes;
use maildrop_proto::{ClientId, PendingMessage};

use crate::env::Environment;

/// FIFO queue of messages awaiting delivery to one client.
///
/// The queue is guarded by its own mutex, independent of the registry
/// lock and of every other record's mailbox. Append and drain for the
/// same record serialize against each other: a deposit that races with a
/// pull lands wholly in that pull's snapshot or wholly in the next one.
#[derive(Debug, Default)]
pub struct Mailbox {
    queue: Mutex<Vec<PendingMessage>>,
}

impl Mailbox {
    /// Create an empty mailbox
    #[must_use]
    pub fn new() -> Self {
        Self { queue: Mutex::new(Vec::new()) }
    }

    /// Append a message to the tail of the queue.
    ///
    /// Returns the freshly generated acknowledgment id. Message ids are
    /// uniform-random and best-effort unique; they identify nothing beyond
    /// the acknowledgment sent back to the depositor.
    pub fn append(
        &self,
        kind: u8,
        sender_id: ClientId,
        content: Bytes,
        env: &impl Environment,
    ) -> u32 {
        let message_id = env.message_id();
        let message = PendingMessage { sender_id, message_id, kind, content };

        self.lock().push(message);
        message_id
    }

    /// Atomically take and clear the queue, in FIFO order.
    pub fn drain_all(&self) -> Vec<PendingMessage> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of messages currently queued
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the queue is currently empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while holding the lock can only leave a fully pushed or fully
    // taken queue behind, so a poisoned queue is still well-formed.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<PendingMessage>> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
