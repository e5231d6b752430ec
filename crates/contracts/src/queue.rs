//! BoundedQueue - fixed-capacity FIFO shared between producers and consumers
//!
//! Backed by an `async-channel` bounded channel, so several consumers (the
//! workers of one department) can compete for items of one queue.

use std::sync::Arc;
use std::time::Duration;

use async_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};

use crate::{ContractError, QueueError};

/// Fixed-capacity FIFO queue
///
/// Cloning yields another handle to the same queue.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    name: Arc<str>,
    capacity: usize,
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> Clone for BoundedQueue<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            capacity: self.capacity,
            tx: self.tx.clone(),
            rx: self.rx.clone(),
        }
    }
}

impl<T> BoundedQueue<T> {
    /// Create a queue
    ///
    /// # Errors
    /// A zero capacity is an initialization failure.
    pub fn new(name: impl Into<String>, capacity: usize) -> Result<Self, ContractError> {
        let name: String = name.into();
        if capacity == 0 {
            return Err(ContractError::initialization(
                name,
                "queue capacity must be at least 1",
            ));
        }
        let (tx, rx) = bounded(capacity);
        Ok(Self {
            name: name.into(),
            capacity,
            tx,
            rx,
        })
    }

    /// Queue name (used in logs and metrics)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fixed capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Items currently queued
    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.tx.is_full()
    }

    /// Free slots at this instant
    pub fn free_capacity(&self) -> usize {
        self.capacity.saturating_sub(self.len())
    }

    /// Enqueue without waiting
    pub fn try_push(&self, item: T) -> Result<(), QueueError> {
        match self.tx.try_send(item) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => Err(QueueError::Full {
                queue: self.name.to_string(),
            }),
            Err(TrySendError::Closed(_)) => Err(self.closed()),
        }
    }

    /// Enqueue, waiting at most `wait` for a free slot
    ///
    /// On timeout the item is dropped.
    pub async fn push_timeout(&self, item: T, wait: Duration) -> Result<(), QueueError> {
        match tokio::time::timeout(wait, self.tx.send(item)).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(_)) => Err(self.closed()),
            Err(_) => Err(QueueError::Timeout {
                queue: self.name.to_string(),
                waited: wait,
            }),
        }
    }

    /// Dequeue, waiting indefinitely
    ///
    /// Returns `None` only once every sender is gone, which cannot happen
    /// while any handle of this queue is alive.
    pub async fn pop(&self) -> Option<T> {
        self.rx.recv().await.ok()
    }

    /// Dequeue without waiting
    pub fn try_pop(&self) -> Option<T> {
        match self.rx.try_recv() {
            Ok(item) => Some(item),
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    fn closed(&self) -> QueueError {
        QueueError::Closed {
            queue: self.name.to_string(),
        }
    }
}
