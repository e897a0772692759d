//! Host key-value storage.
//!
//! A [`SlotStore`] is one browsing context's handle onto a per-origin durable
//! key-value store. Values are whole strings; a write replaces the value
//! atomically. Writes made through other contexts of the same origin surface
//! as [`StorageEvent`]s on [`SlotStore::events`]; a context never sees events
//! for its own writes.
//!
//! Two backends are provided:
//! - [`MemoryOrigin`] - shared in-memory origin, used as the test fake
//! - [`FileStorage`] - directory-backed origin with polled change detection

mod file;
mod memory;

use core::fmt;

use thiserror::Error;
use tokio::sync::broadcast;

pub use file::FileStorage;
pub use memory::{MemoryOrigin, MemoryStorage};

/// Capacity of the per-origin event channel.
const EVENT_CAPACITY: usize = 64;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Storage is turned off for this origin.
    #[error("storage is disabled")]
    Disabled,

    /// The write would exceed the origin's quota.
    #[error("quota exceeded: {requested} bytes requested, limit is {limit}")]
    QuotaExceeded {
        /// Quota in bytes.
        limit: usize,
        /// Bytes the origin would hold after the write.
        requested: usize,
    },

    /// Filesystem error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Identifies the browsing context that produced a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Create a context id.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}

/// A change made to the origin by some other context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that changed.
    pub key: String,
    /// New value, or `None` if the key was removed.
    pub new_value: Option<String>,
}

/// Event as carried on the origin channel, tagged with its writer.
#[derive(Debug, Clone)]
struct Envelope {
    /// `None` when the writer is outside this process.
    source: Option<ContextId>,
    event: StorageEvent,
}

/// One context's view of the origin's change notifications.
#[derive(Debug)]
pub struct StorageEvents {
    context: Option<ContextId>,
    rx: broadcast::Receiver<Envelope>,
}

impl StorageEvents {
    fn new(context: Option<ContextId>, rx: broadcast::Receiver<Envelope>) -> Self {
        Self { context, rx }
    }

    fn is_own(&self, envelope: &Envelope) -> bool {
        self.context.is_some() && envelope.source == self.context
    }

    /// Take the next pending external event without waiting.
    pub fn try_next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.try_recv() {
                Ok(envelope) if self.is_own(&envelope) => {}
                Ok(envelope) => return Some(envelope.event),
                Err(broadcast::error::TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "storage event receiver lagged");
                }
                Err(
                    broadcast::error::TryRecvError::Empty | broadcast::error::TryRecvError::Closed,
                ) => return None,
            }
        }
    }

    /// Wait for the next external event. Returns `None` once the origin is gone.
    pub async fn next(&mut self) -> Option<StorageEvent> {
        loop {
            match self.rx.recv().await {
                Ok(envelope) if self.is_own(&envelope) => {}
                Ok(envelope) => return Some(envelope.event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "storage event receiver lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// A browsing context's handle onto per-origin key-value storage.
pub trait SlotStore: Send + Sync + fmt::Debug {
    /// Fetch a value. Returns `Ok(None)` if the key does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if storage is unavailable.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Replace a value.
    ///
    /// # Errors
    ///
    /// Returns an error if storage is disabled, the quota would be exceeded,
    /// or the backend fails to write.
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Delete a value. Succeeds even if the key did not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if storage is unavailable.
    fn remove(&self, key: &str) -> Result<(), StorageError>;

    /// Subscribe to writes made by other contexts of the same origin.
    fn events(&self) -> StorageEvents;
}
