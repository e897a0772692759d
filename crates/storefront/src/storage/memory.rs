//! In-memory origin shared by any number of contexts.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::RwLock;
use tokio::sync::broadcast;

use super::{
    ContextId, EVENT_CAPACITY, Envelope, SlotStore, StorageError, StorageEvent, StorageEvents,
};

/// A per-origin store held in memory.
///
/// Each call to [`MemoryOrigin::context`] opens a new browsing-context handle.
/// Writes through one handle are delivered as events to every other handle,
/// and only when the stored value actually changes.
#[derive(Debug, Clone)]
pub struct MemoryOrigin {
    inner: Arc<OriginInner>,
}

#[derive(Debug)]
struct OriginInner {
    slots: RwLock<HashMap<String, String>>,
    quota: Option<usize>,
    disabled: AtomicBool,
    next_context: AtomicU64,
    tx: broadcast::Sender<Envelope>,
}

impl MemoryOrigin {
    /// Create an empty origin without a quota.
    #[must_use]
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create an empty origin that holds at most `bytes` of keys and values.
    #[must_use]
    pub fn with_quota(bytes: usize) -> Self {
        Self::build(Some(bytes))
    }

    fn build(quota: Option<usize>) -> Self {
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(OriginInner {
                slots: RwLock::new(HashMap::new()),
                quota,
                disabled: AtomicBool::new(false),
                next_context: AtomicU64::new(1),
                tx,
            }),
        }
    }

    /// Open a new browsing context on this origin.
    #[must_use]
    pub fn context(&self) -> MemoryStorage {
        let id = self.inner.next_context.fetch_add(1, Ordering::Relaxed);
        MemoryStorage {
            origin: self.clone(),
            context: ContextId::new(id),
        }
    }

    /// Make every subsequent read and write fail with [`StorageError::Disabled`].
    pub fn disable(&self) {
        self.inner.disabled.store(true, Ordering::SeqCst);
    }

    /// Undo [`MemoryOrigin::disable`].
    pub fn enable(&self) {
        self.inner.disabled.store(false, Ordering::SeqCst);
    }

    /// Peek at a stored value, bypassing contexts.
    #[must_use]
    pub fn raw(&self, key: &str) -> Option<String> {
        self.inner.slots.read().get(key).cloned()
    }

    fn check_enabled(&self) -> Result<(), StorageError> {
        if self.inner.disabled.load(Ordering::SeqCst) {
            return Err(StorageError::Disabled);
        }
        Ok(())
    }
}

impl Default for MemoryOrigin {
    fn default() -> Self {
        Self::new()
    }
}

/// One browsing context on a [`MemoryOrigin`].
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    origin: MemoryOrigin,
    context: ContextId,
}

impl MemoryStorage {
    /// The id of this context.
    #[must_use]
    pub const fn context_id(&self) -> ContextId {
        self.context
    }

    /// The origin this context belongs to.
    #[must_use]
    pub const fn origin(&self) -> &MemoryOrigin {
        &self.origin
    }

    fn notify(&self, key: &str, new_value: Option<String>) {
        // No receivers is fine
        let _ = self.origin.inner.tx.send(Envelope {
            source: Some(self.context),
            event: StorageEvent {
                key: key.to_owned(),
                new_value,
            },
        });
    }
}

impl SlotStore for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.origin.check_enabled()?;
        Ok(self.origin.raw(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.origin.check_enabled()?;

        let previous = {
            let mut slots = self.origin.inner.slots.write();

            if let Some(limit) = self.origin.inner.quota {
                let others: usize = slots
                    .iter()
                    .filter(|(k, _)| k.as_str() != key)
                    .map(|(k, v)| k.len() + v.len())
                    .sum();
                let requested = others + key.len() + value.len();
                if requested > limit {
                    return Err(StorageError::QuotaExceeded { limit, requested });
                }
            }

            slots.insert(key.to_owned(), value.to_owned())
        };

        if previous.as_deref() != Some(value) {
            self.notify(key, Some(value.to_owned()));
        }
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.origin.check_enabled()?;
        let previous = self.origin.inner.slots.write().remove(key);
        if previous.is_some() {
            self.notify(key, None);
        }
        Ok(())
    }

    fn events(&self) -> StorageEvents {
        StorageEvents::new(Some(self.context), self.origin.inner.tx.subscribe())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_contexts_share_values() {
        let origin = MemoryOrigin::new();
        let a = origin.context();
        let b = origin.context();

        a.set("k", "v").unwrap();
        assert_eq!(b.get("k").unwrap().as_deref(), Some("v"));
        assert_ne!(a.context_id(), b.context_id());
    }

    #[test]
    fn test_events_skip_own_writes() {
        let origin = MemoryOrigin::new();
        let a = origin.context();
        let b = origin.context();
        let mut a_events = a.events();
        let mut b_events = b.events();

        a.set("k", "1").unwrap();

        assert!(a_events.try_next().is_none());
        let event = b_events.try_next().unwrap();
        assert_eq!(event.key, "k");
        assert_eq!(event.new_value.as_deref(), Some("1"));
        assert!(b_events.try_next().is_none());
    }

    #[test]
    fn test_unchanged_write_is_silent() {
        let origin = MemoryOrigin::new();
        let a = origin.context();
        let mut b_events = origin.context().events();

        a.set("k", "same").unwrap();
        a.set("k", "same").unwrap();

        assert!(b_events.try_next().is_some());
        assert!(b_events.try_next().is_none());
    }

    #[test]
    fn test_remove_emits_none() {
        let origin = MemoryOrigin::new();
        let a = origin.context();
        let mut b_events = origin.context().events();

        a.set("k", "v").unwrap();
        a.remove("k").unwrap();
        a.remove("k").unwrap();

        assert_eq!(b_events.try_next().unwrap().new_value.as_deref(), Some("v"));
        assert_eq!(b_events.try_next().unwrap().new_value, None);
        assert!(b_events.try_next().is_none());
        assert_eq!(origin.raw("k"), None);
    }

    #[test]
    fn test_quota_exceeded() {
        let origin = MemoryOrigin::with_quota(8);
        let ctx = origin.context();

        ctx.set("k", "1234").unwrap();
        let err = ctx.set("k", "123456789").unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { limit: 8, requested: 10 }));
        assert_eq!(origin.raw("k").as_deref(), Some("1234"));
    }

    #[test]
    fn test_disabled_storage() {
        let origin = MemoryOrigin::new();
        let ctx = origin.context();
        origin.disable();

        assert!(matches!(ctx.set("k", "v"), Err(StorageError::Disabled)));
        assert!(matches!(ctx.get("k"), Err(StorageError::Disabled)));

        origin.enable();
        assert!(ctx.set("k", "v").is_ok());
    }
}
