//! Directory-backed origin.
//!
//! Each key lives in its own `<key>.json` file under the origin root. Writes
//! go to a temporary sibling first and are renamed into place, so readers only
//! ever see whole values. Other processes writing the same directory are
//! picked up by [`FileStorage::poll_external`].

use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::{EVENT_CAPACITY, Envelope, SlotStore, StorageError, StorageEvent, StorageEvents};

/// A per-origin store rooted at a directory.
#[derive(Debug)]
pub struct FileStorage {
    root: PathBuf,
    /// Poll baseline per tracked key: the last value this context wrote or
    /// reported. Reads register a key but never advance its baseline.
    seen: Mutex<HashMap<String, Option<String>>>,
    tx: broadcast::Sender<Envelope>,
}

impl FileStorage {
    /// Open (and create if needed) an origin directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let (tx, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            root,
            seen: Mutex::new(HashMap::new()),
            tx,
        })
    }

    /// The origin directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{file}.json"))
    }

    fn read_file(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path_for(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn remember(&self, key: &str, value: Option<String>) {
        self.seen.lock().insert(key.to_owned(), value);
    }

    fn track(&self, key: &str) {
        self.seen.lock().entry(key.to_owned()).or_insert(None);
    }

    /// Compare every key this context has touched against disk and emit one
    /// event per key that another writer changed since.
    ///
    /// A key first seen through a read has an absent baseline, so a value
    /// already on disk is reported by the first poll.
    ///
    /// Returns the number of events emitted.
    pub fn poll_external(&self) -> usize {
        let keys: Vec<String> = self.seen.lock().keys().cloned().collect();
        let mut changed = 0;

        for key in keys {
            let current = match self.read_file(&key) {
                Ok(current) => current,
                Err(e) => {
                    tracing::warn!(key = %key, error = %e, "failed to poll storage key");
                    continue;
                }
            };

            let is_new = {
                let mut seen = self.seen.lock();
                let previous = seen.insert(key.clone(), current.clone());
                previous.as_ref() != Some(&current)
            };

            if is_new {
                tracing::debug!(key = %key, "external storage change detected");
                // No receivers is fine
                let _ = self.tx.send(Envelope {
                    source: None,
                    event: StorageEvent {
                        key,
                        new_value: current,
                    },
                });
                changed += 1;
            }
        }

        changed
    }
}

impl SlotStore for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value = self.read_file(key)?;
        self.track(key);
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let tmp = path.with_extension(format!("json.tmp-{}", std::process::id()));
        std::fs::write(&tmp, value)?;
        if let Err(e) = std::fs::rename(&tmp, &path) {
            let _ = std::fs::remove_file(&tmp);
            return Err(e.into());
        }
        self.remember(key, Some(value.to_owned()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        self.remember(key, None);
        Ok(())
    }

    fn events(&self) -> StorageEvents {
        StorageEvents::new(None, self.tx.subscribe())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        assert_eq!(storage.get("cart").unwrap(), None);
        storage.set("cart", "[]").unwrap();
        assert_eq!(storage.get("cart").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("cart.json").exists());

        storage.remove("cart").unwrap();
        storage.remove("cart").unwrap();
        assert_eq!(storage.get("cart").unwrap(), None);
    }

    #[test]
    fn test_key_is_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::open(dir.path()).unwrap();

        storage.set("../escape", "x").unwrap();
        assert!(dir.path().join("___escape.json").exists());
    }

    #[test]
    fn test_poll_detects_other_writer_only() {
        let dir = tempfile::tempdir().unwrap();
        let ours = FileStorage::open(dir.path()).unwrap();
        let theirs = FileStorage::open(dir.path()).unwrap();
        let mut events = ours.events();

        ours.set("cart", "[1]").unwrap();
        assert_eq!(ours.poll_external(), 0);
        assert!(events.try_next().is_none());

        theirs.set("cart", "[2]").unwrap();
        assert_eq!(ours.poll_external(), 1);
        assert_eq!(ours.poll_external(), 0);

        let event = events.try_next().unwrap();
        assert_eq!(event.key, "cart");
        assert_eq!(event.new_value.as_deref(), Some("[2]"));
    }

    #[test]
    fn test_reads_do_not_hide_external_writes() {
        let dir = tempfile::tempdir().unwrap();
        let ours = FileStorage::open(dir.path()).unwrap();
        let theirs = FileStorage::open(dir.path()).unwrap();
        let mut events = ours.events();

        ours.get("cart").unwrap();
        theirs.set("cart", "[2]").unwrap();
        assert_eq!(ours.get("cart").unwrap().as_deref(), Some("[2]"));

        assert_eq!(ours.poll_external(), 1);
        assert_eq!(events.try_next().unwrap().new_value.as_deref(), Some("[2]"));
        assert_eq!(ours.poll_external(), 0);
    }

    #[test]
    fn test_poll_only_watches_touched_keys() {
        let dir = tempfile::tempdir().unwrap();
        let ours = FileStorage::open(dir.path()).unwrap();
        let theirs = FileStorage::open(dir.path()).unwrap();

        theirs.set("other", "x").unwrap();
        assert_eq!(ours.poll_external(), 0);
    }

    #[test]
    fn test_poll_sees_removal() {
        let dir = tempfile::tempdir().unwrap();
        let ours = FileStorage::open(dir.path()).unwrap();
        let theirs = FileStorage::open(dir.path()).unwrap();
        let mut events = ours.events();

        theirs.set("cart", "[]").unwrap();
        ours.get("cart").unwrap();
        assert_eq!(ours.poll_external(), 1);
        assert_eq!(events.try_next().unwrap().new_value.as_deref(), Some("[]"));

        theirs.remove("cart").unwrap();
        assert_eq!(ours.poll_external(), 1);
        assert_eq!(events.try_next().unwrap().new_value, None);
    }
}
