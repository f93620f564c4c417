use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::broadcast;

use super::{Blob, Container, Member, Representation, ResourceStore, StoreError, StoreEvent};
use crate::path::ResourcePath;

/// Buffered events per subscriber before the slowest one starts lagging
const EVENT_CAPACITY: usize = 256;

/// Blob paths (as segment lists) -> stored values.
///  Ordering keeps every descendant of a container contiguous.
type Entries = BTreeMap<Vec<String>, Representation>;

/// In-memory resource store
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<RwLock<Entries>>,
    events: broadcast::Sender<StoreEvent>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(RwLock::new(Entries::new())),
            events,
        }
    }

    /// Subscribe to write and delete notifications
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    /// Number of stored blobs
    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read()?.is_empty())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Entries>, StoreError> {
        self.inner
            .read()
            .map_err(|e| StoreError::Backend(anyhow!("failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Entries>, StoreError> {
        self.inner
            .write()
            .map_err(|e| StoreError::Backend(anyhow!("failed to acquire write lock: {}", e)))
    }

    fn emit(&self, event: StoreEvent) {
        // no subscribers is not an error
        let _ = self.events.send(event);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Keys strictly below the container `prefix`
fn descendants<'a>(
    entries: &'a Entries,
    prefix: &'a [String],
) -> impl Iterator<Item = &'a Vec<String>> + 'a {
    entries
        .range(prefix.to_vec()..)
        .map(|(key, _)| key)
        .take_while(move |key| key.starts_with(prefix))
        .filter(move |key| key.len() > prefix.len())
}

impl ResourceStore for MemoryStore {
    type Container = MemoryContainer;
    type Blob = MemoryBlob;

    fn container(&self, path: &ResourcePath) -> MemoryContainer {
        MemoryContainer {
            store: self.clone(),
            path: path.to_container(),
        }
    }

    fn blob(&self, path: &ResourcePath) -> MemoryBlob {
        MemoryBlob {
            store: self.clone(),
            path: path.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct MemoryContainer {
    store: MemoryStore,
    path: ResourcePath,
}

#[async_trait]
impl Container for MemoryContainer {
    fn path(&self) -> &ResourcePath {
        &self.path
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        let entries = self.store.read()?;
        let exists = descendants(&entries, self.path.segments()).next().is_some();
        Ok(exists)
    }

    async fn members(&self) -> Result<Vec<Member>, StoreError> {
        let entries = self.store.read()?;
        let depth = self.path.segments().len();

        // anything past the first remaining segment collapses into a sub-container
        let members: BTreeSet<Member> = descendants(&entries, self.path.segments())
            .map(|key| Member {
                name: key[depth].clone(),
                is_container: key.len() > depth + 1,
            })
            .collect();

        Ok(members.into_iter().collect())
    }

    async fn delete(&self) -> Result<(), StoreError> {
        let removed: Vec<Vec<String>> = {
            let mut entries = self.store.write()?;
            let keys: Vec<Vec<String>> = descendants(&entries, self.path.segments())
                .cloned()
                .collect();
            for key in &keys {
                entries.remove(key);
            }
            keys
        };

        if removed.is_empty() {
            return Err(StoreError::NotFound(self.path.clone()));
        }

        tracing::debug!(path = %self.path, count = removed.len(), "container deleted");
        for key in removed {
            if let Ok(path) = ResourcePath::new(key, false) {
                self.store.emit(StoreEvent::Deleted { path });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct MemoryBlob {
    store: MemoryStore,
    path: ResourcePath,
}

#[async_trait]
impl Blob for MemoryBlob {
    fn path(&self) -> &ResourcePath {
        &self.path
    }

    async fn exists(&self) -> Result<bool, StoreError> {
        if self.path.is_container() {
            return Ok(false);
        }
        let entries = self.store.read()?;
        Ok(entries.contains_key(self.path.segments()))
    }

    async fn data(&self) -> Result<Representation, StoreError> {
        let entries = self.store.read()?;
        entries
            .get(self.path.segments())
            .filter(|_| !self.path.is_container())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(self.path.clone()))
    }

    async fn set_data(
        &self,
        content_type: &str,
        body: Bytes,
    ) -> Result<Representation, StoreError> {
        if self.path.is_container() {
            return Err(StoreError::NotABlob(self.path.clone()));
        }

        let representation = Representation::for_write(&self.path, content_type, body);
        {
            let mut entries = self.store.write()?;
            entries.insert(self.path.segments().to_vec(), representation.clone());
        }

        tracing::debug!(path = %self.path, etag = %representation.etag(), "blob written");
        self.store.emit(StoreEvent::Written {
            path: self.path.clone(),
            etag: representation.etag().to_string(),
        });
        Ok(representation)
    }

    async fn delete(&self) -> Result<(), StoreError> {
        let removed = if self.path.is_container() {
            None
        } else {
            let mut entries = self.store.write()?;
            entries.remove(self.path.segments())
        };

        if removed.is_none() {
            return Err(StoreError::NotFound(self.path.clone()));
        }

        tracing::debug!(path = %self.path, "blob deleted");
        self.store.emit(StoreEvent::Deleted {
            path: self.path.clone(),
        });
        Ok(())
    }
}
