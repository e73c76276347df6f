use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use ldpod_types::{
    Patch, Representation, RepresentationPreferences, ResourceError, ResourceIdentifier,
    StoreResult,
};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

use crate::traits::ResourceStore;

/// Decorator that serializes writes per identifier.
///
/// Writes, deletes and patches of one identifier run one at a time; reads are
/// not locked. `add_resource` locks the target container only: the child
/// identifier is chosen by the wrapped store, so a concurrent
/// `set_representation` on that child is not serialized with the add. Lock
/// entries are removed once no task holds or waits for them.
pub struct LockingStore {
    source: Arc<dyn ResourceStore>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

struct ResourceLock<'a> {
    store: &'a LockingStore,
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for ResourceLock<'_> {
    fn drop(&mut self) {
        if let Ok(mut locks) = self.store.locks.lock() {
            // One reference in the map and one in our guard.
            if locks.get(&self.key).is_some_and(|m| Arc::strong_count(m) <= 2) {
                locks.remove(&self.key);
            }
        }
    }
}

impl LockingStore {
    pub fn new(source: Arc<dyn ResourceStore>) -> Self {
        Self {
            source,
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Number of identifiers currently locked or waited on.
    pub fn lock_count(&self) -> usize {
        self.locks.lock().map(|l| l.len()).unwrap_or(0)
    }

    async fn acquire(&self, identifier: &ResourceIdentifier) -> StoreResult<ResourceLock<'_>> {
        let key = identifier.path().to_string();
        let mutex = {
            let mut locks = self
                .locks
                .lock()
                .map_err(|e| ResourceError::Internal(format!("lock poisoned: {e}")))?;
            locks.entry(key.clone()).or_default().clone()
        };
        let guard = mutex.lock_owned().await;
        trace!(identifier = %identifier, "acquired resource lock");
        Ok(ResourceLock {
            store: self,
            key,
            _guard: guard,
        })
    }
}

#[async_trait]
impl ResourceStore for LockingStore {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> StoreResult<Representation> {
        self.source.get_representation(identifier, preferences).await
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<()> {
        let _lock = self.acquire(identifier).await?;
        self.source.set_representation(identifier, representation).await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<ResourceIdentifier> {
        let _lock = self.acquire(container).await?;
        self.source.add_resource(container, representation).await
    }

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<()> {
        let _lock = self.acquire(identifier).await?;
        self.source.delete_resource(identifier).await
    }

    async fn modify_resource(&self, identifier: &ResourceIdentifier, patch: &Patch) -> StoreResult<()> {
        let _lock = self.acquire(identifier).await?;
        self.source.modify_resource(identifier, patch).await
    }
}
