use std::sync::Arc;

use async_trait::async_trait;
use ldpod_types::vocab::INTERNAL_QUADS;
use ldpod_types::{
    Patch, Representation, RepresentationMetadata, RepresentationPreferences, ResourceError,
    ResourceIdentifier, StoreResult,
};
use tracing::debug;

use crate::patch::Patcher;
use crate::traits::ResourceStore;

/// Decorator that implements `modify_resource` as read, patch, write.
///
/// A patch on an absent resource creates it from an empty graph. The
/// read-modify-write is not atomic: two concurrent patches of the same
/// resource can lose an update unless a [`crate::LockingStore`] sits above.
pub struct PatchingStore {
    source: Arc<dyn ResourceStore>,
    patcher: Arc<dyn Patcher>,
}

impl PatchingStore {
    pub fn new(source: Arc<dyn ResourceStore>, patcher: Arc<dyn Patcher>) -> Self {
        Self { source, patcher }
    }
}

#[async_trait]
impl ResourceStore for PatchingStore {
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
        self.source.set_representation(identifier, representation).await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<ResourceIdentifier> {
        self.source.add_resource(container, representation).await
    }

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<()> {
        self.source.delete_resource(identifier).await
    }

    async fn modify_resource(&self, identifier: &ResourceIdentifier, patch: &Patch) -> StoreResult<()> {
        let preferences = RepresentationPreferences::accepting(INTERNAL_QUADS);
        let (mut metadata, current) = match self.source.get_representation(identifier, &preferences).await {
            Ok(representation) if representation.binary() => {
                return Err(ResourceError::UnsupportedMediaType(format!(
                    "{identifier} is not stored as a graph and cannot be patched"
                )))
            }
            Ok(representation) => {
                let metadata = representation.metadata.clone();
                (metadata, representation.into_triples().await?)
            }
            Err(e) if e.is_not_found() => {
                debug!(identifier = %identifier, "patch creates resource");
                (RepresentationMetadata::new(identifier.clone()), Vec::new())
            }
            Err(e) => return Err(e),
        };

        let updated = self.patcher.apply(identifier, current, patch).await?;
        metadata.set_content_type(Some(INTERNAL_QUADS));
        debug!(identifier = %identifier, triples = updated.len(), "writing patched resource");
        self.source
            .set_representation(identifier, Representation::from_triples(metadata, updated))
            .await
    }
}
