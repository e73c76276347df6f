use std::sync::Arc;

use async_trait::async_trait;
use ldpod_types::vocab::INTERNAL_QUADS;
use ldpod_types::{
    media_type_essence, Patch, Representation, RepresentationPreferences, ResourceError,
    ResourceIdentifier, StoreResult,
};
use tracing::debug;

use crate::containment::requests_container;
use crate::conversion::RepresentationConverter;
use crate::traits::ResourceStore;

/// Decorator that converts representations on the way in and out of a store.
///
/// Reads are converted when the caller does not accept the stored type.
/// Writes are converted to `in_type` (or `internal/quads` for container
/// bodies). At most one converter runs per call; converters are never chained.
pub struct ConvertingStore {
    source: Arc<dyn ResourceStore>,
    converters: Vec<Arc<dyn RepresentationConverter>>,
    in_type: Option<String>,
}

impl ConvertingStore {
    pub fn new(
        source: Arc<dyn ResourceStore>,
        converters: Vec<Arc<dyn RepresentationConverter>>,
    ) -> Self {
        Self {
            source,
            converters,
            in_type: None,
        }
    }

    /// Convert incoming documents to `in_type` before they reach the source.
    pub fn with_in_type(mut self, in_type: &str) -> Self {
        self.in_type = Some(in_type.to_string());
        self
    }

    fn find_converter(
        &self,
        input_type: &str,
        preferences: &RepresentationPreferences,
    ) -> Option<(&Arc<dyn RepresentationConverter>, String)> {
        self.converters
            .iter()
            .find_map(|c| c.output_type(input_type, preferences).map(|out| (c, out)))
    }

    async fn convert_for_write(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        is_container: bool,
    ) -> StoreResult<Representation> {
        let target = if is_container {
            Some(INTERNAL_QUADS)
        } else {
            self.in_type.as_deref()
        };
        let (Some(target), Some(input_type)) = (target, representation.content_type()) else {
            return Ok(representation);
        };
        if media_type_essence(input_type) == media_type_essence(target) {
            return Ok(representation);
        }

        let input_type = input_type.to_string();
        match self.find_converter(&input_type, &RepresentationPreferences::accepting(target)) {
            Some((converter, output_type)) => {
                debug!(identifier = %identifier, from = %input_type, to = %output_type, "converting on write");
                converter.convert(identifier, representation, &output_type).await
            }
            None if representation.binary() && !is_container => Ok(representation),
            None => Err(ResourceError::UnsupportedMediaType(format!(
                "cannot store {identifier} as {input_type}"
            ))),
        }
    }
}

#[async_trait]
impl ResourceStore for ConvertingStore {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> StoreResult<Representation> {
        let representation = self.source.get_representation(identifier, preferences).await?;
        let Some(stored_type) = representation.content_type().map(str::to_string) else {
            return Ok(representation);
        };
        if preferences.is_empty() || preferences.accepts(&stored_type) {
            return Ok(representation);
        }

        match self.find_converter(&stored_type, preferences) {
            Some((converter, output_type)) => {
                debug!(identifier = %identifier, from = %stored_type, to = %output_type, "converting on read");
                converter.convert(identifier, representation, &output_type).await
            }
            None => Err(ResourceError::NotAcceptable(format!(
                "{identifier} is stored as {stored_type}, which the reader does not accept"
            ))),
        }
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<()> {
        let representation = self
            .convert_for_write(identifier, representation, identifier.is_container())
            .await?;
        self.source.set_representation(identifier, representation).await
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<ResourceIdentifier> {
        let is_container = requests_container(&representation.metadata);
        // Resolve against the provisional identifier; the backend relocates
        // the body once the new name is known.
        let provisional = representation.metadata.identifier().clone();
        let representation = self
            .convert_for_write(&provisional, representation, is_container)
            .await?;
        self.source.add_resource(container, representation).await
    }

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<()> {
        self.source.delete_resource(identifier).await
    }

    async fn modify_resource(&self, identifier: &ResourceIdentifier, patch: &Patch) -> StoreResult<()> {
        self.source.modify_resource(identifier, patch).await
    }
}
