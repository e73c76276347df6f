use async_trait::async_trait;
use ldpod_types::{
    Patch, Representation, RepresentationPreferences, ResourceIdentifier, StoreResult,
};

/// Identifier-addressed resource storage.
///
/// All implementations must satisfy these invariants:
/// - Every identifier accepted or returned passes the scope and traversal
///   checks in [`crate::mapping`].
/// - A container must exist before children are written into it.
/// - Failures are typed ([`ldpod_types::ErrorKind`]) at the point of detection
///   and decorators pass them through unchanged.
#[async_trait]
pub trait ResourceStore: Send + Sync {
    /// Read the resource at `identifier`.
    ///
    /// Fails with `NotFound` if no resource exists there. Backends may ignore
    /// `preferences`; converting layers honor them.
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        preferences: &RepresentationPreferences,
    ) -> StoreResult<Representation>;

    /// Create or fully replace the resource at `identifier`.
    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<()>;

    /// Store `representation` as a new child of `container` and return its identifier.
    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<ResourceIdentifier>;

    /// Remove the resource at `identifier`.
    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<()>;

    /// Apply a partial update. Bare backends reject this with `MethodNotAllowed`.
    async fn modify_resource(&self, identifier: &ResourceIdentifier, patch: &Patch)
        -> StoreResult<()>;

    /// Check whether a resource exists.
    ///
    /// `NotFound` becomes `false`; every other failure propagates.
    async fn has_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<bool> {
        match self
            .get_representation(identifier, &RepresentationPreferences::new())
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}
