use std::collections::{BTreeSet, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use ldpod_types::vocab::INTERNAL_QUADS;
use ldpod_types::{
    trim_trailing_slashes, Patch, Representation, RepresentationData, RepresentationMetadata,
    RepresentationPreferences, ResourceError, ResourceIdentifier, StoreResult, Triple,
};
use tracing::debug;

use crate::containment::{
    container_triples, generated_name, requested_slug, requests_container, strip_server_managed,
};
use crate::mapping::{checked_relative_path, parent_path};
use crate::traits::ResourceStore;

#[derive(Clone, Debug)]
enum StoredData {
    Binary(Bytes),
    Graph(Vec<Triple>),
}

#[derive(Clone, Debug)]
enum Entry {
    Container {
        metadata: Vec<Triple>,
        /// Relative paths of the direct children.
        children: BTreeSet<String>,
    },
    Document {
        content_type: Option<String>,
        metadata: Vec<Triple>,
        data: StoredData,
    },
}

/// In-memory, map-based resource store.
///
/// Intended for tests and embedding. Entries are keyed by the relative path
/// the mapping layer derives from each identifier and held behind a
/// `RwLock`; the lock is never held across an `.await`. The root container
/// exists from construction.
pub struct InMemoryResourceStore {
    base: String,
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryResourceStore {
    /// Create a store whose root container is `base`.
    pub fn new(base: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            "/".to_string(),
            Entry::Container {
                metadata: Vec::new(),
                children: BTreeSet::new(),
            },
        );
        Self {
            base: trim_trailing_slashes(base).to_string(),
            entries: RwLock::new(entries),
        }
    }

    /// Number of stored resources, including the root container.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Always `false`: the root container cannot be deleted.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn relative(&self, identifier: &ResourceIdentifier) -> StoreResult<String> {
        checked_relative_path(&self.base, identifier)
    }

    fn identifier_for(&self, relative: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(format!("{}{relative}", self.base))
    }

    fn poisoned<E: std::fmt::Display>(e: E) -> ResourceError {
        ResourceError::Internal(format!("lock poisoned: {e}"))
    }

    fn insert(
        &self,
        identifier: &ResourceIdentifier,
        relative: String,
        content_type: Option<String>,
        metadata: Vec<Triple>,
        data: StoredData,
    ) -> StoreResult<()> {
        let mut entries = self.entries.write().map_err(Self::poisoned)?;

        let parent = parent_path(&relative).map(str::to_string);
        if let Some(parent) = &parent {
            match entries.get(parent) {
                None => {
                    return Err(ResourceError::NotFound(format!(
                        "parent container of {identifier} does not exist"
                    )))
                }
                Some(Entry::Document { .. }) => {
                    return Err(ResourceError::Conflict(format!(
                        "parent of {identifier} is not a container"
                    )))
                }
                Some(Entry::Container { .. }) => {}
            }
        }

        let twin = if identifier.is_container() {
            trim_trailing_slashes(&relative).to_string()
        } else {
            format!("{relative}/")
        };
        if entries.contains_key(&twin) {
            return Err(ResourceError::Conflict(format!(
                "{identifier} conflicts with an existing resource of the other kind"
            )));
        }

        let entry = if identifier.is_container() {
            let mut metadata = metadata;
            if let StoredData::Graph(body) = data {
                for triple in body {
                    if !metadata.contains(&triple) {
                        metadata.push(triple);
                    }
                }
            }
            let metadata = strip_server_managed(identifier, metadata);
            let children = match entries.remove(&relative) {
                Some(Entry::Container { children, .. }) => children,
                _ => BTreeSet::new(),
            };
            Entry::Container { metadata, children }
        } else {
            Entry::Document {
                content_type,
                metadata,
                data,
            }
        };
        entries.insert(relative.clone(), entry);

        if let Some(parent) = parent {
            if let Some(Entry::Container { children, .. }) = entries.get_mut(&parent) {
                children.insert(relative);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryResourceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryResourceStore")
            .field("base", &self.base)
            .field("resource_count", &self.len())
            .finish()
    }
}

#[async_trait]
impl ResourceStore for InMemoryResourceStore {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        _preferences: &RepresentationPreferences,
    ) -> StoreResult<Representation> {
        let relative = self.relative(identifier)?;
        let entry = {
            let entries = self.entries.read().map_err(Self::poisoned)?;
            entries.get(&relative).cloned()
        };

        match entry {
            None => Err(ResourceError::NotFound(identifier.to_string())),
            Some(Entry::Container { metadata, children }) => {
                let children: Vec<ResourceIdentifier> =
                    children.iter().map(|c| self.identifier_for(c)).collect();
                let mut meta = RepresentationMetadata::new(identifier.clone());
                meta.add_triples(metadata.clone());
                meta.add_triples(container_triples(identifier, Vec::new()));
                meta.set_content_type(Some(INTERNAL_QUADS));

                let mut triples = metadata;
                triples.extend(container_triples(identifier, children));
                Ok(Representation::from_triples(meta, triples))
            }
            Some(Entry::Document {
                content_type,
                metadata,
                data,
            }) => {
                let mut meta = RepresentationMetadata::new(identifier.clone());
                meta.add_triples(metadata);
                meta.set_content_type(content_type.as_deref());
                Ok(match data {
                    StoredData::Binary(bytes) => Representation::from_bytes(meta, bytes),
                    StoredData::Graph(triples) => Representation::from_triples(meta, triples),
                })
            }
        }
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<()> {
        let relative = self.relative(identifier)?;
        let (mut metadata, data) = representation.into_parts();
        metadata.set_identifier(identifier.clone());

        let (content_type, data) = match data {
            RepresentationData::Binary(stream) => {
                let content_type = metadata.content_type().map(str::to_string);
                let bytes = Representation::new(metadata.clone(), RepresentationData::Binary(stream))
                    .into_bytes()
                    .await?;
                if !identifier.is_container() {
                    (content_type, StoredData::Binary(bytes))
                } else if bytes.is_empty() {
                    (None, StoredData::Graph(Vec::new()))
                } else {
                    return Err(ResourceError::UnsupportedMediaType(format!(
                        "container body of {identifier} must be a graph"
                    )));
                }
            }
            RepresentationData::Graph(stream) => {
                let triples = Representation::new(metadata.clone(), RepresentationData::Graph(stream))
                    .into_triples()
                    .await?
                    .iter()
                    .map(|t| t.resolve(identifier.path()))
                    .collect();
                (Some(INTERNAL_QUADS.to_string()), StoredData::Graph(triples))
            }
        };

        debug!(identifier = %identifier, "storing resource");
        self.insert(
            identifier,
            relative,
            content_type,
            metadata.persistent_triples(),
            data,
        )
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        mut representation: Representation,
    ) -> StoreResult<ResourceIdentifier> {
        let relative = self.relative(container)?;
        let existing = {
            let entries = self.entries.read().map_err(Self::poisoned)?;
            if !container.is_container() {
                if entries.contains_key(&relative) {
                    return Err(ResourceError::MethodNotAllowed(format!(
                        "{container} is not a container"
                    )));
                }
                return Err(ResourceError::NotFound(container.to_string()));
            }
            if !entries.contains_key(&relative) {
                return Err(ResourceError::NotFound(container.to_string()));
            }
            entries
                .get(&relative)
                .and_then(|e| match e {
                    Entry::Container { children, .. } => Some(children.clone()),
                    Entry::Document { .. } => None,
                })
                .unwrap_or_default()
        };

        let is_container = requests_container(&representation.metadata);
        let taken = |name: &str| {
            let base = format!("{relative}{name}");
            existing.contains(&base) || existing.contains(&format!("{base}/"))
        };
        let name = match requested_slug(&representation.metadata) {
            Some(slug) if !taken(&slug) => slug,
            _ => generated_name(),
        };

        let identifier = container.child(&name, is_container);
        representation.metadata.remove_all(ldpod_types::vocab::SLUG);
        representation.relocate(&identifier);
        self.set_representation(&identifier, representation).await?;
        Ok(identifier)
    }

    async fn delete_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<()> {
        let relative = self.relative(identifier)?;
        if relative == "/" {
            return Err(ResourceError::MethodNotAllowed(
                "cannot delete the root container".into(),
            ));
        }

        let mut entries = self.entries.write().map_err(Self::poisoned)?;
        match entries.get(&relative) {
            None => return Err(ResourceError::NotFound(identifier.to_string())),
            Some(Entry::Container { children, .. }) if !children.is_empty() => {
                return Err(ResourceError::Conflict(format!(
                    "container {identifier} is not empty"
                )))
            }
            Some(_) => {}
        }
        entries.remove(&relative);
        if let Some(parent) = parent_path(&relative) {
            if let Some(Entry::Container { children, .. }) = entries.get_mut(parent) {
                children.remove(&relative);
            }
        }
        debug!(identifier = %identifier, "deleted resource");
        Ok(())
    }

    async fn modify_resource(
        &self,
        identifier: &ResourceIdentifier,
        _patch: &Patch,
    ) -> StoreResult<()> {
        Err(ResourceError::MethodNotAllowed(format!(
            "patching {identifier} requires a patching store"
        )))
    }
}
