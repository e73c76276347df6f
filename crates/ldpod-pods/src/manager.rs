use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use ldpod_store::ResourceStore;
use ldpod_types::{RepresentationPreferences, ResourceError, ResourceIdentifier, StoreResult};
use tracing::info;

use crate::agent::Agent;
use crate::generator::ResourcesGenerator;
use crate::identifier::IdentifierGenerator;

/// Creates pods for agents.
#[async_trait]
pub trait PodManager: Send + Sync {
    /// Create the pod of `agent` and return its root container.
    async fn create_pod(&self, agent: &Agent) -> StoreResult<ResourceIdentifier>;
}

/// Pod manager that fills a new pod with generated resources.
///
/// Resources are written one at a time in generation order. A failed write
/// stops creation and is returned as is; resources written before it are
/// left in place.
pub struct GeneratedPodManager {
    store: Arc<dyn ResourceStore>,
    id_generator: Arc<dyn IdentifierGenerator>,
    resources_generator: Arc<dyn ResourcesGenerator>,
}

impl GeneratedPodManager {
    pub fn new(
        store: Arc<dyn ResourceStore>,
        id_generator: Arc<dyn IdentifierGenerator>,
        resources_generator: Arc<dyn ResourcesGenerator>,
    ) -> Self {
        Self {
            store,
            id_generator,
            resources_generator,
        }
    }
}

#[async_trait]
impl PodManager for GeneratedPodManager {
    async fn create_pod(&self, agent: &Agent) -> StoreResult<ResourceIdentifier> {
        let pod = self.id_generator.generate(&agent.login);
        info!(pod = %pod, "creating pod");

        match self
            .store
            .get_representation(&pod, &RepresentationPreferences::new())
            .await
        {
            Ok(existing) => {
                drop(existing);
                return Err(ResourceError::Conflict(format!(
                    "there already is a resource at {pod}"
                )));
            }
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }

        let parameters = agent.template_parameters();
        let mut resources = self.resources_generator.generate(&pod, &parameters);
        let mut count = 0usize;
        while let Some(resource) = resources.try_next().await? {
            self.store
                .set_representation(&resource.identifier, resource.representation)
                .await?;
            count += 1;
        }

        info!(pod = %pod, count, "added resources to pod");
        Ok(pod)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use ldpod_store::{
        ConvertingStore, ExtensionBasedMapperFactory, FileResourceStore, GraphToRdfConverter,
        InMemoryResourceStore, PatchingStore, RdfToGraphConverter, RepresentationConverter,
        SparqlUpdatePatcher,
    };
    use ldpod_types::vocab::{LDP_CONTAINS, TEXT_TURTLE};
    use ldpod_types::{ErrorKind, Patch, Representation, RepresentationMetadata};

    use crate::generator::TemplatedResourcesGenerator;
    use crate::identifier::SuffixIdentifierGenerator;
    use crate::template::MustacheTemplateEngine;

    const BASE: &str = "http://test.com/";

    fn converters() -> Vec<Arc<dyn RepresentationConverter>> {
        vec![Arc::new(RdfToGraphConverter), Arc::new(GraphToRdfConverter)]
    }

    /// A template folder with a profile card, its metadata and a settings container.
    fn template_folder() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::write(root.join(".meta"), "<> <http://www.w3.org/2000/01/rdf-schema#label> \"{{name}}\" .").unwrap();
        std::fs::create_dir(root.join("profile")).unwrap();
        std::fs::write(
            root.join("profile").join("card$.ttl"),
            "<{{webId}}> <http://xmlns.com/foaf/0.1/name> \"{{name}}\" .",
        )
        .unwrap();
        std::fs::write(
            root.join("profile").join("card$.ttl.meta"),
            "<> <http://x/describes> <{{webId}}> .",
        )
        .unwrap();
        std::fs::create_dir(root.join("settings")).unwrap();
        std::fs::write(root.join("settings").join("prefs.txt"), "theme=dark").unwrap();
        dir
    }

    fn manager(store: Arc<dyn ResourceStore>, templates: &std::path::Path) -> GeneratedPodManager {
        GeneratedPodManager::new(
            store,
            Arc::new(SuffixIdentifierGenerator::new(BASE)),
            Arc::new(TemplatedResourcesGenerator::new(
                templates,
                Arc::new(ExtensionBasedMapperFactory),
                Arc::new(MustacheTemplateEngine),
            )),
        )
    }

    fn alice() -> Agent {
        Agent::new("alice", "http://test.com/alice/profile/card#me").with_name("Alice")
    }

    fn id(path: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(path)
    }

    /// Store that counts writes and fails the one numbered `fail_at`.
    struct FailingStore {
        inner: InMemoryResourceStore,
        writes: AtomicUsize,
        fail_at: usize,
    }

    #[async_trait]
    impl ResourceStore for FailingStore {
        async fn get_representation(
            &self,
            identifier: &ResourceIdentifier,
            preferences: &RepresentationPreferences,
        ) -> StoreResult<ldpod_types::Representation> {
            self.inner.get_representation(identifier, preferences).await
        }

        async fn set_representation(
            &self,
            identifier: &ResourceIdentifier,
            representation: ldpod_types::Representation,
        ) -> StoreResult<()> {
            if self.writes.fetch_add(1, Ordering::SeqCst) + 1 == self.fail_at {
                return Err(ResourceError::Internal("disk full".into()));
            }
            self.inner.set_representation(identifier, representation).await
        }

        async fn add_resource(
            &self,
            container: &ResourceIdentifier,
            representation: ldpod_types::Representation,
        ) -> StoreResult<ResourceIdentifier> {
            self.inner.add_resource(container, representation).await
        }

        async fn delete_resource(&self, identifier: &ResourceIdentifier) -> StoreResult<()> {
            self.inner.delete_resource(identifier).await
        }

        async fn modify_resource(&self, identifier: &ResourceIdentifier, patch: &Patch) -> StoreResult<()> {
            self.inner.modify_resource(identifier, patch).await
        }
    }

    // -----------------------------------------------------------------------
    // Creation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn creates_pod_in_memory() {
        let templates = template_folder();
        let memory = Arc::new(InMemoryResourceStore::new(BASE));
        let pods = manager(memory.clone(), templates.path());

        let pod = pods.create_pod(&alice()).await.unwrap();
        assert_eq!(pod.path(), "http://test.com/alice/");

        let root = memory.get_representation(&pod, &RepresentationPreferences::new()).await.unwrap();
        assert_eq!(
            root.metadata.get("http://www.w3.org/2000/01/rdf-schema#label").map(|t| t.value()),
            Some("Alice")
        );
        let contained: Vec<String> = root
            .into_triples()
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.predicate.value() == LDP_CONTAINS)
            .map(|t| t.object.value().to_string())
            .collect();
        assert_eq!(contained, vec!["http://test.com/alice/profile/", "http://test.com/alice/settings/"]);

        let card = memory
            .get_representation(&id("http://test.com/alice/profile/card"), &RepresentationPreferences::new())
            .await
            .unwrap();
        assert_eq!(card.content_type(), Some(TEXT_TURTLE));
        assert_eq!(
            card.metadata.get("http://x/describes").map(|t| t.value()),
            Some("http://test.com/alice/profile/card#me")
        );
        assert_eq!(
            card.into_text().await.unwrap(),
            "<http://test.com/alice/profile/card#me> <http://xmlns.com/foaf/0.1/name> \"Alice\" ."
        );
    }

    #[tokio::test]
    async fn existing_pod_is_conflict() {
        let templates = template_folder();
        let memory = Arc::new(InMemoryResourceStore::new(BASE));
        let pods = manager(memory.clone(), templates.path());

        pods.create_pod(&alice()).await.unwrap();
        let before = memory.len();
        let err = pods.create_pod(&alice()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(memory.len(), before);
    }

    #[tokio::test]
    async fn probe_failures_other_than_not_found_propagate() {
        let templates = template_folder();
        let memory = Arc::new(InMemoryResourceStore::new(BASE));
        let pods = manager(memory, templates.path());

        let err = pods
            .create_pod(&Agent::new("..", "http://test.com/x#me"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn failed_write_leaves_earlier_resources() {
        let templates = template_folder();
        let store = Arc::new(FailingStore {
            inner: InMemoryResourceStore::new(BASE),
            writes: AtomicUsize::new(0),
            fail_at: 3,
        });
        let pods = manager(store.clone(), templates.path());

        let err = pods.create_pod(&alice()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(store.writes.load(Ordering::SeqCst), 3);
        assert!(store.inner.has_resource(&id("http://test.com/alice/profile/")).await.unwrap());
        assert!(!store.inner.has_resource(&id("http://test.com/alice/profile/card")).await.unwrap());
    }

    // -----------------------------------------------------------------------
    // Full stack
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn creates_pod_on_disk_and_serves_it() {
        let templates = template_folder();
        let data = tempfile::tempdir().unwrap();

        let disk = Arc::new(FileResourceStore::new(BASE, data.path()));
        let inner = Arc::new(ConvertingStore::new(disk, converters()).with_in_type(TEXT_TURTLE));
        let patching = Arc::new(PatchingStore::new(inner, Arc::new(SparqlUpdatePatcher)));
        let store: Arc<dyn ResourceStore> = Arc::new(ConvertingStore::new(patching, converters()));
        let pods = manager(store.clone(), templates.path());

        let pod = pods.create_pod(&alice()).await.unwrap();
        assert!(data.path().join("alice").join("profile").join("card$.ttl").is_file());
        assert!(data.path().join("alice").join("settings").join("prefs.txt").is_file());

        let card = id("http://test.com/alice/profile/card");
        store
            .modify_resource(
                &card,
                &Patch::new(
                    "application/sparql-update",
                    "INSERT DATA { <#me> <http://xmlns.com/foaf/0.1/nick> \"al\" . }",
                ),
            )
            .await
            .unwrap();
        let text = store
            .get_representation(&card, &RepresentationPreferences::accepting(TEXT_TURTLE))
            .await
            .unwrap()
            .into_text()
            .await
            .unwrap();
        assert!(text.contains("<http://test.com/alice/profile/card#me> <http://xmlns.com/foaf/0.1/nick> \"al\" ."));

        // A container created by the client inside the new pod.
        let mut meta = RepresentationMetadata::new(pod.clone()).with_content_type(TEXT_TURTLE);
        meta.add(ldpod_types::vocab::SLUG, ldpod_types::Term::literal("my-container"));
        meta.add(
            ldpod_types::vocab::RDF_TYPE,
            ldpod_types::Term::named(ldpod_types::vocab::LDP_BASIC_CONTAINER),
        );
        let created = store
            .add_resource(
                &pod,
                Representation::from_bytes(meta, "<> <http://www.w3.org/2000/01/rdf-schema#label> \"My Container\" ."),
            )
            .await
            .unwrap();
        assert_eq!(created.path(), "http://test.com/alice/my-container/");

        let listing = store
            .get_representation(&created, &RepresentationPreferences::accepting(TEXT_TURTLE))
            .await
            .unwrap()
            .into_text()
            .await
            .unwrap();
        assert!(listing.contains(
            "<http://test.com/alice/my-container/> <http://www.w3.org/2000/01/rdf-schema#label> \"My Container\" ."
        ));
    }
}
