//! Filesystem-backed resource store.
//!
//! Containers are directories and documents are files. Metadata lives in a
//! sidecar holding N-Triples: `<file>.meta` for a document and `<dir>/.meta`
//! for a container. A document's media type is implied by its file name; the
//! sidecar repeats the content type only when it carries parameters such as
//! `charset`. Sidecars never show up as resources.

use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt, TryStreamExt};
use ldpod_types::vocab::{CONTENT_TYPE, INTERNAL_QUADS, SLUG};
use ldpod_types::{
    media_type_essence, ntriples, ByteStream, Patch, Representation, RepresentationData,
    RepresentationMetadata, RepresentationPreferences, ResourceError, ResourceIdentifier,
    StoreResult, Term, Triple,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, warn};

use crate::containment::{
    container_triples, generated_name, requested_slug, requests_container, strip_server_managed,
};
use crate::mapper::{ExtensionBasedMapper, FileIdentifierMapper};
use crate::mapping::{absolute_path, checked_relative_path, parent_path};
use crate::traits::ResourceStore;

const META_SUFFIX: &str = ".meta";
const TYPE_SUFFIX: &str = "$.";
const CHUNK_SIZE: usize = 64 * 1024;

/// Resource store rooted at a directory.
///
/// Only binary documents are accepted; graph payloads for documents must be
/// serialized first (see [`crate::ConvertingStore`]). Container bodies may be
/// graphs, which are kept as container metadata.
#[derive(Clone, Debug)]
pub struct FileResourceStore {
    mapper: ExtensionBasedMapper,
}

impl FileResourceStore {
    pub fn new(base: &str, root: impl Into<PathBuf>) -> Self {
        Self {
            mapper: ExtensionBasedMapper::new(base, root),
        }
    }

    pub fn root(&self) -> &Path {
        self.mapper.root()
    }

    fn relative(&self, identifier: &ResourceIdentifier) -> StoreResult<String> {
        let relative = checked_relative_path(self.mapper.base(), identifier)?;
        if !identifier.is_container() && relative.ends_with(META_SUFFIX) {
            return Err(ResourceError::BadRequest(format!(
                "{identifier} uses the reserved {META_SUFFIX} extension"
            )));
        }
        Ok(relative)
    }

    /// Directory that must exist before `relative` can be written.
    fn parent_dir(&self, relative: &str) -> Option<PathBuf> {
        parent_path(relative).map(|parent| absolute_path(self.root(), parent))
    }

    /// The file currently backing a document, with or without a type suffix.
    async fn find_document(&self, identifier: &ResourceIdentifier) -> StoreResult<Option<PathBuf>> {
        let plain = self.mapper.map_url_to_file_path(identifier, None)?.file_path;
        find_document_file(&plain).await
    }

    async fn ensure_parent(&self, identifier: &ResourceIdentifier, relative: &str) -> StoreResult<()> {
        let Some(parent) = self.parent_dir(relative) else {
            return Ok(());
        };
        match tokio::fs::metadata(&parent).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ResourceError::Conflict(format!(
                "parent of {identifier} is not a container"
            ))),
            Err(e) if e.kind() == IoErrorKind::NotFound => {
                if find_document_file(&parent).await?.is_some() {
                    return Err(ResourceError::Conflict(format!(
                        "parent of {identifier} is not a container"
                    )));
                }
                Err(ResourceError::NotFound(format!(
                    "parent container of {identifier} does not exist"
                )))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_container(&self, identifier: &ResourceIdentifier) -> StoreResult<Representation> {
        let dir = self.mapper.map_url_to_file_path(identifier, None)?.file_path;
        if !is_dir(&dir).await? {
            return Err(ResourceError::NotFound(identifier.to_string()));
        }

        let mut children = Vec::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                warn!(path = %path.display(), "skipping file with non UTF-8 name");
                continue;
            };
            if name.ends_with(META_SUFFIX) {
                continue;
            }
            let is_container = entry.file_type().await?.is_dir();
            children.push(self.mapper.map_file_path_to_url(&path, is_container)?.identifier);
        }
        children.sort_by(|a, b| a.path().cmp(b.path()));

        let stored = read_sidecar(&dir.join(META_SUFFIX)).await?;
        let mut metadata = RepresentationMetadata::new(identifier.clone());
        metadata.add_triples(stored.clone());
        metadata.add_triples(container_triples(identifier, Vec::new()));
        metadata.set_content_type(Some(INTERNAL_QUADS));

        let mut triples = stored;
        triples.extend(container_triples(identifier, children));
        Ok(Representation::from_triples(metadata, triples))
    }

    async fn get_document(&self, identifier: &ResourceIdentifier) -> StoreResult<Representation> {
        let Some(path) = self.find_document(identifier).await? else {
            return Err(ResourceError::NotFound(identifier.to_string()));
        };
        let content_type = self.mapper.map_file_path_to_url(&path, false)?.content_type;

        let mut metadata = RepresentationMetadata::new(identifier.clone());
        metadata.add_triples(read_sidecar(&document_sidecar(&path)).await?);
        // The sidecar only carries a content type when it has parameters.
        let kept = metadata.content_type().zip(content_type.as_deref()).is_some_and(
            |(stored, inferred)| media_type_essence(stored) == inferred,
        );
        if !kept {
            metadata.set_content_type(content_type.as_deref());
        }

        let file = tokio::fs::File::open(&path).await?;
        Ok(Representation::new(metadata, RepresentationData::Binary(file_stream(file))))
    }

    async fn set_container(
        &self,
        identifier: &ResourceIdentifier,
        metadata: RepresentationMetadata,
        data: RepresentationData,
    ) -> StoreResult<()> {
        let body = match data {
            RepresentationData::Graph(stream) => stream
                .map_ok(|t| t.resolve(identifier.path()))
                .try_collect::<Vec<_>>()
                .await?,
            RepresentationData::Binary(stream) => {
                let bytes = Representation::new(metadata.clone(), RepresentationData::Binary(stream))
                    .into_bytes()
                    .await?;
                if !bytes.is_empty() {
                    return Err(ResourceError::UnsupportedMediaType(format!(
                        "container body of {identifier} must be a graph"
                    )));
                }
                Vec::new()
            }
        };

        let dir = self.mapper.map_url_to_file_path(identifier, None)?.file_path;
        let twin = ResourceIdentifier::new(identifier.path().trim_end_matches('/'));
        if identifier.path() != twin.path()
            && checked_relative_path(self.mapper.base(), &twin).is_ok_and(|r| r != "/")
            && self.find_document(&twin).await?.is_some()
        {
            return Err(ResourceError::Conflict(format!(
                "{identifier} conflicts with an existing document"
            )));
        }

        tokio::fs::create_dir_all(&dir).await?;
        let mut triples = metadata.persistent_triples();
        for triple in body {
            if !triples.contains(&triple) {
                triples.push(triple);
            }
        }
        write_sidecar(&dir.join(META_SUFFIX), &strip_server_managed(identifier, triples)).await
    }

    async fn set_document(
        &self,
        identifier: &ResourceIdentifier,
        metadata: RepresentationMetadata,
        data: RepresentationData,
    ) -> StoreResult<()> {
        let RepresentationData::Binary(stream) = data else {
            return Err(ResourceError::UnsupportedMediaType(format!(
                "{identifier}: graph data must be serialized before it is stored on disk"
            )));
        };

        let link = self.mapper.map_url_to_file_path(identifier, metadata.content_type())?;
        let plain = self.mapper.map_url_to_file_path(identifier, None)?.file_path;
        if is_dir(&plain).await? {
            return Err(ResourceError::Conflict(format!(
                "{identifier} conflicts with an existing container"
            )));
        }

        if let Some(old) = self.find_document(identifier).await? {
            if old != link.file_path {
                debug!(old = %old.display(), new = %link.file_path.display(), "replacing document variant");
                remove_if_exists(&old).await?;
                remove_if_exists(&document_sidecar(&old)).await?;
            }
        }

        write_stream(&link.file_path, stream).await?;
        let mut sidecar = metadata.persistent_triples();
        if let (Some(full), Some(essence)) = (metadata.content_type(), link.content_type.as_deref()) {
            if full != essence {
                sidecar.push(Triple::new(
                    metadata.subject(),
                    Term::named(CONTENT_TYPE),
                    Term::literal(full),
                ));
            }
        }
        write_sidecar(&document_sidecar(&link.file_path), &sidecar).await
    }
}

#[async_trait]
impl ResourceStore for FileResourceStore {
    async fn get_representation(
        &self,
        identifier: &ResourceIdentifier,
        _preferences: &RepresentationPreferences,
    ) -> StoreResult<Representation> {
        self.relative(identifier)?;
        if identifier.is_container() {
            self.get_container(identifier).await
        } else {
            self.get_document(identifier).await
        }
    }

    async fn set_representation(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
    ) -> StoreResult<()> {
        let relative = self.relative(identifier)?;
        self.ensure_parent(identifier, &relative).await?;

        let (mut metadata, data) = representation.into_parts();
        metadata.set_identifier(identifier.clone());
        debug!(identifier = %identifier, "writing resource to disk");

        if identifier.is_container() {
            self.set_container(identifier, metadata, data).await
        } else {
            self.set_document(identifier, metadata, data).await
        }
    }

    async fn add_resource(
        &self,
        container: &ResourceIdentifier,
        mut representation: Representation,
    ) -> StoreResult<ResourceIdentifier> {
        self.relative(container)?;
        if !container.is_container() {
            if self.find_document(container).await?.is_some() {
                return Err(ResourceError::MethodNotAllowed(format!(
                    "{container} is not a container"
                )));
            }
            return Err(ResourceError::NotFound(container.to_string()));
        }
        let dir = self.mapper.map_url_to_file_path(container, None)?.file_path;
        if !is_dir(&dir).await? {
            return Err(ResourceError::NotFound(container.to_string()));
        }

        let is_container = requests_container(&representation.metadata);
        let name = match requested_slug(&representation.metadata) {
            Some(slug)
                if !self.has_resource(&container.child(&slug, false)).await?
                    && !self.has_resource(&container.child(&slug, true)).await? =>
            {
                slug
            }
            _ => generated_name(),
        };

        let identifier = container.child(&name, is_container);
        representation.metadata.remove_all(SLUG);
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

        if identifier.is_container() {
            let dir = self.mapper.map_url_to_file_path(identifier, None)?.file_path;
            if !is_dir(&dir).await? {
                return Err(ResourceError::NotFound(identifier.to_string()));
            }
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_name() != META_SUFFIX {
                    return Err(ResourceError::Conflict(format!(
                        "container {identifier} is not empty"
                    )));
                }
            }
            remove_if_exists(&dir.join(META_SUFFIX)).await?;
            tokio::fs::remove_dir(&dir).await?;
        } else {
            let Some(path) = self.find_document(identifier).await? else {
                return Err(ResourceError::NotFound(identifier.to_string()));
            };
            tokio::fs::remove_file(&path).await?;
            remove_if_exists(&document_sidecar(&path)).await?;
        }
        debug!(identifier = %identifier, "deleted resource from disk");
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

/// `plain`, or a `plain$.ext` sibling when the document is stored with a type suffix.
async fn find_document_file(plain: &Path) -> StoreResult<Option<PathBuf>> {
    if is_file(plain).await? {
        return Ok(Some(plain.to_path_buf()));
    }

    let (Some(dir), Some(name)) = (plain.parent(), plain.file_name().and_then(|n| n.to_str()))
    else {
        return Ok(None);
    };
    let prefix = format!("{name}{TYPE_SUFFIX}");
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == IoErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        let file_name = entry.file_name();
        let Some(file_name) = file_name.to_str() else {
            continue;
        };
        if file_name.starts_with(&prefix)
            && !file_name.ends_with(META_SUFFIX)
            && entry.file_type().await?.is_file()
        {
            return Ok(Some(entry.path()));
        }
    }
    Ok(None)
}

fn document_sidecar(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(META_SUFFIX);
    path.with_file_name(name)
}

async fn is_file(path: &Path) -> StoreResult<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_file()),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

async fn is_dir(path: &Path) -> StoreResult<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) => Ok(meta.is_dir()),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

async fn remove_if_exists(path: &Path) -> StoreResult<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

async fn read_sidecar(path: &Path) -> StoreResult<Vec<Triple>> {
    match tokio::fs::read_to_string(path).await {
        Ok(text) => ntriples::parse(&text).map_err(|e| {
            ResourceError::Internal(format!("corrupt metadata in {}: {e}", path.display()))
        }),
        Err(e) if e.kind() == IoErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

/// Write the sidecar, or remove it when there is nothing to keep.
async fn write_sidecar(path: &Path, triples: &[Triple]) -> StoreResult<()> {
    if triples.is_empty() {
        return remove_if_exists(path).await;
    }
    tokio::fs::write(path, ntriples::serialize(triples)).await?;
    Ok(())
}

async fn write_stream(path: &Path, mut data: ByteStream) -> StoreResult<()> {
    let mut file = tokio::fs::File::create(path).await?;
    let copied: StoreResult<()> = async {
        while let Some(chunk) = data.try_next().await? {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    if copied.is_err() {
        drop(file);
        remove_if_exists(path).await?;
    }
    copied
}

/// Chunked, lazy read of an open file.
fn file_stream(file: tokio::fs::File) -> ByteStream {
    stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; CHUNK_SIZE];
        let read = file.read(&mut buf).await?;
        if read == 0 {
            return Ok::<_, ResourceError>(None);
        }
        buf.truncate(read);
        Ok(Some((Bytes::from(buf), file)))
    })
    .boxed()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldpod_types::vocab::{LDP_BASIC_CONTAINER, LDP_CONTAINS, RDF_TYPE, TEXT_TURTLE};
    use ldpod_types::{ErrorKind, Term};

    const BASE: &str = "http://test.com/";

    fn id(path: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(path)
    }

    fn store() -> (tempfile::TempDir, FileResourceStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FileResourceStore::new(BASE, dir.path());
        (dir, store)
    }

    fn doc(ct: &str, body: &str) -> Representation {
        let meta = RepresentationMetadata::new(id("http://test.com/x")).with_content_type(ct);
        Representation::from_bytes(meta, body.to_string())
    }

    fn container() -> Representation {
        Representation::empty(RepresentationMetadata::new(id("http://test.com/x/")))
    }

    fn no_prefs() -> RepresentationPreferences {
        RepresentationPreferences::new()
    }

    // -----------------------------------------------------------------------
    // Documents
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn document_round_trip() {
        let (dir, store) = store();
        let target = id("http://test.com/notes.txt");
        store.set_representation(&target, doc("text/plain", "hello")).await.unwrap();
        assert!(dir.path().join("notes.txt").is_file());

        let repr = store.get_representation(&target, &no_prefs()).await.unwrap();
        assert_eq!(repr.content_type(), Some("text/plain"));
        assert_eq!(repr.into_text().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn content_type_parameters_survive() {
        let (dir, store) = store();
        let target = id("http://test.com/notes.txt");
        store
            .set_representation(&target, doc("text/plain; charset=utf-8", "hello"))
            .await
            .unwrap();
        assert!(dir.path().join("notes.txt").is_file());
        let repr = store.get_representation(&target, &no_prefs()).await.unwrap();
        assert_eq!(repr.content_type(), Some("text/plain; charset=utf-8"));

        store.set_representation(&target, doc("text/plain", "plain")).await.unwrap();
        let repr = store.get_representation(&target, &no_prefs()).await.unwrap();
        assert_eq!(repr.content_type(), Some("text/plain"));
        assert_eq!(repr.metadata.len(), 1);
    }

    #[tokio::test]
    async fn mismatched_type_is_suffixed_and_restored() {
        let (dir, store) = store();
        let target = id("http://test.com/card");
        store.set_representation(&target, doc(TEXT_TURTLE, "<a> <b> <c> .")).await.unwrap();
        assert!(dir.path().join("card$.ttl").is_file());

        let repr = store.get_representation(&target, &no_prefs()).await.unwrap();
        assert_eq!(repr.content_type(), Some(TEXT_TURTLE));

        store.set_representation(&target, doc("text/plain", "plain")).await.unwrap();
        assert!(!dir.path().join("card$.ttl").exists());
        let repr = store.get_representation(&target, &no_prefs()).await.unwrap();
        assert_eq!(repr.content_type(), Some("text/plain"));
        assert_eq!(repr.into_text().await.unwrap(), "plain");
    }

    #[tokio::test]
    async fn large_documents_stream_in_chunks() {
        let (_dir, store) = store();
        let target = id("http://test.com/blob.bin");
        let body = "x".repeat(CHUNK_SIZE * 2 + 10);
        store
            .set_representation(&target, doc("application/octet-stream", &body))
            .await
            .unwrap();

        let repr = store.get_representation(&target, &no_prefs()).await.unwrap();
        let RepresentationData::Binary(data) = repr.data else {
            panic!("expected binary data");
        };
        let chunks: Vec<Bytes> = data.try_collect().await.unwrap();
        assert!(chunks.len() >= 3);
        assert_eq!(chunks.iter().map(Bytes::len).sum::<usize>(), body.len());
    }

    #[tokio::test]
    async fn metadata_is_kept_in_sidecar() {
        let (dir, store) = store();
        let target = id("http://test.com/doc.txt");
        let mut meta = RepresentationMetadata::new(target.clone()).with_content_type("text/plain");
        meta.add("pre:has", Term::literal("value"));
        store
            .set_representation(&target, Representation::from_bytes(meta, "d"))
            .await
            .unwrap();
        assert!(dir.path().join("doc.txt.meta").is_file());

        let repr = store.get_representation(&target, &no_prefs()).await.unwrap();
        assert_eq!(repr.metadata.get("pre:has"), Some(&Term::literal("value")));
    }

    #[tokio::test]
    async fn graph_documents_are_rejected() {
        let (_dir, store) = store();
        let meta = RepresentationMetadata::new(id("http://test.com/g")).with_content_type(INTERNAL_QUADS);
        let err = store
            .set_representation(&id("http://test.com/g"), Representation::from_triples(meta, Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMediaType);
    }

    #[tokio::test]
    async fn sidecar_names_are_reserved() {
        let (_dir, store) = store();
        let err = store
            .set_representation(&id("http://test.com/doc.txt.meta"), doc("text/turtle", ""))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[tokio::test]
    async fn traversal_never_leaves_root() {
        let (dir, store) = store();
        let err = store
            .set_representation(&id("http://test.com/%2E%2E/escape.txt"), doc("text/plain", "x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::BadRequest);
        assert!(!dir.path().parent().unwrap().join("escape.txt").exists());
    }

    #[tokio::test]
    async fn root_aliases_are_rejected() {
        let (dir, store) = store();
        for alias in ["http://test.com/./", "http://test.com//", "http://test.com/%2E/"] {
            let err = store.delete_resource(&id(alias)).await.unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadRequest, "{alias}");

            let mut meta = RepresentationMetadata::new(id(alias));
            meta.add("http://x/p", Term::literal("alias"));
            let err = store
                .set_representation(&id(alias), Representation::empty(meta))
                .await
                .unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadRequest, "{alias}");
        }
        assert!(dir.path().is_dir());
        assert!(!dir.path().join(".meta").exists());

        let err = store.delete_resource(&id(BASE)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MethodNotAllowed);
    }

    // -----------------------------------------------------------------------
    // Containers
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn container_listing_hides_sidecars() {
        let (_dir, store) = store();
        store.set_representation(&id("http://test.com/c/"), container()).await.unwrap();
        store
            .set_representation(&id("http://test.com/c/card"), doc(TEXT_TURTLE, "<a> <b> <c> ."))
            .await
            .unwrap();
        store.set_representation(&id("http://test.com/c/sub/"), container()).await.unwrap();

        let repr = store.get_representation(&id("http://test.com/c/"), &no_prefs()).await.unwrap();
        assert!(repr.metadata.has_type(LDP_BASIC_CONTAINER));
        let contained: Vec<String> = repr
            .into_triples()
            .await
            .unwrap()
            .into_iter()
            .filter(|t| t.predicate.value() == LDP_CONTAINS)
            .map(|t| t.object.value().to_string())
            .collect();
        assert_eq!(contained, vec!["http://test.com/c/card", "http://test.com/c/sub/"]);
    }

    #[tokio::test]
    async fn container_write_needs_parent_and_no_twin() {
        let (_dir, store) = store();
        let err = store
            .set_representation(&id("http://test.com/a/b/"), container())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        store.set_representation(&id("http://test.com/a"), doc("text/plain", "a")).await.unwrap();
        let err = store.set_representation(&id("http://test.com/a/"), container()).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = store
            .set_representation(&id("http://test.com/a/b"), doc("text/plain", "b"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn container_metadata_round_trips() {
        let (_dir, store) = store();
        let target = id("http://test.com/c/");
        let mut meta = RepresentationMetadata::new(target.clone());
        meta.add("http://www.w3.org/2000/01/rdf-schema#label", Term::literal("C"));
        meta.add(RDF_TYPE, Term::named(LDP_BASIC_CONTAINER));
        store.set_representation(&target, Representation::empty(meta)).await.unwrap();

        let repr = store.get_representation(&target, &no_prefs()).await.unwrap();
        assert_eq!(
            repr.metadata.get("http://www.w3.org/2000/01/rdf-schema#label"),
            Some(&Term::literal("C"))
        );
        assert_eq!(repr.metadata.get_all(RDF_TYPE).len(), 3);
    }

    // -----------------------------------------------------------------------
    // add / delete
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn add_resource_honours_slug() {
        let (_dir, store) = store();
        let mut meta = RepresentationMetadata::new(id(BASE)).with_content_type("text/plain");
        meta.add(SLUG, Term::literal("hello.txt"));
        let created = store
            .add_resource(&id(BASE), Representation::from_bytes(meta.clone(), "1"))
            .await
            .unwrap();
        assert_eq!(created.path(), "http://test.com/hello.txt");

        let again = store
            .add_resource(&id(BASE), Representation::from_bytes(meta, "2"))
            .await
            .unwrap();
        assert_ne!(again, created);
    }

    #[tokio::test]
    async fn delete_document_and_container() {
        let (dir, store) = store();
        store.set_representation(&id("http://test.com/c/"), container()).await.unwrap();
        store
            .set_representation(&id("http://test.com/c/card"), doc(TEXT_TURTLE, "x"))
            .await
            .unwrap();

        let err = store.delete_resource(&id("http://test.com/c/")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        store.delete_resource(&id("http://test.com/c/card")).await.unwrap();
        store.delete_resource(&id("http://test.com/c/")).await.unwrap();
        assert!(!dir.path().join("c").exists());

        let err = store.delete_resource(&id("http://test.com/c/")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = store.delete_resource(&id(BASE)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MethodNotAllowed);
    }
}
