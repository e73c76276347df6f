//! Resource trees generated from a template folder.
//!
//! The folder is walked in pre-order: every directory is yielded as a
//! container before anything inside it, and entries are visited in name
//! order. A file named `X.meta` holds metadata for its sibling `X`, and
//! `.meta` inside a directory holds metadata for the directory itself. Both
//! are rendered through the template engine and parsed as triples; they are
//! never yielded as resources of their own.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::stream::{self, BoxStream, StreamExt};
use ldpod_store::{FileIdentifierMapper, FileIdentifierMapperFactory};
use ldpod_types::{
    ntriples, Representation, RepresentationMetadata, ResourceError, ResourceIdentifier,
    StoreResult,
};
use tracing::{debug, warn};

use crate::agent::TemplateParameters;
use crate::template::TemplateEngine;

const META_SUFFIX: &str = ".meta";

/// One generated resource.
#[derive(Debug)]
pub struct Resource {
    pub identifier: ResourceIdentifier,
    pub representation: Representation,
}

/// Produces the initial resources of a pod.
pub trait ResourcesGenerator: Send + Sync {
    /// Lazily generate the resources rooted at `location`, parents first.
    ///
    /// Each call walks the source again. The stream is single-pass; dropping
    /// it early releases everything it holds.
    fn generate(
        &self,
        location: &ResourceIdentifier,
        parameters: &TemplateParameters,
    ) -> BoxStream<'_, StoreResult<Resource>>;
}

/// [`ResourcesGenerator`] backed by a folder of templates.
pub struct TemplatedResourcesGenerator {
    template_folder: PathBuf,
    factory: Arc<dyn FileIdentifierMapperFactory>,
    engine: Arc<dyn TemplateEngine>,
}

impl TemplatedResourcesGenerator {
    pub fn new(
        template_folder: impl Into<PathBuf>,
        factory: Arc<dyn FileIdentifierMapperFactory>,
        engine: Arc<dyn TemplateEngine>,
    ) -> Self {
        Self {
            template_folder: template_folder.into(),
            factory,
            engine,
        }
    }

    pub fn template_folder(&self) -> &Path {
        &self.template_folder
    }
}

impl ResourcesGenerator for TemplatedResourcesGenerator {
    fn generate(
        &self,
        location: &ResourceIdentifier,
        parameters: &TemplateParameters,
    ) -> BoxStream<'_, StoreResult<Resource>> {
        let walk = Walk {
            generator: self,
            location: location.clone(),
            parameters: parameters.clone(),
            mapper: None,
            frames: Vec::new(),
        };
        stream::try_unfold(walk, Walk::step).boxed()
    }
}

struct Entry {
    path: PathBuf,
    is_dir: bool,
}

/// The listing of one directory being walked.
struct Frame {
    entries: VecDeque<Entry>,
    /// Sidecar paths keyed by the name of the entry they describe; the key
    /// `.meta` is the directory itself.
    sidecars: HashMap<String, PathBuf>,
}

struct Walk<'a> {
    generator: &'a TemplatedResourcesGenerator,
    location: ResourceIdentifier,
    parameters: TemplateParameters,
    /// Created on the first step; `None` until then.
    mapper: Option<Arc<dyn FileIdentifierMapper>>,
    frames: Vec<Frame>,
}

impl<'a> Walk<'a> {
    async fn step(mut self) -> StoreResult<Option<(Resource, Self)>> {
        let Some(mapper) = self.mapper.clone() else {
            let folder = self.generator.template_folder.clone();
            let mapper = self.generator.factory.create(self.location.path(), &folder)?;
            self.mapper = Some(mapper.clone());
            let resource = self.enter(&*mapper, &folder).await?;
            return Ok(Some((resource, self)));
        };

        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(None);
            };
            let Some(entry) = frame.entries.pop_front() else {
                self.frames.pop();
                continue;
            };

            let resource = if entry.is_dir {
                self.enter(&*mapper, &entry.path).await?
            } else {
                let sidecar = file_name(&entry.path).and_then(|name| frame.sidecars.remove(name));
                self.document(&*mapper, &entry.path, sidecar).await?
            };
            return Ok(Some((resource, self)));
        }
    }

    /// List `dir`, push its frame and return its container resource.
    async fn enter(&mut self, mapper: &dyn FileIdentifierMapper, dir: &Path) -> StoreResult<Resource> {
        let mut frame = list_directory(dir).await?;
        let link = mapper.map_file_path_to_url(dir, true)?;
        let mut metadata = RepresentationMetadata::new(link.identifier.clone());
        if let Some(sidecar) = frame.sidecars.remove(META_SUFFIX) {
            metadata.add_triples(self.sidecar_triples(&sidecar).await?);
        }
        debug!(identifier = %link.identifier, "generated container");
        self.frames.push(frame);
        Ok(Resource {
            identifier: link.identifier,
            representation: Representation::empty(metadata),
        })
    }

    async fn document(
        &self,
        mapper: &dyn FileIdentifierMapper,
        path: &Path,
        sidecar: Option<PathBuf>,
    ) -> StoreResult<Resource> {
        let link = mapper.map_file_path_to_url(path, false)?;
        let raw = tokio::fs::read(path).await.map_err(|e| read_error(path, e))?;
        let data = match String::from_utf8(raw) {
            Ok(text) => self.generator.engine.apply(&text, &self.parameters)?.into_bytes(),
            // Binary templates are copied unchanged.
            Err(e) => e.into_bytes(),
        };

        let mut metadata = RepresentationMetadata::new(link.identifier.clone());
        if let Some(sidecar) = sidecar {
            metadata.add_triples(self.sidecar_triples(&sidecar).await?);
        }
        metadata.set_content_type(link.content_type.as_deref());
        debug!(identifier = %link.identifier, "generated document");
        Ok(Resource {
            identifier: link.identifier,
            representation: Representation::from_bytes(metadata, data),
        })
    }

    async fn sidecar_triples(&self, path: &Path) -> StoreResult<Vec<ldpod_types::Triple>> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| read_error(path, e))?;
        let rendered = self.generator.engine.apply(&text, &self.parameters)?;
        ntriples::parse(&rendered)
    }
}

fn file_name(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}

fn read_error(path: &Path, e: std::io::Error) -> ResourceError {
    ResourceError::Internal(format!("cannot read template {}: {e}", path.display()))
}

/// Read a whole directory, splitting sidecars from resources. Entries are
/// sorted by name; sidecars without a sibling file are dropped with a warning.
async fn list_directory(dir: &Path) -> StoreResult<Frame> {
    let mut reader = tokio::fs::read_dir(dir).await.map_err(|e| read_error(dir, e))?;
    let mut entries = Vec::new();
    let mut sidecars = HashMap::new();

    while let Some(entry) = reader.next_entry().await.map_err(|e| read_error(dir, e))? {
        let path = entry.path();
        let Some(name) = file_name(&path).map(str::to_string) else {
            warn!(path = %path.display(), "skipping template with non UTF-8 name");
            continue;
        };
        let is_dir = entry
            .file_type()
            .await
            .map_err(|e| read_error(&path, e))?
            .is_dir();

        if !is_dir && name == META_SUFFIX {
            sidecars.insert(name, path);
        } else if let Some(owner) = name.strip_suffix(META_SUFFIX).filter(|_| !is_dir) {
            sidecars.insert(owner.to_string(), path);
        } else {
            entries.push((name, Entry { path, is_dir }));
        }
    }

    entries.sort_by(|(a, _), (b, _)| a.cmp(b));
    sidecars.retain(|owner, path| {
        let described = owner == META_SUFFIX
            || entries.iter().any(|(name, entry)| name == owner && !entry.is_dir);
        if !described {
            warn!(sidecar = %path.display(), "metadata file has no matching template; ignoring it");
        }
        described
    });

    Ok(Frame {
        entries: entries.into_iter().map(|(_, entry)| entry).collect(),
        sidecars,
    })
}
