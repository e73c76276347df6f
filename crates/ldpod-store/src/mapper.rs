//! Mapping between identifiers and files on disk.
//!
//! [`ExtensionBasedMapper`] infers content types from file extensions. A
//! document whose content type disagrees with its extension is stored with
//! a `$.<ext>` suffix (`card` as Turtle becomes `card$.ttl`), which the reverse
//! mapping strips again.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ldpod_types::vocab::{APPLICATION_N_TRIPLES, APPLICATION_OCTET_STREAM, TEXT_TURTLE};
use ldpod_types::{
    media_type_essence, trim_trailing_slashes, ResourceError, ResourceIdentifier, StoreResult,
};

use crate::mapping::{absolute_path, checked_relative_path, encode_uri_component};

/// Extensions and the content types they denote. The first extension listed
/// for a content type is the one used when a suffix has to be added.
const EXTENSIONS: &[(&str, &str)] = &[
    ("ttl", TEXT_TURTLE),
    ("acl", TEXT_TURTLE),
    ("meta", TEXT_TURTLE),
    ("nt", APPLICATION_N_TRIPLES),
    ("jsonld", "application/ld+json"),
    ("json", "application/json"),
    ("txt", "text/plain"),
    ("html", "text/html"),
    ("md", "text/markdown"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("svg", "image/svg+xml"),
    ("bin", APPLICATION_OCTET_STREAM),
];

/// Separator between a document name and the extension added for its content type.
const TYPE_SUFFIX: &str = "$.";

/// An identifier together with its backing file path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResourceLink {
    pub identifier: ResourceIdentifier,
    pub file_path: PathBuf,
    /// Inferred content type; `None` for containers.
    pub content_type: Option<String>,
}

/// Bidirectional identifier/file path mapping for one base and root.
pub trait FileIdentifierMapper: Send + Sync {
    /// The file path backing `identifier`. For documents, `content_type` is
    /// the type the data will be stored as, or `None` when reading.
    fn map_url_to_file_path(
        &self,
        identifier: &ResourceIdentifier,
        content_type: Option<&str>,
    ) -> StoreResult<ResourceLink>;

    /// The identifier backed by `file_path`.
    fn map_file_path_to_url(&self, file_path: &Path, is_container: bool)
        -> StoreResult<ResourceLink>;
}

/// Creates mappers for a base identifier and a root directory.
pub trait FileIdentifierMapperFactory: Send + Sync {
    fn create(&self, base: &str, root: &Path) -> StoreResult<Arc<dyn FileIdentifierMapper>>;
}

/// Content type of a file name, from its extension.
pub fn content_type_for_name(name: &str) -> &'static str {
    name.rsplit_once('.')
        .and_then(|(_, ext)| lookup_extension(ext))
        .unwrap_or(APPLICATION_OCTET_STREAM)
}

fn lookup_extension(ext: &str) -> Option<&'static str> {
    let ext = ext.to_ascii_lowercase();
    EXTENSIONS.iter().find(|(e, _)| *e == ext).map(|(_, ct)| *ct)
}

fn extension_for(content_type: &str) -> Option<&'static str> {
    let essence = media_type_essence(content_type);
    EXTENSIONS.iter().find(|(_, ct)| *ct == essence).map(|(e, _)| *e)
}

/// Mapper that derives content types from file extensions.
#[derive(Clone, Debug)]
pub struct ExtensionBasedMapper {
    base: String,
    root: PathBuf,
}

impl ExtensionBasedMapper {
    pub fn new(base: &str, root: impl Into<PathBuf>) -> Self {
        Self {
            base: trim_trailing_slashes(base).to_string(),
            root: root.into(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FileIdentifierMapper for ExtensionBasedMapper {
    fn map_url_to_file_path(
        &self,
        identifier: &ResourceIdentifier,
        content_type: Option<&str>,
    ) -> StoreResult<ResourceLink> {
        let relative = checked_relative_path(&self.base, identifier)?;
        let mut file_path = absolute_path(&self.root, &relative);

        if identifier.is_container() {
            return Ok(ResourceLink {
                identifier: identifier.clone(),
                file_path,
                content_type: None,
            });
        }

        let name = relative.rsplit('/').next().unwrap_or_default().to_string();
        if name.contains(TYPE_SUFFIX) {
            return Err(ResourceError::BadRequest(format!(
                "{identifier} contains the reserved sequence {TYPE_SUFFIX}"
            )));
        }
        let inferred = content_type_for_name(&name);
        let content_type = match content_type {
            Some(ct) if media_type_essence(ct) != inferred => {
                let ext = extension_for(ct).ok_or_else(|| {
                    ResourceError::UnsupportedMediaType(format!(
                        "no file extension known for {ct}"
                    ))
                })?;
                file_path.set_file_name(format!("{name}{TYPE_SUFFIX}{ext}"));
                media_type_essence(ct)
            }
            _ => inferred.to_string(),
        };

        Ok(ResourceLink {
            identifier: identifier.clone(),
            file_path,
            content_type: Some(content_type),
        })
    }

    fn map_file_path_to_url(
        &self,
        file_path: &Path,
        is_container: bool,
    ) -> StoreResult<ResourceLink> {
        let relative = file_path.strip_prefix(&self.root).map_err(|_| {
            ResourceError::Internal(format!(
                "{} is not inside {}",
                file_path.display(),
                self.root.display()
            ))
        })?;

        let mut segments = Vec::new();
        for component in relative.components() {
            let segment = component.as_os_str().to_str().ok_or_else(|| {
                ResourceError::Internal(format!("{} is not valid UTF-8", file_path.display()))
            })?;
            segments.push(segment.to_string());
        }

        let mut content_type = None;
        if !is_container {
            if let Some(last) = segments.last_mut() {
                match last.split_once(TYPE_SUFFIX) {
                    Some((name, ext)) => {
                        content_type = Some(
                            lookup_extension(ext)
                                .unwrap_or(APPLICATION_OCTET_STREAM)
                                .to_string(),
                        );
                        *last = name.to_string();
                    }
                    None => content_type = Some(content_type_for_name(last).to_string()),
                }
            }
        }

        let mut path = self.base.clone();
        for segment in &segments {
            path.push('/');
            path.push_str(&encode_uri_component(segment));
        }
        if is_container {
            path.push('/');
        }

        Ok(ResourceLink {
            identifier: ResourceIdentifier::new(path),
            file_path: file_path.to_path_buf(),
            content_type,
        })
    }
}

/// Factory for [`ExtensionBasedMapper`].
#[derive(Clone, Copy, Debug, Default)]
pub struct ExtensionBasedMapperFactory;

impl FileIdentifierMapperFactory for ExtensionBasedMapperFactory {
    fn create(&self, base: &str, root: &Path) -> StoreResult<Arc<dyn FileIdentifierMapper>> {
        Ok(Arc::new(ExtensionBasedMapper::new(base, root)))
    }
}
