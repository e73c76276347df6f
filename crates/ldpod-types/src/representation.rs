use std::fmt;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt, TryStreamExt};

use crate::error::{ResourceError, StoreResult};
use crate::metadata::RepresentationMetadata;
use crate::identifier::ResourceIdentifier;
use crate::rdf::{Term, Triple};

/// Single-pass stream of binary chunks.
pub type ByteStream = BoxStream<'static, StoreResult<Bytes>>;

/// Single-pass stream of triples.
pub type TripleStream = BoxStream<'static, StoreResult<Triple>>;

/// The payload of a representation.
pub enum RepresentationData {
    /// Opaque bytes in the format named by the metadata content type.
    Binary(ByteStream),
    /// Structured triples (`internal/quads`).
    Graph(TripleStream),
}

/// Metadata plus data for one resource, valid for one transfer.
///
/// The data is a stream that can be consumed once: every consuming method
/// takes `self`.
pub struct Representation {
    pub metadata: RepresentationMetadata,
    pub data: RepresentationData,
}

impl Representation {
    pub fn new(metadata: RepresentationMetadata, data: RepresentationData) -> Self {
        Self { metadata, data }
    }

    /// A binary representation holding `bytes`.
    pub fn from_bytes(metadata: RepresentationMetadata, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        let data = stream::once(async move { Ok(bytes) }).boxed();
        Self::new(metadata, RepresentationData::Binary(data))
    }

    /// A graph representation holding `triples`.
    pub fn from_triples(metadata: RepresentationMetadata, triples: Vec<Triple>) -> Self {
        let data = stream::iter(triples.into_iter().map(Ok)).boxed();
        Self::new(metadata, RepresentationData::Graph(data))
    }

    /// A binary representation with no data.
    pub fn empty(metadata: RepresentationMetadata) -> Self {
        Self::new(metadata, RepresentationData::Binary(stream::empty().boxed()))
    }

    /// Returns `true` for opaque binary payloads, `false` for graphs.
    pub fn binary(&self) -> bool {
        matches!(self.data, RepresentationData::Binary(_))
    }

    pub fn content_type(&self) -> Option<&str> {
        self.metadata.content_type()
    }

    /// Drain a binary payload into one buffer.
    pub async fn into_bytes(self) -> StoreResult<Bytes> {
        match self.data {
            RepresentationData::Binary(data) => {
                let buf = data
                    .try_fold(Vec::new(), |mut buf, chunk| async move {
                        buf.extend_from_slice(&chunk);
                        Ok(buf)
                    })
                    .await?;
                Ok(Bytes::from(buf))
            }
            RepresentationData::Graph(_) => Err(ResourceError::UnsupportedMediaType(format!(
                "expected binary data for {}",
                self.metadata.identifier()
            ))),
        }
    }

    /// Drain a binary payload as UTF-8 text.
    pub async fn into_text(self) -> StoreResult<String> {
        let bytes = self.into_bytes().await?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ResourceError::BadRequest(format!("data is not UTF-8: {e}")))
    }

    /// Drain a graph payload.
    pub async fn into_triples(self) -> StoreResult<Vec<Triple>> {
        match self.data {
            RepresentationData::Graph(data) => data.try_collect().await,
            RepresentationData::Binary(_) => Err(ResourceError::UnsupportedMediaType(format!(
                "expected graph data for {}",
                self.metadata.identifier()
            ))),
        }
    }

    /// Move the representation to `identifier`. Metadata and graph triples
    /// naming the old identifier are rewritten to name the new one.
    pub fn relocate(&mut self, identifier: &ResourceIdentifier) {
        let old = self.metadata.subject();
        self.metadata.set_identifier(identifier.clone());
        if let RepresentationData::Graph(data) = &mut self.data {
            let new = Term::named(identifier.path());
            let rename = move |term: Term| if term == old { new.clone() } else { term };
            let taken = std::mem::replace(data, stream::empty().boxed());
            *data = taken
                .map_ok(move |t| Triple::new(rename(t.subject), t.predicate, rename(t.object)))
                .boxed();
        }
    }

    /// Split into metadata and data.
    pub fn into_parts(self) -> (RepresentationMetadata, RepresentationData) {
        (self.metadata, self.data)
    }
}

impl fmt::Debug for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Representation")
            .field("identifier", self.metadata.identifier())
            .field("content_type", &self.content_type())
            .field("binary", &self.binary())
            .finish()
    }
}
