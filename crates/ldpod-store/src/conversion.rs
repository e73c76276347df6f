//! Content-type converters used by [`crate::ConvertingStore`].

use async_trait::async_trait;
use ldpod_types::vocab::{APPLICATION_N_TRIPLES, INTERNAL_QUADS, TEXT_TURTLE};
use ldpod_types::{
    media_type_essence, ntriples, Representation, RepresentationPreferences, ResourceError,
    ResourceIdentifier, StoreResult,
};

/// Converts representations between content types.
#[async_trait]
pub trait RepresentationConverter: Send + Sync {
    /// The content type this converter would produce from `input_type` for a
    /// reader with `preferences`, or `None` if it cannot help.
    fn output_type(&self, input_type: &str, preferences: &RepresentationPreferences)
        -> Option<String>;

    /// Convert `representation` to `output_type`, which must be a value
    /// previously returned by [`Self::output_type`].
    async fn convert(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        output_type: &str,
    ) -> StoreResult<Representation>;
}

const RDF_SERIALIZATIONS: &[&str] = &[TEXT_TURTLE, APPLICATION_N_TRIPLES];

/// Parses Turtle and N-Triples documents into `internal/quads`.
///
/// Only the N-Triples subset of Turtle is understood. Relative IRIs are
/// resolved against the identifier of the converted resource.
#[derive(Clone, Copy, Debug, Default)]
pub struct RdfToGraphConverter;

#[async_trait]
impl RepresentationConverter for RdfToGraphConverter {
    fn output_type(
        &self,
        input_type: &str,
        preferences: &RepresentationPreferences,
    ) -> Option<String> {
        let essence = media_type_essence(input_type);
        (RDF_SERIALIZATIONS.contains(&essence.as_str()) && preferences.accepts(INTERNAL_QUADS))
            .then(|| INTERNAL_QUADS.to_string())
    }

    async fn convert(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        output_type: &str,
    ) -> StoreResult<Representation> {
        if output_type != INTERNAL_QUADS {
            return Err(ResourceError::NotAcceptable(format!(
                "cannot convert {identifier} to {output_type}"
            )));
        }
        let mut metadata = representation.metadata.clone();
        let text = representation.into_text().await?;
        let triples = ntriples::parse(&text)?
            .iter()
            .map(|t| t.resolve(identifier.path()))
            .collect();
        metadata.set_content_type(Some(INTERNAL_QUADS));
        Ok(Representation::from_triples(metadata, triples))
    }
}

/// Serializes `internal/quads` as Turtle or N-Triples, whichever the reader
/// weighs higher.
#[derive(Clone, Copy, Debug, Default)]
pub struct GraphToRdfConverter;

#[async_trait]
impl RepresentationConverter for GraphToRdfConverter {
    fn output_type(
        &self,
        input_type: &str,
        preferences: &RepresentationPreferences,
    ) -> Option<String> {
        if media_type_essence(input_type) != INTERNAL_QUADS {
            return None;
        }
        RDF_SERIALIZATIONS
            .iter()
            .map(|ct| (*ct, preferences.weight_of(ct)))
            .filter(|(_, weight)| *weight > 0.0)
            .fold(None, |best: Option<(&str, f32)>, candidate| match best {
                Some((_, weight)) if weight >= candidate.1 => best,
                _ => Some(candidate),
            })
            .map(|(ct, _)| ct.to_string())
    }

    async fn convert(
        &self,
        identifier: &ResourceIdentifier,
        representation: Representation,
        output_type: &str,
    ) -> StoreResult<Representation> {
        if !RDF_SERIALIZATIONS.contains(&output_type) {
            return Err(ResourceError::NotAcceptable(format!(
                "cannot serialize {identifier} as {output_type}"
            )));
        }
        let mut metadata = representation.metadata.clone();
        let triples = representation.into_triples().await?;
        let body = ntriples::serialize(&triples);
        metadata.set_content_type(Some(output_type));
        Ok(Representation::from_bytes(metadata, body))
    }
}
