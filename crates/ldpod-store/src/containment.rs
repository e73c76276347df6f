//! Containment triples and child naming shared by the backends.

use ldpod_types::vocab::{
    LDP_BASIC_CONTAINER, LDP_CONTAINER, LDP_CONTAINS, LDP_RESOURCE, RDF_TYPE, SLUG,
};
use ldpod_types::{RepresentationMetadata, ResourceIdentifier, Term, Triple};

use crate::mapping::encode_uri_component;

/// Classes every container is typed with.
const CONTAINER_TYPES: &[&str] = &[LDP_CONTAINER, LDP_BASIC_CONTAINER, LDP_RESOURCE];

/// Server-managed triples of a container: its types and one `ldp:contains` per child.
pub fn container_triples(
    container: &ResourceIdentifier,
    children: impl IntoIterator<Item = ResourceIdentifier>,
) -> Vec<Triple> {
    let subject = Term::named(container.path());
    let mut triples: Vec<Triple> = CONTAINER_TYPES
        .iter()
        .map(|class| Triple::new(subject.clone(), Term::named(RDF_TYPE), Term::named(*class)))
        .collect();
    triples.extend(children.into_iter().map(|child| {
        Triple::new(subject.clone(), Term::named(LDP_CONTAINS), Term::named(child.path()))
    }));
    triples
}

/// Drop triples the store manages itself, so a container body read back and
/// written again does not persist stale containment.
pub fn strip_server_managed(container: &ResourceIdentifier, triples: Vec<Triple>) -> Vec<Triple> {
    let subject = Term::named(container.path());
    triples
        .into_iter()
        .filter(|t| {
            if t.subject != subject {
                return true;
            }
            let predicate = t.predicate.value();
            let managed_type =
                predicate == RDF_TYPE && CONTAINER_TYPES.contains(&t.object.value());
            predicate != LDP_CONTAINS && !managed_type
        })
        .collect()
}

/// Returns `true` if the metadata asks for the new resource to be a container.
pub fn requests_container(metadata: &RepresentationMetadata) -> bool {
    metadata.has_type(LDP_CONTAINER) || metadata.has_type(LDP_BASIC_CONTAINER)
}

/// Encoded name requested through the slug predicate, if any.
pub fn requested_slug(metadata: &RepresentationMetadata) -> Option<String> {
    let slug = metadata.get(SLUG)?.value().trim_matches('/');
    (!slug.is_empty()).then(|| encode_uri_component(slug))
}

/// A random child name.
pub fn generated_name() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(path: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(path)
    }

    #[test]
    fn container_triples_include_children() {
        let triples = container_triples(&id("http://a/c/"), vec![id("http://a/c/x"), id("http://a/c/y/")]);
        assert_eq!(triples.len(), 5);
        assert!(triples.iter().any(|t| t.predicate.value() == LDP_CONTAINS
            && t.object.value() == "http://a/c/y/"));
    }

    #[test]
    fn server_managed_triples_are_stripped() {
        let container = id("http://a/c/");
        let mut triples = container_triples(&container, vec![id("http://a/c/x")]);
        let label = Triple::new(
            Term::named("http://a/c/"),
            Term::named("http://www.w3.org/2000/01/rdf-schema#label"),
            Term::literal("C"),
        );
        triples.push(label.clone());
        assert_eq!(strip_server_managed(&container, triples), vec![label]);
    }

    #[test]
    fn slug_and_container_requests() {
        let mut meta = RepresentationMetadata::new(id("http://a/c/"));
        assert!(requested_slug(&meta).is_none());
        assert!(!requests_container(&meta));

        meta.add(SLUG, Term::literal("my container/"));
        meta.add(RDF_TYPE, Term::named(LDP_BASIC_CONTAINER));
        assert_eq!(requested_slug(&meta).as_deref(), Some("my%20container"));
        assert!(requests_container(&meta));
    }

    #[test]
    fn generated_names_are_unique() {
        assert_ne!(generated_name(), generated_name());
    }
}
