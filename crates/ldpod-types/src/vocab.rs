//! IRIs and media types used across ldpod.

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

pub const LDP_CONTAINS: &str = "http://www.w3.org/ns/ldp#contains";
pub const LDP_CONTAINER: &str = "http://www.w3.org/ns/ldp#Container";
pub const LDP_BASIC_CONTAINER: &str = "http://www.w3.org/ns/ldp#BasicContainer";
pub const LDP_RESOURCE: &str = "http://www.w3.org/ns/ldp#Resource";

/// Predicate carrying a representation's content type inside its metadata.
pub const CONTENT_TYPE: &str = "http://www.w3.org/ns/ma-ont#format";

/// Predicate carrying the requested name of a resource created by `add_resource`.
pub const SLUG: &str = "http://www.w3.org/ns/solid/terms#slug";

pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";

/// Content type of graph payloads (`RepresentationData::Graph`).
pub const INTERNAL_QUADS: &str = "internal/quads";
pub const TEXT_TURTLE: &str = "text/turtle";
pub const APPLICATION_N_TRIPLES: &str = "application/n-triples";
pub const APPLICATION_OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_SPARQL_UPDATE: &str = "application/sparql-update";
