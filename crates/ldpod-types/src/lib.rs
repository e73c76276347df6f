//! Foundation types for ldpod.
//!
//! Every other ldpod crate depends on `ldpod-types`. It defines the values
//! that flow across the storage boundary and the failure taxonomy every layer
//! reports with.
//!
//! # Key Types
//!
//! - [`ResourceIdentifier`] -- absolute path of a resource; a trailing `/` marks a container
//! - [`Term`] / [`Triple`] -- the RDF data model used for metadata and graph payloads
//! - [`RepresentationMetadata`] -- triples describing one resource, including its content type
//! - [`Representation`] -- metadata plus a single-pass binary or graph data stream
//! - [`RepresentationPreferences`] -- the media ranges a reader accepts
//! - [`Patch`] -- an opaque partial-update operand
//! - [`ResourceError`] -- the error taxonomy shared by stores, decorators and pod handling

pub mod error;
pub mod identifier;
pub mod metadata;
pub mod ntriples;
pub mod patch;
pub mod preferences;
pub mod rdf;
pub mod representation;
pub mod vocab;

pub use error::{ErrorKind, ResourceError, StoreResult};
pub use identifier::{ensure_trailing_slash, trim_trailing_slashes, ResourceIdentifier};
pub use metadata::RepresentationMetadata;
pub use patch::Patch;
pub use preferences::{media_type_essence, MediaRange, RepresentationPreferences};
pub use rdf::{resolve_iri, Term, Triple};
pub use representation::{ByteStream, Representation, RepresentationData, TripleStream};
