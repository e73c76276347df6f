//! Resource storage for ldpod.
//!
//! Every backend and every decorator implements one trait,
//! [`ResourceStore`]. Decorators wrap an `Arc<dyn ResourceStore>` and add one
//! concern each, so they stack in any order:
//!
//! - [`InMemoryResourceStore`] -- map-backed store for tests and embedding
//! - [`FileResourceStore`] -- directory tree on disk with `.meta` sidecar files
//! - [`ConvertingStore`] -- content negotiation on read, canonical storage type on write
//! - [`PatchingStore`] -- turns a [`Patch`](ldpod_types::Patch) into a read-modify-write cycle
//! - [`LockingStore`] -- per-identifier mutual exclusion
//!
//! # Design Rules
//!
//! 1. Stores never manipulate identifiers as paths directly; they go through
//!    [`mapping`] so scope and traversal checks always run.
//! 2. Decorators propagate failures from the wrapped store unchanged.
//! 3. A bare store rejects patches; patch support comes from [`PatchingStore`].
//! 4. No layer except [`LockingStore`] provides isolation between concurrent writers.

pub mod containment;
pub mod conversion;
pub mod converting;
pub mod file;
pub mod locking;
pub mod mapper;
pub mod mapping;
pub mod memory;
pub mod patch;
pub mod patching;
pub mod traits;

pub use conversion::{GraphToRdfConverter, RdfToGraphConverter, RepresentationConverter};
pub use converting::ConvertingStore;
pub use file::FileResourceStore;
pub use locking::LockingStore;
pub use mapper::{
    ExtensionBasedMapper, ExtensionBasedMapperFactory, FileIdentifierMapper,
    FileIdentifierMapperFactory, ResourceLink,
};
pub use memory::InMemoryResourceStore;
pub use patch::{Patcher, SparqlUpdatePatcher, UpdateOperation};
pub use patching::PatchingStore;
pub use traits::ResourceStore;
