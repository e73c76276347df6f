//! Pod provisioning for ldpod.
//!
//! A pod is a container tree created for one [`Agent`]. The
//! [`GeneratedPodManager`] derives the pod root with an
//! [`IdentifierGenerator`], refuses to overwrite an existing resource, and
//! writes everything a [`ResourcesGenerator`] produces through whatever
//! [`ResourceStore`](ldpod_store::ResourceStore) stack it was given.

pub mod agent;
pub mod generator;
pub mod identifier;
pub mod manager;
pub mod template;

pub use agent::{Agent, TemplateParameters};
pub use generator::{Resource, ResourcesGenerator, TemplatedResourcesGenerator};
pub use identifier::{IdentifierGenerator, SubdomainIdentifierGenerator, SuffixIdentifierGenerator};
pub use manager::{GeneratedPodManager, PodManager};
pub use template::{MustacheTemplateEngine, TemplateEngine};
