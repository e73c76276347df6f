use ldpod_store::mapping::encode_uri_component;
use ldpod_types::{ensure_trailing_slash, ResourceIdentifier};

/// Derives the root container of a new pod from a seed such as a login.
///
/// Generation is deterministic: the same seed always gives the same identifier.
pub trait IdentifierGenerator: Send + Sync {
    fn generate(&self, seed: &str) -> ResourceIdentifier;
}

/// Pods as child containers of the base: `http://host/` + `alice` gives `http://host/alice/`.
#[derive(Clone, Debug)]
pub struct SuffixIdentifierGenerator {
    base: String,
}

impl SuffixIdentifierGenerator {
    pub fn new(base: &str) -> Self {
        Self {
            base: ensure_trailing_slash(base),
        }
    }
}

impl IdentifierGenerator for SuffixIdentifierGenerator {
    fn generate(&self, seed: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(format!("{}{}/", self.base, encode_uri_component(seed)))
    }
}

/// Pods as subdomains of the base host: `http://host/` + `alice` gives `http://alice.host/`.
#[derive(Clone, Debug)]
pub struct SubdomainIdentifierGenerator {
    scheme: String,
    authority: String,
}

impl SubdomainIdentifierGenerator {
    pub fn new(base: &str) -> Self {
        let (scheme, rest) = base.split_once("://").unwrap_or(("http", base));
        let authority = rest.split('/').next().unwrap_or_default();
        Self {
            scheme: scheme.to_string(),
            authority: authority.to_string(),
        }
    }
}

impl IdentifierGenerator for SubdomainIdentifierGenerator {
    fn generate(&self, seed: &str) -> ResourceIdentifier {
        ResourceIdentifier::new(format!(
            "{}://{}.{}/",
            self.scheme,
            encode_uri_component(seed),
            self.authority
        ))
    }
}
