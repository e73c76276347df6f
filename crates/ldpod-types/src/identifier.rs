use std::fmt;

use serde::{Deserialize, Serialize};

/// Absolute path of a resource under a server base.
///
/// A trailing `/` denotes a container; its absence denotes a document.
/// Identifiers compare by exact string equality. No normalization happens
/// here; scope and traversal checks belong to the path mapping layer.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    path: String,
}

impl ResourceIdentifier {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns `true` if the identifier ends in the container separator.
    pub fn is_container(&self) -> bool {
        self.path.ends_with('/')
    }

    /// The same identifier with exactly one trailing slash.
    pub fn as_container(&self) -> Self {
        Self::new(ensure_trailing_slash(&self.path))
    }

    /// Identifier of a direct child of this container.
    pub fn child(&self, name: &str, is_container: bool) -> Self {
        let mut path = ensure_trailing_slash(&self.path);
        path.push_str(name.trim_matches('/'));
        if is_container {
            path.push('/');
        }
        Self::new(path)
    }

    pub fn into_string(self) -> String {
        self.path
    }
}

impl fmt::Debug for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ResourceIdentifier({})", self.path)
    }
}

impl fmt::Display for ResourceIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

impl From<&str> for ResourceIdentifier {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

impl From<String> for ResourceIdentifier {
    fn from(path: String) -> Self {
        Self::new(path)
    }
}

/// `path` with all trailing slashes replaced by a single one.
pub fn ensure_trailing_slash(path: &str) -> String {
    format!("{}/", trim_trailing_slashes(path))
}

/// `path` without any trailing slashes.
pub fn trim_trailing_slashes(path: &str) -> &str {
    path.trim_end_matches('/')
}
