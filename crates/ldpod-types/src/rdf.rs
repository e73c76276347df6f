//! Minimal RDF data model: terms and triples.
//!
//! Terms keep relative IRIs as written (`<>`, `<#me>`, `<card>`) until they
//! are resolved against the identifier of the resource they belong to. This
//! is how stored or templated metadata refers to "this resource" before the
//! concrete identifier is known.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An RDF term.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Term {
    NamedNode(String),
    BlankNode(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
}

impl Term {
    pub fn named(iri: impl Into<String>) -> Self {
        Self::NamedNode(iri.into())
    }

    pub fn blank(id: impl Into<String>) -> Self {
        Self::BlankNode(id.into())
    }

    /// A plain string literal.
    pub fn literal(value: impl Into<String>) -> Self {
        Self::Literal {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    /// The lexical value: the IRI, blank node label, or literal text.
    pub fn value(&self) -> &str {
        match self {
            Self::NamedNode(v) | Self::BlankNode(v) => v,
            Self::Literal { value, .. } => value,
        }
    }

    pub fn is_named_node(&self) -> bool {
        matches!(self, Self::NamedNode(_))
    }

    /// Resolve a relative named node against `base`. Other terms are returned unchanged.
    pub fn resolve(&self, base: &str) -> Self {
        match self {
            Self::NamedNode(iri) => Self::NamedNode(resolve_iri(iri, base)),
            Self::Literal {
                value,
                datatype: Some(dt),
                language,
            } => Self::Literal {
                value: value.clone(),
                datatype: Some(resolve_iri(dt, base)),
                language: language.clone(),
            },
            other => other.clone(),
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamedNode(iri) => write!(f, "<{iri}>"),
            Self::BlankNode(id) => write!(f, "_:{id}"),
            Self::Literal {
                value,
                datatype,
                language,
            } => {
                write!(f, "\"{}\"", escape_literal(value))?;
                if let Some(lang) = language {
                    write!(f, "@{lang}")
                } else if let Some(dt) = datatype {
                    write!(f, "^^<{dt}>")
                } else {
                    Ok(())
                }
            }
        }
    }
}

/// An RDF triple.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Resolve every relative IRI in the triple against `base`.
    pub fn resolve(&self, base: &str) -> Self {
        Self {
            subject: self.subject.resolve(base),
            predicate: self.predicate.resolve(base),
            object: self.object.resolve(base),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

/// Resolve an IRI reference against an absolute base IRI.
///
/// Handles the reference forms that occur in stored metadata: the empty
/// reference, fragments, network-path, absolute-path and path-relative
/// references. Dot segments are not collapsed; path safety is enforced by the
/// mapping layer, not here.
pub fn resolve_iri(reference: &str, base: &str) -> String {
    if has_scheme(reference) {
        return reference.to_string();
    }
    let base_doc = base.split('#').next().unwrap_or(base);
    if reference.is_empty() {
        return base_doc.to_string();
    }
    if reference.starts_with('#') {
        return format!("{base_doc}{reference}");
    }
    if let Some(rest) = reference.strip_prefix("//") {
        let scheme = base.split(':').next().unwrap_or("http");
        return format!("{scheme}://{rest}");
    }
    let base_path = base_doc.split('?').next().unwrap_or(base_doc);
    if reference.starts_with('/') {
        return format!("{}{reference}", origin(base_path));
    }
    match base_path.rfind('/') {
        Some(idx) if idx + 1 > origin(base_path).len() => {
            format!("{}{reference}", &base_path[..=idx])
        }
        _ => format!("{}/{reference}", origin(base_path)),
    }
}

fn has_scheme(iri: &str) -> bool {
    let Some(colon) = iri.find(':') else {
        return false;
    };
    let scheme = &iri[..colon];
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

/// `scheme://authority` of an absolute IRI, or the whole input if it has no authority.
fn origin(iri: &str) -> &str {
    match iri.find("://") {
        Some(idx) => {
            let after = idx + 3;
            match iri[after..].find('/') {
                Some(slash) => &iri[..after + slash],
                None => iri,
            }
        }
        None => iri,
    }
}

pub(crate) fn escape_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out
}
