use crate::identifier::ResourceIdentifier;
use crate::rdf::{Term, Triple};
use crate::vocab::{CONTENT_TYPE, RDF_TYPE};

/// Triples describing one resource.
///
/// The subject of the metadata is always the owning identifier. The content
/// type is itself a triple (`ma:format`), so it is counted by [`Self::len`]
/// and appears in [`Self::triples`] like any other statement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepresentationMetadata {
    identifier: ResourceIdentifier,
    triples: Vec<Triple>,
}

impl RepresentationMetadata {
    pub fn new(identifier: ResourceIdentifier) -> Self {
        Self {
            identifier,
            triples: Vec::new(),
        }
    }

    pub fn with_content_type(mut self, content_type: &str) -> Self {
        self.set_content_type(Some(content_type));
        self
    }

    pub fn identifier(&self) -> &ResourceIdentifier {
        &self.identifier
    }

    /// The metadata subject as a term.
    pub fn subject(&self) -> Term {
        Term::named(self.identifier.path())
    }

    /// Move the metadata to a new identifier. Triples about the old
    /// identifier are rewritten to be about the new one.
    pub fn set_identifier(&mut self, identifier: ResourceIdentifier) {
        let old = self.subject();
        let new = Term::named(identifier.path());
        for triple in &mut self.triples {
            if triple.subject == old {
                triple.subject = new.clone();
            }
            if triple.object == old {
                triple.object = new.clone();
            }
        }
        self.identifier = identifier;
    }

    pub fn content_type(&self) -> Option<&str> {
        self.get(CONTENT_TYPE).map(Term::value)
    }

    pub fn set_content_type(&mut self, content_type: Option<&str>) {
        self.remove_all(CONTENT_TYPE);
        if let Some(ct) = content_type {
            self.add(CONTENT_TYPE, Term::literal(ct));
        }
    }

    /// Add `(self, predicate, object)` unless already present.
    pub fn add(&mut self, predicate: &str, object: Term) {
        let triple = Triple::new(self.subject(), Term::named(predicate), object);
        self.push_unique(triple);
    }

    /// Replace every value of `predicate` with `object`.
    pub fn set(&mut self, predicate: &str, object: Term) {
        self.remove_all(predicate);
        self.add(predicate, object);
    }

    /// First value of `predicate` about the subject.
    pub fn get(&self, predicate: &str) -> Option<&Term> {
        self.values(predicate).next()
    }

    pub fn get_all(&self, predicate: &str) -> Vec<&Term> {
        self.values(predicate).collect()
    }

    pub fn remove_all(&mut self, predicate: &str) {
        let subject = self.subject();
        self.triples
            .retain(|t| !(t.subject == subject && t.predicate.value() == predicate));
    }

    /// Returns `true` if the subject has `rdf:type` `class`.
    pub fn has_type(&self, class: &str) -> bool {
        self.values(RDF_TYPE).any(|t| t.value() == class)
    }

    /// Add triples after resolving relative IRIs against the identifier.
    ///
    /// This is where a stored self reference (`<>`) becomes the concrete
    /// identifier.
    pub fn add_triples<I>(&mut self, triples: I)
    where
        I: IntoIterator<Item = Triple>,
    {
        let base = self.identifier.path().to_string();
        for triple in triples {
            self.push_unique(triple.resolve(&base));
        }
    }

    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    /// Triples other than the content type, i.e. what a store persists beside the data.
    pub fn persistent_triples(&self) -> Vec<Triple> {
        self.triples
            .iter()
            .filter(|t| t.predicate.value() != CONTENT_TYPE)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    fn values<'a>(&'a self, predicate: &str) -> impl Iterator<Item = &'a Term> + 'a {
        let subject = self.identifier.path();
        let predicate = predicate.to_string();
        self.triples.iter().filter_map(move |t| {
            (t.subject.value() == subject
                && t.subject.is_named_node()
                && t.predicate.value() == predicate)
                .then_some(&t.object)
        })
    }

    fn push_unique(&mut self, triple: Triple) {
        if !self.triples.contains(&triple) {
            self.triples.push(triple);
        }
    }
}
