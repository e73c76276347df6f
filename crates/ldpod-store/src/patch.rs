//! Patch application for the patching store.
//!
//! [`SparqlUpdatePatcher`] understands the data-only part of SPARQL Update:
//!
//! ```text
//! INSERT DATA { <> <http://xmlns.com/foaf/0.1/name> "Alice" . } ;
//! DELETE DATA { <> <http://xmlns.com/foaf/0.1/nick> "al" . } ;
//! DELETE { <> <http://x/p> "old" . } INSERT { <> <http://x/p> "new" . } WHERE { }
//! ```
//!
//! Blocks hold triples in the line syntax of [`ldpod_types::ntriples`].
//! Variables, `PREFIX` declarations and non-empty `WHERE` clauses are rejected.

use async_trait::async_trait;
use ldpod_types::vocab::APPLICATION_SPARQL_UPDATE;
use ldpod_types::{
    media_type_essence, ntriples, Patch, ResourceError, ResourceIdentifier, StoreResult, Triple,
};

/// Applies a patch to the current triples of a resource.
#[async_trait]
pub trait Patcher: Send + Sync {
    /// Return the triples after applying `patch` to `current`.
    ///
    /// A patch that cannot be parsed fails with `BadRequest` and one that
    /// cannot be applied fails with `Conflict`. Neither leaves partial results.
    async fn apply(
        &self,
        identifier: &ResourceIdentifier,
        current: Vec<Triple>,
        patch: &Patch,
    ) -> StoreResult<Vec<Triple>>;
}

/// One update operation: deletions are applied before insertions.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UpdateOperation {
    pub delete: Vec<Triple>,
    pub insert: Vec<Triple>,
}

/// Patcher for `application/sparql-update` bodies.
#[derive(Clone, Copy, Debug, Default)]
pub struct SparqlUpdatePatcher;

#[async_trait]
impl Patcher for SparqlUpdatePatcher {
    async fn apply(
        &self,
        identifier: &ResourceIdentifier,
        current: Vec<Triple>,
        patch: &Patch,
    ) -> StoreResult<Vec<Triple>> {
        if media_type_essence(&patch.content_type) != APPLICATION_SPARQL_UPDATE {
            return Err(ResourceError::UnsupportedMediaType(format!(
                "unsupported patch type {}",
                patch.content_type
            )));
        }
        let operations = parse_update(patch.body_text()?)?;
        apply_operations(identifier, current, &operations)
    }
}

/// Apply parsed operations in order. Relative IRIs resolve against `identifier`.
pub fn apply_operations(
    identifier: &ResourceIdentifier,
    mut triples: Vec<Triple>,
    operations: &[UpdateOperation],
) -> StoreResult<Vec<Triple>> {
    let base = identifier.path();
    for operation in operations {
        for triple in &operation.delete {
            let triple = triple.resolve(base);
            let Some(index) = triples.iter().position(|t| *t == triple) else {
                return Err(ResourceError::Conflict(format!(
                    "cannot delete {triple} from {identifier}: no such triple"
                )));
            };
            triples.remove(index);
        }
        for triple in &operation.insert {
            let triple = triple.resolve(base);
            if !triples.contains(&triple) {
                triples.push(triple);
            }
        }
    }
    Ok(triples)
}

/// Parse an update document into operations without applying anything.
pub fn parse_update(input: &str) -> StoreResult<Vec<UpdateOperation>> {
    let mut parser = UpdateParser { input, pos: 0 };
    let mut operations = Vec::new();
    loop {
        parser.skip_whitespace();
        if parser.at_end() {
            return Ok(operations);
        }
        operations.push(parser.operation()?);
        parser.skip_whitespace();
        match parser.peek() {
            None => return Ok(operations),
            Some(';') => parser.pos += 1,
            Some(c) => return Err(parser.error(format!("expected ';' between operations, found {c:?}"))),
        }
    }
}

struct UpdateParser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> UpdateParser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn error(&self, reason: impl Into<String>) -> ResourceError {
        ResourceError::BadRequest(format!(
            "invalid update at offset {}: {}",
            self.pos,
            reason.into()
        ))
    }

    fn skip_whitespace(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    /// Next keyword, upper-cased. Does not consume it.
    fn peek_keyword(&self) -> String {
        self.rest()
            .chars()
            .take_while(char::is_ascii_alphabetic)
            .collect::<String>()
            .to_ascii_uppercase()
    }

    fn keyword(&mut self, expected: &str) -> StoreResult<()> {
        self.skip_whitespace();
        let found = self.peek_keyword();
        if found != expected {
            return Err(self.error(format!("expected {expected}, found {found:?}")));
        }
        self.pos += expected.len();
        Ok(())
    }

    fn operation(&mut self) -> StoreResult<UpdateOperation> {
        match self.peek_keyword().as_str() {
            "INSERT" => {
                self.pos += "INSERT".len();
                self.skip_whitespace();
                if self.peek_keyword() == "DATA" {
                    self.pos += "DATA".len();
                    let insert = self.block()?;
                    return Ok(UpdateOperation { delete: Vec::new(), insert });
                }
                let insert = self.block()?;
                self.empty_where()?;
                Ok(UpdateOperation { delete: Vec::new(), insert })
            }
            "DELETE" => {
                self.pos += "DELETE".len();
                self.skip_whitespace();
                match self.peek_keyword().as_str() {
                    "DATA" => {
                        self.pos += "DATA".len();
                        let delete = self.block()?;
                        Ok(UpdateOperation { delete, insert: Vec::new() })
                    }
                    "WHERE" => Err(self.error("DELETE WHERE is not supported")),
                    _ => {
                        let delete = self.block()?;
                        self.skip_whitespace();
                        let insert = if self.peek_keyword() == "INSERT" {
                            self.pos += "INSERT".len();
                            self.block()?
                        } else {
                            Vec::new()
                        };
                        self.empty_where()?;
                        Ok(UpdateOperation { delete, insert })
                    }
                }
            }
            "" => Err(self.error("expected INSERT or DELETE")),
            other => Err(self.error(format!("unsupported operation {other}"))),
        }
    }

    fn empty_where(&mut self) -> StoreResult<()> {
        self.keyword("WHERE")?;
        if !self.block()?.is_empty() {
            return Err(self.error("only empty WHERE clauses are supported"));
        }
        Ok(())
    }

    /// A `{ ... }` block of triples. Braces inside IRIs and literals are
    /// skipped; nested groups are not allowed.
    fn block(&mut self) -> StoreResult<Vec<Triple>> {
        self.skip_whitespace();
        if self.peek() != Some('{') {
            return Err(self.error("expected '{'"));
        }
        self.pos += 1;
        let start = self.pos;

        let mut chars = self.rest().char_indices();
        let mut end = None;
        while let Some((offset, c)) = chars.next() {
            match c {
                '}' => {
                    end = Some(offset);
                    break;
                }
                '{' => return Err(self.error("nested groups are not supported")),
                '<' => {
                    for (_, c) in chars.by_ref() {
                        if c == '>' {
                            break;
                        }
                    }
                }
                '"' => {
                    while let Some((_, c)) = chars.next() {
                        match c {
                            '\\' => {
                                chars.next();
                            }
                            '"' => break,
                            _ => {}
                        }
                    }
                }
                _ => {}
            }
        }
        let Some(end) = end else {
            return Err(self.error("unterminated '{'"));
        };

        let body = self.input[start..start + end].trim();
        self.pos = start + end + 1;
        if body.is_empty() {
            return Ok(Vec::new());
        }
        let mut body = body.to_string();
        if !body.ends_with('.') {
            body.push_str(" .");
        }
        ntriples::parse(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldpod_types::{ErrorKind, Term};

    fn id() -> ResourceIdentifier {
        ResourceIdentifier::new("http://test.com/card")
    }

    fn triple(s: &str, p: &str, o: &str) -> Triple {
        Triple::new(Term::named(s), Term::named(p), Term::literal(o))
    }

    fn sparql(body: &str) -> Patch {
        Patch::new(APPLICATION_SPARQL_UPDATE, body.to_string())
    }

    // -----------------------------------------------------------------------
    // Parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parses_insert_data() {
        let ops = parse_update("INSERT DATA { <> <http://x/p> \"o\" }").unwrap();
        assert_eq!(ops.len(), 1);
        assert_eq!(ops[0].insert, vec![triple("", "http://x/p", "o")]);
        assert!(ops[0].delete.is_empty());
    }

    #[test]
    fn parses_sequences_case_insensitively() {
        let ops = parse_update(
            "delete data { <> <http://x/p> \"a\" . } ;\n insert data { <> <http://x/p> \"b\" . }",
        )
        .unwrap();
        assert_eq!(ops.len(), 2);
        assert_eq!(ops[0].delete.len(), 1);
        assert_eq!(ops[1].insert.len(), 1);
    }

    #[test]
    fn parses_delete_insert_where() {
        let ops = parse_update(
            "DELETE { <> <http://x/p> \"old\" } INSERT { <> <http://x/p> \"new\" } WHERE { }",
        )
        .unwrap();
        assert_eq!(ops[0].delete, vec![triple("", "http://x/p", "old")]);
        assert_eq!(ops[0].insert, vec![triple("", "http://x/p", "new")]);
    }

    #[test]
    fn braces_inside_literals_are_skipped() {
        let ops = parse_update("INSERT DATA { <> <http://x/p> \"{not a block}\" . }").unwrap();
        assert_eq!(ops[0].insert[0].object.value(), "{not a block}");
    }

    #[test]
    fn unsupported_forms_are_bad_requests() {
        for input in [
            "INSERT DATA { <> <http://x/p> \"o\" ",
            "INSERT { <> <http://x/p> \"o\" }",
            "INSERT { ?s <http://x/p> \"o\" } WHERE { ?s ?p ?o }",
            "DELETE WHERE { <> <http://x/p> \"o\" }",
            "LOAD <http://x/>",
            "INSERT DATA { GRAPH <g> { <> <http://x/p> \"o\" } }",
            "INSERT DATA { <> <http://x/p> } ",
            "INSERT DATA { } INSERT DATA { }",
        ] {
            let err = parse_update(input).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::BadRequest, "{input}");
        }
    }

    // -----------------------------------------------------------------------
    // Application
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn insert_resolves_against_identifier() {
        let out = SparqlUpdatePatcher
            .apply(&id(), Vec::new(), &sparql("INSERT DATA { <> <http://x/p> \"o\" . }"))
            .await
            .unwrap();
        assert_eq!(out, vec![triple("http://test.com/card", "http://x/p", "o")]);
    }

    #[tokio::test]
    async fn delete_then_insert_replaces() {
        let current = vec![triple("http://test.com/card", "http://x/p", "old")];
        let out = SparqlUpdatePatcher
            .apply(
                &id(),
                current,
                &sparql("DELETE { <> <http://x/p> \"old\" } INSERT { <> <http://x/p> \"new\" } WHERE {}"),
            )
            .await
            .unwrap();
        assert_eq!(out, vec![triple("http://test.com/card", "http://x/p", "new")]);
    }

    #[tokio::test]
    async fn deleting_absent_triple_is_conflict() {
        let err = SparqlUpdatePatcher
            .apply(&id(), Vec::new(), &sparql("DELETE DATA { <> <http://x/p> \"o\" . }"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn other_patch_types_are_unsupported() {
        let patch = Patch::new("text/n3", "@prefix solid: <http://www.w3.org/ns/solid/terms#>.");
        let err = SparqlUpdatePatcher.apply(&id(), Vec::new(), &patch).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedMediaType);
    }
}
