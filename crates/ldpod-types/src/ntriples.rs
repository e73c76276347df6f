//! Line-oriented triple syntax.
//!
//! Accepts N-Triples extended with the pieces that hand-written metadata
//! files use: relative IRIs (`<>`, `<#me>`), the `a` shorthand for
//! `rdf:type`, several statements on one line, and `#` comments. Output of
//! [`serialize`] is plain N-Triples, which is also valid Turtle.

use crate::error::{ResourceError, StoreResult};
use crate::rdf::{Term, Triple};
use crate::vocab::RDF_TYPE;

/// Parse a document into triples. Relative IRIs are kept as written.
///
/// # Examples
///
/// ```
/// use ldpod_types::ntriples::parse;
///
/// let triples = parse("<> <pre:has> \"metadata\".").unwrap();
/// assert_eq!(triples.len(), 1);
/// assert_eq!(triples[0].subject.value(), "");
/// assert!(parse("<> <pre:has>").is_err());
/// ```
pub fn parse(input: &str) -> StoreResult<Vec<Triple>> {
    let mut parser = Parser { input, pos: 0 };
    let mut triples = Vec::new();
    loop {
        parser.skip_trivia();
        if parser.at_end() {
            return Ok(triples);
        }
        triples.push(parser.statement()?);
    }
}

/// Serialize triples as N-Triples, one statement per line.
pub fn serialize(triples: &[Triple]) -> String {
    let mut out = String::new();
    for triple in triples {
        out.push_str(&triple.to_string());
        out.push('\n');
    }
    out
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn at_end(&self) -> bool {
        self.pos >= self.input.len()
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn error(&self, reason: impl Into<String>) -> ResourceError {
        ResourceError::BadRequest(format!(
            "invalid triple syntax at offset {}: {}",
            self.pos,
            reason.into()
        ))
    }

    fn expect(&mut self, expected: char) -> StoreResult<()> {
        match self.bump() {
            Some(c) if c == expected => Ok(()),
            Some(c) => Err(self.error(format!("expected {expected:?}, found {c:?}"))),
            None => Err(self.error(format!("expected {expected:?}, found end of input"))),
        }
    }

    /// Skip whitespace and comments.
    fn skip_trivia(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.bump();
            } else if c == '#' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn statement(&mut self) -> StoreResult<Triple> {
        let subject = match self.peek() {
            Some('<') => self.iri()?,
            Some('_') => self.blank_node()?,
            _ => return Err(self.error("subject must be an IRI or blank node")),
        };
        self.skip_trivia();
        let predicate = match self.peek() {
            Some('<') => self.iri()?,
            Some('a') if self.rest()[1..].starts_with(char::is_whitespace) => {
                self.bump();
                Term::named(RDF_TYPE)
            }
            _ => return Err(self.error("predicate must be an IRI")),
        };
        self.skip_trivia();
        let object = match self.peek() {
            Some('<') => self.iri()?,
            Some('_') => self.blank_node()?,
            Some('"') => self.literal()?,
            _ => return Err(self.error("object must be an IRI, blank node or literal")),
        };
        self.skip_trivia();
        self.expect('.')?;
        Ok(Triple::new(subject, predicate, object))
    }

    fn iri(&mut self) -> StoreResult<Term> {
        self.expect('<')?;
        let mut iri = String::new();
        loop {
            match self.bump() {
                Some('>') => return Ok(Term::NamedNode(iri)),
                Some('\\') => iri.push(self.unicode_escape()?),
                Some(c) if c.is_whitespace() => {
                    return Err(self.error("whitespace inside IRI"));
                }
                Some(c) => iri.push(c),
                None => return Err(self.error("unterminated IRI")),
            }
        }
    }

    fn blank_node(&mut self) -> StoreResult<Term> {
        self.expect('_')?;
        self.expect(':')?;
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '-' {
                self.bump();
            } else {
                break;
            }
        }
        if self.pos == start {
            return Err(self.error("empty blank node label"));
        }
        Ok(Term::BlankNode(self.input[start..self.pos].to_string()))
    }

    fn literal(&mut self) -> StoreResult<Term> {
        self.expect('"')?;
        let mut value = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => {
                    let escaped = match self.peek() {
                        Some('n') => '\n',
                        Some('r') => '\r',
                        Some('t') => '\t',
                        Some('b') => '\u{8}',
                        Some('f') => '\u{c}',
                        Some('"') => '"',
                        Some('\'') => '\'',
                        Some('\\') => '\\',
                        Some('u') | Some('U') => {
                            value.push(self.unicode_escape()?);
                            continue;
                        }
                        _ => return Err(self.error("invalid escape sequence")),
                    };
                    self.bump();
                    value.push(escaped);
                }
                Some(c) => value.push(c),
                None => return Err(self.error("unterminated literal")),
            }
        }

        let mut datatype = None;
        let mut language = None;
        if self.peek() == Some('@') {
            self.bump();
            let start = self.pos;
            while let Some(c) = self.peek() {
                if c.is_ascii_alphanumeric() || c == '-' {
                    self.bump();
                } else {
                    break;
                }
            }
            if self.pos == start {
                return Err(self.error("empty language tag"));
            }
            language = Some(self.input[start..self.pos].to_string());
        } else if self.rest().starts_with("^^") {
            self.pos += 2;
            match self.iri()? {
                Term::NamedNode(dt) => datatype = Some(dt),
                _ => return Err(self.error("datatype must be an IRI")),
            }
        }
        Ok(Term::Literal {
            value,
            datatype,
            language,
        })
    }

    /// Parse `uXXXX` or `UXXXXXXXX` following a backslash.
    fn unicode_escape(&mut self) -> StoreResult<char> {
        let width = match self.bump() {
            Some('u') => 4,
            Some('U') => 8,
            _ => return Err(self.error("expected unicode escape")),
        };
        let input = self.input;
        let end = self.pos + width;
        let hex = input
            .get(self.pos..end)
            .ok_or_else(|| self.error("truncated unicode escape"))?;
        let code = u32::from_str_radix(hex, 16).map_err(|_| self.error("invalid unicode escape"))?;
        self.pos = end;
        char::from_u32(code).ok_or_else(|| self.error("invalid code point"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_relative_subject() {
        let triples = parse("<> <pre:has> \"metadata\".").unwrap();
        assert_eq!(
            triples,
            vec![Triple::new(
                Term::named(""),
                Term::named("pre:has"),
                Term::literal("metadata")
            )]
        );
    }

    #[test]
    fn parse_multiple_statements_and_comments() {
        let input = "# profile\n\
            <#me> a <http://xmlns.com/foaf/0.1/Person> . <#me> <http://xmlns.com/foaf/0.1/name> \"Alice\"@en .\n\
            _:b0 <http://x/p> \"4\"^^<http://www.w3.org/2001/XMLSchema#integer> .";
        let triples = parse(input).unwrap();
        assert_eq!(triples.len(), 3);
        assert_eq!(triples[0].predicate, Term::named(RDF_TYPE));
        assert_eq!(
            triples[1].object,
            Term::Literal {
                value: "Alice".into(),
                datatype: None,
                language: Some("en".into()),
            }
        );
        assert_eq!(triples[2].subject, Term::blank("b0"));
    }

    #[test]
    fn parse_escapes() {
        let triples = parse(r#"<a> <b> "line\nbreak \"quoted\" é" ."#).unwrap();
        assert_eq!(triples[0].object.value(), "line\nbreak \"quoted\" é");
    }

    #[test]
    fn parse_empty_document() {
        assert!(parse("").unwrap().is_empty());
        assert!(parse("  \n# only a comment\n").unwrap().is_empty());
    }

    #[test]
    fn reject_malformed_input() {
        assert!(parse("<a> <b> <c>").is_err(), "missing terminator");
        assert!(parse("<a> <b> \"open .").is_err(), "unterminated literal");
        assert!(parse("\"lit\" <b> <c> .").is_err(), "literal subject");
        assert!(parse("<a b> <c> <d> .").is_err(), "whitespace in IRI");
        assert!(parse("<a> <b> _: .").is_err(), "empty blank label");
    }

    #[test]
    fn reject_is_bad_request() {
        let err = parse("<a>").unwrap_err();
        assert_eq!(err.kind(), crate::ErrorKind::BadRequest);
    }

    #[test]
    fn serialize_then_parse_preserves_triples() {
        let triples = vec![
            Triple::new(
                Term::named("http://a/b"),
                Term::named("http://a/p"),
                Term::literal("tab\there"),
            ),
            Triple::new(Term::blank("x"), Term::named("http://a/q"), Term::named("http://a/c")),
        ];
        let text = serialize(&triples);
        assert_eq!(text.lines().count(), 2);
        assert_eq!(parse(&text).unwrap(), triples);
    }
}
