//! Recursive-descent Turtle parser.
//!
//! The parser pulls tokens from the [`Tokenizer`] one at a time, resolves
//! prefixes and the base IRI, and builds [`Triple`]s. Triples are emitted in
//! encounter order: the triples produced by a nested `[...]` property list
//! appear as soon as they are complete, before the triple that contains the
//! blank node.
//!
//! Parsing aborts on the first error; there is no recovery.

use crate::error::{TurtleError, TurtleErrorKind};
use crate::tokenizer::{Token, TokenKind, Tokenizer};
use oxilangtag::LanguageTag;
use oxiri::Iri as BaseIri;
use std::collections::{HashMap, VecDeque};
use terrapin_api::graph::Graph;
use terrapin_api::model::{BlankNode, Iri, Literal, Subject, Term, Triple};
use terrapin_api::vocab;

/// Parses a complete Turtle document into a [`Graph`].
///
/// The base IRI might be empty to state there is no base IRI; relative IRI
/// references are then kept as written.
///
/// ```
/// use terrapin_turtle::parse;
///
/// let graph = parse(
///     "@prefix ex: <http://example.com/> .\nex:s ex:p \"o\" .",
///     "",
/// )?;
/// assert_eq!(1, graph.len());
/// # Ok::<_, terrapin_turtle::TurtleError>(())
/// ```
pub fn parse(text: &str, base_iri: &str) -> Result<Graph, TurtleError> {
    TurtleParser::new(text, base_iri)?.collect()
}

/// Like [`parse`], with a pre-seeded prefix map.
pub fn parse_with_prefixes(
    text: &str,
    base_iri: &str,
    prefixes: impl IntoIterator<Item = (String, String)>,
) -> Result<Graph, TurtleError> {
    TurtleParser::new(text, base_iri)?
        .with_prefixes(prefixes)
        .collect()
}

/// A streaming Turtle parser.
///
/// It implements [`Iterator`] over `Result<Triple, TurtleError>`; after the
/// first error the iterator yields nothing more.
///
/// Count the people in a document:
/// ```
/// use terrapin_api::vocab;
/// use terrapin_turtle::TurtleParser;
///
/// let file = "@prefix schema: <http://schema.org/> .
/// <http://example.com/foo> a schema:Person ;
///     schema:name \"Foo\" .
/// <http://example.com/bar> a schema:Person ;
///     schema:name \"Bar\" .";
///
/// let mut count = 0;
/// for triple in TurtleParser::new(file, "")? {
///     let triple = triple?;
///     if triple.predicate.as_str() == vocab::rdf::TYPE {
///         count += 1;
///     }
/// }
/// assert_eq!(2, count);
/// # Ok::<_, terrapin_turtle::TurtleError>(())
/// ```
#[derive(Debug)]
pub struct TurtleParser<'a> {
    tokenizer: Tokenizer<'a>,
    current: Token,
    prefixes: HashMap<String, String>,
    base: Option<BaseIri<String>>,
    bnode_labels: HashMap<String, BlankNode>,
    queue: VecDeque<Triple>,
    done: bool,
}

impl<'a> TurtleParser<'a> {
    /// Builds the parser from the document text and a base IRI for relative
    /// IRI resolution. The base IRI might be empty to state there is none.
    pub fn new(text: &'a str, base_iri: &str) -> Result<Self, TurtleError> {
        let base = if base_iri.is_empty() {
            None
        } else {
            Some(
                BaseIri::parse(base_iri.to_owned()).map_err(|error| TurtleError {
                    kind: TurtleErrorKind::InvalidBaseIri {
                        iri: base_iri.to_owned(),
                        error,
                    },
                    line: 1,
                    column: 1,
                    token: base_iri.to_owned(),
                })?,
            )
        };
        let mut tokenizer = Tokenizer::new(text);
        let current = tokenizer.next_token()?;
        Ok(Self {
            tokenizer,
            current,
            prefixes: HashMap::default(),
            base,
            bnode_labels: HashMap::default(),
            queue: VecDeque::default(),
            done: false,
        })
    }

    /// Seeds the prefix map; `@prefix` directives in the document still
    /// overwrite seeded entries.
    pub fn with_prefixes(
        mut self,
        prefixes: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        self.prefixes.extend(prefixes);
        self
    }

    fn advance(&mut self) -> Result<(), TurtleError> {
        self.current = self.tokenizer.next_token()?;
        Ok(())
    }

    fn unexpected(&self, expected: &'static str) -> TurtleError {
        let kind = if self.current.kind == TokenKind::Eof {
            TurtleErrorKind::PrematureEof
        } else {
            TurtleErrorKind::UnexpectedToken { expected }
        };
        self.error_at(kind, &self.current.clone())
    }

    fn error_at(&self, kind: TurtleErrorKind, token: &Token) -> TurtleError {
        TurtleError {
            kind,
            line: token.line,
            column: token.column,
            token: token.lexeme.clone(),
        }
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str) -> Result<(), TurtleError> {
        if self.current.kind == kind {
            self.advance()
        } else {
            Err(self.unexpected(expected))
        }
    }

    // document ::= (prefixDecl | baseDecl | statement)* eof
    fn parse_statement(&mut self) -> Result<(), TurtleError> {
        match self.current.kind {
            TokenKind::PrefixDirective => self.parse_prefix_decl(),
            TokenKind::BaseDirective => self.parse_base_decl(),
            _ => self.parse_triples(),
        }
    }

    // prefixDecl ::= '@prefix' PNAME_NS IRIREF '.'
    fn parse_prefix_decl(&mut self) -> Result<(), TurtleError> {
        self.advance()?;
        if self.current.kind != TokenKind::PrefixedName || !self.current.lexeme.ends_with(':') {
            return Err(self.unexpected("a prefix name ending in ':'"));
        }
        let lexeme = &self.current.lexeme;
        let prefix = lexeme[..lexeme.len() - 1].to_owned();
        self.advance()?;

        if self.current.kind != TokenKind::IriRef {
            return Err(self.unexpected("an IRI reference"));
        }
        let token = self.current.clone();
        let iri = self.resolve(&unescape(iri_ref_content(&token.lexeme)), &token)?;
        self.advance()?;

        self.expect(TokenKind::Dot, "'.' closing the @prefix directive")?;
        self.prefixes.insert(prefix, iri.into_string());
        Ok(())
    }

    // baseDecl ::= '@base' IRIREF '.'
    //
    // Repeated directives are cumulative: a relative base resolves against
    // the previous one. IRIs resolved before this point keep their value.
    fn parse_base_decl(&mut self) -> Result<(), TurtleError> {
        self.advance()?;
        if self.current.kind != TokenKind::IriRef {
            return Err(self.unexpected("an IRI reference"));
        }
        let token = self.current.clone();
        let iri = unescape(iri_ref_content(&token.lexeme));
        let base = match &self.base {
            Some(base) => base.resolve(&iri),
            None => BaseIri::parse(iri.clone()),
        }
        .map_err(|error| self.error_at(TurtleErrorKind::InvalidBaseIri { iri, error }, &token))?;
        self.base = Some(base);
        self.advance()?;
        self.expect(TokenKind::Dot, "'.' closing the @base directive")
    }

    // statement ::= subject predicateObjectList '.'
    fn parse_triples(&mut self) -> Result<(), TurtleError> {
        match self.current.kind {
            TokenKind::OpenBracket => {
                let subject = self.parse_blank_node_property_list()?;
                // the outer predicate-object list is optional after [...]
                if self.current.kind != TokenKind::Dot {
                    self.parse_predicate_object_list(&Subject::BlankNode(subject))?;
                }
            }
            TokenKind::A => {
                return Err(self.error_at(TurtleErrorKind::AAsSubject, &self.current.clone()))
            }
            _ => {
                let subject = self.parse_subject()?;
                self.parse_predicate_object_list(&subject)?;
            }
        }
        self.expect(TokenKind::Dot, "'.' closing the statement")
    }

    // subject ::= iriRef | prefixedName | blankNodeLabel
    fn parse_subject(&mut self) -> Result<Subject, TurtleError> {
        match self.current.kind {
            TokenKind::IriRef | TokenKind::PrefixedName => Ok(Subject::Iri(self.parse_iri()?)),
            TokenKind::BlankNodeLabel => Ok(Subject::BlankNode(self.parse_blank_node_label()?)),
            _ => Err(self.unexpected("a subject (IRI, prefixed name, blank node or '[')")),
        }
    }

    // predicateObjectList ::= predicate objectList (';' (predicate objectList)?)*
    fn parse_predicate_object_list(&mut self, subject: &Subject) -> Result<(), TurtleError> {
        loop {
            let predicate = self.parse_predicate()?;
            self.parse_object_list(subject, &predicate)?;

            if self.current.kind != TokenKind::Semicolon {
                return Ok(());
            }
            while self.current.kind == TokenKind::Semicolon {
                self.advance()?;
            }
            // trailing semicolons before the closing token are tolerated
            match self.current.kind {
                TokenKind::Dot | TokenKind::CloseBracket | TokenKind::Eof => return Ok(()),
                _ => (),
            }
        }
    }

    // objectList ::= object (',' object)*
    fn parse_object_list(&mut self, subject: &Subject, predicate: &Iri) -> Result<(), TurtleError> {
        loop {
            let object = self.parse_object()?;
            self.queue
                .push_back(Triple::new(subject.clone(), predicate.clone(), object));

            if self.current.kind != TokenKind::Comma {
                return Ok(());
            }
            self.advance()?;
        }
    }

    // predicate ::= 'a' | iriRef | prefixedName
    fn parse_predicate(&mut self) -> Result<Iri, TurtleError> {
        match self.current.kind {
            TokenKind::A => {
                self.advance()?;
                Ok(Iri::new_unchecked(vocab::rdf::TYPE))
            }
            TokenKind::IriRef | TokenKind::PrefixedName => self.parse_iri(),
            _ => Err(self.unexpected("a predicate (IRI, prefixed name or 'a')")),
        }
    }

    // object ::= iriRef | prefixedName | blankNodeLabel | literal
    //          | '[' predicateObjectList? ']'
    fn parse_object(&mut self) -> Result<Term, TurtleError> {
        match self.current.kind {
            TokenKind::IriRef | TokenKind::PrefixedName => Ok(Term::Iri(self.parse_iri()?)),
            TokenKind::BlankNodeLabel => Ok(Term::BlankNode(self.parse_blank_node_label()?)),
            TokenKind::Literal => Ok(Term::Literal(self.parse_literal()?)),
            TokenKind::OpenBracket => {
                Ok(Term::BlankNode(self.parse_blank_node_property_list()?))
            }
            _ => Err(self.unexpected("an object (IRI, prefixed name, blank node or literal)")),
        }
    }

    // '[' predicateObjectList? ']'
    //
    // Every bracket pair is a brand-new blank node; its triples are queued
    // before the containing triple.
    fn parse_blank_node_property_list(&mut self) -> Result<BlankNode, TurtleError> {
        self.advance()?;
        let node = BlankNode::new();
        if self.current.kind != TokenKind::CloseBracket {
            self.parse_predicate_object_list(&Subject::BlankNode(node))?;
        }
        self.expect(TokenKind::CloseBracket, "']' closing the blank node")?;
        Ok(node)
    }

    // '_:x' maps to the same blank node for the same label within one
    // parser invocation
    fn parse_blank_node_label(&mut self) -> Result<BlankNode, TurtleError> {
        let label = self.current.lexeme["_:".len()..].to_owned();
        let node = *self
            .bnode_labels
            .entry(label)
            .or_insert_with(BlankNode::new);
        self.advance()?;
        Ok(node)
    }

    // iri ::= iriRef | prefixedName
    fn parse_iri(&mut self) -> Result<Iri, TurtleError> {
        let token = self.current.clone();
        let expanded = match token.kind {
            TokenKind::IriRef => unescape(iri_ref_content(&token.lexeme)),
            TokenKind::PrefixedName => self.expand_prefixed_name(&token)?,
            _ => return Err(self.unexpected("an IRI")),
        };
        let iri = self.resolve(&expanded, &token)?;
        self.advance()?;
        Ok(iri)
    }

    // prefix:local -> prefixMap[prefix] + local; unknown prefix is fatal
    fn expand_prefixed_name(&self, token: &Token) -> Result<String, TurtleError> {
        let lexeme = &token.lexeme;
        let colon = lexeme.find(':').unwrap_or(0);
        let (prefix, local) = (&lexeme[..colon], &lexeme[colon + 1..]);
        match self.prefixes.get(prefix) {
            Some(namespace) => Ok(format!("{}{}", namespace, local)),
            None => Err(self.error_at(
                TurtleErrorKind::UnknownPrefix(prefix.to_owned()),
                token,
            )),
        }
    }

    /// Scheme-bearing IRIs are used verbatim; anything else is resolved
    /// against the current base. Without a base, relative references are
    /// kept as written.
    fn resolve(&self, iri: &str, token: &Token) -> Result<Iri, TurtleError> {
        if Iri::is_absolute(iri) {
            return Ok(Iri::new_unchecked(iri));
        }
        match &self.base {
            Some(base) => base
                .resolve(iri)
                .map(|resolved| Iri::new_unchecked(resolved.into_inner()))
                .map_err(|error| {
                    self.error_at(
                        TurtleErrorKind::InvalidIri {
                            iri: iri.to_owned(),
                            error,
                        },
                        token,
                    )
                }),
            None => Ok(Iri::new_unchecked(iri)),
        }
    }

    // literal ::= String (LANGTAG | '^^' iri)?
    fn parse_literal(&mut self) -> Result<Literal, TurtleError> {
        let token = self.current.clone();
        let (body, suffix) = split_literal_lexeme(&token.lexeme);
        let value = unescape(body);

        let literal = if let Some(tag) = suffix.strip_prefix('@') {
            let tag = LanguageTag::parse(tag.to_owned()).map_err(|error| {
                self.error_at(
                    TurtleErrorKind::InvalidLanguageTag {
                        tag: tag.to_owned(),
                        error,
                    },
                    &token,
                )
            })?;
            Literal::language_tagged(value, tag.into_inner())
                .map_err(|e| self.error_at(TurtleErrorKind::Constraint(e), &token))?
        } else if let Some(datatype) = suffix.strip_prefix("^^") {
            let expanded = if datatype.starts_with('<') {
                unescape(iri_ref_content(datatype))
            } else {
                let datatype_token = Token {
                    kind: TokenKind::PrefixedName,
                    lexeme: datatype.to_owned(),
                    line: token.line,
                    column: token.column,
                };
                self.expand_prefixed_name(&datatype_token)?
            };
            let datatype = self.resolve(&expanded, &token)?;
            Literal::typed(value, datatype)
                .map_err(|e| self.error_at(TurtleErrorKind::Constraint(e), &token))?
        } else {
            Literal::simple(value)
        };
        self.advance()?;
        Ok(literal)
    }
}

impl Iterator for TurtleParser<'_> {
    type Item = Result<Triple, TurtleError>;

    fn next(&mut self) -> Option<Result<Triple, TurtleError>> {
        loop {
            if let Some(triple) = self.queue.pop_front() {
                return Some(Ok(triple));
            }
            if self.done {
                return None;
            }
            if self.current.kind == TokenKind::Eof {
                self.done = true;
                return None;
            }
            if let Err(error) = self.parse_statement() {
                self.done = true;
                self.queue.clear();
                return Some(Err(error));
            }
        }
    }
}

/// Strips the `<`/`>` delimiters from an IRI reference lexeme.
fn iri_ref_content(lexeme: &str) -> &str {
    lexeme
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .unwrap_or(lexeme)
}

/// Splits a literal lexeme into its quoted body (delimiters stripped) and
/// the trailing `@lang`/`^^datatype` suffix, which may be empty.
fn split_literal_lexeme(lexeme: &str) -> (&str, &str) {
    let quote = match lexeme.chars().next() {
        Some(q @ ('"' | '\'')) => q,
        _ => return (lexeme, ""),
    };
    let delimiter: String = std::iter::repeat(quote).take(3).collect();
    if lexeme.starts_with(&delimiter) {
        // the closing delimiter is the last occurrence of the triple quote
        match lexeme.rfind(&delimiter) {
            Some(end) if end >= 3 => (&lexeme[3..end], &lexeme[end + 3..]),
            _ => (&lexeme[3..], ""),
        }
    } else {
        let mut escaped = false;
        for (i, c) in lexeme.char_indices().skip(1) {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == quote {
                return (&lexeme[1..i], &lexeme[i + 1..]);
            }
        }
        (&lexeme[1..], "")
    }
}

/// Decodes Turtle string escapes.
///
/// Named escapes (`\b \t \n \f \r \" \' \\`) and `\uXXXX`/`\UXXXXXXXX` with
/// exactly 4/8 hex digits are decoded; any malformed sequence is passed
/// through as a literal backslash followed by the original characters.
pub(crate) fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let mut lookahead = chars.clone();
        match lookahead.next() {
            Some('b') => {
                out.push('\u{8}');
                chars = lookahead;
            }
            Some('t') => {
                out.push('\t');
                chars = lookahead;
            }
            Some('n') => {
                out.push('\n');
                chars = lookahead;
            }
            Some('f') => {
                out.push('\u{C}');
                chars = lookahead;
            }
            Some('r') => {
                out.push('\r');
                chars = lookahead;
            }
            Some('"') => {
                out.push('"');
                chars = lookahead;
            }
            Some('\'') => {
                out.push('\'');
                chars = lookahead;
            }
            Some('\\') => {
                out.push('\\');
                chars = lookahead;
            }
            Some('u') => match decode_hex(&mut lookahead, 4) {
                Some(decoded) => {
                    out.push(decoded);
                    chars = lookahead;
                }
                None => out.push('\\'),
            },
            Some('U') => match decode_hex(&mut lookahead, 8) {
                Some(decoded) => {
                    out.push(decoded);
                    chars = lookahead;
                }
                None => out.push('\\'),
            },
            _ => out.push('\\'),
        }
    }
    out
}

fn decode_hex(chars: &mut std::str::Chars<'_>, len: usize) -> Option<char> {
    let mut value = 0u32;
    for _ in 0..len {
        let digit = chars.next()?.to_digit(16)?;
        value = value * 16 + digit;
    }
    char::from_u32(value)
}
