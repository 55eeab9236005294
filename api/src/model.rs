//! RDF terms and triples.
//!
//! All types here are immutable value objects. Position capabilities are
//! encoded in the type system: a [`Triple`] subject is a [`Subject`] (IRI or
//! blank node), its predicate is an [`Iri`], and its object is any [`Term`].
//!
//! The default string formatters return an N-Triples and Turtle compatible
//! representation.
//!
//! ```
//! use terrapin_api::model::{Iri, Literal, Triple};
//!
//! let triple = Triple::new(
//!     Iri::new("http://example.com/foo")?,
//!     Iri::new("http://schema.org/name")?,
//!     Literal::simple("Foo"),
//! );
//! assert_eq!(
//!     "<http://example.com/foo> <http://schema.org/name> \"Foo\" .",
//!     triple.to_string()
//! );
//! # Ok::<_, terrapin_api::model::ConstraintViolation>(())
//! ```

use crate::vocab;
use std::error::Error;
use std::fmt;
use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};

/// The invariant broken by an invalid term construction.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum ConstraintKind {
    /// The IRI is empty or has no `scheme:` part.
    AbsoluteIri,
    /// The IRI scheme does not match `[A-Za-z][A-Za-z0-9+.-]*`.
    SchemeFormat,
    /// A language tag was given without the `rdf:langString` datatype,
    /// or `rdf:langString` was given without a language tag.
    LanguageTagMismatch,
}

/// Error returned when a term constructor is given input that would
/// break a term-level invariant.
#[derive(Debug, Clone)]
pub struct ConstraintViolation {
    kind: ConstraintKind,
    offending: String,
}

impl ConstraintViolation {
    fn new(kind: ConstraintKind, offending: impl Into<String>) -> Self {
        Self {
            kind,
            offending: offending.into(),
        }
    }

    /// The broken invariant, for programmatic discrimination.
    pub fn kind(&self) -> ConstraintKind {
        self.kind
    }

    /// The input that broke the invariant.
    pub fn offending(&self) -> &str {
        &self.offending
    }
}

impl fmt::Display for ConstraintViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ConstraintKind::AbsoluteIri => {
                write!(f, "'{}' is not an absolute IRI", self.offending)
            }
            ConstraintKind::SchemeFormat => {
                write!(f, "'{}' does not start with a valid scheme", self.offending)
            }
            ConstraintKind::LanguageTagMismatch => write!(
                f,
                "literal '{}' pairs a language tag and a datatype inconsistently",
                self.offending
            ),
        }
    }
}

impl Error for ConstraintViolation {}

/// An RDF [IRI](https://www.w3.org/TR/rdf11-concepts/#dfn-iri).
///
/// Construction checks that the IRI is absolute: non-empty, with a `:` at
/// position 1 or later and a scheme matching `[A-Za-z][A-Za-z0-9+.-]*`.
/// This is a scheme check, not full RFC 3987 validation.
///
/// Equality and hashing are both case-sensitive on the full IRI string.
///
/// ```
/// use terrapin_api::model::Iri;
///
/// assert_eq!(
///     "<http://example.com/foo>",
///     Iri::new("http://example.com/foo")?.to_string()
/// );
/// # Ok::<_, terrapin_api::model::ConstraintViolation>(())
/// ```
#[derive(Eq, PartialEq, Ord, PartialOrd, Debug, Clone, Hash)]
pub struct Iri(String);

impl Iri {
    /// Builds an IRI, checking the absolute-IRI invariant.
    pub fn new(iri: impl Into<String>) -> Result<Self, ConstraintViolation> {
        let iri = iri.into();
        Self::check(&iri)?;
        Ok(Self(iri))
    }

    /// Builds an IRI without checking the absolute-IRI invariant.
    ///
    /// Reserved for callers that already hold a resolved IRI, or that
    /// deliberately accept relative references (e.g. a parser running
    /// without a base IRI).
    pub fn new_unchecked(iri: impl Into<String>) -> Self {
        Self(iri.into())
    }

    /// Checks the absolute-IRI invariant without building anything.
    pub fn check(iri: &str) -> Result<(), ConstraintViolation> {
        let colon = match iri.find(':') {
            Some(p) if p >= 1 => p,
            _ => return Err(ConstraintViolation::new(ConstraintKind::AbsoluteIri, iri)),
        };
        let mut scheme = iri[..colon].chars();
        let first = scheme.next().unwrap_or('\0');
        if !first.is_ascii_alphabetic()
            || !scheme.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '.' | '-'))
        {
            return Err(ConstraintViolation::new(ConstraintKind::SchemeFormat, iri));
        }
        Ok(())
    }

    /// Returns `true` if `iri` passes the absolute-IRI check.
    pub fn is_absolute(iri: &str) -> bool {
        Self::check(iri).is_ok()
    }

    /// The IRI itself.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the IRI and returns the underlying string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for Iri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.0)
    }
}

static BLANK_NODE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// An RDF [blank node](https://www.w3.org/TR/rdf11-concepts/#dfn-blank-node).
///
/// A blank node is an opaque identity: two separately allocated blank nodes
/// are never equal, even if every asserted property matches, and cloning or
/// copying preserves identity. Labels like `_:b1` are a serialization-time
/// convenience and are never part of the identity.
///
/// ```
/// use terrapin_api::model::BlankNode;
///
/// let a = BlankNode::new();
/// assert_eq!(a, a);
/// assert_ne!(a, BlankNode::new());
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub struct BlankNode {
    id: u64,
}

impl BlankNode {
    /// Allocates a blank node with a fresh identity.
    pub fn new() -> Self {
        Self {
            id: BLANK_NODE_COUNTER.fetch_add(1, Ordering::Relaxed),
        }
    }
}

impl Default for BlankNode {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:g{}", self.id)
    }
}

/// An RDF [literal](https://www.w3.org/TR/rdf11-concepts/#dfn-literal):
/// a lexical value, a datatype IRI, and an optional language tag.
///
/// Invariant: the language tag is present if and only if the datatype is
/// `rdf:langString`. Constructors that could break this return a
/// [`ConstraintViolation`] instead.
///
/// ```
/// use terrapin_api::model::Literal;
///
/// assert_eq!("\"foo\\nbar\"", Literal::simple("foo\nbar").to_string());
/// assert_eq!(
///     "\"foo\"@en",
///     Literal::language_tagged("foo", "en")?.to_string()
/// );
/// # Ok::<_, terrapin_api::model::ConstraintViolation>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Literal {
    value: String,
    datatype: Iri,
    language: Option<String>,
}

impl Literal {
    /// Builds a plain `xsd:string` literal.
    pub fn simple(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Iri(vocab::xsd::STRING.to_owned()),
            language: None,
        }
    }

    /// Builds a language-tagged literal; the datatype is `rdf:langString`.
    ///
    /// Fails with [`ConstraintKind::LanguageTagMismatch`] on an empty tag.
    pub fn language_tagged(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, ConstraintViolation> {
        let value = value.into();
        let language = language.into();
        if language.is_empty() {
            return Err(ConstraintViolation::new(
                ConstraintKind::LanguageTagMismatch,
                value,
            ));
        }
        Ok(Self {
            value,
            datatype: Iri(vocab::rdf::LANG_STRING.to_owned()),
            language: Some(language),
        })
    }

    /// Builds a datatyped literal.
    ///
    /// Fails with [`ConstraintKind::LanguageTagMismatch`] if the datatype is
    /// `rdf:langString`, which requires a tag and must be built with
    /// [`Literal::language_tagged`].
    pub fn typed(value: impl Into<String>, datatype: Iri) -> Result<Self, ConstraintViolation> {
        let value = value.into();
        if datatype.as_str() == vocab::rdf::LANG_STRING {
            return Err(ConstraintViolation::new(
                ConstraintKind::LanguageTagMismatch,
                value,
            ));
        }
        Ok(Self {
            value,
            datatype,
            language: None,
        })
    }

    /// The lexical value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The datatype IRI (`xsd:string` for plain literals).
    pub fn datatype(&self) -> &Iri {
        &self.datatype
    }

    /// The language tag, present iff the datatype is `rdf:langString`.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", Escaped(&self.value))?;
        if let Some(language) = &self.language {
            write!(f, "@{}", language)
        } else if self.datatype.as_str() != vocab::xsd::STRING {
            write!(f, "^^{}", self.datatype)
        } else {
            Ok(())
        }
    }
}

/// Displays a literal value with Turtle escaping applied.
///
/// Named escapes cover backspace, tab, newline, form feed, carriage return,
/// `"` and `\`; everything else outside printable ASCII is written as
/// `\uXXXX` or `\UXXXXXXXX`.
#[derive(Clone, Copy)]
pub struct Escaped<'a>(pub &'a str);

impl fmt::Display for Escaped<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in self.0.chars() {
            match c {
                '\u{8}' => f.write_str("\\b")?,
                '\t' => f.write_str("\\t")?,
                '\n' => f.write_str("\\n")?,
                '\u{C}' => f.write_str("\\f")?,
                '\r' => f.write_str("\\r")?,
                '"' => f.write_str("\\\"")?,
                '\\' => f.write_str("\\\\")?,
                c if (' '..='~').contains(&c) => f.write_char(c)?,
                c if (c as u32) <= 0xFFFF => write!(f, "\\u{:04X}", c as u32)?,
                c => write!(f, "\\U{:08X}", c as u32)?,
            }
        }
        Ok(())
    }
}

/// The union of [IRIs](Iri) and [blank nodes](BlankNode): everything that
/// may sit in the subject position of a triple.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Subject {
    Iri(Iri),
    BlankNode(BlankNode),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Iri(node) => node.fmt(f),
            Subject::BlankNode(node) => node.fmt(f),
        }
    }
}

impl From<Iri> for Subject {
    fn from(node: Iri) -> Self {
        Subject::Iri(node)
    }
}

impl From<BlankNode> for Subject {
    fn from(node: BlankNode) -> Self {
        Subject::BlankNode(node)
    }
}

/// An RDF [term](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-term):
/// everything that may sit in the object position of a triple.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub enum Term {
    Iri(Iri),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(node) => node.fmt(f),
            Term::BlankNode(node) => node.fmt(f),
            Term::Literal(literal) => literal.fmt(f),
        }
    }
}

impl From<Iri> for Term {
    fn from(node: Iri) -> Self {
        Term::Iri(node)
    }
}

impl From<BlankNode> for Term {
    fn from(node: BlankNode) -> Self {
        Term::BlankNode(node)
    }
}

impl From<Literal> for Term {
    fn from(literal: Literal) -> Self {
        Term::Literal(literal)
    }
}

impl From<Subject> for Term {
    fn from(resource: Subject) -> Self {
        match resource {
            Subject::Iri(node) => Term::Iri(node),
            Subject::BlankNode(node) => Term::BlankNode(node),
        }
    }
}

/// An RDF [triple](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-triple).
///
/// The positions carry their capability sets in their types: no literal can
/// ever be a subject and no literal or blank node a predicate.
///
/// ```
/// use terrapin_api::model::{Iri, Triple};
///
/// assert_eq!(
///     "<http://example.com/foo> <http://schema.org/sameAs> <http://example.com/foo> .",
///     Triple::new(
///         Iri::new("http://example.com/foo")?,
///         Iri::new("http://schema.org/sameAs")?,
///         Iri::new("http://example.com/foo")?,
///     ).to_string()
/// );
/// # Ok::<_, terrapin_api::model::ConstraintViolation>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct Triple {
    pub subject: Subject,
    pub predicate: Iri,
    pub object: Term,
}

impl Triple {
    /// Builds a triple from any subject-capable and object-capable terms.
    pub fn new(
        subject: impl Into<Subject>,
        predicate: Iri,
        object: impl Into<Term>,
    ) -> Self {
        Self {
            subject: subject.into(),
            predicate,
            object: object.into(),
        }
    }
}

impl fmt::Display for Triple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    fn hash_of(value: &impl Hash) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn iri_accepts_absolute_iris() {
        for iri in [
            "http://example.com/foo",
            "urn:uuid:1234",
            "a:",
            "x+y.z-0:rest",
            "mailto:someone@example.com",
        ] {
            assert!(Iri::new(iri).is_ok(), "{} should be accepted", iri);
        }
    }

    #[test]
    fn iri_rejects_missing_scheme() {
        for iri in ["", "foo", "/relative/path", ":missing"] {
            let err = Iri::new(iri).unwrap_err();
            assert_eq!(err.kind(), ConstraintKind::AbsoluteIri, "{}", iri);
        }
    }

    #[test]
    fn iri_rejects_malformed_scheme() {
        for iri in ["0http://example.com/", "ht tp://x/", "sch@me:x"] {
            let err = Iri::new(iri).unwrap_err();
            assert_eq!(err.kind(), ConstraintKind::SchemeFormat, "{}", iri);
        }
    }

    #[test]
    fn iri_equality_and_hash_are_case_sensitive_and_consistent() {
        let lower = Iri::new("http://example.com/a").unwrap();
        let upper = Iri::new("HTTP://example.com/a").unwrap();
        assert_ne!(lower, upper);
        assert_eq!(lower, Iri::new("http://example.com/a").unwrap());
        assert_eq!(hash_of(&lower), hash_of(&Iri::new("http://example.com/a").unwrap()));
    }

    #[test]
    fn blank_nodes_are_identity_only() {
        let a = BlankNode::new();
        let b = BlankNode::new();
        assert_eq!(a, a);
        assert_ne!(a, b);
        let c = a;
        assert_eq!(a, c);
        assert_eq!(hash_of(&a), hash_of(&c));
    }

    #[test]
    fn literal_language_datatype_pairing() {
        assert!(Literal::language_tagged("foo", "en").is_ok());
        assert_eq!(
            Literal::language_tagged("foo", "").unwrap_err().kind(),
            ConstraintKind::LanguageTagMismatch
        );
        let lang_string = Iri::new(vocab::rdf::LANG_STRING).unwrap();
        assert_eq!(
            Literal::typed("foo", lang_string).unwrap_err().kind(),
            ConstraintKind::LanguageTagMismatch
        );
    }

    #[test]
    fn equal_literals_have_equal_hashes() {
        let a = Literal::language_tagged("foo", "en").unwrap();
        let b = Literal::language_tagged("foo", "en").unwrap();
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, Literal::simple("foo"));
    }

    #[test]
    fn simple_literal_is_typed_xsd_string() {
        let plain = Literal::simple("foo");
        let typed = Literal::typed("foo", Iri::new(vocab::xsd::STRING).unwrap()).unwrap();
        assert_eq!(plain, typed);
    }

    #[test]
    fn literal_display_escapes() {
        assert_eq!(
            "\"a\\nb\\\"c\\\\d\"",
            Literal::simple("a\nb\"c\\d").to_string()
        );
        assert_eq!("\"\\U0001F600\"", Literal::simple("\u{1F600}").to_string());
        assert_eq!("\"\\u00E9\"", Literal::simple("\u{E9}").to_string());
    }
}
