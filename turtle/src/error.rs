use oxilangtag::LanguageTagParseError;
use oxiri::IriParseError;
use std::error::Error;
use std::fmt;
use terrapin_api::model::ConstraintViolation;

/// Error raised by the tokenizer or the parser on malformed Turtle.
///
/// It carries the 1-based line and column of the offending token and the
/// token's raw text. Term-level [`ConstraintViolation`]s hit while resolving
/// a token are caught and re-wrapped here with the token's position, so the
/// parser never leaks a raw model error.
#[derive(Debug)]
pub struct TurtleError {
    pub(crate) kind: TurtleErrorKind,
    pub(crate) line: u64,
    pub(crate) column: u64,
    pub(crate) token: String,
}

#[derive(Debug)]
pub enum TurtleErrorKind {
    /// The grammar required something else at this point.
    UnexpectedToken {
        expected: &'static str,
    },
    UnexpectedCharacter(char),
    PrematureEof,
    UnterminatedLiteral,
    UnterminatedIriRef,
    UnknownDirective(String),
    UnknownPrefix(String),
    /// The `a` keyword is only valid in predicate position.
    AAsSubject,
    InvalidBaseIri {
        iri: String,
        error: IriParseError,
    },
    InvalidIri {
        iri: String,
        error: IriParseError,
    },
    InvalidLanguageTag {
        tag: String,
        error: LanguageTagParseError,
    },
    Constraint(ConstraintViolation),
}

impl TurtleError {
    /// The broken grammar rule or wrapped lower-level failure.
    pub fn kind(&self) -> &TurtleErrorKind {
        &self.kind
    }

    /// 1-based line of the offending token.
    pub fn line(&self) -> u64 {
        self.line
    }

    /// 1-based column of the offending token.
    pub fn column(&self) -> u64 {
        self.column
    }

    /// Raw text of the offending token; empty at end of input.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl fmt::Display for TurtleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TurtleErrorKind::UnexpectedToken { expected } => {
                write!(f, "expected {}", expected)
            }
            TurtleErrorKind::UnexpectedCharacter(c) => {
                write!(f, "unexpected character '{}'", c.escape_debug())
            }
            TurtleErrorKind::PrematureEof => write!(f, "premature end of file"),
            TurtleErrorKind::UnterminatedLiteral => write!(f, "unterminated string literal"),
            TurtleErrorKind::UnterminatedIriRef => write!(f, "unterminated IRI reference"),
            TurtleErrorKind::UnknownDirective(name) => {
                write!(f, "unknown directive '@{}'", name)
            }
            TurtleErrorKind::UnknownPrefix(prefix) => write!(f, "unknown prefix '{}:'", prefix),
            TurtleErrorKind::AAsSubject => {
                write!(f, "the 'a' keyword cannot be used as a subject")
            }
            TurtleErrorKind::InvalidBaseIri { iri, error } => {
                write!(f, "error while parsing base IRI '{}': {}", iri, error)
            }
            TurtleErrorKind::InvalidIri { iri, error } => {
                write!(f, "error while resolving IRI '{}': {}", iri, error)
            }
            TurtleErrorKind::InvalidLanguageTag { tag, error } => {
                write!(f, "error while parsing language tag '{}': {}", tag, error)
            }
            TurtleErrorKind::Constraint(error) => error.fmt(f),
        }?;
        write!(f, " on line {} at column {}", self.line, self.column)?;
        if !self.token.is_empty() {
            write!(f, " near '{}'", self.token)?;
        }
        Ok(())
    }
}

impl Error for TurtleError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match &self.kind {
            TurtleErrorKind::InvalidBaseIri { error, .. } => Some(error),
            TurtleErrorKind::InvalidIri { error, .. } => Some(error),
            TurtleErrorKind::InvalidLanguageTag { error, .. } => Some(error),
            TurtleErrorKind::Constraint(error) => Some(error),
            _ => None,
        }
    }
}
