//! Turtle parsing and serialization on top of the `terrapin_api` model.
//!
//! The pipeline has three layers:
//! * [`Tokenizer`] turns text into a flat token stream,
//! * [`TurtleParser`] builds triples from tokens ([`parse`] collects them
//!   into a [`Graph`](terrapin_api::graph::Graph)),
//! * [`write`] and friends turn a graph back into compact, prefixed Turtle.
//!
//! Usage example, parsing then re-serializing with a custom prefix:
//! ```
//! use terrapin_turtle::{parse, write_with_config, TurtleConfig};
//!
//! let graph = parse(
//!     "@prefix schema: <http://schema.org/> .
//!      <http://example.com/foo> schema:name \"Foo\" .",
//!     "",
//! )?;
//! let config = TurtleConfig::new().with_prefix("schema", "http://schema.org/");
//! assert!(write_with_config(&graph, &config).contains("schema:name \"Foo\""));
//! # Ok::<_, terrapin_turtle::TurtleError>(())
//! ```
#![deny(
    future_incompatible,
    nonstandard_style,
    rust_2018_idioms,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code,
    unused_qualifications
)]

mod error;
mod parser;
mod serializer;
mod tokenizer;

pub use crate::error::{TurtleError, TurtleErrorKind};
pub use crate::parser::{parse, parse_with_prefixes, TurtleParser};
pub use crate::serializer::{
    write, write_with, write_with_config, Diagnostics, LogDiagnostics, TurtleConfig,
    TurtleSerializer,
};
pub use crate::tokenizer::{Token, TokenKind, Tokenizer};
