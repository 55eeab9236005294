//! Data structures for the [RDF 1.1](https://www.w3.org/TR/rdf11-concepts/) abstract data model:
//! IRIs, blank nodes, literals, triples and graphs.
//!
//! Term-level invariants (absolute IRIs, the language tag / datatype pairing rule,
//! position capabilities) are enforced when terms are constructed, so a
//! [`Triple`](model/struct.Triple.html) that exists is always well-formed.
//!
//! This crate is used by the `terrapin_turtle` Turtle parser and serializer.
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
#![doc(test(attr(deny(warnings))))]

pub mod graph;
pub mod model;
pub mod vocab;
