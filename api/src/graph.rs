//! An ordered multiset of triples.

use crate::model::Triple;
use std::fmt;
use std::slice;

/// An RDF [graph](https://www.w3.org/TR/rdf11-concepts/#dfn-rdf-graph).
///
/// Triples keep their insertion order and duplicates are kept as-is; the
/// order carries no semantics but determines the default grouping order when
/// the graph is serialized.
///
/// A graph is a value object: it is "updated" by building a new graph from
/// the old triples plus new ones, never mutated in place.
///
/// ```
/// use terrapin_api::graph::Graph;
/// use terrapin_api::model::{Iri, Literal, Triple};
///
/// let graph = Graph::new().with(Triple::new(
///     Iri::new("http://example.com/foo")?,
///     Iri::new("http://schema.org/name")?,
///     Literal::simple("Foo"),
/// ));
/// assert_eq!(1, graph.len());
/// # Ok::<_, terrapin_api::model::ConstraintViolation>(())
/// ```
#[derive(Eq, PartialEq, Debug, Clone, Default)]
pub struct Graph {
    triples: Vec<Triple>,
}

impl Graph {
    /// Builds an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new graph holding this graph's triples plus `triple`.
    pub fn with(mut self, triple: Triple) -> Self {
        self.triples.push(triple);
        self
    }

    /// Returns a new graph holding this graph's triples plus all of `triples`.
    pub fn with_all(mut self, triples: impl IntoIterator<Item = Triple>) -> Self {
        self.triples.extend(triples);
        self
    }

    /// The number of triples, duplicates included.
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Returns `true` if the graph holds no triple.
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterates over the triples in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, Triple> {
        self.triples.iter()
    }

    /// The triples in insertion order.
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for Graph {
    type Item = Triple;
    type IntoIter = std::vec::IntoIter<Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.into_iter()
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl fmt::Display for Graph {
    /// Writes the graph as N-Triples-style lines, one triple per line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for triple in &self.triples {
            writeln!(f, "{}", triple)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Iri, Literal};

    fn triple(n: &str) -> Triple {
        Triple::new(
            Iri::new(format!("http://example.com/{}", n)).unwrap(),
            Iri::new("http://example.com/p").unwrap(),
            Literal::simple(n),
        )
    }

    #[test]
    fn keeps_insertion_order_and_duplicates() {
        let graph = Graph::new()
            .with(triple("a"))
            .with(triple("b"))
            .with(triple("a"));
        assert_eq!(3, graph.len());
        let subjects: Vec<String> = graph.iter().map(|t| t.subject.to_string()).collect();
        assert_eq!(
            vec![
                "<http://example.com/a>",
                "<http://example.com/b>",
                "<http://example.com/a>"
            ],
            subjects
        );
    }

    #[test]
    fn with_leaves_the_source_graph_usable_as_value() {
        let graph = Graph::new().with(triple("a"));
        let bigger = graph.clone().with(triple("b"));
        assert_eq!(1, graph.len());
        assert_eq!(2, bigger.len());
    }
}
