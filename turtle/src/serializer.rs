//! Compact Turtle serializer.
//!
//! Writes a [`Graph`] as prefixed, grouped Turtle text. Serialization of a
//! well-formed graph never fails; the only side channel is a non-fatal
//! [`Diagnostics`] warning when an `https://` IRI matches a namespace
//! registered under `http://`.

use crate::tokenizer::is_name_char;
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::io::Write;
use terrapin_api::graph::Graph;
use terrapin_api::model::{BlankNode, Escaped, Iri, Literal, Subject, Term};
use terrapin_api::vocab;

/// Sink for non-fatal serializer warnings.
///
/// Warnings never change the output; they only surface abbreviation
/// opportunities the serializer declined.
pub trait Diagnostics {
    fn warning(&mut self, message: &str);
}

/// The default [`Diagnostics`] sink, forwarding to [`log::warn!`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn warning(&mut self, message: &str) {
        log::warn!("{}", message);
    }
}

/// Serializer settings.
///
/// The default configuration registers the `rdf:`, `rdfs:` and `xsd:`
/// namespaces; caller-supplied prefixes are merged on top.
///
/// ```
/// use terrapin_turtle::TurtleConfig;
///
/// let config = TurtleConfig::new()
///     .with_base_iri("http://example.com/")
///     .with_prefix("schema", "http://schema.org/");
/// assert!(config.prefixes().iter().any(|(p, _)| p == "schema"));
/// ```
#[derive(Debug, Clone)]
pub struct TurtleConfig {
    base_iri: Option<String>,
    prefixes: Vec<(String, String)>,
}

impl Default for TurtleConfig {
    fn default() -> Self {
        Self {
            base_iri: None,
            prefixes: vec![
                ("rdf".to_owned(), vocab::rdf::NAMESPACE.to_owned()),
                ("rdfs".to_owned(), vocab::rdfs::NAMESPACE.to_owned()),
                ("xsd".to_owned(), vocab::xsd::NAMESPACE.to_owned()),
            ],
        }
    }
}

impl TurtleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a base IRI in the output context. It is informational only
    /// and is not used to shorten IRIs.
    pub fn with_base_iri(mut self, base_iri: impl Into<String>) -> Self {
        self.base_iri = Some(base_iri.into());
        self
    }

    /// Registers a prefix candidate, replacing any candidate already bound
    /// to the same prefix. The empty prefix (`:`) is valid.
    pub fn with_prefix(
        mut self,
        prefix: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        let prefix = prefix.into();
        self.prefixes.retain(|(p, _)| *p != prefix);
        self.prefixes.push((prefix, namespace.into()));
        self
    }

    /// Registers several prefix candidates at once.
    pub fn with_prefixes(
        mut self,
        prefixes: impl IntoIterator<Item = (String, String)>,
    ) -> Self {
        for (prefix, namespace) in prefixes {
            self = self.with_prefix(prefix, namespace);
        }
        self
    }

    pub fn base_iri(&self) -> Option<&str> {
        self.base_iri.as_deref()
    }

    /// The registered prefix candidates. Only candidates an IRI actually
    /// abbreviates with end up as `@prefix` lines in the output.
    pub fn prefixes(&self) -> &[(String, String)] {
        &self.prefixes
    }
}

/// Serializes a graph with the default configuration.
///
/// ```
/// use terrapin_api::graph::Graph;
/// use terrapin_api::model::{Iri, Literal, Triple};
/// use terrapin_turtle::write;
///
/// let graph = Graph::new().with(Triple::new(
///     Iri::new("http://example.com/foo")?,
///     Iri::new("http://example.com/bar")?,
///     Literal::simple("baz"),
/// ));
/// assert_eq!(
///     "<http://example.com/foo> <http://example.com/bar> \"baz\" .\n",
///     write(&graph)
/// );
/// # Ok::<_, terrapin_api::model::ConstraintViolation>(())
/// ```
pub fn write(graph: &Graph) -> String {
    write_with_config(graph, &TurtleConfig::new())
}

/// Serializes a graph, sending warnings to [`LogDiagnostics`].
pub fn write_with_config(graph: &Graph, config: &TurtleConfig) -> String {
    write_with(graph, config, &mut LogDiagnostics)
}

/// Serializes a graph with an explicit diagnostic sink.
pub fn write_with(
    graph: &Graph,
    config: &TurtleConfig,
    diagnostics: &mut dyn Diagnostics,
) -> String {
    let mut serialization = Serialization::new(graph, config);

    // subject groups in first-encounter order, predicates likewise
    let mut order: Vec<&Subject> = Vec::new();
    let mut groups: HashMap<&Subject, Vec<(&Iri, Vec<&Term>)>> = HashMap::new();
    for triple in graph {
        let predicates = groups.entry(&triple.subject).or_insert_with(|| {
            order.push(&triple.subject);
            Vec::new()
        });
        match predicates
            .iter_mut()
            .find(|(predicate, _)| **predicate == triple.predicate)
        {
            Some((_, objects)) => objects.push(&triple.object),
            None => predicates.push((&triple.predicate, vec![&triple.object])),
        }
    }

    let mut body = String::new();
    for subject in order {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(&serialization.render_subject(subject, diagnostics));
        let predicates = &groups[subject];
        for (i, (predicate, objects)) in predicates.iter().enumerate() {
            body.push_str(if i == 0 { " " } else { "  " });
            body.push_str(&serialization.render_predicate(predicate, diagnostics));
            body.push(' ');
            for (j, object) in objects.iter().enumerate() {
                if j > 0 {
                    body.push_str(", ");
                }
                body.push_str(&serialization.render_term(object, diagnostics));
            }
            body.push_str(if i + 1 == predicates.len() {
                " .\n"
            } else {
                " ;\n"
            });
        }
    }

    let mut out = String::new();
    for (prefix, namespace) in &serialization.used {
        out.push_str("@prefix ");
        out.push_str(prefix);
        out.push_str(": <");
        out.push_str(namespace);
        out.push_str("> .\n");
    }
    if !out.is_empty() && !body.is_empty() {
        out.push('\n');
    }
    out.push_str(&body);
    out
}

/// Per-call serialization state: the blank node label map and the set of
/// prefixes the output actually uses.
struct Serialization<'a> {
    config: &'a TurtleConfig,
    labels: HashMap<BlankNode, String>,
    used: BTreeMap<String, String>,
}

impl<'a> Serialization<'a> {
    fn new(graph: &Graph, config: &'a TurtleConfig) -> Self {
        // b0, b1, ... in first-encounter order over subjects then objects
        let mut labels = HashMap::new();
        for triple in graph {
            if let Subject::BlankNode(node) = &triple.subject {
                let next = labels.len();
                labels.entry(*node).or_insert_with(|| format!("b{}", next));
            }
            if let Term::BlankNode(node) = &triple.object {
                let next = labels.len();
                labels.entry(*node).or_insert_with(|| format!("b{}", next));
            }
        }
        Self {
            config,
            labels,
            used: BTreeMap::new(),
        }
    }

    fn render_subject(&mut self, subject: &Subject, diagnostics: &mut dyn Diagnostics) -> String {
        match subject {
            Subject::Iri(iri) => self.render_iri(iri, diagnostics),
            Subject::BlankNode(node) => self.render_blank_node(node),
        }
    }

    fn render_predicate(&mut self, predicate: &Iri, diagnostics: &mut dyn Diagnostics) -> String {
        if predicate.as_str() == vocab::rdf::TYPE {
            "a".to_owned()
        } else {
            self.render_iri(predicate, diagnostics)
        }
    }

    fn render_term(&mut self, term: &Term, diagnostics: &mut dyn Diagnostics) -> String {
        match term {
            Term::Iri(iri) => self.render_iri(iri, diagnostics),
            Term::BlankNode(node) => self.render_blank_node(node),
            Term::Literal(literal) => self.render_literal(literal, diagnostics),
        }
    }

    fn render_blank_node(&self, node: &BlankNode) -> String {
        match self.labels.get(node) {
            Some(label) => format!("_:{}", label),
            None => node.to_string(),
        }
    }

    fn render_literal(&mut self, literal: &Literal, diagnostics: &mut dyn Diagnostics) -> String {
        let mut out = format!("\"{}\"", Escaped(literal.value()));
        if let Some(language) = literal.language() {
            out.push('@');
            out.push_str(language);
        } else if literal.datatype().as_str() != vocab::xsd::STRING {
            out.push_str("^^");
            out.push_str(&self.render_iri(literal.datatype(), diagnostics));
        }
        out
    }

    fn render_iri(&mut self, iri: &Iri, diagnostics: &mut dyn Diagnostics) -> String {
        let text = iri.as_str();
        if let Some((prefix, namespace, local)) = self.abbreviation(text) {
            let (prefix, namespace) = (prefix.to_owned(), namespace.to_owned());
            let rendered = format!("{}:{}", prefix, local);
            self.used.insert(prefix, namespace);
            return rendered;
        }
        if let Some(rest) = text.strip_prefix("https://") {
            if self.abbreviation(&format!("http://{}", rest)).is_some() {
                diagnostics.warning(&format!(
                    "'{}' matches a namespace registered under http://; keeping the https IRI as given",
                    text
                ));
            }
        }
        format!("<{}>", text)
    }

    /// Picks the prefix candidate abbreviating `iri`, if any: an exact
    /// full-IRI match wins outright, otherwise the longest candidate
    /// namespace that is a string-prefix of the IRI. The winner is dropped
    /// when it does not reach the IRI's last `#`/`/` split or when the
    /// remaining local part would not survive re-tokenization.
    fn abbreviation<'i>(&self, iri: &'i str) -> Option<(&str, &str, &'i str)> {
        let mut best: Option<&(String, String)> = None;
        for candidate in self.config.prefixes() {
            if candidate.1 == iri {
                best = Some(candidate);
                break;
            }
            if iri.starts_with(candidate.1.as_str())
                && best.map_or(true, |b| candidate.1.len() > b.1.len())
            {
                best = Some(candidate);
            }
        }
        let (prefix, namespace) = best?;
        let local = &iri[namespace.len()..];
        if !local.is_empty() && Some(namespace.as_str()) != namespace_head(iri) {
            return None;
        }
        if !is_local_name(local) {
            return None;
        }
        Some((prefix, namespace, local))
    }
}

/// The IRI up to and including its last `#`, or failing that its last `/`.
fn namespace_head(iri: &str) -> Option<&str> {
    let split = iri.rfind('#').or_else(|| iri.rfind('/'))?;
    Some(&iri[..=split])
}

/// True when `local` re-tokenizes as the local part of a prefixed name.
fn is_local_name(local: &str) -> bool {
    if local.is_empty() {
        return true;
    }
    local.chars().next().map_or(false, is_name_char)
        && !local.ends_with('.')
        && local.chars().all(|c| is_name_char(c) || c == '.')
}

/// Writes Turtle to an [`io::Write`] sink.
///
/// ```no_run
/// use std::fs::File;
/// use terrapin_api::graph::Graph;
/// use terrapin_turtle::TurtleSerializer;
///
/// let mut serializer = TurtleSerializer::new(File::create("out.ttl")?);
/// serializer.serialize(&Graph::new())?;
/// let file = serializer.finish();
/// # std::io::Result::Ok(())
/// ```
pub struct TurtleSerializer<W: Write> {
    write: W,
    config: TurtleConfig,
}

impl<W: Write> TurtleSerializer<W> {
    pub fn new(write: W) -> Self {
        Self::with_config(write, TurtleConfig::new())
    }

    pub fn with_config(write: W, config: TurtleConfig) -> Self {
        Self { write, config }
    }

    pub fn config(&self) -> &TurtleConfig {
        &self.config
    }

    /// Serializes `graph` and writes the text to the sink.
    pub fn serialize(&mut self, graph: &Graph) -> io::Result<()> {
        let text = write_with_config(graph, &self.config);
        self.write.write_all(text.as_bytes())
    }

    /// Releases the underlying sink.
    pub fn finish(self) -> W {
        self.write
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrapin_api::model::Triple;

    #[derive(Default)]
    struct CollectedDiagnostics(Vec<String>);

    impl Diagnostics for CollectedDiagnostics {
        fn warning(&mut self, message: &str) {
            self.0.push(message.to_owned());
        }
    }

    fn iri(s: &str) -> Iri {
        Iri::new(s).unwrap()
    }

    #[test]
    fn unabbreviated_iris_keep_angle_brackets() {
        let graph = Graph::new().with(Triple::new(
            iri("http://example.com/foo"),
            iri("http://example.com/bar"),
            Literal::simple("baz"),
        ));
        assert_eq!(
            "<http://example.com/foo> <http://example.com/bar> \"baz\" .\n",
            write(&graph)
        );
    }

    #[test]
    fn rdf_type_renders_as_a() {
        let graph = Graph::new().with(Triple::new(
            iri("http://ex/s"),
            iri(vocab::rdf::TYPE),
            iri("http://ex/C"),
        ));
        let config = TurtleConfig::new().with_prefix("ex", "http://ex/");
        let text = write_with_config(&graph, &config);
        assert!(text.contains("ex:s a ex:C ."), "got: {}", text);
        assert!(!text.contains("rdf:type"), "got: {}", text);
    }

    #[test]
    fn prefix_lines_cover_only_used_namespaces_empty_first() {
        let graph = Graph::new().with(Triple::new(
            iri("http://ex/s"),
            iri("http://other/p"),
            iri("http://ex/o"),
        ));
        let config = TurtleConfig::new()
            .with_prefix("ex", "http://ex/")
            .with_prefix("", "http://other/")
            .with_prefix("unused", "http://unused/");
        assert_eq!(
            "@prefix : <http://other/> .\n\
             @prefix ex: <http://ex/> .\n\
             \n\
             ex:s :p ex:o .\n",
            write_with_config(&graph, &config)
        );
    }

    #[test]
    fn longest_matching_namespace_wins() {
        let graph = Graph::new().with(Triple::new(
            iri("http://ex/v/Foo"),
            iri("http://ex/p"),
            Literal::simple("x"),
        ));
        let config = TurtleConfig::new()
            .with_prefix("ex", "http://ex/")
            .with_prefix("v", "http://ex/v/");
        let text = write_with_config(&graph, &config);
        assert!(text.contains("v:Foo"), "got: {}", text);
        assert!(!text.contains("ex:v/Foo"), "got: {}", text);
    }

    #[test]
    fn exact_namespace_match_renders_an_empty_local_part() {
        let graph = Graph::new().with(Triple::new(
            iri("http://ex/v/"),
            iri("http://ex/p"),
            Literal::simple("x"),
        ));
        let config = TurtleConfig::new()
            .with_prefix("ex", "http://ex/")
            .with_prefix("v", "http://ex/v/");
        let text = write_with_config(&graph, &config);
        assert!(text.starts_with("@prefix ex: <http://ex/> .\n@prefix v: <http://ex/v/> .\n\nv: ex:p"), "got: {}", text);
    }

    #[test]
    fn local_part_that_would_not_retokenize_stays_bracketed() {
        let graph = Graph::new().with(Triple::new(
            iri("http://ex/a/b"),
            iri("http://ex/p"),
            iri("http://ex/trailing."),
        ));
        let config = TurtleConfig::new().with_prefix("ex", "http://ex/");
        let text = write_with_config(&graph, &config);
        assert!(text.contains("<http://ex/a/b>"), "got: {}", text);
        assert!(text.contains("<http://ex/trailing.>"), "got: {}", text);
        assert!(text.contains("ex:p"), "got: {}", text);
    }

    #[test]
    fn groups_by_subject_and_predicate_in_encounter_order() {
        let graph = Graph::new()
            .with(Triple::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o1")))
            .with(Triple::new(iri("http://ex/t"), iri("http://ex/p"), iri("http://ex/o3")))
            .with(Triple::new(iri("http://ex/s"), iri("http://ex/q"), iri("http://ex/o4")))
            .with(Triple::new(iri("http://ex/s"), iri("http://ex/p"), iri("http://ex/o2")));
        let config = TurtleConfig::new().with_prefix("ex", "http://ex/");
        assert_eq!(
            "@prefix ex: <http://ex/> .\n\
             \n\
             ex:s ex:p ex:o1, ex:o2 ;\n\
             \x20 ex:q ex:o4 .\n\
             \n\
             ex:t ex:p ex:o3 .\n",
            write_with_config(&graph, &config)
        );
    }

    #[test]
    fn blank_nodes_are_labeled_in_first_encounter_order() {
        let first = BlankNode::new();
        let second = BlankNode::new();
        let graph = Graph::new()
            .with(Triple::new(first, iri("http://ex/p"), second))
            .with(Triple::new(second, iri("http://ex/p"), first));
        let config = TurtleConfig::new().with_prefix("ex", "http://ex/");
        assert_eq!(
            "@prefix ex: <http://ex/> .\n\
             \n\
             _:b0 ex:p _:b1 .\n\
             \n\
             _:b1 ex:p _:b0 .\n",
            write_with_config(&graph, &config)
        );
    }

    #[test]
    fn literal_escaping_and_datatypes() {
        let graph = Graph::new()
            .with(Triple::new(
                iri("http://ex/s"),
                iri("http://ex/p"),
                Literal::simple("line\n\"quoted\" \u{1F600}"),
            ))
            .with(Triple::new(
                iri("http://ex/s"),
                iri("http://ex/q"),
                Literal::typed("1999", iri("http://www.w3.org/2001/XMLSchema#gYear")).unwrap(),
            ))
            .with(Triple::new(
                iri("http://ex/s"),
                iri("http://ex/r"),
                Literal::language_tagged("chat", "fr").unwrap(),
            ));
        let config = TurtleConfig::new().with_prefix("ex", "http://ex/");
        let text = write_with_config(&graph, &config);
        assert!(
            text.contains("\"line\\n\\\"quoted\\\" \\U0001F600\""),
            "got: {}",
            text
        );
        assert!(text.contains("\"1999\"^^xsd:gYear"), "got: {}", text);
        assert!(text.contains("\"chat\"@fr"), "got: {}", text);
        // the implicit datatypes never show up
        assert!(!text.contains("langString"), "got: {}", text);
        assert!(!text.contains("xsd:string"), "got: {}", text);
    }

    #[test]
    fn https_namespace_mismatch_warns_but_keeps_the_iri() {
        let graph = Graph::new().with(Triple::new(
            iri("https://ex/s"),
            iri("http://ex/p"),
            Literal::simple("x"),
        ));
        let config = TurtleConfig::new().with_prefix("ex", "http://ex/");
        let mut diagnostics = CollectedDiagnostics::default();
        let text = write_with(&graph, &config, &mut diagnostics);
        assert!(text.contains("<https://ex/s>"), "got: {}", text);
        assert_eq!(1, diagnostics.0.len());
        assert!(diagnostics.0[0].contains("https://ex/s"));
    }

    #[test]
    fn empty_graph_serializes_to_nothing() {
        assert_eq!("", write(&Graph::new()));
    }

    #[test]
    fn serializer_writes_to_an_io_sink() {
        let graph = Graph::new().with(Triple::new(
            iri("http://ex/s"),
            iri("http://ex/p"),
            Literal::simple("x"),
        ));
        let mut serializer = TurtleSerializer::with_config(
            Vec::new(),
            TurtleConfig::new().with_prefix("ex", "http://ex/"),
        );
        serializer.serialize(&graph).unwrap();
        let bytes = serializer.finish();
        assert_eq!(
            "@prefix ex: <http://ex/> .\n\nex:s ex:p \"x\" .\n",
            String::from_utf8(bytes).unwrap()
        );
    }
}
