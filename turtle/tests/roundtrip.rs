use terrapin_api::graph::Graph;
use terrapin_api::model::{BlankNode, Iri, Literal, Triple};
use terrapin_api::vocab;
use terrapin_turtle::{parse, write, write_with_config, TurtleConfig, TurtleError};

fn example_graph() -> Graph {
    let foo = Iri::new_unchecked("http://example.com/foo");
    let bar = Iri::new_unchecked("http://example.com/bar");
    let address = BlankNode::new();
    Graph::new()
        .with(Triple::new(
            foo.clone(),
            Iri::new_unchecked(vocab::rdf::TYPE),
            Iri::new_unchecked("http://schema.org/Person"),
        ))
        .with(Triple::new(
            foo.clone(),
            Iri::new_unchecked("http://schema.org/name"),
            Literal::language_tagged("Foo", "en").unwrap(),
        ))
        .with(Triple::new(
            foo.clone(),
            Iri::new_unchecked("http://schema.org/address"),
            address,
        ))
        .with(Triple::new(
            address,
            Iri::new_unchecked("http://schema.org/postalCode"),
            Literal::typed(
                "75003",
                Iri::new_unchecked("http://www.w3.org/2001/XMLSchema#token"),
            )
            .unwrap(),
        ))
        .with(Triple::new(
            foo,
            bar,
            Literal::simple("multi\nline \"quoted\" \u{1F600}"),
        ))
}

#[test]
fn turtle_roundtrip() -> Result<(), TurtleError> {
    let graph = example_graph();
    let turtle = write(&graph);
    let parsed = parse(&turtle, "")?;

    assert_eq!(parsed.len(), graph.len());

    // everything but blank node identity survives textually; the serializer
    // may regroup triples, so compare order-insensitively
    let fingerprint = |graph: &Graph| -> Vec<String> {
        let mut lines: Vec<String> = graph
            .iter()
            .map(|t| match &t.object {
                terrapin_api::model::Term::BlankNode(_) => {
                    format!("{} _", t.predicate)
                }
                object => format!("{} {}", t.predicate, object),
            })
            .collect();
        lines.sort();
        lines
    };
    assert_eq!(fingerprint(&graph), fingerprint(&parsed));
    Ok(())
}

#[test]
fn turtle_roundtrip_with_prefixes() -> Result<(), TurtleError> {
    let graph = example_graph();
    let config = TurtleConfig::new()
        .with_prefix("schema", "http://schema.org/")
        .with_prefix("ex", "http://example.com/");
    let turtle = write_with_config(&graph, &config);

    assert!(turtle.contains("@prefix schema: <http://schema.org/> ."));
    assert!(turtle.contains("ex:foo a schema:Person"));

    let parsed = parse(&turtle, "")?;
    assert_eq!(parsed.len(), graph.len());
    Ok(())
}

#[test]
fn reserialization_is_stable() -> Result<(), TurtleError> {
    let turtle = write(&example_graph());
    let once = parse(&turtle, "")?;
    let twice = parse(&write(&once), "")?;

    let render = |graph: &Graph| -> Vec<String> {
        graph
            .iter()
            .map(|t| match &t.object {
                terrapin_api::model::Term::BlankNode(_) => format!("{} _", t.predicate),
                object => format!("{} {}", t.predicate, object),
            })
            .collect()
    };
    assert_eq!(render(&once), render(&twice));
    Ok(())
}

#[test]
fn parsed_document_keeps_blank_node_wiring() -> Result<(), TurtleError> {
    let turtle = "@prefix schema: <http://schema.org/> .
<http://example.com/foo> schema:address [ schema:postalCode \"75003\" ] ;
    schema:knows _:other .
_:other schema:address [ schema:postalCode \"31000\" ] .";

    let graph = parse(turtle, "")?;
    assert_eq!(5, graph.len());

    // _:other keeps one identity across statements
    let knows = graph
        .iter()
        .find(|t| t.predicate.as_str() == "http://schema.org/knows")
        .unwrap();
    let reappears = graph
        .iter()
        .any(|t| terrapin_api::model::Term::from(t.subject.clone()) == knows.object);
    assert!(reappears);

    // and survives a roundtrip
    let reparsed = parse(&write(&graph), "")?;
    assert_eq!(5, reparsed.len());
    let knows = reparsed
        .iter()
        .find(|t| t.predicate.as_str() == "http://schema.org/knows")
        .unwrap();
    assert!(reparsed
        .iter()
        .any(|t| terrapin_api::model::Term::from(t.subject.clone()) == knows.object));
    Ok(())
}
