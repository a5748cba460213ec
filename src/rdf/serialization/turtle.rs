//! Bridge between the `rio` text model and the owned quad types

use super::{ParseError, ParseResult, RdfFormat, SerializeError, SerializeResult};
use crate::rdf::namespace::PrefixMap;
use crate::rdf::types::{vocab, BlankNode, GraphName, Literal, NamedNode, Quad, Subject, Term};
use oxiri::Iri;
use rio_api::formatter::{QuadsFormatter, TriplesFormatter};
use rio_api::model as rio;
use rio_api::parser::{QuadsParser, TriplesParser};
use rio_turtle::{
    NQuadsFormatter, NQuadsParser, NTriplesFormatter, NTriplesParser, TriGFormatter, TriGParser,
    TurtleError, TurtleFormatter, TurtleParser,
};
use std::fmt::Display;
use std::io::{self, BufRead, Write};

pub(super) fn parse<R: BufRead>(
    reader: R,
    format: RdfFormat,
    base_iri: Option<&str>,
    graph: &GraphName,
) -> ParseResult<Vec<Quad>> {
    let base = base_iri
        .map(|iri| Iri::parse(iri.to_string()).map_err(|e| ParseError::InvalidBaseIri(e.to_string())))
        .transpose()?;

    match format {
        RdfFormat::Turtle => collect_triples(TurtleParser::new(reader, base), graph),
        RdfFormat::NTriples => collect_triples(NTriplesParser::new(reader), graph),
        RdfFormat::NQuads => collect_quads(NQuadsParser::new(reader)),
        RdfFormat::TriG => collect_quads(TriGParser::new(reader, base)),
    }
}

fn collect_triples<P>(mut parser: P, graph: &GraphName) -> ParseResult<Vec<Quad>>
where
    P: TriplesParser<Error = TurtleError>,
{
    let mut quads = Vec::new();
    parser
        .parse_all(&mut |t| -> Result<(), TurtleError> {
            quads.push(Quad::new(
                convert_subject(t.subject)?,
                convert_named(t.predicate)?,
                convert_object(t.object)?,
                graph.clone(),
            ));
            Ok(())
        })
        .map_err(|e| ParseError::Parse(e.to_string()))?;
    Ok(quads)
}

fn collect_quads<P>(mut parser: P) -> ParseResult<Vec<Quad>>
where
    P: QuadsParser<Error = TurtleError>,
{
    let mut quads = Vec::new();
    parser
        .parse_all(&mut |q| -> Result<(), TurtleError> {
            quads.push(Quad::new(
                convert_subject(q.subject)?,
                convert_named(q.predicate)?,
                convert_object(q.object)?,
                convert_graph(q.graph_name)?,
            ));
            Ok(())
        })
        .map_err(|e| ParseError::Parse(e.to_string()))?;
    Ok(quads)
}

fn invalid(e: impl Display) -> TurtleError {
    io::Error::new(io::ErrorKind::InvalidData, e.to_string()).into()
}

fn convert_named(n: rio::NamedNode<'_>) -> Result<NamedNode, TurtleError> {
    NamedNode::new(n.iri).map_err(invalid)
}

fn convert_blank(b: rio::BlankNode<'_>) -> Result<BlankNode, TurtleError> {
    BlankNode::new(b.id).map_err(invalid)
}

fn convert_subject(s: rio::Subject<'_>) -> Result<Subject, TurtleError> {
    match s {
        rio::Subject::NamedNode(n) => Ok(convert_named(n)?.into()),
        rio::Subject::BlankNode(b) => Ok(convert_blank(b)?.into()),
        _ => Err(invalid("quoted triples are not supported as subjects")),
    }
}

fn convert_object(o: rio::Term<'_>) -> Result<Term, TurtleError> {
    match o {
        rio::Term::NamedNode(n) => Ok(convert_named(n)?.into()),
        rio::Term::BlankNode(b) => Ok(convert_blank(b)?.into()),
        rio::Term::Literal(rio::Literal::Simple { value }) => {
            Ok(Literal::new_simple_literal(value).into())
        }
        rio::Term::Literal(rio::Literal::LanguageTaggedString { value, language }) => {
            Ok(Literal::new_language_tagged_literal(value, language)
                .map_err(invalid)?
                .into())
        }
        rio::Term::Literal(rio::Literal::Typed { value, datatype }) => {
            Ok(Literal::new_typed_literal(value, convert_named(datatype)?).into())
        }
        _ => Err(invalid("quoted triples are not supported as objects")),
    }
}

fn convert_graph(g: Option<rio::GraphName<'_>>) -> Result<GraphName, TurtleError> {
    match g {
        None => Ok(GraphName::DefaultGraph),
        Some(rio::GraphName::NamedNode(n)) => Ok(convert_named(n)?.into()),
        Some(rio::GraphName::BlankNode(b)) => Ok(convert_blank(b)?.into()),
    }
}

pub(super) fn format<'a>(
    quads: impl IntoIterator<Item = &'a Quad>,
    format: RdfFormat,
    prefixes: &PrefixMap,
) -> SerializeResult<String> {
    let mut output = Vec::new();
    if format.supports_prefixes() && !prefixes.is_empty() {
        for (prefix, iri) in prefixes.iter() {
            writeln!(output, "@prefix {}: <{}> .", prefix, iri)?;
        }
        writeln!(output)?;
    }

    let output = match format {
        RdfFormat::Turtle => {
            let mut formatter = TurtleFormatter::new(output);
            for quad in quads {
                formatter.format(&rio_triple(quad, format)?)?;
            }
            formatter.finish()?
        }
        RdfFormat::NTriples => {
            let mut formatter = NTriplesFormatter::new(output);
            for quad in quads {
                formatter.format(&rio_triple(quad, format)?)?;
            }
            formatter.finish()?
        }
        RdfFormat::NQuads => {
            let mut formatter = NQuadsFormatter::new(output);
            for quad in quads {
                formatter.format(&rio_quad(quad))?;
            }
            formatter.finish()?
        }
        RdfFormat::TriG => {
            let mut formatter = TriGFormatter::new(output);
            for quad in quads {
                formatter.format(&rio_quad(quad))?;
            }
            formatter.finish()?
        }
    };

    String::from_utf8(output).map_err(|e| SerializeError::Serialize(e.to_string()))
}

fn rio_triple(quad: &Quad, format: RdfFormat) -> SerializeResult<rio::Triple<'_>> {
    if !quad.graph().is_default_graph() {
        return Err(SerializeError::NamedGraphUnsupported {
            format,
            graph: quad.graph().to_string(),
        });
    }
    Ok(rio::Triple {
        subject: rio_subject(quad.subject()),
        predicate: rio::NamedNode { iri: quad.predicate().as_str() },
        object: rio_term(quad.object()),
    })
}

fn rio_quad(quad: &Quad) -> rio::Quad<'_> {
    rio::Quad {
        subject: rio_subject(quad.subject()),
        predicate: rio::NamedNode { iri: quad.predicate().as_str() },
        object: rio_term(quad.object()),
        graph_name: match quad.graph() {
            GraphName::NamedNode(n) => Some(rio::GraphName::NamedNode(rio::NamedNode { iri: n.as_str() })),
            GraphName::BlankNode(b) => Some(rio::GraphName::BlankNode(rio::BlankNode { id: b.as_str() })),
            GraphName::DefaultGraph => None,
        },
    }
}

fn rio_subject(subject: &Subject) -> rio::Subject<'_> {
    match subject {
        Subject::NamedNode(n) => rio::Subject::NamedNode(rio::NamedNode { iri: n.as_str() }),
        Subject::BlankNode(b) => rio::Subject::BlankNode(rio::BlankNode { id: b.as_str() }),
    }
}

fn rio_term(term: &Term) -> rio::Term<'_> {
    match term {
        Term::NamedNode(n) => rio::Term::NamedNode(rio::NamedNode { iri: n.as_str() }),
        Term::BlankNode(b) => rio::Term::BlankNode(rio::BlankNode { id: b.as_str() }),
        Term::Literal(l) => rio::Term::Literal(match l.language() {
            Some(language) => rio::Literal::LanguageTaggedString {
                value: l.value(),
                language,
            },
            None if l.datatype_iri() == vocab::XSD_STRING => rio::Literal::Simple { value: l.value() },
            None => rio::Literal::Typed {
                value: l.value(),
                datatype: rio::NamedNode { iri: l.datatype_iri() },
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Quad> {
        let s = NamedNode::new("http://example.org/alice").unwrap();
        vec![
            Quad::triple(
                s.clone(),
                NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap(),
                Literal::new_simple_literal("Alice"),
            ),
            Quad::triple(
                s.clone(),
                NamedNode::new("http://xmlns.com/foaf/0.1/age").unwrap(),
                Literal::new_typed_literal("30", NamedNode::new(vocab::XSD_INTEGER).unwrap()),
            ),
            Quad::triple(
                s,
                NamedNode::new("http://xmlns.com/foaf/0.1/title").unwrap(),
                Literal::new_language_tagged_literal("Dr", "en").unwrap(),
            ),
        ]
    }

    #[test]
    fn test_turtle_roundtrip() {
        let quads = sample();
        let text = format(&quads, RdfFormat::Turtle, &PrefixMap::new()).unwrap();
        assert!(text.contains("http://example.org/alice"));

        let parsed = parse(text.as_bytes(), RdfFormat::Turtle, None, &GraphName::DefaultGraph).unwrap();
        assert_eq!(parsed.len(), 3);
        for quad in &quads {
            assert!(parsed.contains(quad));
        }
    }

    #[test]
    fn test_prefix_header() {
        let prefixes = PrefixMap::new().with_prefix("foaf", "http://xmlns.com/foaf/0.1/");
        let text = format(&sample(), RdfFormat::Turtle, &prefixes).unwrap();
        assert!(text.starts_with("@prefix foaf: <http://xmlns.com/foaf/0.1/> ."));

        let nt = format(&sample(), RdfFormat::NTriples, &prefixes).unwrap();
        assert!(!nt.contains("@prefix"));
    }

    #[test]
    fn test_named_graph_needs_quad_format() {
        let g = NamedNode::new("http://example.org/g").unwrap();
        let quads: Vec<Quad> = sample().iter().map(|q| q.with_graph(g.clone())).collect();

        let err = format(&quads, RdfFormat::NTriples, &PrefixMap::new()).unwrap_err();
        assert!(matches!(err, SerializeError::NamedGraphUnsupported { .. }));

        let nq = format(&quads, RdfFormat::NQuads, &PrefixMap::new()).unwrap();
        let parsed = parse(nq.as_bytes(), RdfFormat::NQuads, None, &GraphName::DefaultGraph).unwrap();
        assert_eq!(parsed.len(), 3);
        assert!(parsed.iter().all(|q| q.graph() == &GraphName::NamedNode(g.clone())));
    }

    #[test]
    fn test_base_iri() {
        let parsed = parse(
            "<a> <b> <c> .".as_bytes(),
            RdfFormat::Turtle,
            Some("http://example.org/"),
            &GraphName::DefaultGraph,
        )
        .unwrap();
        assert_eq!(parsed[0].subject().to_string(), "<http://example.org/a>");

        let err = parse("".as_bytes(), RdfFormat::Turtle, Some("not an iri"), &GraphName::DefaultGraph);
        assert!(matches!(err, Err(ParseError::InvalidBaseIri(_))));
    }
}
