//! RDF serialization formats
//!
//! Text parsing and formatting is delegated to `rio_turtle`; this module only
//! maps between its borrowed model and the owned quad types.
//!
//! Supports:
//! - Turtle (TTL)
//! - N-Triples (NT)
//! - N-Quads (NQ)
//! - TriG
//!
//! JSON output of materialized graphs lives in [`jsonld`].

pub mod jsonld;
mod turtle;

use super::namespace::PrefixMap;
use super::store::QuadStore;
use super::types::{GraphName, Quad};
use std::io::BufRead;
use thiserror::Error;
use tracing::debug;

/// RDF serialization format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// Turtle format (.ttl)
    Turtle,
    /// N-Triples format (.nt)
    NTriples,
    /// N-Quads format (.nq)
    NQuads,
    /// TriG format (.trig)
    TriG,
}

impl RdfFormat {
    /// Guess the format from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "ttl" => Some(RdfFormat::Turtle),
            "nt" => Some(RdfFormat::NTriples),
            "nq" => Some(RdfFormat::NQuads),
            "trig" => Some(RdfFormat::TriG),
            _ => None,
        }
    }

    /// Whether the format can carry named graphs
    pub fn supports_graphs(self) -> bool {
        matches!(self, RdfFormat::NQuads | RdfFormat::TriG)
    }

    /// Whether the format can declare prefixes
    pub fn supports_prefixes(self) -> bool {
        matches!(self, RdfFormat::Turtle | RdfFormat::TriG)
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// Base IRI rejected
    #[error("Invalid base IRI: {0}")]
    InvalidBaseIri(String),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialize(String),

    /// A quad in a named graph was written to a triple-only format
    #[error("{format:?} cannot carry named graph {graph}")]
    NamedGraphUnsupported { format: RdfFormat, graph: String },
}

pub type SerializeResult<T> = Result<T, SerializeError>;

/// RDF parser
pub struct RdfParser;

impl RdfParser {
    /// Parse RDF data from a reader.
    ///
    /// Triple formats place every triple in `graph`; quad formats carry their
    /// own graph names.
    pub fn parse<R: BufRead>(
        reader: R,
        format: RdfFormat,
        base_iri: Option<&str>,
        graph: &GraphName,
    ) -> ParseResult<Vec<Quad>> {
        let quads = turtle::parse(reader, format, base_iri, graph)?;
        debug!("Parsed {} quads as {:?}", quads.len(), format);
        Ok(quads)
    }

    /// Parse RDF data from a string into the default graph
    pub fn parse_str(input: &str, format: RdfFormat) -> ParseResult<Vec<Quad>> {
        Self::parse(input.as_bytes(), format, None, &GraphName::DefaultGraph)
    }
}

/// RDF serializer
pub struct RdfSerializer;

impl RdfSerializer {
    /// Serialize quads to a string.
    ///
    /// Turtle and TriG output starts with `@prefix` declarations for every
    /// entry of `prefixes`; IRIs in the body are written in full.
    pub fn serialize<'a>(
        quads: impl IntoIterator<Item = &'a Quad>,
        format: RdfFormat,
        prefixes: &PrefixMap,
    ) -> SerializeResult<String> {
        turtle::format(quads, format, prefixes)
    }

    /// Serialize a quad store to a string
    pub fn serialize_store(
        store: &QuadStore,
        format: RdfFormat,
        prefixes: &PrefixMap,
    ) -> SerializeResult<String> {
        Self::serialize(store.iter(), format, prefixes)
    }
}

impl QuadStore {
    /// Parse text and add the quads; returns how many were new
    pub fn import_text(&mut self, input: &str, format: RdfFormat) -> ParseResult<usize> {
        Ok(self.add_all(RdfParser::parse_str(input, format)?))
    }

    /// Parse a reader and add the quads; returns how many were new
    pub fn import_reader<R: BufRead>(
        &mut self,
        reader: R,
        format: RdfFormat,
        base_iri: Option<&str>,
        graph: &GraphName,
    ) -> ParseResult<usize> {
        Ok(self.add_all(RdfParser::parse(reader, format, base_iri, graph)?))
    }

    /// Serialize this store
    pub fn export_text(&self, format: RdfFormat, prefixes: &PrefixMap) -> SerializeResult<String> {
        RdfSerializer::serialize_store(self, format, prefixes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::types::NamedNode;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(RdfFormat::from_extension("TTL"), Some(RdfFormat::Turtle));
        assert_eq!(RdfFormat::from_extension("nq"), Some(RdfFormat::NQuads));
        assert_eq!(RdfFormat::from_extension("jsonld"), None);
        assert!(RdfFormat::TriG.supports_graphs());
        assert!(!RdfFormat::Turtle.supports_graphs());
    }

    #[test]
    fn test_import_and_export() {
        let mut store = QuadStore::new();
        let added = store
            .import_text(
                "<http://example.org/a> <http://example.org/b> \"c\" .\n\
                 <http://example.org/a> <http://example.org/b> \"c\" .\n",
                RdfFormat::NTriples,
            )
            .unwrap();
        assert_eq!(added, 1);

        let out = store.export_text(RdfFormat::NQuads, &PrefixMap::new()).unwrap();
        assert!(out.contains("<http://example.org/a>"));
    }

    #[test]
    fn test_parse_into_graph() {
        let graph: GraphName = NamedNode::new("http://example.org/g").unwrap().into();
        let quads = RdfParser::parse(
            "<http://example.org/a> <http://example.org/b> <http://example.org/c> .".as_bytes(),
            RdfFormat::Turtle,
            None,
            &graph,
        )
        .unwrap();
        assert_eq!(quads.len(), 1);
        assert_eq!(quads[0].graph(), &graph);
    }

    #[test]
    fn test_invalid_input() {
        let result = RdfParser::parse_str("<http://example.org/a> broken", RdfFormat::Turtle);
        assert!(matches!(result, Err(ParseError::Parse(_))));
    }
}
