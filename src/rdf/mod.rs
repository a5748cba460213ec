//! RDF quad model, store and graph materialization
//!
//! This module implements:
//! - RDF terms and quads (subject-predicate-object-graph)
//! - An indexed in-memory quad store with set algebra and pattern matching
//! - Prefix compaction and expansion
//! - Materialization of quads into nested, reference-resolved nodes
//! - Text formats (Turtle, N-Triples, N-Quads, TriG) and JSON rendering
//! - A shape-validation interface
//!
//! # Example
//!
//! ```rust
//! use semstore::rdf::{Literal, MaterializeOptions, NamedNode, PrefixMap, Quad, QuadStore};
//!
//! let mut store = QuadStore::new();
//!
//! let alice = NamedNode::new("http://example.org/alice").unwrap();
//! let name = NamedNode::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! store.add(Quad::triple(alice.clone(), name.clone(), Literal::new_simple_literal("Alice")));
//!
//! let results = store.match_quads(Some(&alice.into()), Some(&name), None, None);
//! assert_eq!(results.len(), 1);
//!
//! let prefixes = PrefixMap::with_common_prefixes().with_prefix("ex", "http://example.org/");
//! let graph = store.materialize(&prefixes, MaterializeOptions::default());
//! assert!(graph.contains("ex:alice"));
//! ```

mod materialize;
mod namespace;
mod serialization;
mod store;
mod types;
mod validation;

pub use types::{
    vocab, BlankNode, GraphName, Literal, NamedNode, Quad, QuadPattern, RdfError, RdfResult,
    Subject, Term,
};

pub use store::{QuadIter, QuadStore, StoreError, StoreResult};

pub use namespace::{PrefixError, PrefixMap, PrefixResult};

pub use materialize::{
    GraphMaterializer, MaterializeOptions, MaterializedGraph, Node, NodeRef, NodeValue,
    PropertyValues, ID_KEY, TYPE_KEY,
};

pub use serialization::{
    jsonld::JsonLdSerializerWrapper, ParseError, ParseResult, RdfFormat, RdfParser,
    RdfSerializer, SerializeError, SerializeResult,
};

pub use validation::{
    ShapeValidator, ValidationError, ValidationReport, ValidationResult, Violation,
};
