//! Semstore
//!
//! An in-memory RDF quad store with a graph materializer and a semantic-record
//! persistence adapter.
//!
//! # Components
//!
//! - [`rdf`]: terms, quads, the indexed [`QuadStore`] with set algebra and
//!   pattern matching, prefix maps, text formats, shape-validation interface
//! - [`rdf::GraphMaterializer`]: quads → nested, reference-resolved nodes
//! - [`persistence`]: CRUD and LIST over records keyed by semantic ID, with
//!   optional timeouts
//! - [`config`]: YAML configuration
//!
//! ## Example Usage
//!
//! ```rust
//! use semstore::rdf::{vocab, Literal, MaterializeOptions, NamedNode, PrefixMap, Quad, QuadStore};
//!
//! let ex = |local: &str| NamedNode::new(format!("http://example.org/{}", local)).unwrap();
//!
//! let mut store = QuadStore::new();
//! store.add(Quad::triple(ex("alice"), ex("name"), Literal::new_simple_literal("Alice")));
//! store.add(Quad::triple(ex("alice"), NamedNode::new(vocab::RDF_TYPE).unwrap(), ex("Person")));
//!
//! let prefixes = PrefixMap::new().with_prefix("ex", "http://example.org/");
//! let graph = store.materialize(&prefixes, MaterializeOptions::default());
//! let json = graph.to_json();
//! assert_eq!(json["ex:alice"]["@type"]["@id"], "ex:Person");
//! assert_eq!(json["ex:alice"]["ex:name"], "Alice");
//! ```
//!
//! ```rust
//! use semstore::persistence::PersistenceAdapter;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let adapter = PersistenceAdapter::in_memory();
//! assert!(adapter.create("test:a").await.unwrap());
//! assert!(adapter.update_edge("test:a", "test:rel", "test:b").await.unwrap());
//! assert_eq!(adapter.list("test:a", "test:rel").await.unwrap(), Some(vec!["test:b".to_string()]));
//! # }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod persistence;
pub mod rdf;
pub mod semantic_id;

// Re-export main types for convenience
pub use config::{ConfigError, ConfigResult, SemstoreConfig};

pub use persistence::{
    AdapterConfig, AdapterError, AdapterResult, MemoryStorage, PersistenceAdapter, PredicateValue,
    Primitive, Record, RecordStorage,
};

pub use rdf::{
    BlankNode, GraphMaterializer, GraphName, Literal, MaterializeOptions, MaterializedGraph,
    NamedNode, PrefixMap, Quad, QuadPattern, QuadStore, RdfFormat, RdfParser, RdfSerializer,
    Subject, Term,
};

pub use semantic_id::is_semantic_id;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
