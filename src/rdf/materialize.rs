//! Graph materialization
//!
//! Turns a flat quad collection into a map of node identifier → nested node,
//! with prefix-compacted keys and resolved references. Every node lives in an
//! arena owned by the [`MaterializedGraph`]; embedding a node stores its
//! [`NodeRef`], so meshed (and cyclic) graphs need no shared mutable pointers.
//!
//! Nodes that are only ever referenced as objects and never appear as a
//! subject are dropped from the result.

use super::namespace::PrefixMap;
use super::store::QuadStore;
use super::types::{vocab, BlankNode, Literal, NamedNode, Quad, Subject, Term};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Key used for the `rdf:type` predicate
pub const TYPE_KEY: &str = "@type";
/// Key holding a node's identifier
pub const ID_KEY: &str = "@id";

/// Materialization options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterializeOptions {
    /// Rewrite IRIs as `prefix:suffix` using the prefix map
    pub compact: bool,
    /// Embed referenced named nodes in full instead of `{"@id": ...}` pointers
    pub meshed: bool,
    /// Give blank nodes an `@id` and list them in the result
    pub include_blank_ids: bool,
}

impl Default for MaterializeOptions {
    fn default() -> Self {
        Self {
            compact: true,
            meshed: true,
            include_blank_ids: false,
        }
    }
}

/// Handle to a node in a [`MaterializedGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef(usize);

/// A single value attached to a node property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    /// Embedded node
    Node(NodeRef),
    /// `{"@id": ...}` pointer to a named node
    Reference(String),
    /// `xsd:string` literal
    Plain(String),
    LanguageTagged { value: String, language: String },
    Typed { value: String, datatype: String },
}

/// One or more values under a property key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValues {
    Single(NodeValue),
    Many(Vec<NodeValue>),
}

impl PropertyValues {
    /// All values, in attachment order
    pub fn as_slice(&self) -> &[NodeValue] {
        match self {
            PropertyValues::Single(value) => std::slice::from_ref(value),
            PropertyValues::Many(values) => values,
        }
    }

    fn push(&mut self, value: NodeValue) {
        match self {
            PropertyValues::Many(values) => values.push(value),
            PropertyValues::Single(first) => {
                let first = std::mem::replace(first, NodeValue::Plain(String::new()));
                *self = PropertyValues::Many(vec![first, value]);
            }
        }
    }
}

/// A materialized node
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    id: Option<String>,
    properties: IndexMap<String, PropertyValues>,
}

impl Node {
    /// The `@id`, absent for blank nodes unless blank ids were requested
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValues> {
        self.properties.get(key)
    }

    /// Values under a key; empty when the key is absent
    pub fn values(&self, key: &str) -> &[NodeValue] {
        self.properties.get(key).map_or(&[], PropertyValues::as_slice)
    }

    /// Property entries in attachment order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValues)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    fn attach(&mut self, key: String, value: NodeValue) {
        match self.properties.get_mut(&key) {
            Some(existing) => existing.push(value),
            None => {
                self.properties.insert(key, PropertyValues::Single(value));
            }
        }
    }
}

/// Result of a materialization run
#[derive(Debug, Clone, Default)]
pub struct MaterializedGraph {
    pub(crate) nodes: Vec<Node>,
    pub(crate) roots: IndexMap<String, NodeRef>,
}

impl MaterializedGraph {
    /// Node listed in the result under `id`
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.roots.get(id).map(|r| &self.nodes[r.0])
    }

    /// Resolve an embedded node reference
    pub fn node(&self, node: NodeRef) -> &Node {
        &self.nodes[node.0]
    }

    pub fn contains(&self, id: &str) -> bool {
        self.roots.contains_key(id)
    }

    /// Result identifiers in the order subjects were first completed
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.roots.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.roots
            .iter()
            .map(|(id, r)| (id.as_str(), &self.nodes[r.0]))
    }

    pub(crate) fn root_refs(&self) -> impl Iterator<Item = (&str, NodeRef)> {
        self.roots.iter().map(|(id, r)| (id.as_str(), *r))
    }

    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }
}

/// Converts quads into a [`MaterializedGraph`]
///
/// Caches live for a single [`GraphMaterializer::materialize`] call, so one
/// materializer can be reused with the same prefixes and different inputs.
pub struct GraphMaterializer<'p> {
    prefixes: &'p PrefixMap,
    options: MaterializeOptions,
}

impl<'p> GraphMaterializer<'p> {
    pub fn new(prefixes: &'p PrefixMap, options: MaterializeOptions) -> Self {
        Self { prefixes, options }
    }

    /// Materialize quads in iteration order
    pub fn materialize<'q>(&self, quads: impl IntoIterator<Item = &'q Quad>) -> MaterializedGraph {
        let mut run = Run::new(self.prefixes, self.options);
        let mut processed = 0usize;
        for quad in quads {
            run.process(quad);
            processed += 1;
        }
        let dangling = run.missing_map.len();
        let graph = run.finish();
        debug!(
            "Materialized {} nodes from {} quads ({} dangling references dropped)",
            graph.len(),
            processed,
            dangling
        );
        graph
    }
}

/// Per-invocation state
struct Run<'p> {
    prefixes: &'p PrefixMap,
    options: MaterializeOptions,
    nodes: Vec<Node>,
    /// Named nodes seen as a subject
    subject_map: IndexMap<String, NodeRef>,
    /// Named nodes so far only seen as an object
    missing_map: FxHashMap<String, NodeRef>,
    /// Blank label -> node
    blank_map: IndexMap<String, NodeRef>,
    /// IRI -> compacted identifier
    id_cache: FxHashMap<String, String>,
}

impl<'p> Run<'p> {
    fn new(prefixes: &'p PrefixMap, options: MaterializeOptions) -> Self {
        let mut id_cache = FxHashMap::default();
        id_cache.insert(vocab::RDF_TYPE.to_string(), TYPE_KEY.to_string());
        Self {
            prefixes,
            options,
            nodes: Vec::new(),
            subject_map: IndexMap::new(),
            missing_map: FxHashMap::default(),
            blank_map: IndexMap::new(),
            id_cache,
        }
    }

    fn compact_id(&mut self, iri: &str) -> String {
        if let Some(cached) = self.id_cache.get(iri) {
            return cached.clone();
        }
        if !self.options.compact {
            return iri.to_string();
        }
        let short = self.prefixes.compact(iri).unwrap_or_else(|| iri.to_string());
        self.id_cache.insert(iri.to_string(), short.clone());
        short
    }

    fn alloc(&mut self, id: Option<String>) -> NodeRef {
        self.nodes.push(Node {
            id,
            properties: IndexMap::new(),
        });
        NodeRef(self.nodes.len() - 1)
    }

    fn resolve_named(&mut self, node: &NamedNode) -> (NodeRef, String) {
        let id = self.compact_id(node.as_str());
        if let Some(existing) = self.subject_map.get(&id).or_else(|| self.missing_map.get(&id)) {
            return (*existing, id);
        }
        let created = self.alloc(Some(id.clone()));
        self.missing_map.insert(id.clone(), created);
        (created, id)
    }

    fn resolve_blank(&mut self, node: &BlankNode) -> NodeRef {
        if let Some(existing) = self.blank_map.get(node.as_str()) {
            return *existing;
        }
        let id = self
            .options
            .include_blank_ids
            .then(|| format!("_:{}", node.as_str()));
        let created = self.alloc(id);
        self.blank_map.insert(node.as_str().to_string(), created);
        created
    }

    fn resolve_literal(&mut self, literal: &Literal) -> NodeValue {
        if let Some(language) = literal.language() {
            NodeValue::LanguageTagged {
                value: literal.value().to_string(),
                language: language.to_string(),
            }
        } else if literal.is_plain() {
            NodeValue::Plain(literal.value().to_string())
        } else {
            NodeValue::Typed {
                value: literal.value().to_string(),
                datatype: self.compact_id(literal.datatype_iri()),
            }
        }
    }

    fn process(&mut self, quad: &Quad) {
        let subject = match quad.subject() {
            Subject::NamedNode(n) => self.resolve_named(n).0,
            Subject::BlankNode(b) => self.resolve_blank(b),
        };
        let predicate = self.compact_id(quad.predicate().as_str());
        let object = match quad.object() {
            Term::Literal(l) => self.resolve_literal(l),
            Term::BlankNode(b) => NodeValue::Node(self.resolve_blank(b)),
            Term::NamedNode(n) => {
                let (node, id) = self.resolve_named(n);
                if self.options.meshed {
                    NodeValue::Node(node)
                } else {
                    NodeValue::Reference(id)
                }
            }
        };

        self.nodes[subject.0].attach(predicate, object);

        // seen as a subject now: resolves the forward reference
        if let Some(id) = self.nodes[subject.0].id.clone() {
            if self.missing_map.remove(&id).is_some() {
                self.subject_map.insert(id, subject);
            }
        }
    }

    fn finish(self) -> MaterializedGraph {
        let mut roots = self.subject_map;
        if self.options.include_blank_ids {
            for (label, node) in self.blank_map {
                roots.insert(format!("_:{}", label), node);
            }
        }
        MaterializedGraph {
            nodes: self.nodes,
            roots,
        }
    }
}

impl QuadStore {
    /// Materialize this store in iteration order
    pub fn materialize(&self, prefixes: &PrefixMap, options: MaterializeOptions) -> MaterializedGraph {
        GraphMaterializer::new(prefixes, options).materialize(self.iter())
    }
}
