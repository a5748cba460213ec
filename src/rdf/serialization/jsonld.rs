//! JSON rendering of materialized graphs
//!
//! Output follows compacted JSON-LD conventions: `@id` and `@type` keys,
//! `{"@value", "@language"}` and `{"@value", "@type"}` objects for non-plain
//! literals. A node that is already being rendered further up the current
//! path is written as an `{"@id": ...}` pointer so cyclic graphs terminate.

use super::{SerializeError, SerializeResult};
use crate::rdf::materialize::{MaterializedGraph, NodeRef, NodeValue, PropertyValues, ID_KEY, TYPE_KEY};
use crate::rdf::namespace::PrefixMap;
use serde_json::{json, Map, Value};

impl MaterializedGraph {
    /// Render as a JSON object of identifier → node
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        for (id, node) in self.root_refs() {
            out.insert(id.to_string(), self.node_to_json(node));
        }
        Value::Object(out)
    }

    /// Render one node and everything reachable from it
    pub fn node_to_json(&self, node: NodeRef) -> Value {
        let mut path = Vec::new();
        self.render_node(node, &mut path)
    }

    fn render_node(&self, node: NodeRef, path: &mut Vec<NodeRef>) -> Value {
        let current = self.node(node);
        let mut out = Map::new();
        if let Some(id) = current.id() {
            out.insert(ID_KEY.to_string(), Value::String(id.to_string()));
        }
        if path.contains(&node) {
            return Value::Object(out);
        }

        path.push(node);
        for (key, values) in current.properties() {
            let rendered = match values {
                PropertyValues::Single(value) => self.render_value(value, path),
                PropertyValues::Many(values) => Value::Array(
                    values.iter().map(|v| self.render_value(v, path)).collect(),
                ),
            };
            out.insert(key.to_string(), rendered);
        }
        path.pop();

        Value::Object(out)
    }

    fn render_value(&self, value: &NodeValue, path: &mut Vec<NodeRef>) -> Value {
        match value {
            NodeValue::Node(node) => self.render_node(*node, path),
            NodeValue::Reference(id) => json!({ ID_KEY: id }),
            NodeValue::Plain(value) => Value::String(value.clone()),
            NodeValue::LanguageTagged { value, language } => {
                json!({ "@value": value, "@language": language })
            }
            NodeValue::Typed { value, datatype } => json!({ "@value": value, TYPE_KEY: datatype }),
        }
    }
}

/// JSON-LD serializer
pub struct JsonLdSerializerWrapper;

impl JsonLdSerializerWrapper {
    /// Serialize a materialized graph as a pretty-printed identifier → node map
    pub fn serialize(graph: &MaterializedGraph) -> SerializeResult<String> {
        serde_json::to_string_pretty(&graph.to_json())
            .map_err(|e| SerializeError::Serialize(e.to_string()))
    }

    /// Serialize as a JSON-LD document with an `@context` built from `prefixes`
    /// and the result nodes under `@graph`
    pub fn serialize_document(graph: &MaterializedGraph, prefixes: &PrefixMap) -> SerializeResult<String> {
        let context: Map<String, Value> = prefixes
            .iter()
            .map(|(prefix, iri)| (prefix.to_string(), Value::String(iri.to_string())))
            .collect();
        let nodes: Vec<Value> = graph.root_refs().map(|(_, node)| graph.node_to_json(node)).collect();

        serde_json::to_string_pretty(&json!({ "@context": context, "@graph": nodes }))
            .map_err(|e| SerializeError::Serialize(e.to_string()))
    }
}
