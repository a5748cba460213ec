//! Record → quad mapping
//!
//! Semantic IDs are expanded through a [`PrefixMap`] (unknown prefixes are
//! kept as-is, which is still an absolute IRI). Mapping:
//! - `@type` → `rdf:type` edges
//! - edge sets → named-node objects
//! - booleans → `xsd:boolean`, integers → `xsd:integer`, other numbers → `xsd:double`
//! - strings → plain literals
//! - arrays fan out into one quad per element, `null` produces nothing
//!
//! Literal keys that are not semantic IDs have no IRI and are skipped.

use super::record::{PredicateValue, Primitive, Record};
use crate::rdf::{vocab, Literal, NamedNode, PrefixMap, Quad, QuadStore, Term};
use crate::semantic_id::is_semantic_id;
use tracing::{debug, warn};

/// Maps records to quads in the default graph
pub struct RecordMapper<'p> {
    prefixes: &'p PrefixMap,
}

impl<'p> RecordMapper<'p> {
    pub fn new(prefixes: &'p PrefixMap) -> Self {
        Self { prefixes }
    }

    /// Map every record into one store
    pub fn to_quads<'r>(&self, records: impl IntoIterator<Item = &'r Record>) -> QuadStore {
        let mut store = QuadStore::new();
        for record in records {
            self.map_record(record, &mut store);
        }
        store
    }

    fn node(&self, id: &str) -> Option<NamedNode> {
        match NamedNode::new(self.prefixes.expand_or_keep(id)) {
            Ok(node) => Some(node),
            Err(e) => {
                warn!("Skipping {}: {}", id, e);
                None
            }
        }
    }

    fn map_record(&self, record: &Record, store: &mut QuadStore) {
        let Some(subject) = self.node(record.id()) else {
            return;
        };

        if let Ok(rdf_type) = NamedNode::new(vocab::RDF_TYPE) {
            for t in record.types() {
                if let Some(object) = self.node(t) {
                    store.add(Quad::triple(subject.clone(), rdf_type.clone(), object));
                }
            }
        }

        for (key, value) in record.properties() {
            if !is_semantic_id(key) {
                debug!("Skipping non-IRI key {} on {}", key, record.id());
                continue;
            }
            let Some(predicate) = self.node(key) else {
                continue;
            };
            match value {
                PredicateValue::Edges(targets) => {
                    for target in targets {
                        if let Some(object) = self.node(target) {
                            store.add(Quad::triple(subject.clone(), predicate.clone(), object));
                        }
                    }
                }
                PredicateValue::Literal(literal) => {
                    for object in literal_terms(literal) {
                        store.add(Quad::triple(subject.clone(), predicate.clone(), object));
                    }
                }
            }
        }
    }
}

fn literal_terms(value: &Primitive) -> Vec<Term> {
    match value {
        Primitive::Null => Vec::new(),
        Primitive::Array(items) => items.iter().flat_map(literal_terms).collect(),
        Primitive::String(s) => vec![Literal::new_simple_literal(s.as_str()).into()],
        Primitive::Bool(b) => typed(b.to_string(), vocab::XSD_BOOLEAN).into_iter().collect(),
        Primitive::Number(n) => {
            let datatype = if n.is_i64() || n.is_u64() {
                vocab::XSD_INTEGER
            } else {
                vocab::XSD_DOUBLE
            };
            typed(n.to_string(), datatype).into_iter().collect()
        }
    }
}

fn typed(value: String, datatype: &str) -> Option<Term> {
    NamedNode::new(datatype)
        .ok()
        .map(|dt| Literal::new_typed_literal(value, dt).into())
}
