//! Semantic records
//!
//! A record is keyed by a semantic ID and holds a type set plus predicate
//! values. Every predicate value is either a primitive literal or an edge set
//! of semantic IDs, never both.

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Number, Value};
use thiserror::Error;

/// Type every record carries
pub const RESOURCE_TYPE: &str = "rdfs:Resource";

/// Record key holding the identifier
pub const ID_KEY: &str = "@id";
/// Record key holding the type set
pub const TYPE_KEY: &str = "@type";

/// Record mapping errors
#[derive(Error, Debug)]
pub enum RecordError {
    /// Value is not a primitive
    #[error("not a primitive value: {0}")]
    NotPrimitive(Value),

    /// Record JSON is not an object
    #[error("record must be a JSON object")]
    NotAnObject,

    /// `@id` missing or not a string
    #[error("record has no string @id")]
    MissingId,

    /// `@type` is not a string or an array of strings
    #[error("invalid @type: {0}")]
    InvalidType(Value),
}

pub type RecordResult<T> = Result<T, RecordError>;

/// A value that can be stored as a record literal
///
/// Arrays are homogeneous: all booleans, all numbers, or all strings.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Primitive>),
}

impl Primitive {
    pub fn to_json(&self) -> Value {
        match self {
            Primitive::Null => Value::Null,
            Primitive::Bool(b) => Value::Bool(*b),
            Primitive::Number(n) => Value::Number(n.clone()),
            Primitive::String(s) => Value::String(s.clone()),
            Primitive::Array(items) => Value::Array(items.iter().map(Primitive::to_json).collect()),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Primitive::String(s) => Some(s),
            _ => None,
        }
    }

    fn scalar_kind(value: &Value) -> Option<u8> {
        match value {
            Value::Bool(_) => Some(0),
            Value::Number(_) => Some(1),
            Value::String(_) => Some(2),
            _ => None,
        }
    }
}

impl TryFrom<Value> for Primitive {
    type Error = RecordError;

    fn try_from(value: Value) -> RecordResult<Self> {
        match value {
            Value::Null => Ok(Primitive::Null),
            Value::Bool(b) => Ok(Primitive::Bool(b)),
            Value::Number(n) => Ok(Primitive::Number(n)),
            Value::String(s) => Ok(Primitive::String(s)),
            Value::Array(items) => {
                let first = items.first().map(Primitive::scalar_kind);
                let homogeneous = items
                    .iter()
                    .all(|item| Some(Primitive::scalar_kind(item)) == first && first != Some(None));
                if !homogeneous {
                    return Err(RecordError::NotPrimitive(Value::Array(items)));
                }
                items
                    .into_iter()
                    .map(Primitive::try_from)
                    .collect::<RecordResult<Vec<_>>>()
                    .map(Primitive::Array)
            }
            Value::Object(_) => Err(RecordError::NotPrimitive(value)),
        }
    }
}

impl From<&str> for Primitive {
    fn from(value: &str) -> Self {
        Primitive::String(value.to_string())
    }
}

impl From<String> for Primitive {
    fn from(value: String) -> Self {
        Primitive::String(value)
    }
}

impl From<bool> for Primitive {
    fn from(value: bool) -> Self {
        Primitive::Bool(value)
    }
}

impl From<i64> for Primitive {
    fn from(value: i64) -> Self {
        Primitive::Number(value.into())
    }
}

/// Value held under a record predicate
#[derive(Debug, Clone, PartialEq)]
pub enum PredicateValue {
    Literal(Primitive),
    Edges(IndexSet<String>),
}

impl PredicateValue {
    pub fn as_literal(&self) -> Option<&Primitive> {
        match self {
            PredicateValue::Literal(p) => Some(p),
            PredicateValue::Edges(_) => None,
        }
    }

    pub fn as_edges(&self) -> Option<&IndexSet<String>> {
        match self {
            PredicateValue::Edges(edges) => Some(edges),
            PredicateValue::Literal(_) => None,
        }
    }

    /// Literals as-is; edge sets as arrays of `{"@id": ...}`
    pub fn to_json(&self) -> Value {
        match self {
            PredicateValue::Literal(p) => p.to_json(),
            PredicateValue::Edges(edges) => {
                Value::Array(edges.iter().map(|id| json!({ ID_KEY: id })).collect())
            }
        }
    }

    /// Inverse of [`PredicateValue::to_json`]. A non-empty array of
    /// `{"@id": string}` objects is an edge set; anything else must be a
    /// primitive. An empty array reads back as an empty literal array.
    pub fn from_json(value: Value) -> RecordResult<Self> {
        if let Value::Array(items) = &value {
            let targets: Option<IndexSet<String>> = items.iter().map(edge_target).collect();
            if let Some(targets) = targets.filter(|t| !t.is_empty()) {
                return Ok(PredicateValue::Edges(targets));
            }
        }
        Primitive::try_from(value).map(PredicateValue::Literal)
    }
}

fn edge_target(value: &Value) -> Option<String> {
    let object = value.as_object()?;
    if object.len() != 1 {
        return None;
    }
    object.get(ID_KEY)?.as_str().map(str::to_string)
}

/// A semantic record
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    id: String,
    types: IndexSet<String>,
    properties: IndexMap<String, PredicateValue>,
}

impl Record {
    /// A fresh record typed `rdfs:Resource`
    pub fn new(id: impl Into<String>) -> Self {
        let mut types = IndexSet::new();
        types.insert(RESOURCE_TYPE.to_string());
        Self {
            id: id.into(),
            types,
            properties: IndexMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn types(&self) -> &IndexSet<String> {
        &self.types
    }

    pub fn get(&self, key: &str) -> Option<&PredicateValue> {
        self.properties.get(key)
    }

    /// Value under `key`, including the reserved keys: `@type` reads as an
    /// edge set of types, `@id` as a string literal
    pub fn value(&self, key: &str) -> Option<PredicateValue> {
        match key {
            ID_KEY => Some(PredicateValue::Literal(Primitive::String(self.id.clone()))),
            TYPE_KEY => Some(PredicateValue::Edges(self.types.clone())),
            _ => self.properties.get(key).cloned(),
        }
    }

    pub fn properties(&self) -> impl Iterator<Item = (&str, &PredicateValue)> {
        self.properties.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Union `types` into the type set
    pub fn add_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types.extend(types.into_iter().map(Into::into));
        if !self.types.contains(RESOURCE_TYPE) {
            self.types.insert(RESOURCE_TYPE.to_string());
        }
    }

    /// Add `target` to the edge set under `predicate`; false if the key
    /// holds a literal
    pub fn insert_edge(&mut self, predicate: &str, target: &str) -> bool {
        match self
            .properties
            .entry(predicate.to_string())
            .or_insert_with(|| PredicateValue::Edges(IndexSet::new()))
        {
            PredicateValue::Edges(edges) => {
                edges.insert(target.to_string());
                true
            }
            PredicateValue::Literal(_) => false,
        }
    }

    /// Remove `target` from the edge set under `predicate`; true if it was present.
    /// The emptied set is kept so the key stays an edge key.
    pub fn remove_edge(&mut self, predicate: &str, target: &str) -> bool {
        match self.properties.get_mut(predicate) {
            Some(PredicateValue::Edges(edges)) => edges.shift_remove(target),
            _ => false,
        }
    }

    /// Overwrite the literal under `key`; false if the key holds an edge set
    pub fn set_literal(&mut self, key: &str, value: Primitive) -> bool {
        match self.properties.get_mut(key) {
            Some(PredicateValue::Edges(_)) => false,
            Some(existing) => {
                *existing = PredicateValue::Literal(value);
                true
            }
            None => {
                self.properties.insert(key.to_string(), PredicateValue::Literal(value));
                true
            }
        }
    }

    /// Transport form: `{"@id", "@type": [...], key: value, ...}`
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert(ID_KEY.to_string(), Value::String(self.id.clone()));
        out.insert(
            TYPE_KEY.to_string(),
            Value::Array(self.types.iter().cloned().map(Value::String).collect()),
        );
        for (key, value) in &self.properties {
            out.insert(key.clone(), value.to_json());
        }
        Value::Object(out)
    }

    /// Inverse of [`Record::to_json`]
    pub fn from_json(value: Value) -> RecordResult<Self> {
        let Value::Object(mut object) = value else {
            return Err(RecordError::NotAnObject);
        };
        let id = match object.shift_remove(ID_KEY) {
            Some(Value::String(id)) => id,
            _ => return Err(RecordError::MissingId),
        };

        let mut record = Record::new(id);
        match object.shift_remove(TYPE_KEY) {
            None => {}
            Some(Value::String(t)) => record.add_types([t]),
            Some(Value::Array(items)) => {
                let types = items
                    .iter()
                    .map(|t| t.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .ok_or_else(|| RecordError::InvalidType(Value::Array(items.clone())))?;
                record.add_types(types);
            }
            Some(other) => return Err(RecordError::InvalidType(other)),
        }

        for (key, value) in object {
            record.properties.insert(key, PredicateValue::from_json(value)?);
        }
        Ok(record)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Record::from_json(value).map_err(serde::de::Error::custom)
    }
}
