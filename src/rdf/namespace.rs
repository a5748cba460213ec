//! RDF namespace and prefix management
//!
//! This module handles namespace prefixes for compact IRI notation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Prefix errors
#[derive(Error, Debug)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Not a compact IRI
    #[error("Invalid compact IRI: {0}")]
    InvalidIri(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

/// Ordered prefix → base IRI mapping
///
/// Compaction picks the longest base IRI that prefixes the input, so
/// overlapping namespaces (`ex:` and `exdata:` on nested paths) compact
/// deterministically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PrefixMap {
    prefixes: IndexMap<String, String>,
}

impl PrefixMap {
    /// Create an empty prefix map
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a prefix map with the common RDF/RDFS/OWL prefixes
    pub fn with_common_prefixes() -> Self {
        let mut map = Self::new();
        map.add_prefix("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        map.add_prefix("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        map.add_prefix("xsd", "http://www.w3.org/2001/XMLSchema#");
        map.add_prefix("owl", "http://www.w3.org/2002/07/owl#");
        map.add_prefix("foaf", "http://xmlns.com/foaf/0.1/");
        map.add_prefix("dc", "http://purl.org/dc/elements/1.1/");
        map.add_prefix("dcterms", "http://purl.org/dc/terms/");
        map
    }

    /// Add a prefix, replacing an earlier binding of the same prefix
    pub fn add_prefix(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    /// Builder-style [`PrefixMap::add_prefix`]
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.add_prefix(prefix, iri);
        self
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    /// Expand a compact IRI (prefix:local) to full IRI
    pub fn expand(&self, compact_iri: &str) -> PrefixResult<String> {
        if let Some((prefix, local)) = compact_iri.split_once(':') {
            let iri = self.get_iri(prefix)?;
            Ok(format!("{}{}", iri, local))
        } else {
            Err(PrefixError::InvalidIri(compact_iri.to_string()))
        }
    }

    /// Expand a compact IRI when its prefix is known, otherwise return the input unchanged
    pub fn expand_or_keep(&self, value: &str) -> String {
        self.expand(value).unwrap_or_else(|_| value.to_string())
    }

    /// Compact an IRI using the longest matching base IRI
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, base)| !base.is_empty() && iri.starts_with(base.as_str()))
            .max_by_key(|(_, base)| base.len())
            .map(|(prefix, base)| format!("{}:{}", prefix, &iri[base.len()..]))
    }

    /// Iterate over `(prefix, base IRI)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.prefixes.iter().map(|(p, i)| (p.as_str(), i.as_str()))
    }

    pub fn len(&self) -> usize {
        self.prefixes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prefixes.is_empty()
    }
}

impl<P: Into<String>, I: Into<String>> FromIterator<(P, I)> for PrefixMap {
    fn from_iter<T: IntoIterator<Item = (P, I)>>(iter: T) -> Self {
        let mut map = Self::new();
        for (prefix, iri) in iter {
            map.add_prefix(prefix, iri);
        }
        map
    }
}
