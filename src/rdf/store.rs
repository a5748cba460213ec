//! RDF quad store implementation
//!
//! This module provides an in-memory quad store with set-algebra semantics and
//! per-position indexing.

use super::types::{GraphName, NamedNode, Quad, QuadPattern, Subject, Term};
use futures::{Stream, StreamExt};
use rustc_hash::FxHashMap;
use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt;
use std::hash::Hash;
use thiserror::Error;
use tracing::debug;

/// Quad store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// Operation is known but deliberately not implemented
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Insertion sequence number; orders iteration
type QuadId = u64;

/// Iterator over quads in insertion order
pub struct QuadIter<'a> {
    inner: btree_map::Values<'a, QuadId, Quad>,
}

impl<'a> Iterator for QuadIter<'a> {
    type Item = &'a Quad;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for QuadIter<'_> {}

/// In-memory quad store
///
/// Holds a set of quads under structural equality. Each quad gets a
/// monotonically increasing sequence number on insertion, which keeps
/// iteration deterministic. Four indices map each term position
/// (subject, predicate, object, graph) to the sequence numbers of the quads
/// carrying that term, so a pattern with any bound position starts from the
/// smallest matching bucket instead of scanning the store.
#[derive(Clone, Default)]
pub struct QuadStore {
    next_id: QuadId,

    /// Quad -> sequence number (membership test)
    ids: FxHashMap<Quad, QuadId>,

    /// Sequence number -> quad (primary storage, iteration order)
    quads: BTreeMap<QuadId, Quad>,

    subject_index: FxHashMap<Subject, BTreeSet<QuadId>>,
    predicate_index: FxHashMap<NamedNode, BTreeSet<QuadId>>,
    object_index: FxHashMap<Term, BTreeSet<QuadId>>,
    graph_index: FxHashMap<GraphName, BTreeSet<QuadId>>,
}

impl QuadStore {
    /// Create a new empty quad store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a quad; returns whether the store changed
    pub fn add(&mut self, quad: Quad) -> bool {
        if self.ids.contains_key(&quad) {
            return false;
        }

        let id = self.next_id;
        self.next_id += 1;

        index_insert(&mut self.subject_index, quad.subject(), id);
        index_insert(&mut self.predicate_index, quad.predicate(), id);
        index_insert(&mut self.object_index, quad.object(), id);
        index_insert(&mut self.graph_index, quad.graph(), id);

        self.ids.insert(quad.clone(), id);
        self.quads.insert(id, quad);
        true
    }

    /// Insert every quad; returns how many were new
    pub fn add_all(&mut self, quads: impl IntoIterator<Item = Quad>) -> usize {
        quads.into_iter().map(|quad| self.add(quad)).filter(|added| *added).count()
    }

    /// Remove a quad; returns whether the store changed
    pub fn delete(&mut self, quad: &Quad) -> bool {
        let Some(id) = self.ids.remove(quad) else {
            return false;
        };

        self.quads.remove(&id);
        index_remove(&mut self.subject_index, quad.subject(), id);
        index_remove(&mut self.predicate_index, quad.predicate(), id);
        index_remove(&mut self.object_index, quad.object(), id);
        index_remove(&mut self.graph_index, quad.graph(), id);
        true
    }

    /// Remove every quad matching the pattern; returns how many were removed
    pub fn delete_matches(&mut self, pattern: &QuadPattern) -> usize {
        let doomed: Vec<Quad> = self.select(pattern).into_iter().cloned().collect();
        for quad in &doomed {
            self.delete(quad);
        }
        debug!("Deleted {} quads matching pattern", doomed.len());
        doomed.len()
    }

    /// Structural membership test
    pub fn has(&self, quad: &Quad) -> bool {
        self.ids.contains_key(quad)
    }

    /// New store with every quad whose bound positions equal the given terms
    pub fn match_quads(
        &self,
        subject: Option<&Subject>,
        predicate: Option<&NamedNode>,
        object: Option<&Term>,
        graph: Option<&GraphName>,
    ) -> QuadStore {
        self.match_pattern(&QuadPattern::new(
            subject.cloned(),
            predicate.cloned(),
            object.cloned(),
            graph.cloned(),
        ))
    }

    /// New store with every quad matching the pattern
    pub fn match_pattern(&self, pattern: &QuadPattern) -> QuadStore {
        self.select(pattern).into_iter().cloned().collect()
    }

    /// Union of both stores
    pub fn union(&self, other: &QuadStore) -> QuadStore {
        let mut result = self.clone();
        result.extend(other.iter().cloned());
        result
    }

    /// Quads present in both stores
    pub fn intersection(&self, other: &QuadStore) -> QuadStore {
        self.filter(|quad, _| other.has(quad))
    }

    /// Quads of this store that are absent from `other`
    pub fn difference(&self, other: &QuadStore) -> QuadStore {
        self.filter(|quad, _| !other.has(quad))
    }

    /// Subset test: every quad of `other` is in this store
    pub fn contains(&self, other: &QuadStore) -> bool {
        other.iter().all(|quad| self.has(quad))
    }

    /// Same size and mutual containment
    pub fn equals(&self, other: &QuadStore) -> bool {
        self.len() == other.len() && self.contains(other) && other.contains(self)
    }

    /// New store with every quad the predicate accepts
    pub fn filter<F>(&self, mut predicate: F) -> QuadStore
    where
        F: FnMut(&Quad, &QuadStore) -> bool,
    {
        self.iter()
            .filter(|quad| predicate(quad, self))
            .cloned()
            .collect()
    }

    /// New store of transformed quads; structurally equal results collapse
    pub fn map<F>(&self, mut transform: F) -> QuadStore
    where
        F: FnMut(&Quad, &QuadStore) -> Quad,
    {
        self.iter().map(|quad| transform(quad, self)).collect()
    }

    pub fn for_each<F>(&self, mut visit: F)
    where
        F: FnMut(&Quad, &QuadStore),
    {
        for quad in self.iter() {
            visit(quad, self);
        }
    }

    pub fn reduce<A, F>(&self, initial: A, mut fold: F) -> A
    where
        F: FnMut(A, &Quad, &QuadStore) -> A,
    {
        self.iter().fold(initial, |acc, quad| fold(acc, quad, self))
    }

    /// True if the predicate holds for every quad (vacuously true when empty)
    pub fn every<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&Quad, &QuadStore) -> bool,
    {
        self.iter().all(|quad| predicate(quad, self))
    }

    /// True if the predicate holds for at least one quad
    pub fn some<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&Quad, &QuadStore) -> bool,
    {
        self.iter().any(|quad| predicate(quad, self))
    }

    /// All quads in store order
    pub fn to_array(&self) -> Vec<Quad> {
        self.to_vec()
    }

    pub fn to_vec(&self) -> Vec<Quad> {
        self.iter().cloned().collect()
    }

    /// Number of quads
    pub fn size(&self) -> usize {
        self.len()
    }

    pub fn len(&self) -> usize {
        self.quads.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quads.is_empty()
    }

    /// Get an iterator over all quads in store order
    pub fn iter(&self) -> QuadIter<'_> {
        QuadIter {
            inner: self.quads.values(),
        }
    }

    /// Distinct subjects, in no particular order
    pub fn subjects(&self) -> Vec<Subject> {
        self.subject_index.keys().cloned().collect()
    }

    /// Distinct graphs, in no particular order
    pub fn graphs(&self) -> Vec<GraphName> {
        self.graph_index.keys().cloned().collect()
    }

    /// Stable serialization independent of blank node labels.
    ///
    /// RDF dataset canonicalization is not implemented; this always fails
    /// rather than return a label-dependent string.
    pub fn to_canonical(&self) -> StoreResult<String> {
        Err(StoreError::Unsupported(
            "canonical serialization (RDF dataset normalization)".to_string(),
        ))
    }

    /// Add every quad of a stream.
    ///
    /// Stops at the first error. Quads read before the error stay in the store.
    pub async fn import_stream<S, E>(&mut self, stream: S) -> Result<usize, E>
    where
        S: Stream<Item = Result<Quad, E>>,
    {
        futures::pin_mut!(stream);
        let mut added = 0;
        while let Some(item) = stream.next().await {
            if self.add(item?) {
                added += 1;
            }
        }
        debug!("Imported {} quads from stream", added);
        Ok(added)
    }

    /// Quads matching the pattern, in store order
    fn select(&self, pattern: &QuadPattern) -> Vec<&Quad> {
        let mut buckets = Vec::with_capacity(4);
        if let Some(ref s) = pattern.subject {
            buckets.push(self.subject_index.get(s));
        }
        if let Some(ref p) = pattern.predicate {
            buckets.push(self.predicate_index.get(p));
        }
        if let Some(ref o) = pattern.object {
            buckets.push(self.object_index.get(o));
        }
        if let Some(ref g) = pattern.graph {
            buckets.push(self.graph_index.get(g));
        }

        if buckets.is_empty() {
            return self.quads.values().collect();
        }

        let mut smallest: Option<&BTreeSet<QuadId>> = None;
        for bucket in buckets {
            // a bound term that was never indexed cannot match anything
            let Some(bucket) = bucket else {
                return Vec::new();
            };
            if smallest.map_or(true, |s| bucket.len() < s.len()) {
                smallest = Some(bucket);
            }
        }

        smallest
            .into_iter()
            .flatten()
            .filter_map(|id| self.quads.get(id))
            .filter(|quad| pattern.matches(quad))
            .collect()
    }
}

fn index_insert<K: Hash + Eq + Clone>(
    index: &mut FxHashMap<K, BTreeSet<QuadId>>,
    key: &K,
    id: QuadId,
) {
    index.entry(key.clone()).or_default().insert(id);
}

fn index_remove<K: Hash + Eq>(index: &mut FxHashMap<K, BTreeSet<QuadId>>, key: &K, id: QuadId) {
    if let Some(bucket) = index.get_mut(key) {
        bucket.remove(&id);
        if bucket.is_empty() {
            index.remove(key);
        }
    }
}

impl PartialEq for QuadStore {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other)
    }
}

impl Eq for QuadStore {}

impl fmt::Debug for QuadStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl fmt::Display for QuadStore {
    /// N-Quads text, one quad per line
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, quad) in self.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", quad)?;
        }
        Ok(())
    }
}

impl FromIterator<Quad> for QuadStore {
    fn from_iter<T: IntoIterator<Item = Quad>>(iter: T) -> Self {
        let mut store = QuadStore::new();
        store.extend(iter);
        store
    }
}

impl Extend<Quad> for QuadStore {
    fn extend<T: IntoIterator<Item = Quad>>(&mut self, iter: T) {
        for quad in iter {
            self.add(quad);
        }
    }
}

impl<'a> IntoIterator for &'a QuadStore {
    type Item = &'a Quad;
    type IntoIter = QuadIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::types::{BlankNode, Literal};

    fn iri(s: &str) -> NamedNode {
        NamedNode::new(format!("http://example.org/{}", s)).unwrap()
    }

    fn name_quad(who: &str, name: &str) -> Quad {
        Quad::triple(iri(who), iri("name"), Literal::new_simple_literal(name))
    }

    #[test]
    fn test_add_has_delete() {
        let mut store = QuadStore::new();
        let quad = name_quad("alice", "Alice");

        assert!(store.add(quad.clone()));
        assert!(store.has(&quad));
        assert_eq!(store.size(), 1);

        assert!(store.delete(&quad));
        assert!(!store.has(&quad));
        assert!(!store.delete(&quad));
        assert!(store.is_empty());
    }

    #[test]
    fn test_duplicate_add_is_noop() {
        let mut store = QuadStore::new();
        let quad = name_quad("alice", "Alice");

        assert!(store.add(quad.clone()));
        assert!(!store.add(quad));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_indices_cleaned_on_delete() {
        let mut store = QuadStore::new();
        let quad = name_quad("alice", "Alice");
        store.add(quad.clone());
        store.delete(&quad);

        assert!(store.subjects().is_empty());
        assert!(store.graphs().is_empty());
        assert!(store.match_quads(Some(&iri("alice").into()), None, None, None).is_empty());
    }

    #[test]
    fn test_match_by_subject_and_object() {
        let mut store = QuadStore::new();
        store.add(name_quad("alice", "Alice"));
        store.add(name_quad("bob", "Bob"));
        store.add(Quad::triple(iri("alice"), iri("knows"), iri("bob")));

        let alice: Subject = iri("alice").into();
        assert_eq!(store.match_quads(Some(&alice), None, None, None).len(), 2);

        let bob: Term = iri("bob").into();
        let knows_bob = store.match_quads(None, None, Some(&bob), None);
        assert_eq!(knows_bob.len(), 1);
        assert!(knows_bob.has(&Quad::triple(iri("alice"), iri("knows"), iri("bob"))));

        let both = store.match_quads(Some(&alice), Some(&iri("name")), None, None);
        assert_eq!(both.to_array(), vec![name_quad("alice", "Alice")]);
    }

    #[test]
    fn test_match_unknown_term_is_empty() {
        let mut store = QuadStore::new();
        store.add(name_quad("alice", "Alice"));

        let carol: Subject = iri("carol").into();
        assert!(store.match_quads(Some(&carol), None, None, None).is_empty());
    }

    #[test]
    fn test_match_by_graph() {
        let mut store = QuadStore::new();
        let quad = name_quad("alice", "Alice");
        store.add(quad.clone());
        store.add(quad.with_graph(iri("g")));

        assert_eq!(store.len(), 2);
        let in_g = store.match_quads(None, None, None, Some(&iri("g").into()));
        assert_eq!(in_g.len(), 1);
        let in_default = store.match_quads(None, None, None, Some(&GraphName::DefaultGraph));
        assert_eq!(in_default.to_array(), vec![quad]);
    }

    #[test]
    fn test_delete_matches() {
        let mut store = QuadStore::new();
        store.add(name_quad("alice", "Alice"));
        store.add(name_quad("bob", "Bob"));
        store.add(Quad::triple(iri("alice"), iri("knows"), iri("bob")));

        let pattern = QuadPattern::new(None, Some(iri("name")), None, None);
        assert_eq!(store.delete_matches(&pattern), 2);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_iteration_follows_insertion_order() {
        let quads = vec![
            name_quad("c", "C"),
            name_quad("a", "A"),
            name_quad("b", "B"),
        ];
        let store: QuadStore = quads.clone().into_iter().collect();
        assert_eq!(store.to_array(), quads);
    }

    #[test]
    fn test_map_collapses_duplicates() {
        let mut store = QuadStore::new();
        store.add(name_quad("alice", "Alice"));
        store.add(name_quad("bob", "Bob"));

        let renamed = store.map(|quad, _| {
            Quad::triple(quad.subject().clone(), iri("label"), Literal::new_simple_literal("x"))
        });
        assert_eq!(renamed.len(), 2);

        let collapsed = store.map(|_, _| name_quad("x", "X"));
        assert_eq!(collapsed.len(), 1);
    }

    #[test]
    fn test_reduce_every_some() {
        let mut store = QuadStore::new();
        store.add(name_quad("alice", "Alice"));
        store.add(Quad::triple(BlankNode::new("b1").unwrap(), iri("name"), iri("x")));

        let literals = store.reduce(0, |acc, quad, _| acc + quad.object().is_literal() as usize);
        assert_eq!(literals, 1);
        assert!(store.every(|quad, _| quad.predicate() == &iri("name")));
        assert!(store.some(|quad, _| quad.subject().is_blank_node()));
        assert!(QuadStore::new().every(|_, _| false));
    }

    #[test]
    fn test_for_each_sees_store() {
        let mut store = QuadStore::new();
        store.add(name_quad("alice", "Alice"));
        store.add(name_quad("bob", "Bob"));

        let mut seen = 0;
        store.for_each(|quad, s| {
            assert!(s.has(quad));
            seen += 1;
        });
        assert_eq!(seen, 2);
    }

    #[test]
    fn test_canonical_is_unsupported() {
        let store = QuadStore::new();
        assert!(matches!(store.to_canonical(), Err(StoreError::Unsupported(_))));
    }

    #[test]
    fn test_display_is_nquads() {
        let mut store = QuadStore::new();
        store.add(name_quad("alice", "Alice"));
        store.add(name_quad("bob", "Bob"));

        let text = store.to_string();
        assert_eq!(text.lines().count(), 2);
        assert!(text.starts_with("<http://example.org/alice>"));
    }

    #[tokio::test]
    async fn test_import_stream_stops_at_error() {
        let items: Vec<Result<Quad, String>> = vec![
            Ok(name_quad("alice", "Alice")),
            Ok(name_quad("alice", "Alice")),
            Err("broken".to_string()),
            Ok(name_quad("bob", "Bob")),
        ];

        let mut store = QuadStore::new();
        let result = store.import_stream(futures::stream::iter(items)).await;
        assert_eq!(result, Err("broken".to_string()));
        assert_eq!(store.len(), 1);

        let ok: Vec<Result<Quad, String>> = vec![Ok(name_quad("bob", "Bob"))];
        assert_eq!(store.import_stream(futures::stream::iter(ok)).await, Ok(1));
    }
}
