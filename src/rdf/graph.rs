//! Insertion-ordered, deduplicated triple collection
//!
//! A [`Graph`] remembers the order in which triples were inserted, silently
//! drops exact duplicates, and optionally keeps a [`GraphIndex`] and a
//! per-subject [`Resource`] grouping up to date on every insertion. All
//! mutation runs under one lock so parallel codec workers can feed a shared
//! graph through `&Graph`.

use indexmap::IndexMap;
use parking_lot::Mutex;
use rustc_hash::FxHashSet;
use thiserror::Error;

use super::graph_index::{GraphIndex, GraphStats};
use super::namespace::{Namespace, NamespaceManager};
use super::resource::Resource;
use super::term::{Iri, Object, Predicate, Subject};
use super::triple::Triple;

/// Graph errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// A read-once was attempted after the graph changed under it
    #[error("triples have been added after previous read")]
    AddedAfterExport,

    /// A statistics or namespace query needs the opt-in graph index
    #[error("graph index is not enabled")]
    IndexDisabled,

    /// An indexed namespace prefix is not known to the namespace manager
    #[error("unknown base URI: {0}")]
    UnknownNamespace(String),
}

pub type GraphResult<T> = Result<T, GraphError>;

#[derive(Debug, Default)]
struct GraphInner {
    triples: Vec<Triple>,
    seen: FxHashSet<u64>,
    index: Option<GraphIndex>,
    resources: Option<IndexMap<Subject, Resource>>,
    exported: bool,
    added_after_export: bool,
}

impl GraphInner {
    fn insert(&mut self, triple: Triple) -> bool {
        if !self.seen.insert(triple.content_hash()) {
            return false;
        }

        if self.exported {
            self.added_after_export = true;
        }

        if let Some(index) = &mut self.index {
            index.update(&triple, false);
        }

        if let Some(resources) = &mut self.resources {
            resources
                .entry(triple.subject.clone())
                .or_insert_with(|| Resource::new(triple.subject.clone()))
                .add(&triple);
        }

        self.triples.push(triple);
        true
    }
}

/// An ordered, deduplicated collection of triples.
#[derive(Debug)]
pub struct Graph {
    base_uri: Option<Iri>,
    namespaces: NamespaceManager,
    inner: Mutex<GraphInner>,
}

impl Graph {
    /// Create an empty graph with the secondary index and the per-subject
    /// resource grouping enabled.
    pub fn new() -> Self {
        Graph {
            base_uri: None,
            namespaces: NamespaceManager::new(),
            inner: Mutex::new(GraphInner {
                index: Some(GraphIndex::new()),
                resources: Some(IndexMap::new()),
                ..GraphInner::default()
            }),
        }
    }

    /// Create an empty graph without index or resource grouping, for
    /// pipelines that only stream triples through.
    pub fn bare() -> Self {
        Graph {
            base_uri: None,
            namespaces: NamespaceManager::new(),
            inner: Mutex::new(GraphInner::default()),
        }
    }

    /// Replace the namespace manager used for prefix resolution.
    pub fn with_namespaces(mut self, namespaces: NamespaceManager) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn namespace_manager(&self) -> &NamespaceManager {
        &self.namespaces
    }

    pub fn set_base_uri(&mut self, base_uri: Iri) {
        self.base_uri = Some(base_uri);
    }

    pub fn base_uri(&self) -> Option<&Iri> {
        self.base_uri.as_ref()
    }

    /// Append triples in order, silently skipping any triple whose content
    /// hash has been seen before.
    pub fn add(&self, triples: impl IntoIterator<Item = Triple>) {
        let mut inner = self.inner.lock();
        for triple in triples {
            inner.insert(triple);
        }
    }

    /// Add a triple from its individual terms.
    pub fn add_triple(&self, subject: Subject, predicate: Predicate, object: Object) {
        self.add([Triple::new(subject, predicate, object)]);
    }

    /// The number of triples in the graph.
    pub fn len(&self) -> usize {
        self.inner.lock().triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().triples.is_empty()
    }

    /// The triples in insertion order. Marks the graph exported and moves
    /// the export point forward, accepting any growth since the previous
    /// read.
    pub fn triples(&self) -> Vec<Triple> {
        let mut inner = self.inner.lock();
        inner.exported = true;
        inner.added_after_export = false;
        inner.triples.clone()
    }

    /// The triples in insertion order, failing when triples were added
    /// after a previous export.
    ///
    /// The error is recoverable: re-read with [`Graph::triples`] to accept
    /// the grown graph.
    pub fn triples_once(&self) -> GraphResult<Vec<Triple>> {
        let mut inner = self.inner.lock();
        inner.exported = true;
        if inner.added_after_export {
            return Err(GraphError::AddedAfterExport);
        }

        Ok(inner.triples.clone())
    }

    /// Remove the given triples. The index, the dedup set and the resource
    /// grouping are all brought back in line, so a removed triple can be
    /// re-added later.
    pub fn remove(&self, remove: &[Triple]) {
        let mut inner = self.inner.lock();

        let drop_hashes: FxHashSet<u64> = remove.iter().map(Triple::content_hash).collect();
        let mut removed = Vec::new();
        inner.triples.retain(|t| {
            if drop_hashes.contains(&t.content_hash()) {
                removed.push(t.clone());
                false
            } else {
                true
            }
        });

        for triple in &removed {
            inner.seen.remove(&triple.content_hash());
            if let Some(index) = &mut inner.index {
                index.update(triple, true);
            }
        }

        // the grouped view has no removal path; rebuild it from what is left
        if inner.resources.is_some() && !removed.is_empty() {
            let mut resources = IndexMap::new();
            for triple in &inner.triples {
                resources
                    .entry(triple.subject.clone())
                    .or_insert_with(|| Resource::new(triple.subject.clone()))
                    .add(triple);
            }
            inner.resources = Some(resources);
        }
    }

    /// The grouped view of one subject.
    pub fn get(&self, subject: &Subject) -> Option<Resource> {
        let inner = self.inner.lock();
        inner.resources.as_ref()?.get(subject).cloned()
    }

    /// All per-subject resources, in order of first appearance. Empty when
    /// the grouping is disabled.
    pub fn resources(&self) -> Vec<Resource> {
        let inner = self.inner.lock();
        match &inner.resources {
            Some(resources) => resources.values().cloned().collect(),
            None => Vec::new(),
        }
    }

    /// Counts of distinct indexed values. Requires the graph index.
    pub fn stats(&self) -> GraphResult<GraphStats> {
        let inner = self.inner.lock();
        let index = inner.index.as_ref().ok_or(GraphError::IndexDisabled)?;

        let mut stats = GraphStats {
            triples: inner.triples.len() as u64,
            ..GraphStats::default()
        };
        index.fill_stats(&mut stats);
        Ok(stats)
    }

    /// Resolve every indexed namespace prefix through the namespace
    /// manager. Requires the graph index.
    pub fn namespaces(&self) -> GraphResult<Vec<Namespace>> {
        let inner = self.inner.lock();
        let index = inner.index.as_ref().ok_or(GraphError::IndexDisabled)?;

        let mut namespaces = Vec::new();
        for base in index.namespace_uris() {
            let ns = self
                .namespaces
                .get_with_base(base)
                .map_err(|_| GraphError::UnknownNamespace(base.to_string()))?;
            namespaces.push(ns);
        }

        Ok(namespaces)
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::term::Literal;
    use std::sync::Arc;

    fn title_triple(subject: &str, value: &str) -> Triple {
        Triple::new(
            Iri::new(subject).unwrap().into(),
            Predicate::new("http://purl.org/dc/elements/1.1/title").unwrap(),
            Literal::new(value).unwrap().into(),
        )
    }

    #[test]
    fn test_add_deduplicates() {
        let graph = Graph::new();
        graph.add([title_triple("urn:1", "a")]);
        graph.add([title_triple("urn:1", "a")]);
        assert_eq!(graph.len(), 1);

        graph.add([title_triple("urn:1", "b")]);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let graph = Graph::new();
        for i in 0..10 {
            graph.add([title_triple("urn:1", &format!("title {i}"))]);
        }

        let values: Vec<String> = graph
            .triples()
            .iter()
            .map(|t| t.object.raw_value().to_string())
            .collect();
        let expected: Vec<String> = (0..10).map(|i| format!("title {i}")).collect();
        assert_eq!(values, expected);
    }

    #[test]
    fn test_export_guard() {
        let graph = Graph::new();
        graph.add([title_triple("urn:1", "a")]);

        assert!(graph.triples_once().is_ok());

        graph.add([title_triple("urn:1", "b")]);
        assert_eq!(
            graph.triples_once().unwrap_err(),
            GraphError::AddedAfterExport
        );

        // a plain read is always allowed and accepts the growth
        assert_eq!(graph.triples().len(), 2);
        assert!(graph.triples_once().is_ok());
    }

    #[test]
    fn test_export_guard_ignores_duplicate_add() {
        let graph = Graph::new();
        graph.add([title_triple("urn:1", "a")]);

        assert!(graph.triples_once().is_ok());

        // a dropped duplicate adds no data, so the second read is complete
        graph.add([title_triple("urn:1", "a")]);
        assert!(graph.triples_once().is_ok());
    }

    #[test]
    fn test_remove() {
        let graph = Graph::new();
        let a = title_triple("urn:1", "a");
        let b = title_triple("urn:1", "b");
        graph.add([a.clone(), b.clone()]);

        graph.remove(std::slice::from_ref(&a));
        assert_eq!(graph.len(), 1);

        // removed triples can come back
        graph.add([a]);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_stats() {
        let graph = Graph::new();
        graph.add([
            title_triple("urn:1", "a"),
            title_triple("urn:2", "b"),
            Triple::new(
                Iri::new("urn:1").unwrap().into(),
                Predicate::new("http://purl.org/dc/elements/1.1/relation").unwrap(),
                Iri::new("urn:2").unwrap().into(),
            ),
        ]);

        let stats = graph.stats().unwrap();
        assert_eq!(stats.triples, 3);
        assert_eq!(stats.resources, 2);
        assert_eq!(stats.predicates, 2);
        assert_eq!(stats.object_iris, 1);
        assert_eq!(stats.namespaces, 1);
    }

    #[test]
    fn test_stats_require_index() {
        let graph = Graph::bare();
        assert_eq!(graph.stats().unwrap_err(), GraphError::IndexDisabled);
        assert_eq!(graph.namespaces().unwrap_err(), GraphError::IndexDisabled);
    }

    #[test]
    fn test_resource_grouping() {
        let graph = Graph::new();
        graph.add([
            title_triple("urn:1", "a"),
            title_triple("urn:2", "b"),
            title_triple("urn:1", "c"),
        ]);

        let subject: Subject = Iri::new("urn:1").unwrap().into();
        let resource = graph.get(&subject).unwrap();
        assert_eq!(resource.triples().len(), 2);
        assert_eq!(graph.resources().len(), 2);
    }

    #[test]
    fn test_namespaces_resolved_through_manager() {
        let graph = Graph::new();
        graph.add([title_triple("urn:1", "a")]);

        let namespaces = graph.namespaces().unwrap();
        assert_eq!(namespaces.len(), 1);
        assert_eq!(namespaces[0].prefix, "dc");
    }

    #[test]
    fn test_concurrent_producers() {
        let graph = Arc::new(Graph::new());
        let mut handles = Vec::new();

        for worker in 0..4 {
            let graph = Arc::clone(&graph);
            handles.push(std::thread::spawn(move || {
                for i in 0..50 {
                    // half the triples collide across workers
                    graph.add([title_triple(
                        &format!("urn:{}", worker % 2),
                        &format!("title {i}"),
                    )]);
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        // 2 distinct subjects x 50 distinct titles
        assert_eq!(graph.len(), 100);
        assert_eq!(graph.stats().unwrap().resources, 2);
    }
}
