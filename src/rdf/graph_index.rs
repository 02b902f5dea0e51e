//! Secondary index over graph insertions
//!
//! The index only answers existence and cardinality questions; triples
//! themselves stay in the graph's ordered sequence.

use rustc_hash::FxHashMap;

use super::term::{Object, TermKind};
use super::triple::{content_hash, Triple, RDF_TYPE};

/// Counts of distinct values currently indexed in a graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphStats {
    pub triples: u64,
    pub resources: usize,
    pub predicates: usize,
    pub object_iris: usize,
    pub languages: usize,
    pub datatypes: usize,
    pub namespaces: usize,
}

/// Per-insertion counters over subjects, predicates, rdf:type objects,
/// object resources, languages, datatypes and namespace prefixes.
#[derive(Debug, Default)]
pub(crate) struct GraphIndex {
    subjects: FxHashMap<u64, u64>,
    predicates: FxHashMap<u64, u64>,
    rdf_types: FxHashMap<u64, u64>,
    object_resources: FxHashMap<u64, u64>,
    languages: FxHashMap<u64, u64>,
    datatypes: FxHashMap<u64, u64>,
    namespace_uris: FxHashMap<String, u64>,
}

fn bump(counts: &mut FxHashMap<u64, u64>, key: u64, remove: bool) {
    let count = counts.entry(key).or_insert(0);
    if remove {
        *count = count.saturating_sub(1);
    } else {
        *count += 1;
    }
}

impl GraphIndex {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn update(&mut self, triple: &Triple, remove: bool) {
        self.update_subject(triple, remove);
        self.update_predicate(triple, remove);
        self.update_rdf_type(triple, remove);
        self.update_object(triple, remove);
    }

    pub(crate) fn namespace_uris(&self) -> impl Iterator<Item = &str> {
        self.namespace_uris.keys().map(String::as_str)
    }

    pub(crate) fn fill_stats(&self, stats: &mut GraphStats) {
        stats.resources = self.subjects.len();
        stats.predicates = self.predicates.len();
        stats.object_iris = self.object_resources.len();
        stats.languages = self.languages.len();
        stats.datatypes = self.datatypes.len();
        stats.namespaces = self.namespace_uris.len();
    }

    fn update_namespace_uri(&mut self, iri_prefix: &str, remove: bool) {
        let count = self.namespace_uris.entry(iri_prefix.to_string()).or_insert(0);
        if remove {
            *count = count.saturating_sub(1);
        } else {
            *count += 1;
        }
    }

    fn update_subject(&mut self, triple: &Triple, remove: bool) {
        bump(&mut self.subjects, content_hash(&triple.subject), remove);
    }

    fn update_predicate(&mut self, triple: &Triple, remove: bool) {
        let (prefix, _) = triple.predicate.split();
        self.update_namespace_uri(prefix, remove);
        bump(&mut self.predicates, content_hash(&triple.predicate), remove);
    }

    fn update_rdf_type(&mut self, triple: &Triple, remove: bool) {
        if triple.predicate.raw_value() != RDF_TYPE {
            return;
        }

        if let Object::Iri(iri) = &triple.object {
            let (prefix, _) = iri.split();
            self.update_namespace_uri(prefix, remove);
        }

        bump(&mut self.rdf_types, content_hash(&triple.object), remove);
    }

    fn update_object(&mut self, triple: &Triple, remove: bool) {
        match triple.object.kind() {
            TermKind::Iri | TermKind::BlankNode => {
                bump(
                    &mut self.object_resources,
                    content_hash(&triple.object),
                    remove,
                );
            }
            TermKind::Literal => {
                let Some(literal) = triple.object.as_literal() else {
                    return;
                };

                if let Some(language) = literal.language() {
                    bump(&mut self.languages, content_hash(language), remove);
                }

                bump(
                    &mut self.datatypes,
                    content_hash(literal.datatype()),
                    remove,
                );
            }
        }
    }
}
