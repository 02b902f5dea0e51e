//! Addressable resources of an indexable document
//!
//! A [`Resource`] groups the entries that share one subject and carries the
//! [`ContextRef`] paths by which the resource is reached from the document
//! root. Entry insertion is an idempotent upsert keyed on the entry
//! fingerprint, safe for concurrent producers.

use std::hash::Hasher;

use parking_lot::RwLock;
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::rdf::validation::ValidationError;
use crate::rdf::{Graph, Iri, NamespaceManager, Predicate, Subject};

use super::entry::{search_label, Entry, EntryType};

/// Predicates probed, in order, to find a display label for a resource.
/// Also used when presenting labels for linked resources.
pub const RESOURCE_LABEL_PREDICATES: [&str; 8] = [
    "http://purl.org/dc/elements/1.1/title",
    "http://www.w3.org/2004/02/skos/core#prefLabel",
    "http://www.w3.org/2000/01/rdf-schema#label",
    "http://www.w3.org/2004/02/skos/core#altLabel",
    "http://xmlns.com/foaf/0.1/name",
    "http://www.geonames.org/ontology#name",
    "http://schemas.delving.eu/narthex/terms/proxyLiteralValue",
    "http://dbpedia.org/ontology/name",
];

/// One hop of the path from a referring resource to a referred resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextRef {
    /// Subject IRI of the referring resource
    #[serde(skip_serializing_if = "String::is_empty")]
    pub subject: String,

    /// Classes of the referring resource
    #[serde(rename = "subjectClass", skip_serializing_if = "Vec::is_empty")]
    pub subject_class: Vec<String>,

    /// Predicate IRI of the referring edge
    #[serde(skip_serializing_if = "String::is_empty")]
    pub predicate: String,

    /// Namespaced short form of the predicate
    #[serde(rename = "searchLabel", skip_serializing_if = "String::is_empty")]
    pub search_label: String,

    /// Depth at which the edge was followed from the root
    pub level: i32,

    /// Subject IRI or blank-node label of the referred resource
    #[serde(rename = "objectID")]
    pub object_id: String,

    /// Source position of the referring entry
    #[serde(rename = "sortKey")]
    pub sort_key: i32,

    /// Display label of the referring resource
    #[serde(skip_serializing_if = "String::is_empty")]
    pub label: String,
}

impl ContextRef {
    /// Identity hash for cycle detection: level, sort key and label are
    /// derived values, not part of the edge identity.
    pub fn content_hash(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(self.subject.as_bytes());
        for class in &self.subject_class {
            hasher.write(class.as_bytes());
        }
        hasher.write(self.predicate.as_bytes());
        hasher.write(self.object_id.as_bytes());
        hasher.finish()
    }

    /// Whether both refs describe the same edge into a resource.
    fn same_edge(&self, other: &ContextRef) -> bool {
        self.object_id == other.object_id && self.predicate == other.predicate
    }
}

/// All context information for one subject of the document.
#[derive(Debug, Serialize)]
pub struct Resource {
    /// The subject IRI of the resource
    pub(crate) id: String,

    /// The IRIs of the rdf classes of the subject
    pub(crate) types: Vec<String>,

    /// The wrapped predicate/object information, deduplicated on insert
    pub(crate) entries: RwLock<Vec<Entry>>,

    /// The paths from the document root to this resource
    pub(crate) context: Vec<ContextRef>,
}

impl Resource {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            types: Vec::new(),
            entries: RwLock::new(Vec::new()),
            context: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    pub fn context(&self) -> &[ContextRef] {
        &self.context
    }

    /// A snapshot of the entries in insertion order.
    pub fn entries(&self) -> Vec<Entry> {
        self.entries.read().clone()
    }

    /// Upsert an entry.
    ///
    /// Safe for concurrent use. The entry's tags are expanded first; an
    /// empty predicate is normalized from the search label through the
    /// namespace manager. When the fingerprint is already present the
    /// existing entry is replaced in place, otherwise the entry is
    /// appended.
    pub fn add(&self, mut entry: Entry, namespaces: &NamespaceManager) {
        if let Err(err) = entry.process_tags() {
            warn!(resource = %self.id, %err, "unable to process entry tags");
        }

        if entry.predicate.is_empty() && !entry.search_label.is_empty() {
            match namespaces.expand_search_label(&entry.search_label) {
                Ok(predicate) => entry.predicate = predicate,
                Err(err) => {
                    warn!(search_label = %entry.search_label, %err, "unable to create predicate");
                }
            }
        }

        let fingerprint = entry.fingerprint();
        let mut entries = self.entries.write();

        match entries.iter().position(|e| e.fingerprint() == fingerprint) {
            Some(pos) => entries[pos] = entry,
            None => entries.push(entry),
        }
    }

    /// Restate the resource's types and entries as triples in an RDF
    /// graph. Fails when a stored value is no longer a valid term.
    pub fn add_to(&self, graph: &Graph) -> Result<(), ValidationError> {
        let subject: Subject = Iri::new(self.id.as_str())?.into();

        for rdf_type in &self.types {
            graph.add_triple(
                subject.clone(),
                Predicate::rdf_type(),
                Iri::new(rdf_type.as_str())?.into(),
            );
        }

        for entry in self.entries.read().iter() {
            graph.add([entry.as_triple(&subject)?]);
        }

        Ok(())
    }

    /// Add unique rdf classes to the type list.
    pub fn add_types<I, S>(&mut self, types: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for rdf_type in types {
            let rdf_type = rdf_type.into();
            if !self.types.contains(&rdf_type) {
                self.types.push(rdf_type);
            }
        }
    }

    /// Append context refs, skipping any that duplicate an already known
    /// edge on `(object_id, predicate)`.
    pub fn append_context(&mut self, refs: impl IntoIterator<Item = ContextRef>) {
        for ctx in refs {
            if !self.context.iter().any(|known| known.same_edge(&ctx)) {
                self.context.push(ctx);
            }
        }
    }

    /// The display label and language of the resource, found by probing
    /// [`RESOURCE_LABEL_PREDICATES`] in order. Empty when nothing matches.
    pub fn label(&self) -> (String, String) {
        if self.id.is_empty() {
            return (String::new(), String::new());
        }

        let entries = self.entries.read();
        for predicate in RESOURCE_LABEL_PREDICATES {
            if let Some(entry) = entries.iter().find(|e| e.predicate == predicate) {
                return (entry.value.clone(), entry.language.clone());
            }
        }

        (String::new(), String::new())
    }

    /// The relative level this resource has from the root: one more than
    /// the deepest path that reaches it, or 1 for a root resource.
    pub fn level(&self) -> i32 {
        let highest = self
            .context
            .iter()
            .map(|ctx| ctx.level)
            .max()
            .unwrap_or(0);
        highest + 1
    }

    /// True when the resource holds neither entries nor types. Such
    /// resources arise from referenced-but-never-described subjects and
    /// are pruned before indexing.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty() && self.types.is_empty()
    }

    /// Entries whose predicate matches `predicate`.
    pub fn predicate_entries(&self, predicate: &str) -> Vec<Entry> {
        self.entries
            .read()
            .iter()
            .filter(|e| e.predicate == predicate)
            .cloned()
            .collect()
    }

    /// The outward-pointing edges of this resource, restated as candidate
    /// context refs carrying the resource's current level and classes.
    pub fn object_ids(&self, namespaces: &NamespaceManager) -> Vec<ContextRef> {
        self.entries
            .read()
            .iter()
            .filter(|e| matches!(e.entry_type, EntryType::Bnode | EntryType::Resource))
            .map(|e| self.new_context(&e.predicate, &e.id, e.order as i32, namespaces))
            .collect()
    }

    fn new_context(
        &self,
        predicate: &str,
        object_id: &str,
        sort_key: i32,
        namespaces: &NamespaceManager,
    ) -> ContextRef {
        let (label, _) = self.label();

        ContextRef {
            subject: self.id.clone(),
            subject_class: self.types.clone(),
            predicate: predicate.to_string(),
            search_label: search_label(predicate, namespaces),
            level: self.level(),
            object_id: object_id.to_string(),
            sort_key,
            label,
        }
    }
}
