//! Indexable document assembly
//!
//! A [`DocumentGraph`] is the indexable representation of one named graph:
//! a validated [`Header`] plus the resources grouped from the triples.
//! Before indexing, the context-level resolver walks the resource graph
//! from the header's root subject and annotates every reachable resource
//! with the paths by which it is reached, cutting cycles but preserving
//! diamonds.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde::ser::SerializeSeq;
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use tracing::debug;

use crate::rdf;
use crate::rdf::validation::ValidationError;
use crate::rdf::NamespaceManager;

use super::entry::Entry;
use super::header::Header;
use super::resource::Resource;

/// Document assembly errors
#[derive(Error, Debug)]
pub enum DocumentError {
    /// The header names no root subject to resolve context from
    #[error("entry URI cannot be empty when resolving context")]
    MissingEntryUri,

    /// There are no resources to resolve context over
    #[error("cannot resolve context on an empty resource collection")]
    EmptyResources,

    /// The header's root subject is not part of the resource collection
    #[error("root subject {0} is not part of the graph")]
    RootNotFound(String),

    /// The header is missing required identity fields
    #[error("invalid header: {0}")]
    InvalidHeader(#[from] ValidationError),

    /// A stored resource value could not be restated as a valid RDF term
    #[error("invalid term in resource: {0}")]
    InvalidTerm(ValidationError),

    /// The document could not be serialized for indexing
    #[error("unable to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Outcome counters of one context resolution pass.
///
/// Cycles and dangling references are skipped, never fatal; the counters
/// let callers surface them as data-quality warnings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    /// Number of context refs attached to resources
    pub visited: usize,
    /// Edges skipped because they loop back onto the active path
    pub skipped_cycles: usize,
    /// Edges skipped because their target is not in the collection
    pub skipped_dangling: usize,
}

/// The index type of the message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndexType {
    #[serde(rename = "v1")]
    V1,
    #[serde(rename = "v2")]
    V2,
}

/// The envelope in which a document is submitted to the search-indexing
/// service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMessage {
    #[serde(rename = "organisationID")]
    pub organisation_id: String,

    #[serde(rename = "datasetID")]
    pub dataset_id: String,

    #[serde(rename = "recordID")]
    pub record_id: String,

    #[serde(rename = "indexType")]
    pub index_type: IndexType,

    /// The JSON-serialized header + resources document
    pub source: Vec<u8>,
}

fn subject_hash(subject: &str) -> u64 {
    use std::hash::Hasher;
    let mut hasher = rustc_hash::FxHasher::default();
    hasher.write(subject.as_bytes());
    hasher.finish()
}

fn serialize_resources<S: Serializer>(
    resources: &IndexMap<String, Resource>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(resources.len()))?;
    for resource in resources.values() {
        seq.serialize_element(resource)?;
    }
    seq.end()
}

/// An indexable representation of an RDF named graph.
#[derive(Debug, Serialize)]
pub struct DocumentGraph {
    /// The header with the queryable meta information
    #[serde(rename = "meta")]
    header: Header,

    /// Triples grouped by their subject, addressable by subject IRI
    #[serde(serialize_with = "serialize_resources")]
    resources: IndexMap<String, Resource>,

    #[serde(skip)]
    namespaces: NamespaceManager,

    /// Guards against indexing a document whose context was never set
    #[serde(skip)]
    context_resolved: bool,
}

impl DocumentGraph {
    /// Create an empty document. Fails when the header is invalid after
    /// its defaults were applied.
    pub fn new(mut header: Header) -> Result<Self, DocumentError> {
        header.add_defaults();
        header.valid()?;

        Ok(DocumentGraph {
            header,
            resources: IndexMap::new(),
            namespaces: NamespaceManager::new(),
            context_resolved: false,
        })
    }

    /// Replace the namespace manager used for search-label resolution.
    pub fn with_namespaces(mut self, namespaces: NamespaceManager) -> Self {
        self.namespaces = namespaces;
        self
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn header_mut(&mut self) -> &mut Header {
        &mut self.header
    }

    /// The number of resources in the document.
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Look up a resource by subject.
    pub fn get(&self, subject: &str) -> Option<&Resource> {
        self.resources.get(subject)
    }

    /// The resources in order of first appearance.
    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }

    /// Create or return the resource for a subject. The second value is
    /// true when the resource was created by this call.
    pub fn resource(&mut self, subject: &str) -> (&Resource, bool) {
        let created = !self.resources.contains_key(subject);
        let resource = self
            .resources
            .entry(subject.to_string())
            .or_insert_with(|| Resource::new(subject));
        (resource, created)
    }

    /// Upsert an entry on the resource for `subject`, creating the
    /// resource when needed.
    pub fn add_entry(&mut self, subject: &str, entry: Entry) {
        self.resource(subject);
        if let Some(resource) = self.resources.get(subject) {
            resource.add(entry, &self.namespaces);
        }
    }

    /// Group the triples of an RDF graph into this document's resources.
    pub fn add_graph(&mut self, graph: &rdf::Graph) {
        for grouped in graph.resources() {
            let subject = grouped.subject().raw_value().to_string();

            let (_, created) = self.resource(&subject);
            if created {
                if let Some(resource) = self.resources.get_mut(&subject) {
                    resource.add_types(
                        grouped.types().iter().map(|t| t.raw_value().to_string()),
                    );
                }
            }

            let Some(resource) = self.resources.get(&subject) else {
                continue;
            };

            let mut order = 0u32;
            for (predicate, group) in grouped.predicates() {
                for object in group.objects() {
                    let mut entry = Entry::from_object(predicate, object, &self.namespaces);
                    entry.order = order;
                    order += 1;
                    resource.add(entry, &self.namespaces);
                }
            }
        }
    }

    /// Restate the whole document as an RDF graph.
    pub fn to_graph(&self) -> Result<rdf::Graph, DocumentError> {
        if self.resources.is_empty() {
            return Err(DocumentError::EmptyResources);
        }

        let graph = rdf::Graph::new();
        for resource in self.resources.values() {
            resource
                .add_to(&graph)
                .map_err(DocumentError::InvalidTerm)?;
        }

        Ok(graph)
    }

    /// The entries matching a search label, over the whole document or one
    /// subject.
    pub fn search_label(&self, subject: Option<&str>, label: &str) -> Vec<Entry> {
        let resources: Vec<&Resource> = match subject {
            Some(subject) => match self.resources.get(subject) {
                Some(resource) => vec![resource],
                None => return Vec::new(),
            },
            None => self.resources.values().collect(),
        };

        let mut entries = Vec::new();
        for resource in resources {
            entries.extend(
                resource
                    .entries()
                    .into_iter()
                    .filter(|e| e.search_label == label),
            );
        }

        entries
    }

    /// Whether context levels have been resolved since the last mutation
    /// of the context state.
    pub fn context_resolved(&self) -> bool {
        self.context_resolved
    }

    /// Drop the resolved context so the next resolution recomputes it.
    pub fn invalidate_context(&mut self) {
        self.context_resolved = false;
        for resource in self.resources.values_mut() {
            resource.context.clear();
        }
    }

    /// Walk the resource graph from the header's root subject and annotate
    /// every reachable resource with the paths by which it is reached.
    ///
    /// Edges that loop back onto the active path and references to absent
    /// resources are skipped and counted, never fatal. A resource reached
    /// by several distinct paths accumulates one context ref per path.
    /// Resolving an already resolved document is a no-op.
    pub fn resolve_context(&mut self) -> Result<ResolutionReport, DocumentError> {
        if self.context_resolved {
            return Ok(ResolutionReport::default());
        }

        if self.header.entry_uri.is_empty() {
            return Err(DocumentError::MissingEntryUri);
        }

        if self.resources.is_empty() {
            return Err(DocumentError::EmptyResources);
        }

        if !self.resources.contains_key(&self.header.entry_uri) {
            return Err(DocumentError::RootNotFound(self.header.entry_uri.clone()));
        }

        let root = self.header.entry_uri.clone();
        let mut report = ResolutionReport::default();
        let mut path = FxHashSet::default();
        path.insert(subject_hash(&root));
        self.visit(&root, &path, &mut report);

        self.context_resolved = true;
        Ok(report)
    }

    /// Recurse into nested resources until the end of the graph, or until
    /// the path would recurse onto itself.
    ///
    /// `path` holds the subjects already on the active traversal path; it
    /// is copied per recursive call, so a resource stays reachable through
    /// other paths (diamonds) while true cycles are cut.
    fn visit(&mut self, subject: &str, path: &FxHashSet<u64>, report: &mut ResolutionReport) {
        let Some(resource) = self.resources.get(subject) else {
            return;
        };

        let referrer_types = resource.types().to_vec();
        let candidates = resource.object_ids(&self.namespaces);

        for mut ctx in candidates {
            let target_hash = subject_hash(&ctx.object_id);
            if path.contains(&target_hash) {
                debug!(subject = %ctx.object_id, resource = %subject, "subject cannot recurse on itself");
                report.skipped_cycles += 1;
                continue;
            }

            let Some(target) = self.resources.get_mut(&ctx.object_id) else {
                debug!(subject = %ctx.object_id, resource = %subject, "subject is not part of the graph");
                report.skipped_dangling += 1;
                continue;
            };

            ctx.level = path.len() as i32;
            if ctx.subject_class.is_empty() {
                ctx.subject_class = referrer_types.clone();
            }

            let object_id = ctx.object_id.clone();
            target.append_context([ctx]);
            report.visited += 1;

            let mut next = path.clone();
            next.insert(target_hash);
            self.visit(&object_id, &next, report);
        }
    }

    /// Remove resources without entries and types from the document.
    pub fn prune(&mut self) {
        self.resources.retain(|_, resource| !resource.is_empty());
    }

    /// The document serialized as JSON.
    pub fn marshal(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// The document serialized as indented JSON, for debugging and HTTP
    /// responses.
    pub fn marshal_pretty(&self) -> Result<Vec<u8>, DocumentError> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Convert the document into the message in which it is submitted for
    /// indexing.
    ///
    /// Context is resolved when it has not been, empty resources are
    /// pruned, and the header is re-validated; any failure aborts the
    /// whole call.
    pub fn index_message(&mut self) -> Result<IndexMessage, DocumentError> {
        if !self.context_resolved {
            self.resolve_context()?;
        }

        self.prune();
        self.header.valid()?;

        let source = self.marshal()?;

        Ok(IndexMessage {
            organisation_id: self.header.org_id.clone(),
            dataset_id: self.header.spec.clone(),
            record_id: self.header.hub_id.clone(),
            index_type: IndexType::V2,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::entry::EntryType;
    use crate::rdf::{Iri, Literal, Predicate, Triple};

    fn header() -> Header {
        Header {
            org_id: "rijks".to_string(),
            spec: "paintings".to_string(),
            hub_id: "rijks_paintings_1".to_string(),
            entry_uri: "urn:1".to_string(),
            ..Header::default()
        }
    }

    fn reference(subject: &str, object: &str) -> Entry {
        Entry {
            predicate: "http://purl.org/dc/elements/1.1/subject".to_string(),
            id: object.to_string(),
            entry_type: EntryType::Resource,
            value: subject.to_string(),
            ..Entry::default()
        }
    }

    fn typed_document(edges: &[(&str, &str)]) -> DocumentGraph {
        let mut doc = DocumentGraph::new(header()).unwrap();
        for (from, to) in edges {
            doc.add_entry(from, reference(from, to));
            doc.resource(to);
            if let Some(rsc) = doc.resources.get_mut(*to) {
                rsc.add_types(["http://www.europeana.eu/schemas/edm/Agent"]);
            }
        }
        doc
    }

    #[test]
    fn test_new_validates_header() {
        assert!(matches!(
            DocumentGraph::new(Header::default()),
            Err(DocumentError::InvalidHeader(_))
        ));

        let doc = DocumentGraph::new(header()).unwrap();
        assert_eq!(doc.header().named_graph_uri, "urn:1/graph");
    }

    #[test]
    fn test_add_graph_groups_resources() {
        let graph = rdf::Graph::new();
        let subject: crate::rdf::Subject = Iri::new("urn:1").unwrap().into();
        graph.add([
            Triple::new(
                subject.clone(),
                Predicate::rdf_type(),
                Iri::new("http://www.europeana.eu/schemas/edm/ProvidedCHO")
                    .unwrap()
                    .into(),
            ),
            Triple::new(
                subject.clone(),
                Predicate::new("http://purl.org/dc/elements/1.1/title").unwrap(),
                Literal::new("Nachtwacht").unwrap().into(),
            ),
            Triple::new(
                subject,
                Predicate::new("http://purl.org/dc/elements/1.1/subject").unwrap(),
                Iri::new("urn:2").unwrap().into(),
            ),
        ]);

        let mut doc = DocumentGraph::new(header()).unwrap();
        doc.add_graph(&graph);

        assert_eq!(doc.len(), 2);
        let root = doc.get("urn:1").unwrap();
        assert_eq!(
            root.types(),
            &["http://www.europeana.eu/schemas/edm/ProvidedCHO"]
        );
        assert_eq!(root.entries().len(), 3);

        // grouping twice must not duplicate entries
        doc.add_graph(&graph);
        assert_eq!(doc.get("urn:1").unwrap().entries().len(), 3);
    }

    #[test]
    fn test_to_graph_round_trip() {
        let mut doc = typed_document(&[("urn:1", "urn:2")]);
        doc.add_entry(
            "urn:1",
            Entry {
                predicate: "http://purl.org/dc/elements/1.1/title".to_string(),
                value: "Nachtwacht".to_string(),
                ..Entry::default()
            },
        );

        let graph = doc.to_graph().unwrap();
        // urn:1: reference + title, urn:2: rdf:type
        assert_eq!(graph.len(), 3);

        let empty = DocumentGraph::new(header()).unwrap();
        assert!(matches!(
            empty.to_graph(),
            Err(DocumentError::EmptyResources)
        ));
    }

    #[test]
    fn test_search_label() {
        let mut doc = DocumentGraph::new(header()).unwrap();
        doc.add_entry(
            "urn:1",
            Entry {
                search_label: "dc_title".to_string(),
                value: "Nachtwacht".to_string(),
                ..Entry::default()
            },
        );

        assert_eq!(doc.search_label(None, "dc_title").len(), 1);
        assert_eq!(doc.search_label(Some("urn:1"), "dc_title").len(), 1);
        assert!(doc.search_label(Some("urn:404"), "dc_title").is_empty());
    }

    #[test]
    fn test_resolve_context_requires_root() {
        let mut doc = DocumentGraph::new(header()).unwrap();
        assert!(matches!(
            doc.resolve_context(),
            Err(DocumentError::EmptyResources)
        ));

        doc.resource("urn:somewhere-else");
        assert!(matches!(
            doc.resolve_context(),
            Err(DocumentError::RootNotFound(_))
        ));

        doc.header_mut().entry_uri = String::new();
        assert!(matches!(
            doc.resolve_context(),
            Err(DocumentError::MissingEntryUri)
        ));
    }

    #[test]
    fn test_resolve_context_nested_levels() {
        let mut doc = typed_document(&[("urn:1", "urn:2"), ("urn:2", "urn:3")]);
        let report = doc.resolve_context().unwrap();

        assert_eq!(report.visited, 2);
        assert_eq!(report.skipped_cycles, 0);

        assert_eq!(doc.get("urn:1").unwrap().level(), 1);
        assert_eq!(doc.get("urn:2").unwrap().level(), 2);
        assert_eq!(doc.get("urn:3").unwrap().level(), 3);

        let ctx = &doc.get("urn:2").unwrap().context()[0];
        assert_eq!(ctx.subject, "urn:1");
        assert_eq!(ctx.object_id, "urn:2");
        assert_eq!(ctx.level, 1);
    }

    #[test]
    fn test_resolve_context_cuts_cycles() {
        let mut doc = typed_document(&[("urn:1", "urn:2"), ("urn:2", "urn:1")]);
        let report = doc.resolve_context().unwrap();

        assert_eq!(report.skipped_cycles, 1);
        assert_eq!(doc.get("urn:1").unwrap().level(), 1);
        assert_eq!(doc.get("urn:2").unwrap().level(), 2);

        // the backward edge never reintroduced the cycle
        assert!(doc.get("urn:1").unwrap().context().is_empty());
    }

    #[test]
    fn test_resolve_context_skips_self_reference() {
        let mut doc = typed_document(&[("urn:1", "urn:1")]);
        let report = doc.resolve_context().unwrap();

        assert_eq!(report.skipped_cycles, 1);
        assert!(doc.get("urn:1").unwrap().context().is_empty());
        assert_eq!(doc.get("urn:1").unwrap().level(), 1);
    }

    #[test]
    fn test_resolve_context_preserves_diamonds() {
        let mut doc = typed_document(&[
            ("urn:1", "urn:a"),
            ("urn:1", "urn:b"),
            ("urn:a", "urn:c"),
            ("urn:b", "urn:c"),
        ]);
        let report = doc.resolve_context().unwrap();

        assert_eq!(report.visited, 4);
        let shared = doc.get("urn:c").unwrap();
        assert_eq!(shared.context().len(), 2);
        for ctx in shared.context() {
            assert_eq!(ctx.level, 2);
        }
        assert_eq!(shared.level(), 3);
    }

    #[test]
    fn test_resolve_context_skips_dangling_references() {
        let mut doc = DocumentGraph::new(header()).unwrap();
        doc.add_entry("urn:1", reference("urn:1", "urn:not-described"));

        let report = doc.resolve_context().unwrap();
        assert_eq!(report.skipped_dangling, 1);
        assert_eq!(report.visited, 0);
    }

    #[test]
    fn test_resolve_context_is_idempotent_until_invalidated() {
        let mut doc = typed_document(&[("urn:1", "urn:2")]);
        let first = doc.resolve_context().unwrap();
        assert_eq!(first.visited, 1);

        let second = doc.resolve_context().unwrap();
        assert_eq!(second.visited, 0);
        assert_eq!(doc.get("urn:2").unwrap().context().len(), 1);

        doc.invalidate_context();
        assert!(doc.get("urn:2").unwrap().context().is_empty());
        let third = doc.resolve_context().unwrap();
        assert_eq!(third.visited, 1);
        assert_eq!(doc.get("urn:2").unwrap().context().len(), 1);
    }

    #[test]
    fn test_prune_removes_empty_resources() {
        let mut doc = typed_document(&[("urn:1", "urn:2")]);
        doc.resource("urn:referenced-only");
        assert_eq!(doc.len(), 3);

        doc.prune();
        assert_eq!(doc.len(), 2);
        assert!(doc.get("urn:referenced-only").is_none());
    }

    #[test]
    fn test_index_message() {
        let mut doc = typed_document(&[("urn:1", "urn:2")]);
        doc.resource("urn:empty");

        let message = doc.index_message().unwrap();
        assert_eq!(message.organisation_id, "rijks");
        assert_eq!(message.dataset_id, "paintings");
        assert_eq!(message.record_id, "rijks_paintings_1");
        assert_eq!(message.index_type, IndexType::V2);

        let source: serde_json::Value = serde_json::from_slice(&message.source).unwrap();
        assert_eq!(source["meta"]["orgID"], "rijks");
        let resources = source["resources"].as_array().unwrap();
        // the empty resource was pruned
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0]["id"], "urn:1");
        assert_eq!(resources[1]["context"][0]["objectID"], "urn:2");
    }

    #[test]
    fn test_index_message_fails_on_invalid_header() {
        let mut doc = typed_document(&[("urn:1", "urn:2")]);
        doc.header_mut().org_id = String::new();

        assert!(matches!(
            doc.index_message(),
            Err(DocumentError::InvalidHeader(_))
        ));
    }
}
