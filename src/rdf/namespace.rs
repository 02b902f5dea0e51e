//! Namespace and prefix management
//!
//! Resolves between full IRIs, compact `prefix:local` notation, and the
//! underscore-joined search labels (`dc_title`) used as index field names.
//! The underscore is used instead of the more common colon because the
//! label ends up as a query field in Lucene-style search engines, where a
//! colon separates field and value.

use indexmap::IndexMap;
use thiserror::Error;

/// Namespace errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamespaceError {
    /// Unknown prefix
    #[error("unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Unknown base URI
    #[error("unknown base URI: {0}")]
    UnknownBase(String),

    /// Input is not in `prefix:local` or `prefix_local` form
    #[error("not a compact IRI: {0}")]
    NotCompact(String),
}

pub type NamespaceResult<T> = Result<T, NamespaceError>;

/// A prefix → base-URI mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    pub prefix: String,
    pub base: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, base: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            base: base.into(),
        }
    }
}

/// Split a URI into a base URI and a local name.
///
/// The split happens after the last `#`, or failing that the last `/`.
/// When the URI cannot be split, the full URI is returned as the local
/// name with an empty base.
pub fn split_uri(uri: &str) -> (&str, &str) {
    if let Some(pos) = uri.rfind('#') {
        return uri.split_at(pos + 1);
    }

    if let Some(pos) = uri.rfind('/') {
        return uri.split_at(pos + 1);
    }

    ("", uri)
}

/// Namespace manager seeded with the namespaces common in heritage data.
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    by_prefix: IndexMap<String, String>,
    by_base: IndexMap<String, String>,
}

impl NamespaceManager {
    /// Create a namespace manager with the default prefixes registered.
    pub fn new() -> Self {
        let mut mgr = Self {
            by_prefix: IndexMap::new(),
            by_base: IndexMap::new(),
        };

        mgr.add("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#");
        mgr.add("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        mgr.add("xsd", "http://www.w3.org/2001/XMLSchema#");
        mgr.add("owl", "http://www.w3.org/2002/07/owl#");
        mgr.add("foaf", "http://xmlns.com/foaf/0.1/");
        mgr.add("dc", "http://purl.org/dc/elements/1.1/");
        mgr.add("dcterms", "http://purl.org/dc/terms/");
        mgr.add("skos", "http://www.w3.org/2004/02/skos/core#");
        mgr.add("edm", "http://www.europeana.eu/schemas/edm/");
        mgr.add("ore", "http://www.openarchives.org/ore/terms/");
        mgr.add("geonames", "http://www.geonames.org/ontology#");
        mgr.add("narthex", "http://schemas.delving.eu/narthex/terms/");
        mgr.add("dbpedia-owl", "http://dbpedia.org/ontology/");

        mgr
    }

    /// Register a prefix → base mapping. Later registrations win on both
    /// sides of the mapping.
    pub fn add(&mut self, prefix: impl Into<String>, base: impl Into<String>) {
        let prefix = prefix.into();
        let base = base.into();
        self.by_prefix.insert(prefix.clone(), base.clone());
        self.by_base.insert(base, prefix);
    }

    pub fn get_with_prefix(&self, prefix: &str) -> NamespaceResult<Namespace> {
        self.by_prefix
            .get(prefix)
            .map(|base| Namespace::new(prefix, base))
            .ok_or_else(|| NamespaceError::UnknownPrefix(prefix.to_string()))
    }

    pub fn get_with_base(&self, base: &str) -> NamespaceResult<Namespace> {
        self.by_base
            .get(base)
            .map(|prefix| Namespace::new(prefix, base))
            .ok_or_else(|| NamespaceError::UnknownBase(base.to_string()))
    }

    /// Return the IRI in short namespaced form: the namespace prefix and the
    /// local name joined with an underscore, e.g. `dc_title`.
    pub fn search_label(&self, uri: &str) -> NamespaceResult<String> {
        let (base, local) = split_uri(uri);
        let ns = self.get_with_base(base)?;
        Ok(format!("{}_{}", ns.prefix, local))
    }

    /// Resolve a search label (`dc_title`) back to the full predicate IRI.
    pub fn expand_search_label(&self, label: &str) -> NamespaceResult<String> {
        let (prefix, local) = label
            .split_once('_')
            .ok_or_else(|| NamespaceError::NotCompact(label.to_string()))?;
        let ns = self.get_with_prefix(prefix)?;
        Ok(format!("{}{}", ns.base, local))
    }

    /// Expand a compact IRI (`prefix:local`) to its full form.
    pub fn expand(&self, compact: &str) -> NamespaceResult<String> {
        let (prefix, local) = compact
            .split_once(':')
            .ok_or_else(|| NamespaceError::NotCompact(compact.to_string()))?;
        let ns = self.get_with_prefix(prefix)?;
        Ok(format!("{}{}", ns.base, local))
    }

    /// Compact an IRI using the registered prefixes.
    pub fn compact(&self, uri: &str) -> Option<String> {
        let (base, local) = split_uri(uri);
        self.by_base
            .get(base)
            .map(|prefix| format!("{prefix}:{local}"))
    }

    /// All registered namespaces, in registration order.
    pub fn namespaces(&self) -> Vec<Namespace> {
        self.by_prefix
            .iter()
            .map(|(prefix, base)| Namespace::new(prefix, base))
            .collect()
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_uri() {
        assert_eq!(
            split_uri("http://purl.org/dc/elements/1.1/title"),
            ("http://purl.org/dc/elements/1.1/", "title")
        );
        assert_eq!(
            split_uri("http://www.w3.org/2004/02/skos/core#prefLabel"),
            ("http://www.w3.org/2004/02/skos/core#", "prefLabel")
        );
        assert_eq!(split_uri("urn:1"), ("", "urn:1"));
    }

    #[test]
    fn test_default_prefixes() {
        let mgr = NamespaceManager::new();
        assert_eq!(
            mgr.get_with_prefix("rdf").unwrap().base,
            "http://www.w3.org/1999/02/22-rdf-syntax-ns#"
        );
        assert_eq!(
            mgr.get_with_base("http://purl.org/dc/elements/1.1/")
                .unwrap()
                .prefix,
            "dc"
        );
    }

    #[test]
    fn test_search_label() {
        let mgr = NamespaceManager::new();
        assert_eq!(
            mgr.search_label("http://purl.org/dc/elements/1.1/title")
                .unwrap(),
            "dc_title"
        );
        assert!(matches!(
            mgr.search_label("http://unknown.example/ns/x"),
            Err(NamespaceError::UnknownBase(_))
        ));
    }

    #[test]
    fn test_expand_search_label() {
        let mgr = NamespaceManager::new();
        assert_eq!(
            mgr.expand_search_label("dc_title").unwrap(),
            "http://purl.org/dc/elements/1.1/title"
        );
        assert!(matches!(
            mgr.expand_search_label("title"),
            Err(NamespaceError::NotCompact(_))
        ));
    }

    #[test]
    fn test_expand_and_compact() {
        let mut mgr = NamespaceManager::new();
        mgr.add("ex", "http://example.org/");

        assert_eq!(mgr.expand("ex:alice").unwrap(), "http://example.org/alice");
        assert_eq!(
            mgr.compact("http://example.org/alice"),
            Some("ex:alice".to_string())
        );
        assert_eq!(mgr.compact("http://unknown.example/x"), None);
    }
}
