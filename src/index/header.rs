//! Document header
//!
//! The queryable metadata that must accompany a graph before it can be
//! submitted for indexing.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::rdf::validation::{Validation, ValidationError, Violation};

/// The document type under which graphs are indexed.
pub const GRAPH_DOC_TYPE: &str = "graph";

fn is_zero_i64(value: &i64) -> bool {
    *value == 0
}

fn is_zero_i32(value: &i32) -> bool {
    *value == 0
}

/// Per-record metadata required to produce an indexable document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Header {
    /// The tenant identifier for this graph
    #[serde(rename = "orgID", skip_serializing_if = "String::is_empty")]
    pub org_id: String,

    /// The unique dataset to which the graph belongs
    #[serde(skip_serializing_if = "String::is_empty")]
    pub spec: String,

    /// The unique identifier of the document record in the hub
    #[serde(rename = "hubID", skip_serializing_if = "String::is_empty")]
    pub hub_id: String,

    /// Queryable tags attached to the whole graph
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    /// The document type for the search index
    #[serde(rename = "docType", skip_serializing_if = "String::is_empty")]
    pub doc_type: String,

    /// The root subject of the stored graph
    #[serde(rename = "entryURI", skip_serializing_if = "String::is_empty")]
    pub entry_uri: String,

    /// The named-graph URI of the stored graph
    #[serde(rename = "namedGraphURI", skip_serializing_if = "String::is_empty")]
    pub named_graph_uri: String,

    /// Milliseconds since epoch
    #[serde(skip_serializing_if = "is_zero_i64")]
    pub modified: i64,

    /// Used to determine which stored version is an orphan to be removed
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub revision: i32,
}

impl Header {
    /// Check the header for missing identity fields. All violations are
    /// aggregated, not just the first.
    pub fn valid(&self) -> Result<(), ValidationError> {
        let mut v = Validation::new();
        let checks: [(&'static str, &str); 6] = [
            ("orgID", &self.org_id),
            ("spec", &self.spec),
            ("hubID", &self.hub_id),
            ("docType", &self.doc_type),
            ("entryURI", &self.entry_uri),
            ("namedGraphURI", &self.named_graph_uri),
        ];

        for (field, value) in checks {
            v.check(!value.is_empty(), Violation::MissingField(field));
        }

        v.into_result()
    }

    /// Fill the derivable fields that are still empty: the modified
    /// timestamp, the named-graph URI (`<entryURI>/graph`) and the
    /// document type.
    pub fn add_defaults(&mut self) {
        if self.modified == 0 {
            self.modified = Utc::now().timestamp_millis();
        }

        if self.named_graph_uri.is_empty() && !self.entry_uri.is_empty() {
            self.named_graph_uri = format!("{}/graph", self.entry_uri);
        }

        self.doc_type = GRAPH_DOC_TYPE.to_string();
    }

    /// Add unique tags to the header tag list.
    pub fn add_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for tag in tags {
            let tag = tag.into();
            if !self.tags.contains(&tag) {
                self.tags.push(tag);
            }
        }
    }
}
