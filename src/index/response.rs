//! Presentation views over an indexable document
//!
//! A [`GraphResponse`] wraps a document with a tag-driven [`ResultSummary`]
//! and a flattened JSON-LD rendering, so search results can be presented
//! uniformly without the client understanding each indexed rdf class.

use serde::Serialize;
use serde_json::{json, Map, Value};

use super::entry::Entry;
use super::graph::DocumentGraph;
use super::resource::Resource;

/// A uniform preview of a graph, filled from tagged entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ResultSummary {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub title: Vec<String>,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub owner: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub thumbnail: String,

    #[serde(rename = "landingPage", skip_serializing_if = "String::is_empty")]
    pub landing_page: String,

    #[serde(rename = "latLong", skip_serializing_if = "Vec::is_empty")]
    pub lat_long: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub date: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub description: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subject: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collection: Vec<String>,

    #[serde(rename = "subCollection", skip_serializing_if = "Vec::is_empty")]
    pub sub_collection: Vec<String>,

    #[serde(rename = "objectID", skip_serializing_if = "String::is_empty")]
    pub object_id: String,

    #[serde(rename = "objectType", skip_serializing_if = "Vec::is_empty")]
    pub object_type: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub creator: Vec<String>,
}

impl ResultSummary {
    /// Fill summary fields from one entry, driven by its tags.
    pub fn add_entry(&mut self, entry: &Entry) {
        for tag in &entry.tags {
            match tag.as_str() {
                "title" => self.title.push(entry.value.clone()),
                "thumbnail" => {
                    // edm:object always wins; it also puts the first web
                    // resource in front
                    if entry.search_label == "edm_object" {
                        self.thumbnail = entry.value.clone();
                    }

                    if self.thumbnail.is_empty() {
                        self.thumbnail = entry.value.clone();
                    }
                }
                "subject" => self.subject.push(entry.value.clone()),
                "creator" => self.creator.push(entry.value.clone()),
                "description" => self.description.push(entry.value.clone()),
                "landingPage" => {
                    if self.landing_page.is_empty() {
                        self.landing_page = entry.value.clone();
                    }
                }
                "collection" => self.collection.push(entry.value.clone()),
                "subCollection" => self.sub_collection.push(entry.value.clone()),
                "objectType" => self.object_type.push(entry.value.clone()),
                "objectID" => {
                    if self.object_id.is_empty() {
                        self.object_id = entry.value.clone();
                    }
                }
                "owner" => {
                    if self.owner.is_empty() {
                        self.owner = entry.value.clone();
                    }
                }
                "latLong" => self.lat_long.push(entry.value.clone()),
                "date" => self.date.push(entry.value.clone()),
                _ => {}
            }
        }
    }
}

/// A document wrapped with its presentation views.
#[derive(Debug, Serialize)]
pub struct GraphResponse {
    #[serde(flatten)]
    graph: DocumentGraph,

    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ResultSummary>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    jsonld: Vec<Value>,
}

impl GraphResponse {
    pub fn new(graph: DocumentGraph) -> Self {
        GraphResponse {
            graph,
            summary: None,
            jsonld: Vec::new(),
        }
    }

    pub fn graph(&self) -> &DocumentGraph {
        &self.graph
    }

    /// Build the summary from every tagged entry in the document.
    pub fn build_summary(&mut self) -> &ResultSummary {
        let mut summary = ResultSummary::default();
        for resource in self.graph.resources() {
            for entry in resource.entries() {
                summary.add_entry(&entry);
            }
        }

        self.summary.insert(summary)
    }

    /// Build the flattened JSON-LD rendering of the document, one object
    /// per resource.
    pub fn build_jsonld(&mut self) -> &[Value] {
        self.jsonld = self.graph.resources().map(resource_jsonld).collect();
        &self.jsonld
    }
}

fn ld_object(entry: &Entry) -> Value {
    let mut object = Map::new();
    if entry.id.is_empty() {
        object.insert("@value".to_string(), json!(entry.value));
    } else {
        object.insert("@id".to_string(), json!(entry.id));
    }

    if !entry.language.is_empty() {
        object.insert("@language".to_string(), json!(entry.language));
    }

    if !entry.datatype.is_empty() {
        object.insert("@type".to_string(), json!(entry.datatype));
    }

    Value::Object(object)
}

fn resource_jsonld(resource: &Resource) -> Value {
    let mut object = Map::new();
    object.insert("@id".to_string(), json!(resource.id()));
    if !resource.types().is_empty() {
        object.insert("@type".to_string(), json!(resource.types()));
    }

    let mut grouped: Map<String, Value> = Map::new();
    for entry in resource.entries() {
        let objects = grouped
            .entry(entry.predicate.clone())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(objects) = objects {
            objects.push(ld_object(&entry));
        }
    }

    object.extend(grouped);
    Value::Object(object)
}
