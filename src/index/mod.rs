//! Indexable documents
//!
//! This module turns a grouped RDF graph into the document shape the
//! search-indexing service consumes: a validated [`Header`], resources of
//! denormalized [`Entry`] values, and the [`ContextRef`] paths computed by
//! the context-level resolver. The final [`IndexMessage`] carries the
//! JSON-serialized document to the indexing collaborator.
//!
//! # Example
//!
//! ```rust
//! use trove::index::{DocumentGraph, Entry, Header};
//!
//! let header = Header {
//!     org_id: "demo".to_string(),
//!     spec: "paintings".to_string(),
//!     hub_id: "demo_paintings_1".to_string(),
//!     entry_uri: "urn:1".to_string(),
//!     ..Header::default()
//! };
//!
//! let mut doc = DocumentGraph::new(header).unwrap();
//! doc.add_entry(
//!     "urn:1",
//!     Entry {
//!         search_label: "dc_title".to_string(),
//!         value: "De Nachtwacht".to_string(),
//!         ..Entry::default()
//!     },
//! );
//!
//! let message = doc.index_message().unwrap();
//! assert_eq!(message.record_id, "demo_paintings_1");
//! ```

mod entry;
mod graph;
mod header;
mod resource;
mod response;

pub use entry::{Entry, EntryError, EntryType, IndexRange};
pub use graph::{
    DocumentError, DocumentGraph, IndexMessage, IndexType, ResolutionReport,
};
pub use header::{Header, GRAPH_DOC_TYPE};
pub use resource::{ContextRef, Resource, RESOURCE_LABEL_PREDICATES};
pub use response::{GraphResponse, ResultSummary};
