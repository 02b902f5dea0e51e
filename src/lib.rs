//! Trove: digital-heritage metadata hub core
//!
//! The in-memory model and algorithms that the hub's harvesting, storage
//! and search layers build upon:
//!
//! - validated RDF terms and triples per the RDF abstract syntax
//! - an insertion-ordered, content-deduplicated triple [`rdf::Graph`] with
//!   an opt-in secondary index, safe for concurrent producers
//! - per-subject resource grouping with fingerprint-based entry upserts
//! - a context-level resolver that annotates every resource reachable from
//!   a record's root subject with the paths by which it is reached,
//!   terminating safely on cyclic data while preserving diamonds
//! - assembly of the indexable header + resources document and the index
//!   message handed to the search collaborator
//!
//! The core performs no I/O, persistence or query planning; format codecs,
//! triple stores and indexing backends are external collaborators that
//! speak the contracts defined here.
//!
//! # Example
//!
//! ```rust
//! use trove::index::{DocumentGraph, Header};
//! use trove::rdf::{Graph, Iri, Literal, Predicate};
//!
//! let graph = Graph::new();
//! graph.add_triple(
//!     Iri::new("urn:1").unwrap().into(),
//!     Predicate::new("http://purl.org/dc/elements/1.1/title").unwrap(),
//!     Literal::with_language("De Nachtwacht", "nl").unwrap().into(),
//! );
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
//! doc.add_graph(&graph);
//! let message = doc.index_message().unwrap();
//! assert_eq!(message.dataset_id, "paintings");
//! ```

#![warn(clippy::all)]

pub mod index;
pub mod rdf;

// Re-export the types most callers need
pub use index::{DocumentGraph, Entry, Header, IndexMessage};
pub use rdf::{BlankNode, Graph, Iri, Literal, Object, Predicate, Subject, Triple};
