//! RDF model for the metadata hub
//!
//! This module implements the in-memory RDF layer every other hub
//! component builds on:
//! - validated terms (IRIs, blank nodes, literals) with role unions that
//!   fix what may appear in each triple position
//! - an insertion-ordered, deduplicated triple [`Graph`] with an opt-in
//!   secondary index and a per-subject grouped view
//! - namespace management for prefixes, compact IRIs and search labels
//! - the parser/serializer contracts at the wire-format boundary
//!
//! # Example
//!
//! ```rust
//! use trove::rdf::{Graph, Iri, Literal, Predicate};
//!
//! let graph = Graph::new();
//! let subject = Iri::new("http://example.org/alice").unwrap();
//! let name = Predicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//!
//! graph.add_triple(
//!     subject.into(),
//!     name,
//!     Literal::new("Alice").unwrap().into(),
//! );
//! assert_eq!(graph.len(), 1);
//! ```

mod graph;
mod graph_index;
mod namespace;
mod resource;
pub mod serialization;
mod term;
mod triple;
pub mod validation;

pub use graph::{Graph, GraphError, GraphResult};
pub use graph_index::GraphStats;
pub use namespace::{
    split_uri, Namespace, NamespaceError, NamespaceManager, NamespaceResult,
};
pub use resource::{Resource, ResourcePredicate};
pub use term::{
    xsd, BlankNode, Iri, Literal, LiteralValue, Object, Predicate, Subject, Term, TermKind,
    TypedValueError, RDF_LANG_STRING, RDF_XML_LITERAL, SUPPORTED_DATATYPES,
};
pub use triple::{Triple, RDF_DESCRIPTION, RDF_FIRST, RDF_NIL, RDF_REST, RDFS_LABEL, RDF_TYPE};
