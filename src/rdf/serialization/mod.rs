//! Wire formats at the graph boundary
//!
//! Format codecs construct terms and triples and feed them through
//! [`Graph::add`]; the graph imposes no format-specific behavior. The two
//! formats whose textual form is fixed by the index pipeline (N-Triples
//! and Hextuples ND-JSON) are serialized here; richer codecs implement the
//! [`GraphParser`] contract in their own crates.

mod hextuples;
mod ntriples;

pub use hextuples::{write_hextuples, HexTuple, HEXTUPLES_MIME_TYPE};
pub use ntriples::write_ntriples;

use std::io;

use thiserror::Error;

use super::graph::Graph;
use super::validation::ValidationError;

/// The wire formats known to the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RdfFormat {
    /// N-Triples (.nt)
    NTriples,
    /// Hextuples ND-JSON (.hext)
    Hextuples,
    /// JSON-LD (.jsonld)
    JsonLd,
    /// RDF/XML (.rdf)
    RdfXml,
}

impl RdfFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            RdfFormat::NTriples => "application/n-triples",
            RdfFormat::Hextuples => hextuples::HEXTUPLES_MIME_TYPE,
            RdfFormat::JsonLd => "application/ld+json",
            RdfFormat::RdfXml => "application/rdf+xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            RdfFormat::NTriples => "nt",
            RdfFormat::Hextuples => "hext",
            RdfFormat::JsonLd => "jsonld",
            RdfFormat::RdfXml => "rdf",
        }
    }
}

/// Parse errors
#[derive(Error, Debug)]
pub enum ParseError {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// A parsed term failed validation
    #[error("invalid term: {0}")]
    Term(#[from] ValidationError),

    /// Malformed input
    #[error("parse error at line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// No codec registered for the format
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(RdfFormat),
}

/// Serialization errors
#[derive(Error, Debug)]
pub enum SerializeError {
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    /// JSON encoding failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// No serializer registered for the format
    #[error("unsupported format: {0:?}")]
    UnsupportedFormat(RdfFormat),
}

/// The contract implemented by each wire-format codec.
///
/// A parser is solely responsible for constructing valid terms and triples
/// and adding them to the graph; passing an existing graph appends to it.
pub trait GraphParser {
    fn format(&self) -> RdfFormat;

    fn parse(&self, input: &mut dyn io::Read, graph: Option<Graph>) -> Result<Graph, ParseError>;
}
