//! N-Triples output
//!
//! One `<s> <p> <o> .` line per triple with a trailing LF, in graph
//! insertion order.

use std::io::Write;

use super::SerializeError;
use crate::rdf::graph::Graph;

/// Write the graph as N-Triples.
pub fn write_ntriples(graph: &Graph, out: &mut impl Write) -> Result<(), SerializeError> {
    for triple in graph.triples() {
        writeln!(out, "{triple}")?;
    }

    Ok(())
}
