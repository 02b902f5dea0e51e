//! Hextuples ND-JSON
//!
//! Each line is a 6-element JSON string array:
//! `[subject, predicate, value, datatype, language, graph]`. IRI objects
//! carry the sentinel datatype `globalId`, blank nodes `localId`; literal
//! objects carry their real datatype IRI and language tag.

use std::io::Write;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{ParseError, SerializeError};
use crate::rdf::graph::Graph;
use crate::rdf::term::{BlankNode, Iri, Literal, Object, Predicate};
use crate::rdf::triple::Triple;

/// MIME type of the hextuple ND-JSON stream.
pub const HEXTUPLES_MIME_TYPE: &str = "application/hex+x-ndjson";

const DATATYPE_NAMED_NODE: &str = "globalId";
const DATATYPE_BLANK_NODE: &str = "localId";

/// One triple in hextuple form, tagged with its named graph.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HexTuple {
    pub subject: String,
    pub predicate: String,
    pub value: String,
    pub datatype: String,
    pub language: String,
    pub graph: String,
}

impl HexTuple {
    /// Build a hextuple from a triple and the named graph it belongs to.
    pub fn from_triple(triple: &Triple, graph: &str) -> Self {
        let mut hex = HexTuple {
            subject: triple.subject.raw_value().to_string(),
            predicate: triple.predicate.raw_value().to_string(),
            value: triple.object.raw_value().to_string(),
            graph: graph.to_string(),
            ..HexTuple::default()
        };

        match &triple.object {
            Object::Iri(_) => hex.datatype = DATATYPE_NAMED_NODE.to_string(),
            Object::BlankNode(_) => hex.datatype = DATATYPE_BLANK_NODE.to_string(),
            Object::Literal(literal) => {
                hex.datatype = literal.datatype().raw_value().to_string();
                hex.language = literal.language().unwrap_or_default().to_string();
            }
        }

        hex
    }

    /// Reconstruct the triple, validating every term.
    pub fn as_triple(&self) -> Result<Triple, ParseError> {
        let subject = Iri::new(self.subject.as_str())?;
        let predicate = Predicate::new(self.predicate.as_str())?;

        let object: Object = match self.datatype.as_str() {
            DATATYPE_NAMED_NODE => Iri::new(self.value.as_str())?.into(),
            DATATYPE_BLANK_NODE => BlankNode::new(self.value.as_str())?.into(),
            "" if self.language.is_empty() => Literal::new(self.value.as_str())?.into(),
            _ if !self.language.is_empty() => {
                Literal::with_language(self.value.as_str(), self.language.as_str())?.into()
            }
            datatype => {
                Literal::with_datatype(self.value.as_str(), Iri::new(datatype)?)?.into()
            }
        };

        Ok(Triple::new(subject.into(), predicate, object))
    }
}

impl Serialize for HexTuple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        [
            self.subject.as_str(),
            self.predicate.as_str(),
            self.value.as_str(),
            self.datatype.as_str(),
            self.language.as_str(),
            self.graph.as_str(),
        ]
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for HexTuple {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let items = Vec::<String>::deserialize(deserializer)?;
        let [subject, predicate, value, datatype, language, graph]: [String; 6] = items
            .try_into()
            .map_err(|_| D::Error::custom("invalid length for hextuple array"))?;

        Ok(HexTuple {
            subject,
            predicate,
            value,
            datatype,
            language,
            graph,
        })
    }
}

/// Write the graph as hextuple ND-JSON lines.
pub fn write_hextuples(
    graph: &Graph,
    named_graph: &str,
    out: &mut impl Write,
) -> Result<(), SerializeError> {
    for triple in graph.triples() {
        let hex = HexTuple::from_triple(&triple, named_graph);
        serde_json::to_writer(&mut *out, &hex)?;
        out.write_all(b"\n")?;
    }

    Ok(())
}
