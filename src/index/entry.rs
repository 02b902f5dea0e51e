//! Index entries
//!
//! An [`Entry`] is the denormalized form of one predicate/object pair,
//! flattened for indexing in nested search-engine fields. Entries carry a
//! 64-bit content fingerprint used to deduplicate repeated facts, and a
//! tag list that can trigger typed index fields (dates, ranges,
//! coordinates).

use std::hash::Hasher;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::rdf::validation::ValidationError;
use crate::rdf::{
    BlankNode, Iri, Literal, NamespaceManager, Object, Predicate, Subject, Triple,
};

/// Entry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EntryError {
    #[error("unable to create date range for {0:?}")]
    InvalidDateRange(String),

    #[error("unable to hyphenate date string: {0:?}")]
    InvalidDate(String),

    #[error("unsupported case for year padding: {0:?}")]
    UnsupportedPadding(String),

    #[error("range start {greater} is after range end {less}")]
    InvertedRange { greater: String, less: String },
}

/// The kind of object an entry was built from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryType {
    #[default]
    Literal,
    Resource,
    Bnode,
}

/// A range over lexically comparable values, used for date facets.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexRange {
    #[serde(rename = "gte")]
    pub greater: String,
    #[serde(rename = "lte")]
    pub less: String,
}

impl IndexRange {
    /// Check that the start of the range does not exceed its end.
    pub fn valid(&self) -> Result<(), EntryError> {
        if self.greater > self.less {
            return Err(EntryError::InvertedRange {
                greater: self.greater.clone(),
                less: self.less.clone(),
            });
        }

        Ok(())
    }
}

fn is_zero_i32(value: &i32) -> bool {
    *value == 0
}

fn is_zero_u32(value: &u32) -> bool {
    *value == 0
}

/// A denormalized predicate/object pair belonging to one resource.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entry {
    /// IRI or blank-node label of the object, when it is not a literal
    #[serde(rename = "@id", skip_serializing_if = "String::is_empty")]
    pub id: String,

    /// Full predicate IRI
    #[serde(skip_serializing_if = "String::is_empty")]
    pub predicate: String,

    /// Namespaced short form of the predicate, e.g. `dc_title`
    #[serde(rename = "searchLabel", skip_serializing_if = "String::is_empty")]
    pub search_label: String,

    /// Literal value of the object
    #[serde(rename = "@value", skip_serializing_if = "String::is_empty")]
    pub value: String,

    /// Language tag of the literal
    #[serde(rename = "@language", skip_serializing_if = "String::is_empty")]
    pub language: String,

    /// Datatype IRI of the literal
    #[serde(rename = "@type", skip_serializing_if = "String::is_empty")]
    pub datatype: String,

    #[serde(rename = "entrytype")]
    pub entry_type: EntryType,

    /// Depth of the owning resource; deeper entries rank lower
    #[serde(skip_serializing_if = "is_zero_i32")]
    pub level: i32,

    /// Position of the source triple in the graph, to keep entries sorted
    /// across serialization
    #[serde(skip_serializing_if = "is_zero_u32")]
    pub order: u32,

    /// Tags trigger the typed index fields below
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    #[serde(rename = "isoDate", skip_serializing_if = "Vec::is_empty")]
    pub dates: Vec<String>,

    #[serde(rename = "dateRange", skip_serializing_if = "Option::is_none")]
    pub date_range: Option<IndexRange>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub integer: Option<i64>,

    #[serde(rename = "latLong", skip_serializing_if = "String::is_empty")]
    pub lat_long: String,
}

impl Entry {
    /// Build an entry from a predicate and object pair.
    pub fn from_object(predicate: &Iri, object: &Object, namespaces: &NamespaceManager) -> Self {
        let mut entry = Entry {
            predicate: predicate.raw_value().to_string(),
            search_label: search_label(predicate.raw_value(), namespaces),
            ..Entry::default()
        };

        match object {
            Object::Iri(iri) => {
                entry.id = iri.raw_value().to_string();
                entry.entry_type = EntryType::Resource;
            }
            Object::BlankNode(node) => {
                entry.id = node.raw_value().to_string();
                entry.entry_type = EntryType::Bnode;
            }
            Object::Literal(literal) => {
                entry.value = literal.raw_value().to_string();
                entry.language = literal.language().unwrap_or_default().to_string();
                entry.datatype = literal.datatype().raw_value().to_string();
                entry.entry_type = EntryType::Literal;
            }
        }

        entry
    }

    /// The content fingerprint of the embedded triple values, used for
    /// deduplication. Entries with equal id, predicate, value, language
    /// and datatype fingerprint identically regardless of order or tags.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        hasher.write(self.id.as_bytes());
        hasher.write(self.predicate.as_bytes());
        hasher.write(self.value.as_bytes());
        hasher.write(self.language.as_bytes());
        hasher.write(self.datatype.as_bytes());
        hasher.finish()
    }

    /// Reconstruct the triple this entry was flattened from.
    pub fn as_triple(&self, subject: &Subject) -> Result<Triple, ValidationError> {
        let predicate = Predicate::new(self.predicate.as_str())?;

        let object: Object = match self.entry_type {
            EntryType::Bnode => BlankNode::new(self.id.as_str())?.into(),
            EntryType::Resource => Iri::new(self.id.as_str())?.into(),
            EntryType::Literal => {
                if !self.language.is_empty() {
                    Literal::with_language(self.value.as_str(), self.language.as_str())?.into()
                } else if !self.datatype.is_empty() {
                    let datatype = Iri::new(self.datatype.as_str())?;
                    Literal::with_datatype(self.value.as_str(), datatype)?.into()
                } else {
                    Literal::new(self.value.as_str())?.into()
                }
            }
        };

        Ok(Triple::new(subject.clone(), predicate, object))
    }

    /// Add unique tags to the tag list.
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

    /// Expand the tag list into typed index fields.
    pub fn process_tags(&mut self) -> Result<(), EntryError> {
        if self.value.is_empty() {
            return Ok(());
        }

        for tag in self.tags.clone() {
            match tag.as_str() {
                "isoDate" => self.dates.push(self.value.clone()),
                "dateRange" => {
                    let range = create_date_range(&self.value)?;
                    if !range.greater.is_empty() {
                        self.dates.push(range.greater.clone());
                    }
                    if !range.less.is_empty() {
                        self.dates.push(range.less.clone());
                    }
                    self.date_range = Some(range);
                }
                "latLong" => self.lat_long = self.value.clone(),
                "integer" => match self.value.parse::<i64>() {
                    Ok(i) => self.integer = Some(i),
                    Err(err) => {
                        warn!(value = %self.value, %err, "unable to create integer");
                    }
                },
                _ => {}
            }
        }

        Ok(())
    }
}

/// The namespaced short form of a predicate; empty when the namespace is
/// not registered.
pub(crate) fn search_label(predicate: &str, namespaces: &NamespaceManager) -> String {
    match namespaces.search_label(predicate) {
        Ok(label) => label,
        Err(err) => {
            warn!(predicate, %err, "unable to find search label");
            String::new()
        }
    }
}

/// Expand a period like `1650`, `1650-06`, or `1650/1700` into a date
/// range with padded start and end days.
fn create_date_range(period: &str) -> Result<IndexRange, EntryError> {
    let parts: Vec<&str> = period
        .trim()
        .split(|c: char| !c.is_numeric() && c != '-')
        .filter(|p| !p.is_empty())
        .collect();

    let range = match parts.as_slice() {
        [single] => IndexRange {
            greater: pad_years(single, true)?,
            less: pad_years(single, false)?,
        },
        [start, end] => IndexRange {
            greater: pad_years(start, true)?,
            less: pad_years(end, false)?,
        },
        _ => return Err(EntryError::InvalidDateRange(period.to_string())),
    };

    range.valid()?;
    Ok(range)
}

/// Convert YYYYMMDD or YYYYMM date strings into hyphenated form.
fn hyphenate_date(date: &str) -> Result<String, EntryError> {
    match date.len() {
        4 => Ok(date.to_string()),
        6 => Ok(format!("{}-{}", &date[..4], &date[4..])),
        8 => Ok(format!("{}-{}-{}", &date[..4], &date[4..6], &date[6..])),
        _ => Err(EntryError::InvalidDate(date.to_string())),
    }
}

/// Pad a partial year to a full date: the first day of the period when
/// `start` is set, the last day otherwise.
fn pad_years(year: &str, start: bool) -> Result<String, EntryError> {
    let parts: Vec<&str> = year
        .split('-')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();

    match parts.as_slice() {
        [_, _, _] => Ok(year.to_string()),
        [y, month] => {
            if start {
                return Ok(format!("{y}-{month}-01"));
            }

            let last_day = match *month {
                "01" | "03" | "05" | "07" | "08" | "10" | "12" => "31",
                "02" => "28",
                _ => "30",
            };
            Ok(format!("{y}-{month}-{last_day}"))
        }
        [y] if y.len() == 4 => {
            if start {
                Ok(format!("{y}-01-01"))
            } else {
                Ok(format!("{y}-12-31"))
            }
        }
        [y] => pad_years(&hyphenate_date(y)?, start),
        _ => Err(EntryError::UnsupportedPadding(year.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_object_kinds() {
        let namespaces = NamespaceManager::new();
        let predicate = Iri::new("http://purl.org/dc/elements/1.1/subject").unwrap();

        let entry = Entry::from_object(
            &predicate,
            &Iri::new("urn:2").unwrap().into(),
            &namespaces,
        );
        assert_eq!(entry.entry_type, EntryType::Resource);
        assert_eq!(entry.id, "urn:2");
        assert_eq!(entry.search_label, "dc_subject");

        let entry = Entry::from_object(
            &predicate,
            &Literal::with_language("molen", "nl").unwrap().into(),
            &namespaces,
        );
        assert_eq!(entry.entry_type, EntryType::Literal);
        assert_eq!(entry.value, "molen");
        assert_eq!(entry.language, "nl");
    }

    #[test]
    fn test_fingerprint_ignores_order_and_tags() {
        let mut a = Entry {
            predicate: "http://purl.org/dc/elements/1.1/title".to_string(),
            value: "Nachtwacht".to_string(),
            order: 1,
            ..Entry::default()
        };
        let b = Entry {
            order: 7,
            tags: vec!["title".to_string()],
            ..a.clone()
        };
        assert_eq!(a.fingerprint(), b.fingerprint());

        a.value = "Night Watch".to_string();
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_as_triple_round_trip() {
        let namespaces = NamespaceManager::new();
        let subject: Subject = Iri::new("urn:1").unwrap().into();
        let predicate = Iri::new("http://purl.org/dc/elements/1.1/subject").unwrap();

        let objects: Vec<Object> = vec![
            Iri::new("urn:2").unwrap().into(),
            BlankNode::new("b0").unwrap().into(),
            Literal::new("plain").unwrap().into(),
            Literal::with_language("tagged", "en").unwrap().into(),
        ];

        for object in objects {
            let entry = Entry::from_object(&predicate, &object, &namespaces);
            let triple = entry.as_triple(&subject).unwrap();
            assert_eq!(triple.object, object);
        }
    }

    #[test]
    fn test_process_tags_iso_date() {
        let mut entry = Entry {
            value: "1642-07-01".to_string(),
            tags: vec!["isoDate".to_string()],
            ..Entry::default()
        };
        entry.process_tags().unwrap();
        assert_eq!(entry.dates, vec!["1642-07-01"]);
    }

    #[test]
    fn test_process_tags_date_range() {
        let mut entry = Entry {
            value: "1642/1700".to_string(),
            tags: vec!["dateRange".to_string()],
            ..Entry::default()
        };
        entry.process_tags().unwrap();

        let range = entry.date_range.unwrap();
        assert_eq!(range.greater, "1642-01-01");
        assert_eq!(range.less, "1700-12-31");
        assert_eq!(entry.dates, vec!["1642-01-01", "1700-12-31"]);
    }

    #[test]
    fn test_process_tags_integer() {
        let mut entry = Entry {
            value: "17".to_string(),
            tags: vec!["integer".to_string()],
            ..Entry::default()
        };
        entry.process_tags().unwrap();
        assert_eq!(entry.integer, Some(17));
    }

    #[test]
    fn test_create_date_range_single_year() {
        let range = create_date_range("1642").unwrap();
        assert_eq!(range.greater, "1642-01-01");
        assert_eq!(range.less, "1642-12-31");
    }

    #[test]
    fn test_create_date_range_year_month() {
        let range = create_date_range("1642-02").unwrap();
        assert_eq!(range.greater, "1642-02-01");
        assert_eq!(range.less, "1642-02-28");
    }

    #[test]
    fn test_create_date_range_compact_dates() {
        let range = create_date_range("164207").unwrap();
        assert_eq!(range.greater, "1642-07-01");
        assert_eq!(range.less, "1642-07-31");
    }

    #[test]
    fn test_create_date_range_inverted() {
        assert!(matches!(
            create_date_range("1700/1642"),
            Err(EntryError::InvertedRange { .. })
        ));
    }

    #[test]
    fn test_serde_field_names() {
        let entry = Entry {
            id: "urn:2".to_string(),
            predicate: "http://purl.org/dc/elements/1.1/subject".to_string(),
            search_label: "dc_subject".to_string(),
            entry_type: EntryType::Resource,
            order: 3,
            ..Entry::default()
        };

        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["@id"], "urn:2");
        assert_eq!(value["searchLabel"], "dc_subject");
        assert_eq!(value["entrytype"], "Resource");
        assert_eq!(value["order"], 3);
        assert!(value.get("@value").is_none());
    }
}
