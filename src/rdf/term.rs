//! RDF term model
//!
//! Validated term variants ([`Iri`], [`BlankNode`], [`Literal`]) and the
//! closed role unions ([`Subject`], [`Predicate`], [`Object`], [`Term`])
//! that fix which variant may occupy which triple position. Validity is
//! checked once, in the constructors; consumers never re-check term kinds.

use std::fmt;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use thiserror::Error;

use super::validation::{Validation, ValidationError, Violation};

/// The XML Schema built-in datatypes supported for literals:
/// https://www.w3.org/TR/rdf11-concepts/#xsd-datatypes
pub mod xsd {
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const DECIMAL: &str = "http://www.w3.org/2001/XMLSchema#decimal";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const FLOAT: &str = "http://www.w3.org/2001/XMLSchema#float";
    pub const DATE_TIME: &str = "http://www.w3.org/2001/XMLSchema#dateTime";
    pub const BYTE: &str = "http://www.w3.org/2001/XMLSchema#byte";
    pub const INT: &str = "http://www.w3.org/2001/XMLSchema#int";
}

pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";
pub const RDF_XML_LITERAL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#XMLLiteral";

/// Datatype IRIs accepted by the literal constructors.
pub const SUPPORTED_DATATYPES: [&str; 11] = [
    xsd::STRING,
    xsd::BOOLEAN,
    xsd::DECIMAL,
    xsd::INTEGER,
    xsd::DOUBLE,
    xsd::FLOAT,
    xsd::DATE_TIME,
    xsd::BYTE,
    xsd::INT,
    RDF_LANG_STRING,
    RDF_XML_LITERAL,
];

fn is_supported_datatype(iri: &str) -> bool {
    SUPPORTED_DATATYPES.contains(&iri)
}

/// Type tag distinguishing the term variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermKind {
    Iri,
    BlankNode,
    Literal,
}

/// An IRI reference, used for named resources and predicates.
///
/// A valid IRI cannot be empty and cannot contain any of the disallowed
/// characters `[\x00-\x20<>"{}|^`\]` (RFC 3987).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Iri {
    value: String,
}

impl Iri {
    /// Create a new IRI, or fail with every violated rule.
    ///
    /// Character scanning reports only the first offending character.
    pub fn new(iri: impl Into<String>) -> Result<Self, ValidationError> {
        let iri = Iri { value: iri.into() };
        iri.validate().into_result()?;
        Ok(iri)
    }

    /// Wrap a string that is known to be a well-formed IRI, such as a
    /// vocabulary constant.
    pub(crate) fn new_unchecked(iri: impl Into<String>) -> Self {
        Iri { value: iri.into() }
    }

    /// The IRI string without angle brackets.
    pub fn raw_value(&self) -> &str {
        &self.value
    }

    pub fn kind(&self) -> TermKind {
        TermKind::Iri
    }

    pub fn validate(&self) -> Validation {
        let mut v = Validation::new();
        v.check(!self.value.trim().is_empty(), Violation::EmptyIri);

        for c in self.value.chars() {
            if c <= '\x20' {
                v.add(Violation::DisallowedIriCharacter(c));
                return v;
            }

            match c {
                '<' | '>' | '"' | '{' | '}' | '|' | '^' | '`' | '\\' => {
                    v.add(Violation::DisallowedIriCharacter(c));
                    return v;
                }
                _ => {}
            }
        }

        v
    }

    /// Split the IRI at the last `/` or `#` into a namespace prefix and a
    /// local suffix.
    ///
    /// When the IRI cannot be split, both parts are returned empty.
    pub fn split(&self) -> (&str, &str) {
        match self.value.rfind(['/', '#']) {
            Some(pos) => self.value.split_at(pos + 1),
            None => ("", ""),
        }
    }
}

impl fmt::Display for Iri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.value)
    }
}

/// A blank node: an unnamed resource identified only by a local label.
///
/// The canonical form is `_:<label>`; leading and trailing whitespace is
/// trimmed from the label.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlankNode {
    label: String,
}

impl BlankNode {
    /// Create a new blank node. Fails only when the label is blank.
    pub fn new(label: impl Into<String>) -> Result<Self, ValidationError> {
        let node = BlankNode {
            label: label.into().trim().to_string(),
        };
        node.validate().into_result()?;
        Ok(node)
    }

    /// The blank node label without the `_:` marker.
    pub fn raw_value(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> TermKind {
        TermKind::BlankNode
    }

    pub fn validate(&self) -> Validation {
        let mut v = Validation::new();
        v.check(!self.label.is_empty(), Violation::EmptyBlankNode);
        v
    }
}

impl fmt::Display for BlankNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_:{}", self.label)
    }
}

/// The typed value of a literal, parsed from its lexical form.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    String(String),
    Boolean(bool),
    Integer(i64),
    Double(f64),
    DateTime(DateTime<FixedOffset>),
    Bytes(Vec<u8>),
}

/// Failure to parse a literal's lexical form into its datatype.
#[derive(Error, Debug)]
#[error("cannot parse {value:?} as {datatype}")]
pub struct TypedValueError {
    value: String,
    datatype: String,
}

/// An RDF literal: a value with a datatype and optionally a language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    value: String,
    language: Option<String>,
    datatype: Iri,
}

impl Literal {
    /// Create a plain literal with the datatype xsd:string.
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let literal = Literal {
            value: value.into(),
            language: None,
            datatype: Iri::new_unchecked(xsd::STRING),
        };
        literal.validate().into_result()?;
        Ok(literal)
    }

    /// Create a language-tagged literal with the datatype rdf:langString.
    ///
    /// The tag must match the restricted grammar: letters, at most one
    /// internal `-`, no leading or trailing `-`, digits only after the `-`.
    pub fn with_language(
        value: impl Into<String>,
        language: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let literal = Literal {
            value: value.into(),
            language: Some(language.into()),
            datatype: Iri::new_unchecked(RDF_LANG_STRING),
        };
        literal.validate().into_result()?;
        Ok(literal)
    }

    /// Create a typed literal. Fails when the datatype is not on the
    /// supported allow-list.
    pub fn with_datatype(
        value: impl Into<String>,
        datatype: Iri,
    ) -> Result<Self, ValidationError> {
        let literal = Literal {
            value: value.into(),
            language: None,
            datatype,
        };
        literal.validate().into_result()?;
        Ok(literal)
    }

    /// The lexical form of the literal.
    pub fn raw_value(&self) -> &str {
        &self.value
    }

    /// The language tag of a language-tagged string.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn datatype(&self) -> &Iri {
        &self.datatype
    }

    pub fn kind(&self) -> TermKind {
        TermKind::Literal
    }

    pub fn validate(&self) -> Validation {
        let mut v = Validation::new();
        v.check(!self.value.is_empty(), Violation::EmptyLiteral);

        if let Some(tag) = &self.language {
            validate_language_tag(&mut v, tag);
        }

        v.check(
            is_supported_datatype(self.datatype.raw_value()),
            Violation::UnsupportedDatatype(self.datatype.raw_value().to_string()),
        );

        v
    }

    /// Parse the lexical form into a typed value according to the datatype.
    pub fn typed(&self) -> Result<LiteralValue, TypedValueError> {
        let parse_error = || TypedValueError {
            value: self.value.clone(),
            datatype: self.datatype.raw_value().to_string(),
        };

        match self.datatype.raw_value() {
            xsd::INTEGER | xsd::INT => self
                .value
                .parse::<i64>()
                .map(LiteralValue::Integer)
                .map_err(|_| parse_error()),
            xsd::DOUBLE | xsd::DECIMAL | xsd::FLOAT => self
                .value
                .parse::<f64>()
                .map(LiteralValue::Double)
                .map_err(|_| parse_error()),
            xsd::BOOLEAN => self
                .value
                .parse::<bool>()
                .map(LiteralValue::Boolean)
                .map_err(|_| parse_error()),
            xsd::DATE_TIME => DateTime::parse_from_rfc3339(&self.value)
                .map(LiteralValue::DateTime)
                .map_err(|_| parse_error()),
            xsd::BYTE => Ok(LiteralValue::Bytes(self.value.clone().into_bytes())),
            _ => Ok(LiteralValue::String(self.value.clone())),
        }
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal {
            value: value.to_string(),
            language: None,
            datatype: Iri::new_unchecked(xsd::BOOLEAN),
        }
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal {
            value: value.to_string(),
            language: None,
            datatype: Iri::new_unchecked(xsd::INTEGER),
        }
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal {
            value: value.to_string(),
            language: None,
            datatype: Iri::new_unchecked(xsd::DOUBLE),
        }
    }
}

impl From<DateTime<Utc>> for Literal {
    fn from(value: DateTime<Utc>) -> Self {
        Literal {
            value: value.to_rfc3339_opts(SecondsFormat::Secs, true),
            language: None,
            datatype: Iri::new_unchecked(xsd::DATE_TIME),
        }
    }
}

impl fmt::Display for Literal {
    /// The N-Triples representation of the literal.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("\"")?;
        for c in self.value.chars() {
            match c {
                '\\' => f.write_str("\\\\")?,
                '"' => f.write_str("\\\"")?,
                '\n' => f.write_str("\\n")?,
                '\r' => f.write_str("\\r")?,
                '\t' => f.write_str("\\t")?,
                _ => fmt::Write::write_char(f, c)?,
            }
        }
        f.write_str("\"")?;

        if let Some(tag) = &self.language {
            write!(f, "@{tag}")?;
        }

        // xsd:string is implied, rdf:langString is carried by the tag
        let dt = self.datatype.raw_value();
        if dt != xsd::STRING && dt != RDF_LANG_STRING {
            write!(f, "^^{}", self.datatype)?;
        }

        Ok(())
    }
}

fn validate_language_tag(v: &mut Validation, tag: &str) {
    let bad = |reason| Violation::InvalidLanguageTag {
        tag: tag.to_string(),
        reason,
    };

    v.check(!tag.starts_with('-'), bad("must start with a letter"));
    v.check(!tag.ends_with('-'), bad("trailing '-' disallowed"));

    let mut after_dash = false;
    for c in tag.chars() {
        match c {
            'A'..='Z' | 'a'..='z' => {}
            '-' => {
                if after_dash {
                    v.add(bad("only one '-' allowed"));
                }
                after_dash = true;
            }
            '0'..='9' if after_dash => {}
            _ => v.add(bad("unexpected character")),
        }
    }
}

/// Terms valid as the subject of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Iri(Iri),
    BlankNode(BlankNode),
}

impl Subject {
    pub fn raw_value(&self) -> &str {
        match self {
            Subject::Iri(iri) => iri.raw_value(),
            Subject::BlankNode(node) => node.raw_value(),
        }
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Subject::Iri(_) => TermKind::Iri,
            Subject::BlankNode(_) => TermKind::BlankNode,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, Subject::Iri(_))
    }

    pub fn is_blank_node(&self) -> bool {
        matches!(self, Subject::BlankNode(_))
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Subject::Iri(iri) => iri.fmt(f),
            Subject::BlankNode(node) => node.fmt(f),
        }
    }
}

impl From<Iri> for Subject {
    fn from(iri: Iri) -> Self {
        Subject::Iri(iri)
    }
}

impl From<BlankNode> for Subject {
    fn from(node: BlankNode) -> Self {
        Subject::BlankNode(node)
    }
}

/// The predicate of a triple; always an IRI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Predicate(Iri);

impl Predicate {
    /// Create a new predicate from an IRI string.
    pub fn new(iri: impl Into<String>) -> Result<Self, ValidationError> {
        Ok(Predicate(Iri::new(iri)?))
    }

    pub fn raw_value(&self) -> &str {
        self.0.raw_value()
    }

    pub fn as_iri(&self) -> &Iri {
        &self.0
    }

    pub fn kind(&self) -> TermKind {
        TermKind::Iri
    }

    /// See [`Iri::split`].
    pub fn split(&self) -> (&str, &str) {
        self.0.split()
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Iri> for Predicate {
    fn from(iri: Iri) -> Self {
        Predicate(iri)
    }
}

impl From<Predicate> for Iri {
    fn from(predicate: Predicate) -> Self {
        predicate.0
    }
}

/// Terms valid as the object of a triple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Object {
    Iri(Iri),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl Object {
    pub fn raw_value(&self) -> &str {
        match self {
            Object::Iri(iri) => iri.raw_value(),
            Object::BlankNode(node) => node.raw_value(),
            Object::Literal(literal) => literal.raw_value(),
        }
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Object::Iri(_) => TermKind::Iri,
            Object::BlankNode(_) => TermKind::BlankNode,
            Object::Literal(_) => TermKind::Literal,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Object::Literal(_))
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            Object::Literal(literal) => Some(literal),
            _ => None,
        }
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Iri(iri) => iri.fmt(f),
            Object::BlankNode(node) => node.fmt(f),
            Object::Literal(literal) => literal.fmt(f),
        }
    }
}

impl From<Iri> for Object {
    fn from(iri: Iri) -> Self {
        Object::Iri(iri)
    }
}

impl From<BlankNode> for Object {
    fn from(node: BlankNode) -> Self {
        Object::BlankNode(node)
    }
}

impl From<Literal> for Object {
    fn from(literal: Literal) -> Self {
        Object::Literal(literal)
    }
}

impl From<Subject> for Object {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Iri(iri) => Object::Iri(iri),
            Subject::BlankNode(node) => Object::BlankNode(node),
        }
    }
}

/// Any RDF term.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    Iri(Iri),
    BlankNode(BlankNode),
    Literal(Literal),
}

impl Term {
    pub fn raw_value(&self) -> &str {
        match self {
            Term::Iri(iri) => iri.raw_value(),
            Term::BlankNode(node) => node.raw_value(),
            Term::Literal(literal) => literal.raw_value(),
        }
    }

    pub fn kind(&self) -> TermKind {
        match self {
            Term::Iri(_) => TermKind::Iri,
            Term::BlankNode(_) => TermKind::BlankNode,
            Term::Literal(_) => TermKind::Literal,
        }
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Iri(iri) => iri.fmt(f),
            Term::BlankNode(node) => node.fmt(f),
            Term::Literal(literal) => literal.fmt(f),
        }
    }
}

impl From<Subject> for Term {
    fn from(subject: Subject) -> Self {
        match subject {
            Subject::Iri(iri) => Term::Iri(iri),
            Subject::BlankNode(node) => Term::BlankNode(node),
        }
    }
}

impl From<Object> for Term {
    fn from(object: Object) -> Self {
        match object {
            Object::Iri(iri) => Term::Iri(iri),
            Object::BlankNode(node) => Term::BlankNode(node),
            Object::Literal(literal) => Term::Literal(literal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iri_roundtrip() {
        let iri = Iri::new("http://example.org/alice").unwrap();
        assert_eq!(iri.raw_value(), "http://example.org/alice");
        assert_eq!(iri.to_string(), "<http://example.org/alice>");
        assert_eq!(iri.kind(), TermKind::Iri);
    }

    #[test]
    fn test_iri_empty() {
        let err = Iri::new("").unwrap_err();
        assert!(err.contains(|v| matches!(v, Violation::EmptyIri)));
    }

    #[test]
    fn test_iri_disallowed_characters() {
        for bad in [
            "urn:with space",
            "urn:with\ttab",
            "urn:with\nnewline",
            "urn:<",
            "urn:>",
            "urn:\"",
            "urn:{",
            "urn:}",
            "urn:|",
            "urn:^",
            "urn:`",
            "urn:\\",
            "\x00",
        ] {
            let err = Iri::new(bad).unwrap_err();
            assert!(
                err.contains(|v| matches!(v, Violation::DisallowedIriCharacter(_))),
                "expected disallowed-character violation for {bad:?}"
            );
        }
    }

    #[test]
    fn test_iri_reports_first_bad_character_only() {
        let err = Iri::new("urn:a b<c").unwrap_err();
        let bad_chars: Vec<_> = err
            .violations()
            .iter()
            .filter(|v| matches!(v, Violation::DisallowedIriCharacter(_)))
            .collect();
        assert_eq!(bad_chars.len(), 1);
        assert_eq!(
            bad_chars[0],
            &Violation::DisallowedIriCharacter(' ')
        );
    }

    #[test]
    fn test_iri_split() {
        let cases = [
            ("http://purl.org/dc/elements/1.1/title", "http://purl.org/dc/elements/1.1/", "title"),
            ("http://www.w3.org/2004/02/skos/core#prefLabel", "http://www.w3.org/2004/02/skos/core#", "prefLabel"),
            ("urn:1", "", ""),
        ];

        for (input, prefix, suffix) in cases {
            let iri = Iri::new(input).unwrap();
            assert_eq!(iri.split(), (prefix, suffix));
        }
    }

    #[test]
    fn test_blank_node() {
        let node = BlankNode::new(" 123\n").unwrap();
        assert_eq!(node.raw_value(), "123");
        assert_eq!(node.to_string(), "_:123");

        for blank in ["", "   "] {
            let err = BlankNode::new(blank).unwrap_err();
            assert!(err.contains(|v| matches!(v, Violation::EmptyBlankNode)));
        }
    }

    #[test]
    fn test_literal_display() {
        let plain = Literal::new("Rembrandt").unwrap();
        assert_eq!(plain.to_string(), "\"Rembrandt\"");

        let tagged = Literal::with_language("x", "en").unwrap();
        assert_eq!(tagged.to_string(), "\"x\"@en");

        let typed =
            Literal::with_datatype("true", Iri::new(xsd::BOOLEAN).unwrap()).unwrap();
        assert_eq!(
            typed.to_string(),
            "\"true\"^^<http://www.w3.org/2001/XMLSchema#boolean>"
        );
    }

    #[test]
    fn test_literal_escaping() {
        let literal = Literal::new("a \"quoted\"\nline\\end").unwrap();
        assert_eq!(literal.to_string(), "\"a \\\"quoted\\\"\\nline\\\\end\"");
    }

    #[test]
    fn test_literal_empty_value() {
        let err = Literal::new("").unwrap_err();
        assert!(err.contains(|v| matches!(v, Violation::EmptyLiteral)));
    }

    #[test]
    fn test_literal_language_tags() {
        for valid in ["en", "en-GB", "nl", "es-419"] {
            assert!(
                Literal::with_language("x", valid).is_ok(),
                "expected valid tag {valid:?}"
            );
        }

        for invalid in ["-en", "en-", "en--GB", "e0", "en GB"] {
            let err = Literal::with_language("x", invalid).unwrap_err();
            assert!(
                err.contains(|v| matches!(v, Violation::InvalidLanguageTag { .. })),
                "expected invalid tag {invalid:?}"
            );
        }
    }

    #[test]
    fn test_literal_unsupported_datatype() {
        let custom = Iri::new("http://example.org/datatype").unwrap();
        let err = Literal::with_datatype("x", custom).unwrap_err();
        assert!(err.contains(|v| matches!(v, Violation::UnsupportedDatatype(_))));
    }

    #[test]
    fn test_literal_multiple_violations_aggregate() {
        let custom = Iri::new("http://example.org/datatype").unwrap();
        let err = Literal::with_datatype("", custom).unwrap_err();
        assert_eq!(err.violations().len(), 2);
    }

    #[test]
    fn test_literal_typed_values() {
        let int = Literal::with_datatype("42", Iri::new(xsd::INTEGER).unwrap()).unwrap();
        assert_eq!(int.typed().unwrap(), LiteralValue::Integer(42));

        let b = Literal::with_datatype("true", Iri::new(xsd::BOOLEAN).unwrap()).unwrap();
        assert_eq!(b.typed().unwrap(), LiteralValue::Boolean(true));

        let f = Literal::with_datatype("1.5", Iri::new(xsd::DOUBLE).unwrap()).unwrap();
        assert_eq!(f.typed().unwrap(), LiteralValue::Double(1.5));

        let bad = Literal::with_datatype("nope", Iri::new(xsd::INTEGER).unwrap()).unwrap();
        assert!(bad.typed().is_err());
    }

    #[test]
    fn test_literal_inference() {
        assert_eq!(Literal::from(true).datatype().raw_value(), xsd::BOOLEAN);
        assert_eq!(Literal::from(12i64).datatype().raw_value(), xsd::INTEGER);
        assert_eq!(Literal::from(1.5f64).datatype().raw_value(), xsd::DOUBLE);
    }

    #[test]
    fn test_cross_variant_equality() {
        let iri = Iri::new("urn:a").unwrap();
        let node = BlankNode::new("a").unwrap();
        let subject_iri: Subject = iri.into();
        let subject_node: Subject = node.into();
        assert_ne!(subject_iri, subject_node);
        assert_eq!(subject_iri.raw_value(), subject_node.raw_value());
    }
}
