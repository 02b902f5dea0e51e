//! Aggregated validation for RDF terms and index headers
//!
//! Constructors collect every violated rule before failing, so callers can
//! report all problems with a term or header at once instead of fixing them
//! one by one.

use thiserror::Error;

/// A single violated validation rule.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// IRI is empty or whitespace-only
    #[error("IRI cannot be empty")]
    EmptyIri,

    /// IRI contains a character from the disallowed set
    #[error("disallowed character in IRI: {0:?}")]
    DisallowedIriCharacter(char),

    /// Blank node label is empty after trimming
    #[error("blank node label cannot be empty")]
    EmptyBlankNode,

    /// Literal value is empty
    #[error("literal value cannot be empty")]
    EmptyLiteral,

    /// Language tag does not match the restricted tag grammar
    #[error("invalid language tag {tag:?}: {reason}")]
    InvalidLanguageTag { tag: String, reason: &'static str },

    /// Datatype IRI is not on the supported allow-list
    #[error("unsupported datatype: {0}")]
    UnsupportedDatatype(String),

    /// A required field is empty
    #[error("{0} must always be set")]
    MissingField(&'static str),
}

/// The aggregate of all violations found on one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    violations: Vec<Violation>,
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    /// All violated rules, in the order they were detected.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether any of the violations matches the predicate.
    pub fn contains(&self, f: impl Fn(&Violation) -> bool) -> bool {
        self.violations.iter().any(f)
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{violation}")?;
        }
        Ok(())
    }
}

/// Collects violations during a validation pass.
///
/// ```
/// use trove::rdf::validation::{Validation, Violation};
///
/// let mut v = Validation::new();
/// v.check(!"".is_empty(), Violation::EmptyIri);
/// assert!(v.into_result().is_err());
/// ```
#[derive(Debug, Default)]
pub struct Validation {
    violations: Vec<Violation>,
}

impl Validation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the violation when `ok` does not hold.
    pub fn check(&mut self, ok: bool, violation: Violation) {
        if !ok {
            self.violations.push(violation);
        }
    }

    /// Record a violation unconditionally.
    pub fn add(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Consume the pass, turning collected violations into an error.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationError {
                violations: self.violations,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_pass_is_valid() {
        let v = Validation::new();
        assert!(v.is_valid());
        assert!(v.into_result().is_ok());
    }

    #[test]
    fn test_violations_aggregate() {
        let mut v = Validation::new();
        v.check(false, Violation::EmptyLiteral);
        v.add(Violation::UnsupportedDatatype("urn:custom".to_string()));
        assert!(!v.is_valid());

        let err = v.into_result().unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert!(err.contains(|v| matches!(v, Violation::EmptyLiteral)));
        assert!(err.contains(|v| matches!(v, Violation::UnsupportedDatatype(_))));
    }

    #[test]
    fn test_display_joins_violations() {
        let mut v = Validation::new();
        v.add(Violation::EmptyIri);
        v.add(Violation::MissingField("orgID"));
        let err = v.into_result().unwrap_err();
        assert_eq!(
            err.to_string(),
            "IRI cannot be empty; orgID must always be set"
        );
    }
}
