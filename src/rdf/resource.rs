//! Per-subject grouping of graph triples
//!
//! A [`Resource`] collects every predicate/object pair sharing one subject,
//! with rdf:type objects pulled out into a class list. The graph maintains
//! one resource per distinct subject while triples are inserted.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

use super::term::{Iri, Literal, Object, Predicate, Subject};
use super::triple::{content_hash, Triple, RDF_DESCRIPTION, RDFS_LABEL};

/// The objects recorded for one predicate of a resource, deduplicated by
/// content hash in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ResourcePredicate {
    objects: Vec<Object>,
    seen: FxHashSet<u64>,
}

impl ResourcePredicate {
    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    fn insert(&mut self, object: Object) {
        if self.seen.insert(content_hash(&object)) {
            self.objects.push(object);
        }
    }
}

/// All predicates linked to a single subject.
#[derive(Debug, Clone)]
pub struct Resource {
    subject: Subject,
    types: Vec<Iri>,
    predicates: IndexMap<Iri, ResourcePredicate>,
}

impl Resource {
    pub fn new(subject: Subject) -> Self {
        Self {
            subject,
            types: Vec::new(),
            predicates: IndexMap::new(),
        }
    }

    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// The rdf:type classes of this resource. An untyped resource reports
    /// the generic rdf:Description class.
    pub fn types(&self) -> Vec<Iri> {
        if self.types.is_empty() {
            return vec![Iri::new_unchecked(RDF_DESCRIPTION)];
        }

        self.types.clone()
    }

    /// Record a triple's predicate and object on this resource.
    ///
    /// Objects are deduplicated per predicate; rdf:type objects that are
    /// IRIs are additionally collected into the type list.
    pub fn add(&mut self, triple: &Triple) {
        if triple.rdf_type().is_some() {
            if let Object::Iri(class) = &triple.object {
                if !self.types.contains(class) {
                    self.types.push(class.clone());
                }
            }
        }

        self.predicates
            .entry(triple.predicate.as_iri().clone())
            .or_default()
            .insert(triple.object.clone());
    }

    /// Predicate/objects groups in insertion order.
    pub fn predicates(&self) -> impl Iterator<Item = (&Iri, &ResourcePredicate)> {
        self.predicates.iter()
    }

    /// Predicate/objects groups sorted by predicate IRI, for serializers
    /// that need deterministic output independent of insertion order.
    pub fn sorted_predicates(&self) -> Vec<(&Iri, &ResourcePredicate)> {
        let mut predicates: Vec<_> = self.predicates.iter().collect();
        predicates.sort_by_key(|(iri, _)| iri.raw_value());
        predicates
    }

    /// The first rdfs:label literal, if any.
    pub fn label(&self) -> Option<&Literal> {
        let label = Iri::new_unchecked(RDFS_LABEL);
        self.predicates
            .get(&label)?
            .objects()
            .iter()
            .find_map(Object::as_literal)
    }

    /// Restate the grouped view as triples.
    pub fn triples(&self) -> Vec<Triple> {
        let mut triples = Vec::new();
        for (predicate, group) in &self.predicates {
            for object in group.objects() {
                triples.push(Triple::new(
                    self.subject.clone(),
                    Predicate::from(predicate.clone()),
                    object.clone(),
                ));
            }
        }

        triples
    }
}
