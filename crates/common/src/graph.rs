//! # Parsed graphs
//!
//! Authorization and profile documents reach the engine already parsed. A
//! [`Graph`] is a plain set of [`Triple`]s supporting the simple pattern
//! queries the resolver and trust check need. Parsing itself lives behind
//! [`DocumentParser`](crate::collaborators::DocumentParser).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Term {
    /// An IRI, possibly relative to the document it came from
    Iri(String),
    /// A document-local blank node label
    Blank(String),
    /// A literal's lexical form
    Literal(String),
}

impl Term {
    pub fn iri(iri: impl Into<String>) -> Self {
        Term::Iri(iri.into())
    }

    pub fn blank(label: impl Into<String>) -> Self {
        Term::Blank(label.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Term::Literal(value.into())
    }

    /// The IRI text, if this is an IRI
    pub fn as_iri(&self) -> Option<&str> {
        match self {
            Term::Iri(iri) => Some(iri),
            _ => None,
        }
    }

    /// The IRI text or literal value; blank nodes have none
    pub fn value(&self) -> Option<&str> {
        match self {
            Term::Iri(v) | Term::Literal(v) => Some(v),
            Term::Blank(_) => None,
        }
    }

    /// Whether this term may stand in subject position
    pub fn is_node(&self) -> bool {
        matches!(self, Term::Iri(_) | Term::Blank(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Triple {
    pub subject: Term,
    /// Predicates are always IRIs
    pub predicate: String,
    pub object: Term,
}

impl Triple {
    pub fn new(subject: Term, predicate: impl Into<String>, object: Term) -> Self {
        Self {
            subject,
            predicate: predicate.into(),
            object,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Graph {
    triples: BTreeSet<Triple>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false if the triple was already present
    pub fn insert(&mut self, triple: Triple) -> bool {
        self.triples.insert(triple)
    }

    pub fn add(&mut self, subject: Term, predicate: &str, object: Term) -> bool {
        self.insert(Triple::new(subject, predicate, object))
    }

    pub fn extend<I>(&mut self, triples: I)
    where
        I: IntoIterator<Item = Triple>,
    {
        self.triples.extend(triples)
    }

    pub fn len(&self) -> usize {
        self.triples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Triples matching a pattern; `None` is a wildcard
    pub fn matching<'a>(
        &'a self,
        subject: Option<&'a Term>,
        predicate: Option<&'a str>,
        object: Option<&'a Term>,
    ) -> impl Iterator<Item = &'a Triple> + 'a {
        self.triples.iter().filter(move |t| {
            subject.map_or(true, |s| &t.subject == s)
                && predicate.map_or(true, |p| t.predicate == p)
                && object.map_or(true, |o| &t.object == o)
        })
    }

    /// Objects of `subject predicate ?o`
    pub fn objects<'a>(
        &'a self,
        subject: &'a Term,
        predicate: &'a str,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matching(Some(subject), Some(predicate), None)
            .map(|t| &t.object)
    }

    /// Subjects of `?s predicate object`
    pub fn subjects<'a>(
        &'a self,
        predicate: &'a str,
        object: &'a Term,
    ) -> impl Iterator<Item = &'a Term> + 'a {
        self.matching(None, Some(predicate), Some(object))
            .map(|t| &t.subject)
    }

    pub fn contains(&self, subject: &Term, predicate: &str, object: &Term) -> bool {
        self.matching(Some(subject), Some(predicate), Some(object))
            .next()
            .is_some()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<I: IntoIterator<Item = Triple>>(iter: I) -> Self {
        Self {
            triples: iter.into_iter().collect(),
        }
    }
}
