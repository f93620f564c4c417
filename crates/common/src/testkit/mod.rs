//! Fixtures for exercising the access engine in-process
//!
//! Everything here stands in for a collaborator a real deployment would
//! provide: a parser for a tiny JSON graph format, static group and profile
//! sources, a verifier with a fixed token table, and a builder for
//! authorization statements.
//!
//! # Example
//!
//! ```rust,ignore
//! use common::testkit::{write_acl, AuthorizationBuilder};
//!
//! let graph = AuthorizationBuilder::new("owner")
//!     .agent("https://alice.example/profile#me")
//!     .access_to("./")
//!     .default_for("./")
//!     .modes(&[AccessMode::Read, AccessMode::Write, AccessMode::Control])
//!     .into_graph();
//! write_acl(&store, &ResourcePath::parse("/foo/")?, &graph).await?;
//! ```
use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use bytes::Bytes;
use url::Url;

use crate::acl::AccessMode;
use crate::collaborators::{
    DocumentParser, GroupResolver, IdentityVerifier, ParseError, ProfileFetcher,
};
use crate::graph::{Graph, Term, Triple};
use crate::path::ResourcePath;
use crate::store::{Blob, RdfFormat, Representation, ResourceStore, StoreError};
use crate::vocab::{
    ACL_ACCESS_TO, ACL_AGENT, ACL_AGENT_CLASS, ACL_AGENT_GROUP, ACL_AUTHENTICATED_AGENT,
    ACL_AUTHORIZATION, ACL_DEFAULT, ACL_MODE, ACL_ORIGIN, ACL_TRUSTED_APP, FOAF_AGENT, RDF_TYPE,
};

/// Media type the fixtures store graphs under
pub const JSON_GRAPH_TYPE: &str = "application/ld+json";

/// Parses graphs serialized as a JSON array of [`Triple`]s.
///
/// Relative IRIs in subject or object position are resolved against the
///  document's base.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonGraphParser;

impl JsonGraphParser {
    fn resolve(term: Term, base: &Url) -> Term {
        match term {
            Term::Iri(iri) if Url::parse(&iri).is_err() => match base.join(&iri) {
                Ok(resolved) => Term::Iri(resolved.to_string()),
                Err(_) => Term::Iri(iri),
            },
            other => other,
        }
    }
}

impl DocumentParser for JsonGraphParser {
    fn parse(&self, document: &Representation, base: &Url) -> Result<Graph, ParseError> {
        if document.format() != RdfFormat::JsonLd {
            return Err(ParseError::UnsupportedFormat(document.format()));
        }
        let triples: Vec<Triple> = serde_json::from_slice(document.body())
            .map_err(|e| ParseError::Malformed(e.to_string()))?;
        Ok(triples
            .into_iter()
            .map(|t| Triple {
                subject: Self::resolve(t.subject, base),
                predicate: t.predicate,
                object: Self::resolve(t.object, base),
            })
            .collect())
    }
}

/// Serialize a graph the way [`JsonGraphParser`] reads it
pub fn graph_body(graph: &Graph) -> Bytes {
    let triples: Vec<&Triple> = graph.iter().collect();
    // a Vec of plain data cannot fail to serialize
    Bytes::from(serde_json::to_vec(&triples).unwrap_or_default())
}

/// Store `graph` as the authorization document adjacent to `resource`
pub async fn write_acl<S: ResourceStore>(
    store: &S,
    resource: &ResourcePath,
    graph: &Graph,
) -> Result<Representation, StoreError> {
    store
        .blob(&resource.acl_path())
        .set_data(JSON_GRAPH_TYPE, graph_body(graph))
        .await
}

/// Builds one authorization statement.
///
/// The subject is a fragment of the document, so relative resource
///  references like `./` resolve against the document address.
#[derive(Debug, Clone)]
pub struct AuthorizationBuilder {
    subject: Term,
    triples: Vec<(String, Term)>,
}

impl AuthorizationBuilder {
    pub fn new(fragment: &str) -> Self {
        Self {
            subject: Term::iri(format!("#{}", fragment)),
            triples: vec![(RDF_TYPE.to_string(), Term::iri(ACL_AUTHORIZATION))],
        }
    }

    /// Leave out the authorization type, producing a statement that grants nothing
    pub fn untyped(mut self) -> Self {
        self.triples.retain(|(p, _)| p != RDF_TYPE);
        self
    }

    fn with(mut self, predicate: &str, object: Term) -> Self {
        self.triples.push((predicate.to_string(), object));
        self
    }

    pub fn agent(self, identity: &str) -> Self {
        self.with(ACL_AGENT, Term::iri(identity))
    }

    pub fn group(self, group: &str) -> Self {
        self.with(ACL_AGENT_GROUP, Term::iri(group))
    }

    pub fn everyone(self) -> Self {
        self.with(ACL_AGENT_CLASS, Term::iri(FOAF_AGENT))
    }

    pub fn authenticated(self) -> Self {
        self.with(ACL_AGENT_CLASS, Term::iri(ACL_AUTHENTICATED_AGENT))
    }

    pub fn agent_class(self, class: &str) -> Self {
        self.with(ACL_AGENT_CLASS, Term::iri(class))
    }

    pub fn access_to(self, resource: &str) -> Self {
        self.with(ACL_ACCESS_TO, Term::iri(resource))
    }

    pub fn default_for(self, container: &str) -> Self {
        self.with(ACL_DEFAULT, Term::iri(container))
    }

    pub fn modes(mut self, modes: &[AccessMode]) -> Self {
        for mode in modes {
            self = self.with(ACL_MODE, Term::iri(mode.iri()));
        }
        self
    }

    pub fn add_to(self, graph: &mut Graph) {
        for (predicate, object) in self.triples {
            graph.add(self.subject.clone(), &predicate, object);
        }
    }

    pub fn into_graph(self) -> Graph {
        let mut graph = Graph::new();
        self.add_to(&mut graph);
        graph
    }
}

/// Group membership from a fixed table. Unknown groups are an error.
#[derive(Debug, Clone, Default)]
pub struct StaticGroups {
    groups: BTreeMap<String, BTreeSet<String>>,
}

impl StaticGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<I, M>(mut self, group: &str, members: I) -> Self
    where
        I: IntoIterator<Item = M>,
        M: Into<String>,
    {
        self.groups
            .insert(group.to_string(), members.into_iter().map(Into::into).collect());
        self
    }
}

#[async_trait]
impl GroupResolver for StaticGroups {
    async fn members(&self, group: &str) -> anyhow::Result<BTreeSet<String>> {
        self.groups
            .get(group)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown group {}", group))
    }
}

/// Profile documents from a fixed table. Unknown identities are an error.
#[derive(Debug, Clone, Default)]
pub struct StaticProfiles {
    profiles: BTreeMap<String, Graph>,
}

impl StaticProfiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(mut self, identity: &str, profile: Graph) -> Self {
        self.profiles.insert(identity.to_string(), profile);
        self
    }

    /// Record that `owner` trusts `origin` for `modes`, as a new app entry
    pub fn trusting(mut self, owner: &str, origin: &str, modes: &[AccessMode]) -> Self {
        let profile = self.profiles.entry(owner.to_string()).or_default();
        let app = Term::blank(format!("app{}", profile.len()));
        profile.add(Term::iri(owner), ACL_TRUSTED_APP, app.clone());
        profile.add(app.clone(), ACL_ORIGIN, Term::iri(origin));
        for mode in modes {
            profile.add(app.clone(), ACL_MODE, Term::iri(mode.iri()));
        }
        self
    }
}

#[async_trait]
impl ProfileFetcher for StaticProfiles {
    async fn fetch(&self, identity: &str) -> anyhow::Result<Graph> {
        self.profiles
            .get(identity)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no profile for {}", identity))
    }
}

/// A profile source that never answers
#[derive(Debug, Clone, Copy, Default)]
pub struct HangingProfiles;

#[async_trait]
impl ProfileFetcher for HangingProfiles {
    async fn fetch(&self, _identity: &str) -> anyhow::Result<Graph> {
        futures::future::pending().await
    }
}

/// A group directory that never answers
#[derive(Debug, Clone, Copy, Default)]
pub struct HangingGroups;

#[async_trait]
impl GroupResolver for HangingGroups {
    async fn members(&self, _group: &str) -> anyhow::Result<BTreeSet<String>> {
        futures::future::pending().await
    }
}

/// Accepts a fixed set of bearer tokens, each bound to one audience
#[derive(Debug, Clone, Default)]
pub struct StaticVerifier {
    tokens: BTreeMap<String, (String, String)>,
}

impl StaticVerifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token(mut self, token: &str, identity: &str, audience: &str) -> Self {
        self.tokens
            .insert(token.to_string(), (identity.to_string(), audience.to_string()));
        self
    }
}

#[async_trait]
impl IdentityVerifier for StaticVerifier {
    async fn verify(&self, token: &str, audience: &str) -> Option<String> {
        match self.tokens.get(token) {
            Some((identity, expected)) if expected == audience => Some(identity.clone()),
            _ => None,
        }
    }
}
