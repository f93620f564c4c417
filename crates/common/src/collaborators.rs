//! External collaborators the engine consumes but does not implement.
//!
//! Parsing, group membership, profile retrieval and credential verification
//! all sit behind these traits. Implementations may be network-bound; the
//! engine bounds and fails closed around every call except parsing.

use std::collections::BTreeSet;
use std::fmt::Debug;

use async_trait::async_trait;
use url::Url;

use crate::graph::Graph;
use crate::store::{RdfFormat, Representation};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The document's format cannot hold authorization statements
    #[error("unsupported document format: {0:?}")]
    UnsupportedFormat(RdfFormat),
    #[error("malformed document: {0}")]
    Malformed(String),
}

/// Turns a stored document into a [`Graph`]
pub trait DocumentParser: Send + Sync + Debug {
    /// Parse `document`, resolving relative references against `base`
    fn parse(&self, document: &Representation, base: &Url) -> Result<Graph, ParseError>;
}

/// Expands a group reference into the identities it contains
#[async_trait]
pub trait GroupResolver: Send + Sync + Debug {
    async fn members(&self, group: &str) -> anyhow::Result<BTreeSet<String>>;
}

/// Fetches an identity's profile document
#[async_trait]
pub trait ProfileFetcher: Send + Sync + Debug {
    async fn fetch(&self, identity: &str) -> anyhow::Result<Graph>;
}

/// Verifies a bearer credential for an audience and yields the identity URI
#[async_trait]
pub trait IdentityVerifier: Send + Sync + Debug {
    async fn verify(&self, token: &str, audience: &str) -> Option<String>;
}

/// A group resolver that knows no groups
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGroups;

#[async_trait]
impl GroupResolver for NoGroups {
    async fn members(&self, _group: &str) -> anyhow::Result<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }
}

/// A profile fetcher that always fails, so no origin is ever trusted
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProfiles;

#[async_trait]
impl ProfileFetcher for NoProfiles {
    async fn fetch(&self, identity: &str) -> anyhow::Result<Graph> {
        Err(anyhow::anyhow!("no profile source configured for {}", identity))
    }
}

/// A verifier that accepts no credentials
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVerifier;

#[async_trait]
impl IdentityVerifier for NoVerifier {
    async fn verify(&self, _token: &str, _audience: &str) -> Option<String> {
        None
    }
}
