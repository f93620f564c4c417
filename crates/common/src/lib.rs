/**
 * Access control: locating the authorization
 *  document for a resource, resolving it into
 *  per-mode grants and deciding a request.
 */
pub mod acl;
/**
 * Traits for the external services the engine
 *  consults: document parsing, group membership,
 *  profile retrieval and credential verification.
 */
pub mod collaborators;
/**
 * The engine itself. Wires a store and the
 *  collaborators into the decision pipeline.
 */
pub mod engine;
/**
 * Parsed linked-data graphs.
 */
pub mod graph;
/**
 * Hierarchical resource addresses.
 */
pub mod path;
/**
 * Storage contract for containers and blobs,
 *  plus an in-memory implementation.
 */
pub mod store;
/**
 * Origin trust through owner profiles.
 */
pub mod trust;
/**
 * Fixed vocabulary of the authorization model.
 */
pub mod vocab;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub mod prelude {
    pub use crate::acl::{AccessError, AccessGrant, AccessMode, AccessModeGrants, AclError, Grantees};
    pub use crate::collaborators::{DocumentParser, GroupResolver, IdentityVerifier, ProfileFetcher};
    pub use crate::engine::{AccessEngine, EngineSettings};
    pub use crate::graph::{Graph, Term, Triple};
    pub use crate::path::{PathError, ResourcePath};
    pub use crate::store::{Blob, Container, MemoryStore, ResourceStore, StoreError};
}
