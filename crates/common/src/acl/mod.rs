//! # Authorization
//!
//! The decision pipeline, leaves first:
//!
//! - **[`locate_acl_document`]**: walks from a resource towards the root and
//!   returns the first authorization document found, flagged adjacent or
//!   inherited. Nothing found means an empty graph: deny by default.
//! - **[`resolve_modes`]**: turns that document into [`AccessModeGrants`],
//!   one [`Grantees`] per [`AccessMode`], broadest grantee class winning.
//! - **[`evaluate`]**: checks the required modes against the grants, with the
//!   Write -> Append downgrade as the only exception.
//!
//! There is no explicit deny. Grants only ever add up, and the absence of a
//! matching statement is the sole reason for refusal.

mod decision;
mod grants;
mod locator;
mod mode;
mod resolver;

use crate::collaborators::ParseError;
use crate::path::{PathError, ResourcePath};
use crate::store::StoreError;

pub use decision::{effective_requirement, evaluate, AccessGrant, Decision};
pub use grants::{AccessModeGrants, Grantees};
pub use locator::{locate_acl_document, AclDocument};
pub use mode::AccessMode;
pub use resolver::{expand_groups, resolve_modes, resource_predicate, Classification};

/// Failures while locating or reading an authorization document.
///
/// None of these ever grant access.
#[derive(Debug, thiserror::Error)]
pub enum AclError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("authorization document error: {0}")]
    Parse(#[from] ParseError),
    #[error("path error: {0}")]
    Path(#[from] PathError),
}

#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// No statement grants `mode`. Terminal for the operation.
    #[error("access denied: {mode} on {resource}")]
    Denied {
        mode: AccessMode,
        resource: ResourcePath,
    },
    /// The requesting application is not trusted by any resource owner
    #[error("origin {origin} is not trusted for {mode} on {resource}")]
    UntrustedOrigin {
        origin: String,
        mode: AccessMode,
        resource: ResourcePath,
    },
    #[error(transparent)]
    Acl(#[from] AclError),
}

impl AccessError {
    /// True for refusals, false for failures to reach a decision
    pub fn is_denial(&self) -> bool {
        matches!(
            self,
            AccessError::Denied { .. } | AccessError::UntrustedOrigin { .. }
        )
    }
}
