//! Resource store contract
//!
//! Every component addresses resources through this module:
//!
//! - **[`ResourceStore`]**: hands out [`Container`] and [`Blob`] handles for a path
//! - **[`Container`]**: a grouping node whose existence is derived from its
//!   descendants. No empty container ever persists.
//! - **[`Blob`]**: a leaf holding one [`Representation`]
//! - **[`MemoryStore`]**: the in-memory reference implementation
//!
//! Handles are cheap and never prove existence; only `exists()` answers that.

mod memory;
mod representation;

use std::fmt::Debug;

use async_trait::async_trait;
use bytes::Bytes;

use crate::path::ResourcePath;

pub use memory::MemoryStore;
pub use representation::{RdfFormat, Representation};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Direct fetch of something that does not exist
    #[error("resource not found: {0}")]
    NotFound(ResourcePath),
    /// A blob operation was attempted on a container path
    #[error("not a blob: {0}")]
    NotABlob(ResourcePath),
    #[error("store backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// An immediate member of a container
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Member {
    pub name: String,
    pub is_container: bool,
}

/// Change notification for external cache invalidation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A blob was created or replaced
    Written { path: ResourcePath, etag: String },
    /// A blob was removed
    Deleted { path: ResourcePath },
}

impl StoreEvent {
    pub fn path(&self) -> &ResourcePath {
        match self {
            StoreEvent::Written { path, .. } => path,
            StoreEvent::Deleted { path } => path,
        }
    }
}

#[async_trait]
pub trait Container: Send + Sync {
    fn path(&self) -> &ResourcePath;

    /// True iff at least one descendant blob exists
    async fn exists(&self) -> Result<bool, StoreError>;

    /// List immediate members.
    ///
    /// Returns an empty list for a container that does not exist; pair with
    ///  [`Container::exists`] to tell the two apart.
    async fn members(&self) -> Result<Vec<Member>, StoreError>;

    /// Remove every descendant
    ///
    /// Fails with [`StoreError::NotFound`] if the container does not exist.
    async fn delete(&self) -> Result<(), StoreError>;
}

#[async_trait]
pub trait Blob: Send + Sync {
    fn path(&self) -> &ResourcePath;

    async fn exists(&self) -> Result<bool, StoreError>;

    /// Fetch the stored representation.
    ///
    /// Fails with [`StoreError::NotFound`] when absent, which is distinct
    ///  from a present blob with an empty body.
    async fn data(&self) -> Result<Representation, StoreError>;

    /// Create or fully replace the stored value
    async fn set_data(&self, content_type: &str, body: Bytes)
        -> Result<Representation, StoreError>;

    /// Fails with [`StoreError::NotFound`] when absent
    async fn delete(&self) -> Result<(), StoreError>;
}

/// A tree of containers and blobs addressed by [`ResourcePath`].
///
/// Implementations must be safe to share across concurrent decisions; each
///  call observes whatever consistency the backend provides.
pub trait ResourceStore: Send + Sync + Debug + Clone + 'static {
    type Container: Container;
    type Blob: Blob;

    /// Handle for the container at `path`, viewed as a container whatever its flag
    fn container(&self, path: &ResourcePath) -> Self::Container;

    /// Handle for the blob at `path`
    fn blob(&self, path: &ResourcePath) -> Self::Blob;
}
