use url::Url;

use crate::collaborators::DocumentParser;
use crate::graph::Graph;
use crate::path::ResourcePath;
use crate::store::{Blob, ResourceStore};

use super::AclError;

/// The authorization document governing a resource, and how it relates to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclDocument {
    /// Parsed statements; empty when no document exists up to the root
    pub graph: Graph,
    /// URL statements must reference: the resource itself when adjacent,
    ///  otherwise the ancestor container whose document was found
    pub target: Url,
    /// The document's own URL, used to resolve relative references
    pub context: Url,
    /// True iff the document is adjacent to the requested resource
    pub resource_is_target: bool,
    /// Path of the resource or ancestor the document belongs to
    pub target_path: ResourcePath,
    /// Path of the document itself
    pub document_path: ResourcePath,
    /// False for the deny-by-default result
    pub found: bool,
}

impl AclDocument {
    /// No document anywhere up to the root: nothing is granted
    fn deny_by_default(base_url: &Url, resource_is_target: bool) -> Result<Self, AclError> {
        let root = ResourcePath::root();
        let document_path = root.acl_path();
        Ok(Self {
            graph: Graph::new(),
            target: root.to_url(base_url)?,
            context: document_path.to_url(base_url)?,
            resource_is_target,
            target_path: root,
            document_path,
            found: false,
        })
    }
}

/// Find the document governing `target`.
///
/// Probes the adjacent document first, then each ancestor container's own
///  document, up to and including the root. Requests for an authorization
///  document are located through the resource it governs.
#[tracing::instrument(skip(store, parser, base_url, target), fields(target = %target))]
pub async fn locate_acl_document<S: ResourceStore>(
    store: &S,
    parser: &dyn DocumentParser,
    base_url: &Url,
    target: &ResourcePath,
) -> Result<AclDocument, AclError> {
    let resource = target.acl_base().unwrap_or_else(|| target.clone());
    let mut candidate = resource.clone();
    let mut adjacent = true;

    // one probe per level, so this always terminates at the root
    for _ in 0..=resource.depth() {
        let document_path = candidate.acl_path();
        let blob = store.blob(&document_path);

        tracing::debug!(candidate = %candidate, document = %document_path, adjacent, "probing");

        if blob.exists().await? {
            let document = blob.data().await?;
            let context = document_path.to_url(base_url)?;
            let graph = parser.parse(&document, &context)?;

            tracing::debug!(
                document = %document_path,
                statements = graph.len(),
                adjacent,
                "authorization document found"
            );

            return Ok(AclDocument {
                graph,
                target: candidate.to_url(base_url)?,
                context,
                resource_is_target: adjacent,
                target_path: candidate,
                document_path,
                found: true,
            });
        }

        match candidate.parent() {
            Ok(parent) => {
                candidate = parent;
                adjacent = false;
            }
            Err(_) => break,
        }
    }

    tracing::debug!(resource = %resource, "no authorization document up to the root");
    AclDocument::deny_by_default(base_url, adjacent)
}
