use std::collections::BTreeSet;

use crate::path::ResourcePath;

use super::grants::AccessModeGrants;
use super::mode::AccessMode;
use super::AccessError;

/// A successful access decision
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccessGrant {
    /// Write was required but only Append is held. The executor must refuse
    ///  anything that removes or overwrites existing content.
    pub append_only: bool,
}

impl AccessGrant {
    pub fn is_append_only(&self) -> bool {
        self.append_only
    }
}

/// A granted decision together with what it was decided from.
///
/// Follow-up checks such as origin trust read owners from `grants` so they
///  see the same document the grant was made against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub grant: AccessGrant,
    /// The resource the modes were checked on; the governed resource for an
    ///  authorization document
    pub resource: ResourcePath,
    pub required: BTreeSet<AccessMode>,
    pub grants: AccessModeGrants,
}

impl Decision {
    pub fn owners(&self) -> BTreeSet<String> {
        self.grants.owners()
    }
}

/// The modes an operation needs on `target`.
///
/// Any operation on an authorization document needs exactly Control on the
///  resource it governs, whatever the operation itself would need.
pub fn effective_requirement(
    target: &ResourcePath,
    required: &[AccessMode],
) -> (ResourcePath, BTreeSet<AccessMode>) {
    match target.acl_base() {
        Some(base) => (base, BTreeSet::from([AccessMode::Control])),
        None => (target.clone(), required.iter().copied().collect()),
    }
}

/// Check every required mode against resolved grants.
///
/// All modes must hold; the first failure denies the whole operation. The
///  only downgrade is Write to Append, which sets the append-only flag.
pub fn evaluate(
    grants: &AccessModeGrants,
    identity: Option<&str>,
    required: &BTreeSet<AccessMode>,
    resource: &ResourcePath,
) -> Result<AccessGrant, AccessError> {
    let mut grant = AccessGrant::default();

    for &mode in required {
        if grants.permits(mode, identity) {
            continue;
        }
        if mode == AccessMode::Write && grants.permits(AccessMode::Append, identity) {
            grant.append_only = true;
            continue;
        }
        return Err(AccessError::Denied {
            mode,
            resource: resource.clone(),
        });
    }

    Ok(grant)
}
