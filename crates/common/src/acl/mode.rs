use std::fmt;

use serde::{Deserialize, Serialize};

use crate::vocab::{ACL_APPEND, ACL_CONTROL, ACL_READ, ACL_WRITE};

/// The closed set of access modes an authorization statement can grant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Read,
    Write,
    /// Add to a resource without removing or overwriting anything
    Append,
    /// Read and modify the resource's authorization document
    Control,
}

impl AccessMode {
    pub const ALL: [AccessMode; 4] = [
        AccessMode::Read,
        AccessMode::Write,
        AccessMode::Append,
        AccessMode::Control,
    ];

    pub fn iri(&self) -> &'static str {
        match self {
            AccessMode::Read => ACL_READ,
            AccessMode::Write => ACL_WRITE,
            AccessMode::Append => ACL_APPEND,
            AccessMode::Control => ACL_CONTROL,
        }
    }

    /// Unrecognised IRIs name no mode
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            ACL_READ => Some(AccessMode::Read),
            ACL_WRITE => Some(AccessMode::Write),
            ACL_APPEND => Some(AccessMode::Append),
            ACL_CONTROL => Some(AccessMode::Control),
            _ => None,
        }
    }
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "Read"),
            AccessMode::Write => write!(f, "Write"),
            AccessMode::Append => write!(f, "Append"),
            AccessMode::Control => write!(f, "Control"),
        }
    }
}
