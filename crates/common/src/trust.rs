//! Trusted-application check.
//!
//! A resource owner's profile may list applications they trust, each with an
//! origin and the modes it may exercise on their behalf:
//!
//! ```text
//! <owner> acl:trustedApp [ acl:origin <https://app.example> ; acl:mode acl:Read ] .
//! ```
//!
//! The check is the alternative authorization path for requests arriving
//! from a foreign origin. Every failure (fetch error, missing entry,
//! timeout) is a "no".

use std::collections::BTreeSet;
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use url::Url;

use crate::acl::AccessMode;
use crate::collaborators::ProfileFetcher;
use crate::graph::{Graph, Term};
use crate::vocab::{ACL_MODE, ACL_ORIGIN, ACL_TRUSTED_APP};

/// Origins compare by scheme, host and port. Values that don't parse as URLs
///  fall back to text equality modulo a trailing separator.
pub fn same_origin(a: &str, b: &str) -> bool {
    match (Url::parse(a), Url::parse(b)) {
        (Ok(a), Ok(b)) => a.origin() == b.origin(),
        _ => a.trim_end_matches('/') == b.trim_end_matches('/'),
    }
}

/// Whether `owner`'s profile trusts `origin` for `mode`
pub fn profile_trusts(profile: &Graph, owner: &str, origin: &str, mode: AccessMode) -> bool {
    let owner = Term::iri(owner);
    let mode = Term::iri(mode.iri());

    let trusted = profile.objects(&owner, ACL_TRUSTED_APP).any(|app| {
        profile.contains(app, ACL_MODE, &mode)
            && profile
                .objects(app, ACL_ORIGIN)
                .filter_map(Term::value)
                .any(|declared| same_origin(declared, origin))
    });
    trusted
}

/// Ask every owner's profile, concurrently, whether `origin` may act with
///  `mode`. Answers true on the first owner that trusts it; false if none do
///  or if `timeout` elapses first.
#[tracing::instrument(skip(profiles, owners), fields(owners = owners.len()))]
pub async fn is_origin_trusted(
    profiles: &dyn ProfileFetcher,
    origin: &str,
    mode: AccessMode,
    owners: &BTreeSet<String>,
    timeout: Duration,
) -> bool {
    if owners.is_empty() {
        return false;
    }

    let mut lookups: FuturesUnordered<_> = owners
        .iter()
        .map(|owner| async move {
            match profiles.fetch(owner).await {
                Ok(profile) => profile_trusts(&profile, owner, origin, mode),
                Err(e) => {
                    tracing::warn!(owner = %owner, error = %e, "profile fetch failed");
                    false
                }
            }
        })
        .collect();

    let search = async {
        while let Some(trusted) = lookups.next().await {
            if trusted {
                return true;
            }
        }
        false
    };

    match tokio::time::timeout(timeout, search).await {
        Ok(trusted) => trusted,
        Err(_) => {
            tracing::warn!(origin, ?timeout, "trusted-app check timed out");
            false
        }
    }
}
