use std::collections::BTreeSet;

use super::mode::AccessMode;

/// Who a single mode is granted to, after broadest-wins precedence.
///
/// A class grant swallows every narrower grantee for the same mode, so the
///  three shapes are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Grantees {
    /// Any agent, including anonymous requesters
    Everyone,
    /// Any requester with a verified identity
    Authenticated,
    /// Exactly these identities (groups already expanded). Empty means nobody.
    Agents(BTreeSet<String>),
}

impl Default for Grantees {
    fn default() -> Self {
        Self::nobody()
    }
}

impl Grantees {
    pub fn nobody() -> Self {
        Grantees::Agents(BTreeSet::new())
    }

    /// Whether a requester with this (optional) identity is covered
    pub fn permits(&self, identity: Option<&str>) -> bool {
        match self {
            Grantees::Everyone => true,
            Grantees::Authenticated => identity.is_some(),
            Grantees::Agents(agents) => identity.is_some_and(|id| agents.contains(id)),
        }
    }

    pub fn is_nobody(&self) -> bool {
        matches!(self, Grantees::Agents(agents) if agents.is_empty())
    }

    /// The individually listed identities; class grants list none
    pub fn agents(&self) -> Option<&BTreeSet<String>> {
        match self {
            Grantees::Agents(agents) => Some(agents),
            _ => None,
        }
    }
}

/// Accumulates grantees for one mode and applies the precedence on finish
#[derive(Debug, Default)]
pub(crate) struct GranteeCollector {
    everyone: bool,
    authenticated: bool,
    agents: BTreeSet<String>,
}

impl GranteeCollector {
    pub(crate) fn everyone(&mut self) {
        self.everyone = true;
    }

    pub(crate) fn authenticated(&mut self) {
        self.authenticated = true;
    }

    pub(crate) fn agent(&mut self, identity: &str) {
        self.agents.insert(identity.to_string());
    }

    pub(crate) fn agents<'a, I>(&mut self, identities: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        self.agents.extend(identities.into_iter().cloned());
    }

    pub(crate) fn finish(self) -> Grantees {
        if self.everyone {
            Grantees::Everyone
        } else if self.authenticated {
            Grantees::Authenticated
        } else {
            Grantees::Agents(self.agents)
        }
    }
}

/// Per-mode grantees for one resource. Built fresh per check, never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessModeGrants {
    pub read: Grantees,
    pub write: Grantees,
    pub append: Grantees,
    pub control: Grantees,
}

impl AccessModeGrants {
    /// Grants nothing to anybody
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_fn<F>(mut f: F) -> Self
    where
        F: FnMut(AccessMode) -> Grantees,
    {
        Self {
            read: f(AccessMode::Read),
            write: f(AccessMode::Write),
            append: f(AccessMode::Append),
            control: f(AccessMode::Control),
        }
    }

    pub fn get(&self, mode: AccessMode) -> &Grantees {
        match mode {
            AccessMode::Read => &self.read,
            AccessMode::Write => &self.write,
            AccessMode::Append => &self.append,
            AccessMode::Control => &self.control,
        }
    }

    /// Whether `identity` satisfies `mode` directly, with no downgrade
    pub fn permits(&self, mode: AccessMode, identity: Option<&str>) -> bool {
        self.get(mode).permits(identity)
    }

    /// Identities individually holding Control. Class grants name nobody in
    ///  particular, so they contribute no owners.
    pub fn owners(&self) -> BTreeSet<String> {
        self.control.agents().cloned().unwrap_or_default()
    }
}
