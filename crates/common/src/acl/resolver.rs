//! Mode resolution: authorization statements -> per-mode grantees.
//!
//! One pass classifies every triple by subject, then each mode is aggregated
//! independently over the subjects that are typed as authorizations,
//! reference the target under the selected predicate and name the mode.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;

use futures::future::join_all;
use url::Url;

use crate::collaborators::GroupResolver;
use crate::graph::{Graph, Term};
use crate::vocab::{
    ACL_ACCESS_TO, ACL_AGENT, ACL_AGENT_CLASS, ACL_AGENT_GROUP, ACL_AUTHENTICATED_AGENT,
    ACL_AUTHORIZATION, ACL_DEFAULT, ACL_MODE, FOAF_AGENT, RDF_TYPE,
};

use super::grants::{AccessModeGrants, GranteeCollector};
use super::mode::AccessMode;

/// What one subject node says about itself
#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct Statement {
    is_authorization: bool,
    applies_to_target: bool,
    modes: BTreeSet<AccessMode>,
    agents: BTreeSet<String>,
    groups: BTreeSet<String>,
    everyone: bool,
    authenticated: bool,
}

impl Statement {
    fn grants(&self, mode: AccessMode) -> bool {
        self.is_authorization && self.applies_to_target && self.modes.contains(&mode)
    }

    fn grants_any(&self) -> bool {
        self.is_authorization && self.applies_to_target && !self.modes.is_empty()
    }
}

/// Equality that ignores a single trailing separator
fn same_resource(a: &str, b: &str) -> bool {
    let a = a.strip_suffix('/').unwrap_or(a);
    let b = b.strip_suffix('/').unwrap_or(b);
    a == b
}

/// The resource predicate consulted for a document's relationship to the target
pub fn resource_predicate(resource_is_target: bool) -> &'static str {
    if resource_is_target {
        ACL_ACCESS_TO
    } else {
        ACL_DEFAULT
    }
}

/// Classified view of an authorization graph relative to one target
#[derive(Debug, Clone, Default)]
pub struct Classification {
    statements: BTreeMap<Term, Statement>,
}

impl Classification {
    pub fn classify(graph: &Graph, target: &Url, context: &Url, resource_is_target: bool) -> Self {
        let selected = resource_predicate(resource_is_target);
        let mut statements: BTreeMap<Term, Statement> = BTreeMap::new();

        for triple in graph.iter() {
            if !triple.subject.is_node() {
                continue;
            }
            let predicate = triple.predicate.as_str();
            let object = &triple.object;

            match predicate {
                RDF_TYPE => {
                    if object.as_iri() == Some(ACL_AUTHORIZATION) {
                        entry(&mut statements, &triple.subject).is_authorization = true;
                    }
                }
                ACL_MODE => {
                    if let Some(mode) = object.as_iri().and_then(AccessMode::from_iri) {
                        entry(&mut statements, &triple.subject).modes.insert(mode);
                    }
                }
                ACL_AGENT => {
                    if let Some(agent) = object.as_iri() {
                        entry(&mut statements, &triple.subject)
                            .agents
                            .insert(agent.to_string());
                    }
                }
                ACL_AGENT_GROUP => {
                    if let Some(group) = object.as_iri() {
                        entry(&mut statements, &triple.subject)
                            .groups
                            .insert(group.to_string());
                    }
                }
                ACL_AGENT_CLASS => match object.as_iri() {
                    Some(FOAF_AGENT) => entry(&mut statements, &triple.subject).everyone = true,
                    Some(ACL_AUTHENTICATED_AGENT) => {
                        entry(&mut statements, &triple.subject).authenticated = true
                    }
                    // other classes are not identities
                    _ => {}
                },
                p if p == selected => {
                    let Some(reference) = object.as_iri() else {
                        continue;
                    };
                    match context.join(reference) {
                        Ok(resolved) => {
                            if same_resource(resolved.as_str(), target.as_str()) {
                                entry(&mut statements, &triple.subject).applies_to_target = true;
                            }
                        }
                        Err(e) => {
                            tracing::debug!(reference, error = %e, "unresolvable resource reference");
                        }
                    }
                }
                _ => {}
            }
        }

        Self { statements }
    }

    /// Groups referenced by statements that grant something to the target
    pub fn groups(&self) -> BTreeSet<String> {
        self.statements
            .values()
            .filter(|s| s.grants_any())
            .flat_map(|s| s.groups.iter().cloned())
            .collect()
    }

    /// Aggregate grantees per mode, expanding groups through `members`.
    ///  Groups missing from `members` contribute nobody.
    pub fn grants(&self, members: &BTreeMap<String, BTreeSet<String>>) -> AccessModeGrants {
        AccessModeGrants::from_fn(|mode| {
            let mut collector = GranteeCollector::default();
            for statement in self.statements.values().filter(|s| s.grants(mode)) {
                if statement.everyone {
                    collector.everyone();
                }
                if statement.authenticated {
                    collector.authenticated();
                }
                for agent in &statement.agents {
                    collector.agent(agent);
                }
                for group in &statement.groups {
                    if let Some(identities) = members.get(group) {
                        collector.agents(identities);
                    }
                }
            }
            collector.finish()
        })
    }
}

fn entry<'a>(statements: &'a mut BTreeMap<Term, Statement>, subject: &Term) -> &'a mut Statement {
    statements.entry(subject.clone()).or_default()
}

/// Expand each group once, concurrently. A lookup that fails or outlives
///  `timeout` yields no members.
pub async fn expand_groups(
    groups: BTreeSet<String>,
    resolver: &dyn GroupResolver,
    timeout: Duration,
) -> BTreeMap<String, BTreeSet<String>> {
    let lookups = groups.into_iter().map(|group| async move {
        let members = match tokio::time::timeout(timeout, resolver.members(&group)).await {
            Ok(Ok(members)) => members,
            Ok(Err(e)) => {
                tracing::warn!(group = %group, error = %e, "group lookup failed, treating as empty");
                BTreeSet::new()
            }
            Err(_) => {
                tracing::warn!(group = %group, "group lookup timed out, treating as empty");
                BTreeSet::new()
            }
        };
        (group, members)
    });
    join_all(lookups).await.into_iter().collect()
}

/// Resolve an authorization graph into per-mode grantees for `target`
#[tracing::instrument(skip(graph, groups), fields(statements = graph.len()))]
pub async fn resolve_modes(
    graph: &Graph,
    target: &Url,
    context: &Url,
    resource_is_target: bool,
    groups: &dyn GroupResolver,
    group_timeout: Duration,
) -> AccessModeGrants {
    let classification = Classification::classify(graph, target, context, resource_is_target);
    let members = expand_groups(classification.groups(), groups, group_timeout).await;
    classification.grants(&members)
}
