use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::acl::{
    effective_requirement, evaluate, locate_acl_document, resolve_modes, AccessError, AccessGrant,
    AccessMode, AccessModeGrants, AclDocument, AclError, Decision,
};
use crate::collaborators::{DocumentParser, GroupResolver, NoGroups, NoProfiles, ProfileFetcher};
use crate::graph::Graph;
use crate::path::ResourcePath;
use crate::store::ResourceStore;
use crate::trust;

pub const DEFAULT_GROUP_TIMEOUT: Duration = Duration::from_secs(3);
pub const DEFAULT_TRUSTED_APP_TIMEOUT: Duration = Duration::from_secs(3);

/// Per-deployment engine settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    /// public URL of the store root
    pub base_url: Url,
    /// bound on each group-membership lookup
    pub group_timeout: Duration,
    /// bound on the whole trusted-origin check
    pub trusted_app_timeout: Duration,
}

impl EngineSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            group_timeout: DEFAULT_GROUP_TIMEOUT,
            trusted_app_timeout: DEFAULT_TRUSTED_APP_TIMEOUT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EngineBuildError {
    #[error("no document parser configured")]
    MissingParser,
    #[error("no engine settings configured")]
    MissingSettings,
}

pub struct AccessEngineBuilder<S: ResourceStore> {
    store: S,
    parser: Option<Arc<dyn DocumentParser>>,
    /// defaults to a resolver that knows no groups
    groups: Option<Arc<dyn GroupResolver>>,
    /// defaults to a fetcher that trusts no origin
    profiles: Option<Arc<dyn ProfileFetcher>>,
    settings: Option<EngineSettings>,
}

impl<S: ResourceStore> AccessEngineBuilder<S> {
    pub fn new(store: S) -> Self {
        AccessEngineBuilder {
            store,
            parser: None,
            groups: None,
            profiles: None,
            settings: None,
        }
    }

    pub fn parser(mut self, parser: impl DocumentParser + 'static) -> Self {
        self.parser = Some(Arc::new(parser));
        self
    }

    pub fn shared_parser(mut self, parser: Arc<dyn DocumentParser>) -> Self {
        self.parser = Some(parser);
        self
    }

    pub fn groups(mut self, groups: impl GroupResolver + 'static) -> Self {
        self.groups = Some(Arc::new(groups));
        self
    }

    pub fn profiles(mut self, profiles: impl ProfileFetcher + 'static) -> Self {
        self.profiles = Some(Arc::new(profiles));
        self
    }

    pub fn settings(mut self, settings: EngineSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    pub fn build(self) -> Result<AccessEngine<S>, EngineBuildError> {
        let parser = self.parser.ok_or(EngineBuildError::MissingParser)?;
        let settings = self.settings.ok_or(EngineBuildError::MissingSettings)?;

        Ok(AccessEngine {
            store: self.store,
            parser,
            groups: self.groups.unwrap_or_else(|| Arc::new(NoGroups)),
            profiles: self.profiles.unwrap_or_else(|| Arc::new(NoProfiles)),
            settings,
        })
    }
}

/// The access-control decision engine.
///
/// Holds no state across calls: every decision re-reads the store. Clones
///  share the store and collaborators.
#[derive(Debug, Clone)]
pub struct AccessEngine<S: ResourceStore> {
    store: S,
    parser: Arc<dyn DocumentParser>,
    groups: Arc<dyn GroupResolver>,
    profiles: Arc<dyn ProfileFetcher>,
    settings: EngineSettings,
}

impl<S: ResourceStore> AccessEngine<S> {
    pub fn builder(store: S) -> AccessEngineBuilder<S> {
        AccessEngineBuilder::new(store)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub async fn locate_acl_document(&self, target: &ResourcePath) -> Result<AclDocument, AclError> {
        locate_acl_document(
            &self.store,
            self.parser.as_ref(),
            &self.settings.base_url,
            target,
        )
        .await
    }

    pub async fn resolve_modes(
        &self,
        graph: &Graph,
        target: &Url,
        context: &Url,
        resource_is_target: bool,
    ) -> AccessModeGrants {
        resolve_modes(
            graph,
            target,
            context,
            resource_is_target,
            self.groups.as_ref(),
            self.settings.group_timeout,
        )
        .await
    }

    /// Locate and resolve in one step
    pub async fn grants(&self, target: &ResourcePath) -> Result<AccessModeGrants, AclError> {
        let document = self.locate_acl_document(target).await?;
        Ok(self
            .resolve_modes(
                &document.graph,
                &document.target,
                &document.context,
                document.resource_is_target,
            )
            .await)
    }

    /// Decide whether `identity` may perform an operation needing `required`
    ///  on `target`.
    ///
    /// Fails with [`AccessError::Denied`] rather than returning a negative
    ///  grant. The origin only annotates the decision; origin policy is the
    ///  caller's, with [`Self::is_origin_trusted`] as the alternative path.
    pub async fn check_access(
        &self,
        target: &ResourcePath,
        identity: Option<&str>,
        origin: Option<&str>,
        required: &[AccessMode],
    ) -> Result<AccessGrant, AccessError> {
        self.decide(target, identity, origin, required)
            .await
            .map(|decision| decision.grant)
    }

    /// [`Self::check_access`], keeping the grants the decision was made from
    #[tracing::instrument(skip(self, target, required), fields(target = %target))]
    pub async fn decide(
        &self,
        target: &ResourcePath,
        identity: Option<&str>,
        origin: Option<&str>,
        required: &[AccessMode],
    ) -> Result<Decision, AccessError> {
        let (resource, required) = effective_requirement(target, required);
        let grants = self.grants(&resource).await?;

        match evaluate(&grants, identity, &required, &resource) {
            Ok(grant) => {
                tracing::info!(
                    resource = %resource,
                    ?required,
                    append_only = grant.append_only,
                    "access granted"
                );
                Ok(Decision {
                    grant,
                    resource,
                    required,
                    grants,
                })
            }
            Err(e) => {
                tracing::info!(resource = %resource, ?required, "access denied");
                Err(e)
            }
        }
    }

    /// Identities individually holding Control on `target`. For an
    ///  authorization document these are the owners of the resource it
    ///  governs.
    pub async fn owners(&self, target: &ResourcePath) -> Result<BTreeSet<String>, AclError> {
        let (resource, _) = effective_requirement(target, &[]);
        Ok(self.grants(&resource).await?.owners())
    }

    pub async fn is_origin_trusted(
        &self,
        origin: &str,
        mode: AccessMode,
        owners: &BTreeSet<String>,
    ) -> bool {
        trust::is_origin_trusted(
            self.profiles.as_ref(),
            origin,
            mode,
            owners,
            self.settings.trusted_app_timeout,
        )
        .await
    }
}
