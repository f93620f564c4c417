use std::sync::Arc;

use common::acl::{AccessError, AccessGrant, AccessMode, Decision};
use common::collaborators::IdentityVerifier;
use common::engine::AccessEngine;
use common::path::ResourcePath;
use common::store::ResourceStore;

use crate::config::Config;

/// One inbound operation, as the protocol layer sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    pub path: ResourcePath,
    /// bearer credential, if any
    pub token: Option<String>,
    /// the requesting application's origin, if the client sent one
    pub origin: Option<String>,
    pub modes: Vec<AccessMode>,
}

impl AccessRequest {
    pub fn new(path: ResourcePath, modes: &[AccessMode]) -> Self {
        Self {
            path,
            token: None,
            origin: None,
            modes: modes.to_vec(),
        }
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }
}

/// Authorizes requests end to end: credential, resource grants, then
///  origin policy.
#[derive(Debug, Clone)]
pub struct Gatekeeper<S: ResourceStore> {
    engine: AccessEngine<S>,
    verifier: Arc<dyn IdentityVerifier>,
    config: Config,
}

impl<S: ResourceStore> Gatekeeper<S> {
    pub fn new(
        engine: AccessEngine<S>,
        verifier: impl IdentityVerifier + 'static,
        config: Config,
    ) -> Self {
        Self {
            engine,
            verifier: Arc::new(verifier),
            config,
        }
    }

    pub fn engine(&self) -> &AccessEngine<S> {
        &self.engine
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The verified identity behind `token`; anonymous without one
    pub async fn identify(&self, token: Option<&str>) -> Option<String> {
        let token = token?;
        let identity = self.verifier.verify(token, &self.config.base_origin()).await;
        if identity.is_none() {
            tracing::debug!("credential rejected, continuing anonymously");
        }
        identity
    }

    #[tracing::instrument(skip(self, request), fields(path = %request.path, origin = ?request.origin))]
    pub async fn authorize(&self, request: &AccessRequest) -> Result<AccessGrant, AccessError> {
        let identity = self.identify(request.token.as_deref()).await;

        let decision = self
            .engine
            .decide(
                &request.path,
                identity.as_deref(),
                request.origin.as_deref(),
                &request.modes,
            )
            .await?;

        let origin = match request.origin.as_deref() {
            Some(origin) if self.config.strict_origin && !self.config.is_trusted_origin(origin) => {
                origin
            }
            _ => return Ok(decision.grant),
        };

        // owners come from the same document the grant was made against
        let owners = decision.owners();
        let Decision {
            grant,
            resource,
            required,
            ..
        } = decision;

        for mode in required {
            // an append-only grant only needs the app trusted to append
            let mode = if mode == AccessMode::Write && grant.append_only {
                AccessMode::Append
            } else {
                mode
            };
            if !self.engine.is_origin_trusted(origin, mode, &owners).await {
                tracing::warn!(origin, %mode, resource = %resource, "origin not trusted by any owner");
                return Err(AccessError::UntrustedOrigin {
                    origin: origin.to_string(),
                    mode,
                    resource,
                });
            }
        }

        Ok(grant)
    }
}
