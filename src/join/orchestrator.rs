// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Sequencing of a single cluster join.

use crate::error::JoinError;
use crate::join::context::RegistrationContext;
use crate::join::credentials::obtain_credentials;
use crate::join::identity::obtain_cluster_id;
use crate::join::registrar::register_cluster;
use crate::join::uniqueness::ensure_identifier_unique;
use kube::ResourceExt;
use std::fmt;
use thiserror::Error;
use tracing::{debug, error, info, instrument};

/// Progress of a join; failure can happen from any state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    Start,
    IdentityResolved,
    UniquenessVerified,
    CredentialsProvisioned,
    Registered,
}

/// The step that was running when a join failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinStage {
    ResolveIdentity,
    VerifyUniqueness,
    ProvisionCredentials,
    Register,
}

impl fmt::Display for JoinStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let stage = match self {
            JoinStage::ResolveIdentity => "resolving cluster identity",
            JoinStage::VerifyUniqueness => "verifying cluster uniqueness",
            JoinStage::ProvisionCredentials => "provisioning member credentials",
            JoinStage::Register => "registering on the control plane",
        };
        f.write_str(stage)
    }
}

#[derive(Error, Debug)]
#[error("Failed to join cluster {cluster} while {stage}: {source}")]
pub struct JoinFailure {
    pub cluster: String,
    pub stage: JoinStage,
    #[source]
    pub source: JoinError,
}

/// Runs the join stages in order over a registration context
pub struct JoinOrchestrator {
    ctx: RegistrationContext,
    state: JoinState,
}

impl JoinOrchestrator {
    pub fn new(ctx: RegistrationContext) -> Self {
        Self {
            ctx,
            state: JoinState::Start,
        }
    }

    pub fn state(&self) -> JoinState {
        self.state
    }

    pub fn context(&self) -> &RegistrationContext {
        &self.ctx
    }

    /// Join the member cluster, returning the name of the registered Cluster.
    /// Every call starts over from `JoinState::Start`.
    #[instrument(skip(self), fields(cluster = %self.ctx.options.cluster_name))]
    pub async fn join(&mut self) -> Result<String, JoinFailure> {
        self.state = JoinState::Start;
        self.ctx.cluster_id = None;
        self.ctx.credentials = Default::default();

        info!(
            "Joining cluster with endpoint {}",
            self.ctx.member.endpoint.api_endpoint
        );

        let id = obtain_cluster_id(&self.ctx.member.client)
            .await
            .map_err(|e| self.fail(JoinStage::ResolveIdentity, e))?;
        self.ctx.cluster_id = Some(id.clone());
        self.advance(JoinState::IdentityResolved);

        ensure_identifier_unique(&self.ctx.control_plane, &id)
            .await
            .map_err(|e| self.fail(JoinStage::VerifyUniqueness, e))?;
        self.advance(JoinState::UniquenessVerified);

        self.ctx.credentials = obtain_credentials(&self.ctx.member.client, &self.ctx.options)
            .await
            .map_err(|e| self.fail(JoinStage::ProvisionCredentials, e))?;
        self.advance(JoinState::CredentialsProvisioned);

        let cluster = register_cluster(&self.ctx)
            .await
            .map_err(|e| self.fail(JoinStage::Register, e))?;
        self.advance(JoinState::Registered);

        info!("Cluster {} joined", cluster.name_any());
        Ok(cluster.name_any())
    }

    fn advance(&mut self, next: JoinState) {
        debug!("Join state {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    fn fail(&self, stage: JoinStage, source: JoinError) -> JoinFailure {
        error!("Join failed while {} (state {:?}): {}", stage, self.state, source);
        JoinFailure {
            cluster: self.ctx.options.cluster_name.clone(),
            stage,
            source,
        }
    }
}

/// Run a single join over the given context
pub async fn join_cluster(ctx: RegistrationContext) -> Result<String, JoinFailure> {
    JoinOrchestrator::new(ctx).join().await
}
