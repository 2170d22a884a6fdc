// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! State threaded through the stages of one join.

use crate::config::JoinOptions;
use crate::kubernetes::MemberEndpoint;
use k8s_openapi::api::core::v1::Secret;
use kube::Client;

/// Handle on the cluster being joined
#[derive(Clone)]
pub struct MemberCluster {
    pub client: Client,
    pub endpoint: MemberEndpoint,
}

/// Token Secrets read from the member cluster; empty after a dry run
#[derive(Debug, Clone, Default)]
pub struct MemberCredentials {
    pub secret: Option<Secret>,
    pub impersonator_secret: Option<Secret>,
}

/// Everything a single join needs, owned by the orchestrator for its duration
pub struct RegistrationContext {
    pub options: JoinOptions,
    pub member: MemberCluster,
    pub control_plane: Client,
    /// Set once the identity has been resolved
    pub cluster_id: Option<String>,
    pub credentials: MemberCredentials,
}

impl RegistrationContext {
    pub fn new(options: JoinOptions, member: MemberCluster, control_plane: Client) -> Self {
        Self {
            options,
            member,
            control_plane,
            cluster_id: None,
            credentials: MemberCredentials::default(),
        }
    }
}
