// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum JoinError {
    #[error("Kubernetes API error: {0}")]
    TransportError(#[from] kube::Error),

    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(String),

    #[error("Cluster identity unavailable from namespace {namespace}: {reason}")]
    IdentityUnavailable {
        namespace: String,
        reason: String,
        #[source]
        source: Option<kube::Error>,
    },

    #[error("The same cluster has been registered with name {name}")]
    AlreadyRegistered { name: String },

    #[error("Failed to list registered clusters: {0}")]
    ListFailed(#[source] kube::Error),

    #[error("Failed to ensure namespace {namespace}: {source}")]
    NamespaceEnsureFailed {
        namespace: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to ensure service account {namespace}/{name}: {source}")]
    ServiceAccountEnsureFailed {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to ensure ClusterRole {name}: {source}")]
    RoleEnsureFailed {
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to ensure ClusterRoleBinding {name}: {source}")]
    BindingEnsureFailed {
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Failed to ensure secret {namespace}/{name}: {source}")]
    SecretEnsureFailed {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },

    #[error("Timed out after {timeout:?} waiting for token secret of service account {namespace}/{service_account}")]
    SecretWaitTimeout {
        namespace: String,
        service_account: String,
        timeout: Duration,
    },

    #[error("Cluster {name} cannot be registered before its identity is resolved")]
    ClusterIdUnresolved { name: String },

    #[error("Cluster {name} already exists")]
    ClusterAlreadyExists { name: String },

    #[error("Cluster {name} was created without a UID")]
    ClusterUidMissing { name: String },

    #[error("Failed to patch owner reference on secret {namespace}/{name}: {source}")]
    OwnerPatchFailed {
        namespace: String,
        name: String,
        #[source]
        source: kube::Error,
    },
}

pub type Result<T> = std::result::Result<T, JoinError>;

/// Returns true when the error is an API response with the given status code
pub fn is_api_status(err: &kube::Error, code: u16) -> bool {
    matches!(err, kube::Error::Api(resp) if resp.code == code)
}
