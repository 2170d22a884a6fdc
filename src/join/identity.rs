// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Member cluster identity

use crate::constants::SYSTEM_NAMESPACE;
use crate::error::{JoinError, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{Api, Client};
use tracing::{debug, instrument};

/// Return the UID of the member's kube-system namespace, which identifies the cluster
#[instrument(skip(client))]
pub async fn obtain_cluster_id(client: &Client) -> Result<String> {
    let namespaces: Api<Namespace> = Api::all(client.clone());
    let ns = namespaces
        .get(SYSTEM_NAMESPACE)
        .await
        .map_err(|e| JoinError::IdentityUnavailable {
            namespace: SYSTEM_NAMESPACE.to_string(),
            reason: e.to_string(),
            source: Some(e),
        })?;

    let id = ns
        .metadata
        .uid
        .filter(|uid| !uid.is_empty())
        .ok_or_else(|| JoinError::IdentityUnavailable {
            namespace: SYSTEM_NAMESPACE.to_string(),
            reason: "namespace has no UID".to_string(),
            source: None,
        })?;

    debug!("Cluster identifier is {}", id);
    Ok(id)
}
