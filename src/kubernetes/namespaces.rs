// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Namespace management utilities

use crate::error::{is_api_status, JoinError, Result};
use k8s_openapi::api::core::v1::Namespace;
use kube::{
    api::{ObjectMeta, PostParams},
    Api, Client,
};
use tracing::{debug, info, instrument};

/// Ensure a namespace exists in the cluster, create if it doesn't.
/// In dry-run mode the namespace is only built, never looked up or created.
#[instrument(skip(client))]
pub async fn ensure_namespace_exists(
    client: &Client,
    namespace: &str,
    dry_run: bool,
) -> Result<Namespace> {
    let ns = Namespace {
        metadata: ObjectMeta {
            name: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    if dry_run {
        return Ok(ns);
    }

    let namespaces: Api<Namespace> = Api::all(client.clone());
    let failed = |source| JoinError::NamespaceEnsureFailed {
        namespace: namespace.to_string(),
        source,
    };

    match namespaces.get(namespace).await {
        Ok(existing) => {
            debug!("Namespace {} already exists", namespace);
            Ok(existing)
        }
        Err(e) if is_api_status(&e, 404) => {
            info!("Creating namespace {}", namespace);
            match namespaces.create(&PostParams::default(), &ns).await {
                Ok(created) => {
                    info!("Namespace {} created successfully", namespace);
                    Ok(created)
                }
                // Created concurrently between the lookup and our create
                Err(e) if is_api_status(&e, 409) => Ok(ns),
                Err(e) => Err(failed(e)),
            }
        }
        Err(e) => Err(failed(e)),
    }
}
