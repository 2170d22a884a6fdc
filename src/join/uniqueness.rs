// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Duplicate registration detection.
//!
//! The check lists clusters and compares identifiers before anything is
//! created, so two joins of the same cluster racing each other can both pass.
//! Callers that join concurrently must serialize joins per cluster themselves.

use crate::error::{JoinError, Result};
use crate::types::Cluster;
use kube::{api::ListParams, Api, Client, ResourceExt};
use tracing::{debug, instrument, warn};

/// Fail with `AlreadyRegistered` if a Cluster on the control plane carries this identifier
#[instrument(skip(client))]
pub async fn ensure_identifier_unique(client: &Client, id: &str) -> Result<()> {
    let clusters: Api<Cluster> = Api::all(client.clone());
    let cluster_list = clusters
        .list(&ListParams::default())
        .await
        .map_err(JoinError::ListFailed)?;

    debug!("Checking {} registered clusters", cluster_list.items.len());

    match cluster_list.items.iter().find(|c| c.has_identifier(id)) {
        Some(existing) => {
            let name = existing.name_any();
            warn!("Cluster {} is already registered with identifier {}", name, id);
            Err(JoinError::AlreadyRegistered { name })
        }
        None => Ok(()),
    }
}
