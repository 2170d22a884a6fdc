// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Registration of the member cluster on the control plane.

use crate::constants::secret_keys;
use crate::error::{is_api_status, JoinError, Result};
use crate::join::context::RegistrationContext;
use crate::join::names::impersonation_secret_name;
use crate::kubernetes::{ensure, ensure_namespace_exists};
use crate::types::{Cluster, ClusterSpec, LocalSecretReference, SyncMode};
use k8s_openapi::api::core::v1::Secret;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use k8s_openapi::ByteString;
use kube::{
    api::{ObjectMeta, Patch, PatchParams, PostParams},
    Api, Client, Resource, ResourceExt,
};
use serde_json::json;
use std::collections::BTreeMap;
use tracing::{info, instrument, warn};

/// Store the member credentials on the control plane, create the Cluster and
/// make it the owner of the credential Secrets.
///
/// In dry-run mode nothing is written and the planned Cluster is returned.
#[instrument(skip(ctx), fields(cluster = %ctx.options.cluster_name, dry_run = ctx.options.dry_run))]
pub async fn register_cluster(ctx: &RegistrationContext) -> Result<Cluster> {
    let options = &ctx.options;
    let namespace = options.cluster_namespace.as_str();
    let dry_run = options.dry_run;

    let cluster_id = ctx
        .cluster_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| JoinError::ClusterIdUnresolved {
            name: options.cluster_name.clone(),
        })?;

    ensure_namespace_exists(&ctx.control_plane, namespace, dry_run).await?;

    let secrets: Api<Secret> = Api::namespaced(ctx.control_plane.clone(), namespace);

    let secret = build_credential_secret(
        namespace,
        &options.cluster_name,
        ctx.credentials.secret.as_ref(),
        &[
            (secret_keys::SERVICE_ACCOUNT_CA, secret_keys::CA_BUNDLE),
            (secret_keys::TOKEN, secret_keys::TOKEN),
        ],
    );
    let secret = ensure_secret(&secrets, secret, dry_run).await?;

    let impersonator_secret = build_credential_secret(
        namespace,
        &impersonation_secret_name(&options.cluster_name),
        ctx.credentials.impersonator_secret.as_ref(),
        &[(secret_keys::TOKEN, secret_keys::TOKEN)],
    );
    let impersonator_secret = ensure_secret(&secrets, impersonator_secret, dry_run).await?;

    let cluster = build_cluster(ctx, cluster_id, &secret, &impersonator_secret);
    if dry_run {
        info!("Dry run, not creating cluster {}", cluster.name_any());
        return Ok(cluster);
    }

    let cluster = create_cluster(&ctx.control_plane, &cluster).await?;
    let owner = cluster
        .controller_owner_ref(&())
        .map(|owner| OwnerReference {
            block_owner_deletion: Some(true),
            ..owner
        })
        .ok_or_else(|| JoinError::ClusterUidMissing {
            name: cluster.name_any(),
        })?;

    set_owner(&secrets, &impersonator_secret, &owner).await?;
    set_owner(&secrets, &secret, &owner).await?;

    info!("Cluster {} registered", cluster.name_any());
    Ok(cluster)
}

/// Copy the listed keys of a member token Secret into a new control-plane Secret
fn build_credential_secret(
    namespace: &str,
    name: &str,
    source: Option<&Secret>,
    keys: &[(&str, &str)],
) -> Secret {
    let source_data = source.and_then(|s| s.data.as_ref());
    let data: BTreeMap<String, ByteString> = keys
        .iter()
        .filter_map(|(from, to)| {
            source_data
                .and_then(|d| d.get(*from))
                .map(|value| (to.to_string(), value.clone()))
        })
        .collect();

    Secret {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        data: Some(data),
        ..Default::default()
    }
}

async fn ensure_secret(secrets: &Api<Secret>, secret: Secret, dry_run: bool) -> Result<Secret> {
    let namespace = secret.namespace().unwrap_or_default();
    let name = secret.name_any();
    ensure(secrets, secret, dry_run, |source| JoinError::SecretEnsureFailed {
        namespace,
        name,
        source,
    })
    .await
}

fn build_cluster(
    ctx: &RegistrationContext,
    cluster_id: &str,
    secret: &Secret,
    impersonator_secret: &Secret,
) -> Cluster {
    let options = &ctx.options;
    let endpoint = &ctx.member.endpoint;
    let secret_ref = |s: &Secret| LocalSecretReference {
        namespace: s
            .namespace()
            .unwrap_or_else(|| options.cluster_namespace.clone()),
        name: s.name_any(),
    };
    let non_empty = |v: &Option<String>| v.clone().filter(|s| !s.is_empty());

    Cluster::new(
        &options.cluster_name,
        ClusterSpec {
            id: cluster_id.to_string(),
            sync_mode: SyncMode::Push,
            api_endpoint: Some(endpoint.api_endpoint.clone()),
            secret_ref: Some(secret_ref(secret)),
            impersonator_secret_ref: Some(secret_ref(impersonator_secret)),
            insecure_skip_tls_verification: endpoint.insecure_skip_tls_verification,
            proxy_url: non_empty(&endpoint.proxy_url),
            provider: non_empty(&options.provider),
            region: non_empty(&options.region),
            zone: non_empty(&options.zone),
        },
    )
}

#[instrument(skip(client, cluster), fields(cluster = %cluster.name_any()))]
async fn create_cluster(client: &Client, cluster: &Cluster) -> Result<Cluster> {
    let clusters: Api<Cluster> = Api::all(client.clone());
    match clusters.create(&PostParams::default(), cluster).await {
        Ok(created) => {
            info!("Created cluster {}", created.name_any());
            Ok(created)
        }
        Err(e) if is_api_status(&e, 409) => Err(JoinError::ClusterAlreadyExists {
            name: cluster.name_any(),
        }),
        Err(e) => Err(e.into()),
    }
}

/// Make the Cluster the controller owner of a Secret so it is garbage collected with it
#[instrument(skip(secrets, secret, owner), fields(secret = %secret.name_any()))]
async fn set_owner(secrets: &Api<Secret>, secret: &Secret, owner: &OwnerReference) -> Result<()> {
    let name = secret.name_any();
    let patch = json!({
        "metadata": {
            "ownerReferences": [owner]
        }
    });

    if let Err(source) = secrets
        .patch(&name, &PatchParams::default(), &Patch::Merge(&patch))
        .await
    {
        warn!(
            "Cluster {} was created but secret {} could not be linked to it",
            owner.name, name
        );
        return Err(JoinError::OwnerPatchFailed {
            namespace: secret.namespace().unwrap_or_default(),
            name,
            source,
        });
    }

    Ok(())
}
