// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use tracing::info;

use karmada_join::config::Config;
use karmada_join::join::{JoinOrchestrator, MemberCluster, RegistrationContext};
use karmada_join::kubernetes::{create_client, load_kube_config, MemberEndpoint};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(
        "Configuration loaded: cluster={} namespace={} dry_run={}",
        config.join.cluster_name, config.join.cluster_namespace, config.join.dry_run
    );

    let member_config = load_kube_config(
        &config.member_kubeconfig,
        config.member_context.as_deref(),
    )
    .await
    .context("Failed to load member cluster kubeconfig")?;
    let endpoint = MemberEndpoint::from_kube_config(&member_config).with_overrides(
        config.api_endpoint.as_deref(),
        config.proxy_server_address.as_deref(),
    );
    let member = MemberCluster {
        client: create_client(member_config)?,
        endpoint,
    };

    let control_plane_config = load_kube_config(
        &config.control_plane_kubeconfig,
        config.control_plane_context.as_deref(),
    )
    .await
    .context("Failed to load control plane kubeconfig")?;
    let control_plane = create_client(control_plane_config)?;
    info!("Connected to member cluster and control plane");

    let mut orchestrator = JoinOrchestrator::new(RegistrationContext::new(
        config.join.clone(),
        member,
        control_plane,
    ));

    let name = tokio::time::timeout(config.join_timeout, orchestrator.join())
        .await
        .with_context(|| format!("Join did not finish within {:?}", config.join_timeout))??;

    println!("cluster({}) is joined successfully", name);
    Ok(())
}
