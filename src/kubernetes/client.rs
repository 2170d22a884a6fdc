// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Client creation from kubeconfig files

use crate::error::{JoinError, Result};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Client;
use std::path::Path;
use tracing::{debug, instrument};

/// How the control plane reaches a member cluster's API server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberEndpoint {
    pub api_endpoint: String,
    pub insecure_skip_tls_verification: bool,
    pub proxy_url: Option<String>,
}

impl MemberEndpoint {
    /// Describe the endpoint a client config talks to
    pub fn from_kube_config(config: &kube::Config) -> Self {
        Self {
            api_endpoint: trim_url(&config.cluster_url.to_string()),
            insecure_skip_tls_verification: config.accept_invalid_certs,
            proxy_url: config.proxy_url.as_ref().map(|u| trim_url(&u.to_string())),
        }
    }

    /// Apply explicit overrides on top of what the kubeconfig declares
    pub fn with_overrides(mut self, api_endpoint: Option<&str>, proxy_url: Option<&str>) -> Self {
        if let Some(endpoint) = api_endpoint {
            self.api_endpoint = trim_url(endpoint);
        }
        if let Some(proxy) = proxy_url {
            self.proxy_url = Some(trim_url(proxy));
        }
        self
    }
}

fn trim_url(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Load a client config from a kubeconfig file, optionally selecting a context
#[instrument]
pub async fn load_kube_config(path: &Path, context: Option<&str>) -> Result<kube::Config> {
    let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
        JoinError::Kubeconfig(format!("Failed to read {}: {}", path.display(), e))
    })?;
    debug!("Read kubeconfig from {}", path.display());
    kube_config_from_str(&raw, context).await
}

/// Build a client config from kubeconfig contents
pub async fn kube_config_from_str(kubeconfig: &str, context: Option<&str>) -> Result<kube::Config> {
    let kubeconfig_parsed: Kubeconfig = serde_yaml::from_str(kubeconfig)
        .map_err(|e| JoinError::Kubeconfig(format!("Failed to parse kubeconfig: {}", e)))?;

    let options = KubeConfigOptions {
        context: context.map(str::to_string),
        ..Default::default()
    };

    kube::Config::from_custom_kubeconfig(kubeconfig_parsed, &options)
        .await
        .map_err(|e| JoinError::Kubeconfig(format!("Failed to create config: {}", e)))
}

/// Create a Kubernetes client from a client config
pub fn create_client(config: kube::Config) -> Result<Client> {
    Client::try_from(config)
        .map_err(|e| JoinError::Kubeconfig(format!("Failed to create client: {}", e)))
}
