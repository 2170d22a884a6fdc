// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use crate::constants::{secret_wait, DEFAULT_CLUSTER_NAMESPACE, DEFAULT_JOIN_TIMEOUT_SECS};
use anyhow::{bail, Context, Result};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Bounded polling policy for token Secret materialization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SecretWait {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for SecretWait {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(secret_wait::POLL_INTERVAL_SECS),
            timeout: Duration::from_secs(secret_wait::POLL_TIMEOUT_SECS),
        }
    }
}

/// Options of a single join, independent of how the clients were built
#[derive(Debug, Clone)]
pub struct JoinOptions {
    pub cluster_name: String,
    /// Namespace holding credentials, in the member cluster and on the control plane
    pub cluster_namespace: String,
    pub provider: Option<String>,
    pub region: Option<String>,
    pub zone: Option<String>,
    pub dry_run: bool,
    /// Create token Secrets for the ServiceAccounts instead of waiting for the token controller
    pub create_token_secrets: bool,
    pub secret_wait: SecretWait,
}

impl JoinOptions {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
            cluster_namespace: DEFAULT_CLUSTER_NAMESPACE.to_string(),
            provider: None,
            region: None,
            zone: None,
            dry_run: false,
            create_token_secrets: false,
            secret_wait: SecretWait::default(),
        }
    }
}

/// Configuration of the join binary loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub member_kubeconfig: PathBuf,
    pub member_context: Option<String>,
    pub control_plane_kubeconfig: PathBuf,
    pub control_plane_context: Option<String>,
    /// Overrides the API server URL found in the member kubeconfig
    pub api_endpoint: Option<String>,
    /// Overrides the proxy URL found in the member kubeconfig
    pub proxy_server_address: Option<String>,
    pub join_timeout: Duration,
    pub join: JoinOptions,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| {
            var(key).with_context(|| format!("{} environment variable not set", key))
        };
        let flag = |key: &str| -> Result<bool> {
            var(key)
                .map(|v| v.parse::<bool>())
                .transpose()
                .with_context(|| format!("{} must be true or false", key))
                .map(|v| v.unwrap_or(false))
        };
        let secs = |key: &str, default: u64| -> Result<Duration> {
            var(key)
                .map(|v| v.parse::<u64>())
                .transpose()
                .with_context(|| format!("{} must be a number of seconds", key))
                .map(|v| Duration::from_secs(v.unwrap_or(default)))
        };

        let secret_wait = SecretWait {
            interval: secs("SECRET_WAIT_INTERVAL_SECS", secret_wait::POLL_INTERVAL_SECS)?,
            timeout: secs("SECRET_WAIT_TIMEOUT_SECS", secret_wait::POLL_TIMEOUT_SECS)?,
        };
        if secret_wait.interval.is_zero() || secret_wait.interval > secret_wait.timeout {
            bail!("SECRET_WAIT_INTERVAL_SECS must be positive and not exceed SECRET_WAIT_TIMEOUT_SECS");
        }

        let join = JoinOptions {
            cluster_namespace: var("CLUSTER_NAMESPACE")
                .unwrap_or_else(|| DEFAULT_CLUSTER_NAMESPACE.to_string()),
            provider: var("CLUSTER_PROVIDER"),
            region: var("CLUSTER_REGION"),
            zone: var("CLUSTER_ZONE"),
            dry_run: flag("DRY_RUN")?,
            create_token_secrets: flag("CREATE_TOKEN_SECRETS")?,
            secret_wait,
            ..JoinOptions::new(required("CLUSTER_NAME")?)
        };

        Ok(Config {
            member_kubeconfig: required("MEMBER_KUBECONFIG")?.into(),
            member_context: var("MEMBER_CONTEXT"),
            control_plane_kubeconfig: required("KARMADA_KUBECONFIG")?.into(),
            control_plane_context: var("KARMADA_CONTEXT"),
            api_endpoint: var("CLUSTER_API_ENDPOINT")
                .map(|v| validate_url("CLUSTER_API_ENDPOINT", v))
                .transpose()?,
            proxy_server_address: var("PROXY_SERVER_ADDRESS")
                .map(|v| validate_url("PROXY_SERVER_ADDRESS", v))
                .transpose()?,
            join_timeout: secs("JOIN_TIMEOUT_SECS", DEFAULT_JOIN_TIMEOUT_SECS)?,
            join,
        })
    }
}

fn validate_url(key: &str, value: String) -> Result<String> {
    url::Url::parse(&value).with_context(|| format!("{} is not a valid URL: {}", key, value))?;
    Ok(value)
}
