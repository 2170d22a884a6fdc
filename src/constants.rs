// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

/// Namespace whose UID identifies a member cluster
pub const SYSTEM_NAMESPACE: &str = "kube-system";

/// Namespace used for credentials when none is configured
pub const DEFAULT_CLUSTER_NAMESPACE: &str = "karmada-cluster";

/// Keys of the Secrets involved in a join
pub mod secret_keys {
    /// Bearer token, both in member token Secrets and control-plane Secrets
    pub const TOKEN: &str = "token";
    /// CA bundle key in the control-plane credential Secret
    pub const CA_BUNDLE: &str = "caBundle";
    /// CA certificate key in member service-account token Secrets
    pub const SERVICE_ACCOUNT_CA: &str = "ca.crt";
}

/// Secret type populated by the token controller
pub const SERVICE_ACCOUNT_TOKEN_TYPE: &str = "kubernetes.io/service-account-token";

/// Annotation binding a token Secret to its ServiceAccount
pub const SERVICE_ACCOUNT_NAME_ANNOTATION: &str = "kubernetes.io/service-account.name";

/// Token Secret polling configuration
pub mod secret_wait {
    pub const POLL_INTERVAL_SECS: u64 = 1;
    pub const POLL_TIMEOUT_SECS: u64 = 30;
}

/// Upper bound for a whole join run when driven by the binary
pub const DEFAULT_JOIN_TIMEOUT_SECS: u64 = 300;
