// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Deterministic names of the objects a join creates.

/// Name of the ServiceAccount created for a cluster
pub fn service_account_name(cluster_name: &str) -> String {
    format!("karmada-{}", cluster_name)
}

/// Name of the shared impersonation ServiceAccount
pub fn impersonator_service_account_name() -> String {
    service_account_name("impersonator")
}

/// Name of the ClusterRole (and its binding) granted to a ServiceAccount
pub fn role_name(service_account_name: &str) -> String {
    format!("karmada-controller-manager:{}", service_account_name)
}

/// Name of the control-plane Secret holding the impersonation token
pub fn impersonation_secret_name(cluster_name: &str) -> String {
    format!("{}-impersonator", cluster_name)
}

/// Name of the explicitly provisioned token Secret of a ServiceAccount
pub fn token_secret_name(service_account_name: &str) -> String {
    format!("{}-token", service_account_name)
}
