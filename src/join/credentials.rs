// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Credential provisioning inside the member cluster.
//!
//! Creates the ServiceAccounts and RBAC the control plane uses to reach the
//! member, then waits for their token Secrets.

use crate::config::{JoinOptions, SecretWait};
use crate::constants::{
    secret_keys, SERVICE_ACCOUNT_NAME_ANNOTATION, SERVICE_ACCOUNT_TOKEN_TYPE,
};
use crate::error::{JoinError, Result};
use crate::join::context::MemberCredentials;
use crate::join::names::{
    impersonator_service_account_name, role_name, service_account_name, token_secret_name,
};
use crate::kubernetes::{ensure, ensure_namespace_exists};
use k8s_openapi::api::core::v1::{Secret, ServiceAccount};
use k8s_openapi::api::rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject};
use kube::{api::ObjectMeta, Api, Client};
use std::collections::BTreeMap;
use tokio::time::{sleep, Instant};
use tracing::{debug, info, instrument};

/// Provision ServiceAccounts and RBAC in the member cluster and collect their token Secrets
#[instrument(skip(client, options), fields(cluster = %options.cluster_name, dry_run = options.dry_run))]
pub async fn obtain_credentials(client: &Client, options: &JoinOptions) -> Result<MemberCredentials> {
    let namespace = options.cluster_namespace.as_str();
    let dry_run = options.dry_run;

    ensure_namespace_exists(client, namespace, dry_run).await?;

    let accounts: Api<ServiceAccount> = Api::namespaced(client.clone(), namespace);
    let sa_name = service_account_name(&options.cluster_name);
    ensure_service_account(&accounts, namespace, &sa_name, dry_run).await?;

    let impersonator_name = impersonator_service_account_name();
    ensure_service_account(&accounts, namespace, &impersonator_name, dry_run).await?;

    let cluster_role = role_name(&sa_name);
    let roles: Api<ClusterRole> = Api::all(client.clone());
    ensure(&roles, build_cluster_role(&cluster_role), dry_run, |source| {
        JoinError::RoleEnsureFailed {
            name: cluster_role.clone(),
            source,
        }
    })
    .await?;

    let binding = build_cluster_role_binding(&cluster_role, namespace, &sa_name);
    let bindings: Api<ClusterRoleBinding> = Api::all(client.clone());
    ensure(&bindings, binding, dry_run, |source| {
        JoinError::BindingEnsureFailed {
            name: cluster_role.clone(),
            source,
        }
    })
    .await?;

    if options.create_token_secrets {
        let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
        for account in [&sa_name, &impersonator_name] {
            let secret = build_token_secret(namespace, account);
            let name = token_secret_name(account);
            ensure(&secrets, secret, dry_run, |source| JoinError::SecretEnsureFailed {
                namespace: namespace.to_string(),
                name,
                source,
            })
            .await?;
        }
    }

    if dry_run {
        info!("Dry run, not waiting for service account secrets");
        return Ok(MemberCredentials::default());
    }

    let secret =
        wait_for_service_account_secret(client, namespace, &sa_name, options.secret_wait).await?;
    let impersonator_secret =
        wait_for_service_account_secret(client, namespace, &impersonator_name, options.secret_wait)
            .await?;

    Ok(MemberCredentials {
        secret: Some(secret),
        impersonator_secret: Some(impersonator_secret),
    })
}

async fn ensure_service_account(
    accounts: &Api<ServiceAccount>,
    namespace: &str,
    name: &str,
    dry_run: bool,
) -> Result<ServiceAccount> {
    let account = ServiceAccount {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        },
        ..Default::default()
    };
    ensure(accounts, account, dry_run, |source| {
        JoinError::ServiceAccountEnsureFailed {
            namespace: namespace.to_string(),
            name: name.to_string(),
            source,
        }
    })
    .await
}

/// Full access to all resources plus read access to non-resource URLs
fn build_cluster_role(name: &str) -> ClusterRole {
    let all = || Some(vec!["*".to_string()]);
    ClusterRole {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            ..Default::default()
        },
        rules: Some(vec![
            PolicyRule {
                verbs: vec!["*".to_string()],
                api_groups: all(),
                resources: all(),
                ..Default::default()
            },
            PolicyRule {
                verbs: vec!["get".to_string()],
                non_resource_urls: all(),
                ..Default::default()
            },
        ]),
        ..Default::default()
    }
}

fn build_cluster_role_binding(
    role_name: &str,
    namespace: &str,
    service_account: &str,
) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMeta {
            name: Some(role_name.to_string()),
            ..Default::default()
        },
        role_ref: RoleRef {
            api_group: "rbac.authorization.k8s.io".to_string(),
            kind: "ClusterRole".to_string(),
            name: role_name.to_string(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_string(),
            name: service_account.to_string(),
            namespace: Some(namespace.to_string()),
            ..Default::default()
        }]),
    }
}

/// Token Secret the token controller fills in for the named ServiceAccount
fn build_token_secret(namespace: &str, service_account: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(token_secret_name(service_account)),
            namespace: Some(namespace.to_string()),
            annotations: Some(BTreeMap::from([(
                SERVICE_ACCOUNT_NAME_ANNOTATION.to_string(),
                service_account.to_string(),
            )])),
            ..Default::default()
        },
        type_: Some(SERVICE_ACCOUNT_TOKEN_TYPE.to_string()),
        ..Default::default()
    }
}

/// Poll until the ServiceAccount has a populated token Secret, or the wait times out.
/// Missing objects count as "not yet"; any other API error aborts the wait.
#[instrument(skip(client, wait))]
pub async fn wait_for_service_account_secret(
    client: &Client,
    namespace: &str,
    service_account: &str,
    wait: SecretWait,
) -> Result<Secret> {
    let deadline = Instant::now() + wait.timeout;

    loop {
        if let Some(secret) = find_token_secret(client, namespace, service_account).await? {
            info!(
                "Found token secret {} for service account {}/{}",
                secret.metadata.name.as_deref().unwrap_or_default(),
                namespace,
                service_account
            );
            return Ok(secret);
        }

        let now = Instant::now();
        if now >= deadline {
            return Err(JoinError::SecretWaitTimeout {
                namespace: namespace.to_string(),
                service_account: service_account.to_string(),
                timeout: wait.timeout,
            });
        }

        debug!(
            "Token secret for {}/{} not ready, retrying in {:?}",
            namespace, service_account, wait.interval
        );
        sleep(wait.interval.min(deadline - now)).await;
    }
}

async fn find_token_secret(
    client: &Client,
    namespace: &str,
    service_account: &str,
) -> Result<Option<Secret>> {
    let accounts: Api<ServiceAccount> = Api::namespaced(client.clone(), namespace);
    let Some(account) = accounts.get_opt(service_account).await? else {
        return Ok(None);
    };

    let referenced: Vec<String> = account
        .secrets
        .unwrap_or_default()
        .into_iter()
        .filter_map(|r| r.name)
        .collect();
    let provisioned = token_secret_name(service_account);
    let fallback = (!referenced.contains(&provisioned)).then_some(provisioned);

    // Secrets the ServiceAccount references are linked to it already; the
    // fallback name must also be annotated with this ServiceAccount.
    let candidates = referenced
        .into_iter()
        .map(|name| (name, false))
        .chain(fallback.map(|name| (name, true)));

    let secrets: Api<Secret> = Api::namespaced(client.clone(), namespace);
    for (name, check_owner) in candidates {
        match secrets.get_opt(&name).await? {
            Some(secret)
                if is_populated_token_secret(&secret)
                    && (!check_owner || belongs_to(&secret, service_account)) =>
            {
                return Ok(Some(secret))
            }
            Some(_) => debug!(
                "Secret {}/{} is not a populated token secret of {}",
                namespace, name, service_account
            ),
            None => {}
        }
    }

    Ok(None)
}

fn belongs_to(secret: &Secret, service_account: &str) -> bool {
    secret
        .metadata
        .annotations
        .as_ref()
        .and_then(|a| a.get(SERVICE_ACCOUNT_NAME_ANNOTATION))
        .is_some_and(|owner| owner == service_account)
}

fn is_populated_token_secret(secret: &Secret) -> bool {
    secret.type_.as_deref() == Some(SERVICE_ACCOUNT_TOKEN_TYPE)
        && secret
            .data
            .as_ref()
            .and_then(|d| d.get(secret_keys::TOKEN))
            .is_some_and(|token| !token.0.is_empty())
}
