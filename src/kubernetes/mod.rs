// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Kubernetes utilities for client creation, idempotent creation and namespace management.

pub mod client;
pub mod ensure;
pub mod namespaces;

pub use client::{create_client, load_kube_config, MemberEndpoint};
pub use ensure::{create_or_get, ensure};
pub use namespaces::ensure_namespace_exists;
