// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Custom resources served by the Karmada control plane.

pub mod cluster;

pub use cluster::{Cluster, ClusterSpec, LocalSecretReference, SyncMode};
