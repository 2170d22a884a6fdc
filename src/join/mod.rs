// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Joining a member cluster to the Karmada control plane.

pub mod context;
pub mod credentials;
pub mod identity;
pub mod names;
pub mod orchestrator;
pub mod registrar;
pub mod uniqueness;

pub use context::{MemberCluster, MemberCredentials, RegistrationContext};
pub use orchestrator::{join_cluster, JoinFailure, JoinOrchestrator, JoinStage, JoinState};
