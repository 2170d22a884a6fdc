// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Idempotent object creation

use crate::error::{is_api_status, JoinError, Result as JoinResult};
use kube::{api::PostParams, Api, Resource, ResourceExt};
use serde::{de::DeserializeOwned, Serialize};
use std::fmt::Debug;
use tracing::{debug, info};

/// Create an object, or fetch the existing one when the name is already taken.
///
/// Every "ensure" step of a join goes through here so that re-running a
/// partially completed join converges on the same objects.
pub async fn create_or_get<K>(api: &Api<K>, obj: &K) -> Result<K, kube::Error>
where
    K: Resource + Clone + Serialize + DeserializeOwned + Debug,
    K::DynamicType: Default,
{
    let name = obj.name_any();
    let kind = K::kind(&Default::default()).to_string();
    match api.create(&PostParams::default(), obj).await {
        Ok(created) => {
            info!("Created {} {}", kind, name);
            Ok(created)
        }
        Err(e) if is_api_status(&e, 409) => {
            debug!("{} {} already exists, reusing it", kind, name);
            api.get(&name).await
        }
        Err(e) => Err(e),
    }
}

/// Ensure an object exists, mapping failures to a join error.
/// In dry-run mode the intended object is returned without any API call.
pub async fn ensure<K, F>(api: &Api<K>, obj: K, dry_run: bool, failed: F) -> JoinResult<K>
where
    K: Resource + Clone + Serialize + DeserializeOwned + Debug,
    K::DynamicType: Default,
    F: FnOnce(kube::Error) -> JoinError,
{
    if dry_run {
        debug!("Dry run, not creating {}", obj.name_any());
        return Ok(obj);
    }
    create_or_get(api, &obj).await.map_err(failed)
}
