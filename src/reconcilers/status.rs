// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Status subresource persistence for QuorumDB resources.
//!
//! Reconcilers mutate their resource's [`ConditionList`](crate::conditions::ConditionList)
//! in memory and only call [`patch_status`] when an update reported a material
//! change; an unchanged status is never written, so steady-state loop ticks do
//! not generate watch events downstream.

use anyhow::{Context, Result};
use kube::api::{Patch, PatchParams};
use kube::Api;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use super::retry::retry_api_call;

/// Persist a resource's status subresource with a merge patch.
///
/// Transient API errors are retried with the standard backoff.
///
/// # Errors
///
/// Returns an error when the patch ultimately fails.
pub async fn patch_status<K>(
    api: &Api<K>,
    kind: &str,
    name: &str,
    status: &(impl Serialize + Sync),
) -> Result<()>
where
    K: Clone + DeserializeOwned + std::fmt::Debug,
{
    let patch = json!({ "status": status });
    let operation = format!("patch {kind} {name} status");

    retry_api_call(
        || async {
            api.patch_status(name, &PatchParams::default(), &Patch::Merge(&patch))
                .await
                .map(|_| ())
        },
        &operation,
    )
    .await
    .with_context(|| format!("failed to update {kind} {name} status"))?;

    debug!(kind, name, "status updated");
    Ok(())
}
