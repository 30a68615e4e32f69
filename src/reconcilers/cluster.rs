// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciler for `QuorumCluster` resources.
//!
//! Tracks every live cluster in the coordinator's registry, validates the
//! deployment spec, and aligns the cluster-wide supervision maintenance flag
//! with the desired state when the spec requests one. While maintenance is
//! enabled, supervisory actions are suspended and the resource carries the
//! `ReconciliationPaused` condition.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use futures::StreamExt;
use kube::runtime::controller::Action;
use kube::runtime::{watcher, Controller};
use kube::{Api, Client, ResourceExt};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{error, info};

use crate::constants::{
    ERROR_REQUEUE_DURATION_SECS, FINALIZER_QUORUM_CLUSTER, KIND_QUORUM_CLUSTER,
    READY_REQUEUE_DURATION_SECS,
};
use crate::coordination::CoordinationStore;
use crate::crd::{DeploymentMode, QuorumCluster, QuorumClusterSpec, QuorumClusterStatus};
use crate::maintenance::{get_maintenance_mode, ClusterAdminClient};
use crate::metrics;
use crate::registry::{registry_key, Registry};
use crate::status_reasons::{
    CONDITION_TYPE_CONFIGURED, CONDITION_TYPE_PAUSED, REASON_CONFIGURATION_INVALID,
    REASON_CONFIGURED, REASON_MAINTENANCE_DISABLED, REASON_MAINTENANCE_ENABLED,
};
use crate::supervisor::{wait_for_stop, ReconcileEntrypoint};

use super::{finalizers, status, EventPublisher, ReconcileError};

/// In-memory worker state for one managed cluster.
#[derive(Debug)]
pub struct ClusterWorker {
    pub name: String,
    pub namespace: String,
}

impl ClusterWorker {
    #[must_use]
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

/// Shared context for the `QuorumCluster` controller.
pub struct ClusterContext {
    pub client: Client,
    pub store: Arc<dyn CoordinationStore>,
    pub admin: Arc<ClusterAdminClient>,
    pub registry: Arc<Registry<ClusterWorker>>,
    pub events: Option<EventPublisher>,
}

/// Validate a cluster spec, returning the effective server count.
fn validate_cluster(spec: &QuorumClusterSpec) -> Result<i32, String> {
    let servers = spec.servers.unwrap_or(match spec.mode {
        DeploymentMode::Single => 1,
        DeploymentMode::Cluster => 3,
    });

    match spec.mode {
        _ if servers < 1 => Err(format!("servers must be at least 1, got {servers}")),
        DeploymentMode::Single if servers != 1 => {
            Err(format!("single mode runs exactly one server, got {servers}"))
        }
        DeploymentMode::Cluster if servers < 3 || servers % 2 == 0 => Err(format!(
            "cluster mode needs an odd server count of at least 3, got {servers}"
        )),
        _ => Ok(servers),
    }
}

/// Fold the observed state into the status, returning whether anything changed.
pub fn observe_cluster(
    status: &mut QuorumClusterStatus,
    cluster: &QuorumCluster,
    maintenance: bool,
) -> bool {
    let mut changed = match validate_cluster(&cluster.spec) {
        Ok(servers) => status.conditions.update(
            CONDITION_TYPE_CONFIGURED,
            true,
            REASON_CONFIGURED,
            &format!("cluster spec accepted, {servers} servers"),
        ),
        Err(problem) => status.conditions.update(
            CONDITION_TYPE_CONFIGURED,
            false,
            REASON_CONFIGURATION_INVALID,
            &problem,
        ),
    };

    let (reason, message) = if maintenance {
        (
            REASON_MAINTENANCE_ENABLED,
            "supervision maintenance flag is set",
        )
    } else {
        (
            REASON_MAINTENANCE_DISABLED,
            "supervision maintenance flag is not set",
        )
    };
    changed |= status
        .conditions
        .update(CONDITION_TYPE_PAUSED, maintenance, reason, message);

    if status.observed_generation != cluster.metadata.generation {
        status.observed_generation = cluster.metadata.generation;
        changed = true;
    }

    changed
}

/// Reconcile one `QuorumCluster`.
pub async fn reconcile_cluster(
    cluster: Arc<QuorumCluster>,
    ctx: Arc<ClusterContext>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    match reconcile_cluster_inner(&cluster, &ctx).await {
        Ok(action) => {
            metrics::record_reconciliation_success(KIND_QUORUM_CLUSTER, started.elapsed());
            Ok(action)
        }
        Err(err) => {
            metrics::record_reconciliation_error(KIND_QUORUM_CLUSTER, "reconcile");
            error!(
                cluster = %cluster.name_any(),
                error = %format!("{err:#}"),
                "failed to reconcile QuorumCluster"
            );
            Err(err.into())
        }
    }
}

async fn reconcile_cluster_inner(
    cluster: &QuorumCluster,
    ctx: &ClusterContext,
) -> Result<Action> {
    let namespace = cluster.namespace().unwrap_or_default();
    let name = cluster.name_any();
    let key = registry_key(&namespace, &name);
    let api: Api<QuorumCluster> = Api::namespaced(ctx.client.clone(), &namespace);

    if cluster.metadata.deletion_timestamp.is_some() {
        if ctx.registry.remove(&key) {
            info!(cluster = %key, "cluster worker released");
        }
        finalizers::remove_finalizer(&ctx.client, cluster, FINALIZER_QUORUM_CLUSTER).await?;
        return Ok(Action::await_change());
    }

    finalizers::ensure_finalizer(&ctx.client, cluster, FINALIZER_QUORUM_CLUSTER).await?;

    if ctx.registry.insert(&key, Arc::new(ClusterWorker::new(&name, &namespace))) {
        info!(cluster = %key, "cluster worker registered");
    }

    let mut maintenance = get_maintenance_mode(ctx.store.as_ref())
        .await
        .context("failed to read maintenance mode")?;

    // Align the cluster-wide flag with the spec when it expresses a preference.
    if let Some(desired) = cluster.spec.maintenance {
        if desired != maintenance {
            ctx.admin
                .set_maintenance_mode(desired)
                .await
                .context("failed to toggle maintenance mode")?;
            info!(cluster = %key, enabled = desired, "maintenance mode changed");
            if let Some(events) = &ctx.events {
                events.maintenance_changed(desired).await;
            }
            maintenance = desired;
        }
    }
    metrics::record_maintenance_mode(maintenance);

    let mut status = cluster.status.clone().unwrap_or_default();
    if observe_cluster(&mut status, cluster, maintenance) {
        status::patch_status(&api, KIND_QUORUM_CLUSTER, &name, &status).await?;
    }

    if status.conditions.is_true(CONDITION_TYPE_CONFIGURED) && !maintenance {
        Ok(Action::requeue(Duration::from_secs(
            READY_REQUEUE_DURATION_SECS,
        )))
    } else {
        Ok(Action::requeue(Duration::from_secs(
            ERROR_REQUEUE_DURATION_SECS,
        )))
    }
}

/// Error policy for the `QuorumCluster` controller.
fn error_policy(
    _resource: Arc<QuorumCluster>,
    _err: &ReconcileError,
    _ctx: Arc<ClusterContext>,
) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Entry point running the `QuorumCluster` controller until cancelled.
pub struct ClusterEntrypoint {
    pub ctx: Arc<ClusterContext>,
}

#[async_trait]
impl ReconcileEntrypoint for ClusterEntrypoint {
    async fn run(&self, stop: watch::Receiver<bool>) {
        info!("starting QuorumCluster controller");

        let api = Api::<QuorumCluster>::all(self.ctx.client.clone());
        let controller = Controller::new(api, watcher::Config::default())
            .run(reconcile_cluster, error_policy, self.ctx.clone())
            .for_each(|_| futures::future::ready(()));

        tokio::select! {
            () = controller => error!("QuorumCluster controller stream ended unexpectedly"),
            () = wait_for_stop(stop) => info!("QuorumCluster controller stopped"),
        }
    }
}

#[cfg(test)]
#[path = "cluster_tests.rs"]
mod cluster_tests;
