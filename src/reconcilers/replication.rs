// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciler for `QuorumReplication` resources.
//!
//! A replication link is configured once both of its endpoints are
//! addressable, either by naming a managed `QuorumCluster` or by carrying an
//! explicit endpoint URL. The link then reports the `Configured` condition;
//! data-plane synchronization is driven by the replication worker itself.

use anyhow::Result;
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
    ERROR_REQUEUE_DURATION_SECS, FINALIZER_QUORUM_REPLICATION, KIND_QUORUM_REPLICATION,
    READY_REQUEUE_DURATION_SECS,
};
use crate::crd::{QuorumReplication, QuorumReplicationStatus};
use crate::metrics;
use crate::registry::{registry_key, Registry};
use crate::status_reasons::{
    CONDITION_TYPE_CONFIGURED, REASON_CONFIGURATION_INVALID, REASON_CONFIGURED,
};
use crate::supervisor::{wait_for_stop, ReconcileEntrypoint};

use super::{finalizers, status, ReconcileError};

/// In-memory worker state for one replication link.
#[derive(Debug)]
pub struct ReplicationWorker {
    pub name: String,
    pub namespace: String,
}

impl ReplicationWorker {
    #[must_use]
    pub fn new(name: &str, namespace: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
        }
    }
}

/// Shared context for the `QuorumReplication` controller.
pub struct ReplicationContext {
    pub client: Client,
    pub registry: Arc<Registry<ReplicationWorker>>,
}

/// Fold the observed state into the status, returning whether anything changed.
pub fn observe_replication(
    status: &mut QuorumReplicationStatus,
    replication: &QuorumReplication,
) -> bool {
    let spec = &replication.spec;
    let mut changed = if spec.source.is_addressable() && spec.destination.is_addressable() {
        status.conditions.update(
            CONDITION_TYPE_CONFIGURED,
            true,
            REASON_CONFIGURED,
            "replication link endpoints accepted",
        )
    } else {
        let side = if spec.source.is_addressable() {
            "destination"
        } else {
            "source"
        };
        status.conditions.update(
            CONDITION_TYPE_CONFIGURED,
            false,
            REASON_CONFIGURATION_INVALID,
            &format!("{side} endpoint names neither a cluster nor an endpoint URL"),
        )
    };

    if status.observed_generation != replication.metadata.generation {
        status.observed_generation = replication.metadata.generation;
        changed = true;
    }

    changed
}

/// Reconcile one `QuorumReplication`.
pub async fn reconcile_replication(
    replication: Arc<QuorumReplication>,
    ctx: Arc<ReplicationContext>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    match reconcile_replication_inner(&replication, &ctx).await {
        Ok(action) => {
            metrics::record_reconciliation_success(KIND_QUORUM_REPLICATION, started.elapsed());
            Ok(action)
        }
        Err(err) => {
            metrics::record_reconciliation_error(KIND_QUORUM_REPLICATION, "reconcile");
            error!(
                replication = %replication.name_any(),
                error = %format!("{err:#}"),
                "failed to reconcile QuorumReplication"
            );
            Err(err.into())
        }
    }
}

async fn reconcile_replication_inner(
    replication: &QuorumReplication,
    ctx: &ReplicationContext,
) -> Result<Action> {
    let namespace = replication.namespace().unwrap_or_default();
    let name = replication.name_any();
    let key = registry_key(&namespace, &name);
    let api: Api<QuorumReplication> = Api::namespaced(ctx.client.clone(), &namespace);

    if replication.metadata.deletion_timestamp.is_some() {
        if ctx.registry.remove(&key) {
            info!(replication = %key, "replication worker released");
        }
        finalizers::remove_finalizer(&ctx.client, replication, FINALIZER_QUORUM_REPLICATION)
            .await?;
        return Ok(Action::await_change());
    }

    finalizers::ensure_finalizer(&ctx.client, replication, FINALIZER_QUORUM_REPLICATION).await?;

    if ctx
        .registry
        .insert(&key, Arc::new(ReplicationWorker::new(&name, &namespace)))
    {
        info!(replication = %key, "replication worker registered");
    }

    let mut status = replication.status.clone().unwrap_or_default();
    if observe_replication(&mut status, replication) {
        status::patch_status(&api, KIND_QUORUM_REPLICATION, &name, &status).await?;
    }

    if status.conditions.is_true(CONDITION_TYPE_CONFIGURED) {
        Ok(Action::requeue(Duration::from_secs(
            READY_REQUEUE_DURATION_SECS,
        )))
    } else {
        Ok(Action::requeue(Duration::from_secs(
            ERROR_REQUEUE_DURATION_SECS,
        )))
    }
}

/// Error policy for the `QuorumReplication` controller.
fn error_policy(
    _resource: Arc<QuorumReplication>,
    _err: &ReconcileError,
    _ctx: Arc<ReplicationContext>,
) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Entry point running the `QuorumReplication` controller until cancelled.
pub struct ReplicationEntrypoint {
    pub ctx: Arc<ReplicationContext>,
}

#[async_trait]
impl ReconcileEntrypoint for ReplicationEntrypoint {
    async fn run(&self, stop: watch::Receiver<bool>) {
        info!("starting QuorumReplication controller");

        let api = Api::<QuorumReplication>::all(self.ctx.client.clone());
        let controller = Controller::new(api, watcher::Config::default())
            .run(reconcile_replication, error_policy, self.ctx.clone())
            .for_each(|_| futures::future::ready(()));

        tokio::select! {
            () = controller => error!("QuorumReplication controller stream ended unexpectedly"),
            () = wait_for_stop(stop) => info!("QuorumReplication controller stopped"),
        }
    }
}

#[cfg(test)]
#[path = "replication_tests.rs"]
mod replication_tests;
