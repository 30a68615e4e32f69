// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Reconciler for `QuorumLocalStorage` resources.
//!
//! Registers a storage worker per resource and reports the `Ready` condition
//! once the storage class registration and local paths are accepted. Volume
//! provisioning itself happens in the storage worker.

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
    ERROR_REQUEUE_DURATION_SECS, FINALIZER_QUORUM_LOCAL_STORAGE, KIND_QUORUM_LOCAL_STORAGE,
    READY_REQUEUE_DURATION_SECS,
};
use crate::crd::{QuorumLocalStorage, QuorumLocalStorageStatus};
use crate::metrics;
use crate::registry::{registry_key, Registry};
use crate::status_reasons::{
    CONDITION_TYPE_READY, REASON_CONFIGURATION_INVALID, REASON_READY,
};
use crate::supervisor::{wait_for_stop, ReconcileEntrypoint};

use super::{finalizers, status, ReconcileError};

/// In-memory worker state for one local storage provisioner.
#[derive(Debug)]
pub struct StorageWorker {
    pub name: String,
    pub namespace: String,
    pub storage_class: String,
}

impl StorageWorker {
    #[must_use]
    pub fn new(name: &str, namespace: &str, storage_class: &str) -> Self {
        Self {
            name: name.to_string(),
            namespace: namespace.to_string(),
            storage_class: storage_class.to_string(),
        }
    }
}

/// Shared context for the `QuorumLocalStorage` controller.
pub struct StorageContext {
    pub client: Client,
    pub registry: Arc<Registry<StorageWorker>>,
}

/// Fold the observed state into the status, returning whether anything changed.
pub fn observe_local_storage(
    status: &mut QuorumLocalStorageStatus,
    storage: &QuorumLocalStorage,
) -> bool {
    let spec = &storage.spec;
    let problem = if spec.storage_class.name.is_empty() {
        Some("storage class name must not be empty".to_string())
    } else if spec.local_path.is_empty() {
        Some("at least one local path is required".to_string())
    } else if let Some(blank) = spec.local_path.iter().find(|p| !p.starts_with('/')) {
        Some(format!("local path {blank:?} is not absolute"))
    } else {
        None
    };

    let mut changed = match problem {
        None => status.conditions.update(
            CONDITION_TYPE_READY,
            true,
            REASON_READY,
            &format!(
                "storage class {} serving {} local paths",
                spec.storage_class.name,
                spec.local_path.len()
            ),
        ),
        Some(problem) => status.conditions.update(
            CONDITION_TYPE_READY,
            false,
            REASON_CONFIGURATION_INVALID,
            &problem,
        ),
    };

    if status.observed_generation != storage.metadata.generation {
        status.observed_generation = storage.metadata.generation;
        changed = true;
    }

    changed
}

/// Reconcile one `QuorumLocalStorage`.
pub async fn reconcile_local_storage(
    storage: Arc<QuorumLocalStorage>,
    ctx: Arc<StorageContext>,
) -> Result<Action, ReconcileError> {
    let started = Instant::now();
    match reconcile_local_storage_inner(&storage, &ctx).await {
        Ok(action) => {
            metrics::record_reconciliation_success(KIND_QUORUM_LOCAL_STORAGE, started.elapsed());
            Ok(action)
        }
        Err(err) => {
            metrics::record_reconciliation_error(KIND_QUORUM_LOCAL_STORAGE, "reconcile");
            error!(
                storage = %storage.name_any(),
                error = %format!("{err:#}"),
                "failed to reconcile QuorumLocalStorage"
            );
            Err(err.into())
        }
    }
}

async fn reconcile_local_storage_inner(
    storage: &QuorumLocalStorage,
    ctx: &StorageContext,
) -> Result<Action> {
    let namespace = storage.namespace().unwrap_or_default();
    let name = storage.name_any();
    let key = registry_key(&namespace, &name);
    let api: Api<QuorumLocalStorage> = Api::namespaced(ctx.client.clone(), &namespace);

    if storage.metadata.deletion_timestamp.is_some() {
        if ctx.registry.remove(&key) {
            info!(storage = %key, "storage worker released");
        }
        finalizers::remove_finalizer(&ctx.client, storage, FINALIZER_QUORUM_LOCAL_STORAGE).await?;
        return Ok(Action::await_change());
    }

    finalizers::ensure_finalizer(&ctx.client, storage, FINALIZER_QUORUM_LOCAL_STORAGE).await?;

    if ctx.registry.insert(
        &key,
        Arc::new(StorageWorker::new(
            &name,
            &namespace,
            &storage.spec.storage_class.name,
        )),
    ) {
        info!(storage = %key, "storage worker registered");
    }

    let mut status = storage.status.clone().unwrap_or_default();
    if observe_local_storage(&mut status, storage) {
        status::patch_status(&api, KIND_QUORUM_LOCAL_STORAGE, &name, &status).await?;
    }

    if status.conditions.is_true(CONDITION_TYPE_READY) {
        Ok(Action::requeue(Duration::from_secs(
            READY_REQUEUE_DURATION_SECS,
        )))
    } else {
        Ok(Action::requeue(Duration::from_secs(
            ERROR_REQUEUE_DURATION_SECS,
        )))
    }
}

/// Error policy for the `QuorumLocalStorage` controller.
fn error_policy(
    _resource: Arc<QuorumLocalStorage>,
    _err: &ReconcileError,
    _ctx: Arc<StorageContext>,
) -> Action {
    Action::requeue(Duration::from_secs(ERROR_REQUEUE_DURATION_SECS))
}

/// Entry point running the `QuorumLocalStorage` controller until cancelled.
pub struct StorageEntrypoint {
    pub ctx: Arc<StorageContext>,
}

#[async_trait]
impl ReconcileEntrypoint for StorageEntrypoint {
    async fn run(&self, stop: watch::Receiver<bool>) {
        info!("starting QuorumLocalStorage controller");

        let api = Api::<QuorumLocalStorage>::all(self.ctx.client.clone());
        let controller = Controller::new(api, watcher::Config::default())
            .run(reconcile_local_storage, error_policy, self.ctx.clone())
            .for_each(|_| futures::future::ready(()));

        tokio::select! {
            () = controller => error!("QuorumLocalStorage controller stream ended unexpectedly"),
            () = wait_for_stop(stop) => info!("QuorumLocalStorage controller stopped"),
        }
    }
}

#[cfg(test)]
#[path = "storage_tests.rs"]
mod storage_tests;
