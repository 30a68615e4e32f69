// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Kubernetes reconciliation controllers for QuorumDB resources.
//!
//! Each domain runs one controller behind its supervisor's leader-election
//! session. The controllers here carry the coordinator-facing skeleton:
//! keeping the per-domain worker registry in sync with live resources,
//! managing finalizers, and reporting observed state through the generic
//! condition list with no-op-aware status writes. Placement, rolling upgrades
//! and scaling decisions happen in the per-resource workers and are out of
//! scope here.
//!
//! # Available Reconcilers
//!
//! - [`reconcile_cluster`] - Tracks `QuorumCluster` deployments and aligns the
//!   cluster-wide maintenance flag
//! - [`reconcile_replication`] - Tracks `QuorumReplication` links
//! - [`reconcile_local_storage`] - Tracks `QuorumLocalStorage` provisioners
//! - [`AdminEntrypoint`] - Periodic database-admin maintenance observer

pub mod admin;
pub mod cluster;
pub mod finalizers;
pub mod replication;
pub mod retry;
pub mod status;
pub mod storage;

pub use admin::AdminEntrypoint;
pub use cluster::{reconcile_cluster, ClusterContext, ClusterEntrypoint, ClusterWorker};
pub use replication::{
    reconcile_replication, ReplicationContext, ReplicationEntrypoint, ReplicationWorker,
};
pub use storage::{reconcile_local_storage, StorageContext, StorageEntrypoint, StorageWorker};

use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::{Event, EventType, Recorder};
use tracing::warn;

use crate::status_reasons::{EVENT_ACTION_OBSERVE_MAINTENANCE, EVENT_REASON_MAINTENANCE_CHANGED};

/// Error wrapper handed to the kube runtime controllers.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ReconcileError(#[from] anyhow::Error);

/// Publishes operator events against a fixed object reference.
#[derive(Clone)]
pub struct EventPublisher {
    recorder: Recorder,
    reference: ObjectReference,
}

impl EventPublisher {
    /// Publisher recording events against the given reference (conventionally
    /// the operator pod).
    #[must_use]
    pub fn new(recorder: Recorder, reference: ObjectReference) -> Self {
        Self {
            recorder,
            reference,
        }
    }

    /// Record a maintenance mode transition.
    ///
    /// Event delivery is best effort; failures are logged and swallowed so a
    /// slow API server cannot stall the reconcile loop.
    pub async fn maintenance_changed(&self, enabled: bool) {
        let note = if enabled {
            "cluster-wide maintenance mode is now enabled"
        } else {
            "cluster-wide maintenance mode is now disabled"
        };
        let event = Event {
            type_: EventType::Normal,
            reason: EVENT_REASON_MAINTENANCE_CHANGED.to_string(),
            note: Some(note.to_string()),
            action: EVENT_ACTION_OBSERVE_MAINTENANCE.to_string(),
            secondary: None,
        };
        if let Err(err) = self.recorder.publish(&event, &self.reference).await {
            warn!(error = %err, "failed to publish maintenance event");
        }
    }
}
