// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Leader election for domain supervisors.
//!
//! Each reconciliation domain runs behind its own leader-election session so
//! that exactly one operator replica reconciles a given domain at a time. The
//! mechanism is abstracted behind [`LeaderElection`]; the production backend
//! acquires Kubernetes `Lease` objects through `kube-lease-manager`, and tests
//! drive [`Leadership`] handles from plain watch channels.
//!
//! Losing leadership is not an error. It is a normal state transition the
//! supervisor reacts to by cancelling the active reconciliation and campaigning
//! again.

use anyhow::anyhow;
use async_trait::async_trait;
use kube::Client;
use kube_lease_manager::LeaseManagerBuilder;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::constants::{DEFAULT_LEASE_DURATION_SECS, DEFAULT_LEASE_GRACE_SECS};

/// A live leadership session for one lease.
///
/// The handle observes leadership state changes; dropping it resigns the
/// session and releases the lease.
pub struct Leadership {
    state: watch::Receiver<bool>,
    _task: Option<JoinHandle<()>>,
}

impl Leadership {
    /// Build a handle from an externally driven leadership channel.
    ///
    /// Used by alternative backends and tests; the production backend wires the
    /// channel to the lease renewal task.
    #[must_use]
    pub fn from_channel(state: watch::Receiver<bool>) -> Self {
        Self { state, _task: None }
    }

    fn with_task(state: watch::Receiver<bool>, task: JoinHandle<()>) -> Self {
        Self {
            state,
            _task: Some(task),
        }
    }

    /// Current leadership state.
    pub fn is_leader(&mut self) -> bool {
        *self.state.borrow_and_update()
    }

    /// Wait for the next leadership change and return the new state.
    ///
    /// # Errors
    ///
    /// Fails when the backing session has ended (channel closed); callers
    /// should treat that the same as losing leadership.
    pub async fn changed(&mut self) -> anyhow::Result<bool> {
        self.state
            .changed()
            .await
            .map_err(|_| anyhow!("leadership session ended"))?;
        Ok(*self.state.borrow_and_update())
    }
}

/// Capability interface for acquiring domain leadership.
///
/// `campaign` blocks only long enough to join the election; the returned
/// [`Leadership`] handle reports acquisition and loss asynchronously.
#[async_trait]
pub trait LeaderElection: Send + Sync {
    /// Join the election for the named lease.
    async fn campaign(&self, lease_name: &str) -> anyhow::Result<Leadership>;
}

/// Lease-based leader election backed by the Kubernetes `coordination.k8s.io` API.
pub struct LeaseLockElection {
    client: Client,
    namespace: String,
    identity: String,
}

impl LeaseLockElection {
    /// Create an election provider holding leases in `namespace` under the
    /// given identity (conventionally the pod name).
    #[must_use]
    pub fn new(client: Client, namespace: impl Into<String>, identity: impl Into<String>) -> Self {
        Self {
            client,
            namespace: namespace.into(),
            identity: identity.into(),
        }
    }
}

#[async_trait]
impl LeaderElection for LeaseLockElection {
    async fn campaign(&self, lease_name: &str) -> anyhow::Result<Leadership> {
        let manager = LeaseManagerBuilder::new(self.client.clone(), lease_name)
            .with_namespace(self.namespace.clone())
            .with_identity(self.identity.clone())
            .with_duration(DEFAULT_LEASE_DURATION_SECS)
            .with_grace(DEFAULT_LEASE_GRACE_SECS)
            .build()
            .await?;

        let (state, renewal) = manager.watch().await;

        let lease = lease_name.to_string();
        let task = tokio::spawn(async move {
            match renewal.await {
                Ok(Ok(_)) => debug!(lease = %lease, "lease session released"),
                Ok(Err(err)) => warn!(lease = %lease, error = %err, "lease session failed"),
                Err(err) => warn!(lease = %lease, error = %err, "lease session task panicked"),
            }
        });

        Ok(Leadership::with_task(state, task))
    }
}

#[cfg(test)]
#[path = "leader_tests.rs"]
mod leader_tests;
