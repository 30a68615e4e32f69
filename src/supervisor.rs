// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Per-domain supervision: leader election wrapped around a reconcile loop.
//!
//! One [`DomainSupervisor`] exists per enabled domain per operator process.
//! Across the redundant operator deployment the lease backend guarantees that
//! at most one process reconciles a given domain at a time; within a process
//! the supervisor guarantees that reconcile sessions for its domain never
//! overlap.
//!
//! The lifecycle per session:
//!
//! 1. campaign on the domain lease; idle (and report not-ready) while another
//!    replica leads
//! 2. on acquiring leadership, wait for the domain's prerequisites behind the
//!    readiness gate, retrying indefinitely
//! 3. run the reconcile entry point until the process stop signal fires or
//!    leadership is lost
//! 4. on leadership loss, cancel the entry point and campaign again
//!
//! Leadership loss and elector unavailability are absorbed here; neither is
//! surfaced past the supervisor.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::constants::{
    CAMPAIGN_RETRY_WAIT_SECS, CRD_QUORUM_CLUSTERS, CRD_QUORUM_LOCAL_STORAGES,
    CRD_QUORUM_REPLICATIONS, ENTRYPOINT_DRAIN_SECS, LEASE_CLUSTER_OPERATOR, LEASE_DATABASE_ADMIN,
    LEASE_REPLICATION_OPERATOR, LEASE_STORAGE_OPERATOR,
};
use crate::leader::{LeaderElection, Leadership};
use crate::metrics;
use crate::probes::ReadyProbe;
use crate::readiness::{GateOutcome, PrerequisiteCheck, ReadinessGate};

/// One independently reconciled resource domain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Domain {
    /// Primary database cluster deployments (`QuorumCluster`).
    Cluster,
    /// Cross-cluster replication links (`QuorumReplication`).
    Replication,
    /// Local storage provisioning (`QuorumLocalStorage`).
    Storage,
    /// Cluster-wide database administration (no CRD of its own).
    DatabaseAdmin,
}

impl Domain {
    /// Short domain name used in logs, metrics and probes.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Domain::Cluster => "cluster",
            Domain::Replication => "replication",
            Domain::Storage => "storage",
            Domain::DatabaseAdmin => "database-admin",
        }
    }

    /// Lease name scoping this domain's leader election.
    #[must_use]
    pub fn lease_name(self) -> &'static str {
        match self {
            Domain::Cluster => LEASE_CLUSTER_OPERATOR,
            Domain::Replication => LEASE_REPLICATION_OPERATOR,
            Domain::Storage => LEASE_STORAGE_OPERATOR,
            Domain::DatabaseAdmin => LEASE_DATABASE_ADMIN,
        }
    }

    /// CRDs that must be established before this domain reconciles.
    #[must_use]
    pub fn crd_names(self) -> &'static [&'static str] {
        match self {
            Domain::Cluster => &[CRD_QUORUM_CLUSTERS],
            Domain::Replication => &[CRD_QUORUM_REPLICATIONS],
            Domain::Storage => &[CRD_QUORUM_LOCAL_STORAGES],
            Domain::DatabaseAdmin => &[],
        }
    }
}

/// A domain's reconcile loop.
///
/// `run` must observe `stop` at every blocking point and return promptly once
/// it fires; the supervisor cancels the session on leadership loss the same
/// way.
#[async_trait]
pub trait ReconcileEntrypoint: Send + Sync {
    async fn run(&self, stop: watch::Receiver<bool>);
}

/// Wait until the stop signal fires or its sender is gone.
pub(crate) async fn wait_for_stop(mut stop: watch::Receiver<bool>) {
    while !*stop.borrow() {
        if stop.changed().await.is_err() {
            return;
        }
    }
}

/// How a leadership session ended.
enum SessionEnd {
    Stopped,
    LeadershipLost,
}

/// Supervisor wrapping one domain's reconcile loop in a leader-election session.
pub struct DomainSupervisor {
    domain: Domain,
    elector: Arc<dyn LeaderElection>,
    gate: ReadinessGate,
    probe: Arc<ReadyProbe>,
    campaign_retry: Duration,
}

impl DomainSupervisor {
    /// Supervisor for `domain` using the given elector, gate and ready probe.
    #[must_use]
    pub fn new(
        domain: Domain,
        elector: Arc<dyn LeaderElection>,
        gate: ReadinessGate,
        probe: Arc<ReadyProbe>,
    ) -> Self {
        Self {
            domain,
            elector,
            gate,
            probe,
            campaign_retry: Duration::from_secs(CAMPAIGN_RETRY_WAIT_SECS),
        }
    }

    /// Override the pause between campaign attempts, used in tests.
    #[must_use]
    pub fn with_campaign_retry(mut self, campaign_retry: Duration) -> Self {
        self.campaign_retry = campaign_retry;
        self
    }

    /// Run the supervisor until the process-wide stop signal fires.
    pub async fn run(
        &self,
        check: Arc<dyn PrerequisiteCheck>,
        entrypoint: Arc<dyn ReconcileEntrypoint>,
        mut stop: watch::Receiver<bool>,
    ) {
        let domain = self.domain.name();
        info!(domain, lease = self.domain.lease_name(), "starting domain supervisor");

        'campaign: while !*stop.borrow() {
            self.probe.set_ready(false);

            let mut leadership = match self.elector.campaign(self.domain.lease_name()).await {
                Ok(leadership) => leadership,
                Err(err) => {
                    warn!(domain, error = %format!("{err:#}"), "leader election unavailable");
                    if self.pause(&mut stop).await {
                        break 'campaign;
                    }
                    continue 'campaign;
                }
            };

            // Idle until this replica leads the domain.
            while !leadership.is_leader() {
                tokio::select! {
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break 'campaign;
                        }
                    }
                    state = leadership.changed() => {
                        if let Err(err) = state {
                            debug!(domain, error = %err, "leadership session ended while idle");
                            if self.pause(&mut stop).await {
                                break 'campaign;
                            }
                            continue 'campaign;
                        }
                    }
                }
            }

            info!(domain, "leadership acquired");
            metrics::record_leader_elected(domain);

            let end = self
                .lead(&mut leadership, check.as_ref(), entrypoint.as_ref(), &mut stop)
                .await;

            self.probe.set_ready(false);
            metrics::record_leader_lost(domain);

            match end {
                SessionEnd::Stopped => break 'campaign,
                SessionEnd::LeadershipLost => {
                    info!(domain, "leadership lost, campaigning again");
                }
            }
        }

        self.probe.set_ready(false);
        info!(domain, "domain supervisor stopped");
    }

    /// Interruptible pause between campaign attempts; `true` means stop fired.
    async fn pause(&self, stop: &mut watch::Receiver<bool>) -> bool {
        tokio::select! {
            changed = stop.changed() => changed.is_err() || *stop.borrow(),
            () = tokio::time::sleep(self.campaign_retry) => false,
        }
    }

    /// Run one leadership session: readiness gate, then the entry point, until
    /// the stop signal fires or leadership is lost.
    async fn lead(
        &self,
        leadership: &mut Leadership,
        check: &dyn PrerequisiteCheck,
        entrypoint: &dyn ReconcileEntrypoint,
        stop: &mut watch::Receiver<bool>,
    ) -> SessionEnd {
        let domain = self.domain.name();
        let (cancel_tx, cancel_rx) = watch::channel(false);

        let session = async {
            let mut gate_stop = cancel_rx.clone();
            match self.gate.wait(domain, check, &mut gate_stop).await {
                GateOutcome::Stopped => return,
                GateOutcome::Satisfied => {}
            }
            self.probe.set_ready(true);
            entrypoint.run(cancel_rx.clone()).await;
        };
        tokio::pin!(session);

        loop {
            tokio::select! {
                () = &mut session => {
                    // The entry point returned on its own; resign and campaign
                    // again instead of holding an idle lease.
                    return if *stop.borrow() {
                        SessionEnd::Stopped
                    } else {
                        warn!(domain, "reconcile entry point exited early");
                        SessionEnd::LeadershipLost
                    };
                }
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        let _ = cancel_tx.send(true);
                        let _ = tokio::time::timeout(
                            Duration::from_secs(ENTRYPOINT_DRAIN_SECS),
                            &mut session,
                        )
                        .await;
                        return SessionEnd::Stopped;
                    }
                }
                state = leadership.changed() => {
                    if !state.unwrap_or(false) {
                        let _ = cancel_tx.send(true);
                        let _ = tokio::time::timeout(
                            Duration::from_secs(ENTRYPOINT_DRAIN_SECS),
                            &mut session,
                        )
                        .await;
                        return SessionEnd::LeadershipLost;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod supervisor_tests;
