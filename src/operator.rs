// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Process-wide operator state and the top-level run loop.
//!
//! The [`Operator`] owns the immutable [`Config`], the shared [`Dependencies`]
//! and one worker [`Registry`] per resource kind. `run` launches one
//! [`DomainSupervisor`] per enabled domain and then blocks for the remainder
//! of process life; termination is cooperative through the process-wide stop
//! signal.
//!
//! Registry entries are created and removed only by the owning domain's single
//! reconcile loop; the coordinator reads them solely for diagnostics.

use k8s_openapi::api::core::v1::ObjectReference;
use kube::runtime::events::Recorder;
use kube::Client;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::constants::{
    KIND_QUORUM_CLUSTER, KIND_QUORUM_LOCAL_STORAGE, KIND_QUORUM_REPLICATION,
};
use crate::coordination::CoordinationStore;
use crate::leader::LeaderElection;
use crate::maintenance::ClusterAdminClient;
use crate::probes::{LivenessProbe, ReadyProbe};
use crate::readiness::{CrdEstablished, PrerequisiteCheck, ReadinessGate};
use crate::reconcilers::{
    AdminEntrypoint, ClusterContext, ClusterEntrypoint, ClusterWorker, EventPublisher,
    ReplicationContext, ReplicationEntrypoint, ReplicationWorker, StorageContext,
    StorageEntrypoint, StorageWorker,
};
use crate::registry::Registry;
use crate::supervisor::{Domain, DomainSupervisor, ReconcileEntrypoint};

/// Immutable operator configuration, fixed at startup.
#[derive(Clone, Debug)]
pub struct Config {
    /// Unique id of this operator instance.
    pub id: String,
    /// Namespace the operator runs in; leases are held here.
    pub namespace: String,
    /// Name of the pod running this instance.
    pub pod_name: String,
    /// Service account the operator runs under.
    pub service_account: String,
    /// Default database server image.
    pub database_image: String,
    /// Reconcile `QuorumCluster` resources.
    pub enable_cluster: bool,
    /// Reconcile `QuorumReplication` resources.
    pub enable_replication: bool,
    /// Reconcile `QuorumLocalStorage` resources.
    pub enable_storage: bool,
    /// Run the database-admin maintenance observer.
    pub enable_database_admin: bool,
    /// Allow chaos experiments against managed clusters.
    pub allow_chaos: bool,
}

impl Config {
    /// Domains enabled by this configuration, in launch order.
    #[must_use]
    pub fn enabled_domains(&self) -> Vec<Domain> {
        let mut domains = Vec::new();
        if self.enable_cluster {
            domains.push(Domain::Cluster);
        }
        if self.enable_replication {
            domains.push(Domain::Replication);
        }
        if self.enable_storage {
            domains.push(Domain::Storage);
        }
        if self.enable_database_admin {
            domains.push(Domain::DatabaseAdmin);
        }
        domains
    }
}

/// Shared handles to external systems, read-only from the coordinator's view.
pub struct Dependencies {
    /// Kubernetes API client.
    pub client: Client,
    /// Coordination store of the managed database cluster.
    pub store: Arc<dyn CoordinationStore>,
    /// Administrative API client of the managed database cluster.
    pub admin: Arc<ClusterAdminClient>,
    /// Leader election provider.
    pub elector: Arc<dyn LeaderElection>,
    /// Event recorder for operator events.
    pub recorder: Recorder,
    /// Process-wide liveness probe.
    pub liveness_probe: Arc<LivenessProbe>,
    /// Per-domain readiness probes.
    pub cluster_probe: Arc<ReadyProbe>,
    pub replication_probe: Arc<ReadyProbe>,
    pub storage_probe: Arc<ReadyProbe>,
    pub database_admin_probe: Arc<ReadyProbe>,
}

/// The operator coordinator.
pub struct Operator {
    config: Config,
    deps: Dependencies,
    clusters: Arc<Registry<ClusterWorker>>,
    replications: Arc<Registry<ReplicationWorker>>,
    local_storages: Arc<Registry<StorageWorker>>,
}

impl Operator {
    /// Pure initialization: allocates the empty worker registries, no I/O.
    #[must_use]
    pub fn new(config: Config, deps: Dependencies) -> Self {
        Self {
            config,
            deps,
            clusters: Arc::new(Registry::new(KIND_QUORUM_CLUSTER)),
            replications: Arc::new(Registry::new(KIND_QUORUM_REPLICATION)),
            local_storages: Arc::new(Registry::new(KIND_QUORUM_LOCAL_STORAGE)),
        }
    }

    /// Operator configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Live cluster workers, for diagnostics.
    #[must_use]
    pub fn clusters(&self) -> &Registry<ClusterWorker> {
        &self.clusters
    }

    /// Live replication workers, for diagnostics.
    #[must_use]
    pub fn replications(&self) -> &Registry<ReplicationWorker> {
        &self.replications
    }

    /// Live storage workers, for diagnostics.
    #[must_use]
    pub fn local_storages(&self) -> &Registry<StorageWorker> {
        &self.local_storages
    }

    /// Launch one supervisor per enabled domain and block for process life.
    ///
    /// Returns only after the stop signal fires and every supervisor wound
    /// down; there is no normal return before that.
    pub async fn run(&self, stop: watch::Receiver<bool>) {
        let mut supervisors: Vec<JoinHandle<()>> = Vec::new();
        for domain in self.config.enabled_domains() {
            supervisors.push(self.spawn_domain(domain, stop.clone()));
        }
        if supervisors.is_empty() {
            warn!("no reconciliation domains are enabled");
        }

        info!(
            id = %self.config.id,
            namespace = %self.config.namespace,
            domains = supervisors.len(),
            "operator running"
        );

        let mut stop = stop;
        if !*stop.borrow() {
            let _ = stop.changed().await;
        }
        for supervisor in supervisors {
            let _ = supervisor.await;
        }
        info!("operator stopped");
    }

    fn spawn_domain(&self, domain: Domain, stop: watch::Receiver<bool>) -> JoinHandle<()> {
        let supervisor = DomainSupervisor::new(
            domain,
            self.deps.elector.clone(),
            ReadinessGate::new(),
            self.domain_probe(domain),
        );
        let check: Arc<dyn PrerequisiteCheck> = Arc::new(CrdEstablished::new(
            self.deps.client.clone(),
            domain.crd_names(),
        ));
        let entrypoint = self.entrypoint(domain);

        tokio::spawn(async move {
            supervisor.run(check, entrypoint, stop).await;
        })
    }

    fn domain_probe(&self, domain: Domain) -> Arc<ReadyProbe> {
        match domain {
            Domain::Cluster => self.deps.cluster_probe.clone(),
            Domain::Replication => self.deps.replication_probe.clone(),
            Domain::Storage => self.deps.storage_probe.clone(),
            Domain::DatabaseAdmin => self.deps.database_admin_probe.clone(),
        }
    }

    fn entrypoint(&self, domain: Domain) -> Arc<dyn ReconcileEntrypoint> {
        match domain {
            Domain::Cluster => Arc::new(ClusterEntrypoint {
                ctx: Arc::new(ClusterContext {
                    client: self.deps.client.clone(),
                    store: self.deps.store.clone(),
                    admin: self.deps.admin.clone(),
                    registry: self.clusters.clone(),
                    events: Some(self.event_publisher()),
                }),
            }),
            Domain::Replication => Arc::new(ReplicationEntrypoint {
                ctx: Arc::new(ReplicationContext {
                    client: self.deps.client.clone(),
                    registry: self.replications.clone(),
                }),
            }),
            Domain::Storage => Arc::new(StorageEntrypoint {
                ctx: Arc::new(StorageContext {
                    client: self.deps.client.clone(),
                    registry: self.local_storages.clone(),
                }),
            }),
            Domain::DatabaseAdmin => Arc::new(AdminEntrypoint::new(
                self.deps.store.clone(),
                Some(self.event_publisher()),
            )),
        }
    }

    fn event_publisher(&self) -> EventPublisher {
        EventPublisher::new(self.deps.recorder.clone(), pod_reference(&self.config))
    }
}

/// Object reference of the operator pod, events are recorded against it.
fn pod_reference(config: &Config) -> ObjectReference {
    ObjectReference {
        api_version: Some("v1".to_string()),
        kind: Some("Pod".to_string()),
        name: Some(config.pod_name.clone()),
        namespace: Some(config.namespace.clone()),
        ..Default::default()
    }
}

#[cfg(test)]
#[path = "operator_tests.rs"]
mod operator_tests;
