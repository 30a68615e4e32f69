// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the QuorumDB operator.
//!
//! This module contains all numeric and string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// API Constants
// ============================================================================

/// API group for all QuorumDB CRDs
pub const API_GROUP: &str = "quorumdb.io";

/// API version for all QuorumDB CRDs
pub const API_VERSION: &str = "v1alpha1";

/// Fully qualified API version (group/version)
pub const API_GROUP_VERSION: &str = "quorumdb.io/v1alpha1";

/// Kind name for the `QuorumCluster` resource
pub const KIND_QUORUM_CLUSTER: &str = "QuorumCluster";

/// Kind name for the `QuorumReplication` resource
pub const KIND_QUORUM_REPLICATION: &str = "QuorumReplication";

/// Kind name for the `QuorumLocalStorage` resource
pub const KIND_QUORUM_LOCAL_STORAGE: &str = "QuorumLocalStorage";

/// Full CRD name for `QuorumCluster`
pub const CRD_QUORUM_CLUSTERS: &str = "quorumclusters.quorumdb.io";

/// Full CRD name for `QuorumReplication`
pub const CRD_QUORUM_REPLICATIONS: &str = "quorumreplications.quorumdb.io";

/// Full CRD name for `QuorumLocalStorage`
pub const CRD_QUORUM_LOCAL_STORAGES: &str = "quorumlocalstorages.quorumdb.io";

/// Finalizer placed on `QuorumCluster` resources
pub const FINALIZER_QUORUM_CLUSTER: &str = "quorumcluster.quorumdb.io/finalizer";

/// Finalizer placed on `QuorumReplication` resources
pub const FINALIZER_QUORUM_REPLICATION: &str = "quorumreplication.quorumdb.io/finalizer";

/// Finalizer placed on `QuorumLocalStorage` resources
pub const FINALIZER_QUORUM_LOCAL_STORAGE: &str = "quorumlocalstorage.quorumdb.io/finalizer";

// ============================================================================
// Coordination Store Constants
// ============================================================================

/// Key path of the cluster-wide supervision maintenance flag.
///
/// Presence of the key enables maintenance mode regardless of the stored value.
pub const MAINTENANCE_KEY_PATH: [&str; 3] = ["quorumdb", "Supervision", "Maintenance"];

/// Administrative endpoint toggling cluster maintenance
pub const ADMIN_MAINTENANCE_PATH: &str = "/_admin/cluster/maintenance";

/// Request body enabling maintenance mode
pub const MAINTENANCE_BODY_ON: &str = "on";

/// Request body disabling maintenance mode
pub const MAINTENANCE_BODY_OFF: &str = "off";

/// Default database cluster endpoint (coordination store and admin API)
pub const DEFAULT_DATABASE_ENDPOINT: &str = "http://quorumdb:8530";

// ============================================================================
// Supervision Constants
// ============================================================================

/// Fixed wait between prerequisite checks while a domain is initializing (30 seconds)
pub const INIT_RETRY_WAIT_SECS: u64 = 30;

/// Wait before re-entering a leader-election campaign after an elector error
pub const CAMPAIGN_RETRY_WAIT_SECS: u64 = 5;

/// How long a cancelled reconcile entry point is given to wind down
pub const ENTRYPOINT_DRAIN_SECS: u64 = 5;

/// Poll interval of the database-admin maintenance observer
pub const MAINTENANCE_POLL_INTERVAL_SECS: u64 = 30;

// ============================================================================
// Leader Election Constants
// ============================================================================

/// Lease name for the cluster deployment domain
pub const LEASE_CLUSTER_OPERATOR: &str = "quorumdb-cluster-operator";

/// Lease name for the cross-cluster replication domain
pub const LEASE_REPLICATION_OPERATOR: &str = "quorumdb-replication-operator";

/// Lease name for the local storage domain
pub const LEASE_STORAGE_OPERATOR: &str = "quorumdb-storage-operator";

/// Lease name for the database admin domain
pub const LEASE_DATABASE_ADMIN: &str = "quorumdb-database-admin";

/// Default leader election lease duration (15 seconds)
pub const DEFAULT_LEASE_DURATION_SECS: u64 = 15;

/// Default leader election grace period before a lease is considered expired (5 seconds)
pub const DEFAULT_LEASE_GRACE_SECS: u64 = 5;

// ============================================================================
// Controller Error Handling Constants
// ============================================================================

/// Requeue duration for controller errors and unconfigured resources (30 seconds)
pub const ERROR_REQUEUE_DURATION_SECS: u64 = 30;

/// Requeue duration for resources in their steady state (5 minutes)
pub const READY_REQUEUE_DURATION_SECS: u64 = 300;

// ============================================================================
// Runtime Constants
// ============================================================================

/// Number of worker threads for the Tokio runtime
pub const TOKIO_WORKER_THREADS: usize = 4;

/// Port for the health and Prometheus metrics HTTP server
pub const HEALTH_SERVER_PORT: u16 = 8080;

/// Path for the Prometheus metrics endpoint
pub const METRICS_SERVER_PATH: &str = "/metrics";

/// Bind address for the health and metrics HTTP server
pub const HEALTH_SERVER_BIND_ADDRESS: &str = "0.0.0.0";
