// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Custom Resource Definitions for QuorumDB managed resources.
//!
//! Three independent resource kinds are reconciled by the operator:
//!
//! - [`QuorumCluster`] - a QuorumDB database cluster deployment
//! - [`QuorumReplication`] - a cross-cluster datacenter replication link
//! - [`QuorumLocalStorage`] - node-local persistent volume provisioning
//!
//! Each status subresource embeds the generic [`ConditionList`] so observed
//! state transitions are reported the same way across kinds.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::conditions::ConditionList;

/// Deployment mode of a QuorumDB cluster.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum DeploymentMode {
    /// A single server without replication.
    Single,
    /// A full cluster with replicated shards and a coordination quorum.
    #[default]
    Cluster,
}

/// `QuorumCluster` describes one QuorumDB database cluster deployment.
///
/// # Example
///
/// ```yaml
/// apiVersion: quorumdb.io/v1alpha1
/// kind: QuorumCluster
/// metadata:
///   name: production
///   namespace: databases
/// spec:
///   mode: Cluster
///   servers: 3
///   image: quorumdb/quorumdb:4.2
/// ```
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "quorumdb.io",
    version = "v1alpha1",
    kind = "QuorumCluster",
    namespaced,
    doc = "QuorumCluster represents a QuorumDB database cluster managed by the operator."
)]
#[kube(status = "QuorumClusterStatus")]
#[serde(rename_all = "camelCase")]
#[derive(Default)]
pub struct QuorumClusterSpec {
    /// Deployment mode, `Single` or `Cluster`.
    #[serde(default)]
    pub mode: DeploymentMode,

    /// Number of database servers. Must be at least 1; cluster mode requires
    /// an odd count of 3 or more for a usable quorum.
    #[serde(default)]
    pub servers: Option<i32>,

    /// Container image running the database servers.
    ///
    /// Defaults to the operator-wide image when omitted.
    #[serde(default)]
    pub image: Option<String>,

    /// Endpoint of the cluster coordination and admin API.
    ///
    /// Defaults to the in-cluster service derived from the resource name.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Desired cluster-wide maintenance mode.
    ///
    /// When set, the operator aligns the supervision maintenance flag with this
    /// value. When omitted the flag is left untouched.
    #[serde(default)]
    pub maintenance: Option<bool>,
}

/// `QuorumCluster` status
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuorumClusterStatus {
    #[serde(default)]
    pub conditions: ConditionList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// One endpoint of a replication link, either a managed cluster by name or an
/// external endpoint URL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReplicationEndpoint {
    /// Name of a `QuorumCluster` in the same namespace.
    #[serde(default)]
    pub cluster_name: Option<String>,

    /// Endpoint URL of an unmanaged cluster.
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Name of the Secret holding the access token for this endpoint.
    #[serde(default)]
    pub auth_secret_name: Option<String>,
}

impl ReplicationEndpoint {
    /// An endpoint is addressable when it names a managed cluster or carries
    /// an explicit endpoint URL.
    #[must_use]
    pub fn is_addressable(&self) -> bool {
        self.cluster_name.as_deref().is_some_and(|n| !n.is_empty())
            || self.endpoint.as_deref().is_some_and(|e| !e.is_empty())
    }
}

/// `QuorumReplication` describes a datacenter-to-datacenter replication link
/// between two QuorumDB clusters.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "quorumdb.io",
    version = "v1alpha1",
    kind = "QuorumReplication",
    namespaced,
    doc = "QuorumReplication represents a cross-cluster replication link between two QuorumDB clusters."
)]
#[kube(status = "QuorumReplicationStatus")]
#[serde(rename_all = "camelCase")]
#[derive(Default)]
pub struct QuorumReplicationSpec {
    /// Cluster data is replicated from.
    pub source: ReplicationEndpoint,

    /// Cluster data is replicated to.
    pub destination: ReplicationEndpoint,
}

/// `QuorumReplication` status
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuorumReplicationStatus {
    #[serde(default)]
    pub conditions: ConditionList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

/// Storage class registered by a `QuorumLocalStorage` resource.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StorageClassSpec {
    /// Name of the storage class to create.
    pub name: String,

    /// Whether the storage class becomes the cluster default.
    #[serde(default)]
    pub is_default: bool,
}

/// `QuorumLocalStorage` provisions node-local persistent volumes for database
/// servers.
#[derive(CustomResource, Clone, Debug, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "quorumdb.io",
    version = "v1alpha1",
    kind = "QuorumLocalStorage",
    namespaced,
    doc = "QuorumLocalStorage represents node-local persistent volume provisioning for QuorumDB servers."
)]
#[kube(status = "QuorumLocalStorageStatus")]
#[serde(rename_all = "camelCase")]
pub struct QuorumLocalStorageSpec {
    /// Storage class served by the provisioned volumes.
    pub storage_class: StorageClassSpec,

    /// Node-local directories volumes are provisioned under.
    pub local_path: Vec<String>,

    /// Restrict provisioning to nodes matching these labels.
    #[serde(default)]
    pub node_selector: Option<BTreeMap<String, String>>,
}

/// `QuorumLocalStorage` status
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuorumLocalStorageStatus {
    #[serde(default)]
    pub conditions: ConditionList,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

#[cfg(test)]
#[path = "crd_tests.rs"]
mod crd_tests;
