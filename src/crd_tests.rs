// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `crd.rs`

#[cfg(test)]
mod tests {
    use crate::conditions::ConditionStatus;
    use crate::constants::{API_GROUP, API_VERSION, KIND_QUORUM_CLUSTER};
    use crate::crd::{
        DeploymentMode, QuorumCluster, QuorumClusterSpec, QuorumClusterStatus,
        QuorumLocalStorageSpec, QuorumReplicationSpec, ReplicationEndpoint, StorageClassSpec,
    };
    use kube::core::CustomResourceExt;
    use kube::Resource;

    #[test]
    fn test_quorum_cluster_group_and_kind() {
        assert_eq!(QuorumCluster::group(&()), API_GROUP);
        assert_eq!(QuorumCluster::version(&()), API_VERSION);
        assert_eq!(QuorumCluster::kind(&()), KIND_QUORUM_CLUSTER);
    }

    #[test]
    fn test_crd_manifests_are_generated() {
        let crd = QuorumCluster::crd();
        assert_eq!(crd.spec.group, API_GROUP);
        assert_eq!(crd.spec.names.kind, KIND_QUORUM_CLUSTER);
        assert_eq!(crd.spec.names.plural, "quorumclusters");
    }

    #[test]
    fn test_cluster_spec_deserializes_from_manifest_yaml() {
        let yaml = r"
mode: Cluster
servers: 3
image: quorumdb/quorumdb:4.2
maintenance: false
";
        let spec: QuorumClusterSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.mode, DeploymentMode::Cluster);
        assert_eq!(spec.servers, Some(3));
        assert_eq!(spec.image.as_deref(), Some("quorumdb/quorumdb:4.2"));
        assert_eq!(spec.maintenance, Some(false));
        assert!(spec.endpoint.is_none());
    }

    #[test]
    fn test_cluster_spec_defaults() {
        let spec: QuorumClusterSpec = serde_yaml::from_str("{}").unwrap();
        assert_eq!(spec.mode, DeploymentMode::Cluster);
        assert!(spec.servers.is_none());
        assert!(spec.maintenance.is_none());
    }

    #[test]
    fn test_cluster_status_conditions_serialize_camel_case() {
        let mut status = QuorumClusterStatus::default();
        status
            .conditions
            .update("Configured", true, "Configured", "accepted");
        status.observed_generation = Some(2);

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["observedGeneration"], 2);
        assert_eq!(json["conditions"][0]["type"], "Configured");
        assert_eq!(json["conditions"][0]["status"], "True");
    }

    #[test]
    fn test_cluster_status_default_has_no_conditions() {
        let status = QuorumClusterStatus::default();
        assert!(status.conditions.is_empty());
        assert_eq!(
            status.conditions.get("Configured").map(|c| c.status),
            None::<ConditionStatus>
        );
    }

    #[test]
    fn test_replication_endpoint_addressability() {
        let empty = ReplicationEndpoint::default();
        assert!(!empty.is_addressable());

        let by_name = ReplicationEndpoint {
            cluster_name: Some("primary".to_string()),
            ..Default::default()
        };
        assert!(by_name.is_addressable());

        let by_endpoint = ReplicationEndpoint {
            endpoint: Some("https://dc2.example.com:8530".to_string()),
            ..Default::default()
        };
        assert!(by_endpoint.is_addressable());

        let blank = ReplicationEndpoint {
            cluster_name: Some(String::new()),
            endpoint: Some(String::new()),
            ..Default::default()
        };
        assert!(!blank.is_addressable());
    }

    #[test]
    fn test_replication_spec_deserializes_from_manifest_yaml() {
        let yaml = r"
source:
  clusterName: primary
destination:
  endpoint: https://dc2.example.com:8530
  authSecretName: dc2-access
";
        let spec: QuorumReplicationSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(spec.source.cluster_name.as_deref(), Some("primary"));
        assert_eq!(
            spec.destination.endpoint.as_deref(),
            Some("https://dc2.example.com:8530")
        );
        assert_eq!(
            spec.destination.auth_secret_name.as_deref(),
            Some("dc2-access")
        );
    }

    #[test]
    fn test_local_storage_spec_deserializes_from_manifest_yaml() {
        let yaml = r"
storageClass:
  name: quorumdb-local
  isDefault: true
localPath:
  - /mnt/data1
  - /mnt/data2
";
        let spec: QuorumLocalStorageSpec = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(
            spec.storage_class,
            StorageClassSpec {
                name: "quorumdb-local".to_string(),
                is_default: true,
            }
        );
        assert_eq!(spec.local_path.len(), 2);
        assert!(spec.node_selector.is_none());
    }
}
