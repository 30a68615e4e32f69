// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `replication.rs`

#[cfg(test)]
mod tests {
    use crate::conditions::ConditionStatus;
    use crate::crd::{
        QuorumReplication, QuorumReplicationSpec, QuorumReplicationStatus, ReplicationEndpoint,
    };
    use crate::reconcilers::replication::observe_replication;
    use crate::status_reasons::{CONDITION_TYPE_CONFIGURED, REASON_CONFIGURATION_INVALID};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn replication(spec: QuorumReplicationSpec) -> QuorumReplication {
        QuorumReplication {
            metadata: ObjectMeta {
                name: Some("dc2-link".to_string()),
                namespace: Some("databases".to_string()),
                generation: Some(1),
                ..Default::default()
            },
            spec,
            status: None,
        }
    }

    fn named_cluster(name: &str) -> ReplicationEndpoint {
        ReplicationEndpoint {
            cluster_name: Some(name.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_link_with_both_endpoints_is_configured() {
        let spec = QuorumReplicationSpec {
            source: named_cluster("primary"),
            destination: ReplicationEndpoint {
                endpoint: Some("https://dc2.example.com:8530".to_string()),
                ..Default::default()
            },
        };
        let mut status = QuorumReplicationStatus::default();

        assert!(observe_replication(&mut status, &replication(spec)));
        assert!(status.conditions.is_true(CONDITION_TYPE_CONFIGURED));
        assert_eq!(status.observed_generation, Some(1));
    }

    #[test]
    fn test_missing_source_is_rejected() {
        let spec = QuorumReplicationSpec {
            source: ReplicationEndpoint::default(),
            destination: named_cluster("secondary"),
        };
        let mut status = QuorumReplicationStatus::default();

        observe_replication(&mut status, &replication(spec));

        let configured = status.conditions.get(CONDITION_TYPE_CONFIGURED).unwrap();
        assert_eq!(configured.status, ConditionStatus::False);
        assert_eq!(configured.reason, REASON_CONFIGURATION_INVALID);
        assert!(configured.message.contains("source"));
    }

    #[test]
    fn test_missing_destination_is_rejected() {
        let spec = QuorumReplicationSpec {
            source: named_cluster("primary"),
            destination: ReplicationEndpoint::default(),
        };
        let mut status = QuorumReplicationStatus::default();

        observe_replication(&mut status, &replication(spec));

        let configured = status.conditions.get(CONDITION_TYPE_CONFIGURED).unwrap();
        assert_eq!(configured.status, ConditionStatus::False);
        assert!(configured.message.contains("destination"));
    }

    #[test]
    fn test_observe_is_idempotent() {
        let spec = QuorumReplicationSpec {
            source: named_cluster("primary"),
            destination: named_cluster("secondary"),
        };
        let replication = replication(spec);
        let mut status = QuorumReplicationStatus::default();

        assert!(observe_replication(&mut status, &replication));
        assert!(!observe_replication(&mut status, &replication));
    }

    #[test]
    fn test_endpoint_loss_flips_condition() {
        let replication_ok = replication(QuorumReplicationSpec {
            source: named_cluster("primary"),
            destination: named_cluster("secondary"),
        });
        let mut status = QuorumReplicationStatus::default();
        observe_replication(&mut status, &replication_ok);
        assert!(status.conditions.is_true(CONDITION_TYPE_CONFIGURED));

        let replication_broken = replication(QuorumReplicationSpec {
            source: named_cluster("primary"),
            destination: ReplicationEndpoint::default(),
        });
        assert!(observe_replication(&mut status, &replication_broken));
        assert!(!status.conditions.is_true(CONDITION_TYPE_CONFIGURED));
    }
}
