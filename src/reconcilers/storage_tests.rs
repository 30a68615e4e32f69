// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `storage.rs`

#[cfg(test)]
mod tests {
    use crate::conditions::ConditionStatus;
    use crate::crd::{
        QuorumLocalStorage, QuorumLocalStorageSpec, QuorumLocalStorageStatus, StorageClassSpec,
    };
    use crate::reconcilers::storage::observe_local_storage;
    use crate::status_reasons::{CONDITION_TYPE_READY, REASON_CONFIGURATION_INVALID};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn storage(spec: QuorumLocalStorageSpec) -> QuorumLocalStorage {
        QuorumLocalStorage {
            metadata: ObjectMeta {
                name: Some("disks".to_string()),
                namespace: Some("databases".to_string()),
                generation: Some(1),
                ..Default::default()
            },
            spec,
            status: None,
        }
    }

    fn valid_spec() -> QuorumLocalStorageSpec {
        QuorumLocalStorageSpec {
            storage_class: StorageClassSpec {
                name: "quorumdb-local".to_string(),
                is_default: false,
            },
            local_path: vec!["/mnt/data1".to_string(), "/mnt/data2".to_string()],
            node_selector: None,
        }
    }

    #[test]
    fn test_valid_spec_is_ready() {
        let mut status = QuorumLocalStorageStatus::default();

        assert!(observe_local_storage(&mut status, &storage(valid_spec())));
        assert!(status.conditions.is_true(CONDITION_TYPE_READY));

        let ready = status.conditions.get(CONDITION_TYPE_READY).unwrap();
        assert!(ready.message.contains("quorumdb-local"));
        assert!(ready.message.contains('2'));
    }

    #[test]
    fn test_empty_storage_class_name_is_rejected() {
        let mut spec = valid_spec();
        spec.storage_class.name = String::new();
        let mut status = QuorumLocalStorageStatus::default();

        observe_local_storage(&mut status, &storage(spec));

        let ready = status.conditions.get(CONDITION_TYPE_READY).unwrap();
        assert_eq!(ready.status, ConditionStatus::False);
        assert_eq!(ready.reason, REASON_CONFIGURATION_INVALID);
    }

    #[test]
    fn test_missing_local_paths_are_rejected() {
        let mut spec = valid_spec();
        spec.local_path.clear();
        let mut status = QuorumLocalStorageStatus::default();

        observe_local_storage(&mut status, &storage(spec));
        assert!(!status.conditions.is_true(CONDITION_TYPE_READY));
    }

    #[test]
    fn test_relative_local_path_is_rejected() {
        let mut spec = valid_spec();
        spec.local_path.push("data3".to_string());
        let mut status = QuorumLocalStorageStatus::default();

        observe_local_storage(&mut status, &storage(spec));

        let ready = status.conditions.get(CONDITION_TYPE_READY).unwrap();
        assert_eq!(ready.status, ConditionStatus::False);
        assert!(ready.message.contains("data3"));
    }

    #[test]
    fn test_observe_is_idempotent() {
        let storage = storage(valid_spec());
        let mut status = QuorumLocalStorageStatus::default();

        assert!(observe_local_storage(&mut status, &storage));
        assert!(!observe_local_storage(&mut status, &storage));
    }
}
