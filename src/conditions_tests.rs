// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `conditions.rs`

#[cfg(test)]
mod tests {
    use crate::conditions::{Condition, ConditionList, ConditionStatus};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
    use k8s_openapi::jiff::Timestamp;
    use std::thread::sleep;
    use std::time::Duration;

    const TYPE_CONFIGURED: &str = "Configured";

    /// Short pause so consecutive timestamps are strictly ordered.
    fn tick() {
        sleep(Duration::from_millis(5));
    }

    fn instant(time: &Option<Time>) -> Timestamp {
        time.as_ref().expect("timestamp must be set").0
    }

    #[test]
    fn test_update_on_absent_type_appends() {
        let mut list = ConditionList::new();

        assert!(list.update(TYPE_CONFIGURED, true, "Init", "ready"));
        assert_eq!(list.len(), 1);

        let condition = list.get(TYPE_CONFIGURED).unwrap();
        assert_eq!(condition.status, ConditionStatus::True);
        assert_eq!(condition.reason, "Init");
        assert_eq!(condition.message, "ready");
        assert_eq!(
            condition.last_update_time, condition.last_transition_time,
            "first update must set both timestamps to the same instant"
        );
        assert!(condition.last_update_time.is_some());
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut list = ConditionList::new();
        list.update(TYPE_CONFIGURED, true, "Init", "ready");
        let before = list.get(TYPE_CONFIGURED).unwrap().clone();

        tick();
        assert!(!list.update(TYPE_CONFIGURED, true, "Init", "ready"));

        let after = list.get(TYPE_CONFIGURED).unwrap();
        assert_eq!(*after, before, "a no-op update must not mutate the entry");
    }

    #[test]
    fn test_status_flip_advances_both_timestamps() {
        let mut list = ConditionList::new();
        list.update(TYPE_CONFIGURED, true, "Init", "ready");
        let before = list.get(TYPE_CONFIGURED).unwrap().clone();

        tick();
        assert!(list.update(TYPE_CONFIGURED, false, "Lost", "unreachable"));

        let after = list.get(TYPE_CONFIGURED).unwrap();
        assert_eq!(after.status, ConditionStatus::False);
        assert_eq!(after.reason, "Lost");
        assert_eq!(after.message, "unreachable");
        assert_eq!(
            after.last_update_time, after.last_transition_time,
            "a flip must stamp both timestamps with the same instant"
        );
        assert!(instant(&after.last_transition_time) > instant(&before.last_transition_time));
        assert!(instant(&after.last_update_time) > instant(&before.last_update_time));
    }

    #[test]
    fn test_reason_change_updates_only_update_time() {
        let mut list = ConditionList::new();
        list.update(TYPE_CONFIGURED, true, "Init", "ready");
        let before = list.get(TYPE_CONFIGURED).unwrap().clone();

        tick();
        assert!(list.update(TYPE_CONFIGURED, true, "Resync", "ready"));

        let after = list.get(TYPE_CONFIGURED).unwrap();
        assert_eq!(after.status, ConditionStatus::True);
        assert_eq!(after.reason, "Resync");
        assert_eq!(
            after.last_transition_time, before.last_transition_time,
            "no status change, the transition time must be preserved"
        );
        assert!(instant(&after.last_update_time) > instant(&before.last_update_time));
    }

    #[test]
    fn test_message_change_updates_only_update_time() {
        let mut list = ConditionList::new();
        list.update(TYPE_CONFIGURED, false, "Lost", "unreachable");
        let before = list.get(TYPE_CONFIGURED).unwrap().clone();

        tick();
        assert!(list.update(TYPE_CONFIGURED, false, "Lost", "still unreachable"));

        let after = list.get(TYPE_CONFIGURED).unwrap();
        assert_eq!(after.last_transition_time, before.last_transition_time);
        assert!(instant(&after.last_update_time) > instant(&before.last_update_time));
    }

    #[test]
    fn test_update_never_produces_unknown() {
        let mut list = ConditionList::new();
        list.update("A", true, "R", "m");
        list.update("B", false, "R", "m");

        assert_eq!(list.get("A").unwrap().status, ConditionStatus::True);
        assert_eq!(list.get("B").unwrap().status, ConditionStatus::False);
    }

    #[test]
    fn test_get_absent_returns_none() {
        let list = ConditionList::new();
        assert!(list.get("Missing").is_none());
        assert!(list.is_empty());
    }

    #[test]
    fn test_is_true_requires_present_and_true() {
        let mut list = ConditionList::new();
        assert!(!list.is_true(TYPE_CONFIGURED));

        list.update(TYPE_CONFIGURED, false, "Lost", "unreachable");
        assert!(!list.is_true(TYPE_CONFIGURED));

        list.update(TYPE_CONFIGURED, true, "Init", "ready");
        assert!(list.is_true(TYPE_CONFIGURED));
    }

    #[test]
    fn test_remove_absent_returns_false() {
        let mut list = ConditionList::new();
        list.update("A", true, "R", "m");

        assert!(!list.remove("Missing"));
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn test_remove_preserves_relative_order() {
        let mut list = ConditionList::new();
        list.update("A", true, "R", "m");
        list.update("B", true, "R", "m");
        list.update("C", true, "R", "m");

        assert!(list.remove("B"));

        let types: Vec<&str> = list.iter().map(|c| c.r#type.as_str()).collect();
        assert_eq!(types, vec!["A", "C"]);
        assert!(list.get("B").is_none());
    }

    #[test]
    fn test_type_can_be_removed_and_re_added() {
        let mut list = ConditionList::new();
        list.update("A", true, "R", "m");
        assert!(list.remove("A"));
        assert!(list.update("A", false, "Back", "again"));
        assert_eq!(list.get("A").unwrap().status, ConditionStatus::False);
    }

    #[test]
    fn test_full_lifecycle_scenario() {
        let mut list = ConditionList::new();

        assert!(list.update(TYPE_CONFIGURED, true, "Init", "ready"));
        assert_eq!(list.len(), 1);
        assert_eq!(list.get(TYPE_CONFIGURED).unwrap().reason, "Init");

        let snapshot = list.clone();
        assert!(!list.update(TYPE_CONFIGURED, true, "Init", "ready"));
        assert_eq!(list, snapshot);

        tick();
        assert!(list.update(TYPE_CONFIGURED, false, "Lost", "unreachable"));
        let condition = list.get(TYPE_CONFIGURED).unwrap();
        assert_eq!(condition.status, ConditionStatus::False);
        assert_eq!(condition.reason, "Lost");
        assert!(
            instant(&condition.last_transition_time)
                > instant(&snapshot.get(TYPE_CONFIGURED).unwrap().last_transition_time)
        );
    }

    #[test]
    fn test_status_serializes_as_literal_strings() {
        assert_eq!(
            serde_json::to_string(&ConditionStatus::True).unwrap(),
            "\"True\""
        );
        assert_eq!(
            serde_json::to_string(&ConditionStatus::False).unwrap(),
            "\"False\""
        );
        assert_eq!(
            serde_json::to_string(&ConditionStatus::Unknown).unwrap(),
            "\"Unknown\""
        );
    }

    #[test]
    fn test_condition_serializes_with_kubernetes_field_names() {
        let mut list = ConditionList::new();
        list.update(TYPE_CONFIGURED, true, "Init", "ready");

        let json = serde_json::to_value(&list).unwrap();
        let entry = &json.as_array().unwrap()[0];

        assert_eq!(entry["type"], "Configured");
        assert_eq!(entry["status"], "True");
        assert_eq!(entry["reason"], "Init");
        assert_eq!(entry["message"], "ready");
        assert!(entry.get("lastUpdateTime").is_some());
        assert!(entry.get("lastTransitionTime").is_some());
    }

    #[test]
    fn test_condition_list_round_trips_through_json() {
        let mut list = ConditionList::new();
        list.update("Configured", true, "Init", "ready");
        list.update("ReconciliationPaused", false, "MaintenanceDisabled", "");

        let json = serde_json::to_string(&list).unwrap();
        let decoded: ConditionList = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, list);
    }

    #[test]
    fn test_unknown_status_survives_deserialization() {
        let json = r#"[{"type":"Ready","status":"Unknown"}]"#;
        let list: ConditionList = serde_json::from_str(json).unwrap();

        let condition: &Condition = list.get("Ready").unwrap();
        assert_eq!(condition.status, ConditionStatus::Unknown);
        assert!(!list.is_true("Ready"));
    }
}
