// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Generic status conditions for QuorumDB resources.
//!
//! Every managed resource reports observed state transitions through an ordered
//! list of named conditions in its status subresource. The list is generic over
//! resource kinds: the same machinery backs `QuorumCluster`, `QuorumReplication`
//! and `QuorumLocalStorage`.
//!
//! Reconcilers call [`ConditionList::update`] unconditionally on every loop tick.
//! The update is an idempotent upsert: it reports whether anything materially
//! changed so callers can skip the status write (and the resulting watch event)
//! when nothing did.
//!
//! # Example
//!
//! ```rust
//! use quorumdb_operator::conditions::{ConditionList, ConditionStatus};
//!
//! let mut conditions = ConditionList::default();
//! assert!(conditions.update("Configured", true, "Init", "replication configured"));
//! assert!(!conditions.update("Configured", true, "Init", "replication configured"));
//! assert!(conditions.is_true("Configured"));
//! ```

use k8s_openapi::apimachinery::pkg::apis::meta::v1::Time;
use k8s_openapi::jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Status of a condition: `True`, `False` or `Unknown`.
///
/// [`ConditionList::update`] only ever produces `True` or `False`; `Unknown` exists
/// for externally written conditions and absent-transition states, and is preserved
/// on deserialization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ConditionStatus {
    /// The condition is known to hold.
    True,
    /// The condition is known not to hold.
    False,
    /// The state of the condition cannot be determined.
    #[default]
    Unknown,
}

impl From<bool> for ConditionStatus {
    fn from(value: bool) -> Self {
        if value {
            ConditionStatus::True
        } else {
            ConditionStatus::False
        }
    }
}

/// One observed fact about a resource.
///
/// A condition might not show up if it is not happening. For example, a cluster
/// that is not paused for maintenance may simply not carry the
/// `ReconciliationPaused` condition.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Condition {
    /// Type of condition, unique within the owning list.
    pub r#type: String,

    /// Status of the condition, one of True, False, Unknown.
    pub status: ConditionStatus,

    /// The last time this condition was updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_update_time: Option<Time>,

    /// Last time the condition transitioned from one status to another.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_transition_time: Option<Time>,

    /// Brief CamelCase reason for the condition's last transition.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,

    /// Human-readable message indicating details about the transition.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
}

/// Ordered list of conditions, each type allowed only once.
///
/// Order is insertion order; it carries no meaning beyond stable iteration for
/// display. The list is owned by a single resource's status object and mutated
/// only by that resource's reconcile loop.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct ConditionList(Vec<Condition>);

impl ConditionList {
    /// Create an empty condition list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a condition by type.
    ///
    /// Linear lookup with no side effects; returns `None` if absent.
    #[must_use]
    pub fn get(&self, condition_type: &str) -> Option<&Condition> {
        self.0.iter().find(|c| c.r#type == condition_type)
    }

    /// Return `true` when a condition with the given type exists and its status is `True`.
    #[must_use]
    pub fn is_true(&self, condition_type: &str) -> bool {
        self.get(condition_type)
            .is_some_and(|c| c.status == ConditionStatus::True)
    }

    /// Update the condition, replacing an old condition with the same type (if any).
    ///
    /// Idempotent upsert:
    ///
    /// - absent type: appended with both timestamps set to now
    /// - status change: both timestamps advance, reason and message replaced
    /// - reason or message change only: `lastUpdateTime` advances, the transition
    ///   time is preserved
    /// - nothing changed: the list is left untouched
    ///
    /// Returns `true` when changes were made, `false` otherwise. A `false` return
    /// means there is nothing to persist.
    pub fn update(
        &mut self,
        condition_type: &str,
        status: bool,
        reason: &str,
        message: &str,
    ) -> bool {
        let status = ConditionStatus::from(status);

        if let Some(existing) = self.0.iter_mut().find(|c| c.r#type == condition_type) {
            if existing.status != status {
                // Transition to another status
                let now = Time(Timestamp::now());
                existing.status = status;
                existing.last_transition_time = Some(now.clone());
                existing.last_update_time = Some(now);
                existing.reason = reason.to_string();
                existing.message = message.to_string();
            } else if existing.reason != reason || existing.message != message {
                existing.last_update_time = Some(Time(Timestamp::now()));
                existing.reason = reason.to_string();
                existing.message = message.to_string();
            } else {
                return false;
            }
            return true;
        }

        // Not found
        let now = Time(Timestamp::now());
        self.0.push(Condition {
            r#type: condition_type.to_string(),
            status,
            last_update_time: Some(now.clone()),
            last_transition_time: Some(now),
            reason: reason.to_string(),
            message: message.to_string(),
        });
        true
    }

    /// Remove the condition with the given type, preserving the relative order
    /// of the remaining entries.
    ///
    /// Returns `true` if removed, or `false` if not found.
    pub fn remove(&mut self, condition_type: &str) -> bool {
        let before = self.0.len();
        self.0.retain(|c| c.r#type != condition_type);
        self.0.len() != before
    }

    /// Iterate the conditions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Condition> {
        self.0.iter()
    }

    /// Number of conditions in the list.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the list holds no conditions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
#[path = "conditions_tests.rs"]
mod conditions_tests;
