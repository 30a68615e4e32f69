// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Standard Kubernetes status condition reasons for QuorumDB resources.
//!
//! This module defines constants for condition reasons following Kubernetes conventions.
//! Reasons are programmatic identifiers in CamelCase that explain why a condition has
//! a particular status.
//!
//! # Condition Types
//!
//! Every managed resource reports its observed state through the generic condition
//! list in its status subresource:
//!
//! - `QuorumCluster`: `Configured` plus `ReconciliationPaused` while the cluster-wide
//!   maintenance flag is raised
//! - `QuorumReplication`: `Configured` once both endpoints of the replication link
//!   are accepted
//! - `QuorumLocalStorage`: `Ready` once the storage class registration is accepted
//!
//! # Example Status
//!
//! ```yaml
//! status:
//!   conditions:
//!     - type: Configured
//!       status: "True"
//!       reason: Configured
//!       message: "Cluster spec accepted, 3 servers"
//!     - type: ReconciliationPaused
//!       status: "False"
//!       reason: MaintenanceDisabled
//!       message: "Supervision maintenance flag is not set"
//! ```

// ============================================================================
// Condition Types
// ============================================================================

/// Primary condition type indicating overall resource readiness.
pub const CONDITION_TYPE_READY: &str = "Ready";

/// Condition type indicating that a resource spec has been accepted and configured.
pub const CONDITION_TYPE_CONFIGURED: &str = "Configured";

/// Condition type raised while cluster-wide maintenance suspends reconciliation.
pub const CONDITION_TYPE_PAUSED: &str = "ReconciliationPaused";

// ============================================================================
// Common Reasons
// ============================================================================

/// Resource spec has been validated and accepted.
pub const REASON_CONFIGURED: &str = "Configured";

/// Resource spec failed validation.
pub const REASON_CONFIGURATION_INVALID: &str = "ConfigurationInvalid";

/// Resources are being created or updated.
pub const REASON_PROGRESSING: &str = "Progressing";

/// Resource is ready and operational.
pub const REASON_READY: &str = "Ready";

// ============================================================================
// Maintenance Reasons
// ============================================================================

/// The cluster-wide supervision maintenance flag is set.
///
/// While this reason is reported, automated supervisory actions against the
/// database cluster are suspended.
pub const REASON_MAINTENANCE_ENABLED: &str = "MaintenanceEnabled";

/// The cluster-wide supervision maintenance flag is not set.
pub const REASON_MAINTENANCE_DISABLED: &str = "MaintenanceDisabled";

// ============================================================================
// Event Reasons
// ============================================================================

/// Event reason recorded when the observed maintenance mode transitions.
pub const EVENT_REASON_MAINTENANCE_CHANGED: &str = "MaintenanceChanged";

/// Event action recorded with maintenance transitions.
pub const EVENT_ACTION_OBSERVE_MAINTENANCE: &str = "ObserveMaintenance";
