// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # QuorumDB Operator - control plane for QuorumDB clusters on Kubernetes
//!
//! This library provides the control plane of a Kubernetes operator managing
//! distributed QuorumDB database clusters. It continuously reconciles four
//! independent resource domains - cluster deployments, cross-cluster
//! replication links, local storage provisioning and database administration -
//! while guaranteeing that only one operator replica actively reconciles a
//! given domain at a time.
//!
//! ## Architecture
//!
//! Each enabled domain runs behind its own [`supervisor::DomainSupervisor`]:
//! a leader-election session (Kubernetes `Lease` objects) wraps a
//! prerequisite [`readiness::ReadinessGate`] and the domain's reconcile entry
//! point. Managed resources report observed state through the generic
//! [`conditions::ConditionList`] with idempotent, timestamped updates.
//!
//! ## Modules
//!
//! - [`crd`] - Custom Resource Definition types for QuorumDB resources
//! - [`conditions`] - Generic status condition state machine
//! - [`operator`] - Process-wide coordinator: config, dependencies, registries
//! - [`supervisor`] - Per-domain leader-elected supervision
//! - [`leader`] - Leader election capability and the Lease-backed provider
//! - [`readiness`] - Prerequisite gate with fixed-interval indefinite retry
//! - [`reconcilers`] - Per-domain controllers and the maintenance observer
//! - [`coordination`] / [`maintenance`] - Database cluster coordination store
//!   and maintenance mode control
//!
//! ## Example
//!
//! ```rust,no_run
//! use quorumdb_operator::conditions::ConditionList;
//!
//! let mut conditions = ConditionList::default();
//! if conditions.update("Configured", true, "Init", "cluster configured") {
//!     // something changed, persist the status
//! }
//! ```

pub mod conditions;
pub mod constants;
pub mod coordination;
pub mod crd;
pub mod leader;
pub mod maintenance;
pub mod metrics;
pub mod operator;
pub mod probes;
pub mod readiness;
pub mod reconcilers;
pub mod registry;
pub mod status_reasons;
pub mod supervisor;
