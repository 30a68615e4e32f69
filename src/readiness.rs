// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prerequisite readiness gate for domain reconcilers.
//!
//! Before a domain starts reconciling, its prerequisites must be in place;
//! chiefly the custom resource definitions a cluster administrator installs out
//! of band. Prerequisite unavailability is a transient, externally resolvable
//! condition, never a fatal error: the gate retries on a fixed interval with no
//! upper bound, so a misconfigured cluster degrades to permanent retrying
//! instead of crash-looping the operator.
//!
//! The backoff sleep observes the stop signal so shutdown is never delayed by
//! a full retry interval.

use anyhow::Context;
use async_trait::async_trait;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::CustomResourceDefinition;
use kube::{Api, Client};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info};

use crate::constants::INIT_RETRY_WAIT_SECS;
use crate::metrics;

/// How a gate wait ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateOutcome {
    /// All prerequisites are available.
    Satisfied,
    /// The stop signal fired before the prerequisites became available.
    Stopped,
}

/// One prerequisite a domain needs before reconciling.
#[async_trait]
pub trait PrerequisiteCheck: Send + Sync {
    /// Human-readable description used in logs.
    fn describe(&self) -> String;

    /// Probe the prerequisite once. No side effects beyond the probe.
    async fn check(&self) -> anyhow::Result<()>;
}

/// Retrying gate with a fixed, interruptible backoff interval.
pub struct ReadinessGate {
    interval: Duration,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    /// Gate with the production retry interval.
    #[must_use]
    pub fn new() -> Self {
        Self::with_interval(Duration::from_secs(INIT_RETRY_WAIT_SECS))
    }

    /// Gate with a custom retry interval, used for deterministic tests.
    #[must_use]
    pub fn with_interval(interval: Duration) -> Self {
        Self { interval }
    }

    /// Block until `check` succeeds or `stop` fires.
    ///
    /// Failures are logged and retried indefinitely; success returns
    /// immediately without further side effects.
    pub async fn wait(
        &self,
        domain: &str,
        check: &dyn PrerequisiteCheck,
        stop: &mut watch::Receiver<bool>,
    ) -> GateOutcome {
        enum Phase {
            Checking,
            Backoff,
        }

        let mut phase = Phase::Checking;
        loop {
            if *stop.borrow() {
                return GateOutcome::Stopped;
            }

            match phase {
                Phase::Checking => match check.check().await {
                    Ok(()) => return GateOutcome::Satisfied,
                    Err(err) => {
                        error!(
                            domain,
                            prerequisites = %check.describe(),
                            error = %format!("{err:#}"),
                            "resource initialization failed"
                        );
                        info!(domain, "retrying in {:?}...", self.interval);
                        metrics::record_readiness_retry(domain);
                        phase = Phase::Backoff;
                    }
                },
                Phase::Backoff => {
                    tokio::select! {
                        changed = stop.changed() => {
                            if changed.is_err() || *stop.borrow() {
                                return GateOutcome::Stopped;
                            }
                        }
                        () = tokio::time::sleep(self.interval) => {
                            phase = Phase::Checking;
                        }
                    }
                }
            }
        }
    }
}

/// Prerequisite check verifying that named CRDs are installed and established.
pub struct CrdEstablished {
    client: Client,
    crd_names: Vec<String>,
}

impl CrdEstablished {
    /// Check for the given fully qualified CRD names.
    #[must_use]
    pub fn new(client: Client, crd_names: &[&str]) -> Self {
        Self {
            client,
            crd_names: crd_names.iter().map(ToString::to_string).collect(),
        }
    }
}

#[async_trait]
impl PrerequisiteCheck for CrdEstablished {
    fn describe(&self) -> String {
        self.crd_names.join(", ")
    }

    async fn check(&self) -> anyhow::Result<()> {
        let api: Api<CustomResourceDefinition> = Api::all(self.client.clone());
        for name in &self.crd_names {
            let crd = api
                .get(name)
                .await
                .with_context(|| format!("resource definition {name} is not installed"))?;

            let established = crd
                .status
                .as_ref()
                .and_then(|status| status.conditions.as_ref())
                .is_some_and(|conditions| {
                    conditions
                        .iter()
                        .any(|c| c.type_ == "Established" && c.status == "True")
                });
            anyhow::ensure!(established, "resource definition {name} is not established");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod readiness_tests;
