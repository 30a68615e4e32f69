// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Database-admin domain: the maintenance mode observer.
//!
//! The admin domain carries no CRD of its own. Its reconcile loop periodically
//! reads the cluster-wide supervision maintenance flag, mirrors it into the
//! metrics gauge, and records an event whenever the observed mode transitions.
//! Store errors are transient from this loop's perspective: they are logged
//! and the next poll tries again.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::constants::MAINTENANCE_POLL_INTERVAL_SECS;
use crate::coordination::CoordinationStore;
use crate::maintenance::get_maintenance_mode;
use crate::metrics;
use crate::supervisor::ReconcileEntrypoint;

use super::EventPublisher;

/// Entry point running the maintenance observer until cancelled.
pub struct AdminEntrypoint {
    pub store: Arc<dyn CoordinationStore>,
    pub interval: Duration,
    pub events: Option<EventPublisher>,
}

impl AdminEntrypoint {
    /// Observer with the production poll interval.
    #[must_use]
    pub fn new(store: Arc<dyn CoordinationStore>, events: Option<EventPublisher>) -> Self {
        Self {
            store,
            interval: Duration::from_secs(MAINTENANCE_POLL_INTERVAL_SECS),
            events,
        }
    }
}

#[async_trait]
impl ReconcileEntrypoint for AdminEntrypoint {
    async fn run(&self, mut stop: watch::Receiver<bool>) {
        info!("starting database-admin maintenance observer");

        let mut last_observed: Option<bool> = None;
        loop {
            if *stop.borrow() {
                break;
            }

            match get_maintenance_mode(self.store.as_ref()).await {
                Ok(enabled) => {
                    metrics::record_maintenance_mode(enabled);
                    if last_observed != Some(enabled) {
                        info!(enabled, "observed cluster maintenance mode");
                        if last_observed.is_some() {
                            if let Some(events) = &self.events {
                                events.maintenance_changed(enabled).await;
                            }
                        }
                        last_observed = Some(enabled);
                    }
                }
                Err(err) => {
                    warn!(error = %err, "failed to read maintenance mode");
                }
            }

            tokio::select! {
                changed = stop.changed() => {
                    if changed.is_err() || *stop.borrow() {
                        break;
                    }
                }
                () = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("database-admin maintenance observer stopped");
    }
}

#[cfg(test)]
#[path = "admin_tests.rs"]
mod admin_tests;
