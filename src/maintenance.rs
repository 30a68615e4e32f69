// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cluster-wide maintenance mode control.
//!
//! Maintenance mode suspends the database cluster's own supervision, so the
//! operator can perform disruptive actions (upgrades, member replacement)
//! without the cluster fighting back. The flag is observed by reading a
//! well-known coordination store key and toggled through the cluster's
//! administrative HTTP API.
//!
//! Reading follows presence-of-key semantics: any successful read means
//! maintenance is enabled, regardless of the stored value. Writes are
//! last-writer-wins at the protocol level; callers that need ordering must
//! serialize themselves.

use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use crate::constants::{
    ADMIN_MAINTENANCE_PATH, MAINTENANCE_BODY_OFF, MAINTENANCE_BODY_ON, MAINTENANCE_KEY_PATH,
};
use crate::coordination::{CoordinationStore, StoreError};

/// Read the cluster-wide maintenance flag from the coordination store.
///
/// The key being present enables maintenance mode no matter what value it
/// holds; a missing key means maintenance is disabled and is not a failure.
///
/// # Errors
///
/// Any store error other than key-not-found propagates unmodified so the
/// caller can decide on logging or requeueing.
pub async fn get_maintenance_mode(store: &dyn CoordinationStore) -> Result<bool, StoreError> {
    match store.read_key(&MAINTENANCE_KEY_PATH).await {
        Ok(_) => Ok(true),
        Err(err) if err.is_key_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}

/// Errors returned by the cluster admin API.
#[derive(Debug, Error)]
pub enum AdminError {
    /// The HTTP request itself failed (connection, timeout, malformed request).
    #[error("cluster admin request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The cluster answered with anything but 200 OK.
    #[error("cluster admin request returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

/// Client for the database cluster's administrative HTTP API.
pub struct ClusterAdminClient {
    base: String,
    client: reqwest::Client,
}

impl ClusterAdminClient {
    /// Create a client against the given base endpoint.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Toggle cluster-wide maintenance mode.
    ///
    /// Issues `PUT /_admin/cluster/maintenance` with the literal body `on` or
    /// `off` and succeeds only on a 200 answer. The operation is idempotent at
    /// the protocol level but not compare-and-swap; concurrent callers race
    /// with last-writer-wins semantics.
    ///
    /// # Errors
    ///
    /// Transport errors and non-200 statuses are returned as errors and are
    /// not retried here; retry policy belongs to the caller.
    pub async fn set_maintenance_mode(&self, enabled: bool) -> Result<(), AdminError> {
        let body = if enabled {
            MAINTENANCE_BODY_ON
        } else {
            MAINTENANCE_BODY_OFF
        };
        let url = format!(
            "{}{}",
            self.base.trim_end_matches('/'),
            ADMIN_MAINTENANCE_PATH
        );
        debug!(%url, body, "setting cluster maintenance mode");

        let response = self.client.put(&url).body(body).send().await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(AdminError::UnexpectedStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "maintenance_tests.rs"]
mod maintenance_tests;
