// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Client for the QuorumDB coordination store.
//!
//! The coordination store is the consistent key-value store the database cluster
//! keeps its distributed state in (supervision flags, leadership leases of the
//! database itself). The operator only ever reads well-known keys from it; the
//! trait seam keeps the transport swappable and the reconcilers testable.
//!
//! A missing key is a normal outcome for several supervision flags, so
//! [`StoreError::KeyNotFound`] is distinguished from transport and protocol
//! failures, which propagate unmodified.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors returned by coordination store reads.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The key does not exist. Expected for optional supervision flags.
    #[error("key not found: {path}")]
    KeyNotFound { path: String },

    /// The HTTP request itself failed (connection, timeout, malformed request).
    #[error("coordination store request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The store answered with an unexpected status code.
    #[error("coordination store returned {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

impl StoreError {
    /// Whether this error is the distinguished key-not-found outcome.
    #[must_use]
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, StoreError::KeyNotFound { .. })
    }
}

/// Read access to the coordination store.
#[async_trait]
pub trait CoordinationStore: Send + Sync {
    /// Read the value stored at the hierarchical key `path`.
    ///
    /// # Errors
    ///
    /// [`StoreError::KeyNotFound`] when the key does not exist; any other
    /// variant for transport or protocol failures.
    async fn read_key(&self, path: &[&str]) -> Result<Value, StoreError>;
}

/// HTTP-backed coordination store client.
///
/// Keys are exposed by the database cluster under `/v1/kv/<path>`; a 404
/// answer maps to [`StoreError::KeyNotFound`].
pub struct HttpCoordinationStore {
    base: String,
    client: reqwest::Client,
}

impl HttpCoordinationStore {
    /// Create a client against the given base endpoint.
    #[must_use]
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client reusing an existing `reqwest::Client`.
    #[must_use]
    pub fn with_client(base: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base: base.into(),
            client,
        }
    }

    fn key_url(&self, path: &[&str]) -> String {
        format!("{}/v1/kv/{}", self.base.trim_end_matches('/'), path.join("/"))
    }
}

#[async_trait]
impl CoordinationStore for HttpCoordinationStore {
    async fn read_key(&self, path: &[&str]) -> Result<Value, StoreError> {
        let url = self.key_url(path);
        debug!(%url, "reading coordination store key");

        let response = self.client.get(&url).send().await?;
        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            StatusCode::NOT_FOUND => Err(StoreError::KeyNotFound {
                path: path.join("/"),
            }),
            status => Err(StoreError::UnexpectedStatus {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "coordination_tests.rs"]
mod coordination_tests;
