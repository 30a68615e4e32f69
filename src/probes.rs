// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Liveness and readiness probe state.
//!
//! Each domain supervisor owns a [`ReadyProbe`] it flips as leadership and
//! prerequisites come and go; the health server aggregates them into the
//! `/readyz` answer so the operator Service only routes to the replica that is
//! actually reconciling.

use std::sync::atomic::{AtomicBool, Ordering};

/// Readiness flag for one reconciliation domain.
///
/// Not ready until the owning supervisor holds leadership and the domain's
/// prerequisites are satisfied.
#[derive(Debug, Default)]
pub struct ReadyProbe {
    ready: AtomicBool,
}

impl ReadyProbe {
    /// Probe starting out not ready.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the readiness state.
    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::SeqCst);
    }

    /// Current readiness state.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }
}

/// Process-wide liveness flag.
///
/// Healthy from startup; flipped only when the process reaches a state it
/// cannot recover from without a restart.
#[derive(Debug)]
pub struct LivenessProbe {
    healthy: AtomicBool,
}

impl Default for LivenessProbe {
    fn default() -> Self {
        Self {
            healthy: AtomicBool::new(true),
        }
    }
}

impl LivenessProbe {
    /// Probe starting out healthy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Flip the liveness state.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    /// Current liveness state.
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
#[path = "probes_tests.rs"]
mod probes_tests;
