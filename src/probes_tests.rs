// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `probes.rs`

#[cfg(test)]
mod tests {
    use crate::probes::{LivenessProbe, ReadyProbe};

    #[test]
    fn test_ready_probe_starts_not_ready() {
        let probe = ReadyProbe::new();
        assert!(!probe.is_ready());
    }

    #[test]
    fn test_ready_probe_flips() {
        let probe = ReadyProbe::new();
        probe.set_ready(true);
        assert!(probe.is_ready());
        probe.set_ready(false);
        assert!(!probe.is_ready());
    }

    #[test]
    fn test_liveness_probe_starts_healthy() {
        let probe = LivenessProbe::new();
        assert!(probe.is_healthy());
    }

    #[test]
    fn test_liveness_probe_flips() {
        let probe = LivenessProbe::new();
        probe.set_healthy(false);
        assert!(!probe.is_healthy());
        probe.set_healthy(true);
        assert!(probe.is_healthy());
    }
}
