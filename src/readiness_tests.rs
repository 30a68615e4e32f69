// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `readiness.rs`

#[cfg(test)]
mod tests {
    use crate::readiness::{GateOutcome, PrerequisiteCheck, ReadinessGate};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio::time::timeout;

    /// Check failing a fixed number of times before succeeding.
    struct FlakyCheck {
        calls: Arc<AtomicUsize>,
        failures: usize,
    }

    #[async_trait]
    impl PrerequisiteCheck for FlakyCheck {
        fn describe(&self) -> String {
            "flaky".to_string()
        }

        async fn check(&self) -> anyhow::Result<()> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                anyhow::bail!("prerequisite missing (attempt {call})");
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_immediate_success_skips_backoff() {
        let calls = Arc::new(AtomicUsize::new(0));
        let check = FlakyCheck {
            calls: calls.clone(),
            failures: 0,
        };
        let (_stop_tx, mut stop_rx) = watch::channel(false);

        let gate = ReadinessGate::with_interval(Duration::from_secs(60));
        let outcome = timeout(
            Duration::from_millis(200),
            gate.wait("cluster", &check, &mut stop_rx),
        )
        .await
        .expect("an immediately satisfied gate must not sleep");

        assert_eq!(outcome, GateOutcome::Satisfied);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_until_prerequisite_appears() {
        let calls = Arc::new(AtomicUsize::new(0));
        let check = FlakyCheck {
            calls: calls.clone(),
            failures: 2,
        };
        let (_stop_tx, mut stop_rx) = watch::channel(false);

        let gate = ReadinessGate::with_interval(Duration::from_millis(10));
        let outcome = timeout(
            Duration::from_secs(5),
            gate.wait("cluster", &check, &mut stop_rx),
        )
        .await
        .expect("gate should converge");

        assert_eq!(outcome, GateOutcome::Satisfied);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_stop_interrupts_the_backoff_sleep() {
        let calls = Arc::new(AtomicUsize::new(0));
        let check = FlakyCheck {
            calls: calls.clone(),
            failures: usize::MAX,
        };
        let (stop_tx, mut stop_rx) = watch::channel(false);

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            let _ = stop_tx.send(true);
        });

        // A one hour interval: only an interruptible sleep lets this finish.
        let gate = ReadinessGate::with_interval(Duration::from_secs(3600));
        let outcome = timeout(
            Duration::from_secs(2),
            gate.wait("storage", &check, &mut stop_rx),
        )
        .await
        .expect("stop must interrupt the backoff promptly");

        assert_eq!(outcome, GateOutcome::Stopped);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_already_stopped_gate_returns_without_checking() {
        let calls = Arc::new(AtomicUsize::new(0));
        let check = FlakyCheck {
            calls: calls.clone(),
            failures: 0,
        };
        let (stop_tx, mut stop_rx) = watch::channel(false);
        stop_tx.send(true).unwrap();

        let gate = ReadinessGate::with_interval(Duration::from_millis(10));
        let outcome = gate.wait("replication", &check, &mut stop_rx).await;

        assert_eq!(outcome, GateOutcome::Stopped);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
