// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `main.rs` - signal handling and graceful shutdown

#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio::time::timeout;

    /// Test that SIGTERM signal handler can be created on Unix platforms
    #[tokio::test]
    #[cfg(unix)]
    async fn test_sigterm_signal_handler_creation() {
        use tokio::signal::unix::{signal, SignalKind};

        let result = signal(SignalKind::terminate());
        assert!(
            result.is_ok(),
            "Should be able to create SIGTERM signal handler"
        );
    }

    /// Test that the Ctrl-C future is valid and does not resolve on its own
    #[tokio::test]
    async fn test_sigint_handler_exists() {
        let ctrl_c_future = tokio::signal::ctrl_c();

        let result = timeout(Duration::from_millis(100), ctrl_c_future).await;
        assert!(
            result.is_err(),
            "ctrl_c() future should time out when no signal is sent"
        );
    }

    /// The stop channel pattern used by main: one send reaches every receiver.
    #[tokio::test]
    async fn test_stop_channel_fans_out() {
        let (stop_tx, stop_rx) = watch::channel(false);
        let mut first = stop_rx.clone();
        let mut second = stop_rx;

        stop_tx.send(true).unwrap();

        timeout(Duration::from_millis(100), first.changed())
            .await
            .expect("first receiver should observe the stop")
            .unwrap();
        timeout(Duration::from_millis(100), second.changed())
            .await
            .expect("second receiver should observe the stop")
            .unwrap();

        assert!(*first.borrow());
        assert!(*second.borrow());
    }

    /// Late subscribers still observe an already-fired stop signal.
    #[tokio::test]
    async fn test_stop_state_is_visible_to_late_receivers() {
        let (stop_tx, stop_rx) = watch::channel(false);
        stop_tx.send(true).unwrap();

        let late = stop_rx.clone();
        assert!(*late.borrow(), "stop state must be latched, not edge-only");
    }
}
