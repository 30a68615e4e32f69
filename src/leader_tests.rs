// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `leader.rs`

#[cfg(test)]
mod tests {
    use crate::leader::Leadership;
    use std::time::Duration;
    use tokio::sync::watch;
    use tokio::time::timeout;

    #[tokio::test]
    async fn test_is_leader_reflects_channel_state() {
        let (tx, rx) = watch::channel(false);
        let mut leadership = Leadership::from_channel(rx);

        assert!(!leadership.is_leader());

        tx.send(true).unwrap();
        assert!(leadership.is_leader());

        tx.send(false).unwrap();
        assert!(!leadership.is_leader());
    }

    #[tokio::test]
    async fn test_changed_returns_new_state() {
        let (tx, rx) = watch::channel(false);
        let mut leadership = Leadership::from_channel(rx);

        tx.send(true).unwrap();
        let state = timeout(Duration::from_secs(1), leadership.changed())
            .await
            .expect("changed() should resolve")
            .unwrap();
        assert!(state);

        tx.send(false).unwrap();
        let state = timeout(Duration::from_secs(1), leadership.changed())
            .await
            .expect("changed() should resolve")
            .unwrap();
        assert!(!state);
    }

    #[tokio::test]
    async fn test_changed_fails_when_session_ends() {
        let (tx, rx) = watch::channel(true);
        let mut leadership = Leadership::from_channel(rx);
        drop(tx);

        let result = timeout(Duration::from_secs(1), leadership.changed())
            .await
            .expect("changed() should resolve");
        assert!(result.is_err(), "a closed session must surface as an error");
    }

    #[tokio::test]
    async fn test_changed_blocks_until_a_change_happens() {
        let (_tx, rx) = watch::channel(false);
        let mut leadership = Leadership::from_channel(rx);

        let result = timeout(Duration::from_millis(50), leadership.changed()).await;
        assert!(result.is_err(), "no change was sent, changed() must block");
    }
}
