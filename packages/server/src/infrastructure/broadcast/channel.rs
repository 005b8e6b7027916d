//! `BroadcastBus` over per-connection unbounded channels.
//!
//! The websocket handler creates one channel per connection and keeps the
//! receiving half in its writer task. The bus only holds the senders, so a send
//! is a non-blocking enqueue and a slow socket never delays other peers.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    BroadcastBus, BroadcastReport, ChatMessage, ConnectionId, PeerChannel, PresenceSnapshot,
    ServerEvent,
};

/// Channel-backed broadcast bus.
#[derive(Default)]
pub struct ChannelBroadcastBus {
    /// Senders of the currently active connections.
    peers: Mutex<HashMap<ConnectionId, PeerChannel>>,
}

impl ChannelBroadcastBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn peer_count(&self) -> usize {
        self.peers.lock().await.len()
    }

    async fn fan_out(&self, event: ServerEvent) -> BroadcastReport {
        let peers = self.peers.lock().await;
        let mut report = BroadcastReport::default();

        for (connection_id, sender) in peers.iter() {
            // one failed peer never aborts the rest
            match sender.send(event.clone()) {
                Ok(()) => {
                    report.delivered += 1;
                    tracing::debug!("Pushed event to connection '{}'", connection_id);
                }
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        "Failed to push event to connection '{}': {}",
                        connection_id,
                        e
                    );
                }
            }
        }

        report
    }
}

#[async_trait]
impl BroadcastBus for ChannelBroadcastBus {
    async fn attach(&self, connection_id: ConnectionId, channel: PeerChannel) {
        tracing::debug!("Connection '{}' attached to broadcast bus", connection_id);
        self.peers.lock().await.insert(connection_id, channel);
    }

    async fn detach(&self, connection_id: &ConnectionId) {
        if self.peers.lock().await.remove(connection_id).is_some() {
            tracing::debug!("Connection '{}' detached from broadcast bus", connection_id);
        }
    }

    async fn broadcast_presence(&self, snapshot: &PresenceSnapshot) -> BroadcastReport {
        let report = self
            .fan_out(ServerEvent::PresenceUpdated(snapshot.clone()))
            .await;
        tracing::info!(
            "Broadcasted presence v{} ({} clients) to {} peers ({} failed)",
            snapshot.version,
            snapshot.identities.len(),
            report.delivered,
            report.failed
        );
        report
    }

    async fn broadcast_message(&self, message: &ChatMessage) -> BroadcastReport {
        let report = self.fan_out(ServerEvent::Message(message.clone())).await;
        tracing::info!(
            "Broadcasted message from '{}' to {} peers ({} failed)",
            message.display_name,
            report.delivered,
            report.failed
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Identity, MessageContent, UserId};
    use tokio::sync::mpsc;

    fn conn(id: &str) -> ConnectionId {
        ConnectionId::new(id.to_string()).unwrap()
    }

    fn snapshot(version: u64, users: &[&str]) -> PresenceSnapshot {
        PresenceSnapshot::new(
            version,
            users
                .iter()
                .map(|u| Identity::new(UserId::new(u.to_string()).unwrap()))
                .collect(),
        )
    }

    fn chat(text: &str) -> ChatMessage {
        ChatMessage {
            display_name: "alice".to_string(),
            content: MessageContent::new(text.to_string()).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_broadcast_presence_reaches_every_peer() {
        // given:
        let bus = ChannelBroadcastBus::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        bus.attach(conn("c1"), tx1).await;
        bus.attach(conn("c2"), tx2).await;
        let presence = snapshot(1, &["alice", "bob"]);

        // when:
        let report = bus.broadcast_presence(&presence).await;

        // then:
        assert_eq!(report, BroadcastReport { delivered: 2, failed: 0 });
        let expected = ServerEvent::PresenceUpdated(presence);
        assert_eq!(rx1.recv().await, Some(expected.clone()));
        assert_eq!(rx2.recv().await, Some(expected));
    }

    #[tokio::test]
    async fn test_broadcast_message_includes_sender() {
        // given: c1 is the sender and also attached
        let bus = ChannelBroadcastBus::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        bus.attach(conn("c1"), tx1).await;

        // when:
        bus.broadcast_message(&chat("hi")).await;

        // then:
        assert_eq!(rx1.recv().await, Some(ServerEvent::Message(chat("hi"))));
    }

    #[tokio::test]
    async fn test_dead_peer_does_not_abort_broadcast() {
        // given: c1's receiver is gone
        let bus = ChannelBroadcastBus::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        bus.attach(conn("c1"), tx1).await;
        bus.attach(conn("c2"), tx2).await;
        drop(rx1);

        // when:
        let report = bus.broadcast_message(&chat("still here")).await;

        // then: c2 gets it, c1 is reported but stays attached
        assert_eq!(report, BroadcastReport { delivered: 1, failed: 1 });
        assert_eq!(rx2.recv().await, Some(ServerEvent::Message(chat("still here"))));
        assert_eq!(bus.peer_count().await, 2);
    }

    #[tokio::test]
    async fn test_detached_peer_receives_nothing() {
        // given:
        let bus = ChannelBroadcastBus::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        bus.attach(conn("c1"), tx1).await;

        // when:
        bus.detach(&conn("c1")).await;
        bus.detach(&conn("c1")).await;
        let report = bus.broadcast_presence(&snapshot(2, &[])).await;

        // then:
        assert_eq!(report, BroadcastReport::default());
        assert!(rx1.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_broadcast_with_no_peers() {
        let bus = ChannelBroadcastBus::new();

        let report = bus.broadcast_message(&chat("anyone?")).await;

        assert_eq!(report, BroadcastReport::default());
    }
}
