//! Broadcast bus trait.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{ChatMessage, ConnectionId, PresenceSnapshot, ServerEvent};

/// Outbound channel of one peer. Sends never block.
pub type PeerChannel = mpsc::UnboundedSender<ServerEvent>;

/// Outcome of a single fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Fans events out to every active connection.
///
/// Delivery is best-effort and at-most-once: a failing peer is logged and
/// skipped, never retried, and never aborts delivery to the others.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BroadcastBus: Send + Sync {
    /// Start delivering to `connection_id` through `channel`.
    async fn attach(&self, connection_id: ConnectionId, channel: PeerChannel);

    /// Stop delivering to `connection_id`. Detaching an unknown id is a no-op.
    async fn detach(&self, connection_id: &ConnectionId);

    /// Send `clients-updated` carrying `snapshot` to every attached peer.
    async fn broadcast_presence(&self, snapshot: &PresenceSnapshot) -> BroadcastReport;

    /// Send `message-from-server` to every attached peer, sender included.
    async fn broadcast_message(&self, message: &ChatMessage) -> BroadcastReport;
}
