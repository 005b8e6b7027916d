//! Events exchanged over the realtime channel.

use super::{Identity, MessageContent, UserId};

/// Identities holding at least one registered connection, taken atomically
/// with the registry mutation (or read) that produced it.
///
/// `version` increases with every registry mutation, so two snapshots can be
/// ordered even when their broadcasts race each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceSnapshot {
    pub version: u64,
    pub identities: Vec<Identity>,
}

impl PresenceSnapshot {
    pub fn new(version: u64, identities: Vec<Identity>) -> Self {
        Self {
            version,
            identities,
        }
    }

    pub fn user_ids(&self) -> Vec<&UserId> {
        self.identities.iter().map(|i| &i.user_id).collect()
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.identities.iter().any(|i| &i.user_id == user_id)
    }

    pub fn is_empty(&self) -> bool {
        self.identities.is_empty()
    }
}

/// A chat message attributed to its sender.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub display_name: String,
    pub content: MessageContent,
}

/// Events pushed from the server to connected peers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerEvent {
    /// `clients-updated`
    PresenceUpdated(PresenceSnapshot),
    /// `message-from-server`
    Message(ChatMessage),
}

/// Events received from a peer, decoded but not yet validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// `message-from-client`
    MessageFromClient { message: String },
}

/// Per-peer filter that keeps presence monotonic.
///
/// Presence events whose snapshot version is not newer than the last one let
/// through are dropped. Every other event passes.
#[derive(Debug, Default)]
pub struct PresenceGate {
    last_version: Option<u64>,
}

impl PresenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, event: &ServerEvent) -> bool {
        let ServerEvent::PresenceUpdated(snapshot) = event else {
            return true;
        };
        match self.last_version {
            Some(last) if snapshot.version <= last => false,
            _ => {
                self.last_version = Some(snapshot.version);
                true
            }
        }
    }

    pub fn last_version(&self) -> Option<u64> {
        self.last_version
    }
}
