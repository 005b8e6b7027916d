//! In-memory connection registry.
//!
//! One `tokio::sync::Mutex` guards the whole map together with the ordering
//! counter and the presence version. Every operation takes the lock exactly
//! once and never awaits anything else while holding it.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{ConnectionId, ConnectionRegistry, Identity, PresenceSnapshot};

struct RegistryEntry {
    identity: Identity,
    /// Position in registration order.
    order: u64,
}

#[derive(Default)]
struct RegistryState {
    entries: HashMap<ConnectionId, RegistryEntry>,
    next_order: u64,
    /// Bumped by every mutation that changes `entries`.
    version: u64,
}

impl RegistryState {
    /// Distinct identities in the registration order of their earliest live
    /// connection.
    fn snapshot(&self) -> PresenceSnapshot {
        let mut entries: Vec<&RegistryEntry> = self.entries.values().collect();
        entries.sort_by_key(|entry| entry.order);

        let mut seen = HashSet::new();
        let identities = entries
            .into_iter()
            .filter(|entry| seen.insert(entry.identity.user_id.clone()))
            .map(|entry| entry.identity.clone())
            .collect();

        PresenceSnapshot::new(self.version, identities)
    }
}

/// `ConnectionRegistry` backed by a `HashMap` behind a single mutex.
#[derive(Default)]
pub struct InMemoryConnectionRegistry {
    state: Mutex<RegistryState>,
}

impl InMemoryConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(&self, connection_id: ConnectionId, identity: Identity) -> PresenceSnapshot {
        let mut state = self.state.lock().await;

        let order = state.next_order;
        state.next_order += 1;
        state.version += 1;

        let user_id = identity.user_id.clone();
        let previous = state
            .entries
            .insert(connection_id.clone(), RegistryEntry { identity, order });

        match previous {
            Some(previous) if previous.identity.user_id != user_id => tracing::warn!(
                "Connection '{}' re-registered: identity '{}' replaced by '{}'",
                connection_id,
                previous.identity.user_id,
                user_id
            ),
            Some(_) => tracing::warn!(
                "Connection '{}' re-registered for identity '{}'",
                connection_id,
                user_id
            ),
            None => tracing::debug!(
                "Connection '{}' registered for identity '{}'",
                connection_id,
                user_id
            ),
        }

        state.snapshot()
    }

    async fn remove(&self, connection_id: &ConnectionId) -> Option<PresenceSnapshot> {
        let mut state = self.state.lock().await;

        let removed = state.entries.remove(connection_id)?;
        state.version += 1;
        tracing::debug!(
            "Connection '{}' removed (identity '{}')",
            connection_id,
            removed.identity.user_id
        );

        Some(state.snapshot())
    }

    async fn snapshot(&self) -> PresenceSnapshot {
        self.state.lock().await.snapshot()
    }

    async fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.state.lock().await.entries.contains_key(connection_id)
    }

    async fn connection_count(&self) -> usize {
        self.state.lock().await.entries.len()
    }
}
