//! Connection registry trait.
//!
//! The registry is the single source of truth for who is connected. The gateway
//! only sees it through this trait; no caller ever holds the underlying map.

use async_trait::async_trait;

use super::{ConnectionId, Identity, PresenceSnapshot};

/// Map from live connection id to verified identity.
///
/// All operations share one synchronization boundary, so a snapshot never
/// observes a half-applied `register` or `remove`. Several connections may map
/// to the same identity; only connection ids are unique.
#[async_trait]
pub trait ConnectionRegistry: Send + Sync {
    /// Insert or overwrite the entry for `connection_id` and return the
    /// presence snapshot right after the insertion.
    async fn register(&self, connection_id: ConnectionId, identity: Identity) -> PresenceSnapshot;

    /// Delete the entry for `connection_id`.
    ///
    /// Returns the snapshot right after the removal, or `None` when there was
    /// nothing to remove (duplicate close signals are tolerated).
    async fn remove(&self, connection_id: &ConnectionId) -> Option<PresenceSnapshot>;

    /// Copy of the currently registered identities.
    async fn snapshot(&self) -> PresenceSnapshot;

    async fn contains(&self, connection_id: &ConnectionId) -> bool;

    /// Number of registered connections (not distinct identities).
    async fn connection_count(&self) -> usize;
}
