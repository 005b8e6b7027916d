//! UseCase: realtime gateway
//!
//! Drives every transport session through the connection state machine:
//!
//! 1. `open`: the transport reported a new session. The credential taken from
//!    the handshake is required; without one the connection is closed at once.
//! 2. `authenticate`: verifies the credential without holding any lock, then
//!    re-checks the connection state before registering it. A session closed
//!    while verification was in flight is never registered.
//! 3. `handle_event`: validates inbound events of an `Active` connection and
//!    fans chat messages out to every active peer.
//! 4. `close`: removes the registry entry (idempotent) and re-broadcasts
//!    presence when the connection had been registered.
//!
//! Lock order is always connection -> registry/bus. Registry mutations happen
//! while the connection lock is held so that `close` cannot interleave between
//! the state check and the registration.

use std::sync::Arc;

use teslo_shared::time::{Clock, timestamp_to_rfc3339};
use tokio::sync::Mutex;

use crate::domain::{
    AuthError, BroadcastBus, BroadcastReport, ChatMessage, ClientEvent, Connection,
    ConnectionId, ConnectionRegistry, ConnectionState, IdentityVerifier, MessageContent,
    PeerChannel, PresenceSnapshot, Timestamp,
};

use super::error::GatewayError;

/// Gateway-side handle of one transport session.
pub struct ConnectionHandle {
    id: ConnectionId,
    credential: String,
    connection: Mutex<Connection>,
}

impl ConnectionHandle {
    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub async fn state(&self) -> ConnectionState {
        self.connection.lock().await.state()
    }

    pub async fn connected_at(&self) -> Option<Timestamp> {
        self.connection.lock().await.connected_at()
    }
}

/// Realtime protocol handler.
///
/// Constructed once and shared by every connection task; it holds no state of
/// its own besides the injected collaborators.
pub struct Gateway {
    verifier: Arc<dyn IdentityVerifier>,
    registry: Arc<dyn ConnectionRegistry>,
    bus: Arc<dyn BroadcastBus>,
    clock: Arc<dyn Clock>,
}

impl Gateway {
    pub fn new(
        verifier: Arc<dyn IdentityVerifier>,
        registry: Arc<dyn ConnectionRegistry>,
        bus: Arc<dyn BroadcastBus>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            registry,
            bus,
            clock,
        }
    }

    /// Accept a new transport session.
    ///
    /// # Returns
    ///
    /// * `Ok(handle)` - the connection is `Authenticating`
    /// * `Err(GatewayError::Auth(AuthError::MissingCredential))` - no credential
    ///   was presented; the connection is already `Closed` and the transport
    ///   must be closed
    pub fn open(
        &self,
        connection_id: ConnectionId,
        credential: Option<String>,
    ) -> Result<Arc<ConnectionHandle>, GatewayError> {
        let mut connection = Connection::new(connection_id.clone());
        connection.begin_authentication()?;

        let credential = match credential.filter(|c| !c.trim().is_empty()) {
            Some(credential) => credential,
            None => {
                connection.close();
                tracing::warn!(
                    "Connection '{}' rejected: no credential in handshake",
                    connection_id
                );
                return Err(GatewayError::Auth(AuthError::MissingCredential));
            }
        };

        tracing::debug!("Connection '{}' authenticating", connection_id);
        Ok(Arc::new(ConnectionHandle {
            id: connection_id,
            credential,
            connection: Mutex::new(connection),
        }))
    }

    /// Verify the handshake credential and, on success, activate and register
    /// the connection and broadcast the new presence snapshot.
    ///
    /// `channel` becomes the connection's outbound channel once it is active.
    pub async fn authenticate(
        &self,
        handle: &ConnectionHandle,
        channel: PeerChannel,
    ) -> Result<PresenceSnapshot, GatewayError> {
        // no lock is held across the verifier call
        let identity = match self.verifier.verify(&handle.credential).await {
            Ok(identity) => identity,
            Err(e) => {
                handle.connection.lock().await.close();
                tracing::warn!("Connection '{}' rejected: {}", handle.id, e);
                return Err(GatewayError::Auth(e));
            }
        };

        let mut connection = handle.connection.lock().await;
        if connection.is_closed() {
            tracing::info!(
                "Connection '{}' closed during authentication, discarding identity '{}'",
                handle.id,
                identity.user_id
            );
            return Err(GatewayError::ConnectionClosed);
        }

        let connected_at = Timestamp::new(self.clock.now_millis());
        connection.activate(identity.clone(), connected_at)?;
        self.bus.attach(handle.id.clone(), channel).await;
        let snapshot = self.registry.register(handle.id.clone(), identity.clone()).await;
        drop(connection);

        tracing::info!(
            "Connection '{}' active as '{}' since {}",
            handle.id,
            identity.user_id,
            timestamp_to_rfc3339(connected_at.value())
        );

        self.bus.broadcast_presence(&snapshot).await;
        Ok(snapshot)
    }

    /// Handle one inbound event of an active connection.
    ///
    /// A malformed event is rejected with `GatewayError::Malformed` and nothing
    /// is broadcast; the connection stays `Active`.
    pub async fn handle_event(
        &self,
        handle: &ConnectionHandle,
        event: ClientEvent,
    ) -> Result<BroadcastReport, GatewayError> {
        let sender = {
            let connection = handle.connection.lock().await;
            match (connection.state(), connection.identity()) {
                (ConnectionState::Active, Some(identity)) => identity.clone(),
                _ => return Err(GatewayError::NotActive),
            }
        };
        if !self.registry.contains(&handle.id).await {
            return Err(GatewayError::NotActive);
        }

        match event {
            ClientEvent::MessageFromClient { message } => {
                let content = MessageContent::try_from(message)?;
                let message = ChatMessage {
                    display_name: sender.display_label().to_string(),
                    content,
                };
                Ok(self.bus.broadcast_message(&message).await)
            }
        }
    }

    /// Close a connection from any state.
    ///
    /// Safe to call more than once and at any point of the lifecycle.
    ///
    /// # Returns
    ///
    /// The presence snapshot that was broadcast, if the connection had been
    /// registered.
    pub async fn close(&self, handle: &ConnectionHandle) -> Option<PresenceSnapshot> {
        let mut connection = handle.connection.lock().await;
        let previous = connection.close();
        self.bus.detach(&handle.id).await;
        let removed = self.registry.remove(&handle.id).await;
        drop(connection);

        match (previous, removed) {
            (ConnectionState::Active, Some(snapshot)) => {
                tracing::info!("Connection '{}' closed", handle.id);
                self.bus.broadcast_presence(&snapshot).await;
                Some(snapshot)
            }
            (previous, _) => {
                tracing::debug!(
                    "Connection '{}' closed from {:?} state, no presence change",
                    handle.id,
                    previous
                );
                None
            }
        }
    }

    /// Current presence snapshot.
    pub async fn presence(&self) -> PresenceSnapshot {
        self.registry.snapshot().await
    }

    /// Number of registered connections.
    pub async fn connection_count(&self) -> usize {
        self.registry.connection_count().await
    }
}
