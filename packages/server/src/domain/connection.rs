//! Per-connection lifecycle state machine.
//!
//! ```text
//! Connecting -> Authenticating -> Active -> Closed
//!                      |                       ^
//!                      +-----------------------+
//! ```
//!
//! `Closed` is terminal. Any state may move to `Closed`.

use serde::Serialize;

use super::{ConnectionId, Identity, Timestamp, TransitionError};

/// Lifecycle state of a transport session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Connecting,
    Authenticating,
    Active,
    Closed,
}

/// One live transport session.
///
/// `identity` and `connected_at` are only ever set together with the
/// `Active` state.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    state: ConnectionState,
    identity: Option<Identity>,
    connected_at: Option<Timestamp>,
}

impl Connection {
    pub fn new(id: ConnectionId) -> Self {
        Self {
            id,
            state: ConnectionState::Connecting,
            identity: None,
            connected_at: None,
        }
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn connected_at(&self) -> Option<Timestamp> {
        self.connected_at
    }

    pub fn is_active(&self) -> bool {
        self.state == ConnectionState::Active
    }

    pub fn is_closed(&self) -> bool {
        self.state == ConnectionState::Closed
    }

    /// `Connecting -> Authenticating`
    pub fn begin_authentication(&mut self) -> Result<(), TransitionError> {
        self.transition(ConnectionState::Connecting, ConnectionState::Authenticating)
    }

    /// `Authenticating -> Active`, recording the verified identity.
    pub fn activate(
        &mut self,
        identity: Identity,
        connected_at: Timestamp,
    ) -> Result<(), TransitionError> {
        self.transition(ConnectionState::Authenticating, ConnectionState::Active)?;
        self.identity = Some(identity);
        // connectedAt is stamped once, on the first activation only
        self.connected_at.get_or_insert(connected_at);
        Ok(())
    }

    /// Move to `Closed` from any state and return the state that was left.
    ///
    /// Closing twice is allowed; the second call returns `Closed`.
    pub fn close(&mut self) -> ConnectionState {
        let previous = self.state;
        self.state = ConnectionState::Closed;
        previous
    }

    fn transition(
        &mut self,
        expected: ConnectionState,
        next: ConnectionState,
    ) -> Result<(), TransitionError> {
        if self.state != expected {
            return Err(TransitionError {
                from: self.state,
                to: next,
            });
        }
        self.state = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserId;

    fn alice() -> Identity {
        Identity::new(UserId::new("alice".to_string()).unwrap())
    }

    #[test]
    fn test_happy_path_reaches_active_with_identity() {
        // given:
        let mut connection = Connection::new(ConnectionId::generate());

        // when:
        connection.begin_authentication().unwrap();
        connection.activate(alice(), Timestamp::new(1000)).unwrap();

        // then:
        assert!(connection.is_active());
        assert_eq!(connection.identity(), Some(&alice()));
        assert_eq!(connection.connected_at(), Some(Timestamp::new(1000)));
    }

    #[test]
    fn test_identity_is_absent_before_activation() {
        // given:
        let mut connection = Connection::new(ConnectionId::generate());

        // when:
        connection.begin_authentication().unwrap();

        // then:
        assert_eq!(connection.state(), ConnectionState::Authenticating);
        assert_eq!(connection.identity(), None);
        assert_eq!(connection.connected_at(), None);
    }

    #[test]
    fn test_activate_without_authentication_is_rejected() {
        // given:
        let mut connection = Connection::new(ConnectionId::generate());

        // when:
        let result = connection.activate(alice(), Timestamp::new(1000));

        // then:
        assert_eq!(
            result,
            Err(TransitionError {
                from: ConnectionState::Connecting,
                to: ConnectionState::Active,
            })
        );
        assert_eq!(connection.identity(), None);
    }

    #[test]
    fn test_closed_is_terminal() {
        // given: a connection closed while authenticating
        let mut connection = Connection::new(ConnectionId::generate());
        connection.begin_authentication().unwrap();
        assert_eq!(connection.close(), ConnectionState::Authenticating);

        // when:
        let result = connection.activate(alice(), Timestamp::new(1000));

        // then:
        assert!(result.is_err());
        assert!(connection.is_closed());
        assert_eq!(connection.identity(), None);
    }

    #[test]
    fn test_close_is_idempotent() {
        // given:
        let mut connection = Connection::new(ConnectionId::generate());
        connection.begin_authentication().unwrap();
        connection.activate(alice(), Timestamp::new(1000)).unwrap();

        // when:
        let first = connection.close();
        let second = connection.close();

        // then:
        assert_eq!(first, ConnectionState::Active);
        assert_eq!(second, ConnectionState::Closed);
    }
}
