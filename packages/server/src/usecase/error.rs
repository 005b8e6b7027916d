//! UseCase error types.

use thiserror::Error;

use crate::domain::{AuthError, MalformedMessage, TransitionError};

/// Errors returned by the gateway.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    /// Handshake rejected. The connection is closed and was never registered.
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// The transport closed the connection while its credential was being
    /// verified.
    #[error("connection closed before authentication completed")]
    ConnectionClosed,

    /// Inbound event on a connection that is not `Active`.
    #[error("connection is not active")]
    NotActive,

    /// Inbound event dropped; the connection stays open.
    #[error("malformed message: {0}")]
    Malformed(#[from] MalformedMessage),

    /// Programming fault: the state machine refused a transition.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),
}
