//! Domain error types.

use thiserror::Error;

use super::ConnectionState;

/// Value object construction failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValueObjectError {
    #[error("connection id must not be empty")]
    EmptyConnectionId,
    #[error("user id must not be empty")]
    EmptyUserId,
}

/// Credential verification failures.
///
/// Never retried by the server: the client has to reconnect with a valid
/// credential.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credential")]
    MissingCredential,
    #[error("malformed credential: {0}")]
    Malformed(String),
    #[error("credential expired")]
    Expired,
    #[error("invalid credential signature")]
    InvalidSignature,
    #[error("invalid credential: {0}")]
    Invalid(String),
}

/// An inbound event that failed shape validation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MalformedMessage {
    #[error("frame is not a valid client event: {0}")]
    Undecodable(String),
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("message is too long ({length} > {max} characters)")]
    MessageTooLong { length: usize, max: usize },
}

/// A connection state transition that the state machine does not allow.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
#[error("invalid connection state transition: {from:?} -> {to:?}")]
pub struct TransitionError {
    pub from: ConnectionState,
    pub to: ConnectionState,
}
