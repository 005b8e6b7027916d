//! Domain layer of the realtime gateway.
//!
//! Value objects, the per-connection state machine, presence/message events and
//! the traits the gateway depends on. Concrete implementations live in the
//! infrastructure layer.

mod broadcast;
mod connection;
mod error;
mod event;
mod identity;
mod registry;
mod value_object;
mod verifier;

pub use broadcast::{BroadcastBus, BroadcastReport, PeerChannel};
pub use connection::{Connection, ConnectionState};
pub use error::{AuthError, MalformedMessage, TransitionError, ValueObjectError};
pub use event::{ChatMessage, ClientEvent, PresenceGate, PresenceSnapshot, ServerEvent};
pub use identity::Identity;
pub use registry::ConnectionRegistry;
pub use value_object::{ConnectionId, MessageContent, Timestamp, UserId};
pub use verifier::IdentityVerifier;

#[cfg(test)]
pub use broadcast::MockBroadcastBus;
#[cfg(test)]
pub use verifier::MockIdentityVerifier;
