//! Broadcast bus implementations.
//!
//! - `channel`: fan-out over per-connection unbounded channels drained by the
//!   websocket writer tasks

pub mod channel;

pub use channel::ChannelBroadcastBus;
