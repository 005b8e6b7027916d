//! Realtime presence and chat gateway for the Teslo Shop backend.
//!
//! Accepts websocket connections, authenticates them from the handshake
//! credential, keeps a registry of who is connected and fans presence and
//! chat events out to every active connection.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
