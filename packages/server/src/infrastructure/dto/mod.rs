//! Data Transfer Objects (DTO)
//!
//! Wire representations kept apart from the domain model.
//!
//! - `websocket`: JSON frames of the realtime channel
//! - `http`: JSON bodies of the diagnostic HTTP endpoints

pub mod http;
pub mod websocket;
