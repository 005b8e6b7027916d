//! UI layer: axum router and the websocket transport adapter.

mod handler;
mod handshake;
mod server;
mod signal;
pub mod state;

pub use handshake::extract_credential;
pub use server::Server;
