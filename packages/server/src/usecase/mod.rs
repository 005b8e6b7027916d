//! UseCase layer.
//!
//! - `gateway`: protocol handler driving each connection through
//!   authentication, message dispatch and close

pub mod error;
pub mod gateway;

pub use error::GatewayError;
pub use gateway::{ConnectionHandle, Gateway};
