//! Infrastructure layer: concrete implementations of the domain traits and
//! the wire-level DTOs.

pub mod broadcast;
pub mod dto;
pub mod registry;
pub mod verifier;
