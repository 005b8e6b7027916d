//! Identity verifier implementations.

pub mod jwt;

pub use jwt::{JwtClaims, JwtIdentityVerifier};
