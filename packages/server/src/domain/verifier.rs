//! Identity verification seam.

use async_trait::async_trait;

use super::{AuthError, Identity};

/// Validates an opaque credential token and resolves the identity behind it.
///
/// Treated as a black box that may block on I/O. Implementations must be safe
/// to call concurrently from many connection tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError>;
}
