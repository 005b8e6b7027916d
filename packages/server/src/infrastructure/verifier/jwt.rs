//! JWT identity verifier.
//!
//! Validates the HS256 tokens issued by the login/registration endpoints. The
//! token payload carries the user key in `id`, optionally the user's full name,
//! and an expiry.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, Identity, IdentityVerifier, UserId};

/// Claims carried by an access token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtClaims {
    /// Stable user key
    pub id: String,
    /// Display name of the user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Expiration (Unix seconds)
    pub exp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}

/// `IdentityVerifier` for HS256-signed JWTs.
pub struct JwtIdentityVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtIdentityVerifier {
    /// Create a verifier for tokens signed with `secret`.
    ///
    /// When `issuer` is given, tokens must carry a matching `iss` claim.
    pub fn new(secret: impl AsRef<[u8]>, issuer: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        Self {
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
            validation,
        }
    }

    /// Decode and validate `token`, returning its claims.
    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        if token.trim().is_empty() {
            return Err(AuthError::MissingCredential);
        }

        decode::<JwtClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature => AuthError::InvalidSignature,
                ErrorKind::InvalidToken | ErrorKind::Base64(_) | ErrorKind::Utf8(_) => {
                    AuthError::Malformed(e.to_string())
                }
                _ => AuthError::Invalid(e.to_string()),
            })
    }
}

#[async_trait]
impl IdentityVerifier for JwtIdentityVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let claims = self.validate_token(token).inspect_err(|e| {
            tracing::warn!("Token validation failed: {}", e);
        })?;

        let user_id = UserId::new(claims.id)
            .map_err(|e| AuthError::Invalid(format!("invalid id claim: {}", e)))?;
        let identity = match claims.full_name {
            Some(full_name) => Identity::new(user_id).with_display_name(full_name),
            None => Identity::new(user_id),
        };

        tracing::debug!("Token validated for user '{}'", identity.user_id);
        Ok(identity)
    }
}
