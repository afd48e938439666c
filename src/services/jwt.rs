//! # JWT Service
//!
//! Bearer tokens are issued by the authentication collaborator and only
//! verified here. Tokens are HS256 with claims `sub`, `email`, `role`, `exp`
//! and `iat`.
//!
//! [`JwtService::issue_access_token`] exists for collaborators that share the
//! signing secret (and for tests); the engine itself never calls it.

use std::time::Duration;

use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, get_current_timestamp,
};
use secrecy::{ExposeSecret, SecretSlice};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, trace};
use uuid::Uuid;

use crate::models::{Principal, Role};

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("Token encoding failed: {0}")]
    EncodingError(#[from] jsonwebtoken::errors::Error),
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID as string)
    pub sub: String,
    pub email: String,
    pub role: Role,
    /// Expiration timestamp (Unix epoch)
    pub exp: u64,
    /// Issued at timestamp (Unix epoch)
    pub iat: u64,
}

impl TryFrom<Claims> for Principal {
    type Error = JwtError;

    fn try_from(claims: Claims) -> Result<Self, Self::Error> {
        let user_id = Uuid::try_parse(&claims.sub).map_err(|_| JwtError::InvalidToken)?;
        Ok(Principal {
            user_id,
            email: claims.email,
            role: claims.role,
        })
    }
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    pub fn new(encoding_key: EncodingKey, decoding_key: DecodingKey) -> Self {
        Self {
            encoding_key,
            decoding_key,
        }
    }

    /// Builds both keys from one shared HMAC secret.
    pub fn from_secret(secret: &SecretSlice<u8>) -> Self {
        Self::new(
            EncodingKey::from_secret(secret.expose_secret()),
            DecodingKey::from_secret(secret.expose_secret()),
        )
    }

    /// Signs an access token for `principal` valid for `ttl`.
    #[instrument(skip_all, fields(user_id = %principal.user_id))]
    pub fn issue_access_token(
        &self,
        principal: &Principal,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let now = get_current_timestamp();
        let claims = Claims {
            sub: principal.user_id.to_string(),
            email: principal.email.clone(),
            role: principal.role,
            exp: now + ttl.as_secs(),
            iat: now,
        };
        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        trace!("Access token issued");
        Ok(token)
    }

    /// Verifies the signature and expiry and returns the claims.
    ///
    /// # Errors
    ///
    /// - [`JwtError::TokenExpired`] - Token has expired
    /// - [`JwtError::InvalidToken`] - Token is malformed or has invalid signature
    #[instrument(skip_all, fields(token_length = token.len()))]
    pub fn validate_access_token(&self, token: &str) -> Result<Claims, JwtError> {
        trace!("Validating access token");

        match decode::<Claims>(token, &self.decoding_key, &Validation::default()) {
            Ok(token_data) => {
                trace!(user_id = %token_data.claims.sub, "Access token validated successfully");
                Ok(token_data.claims)
            }
            Err(e) if e.kind() == &jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                debug!("Access token expired");
                Err(JwtError::TokenExpired)
            }
            Err(e) => {
                debug!(error = %e, "Invalid access token");
                Err(JwtError::InvalidToken)
            }
        }
    }
}
