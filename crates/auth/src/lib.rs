//! Bearer token verification for Courier websocket handshakes.
//!
//! The verifier is a pure function of the signed token: it resolves a
//! token to a stable user id or fails, and performs no I/O. Whether that
//! user exists or is allowed to connect is decided by the caller.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use courier_config::AuthConfig;

/// Errors produced while verifying a handshake token.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing token")]
    Missing,
    #[error("invalid token")]
    Invalid,
}

/// Claims carried by a Courier access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Stable user id the token was issued for.
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
    pub iss: String,
    pub aud: String,
    pub jti: String,
}

/// Verifies (and, for tooling and tests, mints) HS256 access tokens.
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
    token_ttl: Duration,
}

impl TokenVerifier {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_ref()),
            decoding_key: DecodingKey::from_secret(config.secret.as_ref()),
            issuer: config.issuer.clone(),
            audience: config.audience.clone(),
            token_ttl: Duration::seconds(config.token_ttl_seconds.min(i64::MAX as u64) as i64),
        }
    }

    /// Validate a presented token and return its claims.
    ///
    /// Rejects absent and blank tokens before any cryptographic work.
    pub fn verify(&self, token: Option<&str>) -> Result<Claims, AuthError> {
        let token = match token {
            Some(token) if !token.trim().is_empty() => token,
            _ => return Err(AuthError::Missing),
        };

        let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|_| AuthError::Invalid)?;

        Ok(token_data.claims)
    }

    /// Issue a token for `user_id`. Used by tests and the local dev tooling;
    /// production tokens come from the account service sharing this secret.
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + self.token_ttl).timestamp() as usize,
            iat: now.timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(|_| AuthError::Invalid)
    }
}
