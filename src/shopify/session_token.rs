//! Session tokens sent by the embedded frontend.
//!
//! App Bridge signs a short-lived HS256 JWT with the app secret. `dest` is
//! the shop URL and `aud` the app's API key.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionTokenClaims {
    pub iss: String,
    pub dest: String,
    pub aud: String,
    #[serde(default)]
    pub sub: Option<String>,
    pub exp: usize,
    #[serde(default)]
    pub nbf: Option<usize>,
    #[serde(default)]
    pub iat: Option<usize>,
    #[serde(default)]
    pub jti: Option<String>,
}

#[derive(Debug, Error)]
pub enum SessionTokenError {
    #[error("Invalid session token: {0}")]
    Invalid(#[from] jsonwebtoken::errors::Error),

    #[error("Session token destination is not a shop: {0}")]
    InvalidDestination(String),
}

impl SessionTokenClaims {
    /// Shop domain named by `dest`.
    pub fn shop(&self) -> Result<String, SessionTokenError> {
        url::Url::parse(&self.dest)
            .ok()
            .and_then(|u| u.host_str().and_then(super::oauth::sanitize_shop))
            .ok_or_else(|| SessionTokenError::InvalidDestination(self.dest.clone()))
    }
}

/// Validate signature, expiry, not-before and audience.
pub fn decode_session_token(
    token: &str,
    api_key: &str,
    api_secret: &str,
) -> Result<SessionTokenClaims, SessionTokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[api_key]);
    validation.validate_nbf = true;

    let data = decode::<SessionTokenClaims>(
        token,
        &DecodingKey::from_secret(api_secret.as_bytes()),
        &validation,
    )?;
    Ok(data.claims)
}

/// Sign claims the way App Bridge does. Used by local tooling and tests.
pub fn encode_session_token(
    claims: &SessionTokenClaims,
    api_secret: &str,
) -> Result<String, SessionTokenError> {
    Ok(encode(
        &Header::new(Algorithm::HS256),
        claims,
        &EncodingKey::from_secret(api_secret.as_bytes()),
    )?)
}
