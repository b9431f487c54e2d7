//! JWT Token Handler
//! Mission: Generate and validate JWT tokens securely

use crate::auth::models::{Claims, Role, User};
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation,
};
use tracing::debug;

/// Default token lifetime in minutes.
pub const DEFAULT_TOKEN_TTL_MINUTES: i64 = 30;

/// Why a presented token was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    /// Signature does not match the shared secret (tampered or wrong key)
    InvalidSignature,
    /// Past the exp claim
    Expired,
    /// Undecodable, or required claims are absent
    Malformed,
}

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
    ttl_minutes: i64,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key and the default lifetime
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            ttl_minutes: DEFAULT_TOKEN_TTL_MINUTES,
        }
    }

    /// Override the token lifetime (configuration and tests)
    pub fn with_ttl_minutes(mut self, minutes: i64) -> Self {
        self.ttl_minutes = minutes;
        self
    }

    /// Issue a signed token for a user.
    ///
    /// Returns the token and its lifetime in seconds. Stateless: nothing is
    /// recorded server-side.
    pub fn issue(&self, user: &User) -> Result<(String, usize)> {
        self.issue_for(&user.username, user.role)
    }

    /// Issue a signed token for a (subject, role) pair.
    pub fn issue_for(&self, subject: &str, role: Role) -> Result<(String, usize)> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(chrono::Duration::minutes(self.ttl_minutes))
            .context("Invalid expiry timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: subject.to_string(),
            role,
            exp: expiration,
        };

        debug!(
            "Issuing token for {} ({}), expires in {}m",
            subject,
            role.as_str(),
            self.ttl_minutes
        );

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to sign token")?;

        let expires_in = (self.ttl_minutes * 60) as usize;

        Ok((token, expires_in))
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Malformed,
        })?;

        debug!("Validated token for {}", decoded.claims.sub);

        Ok(decoded.claims)
    }
}
