//! Bearer token issuing and verification.
//!
//! Tokens are standard HS256 JWTs carrying a snapshot of the user's public
//! identity. Verification is the only thing the request pipeline does with
//! them; a token that fails to verify is treated as an anonymous request by
//! the caller, never as an error here.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{AppError, AppResult};

/// User role carried in tokens and on user records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May upload, edit and delete photos.
    Creator,
    /// May browse, like, rate and comment.
    Consumer,
}

impl Role {
    /// Parse a role string, falling back to `Consumer` for anything unknown.
    #[must_use]
    pub fn parse_or_default(s: Option<&str>) -> Self {
        match s {
            Some("creator") => Self::Creator,
            _ => Self::Consumer,
        }
    }

    /// String form used on the wire and in the database.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Creator => "creator",
            Self::Consumer => "consumer",
        }
    }
}

/// Claims embedded in a bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID.
    pub sub: String,
    /// Display name snapshot.
    pub name: String,
    /// Email snapshot.
    pub email: String,
    /// Role snapshot.
    pub role: Role,
    /// Avatar URL snapshot.
    #[serde(default)]
    pub avatar: Option<String>,
    /// Issued-at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Verified caller identity, as consumed by the request pipeline.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    /// User ID.
    pub id: String,
    /// Display name snapshot.
    pub name: String,
    /// Email snapshot.
    pub email: String,
    /// Role snapshot.
    pub role: Role,
    /// Avatar URL snapshot.
    pub avatar: Option<String>,
}

impl AuthenticatedUser {
    /// Whether this identity may perform creator-only operations.
    #[must_use]
    pub fn is_creator(&self) -> bool {
        self.role == Role::Creator
    }
}

impl From<Claims> for AuthenticatedUser {
    fn from(c: Claims) -> Self {
        Self {
            id: c.sub,
            name: c.name,
            email: c.email,
            role: c.role,
            avatar: c.avatar,
        }
    }
}

/// Identity snapshot used when issuing a token.
#[derive(Debug, Clone)]
pub struct TokenSubject {
    /// User ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Email.
    pub email: String,
    /// Role.
    pub role: Role,
    /// Avatar URL.
    pub avatar: Option<String>,
}

/// Issues and verifies bearer tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: u64,
}

impl TokenIssuer {
    /// Create a new issuer from a shared secret.
    #[must_use]
    pub fn new(secret: &str, ttl_secs: u64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issue a signed token for the given subject.
    pub fn issue(&self, subject: &TokenSubject) -> AppResult<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: subject.id.clone(),
            name: subject.name.clone(),
            email: subject.email.clone(),
            role: subject.role,
            avatar: subject.avatar.clone(),
            iat: now,
            exp: now + self.ttl_secs as i64,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("Failed to sign token: {e}")))
    }

    /// Verify a token and return the identity it carries.
    ///
    /// Expired or malformed tokens return `Unauthorized`.
    pub fn verify(&self, token: &str) -> AppResult<AuthenticatedUser> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| AppError::Unauthorized)?;
        Ok(data.claims.into())
    }
}
