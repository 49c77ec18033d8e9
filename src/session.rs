//! Signed, self-contained session tokens.
//!
//! A session is an HS256 JWT carrying the user's identity claims and an
//! expiry. Nothing is stored server-side: possession of a token with a valid
//! signature and an unexpired `exp` IS the session. Tokens cannot be revoked
//! early; they only expire.

use jsonwebtoken::{DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::Error;

/// How long an issued session stays valid, in seconds (24 hours).
pub const SESSION_TTL_SECS: i64 = 24 * 60 * 60;

/// Minimum length of the session signing secret, in bytes.
pub const MIN_SECRET_BYTES: usize = 32;

/// Identity of an authenticated user.
///
/// Reconstructed from the session cookie on every request; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Provider subject claim. Stable per user, opaque otherwise.
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Outcome of resolving a request's session.
///
/// Verification failure is not an error: a corrupted, forged or expired
/// token yields [`Anonymous`](SessionIdentity::Anonymous), exactly like no
/// token at all. Downstream code cannot tell the cases apart, so nothing can
/// accidentally treat a broken token as a signed-in user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIdentity {
    Authenticated(AuthUser),
    Anonymous,
}

impl SessionIdentity {
    #[must_use]
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub fn into_user(self) -> Option<AuthUser> {
        match self {
            Self::Authenticated(user) => Some(user),
            Self::Anonymous => None,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    iat: i64,
    exp: i64,
}

/// HS256 codec for session tokens, derived from a shared secret.
///
/// Construct once at startup and reuse; issuing and verifying are cheap.
pub struct SessionKey {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl SessionKey {
    /// Derive the signing key from a shared secret.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if the secret is shorter than
    /// [`MIN_SECRET_BYTES`]. A weak secret makes every session forgeable, so
    /// this is a startup failure, not something to fall back from.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self, Error> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_BYTES {
            return Err(Error::Config(format!(
                "session secret must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }

        let mut validation = Validation::default();
        validation.leeway = 0;

        Ok(Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Issue a session token for `user`, valid for [`SESSION_TTL_SECS`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::Token`] if signing fails.
    pub fn issue(&self, user: &AuthUser) -> Result<String, Error> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = SessionClaims {
            sub: user.sub.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            iat: now,
            exp: now + SESSION_TTL_SECS,
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| Error::Token(e.to_string()))
    }

    /// Verify a session token and resolve the identity it carries.
    ///
    /// Checks the signature and expiry with zero leeway; a token is valid
    /// strictly before its `exp`. Any failure, and a token whose `sub` claim
    /// is missing or empty, resolves to [`SessionIdentity::Anonymous`].
    #[must_use]
    pub fn verify(&self, token: &str) -> SessionIdentity {
        let data: TokenData<SessionClaims> =
            match jsonwebtoken::decode(token, &self.decoding, &self.validation) {
                Ok(data) => data,
                Err(_) => return SessionIdentity::Anonymous,
            };

        let claims = data.claims;
        // jsonwebtoken accepts exp == now; expiry is exclusive here.
        if claims.exp <= OffsetDateTime::now_utc().unix_timestamp() {
            return SessionIdentity::Anonymous;
        }
        if claims.sub.is_empty() {
            return SessionIdentity::Anonymous;
        }

        SessionIdentity::Authenticated(AuthUser {
            sub: claims.sub,
            username: claims.username,
            email: claims.email,
        })
    }
}
