use std::fmt;
use std::str::FromStr;

use hmac::Mac;

use serde::{Deserialize, Serialize};

use chrono::{DateTime, Duration, TimeZone, Utc};

use base64::{
    alphabet,
    engine::{self, general_purpose},
    Engine as _,
};
use regex::Regex;

use crate::crypto::SigningKey;
use crate::domain::Actor;

lazy_static::lazy_static! {
    // URL-safe, unpadded base64
    static ref BASE64_ENGINE: engine::GeneralPurpose =
        engine::GeneralPurpose::new(&alphabet::URL_SAFE, general_purpose::NO_PAD);
    // `<message>.<signature>`
    static ref TOKEN_REGEX: Regex = Regex::new(r"^([\w-]+)\.([\w-]+)$").unwrap();
}

/// Ways an access token can be rejected
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Token signature does not match")]
    SignatureMismatch,
    #[error("Token is expired")]
    Expired,
    #[error("Token is of invalid format")]
    InvalidFormat,
    #[error("Invalid Utf8 string")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("Malformed token claims")]
    Serde(#[from] serde_json::Error),
    #[error("Decode error")]
    DecodeError(#[from] base64::DecodeError),
}

pub type TokenResult<T> = Result<T, TokenError>;

/// Bearer token identifying an actor, signed by the identity provider
#[derive(Debug, Clone)]
pub struct AccessToken(String);

impl AccessToken {
    /// Start building a token for an actor
    pub fn issue(actor: Actor) -> AccessTokenBuilder {
        AccessTokenBuilder {
            expiration: None,
            actor,
        }
    }

    /// Check the signature and expiry, returning the actor the token names
    pub fn verify(&self, key: &SigningKey) -> TokenResult<Actor> {
        let captures = TOKEN_REGEX
            .captures(&self.0)
            .ok_or(TokenError::InvalidFormat)?;
        let (msg, sig) = match (captures.get(1), captures.get(2)) {
            (Some(msg), Some(sig)) => (msg.as_str(), sig.as_str()),
            _ => return Err(TokenError::InvalidFormat),
        };

        let msg = BASE64_ENGINE.decode(msg)?;
        let sig = BASE64_ENGINE.decode(sig)?;

        key.as_ref()
            .clone()
            .chain_update(&msg)
            .verify_slice(&sig)
            .map_err(|_| TokenError::SignatureMismatch)?;

        let claims: Claims = serde_json::from_str(std::str::from_utf8(&msg)?)?;
        if claims.is_expired(Utc::now()) {
            Err(TokenError::Expired)
        } else {
            Ok(claims.data)
        }
    }
}

impl fmt::Display for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for AccessToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for AccessToken {
    type Err = TokenError;

    fn from_str(token: &str) -> TokenResult<Self> {
        let token = token.trim();
        if TOKEN_REGEX.is_match(token) {
            Ok(Self(token.to_string()))
        } else {
            Err(TokenError::InvalidFormat)
        }
    }
}

/// Builder for signing access tokens
#[derive(Debug)]
pub struct AccessTokenBuilder {
    expiration: Option<DateTime<Utc>>,
    actor: Actor,
}

impl AccessTokenBuilder {
    pub fn expires_in(self, duration: Duration) -> Self {
        self.expires_at(Utc::now() + duration)
    }

    pub fn expires_at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.expiration = Some(timestamp);
        self
    }

    pub fn sign(self, key: &SigningKey) -> TokenResult<AccessToken> {
        let claims = Claims {
            exp: self.expiration.map(|date| date.timestamp()),
            data: self.actor,
        };
        let msg = serde_json::to_string(&claims)?;
        let sig = key
            .as_ref()
            .clone()
            .chain_update(msg.as_bytes())
            .finalize()
            .into_bytes();

        Ok(AccessToken(format!(
            "{}.{}",
            BASE64_ENGINE.encode(msg),
            BASE64_ENGINE.encode(sig)
        )))
    }
}

/// Signed portion of the token
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    exp: Option<i64>,
    data: Actor,
}

impl Claims {
    fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.exp
            // NOTE: Ambiguous timestamps resolve to the earliest instant
            .and_then(|exp| Utc.timestamp_opt(exp, 0).earliest())
            .map(|exp| now >= exp)
            .unwrap_or(false)
    }
}
