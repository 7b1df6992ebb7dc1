use actix_web::http::header::{self, HeaderMap};

use anyhow::Context;

use crate::crypto::AccessToken;

const BEARER_AUTH_PREFIX: &str = "Bearer ";

/// Extract the access token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> anyhow::Result<AccessToken> {
    let header_value = headers
        .get(header::AUTHORIZATION)
        .context("Missing authorization in header")?
        .to_str()?;

    let token = header_value
        .strip_prefix(BEARER_AUTH_PREFIX)
        .context("Missing or unknown Authorization scheme")?;

    token.parse().context("Malformed access token")
}
