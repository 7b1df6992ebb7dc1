mod access_token;
mod signing_key;

pub use access_token::{AccessToken, AccessTokenBuilder, TokenError, TokenResult};
pub use signing_key::SigningKey;
