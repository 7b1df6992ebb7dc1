use std::future::{ready, Ready};

use actix_web::{dev, web, FromRequest, HttpRequest};

use anyhow::Context;

use crate::controller::error::{RestError, RestResult};
use crate::crypto::SigningKey;
use crate::domain::Actor;

mod bearer;

pub use bearer::bearer_token;

/// The current caller, as named by a verified bearer token
impl FromRequest for Actor {
    type Error = RestError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut dev::Payload) -> Self::Future {
        ready(current_actor(req))
    }
}

#[tracing::instrument("Authenticate actor", skip(req), fields(actor.id = tracing::field::Empty, actor.role = tracing::field::Empty))]
fn current_actor(req: &HttpRequest) -> RestResult<Actor> {
    // NOTE: Must be registered with the application at startup
    let signing_key = req
        .app_data::<web::Data<SigningKey>>()
        .ok_or_else(|| RestError::InternalError("Signing key not registered".into()))?;

    let token = bearer_token(req.headers()).map_err(RestError::Unauthenticated)?;
    let actor = token
        .verify(signing_key)
        .context("Failed to verify access token")
        .map_err(RestError::Unauthenticated)?;

    let span = tracing::Span::current();
    span.record("actor.id", tracing::field::display(actor.id));
    span.record("actor.role", tracing::field::display(actor.role));
    Ok(actor)
}
