use actix_web::error::{JsonPayloadError, PathError, QueryPayloadError};
use actix_web::{web, HttpRequest};

pub mod error;
pub mod notifications;
pub mod offers;
pub mod reservations;

use error::RestError;

/// Reject malformed JSON bodies with the shared error shape
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|e: JsonPayloadError, _: &HttpRequest| RestError::ParseError(e.to_string()).into())
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default()
        .error_handler(|e: QueryPayloadError, _: &HttpRequest| RestError::ParseError(e.to_string()).into())
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default()
        .error_handler(|e: PathError, _: &HttpRequest| RestError::ParseError(e.to_string()).into())
}
