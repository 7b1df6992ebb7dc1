use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};

use serde::Serialize;

use thiserror::Error;

use crate::client::StorageError;
use crate::error::Error;

pub type RestResult<T> = Result<T, RestError>;

#[derive(Debug, Error)]
pub enum RestError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("Parse Error: {0}")]
    ParseError(String),

    #[error("Unauthenticated: {0}")]
    Unauthenticated(anyhow::Error),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Internal Server Error: {0}")]
    InternalError(String),
}

/// JSON body of every error response
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    kind: &'a str,
    detail: String,
}

impl RestError {
    /// Stable, machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Core(e) => e.kind(),
            Self::ParseError(_) => "validation",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::Storage(_) => "storage",
            Self::InternalError(_) => "internal",
        }
    }

    fn detail(&self) -> String {
        match self {
            // Don't leak datastore internals to callers
            Self::Core(Error::Unavailable(_)) => "Datastore unavailable, try again".into(),
            Self::Storage(_) => "Failed to store the uploaded object".into(),
            Self::InternalError(_) => "Internal server error".into(),
            Self::Unauthenticated(_) => "Missing or invalid access token".into(),
            other => other.to_string(),
        }
    }
}

impl From<sqlx::Error> for RestError {
    fn from(e: sqlx::Error) -> Self {
        Self::Core(e.into())
    }
}

impl ResponseError for RestError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Core(e) => match e {
                Error::Validation(_) => StatusCode::BAD_REQUEST,
                Error::NotFound(_) => StatusCode::NOT_FOUND,
                Error::Authorization(_) => StatusCode::FORBIDDEN,
                Error::InvalidState(_) | Error::CapacityExceeded { .. } => StatusCode::CONFLICT,
                Error::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            },
            Self::ParseError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            Self::Storage(_) => StatusCode::BAD_GATEWAY,
            Self::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if let Self::Core(Error::Unavailable(_)) = self {
            // Already logged where the datastore error was converted
            tracing::warn!(error.kind = self.kind(), "Request failed: {}", self);
        } else if status.is_server_error() {
            tracing::error!(error.cause_chain = ?self, "Request failed: {}", self);
        } else {
            tracing::warn!(error.kind = self.kind(), "Request rejected: {}", self);
        }

        HttpResponse::build(status).json(ErrorBody {
            kind: self.kind(),
            detail: self.detail(),
        })
    }
}
