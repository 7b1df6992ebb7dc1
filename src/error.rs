pub type Result<T> = std::result::Result<T, Error>;

/// Every way a marketplace operation can fail.
///
/// An operation either returns the updated entity or exactly one of these;
/// nothing it wrote before failing is left committed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    // Malformed input
    #[error("{0}")]
    Validation(String),
    // Missing offer, reservation or notification
    #[error("{0} not found")]
    NotFound(String),
    // Actor has no rights over the target record
    #[error("{0}")]
    Authorization(String),
    // Transition attempted from a non-permitted state
    #[error("{0}")]
    InvalidState(String),
    #[error("Requested {requested} spot(s) but only {remaining} remain")]
    CapacityExceeded { requested: i32, remaining: i64 },
    // Transient datastore failure, retry is up to the caller
    #[error("Datastore unavailable")]
    Unavailable(#[source] sqlx::Error),
}

impl Error {
    /// Stable, machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::NotFound(_) => "not_found",
            Self::Authorization(_) => "authorization",
            Self::InvalidState(_) => "invalid_state",
            Self::CapacityExceeded { .. } => "capacity_exceeded",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!(error.cause_chain = ?e, "Datastore failure: {}", e);
        Self::Unavailable(e)
    }
}

impl From<crate::domain::TransitionError> for Error {
    fn from(e: crate::domain::TransitionError) -> Self {
        Self::InvalidState(e.to_string())
    }
}
