use std::fmt;

use chrono::{DateTime, Utc};

use serde::{Deserialize, Serialize};

/// Lifecycle status shared by offers and reservations.
///
/// Both record types walk the same state machine: they are born `Active` and
/// leave it exactly once, for one of the three terminal states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "lifecycle_status", rename_all = "lowercase")]
pub enum Status {
    Active,
    Completed,
    Canceled,
    Expired,
}

/// A requested move out of the `Active` state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Explicit action: pickup happened / offer closed
    Complete,
    /// Explicit action: withdrawn by its owner
    Cancel,
    /// Policy: pickup time passed while still active
    Expire,
}

impl Transition {
    /// The status a record lands in after this transition
    pub fn target(&self) -> Status {
        match self {
            Self::Complete => Status::Completed,
            Self::Cancel => Status::Canceled,
            Self::Expire => Status::Expired,
        }
    }
}

/// A transition was attempted from a state that does not allow it
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Cannot {transition:?} a record that is {from}")]
pub struct TransitionError {
    pub from: Status,
    pub transition: Transition,
}

impl Status {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Active)
    }

    /// Apply a transition, failing for every source state except `Active`
    pub fn transition(self, transition: Transition) -> Result<Status, TransitionError> {
        if self.is_terminal() {
            return Err(TransitionError {
                from: self,
                transition,
            });
        }
        Ok(transition.target())
    }

    /// The status a caller should see at `now`.
    ///
    /// Expiry is never written eagerly: a stored `Active` record whose pickup
    /// time has passed is reported as `Expired`.
    pub fn effective(self, pickup_time: DateTime<Utc>, now: DateTime<Utc>) -> Status {
        match self {
            Self::Active if pickup_time < now => Self::Expired,
            status => status,
        }
    }
}

impl AsRef<str> for Status {
    fn as_ref(&self) -> &str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
            Self::Expired => "expired",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}
