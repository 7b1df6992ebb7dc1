use uuid::Uuid;

use chrono::{DateTime, Utc};

use serde::Serialize;

/// What happened to trigger a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
pub enum NotificationKind {
    ReservationCreated,
    ReservationCanceled,
    ReservationCompleted,
    OfferCanceled,
    OfferCompleted,
}

/// Notification to be recorded for a counterparty
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub offer_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
}

/// Stored notification record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Notification {
    pub id: Uuid,
    pub recipient_id: Uuid,
    pub kind: NotificationKind,
    pub message: String,
    pub offer_id: Option<Uuid>,
    pub reservation_id: Option<Uuid>,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    /// Set the first time the recipient marks it read
    pub read_at: Option<DateTime<Utc>>,
}
