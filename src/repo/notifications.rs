use uuid::Uuid;

use sqlx::PgExecutor;

use crate::model::{NewNotification, Notification};

/// Repository for interfacing with the notifications table
pub struct NotificationsRepo;

impl NotificationsRepo {
    #[tracing::instrument(name = "Insert notification", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        new_notification: &NewNotification,
    ) -> sqlx::Result<Notification> {
        sqlx::query_as::<_, Notification>(
            "insert into notifications(recipient_id, kind, message, offer_id, reservation_id)
            values ($1, $2, $3, $4, $5)
            returning *",
        )
        .bind(new_notification.recipient_id)
        .bind(new_notification.kind)
        .bind(&new_notification.message)
        .bind(new_notification.offer_id)
        .bind(new_notification.reservation_id)
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch notification by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<Notification>> {
        sqlx::query_as::<_, Notification>("select * from notifications where id=$1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    #[tracing::instrument(name = "Fetch notifications for recipient", skip(executor))]
    pub async fn fetch_for_recipient<'con>(
        executor: impl PgExecutor<'con>,
        recipient_id: Uuid,
    ) -> sqlx::Result<Vec<Notification>> {
        sqlx::query_as::<_, Notification>(
            "select * from notifications where recipient_id=$1 order by created_at desc, id",
        )
        .bind(recipient_id)
        .fetch_all(executor)
        .await
    }

    /// Mark a notification read, keeping the first read timestamp
    #[tracing::instrument(name = "Mark notification read", skip(executor))]
    pub async fn mark_read<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<Notification>> {
        sqlx::query_as::<_, Notification>(
            "update notifications
            set is_read=true, read_at=coalesce(read_at, now())
            where id=$1
            returning *",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }
}
