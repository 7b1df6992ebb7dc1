use uuid::Uuid;

use sqlx::{PgExecutor, PgPool};

use crate::domain::Actor;
use crate::error::{Error, Result};
use crate::model::{NewNotification, Notification, NotificationKind, Offer, Reservation};
use crate::repo::NotificationsRepo;

/// Records notifications for the counterparty of a mutation.
///
/// Insertion is the only guarantee made here: live delivery is left to
/// whatever listens on the `notifications` channel.
pub struct NotificationEmitter;

impl NotificationEmitter {
    #[tracing::instrument(name = "Emit notification", skip(executor))]
    pub async fn emit<'con>(
        executor: impl PgExecutor<'con>,
        new_notification: &NewNotification,
    ) -> Result<Notification> {
        let notification = NotificationsRepo::insert(executor, new_notification).await?;
        Ok(notification)
    }

    #[tracing::instrument(name = "List notifications", skip(pool))]
    pub async fn list_for(pool: &PgPool, actor: &Actor) -> Result<Vec<Notification>> {
        let notifications = NotificationsRepo::fetch_for_recipient(pool, actor.id).await?;
        Ok(notifications)
    }

    /// Mark a notification read. Marking it again is a no-op.
    #[tracing::instrument(name = "Mark notification read", skip(pool))]
    pub async fn mark_read(
        pool: &PgPool,
        notification_id: Uuid,
        actor: &Actor,
    ) -> Result<Notification> {
        let notification = NotificationsRepo::fetch_by_id(pool, notification_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Notification {}", notification_id)))?;

        if !actor.is(notification.recipient_id) {
            return Err(Error::Authorization(
                "Only the recipient can mark a notification read".into(),
            ));
        }
        if notification.is_read {
            return Ok(notification);
        }

        NotificationsRepo::mark_read(pool, notification_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Notification {}", notification_id)))
    }
}

pub(super) fn reservation_created(offer: &Offer, reservation: &Reservation) -> NewNotification {
    NewNotification {
        recipient_id: offer.restaurant_id,
        kind: NotificationKind::ReservationCreated,
        message: format!(
            "New reservation of {} spot(s) for \"{}\"",
            reservation.quantity, offer.description
        ),
        offer_id: Some(offer.id),
        reservation_id: Some(reservation.id),
    }
}

pub(super) fn reservation_canceled(offer: &Offer, reservation: &Reservation) -> NewNotification {
    NewNotification {
        recipient_id: offer.restaurant_id,
        kind: NotificationKind::ReservationCanceled,
        message: format!(
            "A reservation of {} spot(s) for \"{}\" was canceled",
            reservation.quantity, offer.description
        ),
        offer_id: Some(offer.id),
        reservation_id: Some(reservation.id),
    }
}

pub(super) fn reservation_completed(
    offer: &Offer,
    reservation: &Reservation,
    recipient_id: Uuid,
) -> NewNotification {
    NewNotification {
        recipient_id,
        kind: NotificationKind::ReservationCompleted,
        message: format!(
            "Pickup of {} spot(s) for \"{}\" was marked complete",
            reservation.quantity, offer.description
        ),
        offer_id: Some(offer.id),
        reservation_id: Some(reservation.id),
    }
}

pub(super) fn offer_canceled(offer: &Offer, customer_id: Uuid) -> NewNotification {
    NewNotification {
        recipient_id: customer_id,
        kind: NotificationKind::OfferCanceled,
        message: format!(
            "\"{}\" was canceled by the restaurant, your reservation is canceled",
            offer.description
        ),
        offer_id: Some(offer.id),
        reservation_id: None,
    }
}

pub(super) fn offer_completed(offer: &Offer, customer_id: Uuid) -> NewNotification {
    NewNotification {
        recipient_id: customer_id,
        kind: NotificationKind::OfferCompleted,
        message: format!("\"{}\" was closed by the restaurant", offer.description),
        offer_id: Some(offer.id),
        reservation_id: None,
    }
}
