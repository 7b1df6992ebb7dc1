use std::collections::HashMap;

use uuid::Uuid;

use chrono::Utc;

use sqlx::{PgConnection, PgPool};

use crate::domain::{Actor, Role, Status, Transition};
use crate::error::{Error, Result};
use crate::model::{NewReservation, Offer, Reservation, ReservationView};
use crate::repo::{OffersRepo, ReservationsRepo};

use super::notifications::{self, NotificationEmitter};
use super::Availability;

/// Customer reservations and the capacity invariant: the active quantity on
/// an offer never exceeds its total spots.
pub struct ReservationLedger;

impl ReservationLedger {
    /// Reserve spots on an offer.
    ///
    /// The offer row stays locked from the capacity check until commit, so
    /// concurrent reservations on one offer are checked one after another.
    #[tracing::instrument(name = "Create reservation", skip(pool))]
    pub async fn create(
        pool: &PgPool,
        actor: &Actor,
        new_reservation: &NewReservation,
    ) -> Result<Reservation> {
        if actor.role != Role::Customer {
            return Err(Error::Authorization(
                "Only customers can reserve spots".into(),
            ));
        }

        let mut tx = pool.begin().await?;

        let offer = OffersRepo::lock_by_id(&mut *tx, new_reservation.offer_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Offer {}", new_reservation.offer_id)))?;

        let status = offer.effective_status(Utc::now());
        if status != Status::Active {
            return Err(Error::InvalidState(format!("Offer is {}", status)));
        }

        let reserved = ReservationsRepo::active_quantity(&mut *tx, offer.id).await?;
        let remaining = Availability::compute(offer.total_spots, reserved);
        let requested = new_reservation.quantity.get();
        if remaining < i64::from(requested) {
            return Err(Error::CapacityExceeded {
                requested,
                remaining: remaining.max(0),
            });
        }

        let reservation = ReservationsRepo::insert(&mut *tx, actor.id, new_reservation).await?;
        let notification = notifications::reservation_created(&offer, &reservation);
        NotificationEmitter::emit(&mut *tx, &notification).await?;

        tx.commit().await?;
        tracing::info!(
            reservation.id = %reservation.id,
            offer.id = %offer.id,
            remaining = remaining - i64::from(requested),
            "Reservation created"
        );

        Ok(reservation)
    }

    /// Cancel a reservation, releasing its spots. Only its customer may.
    #[tracing::instrument(name = "Cancel reservation", skip(pool))]
    pub async fn cancel(pool: &PgPool, reservation_id: Uuid, actor: &Actor) -> Result<Reservation> {
        let mut tx = pool.begin().await?;

        let (reservation, offer) = fetch_with_offer(&mut *tx, reservation_id).await?;
        if !actor.is(reservation.customer_id) {
            return Err(Error::Authorization(
                "Only the customer who made a reservation can cancel it".into(),
            ));
        }

        let reservation = apply(&mut *tx, reservation, &offer, Transition::Cancel).await?;
        let notification = notifications::reservation_canceled(&offer, &reservation);
        NotificationEmitter::emit(&mut *tx, &notification).await?;

        tx.commit().await?;
        tracing::info!(reservation.id = %reservation.id, "Reservation canceled");

        Ok(reservation)
    }

    /// Mark a pickup as done. Either the customer or the offer's restaurant
    /// may, and the other one is notified.
    #[tracing::instrument(name = "Complete reservation", skip(pool))]
    pub async fn complete(
        pool: &PgPool,
        reservation_id: Uuid,
        actor: &Actor,
    ) -> Result<Reservation> {
        let mut tx = pool.begin().await?;

        let (reservation, offer) = fetch_with_offer(&mut *tx, reservation_id).await?;
        let counterparty = if actor.is(reservation.customer_id) {
            offer.restaurant_id
        } else if actor.is(offer.restaurant_id) {
            reservation.customer_id
        } else {
            return Err(Error::Authorization(
                "Only the customer or the offer's restaurant can complete a reservation".into(),
            ));
        };

        let reservation = apply(&mut *tx, reservation, &offer, Transition::Complete).await?;
        let notification = notifications::reservation_completed(&offer, &reservation, counterparty);
        NotificationEmitter::emit(&mut *tx, &notification).await?;

        tx.commit().await?;
        tracing::info!(reservation.id = %reservation.id, "Reservation completed");

        Ok(reservation)
    }

    /// Reservations visible to an actor: a customer's own, or those made on a
    /// restaurant's offers
    #[tracing::instrument(name = "List reservations", skip(pool))]
    pub async fn list_for(pool: &PgPool, actor: &Actor) -> Result<Vec<ReservationView>> {
        let reservations = match actor.role {
            Role::Customer => ReservationsRepo::fetch_by_customer(pool, actor.id).await?,
            Role::Restaurant => ReservationsRepo::fetch_by_restaurant(pool, actor.id).await?,
        };

        let mut offer_ids: Vec<Uuid> = reservations.iter().map(|r| r.offer_id).collect();
        offer_ids.sort();
        offer_ids.dedup();
        let offers: HashMap<Uuid, Offer> = OffersRepo::fetch_by_ids(pool, &offer_ids)
            .await?
            .into_iter()
            .map(|offer| (offer.id, offer))
            .collect();

        let now = Utc::now();
        let views = reservations
            .into_iter()
            .filter_map(|reservation| {
                let offer = offers.get(&reservation.offer_id)?.clone();
                Some(ReservationView::new(reservation, offer, now))
            })
            .collect();

        Ok(views)
    }
}

async fn fetch_with_offer(
    conn: &mut PgConnection,
    reservation_id: Uuid,
) -> Result<(Reservation, Offer)> {
    let reservation = ReservationsRepo::fetch_by_id(&mut *conn, reservation_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Reservation {}", reservation_id)))?;
    let offer = OffersRepo::fetch_by_id(&mut *conn, reservation.offer_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("Offer {}", reservation.offer_id)))?;

    Ok((reservation, offer))
}

/// Conditionally move a reservation out of `Active`.
/// NOTE: A concurrent transition that lands first makes this fail its precondition
async fn apply(
    conn: &mut PgConnection,
    reservation: Reservation,
    offer: &Offer,
    transition: Transition,
) -> Result<Reservation> {
    let target = reservation
        .effective_status(offer, Utc::now())
        .transition(transition)?;

    ReservationsRepo::update_status(&mut *conn, reservation.id, Status::Active, target)
        .await?
        .ok_or_else(|| Error::InvalidState("Reservation is no longer active".into()))
}
