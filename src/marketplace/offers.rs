use std::collections::BTreeSet;

use uuid::Uuid;

use chrono::Utc;

use sqlx::{PgConnection, PgPool};

use crate::domain::{Actor, Role, Status, Transition};
use crate::error::{Error, Result};
use crate::model::{NewOffer, Offer, OfferFilter, OfferListing};
use crate::repo::{OffersRepo, ReservationsRepo};

use super::notifications::{self, NotificationEmitter};

/// Offers and their lifecycle, mutable only by the owning restaurant
pub struct OfferStore;

impl OfferStore {
    #[tracing::instrument(name = "Create offer", skip(pool))]
    pub async fn create(pool: &PgPool, actor: &Actor, new_offer: &NewOffer) -> Result<Offer> {
        if actor.role != Role::Restaurant {
            return Err(Error::Authorization(
                "Only restaurants can post offers".into(),
            ));
        }
        if new_offer.pickup_time < Utc::now() {
            return Err(Error::Validation(
                "Pickup time cannot be in the past".into(),
            ));
        }

        let offer = OffersRepo::insert(pool, actor, new_offer).await?;
        tracing::info!(offer.id = %offer.id, "Offer created");

        Ok(offer)
    }

    #[tracing::instrument(name = "Get offer", skip(pool))]
    pub async fn get(pool: &PgPool, offer_id: Uuid) -> Result<OfferListing> {
        let listing = OffersRepo::fetch_listing_by_id(pool, offer_id)
            .await?
            .ok_or_else(|| offer_not_found(offer_id))?;

        Ok(listing.at(Utc::now()))
    }

    #[tracing::instrument(name = "List offers", skip(pool))]
    pub async fn list(pool: &PgPool, filter: &OfferFilter) -> Result<Vec<OfferListing>> {
        let now = Utc::now();
        let listings = OffersRepo::fetch_listings(pool, filter, now).await?;

        Ok(listings.into_iter().map(|l| l.at(now)).collect())
    }

    /// Cancel an offer along with every reservation still active on it
    #[tracing::instrument(name = "Cancel offer", skip(pool))]
    pub async fn cancel(pool: &PgPool, offer_id: Uuid, actor: &Actor) -> Result<Offer> {
        let mut tx = pool.begin().await?;

        let offer = lock_owned(&mut *tx, offer_id, actor).await?;
        let offer = apply(&mut *tx, offer, Transition::Cancel).await?;

        let canceled = ReservationsRepo::cancel_active_for_offer(&mut *tx, offer.id).await?;
        let customers: BTreeSet<Uuid> = canceled.iter().map(|r| r.customer_id).collect();
        for customer_id in customers {
            let notification = notifications::offer_canceled(&offer, customer_id);
            NotificationEmitter::emit(&mut *tx, &notification).await?;
        }

        tx.commit().await?;
        tracing::info!(
            offer.id = %offer.id,
            reservations.canceled = canceled.len(),
            "Offer canceled"
        );

        Ok(offer)
    }

    /// Close an offer. Reservations keep their own status.
    #[tracing::instrument(name = "Complete offer", skip(pool))]
    pub async fn complete(pool: &PgPool, offer_id: Uuid, actor: &Actor) -> Result<Offer> {
        let mut tx = pool.begin().await?;

        let offer = lock_owned(&mut *tx, offer_id, actor).await?;
        let offer = apply(&mut *tx, offer, Transition::Complete).await?;

        let active = ReservationsRepo::fetch_active_for_offer(&mut *tx, offer.id).await?;
        let customers: BTreeSet<Uuid> = active.iter().map(|r| r.customer_id).collect();
        for customer_id in customers {
            let notification = notifications::offer_completed(&offer, customer_id);
            NotificationEmitter::emit(&mut *tx, &notification).await?;
        }

        tx.commit().await?;
        tracing::info!(offer.id = %offer.id, "Offer completed");

        Ok(offer)
    }

    /// Check that an actor may change an offer's image, before anything is
    /// uploaded for it
    #[tracing::instrument(name = "Authorize offer image update", skip(pool))]
    pub async fn authorize_image_update(
        pool: &PgPool,
        offer_id: Uuid,
        actor: &Actor,
    ) -> Result<Offer> {
        let offer = OffersRepo::fetch_by_id(pool, offer_id)
            .await?
            .ok_or_else(|| offer_not_found(offer_id))?;
        check_owner(&offer, actor)?;
        check_active(&offer)?;

        Ok(offer)
    }

    #[tracing::instrument(name = "Update offer image", skip(pool))]
    pub async fn update_image(
        pool: &PgPool,
        offer_id: Uuid,
        actor: &Actor,
        image_url: &str,
    ) -> Result<Offer> {
        let mut tx = pool.begin().await?;

        let offer = lock_owned(&mut *tx, offer_id, actor).await?;
        check_active(&offer)?;
        let offer = OffersRepo::update_image(&mut *tx, offer.id, image_url)
            .await?
            .ok_or_else(|| Error::InvalidState("Offer is no longer active".into()))?;

        tx.commit().await?;

        Ok(offer)
    }
}

fn offer_not_found(offer_id: Uuid) -> Error {
    Error::NotFound(format!("Offer {}", offer_id))
}

fn check_owner(offer: &Offer, actor: &Actor) -> Result<()> {
    if actor.is(offer.restaurant_id) {
        Ok(())
    } else {
        Err(Error::Authorization(
            "Only the owning restaurant can change this offer".into(),
        ))
    }
}

fn check_active(offer: &Offer) -> Result<()> {
    match offer.effective_status(Utc::now()) {
        Status::Active => Ok(()),
        status => Err(Error::InvalidState(format!("Offer is {}", status))),
    }
}

/// Lock an offer row for the rest of the transaction, checking ownership
async fn lock_owned(conn: &mut PgConnection, offer_id: Uuid, actor: &Actor) -> Result<Offer> {
    let offer = OffersRepo::lock_by_id(&mut *conn, offer_id)
        .await?
        .ok_or_else(|| offer_not_found(offer_id))?;
    check_owner(&offer, actor)?;

    Ok(offer)
}

/// Move a locked offer through a transition of the status machine
async fn apply(conn: &mut PgConnection, offer: Offer, transition: Transition) -> Result<Offer> {
    let target = offer
        .effective_status(Utc::now())
        .transition(transition)?;

    OffersRepo::update_status(&mut *conn, offer.id, Status::Active, target)
        .await?
        .ok_or_else(|| Error::InvalidState("Offer is no longer active".into()))
}
