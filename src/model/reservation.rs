use uuid::Uuid;

use chrono::{DateTime, Utc};

use serde::Serialize;

use crate::domain::{SpotCount, Status};
use crate::error::Result;
use crate::model::Offer;

/// Reservation request for a number of spots on an offer
#[derive(Debug, Clone)]
pub struct NewReservation {
    pub offer_id: Uuid,
    pub quantity: SpotCount,
}

impl NewReservation {
    pub fn parse(offer_id: Uuid, quantity: i32) -> Result<Self> {
        let quantity = SpotCount::try_from(quantity)?;
        Ok(Self { offer_id, quantity })
    }
}

/// Stored reservation record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Reservation {
    pub id: Uuid,
    pub offer_id: Uuid,
    /// Customer who holds the spots, the only actor allowed to cancel
    pub customer_id: Uuid,
    pub quantity: i32,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    /// A reservation expires with its offer's pickup time
    pub fn effective_status(&self, offer: &Offer, now: DateTime<Utc>) -> Status {
        self.status.effective(offer.pickup_time, now)
    }
}

/// Reservation together with the offer it holds spots on
#[derive(Debug, Clone, Serialize)]
pub struct ReservationView {
    #[serde(flatten)]
    pub reservation: Reservation,
    pub offer: Offer,
}

impl ReservationView {
    pub fn new(mut reservation: Reservation, offer: Offer, now: DateTime<Utc>) -> Self {
        reservation.status = reservation.effective_status(&offer, now);
        Self {
            reservation,
            offer: offer.at(now),
        }
    }
}
