use uuid::Uuid;

use chrono::{DateTime, Utc};

use rust_decimal::Decimal;

use serde::{Deserialize, Serialize};

use crate::domain::{Location, OfferDescription, Price, SpotCount, Status};
use crate::error::Result;

/// Offer creation request, already validated field by field
#[derive(Debug, Clone)]
pub struct NewOffer {
    pub description: OfferDescription,
    pub location: Option<Location>,
    pub pickup_time: DateTime<Utc>,
    pub price: Price,
    pub total_spots: SpotCount,
}

impl NewOffer {
    /// Validate raw offer fields.
    /// NOTE: The pickup time can only be checked against the clock at creation
    pub fn parse(
        description: &str,
        location: Option<&str>,
        pickup_time: DateTime<Utc>,
        total_spots: i32,
        price: Decimal,
    ) -> Result<Self> {
        let description: OfferDescription = description.parse()?;
        let location: Option<Location> = location
            .filter(|location| !location.trim().is_empty())
            .map(str::parse)
            .transpose()?;
        let total_spots = SpotCount::try_from(total_spots)?;
        let price = Price::try_from(price)?;

        Ok(Self {
            description,
            location,
            pickup_time,
            price,
            total_spots,
        })
    }
}

/// Stored offer record
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Offer {
    pub id: Uuid,
    /// Owning restaurant, the only actor allowed to mutate the offer
    pub restaurant_id: Uuid,
    pub description: String,
    pub location: Option<String>,
    pub image_url: Option<String>,
    pub pickup_time: DateTime<Utc>,
    pub price: Decimal,
    /// Fixed at creation
    pub total_spots: i32,
    pub status: Status,
    pub created_at: DateTime<Utc>,
}

impl Offer {
    pub fn effective_status(&self, now: DateTime<Utc>) -> Status {
        self.status.effective(self.pickup_time, now)
    }

    /// Replace the stored status with the one callers should see at `now`
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.status = self.effective_status(now);
        self
    }
}

/// Offer with its spot count derived from the reservation ledger
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct OfferListing {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub offer: Offer,
    pub remaining_spots: i64,
}

impl OfferListing {
    pub fn at(self, now: DateTime<Utc>) -> Self {
        Self {
            offer: self.offer.at(now),
            ..self
        }
    }
}

/// Query parameters for browsing offers
#[derive(Debug, Default, Clone, Deserialize)]
pub struct OfferFilter {
    /// Only offers owned by this restaurant
    pub restaurant_id: Option<Uuid>,
    /// Case-insensitive match against description or location
    pub search: Option<String>,
    /// Hide offers that are not active or have no spots left
    #[serde(default)]
    pub available_only: bool,
}
