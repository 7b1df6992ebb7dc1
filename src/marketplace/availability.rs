use uuid::Uuid;

use sqlx::PgPool;

use crate::error::{Error, Result};
use crate::repo::OffersRepo;

/// Derived spot counts, always read from the ledger at call time
pub struct Availability;

impl Availability {
    /// Spots left once active reservations are subtracted
    pub fn compute(total_spots: i32, active_quantity: i64) -> i64 {
        i64::from(total_spots) - active_quantity
    }

    #[tracing::instrument(name = "Compute remaining spots", skip(pool))]
    pub async fn remaining(pool: &PgPool, offer_id: Uuid) -> Result<i64> {
        let listing = OffersRepo::fetch_listing_by_id(pool, offer_id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Offer {}", offer_id)))?;

        Ok(listing.remaining_spots)
    }
}
