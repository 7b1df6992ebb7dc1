use uuid::Uuid;

use chrono::{DateTime, Utc};

use sqlx::PgExecutor;

use crate::domain::{Actor, Status};
use crate::model::{NewOffer, Offer, OfferFilter, OfferListing};

/// Offer columns plus the spots left over by active reservations
const LISTING_SELECT: &str = "
    select o.*, o.total_spots - coalesce(reserved.quantity, 0) as remaining_spots
    from offers o
    left join lateral (
        select sum(r.quantity) as quantity
        from reservations r
        where r.offer_id = o.id and r.status = 'active'
    ) reserved on true";

/// Repository for interfacing with the offers table
pub struct OffersRepo;

impl OffersRepo {
    #[tracing::instrument(name = "Insert offer", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        restaurant: &Actor,
        new_offer: &NewOffer,
    ) -> sqlx::Result<Offer> {
        sqlx::query_as::<_, Offer>(
            "insert into offers(restaurant_id, description, location, pickup_time, price, total_spots)
            values ($1, $2, $3, $4, $5, $6)
            returning *",
        )
        .bind(restaurant.id)
        .bind(new_offer.description.as_ref())
        .bind(new_offer.location.as_ref().map(|l| l.as_ref().to_string()))
        .bind(new_offer.pickup_time)
        .bind(new_offer.price.amount())
        .bind(new_offer.total_spots.get())
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch offer by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<Offer>> {
        sqlx::query_as::<_, Offer>("select * from offers where id=$1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Fetch an offer and hold its row lock until the transaction ends.
    /// NOTE: Every capacity check must go through this to be serialized.
    /// `no key update` still lets foreign key checks from reservation and
    /// notification inserts take their key-share lock on the row.
    #[tracing::instrument(name = "Lock offer by id", skip(executor))]
    pub async fn lock_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<Offer>> {
        sqlx::query_as::<_, Offer>("select * from offers where id=$1 for no key update")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    #[tracing::instrument(name = "Fetch offers by ids", skip(executor))]
    pub async fn fetch_by_ids<'con>(
        executor: impl PgExecutor<'con>,
        ids: &[Uuid],
    ) -> sqlx::Result<Vec<Offer>> {
        sqlx::query_as::<_, Offer>("select * from offers where id = any($1)")
            .bind(ids)
            .fetch_all(executor)
            .await
    }

    #[tracing::instrument(name = "Fetch offer listing by id", skip(executor))]
    pub async fn fetch_listing_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<OfferListing>> {
        let query = format!("{} where o.id = $1", LISTING_SELECT);
        sqlx::query_as::<_, OfferListing>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    #[tracing::instrument(name = "Fetch offer listings", skip(executor))]
    pub async fn fetch_listings<'con>(
        executor: impl PgExecutor<'con>,
        filter: &OfferFilter,
        now: DateTime<Utc>,
    ) -> sqlx::Result<Vec<OfferListing>> {
        let query = format!(
            "{}
            where ($1::uuid is null or o.restaurant_id = $1)
              and ($2::text is null or o.description ilike $2 or o.location ilike $2)
              and (not $3 or (
                o.status = 'active'
                and o.pickup_time >= $4
                and o.total_spots - coalesce(reserved.quantity, 0) > 0
              ))
            order by o.pickup_time asc, o.created_at asc",
            LISTING_SELECT
        );
        let pattern = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|search| !search.is_empty())
            .map(|search| format!("%{}%", escape_like(search)));

        sqlx::query_as::<_, OfferListing>(&query)
            .bind(filter.restaurant_id)
            .bind(pattern)
            .bind(filter.available_only)
            .bind(now)
            .fetch_all(executor)
            .await
    }

    /// Move an offer from one status to another.
    /// Returns `None` if the offer was no longer in the `from` status.
    #[tracing::instrument(name = "Update offer status", skip(executor))]
    pub async fn update_status<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
        from: Status,
        to: Status,
    ) -> sqlx::Result<Option<Offer>> {
        sqlx::query_as::<_, Offer>(
            "update offers set status=$3 where id=$1 and status=$2 returning *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(executor)
        .await
    }

    /// Store a new image reference on an active offer
    #[tracing::instrument(name = "Update offer image", skip(executor))]
    pub async fn update_image<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
        image_url: &str,
    ) -> sqlx::Result<Option<Offer>> {
        sqlx::query_as::<_, Offer>(
            "update offers set image_url=$2 where id=$1 and status='active' returning *",
        )
        .bind(id)
        .bind(image_url)
        .fetch_optional(executor)
        .await
    }
}

/// Escape the LIKE wildcards in user supplied search text
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
