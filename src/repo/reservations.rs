use uuid::Uuid;

use sqlx::PgExecutor;

use crate::domain::Status;
use crate::model::{NewReservation, Reservation};

/// Repository for interfacing with the reservations table
pub struct ReservationsRepo;

impl ReservationsRepo {
    #[tracing::instrument(name = "Insert reservation", skip(executor))]
    pub async fn insert<'con>(
        executor: impl PgExecutor<'con>,
        customer_id: Uuid,
        new_reservation: &NewReservation,
    ) -> sqlx::Result<Reservation> {
        sqlx::query_as::<_, Reservation>(
            "insert into reservations(offer_id, customer_id, quantity)
            values ($1, $2, $3)
            returning *",
        )
        .bind(new_reservation.offer_id)
        .bind(customer_id)
        .bind(new_reservation.quantity.get())
        .fetch_one(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch reservation by id", skip(executor))]
    pub async fn fetch_by_id<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
    ) -> sqlx::Result<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>("select * from reservations where id=$1")
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Total quantity held by active reservations on an offer
    #[tracing::instrument(name = "Sum active reservation quantity", skip(executor))]
    pub async fn active_quantity<'con>(
        executor: impl PgExecutor<'con>,
        offer_id: Uuid,
    ) -> sqlx::Result<i64> {
        sqlx::query_scalar::<_, i64>(
            "select coalesce(sum(quantity), 0)::bigint
            from reservations
            where offer_id=$1 and status='active'",
        )
        .bind(offer_id)
        .fetch_one(executor)
        .await
    }

    /// Move a reservation from one status to another.
    /// Returns `None` if the reservation was no longer in the `from` status.
    #[tracing::instrument(name = "Update reservation status", skip(executor))]
    pub async fn update_status<'con>(
        executor: impl PgExecutor<'con>,
        id: Uuid,
        from: Status,
        to: Status,
    ) -> sqlx::Result<Option<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "update reservations set status=$3 where id=$1 and status=$2 returning *",
        )
        .bind(id)
        .bind(from)
        .bind(to)
        .fetch_optional(executor)
        .await
    }

    /// Cancel every active reservation on an offer, returning the ones changed
    #[tracing::instrument(name = "Cancel active reservations for offer", skip(executor))]
    pub async fn cancel_active_for_offer<'con>(
        executor: impl PgExecutor<'con>,
        offer_id: Uuid,
    ) -> sqlx::Result<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "update reservations set status='canceled'
            where offer_id=$1 and status='active'
            returning *",
        )
        .bind(offer_id)
        .fetch_all(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch active reservations for offer", skip(executor))]
    pub async fn fetch_active_for_offer<'con>(
        executor: impl PgExecutor<'con>,
        offer_id: Uuid,
    ) -> sqlx::Result<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "select * from reservations where offer_id=$1 and status='active' order by created_at",
        )
        .bind(offer_id)
        .fetch_all(executor)
        .await
    }

    #[tracing::instrument(name = "Fetch reservations for customer", skip(executor))]
    pub async fn fetch_by_customer<'con>(
        executor: impl PgExecutor<'con>,
        customer_id: Uuid,
    ) -> sqlx::Result<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "select * from reservations where customer_id=$1 order by created_at desc",
        )
        .bind(customer_id)
        .fetch_all(executor)
        .await
    }

    /// Reservations made against any offer owned by a restaurant
    #[tracing::instrument(name = "Fetch reservations for restaurant", skip(executor))]
    pub async fn fetch_by_restaurant<'con>(
        executor: impl PgExecutor<'con>,
        restaurant_id: Uuid,
    ) -> sqlx::Result<Vec<Reservation>> {
        sqlx::query_as::<_, Reservation>(
            "select r.* from reservations r
            join offers o on o.id = r.offer_id
            where o.restaurant_id=$1
            order by r.created_at desc",
        )
        .bind(restaurant_id)
        .fetch_all(executor)
        .await
    }
}
