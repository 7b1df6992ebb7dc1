use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use serde::Deserialize;

use sqlx::PgPool;

use uuid::Uuid;

use crate::controller::error::RestResult;
use crate::domain::Actor;
use crate::marketplace::ReservationLedger;
use crate::model::NewReservation;

#[derive(Debug, Deserialize)]
pub struct NewReservationBody {
    offer_id: Uuid,
    quantity: i32,
}

#[tracing::instrument(name = "List reservations", skip(pool))]
#[get("")]
async fn list(actor: Actor, pool: web::Data<PgPool>) -> RestResult<impl Responder> {
    let reservations = ReservationLedger::list_for(pool.get_ref(), &actor).await?;

    Ok(HttpResponse::Ok().json(reservations))
}

#[tracing::instrument(name = "Reserve spots", skip(pool))]
#[post("")]
async fn create(
    actor: Actor,
    body: web::Json<NewReservationBody>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let new_reservation = NewReservation::parse(body.offer_id, body.quantity)?;
    let reservation = ReservationLedger::create(pool.get_ref(), &actor, &new_reservation).await?;

    Ok(HttpResponse::Created().json(reservation))
}

#[tracing::instrument(name = "Cancel a reservation", skip(pool))]
#[post("/{reservation_id}/cancel")]
async fn cancel(
    actor: Actor,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (reservation_id,) = path.into_inner();
    let reservation = ReservationLedger::cancel(pool.get_ref(), reservation_id, &actor).await?;

    Ok(HttpResponse::Ok().json(reservation))
}

#[tracing::instrument(name = "Complete a reservation", skip(pool))]
#[post("/{reservation_id}/complete")]
async fn complete(
    actor: Actor,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (reservation_id,) = path.into_inner();
    let reservation = ReservationLedger::complete(pool.get_ref(), reservation_id, &actor).await?;

    Ok(HttpResponse::Ok().json(reservation))
}

/// Reservation API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/reservations")
        .service(list)
        .service(create)
        .service(cancel)
        .service(complete)
}
