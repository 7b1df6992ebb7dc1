use actix_web::dev::HttpServiceFactory;
use actix_web::{get, post, web, HttpResponse, Responder};

use sqlx::PgPool;

use uuid::Uuid;

use crate::controller::error::RestResult;
use crate::domain::Actor;
use crate::marketplace::NotificationEmitter;

#[tracing::instrument(name = "List notifications", skip(pool))]
#[get("")]
async fn list(actor: Actor, pool: web::Data<PgPool>) -> RestResult<impl Responder> {
    let notifications = NotificationEmitter::list_for(pool.get_ref(), &actor).await?;

    Ok(HttpResponse::Ok().json(notifications))
}

#[tracing::instrument(name = "Mark a notification read", skip(pool))]
#[post("/{notification_id}/read")]
async fn read(
    actor: Actor,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (notification_id,) = path.into_inner();
    let notification = NotificationEmitter::mark_read(pool.get_ref(), notification_id, &actor).await?;

    Ok(HttpResponse::Ok().json(notification))
}

/// Notification API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/notifications").service(list).service(read)
}
