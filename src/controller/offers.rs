use actix_web::dev::HttpServiceFactory;
use actix_web::http::header::CONTENT_TYPE;
use actix_web::{get, post, put, web, HttpRequest, HttpResponse, Responder};

use chrono::{DateTime, Utc};

use rust_decimal::Decimal;

use serde::{Deserialize, Serialize};

use sqlx::PgPool;

use uuid::Uuid;

use crate::client::StorageClient;
use crate::controller::error::{RestError, RestResult};
use crate::domain::Actor;
use crate::marketplace::{Availability, OfferStore};
use crate::model::{NewOffer, OfferFilter};

/// JSON body for posting a new offer
#[derive(Debug, Deserialize)]
pub struct NewOfferBody {
    description: String,
    location: Option<String>,
    pickup_time: DateTime<Utc>,
    total_spots: i32,
    price: Decimal,
}

impl TryFrom<NewOfferBody> for NewOffer {
    type Error = RestError;

    fn try_from(body: NewOfferBody) -> RestResult<Self> {
        let offer = NewOffer::parse(
            &body.description,
            body.location.as_deref(),
            body.pickup_time,
            body.total_spots,
            body.price,
        )?;
        Ok(offer)
    }
}

#[derive(Debug, Serialize)]
struct AvailabilityBody {
    offer_id: Uuid,
    remaining_spots: i64,
}

#[tracing::instrument(name = "List offers", skip(pool))]
#[get("")]
async fn list(
    _actor: Actor,
    filter: web::Query<OfferFilter>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let listings = OfferStore::list(pool.get_ref(), &filter).await?;

    Ok(HttpResponse::Ok().json(listings))
}

#[tracing::instrument(name = "Post a new offer", skip(pool, body))]
#[post("")]
async fn create(
    actor: Actor,
    body: web::Json<NewOfferBody>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let new_offer: NewOffer = body.into_inner().try_into()?;
    let offer = OfferStore::create(pool.get_ref(), &actor, &new_offer).await?;

    Ok(HttpResponse::Created().json(offer))
}

#[tracing::instrument(name = "Get an offer", skip(pool))]
#[get("/{offer_id}")]
async fn get(
    _actor: Actor,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (offer_id,) = path.into_inner();
    let listing = OfferStore::get(pool.get_ref(), offer_id).await?;

    Ok(HttpResponse::Ok().json(listing))
}

#[tracing::instrument(name = "Get offer availability", skip(pool))]
#[get("/{offer_id}/availability")]
async fn availability(
    _actor: Actor,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (offer_id,) = path.into_inner();
    let remaining_spots = Availability::remaining(pool.get_ref(), offer_id).await?;

    Ok(HttpResponse::Ok().json(AvailabilityBody {
        offer_id,
        remaining_spots,
    }))
}

#[tracing::instrument(name = "Cancel an offer", skip(pool))]
#[post("/{offer_id}/cancel")]
async fn cancel(
    actor: Actor,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (offer_id,) = path.into_inner();
    let offer = OfferStore::cancel(pool.get_ref(), offer_id, &actor).await?;

    Ok(HttpResponse::Ok().json(offer))
}

#[tracing::instrument(name = "Complete an offer", skip(pool))]
#[post("/{offer_id}/complete")]
async fn complete(
    actor: Actor,
    path: web::Path<(Uuid,)>,
    pool: web::Data<PgPool>,
) -> RestResult<impl Responder> {
    let (offer_id,) = path.into_inner();
    let offer = OfferStore::complete(pool.get_ref(), offer_id, &actor).await?;

    Ok(HttpResponse::Ok().json(offer))
}

/// Upload a new image for an offer and point the offer at it.
///
/// The raw request body is the image; its `Content-Type` is passed through
/// to the object store.
#[tracing::instrument(
    name = "Upload offer image",
    skip(req, body, pool, storage_client),
    fields(image.len = body.len())
)]
#[put("/{offer_id}/image")]
async fn upload_image(
    actor: Actor,
    req: HttpRequest,
    path: web::Path<(Uuid,)>,
    body: web::Bytes,
    pool: web::Data<PgPool>,
    storage_client: web::Data<StorageClient>,
) -> RestResult<impl Responder> {
    let (offer_id,) = path.into_inner();
    let pool = pool.get_ref();

    let content_type = image_content_type(&req)?;
    if body.is_empty() {
        return Err(RestError::ParseError("Image body is empty".into()));
    }

    // Refuse before uploading anything for an offer the actor can't change
    OfferStore::authorize_image_update(pool, offer_id, &actor).await?;

    let key = format!("offers/{}/{}", offer_id, Uuid::new_v4());
    let image_url = storage_client.put(&key, &content_type, body).await?;
    let offer = OfferStore::update_image(pool, offer_id, &actor, image_url.as_str()).await?;

    Ok(HttpResponse::Ok().json(offer))
}

fn image_content_type(req: &HttpRequest) -> RestResult<String> {
    let content_type = req
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| RestError::ParseError("Missing image content type".into()))?;

    if !content_type.starts_with("image/") {
        return Err(RestError::ParseError(format!(
            "{} is not an image content type",
            content_type
        )));
    }
    Ok(content_type.to_string())
}

/// Offer API endpoints
pub fn scope() -> impl HttpServiceFactory {
    web::scope("/offers")
        .service(list)
        .service(create)
        .service(get)
        .service(availability)
        .service(cancel)
        .service(complete)
        .service(upload_image)
}
