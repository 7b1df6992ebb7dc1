use reqwest::StatusCode;

use serde_json::Value;

use sqlx::PgPool;

use uuid::Uuid;

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use misky::domain::Actor;

use crate::helpers::{error_kind, id_of, NewOffer, NewReservation, TestApp, STORAGE_BUCKET};

#[sqlx::test]
async fn create_returns_created_offer_for_restaurant(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let restaurant = Actor::restaurant(Uuid::new_v4());

    let res = app
        .offer_create(Some(restaurant), &NewOffer::valid(4))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::CREATED, res.status());

    let body: Value = res.json().await.expect("Failed to parse offer");
    assert_eq!("active", body["status"]);
    assert_eq!(4, body["total_spots"]);
    assert_eq!(restaurant.id.to_string(), body["restaurant_id"]);

    let (count,): (i64,) = sqlx::query_as("select count(*) from offers")
        .fetch_one(&pool)
        .await?;
    assert_eq!(1, count);

    Ok(())
}

#[sqlx::test]
async fn create_requires_a_valid_token(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .offer_create(None, &NewOffer::valid(4))
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());
    assert_eq!("unauthenticated", error_kind(res).await);

    let res = app
        .request(reqwest::Method::POST, "offers")
        .bearer_auth("not-a.token")
        .json(&NewOffer::valid(4))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::UNAUTHORIZED, res.status());

    Ok(())
}

#[sqlx::test]
async fn create_is_forbidden_for_customers(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;

    let res = app
        .offer_create(Some(Actor::customer(Uuid::new_v4())), &NewOffer::valid(4))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::FORBIDDEN, res.status());
    assert_eq!("authorization", error_kind(res).await);

    Ok(())
}

#[sqlx::test]
async fn create_returns_bad_request_for_invalid_data(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let restaurant = Actor::restaurant(Uuid::new_v4());

    let valid = NewOffer::valid(4);
    let test_cases = vec![
        (
            "zero spots",
            NewOffer {
                total_spots: 0,
                ..valid.clone()
            },
        ),
        (
            "negative price",
            NewOffer {
                price: "-1.00".into(),
                ..valid.clone()
            },
        ),
        (
            "sub-cent price",
            NewOffer {
                price: "1.005".into(),
                ..valid.clone()
            },
        ),
        (
            "blank description",
            NewOffer {
                description: "   ".into(),
                ..valid.clone()
            },
        ),
        (
            "pickup in the past",
            NewOffer {
                pickup_time: chrono::Utc::now() - chrono::Duration::hours(1),
                ..valid.clone()
            },
        ),
    ];

    for (case, new_offer) in test_cases {
        let res = app
            .offer_create(Some(restaurant), &new_offer)
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "The API did not fail with 400 Bad Request when the payload had {}",
            case
        );
        assert_eq!("validation", error_kind(res).await);
    }

    Ok(())
}

#[sqlx::test]
async fn get_returns_not_found_for_unknown_offer(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let customer = Actor::customer(Uuid::new_v4());

    let res = app
        .authorized_request(
            reqwest::Method::GET,
            &format!("offers/{}", Uuid::new_v4()),
            Some(customer),
        )
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::NOT_FOUND, res.status());
    assert_eq!("not_found", error_kind(res).await);

    Ok(())
}

#[sqlx::test]
async fn list_filters_by_restaurant_and_availability(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let restaurant = Actor::restaurant(Uuid::new_v4());
    let other = Actor::restaurant(Uuid::new_v4());
    let customer = Actor::customer(Uuid::new_v4());

    let full = app.posted_offer(restaurant, 1).await;
    let open = app.posted_offer(restaurant, 3).await;
    app.posted_offer(other, 2).await;

    let res = app
        .reservation_create(
            customer,
            &NewReservation {
                offer_id: full,
                quantity: 1,
            },
        )
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CREATED, res.status());

    let listings: Vec<Value> = app
        .offers_list(customer, &format!("?restaurant_id={}", restaurant.id))
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse listings");
    assert_eq!(2, listings.len());

    let listings: Vec<Value> = app
        .offers_list(
            customer,
            &format!("?restaurant_id={}&available_only=true", restaurant.id),
        )
        .await
        .expect("Failed to execute request")
        .json()
        .await
        .expect("Failed to parse listings");
    assert_eq!(1, listings.len());
    assert_eq!(open, id_of(&listings[0]));
    assert_eq!(3, listings[0]["remaining_spots"]);

    Ok(())
}

#[sqlx::test]
async fn cancel_is_owner_only_and_final(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let restaurant = Actor::restaurant(Uuid::new_v4());
    let offer_id = app.posted_offer(restaurant, 2).await;

    let res = app
        .offer_action(Actor::restaurant(Uuid::new_v4()), offer_id, "cancel")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());

    let res = app
        .offer_action(restaurant, offer_id, "cancel")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());
    let body: Value = res.json().await.expect("Failed to parse offer");
    assert_eq!("canceled", body["status"]);

    let res = app
        .offer_action(restaurant, offer_id, "complete")
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::CONFLICT, res.status());
    assert_eq!("invalid_state", error_kind(res).await);

    Ok(())
}

#[sqlx::test]
async fn image_upload_stores_public_url(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let restaurant = Actor::restaurant(Uuid::new_v4());
    let offer_id = app.posted_offer(restaurant, 2).await;

    Mock::given(method("POST"))
        .and(path_regex(format!(
            r"^/storage/v1/object/{}/offers/{}/[0-9a-f-]+$",
            STORAGE_BUCKET, offer_id
        )))
        .and(header("Content-Type", "image/png"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.storage_server)
        .await;

    let res = app
        .offer_image_upload(restaurant, offer_id, "image/png", vec![137, 80, 78, 71])
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::OK, res.status());

    let body: Value = res.json().await.expect("Failed to parse offer");
    let image_url = body["image_url"].as_str().expect("Missing image URL");
    assert!(image_url.starts_with(&format!(
        "{}/storage/v1/object/public/{}/offers/{}/",
        app.storage_server.uri(),
        STORAGE_BUCKET,
        offer_id
    )));

    Ok(())
}

#[sqlx::test]
async fn image_upload_is_refused_before_storing_for_non_owner(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let restaurant = Actor::restaurant(Uuid::new_v4());
    let offer_id = app.posted_offer(restaurant, 2).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.storage_server)
        .await;

    let res = app
        .offer_image_upload(
            Actor::restaurant(Uuid::new_v4()),
            offer_id,
            "image/png",
            vec![1, 2, 3],
        )
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::FORBIDDEN, res.status());

    let res = app
        .offer_image_upload(restaurant, offer_id, "text/plain", vec![1, 2, 3])
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::BAD_REQUEST, res.status());

    Ok(())
}

#[sqlx::test]
async fn image_upload_reports_storage_failure(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let restaurant = Actor::restaurant(Uuid::new_v4());
    let offer_id = app.posted_offer(restaurant, 2).await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&app.storage_server)
        .await;

    let res = app
        .offer_image_upload(restaurant, offer_id, "image/jpeg", vec![1, 2, 3])
        .await
        .expect("Failed to execute request");
    assert_eq!(StatusCode::BAD_GATEWAY, res.status());
    assert_eq!("storage", error_kind(res).await);

    let (image_url,): (Option<String>,) =
        sqlx::query_as("select image_url from offers where id = $1")
            .bind(offer_id)
            .fetch_one(&pool)
            .await?;
    assert!(image_url.is_none());

    Ok(())
}

#[sqlx::test]
async fn image_upload_rejects_oversized_payload(pool: PgPool) -> sqlx::Result<()> {
    let app = TestApp::spawn(&pool).await;
    let restaurant = Actor::restaurant(Uuid::new_v4());
    let offer_id = app.posted_offer(restaurant, 2).await;

    let res = app
        .offer_image_upload(restaurant, offer_id, "image/png", vec![0; 4096])
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::PAYLOAD_TOO_LARGE, res.status());

    Ok(())
}
