use std::net::TcpListener;
use std::time::Duration;

use chrono::{DateTime, Utc};

use reqwest::{Client, Method, Response};

use sqlx::PgPool;

use secrecy::Secret;

use serde::Serialize;
use serde_json::Value;

use url::Url;

use uuid::Uuid;

use wiremock::MockServer;

use misky::app;
use misky::client::StorageClient;
use misky::crypto::{AccessToken, SigningKey};
use misky::domain::Actor;

pub const STORAGE_BUCKET: &str = "offer-images";

#[derive(Debug, Clone, Serialize)]
pub struct NewOffer {
    pub description: String,
    pub location: Option<String>,
    pub pickup_time: DateTime<Utc>,
    pub total_spots: i32,
    pub price: String,
}

impl NewOffer {
    /// A valid offer picked up two hours from now
    pub fn valid(total_spots: i32) -> Self {
        Self {
            description: "Three loaves of sourdough".into(),
            location: Some("Back door".into()),
            pickup_time: Utc::now() + chrono::Duration::hours(2),
            total_spots,
            price: "4.50".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReservation {
    pub offer_id: Uuid,
    pub quantity: i32,
}

pub struct TestApp {
    addr: String,
    signing_key: SigningKey,

    pub client: Client,
    pub storage_server: MockServer,
}

impl TestApp {
    pub async fn spawn(pool: &PgPool) -> Self {
        use rand::{distributions::Alphanumeric, Rng};

        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let signing_key = {
            let rand_key: String = rand::thread_rng()
                .sample_iter(&Alphanumeric)
                .take(32)
                .map(char::from)
                .collect();
            let rand_key = Secret::new(rand_key);

            SigningKey::new(&rand_key).expect("Failed to create crypto signing key")
        };

        let storage_server = MockServer::start().await;

        let storage_client = {
            let api_base_url = Url::parse(&format!("{}/storage/v1/", storage_server.uri()))
                .expect("Failed to parse mock server uri");
            let api_auth_token = Secret::new("TestAuthorization".into());
            let api_timeout = Duration::from_secs(2);

            StorageClient::new(
                api_base_url,
                STORAGE_BUCKET.into(),
                api_timeout,
                api_auth_token,
            )
            .expect("Failed to create storage client")
        };

        let server = app::run(
            listener,
            pool.clone(),
            signing_key.clone(),
            storage_client,
            1024,
        )
        .expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        Self {
            addr,
            signing_key,
            client,
            storage_server,
        }
    }

    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    /// Mint an access token the way the identity provider would
    pub fn token_for(&self, actor: Actor) -> AccessToken {
        AccessToken::issue(actor)
            .expires_in(chrono::Duration::minutes(5))
            .sign(&self.signing_key)
            .expect("Failed to sign access token")
    }

    pub fn authorized_request(
        &self,
        method: Method,
        url: &str,
        actor: Option<Actor>,
    ) -> reqwest::RequestBuilder {
        let req = self.request(method, url);
        if let Some(actor) = actor {
            req.bearer_auth(self.token_for(actor))
        } else {
            req
        }
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health_check").send().await
    }

    pub async fn offer_create(
        &self,
        actor: Option<Actor>,
        new_offer: &NewOffer,
    ) -> reqwest::Result<Response> {
        self.authorized_request(Method::POST, "offers", actor)
            .json(new_offer)
            .send()
            .await
    }

    /// Post a valid offer and return its ID
    pub async fn posted_offer(&self, restaurant: Actor, total_spots: i32) -> Uuid {
        let res = self
            .offer_create(Some(restaurant), &NewOffer::valid(total_spots))
            .await
            .expect("Failed to execute request");
        assert_eq!(201, res.status().as_u16());

        let body: Value = res.json().await.expect("Failed to parse offer");
        id_of(&body)
    }

    pub async fn offers_list(&self, actor: Actor, query: &str) -> reqwest::Result<Response> {
        self.authorized_request(Method::GET, &format!("offers{}", query), Some(actor))
            .send()
            .await
    }

    pub async fn offer_availability(&self, actor: Actor, offer_id: Uuid) -> i64 {
        let body: Value = self
            .authorized_request(
                Method::GET,
                &format!("offers/{}/availability", offer_id),
                Some(actor),
            )
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse availability");

        body["remaining_spots"]
            .as_i64()
            .expect("Missing remaining spots")
    }

    pub async fn offer_action(
        &self,
        actor: Actor,
        offer_id: Uuid,
        action: &str,
    ) -> reqwest::Result<Response> {
        self.authorized_request(
            Method::POST,
            &format!("offers/{}/{}", offer_id, action),
            Some(actor),
        )
        .send()
        .await
    }

    pub async fn offer_image_upload(
        &self,
        actor: Actor,
        offer_id: Uuid,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> reqwest::Result<Response> {
        self.authorized_request(
            Method::PUT,
            &format!("offers/{}/image", offer_id),
            Some(actor),
        )
        .header(reqwest::header::CONTENT_TYPE, content_type)
        .body(bytes)
        .send()
        .await
    }

    pub async fn reservation_create(
        &self,
        actor: Actor,
        new_reservation: &NewReservation,
    ) -> reqwest::Result<Response> {
        self.authorized_request(Method::POST, "reservations", Some(actor))
            .json(new_reservation)
            .send()
            .await
    }

    pub async fn reservation_action(
        &self,
        actor: Actor,
        reservation_id: Uuid,
        action: &str,
    ) -> reqwest::Result<Response> {
        self.authorized_request(
            Method::POST,
            &format!("reservations/{}/{}", reservation_id, action),
            Some(actor),
        )
        .send()
        .await
    }

    pub async fn reservations_list(&self, actor: Actor) -> Vec<Value> {
        self.authorized_request(Method::GET, "reservations", Some(actor))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse reservations")
    }

    pub async fn notifications_list(&self, actor: Actor) -> Vec<Value> {
        self.authorized_request(Method::GET, "notifications", Some(actor))
            .send()
            .await
            .expect("Failed to execute request")
            .json()
            .await
            .expect("Failed to parse notifications")
    }

    pub async fn notification_read(
        &self,
        actor: Actor,
        notification_id: Uuid,
    ) -> reqwest::Result<Response> {
        self.authorized_request(
            Method::POST,
            &format!("notifications/{}/read", notification_id),
            Some(actor),
        )
        .send()
        .await
    }
}

pub fn id_of(body: &Value) -> Uuid {
    body["id"]
        .as_str()
        .and_then(|id| id.parse().ok())
        .expect("Missing entity ID")
}

pub async fn error_kind(res: Response) -> String {
    let body: Value = res.json().await.expect("Failed to parse error body");
    body["kind"].as_str().expect("Missing error kind").to_string()
}
