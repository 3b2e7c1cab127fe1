//! End-to-end offer intake over the HTTP router and the SQLite store:
//! find-or-create by contact, the raise/reject branch, and the durable
//! notification queue.

mod common {
    use std::sync::{Arc, Mutex};

    use chrono::Utc;

    pub(crate) use landivo::store::Pool;
    use landivo::notifications::{EmailError, EmailMessage, EmailSender};
    use landivo::offers::{offer_router, OfferService};
    use landivo::properties::{Property, PropertyId, PropertyRepository};
    use landivo::store::{
        self, SqliteBuyerRepository, SqliteOfferRepository, SqlitePropertyRepository,
    };

    pub(crate) async fn setup_pool() -> Pool {
        let pool = store::init_pool("sqlite::memory:")
            .await
            .expect("pool opens");
        store::run_migrations(&pool).await.expect("migrations run");
        pool
    }

    pub(crate) fn property() -> Property {
        Property {
            id: PropertyId("p1".to_string()),
            address: "2401 Prairie Trace".to_string(),
            area: "Des Moines".to_string(),
            asking_price: 60_000,
            minimum_offer: 45_000,
            financing_available: true,
            created_at: Utc::now(),
        }
    }

    pub(crate) async fn seed_property(pool: &Pool) {
        SqlitePropertyRepository::new(pool.clone())
            .insert(property())
            .await
            .expect("property seeds");
    }

    pub(crate) fn build_router(pool: &Pool) -> axum::Router {
        let offers = Arc::new(SqliteOfferRepository::new(pool.clone()));
        let buyers = Arc::new(SqliteBuyerRepository::new(pool.clone()));
        offer_router(Arc::new(OfferService::new(offers, buyers)))
    }

    /// Sender double that records every delivery.
    #[derive(Default, Clone)]
    pub(crate) struct RecordingSender {
        pub(crate) sent: Arc<Mutex<Vec<EmailMessage>>>,
    }

    impl EmailSender for RecordingSender {
        fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
            self.sent.lock().expect("sender mutex").push(message.clone());
            Ok(())
        }
    }

    /// Sender double that always fails, driving the backoff path.
    pub(crate) struct FailingSender;

    impl EmailSender for FailingSender {
        fn send(&self, _message: &EmailMessage) -> Result<(), EmailError> {
            Err(EmailError::Transport("relay offline".to_string()))
        }
    }
}

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use common::*;
use serde_json::{json, Value};
use tower::ServiceExt;

use landivo::notifications::outbox::process_next;
use landivo::notifications::OutboxRepository;
use landivo::store::SqliteOutboxRepository;

fn make_offer_request(price: &str) -> Request<Body> {
    let payload = json!({
        "email": "a@x.com",
        "phone": "555",
        "propertyId": "p1",
        "offeredPrice": price,
        "firstName": "A",
        "lastName": "B",
    });
    Request::builder()
        .method("POST")
        .uri("/api/v1/offers")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&payload).expect("serialize")))
        .expect("request")
}

async fn read_json_body(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

#[tokio::test]
async fn first_offer_on_empty_directory_returns_created() {
    let pool = setup_pool().await;
    seed_property(&pool).await;
    let router = build_router(&pool);

    let response = router
        .oneshot(make_offer_request("50000"))
        .await
        .expect("dispatch");

    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json_body(response).await;
    assert_eq!(body.get("status"), Some(&json!("created")));
    assert_eq!(body.pointer("/offer/offeredPrice"), Some(&json!(50000)));
    assert_eq!(body.pointer("/buyer/source"), Some(&json!("property_offer")));

    let buyers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM buyers")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(buyers, 1);
}

#[tokio::test]
async fn lower_repeat_offer_returns_existing_offer_in_payload() {
    let pool = setup_pool().await;
    seed_property(&pool).await;
    let router = build_router(&pool);

    let response = router
        .clone()
        .oneshot(make_offer_request("50000"))
        .await
        .expect("first dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = router
        .oneshot(make_offer_request("40000"))
        .await
        .expect("second dispatch");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = read_json_body(response).await;
    assert_eq!(
        body.pointer("/existingOffer/offeredPrice"),
        Some(&json!(50000))
    );

    // The stored offer is unchanged and the rejection queued nothing.
    let price: i64 = sqlx::query_scalar("SELECT offered_price FROM offers")
        .fetch_one(&pool)
        .await
        .expect("price");
    assert_eq!(price, 50_000);
    let queued: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM outbox")
        .fetch_one(&pool)
        .await
        .expect("queued");
    assert_eq!(queued, 1);
}

#[tokio::test]
async fn higher_repeat_offer_updates_in_place() {
    let pool = setup_pool().await;
    seed_property(&pool).await;
    let router = build_router(&pool);

    router
        .clone()
        .oneshot(make_offer_request("50000"))
        .await
        .expect("first dispatch");

    let response = router
        .oneshot(make_offer_request("60000"))
        .await
        .expect("second dispatch");
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json_body(response).await;
    assert_eq!(body.get("status"), Some(&json!("updated")));
    assert_eq!(body.get("previousPrice"), Some(&json!(50000)));

    let offers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM offers")
        .fetch_one(&pool)
        .await
        .expect("count");
    assert_eq!(offers, 1);

    let kinds: Vec<String> = sqlx::query_scalar("SELECT kind FROM outbox ORDER BY id")
        .fetch_all(&pool)
        .await
        .expect("kinds");
    assert_eq!(kinds, vec!["offer_received", "offer_updated"]);
}

#[tokio::test]
async fn below_minimum_offer_is_accepted_on_the_low_path() {
    let pool = setup_pool().await;
    seed_property(&pool).await;
    let router = build_router(&pool);

    let response = router
        .oneshot(make_offer_request("40000"))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body = read_json_body(response).await;
    assert_eq!(body.get("belowMinimum"), Some(&json!(true)));

    let kind: String = sqlx::query_scalar("SELECT kind FROM outbox")
        .fetch_one(&pool)
        .await
        .expect("kind");
    assert_eq!(kind, "offer_below_minimum");
}

#[tokio::test]
async fn unknown_property_returns_not_found() {
    let pool = setup_pool().await;
    let router = build_router(&pool);

    let response = router
        .oneshot(make_offer_request("50000"))
        .await
        .expect("dispatch");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn outbox_worker_drains_queued_notifications() {
    let pool = setup_pool().await;
    seed_property(&pool).await;
    let router = build_router(&pool);

    router
        .clone()
        .oneshot(make_offer_request("50000"))
        .await
        .expect("first dispatch");
    router
        .oneshot(make_offer_request("60000"))
        .await
        .expect("second dispatch");

    let outbox = SqliteOutboxRepository::new(pool.clone());
    let sender = RecordingSender::default();

    assert!(process_next(&outbox, &sender, 3600).await.expect("poll"));
    assert!(process_next(&outbox, &sender, 3600).await.expect("poll"));
    assert!(!process_next(&outbox, &sender, 3600).await.expect("poll"));

    let sent = sender.sent.lock().expect("sender mutex");
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].to, "a@x.com");
    assert!(sent[1].subject.contains("updated"));
    assert_eq!(outbox.pending_count().await.expect("count"), 0);
}

#[tokio::test]
async fn failed_delivery_backs_off_instead_of_dropping() {
    let pool = setup_pool().await;
    seed_property(&pool).await;
    let router = build_router(&pool);

    router
        .oneshot(make_offer_request("50000"))
        .await
        .expect("dispatch");

    let outbox = SqliteOutboxRepository::new(pool.clone());

    assert!(process_next(&outbox, &FailingSender, 3600)
        .await
        .expect("poll"));

    // The row survives with a bumped attempt and a future due time, so an
    // immediate re-poll finds nothing to do.
    assert_eq!(outbox.pending_count().await.expect("count"), 1);
    let attempt: i64 = sqlx::query_scalar("SELECT attempt FROM outbox")
        .fetch_one(&pool)
        .await
        .expect("attempt");
    assert_eq!(attempt, 1);
    assert!(!process_next(&outbox, &FailingSender, 3600)
        .await
        .expect("re-poll"));
}
