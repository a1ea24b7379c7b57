//! Integration tests for `RestStore` against a local `wiremock` server
//! standing in for the PostgREST endpoint.

use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tours_core::NormalizedTour;
use tours_db::{
    DbError, NewProvider, NewScrapeLog, NewTour, RestStore, ScrapeStatus, TourSignalsUpdate,
    TourStore,
};

const KEY: &str = "service-role-test-key";
const TOUR_ID: &str = "5b0c3f0e-8a61-4c1f-9d4e-2f3a4b5c6d7e";
const PROVIDER_ID: &str = "0e9d8c7b-6a5f-4e3d-2c1b-0a9f8e7d6c5b";

fn store(server: &MockServer) -> RestStore {
    RestStore::new(&server.uri(), KEY, Duration::from_secs(5)).expect("failed to build RestStore")
}

fn tour_json(slug: &str, source_id: Option<&str>) -> serde_json::Value {
    json!({
        "id": TOUR_ID,
        "name": "Desert Safari Adventure",
        "slug": slug,
        "description": null,
        "category": "Desert",
        "duration": "4 hours",
        "duration_hours": 4.0,
        "group_size": null,
        "price_from": 35.0,
        "currency": "BHD",
        "rating": null,
        "review_count": 0,
        "image_url": null,
        "provider_id": PROVIDER_ID,
        "provider_name": "Gulf Tours",
        "booking_url": null,
        "highlights": [],
        "includes": [],
        "is_active": true,
        "is_featured": false,
        "source": "tripadvisor",
        "source_id": source_id,
        "created_at": "2026-10-19T06:00:00.123456+00:00",
        "updated_at": "2026-10-19T06:00:00.123456+00:00"
    })
}

fn normalized() -> NormalizedTour {
    NormalizedTour {
        external_id: "11452311".to_string(),
        slug: "desert-safari-adventure".to_string(),
        name: "Desert Safari Adventure".to_string(),
        description: None,
        category: "Desert".to_string(),
        duration_text: Some("4 hours".to_string()),
        duration_hours: Some(4.0),
        group_size: None,
        price_from: Some(35.0),
        rating: None,
        review_count: 0,
        image_url: None,
        provider_name: Some("Gulf Tours".to_string()),
        detail_url: None,
        highlights: Vec::new(),
    }
}

// ---------------------------------------------------------------------------
// tours
// ---------------------------------------------------------------------------

#[tokio::test]
async fn find_tour_uses_or_filter_and_auth_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/tours"))
        .and(query_param(
            "or",
            "(source_id.eq.\"11452311\",slug.eq.\"desert-safari-adventure\")",
        ))
        .and(query_param("limit", "1"))
        .and(header("apikey", KEY))
        .and(header("authorization", format!("Bearer {KEY}").as_str()))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([tour_json("desert-safari-adventure", Some("11452311"))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let found = store(&server)
        .find_tour("11452311", "desert-safari-adventure")
        .await
        .expect("find_tour should succeed")
        .expect("row should be returned");
    assert_eq!(found.id.to_string(), TOUR_ID);
    assert_eq!(found.price_from, Some(35.0));
}

#[tokio::test]
async fn find_tour_without_source_id_filters_by_slug() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/tours"))
        .and(query_param("slug", "eq.pearl-diving"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let found = store(&server).find_tour("", "pearl-diving").await.unwrap();
    assert!(found.is_none());
}

#[tokio::test]
async fn update_patches_by_id_with_signal_columns() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/rest/v1/tours"))
        .and(query_param("id", format!("eq.{TOUR_ID}").as_str()))
        .and(body_partial_json(json!({"rating": 4.5, "review_count": 120})))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let update = TourSignalsUpdate {
        rating: Some(4.5),
        review_count: 120,
        booking_url: None,
        updated_at: Utc::now(),
    };
    store(&server)
        .update_tour_signals(TOUR_ID.parse().unwrap(), &update)
        .await
        .expect("update should succeed");
}

#[tokio::test]
async fn insert_tour_returns_representation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/tours"))
        .and(header("prefer", "return=representation"))
        .and(body_partial_json(json!({
            "slug": "desert-safari-adventure",
            "currency": "BHD",
            "source": "tripadvisor",
            "is_active": true,
            "is_featured": false,
            "includes": []
        })))
        .respond_with(
            ResponseTemplate::new(201)
                .set_body_json(json!([tour_json("desert-safari-adventure", Some("11452311"))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let row = store(&server)
        .insert_tour(&NewTour::from_normalized(&normalized(), None))
        .await
        .expect("insert should succeed");
    assert_eq!(row.slug, "desert-safari-adventure");
}

#[tokio::test]
async fn insert_with_empty_representation_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/tours"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&server)
        .await;

    let err = store(&server)
        .insert_tour(&NewTour::from_normalized(&normalized(), None))
        .await
        .unwrap_err();
    assert!(
        matches!(err, DbError::EmptyInsertResponse { table: "tours" }),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn error_status_carries_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/tours"))
        .respond_with(
            ResponseTemplate::new(409).set_body_string(r#"{"code":"23505","message":"duplicate key"}"#),
        )
        .mount(&server)
        .await;

    let err = store(&server)
        .insert_tour(&NewTour::from_normalized(&normalized(), None))
        .await
        .unwrap_err();
    match err {
        DbError::UnexpectedStatus {
            table,
            status,
            body,
        } => {
            assert_eq!(table, "tours");
            assert_eq!(status, 409);
            assert!(body.contains("duplicate key"));
        }
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn malformed_rows_are_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/tours"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "not-a-uuid"}])))
        .mount(&server)
        .await;

    let err = store(&server).find_tour("1", "x").await.unwrap_err();
    assert!(
        matches!(err, DbError::Deserialize { table: "tours", .. }),
        "got: {err:?}"
    );
}

// ---------------------------------------------------------------------------
// tour_providers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn provider_lookup_and_insert() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/tour_providers"))
        .and(query_param("slug", "eq.gulf-tours"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/tour_providers"))
        .and(body_partial_json(json!({
            "name": "Gulf Tours",
            "slug": "gulf-tours",
            "type": "tour_operator",
            "is_active": true,
            "is_verified": false
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([{
            "id": PROVIDER_ID,
            "name": "Gulf Tours",
            "slug": "gulf-tours",
            "type": "tour_operator",
            "is_active": true,
            "is_verified": false,
            "created_at": "2026-10-19T06:00:00+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let store = store(&server);
    assert!(store
        .find_provider_by_slug("gulf-tours")
        .await
        .unwrap()
        .is_none());
    let provider = store
        .insert_provider(&NewProvider::named("Gulf Tours"))
        .await
        .expect("provider insert should succeed");
    assert_eq!(provider.id.to_string(), PROVIDER_ID);
    assert_eq!(provider.provider_type, "tour_operator");
}

// ---------------------------------------------------------------------------
// scrape_logs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn insert_scrape_log_posts_counters() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/scrape_logs"))
        .and(body_partial_json(json!({
            "source": "tripadvisor",
            "status": "success",
            "tours_found": 2,
            "tours_new": 1,
            "tours_updated": 1
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let now = Utc::now();
    store(&server)
        .insert_scrape_log(&NewScrapeLog {
            source: "tripadvisor".to_string(),
            status: ScrapeStatus::Success,
            tours_found: 2,
            tours_new: 1,
            tours_updated: 1,
            tours_skipped: 0,
            tours_failed: 0,
            error_message: None,
            started_at: now,
            completed_at: now,
        })
        .await
        .expect("log insert should succeed");
}

#[tokio::test]
async fn list_scrape_logs_orders_newest_first() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/scrape_logs"))
        .and(query_param("order", "started_at.desc"))
        .and(query_param("limit", "5"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": "8d4f7a3e-1c2b-4e5f-9a6b-7c8d9e0f1a2b",
            "source": "tripadvisor",
            "status": "success",
            "tours_found": 12,
            "tours_new": 3,
            "tours_updated": 9,
            "error_message": null,
            "started_at": "2026-10-19T06:00:00+00:00",
            "completed_at": "2026-10-19T06:04:12+00:00"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let logs = store(&server).list_scrape_logs(5).await.unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs[0].status, ScrapeStatus::Success);
    assert_eq!(logs[0].tours_found, 12);
}
