//! HTTP-level integration tests for the marketplace endpoints.
//!
//! Profiles are written through the repository layer (they belong to the
//! profile service); everything else goes through the router.

mod common;

use axum::http::StatusCode;
use axum::Router;
use chamba_core::geo::KM_PER_DEGREE_LATITUDE;
use chamba_core::rating::RatingAggregate;
use chamba_core::types::DbId;
use chamba_db::models::profile::{CreateClientProfile, CreateWorkerProfile};
use chamba_db::repositories::{ClientProfileRepo, WorkerProfileRepo};
use common::{
    body_json, build_test_app, get, get_auth, post_auth, post_json_auth, put_json_auth, token,
};
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const CLIENT: DbId = 10;
const OTHER_CLIENT: DbId = 11;
const WORKER_A: DbId = 20;
const WORKER_B: DbId = 21;
const ADMIN: DbId = 1;

const LAT: f64 = 19.43;
const LNG: f64 = -99.13;

async fn plomero(app: &Router) -> DbId {
    let json = body_json(get(app.clone(), "/api/v1/categories").await).await;
    json["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["name"] == "Plomero")
        .expect("Plomero should be seeded")["id"]
        .as_i64()
        .unwrap()
}

async fn seed_worker(pool: &PgPool, user_id: DbId, km_north: f64, trade: DbId) {
    WorkerProfileRepo::create(
        pool,
        &CreateWorkerProfile {
            user_id,
            bio: None,
            years_experience: Some(5),
            hourly_rate: Some(250.0),
            latitude: LAT + km_north / KM_PER_DEGREE_LATITUDE,
            longitude: LNG,
            coverage_radius_km: 10.0,
            is_available: Some(true),
            trade_ids: vec![trade],
        },
    )
    .await
    .unwrap();
}

/// Two clients at the origin; worker A ~2 km away rated 4.0 over 3 jobs,
/// worker B ~15 km away. Returns the app and the "Plomero" category id.
async fn seed(pool: &PgPool) -> (Router, DbId) {
    let app = build_test_app(pool.clone());
    let category = plomero(&app).await;

    for user_id in [CLIENT, OTHER_CLIENT] {
        ClientProfileRepo::create(
            pool,
            &CreateClientProfile {
                user_id,
                latitude: Some(LAT),
                longitude: Some(LNG),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }
    seed_worker(pool, WORKER_A, 2.0, category).await;
    seed_worker(pool, WORKER_B, 15.0, category).await;

    let mut tx = pool.begin().await.unwrap();
    WorkerProfileRepo::store_rating(
        &mut tx,
        WORKER_A,
        RatingAggregate {
            average: 4.0,
            count: 3,
        },
    )
    .await
    .unwrap();
    tx.commit().await.unwrap();

    (app, category)
}

fn client() -> String {
    token(CLIENT, "client")
}

fn worker(id: DbId) -> String {
    token(id, "worker")
}

fn admin() -> String {
    token(ADMIN, "admin")
}

async fn create_request(app: &Router, category: DbId) -> DbId {
    let body = json!({
        "category_id": category,
        "title": "Fuga en el baño",
        "description": "El lavabo gotea desde ayer",
        "address_text": "Av. Reforma 100, CDMX",
    });
    let response =
        post_json_auth(app.clone(), "/api/v1/service-requests", &client(), body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

async fn submit(app: &Router, request_id: DbId, worker_id: DbId, price: f64) -> (StatusCode, Value) {
    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/service-requests/{request_id}/proposals"),
        &worker(worker_id),
        json!({ "offered_price": price, "message": "Puedo ir hoy" }),
    )
    .await;
    (response.status(), body_json(response).await)
}

async fn eligible(app: &Router, category: DbId) -> Value {
    let uri = format!("/api/v1/workers/eligible?category_id={category}&lat={LAT}&lng={LNG}");
    let response = get_auth(app.clone(), &uri, &client()).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["data"].clone()
}

// ---------------------------------------------------------------------------
// Authentication and roles
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn missing_or_invalid_token_is_401(pool: PgPool) {
    let (app, _) = seed(&pool).await;

    let response = get(app.clone(), "/api/v1/service-requests/mine").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");

    let response = get_auth(app, "/api/v1/service-requests/mine", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn roles_gate_each_endpoint(pool: PgPool) {
    let (app, category) = seed(&pool).await;

    // Workers cannot open requests.
    let body = json!({
        "category_id": category,
        "title": "t",
        "description": "d",
        "address_text": "a",
    });
    let response =
        post_json_auth(app.clone(), "/api/v1/service-requests", &worker(WORKER_A), body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Clients cannot browse the worker feed.
    let response = get_auth(app.clone(), "/api/v1/service-requests/feed", &client()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Only admins reconcile ratings.
    let uri = format!("/api/v1/admin/workers/{WORKER_A}/rating/reconcile");
    let response = post_auth(app, &uri, &client()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "FORBIDDEN");
}

// ---------------------------------------------------------------------------
// Full lifecycle
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn full_request_lifecycle(pool: PgPool) {
    let (app, category) = seed(&pool).await;

    // Only the nearby worker covers the origin.
    let workers = eligible(&app, category).await;
    let ids: Vec<i64> = workers
        .as_array()
        .unwrap()
        .iter()
        .map(|w| w["worker_id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![WORKER_A]);

    let request_id = create_request(&app, category).await;
    let base = format!("/api/v1/service-requests/{request_id}");

    let (status, p1) = submit(&app, request_id, WORKER_A, 450.0).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, p2) = submit(&app, request_id, WORKER_B, 400.0).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, json) = submit(&app, request_id, WORKER_A, 300.0).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "DUPLICATE_PROPOSAL");

    // Cheapest first, with the bidder's rating attached.
    let response = get_auth(app.clone(), &format!("{base}/proposals"), &client()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let proposals = body_json(response).await["data"].clone();
    assert_eq!(proposals[0]["worker_id"], WORKER_B);
    assert_eq!(proposals[1]["worker_id"], WORKER_A);
    assert_eq!(proposals[1]["worker_rating_average"], 4.0);

    let p1_id = p1["data"]["id"].as_i64().unwrap();
    let p2_id = p2["data"]["id"].as_i64().unwrap();

    let response = post_auth(app.clone(), &format!("{base}/proposals/{p1_id}/accept"), &client()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let accepted = body_json(response).await["data"].clone();
    assert_eq!(accepted["status_id"], 2);
    assert_eq!(accepted["worker_id"], WORKER_A);
    assert_eq!(accepted["estimated_price"], 450.0);

    let response = post_auth(app.clone(), &format!("{base}/proposals/{p2_id}/accept"), &client()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "ALREADY_ACCEPTED");

    // Only the bound worker may start.
    let response = post_auth(app.clone(), &format!("{base}/start"), &worker(WORKER_B)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = post_auth(app.clone(), &format!("{base}/start"), &worker(WORKER_A)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["status_id"], 3);

    let response = post_json_auth(
        app.clone(),
        &format!("{base}/complete"),
        &client(),
        json!({ "rating": 6 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_RATING");

    let response = post_json_auth(
        app.clone(),
        &format!("{base}/complete"),
        &client(),
        json!({ "rating": 5, "review": "great" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let completed = body_json(response).await["data"].clone();
    assert_eq!(completed["status_id"], 4);
    assert_eq!(completed["rating"], 5);
    assert_eq!(completed["review"], "great");

    // (4.0 * 3 + 5) / 4
    let workers = eligible(&app, category).await;
    assert_eq!(workers[0]["rating_average"], 4.25);
    assert_eq!(workers[0]["rating_count"], 4);

    let (status, json) = submit(&app, request_id, WORKER_B, 100.0).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "REQUEST_CLOSED");

    let response = post_auth(app.clone(), &format!("{base}/cancel"), &client()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "INVALID_TRANSITION");

    // The bound worker sees it among their jobs.
    let response = get_auth(app, "/api/v1/workers/me/jobs", &worker(WORKER_A)).await;
    let jobs = body_json(response).await["data"].clone();
    assert_eq!(jobs.as_array().unwrap().len(), 1);
    assert_eq!(jobs[0]["id"], request_id);
}

// ---------------------------------------------------------------------------
// Ownership and visibility
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn only_parties_and_admins_see_a_request(pool: PgPool) {
    let (app, category) = seed(&pool).await;
    let request_id = create_request(&app, category).await;
    let uri = format!("/api/v1/service-requests/{request_id}");

    let response = get_auth(app.clone(), &uri, &client()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_auth(app.clone(), &uri, &admin()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_auth(app.clone(), &uri, &token(OTHER_CLIENT, "client")).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = get_auth(app.clone(), &uri, &worker(WORKER_A)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, "/api/v1/service-requests/999999", &client()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn other_clients_cannot_accept_or_list_proposals(pool: PgPool) {
    let (app, category) = seed(&pool).await;
    let request_id = create_request(&app, category).await;
    let (_, proposal) = submit(&app, request_id, WORKER_A, 450.0).await;
    let proposal_id = proposal["data"]["id"].as_i64().unwrap();
    let other = token(OTHER_CLIENT, "client");

    let uri = format!("/api/v1/service-requests/{request_id}/proposals");
    let response = get_auth(app.clone(), &uri, &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_auth(app.clone(), &format!("{uri}/{proposal_id}/accept"), &other).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app, &format!("/api/v1/service-requests/{request_id}"), &client()).await;
    assert_eq!(body_json(response).await["data"]["status_id"], 1);
}

// ---------------------------------------------------------------------------
// Creation, feed and cancellation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_unknown_category_and_blank_title(pool: PgPool) {
    let (app, category) = seed(&pool).await;

    let body = json!({
        "category_id": 999_999,
        "title": "Fuga",
        "description": "d",
        "address_text": "a",
    });
    let response = post_json_auth(app.clone(), "/api/v1/service-requests", &client(), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "INVALID_CATEGORY");

    let body = json!({
        "category_id": category,
        "title": "   ",
        "description": "d",
        "address_text": "a",
    });
    let response = post_json_auth(app.clone(), "/api/v1/service-requests", &client(), body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    let response = get_auth(app, "/api/v1/service-requests/mine", &client()).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn feed_lists_open_requests_until_cancelled(pool: PgPool) {
    let (app, category) = seed(&pool).await;
    let request_id = create_request(&app, category).await;

    let feed_uri = format!("/api/v1/service-requests/feed?category_id={category}");
    let response = get_auth(app.clone(), &feed_uri, &worker(WORKER_B)).await;
    let feed = body_json(response).await["data"].clone();
    assert_eq!(feed.as_array().unwrap().len(), 1);
    assert_eq!(feed[0]["category_name"], "Plomero");

    // A worker is not a party until accepted.
    let cancel_uri = format!("/api/v1/service-requests/{request_id}/cancel");
    let response = post_auth(app.clone(), &cancel_uri, &worker(WORKER_A)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let response = post_auth(app.clone(), &cancel_uri, &admin()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_auth(app.clone(), &cancel_uri, &client()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cancelled = body_json(response).await["data"].clone();
    assert_eq!(cancelled["status_id"], 5);
    assert_eq!(cancelled["cancelled_by"], "client");

    let response = get_auth(app.clone(), &feed_uri, &worker(WORKER_B)).await;
    assert!(body_json(response).await["data"].as_array().unwrap().is_empty());

    let response = get_auth(app, "/api/v1/service-requests/mine", &client()).await;
    let mine = body_json(response).await["data"].clone();
    assert_eq!(mine[0]["status_id"], 5);
}

// ---------------------------------------------------------------------------
// Workers and admin
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn unavailable_workers_drop_out_of_matching(pool: PgPool) {
    let (app, category) = seed(&pool).await;

    let response = put_json_auth(
        app.clone(),
        "/api/v1/workers/me/availability",
        &worker(WORKER_A),
        json!({ "is_available": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["is_available"], false);

    assert!(eligible(&app, category).await.as_array().unwrap().is_empty());

    let uri = format!("/api/v1/workers/eligible?category_id={category}&lat=123&lng={LNG}");
    let response = get_auth(app, &uri, &client()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn eligible_workers_page_with_offset_and_limit(pool: PgPool) {
    let (app, category) = seed(&pool).await;
    seed_worker(&pool, 22, 1.0, category).await;
    seed_worker(&pool, 23, 3.0, category).await;

    let ids = |data: &Value| -> Vec<i64> {
        data.as_array()
            .unwrap()
            .iter()
            .map(|w| w["worker_id"].as_i64().unwrap())
            .collect()
    };
    assert_eq!(ids(&eligible(&app, category).await), vec![22, WORKER_A, 23]);

    let base = format!("/api/v1/workers/eligible?category_id={category}&lat={LAT}&lng={LNG}");
    let response = get_auth(app.clone(), &format!("{base}&offset=1&limit=1"), &client()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(ids(&body_json(response).await["data"]), vec![WORKER_A]);

    let response = get_auth(app, &format!("{base}&limit=0"), &client()).await;
    assert_eq!(ids(&body_json(response).await["data"]), vec![22]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn admin_reconciles_rating_from_completed_jobs(pool: PgPool) {
    let (app, category) = seed(&pool).await;
    let request_id = create_request(&app, category).await;
    let base = format!("/api/v1/service-requests/{request_id}");

    let (_, proposal) = submit(&app, request_id, WORKER_A, 450.0).await;
    let proposal_id = proposal["data"]["id"].as_i64().unwrap();
    post_auth(app.clone(), &format!("{base}/proposals/{proposal_id}/accept"), &client()).await;
    post_auth(app.clone(), &format!("{base}/start"), &worker(WORKER_A)).await;
    let response = post_json_auth(
        app.clone(),
        &format!("{base}/complete"),
        &client(),
        json!({ "rating": 3 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The seeded 4.0 over 3 has no backing jobs; only the one rated 3 counts.
    let uri = format!("/api/v1/admin/workers/{WORKER_A}/rating/reconcile");
    let response = post_auth(app.clone(), &uri, &admin()).await;
    assert_eq!(response.status(), StatusCode::OK);
    let aggregate = body_json(response).await["data"].clone();
    assert_eq!(aggregate["average"], 3.0);
    assert_eq!(aggregate["count"], 1);

    let response = post_auth(app, "/api/v1/admin/workers/999999/rating/reconcile", &admin()).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
