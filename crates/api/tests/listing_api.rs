//! HTTP-level tests for the listing lifecycle: create, browse, display,
//! update, verify, and delete.
//!
//! These need `DATABASE_URL`; run with `cargo test -- --ignored`.

mod common;

use axum::http::StatusCode;
use common::{
    apartment_payload, body_json, delete_auth, get, get_auth, patch_json_auth, post_json_auth,
    put_json_auth, token_for,
};
use propgo_core::types::Role;
use serde_json::{json, Value};
use sqlx::PgPool;

use propgo_db::models::user::CreateUser;
use propgo_db::repositories::UserRepo;

async fn create_owner(pool: &PgPool, email: &str) -> i64 {
    let input = CreateUser {
        email: email.to_string(),
        password_hash: "unused".to_string(),
        name: "Owner".to_string(),
        phone: "9000000000".to_string(),
    };
    UserRepo::create(pool, &input).await.unwrap().id
}

async fn create_listing(pool: &PgPool, token: &str, payload: Value) -> Value {
    let response =
        post_json_auth(common::build_test_app(pool.clone()), "/api/listings", payload, token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"].clone()
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn create_stores_derived_pricing(pool: PgPool) {
    let owner = create_owner(&pool, "owner@example.com").await;
    let token = token_for(owner, Role::User);

    let listing = create_listing(&pool, &token, apartment_payload("Pune", 2, 5000)).await;
    assert_eq!(listing["owner_id"], owner);
    assert_eq!(listing["computed_total"], 5_000_000.0);
    assert_eq!(listing["verified"], false);

    let id = listing["id"].as_i64().unwrap();
    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/listings/{id}/display?unit=Sq%20Yards"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let display = &body_json(response).await["data"];
    assert_eq!(display["unit"], "Sq Yards");
    assert_eq!(display["total_price"], 5_000_000.0);
    let area = display["area"].as_f64().unwrap();
    assert!((area - 1000.0 / 9.0).abs() < 1e-9);

    let mine = get_auth(common::build_test_app(pool), "/api/listings/user/my-listings", &token).await;
    assert_eq!(body_json(mine).await["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn browse_filters_and_paginates(pool: PgPool) {
    let owner = create_owner(&pool, "browse@example.com").await;
    let token = token_for(owner, Role::User);
    for (city, rooms, price) in [("Pune", 2, 4000), ("Pune", 4, 7000), ("Mumbai", 3, 15000)] {
        create_listing(&pool, &token, apartment_payload(city, rooms, price)).await;
    }

    let response = get(common::build_test_app(pool.clone()), "/api/listings?city=pune").await;
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["total"], 2);
    assert_eq!(json["data"].as_array().unwrap().len(), 2);

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/listings?rooms_bucket=4%2B%20BHK",
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["rooms"], 4);

    let response = get(common::build_test_app(pool), "/api/listings?limit=2&page=2").await;
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["total"], 3);
    assert_eq!(json["pagination"]["total_pages"], 2);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn update_merges_and_revalidates(pool: PgPool) {
    let owner = create_owner(&pool, "update@example.com").await;
    let token = token_for(owner, Role::User);
    let listing = create_listing(&pool, &token, apartment_payload("Pune", 2, 5000)).await;
    let uri = format!("/api/listings/{}", listing["id"]);

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "rooms": 3, "price_per_unit": 6000 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = &body_json(response).await["data"];
    assert_eq!(updated["rooms"], 3);
    assert_eq!(updated["city"], "Pune");
    assert_eq!(updated["computed_total"], 6_000_000.0);

    let response = put_json_auth(
        common::build_test_app(pool),
        &uri,
        json!({ "rooms": 0 }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["fields"]["rooms"], "Value too low.");
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn only_owner_or_admin_may_modify(pool: PgPool) {
    let owner = create_owner(&pool, "mine@example.com").await;
    let stranger = create_owner(&pool, "other@example.com").await;
    let listing = create_listing(&pool, &token_for(owner, Role::User), apartment_payload("Pune", 2, 5000)).await;
    let uri = format!("/api/listings/{}", listing["id"]);

    let response = put_json_auth(
        common::build_test_app(pool.clone()),
        &uri,
        json!({ "rooms": 3 }),
        &token_for(stranger, Role::User),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &token_for(stranger, Role::User)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(common::build_test_app(pool.clone()), &uri, &token_for(stranger, Role::Admin)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(common::build_test_app(pool), &uri).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
#[ignore = "requires DATABASE_URL"]
async fn admin_verifies_and_browse_filters_on_it(pool: PgPool) {
    let owner = create_owner(&pool, "verify@example.com").await;
    let token = token_for(owner, Role::User);
    let listing = create_listing(&pool, &token, apartment_payload("Pune", 2, 5000)).await;
    create_listing(&pool, &token, apartment_payload("Pune", 3, 5000)).await;

    let response = patch_json_auth(
        common::build_test_app(pool.clone()),
        &format!("/api/listings/{}/verify", listing["id"]),
        json!({ "verified": true }),
        &token_for(owner, Role::Admin),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["verified"], true);

    let response = get(common::build_test_app(pool), "/api/listings?verified=true").await;
    let json = body_json(response).await;
    assert_eq!(json["pagination"]["total"], 1);
    assert_eq!(json["data"][0]["id"], listing["id"]);
}
