use actix_web::{http::StatusCode, test::TestRequest};
use book_sale_engine::{test_utils::prepare_env::tear_down, SqliteDatabase, UserApi};
use chrono::{Days, Utc};
use serde_json::json;

use super::{
    helpers::{bearer, doc, issue_token, send, send_json, test_db, token_for},
    mocks::unavailable_store,
};
use crate::auth::IdentityClaims;

async fn seed_users(db: &SqliteDatabase) {
    let users = UserApi::new(db.clone());
    users.create_user(doc(json!({"email": "a@x.com", "role": "admin"}))).await.unwrap();
    users.create_user(doc(json!({"email": "r@x.com", "role": "regular"}))).await.unwrap();
    users.create_user(doc(json!({"email": "b@x.com", "name": "Bea"}))).await.unwrap();
}

fn grant(email: &str) -> TestRequest {
    TestRequest::put().uri("/users/admin").set_json(json!({ "email": email }))
}

async fn is_admin(db: &SqliteDatabase, email: &str) -> bool {
    let (status, body) = send_json(db.clone(), TestRequest::get().uri(&format!("/users/{email}"))).await;
    assert_eq!(status, StatusCode::OK);
    body["admin"].as_bool().expect("admin should be a bool")
}

#[actix_web::test]
async fn new_users_are_not_admins() {
    let db = test_db().await;
    let req = TestRequest::post().uri("/users").set_json(json!({"email": "n@x.com", "name": "New"}));
    let (status, receipt) = send_json(db.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["acknowledged"], true);
    assert_eq!(receipt["insertedId"].as_str().map(str::len), Some(24));
    assert!(!is_admin(&db, "n@x.com").await);
    tear_down(db).await;
}

#[actix_web::test]
async fn unknown_users_are_not_admins() {
    let db = test_db().await;
    let (status, body) = send(db.clone(), TestRequest::get().uri("/users/nobody@x.com")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"admin":false}"#);
    tear_down(db).await;
}

#[actix_web::test]
async fn upsert_creates_then_updates() {
    let db = test_db().await;
    let req = TestRequest::put().uri("/users").set_json(json!({"email": "u@x.com", "name": "One"}));
    let (status, receipt) = send_json(db.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["matchedCount"], 0);
    assert_eq!(receipt["upsertedCount"], 1);
    assert!(receipt["upsertedId"].is_string());

    let req = TestRequest::put().uri("/users").set_json(json!({"email": "u@x.com", "name": "Two"}));
    let (status, receipt) = send_json(db.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["matchedCount"], 1);
    assert_eq!(receipt["modifiedCount"], 1);
    assert_eq!(receipt["upsertedCount"], 0);

    let user = UserApi::new(db.clone()).fetch_user("u@x.com").await.unwrap().expect("User should exist");
    assert_eq!(user["name"], "Two");
    tear_down(db).await;
}

#[actix_web::test]
async fn upsert_requires_an_email() {
    let db = test_db().await;
    let req = TestRequest::put().uri("/users").set_json(json!({"name": "Anon"}));
    let (status, body) = send_json(db.clone(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("email"));
    tear_down(db).await;
}

#[actix_web::test]
async fn malformed_bodies_are_rejected() {
    let db = test_db().await;
    let req = TestRequest::post().uri("/users").insert_header(("content-type", "application/json")).set_payload("{nope");
    let (status, body) = send_json(db.clone(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());
    let req = TestRequest::post().uri("/users").set_json(json!(["not", "an", "object"]));
    let (status, _) = send(db.clone(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    tear_down(db).await;
}

#[actix_web::test]
async fn admin_can_grant_admin() {
    let db = test_db().await;
    seed_users(&db).await;
    let req = grant("b@x.com").insert_header(bearer(&token_for("a@x.com")));
    let (status, receipt) = send_json(db.clone(), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(receipt["matchedCount"], 1);
    assert_eq!(receipt["modifiedCount"], 1);
    assert!(is_admin(&db, "b@x.com").await);
    tear_down(db).await;
}

#[actix_web::test]
async fn regular_user_cannot_grant_admin() {
    let db = test_db().await;
    seed_users(&db).await;
    let req = grant("b@x.com").insert_header(bearer(&token_for("r@x.com")));
    let (status, body) = send(db.clone(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"message":"you do not have access to make admin"}"#);
    assert!(!is_admin(&db, "b@x.com").await);
    tear_down(db).await;
}

#[actix_web::test]
async fn grant_admin_without_token() {
    let db = test_db().await;
    seed_users(&db).await;
    let (status, body) = send_json(db.clone(), grant("b@x.com")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "you do not have access to make admin");
    assert!(!is_admin(&db, "b@x.com").await);
    tear_down(db).await;
}

#[actix_web::test]
async fn grant_admin_refuses_before_reading_the_body() {
    let db = test_db().await;
    seed_users(&db).await;
    let malformed = [
        TestRequest::put().uri("/users/admin").set_json(json!({})),
        TestRequest::put().uri("/users/admin").set_json(json!({"email": 42})),
        TestRequest::put().uri("/users/admin").insert_header(("content-type", "application/json")).set_payload("{nope"),
    ];
    for req in malformed {
        let (status, body) = send(db.clone(), req).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body, r#"{"message":"you do not have access to make admin"}"#);
    }
    let req = TestRequest::put().uri("/users/admin").set_json(json!({})).insert_header(bearer(&token_for("r@x.com")));
    let (status, _) = send(db.clone(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    tear_down(db).await;
}

#[actix_web::test]
async fn admin_with_malformed_body_is_a_bad_request() {
    let db = test_db().await;
    seed_users(&db).await;
    let req = TestRequest::put().uri("/users/admin").set_json(json!({})).insert_header(bearer(&token_for("a@x.com")));
    let (status, body) = send_json(db.clone(), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("email"));
    tear_down(db).await;
}

#[actix_web::test]
async fn grant_admin_with_bad_tokens() {
    let db = test_db().await;
    seed_users(&db).await;
    let expired = issue_token(IdentityClaims::new("a@x.com"), Utc::now() - Days::new(1));
    for token in [expired.as_str(), "garbage", "a.b.c"] {
        let req = grant("b@x.com").insert_header(bearer(token));
        let (status, body) = send_json(db.clone(), req).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "token: {token}");
        assert_eq!(body["message"], "you do not have access to make admin");
    }
    // Not a bearer token at all
    let req = grant("b@x.com").insert_header(("Authorization", token_for("a@x.com")));
    let (status, _) = send(db.clone(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!is_admin(&db, "b@x.com").await);
    tear_down(db).await;
}

#[actix_web::test]
async fn grant_admin_for_unknown_requester() {
    let db = test_db().await;
    seed_users(&db).await;
    let req = grant("b@x.com").insert_header(bearer(&token_for("ghost@x.com")));
    let (status, _) = send(db.clone(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(!is_admin(&db, "b@x.com").await);
    tear_down(db).await;
}

#[actix_web::test]
async fn grant_admin_for_unknown_target() {
    let db = test_db().await;
    seed_users(&db).await;
    let req = grant("nobody@x.com").insert_header(bearer(&token_for("a@x.com")));
    let (status, body) = send_json(db.clone(), req).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "you do not have access to make admin");
    assert!(UserApi::new(db.clone()).fetch_user("nobody@x.com").await.unwrap().is_none());
    tear_down(db).await;
}

#[actix_web::test]
async fn store_failure_is_a_server_error() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_json(unavailable_store(), TestRequest::get().uri("/users/a@x.com")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].as_str().unwrap().contains("connection refused"));

    let req = grant("b@x.com").insert_header(bearer(&token_for("a@x.com")));
    let (status, _) = send(unavailable_store(), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}
