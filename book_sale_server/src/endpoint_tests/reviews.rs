use actix_web::{http::StatusCode, test::TestRequest};
use book_sale_engine::test_utils::prepare_env::tear_down;
use serde_json::json;

use super::{
    helpers::{send, send_json, test_db},
    mocks::unavailable_store,
};

#[actix_web::test]
async fn reviews_round_trip() {
    let db = test_db().await;
    for (email, rating) in [("a@x.com", 5), ("b@x.com", 3), ("a@x.com", 4)] {
        let review = json!({"userEmail": email, "bookId": "b1", "rating": rating, "text": "..."});
        let (status, receipt) = send_json(db.clone(), TestRequest::post().uri("/review").set_json(review)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(receipt["insertedId"].is_string());
    }

    let (status, mine) = send_json(db.clone(), TestRequest::get().uri("/user/review?userEmail=a@x.com")).await;
    assert_eq!(status, StatusCode::OK);
    let ratings = mine.as_array().unwrap().iter().map(|r| r["rating"].as_i64().unwrap()).collect::<Vec<_>>();
    assert_eq!(ratings, vec![5, 4]);

    let (status, all) = send_json(db.clone(), TestRequest::get().uri("/review")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all.as_array().unwrap().len(), 3);
    tear_down(db).await;
}

#[actix_web::test]
async fn reviews_for_user_needs_an_email() {
    let db = test_db().await;
    let (status, _) = send(db.clone(), TestRequest::get().uri("/user/review?email=a@x.com")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    tear_down(db).await;
}

#[actix_web::test]
async fn liveness() {
    let (status, body) = send(unavailable_store(), TestRequest::get().uri("/")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "Server Running");
}

#[actix_web::test]
async fn store_failure_is_a_server_error() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send_json(unavailable_store(), TestRequest::get().uri("/review")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["message"].is_string());
}
