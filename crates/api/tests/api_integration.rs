//! API integration tests.
//!
//! These drive the full router (with the acting-user middleware) over a
//! mock database.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
    middleware::from_fn,
};
use chrono::Utc;
use mantel_api::{AppState, auth_middleware, middleware::USER_ID_HEADER, router as api_router};
use mantel_common::PaginationDefaults;
use mantel_core::Services;
use mantel_db::Repositories;
use mantel_db::entities::{like, post, user};
use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Value};
use serde_json::Value as Json;
use tower::ServiceExt;

/// Create the test router over a prepared mock database.
fn create_test_router(db: MockDatabase) -> Router {
    let repos = Repositories::new(Arc::new(db.into_connection()), Duration::from_secs(3));
    let state = AppState::new(Services::new(repos), PaginationDefaults::default());
    api_router().layer(from_fn(auth_middleware)).with_state(state)
}

fn empty_db() -> MockDatabase {
    MockDatabase::new(DatabaseBackend::Postgres)
}

fn count_row(n: i64) -> [std::collections::BTreeMap<&'static str, Value>; 1] {
    [maplit::btreemap! { "num_items" => Value::BigInt(Some(n)) }]
}

fn request(method: &str, uri: &str, user: Option<i64>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user {
        builder = builder.header(USER_ID_HEADER, id.to_string());
    }
    match body {
        Some(json) => builder
            .header("Content-Type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Json) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Json::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

#[tokio::test]
async fn test_follow_requires_acting_user() {
    let app = create_test_router(empty_db());
    let (status, body) = send(app, request("POST", "/follows", None, Some(r#"{"followee_id":2}"#))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_follow_self_is_rejected() {
    let app = create_test_router(empty_db());
    let (status, body) = send(app, request("POST", "/follows", Some(1), Some(r#"{"followee_id":1}"#))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "SELF_FOLLOW");
}

#[tokio::test]
async fn test_follow_creates_edge() {
    let db = empty_db()
        .append_query_results([count_row(1)])
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("POST", "/follows", Some(1), Some(r#"{"followee_id":2}"#))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["created"], true);
}

#[tokio::test]
async fn test_unfollow_is_idempotent() {
    let db = empty_db().append_exec_results([MockExecResult {
        last_insert_id: 0,
        rows_affected: 0,
    }]);
    let app = create_test_router(db);
    let (status, _) = send(app, request("DELETE", "/follows/2", Some(1), None)).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_followers_falls_back_on_bad_pagination() {
    let db = empty_db()
        .append_query_results([count_row(1)])
        .append_query_results([[maplit::btreemap! {
            "id" => Value::BigInt(Some(2)),
            "username" => Value::from("bob"),
        }]]);
    let app = create_test_router(db);
    let (status, body) = send(
        app,
        request("GET", "/users/1/followers?page=abc&page_size=5&sort=bogus", None, None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["meta"]["page"], 1);
    assert_eq!(body["data"]["meta"]["page_size"], 5);
    assert_eq!(body["data"]["followers"][0]["username"], "bob");
}

#[tokio::test]
async fn test_patch_with_unknown_status() {
    let app = create_test_router(empty_db());
    let (status, body) = send(
        app,
        request("PATCH", "/friendships/7", Some(2), Some(r#"{"status":"friends"}"#)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_STATUS");
}

#[tokio::test]
async fn test_patch_by_non_receiver() {
    let db = empty_db().append_query_results([Vec::<mantel_db::entities::friendship::Model>::new()]);
    let app = create_test_router(db);
    let (status, body) = send(
        app,
        request("PATCH", "/friendships/7", Some(3), Some(r#"{"status":"accepted"}"#)),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NO_SUCH_REQUEST");
}

#[tokio::test]
async fn test_send_request_to_self() {
    let app = create_test_router(empty_db());
    let (status, body) = send(
        app,
        request("POST", "/friendships", Some(4), Some(r#"{"receiver_id":4}"#)),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "SELF_REQUEST");
}

#[tokio::test]
async fn test_create_post_validates_content() {
    let app = create_test_router(empty_db());
    let long = format!(r#"{{"content":"{}"}}"#, "x".repeat(501));
    let (status, body) = send(app, request("POST", "/posts", Some(1), Some(&long))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_like_post() {
    let row = like::Model {
        id: 1,
        user_id: 1,
        post_id: 9,
        created_at: Utc::now().into(),
    };
    let db = empty_db()
        .append_query_results([count_row(1)])
        .append_query_results([[row]]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("POST", "/posts/9/likes", Some(1), None)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["like"]["post_id"], 9);
}

#[tokio::test]
async fn test_dislike_without_like() {
    let db = empty_db().append_exec_results([MockExecResult {
        last_insert_id: 0,
        rows_affected: 0,
    }]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("DELETE", "/posts/9/likes", Some(1), None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_show_missing_post() {
    let db = empty_db().append_query_results([Vec::<post::Model>::new()]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("GET", "/posts/42", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn test_empty_feed_is_an_empty_array() {
    let db = empty_db()
        .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("GET", "/feed?page_size=10", Some(1), None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["feed"], serde_json::json!([]));
    assert_eq!(body["data"]["meta"]["page_size"], 10);
}

#[tokio::test]
async fn test_storage_failure_hides_details() {
    let db = empty_db().append_query_errors([sea_orm::DbErr::Custom(
        "relation \"posts\" does not exist".to_string(),
    )]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("GET", "/feed", Some(1), None)).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"]["code"], "DATABASE_ERROR");
    assert!(!body["error"]["message"].as_str().unwrap().contains("posts"));
}

#[tokio::test]
async fn test_followers_of_unknown_user() {
    let db = empty_db().append_query_results([count_row(0)]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("GET", "/users/404/followers", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_followers_with_huge_page() {
    let db = empty_db()
        .append_query_results([count_row(1)])
        .append_query_results([Vec::<std::collections::BTreeMap<&str, Value>>::new()]);
    let app = create_test_router(db);
    let (status, body) = send(
        app,
        request(
            "GET",
            "/users/1/followers?page=18446744073709551615&page_size=10",
            None,
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["followers"], serde_json::json!([]));
    assert_eq!(body["data"]["meta"]["page_size"], 10);
}

#[tokio::test]
async fn test_show_user_profile() {
    let alice = user::Model {
        id: 1,
        username: "alice".to_string(),
        email: "alice@example.com".to_string(),
        created_at: Utc::now().into(),
        version: 1,
    };
    let db = empty_db()
        .append_query_results([[alice]])
        .append_query_results([[maplit::btreemap! {
            "followers_count" => Value::BigInt(Some(25)),
            "following_count" => Value::BigInt(Some(3)),
        }]])
        .append_query_results([count_row(2)]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("GET", "/users/1", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["user"]["username"], "alice");
    assert_eq!(body["data"]["user"]["followers_count"], 25);
    assert_eq!(body["data"]["user"]["following_count"], 3);
    assert_eq!(body["data"]["user"]["friends_count"], 2);
    assert!(body["data"]["user"].get("email").is_none());
}

#[tokio::test]
async fn test_show_unknown_user() {
    let db = empty_db().append_query_results([Vec::<user::Model>::new()]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("GET", "/users/9", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_follow_status() {
    let db = empty_db()
        .append_query_results([count_row(1)])
        .append_query_results([Vec::<mantel_db::entities::following::Model>::new()]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("GET", "/users/1/follows/2", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["following"], false);
}

#[tokio::test]
async fn test_like_count() {
    let db = empty_db()
        .append_query_results([count_row(1)])
        .append_query_results([count_row(4)]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("GET", "/posts/9/likes/count", None, None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["count"], 4);
}

#[tokio::test]
async fn test_likes_on_missing_post() {
    let db = empty_db().append_query_results([count_row(0)]);
    let app = create_test_router(db);
    let (status, body) = send(app, request("GET", "/posts/9/likes", None, None)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "POST_NOT_FOUND");
}
