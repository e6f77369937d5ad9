//! PostgreSQL Contract Test
//!
//! Runs the user contract against a real database when `TEST_DATABASE_URL`
//! is set; otherwise the test returns immediately. Everything runs in one
//! test because the tables are shared.

mod common;

use axum::http::StatusCode;
use serde_json::json;
use std::sync::Arc;

use common::TestApp;
use trellis::config::AppConfig;
use trellis::infra::db::Db;

async fn connect() -> Option<Db> {
    let database_url = std::env::var("TEST_DATABASE_URL").ok()?;
    let config = AppConfig {
        http_addr: "127.0.0.1:0".into(),
        database_url: Some(database_url.clone()),
        db_max_connections: 5,
        db_connect_timeout_seconds: 30,
        db_idle_timeout_seconds: 0,
        db_max_lifetime_seconds: 1800,
    };
    let db = Db::connect(&config, &database_url)
        .await
        .expect("Db::connect failed");

    sqlx::query(
        "TRUNCATE TABLE follows, post_likes, comments, post_media, posts, users \
         RESTART IDENTITY CASCADE",
    )
    .execute(db.pool())
    .await
    .expect("failed to truncate tables");

    Some(db)
}

#[tokio::test]
async fn postgres_store_honors_contract() {
    let Some(db) = connect().await else {
        return;
    };
    let app = TestApp::with_store(Arc::new(db));

    // create and fetch
    let resp = app
        .post_json(
            "/users",
            json!({"email": "a@x.com", "password": "p", "is_active": true}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CREATED);
    let expected = json!({"id": 1, "email": "a@x.com", "is_active": true});
    assert_eq!(resp.json(), expected);
    assert_eq!(app.get("/users/1").await.json(), expected);

    // unique email
    let resp = app
        .post_json(
            "/users",
            json!({"email": "a@x.com", "password": "q", "is_active": true}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
    assert_eq!(resp.error_message(), "Email already registered");

    // column width is a client error on this backend too
    let resp = app
        .post_json(
            "/users",
            json!({"email": format!("{}@x.com", "a".repeat(200)), "password": "p", "is_active": true}),
        )
        .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.error_message(), "email must be at most 120 characters");

    // partial update
    let resp = app.put_json("/users/1", json!({"is_active": false})).await;
    assert_eq!(
        resp.json(),
        json!({"id": 1, "email": "a@x.com", "is_active": false})
    );

    // missing parent
    let resp = app.post_json("/posts", json!({"user_id": 999})).await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.error_message(), "User not found");

    // unique like, ordered media
    let reader = app.create_user("b@x.com").await;
    let post = app.create_post(1).await;
    assert_eq!(app.like(post, reader).await.status, StatusCode::CREATED);
    assert_eq!(app.like(post, reader).await.status, StatusCode::CONFLICT);
    for (url, position) in [("second.jpg", 1), ("first.jpg", 0)] {
        let resp = app
            .post_json(
                &format!("/posts/{}/media", post),
                json!({"media_url": url, "media_type": "image", "position": position}),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED);
    }
    let media = app.get(&format!("/posts/{}/media", post)).await.json();
    assert_eq!(media[0]["media_url"], "first.jpg");

    // unique follow
    assert_eq!(app.follow(reader, 1).await.status, StatusCode::CREATED);
    assert_eq!(app.follow(reader, 1).await.status, StatusCode::CONFLICT);
    let comment = app.comment(post, reader, "hello").await;

    // cascade
    assert_eq!(app.delete("/users/1").await.status, StatusCode::OK);
    assert_eq!(app.get(&format!("/posts/{}", post)).await.status, StatusCode::NOT_FOUND);
    assert_eq!(
        app.get(&format!("/comments/{}", comment)).await.status,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        app.get(&format!("/users/{}/following", reader)).await.json(),
        json!([])
    );
}
