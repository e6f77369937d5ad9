#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use trellis::infra::memory::MemoryStore;
use trellis::infra::store::Store;
use trellis::AppState;

// ---------------------------------------------------------------------------
// TestApp — one fresh store per test so ids start at 1
// ---------------------------------------------------------------------------

pub struct TestApp {
    router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    body_bytes: bytes::Bytes,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body_bytes).unwrap_or(Value::Null)
    }

    pub fn error_message(&self) -> String {
        self.json()["message"].as_str().unwrap_or("").to_string()
    }
}

pub fn app() -> TestApp {
    TestApp::with_store(Arc::new(MemoryStore::new()))
}

impl TestApp {
    pub fn with_store(store: Arc<dyn Store>) -> Self {
        let state = AppState::new(store);
        let router = trellis::http::router(state.clone());
        TestApp { router, state }
    }

    // ------------------------------------------------------------------
    // Low-level request helper
    // ------------------------------------------------------------------
    pub async fn request(&self, method: Method, path: &str, body: Option<Body>) -> TestResponse {
        let builder = Request::builder()
            .method(method)
            .uri(path)
            .header("host", "localhost");

        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.send(request).await
    }

    /// POST a JSON document under an arbitrary Content-Type.
    pub async fn post_with_content_type(
        &self,
        path: &str,
        content_type: &str,
        body: Value,
    ) -> TestResponse {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("host", "localhost")
            .header("content-type", content_type)
            .body(Body::from(body.to_string()))
            .unwrap();

        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("oneshot failed");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("failed to collect body")
            .to_bytes();

        TestResponse { status, body_bytes }
    }

    // ------------------------------------------------------------------
    // Convenience HTTP helpers
    // ------------------------------------------------------------------
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request(Method::GET, path, None).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::POST, path, Some(Body::from(body.to_string())))
            .await
    }

    /// POST an arbitrary, possibly malformed, body.
    pub async fn post_raw(&self, path: &str, body: &'static str) -> TestResponse {
        self.request(Method::POST, path, Some(Body::from(body))).await
    }

    pub async fn put_json(&self, path: &str, body: Value) -> TestResponse {
        self.request(Method::PUT, path, Some(Body::from(body.to_string())))
            .await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request(Method::DELETE, path, None).await
    }

    // ------------------------------------------------------------------
    // Test data helpers
    // ------------------------------------------------------------------

    /// Create a user through the API. Returns its id.
    pub async fn create_user(&self, email: &str) -> i64 {
        let resp = self
            .post_json(
                "/users",
                json!({"email": email, "password": "secret", "is_active": true}),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create user: {:?}", resp.json());
        resp.json()["id"].as_i64().unwrap()
    }

    /// Create a post owned by `user_id`. Returns its id.
    pub async fn create_post(&self, user_id: i64) -> i64 {
        let resp = self
            .post_json("/posts", json!({"user_id": user_id, "caption": "test caption"}))
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "create post: {:?}", resp.json());
        resp.json()["id"].as_i64().unwrap()
    }

    pub async fn comment(&self, post_id: i64, user_id: i64, body: &str) -> i64 {
        let resp = self
            .post_json(
                &format!("/posts/{}/comments", post_id),
                json!({"user_id": user_id, "body": body}),
            )
            .await;
        assert_eq!(resp.status, StatusCode::CREATED, "comment: {:?}", resp.json());
        resp.json()["id"].as_i64().unwrap()
    }

    pub async fn like(&self, post_id: i64, user_id: i64) -> TestResponse {
        self.post_json(
            &format!("/posts/{}/likes", post_id),
            json!({"user_id": user_id}),
        )
        .await
    }

    pub async fn follow(&self, follower_id: i64, following_id: i64) -> TestResponse {
        self.post_json(
            "/follows",
            json!({"follower_id": follower_id, "following_id": following_id}),
        )
        .await
    }
}
