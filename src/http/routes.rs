use axum::{routing::delete, routing::get, routing::post, Router};

use crate::http::handlers;
use crate::AppState;

pub fn health() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health))
}

pub fn users() -> Router<AppState> {
    Router::new()
        .route("/users", get(handlers::list_users).post(handlers::create_user))
        .route(
            "/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user),
        )
        .route("/users/:id/posts", get(handlers::list_user_posts))
        .route("/users/:id/followers", get(handlers::list_followers))
        .route("/users/:id/following", get(handlers::list_following))
}

pub fn posts() -> Router<AppState> {
    Router::new()
        .route("/posts", get(handlers::list_posts).post(handlers::create_post))
        .route("/posts/:id", get(handlers::get_post).delete(handlers::delete_post))
        .route(
            "/posts/:id/media",
            get(handlers::list_post_media).post(handlers::attach_media),
        )
        .route("/media/:id", delete(handlers::delete_media))
}

pub fn engagement() -> Router<AppState> {
    Router::new()
        .route(
            "/posts/:id/comments",
            get(handlers::list_post_comments).post(handlers::comment_post),
        )
        .route(
            "/comments/:id",
            get(handlers::get_comment).delete(handlers::delete_comment),
        )
        .route(
            "/posts/:id/likes",
            get(handlers::list_post_likes).post(handlers::like_post),
        )
        .route("/likes/:id", delete(handlers::unlike))
}

pub fn social() -> Router<AppState> {
    Router::new()
        .route("/follows", post(handlers::follow_user))
        .route("/follows/:id", get(handlers::get_follow).delete(handlers::unfollow))
}
