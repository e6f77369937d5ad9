use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::app::engagement::EngagementService;
use crate::app::posts::PostService;
use crate::app::social::SocialService;
use crate::app::users::UserService;
use crate::domain::engagement::{Comment, NewComment, NewPostLike, PostLike};
use crate::domain::media::{MediaType, NewPostMedia, PostMedia};
use crate::domain::post::{NewPost, Post};
use crate::domain::social_graph::{Follow, NewFollow};
use crate::domain::user::{NewUser, User, UserChanges};
use crate::domain::Entity;
use crate::http::{AppError, JsonObject};
use crate::AppState;

#[derive(Serialize)]
pub(crate) struct HealthResponse {
    status: &'static str,
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub msg: &'static str,
}

/// Path ids that are not integers name nothing, so they read as not found.
fn parse_id(raw: &str, entity: Entity) -> Result<i64, AppError> {
    raw.parse::<i64>()
        .map_err(|_| AppError::not_found(format!("{} not found", entity)))
}

pub(crate) async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let status = match state.store.ping().await {
        Ok(()) => "ok",
        Err(err) => {
            tracing::warn!(error = ?err, "storage ping failed");
            "degraded"
        }
    };

    Json(HealthResponse { status })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

pub async fn list_users(State(state): State<AppState>) -> Result<Json<Vec<User>>, AppError> {
    let service = UserService::new(state.store.clone());
    Ok(Json(service.list_users().await?))
}

pub async fn get_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&id, Entity::User)?;
    let service = UserService::new(state.store.clone());
    Ok(Json(service.get_user(id).await?))
}

pub async fn create_user(
    State(state): State<AppState>,
    payload: JsonObject,
) -> Result<(StatusCode, Json<User>), AppError> {
    payload.require_fields(&["email", "password", "is_active"])?;

    let user = NewUser {
        email: payload.text("email")?,
        password: payload.text("password")?,
        is_active: payload.flag("is_active").unwrap_or(true),
    };

    let service = UserService::new(state.store.clone());
    let user = service.create_user(user).await?;
    tracing::info!(user_id = user.id, "user created");

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: JsonObject,
) -> Result<Json<User>, AppError> {
    let id = parse_id(&id, Entity::User)?;
    let service = UserService::new(state.store.clone());
    service.get_user(id).await?;

    let mut changes = UserChanges::default();
    for field in ["email", "password"] {
        let Some(value) = payload.get(field) else {
            continue;
        };
        if value.is_null() || value.as_str() == Some("") {
            return Err(AppError::bad_request(format!("{} cannot be empty", field)));
        }
        let value = payload.text(field)?;
        match field {
            "email" => changes.email = Some(value),
            _ => changes.password = Some(value),
        }
    }
    changes.is_active = payload.flag("is_active");

    Ok(Json(service.update_user(id, changes).await?))
}

pub async fn delete_user(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, Entity::User)?;
    let service = UserService::new(state.store.clone());
    service.delete_user(id).await?;
    tracing::info!(user_id = id, "user deleted");

    Ok(Json(MessageResponse { msg: "User deleted" }))
}

pub async fn list_user_posts(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Post>>, AppError> {
    let id = parse_id(&id, Entity::User)?;
    let service = PostService::new(state.store.clone());
    Ok(Json(service.list_user_posts(id).await?))
}

pub async fn list_followers(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Follow>>, AppError> {
    let id = parse_id(&id, Entity::User)?;
    let service = SocialService::new(state.store.clone());
    Ok(Json(service.list_followers(id).await?))
}

pub async fn list_following(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Follow>>, AppError> {
    let id = parse_id(&id, Entity::User)?;
    let service = SocialService::new(state.store.clone());
    Ok(Json(service.list_following(id).await?))
}

// ---------------------------------------------------------------------------
// Posts and media
// ---------------------------------------------------------------------------

pub async fn list_posts(State(state): State<AppState>) -> Result<Json<Vec<Post>>, AppError> {
    let service = PostService::new(state.store.clone());
    Ok(Json(service.list_posts().await?))
}

pub async fn get_post(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Post>, AppError> {
    let id = parse_id(&id, Entity::Post)?;
    let service = PostService::new(state.store.clone());
    Ok(Json(service.get_post(id).await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    payload: JsonObject,
) -> Result<(StatusCode, Json<Post>), AppError> {
    payload.require_fields(&["user_id"])?;

    let post = NewPost {
        user_id: payload.id("user_id")?,
        caption: payload.optional_text("caption")?,
    };

    let service = PostService::new(state.store.clone());
    let post = service.create_post(post).await?;
    tracing::info!(post_id = post.id, user_id = post.user_id, "post created");

    Ok((StatusCode::CREATED, Json(post)))
}

pub async fn delete_post(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, Entity::Post)?;
    let service = PostService::new(state.store.clone());
    service.delete_post(id).await?;

    Ok(Json(MessageResponse { msg: "Post deleted" }))
}

pub async fn list_post_media(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PostMedia>>, AppError> {
    let id = parse_id(&id, Entity::Post)?;
    let service = PostService::new(state.store.clone());
    Ok(Json(service.list_media(id).await?))
}

pub async fn attach_media(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: JsonObject,
) -> Result<(StatusCode, Json<PostMedia>), AppError> {
    let post_id = parse_id(&id, Entity::Post)?;
    payload.require_fields(&["media_url", "media_type"])?;

    let media_type = payload
        .text("media_type")
        .ok()
        .and_then(|value| MediaType::from_db(&value))
        .ok_or_else(|| AppError::bad_request("media_type must be one of: image, video"))?;

    let media = NewPostMedia {
        post_id,
        media_url: payload.text("media_url")?,
        media_type,
        position: payload.optional_i32("position")?.unwrap_or(0),
    };

    let service = PostService::new(state.store.clone());
    let media = service.attach_media(media).await?;

    Ok((StatusCode::CREATED, Json(media)))
}

pub async fn delete_media(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, Entity::Media)?;
    let service = PostService::new(state.store.clone());
    service.delete_media(id).await?;

    Ok(Json(MessageResponse { msg: "Media deleted" }))
}

// ---------------------------------------------------------------------------
// Comments and likes
// ---------------------------------------------------------------------------

pub async fn list_post_comments(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let id = parse_id(&id, Entity::Post)?;
    let service = EngagementService::new(state.store.clone());
    Ok(Json(service.list_comments(id).await?))
}

pub async fn comment_post(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: JsonObject,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let post_id = parse_id(&id, Entity::Post)?;
    payload.require_fields(&["user_id", "body"])?;

    let comment = NewComment {
        post_id,
        user_id: payload.id("user_id")?,
        body: payload.text("body")?,
    };

    let service = EngagementService::new(state.store.clone());
    let comment = service.comment_post(comment).await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn get_comment(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Comment>, AppError> {
    let id = parse_id(&id, Entity::Comment)?;
    let service = EngagementService::new(state.store.clone());
    Ok(Json(service.get_comment(id).await?))
}

pub async fn delete_comment(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, Entity::Comment)?;
    let service = EngagementService::new(state.store.clone());
    service.delete_comment(id).await?;

    Ok(Json(MessageResponse { msg: "Comment deleted" }))
}

pub async fn list_post_likes(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Vec<PostLike>>, AppError> {
    let id = parse_id(&id, Entity::Post)?;
    let service = EngagementService::new(state.store.clone());
    Ok(Json(service.list_likes(id).await?))
}

pub async fn like_post(
    Path(id): Path<String>,
    State(state): State<AppState>,
    payload: JsonObject,
) -> Result<(StatusCode, Json<PostLike>), AppError> {
    let post_id = parse_id(&id, Entity::Post)?;
    payload.require_fields(&["user_id"])?;

    let like = NewPostLike {
        post_id,
        user_id: payload.id("user_id")?,
    };

    let service = EngagementService::new(state.store.clone());
    let like = service.like_post(like).await?;

    Ok((StatusCode::CREATED, Json(like)))
}

pub async fn unlike(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, Entity::Like)?;
    let service = EngagementService::new(state.store.clone());
    service.unlike(id).await?;

    Ok(Json(MessageResponse { msg: "Like deleted" }))
}

// ---------------------------------------------------------------------------
// Follows
// ---------------------------------------------------------------------------

pub async fn follow_user(
    State(state): State<AppState>,
    payload: JsonObject,
) -> Result<(StatusCode, Json<Follow>), AppError> {
    payload.require_fields(&["follower_id", "following_id"])?;

    let follow = NewFollow {
        follower_id: payload.id("follower_id")?,
        following_id: payload.id("following_id")?,
    };

    let service = SocialService::new(state.store.clone());
    let follow = service.follow(follow).await?;

    Ok((StatusCode::CREATED, Json(follow)))
}

pub async fn get_follow(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<Follow>, AppError> {
    let id = parse_id(&id, Entity::Follow)?;
    let service = SocialService::new(state.store.clone());
    Ok(Json(service.get_follow(id).await?))
}

pub async fn unfollow(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<MessageResponse>, AppError> {
    let id = parse_id(&id, Entity::Follow)?;
    let service = SocialService::new(state.store.clone());
    service.unfollow(id).await?;

    Ok(Json(MessageResponse { msg: "Follow deleted" }))
}
